//! `gmd` render command implementation.

use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Args;
use gmd_config::{CliSettings, Config};
use gmd_renderer::{GmdRenderer, RenderOutput};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for rendering a document.
#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Document to render (default: read stdin).
    file: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover gmd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only expand gmd-md blocks, leaving the rest of the document as is.
    #[arg(long)]
    blocks_only: bool,

    /// Keep single newlines instead of rendering them as line breaks.
    #[arg(long)]
    no_breaks: bool,

    /// Disable GitHub Flavored Markdown extensions.
    #[arg(long)]
    no_gfm: bool,

    /// Do not link bare URLs.
    #[arg(long)]
    no_autolinks: bool,

    /// Enable verbose output (debug logs and a render summary).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command, writing HTML to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read or
    /// the document exceeds the configured limits.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let source = self.read_source()?;
        if source.trim().is_empty() {
            output.warning("Input is empty");
        }

        let rendered = self.render(&source)?;

        if self.verbose {
            output.info(&format!(
                "Rendered {} bytes into {} bytes ({} headings)",
                source.len(),
                rendered.html.len(),
                rendered.toc.len()
            ));
        }

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(rendered.html.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    /// Render `source` with the configured renderer.
    fn render(&self, source: &str) -> Result<RenderOutput, CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            tracing::debug!(path = %path.display(), "Loaded configuration");
        }
        let renderer = GmdRenderer::new(config.renderer_options());

        if self.blocks_only {
            let html = renderer.preprocess_gmd_blocks(source)?;
            return Ok(RenderOutput {
                html,
                toc: Vec::new(),
            });
        }
        Ok(renderer.render_document(source)?)
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            gfm: self.no_gfm.then_some(false),
            breaks: self.no_breaks.then_some(false),
            autolinks: self.no_autolinks.then_some(false),
        }
    }

    fn read_source(&self) -> Result<String, CliError> {
        match &self.file {
            Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            }),
            None => {
                let mut source = String::new();
                std::io::stdin().lock().read_to_string(&mut source)?;
                Ok(source)
            }
        }
    }
}
