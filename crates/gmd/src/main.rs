//! GMD CLI - Gravitee Markdown renderer.
//!
//! Renders a GMD document from a file or stdin and writes the HTML to stdout.

mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::RenderArgs;
use output::Output;

/// GMD - render Gravitee Markdown documents to HTML.
#[derive(Parser)]
#[command(name = "gmd", version, about)]
struct Cli {
    #[command(flatten)]
    args: RenderArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.args.execute() {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
