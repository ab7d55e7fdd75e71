//! GMD document rendering.
//!
//! Provides [`GmdRenderer`], which ties block expansion, the HTML fragment
//! round trip and the markdown engine together.

use pulldown_cmark::{Event, Options, Parser, TagEnd};

use crate::blocks::{Block, find_blocks};
use crate::component_lines::ComponentLines;
use crate::error::RenderError;
use crate::fragment::{decode_quote_markers, normalize_fragment};
use crate::indent::normalize_indentation;
use crate::options::{HeadingIds, Limits, LinkRules, RendererOptions};
use crate::placeholders::Placeholders;
use crate::self_closing;
use crate::state::TocEntry;
use crate::writer::{HtmlWriter, RenderOutput};

/// Renders GMD documents to HTML.
///
/// Rendering is a pure function of the input and the options; a renderer can
/// be shared between threads.
///
/// # Example
///
/// ```
/// use gmd_renderer::GmdRenderer;
///
/// let renderer = GmdRenderer::default().with_breaks(false);
/// let html = renderer.render("First line\nsecond line").unwrap();
/// assert_eq!(html, "<p>First line\nsecond line</p>\n");
/// ```
#[derive(Clone, Debug, Default)]
pub struct GmdRenderer {
    options: RendererOptions,
}

impl GmdRenderer {
    /// Create a renderer with the given options.
    #[must_use]
    pub fn new(options: RendererOptions) -> Self {
        Self { options }
    }

    /// Enable or disable GitHub Flavored Markdown.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Bare URL autolinks (unless disabled with [`with_autolinks`](Self::with_autolinks))
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.options.gfm = enabled;
        self
    }

    /// Render single newlines inside paragraphs as `<br>`. Enabled by default.
    #[must_use]
    pub fn with_breaks(mut self, enabled: bool) -> Self {
        self.options.breaks = enabled;
        self
    }

    #[must_use]
    pub fn with_heading_ids(mut self, ids: HeadingIds) -> Self {
        self.options.heading_ids = ids;
        self
    }

    #[must_use]
    pub fn with_autolinks(mut self, enabled: bool) -> Self {
        self.options.autolinks = enabled;
        self
    }

    /// Enable or disable markup re-serialization before markdown parsing.
    #[must_use]
    pub fn with_html_roundtrip(mut self, enabled: bool) -> Self {
        self.options.html_roundtrip = enabled;
        self
    }

    #[must_use]
    pub fn with_link_rules(mut self, rules: LinkRules) -> Self {
        self.options.links = rules;
        self
    }

    /// Set the component names whose self-closing form is expanded.
    #[must_use]
    pub fn with_form_components<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.form_components = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.options.limits = limits;
        self
    }

    #[must_use]
    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.options.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        }
    }

    /// Render a GMD document to HTML.
    ///
    /// Whitespace-only input renders to an empty string.
    pub fn render(&self, content: &str) -> Result<String, RenderError> {
        self.render_document(content).map(|output| output.html)
    }

    /// Render a GMD document, also returning its headings.
    ///
    /// Headings of `gmd-md` blocks are listed at the position of their block.
    ///
    /// Heading ids are unique within the outer document and within each
    /// block, but not across them: a block heading can get the same id as an
    /// outer heading or a heading in another block.
    pub fn render_document(&self, content: &str) -> Result<RenderOutput, RenderError> {
        self.check_input(content)?;
        if content.trim().is_empty() {
            return Ok(RenderOutput::default());
        }

        let normalized = self.normalize_self_closing(content);
        let blocks = find_blocks(&normalized, &self.options.limits)?;
        tracing::debug!(
            input_len = content.len(),
            blocks = blocks.len(),
            "Rendering GMD document"
        );

        if blocks.is_empty() {
            return Ok(self.render_markdown(&normalized, |_| {}));
        }

        if !Placeholders::usable_in(&normalized) {
            tracing::debug!("Input contains placeholder marker, splicing blocks inline");
            let expanded = self.splice_blocks(&normalized, &blocks);
            return Ok(self.render_markdown(&expanded, |_| {}));
        }

        let mut placeholders = Placeholders::with_capacity(blocks.len());
        let mut block_tocs = Vec::with_capacity(blocks.len());
        let document = splice(&normalized, &blocks, |block| {
            let output = self.render_block(block);
            block_tocs.push(output.toc);
            placeholders.push(wrap_block(block, &output.html))
        });

        // Record where each block lands relative to the outer headings.
        let mut headings = 0;
        let mut anchors = Vec::new();
        let mut output = self.render_markdown(&document, |event| match event {
            Event::End(TagEnd::Heading(_)) => headings += 1,
            Event::Html(html) | Event::InlineHtml(html) => anchors.extend(
                placeholders
                    .indices_in(html)
                    .into_iter()
                    .map(|index| (index, headings)),
            ),
            _ => {}
        });

        output.toc = merge_toc(output.toc, block_tocs, &anchors);
        output.html = placeholders.apply(&output.html);
        Ok(output)
    }

    /// Replace every `gmd-md` block with its rendered HTML.
    ///
    /// Each block is dedented and rendered on its own; its attributes are
    /// re-emitted trimmed. Everything outside the blocks is copied unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use gmd_renderer::GmdRenderer;
    ///
    /// let renderer = GmdRenderer::default();
    /// assert_eq!(
    ///     renderer.preprocess_gmd_blocks("<div><gmd-md  id=\"a\" >\n  # Hi\n</gmd-md></div>").unwrap(),
    ///     "<div><gmd-md id=\"a\"><h1 id=\"hi\">Hi</h1>\n</gmd-md></div>"
    /// );
    /// assert_eq!(renderer.preprocess_gmd_blocks("<gmd-md></gmd-md>").unwrap(), "<gmd-md></gmd-md>");
    /// ```
    pub fn preprocess_gmd_blocks(&self, html: &str) -> Result<String, RenderError> {
        self.check_input(html)?;
        let blocks = find_blocks(html, &self.options.limits)?;
        tracing::debug!(blocks = blocks.len(), "Expanding gmd-md blocks");
        Ok(self.splice_blocks(html, &blocks))
    }

    /// Expand self-closing form components using the configured names.
    #[must_use]
    pub fn normalize_self_closing(&self, html: &str) -> String {
        self_closing::normalize_self_closing(html, &self.options.form_components)
    }

    /// Render markdown without expanding `gmd-md` blocks.
    ///
    /// Runs the HTML fragment round trip, restores line-leading quote markers
    /// and renders the result with the markdown engine.
    #[must_use]
    pub fn render_fragment(&self, content: &str) -> String {
        self.render_markdown(content, |_| {}).html
    }

    fn check_input(&self, content: &str) -> Result<(), RenderError> {
        let limit = self.options.limits.max_input_bytes;
        if content.len() > limit {
            tracing::warn!(len = content.len(), limit, "Input too large");
            return Err(RenderError::InputTooLarge {
                len: content.len(),
                limit,
            });
        }
        Ok(())
    }

    fn render_block(&self, block: &Block<'_>) -> RenderOutput {
        let content = normalize_indentation(block.content);
        self.render_markdown(&content, |_| {})
    }

    fn splice_blocks(&self, html: &str, blocks: &[Block<'_>]) -> String {
        splice(html, blocks, |block| {
            wrap_block(block, &self.render_block(block).html)
        })
    }

    /// Run the fragment pipeline, passing every markdown event to `on_event`
    /// before it is written.
    fn render_markdown<F>(&self, content: &str, mut on_event: F) -> RenderOutput
    where
        F: FnMut(&Event<'_>),
    {
        let normalized = if self.options.html_roundtrip {
            normalize_fragment(content)
        } else {
            content.to_owned()
        };
        let markdown = decode_quote_markers(&normalized);
        if markdown.trim().is_empty() {
            return RenderOutput::default();
        }

        let events = Parser::new_ext(&markdown, self.parser_options())
            .into_offset_iter()
            .inspect(|(event, _)| on_event(event));
        HtmlWriter::from_options(&self.options).render(ComponentLines::new(events, &markdown))
    }
}

/// Copy `html`, replacing each block span with the output of `replace`.
fn splice<F>(html: &str, blocks: &[Block<'_>], mut replace: F) -> String
where
    F: FnMut(&Block<'_>) -> String,
{
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    for block in blocks {
        out.push_str(&html[pos..block.start]);
        out.push_str(&replace(block));
        pos = block.end;
    }
    out.push_str(&html[pos..]);
    out
}

fn wrap_block(block: &Block<'_>, html: &str) -> String {
    format!("<gmd-md{}>{html}</gmd-md>", block.attributes())
}

/// Insert block headings after the outer heading they follow.
///
/// `anchors` holds (block index, number of outer headings before the block).
fn merge_toc(
    outer: Vec<TocEntry>,
    mut blocks: Vec<Vec<TocEntry>>,
    anchors: &[(usize, usize)],
) -> Vec<TocEntry> {
    let mut toc = Vec::with_capacity(outer.len() + blocks.iter().map(Vec::len).sum::<usize>());
    let mut outer = outer.into_iter();
    let mut taken = 0;
    for &(index, before) in anchors {
        while taken < before {
            toc.extend(outer.next());
            taken += 1;
        }
        if let Some(entries) = blocks.get_mut(index) {
            toc.append(entries);
        }
    }
    toc.extend(outer);
    toc
}
