//! HTML writer for pulldown-cmark events.
//!
//! Produces the established GMD output format: every block element ends with
//! a newline, tables carry `align` attributes, strikethrough is `<del>` and
//! raw HTML passes through untouched.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Tag, TagEnd};

use crate::autolink::find_autolinks;
use crate::links::write_link_open;
use crate::options::{HeadingIds, LinkRules, RendererOptions};
use crate::state::{
    CodeBlockState, HeadingState, ImageState, TableState, TocEntry, escape_href, push_escaped,
};
use crate::util::{heading_level_to_num, strip_final_newline};

/// Result of rendering markdown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderOutput {
    /// Rendered HTML.
    pub html: String,
    /// Headings in document order.
    pub toc: Vec<TocEntry>,
}

/// Writes HTML for a stream of markdown events.
///
/// A writer renders one document: heading ids stay unique across everything
/// passed to [`render`](Self::render) on the same writer.
///
/// # Example
///
/// ```
/// use gmd_renderer::HtmlWriter;
/// use pulldown_cmark::Parser;
///
/// let output = HtmlWriter::new().render(Parser::new("## Setup\n\n[Top](#top)"));
/// assert_eq!(
///     output.html,
///     "<h2 id=\"setup\">Setup</h2>\n<p><a class=\"anchor\" href=\"#top\">Top</a></p>\n"
/// );
/// assert_eq!(output.toc[0].id.as_deref(), Some("setup"));
/// ```
pub struct HtmlWriter {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    pending_image: Option<(String, String)>,
    /// Consecutive text events, flushed before any other event.
    pending_text: String,
    link_depth: usize,
    breaks: bool,
    autolinks: bool,
    links: LinkRules,
}

impl HtmlWriter {
    /// Create a writer with line breaks, autolinks and GitHub heading ids.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(HeadingIds::Github),
            pending_image: None,
            pending_text: String::new(),
            link_depth: 0,
            breaks: true,
            autolinks: true,
            links: LinkRules::default(),
        }
    }

    /// Create a writer configured from renderer options.
    #[must_use]
    pub fn from_options(options: &RendererOptions) -> Self {
        Self::new()
            .with_breaks(options.breaks)
            .with_autolinks(options.gfm && options.autolinks)
            .with_heading_ids(options.heading_ids)
            .with_link_rules(options.links.clone())
    }

    /// Render soft line breaks as `<br>` instead of a newline.
    #[must_use]
    pub fn with_breaks(mut self, enabled: bool) -> Self {
        self.breaks = enabled;
        self
    }

    /// Link bare URLs and email addresses found in text.
    #[must_use]
    pub fn with_autolinks(mut self, enabled: bool) -> Self {
        self.autolinks = enabled;
        self
    }

    #[must_use]
    pub fn with_heading_ids(mut self, ids: HeadingIds) -> Self {
        self.heading = HeadingState::new(ids);
        self
    }

    #[must_use]
    pub fn with_link_rules(mut self, rules: LinkRules) -> Self {
        self.links = rules;
        self
    }

    /// Render markdown events and return the result.
    pub fn render<'a, I>(&mut self, events: I) -> RenderOutput
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        self.flush_text();

        RenderOutput {
            html: std::mem::take(&mut self.output),
            toc: self.heading.take_toc(),
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        if !matches!(event, Event::Text(_)) {
            self.flush_text();
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => self.output.push_str(&html),
            Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>\n"),
            Event::TaskListMarker(checked) => self.push_inline(if checked {
                r#"<input checked="" disabled="" type="checkbox"> "#
            } else {
                r#"<input disabled="" type="checkbox"> "#
            }),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not enabled
            }
        }
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        // Only text reaches alt attributes.
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.html_buffer().push_str(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the id is known.
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>\n"),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_owned)
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>\n"),
                Some(n) => writeln!(self.output, "<ol start=\"{n}\">").unwrap(),
                None => self.output.push_str("<ul>\n"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>\n");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead>\n<tr>\n");
            }
            Tag::TableRow => {
                if self.table.start_row() {
                    self.output.push_str("<tbody>");
                }
                self.output.push_str("<tr>\n");
            }
            Tag::TableCell => {
                let tag = self.table.cell_tag();
                let align = self.table.current_alignment_attr();
                self.push_inline(&format!("<{tag}{align}>"));
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                self.link_depth += 1;
                let href = if link_type == LinkType::Email {
                    format!("mailto:{dest_url}")
                } else {
                    dest_url.into_string()
                };
                let mut open = String::new();
                write_link_open(&mut open, &href, &title, &self.links);
                self.push_inline(&open);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the image ends.
                if !self.image.is_active() {
                    self.pending_image = Some((dest_url.into_string(), title.into_string()));
                }
                self.image.start();
            }
            Tag::FootnoteDefinition(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>\n"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete_heading() {
                    let html = html.trim();
                    match id {
                        Some(id) => {
                            writeln!(self.output, "<h{level} id=\"{id}\">{html}</h{level}>")
                                .unwrap();
                        }
                        None => writeln!(self.output, "<h{level}>{html}</h{level}>").unwrap(),
                    }
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>\n"),
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                self.code_block(lang.as_deref(), &content);
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => self.output.push_str("</li>\n"),
            TagEnd::Table => {
                if self.table.end() {
                    self.output.push_str("</tbody>");
                }
                self.output.push_str("</table>\n");
            }
            TagEnd::TableHead => {
                self.output.push_str("</tr>\n</thead>\n");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>\n"),
            TagEnd::TableCell => {
                let tag = self.table.cell_tag();
                self.push_inline(&format!("</{tag}>\n"));
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => {
                self.link_depth = self.link_depth.saturating_sub(1);
                self.push_inline("</a>");
            }
            TagEnd::Image => {
                if let Some(alt) = self.image.end()
                    && let Some((src, title)) = self.pending_image.take()
                {
                    self.image_tag(&src, &alt, &title);
                }
            }
            TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            if self.heading.is_active() {
                self.heading.push_text(text);
            }
            self.pending_text.push_str(text);
        }
    }

    /// Write buffered text, linking bare URLs outside of links.
    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        let mut html = String::with_capacity(text.len());
        if self.autolinks && self.link_depth == 0 {
            write_autolinked(&mut html, &text, &self.links);
        } else {
            push_escaped(&mut html, &text);
        }
        self.push_inline(&html);
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        let mut html = String::with_capacity(code.len() + 13);
        html.push_str("<code>");
        push_escaped(&mut html, code);
        html.push_str("</code>");
        self.push_inline(&html);
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(" ");
        }
        self.push_inline(if self.breaks { "<br>" } else { "\n" });
    }

    fn code_block(&mut self, lang: Option<&str>, content: &str) {
        self.output.push_str("<pre><code");
        if let Some(lang) = lang {
            self.output.push_str(" class=\"language-");
            push_escaped(&mut self.output, lang);
            self.output.push('"');
        }
        self.output.push('>');
        push_escaped(&mut self.output, strip_final_newline(content));
        self.output.push_str("\n</code></pre>\n");
    }

    fn image_tag(&mut self, src: &str, alt: &str, title: &str) {
        let mut html = String::new();
        html.push_str("<img src=\"");
        html.push_str(&escape_href(src));
        html.push_str("\" alt=\"");
        push_escaped(&mut html, alt);
        html.push('"');
        if !title.is_empty() {
            html.push_str(" title=\"");
            push_escaped(&mut html, title);
            html.push('"');
        }
        html.push('>');
        self.push_inline(&html);
    }
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn write_autolinked(out: &mut String, text: &str, rules: &LinkRules) {
    let mut last = 0;
    for link in find_autolinks(text) {
        push_escaped(out, &text[last..link.range.start]);
        write_link_open(out, &link.href, "", rules);
        push_escaped(out, &text[link.range.clone()]);
        out.push_str("</a>");
        last = link.range.end;
    }
    push_escaped(out, &text[last..]);
}
