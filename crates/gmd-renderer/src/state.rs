//! State structs for HTML writing.
//!
//! These structs track context while the writer walks the event stream.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use pulldown_cmark::Alignment;

use crate::options::HeadingIds;
use crate::slug::Slugger;

/// State for tracking code block rendering.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block with optional language.
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the current code block and return (language, content).
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    /// Whether `<tbody>` has been written for the current table.
    body_open: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    /// Start a new table with column alignments.
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.body_open = false;
        self.cell_index = 0;
    }

    /// End the table. Returns `true` if a body was opened.
    pub(crate) fn end(&mut self) -> bool {
        std::mem::take(&mut self.body_open)
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    /// Start a body row. Returns `true` for the first row of the body.
    pub(crate) fn start_row(&mut self) -> bool {
        self.cell_index = 0;
        !std::mem::replace(&mut self.body_open, true)
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    /// Cell tag name for the current row.
    pub(crate) fn cell_tag(&self) -> &'static str {
        if self.in_head { "th" } else { "td" }
    }

    /// `align` attribute for the current cell.
    pub(crate) fn current_alignment_attr(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" align="left""#,
            Some(Alignment::Center) => r#" align="center""#,
            Some(Alignment::Right) => r#" align="right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
pub(crate) struct ImageState {
    /// Nesting depth; images inside alt text only contribute their text.
    depth: usize,
    alt_text: String,
}

impl ImageState {
    pub(crate) fn start(&mut self) {
        if self.depth == 0 {
            self.alt_text.clear();
        }
        self.depth += 1;
    }

    /// End an image. Returns the alt text when the outermost image closes.
    pub(crate) fn end(&mut self) -> Option<String> {
        self.depth = self.depth.saturating_sub(1);
        (self.depth == 0).then(|| std::mem::take(&mut self.alt_text))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor id, `None` when heading ids are disabled.
    pub id: Option<String>,
}

/// Heading buffers and id generation.
pub(crate) struct HeadingState {
    ids: HeadingIds,
    /// Current heading level (None if not in a heading).
    current_level: Option<u8>,
    /// Heading plain text, used for the slug and table of contents.
    text: String,
    /// Heading HTML with inline formatting.
    html: String,
    toc: Vec<TocEntry>,
    slugger: Slugger,
}

impl HeadingState {
    pub(crate) fn new(ids: HeadingIds) -> Self {
        Self {
            ids,
            current_level: None,
            text: String::new(),
            html: String::new(),
            toc: Vec::new(),
            slugger: Slugger::new(),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub(crate) fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Complete the heading and record its table of contents entry.
    ///
    /// Returns (level, id, html) or None if not in a heading.
    pub(crate) fn complete_heading(&mut self) -> Option<(u8, Option<String>, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);

        let id = match self.ids {
            HeadingIds::Github => Some(self.slugger.slug(&text)),
            HeadingIds::Disabled => None,
        };
        self.toc.push(TocEntry {
            level,
            title: text.trim().to_owned(),
            id: id.clone(),
        });

        Some((level, id, html))
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn html_buffer(&mut self) -> &mut String {
        &mut self.html
    }

    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

/// Escape HTML special characters.
///
/// # Example
///
/// ```
/// use gmd_renderer::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    push_escaped(&mut result, s);
    result
}

/// Append `s` to `out` with HTML special characters escaped.
pub(crate) fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Bytes percent-encoded in URLs: everything outside the URI reserved and
/// unreserved sets. `%` is kept so existing escapes survive, `&` and `'` are
/// left for HTML escaping.
const HREF_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#')
    .remove(b'%');

/// Prepare a URL for an `href` or `src` attribute.
///
/// Characters outside the URI set are percent-encoded (existing `%` escapes
/// are kept), then `&` and `'` are escaped for HTML.
///
/// # Example
///
/// ```
/// use gmd_renderer::escape_href;
///
/// assert_eq!(escape_href("/a b?x=1&y='2'"), "/a%20b?x=1&amp;y=&#39;2&#39;");
/// assert_eq!(escape_href("/caf\u{e9}"), "/caf%C3%A9");
/// ```
#[must_use]
pub fn escape_href(href: &str) -> String {
    let mut result = String::with_capacity(href.len());
    for chunk in percent_encode(href.as_bytes(), HREF_ENCODE_SET) {
        for c in chunk.chars() {
            match c {
                '&' => result.push_str("&amp;"),
                '\'' => result.push_str("&#39;"),
                _ => result.push(c),
            }
        }
    }
    result
}
