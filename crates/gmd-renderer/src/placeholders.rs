//! Placeholders for pre-rendered `gmd-md` blocks.
//!
//! Block HTML is kept out of the outer markdown pass: each block is replaced
//! by an HTML comment, which the markdown engine passes through untouched,
//! and substituted back in a single pass afterwards. A placeholder that ends
//! up inside a code block arrives escaped and is replaced by the escaped
//! block HTML.

use crate::state::push_escaped;

const MARKER: &str = "gmd-md-block-";
const OPEN: &str = "<!--";
const CLOSE: &str = "-->";
const ESCAPED_OPEN: &str = "&lt;!--";
const ESCAPED_CLOSE: &str = "--&gt;";

/// Collects block HTML and substitutes it for placeholders.
#[derive(Debug, Default)]
pub(crate) struct Placeholders {
    blocks: Vec<String>,
}

/// A placeholder found in rendered HTML.
struct Found {
    start: usize,
    end: usize,
    index: usize,
    escaped: bool,
}

impl Placeholders {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            blocks: Vec::with_capacity(capacity),
        }
    }

    /// Whether `input` can carry placeholders without clashing with its own
    /// content.
    pub(crate) fn usable_in(input: &str) -> bool {
        !input.contains(MARKER)
    }

    /// Register block HTML and return the placeholder standing in for it.
    pub(crate) fn push(&mut self, html: String) -> String {
        let index = self.blocks.len();
        self.blocks.push(html);
        format!("{OPEN}{MARKER}{index}{CLOSE}")
    }

    /// Indices of the unescaped placeholders in `text`, in order.
    pub(crate) fn indices_in(&self, text: &str) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut pos = 0;
        while let Some(found) = self.find(text, pos) {
            if !found.escaped {
                indices.push(found.index);
            }
            pos = found.end;
        }
        indices
    }

    /// Replace every placeholder in `html` with its block HTML.
    pub(crate) fn apply(self, html: &str) -> String {
        if self.blocks.is_empty() {
            return html.to_owned();
        }

        let extra: usize = self.blocks.iter().map(String::len).sum();
        let mut out = String::with_capacity(html.len() + extra);
        let mut pos = 0;
        while let Some(found) = self.find(html, pos) {
            out.push_str(&html[pos..found.start]);
            let block = &self.blocks[found.index];
            if found.escaped {
                push_escaped(&mut out, block);
            } else {
                out.push_str(block);
            }
            pos = found.end;
        }
        out.push_str(&html[pos..]);
        out
    }

    /// Find the next placeholder at or after `from`.
    fn find(&self, text: &str, from: usize) -> Option<Found> {
        let mut search = from;
        while let Some(offset) = text[search..].find(MARKER) {
            let marker = search + offset;
            search = marker + MARKER.len();

            let before = &text[from..marker];
            let (start, close, escaped) = if before.ends_with(OPEN) {
                (marker - OPEN.len(), CLOSE, false)
            } else if before.ends_with(ESCAPED_OPEN) {
                (marker - ESCAPED_OPEN.len(), ESCAPED_CLOSE, true)
            } else {
                continue;
            };

            let digits = text[search..]
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            let digits_end = search + digits;
            let Ok(index) = text[search..digits_end].parse::<usize>() else {
                continue;
            };
            if index < self.blocks.len() && text[digits_end..].starts_with(close) {
                return Some(Found {
                    start,
                    end: digits_end + close.len(),
                    index,
                    escaped,
                });
            }
        }
        None
    }
}
