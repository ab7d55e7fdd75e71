//! HTML fragment round trip.
//!
//! Re-serializes markup the way an HTML5 fragment serializer prints it while
//! copying text byte for byte. Code spans and fenced code are skipped so their
//! content reaches the markdown engine untouched.

use std::borrow::Cow;

use crate::fence::FenceTracker;
use crate::tag::{StartTag, parse_end_tag, parse_markup_declaration, parse_start_tag};

/// Elements whose content is never parsed as markup.
const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "textarea", "title"];

/// Elements that switch the parser into foreign (SVG/MathML) content.
const FOREIGN_ELEMENTS: [&str; 2] = ["svg", "math"];

/// Re-serialize the markup of an HTML fragment.
///
/// Start tags get lowercase names, double-quoted attribute values and no
/// self-closing slash (inside `svg`/`math` a self-closing element becomes an
/// explicit open/close pair). End tags are lowercased. Comments, doctypes and
/// text are copied unchanged. Leading whitespace of the fragment is dropped.
///
/// # Example
///
/// ```
/// use gmd_renderer::normalize_fragment;
///
/// let html = normalize_fragment("  <DIV Class='card' hidden><BR/>a < b</DIV>");
/// assert_eq!(html, "<div class=\"card\" hidden=\"\"><br>a < b</div>");
/// ```
#[must_use]
pub fn normalize_fragment(html: &str) -> String {
    let input = html.trim_start_matches([' ', '\t', '\n', '\r', '\x0C']);
    let mut serializer = Serializer {
        input,
        out: String::with_capacity(input.len()),
        pos: 0,
        foreign_depth: 0,
    };
    let mut fence = FenceTracker::new();

    while serializer.pos < input.len() {
        let line_end = input[serializer.pos..]
            .find('\n')
            .map_or(input.len(), |i| serializer.pos + i + 1);
        let line = input[serializer.pos..line_end].trim_end_matches(['\n', '\r']);
        if fence.update(line) {
            serializer.out.push_str(&input[serializer.pos..line_end]);
            serializer.pos = line_end;
        } else {
            serializer.line();
        }
    }

    serializer.out
}

/// Restore `>` at the start of lines where it was escaped as `&gt;`.
///
/// Only the leading run of quote markers (after optional spaces and tabs) is
/// decoded, so nested quotes like `&gt; &gt; text` become `> > text`.
///
/// # Example
///
/// ```
/// use gmd_renderer::decode_quote_markers;
///
/// assert_eq!(decode_quote_markers("&gt; quote\na &gt; b"), "> quote\na &gt; b");
/// ```
#[must_use]
pub fn decode_quote_markers(text: &str) -> Cow<'_, str> {
    if !text.contains("&gt;") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
        out.push_str(&line[..indent]);
        let mut rest = &line[indent..];
        while let Some(after) = rest.strip_prefix("&gt;") {
            out.push('>');
            let spaces = after.len() - after.trim_start_matches(' ').len();
            out.push_str(&after[..spaces]);
            rest = &after[spaces..];
        }
        out.push_str(rest);
    }
    Cow::Owned(out)
}

struct Serializer<'a> {
    input: &'a str,
    out: String,
    pos: usize,
    foreign_depth: usize,
}

impl<'a> Serializer<'a> {
    /// Serialize from the current position through the end of the line.
    ///
    /// A tag or code span may run past the line end; scanning then continues
    /// to the end of the line it finishes on.
    fn line(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\n' => {
                    self.out.push('\n');
                    self.pos += 1;
                    return;
                }
                b'\\' => {
                    let len = if bytes
                        .get(self.pos + 1)
                        .is_some_and(u8::is_ascii_punctuation)
                    {
                        2
                    } else {
                        1
                    };
                    self.copy(len);
                }
                b'`' => self.code_span(),
                b'<' => self.markup(),
                _ => {
                    let len = self.input[self.pos..]
                        .find(['\n', '\\', '`', '<'])
                        .unwrap_or(self.input.len() - self.pos);
                    self.copy(len);
                }
            }
        }
    }

    fn copy(&mut self, len: usize) {
        self.out.push_str(&self.input[self.pos..self.pos + len]);
        self.pos += len;
    }

    fn copy_to(&mut self, end: usize) {
        self.out.push_str(&self.input[self.pos..end]);
        self.pos = end;
    }

    fn code_span(&mut self) {
        let run = backtick_run(self.input.as_bytes(), self.pos);
        match code_span_end(self.input, self.pos + run, run) {
            Some(end) => self.copy_to(end),
            None => self.copy(run),
        }
    }

    fn markup(&mut self) {
        let input = self.input;
        if let Some(end) = parse_markup_declaration(input, self.pos) {
            self.copy_to(end);
        } else if let Some(tag) = parse_end_tag(input, self.pos) {
            let name = tag.name.to_ascii_lowercase();
            if FOREIGN_ELEMENTS.contains(&name.as_str()) {
                self.foreign_depth = self.foreign_depth.saturating_sub(1);
            }
            self.out.push_str("</");
            self.out.push_str(&name);
            self.out.push('>');
            self.pos = tag.end;
        } else if let Some(tag) = parse_start_tag(input, self.pos) {
            self.start_tag(&tag);
        } else {
            self.copy(1);
        }
    }

    fn start_tag(&mut self, tag: &StartTag<'a>) {
        let foreign = self.foreign_depth > 0;
        let lower = tag.name.to_ascii_lowercase();
        // Foreign content keeps mixed-case names such as `linearGradient`.
        let name = if foreign { tag.name } else { lower.as_str() };
        let opens_foreign = FOREIGN_ELEMENTS.contains(&lower.as_str());

        self.out.push('<');
        self.out.push_str(name);
        write_attributes(&mut self.out, tag, foreign || opens_foreign);
        self.out.push('>');
        self.pos = tag.end;

        if tag.self_closing {
            if foreign || opens_foreign {
                self.out.push_str("</");
                self.out.push_str(name);
                self.out.push('>');
            }
            return;
        }

        if opens_foreign {
            self.foreign_depth += 1;
        } else if !foreign && RAW_TEXT_ELEMENTS.contains(&name) {
            let end = find_end_tag(self.input, self.pos, name).unwrap_or(self.input.len());
            self.copy_to(end);
        }
    }
}

fn write_attributes(out: &mut String, tag: &StartTag<'_>, keep_case: bool) {
    let mut seen: Vec<String> = Vec::with_capacity(tag.attrs.len());
    for attr in &tag.attrs {
        let name = if keep_case {
            attr.name.to_owned()
        } else {
            attr.name.to_ascii_lowercase()
        };
        if seen.iter().any(|s| s.eq_ignore_ascii_case(&name)) {
            continue;
        }
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        escape_attribute_value(out, attr.value.unwrap_or(""));
        out.push('"');
        seen.push(name);
    }
}

/// Escape an attribute value for a double-quoted context.
///
/// Character references already present are kept; a bare `&` becomes
/// `&amp;`.
fn escape_attribute_value(out: &mut String, value: &str) {
    for (i, ch) in value.char_indices() {
        match ch {
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '&' if !starts_with_reference(&value[i..]) => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
}

/// Check whether `s` (starting at `&`) begins a character reference.
fn starts_with_reference(s: &str) -> bool {
    let body = &s.as_bytes()[1..];
    let (digits, rest): (fn(&u8) -> bool, &[u8]) = match body {
        [b'#', b'x' | b'X', rest @ ..] => (u8::is_ascii_hexdigit, rest),
        [b'#', rest @ ..] => (u8::is_ascii_digit, rest),
        [first, ..] if first.is_ascii_alphabetic() => (u8::is_ascii_alphanumeric, body),
        _ => return false,
    };
    let len = rest.iter().take_while(|&b| digits(b)).count();
    len > 0 && rest.get(len) == Some(&b';')
}

fn backtick_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|&&b| b == b'`').count()
}

/// Find the end of a code span whose opening run of `run` backticks ends at
/// `start`. Code spans do not cross blank lines.
fn code_span_end(input: &str, start: usize, run: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'`' => {
                let len = backtick_run(bytes, i);
                if len == run {
                    return Some(i + len);
                }
                i += len;
            }
            b'\n' => {
                let next = input[i + 1..].trim_start_matches([' ', '\t']);
                if next.is_empty() || next.starts_with(['\n', '\r']) {
                    return None;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Find `</name` (ASCII case-insensitive) at or after `from`.
fn find_end_tag(input: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut i = from;
    while let Some(offset) = input[i..].find("</") {
        let start = i + offset;
        let name_start = start + 2;
        let name_end = name_start + name.len();
        if bytes
            .get(name_start..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.as_bytes()))
        {
            return Some(start);
        }
        i = name_start;
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_text_is_unchanged() {
        let text = "# Title\n\nSome *text* & more > less.\n";
        assert_eq!(normalize_fragment(text), text);
    }

    #[test]
    fn test_leading_whitespace_dropped() {
        assert_eq!(normalize_fragment("\n\n  # Title"), "# Title");
        assert_eq!(normalize_fragment(" \t \n "), "");
    }

    #[test]
    fn test_tag_and_attribute_names_lowercased() {
        assert_eq!(
            normalize_fragment("<DIV CLASS=\"a\">x</DIV>"),
            "<div class=\"a\">x</div>"
        );
    }

    #[test]
    fn test_attribute_values_requoted() {
        assert_eq!(
            normalize_fragment("<a title='say \"hi\"' href=/x data-a = b>"),
            "<a title=\"say &quot;hi&quot;\" href=\"/x\" data-a=\"b\">"
        );
    }

    #[test]
    fn test_attribute_value_escaping() {
        assert_eq!(
            normalize_fragment("<a href=\"/q?a=1&b=2\" title=\"&amp; &#39;\u{a0}\">"),
            "<a href=\"/q?a=1&amp;b=2\" title=\"&amp; &#39;&nbsp;\">"
        );
    }

    #[test]
    fn test_valueless_and_duplicate_attributes() {
        assert_eq!(
            normalize_fragment("<input disabled type=text TYPE=number>"),
            "<input disabled=\"\" type=\"text\">"
        );
    }

    #[test]
    fn test_self_closing_slash_dropped() {
        assert_eq!(normalize_fragment("<br/><img src=\"a.png\" />"), "<br><img src=\"a.png\">");
        assert_eq!(
            normalize_fragment("<gmd-card />text"),
            "<gmd-card>text"
        );
    }

    #[test]
    fn test_foreign_content_self_closing() {
        assert_eq!(
            normalize_fragment("<svg viewBox=\"0 0 1 1\"><path d=\"M0\"/></svg>"),
            "<svg viewBox=\"0 0 1 1\"><path d=\"M0\"></path></svg>"
        );
        assert_eq!(normalize_fragment("<svg/>"), "<svg></svg>");
    }

    #[test]
    fn test_comments_and_doctype_verbatim() {
        let html = "<!-- <B>keep</B> --><!DOCTYPE html>";
        assert_eq!(normalize_fragment(html), html);
    }

    #[test]
    fn test_non_tags_are_text() {
        let text = "a < b and <https://example.com> and <me@example.com> and <div";
        assert_eq!(normalize_fragment(text), text);
    }

    #[test]
    fn test_code_span_skipped() {
        let text = "Use `<DIV Class='x'/>` here and <B>bold</B>";
        assert_eq!(
            normalize_fragment(text),
            "Use `<DIV Class='x'/>` here and <b>bold</b>"
        );
    }

    #[test]
    fn test_unmatched_backticks_are_text() {
        assert_eq!(normalize_fragment("``open <B>x</B>"), "``open <b>x</b>");
        assert_eq!(
            normalize_fragment("`a\n\n<B>b</B>`"),
            "`a\n\n<b>b</b>`"
        );
    }

    #[test]
    fn test_escaped_backtick_is_text() {
        assert_eq!(normalize_fragment("\\`<B>x</B>`"), "\\`<b>x</b>`");
    }

    #[test]
    fn test_fenced_code_skipped() {
        let text = "```html\n<DIV Class='x'/>\n```\n<B>x</B>\n";
        assert_eq!(
            normalize_fragment(text),
            "```html\n<DIV Class='x'/>\n```\n<b>x</b>\n"
        );
    }

    #[test]
    fn test_raw_text_elements() {
        let html = "<SCRIPT>if (a<b) { x = '<DIV/>'; }</SCRIPT><P>";
        assert_eq!(
            normalize_fragment(html),
            "<script>if (a<b) { x = '<DIV/>'; }</script><p>"
        );
    }

    #[test]
    fn test_multiline_tag() {
        assert_eq!(
            normalize_fragment("<gmd-card\n  title=\"A\"\n>\n**b**\n</gmd-card>"),
            "<gmd-card title=\"A\">\n**b**\n</gmd-card>"
        );
    }

    #[test]
    fn test_crlf_preserved() {
        assert_eq!(normalize_fragment("<P>\r\nx\r\n"), "<p>\r\nx\r\n");
    }

    #[test]
    fn test_decode_quote_markers() {
        assert_eq!(decode_quote_markers("&gt; quote"), "> quote");
        assert_eq!(decode_quote_markers("  &gt; &gt; nested"), "  > > nested");
        assert_eq!(decode_quote_markers("a\n&gt;b"), "a\n>b");
        assert_eq!(decode_quote_markers("x &gt; y"), "x &gt; y");
    }

    #[test]
    fn test_decode_quote_markers_borrows_when_unchanged() {
        assert!(matches!(decode_quote_markers("> quote"), Cow::Borrowed(_)));
    }
}
