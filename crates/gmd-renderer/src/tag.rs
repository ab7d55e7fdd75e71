//! Minimal HTML tag tokenizer.
//!
//! Recognizes start tags, end tags, comments and declarations at a given byte
//! offset. Attribute values are scanned with quote awareness, so a `>` inside
//! a quoted value never ends a tag. Markup that does not form a complete tag
//! is left to the caller as text.
//!
//! Tag names are restricted to `[A-Za-z][A-Za-z0-9-]*` followed by
//! whitespace, `/` or `>`. This keeps `a < b`, `<https://example.com>` and
//! `<user@example.com>` out of the tag path.

/// Attribute of a start tag, borrowed from the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Attr<'a> {
    pub(crate) name: &'a str,
    /// Value without quotes; `None` for valueless attributes (`disabled`).
    pub(crate) value: Option<&'a str>,
}

/// Start tag found in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StartTag<'a> {
    /// Tag name as written.
    pub(crate) name: &'a str,
    pub(crate) attrs: Vec<Attr<'a>>,
    /// Raw text between the tag name and the closing `>` or `/>`.
    pub(crate) attr_text: &'a str,
    pub(crate) self_closing: bool,
    /// Byte offset just past the closing `>`.
    pub(crate) end: usize,
}

/// End tag found in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EndTag<'a> {
    /// Tag name as written.
    pub(crate) name: &'a str,
    /// Byte offset just past the closing `>`.
    pub(crate) end: usize,
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

fn skip_spaces(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_space(bytes[i]) {
        i += 1;
    }
    i
}

/// Scan a tag name starting at `start`, returning its end offset.
fn scan_name(bytes: &[u8], start: usize) -> Option<usize> {
    if !bytes.get(start)?.is_ascii_alphabetic() {
        return None;
    }
    let mut i = start + 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(&b) if is_space(b) || b == b'/' || b == b'>' => Some(i),
        _ => None,
    }
}

/// Parse a start tag whose `<` is at `pos`.
pub(crate) fn parse_start_tag(input: &str, pos: usize) -> Option<StartTag<'_>> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&b'<') {
        return None;
    }
    let name_start = pos + 1;
    let name_end = scan_name(bytes, name_start)?;
    let name = &input[name_start..name_end];

    let mut attrs = Vec::new();
    let mut i = name_end;
    loop {
        i = skip_spaces(bytes, i);
        match *bytes.get(i)? {
            b'>' => {
                return Some(StartTag {
                    name,
                    attrs,
                    attr_text: &input[name_end..i],
                    self_closing: false,
                    end: i + 1,
                });
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(StartTag {
                    name,
                    attrs,
                    attr_text: &input[name_end..i],
                    self_closing: true,
                    end: i + 2,
                });
            }
            b'/' => i += 1,
            _ => {
                let (attr, next) = scan_attribute(input, i)?;
                attrs.push(attr);
                i = next;
            }
        }
    }
}

/// Scan one attribute starting at `start`, returning it and the offset after it.
fn scan_attribute(input: &str, start: usize) -> Option<(Attr<'_>, usize)> {
    let bytes = input.as_bytes();
    // A leading `=` belongs to the name.
    let mut i = if bytes[start] == b'=' { start + 1 } else { start };
    while i < bytes.len() && !is_space(bytes[i]) && !matches!(bytes[i], b'/' | b'>' | b'=') {
        i += 1;
    }
    let name = &input[start..i];

    let after_name = skip_spaces(bytes, i);
    if bytes.get(after_name) != Some(&b'=') {
        return Some((Attr { name, value: None }, i));
    }

    let value_start = skip_spaces(bytes, after_name + 1);
    match *bytes.get(value_start)? {
        quote @ (b'"' | b'\'') => {
            let open = value_start + 1;
            let close = open + input[open..].find(char::from(quote))?;
            let attr = Attr {
                name,
                value: Some(&input[open..close]),
            };
            Some((attr, close + 1))
        }
        b'>' => Some((
            Attr {
                name,
                value: Some(""),
            },
            value_start,
        )),
        _ => {
            let mut end = value_start;
            while end < bytes.len() && !is_space(bytes[end]) && bytes[end] != b'>' {
                end += 1;
            }
            let attr = Attr {
                name,
                value: Some(&input[value_start..end]),
            };
            Some((attr, end))
        }
    }
}

/// Parse an end tag whose `<` is at `pos`.
pub(crate) fn parse_end_tag(input: &str, pos: usize) -> Option<EndTag<'_>> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&b'<') || bytes.get(pos + 1) != Some(&b'/') {
        return None;
    }
    let name_end = scan_name(bytes, pos + 2)?;
    let close = name_end + input[name_end..].find('>')?;
    Some(EndTag {
        name: &input[pos + 2..name_end],
        end: close + 1,
    })
}

/// Parse a comment, doctype, CDATA section or processing instruction at `pos`.
///
/// Returns the offset just past the construct.
pub(crate) fn parse_markup_declaration(input: &str, pos: usize) -> Option<usize> {
    let rest = input.get(pos..)?;
    let terminator = if rest.starts_with("<!--") {
        return rest[4..].find("-->").map(|i| pos + 4 + i + 3);
    } else if rest.starts_with("<![CDATA[") {
        "]]>"
    } else if rest.starts_with("<!") || rest.starts_with("<?") {
        ">"
    } else {
        return None;
    };
    rest[2..]
        .find(terminator)
        .map(|i| pos + 2 + i + terminator.len())
}
