//! GFM extended autolinks.
//!
//! Finds bare `http://`, `https://`, `ftp://` and `www.` URLs and email
//! addresses in text. A candidate must start the text or follow whitespace or
//! one of `*`, `_`, `~`, `(`. Trailing punctuation and unbalanced parentheses
//! are not part of a URL.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|[\s*_~(])((?:(?:https?|ftp)://|www\.)[A-Za-z0-9-][^\s<]*|[A-Za-z0-9._+-]+@[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]*[A-Za-z0-9])+)",
    )
    .unwrap()
});

/// A link found in text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Autolink {
    /// Byte range of the link text.
    pub(crate) range: Range<usize>,
    /// Link target.
    pub(crate) href: String,
}

/// Find autolinks in `text`, in order.
pub(crate) fn find_autolinks(text: &str) -> Vec<Autolink> {
    AUTOLINK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(1)?;
            let candidate = m.as_str();
            let is_email = candidate.contains('@')
                && !candidate.contains("://")
                && !candidate.starts_with("www.");
            if is_email {
                // Addresses followed by `-` or `_` are not links.
                if text[m.end()..].starts_with(['-', '_']) {
                    return None;
                }
                return Some(Autolink {
                    range: m.range(),
                    href: format!("mailto:{candidate}"),
                });
            }

            let url = trim_url(candidate);
            let href = if url.starts_with("www.") {
                format!("http://{url}")
            } else {
                url.to_owned()
            };
            Some(Autolink {
                range: m.start()..m.start() + url.len(),
                href,
            })
        })
        .collect()
}

/// Drop trailing punctuation, unbalanced parentheses and a trailing entity
/// reference from a URL candidate.
fn trim_url(url: &str) -> &str {
    const PUNCTUATION: &[u8] = b"?!.,:;*_'\"~)";

    let bytes = url.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => match url[i + 1..].find(')') {
                Some(close) => i += close + 2,
                None => break,
            },
            b'&' => {
                if is_trailing_entity(&url[i..]) {
                    break;
                }
                i += 1;
            }
            b if PUNCTUATION.contains(&b) => {
                let run = bytes[i..]
                    .iter()
                    .take_while(|b| PUNCTUATION.contains(b))
                    .count();
                if i + run == bytes.len() {
                    break;
                }
                i += run;
            }
            _ => i += 1,
        }
    }
    // Only ASCII bytes stop the scan, so `i` is a char boundary.
    &url[..i]
}

/// Check for `&name;` running to the end of `s`.
fn is_trailing_entity(s: &str) -> bool {
    s.strip_prefix('&')
        .and_then(|rest| rest.strip_suffix(';'))
        .is_some_and(|name| !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric()))
}
