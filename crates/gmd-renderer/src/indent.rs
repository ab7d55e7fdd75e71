//! Common indentation removal for `gmd-md` block content.

/// Remove the common leading indentation from every line.
///
/// The minimum number of leading spaces and tabs is taken over non-blank
/// lines, each tab counting as one character. That many characters are then
/// removed from each line; blank lines only lose whitespace. Line terminators
/// (`\n` or `\r\n`) are preserved.
///
/// # Example
///
/// ```
/// use gmd_renderer::normalize_indentation;
///
/// let text = "    # Title\n\n    Text\n        code";
/// assert_eq!(normalize_indentation(text), "# Title\n\nText\n    code");
/// ```
#[must_use]
pub fn normalize_indentation(text: &str) -> String {
    let min_indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(leading_whitespace)
        .min()
        .unwrap_or(0);

    if min_indent == 0 {
        return text.to_owned();
    }

    text.split_inclusive('\n')
        .map(|line| &line[leading_whitespace(line).min(min_indent)..])
        .collect()
}

fn leading_whitespace(line: &str) -> usize {
    line.bytes()
        .take_while(|b| matches!(b, b' ' | b'\t'))
        .count()
}
