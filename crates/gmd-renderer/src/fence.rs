//! Fenced code block tracking.
//!
//! Markup inside fenced code is literal text, so the fragment normalizer
//! consults a [`FenceTracker`] line by line and copies fenced lines verbatim.

/// Tracks code fence state during line-by-line scanning.
///
/// A fence opens with three or more backticks or tildes indented by at most
/// three spaces. It closes on a line of the same character that is at least as
/// long as the opening run, followed only by whitespace.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    /// Fence character and length of the open fence.
    open: Option<(u8, usize)>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line (without its terminator).
    ///
    /// Returns `true` if the line belongs to fenced code, fence markers
    /// included.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let Some(marker) = fence_marker(line) else {
            return self.in_fence();
        };
        match self.open {
            Some((ch, len)) => {
                if marker.ch == ch && marker.len >= len && marker.rest.trim().is_empty() {
                    self.open = None;
                }
            }
            None => {
                // Backtick fences may not carry backticks in their info string.
                if marker.ch == b'`' && marker.rest.contains('`') {
                    return false;
                }
                self.open = Some((marker.ch, marker.len));
            }
        }
        true
    }
}

struct FenceMarker<'a> {
    ch: u8,
    len: usize,
    rest: &'a str,
}

fn fence_marker(line: &str) -> Option<FenceMarker<'_>> {
    let indent = line.bytes().take_while(|&b| b == b' ').count();
    if indent > 3 {
        return None;
    }
    let trimmed = &line[indent..];
    let ch = *trimmed.as_bytes().first()?;
    if ch != b'`' && ch != b'~' {
        return None;
    }
    let len = trimmed.bytes().take_while(|&b| b == ch).count();
    (len >= 3).then(|| FenceMarker {
        ch,
        len,
        rest: &trimmed[len..],
    })
}
