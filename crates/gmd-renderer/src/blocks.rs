//! Location of `gmd-md` blocks.
//!
//! A single pass over the document collects `gmd-md` start and end tags and
//! pairs them with a stack, so a nested block closes before its parent. Only
//! outermost pairs are returned; nested blocks stay inside their parent's
//! content. Opening tags without a matching close and stray closing tags are
//! ignored, which leaves them in the document as literal text. The nesting
//! limit applies to matched pairs only.

use crate::error::RenderError;
use crate::options::Limits;
use crate::tag::{parse_end_tag, parse_markup_declaration, parse_start_tag};

const BLOCK_TAG: &str = "gmd-md";

/// An outermost `<gmd-md>` span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Block<'a> {
    /// Byte offset of the opening `<`.
    pub(crate) start: usize,
    /// Byte offset just past the closing tag.
    pub(crate) end: usize,
    /// Raw attribute text of the opening tag.
    pub(crate) attr_text: &'a str,
    /// Markdown between the tags.
    pub(crate) content: &'a str,
}

impl Block<'_> {
    /// Attribute text for re-emission: a single leading space followed by the
    /// trimmed attributes, or nothing.
    pub(crate) fn attributes(&self) -> String {
        let trimmed = self.attr_text.trim();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!(" {trimmed}")
        }
    }
}

struct Open<'a> {
    start: usize,
    content_start: usize,
    attr_text: &'a str,
}

/// Find all outermost `gmd-md` blocks in document order.
pub(crate) fn find_blocks<'a>(
    input: &'a str,
    limits: &Limits,
) -> Result<Vec<Block<'a>>, RenderError> {
    let mut stack: Vec<Open<'a>> = Vec::new();
    let mut matched: Vec<Block<'a>> = Vec::new();
    let mut pos = 0;

    while let Some(offset) = input[pos..].find('<') {
        let start = pos + offset;
        pos = start + 1;

        if let Some(end) = parse_markup_declaration(input, start) {
            pos = end;
        } else if let Some(tag) = parse_end_tag(input, start) {
            pos = tag.end;
            if !tag.name.eq_ignore_ascii_case(BLOCK_TAG) {
                continue;
            }
            if let Some(open) = stack.pop() {
                matched.push(Block {
                    start: open.start,
                    end: tag.end,
                    attr_text: open.attr_text,
                    content: &input[open.content_start..start],
                });
            }
        } else if let Some(tag) = parse_start_tag(input, start) {
            pos = tag.end;
            if !tag.name.eq_ignore_ascii_case(BLOCK_TAG) {
                continue;
            }
            if tag.self_closing {
                matched.push(Block {
                    start,
                    end: tag.end,
                    attr_text: tag.attr_text,
                    content: "",
                });
                continue;
            }
            stack.push(Open {
                start,
                content_start: tag.end,
                attr_text: tag.attr_text,
            });
        }
    }

    if !stack.is_empty() {
        tracing::debug!(unclosed = stack.len(), "leaving unclosed gmd-md tags as text");
    }

    // Pairs are properly nested, so after sorting by start an outermost pair
    // is one that begins after the previous outermost pair ends.
    matched.sort_unstable_by_key(|block| block.start);
    check_nesting(&matched, limits.max_nesting_depth)?;

    let mut blocks: Vec<Block<'a>> = Vec::new();
    for block in matched {
        if blocks.last().is_some_and(|last| block.start < last.end) {
            continue;
        }
        if blocks.len() == limits.max_blocks {
            tracing::warn!(limit = limits.max_blocks, "too many gmd-md blocks");
            return Err(RenderError::TooManyBlocks {
                limit: limits.max_blocks,
            });
        }
        blocks.push(block);
    }

    Ok(blocks)
}

/// Reject matched pairs nested deeper than `limit`. `matched` is sorted by start.
fn check_nesting(matched: &[Block<'_>], limit: usize) -> Result<(), RenderError> {
    let mut ends: Vec<usize> = Vec::new();
    for block in matched {
        while ends.last().is_some_and(|&end| end <= block.start) {
            ends.pop();
        }
        ends.push(block.end);
        if ends.len() > limit {
            tracing::warn!(limit, "gmd-md nesting too deep");
            return Err(RenderError::NestingTooDeep { limit });
        }
    }
    Ok(())
}
