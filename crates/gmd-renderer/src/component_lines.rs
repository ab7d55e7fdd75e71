//! Raw passthrough for lines that start with a `gmd-*` component tag.
//!
//! CommonMark only opens an HTML block on a line holding a lone tag, so a line
//! such as `<gmd-input name="a"></gmd-input>` would otherwise become paragraph
//! text. [`ComponentLines`] lifts those lines out of their paragraph and emits
//! them as raw HTML, splitting the paragraph around them.

use std::collections::VecDeque;
use std::ops::Range;

use pulldown_cmark::{Event, Tag, TagEnd};

use crate::tag::parse_start_tag;

const COMPONENT_PREFIX: &str = "gmd-";

type Spanned<'a> = (Event<'a>, Range<usize>);

/// Iterator adapter over pulldown-cmark offset events.
///
/// Events outside paragraphs pass through unchanged. A paragraph is buffered
/// up to its end and split into lines at top-level breaks; each line that
/// begins with a complete `gmd-*` start tag is replaced by its source text as
/// `Event::Html`.
pub(crate) struct ComponentLines<'a, I> {
    iter: I,
    source: &'a str,
    pending: VecDeque<Event<'a>>,
}

impl<'a, I> ComponentLines<'a, I>
where
    I: Iterator<Item = Spanned<'a>>,
{
    pub(crate) fn new(iter: I, source: &'a str) -> Self {
        Self {
            iter,
            source,
            pending: VecDeque::new(),
        }
    }

    /// Buffer the rest of a paragraph and queue its rewritten events.
    fn paragraph(&mut self) {
        let mut lines: Vec<Vec<Spanned<'a>>> = vec![Vec::new()];
        let mut breaks = Vec::new();
        let mut depth = 0usize;

        for (event, range) in self.iter.by_ref() {
            if matches!(event, Event::End(TagEnd::Paragraph)) {
                break;
            }
            if depth == 0 && matches!(event, Event::SoftBreak | Event::HardBreak) {
                breaks.push(event);
                lines.push(Vec::new());
                continue;
            }
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth = depth.saturating_sub(1),
                _ => {}
            }
            if let Some(line) = lines.last_mut() {
                line.push((event, range));
            }
        }

        let last = lines.len() - 1;
        let mut breaks = breaks.into_iter();
        let mut open = false;
        for (index, line) in lines.into_iter().enumerate() {
            let separator = if index > 0 { breaks.next() } else { None };
            if let Some(raw) = self.component_line(&line, index == last) {
                if open {
                    self.pending.push_back(Event::End(TagEnd::Paragraph));
                    open = false;
                }
                self.pending.push_back(Event::Html(raw.into()));
                continue;
            }
            if open {
                self.pending.extend(separator);
            } else {
                self.pending.push_back(Event::Start(Tag::Paragraph));
                open = true;
            }
            self.pending.extend(line.into_iter().map(|(event, _)| event));
        }
        if open {
            self.pending.push_back(Event::End(TagEnd::Paragraph));
        }
    }

    /// Source text of `line` if it starts with a `gmd-*` start tag.
    fn component_line(&self, line: &[Spanned<'a>], is_last: bool) -> Option<String> {
        let (Event::InlineHtml(html), first) = line.first()? else {
            return None;
        };
        let tag = parse_start_tag(html, 0)?;
        let is_component = tag
            .name
            .get(..COMPONENT_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(COMPONENT_PREFIX));
        if tag.end != html.len() || !is_component {
            return None;
        }

        let end = line.last().map_or(first.end, |(_, range)| range.end);
        let mut raw = self.source[first.start..end].to_owned();
        let rest = &self.source[end..];
        if !is_last || rest.find('\n').is_some_and(|i| rest[..i].trim().is_empty()) {
            raw.push('\n');
        }
        Some(raw)
    }
}

impl<'a, I> Iterator for ComponentLines<'a, I>
where
    I: Iterator<Item = Spanned<'a>>,
{
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        let (event, _) = self.iter.next()?;
        if matches!(event, Event::Start(Tag::Paragraph)) {
            self.paragraph();
            return self.pending.pop_front();
        }
        Some(event)
    }
}
