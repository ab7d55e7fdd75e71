//! GitHub-style heading slugs.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Characters removed from slugs: everything except letters, marks, numbers,
/// connector punctuation, spaces and hyphens.
static STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{M}\p{N}\p{Pc} -]").unwrap());

/// Convert heading text to a URL fragment.
///
/// Lowercases the text, strips punctuation and symbols, and turns each space
/// into a hyphen. Runs of spaces are not collapsed, matching GitHub anchors.
///
/// # Example
///
/// ```
/// use gmd_renderer::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Heading with @#$%^&*() characters"), "heading-with--characters");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    STRIP_RE
        .replace_all(&text.to_lowercase(), "")
        .replace(' ', "-")
}

/// Generates unique slugs within one document.
///
/// Repeated slugs get a numeric suffix: `intro`, `intro-1`, `intro-2`. A
/// suffixed slug is itself reserved, so a later heading literally named
/// `Intro 1` becomes `intro-1-1`.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug for `text`, unique among the slugs returned so far.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        while self.occurrences.contains_key(&slug) {
            let count = self.occurrences.entry(base.clone()).or_default();
            *count += 1;
            slug = format!("{base}-{count}");
        }
        self.occurrences.insert(slug.clone(), 0);
        slug
    }
}
