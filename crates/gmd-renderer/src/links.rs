//! Link classification and rewriting.

use crate::options::LinkRules;
use crate::state::{escape_href, push_escaped};

/// How a link is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// In-page link (`#section`), rendered with the anchor class.
    Anchor,
    /// Legacy hash-bang application route (`/#!/path`), rewritten to `/path`.
    AppInternal,
    /// Any other link, rendered unchanged.
    External,
}

impl LinkKind {
    /// Classify `href`. Rules are checked in order: anchor, legacy route,
    /// everything else.
    ///
    /// # Example
    ///
    /// ```
    /// use gmd_renderer::{LinkKind, LinkRules};
    ///
    /// let rules = LinkRules::default();
    /// assert_eq!(LinkKind::classify("#intro", &rules), LinkKind::Anchor);
    /// assert_eq!(LinkKind::classify("/#!/apis", &rules), LinkKind::AppInternal);
    /// assert_eq!(LinkKind::classify("https://gravitee.io", &rules), LinkKind::External);
    /// ```
    #[must_use]
    pub fn classify(href: &str, rules: &LinkRules) -> Self {
        if href.starts_with('#') {
            Self::Anchor
        } else if !rules.legacy_prefix.is_empty() && href.starts_with(&rules.legacy_prefix) {
            Self::AppInternal
        } else {
            Self::External
        }
    }
}

/// Href after applying the rule for `kind`.
///
/// Legacy routes lose their prefix except for its trailing slash, so
/// `/#!/apis` becomes `/apis`.
pub(crate) fn rewrite_href<'a>(href: &'a str, kind: LinkKind, rules: &LinkRules) -> &'a str {
    match kind {
        LinkKind::AppInternal => {
            let strip = rules.legacy_prefix.trim_end_matches('/').len();
            &href[strip..]
        }
        LinkKind::Anchor | LinkKind::External => href,
    }
}

/// Write the opening `<a>` tag for a link.
pub(crate) fn write_link_open(out: &mut String, href: &str, title: &str, rules: &LinkRules) {
    let kind = LinkKind::classify(href, rules);
    let href = escape_href(rewrite_href(href, kind, rules));

    out.push_str("<a ");
    if kind == LinkKind::Anchor {
        out.push_str("class=\"");
        push_escaped(out, &rules.anchor_class);
        out.push_str("\" ");
    }
    out.push_str("href=\"");
    out.push_str(&href);
    out.push('"');
    if kind != LinkKind::Anchor && !title.is_empty() {
        out.push_str(" title=\"");
        push_escaped(out, title);
        out.push('"');
    }
    out.push('>');
}
