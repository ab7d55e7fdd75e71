//! Renderer configuration.
//!
//! All knobs live on [`RendererOptions`], owned by each
//! [`GmdRenderer`](crate::GmdRenderer). With the `serde` feature enabled the
//! structs deserialize from configuration files; missing fields fall back to
//! their defaults.

/// Form components whose self-closing syntax is expanded by default.
pub const DEFAULT_FORM_COMPONENTS: [&str; 5] = ["input", "textarea", "select", "checkbox", "radio"];

/// Options for a [`GmdRenderer`](crate::GmdRenderer).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct RendererOptions {
    /// Enable GitHub Flavored Markdown (tables, strikethrough, task lists, autolinks).
    pub gfm: bool,
    /// Render single newlines inside paragraphs as `<br>`.
    pub breaks: bool,
    /// Heading id strategy.
    pub heading_ids: HeadingIds,
    /// Turn bare `https://`, `http://` and `www.` URLs into links (requires `gfm`).
    pub autolinks: bool,
    /// Re-serialize markup before markdown parsing, see [`normalize_fragment`](crate::normalize_fragment).
    pub html_roundtrip: bool,
    /// Component names (without the `gmd-` prefix) whose `<gmd-x ... />` form
    /// is expanded to `<gmd-x ...></gmd-x>`.
    pub form_components: Vec<String>,
    /// Link rewriting rules.
    pub links: LinkRules,
    /// Resource limits.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub limits: Limits,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            breaks: true,
            heading_ids: HeadingIds::default(),
            autolinks: true,
            html_roundtrip: true,
            form_components: DEFAULT_FORM_COMPONENTS
                .iter()
                .map(|name| (*name).to_owned())
                .collect(),
            links: LinkRules::default(),
            limits: Limits::default(),
        }
    }
}

/// How heading ids are assigned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub enum HeadingIds {
    /// GitHub-style slugs, duplicates suffixed with `-1`, `-2`, ...
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "github"))]
    Github,
    /// Headings are rendered without an `id` attribute.
    #[cfg_attr(feature = "serde", serde(rename = "none"))]
    Disabled,
}

/// Link rewriting rules, see [`LinkKind`](crate::LinkKind).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct LinkRules {
    /// Class added to in-page anchor links (`#section`).
    pub anchor_class: String,
    /// Prefix of legacy hash-bang router links. The prefix without its
    /// trailing slash is stripped from matching hrefs.
    pub legacy_prefix: String,
}

impl Default for LinkRules {
    fn default() -> Self {
        Self {
            anchor_class: "anchor".to_owned(),
            legacy_prefix: "/#!/".to_owned(),
        }
    }
}

/// Bounds applied to every render call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct Limits {
    /// Maximum input size in bytes.
    pub max_input_bytes: usize,
    /// Maximum number of top-level `gmd-md` blocks in a document.
    pub max_blocks: usize,
    /// Maximum nesting depth of `gmd-md` tags.
    pub max_nesting_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_bytes: 4 * 1024 * 1024,
            max_blocks: 10_000,
            max_nesting_depth: 32,
        }
    }
}
