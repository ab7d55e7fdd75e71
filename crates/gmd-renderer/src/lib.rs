//! Gravitee Markdown (GMD) renderer.
//!
//! Renders documents that mix HTML markup, `gmd-*` custom elements and
//! CommonMark/GFM markdown into HTML.
//!
//! # Architecture
//!
//! [`GmdRenderer::render`] runs a fixed pipeline:
//!
//! 1. Self-closing form components (`<gmd-input ... />`) are expanded into
//!    explicit open/close pairs ([`normalize_self_closing`]).
//! 2. Every `<gmd-md>` block is dedented ([`normalize_indentation`]) and
//!    rendered on its own, then spliced back with its attributes intact
//!    ([`GmdRenderer::preprocess_gmd_blocks`]).
//! 3. Markup is re-serialized the way an HTML5 fragment serializer would
//!    ([`normalize_fragment`]) and line-leading `&gt;` is restored to `>`.
//! 4. The result goes through pulldown-cmark and an HTML writer that assigns
//!    GitHub-style heading ids and applies the link rules ([`LinkKind`]).
//!    Lines that begin with a `gmd-*` start tag pass through as raw HTML
//!    instead of being wrapped in a paragraph.
//!
//! Each [`GmdRenderer`] owns its [`RendererOptions`]; nothing is configured
//! globally, so renderers with different options can be used side by side.
//!
//! The renderer performs no sanitization. Output built from untrusted input
//! must go through an HTML sanitizer before it reaches a browser.
//!
//! # Example
//!
//! ```
//! use gmd_renderer::GmdRenderer;
//!
//! let renderer = GmdRenderer::default();
//! let html = renderer.render("# Hello World").unwrap();
//! assert_eq!(html, "<h1 id=\"hello-world\">Hello World</h1>\n");
//!
//! let html = renderer
//!     .render("<gmd-md class=\"intro\">\n  **Welcome**\n</gmd-md>")
//!     .unwrap();
//! assert!(html.contains("<gmd-md class=\"intro\"><p><strong>Welcome</strong></p>"));
//! ```

mod autolink;
mod blocks;
mod component_lines;
mod error;
mod fence;
mod fragment;
mod indent;
mod links;
mod options;
mod placeholders;
mod renderer;
mod self_closing;
mod slug;
mod state;
mod tag;
mod util;
mod writer;

pub use error::RenderError;
pub use fragment::{decode_quote_markers, normalize_fragment};
pub use indent::normalize_indentation;
pub use links::LinkKind;
pub use options::{DEFAULT_FORM_COMPONENTS, HeadingIds, Limits, LinkRules, RendererOptions};
pub use renderer::GmdRenderer;
pub use self_closing::normalize_self_closing;
pub use slug::{Slugger, slugify};
pub use state::{TocEntry, escape_href, escape_html};
pub use writer::{HtmlWriter, RenderOutput};
