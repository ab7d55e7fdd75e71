//! Expansion of self-closing `gmd-*` form components.

use crate::tag::parse_start_tag;

const PREFIX: &str = "gmd-";

/// Rewrite `<gmd-{name} ... />` into `<gmd-{name} ...></gmd-{name}>` for the
/// given component names.
///
/// Names are matched ASCII case-insensitively against the part after `gmd-`.
/// The attribute text is kept as written, minus trailing whitespace. Other
/// tags, including unlisted `gmd-*` components, are copied unchanged.
///
/// # Example
///
/// ```
/// use gmd_renderer::normalize_self_closing;
///
/// let html = normalize_self_closing(r#"<gmd-input name="email" />"#, &["input"]);
/// assert_eq!(html, r#"<gmd-input name="email"></gmd-input>"#);
/// ```
#[must_use]
pub fn normalize_self_closing<S: AsRef<str>>(html: &str, names: &[S]) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(offset) = html[pos..].find('<') {
        let start = pos + offset;
        out.push_str(&html[pos..start]);

        let Some(tag) = parse_start_tag(html, start) else {
            out.push('<');
            pos = start + 1;
            continue;
        };

        let component = tag
            .name
            .get(..PREFIX.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(PREFIX))
            .map(|_| &tag.name[PREFIX.len()..]);
        let listed = component.is_some_and(|component| {
            names
                .iter()
                .any(|name| name.as_ref().eq_ignore_ascii_case(component))
        });

        if tag.self_closing && listed {
            out.push('<');
            out.push_str(tag.name);
            out.push_str(tag.attr_text.trim_end());
            out.push_str("></");
            out.push_str(tag.name);
            out.push('>');
        } else {
            out.push_str(&html[start..tag.end]);
        }
        pos = tag.end;
    }

    out.push_str(&html[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::options::DEFAULT_FORM_COMPONENTS;

    fn normalize(html: &str) -> String {
        normalize_self_closing(html, &DEFAULT_FORM_COMPONENTS)
    }

    #[test]
    fn test_expands_form_components() {
        assert_eq!(
            normalize(r#"<gmd-input name="a" required />"#),
            r#"<gmd-input name="a" required></gmd-input>"#
        );
        assert_eq!(
            normalize("<gmd-textarea rows=\"3\"/>"),
            "<gmd-textarea rows=\"3\"></gmd-textarea>"
        );
        assert_eq!(normalize("<gmd-radio/>"), "<gmd-radio></gmd-radio>");
    }

    #[test]
    fn test_case_insensitive_name() {
        assert_eq!(
            normalize("<GMD-Select label=\"x\" />"),
            "<GMD-Select label=\"x\"></GMD-Select>"
        );
    }

    #[test]
    fn test_unlisted_components_untouched() {
        let html = r#"<gmd-button label="Go" /><gmd-inputs /><input />"#;
        assert_eq!(normalize(html), html);
    }

    #[test]
    fn test_open_tag_untouched() {
        let html = "<gmd-input name=\"a\"></gmd-input>";
        assert_eq!(normalize(html), html);
    }

    #[test]
    fn test_does_not_cross_into_next_tag() {
        assert_eq!(
            normalize("<gmd-input name=\"a\"><gmd-checkbox label=\"b\" />"),
            "<gmd-input name=\"a\"><gmd-checkbox label=\"b\"></gmd-checkbox>"
        );
    }

    #[test]
    fn test_quoted_slash_gt() {
        assert_eq!(
            normalize(r#"<gmd-input placeholder="a/>b" />"#),
            r#"<gmd-input placeholder="a/>b"></gmd-input>"#
        );
    }

    #[test]
    fn test_multiline_attributes() {
        assert_eq!(
            normalize("<gmd-input\n  name=\"a\"\n  label=\"A\"\n/>"),
            "<gmd-input\n  name=\"a\"\n  label=\"A\"></gmd-input>"
        );
    }

    #[test]
    fn test_idempotent() {
        let html = "Text <gmd-input name=\"a\" /> and <gmd-select/> < end";
        let once = normalize(html);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_custom_names() {
        assert_eq!(
            normalize_self_closing("<gmd-slider /><gmd-input />", &["slider"]),
            "<gmd-slider></gmd-slider><gmd-input />"
        );
    }
}
