//! Insertion of new marker pairs around the selection.

use crate::host::{EditingHost, selected_html};
use crate::syntax::{NBSP, render_template};

/// A decorated marker pair with its content, ready to splice into a buffer.
///
/// Rendered from the shared template, so it always carries a non-breaking
/// space on each outer edge for the cursor to land outside the pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedFragment {
    code: String,
    content: String,
}

impl TaggedFragment {
    pub fn new(code: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            content: content.into(),
        }
    }

    /// Build the fragment for a selection.
    ///
    /// An empty selection (no text, even if it has markup) gets a `&nbsp;`
    /// placeholder, otherwise the cursor could never be placed between the
    /// two markers.
    pub fn for_selection(code: impl Into<String>, html: &str, text: &str) -> Self {
        let content = if text.is_empty() { NBSP } else { html };
        Self::new(code, content)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn to_html(&self) -> String {
        render_template(&self.code, &self.content)
    }
}

/// Wrap the host's selection in a marker pair for `code` and mark the host
/// dirty. The code is not checked against any language list.
pub fn insert_tag<H: EditingHost + ?Sized>(host: &mut H, code: &str) -> TaggedFragment {
    let html = selected_html(host);
    let text = host.selection_text();
    let fragment = TaggedFragment::for_selection(code, &html, &text);

    log::debug!(
        "inserting {code} marker pair around {} byte(s) of content",
        fragment.content().len()
    );
    host.insert_at_focus(&fragment.to_html());
    host.mark_dirty();

    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn non_empty_selection_is_wrapped() {
        let fragment = TaggedFragment::for_selection("es", "Hola", "Hola");
        assert_eq!(
            fragment.to_html(),
            r#"&nbsp;<span class="filter-multilang-tag">{mlang es}</span>Hola<span class="filter-multilang-tag">{mlang}</span>&nbsp;"#
        );
    }

    #[test]
    fn empty_selection_gets_placeholder() {
        let fragment = TaggedFragment::for_selection("en", "", "");
        assert_eq!(fragment.content(), "&nbsp;");
        assert_eq!(
            fragment.to_html(),
            r#"&nbsp;<span class="filter-multilang-tag">{mlang en}</span>&nbsp;<span class="filter-multilang-tag">{mlang}</span>&nbsp;"#
        );
    }

    #[test]
    fn markup_without_text_counts_as_empty() {
        let fragment = TaggedFragment::for_selection("en", "<br>", "");
        assert_eq!(fragment.content(), "&nbsp;");
    }

    #[test]
    fn selection_markup_is_kept() {
        let fragment = TaggedFragment::for_selection("fr", "<em>Salut</em>", "Salut");
        assert_eq!(fragment.content(), "<em>Salut</em>");
        assert_eq!(fragment.code(), "fr");
    }
}
