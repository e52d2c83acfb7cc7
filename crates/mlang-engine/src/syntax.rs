//! # Marker Syntax
//!
//! Shared, read-only definitions of the `{mlang CODE}…{mlang}` marker format
//! and of the visual container used to decorate markers while editing.
//!
//! The marker format is a contract with the downstream filter that reads
//! persisted content, so the textual forms here must never drift.

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// Class carried by the visual container around a decorated marker.
pub const TAG_CLASS: &str = "filter-multilang-tag";

/// Opening tag of the visual container.
pub const OPENING_SPAN: &str = r#"<span class="filter-multilang-tag">"#;

/// Closing tag of the visual container.
pub const CLOSING_SPAN: &str = "</span>";

/// Literal prefix shared by opening and closing markers.
pub const MARKER_OPEN_TOKEN: &str = "{mlang";

/// The closing marker.
pub const CLOSING_MARKER: &str = "{mlang}";

/// Placeholder used around fragments and for empty selections.
pub const NBSP: &str = "&nbsp;";

/// Substitution point for the language code in [`TEMPLATE`].
pub const LANG_WILDCARD: &str = "%lang";

/// Substitution point for the wrapped content in [`TEMPLATE`].
pub const CONTENT_WILDCARD: &str = "%content";

/// Template for a freshly inserted, already decorated marker pair.
pub const TEMPLATE: &str = concat!(
    "&nbsp;",
    r#"<span class="filter-multilang-tag">"#,
    "{mlang %lang}</span>",
    "%content",
    r#"<span class="filter-multilang-tag">"#,
    "{mlang}</span>&nbsp;",
);

/// Bare marker: `{mlang` up to the nearest `}` on the same line.
const MARKER_PATTERN: &str = r"\{mlang[^}\n]*\}";

/// Any opening or closing `span` tag.
const SPAN_TAG_PATTERN: &str = r"</?span\b[^>]*>";

/// Regex matching a single bare marker.
pub(crate) fn marker_regex() -> &'static Regex {
    static MARKER_REGEX: OnceLock<Regex> = OnceLock::new();
    MARKER_REGEX.get_or_init(|| Regex::new(MARKER_PATTERN).expect("Invalid marker regex"))
}

/// Regex matching either a marker that already sits at the start of a
/// container (group `decorated`) or a bare one (group `bare`). Decorated is
/// tried first so a wrapped marker is consumed as a whole and never wrapped
/// again, whatever was typed after it inside the container.
pub(crate) fn decoration_regex() -> &'static Regex {
    static DECORATION_REGEX: OnceLock<Regex> = OnceLock::new();
    DECORATION_REGEX.get_or_init(|| {
        let pattern = format!(
            "(?P<decorated>{open}{marker})|(?P<bare>{marker})",
            open = regex::escape(OPENING_SPAN),
            marker = MARKER_PATTERN,
        );
        Regex::new(&pattern).expect("Invalid decoration regex")
    })
}

/// Regex matching a single `<span ...>` or `</span>` tag.
pub(crate) fn span_tag_regex() -> &'static Regex {
    static SPAN_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    SPAN_TAG_REGEX.get_or_init(|| Regex::new(SPAN_TAG_PATTERN).expect("Invalid span tag regex"))
}

/// A single language marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// `{mlang CODE}`. The code is opaque and never validated.
    Open { code: String },
    /// `{mlang}`
    Close,
}

impl Marker {
    /// Parse the exact text of one marker.
    ///
    /// Returns `None` unless `text` is a whole marker, `{mlang` through `}`.
    pub fn parse(text: &str) -> Option<Marker> {
        let rest = text.strip_prefix(MARKER_OPEN_TOKEN)?.strip_suffix('}')?;
        if rest.contains('}') || rest.contains('\n') {
            return None;
        }

        let code = rest.trim();
        if code.is_empty() {
            Some(Marker::Close)
        } else {
            Some(Marker::Open {
                code: code.to_string(),
            })
        }
    }

    pub fn open(code: impl Into<String>) -> Marker {
        Marker::Open { code: code.into() }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Marker::Open { .. })
    }

    /// The language code of an opening marker.
    pub fn code(&self) -> Option<&str> {
        match self {
            Marker::Open { code } => Some(code),
            Marker::Close => None,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Open { code } => write!(f, "{MARKER_OPEN_TOKEN} {code}}}"),
            Marker::Close => f.write_str(CLOSING_MARKER),
        }
    }
}

/// A marker found in a buffer, with its byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    pub range: Range<usize>,
    /// The marker exactly as written in the buffer.
    pub text: String,
    pub marker: Marker,
}

/// Find every non-overlapping marker occurrence, in document order.
pub fn scan_markers(text: &str) -> Vec<MarkerMatch> {
    marker_regex()
        .find_iter(text)
        .filter_map(|m| {
            Marker::parse(m.as_str()).map(|marker| MarkerMatch {
                range: m.range(),
                text: m.as_str().to_string(),
                marker,
            })
        })
        .collect()
}

/// Count literal `{mlang` tokens, whether or not they close.
pub fn count_open_tokens(text: &str) -> usize {
    text.matches(MARKER_OPEN_TOKEN).count()
}

/// Wrap a single marker in the visual container.
pub fn decorate_marker(marker: &str) -> String {
    format!("{OPENING_SPAN}{marker}{CLOSING_SPAN}")
}

/// Render [`TEMPLATE`] with both wildcards substituted in one pass.
///
/// Substituted values are never rescanned, so a code or content containing
/// `%lang` or `%content` comes through verbatim.
pub fn render_template(lang: &str, content: &str) -> String {
    let mut out = String::with_capacity(TEMPLATE.len() + lang.len() + content.len());
    let mut rest = TEMPLATE;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix(LANG_WILDCARD) {
            out.push_str(lang);
            rest = after;
        } else if let Some(after) = rest.strip_prefix(CONTENT_WILDCARD) {
            out.push_str(content);
            rest = after;
        } else {
            // A lone '%' that starts no wildcard is copied as one byte.
            let next = match rest.find('%') {
                Some(0) => 1,
                Some(i) => i,
                None => rest.len(),
            };
            out.push_str(&rest[..next]);
            rest = &rest[next..];
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("{mlang en}", Some(Marker::open("en")))]
    #[case("{mlang es_mx}", Some(Marker::open("es_mx")))]
    #[case("{mlang  other }", Some(Marker::open("other")))]
    #[case("{mlang}", Some(Marker::Close))]
    #[case("{mlang }", Some(Marker::Close))]
    #[case("{mlang en", None)]
    #[case("mlang en}", None)]
    #[case("{mlang en} trailing", None)]
    #[case("", None)]
    fn parse_markers(#[case] input: &str, #[case] expected: Option<Marker>) {
        assert_eq!(Marker::parse(input), expected);
    }

    #[test]
    fn display_round_trips_canonical_markers() {
        assert_eq!(Marker::open("en").to_string(), "{mlang en}");
        assert_eq!(Marker::Close.to_string(), "{mlang}");
        assert_eq!(Marker::parse("{mlang fr}").unwrap().to_string(), "{mlang fr}");
    }

    #[test]
    fn scan_finds_markers_in_order() {
        let text = "Hello {mlang en}World{mlang} {mlang es}Mundo{mlang}";
        let found = scan_markers(text);

        assert_eq!(found.len(), 4);
        assert_eq!(found[0].marker, Marker::open("en"));
        assert_eq!(found[0].range, 6..16);
        assert_eq!(&text[found[0].range.clone()], "{mlang en}");
        assert_eq!(found[1].marker, Marker::Close);
        assert_eq!(found[2].marker, Marker::open("es"));
        assert_eq!(found[3].text, "{mlang}");
    }

    #[test]
    fn scan_does_not_cross_lines() {
        assert!(scan_markers("{mlang en\n}").is_empty());
    }

    #[test]
    fn scan_stops_at_nearest_brace() {
        let found = scan_markers("{mlang es}Hola</span> {mlang}");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].text, "{mlang es}");
    }

    #[test]
    fn span_tags_are_found_in_order() {
        let tags: Vec<&str> = span_tag_regex()
            .find_iter(r#"<p><span class="x">a</span><spanner></p>"#)
            .map(|m| m.as_str())
            .collect();
        assert_eq!(tags, vec![r#"<span class="x">"#, "</span>"]);
    }

    #[test]
    fn scan_empty_text() {
        assert!(scan_markers("").is_empty());
        assert!(scan_markers("no markers at all").is_empty());
    }

    #[test]
    fn count_open_tokens_counts_unclosed_too() {
        assert_eq!(count_open_tokens("prefix {mlang en} suffix"), 1);
        assert_eq!(count_open_tokens("{mlang en}x{mlang}"), 2);
        assert_eq!(count_open_tokens("{mlang"), 1);
        assert_eq!(count_open_tokens("plain"), 0);
    }

    #[test]
    fn template_renders_both_slots() {
        assert_eq!(
            render_template("es", "Hola"),
            r#"&nbsp;<span class="filter-multilang-tag">{mlang es}</span>Hola<span class="filter-multilang-tag">{mlang}</span>&nbsp;"#
        );
    }

    #[test]
    fn template_substitution_is_single_pass() {
        let rendered = render_template("%content", "100%lang");
        assert!(rendered.contains("{mlang %content}"));
        assert!(rendered.contains("</span>100%lang<span"));
    }

    #[test]
    fn template_constant_uses_shared_span() {
        assert!(TEMPLATE.starts_with(NBSP));
        assert!(TEMPLATE.ends_with(NBSP));
        assert_eq!(TEMPLATE.matches(OPENING_SPAN).count(), 2);
        assert!(OPENING_SPAN.contains(TAG_CLASS));
    }

    #[test]
    fn decorate_marker_wraps_in_container() {
        assert_eq!(
            decorate_marker("{mlang}"),
            r#"<span class="filter-multilang-tag">{mlang}</span>"#
        );
    }
}
