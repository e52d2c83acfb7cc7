use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The language attribute is not a JSON object of code to label.
    #[error("Malformed language mapping: {source}")]
    MalformedLanguages {
        #[source]
        source: serde_json::Error,
    },

    /// A node was expected to hold exactly one marker-open token.
    #[error("Expected exactly one marker in the selected text node, found {found}")]
    MarkerCountMismatch { found: usize },

    /// Only text nodes can be expanded to cover a marker.
    #[error("Selection anchor is not a text node")]
    NotATextNode,

    #[error("Document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
