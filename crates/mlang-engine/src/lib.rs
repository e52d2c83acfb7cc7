pub mod document;
pub mod error;
pub mod host;
pub mod insert;
pub mod languages;
pub mod normalize;
pub mod plugin;
pub mod syntax;
pub mod transform;

// Re-export key types for easier usage
pub use document::Document;
pub use error::EngineError;
pub use host::{EditingHost, HostNode, NodeKind, selected_html};
pub use insert::{TaggedFragment, insert_tag};
pub use languages::{DEFAULT_LANGUAGES_JSON, Language, LanguageList, MenuEntry, menu_entries};
pub use normalize::{NormalizeOutcome, expand_to_marker_node, normalize_selection};
pub use plugin::{Disposition, EditorSession, HostEvent, MultilangPlugin, SubmitQueue};
pub use syntax::{Marker, MarkerMatch, count_open_tokens, scan_markers};
pub use transform::{clean, decorate, is_decorated};
