//! Capability interface of the editing surface the engine runs inside.
//!
//! The engine never touches a concrete editor. Everything it needs from the
//! host (buffer access, selection inspection and replacement, dirty
//! notification, resubmission) goes through [`EditingHost`], so a test double
//! or the in-memory [`crate::Document`] can stand in for a real editor.

use std::ops::Range;

/// Kind of node that contains the selection anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Element,
}

/// The node containing the selection anchor, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostNode {
    pub kind: NodeKind,
    /// Text content of the node (entities decoded).
    pub text: String,
    /// Byte range of the node in the host buffer. Selecting this range
    /// selects the whole node.
    pub range: Range<usize>,
}

impl HostNode {
    pub fn text(text: impl Into<String>, range: Range<usize>) -> Self {
        Self {
            kind: NodeKind::Text,
            text: text.into(),
            range,
        }
    }

    pub fn element(text: impl Into<String>, range: Range<usize>) -> Self {
        Self {
            kind: NodeKind::Element,
            text: text.into(),
            range,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }
}

pub trait EditingHost {
    /// Current editable buffer as markup.
    fn content(&self) -> String;

    /// Replace the editable buffer.
    fn set_content(&mut self, html: &str);

    /// Plain text of the current selection; empty when collapsed.
    fn selection_text(&self) -> String;

    /// Markup of the current selection through the host's selection API.
    ///
    /// `None` when that API is unavailable.
    fn selection_html(&self) -> Option<String>;

    /// Markup of the current selection through an older selection API.
    fn legacy_selection_html(&self) -> Option<String> {
        None
    }

    /// Insert markup at the focus point, replacing the selection.
    fn insert_at_focus(&mut self, fragment: &str);

    /// Node containing the selection anchor, if there is a selection at all.
    fn selection_anchor_node(&self) -> Option<HostNode>;

    /// Replace the current selection.
    fn set_selection(&mut self, range: Range<usize>);

    /// Tell the host its content changed outside its own input handling.
    fn mark_dirty(&mut self);

    /// Re-issue the submission whose default action was prevented.
    fn resubmit(&mut self);
}

/// Markup of the current selection, falling back to the legacy selection API
/// and then to an empty string. An empty selection is already a valid input
/// for tag insertion, so there is no error case here.
pub fn selected_html<H: EditingHost + ?Sized>(host: &H) -> String {
    host.selection_html()
        .or_else(|| {
            log::debug!("selection API unavailable, trying legacy selection");
            host.legacy_selection_html()
        })
        .unwrap_or_default()
}
