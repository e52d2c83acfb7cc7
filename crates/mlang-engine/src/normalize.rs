//! Keeps the cursor from landing inside marker text.
//!
//! Decoration isolates every marker into its own text node inside the
//! container span. When the cursor is placed in such a node the whole node is
//! selected, so a marker is only ever replaced or deleted as a unit.

use std::ops::Range;

use crate::error::EngineError;
use crate::host::{EditingHost, HostNode};
use crate::syntax::count_open_tokens;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// The selection now spans the whole marker node.
    Expanded(Range<usize>),
    Unchanged,
}

/// Handle a selection change: expand the selection to the anchor's text node
/// when that node holds exactly one marker-open token.
///
/// Element nodes, nodes without markers and nodes with several markers are
/// left alone.
pub fn normalize_selection<H: EditingHost + ?Sized>(
    host: &mut H,
) -> Result<NormalizeOutcome, EngineError> {
    let Some(node) = host.selection_anchor_node() else {
        return Ok(NormalizeOutcome::Unchanged);
    };

    if !node.is_text() || count_open_tokens(&node.text) != 1 {
        return Ok(NormalizeOutcome::Unchanged);
    }

    let range = expand_to_marker_node(host, &node)?;
    Ok(NormalizeOutcome::Expanded(range))
}

/// Select the whole of `node`, which must be a text node holding exactly one
/// marker-open token.
///
/// Any other node is rejected rather than guessed at, since a selection
/// computed from a wrong assumption would swallow neighbouring content.
pub fn expand_to_marker_node<H: EditingHost + ?Sized>(
    host: &mut H,
    node: &HostNode,
) -> Result<Range<usize>, EngineError> {
    if !node.is_text() {
        return Err(EngineError::NotATextNode);
    }

    let found = count_open_tokens(&node.text);
    if found != 1 {
        return Err(EngineError::MarkerCountMismatch { found });
    }

    log::debug!("expanding selection to marker node {:?}", node.range);
    host.set_selection(node.range.clone());
    Ok(node.range.clone())
}
