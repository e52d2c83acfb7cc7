use std::borrow::Cow;
use std::ops::Range;

use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::error::EngineError;
use crate::host::{EditingHost, HostNode};

/// In-memory editing surface over a markup buffer.
///
/// `Document` is the reference [`EditingHost`]: it keeps the markup in an
/// `xi_rope::Rope`, tracks a byte-range selection, and resolves the node under
/// the selection anchor directly from the flat markup:
///
/// - an anchor inside `<...>` is an element node
/// - otherwise the anchor's text node is the run of text between the nearest
///   tags, with entities decoded for its text content
///
/// ```rust
/// # use mlang_engine::{Document, EditingHost, insert_tag};
/// let mut doc = Document::new("Say Hola now");
/// doc.set_selection(4..8);
/// insert_tag(&mut doc, "es");
/// assert!(doc.text().contains("{mlang es}</span>Hola<span"));
/// assert!(doc.is_dirty());
/// ```
#[derive(Clone)]
pub struct Document {
    /// Markup buffer, the single source of truth for content
    buffer: Rope,
    /// Selection as byte offsets; `start` is the anchor
    selection: Range<usize>,
    /// Incremented on every content change
    version: u64,
    dirty: bool,
    resubmit_requested: bool,
    /// Content handed to persistence, oldest first
    submissions: Vec<String>,
}

impl Document {
    /// Create a document with the cursor at the end of `text`.
    pub fn new(text: &str) -> Self {
        let buffer = Rope::from(text);
        let len = buffer.len();
        Self {
            buffer,
            selection: len..len,
            version: 0,
            dirty: false,
            resubmit_requested: false,
            submissions: Vec::new(),
        }
    }

    /// Create a document from raw bytes, which must be UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(text))
    }

    /// Get the current markup
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    /// Get the current selection range
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Get the current version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the content was changed outside direct typing since load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consume a pending resubmission request.
    pub fn take_resubmit(&mut self) -> bool {
        std::mem::take(&mut self.resubmit_requested)
    }

    /// Every submission that reached persistence, oldest first.
    pub fn submissions(&self) -> &[String] {
        &self.submissions
    }

    pub(crate) fn record_submission(&mut self, content: String) {
        self.submissions.push(content);
    }

    fn slice_to_cow(&self, range: Range<usize>) -> Cow<'_, str> {
        self.buffer.slice_to_cow(range)
    }

    /// Clamp a range to the buffer and pull both ends back onto char
    /// boundaries.
    fn clamp(&self, range: Range<usize>) -> Range<usize> {
        let len = self.buffer.len();
        let snap = |pos: usize| {
            if pos >= len {
                len
            } else {
                self.buffer.at_or_prev_codepoint_boundary(pos).unwrap_or(0)
            }
        };

        let start = snap(range.start);
        let end = snap(range.end).max(start);
        start..end
    }

    /// Replace `range` through a rope delta and collapse the cursor after the
    /// inserted text.
    fn replace(&mut self, range: Range<usize>, text: &str) {
        let range = self.clamp(range);
        let mut builder = Builder::new(self.buffer.len());
        builder.replace(range.clone(), Rope::from(text));
        let delta = builder.build();

        self.buffer = delta.apply(&self.buffer);
        let cursor = range.start + text.len();
        self.selection = cursor..cursor;
        self.version += 1;
    }

    fn node_at(&self, offset: usize) -> HostNode {
        let before = self.slice_to_cow(0..offset);
        let after = self.slice_to_cow(offset..self.buffer.len());

        let last_open = before.rfind('<');
        let last_close = before.rfind('>');
        if let Some(open) = last_open
            && last_close.is_none_or(|close| close < open)
        {
            let end = after
                .find('>')
                .map_or(self.buffer.len(), |i| offset + i + 1);
            return HostNode::element(String::new(), open..end);
        }

        let start = last_close.map_or(0, |close| close + 1);
        let end = after
            .find('<')
            .map_or(self.buffer.len(), |i| offset + i);
        if start == end {
            // Between two tags there is no text node; the anchor sits in the element.
            return HostNode::element(String::new(), start..end);
        }

        let raw = self.slice_to_cow(start..end);
        let content = html_escape::decode_html_entities(&raw).into_owned();
        HostNode::text(content, start..end)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text()
            && self.selection == other.selection
            && self.version == other.version
            && self.dirty == other.dirty
            && self.submissions == other.submissions
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.text())
            .field("selection", &self.selection)
            .field("version", &self.version)
            .field("dirty", &self.dirty)
            .field("submissions", &self.submissions.len())
            .finish()
    }
}

impl EditingHost for Document {
    fn content(&self) -> String {
        self.text()
    }

    fn set_content(&mut self, html: &str) {
        let len = self.buffer.len();
        self.replace(0..len, html);
    }

    fn selection_text(&self) -> String {
        let html = self.slice_to_cow(self.selection.clone());
        let stripped = strip_tags(&html);
        html_escape::decode_html_entities(&stripped).into_owned()
    }

    fn selection_html(&self) -> Option<String> {
        Some(self.slice_to_cow(self.selection.clone()).into_owned())
    }

    fn insert_at_focus(&mut self, fragment: &str) {
        self.replace(self.selection.clone(), fragment);
    }

    fn selection_anchor_node(&self) -> Option<HostNode> {
        Some(self.node_at(self.selection.start))
    }

    fn set_selection(&mut self, range: Range<usize>) {
        self.selection = self.clamp(range);
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn resubmit(&mut self) {
        self.resubmit_requested = true;
    }
}

/// Drop everything between `<` and `>`, inclusive.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
