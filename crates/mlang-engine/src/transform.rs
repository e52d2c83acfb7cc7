//! Decoration and cleaning of markers.
//!
//! [`decorate`] and [`clean`] are inverses: decorating wraps every bare marker
//! in the visual container, cleaning strips those containers back off. Both
//! work on match positions rather than searching for the matched text again,
//! so two textually identical markers are handled independently.
//!
//! The containers exist only while editing. Anything typed into one is kept
//! on clean, but the container tags themselves never survive it.

use std::borrow::Cow;
use std::ops::Range;

use regex::Captures;

use crate::syntax::{OPENING_SPAN, decorate_marker, decoration_regex, span_tag_regex};

/// Wrap every bare marker in the visual container.
///
/// Markers that are already wrapped are left as they are, so running this on
/// decorated content changes nothing. Returns the input borrowed when there
/// was nothing to wrap.
pub fn decorate(buffer: &str) -> Cow<'_, str> {
    let mut wrapped = 0usize;
    let decorated = decoration_regex().replace_all(buffer, |caps: &Captures<'_>| {
        match caps.name("bare") {
            Some(bare) => {
                wrapped += 1;
                decorate_marker(bare.as_str())
            }
            None => caps[0].to_string(),
        }
    });

    if wrapped == 0 {
        return Cow::Borrowed(buffer);
    }

    log::debug!("decorated {wrapped} marker(s)");
    Cow::Owned(decorated.into_owned())
}

/// Strip every visual container, keeping whatever it holds.
///
/// Each container's opening tag goes together with the `</span>` that
/// balances it, so other spans nested inside survive intact. An opening tag
/// that is never closed is dropped on its own. Runs until no container tag is
/// left, so the result never satisfies [`is_decorated`] and a second call is
/// always a no-op.
pub fn clean(buffer: &str) -> Cow<'_, str> {
    if !is_decorated(buffer) {
        return Cow::Borrowed(buffer);
    }

    let mut current = buffer.to_string();
    let mut removed = 0usize;
    while let Some((stripped, count)) = strip_containers(&current) {
        removed += count;
        current = stripped;
    }

    if removed == 0 {
        return Cow::Borrowed(buffer);
    }

    log::debug!("cleaned {removed} container span(s)");
    Cow::Owned(current)
}

/// One pass over the span tags of `buffer`. Returns the buffer without its
/// container tags and how many containers were removed, or `None` when there
/// was nothing to remove.
fn strip_containers(buffer: &str) -> Option<(String, usize)> {
    let mut drop: Vec<Range<usize>> = Vec::new();
    // Open spans, innermost last; `Some` for containers.
    let mut open: Vec<Option<Range<usize>>> = Vec::new();
    let mut containers = 0usize;

    for tag in span_tag_regex().find_iter(buffer) {
        if tag.as_str().starts_with("</") {
            if let Some(Some(opening)) = open.pop() {
                drop.push(opening);
                drop.push(tag.range());
            }
        } else if tag.as_str() == OPENING_SPAN {
            containers += 1;
            open.push(Some(tag.range()));
        } else {
            open.push(None);
        }
    }

    // Unclosed containers.
    drop.extend(open.into_iter().flatten());
    if drop.is_empty() {
        return None;
    }
    drop.sort_unstable_by_key(|range| range.start);

    let mut out = String::with_capacity(buffer.len());
    let mut last = 0;
    for range in drop {
        out.push_str(&buffer[last..range.start]);
        last = range.end;
    }
    out.push_str(&buffer[last..]);

    Some((out, containers))
}

/// Whether the buffer still holds any visual container.
///
/// Persisted content must never satisfy this.
pub fn is_decorated(buffer: &str) -> bool {
    buffer.contains(OPENING_SPAN)
}
