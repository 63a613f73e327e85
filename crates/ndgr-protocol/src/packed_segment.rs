//! Adapter over the wire `PackedSegment` message used by the Backward
//! Walker (spec.md §4.H).

use crate::comment::{self, Comment};
use crate::wire;

/// A decoded batch of historical comments plus an optional pointer further
/// back in time.
#[derive(Debug, Clone)]
pub struct PackedSegmentBatch {
    /// Admissible messages, normalized and in the server's original order
    /// (ascending by at-timestamp).
    pub comments: Vec<Comment>,
    /// URI of the next (older) packed segment, if any.
    pub next_uri: Option<String>,
}

impl From<wire::PackedSegment> for PackedSegmentBatch {
    fn from(packed: wire::PackedSegment) -> Self {
        let comments = packed.messages.iter().filter_map(comment::normalize).collect();
        let next_uri = packed.next.map(|r| r.uri).filter(|uri| !uri.is_empty());
        PackedSegmentBatch { comments, next_uri }
    }
}
