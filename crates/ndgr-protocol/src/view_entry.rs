//! Thin adapter turning the generated, "does-field-exist" `ChunkedEntry`
//! oneof into an explicit Rust sum type the View Stream Driver can match on
//! without reaching into generated-code internals.

use crate::comment::timestamp_to_datetime;
use crate::wire;
use chrono::{DateTime, Utc};

/// A decoded, fully-owned view stream record (spec.md §3 `ViewEntry`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEntry {
    /// A live comment segment the client should start draining.
    Segment {
        uri: String,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    },
    /// The server-echoed continuation timestamp for the next View slice.
    Next { at: i64 },
    /// Entry point into the packed-segment chain for historical comments.
    Backward { uri: String },
    /// A variant not recognized by this adapter; ignored by the driver.
    Unknown,
}

impl From<wire::ChunkedEntry> for ViewEntry {
    fn from(entry: wire::ChunkedEntry) -> Self {
        match entry.entry {
            Some(wire::chunked_entry::Entry::Segment(seg)) => ViewEntry::Segment {
                uri: seg.uri,
                from: seg
                    .from
                    .as_ref()
                    .map(timestamp_to_datetime)
                    .unwrap_or_default(),
                until: seg
                    .until
                    .as_ref()
                    .map(timestamp_to_datetime)
                    .unwrap_or_default(),
            },
            Some(wire::chunked_entry::Entry::Next(next)) => ViewEntry::Next { at: next.at },
            Some(wire::chunked_entry::Entry::Backward(back)) => {
                let uri = back.segment.map(|s| s.uri).unwrap_or_default();
                ViewEntry::Backward { uri }
            }
            None => ViewEntry::Unknown,
        }
    }
}
