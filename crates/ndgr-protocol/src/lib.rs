//! Wire schema, framing, and domain-adapter types shared by every component
//! of the NDGR comment acquisition engine.
//!
//! This crate has no I/O of its own — it is pure data transformation,
//! analogous to the role `rt-protocol` plays in the timer workspace: the
//! frozen wire schema every other component depends on.

pub mod comment;
pub mod framed_reader;
pub mod packed_segment;
pub mod view_entry;
pub mod wire;

pub use comment::{AccountStatus, Color, Comment, Font, NamedColor, Opacity, Position, Size};
pub use framed_reader::{FramedStreamReader, FramingError};
pub use packed_segment::PackedSegmentBatch;
pub use view_entry::ViewEntry;

/// A live comment segment descriptor surfaced by the View Stream Driver
/// (spec.md §3 `SegmentDescriptor`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDescriptor {
    pub uri: String,
    pub from: chrono::DateTime<chrono::Utc>,
    pub until: chrono::DateTime<chrono::Utc>,
}
