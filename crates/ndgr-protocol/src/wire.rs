//! Generated protobuf bindings for the NDGR wire schema (`proto/ndgr.proto`).
//!
//! Nothing in this module should be used directly outside the crate except
//! through the thin adapters in [`crate::view_entry`] and [`crate::comment`]:
//! the generated `oneof`s are "does-field-exist" unions, not the explicit sum
//! types callers want.

include!(concat!(env!("OUT_DIR"), "/ndgr.rs"));
