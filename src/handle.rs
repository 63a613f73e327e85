//! [`ProgramHandle`] parsing and channel-alias resolution (spec.md §3).

use crate::channel_map::ChannelAliasMap;
use crate::error::{NdgrError, Result};

/// Program identifiers are stable per program and always start with `lv`
/// (e.g. `lv345479473`).
const PROGRAM_PREFIX: &str = "lv";
/// Channel aliases (community/channel handles) start with `co` or `ch`.
const CHANNEL_PREFIXES: [&str; 2] = ["co", "ch"];

/// A caller-supplied identifier: either a stable program identifier or a
/// channel alias that must be resolved through the alias map before any
/// network operation that requires a program handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramHandle {
    /// A program identifier, e.g. `lv345479473`.
    Program(String),
    /// A channel alias, e.g. `co1234` or a custom channel name.
    Channel(String),
}

impl ProgramHandle {
    /// Parse a raw handle string. Defaults to `Channel` when the prefix is
    /// ambiguous, since channel aliases are the more permissive form and
    /// the resolver's alias lookup will fail loudly for an unknown one.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(PROGRAM_PREFIX) && raw[PROGRAM_PREFIX.len()..].chars().all(|c| c.is_ascii_digit()) {
            ProgramHandle::Program(raw.to_owned())
        } else if CHANNEL_PREFIXES.iter().any(|p| raw.starts_with(p)) {
            ProgramHandle::Channel(raw.to_owned())
        } else {
            ProgramHandle::Channel(raw.to_owned())
        }
    }

    /// Resolve to a concrete program identifier, translating a channel
    /// alias through `alias_map` first. Never performs a network operation
    /// itself.
    pub fn resolve_program_id(&self, alias_map: &ChannelAliasMap) -> Result<String> {
        match self {
            ProgramHandle::Program(id) => Ok(id.clone()),
            ProgramHandle::Channel(alias) => alias_map.lookup(alias).ok_or_else(|| {
                NdgrError::Input(format!("unknown channel alias: {alias}"))
            }),
        }
    }

    pub fn is_channel(&self) -> bool {
        matches!(self, ProgramHandle::Channel(_))
    }
}
