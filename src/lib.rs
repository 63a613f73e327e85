//! Client library for niconico live's NDGR comment fabric (spec.md §1).
//!
//! [`NdgrClient`] is the single entry point: it owns the long-lived
//! [`HttpSession`] and the process-wide [`ChannelAliasMap`] and exposes the
//! two caller-facing operations spec.md defines — [`NdgrClient::stream_comments`]
//! (the live path) and [`NdgrClient::download_backward`] (the history path) —
//! plus the external-helper surface of §4.I.

pub mod backward;
pub mod channel_map;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod handle;
pub mod program_info;
pub mod segment_pool;
pub mod session;
pub mod supervisor;
pub mod view_driver;
pub mod view_uri;
pub mod xml_transcript;

pub use channel_map::{ChannelAliasMap, ProgramListing};
pub use config::ClientConfig;
pub use error::{NdgrError, Result};
pub use handle::ProgramHandle;
pub use ndgr_protocol::{
    AccountStatus, Color, Comment, Font, NamedColor, Opacity, Position, SegmentDescriptor, Size,
};
pub use program_info::{ProgramInfo, ProgramInfoResolver, ProgramStatus};

use chrono::NaiveDate;
use futures_util::Stream;

/// The library's single entry point: one long-lived HTTP session plus the
/// process-wide channel alias table (spec.md §9 "Ownership of HTTP
/// sessions", §5 "Process-wide alias map").
///
/// Cheap to clone — every clone shares the same underlying session and
/// alias table, mirroring how the teacher workspace's services share one
/// `reqwest::Client`/`UplinkSession` across tasks.
#[derive(Clone)]
pub struct NdgrClient {
    session: session::HttpSession,
    alias_map: std::sync::Arc<ChannelAliasMap>,
    config: ClientConfig,
}

impl NdgrClient {
    /// Build a client with the default [`ClientConfig`].
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Build a client with an explicit [`ClientConfig`], rejecting
    /// configurations that could never satisfy spec.md's invariants.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config
            .validate()
            .map_err(NdgrError::Input)?;
        Ok(Self {
            session: session::HttpSession::new(&config)?,
            alias_map: std::sync::Arc::new(ChannelAliasMap::new()),
            config,
        })
    }

    /// POST credentials to the login endpoint (spec.md §6 "Login",
    /// collaborator surface). Required before [`Self::stream_comments`] or
    /// [`Self::download_backward`] can activate timeshift viewing on an
    /// ended program (spec.md §4.C step 3).
    pub async fn login(&self, mail: &str, password: &str) -> Result<()> {
        self.session.login(mail, password, &self.config).await
    }

    /// Stream every user-visible comment for `handle` from now through
    /// program end, transparently handing off across consecutive programs
    /// on the same channel (spec.md §1, §4.G).
    ///
    /// Refuses to start if `handle` has already ended on first resolution;
    /// use [`Self::download_backward`] for historical-only programs.
    pub fn stream_comments(&self, raw_handle: &str) -> impl Stream<Item = Result<Comment>> + '_ {
        let handle = ProgramHandle::parse(raw_handle);
        supervisor::stream_comments(self.session.clone(), handle, &self.alias_map, self.config.clone())
    }

    /// Harvest the complete historical comment log of `handle`, in
    /// ascending at-timestamp order (spec.md §1, §4.H).
    pub async fn download_backward(&self, raw_handle: &str) -> Result<Vec<Comment>> {
        let handle = ProgramHandle::parse(raw_handle);
        let resolver = ProgramInfoResolver::new(&self.session, &self.alias_map, &self.config);
        let info = resolver.resolve(&handle).await?;
        backward::download(&self.session, &info, &self.config).await
    }

    /// Resolve `handle` to a [`ProgramInfo`] snapshot without streaming
    /// anything (spec.md §4.C).
    pub async fn program_info(&self, raw_handle: &str) -> Result<ProgramInfo> {
        let handle = ProgramHandle::parse(raw_handle);
        let resolver = ProgramInfoResolver::new(&self.session, &self.alias_map, &self.config);
        resolver.resolve(&handle).await
    }

    /// Rebuild the channel alias → program handle table by scraping
    /// `channel_map_url` (spec.md §4.I `updateChannelAliasMap`).
    pub async fn update_channel_alias_map(&self, channel_map_url: &str) -> Result<()> {
        channel_map::update_channel_alias_map(&self.session, channel_map_url, &self.alias_map, &self.config).await
    }

    /// Best-effort enumeration of programs on `date` for `channel_alias`,
    /// ascending by start time (spec.md §4.I `listProgramsOn`).
    pub async fn list_programs_on(&self, channel_alias: &str, date: NaiveDate) -> Result<Vec<ProgramListing>> {
        channel_map::list_programs_on(&self.session, &self.config, channel_alias, date).await
    }

    /// Every channel alias currently known to this client's alias map.
    pub fn known_channel_aliases(&self) -> Vec<String> {
        self.alias_map.aliases()
    }
}
