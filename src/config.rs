//! Typed configuration for [`crate::NdgrClient`].
//!
//! `ndgr-client` is an embeddable library rather than a standalone service,
//! so — unlike the timer workspace's TOML-file services — the ambient
//! configuration surface is a builder over the numeric constants spec.md
//! pins, with the same defensive defaulting/validation style as
//! `forwarder::config::load_config_from_str`.

use std::time::Duration;

/// Tunable timing parameters for the comment acquisition engine.
///
/// All fields default to the values spec.md prescribes; overriding them is
/// intended for tests (faster polling, shorter backoff) rather than
/// production use.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Connect/write deadline for any HTTP request (spec.md §4.B, §5).
    pub connect_timeout: Duration,
    /// Read-idle deadline for a streaming HTTP GET (spec.md §4.B).
    pub stream_read_idle_timeout: Duration,
    /// Non-streaming GET/POST/PATCH timeout (ProgramInfo, PackedSegment).
    pub request_timeout: Duration,
    /// Max attempts for a single Protobuf Fetcher stream open (spec.md §4.B).
    pub fetcher_max_attempts: u32,
    /// Fixed delay between Protobuf Fetcher retry attempts.
    pub fetcher_retry_delay: Duration,
    /// Max attempts for a single View Stream Driver slice (spec.md §4.E).
    pub view_slice_max_attempts: u32,
    /// Fixed delay between View Stream Driver slice retries.
    pub view_slice_retry_delay: Duration,
    /// How far before a segment's nominal `from` time a worker may connect
    /// (spec.md §3: "up to 8 seconds before").
    pub segment_early_connect_window: Duration,
    /// Program monitor poll cadence offset past the wall-clock minute
    /// (spec.md §4.G: "next wall-clock minute + 5 seconds").
    pub program_monitor_offset: Duration,
    /// Delay between Backward Walker batch fetches (spec.md §4.H).
    pub backward_walk_pacing: Duration,
    /// Stale-handle fallback grace period past `endTime` (spec.md §4.C).
    pub stale_handle_grace_period: Duration,
    /// Base URL for the watch page and timeshift endpoints (spec.md §6 host
    /// `live.nicovideo.jp`). Overridable so integration tests can point the
    /// Program Info Resolver at a mock server instead of the real service.
    pub live_base_url: String,
    /// Base URL for the channel live page and channel map endpoints
    /// (spec.md §6 host `ch.nicovideo.jp`). Same override rationale as
    /// `live_base_url`.
    pub channel_base_url: String,
    /// When set, replaces the Supervisor's wall-clock "next minute + offset"
    /// monitor tick computation with a fixed interval. `None` preserves
    /// spec.md §4.G's real-clock cadence; tests set this to keep handoff
    /// scenarios from depending on wall-clock minute boundaries.
    pub program_monitor_interval_override: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            stream_read_idle_timeout: Duration::from_secs(40),
            request_timeout: Duration::from_secs(15),
            fetcher_max_attempts: 5,
            fetcher_retry_delay: Duration::from_secs(3),
            view_slice_max_attempts: 3,
            view_slice_retry_delay: Duration::from_secs(1),
            segment_early_connect_window: Duration::from_secs(8),
            program_monitor_offset: Duration::from_secs(5),
            backward_walk_pacing: Duration::from_millis(10),
            stale_handle_grace_period: Duration::from_secs(300),
            live_base_url: "https://live.nicovideo.jp".to_owned(),
            channel_base_url: "https://ch.nicovideo.jp".to_owned(),
            program_monitor_interval_override: None,
        }
    }
}

impl ClientConfig {
    /// Validate the configuration, rejecting combinations that could never
    /// satisfy spec.md's invariants (e.g. zero retry attempts would make a
    /// transient fault look identical to an exhausted retry budget).
    pub fn validate(&self) -> Result<(), String> {
        if self.fetcher_max_attempts == 0 {
            return Err("fetcher_max_attempts must be at least 1".to_owned());
        }
        if self.view_slice_max_attempts == 0 {
            return Err("view_slice_max_attempts must be at least 1".to_owned());
        }
        Ok(())
    }
}
