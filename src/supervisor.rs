//! Supervisor (spec.md §4.G): owns a live stream for one nominal program,
//! with transparent handoff when the program is channel-bound.

use crate::channel_map::ChannelAliasMap;
use crate::config::ClientConfig;
use crate::error::{NdgrError, Result};
use crate::handle::ProgramHandle;
use crate::program_info::{ProgramInfoResolver, ProgramStatus};
use crate::segment_pool::SegmentWorkerPool;
use crate::session::HttpSession;
use crate::view_driver::{self, ViewDriverEvent};
use crate::view_uri::acquire_view_uri;
use async_stream::try_stream;
use chrono::{Timelike, Utc};
use futures_util::{Stream, StreamExt};
use ndgr_protocol::Comment;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Bound on the live comment queue (spec.md §5: "a bounded channel with
/// blocking send providing natural backpressure on slow consumers").
const COMMENT_QUEUE_CAPACITY: usize = 512;

enum Outcome {
    Ended,
    Restart(ProgramHandle),
    Fatal(NdgrError),
}

/// Duration until the next wall-clock minute boundary plus `offset`
/// (spec.md §4.G: "sleeps until the next wall-clock minute + 5 seconds").
fn duration_until_next_monitor_tick(offset: Duration) -> Duration {
    let now = Utc::now();
    let elapsed_in_minute =
        Duration::from_secs(u64::from(now.second())) + Duration::from_nanos(u64::from(now.nanosecond()));
    let minute = Duration::from_secs(60);
    minute.saturating_sub(elapsed_in_minute) + offset
}

/// The interval until the next monitor tick, honoring
/// [`ClientConfig::program_monitor_interval_override`] when a test has set
/// one.
fn next_monitor_interval(config: &ClientConfig) -> Duration {
    config
        .program_monitor_interval_override
        .unwrap_or_else(|| duration_until_next_monitor_tick(config.program_monitor_offset))
}

/// Stream Comments for `handle`, starting from [`ChannelAliasMap`]
/// resolution and running until the program ends or the caller cancels.
///
/// Refuses to start (spec.md §4.G precondition) if the program has already
/// ended on the very first resolution; historical-only programs must use
/// [`crate::backward::download`] instead.
pub fn stream_comments<'a>(
    session: HttpSession,
    handle: ProgramHandle,
    alias_map: &'a ChannelAliasMap,
    config: ClientConfig,
) -> impl Stream<Item = Result<Comment>> + 'a {
    try_stream! {
        let mut current_handle = handle;
        let mut first_resolution = true;

        'supervisor: loop {
            let resolver = ProgramInfoResolver::new(&session, alias_map, &config);
            let info = resolver.resolve(&current_handle).await?;

            if first_resolution && info.status == ProgramStatus::Ended {
                return Err(NdgrError::Protocol(
                    "program has already ended; use the backward download path instead".to_owned(),
                ));
            }
            first_resolution = false;

            let view_uri = acquire_view_uri(&session, &info.web_socket_url).await?;

            let cancel = CancellationToken::new();
            let (tx, mut rx) = mpsc::channel::<Comment>(COMMENT_QUEUE_CAPACITY);
            let pool = SegmentWorkerPool::new(session.clone(), config.clone(), tx, cancel.clone());
            let mut driver = Box::pin(view_driver::drive(session.clone(), view_uri, config.clone()));

            let tracked_program_id = info.program_id.clone();
            let is_channel_bound = current_handle.is_channel();
            let mut monitor_deadline = tokio::time::Instant::now() + next_monitor_interval(&config);

            let outcome = loop {
                tokio::select! {
                    biased;

                    maybe_comment = rx.recv() => {
                        if let Some(comment) = maybe_comment {
                            yield comment;
                        }
                    }

                    driver_item = driver.next() => {
                        match driver_item {
                            Some(Ok(ViewDriverEvent::Segment(descriptor))) => pool.accept(descriptor),
                            // A live supervisor has no interest in historical backfill;
                            // Backward entries only matter to the Backward Walker.
                            Some(Ok(ViewDriverEvent::Backward { .. })) => {}
                            Some(Err(e)) => break Outcome::Fatal(e),
                            None => break Outcome::Ended,
                        }
                    }

                    () = tokio::time::sleep_until(monitor_deadline) => {
                        monitor_deadline = tokio::time::Instant::now() + next_monitor_interval(&config);

                        if let Ok(refreshed) = resolver.resolve(&current_handle).await {
                            if !is_channel_bound && refreshed.status == ProgramStatus::Ended {
                                break Outcome::Ended;
                            }
                            if is_channel_bound && refreshed.program_id != tracked_program_id {
                                break Outcome::Restart(ProgramHandle::Program(refreshed.program_id));
                            }
                        }
                        // A transient monitor-poll failure is not fatal; keep streaming.
                    }
                }
            };

            cancel.cancel();
            drop(driver);
            rx.close();
            while let Ok(comment) = rx.try_recv() {
                yield comment;
            }

            match outcome {
                Outcome::Ended => return,
                Outcome::Fatal(e) => return Err(e),
                Outcome::Restart(next_handle) => {
                    current_handle = next_handle;
                    continue 'supervisor;
                }
            }
        }
    }
}
