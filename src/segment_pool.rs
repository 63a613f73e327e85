//! Segment Worker Pool (spec.md §4.F): one task per live SegmentDescriptor,
//! deduplicated by URI, feeding normalized Comments into a shared bounded
//! queue.

use crate::config::ClientConfig;
use crate::fetcher;
use crate::session::HttpSession;
use futures_util::StreamExt;
use ndgr_protocol::{comment::normalize, wire, Comment, SegmentDescriptor};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Owns the set of segment URIs currently being drained and the queue their
/// workers feed. Cheaply cloneable; every clone shares the same dedup set
/// and queue.
#[derive(Clone)]
pub struct SegmentWorkerPool {
    session: HttpSession,
    config: ClientConfig,
    tx: mpsc::Sender<Comment>,
    active: Arc<Mutex<HashSet<String>>>,
    cancel: CancellationToken,
}

impl SegmentWorkerPool {
    pub fn new(
        session: HttpSession,
        config: ClientConfig,
        tx: mpsc::Sender<Comment>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session,
            config,
            tx,
            active: Arc::new(Mutex::new(HashSet::new())),
            cancel,
        }
    }

    /// Start a worker for `descriptor.uri` unless one is already draining it
    /// (spec.md §4.F: "idempotent on duplicate observations", "starting a
    /// second worker against the same URI is forbidden").
    pub fn accept(&self, descriptor: SegmentDescriptor) {
        {
            let mut active = self.active.lock().expect("segment pool dedup set poisoned");
            if !active.insert(descriptor.uri.clone()) {
                return;
            }
        }

        let session = self.session.clone();
        let config = self.config.clone();
        let tx = self.tx.clone();
        let active = Arc::clone(&self.active);
        let cancel = self.cancel.clone();
        let uri = descriptor.uri;
        let from = descriptor.from;

        tokio::spawn(async move {
            // `from` may be up to `segment_early_connect_window` in the
            // future (spec.md §3); wait out anything beyond that margin
            // instead of opening the stream immediately.
            let earliest_connect = from - chrono::Duration::from_std(config.segment_early_connect_window).unwrap_or_default();
            let wait = earliest_connect - chrono::Utc::now();
            if let Ok(wait) = wait.to_std() {
                tokio::select! {
                    () = cancel.cancelled() => {
                        active.lock().expect("segment pool dedup set poisoned").remove(&uri);
                        return;
                    }
                    () = tokio::time::sleep(wait) => {}
                }
            }

            let mut messages = Box::pin(fetcher::stream::<wire::ChunkedMessage>(
                session,
                uri.clone(),
                config,
            ));

            loop {
                let item = tokio::select! {
                    () = cancel.cancelled() => break,
                    item = messages.next() => item,
                };
                let Some(item) = item else { break };

                let message = match item {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::debug!(uri = %uri, error = %e, "segment worker retiring on error");
                        break;
                    }
                };

                let Some(comment) = normalize(&message) else {
                    continue;
                };
                if tx.send(comment).await.is_err() {
                    break;
                }
            }

            active.lock().expect("segment pool dedup set poisoned").remove(&uri);
        });
    }

    /// Number of segment URIs currently being drained; mainly for tests.
    pub fn active_count(&self) -> usize {
        self.active.lock().expect("segment pool dedup set poisoned").len()
    }
}
