//! View Stream Driver (spec.md §4.E): drives one ProgramInfo's view endpoint
//! across a sequence of contiguous slices, classifying each decoded
//! [`ViewEntry`] for its consumer.

use crate::config::ClientConfig;
use crate::error::{NdgrError, Result};
use crate::fetcher;
use crate::session::HttpSession;
use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use ndgr_protocol::{wire, SegmentDescriptor, ViewEntry};

/// A classified record the driver hands off to its consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewDriverEvent {
    /// Hand off to the Segment Worker Pool (spec.md §4.F).
    Segment(SegmentDescriptor),
    /// Hand off to the Backward Walker (spec.md §4.H). Ends this driver's
    /// interest in the slice it came from.
    Backward { uri: String },
}

/// Drive `view_uri` starting from `at=now`, yielding [`ViewDriverEvent`]s in
/// arrival order. The stream ends cleanly once a slice closes without
/// yielding a `Next` continuation (the program has ended from the server's
/// perspective) or once a `Backward` entry is observed.
pub fn drive(
    session: HttpSession,
    view_uri: String,
    config: ClientConfig,
) -> impl Stream<Item = Result<ViewDriverEvent>> {
    try_stream! {
        let mut at_param: Option<String> = Some("now".to_owned());

        while let Some(at) = at_param.take() {
            let separator = if view_uri.contains('?') { '&' } else { '?' };
            let slice_url = format!("{view_uri}{separator}at={at}");

            let mut attempt = 0u32;
            let mut next_at: Option<i64> = None;
            let mut backward_seen = false;

            'slice: loop {
                attempt += 1;
                let mut entries = Box::pin(fetcher::stream::<wire::ChunkedEntry>(
                    session.clone(),
                    slice_url.clone(),
                    config.clone(),
                ));

                let mut slice_fault: Option<NdgrError> = None;
                while let Some(item) = entries.next().await {
                    let wire_entry = match item {
                        Ok(entry) => entry,
                        Err(e) => {
                            slice_fault = Some(e);
                            break;
                        }
                    };

                    match ViewEntry::from(wire_entry) {
                        ViewEntry::Segment { uri, from, until } => {
                            yield ViewDriverEvent::Segment(SegmentDescriptor { uri, from, until });
                        }
                        ViewEntry::Next { at } => {
                            if next_at.is_some() {
                                return Err(NdgrError::Protocol(
                                    "duplicate Next entry within one view slice".to_owned(),
                                ));
                            }
                            next_at = Some(at);
                        }
                        ViewEntry::Backward { uri } => {
                            backward_seen = true;
                            yield ViewDriverEvent::Backward { uri };
                            break;
                        }
                        ViewEntry::Unknown => {}
                    }
                }

                match slice_fault {
                    None => break 'slice,
                    Some(e) => {
                        if attempt >= config.view_slice_max_attempts {
                            return Err(e);
                        }
                        tracing::warn!(
                            url = %slice_url,
                            attempt,
                            error = %e,
                            "view slice retrying"
                        );
                        tokio::time::sleep(config.view_slice_retry_delay).await;
                        continue 'slice;
                    }
                }
            }

            if backward_seen {
                return;
            }

            at_param = next_at.map(|at| at.to_string());
        }
    }
}
