//! Backward Walker (spec.md §4.H): downloads historical comments by
//! following a packed-segment chain backward in time.

use crate::config::ClientConfig;
use crate::error::{NdgrError, Result};
use crate::program_info::ProgramInfo;
use crate::session::HttpSession;
use crate::view_driver::{self, ViewDriverEvent};
use crate::view_uri::acquire_view_uri;
use futures_util::StreamExt;
use ndgr_protocol::{wire, Comment, PackedSegmentBatch};
use prost::Message;

/// Download every historical Comment for `program`, ascending by
/// at-timestamp.
///
/// Drives the View Stream Driver only until the first `Backward` entry,
/// then walks the packed-segment chain it points to. Dropping the driver's
/// stream after that point ends its underlying HTTP read; no explicit
/// cancellation token is needed since nothing else was spawned from it.
pub async fn download(session: &HttpSession, program: &ProgramInfo, config: &ClientConfig) -> Result<Vec<Comment>> {
    let view_uri = acquire_view_uri(session, &program.web_socket_url).await?;

    let backward_uri = {
        let mut driver = Box::pin(view_driver::drive(session.clone(), view_uri, config.clone()));
        let mut found = None;
        while let Some(event) = driver.next().await {
            if let ViewDriverEvent::Backward { uri } = event? {
                found = Some(uri);
                break;
            }
        }
        found
    };

    let Some(mut next_uri) = backward_uri else {
        return Err(NdgrError::Protocol(
            "view stream ended before a Backward entry was observed".to_owned(),
        ));
    };

    let mut accumulator: Vec<Comment> = Vec::new();
    loop {
        let batch = fetch_packed_segment(session, &next_uri, config).await?;
        let PackedSegmentBatch { comments, next_uri: next } = batch;

        accumulator = comments.into_iter().chain(accumulator).collect();

        match next {
            Some(uri) => {
                tokio::time::sleep(config.backward_walk_pacing).await;
                next_uri = uri;
            }
            None => break,
        }
    }

    Ok(accumulator)
}

/// Fetch and decode a single `PackedSegment` — a non-streaming, whole-body
/// GET. No retry (spec.md §4.H: "the walker does NOT retry individually;
/// any non-2xx is surfaced").
async fn fetch_packed_segment(session: &HttpSession, uri: &str, config: &ClientConfig) -> Result<PackedSegmentBatch> {
    let bytes = session
        .client()
        .get(uri)
        .timeout(config.request_timeout)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let packed = wire::PackedSegment::decode(bytes.as_ref())
        .map_err(|e| NdgrError::Protocol(format!("malformed PackedSegment: {e}")))?;
    Ok(PackedSegmentBatch::from(packed))
}
