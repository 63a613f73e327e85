//! Protobuf Fetcher (spec.md §4.B): opens one streaming HTTP GET per
//! attempt, feeds bytes into a [`FramedStreamReader`], and yields decoded
//! messages in order.
//!
//! A per-attempt read-idle deadline applies; both connect-time and
//! mid-stream transport faults are retried with a fixed delay, up to
//! [`ClientConfig::fetcher_max_attempts`]. Because retrying re-opens the GET
//! from scratch, a retry after partial delivery may re-emit messages the
//! caller already saw — acceptable under the engine's at-least-once
//! delivery guarantee (spec.md §1), never a reason to drop the connection
//! silently.

use crate::config::ClientConfig;
use crate::error::{NdgrError, Result};
use crate::session::HttpSession;
use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use ndgr_protocol::FramedStreamReader;
use prost::Message;

async fn open_stream(
    session: &HttpSession,
    url: &str,
) -> Result<impl futures_util::Stream<Item = reqwest::Result<bytes::Bytes>>> {
    let response = session
        .client()
        .get(url)
        .send()
        .await?
        .error_for_status()?;
    Ok(response.bytes_stream())
}

/// Stream decoded `M` messages from `url`, retrying the whole GET on
/// transport fault.
pub fn stream<M>(
    session: HttpSession,
    url: String,
    config: ClientConfig,
) -> impl Stream<Item = Result<M>>
where
    M: Message + Default + 'static,
{
    try_stream! {
        let mut attempt = 0u32;

        'attempts: loop {
            attempt += 1;

            let body = match open_stream(&session, &url).await {
                Ok(body) => body,
                Err(e) => {
                    if attempt >= config.fetcher_max_attempts {
                        return Err(e);
                    }
                    tracing::warn!(url = %url, attempt, error = %e, "protobuf fetch connect retrying");
                    tokio::time::sleep(config.fetcher_retry_delay).await;
                    continue 'attempts;
                }
            };
            tokio::pin!(body);

            let mut reader = FramedStreamReader::new();
            let mut fault: Option<NdgrError> = None;

            loop {
                let next = tokio::time::timeout(config.stream_read_idle_timeout, body.next()).await;
                let chunk = match next {
                    Ok(Some(Ok(bytes))) => bytes,
                    Ok(Some(Err(e))) => {
                        fault = Some(NdgrError::from(e));
                        break;
                    }
                    Ok(None) => break,
                    Err(_elapsed) => {
                        fault = Some(NdgrError::Transport(format!(
                            "read-idle timeout after {:?}",
                            config.stream_read_idle_timeout
                        )));
                        break;
                    }
                };

                reader.append(&chunk);
                while let Some(frame) = reader.extract()? {
                    let msg = M::decode(frame.as_slice())
                        .map_err(|e| NdgrError::Protocol(format!("malformed protobuf frame: {e}")))?;
                    yield msg;
                }
            }

            match fault {
                None => return,
                Some(e) => {
                    if attempt >= config.fetcher_max_attempts {
                        return Err(e);
                    }
                    tracing::warn!(url = %url, attempt, error = %e, "protobuf fetch retrying after transport fault");
                    tokio::time::sleep(config.fetcher_retry_delay).await;
                    continue 'attempts;
                }
            }
        }
    }
}
