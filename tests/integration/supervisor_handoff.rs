//! Supervisor handoff (spec.md §4.G): a channel-bound handle whose
//! underlying program rotates mid-stream triggers a transparent restart onto
//! the new program, without the caller observing a stream error.
//!
//! The first program's view stream is served by a raw socket that never
//! finishes responding, standing in for a live stream still being watched;
//! the monitor tick (sped up via `program_monitor_interval_override`) is
//! what actually detects the rotation and forces a restart before that
//! request would ever complete.

use futures_util::StreamExt;
use ndgr_client::channel_map::ChannelAliasMap;
use ndgr_client::config::ClientConfig;
use ndgr_client::handle::ProgramHandle;
use ndgr_client::session::HttpSession;
use ndgr_client::supervisor::stream_comments;
use ndgr_test_support::{DelayedHttpServer, MockStreamServer, MockViewWsServer};
use std::time::Duration;

fn watch_page_html(program_id: &str, ws_url: &str) -> String {
    let json = serde_json::json!({
        "program": {
            "nicoliveProgramId": program_id,
            "title": "t",
            "description": "d",
            "status": "ON_AIR",
            "openTime": 0,
            "beginTime": 0,
            "vposBaseTime": 0,
            "endTime": 0,
            "scheduledEndTime": 0,
        },
        "site": { "relive": { "webSocketUrl": ws_url } },
    });
    format!("<html><body><div id=\"embedded-data\" data-props='{json}'></div></body></html>")
}

#[tokio::test]
async fn channel_bound_handle_restarts_onto_the_rotated_program() {
    let watch_server = MockStreamServer::start().await;

    // lv1's view stream never finishes responding within the test window;
    // the monitor tick must be what ends this iteration, not the driver.
    let slow_view_server = DelayedHttpServer::start(Duration::from_secs(5), Vec::new()).await;
    let ws_server_1 = MockViewWsServer::start(slow_view_server.url()).await;
    watch_server.set_response("/watch/lv1", watch_page_html("lv1", &ws_server_1.ws_url()));

    // lv2's view stream closes immediately with no entries at all, ending
    // the driver (and the supervisor) cleanly right after the handoff.
    let fast_view_server = DelayedHttpServer::start(Duration::ZERO, Vec::new()).await;
    let ws_server_2 = MockViewWsServer::start(fast_view_server.url()).await;
    watch_server.set_response("/watch/lv2", watch_page_html("lv2", &ws_server_2.ws_url()));

    let alias_map = ChannelAliasMap::new();
    let mut table = std::collections::HashMap::new();
    table.insert("co1".to_owned(), "lv1".to_owned());
    alias_map.replace(table);

    let config = ClientConfig {
        live_base_url: watch_server.url(""),
        program_monitor_interval_override: Some(Duration::from_millis(30)),
        fetcher_retry_delay: Duration::from_millis(10),
        view_slice_retry_delay: Duration::from_millis(10),
        ..ClientConfig::default()
    };

    let session = HttpSession::new(&config).expect("session");
    let handle = ProgramHandle::parse("co1");

    // Simulate the channel rotating to lv2: the monitor's next poll of
    // /watch/lv1 sees a different nicoliveProgramId than the one it started
    // with, which is exactly what triggers `Outcome::Restart`.
    let rotation = async {
        tokio::time::sleep(Duration::from_millis(45)).await;
        watch_server.set_response("/watch/lv1", watch_page_html("lv2", &ws_server_1.ws_url()));
    };

    let drain = async move {
        let stream = stream_comments(session, handle, &alias_map, config);
        tokio::pin!(stream);
        let mut comments = Vec::new();
        while let Some(item) = stream.next().await {
            comments.push(item.expect("supervisor must not surface an error during handoff"));
        }
        comments
    };

    let (_, comments) = tokio::time::timeout(Duration::from_secs(5), futures_util::future::join(rotation, drain))
        .await
        .expect("handoff must complete well within the timeout");

    // Neither program emits any comments in this scenario; what matters is
    // that the stream ends cleanly after the rotation instead of hanging on
    // lv1's never-finishing connection.
    assert!(comments.is_empty());
}
