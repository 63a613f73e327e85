//! Backward Walker: acquires a view URI over a real WebSocket handshake,
//! drives the view stream to its `Backward` entry, then walks a two-link
//! packed-segment chain, verifying comments come back oldest-first.

use ndgr_client::backward::download;
use ndgr_client::config::ClientConfig;
use ndgr_client::program_info::{ProgramInfo, ProgramStatus};
use ndgr_client::session::HttpSession;
use ndgr_test_support::fixtures;
use ndgr_test_support::framing::encode_frames;
use ndgr_test_support::{MockStreamServer, MockViewWsServer};
use prost::Message;

fn program_info(web_socket_url: String) -> ProgramInfo {
    ProgramInfo {
        program_id: "lv1".to_owned(),
        title: "t".to_owned(),
        description: "d".to_owned(),
        status: ProgramStatus::Ended,
        open_time: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        begin_time: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        end_time: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        scheduled_end_time: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        vpos_base_time: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        web_socket_url,
    }
}

#[tokio::test]
async fn walks_the_packed_segment_chain_oldest_first() {
    let stream_server = MockStreamServer::start().await;

    let packed_a = fixtures::packed_segment(
        vec![fixtures::chat_message("newer", 190, 345, "newer comment")],
        Some(&stream_server.url("/packed/b")),
    );
    let packed_b = fixtures::packed_segment(
        vec![fixtures::chat_message("older", 100, 345, "older comment")],
        None,
    );
    stream_server.set_response("/packed/a", packed_a.encode_to_vec());
    stream_server.set_response("/packed/b", packed_b.encode_to_vec());
    stream_server.set_response(
        "/view?at=now",
        encode_frames(&[fixtures::chunked_entry_backward(&stream_server.url("/packed/a"))]),
    );

    let view_uri = stream_server.url("/view");
    let ws_server = MockViewWsServer::start(view_uri).await;

    let session = HttpSession::new(&ClientConfig::default()).expect("session");
    let info = program_info(ws_server.ws_url());
    let config = ClientConfig {
        backward_walk_pacing: std::time::Duration::from_millis(1),
        ..ClientConfig::default()
    };

    let comments = download(&session, &info, &config).await.expect("backward download");

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].id, "older");
    assert_eq!(comments[1].id, "newer");
    assert!(comments[0].at < comments[1].at);
}

#[tokio::test]
async fn view_stream_ending_without_backward_entry_is_an_error() {
    let stream_server = MockStreamServer::start().await;
    stream_server.set_response("/view?at=now", encode_frames::<ndgr_protocol::wire::ChunkedEntry>(&[]));

    let view_uri = stream_server.url("/view");
    let ws_server = MockViewWsServer::start(view_uri).await;

    let session = HttpSession::new(&ClientConfig::default()).expect("session");
    let info = program_info(ws_server.ws_url());

    let result = download(&session, &info, &ClientConfig::default()).await;
    assert!(result.is_err());
}
