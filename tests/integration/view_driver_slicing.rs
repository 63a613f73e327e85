//! View Stream Driver slicing against a real `reqwest`/TCP round trip: three
//! consecutive `at=` slices, each pointing at the next via `Next`, with the
//! final slice closing without one.

use futures_util::StreamExt;
use ndgr_client::config::ClientConfig;
use ndgr_client::session::HttpSession;
use ndgr_client::view_driver::{drive, ViewDriverEvent};
use ndgr_test_support::fixtures;
use ndgr_test_support::framing::encode_frames;
use ndgr_test_support::MockStreamServer;

#[tokio::test]
async fn drives_three_slices_then_ends_cleanly_on_no_next() {
    let server = MockStreamServer::start().await;

    server.set_response(
        "/view?at=now",
        encode_frames(&[
            fixtures::chunked_entry_segment("https://example.test/seg/1", 100, 200),
            fixtures::chunked_entry_next(1_700_000_100),
        ]),
    );
    server.set_response(
        "/view?at=1700000100",
        encode_frames(&[
            fixtures::chunked_entry_segment("https://example.test/seg/2", 200, 300),
            fixtures::chunked_entry_next(1_700_000_200),
        ]),
    );
    server.set_response(
        "/view?at=1700000200",
        encode_frames::<ndgr_protocol::wire::ChunkedEntry>(&[]),
    );

    let session = HttpSession::new(&ClientConfig::default()).expect("session");
    let view_uri = server.url("/view");
    let mut driver = Box::pin(drive(session, view_uri, ClientConfig::default()));

    let mut segments = Vec::new();
    while let Some(event) = driver.next().await {
        match event.expect("driver event") {
            ViewDriverEvent::Segment(descriptor) => segments.push(descriptor.uri),
            ViewDriverEvent::Backward { .. } => panic!("unexpected backward entry"),
        }
    }

    assert_eq!(
        segments,
        vec!["https://example.test/seg/1", "https://example.test/seg/2"]
    );
}

#[tokio::test]
async fn duplicate_next_within_one_slice_is_a_protocol_error() {
    let server = MockStreamServer::start().await;
    server.set_response(
        "/view?at=now",
        encode_frames(&[
            fixtures::chunked_entry_next(1_700_000_100),
            fixtures::chunked_entry_next(1_700_000_200),
        ]),
    );

    let session = HttpSession::new(&ClientConfig::default()).expect("session");
    let view_uri = server.url("/view");
    let mut driver = Box::pin(drive(session, view_uri, ClientConfig::default()));

    let err = driver
        .next()
        .await
        .expect("stream yields one item")
        .expect_err("duplicate Next must surface as an error");
    assert!(matches!(err, ndgr_client::NdgrError::Protocol(_)));
}

#[tokio::test]
async fn backward_entry_ends_the_driver() {
    let server = MockStreamServer::start().await;
    server.set_response(
        "/view?at=now",
        encode_frames(&[fixtures::chunked_entry_backward("https://example.test/backward/1")]),
    );

    let session = HttpSession::new(&ClientConfig::default()).expect("session");
    let view_uri = server.url("/view");
    let mut driver = Box::pin(drive(session, view_uri, ClientConfig::default()));

    match driver.next().await.expect("one event").expect("ok") {
        ViewDriverEvent::Backward { uri } => assert_eq!(uri, "https://example.test/backward/1"),
        ViewDriverEvent::Segment(_) => panic!("expected backward entry"),
    }
    assert!(driver.next().await.is_none(), "driver ends after backward");
}
