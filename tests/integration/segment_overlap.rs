//! Segment Worker Pool: duplicate-URI dedup and genuine two-segment overlap,
//! against a real `reqwest`/TCP round trip.

use ndgr_client::config::ClientConfig;
use ndgr_client::segment_pool::SegmentWorkerPool;
use ndgr_client::session::HttpSession;
use ndgr_client::SegmentDescriptor;
use ndgr_test_support::fixtures;
use ndgr_test_support::framing::encode_frames;
use ndgr_test_support::MockStreamServer;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn descriptor(uri: &str) -> SegmentDescriptor {
    SegmentDescriptor {
        uri: uri.to_owned(),
        from: chrono::DateTime::from_timestamp(100, 0).unwrap(),
        until: chrono::DateTime::from_timestamp(200, 0).unwrap(),
    }
}

#[tokio::test]
async fn accepting_the_same_uri_twice_spawns_only_one_worker() {
    let server = MockStreamServer::start().await;
    server.set_response(
        "/seg/1",
        encode_frames(&[fixtures::chat_message("c1", 150, 345, "hello")]),
    );

    let session = HttpSession::new(&ClientConfig::default()).expect("session");
    let (tx, mut rx) = mpsc::channel(8);
    let pool = SegmentWorkerPool::new(session, ClientConfig::default(), tx, CancellationToken::new());

    let uri = server.url("/seg/1");
    pool.accept(descriptor(&uri));
    pool.accept(descriptor(&uri));
    assert_eq!(pool.active_count(), 1, "duplicate accept must not spawn twice");

    let comment = rx.recv().await.expect("one comment from the single worker");
    assert_eq!(comment.id, "c1");

    // The worker retires once its stream ends; no second comment follows.
    let second = tokio::time::timeout(std::time::Duration::from_millis(200), rx.recv()).await;
    assert!(matches!(second, Ok(None) | Err(_)), "no duplicate comment delivery");
}

#[tokio::test]
async fn two_distinct_segments_drain_concurrently() {
    let server = MockStreamServer::start().await;
    server.set_response(
        "/seg/a",
        encode_frames(&[fixtures::chat_message("a1", 150, 345, "from-a")]),
    );
    server.set_response(
        "/seg/b",
        encode_frames(&[fixtures::chat_message("b1", 160, 345, "from-b")]),
    );

    let session = HttpSession::new(&ClientConfig::default()).expect("session");
    let (tx, mut rx) = mpsc::channel(8);
    let pool = SegmentWorkerPool::new(session, ClientConfig::default(), tx, CancellationToken::new());

    let uri_a = server.url("/seg/a");
    let uri_b = server.url("/seg/b");
    pool.accept(descriptor(&uri_a));
    pool.accept(descriptor(&uri_b));
    assert_eq!(pool.active_count(), 2, "distinct URIs both get a worker");

    let mut seen = std::collections::HashSet::new();
    for _ in 0..2 {
        let comment = rx.recv().await.expect("comment from one of the two workers");
        seen.insert(comment.id);
    }
    assert_eq!(seen, std::collections::HashSet::from(["a1".to_owned(), "b1".to_owned()]));

    // Give both workers a moment to retire after their streams close.
    for _ in 0..50 {
        if pool.active_count() == 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(pool.active_count(), 0);
}
