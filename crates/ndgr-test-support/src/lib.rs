//! Mock servers and fixture builders for testing the NDGR comment
//! acquisition engine, mirroring the role `rt-test-utils` plays in the
//! timer workspace.

pub mod delayed_http_server;
pub mod fixtures;
pub mod framing;
pub mod mock_stream_server;
pub mod mock_view_ws_server;

pub use delayed_http_server::DelayedHttpServer;
pub use mock_stream_server::MockStreamServer;
pub use mock_view_ws_server::MockViewWsServer;
