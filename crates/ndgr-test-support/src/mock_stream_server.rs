//! A mock HTTP server serving pre-recorded length-prefixed protobuf bodies
//! keyed by path+query, for testing the Protobuf Fetcher, View Stream
//! Driver, Segment Worker Pool, and Backward Walker against real
//! `reqwest`/TCP I/O. Mirrors `MockWsServer` in shape: binds to a random
//! port, runs its accept loop in a background task, and is torn down when
//! dropped.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type Routes = Arc<Mutex<HashMap<String, Vec<u8>>>>;

/// A mock streaming-HTTP server for integration tests.
pub struct MockStreamServer {
    addr: SocketAddr,
    routes: Routes,
    _task: tokio::task::JoinHandle<()>,
}

impl MockStreamServer {
    /// Start the server, binding to a random available port.
    pub async fn start() -> Self {
        let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
        let dispatch_routes = routes.clone();

        let app = Router::new().fallback(move |req: Request<Body>| {
            let routes = dispatch_routes.clone();
            async move { Self::dispatch(routes, req).await }
        });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock stream server");
        let addr = listener.local_addr().expect("local_addr");

        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock stream server");
        });

        Self {
            addr,
            routes,
            _task: task,
        }
    }

    async fn dispatch(routes: Routes, req: Request<Body>) -> Response {
        let key = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_default();
        let body = routes.lock().expect("routes lock").get(&key).cloned();
        match body {
            Some(bytes) => bytes.into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    /// The address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build a full URL for a given `path?query` served by this instance.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    /// Register the bytes to serve for an exact `path?query` key.
    pub fn set_response(&self, path_and_query: &str, body: Vec<u8>) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(path_and_query.to_owned(), body);
    }
}
