//! One long-lived HTTP session per [`crate::NdgrClient`], carrying cookies
//! and default headers (spec.md §9 "Ownership of HTTP sessions").
//!
//! Credentialed login is treated as an opaque, external collaborator
//! (spec.md §1): this module's `login` only performs the POST and lets the
//! underlying `reqwest` cookie jar retain whatever session cookie the
//! service issues. The session carries no notion of "logged in" state of
//! its own.

use crate::error::{NdgrError, Result};
use reqwest::cookie::CookieStore;
use std::sync::Arc;

/// User-Agent presented on every HTTP request and the WebSocket handshake,
/// matching the fixed value the upstream client impersonates.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

const FRONTEND_ID_HEADER: &str = "x-frontend-id";
const FRONTEND_ID_VALUE: &str = "9";

/// A shared HTTP session: one `reqwest::Client` with a cookie jar, reused
/// across every request the client makes.
///
/// The cookie jar is held explicitly (rather than via `cookie_store(true)`)
/// so [`HttpSession::has_credentials`] can inspect it directly instead of
/// round-tripping a request.
#[derive(Clone)]
pub struct HttpSession {
    client: reqwest::Client,
    jar: Arc<reqwest::cookie::Jar>,
}

impl HttpSession {
    pub fn new(config: &crate::config::ClientConfig) -> Result<Self> {
        let jar = Arc::new(reqwest::cookie::Jar::default());
        // No total-request `.timeout()` here: this client also issues the
        // streaming View/Segment GETs (`crate::fetcher`), whose bodies can
        // legitimately stay open far longer than a single non-streaming
        // request should. Streaming reads are bounded instead by
        // `stream_read_idle_timeout`; non-streaming calls apply
        // `request_timeout` per-request on their own builder.
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(jar.clone())
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { client, jar })
    }

    /// The shared `reqwest::Client`. Per-request overrides (e.g. the
    /// timeshift endpoints' `x-frontend-id` header) are applied locally to
    /// individual requests, never mutated globally on this client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// POST credentials to the login endpoint. On success the service's
    /// `Set-Cookie` response header is retained by the cookie jar
    /// automatically; the caller only needs to check for the confirming
    /// `x-niconico-id` response header.
    pub async fn login(&self, mail: &str, password: &str, config: &crate::config::ClientConfig) -> Result<()> {
        let response = self
            .client
            .post("https://account.nicovideo.jp/api/v1/login")
            .form(&[("mail", mail), ("password", password)])
            .timeout(config.request_timeout)
            .send()
            .await?;

        if response.headers().contains_key("x-niconico-id") {
            Ok(())
        } else {
            Err(NdgrError::Auth(
                "login rejected: no x-niconico-id in response".to_owned(),
            ))
        }
    }

    /// Whether this session currently carries a cookie for `url` — used as
    /// the "session carries login credentials" test in timeshift
    /// activation (spec.md §4.C step 3). The engine does not otherwise
    /// track a logged-in/out flag of its own.
    pub fn has_credentials(&self, url: &reqwest::Url) -> bool {
        self.jar.cookies(url).is_some()
    }

    pub fn frontend_id_header() -> (&'static str, &'static str) {
        (FRONTEND_ID_HEADER, FRONTEND_ID_VALUE)
    }
}

/// A shared handle to an [`HttpSession`], cheap to clone across tasks.
pub type SharedSession = Arc<HttpSession>;
