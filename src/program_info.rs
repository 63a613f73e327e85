//! [`ProgramInfo`] and the Program Info Resolver (spec.md §4.C).

use crate::channel_map::ChannelAliasMap;
use crate::config::ClientConfig;
use crate::error::{NdgrError, Result};
use crate::handle::ProgramHandle;
use crate::session::HttpSession;
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramStatus {
    BeforeRelease,
    OnAir,
    Ended,
}

impl ProgramStatus {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "BEFORE_RELEASE" => Ok(ProgramStatus::BeforeRelease),
            "ON_AIR" => Ok(ProgramStatus::OnAir),
            "ENDED" => Ok(ProgramStatus::Ended),
            other => Err(NdgrError::Protocol(format!("unknown program status: {other}"))),
        }
    }
}

/// Immutable snapshot of a program (spec.md §3 `ProgramInfo`). Repeated
/// resolver calls may observe different values across time; callers never
/// mutate an instance they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub program_id: String,
    pub title: String,
    pub description: String,
    pub status: ProgramStatus,
    pub open_time: DateTime<Utc>,
    pub begin_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub scheduled_end_time: DateTime<Utc>,
    /// Seconds-resolution vpos base time.
    pub vpos_base_time: DateTime<Utc>,
    /// Possibly empty; the WebSocket entry URL for the View-URI Acquirer.
    pub web_socket_url: String,
}

#[derive(Deserialize)]
struct EmbeddedData {
    program: EmbeddedProgram,
    site: EmbeddedSite,
}

#[derive(Deserialize)]
struct EmbeddedProgram {
    #[serde(rename = "nicoliveProgramId")]
    nicolive_program_id: String,
    title: String,
    description: String,
    status: String,
    #[serde(rename = "openTime")]
    open_time: i64,
    #[serde(rename = "beginTime")]
    begin_time: i64,
    #[serde(rename = "vposBaseTime")]
    vpos_base_time: i64,
    #[serde(rename = "endTime")]
    end_time: i64,
    #[serde(rename = "scheduledEndTime")]
    scheduled_end_time: i64,
}

#[derive(Deserialize)]
struct EmbeddedSite {
    relive: EmbeddedRelive,
}

#[derive(Deserialize)]
struct EmbeddedRelive {
    #[serde(rename = "webSocketUrl")]
    web_socket_url: String,
}

fn unix(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
}

fn watch_page_url(config: &ClientConfig, program_id: &str) -> String {
    format!("{}/watch/{program_id}", config.live_base_url)
}

fn channel_live_page_url(config: &ClientConfig, channel_alias: &str) -> String {
    format!("{}/{channel_alias}/live", config.channel_base_url)
}

/// Resolves a [`ProgramHandle`] to a [`ProgramInfo`] snapshot, following the
/// stale-handle fallback and timeshift-activation procedure of spec.md
/// §4.C.
pub struct ProgramInfoResolver<'a> {
    session: &'a HttpSession,
    alias_map: &'a ChannelAliasMap,
    config: &'a ClientConfig,
}

impl<'a> ProgramInfoResolver<'a> {
    pub fn new(session: &'a HttpSession, alias_map: &'a ChannelAliasMap, config: &'a ClientConfig) -> Self {
        Self {
            session,
            alias_map,
            config,
        }
    }

    /// Run the full 4-step resolution procedure for `handle`.
    pub async fn resolve(&self, handle: &ProgramHandle) -> Result<ProgramInfo> {
        let program_id = handle.resolve_program_id(self.alias_map)?;
        let mut info = self.fetch_watch_page(&program_id).await?;

        if handle.is_channel() {
            info = self.apply_stale_handle_fallback(handle, info).await;
        }

        if info.status == ProgramStatus::Ended
            && info.web_socket_url.is_empty()
            && self.has_login_credentials(&info.program_id)
        {
            info = self.activate_timeshift(info).await?;
        }

        Ok(info)
    }

    /// Step 1: fetch the watch page and parse its embedded JSON.
    async fn fetch_watch_page(&self, program_id: &str) -> Result<ProgramInfo> {
        let url = watch_page_url(self.config, program_id);
        let html = self
            .session
            .client()
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let document = Html::parse_document(&html);
        let selector = Selector::parse("#embedded-data")
            .map_err(|e| NdgrError::Protocol(format!("invalid embedded-data selector: {e}")))?;
        let element = document
            .select(&selector)
            .next()
            .ok_or_else(|| NdgrError::Protocol("watch page missing #embedded-data".to_owned()))?;
        let props = element
            .value()
            .attr("data-props")
            .ok_or_else(|| NdgrError::Protocol("embedded-data missing data-props".to_owned()))?;

        let embedded: EmbeddedData = serde_json::from_str(props)
            .map_err(|e| NdgrError::Protocol(format!("malformed embedded-data JSON: {e}")))?;

        Ok(ProgramInfo {
            program_id: embedded.program.nicolive_program_id,
            title: embedded.program.title,
            description: embedded.program.description,
            status: ProgramStatus::parse(&embedded.program.status)?,
            open_time: unix(embedded.program.open_time),
            begin_time: unix(embedded.program.begin_time),
            end_time: unix(embedded.program.end_time),
            scheduled_end_time: unix(embedded.program.scheduled_end_time),
            vpos_base_time: unix(embedded.program.vpos_base_time),
            web_socket_url: embedded.site.relive.web_socket_url,
        })
    }

    /// Step 2: stale-handle fallback. Any failure here is swallowed; the
    /// original `info` is returned unchanged.
    async fn apply_stale_handle_fallback(&self, handle: &ProgramHandle, info: ProgramInfo) -> ProgramInfo {
        let ProgramHandle::Channel(alias) = handle else {
            return info;
        };
        if info.status != ProgramStatus::Ended {
            return info;
        }
        let grace = chrono::Duration::from_std(self.config.stale_handle_grace_period).unwrap_or_default();
        if Utc::now() <= info.end_time + grace {
            return info;
        }

        match self.current_live_program_id(alias).await {
            Ok(Some(live_id)) if live_id != info.program_id => {
                self.fetch_watch_page(&live_id).await.unwrap_or(info)
            }
            _ => info,
        }
    }

    async fn current_live_program_id(&self, channel_alias: &str) -> Result<Option<String>> {
        let url = channel_live_page_url(self.config, channel_alias);
        let html = self
            .session
            .client()
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let document = Html::parse_document(&html);
        let selector = Selector::parse("#live_now a")
            .map_err(|e| NdgrError::Protocol(format!("invalid live_now selector: {e}")))?;
        let Some(element) = document.select(&selector).next() else {
            return Ok(None);
        };
        let href = element.value().attr("href").unwrap_or_default();
        Ok(href.rsplit('/').next().map(str::to_owned))
    }

    /// Whether the session looks like it carries login credentials for the
    /// watch page host, per spec.md §4.C step 3.
    fn has_login_credentials(&self, program_id: &str) -> bool {
        reqwest::Url::parse(&watch_page_url(self.config, program_id))
            .map(|url| self.session.has_credentials(&url))
            .unwrap_or(false)
    }

    /// Step 3: timeshift activation.
    async fn activate_timeshift(&self, info: ProgramInfo) -> Result<ProgramInfo> {
        let reservation_url = format!(
            "{}/api/v2/programs/{}/timeshift/reservation",
            self.config.live_base_url, info.program_id
        );
        let (header_name, header_value) = HttpSession::frontend_id_header();

        let reserve_response = self
            .session
            .client()
            .post(&reservation_url)
            .header(header_name, header_value)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        if reserve_response.status() != reqwest::StatusCode::OK {
            let body: serde_json::Value = reserve_response.json().await.unwrap_or_default();
            let code = body
                .get("meta")
                .and_then(|m| m.get("errorCode"))
                .and_then(|c| c.as_str())
                .unwrap_or_default();
            if code != "DUPLICATED" {
                return Err(NdgrError::Auth(format!(
                    "timeshift reservation failed with code: {code}"
                )));
            }
        }

        self.session
            .client()
            .patch(&reservation_url)
            .header(header_name, header_value)
            .timeout(self.config.request_timeout)
            .send()
            .await?
            .error_for_status()?;

        let refreshed = self.fetch_watch_page(&info.program_id).await?;
        if refreshed.web_socket_url.is_empty() {
            return Err(NdgrError::Protocol(
                "timeshift activated but webSocketUrl is still empty".to_owned(),
            ));
        }
        Ok(refreshed)
    }
}
