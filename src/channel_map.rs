//! External-facing helpers: channel alias resolution and best-effort
//! program listing (spec.md §4.I). Collaborator surface only — the core
//! engine consumes [`ChannelAliasMap::lookup`] but never mutates the map
//! itself.

use crate::config::ClientConfig;
use crate::error::{NdgrError, Result};
use crate::session::HttpSession;
use arc_swap::ArcSwap;
use chrono::NaiveDate;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;

/// Process-wide alias → program-handle table.
///
/// Readers always see a consistent snapshot (spec.md §5: "atomic swap").
/// Writers (only [`ChannelAliasMap::refresh`]) assemble a new table and
/// atomically replace the pointer; in-flight readers keep using the table
/// they already observed.
pub struct ChannelAliasMap {
    inner: ArcSwap<HashMap<String, String>>,
}

impl Default for ChannelAliasMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelAliasMap {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Look up a channel alias's current program handle, if known.
    pub fn lookup(&self, alias: &str) -> Option<String> {
        self.inner.load().get(alias).cloned()
    }

    /// Atomically replace the table with a caller-provided snapshot.
    /// `refresh` itself performs no I/O — see [`update_channel_alias_map`]
    /// for the scraping entry point.
    pub fn replace(&self, table: HashMap<String, String>) {
        self.inner.store(Arc::new(table));
    }

    /// The number of entries currently in the table, mainly for tests and
    /// diagnostics.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every alias currently known, in no particular order. Used by the CLI's
    /// `download all` mode to enumerate channels after a map refresh.
    pub fn aliases(&self) -> Vec<String> {
        self.inner.load().keys().cloned().collect()
    }
}

/// Scrape the auxiliary channel map page and atomically install a fresh
/// alias → handle table. Idempotent under no upstream change (re-running
/// with unchanged source HTML produces the same table, and `replace` is a
/// plain value swap).
pub async fn update_channel_alias_map(
    session: &HttpSession,
    channel_map_url: &str,
    map: &ChannelAliasMap,
    config: &ClientConfig,
) -> Result<()> {
    let html = session
        .client()
        .get(channel_map_url)
        .timeout(config.request_timeout)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let document = Html::parse_document(&html);
    let selector = Selector::parse("a[data-channel-alias][data-program-id]")
        .map_err(|e| NdgrError::Protocol(format!("invalid channel map selector: {e}")))?;

    let mut table = HashMap::new();
    for element in document.select(&selector) {
        let (Some(alias), Some(program_id)) = (
            element.value().attr("data-channel-alias"),
            element.value().attr("data-program-id"),
        ) else {
            continue;
        };
        table.insert(alias.to_owned(), program_id.to_owned());
    }

    map.replace(table);
    Ok(())
}

/// One entry in a [`list_programs_on`] result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramListing {
    pub program_id: String,
    pub title: String,
    pub begin_time: chrono::DateTime<chrono::Utc>,
}

/// Best-effort enumeration of programs on `date` for `channel_alias`,
/// ascending by start time. Programs whose timeshift is disabled are
/// filtered out.
pub async fn list_programs_on(
    session: &HttpSession,
    config: &ClientConfig,
    channel_alias: &str,
    date: NaiveDate,
) -> Result<Vec<ProgramListing>> {
    let url = format!(
        "{base}/{channel_alias}/live?date={date}",
        base = config.channel_base_url,
        date = date.format("%Y-%m-%d")
    );
    let html = session
        .client()
        .get(&url)
        .timeout(config.request_timeout)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let document = Html::parse_document(&html);
    let selector = Selector::parse("li[data-program-id][data-timeshift-enabled]")
        .map_err(|e| NdgrError::Protocol(format!("invalid listing selector: {e}")))?;

    let mut listings = Vec::new();
    for element in document.select(&selector) {
        let value = element.value();
        if value.attr("data-timeshift-enabled") == Some("false") {
            continue;
        }
        let (Some(program_id), Some(title), Some(begin_time_raw)) = (
            value.attr("data-program-id"),
            value.attr("data-title"),
            value.attr("data-begin-time"),
        ) else {
            continue;
        };
        let Ok(begin_secs) = begin_time_raw.parse::<i64>() else {
            continue;
        };
        let Some(begin_time) = chrono::DateTime::from_timestamp(begin_secs, 0) else {
            continue;
        };

        listings.push(ProgramListing {
            program_id: program_id.to_owned(),
            title: title.to_owned(),
            begin_time,
        });
    }

    listings.sort_by_key(|p| p.begin_time);
    Ok(listings)
}
