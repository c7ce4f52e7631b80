use std::time::Duration;

use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::CatalogConfig;

use super::models::{Card, PokemonSet};

/// Failure while talking to the catalog. Never escapes the public client API.
#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog returned status {0}")]
    Status(StatusCode),
    #[error("failed to decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Legality format used to narrow set searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Standard rotation.
    Standard,
    /// Expanded format.
    Expanded,
    /// Every card ever printed.
    Unlimited,
}

impl Format {
    fn as_str(self) -> &'static str {
        match self {
            Format::Standard => "standard",
            Format::Expanded => "expanded",
            Format::Unlimited => "unlimited",
        }
    }
}

/// Parameters for [`CatalogClient::search_sets`].
#[derive(Debug, Clone, Default)]
pub struct SetQuery {
    /// Wildcard match against set name or series.
    pub name: Option<String>,
    /// Exact series name.
    pub series: Option<String>,
    /// Release year prefix such as `2023`.
    pub release_year: Option<String>,
    /// Only sets legal in this format.
    pub format: Option<Format>,
    /// 1-based page; `None` means the first page.
    pub page: Option<u32>,
    /// Page size; `None` uses the configured default.
    pub page_size: Option<u32>,
}

/// Read-only client for the public card catalog.
///
/// Every lookup degrades instead of failing: list calls return an empty
/// vector and single-entity calls return `None`, with the cause logged.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    config: CatalogConfig,
}

impl CatalogClient {
    /// Build a client from configuration.
    pub fn new(config: CatalogConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, config }
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Free-text card search by name. A query of the form `a OR b` matches either name.
    pub async fn search_cards(
        &self,
        query: Option<&str>,
        page: u32,
        page_size: Option<u32>,
    ) -> Vec<Card> {
        let mut params = paging(page, page_size.unwrap_or(self.config.card_page_size));
        if let Some(q) = query.and_then(card_search_query) {
            params.push(("q", q));
        }
        params.push(("orderBy", "-set.releaseDate,name".to_string()));

        self.fetch_list("cards", &params, "card search").await
    }

    /// Fetch a single card; `None` when it does not exist or the request failed.
    pub async fn card(&self, card_id: &str) -> Option<Card> {
        self.fetch_one(&format!("cards/{card_id}"), card_id).await
    }

    /// Fetch a single set; `None` when it does not exist or the request failed.
    pub async fn set(&self, set_id: &str) -> Option<PokemonSet> {
        self.fetch_one(&format!("sets/{set_id}"), set_id).await
    }

    /// Cards belonging to one set, ordered by collector number.
    pub async fn cards_in_set(&self, set_id: &str, page: u32, page_size: Option<u32>) -> Vec<Card> {
        let mut params = paging(page, page_size.unwrap_or(self.config.set_card_page_size));
        params.push(("orderBy", "number".to_string()));
        params.push(("q", format!("set.id:{set_id}")));

        self.fetch_list("cards", &params, "set card listing").await
    }

    /// Search sets, newest first.
    pub async fn search_sets(&self, query: &SetQuery) -> Vec<PokemonSet> {
        let mut params = vec![("orderBy", "-releaseDate".to_string())];
        params.extend(paging(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(self.config.set_page_size),
        ));
        if let Some(q) = set_search_query(query) {
            params.push(("q", q));
        }

        self.fetch_list("sets", &params, "set search").await
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        what: &str,
    ) -> Vec<T> {
        match self.fetch::<Vec<T>>(path, params).await {
            Ok(Some(items)) => items,
            Ok(None) => {
                warn!(path, "Catalog {what} returned not found");
                Vec::new()
            }
            Err(err) => {
                error!(path, error = %err, "Catalog {what} failed");
                Vec::new()
            }
        }
    }

    async fn fetch_one<T: DeserializeOwned>(&self, path: &str, id: &str) -> Option<T> {
        match self.fetch::<T>(path, &[]).await {
            Ok(found) => {
                if found.is_none() {
                    debug!(id, "Catalog entry not found");
                }
                found
            }
            Err(err) => {
                error!(id, error = %err, "Catalog lookup failed");
                None
            }
        }
    }

    /// Issue a GET and unwrap the `data` envelope. HTTP 404 maps to `Ok(None)`.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, CatalogError> {
        let url = format!("{}/{}", self.config.base_url, path);
        let mut request = self.http.get(&url).query(params);
        if let Some(key) = &self.config.api_key {
            request = request.header("X-Api-Key", key);
        }

        debug!(%url, "Fetching from catalog");
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        let body = response.bytes().await?;
        let envelope: DataEnvelope<T> = serde_json::from_slice(&body)?;
        Ok(Some(envelope.data))
    }
}

fn paging(page: u32, page_size: u32) -> Vec<(&'static str, String)> {
    vec![
        ("page", page.max(1).to_string()),
        ("pageSize", page_size.to_string()),
    ]
}

/// Lucene-style name query for the card search endpoint.
pub(crate) fn card_search_query(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    if query.contains(" OR ") {
        let names: Vec<String> = query
            .split(" OR ")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| format!("name:\"*{name}*\""))
            .collect();
        return Some(format!("({})", names.join(" OR ")));
    }
    Some(format!("name:\"*{query}*\""))
}

pub(crate) fn set_search_query(query: &SetQuery) -> Option<String> {
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let mut parts = Vec::new();
    if let Some(name) = non_empty(&query.name) {
        parts.push(format!("(name:\"*{name}*\" OR series:\"*{name}*\")"));
    }
    if let Some(series) = non_empty(&query.series) {
        parts.push(format!("series:\"{series}\""));
    }
    if let Some(year) = non_empty(&query.release_year) {
        parts.push(format!("releaseDate:{year}*"));
    }
    if let Some(format) = query.format {
        parts.push(format!("legalities.{}:Legal", format.as_str()));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" AND "))
    }
}
