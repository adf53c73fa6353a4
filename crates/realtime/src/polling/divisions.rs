//! Class division lookup with a short-lived cache
//!
//! The division list changes rarely but is requested by every filter
//! panel render, so responses are cached for a few minutes keyed by a
//! token prefix rather than refetched each time.

use serde::Deserialize;

use campusline_shared::{ClassDivision, SessionToken};

use crate::cache::DivisionCache;
use crate::config::RealtimeConfig;
use crate::error::{FetchError, FetchResult};

#[derive(Debug, Deserialize)]
struct DivisionListResponse {
    class_divisions: Vec<ClassDivision>,
}

/// Cached access to the class division endpoint
pub struct DivisionDirectory {
    http: reqwest::Client,
    base_url: String,
    cache: DivisionCache,
}

impl DivisionDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_cache(base_url, DivisionCache::new())
    }

    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::with_cache(
            config.api_url.clone(),
            DivisionCache::with_ttl(config.division_cache_ttl),
        )
    }

    pub fn with_cache(base_url: impl Into<String>, cache: DivisionCache) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            cache,
        }
    }

    /// Divisions visible to the session, served from cache when fresh
    pub async fn class_divisions(&self, token: &SessionToken) -> FetchResult<Vec<ClassDivision>> {
        if let Some(divisions) = self.cache.get(token.prefix()) {
            tracing::debug!("class divisions served from cache");
            return Ok(divisions);
        }

        let url = format!("{}/class-divisions", self.base_url);
        let response = self.http.get(&url).bearer_auth(token.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| String::new());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let divisions = response.json::<DivisionListResponse>().await?.class_divisions;
        self.cache.set(token.prefix(), divisions.clone());
        Ok(divisions)
    }

    /// Drop the cached list for this session
    pub fn invalidate(&self, token: &SessionToken) {
        self.cache.invalidate(token.prefix());
    }
}
