//! HTTP client for the config and serve endpoints.
//!
//! One `reqwest::Client` built at engine construction with the backend's
//! tolerated timeouts (30s connect/read, 60s total). Config fetches retry
//! a bounded number of times with fixed spacing and then give up -- a sync
//! failure is never fatal to the host, the last-known config simply stays
//! active. Pushes are a single attempt: the server echo after a write is
//! authoritative and callers re-read from it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::{normalize_categories, TriggerConfig};
use crate::error::{ConfigSyncError, ShowError};

/// Maximum config fetch attempts before giving up.
pub const FETCH_ATTEMPTS: u32 = 3;
/// Fixed spacing between fetch attempts.
pub const FETCH_BACKOFF: Duration = Duration::from_millis(1200);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(30);
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Config document as exchanged with `/v1/apps/{app_id}/config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub app_id: String,
    pub config: TriggerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UpdateConfigRequest {
    config: TriggerConfig,
}

/// A playable ad descriptor. `ad: null` in the serve response means no-fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ad {
    #[serde(default)]
    pub ad_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub video_url: String,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ServeResponse {
    ad: Option<Ad>,
    #[serde(default)]
    #[allow(dead_code)]
    mode: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    requested_categories: Option<Vec<String>>,
}

/// Client for the remote config service and the ad-serving endpoint.
pub struct AdsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AdsClient {
    /// Build a client against `base_url`, normalized to exactly one trailing
    /// slash so endpoint paths join predictably.
    pub fn new(base_url: &str) -> Result<Self, ConfigSyncError> {
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalized)?;
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .timeout(CALL_TIMEOUT)
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn config_url(&self, app_id: &str) -> Result<Url, ConfigSyncError> {
        Ok(self.base_url.join(&format!("v1/apps/{app_id}/config"))?)
    }

    /// Fetch the stored config, retrying up to [`FETCH_ATTEMPTS`] times with
    /// [`FETCH_BACKOFF`] spacing. The final failure is returned wrapped in
    /// [`ConfigSyncError::Exhausted`]; callers absorb it and keep their
    /// last-known config.
    pub async fn fetch_config(&self, app_id: &str) -> Result<TriggerConfig, ConfigSyncError> {
        let mut attempt = 1;
        loop {
            match self.fetch_config_once(app_id).await {
                Ok(config) => return Ok(config),
                Err(err) if attempt < FETCH_ATTEMPTS => {
                    warn!(attempt, error = %err, "config fetch failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(FETCH_BACKOFF).await;
                }
                Err(err) => {
                    return Err(ConfigSyncError::Exhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
            }
        }
    }

    async fn fetch_config_once(&self, app_id: &str) -> Result<TriggerConfig, ConfigSyncError> {
        let url = self.config_url(app_id)?;
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(ConfigSyncError::Status(resp.status()));
        }
        let doc: ConfigDocument = resp.json().await?;
        Ok(doc.config)
    }

    /// Push a developer override. The response is the server's authoritative
    /// echo, which becomes the new active config.
    pub async fn push_config(
        &self,
        app_id: &str,
        config: &TriggerConfig,
    ) -> Result<TriggerConfig, ConfigSyncError> {
        let url = self.config_url(app_id)?;
        let resp = self
            .http
            .put(url)
            .json(&UpdateConfigRequest {
                config: config.clone(),
            })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ConfigSyncError::Status(resp.status()));
        }
        let doc: ConfigDocument = resp.json().await?;
        Ok(doc.config)
    }

    /// Request one ad filtered by `categories` (comma-joined, uppercased;
    /// omitted entirely when empty so the backend falls back to all
    /// categories). `Ok(None)` is no-fill, a normal outcome.
    pub async fn serve_ad(
        &self,
        app_id: &str,
        categories: &[String],
    ) -> Result<Option<Ad>, ShowError> {
        let url = self
            .base_url
            .join("v1/serve")
            .map_err(|e| ShowError::Presentation(e.to_string()))?;

        let mut req = self
            .http
            .get(url)
            .query(&[("app_id", app_id), ("mode", "RANDOM")]);
        let joined = normalize_categories(categories.iter().map(String::as_str)).join(",");
        if !joined.is_empty() {
            req = req.query(&[("categories", joined.as_str())]);
        }

        let resp = req.send().await?;
        // The backend answers no-fill with 204 and an empty body.
        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            debug!(app_id, "serve returned no fill");
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(ShowError::Status(resp.status()));
        }
        let body: ServeResponse = resp.json().await?;
        Ok(body.ad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_exactly_one_trailing_slash() {
        let client = AdsClient::new("http://ads.example.com///").unwrap();
        assert_eq!(client.base_url().as_str(), "http://ads.example.com/");

        let client = AdsClient::new("  http://ads.example.com/v2  ").unwrap();
        assert_eq!(client.base_url().as_str(), "http://ads.example.com/v2/");
    }

    #[test]
    fn config_url_joins_under_base_path() {
        let client = AdsClient::new("http://ads.example.com/sandbox").unwrap();
        assert_eq!(
            client.config_url("demo_app").unwrap().as_str(),
            "http://ads.example.com/sandbox/v1/apps/demo_app/config"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            AdsClient::new("not a url"),
            Err(ConfigSyncError::BaseUrl(_))
        ));
    }

    #[test]
    fn serve_response_ad_null_is_no_fill() {
        let body = r#"{"ad": null, "mode": "RANDOM", "requested_categories": ["SPORT"]}"#;
        let resp: ServeResponse = serde_json::from_str(body).unwrap();
        assert!(resp.ad.is_none());
    }
}
