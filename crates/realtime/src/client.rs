//! REST client for the realtime database.
//!
//! Paths are relative to the configured namespace; the `.json` suffix and
//! optional auth token are appended here so callers never build URLs.

use log::debug;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::error::{RealtimeError, Result};

/// Default timeout for realtime DB requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the realtime database REST surface.
#[derive(Debug, Clone)]
pub struct RealtimeDbClient {
    client: reqwest::Client,
    base_url: String,
    namespace: String,
    auth: Option<String>,
}

impl RealtimeDbClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The database root (e.g., "https://lumen-site.firebaseio.example")
    /// * `namespace` - Top-level node all documents live under (e.g., "site")
    /// * `auth` - Optional access token appended to every request
    pub fn new(base_url: &str, namespace: &str, auth: Option<String>) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(RealtimeError::invalid_config("base URL cannot be empty"));
        }
        if namespace.trim().is_empty() {
            return Err(RealtimeError::invalid_config("namespace cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            namespace: namespace.trim_matches('/').to_string(),
            auth,
        })
    }

    /// Builds the full URL for a node path.
    pub(crate) fn url(&self, path: &str) -> String {
        let mut url = format!(
            "{}/{}/{}.json",
            self.base_url,
            self.namespace,
            path.trim_matches('/')
        );
        if let Some(token) = &self.auth {
            url.push_str("?auth=");
            url.push_str(token);
        }
        url
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RealtimeError::api(status.as_u16(), body))
    }

    /// Writes the full document at `path`, replacing whatever was there.
    pub async fn put(&self, path: &str, body: &Value) -> Result<()> {
        let url = self.url(path);
        debug!("PUT {}", path);
        let response = self.client.put(&url).json(body).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Merges `body` into the document at `path`: named children are
    /// overwritten, everything else is untouched.
    pub async fn patch(&self, path: &str, body: &Value) -> Result<()> {
        let url = self.url(path);
        debug!("PATCH {}", path);
        let response = self.client.patch(&url).json(body).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Deletes the node at `path`. A node that is already gone is success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        debug!("DELETE {}", path);
        let response = self.client.delete(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Reads the node at `path`. The store answers `null` for missing nodes,
    /// which maps to `None`.
    pub async fn get(&self, path: &str) -> Result<Option<Value>> {
        let url = self.url(path);
        let response = self.client.get(&url).send().await?;
        let response = Self::ensure_success(response).await?;
        let value: Value = response.json().await?;
        Ok(match value {
            Value::Null => None,
            other => Some(other),
        })
    }

    /// Opens the store's event-stream mode on `path`.
    pub async fn stream(&self, path: &str) -> Result<Response> {
        let url = self.url(path);
        debug!("STREAM {}", path);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        Self::ensure_success(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client =
            RealtimeDbClient::new("https://db.example/", "site", None).unwrap();
        assert_eq!(
            client.url("bundles/key-1"),
            "https://db.example/site/bundles/key-1.json"
        );
    }

    #[test]
    fn test_url_appends_auth_token() {
        let client =
            RealtimeDbClient::new("https://db.example", "site", Some("secret".to_string()))
                .unwrap();
        assert_eq!(
            client.url("/bundles/"),
            "https://db.example/site/bundles.json?auth=secret"
        );
    }

    #[test]
    fn test_empty_config_is_rejected() {
        assert!(RealtimeDbClient::new("", "site", None).is_err());
        assert!(RealtimeDbClient::new("https://db.example", " ", None).is_err());
    }
}
