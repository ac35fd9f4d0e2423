//! Have I Been Pwned API client.
//!
//! One lookup per call, no retries. Status codes map onto
//! [`BreachLookupError`] so the breach check can tell a missing key, a
//! rejected key and an unavailable provider apart.

use std::sync::RwLock;
use std::time::Duration;

use domain::models::BreachedSite;
use domain::services::{BreachLookupError, BreachSource};
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::HibpConfig;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "hibp-api-key";

/// Longest provider error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 512;

/// Errors raised while constructing or reconfiguring the client.
#[derive(Debug, Error)]
pub enum HibpClientError {
    #[error("Invalid HIBP base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
struct Endpoint {
    base_url: Url,
    api_version: String,
}

/// HTTP client for the `breachedaccount` endpoint.
pub struct HibpClient {
    http: reqwest::Client,
    api_key: String,
    truncate_response: bool,
    endpoint: RwLock<Endpoint>,
}

impl HibpClient {
    pub fn new(config: &HibpConfig) -> Result<Self, HibpClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.trim().to_string(),
            truncate_response: config.truncate_response,
            endpoint: RwLock::new(Endpoint {
                base_url: parse_base_url(&config.base_url)?,
                api_version: config.api_version.clone(),
            }),
        })
    }

    /// Current API version path segment, e.g. `v3`.
    pub fn api_version(&self) -> String {
        self.endpoint().api_version
    }

    /// Changes the API version used by subsequent lookups.
    pub fn set_api_version(&self, version: impl Into<String>) {
        let version = version.into();
        if let Ok(mut endpoint) = self.endpoint.write() {
            endpoint.api_version = version;
        }
    }

    /// Changes the base URL used by subsequent lookups.
    pub fn set_base_url(&self, base_url: &str) -> Result<(), HibpClientError> {
        let url = parse_base_url(base_url)?;
        if let Ok(mut endpoint) = self.endpoint.write() {
            endpoint.base_url = url;
        }
        Ok(())
    }

    fn endpoint(&self) -> Endpoint {
        match self.endpoint.read() {
            Ok(endpoint) => endpoint.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// `{base}/{version}/breachedaccount/{email}?truncateResponse={bool}`
    pub fn breached_account_url(&self, email: &str) -> Url {
        let Endpoint {
            mut base_url,
            api_version,
        } = self.endpoint();

        // parse_base_url rejects URLs that cannot carry path segments
        if let Ok(mut segments) = base_url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&api_version)
                .push("breachedaccount")
                .push(email);
        }
        base_url
            .query_pairs_mut()
            .append_pair("truncateResponse", if self.truncate_response { "true" } else { "false" });
        base_url
    }

    /// Looks up every breach the address appears in.
    ///
    /// `Ok(None)` means the provider has no breach on record for the address.
    pub async fn breached_account(
        &self,
        email: &str,
    ) -> Result<Option<Vec<BreachedSite>>, BreachLookupError> {
        if self.api_key.is_empty() {
            return Err(BreachLookupError::NotConfigured);
        }

        let url = self.breached_account_url(email);
        debug!(email = %email, "Querying breach provider");

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let body = response.text().await.map_err(map_transport_error)?;
                let sites: Vec<BreachedSite> = serde_json::from_str(&body)
                    .map_err(|e| BreachLookupError::InvalidResponse(e.to_string()))?;
                Ok(Some(sites))
            }
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::UNAUTHORIZED => Err(BreachLookupError::Unauthorized),
            _ => {
                let mut body = response.text().await.unwrap_or_default();
                truncate_on_char_boundary(&mut body, MAX_ERROR_BODY);
                warn!(
                    email = %email,
                    status = status.as_u16(),
                    "Breach provider returned an unexpected status"
                );
                Err(BreachLookupError::Provider {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl BreachSource for HibpClient {
    async fn breached_account(
        &self,
        email: &str,
    ) -> Result<Option<Vec<BreachedSite>>, BreachLookupError> {
        HibpClient::breached_account(self, email).await
    }
}

fn parse_base_url(raw: &str) -> Result<Url, HibpClientError> {
    let url = Url::parse(raw.trim()).map_err(|_| HibpClientError::InvalidBaseUrl(raw.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(HibpClientError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

fn map_transport_error(err: reqwest::Error) -> BreachLookupError {
    if err.is_timeout() {
        BreachLookupError::Timeout
    } else {
        BreachLookupError::Unreachable(err.to_string())
    }
}

fn truncate_on_char_boundary(body: &mut String, max: usize) {
    if body.len() <= max {
        return;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;
    use std::net::SocketAddr;

    const BREACHES: &str = r#"[
        {"Name":"Dailymotion","Title":"Dailymotion","Domain":"dailymotion.com","BreachDate":"2016-10-20","AddedDate":"2017-08-07T02:51:12Z","PwnCount":85176234,"Description":"","DataClasses":["Email addresses","Passwords"],"IsVerified":true},
        {"Name":"Wattpad","Title":"Wattpad","Domain":"wattpad.com","BreachDate":"2020-06-29","AddedDate":"2020-07-19T22:49:19Z","PwnCount":268765495,"Description":"","DataClasses":["Passwords"],"IsVerified":true}
    ]"#;

    async fn breached_account(
        Path((version, email)): Path<(String, String)>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Response {
        if version != "v3" {
            return (AxumStatus::BAD_REQUEST, "unknown version").into_response();
        }
        if headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) != Some("test-key") {
            return AxumStatus::UNAUTHORIZED.into_response();
        }
        if query.get("truncateResponse").map(String::as_str) != Some("false") {
            return (AxumStatus::BAD_REQUEST, "truncateResponse missing").into_response();
        }

        match email.as_str() {
            "a@x.com" => (AxumStatus::OK, BREACHES).into_response(),
            "empty@x.com" => (AxumStatus::OK, "[]").into_response(),
            "garbled@x.com" => (AxumStatus::OK, "<html>").into_response(),
            "busy@x.com" => (AxumStatus::SERVICE_UNAVAILABLE, "try again later").into_response(),
            "slow@x.com" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                AxumStatus::NOT_FOUND.into_response()
            }
            _ => AxumStatus::NOT_FOUND.into_response(),
        }
    }

    async fn spawn_provider() -> SocketAddr {
        let app = Router::new().route("/api/:version/breachedaccount/:email", get(breached_account));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr, api_key: &str) -> HibpClient {
        HibpClient::new(&HibpConfig {
            api_key: api_key.to_string(),
            base_url: format!("http://{addr}/api"),
            timeout_ms: 500,
            ..HibpConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_breached_account_url() {
        let client = HibpClient::new(&HibpConfig::default()).unwrap();
        assert_eq!(
            client.breached_account_url("a@x.com").as_str(),
            "https://haveibeenpwned.com/api/v3/breachedaccount/a@x.com?truncateResponse=false"
        );
    }

    #[test]
    fn test_url_escapes_path_characters() {
        let client = HibpClient::new(&HibpConfig::default()).unwrap();
        let url = client.breached_account_url("a/b?c@x.com");
        assert!(url.path().ends_with("/breachedaccount/a%2Fb%3Fc@x.com"));
    }

    #[test]
    fn test_api_version_is_mutable() {
        let client = HibpClient::new(&HibpConfig::default()).unwrap();
        client.set_api_version("v4");
        assert_eq!(client.api_version(), "v4");
        assert!(client
            .breached_account_url("a@x.com")
            .path()
            .starts_with("/api/v4/"));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = HibpConfig {
            base_url: "not a url".to_string(),
            ..HibpConfig::default()
        };
        assert!(matches!(
            HibpClient::new(&config),
            Err(HibpClientError::InvalidBaseUrl(_))
        ));

        let client = HibpClient::new(&HibpConfig::default()).unwrap();
        assert!(client.set_base_url("mailto:x@y.z").is_err());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let client = HibpClient::new(&HibpConfig::default()).unwrap();
        let err = client.breached_account("a@x.com").await.unwrap_err();
        assert_eq!(err, BreachLookupError::NotConfigured);
    }

    #[tokio::test]
    async fn test_success_parses_breaches() {
        let addr = spawn_provider().await;
        let sites = client_for(addr, "test-key")
            .breached_account("a@x.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].name, "Dailymotion");
        assert_eq!(sites[1].breach_date.to_string(), "2020-06-29");
        assert_eq!(sites[0].data_classes.len(), 2);
    }

    #[tokio::test]
    async fn test_success_with_empty_list() {
        let addr = spawn_provider().await;
        let sites = client_for(addr, "test-key")
            .breached_account("empty@x.com")
            .await
            .unwrap();
        assert_eq!(sites.map(|s| s.len()), Some(0));
    }

    #[tokio::test]
    async fn test_not_found_is_absent() {
        let addr = spawn_provider().await;
        let result = client_for(addr, "test-key")
            .breached_account("clean@x.com")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let addr = spawn_provider().await;
        let err = client_for(addr, "expired-key")
            .breached_account("a@x.com")
            .await
            .unwrap_err();
        assert_eq!(err, BreachLookupError::Unauthorized);
    }

    #[tokio::test]
    async fn test_other_status_carries_status_and_body() {
        let addr = spawn_provider().await;
        let err = client_for(addr, "test-key")
            .breached_account("busy@x.com")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BreachLookupError::Provider {
                status: 503,
                body: "try again later".to_string()
            }
        );
        assert!(!err.is_network_failure());
    }

    #[tokio::test]
    async fn test_unparseable_body() {
        let addr = spawn_provider().await;
        let err = client_for(addr, "test-key")
            .breached_account("garbled@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, BreachLookupError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let addr = spawn_provider().await;
        let err = client_for(addr, "test-key")
            .breached_account("slow@x.com")
            .await
            .unwrap_err();
        assert_eq!(err, BreachLookupError::Timeout);
    }

    #[tokio::test]
    async fn test_unreachable_provider() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(addr, "test-key")
            .breached_account("a@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, BreachLookupError::Unreachable(_)));
        assert!(err.is_network_failure());
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        let mut body = "é".repeat(400);
        truncate_on_char_boundary(&mut body, 511);
        assert_eq!(body.len(), 510);
    }
}
