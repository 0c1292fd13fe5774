//! Authenticator implementation
//!
//! Applies bearer tokens to requests and manages token acquisition for
//! SharePoint add-in credentials: realm discovery from the site's
//! `WWW-Authenticate` challenge, then a client-credentials grant against ACS.

use super::types::{AuthConfig, CachedToken, SHAREPOINT_PRINCIPAL};
use crate::error::{Error, Result};
use crate::spec::Spec;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

static REALM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"realm="([^"]+)""#).expect("realm pattern is valid"));

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached access token
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Add-in credentials authenticator for a prepared spec
    pub fn from_spec(spec: &Spec) -> Self {
        Self::new(AuthConfig::AddinClientCredentials {
            site_url: spec.site_url.clone(),
            client_id: spec.client_id.clone(),
            client_secret: spec.client_secret.clone(),
            realm: spec.realm.clone(),
            token_url: spec.token_url.clone(),
        })
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::None => Ok(req),
            AuthConfig::Bearer { token } => Ok(req.bearer_auth(token)),
            AuthConfig::AddinClientCredentials { .. } => {
                let token = self.get_or_refresh_token().await?;
                Ok(req.bearer_auth(token))
            }
        }
    }

    /// Get a valid token, refreshing if necessary
    async fn get_or_refresh_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the write lock.
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.fetch_new_token().await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Fetch a new token based on auth type
    async fn fetch_new_token(&self) -> Result<CachedToken> {
        let AuthConfig::AddinClientCredentials {
            site_url,
            client_id,
            client_secret,
            realm,
            token_url,
        } = &self.config
        else {
            return Err(Error::auth(
                "Token refresh not supported for this auth type",
            ));
        };

        let realm = match realm {
            Some(realm) => realm.clone(),
            None => self.discover_realm(site_url).await?,
        };

        let host = url::Url::parse(site_url)?
            .host_str()
            .ok_or_else(|| Error::config(format!("site_url {site_url:?} has no host")))?
            .to_string();

        let token_url = token_url.clone().unwrap_or_else(|| {
            format!("https://accounts.accesscontrol.windows.net/{realm}/tokens/OAuth/2")
        });

        let form = [
            ("grant_type", "client_credentials".to_string()),
            ("client_id", format!("{client_id}@{realm}")),
            ("client_secret", client_secret.clone()),
            ("resource", format!("{SHAREPOINT_PRINCIPAL}/{host}@{realm}")),
        ];

        debug!(%token_url, %realm, "requesting add-in access token");
        let response = self
            .http_client
            .post(&token_url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::OAuth2 {
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        Ok(token_response.into_cached_token())
    }

    /// Ask the site for its realm via an unauthenticated challenge
    async fn discover_realm(&self, site_url: &str) -> Result<String> {
        let probe = format!("{}/_vti_bin/client.svc", site_url.trim_end_matches('/'));
        let response = self
            .http_client
            .get(&probe)
            .header("Authorization", "Bearer")
            .send()
            .await
            .map_err(Error::Http)?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Err(Error::auth(format!(
                "Expected a 401 challenge from {probe}, got {}",
                response.status().as_u16()
            )));
        }

        response
            .headers()
            .get_all("www-authenticate")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(parse_realm)
            .ok_or_else(|| Error::auth(format!("No realm in the challenge from {probe}")))
    }

    /// Clear the cached token
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.config {
            AuthConfig::None => "none",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::AddinClientCredentials { .. } => "addin_client_credentials",
        };
        f.debug_struct("Authenticator")
            .field("kind", &kind)
            .finish_non_exhaustive()
    }
}

/// Extract the realm from a `WWW-Authenticate` header value
pub fn parse_realm(header: &str) -> Option<String> {
    REALM_RE
        .captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Token endpoint response
///
/// ACS sends `expires_in` as a string, Azure AD v2 as a number.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<Value>,
}

impl TokenResponse {
    fn into_cached_token(self) -> CachedToken {
        let secs = match &self.expires_in {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        };
        match secs {
            Some(secs) => CachedToken::expires_in(self.access_token, secs),
            None => CachedToken::new(self.access_token, None),
        }
    }
}
