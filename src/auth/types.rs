//! Auth configuration types

use chrono::{DateTime, Utc};

/// Principal id of SharePoint Online in Azure ACS
pub const SHAREPOINT_PRINCIPAL: &str = "00000003-0000-0ff1-ce00-000000000000";

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// Fixed bearer token
    Bearer {
        /// The bearer token
        token: String,
    },

    /// SharePoint add-in (app-only) client credentials against Azure ACS
    AddinClientCredentials {
        /// Site the token is requested for
        site_url: String,
        /// Add-in client id
        client_id: String,
        /// Add-in client secret
        client_secret: String,
        /// Tenant realm; discovered from the site when `None`
        realm: Option<String>,
        /// Token endpoint; derived from the realm when `None`
        token_url: Option<String>,
    },
}

impl AuthConfig {
    /// Whether tokens for this config must be fetched and refreshed
    pub fn needs_token_refresh(&self) -> bool {
        matches!(self, Self::AddinClientCredentials { .. })
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        Self {
            token,
            expires_at: Some(Utc::now() + chrono::Duration::seconds(seconds)),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + chrono::Duration::seconds(30) >= expires_at,
            None => false,
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_cached_token_expiry() {
        assert!(!CachedToken::expires_in("t".to_string(), 3600).is_expired());
        assert!(CachedToken::expires_in("t".to_string(), -100).is_expired());
        // Inside the 30s buffer counts as expired
        assert!(CachedToken::expires_in("t".to_string(), 10).is_expired());
        assert!(!CachedToken::new("t".to_string(), None).is_expired());
    }

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(matches!(config, AuthConfig::None));
        assert!(!config.needs_token_refresh());
    }
}
