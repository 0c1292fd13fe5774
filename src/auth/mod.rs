//! Authentication module
//!
//! Supports: no auth, fixed bearer tokens and SharePoint add-in
//! (app-only) client credentials.
//!
//! The `Authenticator` caches access tokens and refreshes them shortly
//! before they expire.

mod authenticator;
mod types;

pub use authenticator::{parse_realm, Authenticator};
pub use types::{AuthConfig, CachedToken, SHAREPOINT_PRINCIPAL};
