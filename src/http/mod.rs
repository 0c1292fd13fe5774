//! HTTP client module
//!
//! Provides the transport used by the REST gateway and the authenticator.
//!
//! # Features
//!
//! - **Automatic Retries**: retry with backoff on throttling, 5xx, timeouts and connect errors
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Not Found**: 404 responses become `Error::NotFound`
//! - **Authentication**: bearer tokens from the auth module

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, ODATA_VERBOSE};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
