//! SharePoint REST gateway
//!
//! Talks to `<site>/_api/web/...` in the OData verbose dialect, where every
//! collection arrives as `{"d": {"results": [...], "__next": "<url>"}}`.

use super::types::{FieldInfo, ItemPage, ListDescriptor};
use super::SharePointGateway;
use crate::auth::Authenticator;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::spec::Spec;
use crate::types::JsonValue;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// REST gateway configuration
#[derive(Debug, Clone)]
pub struct RestGatewayConfig {
    /// Site URL
    pub site_url: String,
    /// Items requested per page
    pub page_size: u32,
}

impl RestGatewayConfig {
    /// Create a config
    pub fn new(site_url: impl Into<String>, page_size: u32) -> Self {
        Self {
            site_url: site_url.into(),
            page_size,
        }
    }
}

/// Verbose OData envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    d: Collection<T>,
}

#[derive(Debug, Deserialize)]
struct Collection<T> {
    results: Vec<T>,
    #[serde(rename = "__next", default)]
    next: Option<String>,
}

/// Gateway over the SharePoint REST API
#[derive(Debug, Clone)]
pub struct RestGateway {
    client: HttpClient,
    site: Url,
    page_size: u32,
}

impl RestGateway {
    /// Create a gateway using an already configured HTTP client
    pub fn new(client: HttpClient, config: RestGatewayConfig) -> Result<Self> {
        let mut site = Url::parse(&config.site_url)?;
        if site.cannot_be_a_base() {
            return Err(Error::config(format!(
                "site_url {:?} cannot be used as a base URL",
                config.site_url
            )));
        }
        // Trailing slash would produce an empty segment before `_api`.
        if let Ok(mut segments) = site.path_segments_mut() {
            segments.pop_if_empty();
        }

        Ok(Self {
            client,
            site,
            page_size: config.page_size,
        })
    }

    /// Gateway for a prepared spec with add-in authentication
    pub fn from_spec(spec: &Spec) -> Result<Self> {
        let client = HttpClient::with_config(HttpClientConfig::from_settings(&spec.http))?
            .with_authenticator(Arc::new(Authenticator::from_spec(spec)));
        Self::new(
            client,
            RestGatewayConfig::new(spec.site_url.clone(), spec.page_size),
        )
    }

    /// `<site>/_api/web/<segments...>`
    fn api_url(&self, segments: &[&str]) -> Url {
        let mut url = self.site.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(["_api", "web"]).extend(segments);
        }
        url
    }

    /// `<site>/_api/web/lists/getbytitle('<title>')/<tail>`
    fn list_url(&self, title: &str, tail: &str) -> Url {
        let by_title = format!("getbytitle('{}')", odata_literal(title));
        self.api_url(&["lists", &by_title, tail])
    }

    /// Resolve a `__next` link; relative links are taken below the site
    fn resolve_link(&self, link: &str) -> Result<Url> {
        let mut base = self.site.clone();
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        Ok(base.join(link)?)
    }

    async fn get_collection<T: DeserializeOwned>(&self, url: &str) -> Result<Collection<T>> {
        let envelope: Envelope<T> = self.client.get_json(url).await?;
        Ok(envelope.d)
    }

    async fn get_page(&self, url: &str) -> Result<ItemPage> {
        let mut collection: Collection<JsonValue> = self.get_collection(url).await?;
        // Verbose item metadata is transport detail, not list data.
        for item in &mut collection.results {
            if let Some(object) = item.as_object_mut() {
                object.remove("__metadata");
            }
        }
        debug!(
            url,
            items = collection.results.len(),
            has_next = collection.next.is_some(),
            "fetched item page"
        );
        let items_json = serde_json::to_vec(&collection.results)?;
        Ok(ItemPage::new(items_json, collection.next))
    }
}

/// Escape a value for use inside an OData string literal
fn odata_literal(value: &str) -> String {
    value.replace('\'', "''")
}

#[async_trait]
impl SharePointGateway for RestGateway {
    async fn list_all(&self) -> Result<Vec<ListDescriptor>> {
        let mut url = self.api_url(&["lists"]);
        url.query_pairs_mut().append_pair("$select", "Title");

        let mut lists = Vec::new();
        let mut next = Some(url.to_string());
        while let Some(url) = next {
            let collection: Collection<ListDescriptor> = self.get_collection(&url).await?;
            lists.extend(collection.results);
            next = collection
                .next
                .map(|link| self.resolve_link(&link).map(String::from))
                .transpose()?;
        }
        Ok(lists)
    }

    async fn list_fields(&self, title: &str) -> Result<Vec<FieldInfo>> {
        let url = self.list_url(title, "fields");
        let collection: Collection<FieldInfo> = self.get_collection(url.as_str()).await?;
        Ok(collection.results)
    }

    async fn list_items_paged(&self, title: &str) -> Result<ItemPage> {
        let mut url = self.list_url(title, "items");
        url.query_pairs_mut()
            .append_pair("$top", &self.page_size.to_string());
        self.get_page(url.as_str()).await
    }

    async fn next_page(&self, page: &ItemPage) -> Result<ItemPage> {
        let link = page
            .next_link()
            .ok_or_else(|| Error::decode("page has no continuation link"))?;
        let url = self.resolve_link(link)?;
        self.get_page(url.as_str()).await
    }
}
