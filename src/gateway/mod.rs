//! SharePoint gateway module
//!
//! The seam between the extraction engine and SharePoint itself.
//!
//! # Overview
//!
//! - `SharePointGateway` - list enumeration, field metadata and paged items
//! - `RestGateway` - implementation over the SharePoint REST API
//! - `MemoryGateway` - in-memory implementation for tests and dry runs
//!
//! A missing list is reported as `Error::NotFound`, never as a generic failure.

mod memory;
mod rest;
mod types;

pub use memory::{MemoryGateway, PageFault};
pub use rest::{RestGateway, RestGatewayConfig};
pub use types::{FieldInfo, ItemPage, ListDescriptor};

use crate::error::Result;
use async_trait::async_trait;

/// Access to SharePoint lists
#[async_trait]
pub trait SharePointGateway: Send + Sync {
    /// All lists of the site, in the order SharePoint returns them
    async fn list_all(&self) -> Result<Vec<ListDescriptor>>;

    /// Field definitions of a list
    async fn list_fields(&self, title: &str) -> Result<Vec<FieldInfo>>;

    /// First page of a list's items
    async fn list_items_paged(&self, title: &str) -> Result<ItemPage>;

    /// Page following `page`; only valid when `page.has_next_page()`
    async fn next_page(&self, page: &ItemPage) -> Result<ItemPage>;
}

#[cfg(test)]
mod tests;
