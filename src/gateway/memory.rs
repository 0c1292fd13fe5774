//! In-memory gateway

use super::types::{FieldInfo, ItemPage, ListDescriptor};
use super::SharePointGateway;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use async_trait::async_trait;
use std::collections::HashMap;

/// Failure injected when a given page of a list is requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFault {
    /// The list is reported as absent
    NotFound,
    /// The request fails with an HTTP status
    Status(u16),
    /// The page payload is not a JSON array of objects
    Malformed,
}

#[derive(Debug, Clone)]
struct MemoryList {
    title: String,
    fields: Option<Vec<FieldInfo>>,
    pages: Vec<Vec<JsonValue>>,
    faults: HashMap<usize, PageFault>,
}

/// Gateway serving lists held in memory
///
/// Pages are served exactly as they were added; continuation links have the
/// form `memory:<page index>:<list title>`.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    lists: Vec<MemoryList>,
    list_all_fault: Option<u16>,
}

impl MemoryGateway {
    /// Create an empty gateway
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a list with its fields and item pages
    #[must_use]
    pub fn with_list(
        mut self,
        title: impl Into<String>,
        fields: Vec<FieldInfo>,
        pages: Vec<Vec<JsonValue>>,
    ) -> Self {
        self.lists.push(MemoryList {
            title: title.into(),
            fields: Some(fields),
            pages,
            faults: HashMap::new(),
        });
        self
    }

    /// Add a list that is enumerated but whose fields are not found
    #[must_use]
    pub fn with_missing_list(mut self, title: impl Into<String>) -> Self {
        self.lists.push(MemoryList {
            title: title.into(),
            fields: None,
            pages: Vec::new(),
            faults: HashMap::new(),
        });
        self
    }

    /// Inject a fault for page `page` (0-based) of list `title`
    #[must_use]
    pub fn with_page_fault(mut self, title: &str, page: usize, fault: PageFault) -> Self {
        if let Some(list) = self.lists.iter_mut().find(|l| l.title == title) {
            list.faults.insert(page, fault);
        }
        self
    }

    /// Make list enumeration fail with an HTTP status
    #[must_use]
    pub fn with_list_all_failure(mut self, status: u16) -> Self {
        self.list_all_fault = Some(status);
        self
    }

    fn find(&self, title: &str) -> Result<&MemoryList> {
        self.lists
            .iter()
            .find(|l| l.title == title)
            .ok_or_else(|| Error::not_found(format!("list {title:?}")))
    }

    fn page(&self, title: &str, index: usize) -> Result<ItemPage> {
        let list = self.find(title)?;

        match list.faults.get(&index) {
            Some(PageFault::NotFound) => {
                return Err(Error::not_found(format!("list {title:?}")));
            }
            Some(PageFault::Status(status)) => {
                return Err(Error::http_status(*status, "injected failure"));
            }
            Some(PageFault::Malformed) => {
                return Ok(ItemPage::new(&b"{\"error\":\"not a page\"}"[..], None));
            }
            None => {}
        }

        let items = list.pages.get(index).cloned().unwrap_or_default();
        let items_json = serde_json::to_vec(&items)?;
        let next_link = (index + 1 < list.pages.len()).then(|| format!("memory:{}:{title}", index + 1));
        Ok(ItemPage::new(items_json, next_link))
    }
}

#[async_trait]
impl SharePointGateway for MemoryGateway {
    async fn list_all(&self) -> Result<Vec<ListDescriptor>> {
        if let Some(status) = self.list_all_fault {
            return Err(Error::http_status(status, "injected failure"));
        }
        Ok(self
            .lists
            .iter()
            .map(|l| ListDescriptor::new(l.title.clone()))
            .collect())
    }

    async fn list_fields(&self, title: &str) -> Result<Vec<FieldInfo>> {
        self.find(title)?
            .fields
            .clone()
            .ok_or_else(|| Error::not_found(format!("fields of list {title:?}")))
    }

    async fn list_items_paged(&self, title: &str) -> Result<ItemPage> {
        self.page(title, 0)
    }

    async fn next_page(&self, page: &ItemPage) -> Result<ItemPage> {
        let link = page
            .next_link()
            .ok_or_else(|| Error::decode("page has no continuation link"))?;

        let mut parts = link.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("memory"), Some(index), Some(title)) => {
                let index = index
                    .parse()
                    .map_err(|_| Error::decode(format!("invalid continuation link {link:?}")))?;
                self.page(title, index)
            }
            _ => Err(Error::decode(format!("invalid continuation link {link:?}"))),
        }
    }
}
