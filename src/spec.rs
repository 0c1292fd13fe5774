//! Source configuration
//!
//! The `Spec` is the user-facing configuration of a sync run. It is loaded
//! from JSON (or YAML), completed with `set_defaults`, checked with
//! `validate`, and treated as immutable afterwards.

use crate::error::{Error, Result, ResultExt};
use crate::schema::normalize;
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Fields selected for a list that has no entry in `list_fields`
pub const DEFAULT_FIELDS: &[&str] = &[
    "Id",
    "Created",
    "Modified",
    "Title",
    "AuthorId",
    "EditorId",
    "FSObjType",
];

/// Fields that are never selected
pub const DEFAULT_IGNORE_FIELDS: &[&str] = &["__metadata"];

/// Fields whose reported type is replaced unless the user says otherwise
pub const DEFAULT_FIELD_OVERRIDES: &[(&str, &str)] = &[
    ("AuthorId", "Integer"),
    ("EditorId", "Integer"),
    ("Id", "Integer"),
    ("FSObjType", "Integer"),
];

/// Field that always carries an `Integer` override
pub const ID_FIELD: &str = "Id";

/// SharePoint source configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    /// Absolute URL of the SharePoint site (e.g. `https://contoso.sharepoint.com/sites/ops`)
    #[serde(default)]
    pub site_url: String,

    /// Add-in client id
    #[serde(default)]
    pub client_id: String,

    /// Add-in client secret
    #[serde(default)]
    pub client_secret: String,

    /// List titles to ingest; empty means every list on the site
    #[serde(default)]
    pub lists: Vec<String>,

    /// Selected field internal names per list title
    #[serde(default)]
    pub list_fields: BTreeMap<String, Vec<String>>,

    /// Fallback field selection
    #[serde(default)]
    pub default_fields: Vec<String>,

    /// Fields that are always excluded
    #[serde(default)]
    pub ignore_fields: Vec<String>,

    /// Field internal name -> SharePoint type string to use instead of the reported one
    #[serde(default)]
    pub field_overrides: BTreeMap<String, String>,

    /// Primary-key field of the upstream list
    #[serde(default)]
    pub pk_column: String,

    /// Azure AD realm (tenant id); discovered from the site when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,

    /// Token endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    /// Items requested per page (`$top`)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpSettings,
}

fn default_page_size() -> u32 {
    1000
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Requests per second limit (0 disables rate limiting)
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            requests_per_second: default_rps(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rps() -> u32 {
    10
}

impl Spec {
    /// Parse a spec from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(format!("Invalid config JSON: {e}")))
    }

    /// Load a spec from a file; `.yaml`/`.yml` are parsed as YAML, anything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Ok(serde_yaml::from_str(&content)?),
            _ => Self::from_json_str(&content),
        }
    }

    /// Fill in defaults for everything the user left empty
    pub fn set_defaults(&mut self) {
        if self.pk_column.is_empty() {
            self.pk_column = ID_FIELD.to_string();
        }
        if self.default_fields.is_empty() {
            self.default_fields = DEFAULT_FIELDS.iter().map(ToString::to_string).collect();
        }
        if self.ignore_fields.is_empty() {
            self.ignore_fields = DEFAULT_IGNORE_FIELDS
                .iter()
                .map(ToString::to_string)
                .collect();
        }

        for (field, ty) in DEFAULT_FIELD_OVERRIDES {
            self.field_overrides
                .entry((*field).to_string())
                .or_insert_with(|| (*ty).to_string());
        }
        self.field_overrides
            .insert(ID_FIELD.to_string(), "Integer".to_string());

        // The key field is selected for every list, whatever the selection says.
        if !self.default_fields.contains(&self.pk_column) {
            self.default_fields.push(self.pk_column.clone());
        }
        for fields in self.list_fields.values_mut() {
            if !fields.is_empty() && !fields.contains(&self.pk_column) {
                fields.insert(0, self.pk_column.clone());
            }
        }

        self.realm = self.realm.take().none_if_empty();
        self.token_url = self.token_url.take().none_if_empty();
        if self.page_size == 0 {
            self.page_size = default_page_size();
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::missing_field("client_id"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(Error::missing_field("client_secret"));
        }
        if self.site_url.trim().is_empty() {
            return Err(Error::missing_field("site_url"));
        }
        let site = url::Url::parse(&self.site_url)?;
        if !matches!(site.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "site_url must be an http(s) URL, got {:?}",
                self.site_url
            )));
        }

        let mut seen: HashMap<String, &str> = HashMap::with_capacity(self.lists.len());
        for title in &self.lists {
            let name = normalize(title);
            if let Some(first) = seen.get(name.as_str()) {
                return Err(Error::config(format!(
                    "found duplicate normalized list name in spec: {first:?} and {title:?} both normalize to {name:?}"
                )));
            }
            seen.insert(name, title);
        }

        if !self.lists.is_empty() {
            for title in self.list_fields.keys() {
                if !self.lists.contains(title) {
                    return Err(Error::config(format!(
                        "list_fields references list {title:?} which is not in lists"
                    )));
                }
            }
        }

        if self.ignore_fields.contains(&self.pk_column) {
            return Err(Error::config(format!(
                "pk_column {:?} cannot be listed in ignore_fields",
                self.pk_column
            )));
        }

        if self.page_size > 5000 {
            return Err(Error::config(format!(
                "page_size must be at most 5000, got {}",
                self.page_size
            )));
        }

        Ok(())
    }

    /// `set_defaults` followed by `validate`
    pub fn prepare(mut self) -> Result<Self> {
        self.set_defaults();
        self.validate()?;
        Ok(self)
    }

    /// Copy of the config that is safe to log
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut spec = self.clone();
        if !spec.client_secret.is_empty() {
            spec.client_secret = "**********".to_string();
        }
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minimal() -> Spec {
        Spec {
            site_url: "https://contoso.sharepoint.com/sites/ops".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            ..Spec::default()
        }
    }

    #[test]
    fn test_parse_full_config() {
        let spec = Spec::from_json_str(
            r#"{
                "site_url": "https://contoso.sharepoint.com",
                "client_id": "id",
                "client_secret": "secret",
                "lists": ["Tasks"],
                "list_fields": {"Tasks": ["Title", "DueDate"]},
                "field_overrides": {"Priority": "Number"},
                "http": {"max_retries": 7}
            }"#,
        )
        .unwrap();

        assert_eq!(spec.lists, vec!["Tasks".to_string()]);
        assert_eq!(spec.list_fields["Tasks"], vec!["Title", "DueDate"]);
        assert_eq!(spec.page_size, 1000);
        assert_eq!(spec.http.max_retries, 7);
        assert_eq!(spec.http.timeout_seconds, 30);
    }

    #[test]
    fn test_set_defaults() {
        let spec = minimal().prepare().unwrap();

        assert_eq!(spec.pk_column, "Id");
        assert_eq!(
            spec.default_fields,
            vec!["Id", "Created", "Modified", "Title", "AuthorId", "EditorId", "FSObjType"]
        );
        assert!(!spec.default_fields.contains(&"version".to_string()));
        assert_eq!(spec.ignore_fields, vec!["__metadata"]);
        assert_eq!(spec.field_overrides.len(), 4);
        assert_eq!(spec.field_overrides["FSObjType"], "Integer");
    }

    #[test]
    fn test_id_override_is_forced() {
        let mut spec = minimal();
        spec.field_overrides
            .insert("Id".to_string(), "Text".to_string());
        spec.field_overrides
            .insert("AuthorId".to_string(), "User".to_string());
        spec.set_defaults();

        assert_eq!(spec.field_overrides["Id"], "Integer");
        assert_eq!(spec.field_overrides["AuthorId"], "User");
        assert_eq!(spec.field_overrides["EditorId"], "Integer");
    }

    #[test]
    fn test_pk_is_always_selected() {
        let mut spec = minimal();
        spec.lists = vec!["Tasks".to_string()];
        spec.list_fields
            .insert("Tasks".to_string(), vec!["Title".to_string()]);
        spec.default_fields = vec!["Title".to_string()];
        spec.set_defaults();

        assert_eq!(spec.list_fields["Tasks"], vec!["Id", "Title"]);
        assert!(spec.default_fields.contains(&"Id".to_string()));
    }

    #[test]
    fn test_missing_credentials() {
        let mut spec = minimal();
        spec.client_secret = String::new();
        let err = spec.prepare().unwrap_err();
        assert_eq!(err.to_string(), "Missing required config field: client_secret");

        let mut spec = minimal();
        spec.client_id = " ".to_string();
        assert!(matches!(
            spec.prepare(),
            Err(Error::MissingConfigField { field }) if field == "client_id"
        ));

        let mut spec = minimal();
        spec.site_url = String::new();
        assert!(spec.prepare().is_err());
    }

    #[test]
    fn test_duplicate_normalized_list_names() {
        let mut spec = minimal();
        spec.lists = vec!["A-B".to_string(), "a_b".to_string()];
        let err = spec.prepare().unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, Error::Config { .. }));
        assert!(message.contains("\"A-B\""), "{message}");
        assert!(message.contains("\"a_b\" both"), "{message}");
        assert!(message.contains("normalize to \"a_b\""), "{message}");
    }

    #[test]
    fn test_list_fields_must_reference_listed_lists() {
        let mut spec = minimal();
        spec.lists = vec!["Tasks".to_string()];
        spec.list_fields
            .insert("Issues".to_string(), vec!["Title".to_string()]);
        let err = spec.prepare().unwrap_err();
        assert!(err.to_string().contains("\"Issues\""));

        // Without explicit lists any key is accepted, lists are discovered.
        let mut spec = minimal();
        spec.list_fields
            .insert("Issues".to_string(), vec!["Title".to_string()]);
        assert!(spec.prepare().is_ok());
    }

    #[test]
    fn test_invalid_site_url() {
        let mut spec = minimal();
        spec.site_url = "not a url".to_string();
        assert!(matches!(spec.prepare(), Err(Error::InvalidUrl(_))));

        let mut spec = minimal();
        spec.site_url = "ftp://contoso.example".to_string();
        assert!(matches!(spec.prepare(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_redacted() {
        let spec = minimal().redacted();
        assert_eq!(spec.client_secret, "**********");
        assert_eq!(spec.client_id, "client");
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.yaml");
        std::fs::write(
            &path,
            "site_url: https://contoso.sharepoint.com\nclient_id: id\nclient_secret: s\nlists:\n  - Tasks\n",
        )
        .unwrap();

        let spec = Spec::from_file(&path).unwrap();
        assert_eq!(spec.lists, vec!["Tasks".to_string()]);
        assert_eq!(spec.client_id, "id");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Spec::from_file("/nonexistent/spec.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
