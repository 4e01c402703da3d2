//! Document-level settings: the `info` block and the top-level Swagger fields.

use crate::flattener::FlattenOptions;
use serde::{Deserialize, Serialize};

/// Swagger `info` object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// API title
    #[serde(default = "default_title")]
    pub title: String,
    /// API description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Terms of service text or URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    /// API version
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_title() -> String {
    "Generated API".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
            version: default_version(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Everything a generation run needs besides the route tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub info: Info,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(
        default,
        rename = "basePath",
        alias = "base_path",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    /// Include namespaces left out of the document
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_namespaces: Vec<String>,
    /// Only document paths containing this substring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_path: Option<String>,
}

impl Settings {
    pub fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions {
            exclude_namespaces: self.exclude_namespaces.iter().cloned().collect(),
            filter_path: self.filter_path.clone(),
        }
    }
}
