//! Data models and structures
//!
//! Defines the payloads exchanged with the Dog CEO catalog and the Yandex
//! Disk API, the values derived from them, and the harness configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Breed name to sub-breed names, as listed by the catalog.
pub type BreedListing = BTreeMap<String, Vec<String>>;

// Dog CEO response envelopes
#[derive(Debug, Deserialize)]
pub struct CatalogEnvelope<T> {
    pub message: T,
    pub status: String,
}

/// Expected shape of `breed/{breed}/list`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SubBreedsResponse {
    pub message: Vec<String>,
    pub status: String,
}

/// Sub-breeds of a breed together with the outcome of the shape check.
///
/// A mismatched shape is reported here instead of failing the lookup.
#[derive(Debug)]
pub struct SubBreedListing {
    pub sub_breeds: Vec<String>,
    pub schema_error: Option<crate::Error>,
}

/// A random image URL and the breed it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub url: String,
    pub breed: String,
    pub sub_breed: Option<String>,
}

// Yandex Disk models
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Dir,
    File,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceItem {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceList {
    pub items: Vec<ResourceItem>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Metadata returned by `GET resources`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceInfo {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<ResourceList>,
}

impl ResourceInfo {
    /// Immediate children, or `None` when the listing was not embedded.
    pub fn children(&self) -> Option<&[ResourceItem]> {
        self.embedded.as_ref().map(|list| list.items.as_slice())
    }
}

/// Operation link returned for asynchronous Disk calls.
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub href: String,
}

/// How the backend answered a folder create call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderCreation {
    Created,
    AlreadyExists,
}

/// A remote fetch the backend has accepted but not necessarily finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    pub path: String,
    pub name: String,
    pub source_url: String,
    pub operation_href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub breed: String,
    pub path: String,
    pub uploads: Vec<AcceptedUpload>,
}

// Configuration
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://dog.ceo/api";
pub const DEFAULT_DISK_BASE_URL: &str = "https://cloud-api.yandex.net/v1/disk";

#[derive(Debug, Clone)]
pub struct Config {
    pub disk_token: String,
    pub catalog_base_url: String,
    pub disk_base_url: String,
    pub trash_purge_delay: Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            disk_token: std::env::var("YANDEX_DISK_TOKEN")
                .map_err(|_| crate::Error::Config("YANDEX_DISK_TOKEN not set".to_string()))?,
            catalog_base_url: std::env::var("DOG_CEO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CATALOG_BASE_URL.to_string()),
            disk_base_url: std::env::var("YANDEX_DISK_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_DISK_BASE_URL.to_string()),
            trash_purge_delay: Duration::from_secs(secs_from_env("TRASH_PURGE_DELAY_SECS", 10)?),
            http_timeout: Duration::from_secs(secs_from_env("HTTP_TIMEOUT_SECS", 30)?),
        })
    }
}

fn secs_from_env(key: &str, default: u64) -> crate::Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| crate::Error::Config(format!("{} must be whole seconds, got '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}
