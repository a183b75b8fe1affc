//! File storage for the Copa microsite.
//!
//! Two interchangeable backends implement [`StorageGateway`]: a remote blob
//! store spoken to over HTTP ([`RemoteBlobGateway`]) and a directory on the
//! local filesystem ([`LocalFsGateway`]). A deployment picks exactly one at
//! startup through [`StorageBackend`]. Upload rules per target live in
//! [`policy`].

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod local;
pub mod policy;
mod remote;

pub use local::LocalFsGateway;
pub use policy::{MimeRule, PolicyViolation, UploadPolicy, UploadTarget};
pub use remote::{RemoteBlobGateway, DEFAULT_BLOB_API_URL};

/// File name of the placeholder team logo. Never deletable.
pub const PROTECTED_PLACEHOLDER: &str = "sin-logo.jpg";

/// Logo assigned to teams created without one.
pub const DEFAULT_TEAM_LOGO: &str = "/equipos/sin-logo.jpg";

/// One year, the cache lifetime applied when callers do not pick one.
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 31_536_000;

/// In-memory file as received from a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    pub add_random_suffix: bool,
    pub cache_control_max_age: u64,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            add_random_suffix: false,
            cache_control_max_age: DEFAULT_CACHE_MAX_AGE_SECS,
        }
    }
}

/// Object returned by [`StorageGateway::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub url: String,
    pub pathname: String,
    pub size: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("delete failed: {0}")]
    Delete(String),
    #[error("listing failed: {0}")]
    List(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("file '{0}' is protected and cannot be deleted")]
    Protected(String),
    #[error("blob store token is not configured")]
    MissingToken,
}

/// Contract shared by every storage backend.
#[async_trait]
pub trait StorageGateway: Send + Sync + 'static {
    /// Stores `blob` under `path` and returns its public URL.
    async fn upload(
        &self,
        blob: &Blob,
        path: &str,
        options: UploadOptions,
    ) -> Result<String, StorageError>;

    /// Deletes the object behind a public URL. The placeholder logo is refused.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;

    /// Every object whose path starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError>;
}

/// Backend chosen once at startup.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    Remote(RemoteBlobGateway),
    Local(LocalFsGateway),
}

impl StorageBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            StorageBackend::Remote(_) => "blob",
            StorageBackend::Local(_) => "local",
        }
    }
}

#[async_trait]
impl StorageGateway for StorageBackend {
    async fn upload(
        &self,
        blob: &Blob,
        path: &str,
        options: UploadOptions,
    ) -> Result<String, StorageError> {
        match self {
            StorageBackend::Remote(gateway) => gateway.upload(blob, path, options).await,
            StorageBackend::Local(gateway) => gateway.upload(blob, path, options).await,
        }
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        match self {
            StorageBackend::Remote(gateway) => gateway.delete(url).await,
            StorageBackend::Local(gateway) => gateway.delete(url).await,
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        match self {
            StorageBackend::Remote(gateway) => gateway.list(prefix).await,
            StorageBackend::Local(gateway) => gateway.list(prefix).await,
        }
    }
}

/// True when the blob's declared MIME type is one of `allowed`.
pub fn validate_type(blob: &Blob, allowed: &[&str]) -> bool {
    allowed.iter().any(|mime| *mime == blob.content_type)
}

/// True when the blob is at most `max_bytes` long.
pub fn validate_size(blob: &Blob, max_bytes: u64) -> bool {
    blob.size() <= max_bytes
}

/// `{prefix}-{epoch millis}.{extension}`. Millisecond granularity only.
pub fn generate_unique_name(prefix: &str, extension: &str) -> String {
    format!("{prefix}-{}.{extension}", Utc::now().timestamp_millis())
}

/// Lowercased text after the last `.` of the file name, empty when there is none.
pub fn file_extension(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(idx) if idx + 1 < base.len() => base[idx + 1..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

pub fn is_protected(url: &str) -> bool {
    url.contains(PROTECTED_PLACEHOLDER)
}
