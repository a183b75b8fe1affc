use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::{is_protected, Blob, StorageError, StorageGateway, StoredObject, UploadOptions};

pub const DEFAULT_BLOB_API_URL: &str = "https://blob.vercel-storage.com";

/// Environment variable holding the read/write token of the blob store.
pub const TOKEN_ENV: &str = "BLOB_READ_WRITE_TOKEN";

/// Client for a remote object store speaking the Vercel Blob HTTP API.
#[derive(Debug, Clone)]
pub struct RemoteBlobGateway {
    client: Client,
    api_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    blobs: Vec<ListedBlob>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct ListedBlob {
    url: String,
    pathname: String,
    #[serde(default)]
    size: u64,
}

impl RemoteBlobGateway {
    /// A missing token is not an error here; the first request reports it.
    pub fn new(api_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.filter(|token| !token.trim().is_empty()),
        }
    }

    /// Reads the token from `BLOB_READ_WRITE_TOKEN`.
    pub fn from_env(api_url: &str) -> Self {
        Self::new(api_url, std::env::var(TOKEN_ENV).ok())
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn token(&self) -> Result<&str, StorageError> {
        self.token.as_deref().ok_or(StorageError::MissingToken)
    }
}

async fn failure_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    }
}

#[async_trait]
impl StorageGateway for RemoteBlobGateway {
    async fn upload(
        &self,
        blob: &Blob,
        path: &str,
        options: UploadOptions,
    ) -> Result<String, StorageError> {
        let token = self.token()?;
        let path = path.trim_start_matches('/');
        let response = self
            .client
            .put(format!("{}/{path}", self.api_url))
            .bearer_auth(token)
            .header("x-content-type", blob.content_type.as_str())
            .header(
                "x-add-random-suffix",
                if options.add_random_suffix { "1" } else { "0" },
            )
            .header(
                "x-cache-control-max-age",
                options.cache_control_max_age.to_string(),
            )
            .body(blob.data.clone())
            .send()
            .await
            .map_err(|err| StorageError::Upload(err.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::Upload(failure_message(response).await));
        }
        let put: PutResponse = response
            .json()
            .await
            .map_err(|err| StorageError::Upload(err.to_string()))?;

        info!(path, size = blob.size(), "file stored in blob store");
        Ok(put.url)
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        if is_protected(url) {
            return Err(StorageError::Protected(url.to_string()));
        }
        let token = self.token()?;
        let response = self
            .client
            .post(format!("{}/delete", self.api_url))
            .bearer_auth(token)
            .json(&json!({ "urls": [url] }))
            .send()
            .await
            .map_err(|err| StorageError::Delete(err.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                info!(url, "file removed from blob store");
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(url.to_string())),
            _ => Err(StorageError::Delete(failure_message(response).await)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let token = self.token()?;
        let mut objects = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("prefix", prefix.to_string())];
            if let Some(cursor) = &cursor {
                query.push(("cursor", cursor.clone()));
            }
            let response = self
                .client
                .get(&self.api_url)
                .bearer_auth(token)
                .query(&query)
                .send()
                .await
                .map_err(|err| StorageError::List(err.to_string()))?;

            if !response.status().is_success() {
                return Err(StorageError::List(failure_message(response).await));
            }
            let page: ListResponse = response
                .json()
                .await
                .map_err(|err| StorageError::List(err.to_string()))?;

            objects.extend(page.blobs.into_iter().map(|blob| StoredObject {
                url: blob.url,
                pathname: blob.pathname,
                size: blob.size,
            }));

            match page.cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        debug!(prefix, count = objects.len(), "listed blob store objects");
        Ok(objects)
    }
}
