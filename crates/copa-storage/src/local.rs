use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{is_protected, Blob, StorageError, StorageGateway, StoredObject, UploadOptions};

/// Stores files below a root directory that is also served as static content.
#[derive(Debug, Clone)]
pub struct LocalFsGateway {
    root: PathBuf,
    base_url: String,
}

impl LocalFsGateway {
    /// `base_url` is the public prefix the root is served under (usually `/`).
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            root: root.into(),
            base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn public_url(&self, relative: &str) -> String {
        format!("{}{relative}", self.base_url)
    }

    /// Resolves a relative object path below the root, refusing escapes.
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }

    async fn walk(&self, dir: PathBuf) -> std::io::Result<Vec<(String, u64)>> {
        let mut found = Vec::new();
        let mut pending = vec![dir];
        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err),
            };
            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                let path = entry.path();
                if metadata.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    let relative = relative
                        .components()
                        .map(|part| part.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    found.push((relative, metadata.len()));
                }
            }
        }
        Ok(found)
    }
}

fn with_random_suffix(path: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];
    let file_start = path.rfind('/').map(|idx| idx + 1).unwrap_or(0);
    match path[file_start..].rfind('.') {
        Some(dot) => {
            let dot = file_start + dot;
            format!("{}-{suffix}{}", &path[..dot], &path[dot..])
        }
        None => format!("{path}-{suffix}"),
    }
}

#[async_trait]
impl StorageGateway for LocalFsGateway {
    async fn upload(
        &self,
        blob: &Blob,
        path: &str,
        options: UploadOptions,
    ) -> Result<String, StorageError> {
        let relative = if options.add_random_suffix {
            with_random_suffix(path)
        } else {
            path.trim_start_matches('/').to_string()
        };
        let target = self
            .resolve(&relative)
            .ok_or_else(|| StorageError::Upload(format!("path '{path}' escapes storage root")))?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| StorageError::Upload(err.to_string()))?;
        }
        fs::write(&target, &blob.data)
            .await
            .map_err(|err| StorageError::Upload(err.to_string()))?;

        info!(path = %relative, size = blob.size(), "file stored on local disk");
        Ok(self.public_url(&relative))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        if is_protected(url) {
            return Err(StorageError::Protected(url.to_string()));
        }
        let relative = url
            .strip_prefix(&self.base_url)
            .ok_or_else(|| StorageError::Delete(format!("'{url}' is not served by this store")))?;
        let target = self
            .resolve(relative)
            .ok_or_else(|| StorageError::Delete(format!("'{url}' escapes storage root")))?;

        match fs::remove_file(&target).await {
            Ok(()) => {
                info!(path = %relative, "file removed from local disk");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(url.to_string()))
            }
            Err(err) => Err(StorageError::Delete(err.to_string())),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let prefix = prefix.trim_start_matches('/');
        let directory = match prefix.rfind('/') {
            Some(idx) => &prefix[..idx],
            None => "",
        };
        let start = self
            .resolve(directory)
            .ok_or_else(|| StorageError::List(format!("prefix '{prefix}' escapes storage root")))?;

        let mut objects: Vec<StoredObject> = self
            .walk(start)
            .await
            .map_err(|err| StorageError::List(err.to_string()))?
            .into_iter()
            .filter(|(relative, _)| relative.starts_with(prefix))
            .map(|(relative, size)| StoredObject {
                url: self.public_url(&relative),
                pathname: relative,
                size,
            })
            .collect();
        objects.sort_by(|a, b| a.pathname.cmp(&b.pathname));

        debug!(prefix, count = objects.len(), "listed local files");
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gateway() -> (LocalFsGateway, TempDir) {
        let temp = TempDir::new().unwrap();
        (LocalFsGateway::new(temp.path(), "/"), temp)
    }

    #[tokio::test]
    async fn upload_list_delete() {
        let (gateway, temp) = gateway();
        let blob = Blob::new("a.png", "image/png", b"png-bytes".to_vec());

        let url = gateway
            .upload(&blob, "banners/a.png", UploadOptions::default())
            .await
            .unwrap();
        assert_eq!(url, "/banners/a.png");
        assert_eq!(
            std::fs::read(temp.path().join("banners/a.png")).unwrap(),
            b"png-bytes"
        );
        gateway
            .upload(&blob, "banners/nested/b.png", UploadOptions::default())
            .await
            .unwrap();
        gateway
            .upload(&blob, "sponsors/c.png", UploadOptions::default())
            .await
            .unwrap();

        let listed = gateway.list("banners/").await.unwrap();
        let paths: Vec<_> = listed.iter().map(|o| o.pathname.as_str()).collect();
        assert_eq!(paths, vec!["banners/a.png", "banners/nested/b.png"]);
        assert_eq!(listed[0].size, 9);

        gateway.delete(&url).await.unwrap();
        assert_eq!(
            gateway.delete(&url).await,
            Err(StorageError::NotFound(url.clone()))
        );
        assert_eq!(gateway.list("banners/a").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn list_by_file_prefix_and_missing_dir() {
        let (gateway, _temp) = gateway();
        let blob = Blob::new("f.jpg", "image/jpeg", vec![1]);
        gateway
            .upload(&blob, "images/fondo-sitio.jpg", UploadOptions::default())
            .await
            .unwrap();
        gateway
            .upload(&blob, "images/otra.jpg", UploadOptions::default())
            .await
            .unwrap();

        let listed = gateway.list("images/fondo-sitio").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].url, "/images/fondo-sitio.jpg");
        assert!(gateway.list("planillas/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn protected_and_escaping_paths_are_refused() {
        let (gateway, temp) = gateway();
        std::fs::create_dir_all(temp.path().join("equipos")).unwrap();
        std::fs::write(temp.path().join("equipos/sin-logo.jpg"), b"x").unwrap();

        assert!(matches!(
            gateway.delete("/equipos/sin-logo.jpg").await,
            Err(StorageError::Protected(_))
        ));
        assert!(temp.path().join("equipos/sin-logo.jpg").exists());

        assert!(matches!(
            gateway.delete("/../etc/passwd").await,
            Err(StorageError::Delete(_))
        ));
        let blob = Blob::new("x.pdf", "application/pdf", vec![1]);
        assert!(matches!(
            gateway
                .upload(&blob, "../outside.pdf", UploadOptions::default())
                .await,
            Err(StorageError::Upload(_))
        ));
    }

    #[tokio::test]
    async fn random_suffix_goes_before_extension() {
        let (gateway, _temp) = gateway();
        let blob = Blob::new("a.png", "image/png", vec![1]);
        let url = gateway
            .upload(
                &blob,
                "banners/a.png",
                UploadOptions {
                    add_random_suffix: true,
                    ..UploadOptions::default()
                },
            )
            .await
            .unwrap();
        let name = url.strip_prefix("/banners/a-").unwrap();
        assert_eq!(name.len(), "12345678.png".len());
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let gateway = LocalFsGateway::new("/srv/static", "https://cdn.example/static");
        assert_eq!(
            gateway.public_url("banners/a.png"),
            "https://cdn.example/static/banners/a.png"
        );
    }
}
