use copa_storage::{
    policy::SITE_BACKGROUND_PREFIX, Blob, PolicyViolation, StorageError, StorageGateway,
    StoredObject, UploadOptions, UploadTarget,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{CmsError, CmsService};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub url: String,
    pub filename: String,
}

impl<G> CmsService<G>
where
    G: StorageGateway,
{
    /// Validates `blob` against the target's policy, then stores it.
    ///
    /// Sport documents need the id of an existing sport. A new site background
    /// replaces every stored one.
    #[instrument(skip(self, blob), fields(file = %blob.file_name, size = blob.size()))]
    pub async fn upload(
        &self,
        target: UploadTarget,
        blob: &Blob,
        sport_id: Option<Uuid>,
    ) -> Result<UploadedFile, CmsError> {
        let extension = target.check(blob)?;
        let path = target.object_path(&extension, sport_id)?;

        if target.is_sport_document() {
            let sport_id = sport_id.ok_or(PolicyViolation::MissingSport { target })?;
            self.sport(sport_id).await?;
        }
        if target == UploadTarget::SiteBackground {
            let previous = self
                .storage
                .list(SITE_BACKGROUND_PREFIX)
                .await
                .map_err(CmsError::Upload)?;
            for object in previous {
                match self.storage.delete(&object.url).await {
                    Ok(()) | Err(StorageError::NotFound(_)) => {}
                    Err(err) => return Err(CmsError::Upload(err)),
                }
            }
        }

        let url = self
            .storage
            .upload(blob, &path, UploadOptions::default())
            .await
            .map_err(CmsError::Upload)?;
        let filename = path.rsplit('/').next().unwrap_or(&path).to_string();
        info!(%target, %url, "file uploaded");
        Ok(UploadedFile { url, filename })
    }

    /// Deletes a stored file by public URL. The placeholder logo is refused.
    #[instrument(skip(self))]
    pub async fn delete_file(&self, url: &str) -> Result<(), CmsError> {
        if url.trim().is_empty() {
            return Err(CmsError::invalid("fileUrl is required"));
        }
        match self.storage.delete(url).await {
            Ok(()) => {
                info!(url, "file deleted");
                Ok(())
            }
            Err(err @ StorageError::Protected(_)) => Err(CmsError::invalid(err.to_string())),
            Err(StorageError::NotFound(url)) => Err(CmsError::NotFound(format!("file {url}"))),
            Err(err) => Err(CmsError::Delete(err)),
        }
    }

    pub async fn list_files(&self, prefix: &str) -> Result<Vec<StoredObject>, CmsError> {
        self.storage.list(prefix).await.map_err(|err| {
            CmsError::Unknown(anyhow::Error::new(err).context(format!("listing '{prefix}'")))
        })
    }

    /// Stored files under `prefix` whose extension `target` accepts.
    pub async fn available_images(
        &self,
        prefix: &str,
        target: UploadTarget,
    ) -> Result<Vec<StoredObject>, CmsError> {
        let mut objects = self.list_files(prefix).await?;
        objects.retain(|object| target.accepts_extension(&object.pathname));
        Ok(objects)
    }
}
