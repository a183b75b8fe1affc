use copa_db::{Banner, Sponsor};
use copa_storage::StorageGateway;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::inputs::{BannerInput, SponsorInput};
use crate::{CmsError, CmsService};

impl<G> CmsService<G>
where
    G: StorageGateway,
{
    #[instrument(skip(self, input))]
    pub async fn create_banner(&self, input: BannerInput) -> Result<Banner, CmsError> {
        let fields = input.into_fields(None)?;
        Ok(self.db.insert_banner(&fields).await?)
    }

    pub async fn banner(&self, id: Uuid) -> Result<Banner, CmsError> {
        self.db
            .fetch_banner(id)
            .await?
            .ok_or_else(|| CmsError::not_found("banner", id))
    }

    pub async fn banners(&self) -> Result<Vec<Banner>, CmsError> {
        Ok(self.db.list_banners().await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_banner(&self, id: Uuid, input: BannerInput) -> Result<Banner, CmsError> {
        let current = self.banner(id).await?;
        let fields = input.into_fields(Some(current.tournament_id))?;
        self.db
            .update_banner(id, &fields)
            .await?
            .ok_or_else(|| CmsError::not_found("banner", id))
    }

    /// Deletes the banner, then its images.
    #[instrument(skip(self))]
    pub async fn delete_banner(&self, id: Uuid) -> Result<(), CmsError> {
        let banner = self.banner(id).await?;
        if !self.db.delete_banner(id).await? {
            return Err(CmsError::not_found("banner", id));
        }
        info!(banner_id = %id, images = banner.image_urls.len(), "banner deleted");
        let images: Vec<&str> = banner.image_urls.iter().map(String::as_str).collect();
        self.discard_files(&images).await;
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn create_sponsor(&self, input: SponsorInput) -> Result<Sponsor, CmsError> {
        let fields = input.into_fields()?;
        Ok(self.db.insert_sponsor(&fields).await?)
    }

    pub async fn sponsor(&self, id: Uuid) -> Result<Sponsor, CmsError> {
        self.db
            .fetch_sponsor(id)
            .await?
            .ok_or_else(|| CmsError::not_found("sponsor", id))
    }

    pub async fn sponsors(&self) -> Result<Vec<Sponsor>, CmsError> {
        Ok(self.db.list_sponsors().await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_sponsor(&self, id: Uuid, input: SponsorInput) -> Result<Sponsor, CmsError> {
        let fields = input.into_fields()?;
        self.db
            .update_sponsor(id, &fields)
            .await?
            .ok_or_else(|| CmsError::not_found("sponsor", id))
    }

    /// Deletes the sponsor, then its image.
    #[instrument(skip(self))]
    pub async fn delete_sponsor(&self, id: Uuid) -> Result<(), CmsError> {
        let sponsor = self.sponsor(id).await?;
        if !self.db.delete_sponsor(id).await? {
            return Err(CmsError::not_found("sponsor", id));
        }
        info!(sponsor_id = %id, "sponsor deleted");
        self.discard_files(&[sponsor.image_url.as_str()]).await;
        Ok(())
    }
}
