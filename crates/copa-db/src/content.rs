//! Banners and sponsors.

use anyhow::Result;
use chrono::Utc;
use futures::TryStreamExt;
use tracing::info;
use uuid::Uuid;

use crate::normalize::{normalize_banner, normalize_sponsor, StoredBanner, StoredSponsor};
use crate::records::*;
use crate::{encode_json, format_timestamp, map_write_error, Database};

impl Database {
    pub async fn insert_banner(&self, fields: &NewBanner) -> Result<Banner> {
        let id = Uuid::new_v4();
        let now = format_timestamp(Utc::now());
        sqlx::query(
            r#"INSERT INTO banners (id, heading, image_urls, footer_text, location_url, tournament_id, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(&fields.heading)
        .bind(encode_json(&fields.image_urls)?)
        .bind(&fields.footer_text)
        .bind(&fields.location_url)
        .bind(fields.tournament_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "banner", "tournament"))?;

        info!(banner_id = %id, "banner created");
        self.fetch_banner(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("banner {id} vanished after insert"))
    }

    pub async fn fetch_banner(&self, id: Uuid) -> Result<Option<Banner>> {
        let row = sqlx::query_as::<_, StoredBanner>("SELECT * FROM banners WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(normalize_banner).transpose()?)
    }

    /// Banners newest first.
    pub async fn list_banners(&self) -> Result<Vec<Banner>> {
        let mut rows =
            sqlx::query_as::<_, StoredBanner>("SELECT * FROM banners ORDER BY created_at DESC")
                .fetch(&self.pool);

        let mut banners = Vec::new();
        while let Some(row) = rows.try_next().await? {
            banners.push(normalize_banner(row)?);
        }
        Ok(banners)
    }

    pub async fn update_banner(&self, id: Uuid, fields: &NewBanner) -> Result<Option<Banner>> {
        let result = sqlx::query(
            r#"UPDATE banners
               SET heading = ?, image_urls = ?, footer_text = ?, location_url = ?, tournament_id = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&fields.heading)
        .bind(encode_json(&fields.image_urls)?)
        .bind(&fields.footer_text)
        .bind(&fields.location_url)
        .bind(fields.tournament_id.to_string())
        .bind(format_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "banner", "tournament"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        info!(banner_id = %id, "banner updated");
        self.fetch_banner(id).await
    }

    pub async fn delete_banner(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM banners WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_sponsor(&self, fields: &NewSponsor) -> Result<Sponsor> {
        let id = Uuid::new_v4();
        let now = format_timestamp(Utc::now());
        sqlx::query(
            r#"INSERT INTO sponsors (id, name, image_url, social_name, social_url, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(&fields.name)
        .bind(&fields.image_url)
        .bind(&fields.social_name)
        .bind(&fields.social_url)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "sponsor", "sponsor"))?;

        info!(sponsor_id = %id, "sponsor created");
        self.fetch_sponsor(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("sponsor {id} vanished after insert"))
    }

    pub async fn fetch_sponsor(&self, id: Uuid) -> Result<Option<Sponsor>> {
        let row = sqlx::query_as::<_, StoredSponsor>("SELECT * FROM sponsors WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(normalize_sponsor).transpose()?)
    }

    /// Sponsors newest first.
    pub async fn list_sponsors(&self) -> Result<Vec<Sponsor>> {
        let mut rows =
            sqlx::query_as::<_, StoredSponsor>("SELECT * FROM sponsors ORDER BY created_at DESC")
                .fetch(&self.pool);

        let mut sponsors = Vec::new();
        while let Some(row) = rows.try_next().await? {
            sponsors.push(normalize_sponsor(row)?);
        }
        Ok(sponsors)
    }

    pub async fn update_sponsor(&self, id: Uuid, fields: &NewSponsor) -> Result<Option<Sponsor>> {
        let result = sqlx::query(
            r#"UPDATE sponsors
               SET name = ?, image_url = ?, social_name = ?, social_url = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&fields.name)
        .bind(&fields.image_url)
        .bind(&fields.social_name)
        .bind(&fields.social_url)
        .bind(format_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        info!(sponsor_id = %id, "sponsor updated");
        self.fetch_sponsor(id).await
    }

    pub async fn delete_sponsor(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sponsors WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
