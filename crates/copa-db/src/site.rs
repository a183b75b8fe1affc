//! Singleton rows (organizer, tournament, site config) and admin users.

use anyhow::Result;
use chrono::Utc;
use futures::TryStreamExt;
use tracing::info;
use uuid::Uuid;

use crate::normalize::{
    normalize_organizer, normalize_site_config, normalize_tournament, normalize_user,
    StoredOrganizer, StoredSiteConfig, StoredTournament, StoredUser,
};
use crate::records::*;
use crate::{encode_json, format_timestamp, map_write_error, Database};

impl Database {
    /// Inserts the organizer. A second organizer violates the singleton constraint.
    pub async fn insert_organizer(&self, fields: &NewOrganizer) -> Result<Organizer> {
        let id = Uuid::new_v4();
        let now = format_timestamp(Utc::now());
        sqlx::query(
            r#"INSERT INTO organizers (id, name, emails, whatsapp_phone, cbu, alias, social_name, social_url, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(&fields.name)
        .bind(encode_json(&fields.emails)?)
        .bind(&fields.whatsapp_phone)
        .bind(&fields.cbu)
        .bind(&fields.alias)
        .bind(&fields.social_name)
        .bind(&fields.social_url)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "organizer", "organizer"))?;

        info!(organizer_id = %id, "organizer created");
        self.fetch_organizer()
            .await?
            .ok_or_else(|| anyhow::anyhow!("organizer {id} vanished after insert"))
    }

    /// Returns the singleton organizer, if any.
    pub async fn fetch_organizer(&self) -> Result<Option<Organizer>> {
        let row = sqlx::query_as::<_, StoredOrganizer>("SELECT * FROM organizers LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(normalize_organizer).transpose()?)
    }

    pub async fn update_organizer(&self, id: Uuid, fields: &NewOrganizer) -> Result<Option<Organizer>> {
        let result = sqlx::query(
            r#"UPDATE organizers
               SET name = ?, emails = ?, whatsapp_phone = ?, cbu = ?, alias = ?, social_name = ?, social_url = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&fields.name)
        .bind(encode_json(&fields.emails)?)
        .bind(&fields.whatsapp_phone)
        .bind(&fields.cbu)
        .bind(&fields.alias)
        .bind(&fields.social_name)
        .bind(&fields.social_url)
        .bind(format_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        info!(organizer_id = %id, "organizer updated");
        self.fetch_organizer().await
    }

    /// Inserts the tournament. Fails when one exists or the organizer is unknown.
    pub async fn insert_tournament(&self, fields: &NewTournament) -> Result<Tournament> {
        let id = Uuid::new_v4();
        let now = format_timestamp(Utc::now());
        sqlx::query(
            r#"INSERT INTO tournaments (id, name, description, main_image, foundation_title, foundation_text, organizer_id, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.main_image)
        .bind(&fields.foundation_title)
        .bind(encode_json(&fields.foundation_text)?)
        .bind(fields.organizer_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "tournament", "organizer"))?;

        info!(tournament_id = %id, "tournament created");
        self.fetch_tournament()
            .await?
            .ok_or_else(|| anyhow::anyhow!("tournament {id} vanished after insert"))
    }

    /// Returns the singleton tournament, if any.
    pub async fn fetch_tournament(&self) -> Result<Option<Tournament>> {
        let row = sqlx::query_as::<_, StoredTournament>("SELECT * FROM tournaments LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(normalize_tournament).transpose()?)
    }

    pub async fn fetch_tournament_by_id(&self, id: Uuid) -> Result<Option<Tournament>> {
        let row = sqlx::query_as::<_, StoredTournament>("SELECT * FROM tournaments WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(normalize_tournament).transpose()?)
    }

    pub async fn list_tournament_summaries(&self) -> Result<Vec<TournamentSummary>> {
        let mut rows = sqlx::query_as::<_, (String, String)>(
            "SELECT id, name FROM tournaments ORDER BY name ASC",
        )
        .fetch(&self.pool);

        let mut summaries = Vec::new();
        while let Some((id, name)) = rows.try_next().await? {
            summaries.push(TournamentSummary {
                id: Uuid::parse_str(&id)?,
                name,
            });
        }
        Ok(summaries)
    }

    pub async fn update_tournament(&self, id: Uuid, fields: &NewTournament) -> Result<Option<Tournament>> {
        let result = sqlx::query(
            r#"UPDATE tournaments
               SET name = ?, description = ?, main_image = ?, foundation_title = ?, foundation_text = ?, organizer_id = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.main_image)
        .bind(&fields.foundation_title)
        .bind(encode_json(&fields.foundation_text)?)
        .bind(fields.organizer_id.to_string())
        .bind(format_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "tournament", "organizer"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        info!(tournament_id = %id, "tournament updated");
        self.fetch_tournament_by_id(id).await
    }

    pub async fn insert_site_config(&self, fields: &NewSiteConfig) -> Result<SiteConfig> {
        let id = Uuid::new_v4();
        let now = format_timestamp(Utc::now());
        sqlx::query(
            "INSERT INTO site_config (id, year, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(i64::from(fields.year))
        .bind(&fields.description)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "config", "config"))?;

        info!(config_id = %id, year = fields.year, "site config created");
        self.fetch_site_config()
            .await?
            .ok_or_else(|| anyhow::anyhow!("config {id} vanished after insert"))
    }

    pub async fn fetch_site_config(&self) -> Result<Option<SiteConfig>> {
        let row = sqlx::query_as::<_, StoredSiteConfig>("SELECT * FROM site_config LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(normalize_site_config).transpose()?)
    }

    pub async fn update_site_config(&self, id: Uuid, fields: &NewSiteConfig) -> Result<Option<SiteConfig>> {
        let result = sqlx::query(
            "UPDATE site_config SET year = ?, description = ?, updated_at = ? WHERE id = ?",
        )
        .bind(i64::from(fields.year))
        .bind(&fields.description)
        .bind(format_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        info!(config_id = %id, "site config updated");
        self.fetch_site_config().await
    }

    /// Stores an admin account. The caller hashes the password.
    pub async fn insert_user(&self, email: &str, password_hash: &str) -> Result<UserRecord> {
        let id = Uuid::new_v4();
        let now = format_timestamp(Utc::now());
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(email)
        .bind(password_hash)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "user", "user"))?;

        info!(user_id = %id, "user created");
        self.find_user_by_email(email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {id} vanished after insert"))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, StoredUser>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(normalize_user).transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::*;

    #[tokio::test]
    async fn organizer_is_a_singleton() {
        let (db, _tmp) = setup_db().await;
        let first = db.insert_organizer(&organizer_fields("Org")).await.unwrap();
        assert_eq!(first.emails, vec!["info@copa.example".to_string()]);

        let err = db
            .insert_organizer(&organizer_fields("Other"))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::Duplicate("organizer"))
        );

        let mut fields = organizer_fields("Renamed");
        fields.emails.push("second@copa.example".into());
        let updated = db.update_organizer(first.id, &fields).await.unwrap().unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.emails.len(), 2);
        assert!(updated.updated_at >= first.updated_at);

        let missing = db
            .update_organizer(uuid::Uuid::new_v4(), &fields)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn tournament_requires_existing_organizer() {
        let (db, _tmp) = setup_db().await;
        let err = db
            .insert_tournament(&NewTournament {
                name: "Copa".into(),
                description: "d".into(),
                main_image: String::new(),
                foundation_title: "t".into(),
                foundation_text: Vec::new(),
                organizer_id: uuid::Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::MissingReference("organizer"))
        );

        let tournament = seed_tournament(&db).await;
        let summaries = db.list_tournament_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, tournament.id);
        assert_eq!(summaries[0].name, "Copa");
    }

    #[tokio::test]
    async fn site_config_and_users() {
        let (db, _tmp) = setup_db().await;
        assert!(db.fetch_site_config().await.unwrap().is_none());

        let config = db
            .insert_site_config(&NewSiteConfig {
                year: 2024,
                description: "Edición 2024".into(),
            })
            .await
            .unwrap();
        let err = db
            .insert_site_config(&NewSiteConfig {
                year: 2025,
                description: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::Duplicate("config"))
        );
        let updated = db
            .update_site_config(
                config.id,
                &NewSiteConfig {
                    year: 2025,
                    description: "Edición 2025".into(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.year, 2025);

        db.insert_user("admin@copa.example", "hash").await.unwrap();
        let err = db
            .insert_user("admin@copa.example", "other")
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::Duplicate("user"))
        );
        let user = db
            .find_user_by_email("admin@copa.example")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.password_hash, "hash");
    }
}
