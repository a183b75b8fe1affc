//! Sports and their children (teams, podium entries).

use anyhow::Result;
use chrono::Utc;
use futures::TryStreamExt;
use tracing::info;
use uuid::Uuid;

use crate::normalize::{
    normalize_podium_entry, normalize_sport, normalize_team, StoredPodiumEntry, StoredSport,
    StoredTeam,
};
use crate::records::*;
use crate::{encode_json, format_timestamp, map_write_error, Database};

impl Database {
    pub async fn insert_sport(&self, fields: &NewSport) -> Result<Sport> {
        let id = Uuid::new_v4();
        let now = format_timestamp(Utc::now());
        sqlx::query(
            r#"INSERT INTO sports (id, name, sheet_url, rules_url, fixture_url, competition_dates, schedules,
                                   location_names, location_urls, whatsapp_group_url, social_links, tournament_id,
                                   created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(&fields.name)
        .bind(&fields.sheet_url)
        .bind(&fields.rules_url)
        .bind(&fields.fixture_url)
        .bind(encode_json(&fields.competition_dates)?)
        .bind(encode_json(&fields.schedules)?)
        .bind(encode_json(&fields.location_names)?)
        .bind(encode_json(&fields.location_urls)?)
        .bind(&fields.whatsapp_group_url)
        .bind(encode_json(&fields.social_links)?)
        .bind(fields.tournament_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "sport", "tournament"))?;

        info!(sport_id = %id, "sport created");
        self.fetch_sport(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("sport {id} vanished after insert"))
    }

    pub async fn fetch_sport(&self, id: Uuid) -> Result<Option<Sport>> {
        let row = sqlx::query_as::<_, StoredSport>("SELECT * FROM sports WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(normalize_sport).transpose()?)
    }

    /// Sports ordered by name.
    pub async fn list_sports(&self) -> Result<Vec<Sport>> {
        let mut rows = sqlx::query_as::<_, StoredSport>("SELECT * FROM sports ORDER BY name ASC")
            .fetch(&self.pool);

        let mut sports = Vec::new();
        while let Some(row) = rows.try_next().await? {
            sports.push(normalize_sport(row)?);
        }
        Ok(sports)
    }

    pub async fn update_sport(&self, id: Uuid, fields: &NewSport) -> Result<Option<Sport>> {
        let result = sqlx::query(
            r#"UPDATE sports
               SET name = ?, sheet_url = ?, rules_url = ?, fixture_url = ?, competition_dates = ?, schedules = ?,
                   location_names = ?, location_urls = ?, whatsapp_group_url = ?, social_links = ?,
                   tournament_id = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&fields.name)
        .bind(&fields.sheet_url)
        .bind(&fields.rules_url)
        .bind(&fields.fixture_url)
        .bind(encode_json(&fields.competition_dates)?)
        .bind(encode_json(&fields.schedules)?)
        .bind(encode_json(&fields.location_names)?)
        .bind(encode_json(&fields.location_urls)?)
        .bind(&fields.whatsapp_group_url)
        .bind(encode_json(&fields.social_links)?)
        .bind(fields.tournament_id.to_string())
        .bind(format_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "sport", "tournament"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        info!(sport_id = %id, "sport updated");
        self.fetch_sport(id).await
    }

    /// Deletes a sport; its teams and podium entries go with it.
    pub async fn delete_sport(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sports WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_team(&self, fields: &NewTeam) -> Result<Team> {
        let id = Uuid::new_v4();
        let now = format_timestamp(Utc::now());
        sqlx::query(
            r#"INSERT INTO teams (id, name, is_home, logo_url, instagram, facebook, twitter, sport_id, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(&fields.name)
        .bind(fields.is_home)
        .bind(&fields.logo_url)
        .bind(&fields.instagram)
        .bind(&fields.facebook)
        .bind(&fields.twitter)
        .bind(fields.sport_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "team", "sport"))?;

        info!(team_id = %id, "team created");
        self.fetch_team(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("team {id} vanished after insert"))
    }

    pub async fn fetch_team(&self, id: Uuid) -> Result<Option<Team>> {
        let row = sqlx::query_as::<_, StoredTeam>("SELECT * FROM teams WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(normalize_team).transpose()?)
    }

    /// Teams newest first, optionally restricted to one sport.
    pub async fn list_teams(&self, sport_id: Option<Uuid>) -> Result<Vec<Team>> {
        let query = match sport_id {
            Some(sport_id) => sqlx::query_as::<_, StoredTeam>(
                "SELECT * FROM teams WHERE sport_id = ? ORDER BY created_at DESC",
            )
            .bind(sport_id.to_string()),
            None => {
                sqlx::query_as::<_, StoredTeam>("SELECT * FROM teams ORDER BY created_at DESC")
            }
        };
        let mut rows = query.fetch(&self.pool);

        let mut teams = Vec::new();
        while let Some(row) = rows.try_next().await? {
            teams.push(normalize_team(row)?);
        }
        Ok(teams)
    }

    pub async fn update_team(&self, id: Uuid, fields: &NewTeam) -> Result<Option<Team>> {
        let result = sqlx::query(
            r#"UPDATE teams
               SET name = ?, is_home = ?, logo_url = ?, instagram = ?, facebook = ?, twitter = ?, sport_id = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&fields.name)
        .bind(fields.is_home)
        .bind(&fields.logo_url)
        .bind(&fields.instagram)
        .bind(&fields.facebook)
        .bind(&fields.twitter)
        .bind(fields.sport_id.to_string())
        .bind(format_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "team", "sport"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        info!(team_id = %id, "team updated");
        self.fetch_team(id).await
    }

    pub async fn delete_team(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Inserts a podium entry. A taken `(sport, placement)` pair is a duplicate.
    pub async fn insert_podium_entry(&self, fields: &NewPodiumEntry) -> Result<PodiumEntry> {
        let id = Uuid::new_v4();
        let now = format_timestamp(Utc::now());
        sqlx::query(
            r#"INSERT INTO podium_entries (id, team_name, placement, sport_id, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(&fields.team_name)
        .bind(i64::from(fields.placement))
        .bind(fields.sport_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "podium", "sport"))?;

        info!(podium_id = %id, placement = fields.placement, "podium entry created");
        self.fetch_podium_entry(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("podium entry {id} vanished after insert"))
    }

    pub async fn fetch_podium_entry(&self, id: Uuid) -> Result<Option<PodiumEntry>> {
        let row =
            sqlx::query_as::<_, StoredPodiumEntry>("SELECT * FROM podium_entries WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(normalize_podium_entry).transpose()?)
    }

    /// Podium entries ordered by sport then placement.
    pub async fn list_podium_entries(&self, sport_id: Option<Uuid>) -> Result<Vec<PodiumEntry>> {
        let query = match sport_id {
            Some(sport_id) => sqlx::query_as::<_, StoredPodiumEntry>(
                "SELECT * FROM podium_entries WHERE sport_id = ? ORDER BY placement ASC",
            )
            .bind(sport_id.to_string()),
            None => sqlx::query_as::<_, StoredPodiumEntry>(
                "SELECT * FROM podium_entries ORDER BY sport_id ASC, placement ASC",
            ),
        };
        let mut rows = query.fetch(&self.pool);

        let mut entries = Vec::new();
        while let Some(row) = rows.try_next().await? {
            entries.push(normalize_podium_entry(row)?);
        }
        Ok(entries)
    }

    pub async fn update_podium_entry(
        &self,
        id: Uuid,
        fields: &NewPodiumEntry,
    ) -> Result<Option<PodiumEntry>> {
        let result = sqlx::query(
            r#"UPDATE podium_entries
               SET team_name = ?, placement = ?, sport_id = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&fields.team_name)
        .bind(i64::from(fields.placement))
        .bind(fields.sport_id.to_string())
        .bind(format_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "podium", "sport"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        info!(podium_id = %id, "podium entry updated");
        self.fetch_podium_entry(id).await
    }

    pub async fn delete_podium_entry(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM podium_entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::*;
    use uuid::Uuid;

    fn sport_fields(name: &str, tournament_id: Uuid) -> NewSport {
        NewSport {
            name: name.into(),
            sheet_url: String::new(),
            rules_url: String::new(),
            fixture_url: String::new(),
            competition_dates: vec!["12/10".into()],
            schedules: Vec::new(),
            location_names: Vec::new(),
            location_urls: Vec::new(),
            whatsapp_group_url: String::new(),
            social_links: SocialLinks {
                instagram: Some(vec![SocialHandle {
                    name: "@copa".into(),
                    url: "https://instagram.com/copa".into(),
                }]),
                ..SocialLinks::default()
            },
            tournament_id,
        }
    }

    fn team_fields(name: &str, sport_id: Uuid) -> NewTeam {
        NewTeam {
            name: name.into(),
            is_home: true,
            logo_url: "/equipos/sin-logo.jpg".into(),
            instagram: String::new(),
            facebook: String::new(),
            twitter: String::new(),
            sport_id,
        }
    }

    #[tokio::test]
    async fn sports_sorted_by_name_with_social_links() {
        let (db, _tmp) = setup_db().await;
        let tournament = seed_tournament(&db).await;
        db.insert_sport(&sport_fields("Vóley", tournament.id))
            .await
            .unwrap();
        let basquet = db
            .insert_sport(&sport_fields("Básquet", tournament.id))
            .await
            .unwrap();

        let sports = db.list_sports().await.unwrap();
        assert_eq!(sports[0].id, basquet.id);
        assert_eq!(
            sports[0].social_links.instagram.as_ref().map(Vec::len),
            Some(1)
        );
    }

    #[tokio::test]
    async fn podium_placement_is_unique_per_sport() {
        let (db, _tmp) = setup_db().await;
        let tournament = seed_tournament(&db).await;
        let sport = db
            .insert_sport(&sport_fields("Fútbol", tournament.id))
            .await
            .unwrap();
        let other = db
            .insert_sport(&sport_fields("Handball", tournament.id))
            .await
            .unwrap();

        let first = db
            .insert_podium_entry(&NewPodiumEntry {
                team_name: "Los Pumas".into(),
                placement: 1,
                sport_id: sport.id,
            })
            .await
            .unwrap();
        let err = db
            .insert_podium_entry(&NewPodiumEntry {
                team_name: "Las Águilas".into(),
                placement: 1,
                sport_id: sport.id,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::Duplicate("podium"))
        );

        db.insert_podium_entry(&NewPodiumEntry {
            team_name: "Las Águilas".into(),
            placement: 1,
            sport_id: other.id,
        })
        .await
        .unwrap();
        let second = db
            .insert_podium_entry(&NewPodiumEntry {
                team_name: "Las Águilas".into(),
                placement: 2,
                sport_id: sport.id,
            })
            .await
            .unwrap();

        let entries = db.list_podium_entries(Some(sport.id)).await.unwrap();
        assert_eq!(
            entries.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );

        let err = db
            .update_podium_entry(
                second.id,
                &NewPodiumEntry {
                    team_name: "Las Águilas".into(),
                    placement: 1,
                    sport_id: sport.id,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::Duplicate("podium"))
        );
    }

    #[tokio::test]
    async fn deleting_a_sport_cascades_to_children() {
        let (db, _tmp) = setup_db().await;
        let tournament = seed_tournament(&db).await;
        let sport = db
            .insert_sport(&sport_fields("Fútbol", tournament.id))
            .await
            .unwrap();
        let team = db.insert_team(&team_fields("Pumas", sport.id)).await.unwrap();
        assert!(team.is_home);
        db.insert_podium_entry(&NewPodiumEntry {
            team_name: "Pumas".into(),
            placement: 1,
            sport_id: sport.id,
        })
        .await
        .unwrap();

        let err = db
            .insert_team(&team_fields("Huérfano", Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::MissingReference("sport"))
        );

        assert!(db.delete_sport(sport.id).await.unwrap());
        assert!(db.fetch_team(team.id).await.unwrap().is_none());
        assert!(db.list_podium_entries(None).await.unwrap().is_empty());
        assert!(db.list_teams(Some(sport.id)).await.unwrap().is_empty());
    }
}
