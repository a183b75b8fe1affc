//! Copa persistence layer.
//!
//! Async API around SQLite (sqlx) holding the microsite catalogue: the
//! organizer, the tournament with its banners and sports, teams and podium
//! entries per sport, sponsors, the site configuration and admin users.
//! List- and object-valued fields are kept as JSON text columns and are
//! reinterpreted through [`normalize`] on every read.

use std::{path::Path, str::FromStr, time::Duration};

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use thiserror::Error;
use tracing::info;

mod content;
pub mod normalize;
mod records;
mod site;
mod sports;

pub use normalize::NormalizeError;
pub use records::*;

/// Default SQLite busy timeout in milliseconds when the DB is under load.
const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Primary entry point to the persistence layer.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes (or creates) a connection pool to the SQLite database located at
    /// the given URL (e.g. `sqlite:///var/lib/copa/copa.db`).
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_millis(SQLITE_BUSY_TIMEOUT_MS));

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(8)
            .connect_with(options)
            .await?;

        // Run embedded migrations. The directory is resolved relative to this crate.
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Connects to a file path via `sqlite://` scheme.
    pub async fn connect_file(path: &Path) -> Result<Self> {
        let url = format!("sqlite://{}", path.display());
        Self::connect(&url).await
    }

    /// Exposes the underlying pool for callers composing their own queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Liveness check used by the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Row counts per table.
    pub async fn entity_counts(&self) -> Result<EntityCounts> {
        Ok(EntityCounts {
            organizers: self.count("organizers").await?,
            tournaments: self.count("tournaments").await?,
            banners: self.count("banners").await?,
            sports: self.count("sports").await?,
            sponsors: self.count("sponsors").await?,
            teams: self.count("teams").await?,
            podiums: self.count("podium_entries").await?,
            configs: self.count("site_config").await?,
        })
    }

    async fn count(&self, table: &'static str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Deletes every row, children before parents.
    pub async fn wipe_all(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for table in [
            "podium_entries",
            "teams",
            "sports",
            "banners",
            "tournaments",
            "organizers",
            "sponsors",
            "users",
            "site_config",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        info!("all tables wiped");
        Ok(())
    }
}

/// Errors returned by the database layer for constraint violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),
}

/// Per-table row counts.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct EntityCounts {
    pub organizers: u64,
    pub tournaments: u64,
    pub banners: u64,
    pub sports: u64,
    pub sponsors: u64,
    pub teams: u64,
    pub podiums: u64,
    pub configs: u64,
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE"))
}

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.message().contains("FOREIGN KEY"))
}

/// Translates constraint failures on writes into [`StoreError`] values.
fn map_write_error(err: sqlx::Error, entity: &'static str, parent: &'static str) -> anyhow::Error {
    if is_unique_violation(&err) {
        anyhow::Error::new(StoreError::Duplicate(entity))
    } else if is_foreign_key_violation(&err) {
        anyhow::Error::new(StoreError::MissingReference(parent))
    } else {
        err.into()
    }
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn encode_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    pub async fn setup_db() -> (Database, TempDir) {
        let temp = TempDir::new().unwrap();
        let db = Database::connect_file(&temp.path().join("copa.sqlite"))
            .await
            .unwrap();
        (db, temp)
    }

    pub fn organizer_fields(name: &str) -> NewOrganizer {
        NewOrganizer {
            name: name.into(),
            emails: vec!["info@copa.example".into()],
            whatsapp_phone: "+54 379 400 0000".into(),
            cbu: "0000003100000000000000".into(),
            alias: "copa.alias".into(),
            social_name: String::new(),
            social_url: String::new(),
        }
    }

    pub async fn seed_tournament(db: &Database) -> Tournament {
        let organizer = db.insert_organizer(&organizer_fields("Org")).await.unwrap();
        db.insert_tournament(&NewTournament {
            name: "Copa".into(),
            description: "Torneo".into(),
            main_image: String::new(),
            foundation_title: "Fundamentación".into(),
            foundation_text: vec!["uno".into()],
            organizer_id: organizer.id,
        })
        .await
        .unwrap()
    }
}
