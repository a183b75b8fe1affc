//! Record normalizer.
//!
//! Rows come out of SQLite with ids, timestamps and JSON columns as plain
//! text. The functions here turn a stored row into its typed record and
//! reject anything that does not match the declared shape: a list column
//! holding an object, a social-links object naming an unknown network, or a
//! timestamp that is not RFC 3339 all fail with [`NormalizeError`].

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::records::*;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{entity}.{column} holds malformed JSON: {source}")]
    Json {
        entity: &'static str,
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{entity}.{column} holds an invalid identifier '{value}'")]
    Id {
        entity: &'static str,
        column: &'static str,
        value: String,
    },
    #[error("{entity}.{column} holds an invalid timestamp '{value}'")]
    Timestamp {
        entity: &'static str,
        column: &'static str,
        value: String,
    },
    #[error("{entity}.{column} is out of range: {value}")]
    Range {
        entity: &'static str,
        column: &'static str,
        value: i64,
    },
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredOrganizer {
    pub id: String,
    pub name: String,
    pub emails: String,
    pub whatsapp_phone: String,
    pub cbu: String,
    pub alias: String,
    pub social_name: String,
    pub social_url: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredTournament {
    pub id: String,
    pub name: String,
    pub description: String,
    pub main_image: String,
    pub foundation_title: String,
    pub foundation_text: String,
    pub organizer_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredBanner {
    pub id: String,
    pub heading: String,
    pub image_urls: String,
    pub footer_text: String,
    pub location_url: String,
    pub tournament_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredSport {
    pub id: String,
    pub name: String,
    pub sheet_url: String,
    pub rules_url: String,
    pub fixture_url: String,
    pub competition_dates: String,
    pub schedules: String,
    pub location_names: String,
    pub location_urls: String,
    pub whatsapp_group_url: String,
    pub social_links: String,
    pub tournament_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredTeam {
    pub id: String,
    pub name: String,
    pub is_home: bool,
    pub logo_url: String,
    pub instagram: String,
    pub facebook: String,
    pub twitter: String,
    pub sport_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredPodiumEntry {
    pub id: String,
    pub team_name: String,
    pub placement: i64,
    pub sport_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredSponsor {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub social_name: String,
    pub social_url: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredSiteConfig {
    pub id: String,
    pub year: i64,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredUser {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

pub fn normalize_organizer(row: StoredOrganizer) -> Result<Organizer, NormalizeError> {
    const E: &str = "organizer";
    Ok(Organizer {
        id: parse_id(E, "id", &row.id)?,
        emails: decode_json(E, "emails", &row.emails)?,
        name: row.name,
        whatsapp_phone: row.whatsapp_phone,
        cbu: row.cbu,
        alias: row.alias,
        social_name: row.social_name,
        social_url: row.social_url,
        created_at: parse_timestamp(E, "created_at", &row.created_at)?,
        updated_at: parse_timestamp(E, "updated_at", &row.updated_at)?,
    })
}

pub fn normalize_tournament(row: StoredTournament) -> Result<Tournament, NormalizeError> {
    const E: &str = "tournament";
    Ok(Tournament {
        id: parse_id(E, "id", &row.id)?,
        foundation_text: decode_json(E, "foundation_text", &row.foundation_text)?,
        organizer_id: parse_id(E, "organizer_id", &row.organizer_id)?,
        name: row.name,
        description: row.description,
        main_image: row.main_image,
        foundation_title: row.foundation_title,
        created_at: parse_timestamp(E, "created_at", &row.created_at)?,
        updated_at: parse_timestamp(E, "updated_at", &row.updated_at)?,
    })
}

pub fn normalize_banner(row: StoredBanner) -> Result<Banner, NormalizeError> {
    const E: &str = "banner";
    Ok(Banner {
        id: parse_id(E, "id", &row.id)?,
        image_urls: decode_json(E, "image_urls", &row.image_urls)?,
        tournament_id: parse_id(E, "tournament_id", &row.tournament_id)?,
        heading: row.heading,
        footer_text: row.footer_text,
        location_url: row.location_url,
        created_at: parse_timestamp(E, "created_at", &row.created_at)?,
        updated_at: parse_timestamp(E, "updated_at", &row.updated_at)?,
    })
}

pub fn normalize_sport(row: StoredSport) -> Result<Sport, NormalizeError> {
    const E: &str = "sport";
    Ok(Sport {
        id: parse_id(E, "id", &row.id)?,
        competition_dates: decode_json(E, "competition_dates", &row.competition_dates)?,
        schedules: decode_json(E, "schedules", &row.schedules)?,
        location_names: decode_json(E, "location_names", &row.location_names)?,
        location_urls: decode_json(E, "location_urls", &row.location_urls)?,
        social_links: decode_json(E, "social_links", &row.social_links)?,
        tournament_id: parse_id(E, "tournament_id", &row.tournament_id)?,
        name: row.name,
        sheet_url: row.sheet_url,
        rules_url: row.rules_url,
        fixture_url: row.fixture_url,
        whatsapp_group_url: row.whatsapp_group_url,
        created_at: parse_timestamp(E, "created_at", &row.created_at)?,
        updated_at: parse_timestamp(E, "updated_at", &row.updated_at)?,
    })
}

pub fn normalize_team(row: StoredTeam) -> Result<Team, NormalizeError> {
    const E: &str = "team";
    Ok(Team {
        id: parse_id(E, "id", &row.id)?,
        sport_id: parse_id(E, "sport_id", &row.sport_id)?,
        name: row.name,
        is_home: row.is_home,
        logo_url: row.logo_url,
        instagram: row.instagram,
        facebook: row.facebook,
        twitter: row.twitter,
        created_at: parse_timestamp(E, "created_at", &row.created_at)?,
        updated_at: parse_timestamp(E, "updated_at", &row.updated_at)?,
    })
}

pub fn normalize_podium_entry(row: StoredPodiumEntry) -> Result<PodiumEntry, NormalizeError> {
    const E: &str = "podium";
    let placement = u32::try_from(row.placement)
        .ok()
        .filter(|placement| *placement >= 1)
        .ok_or(NormalizeError::Range {
            entity: E,
            column: "placement",
            value: row.placement,
        })?;
    Ok(PodiumEntry {
        id: parse_id(E, "id", &row.id)?,
        sport_id: parse_id(E, "sport_id", &row.sport_id)?,
        team_name: row.team_name,
        placement,
        created_at: parse_timestamp(E, "created_at", &row.created_at)?,
        updated_at: parse_timestamp(E, "updated_at", &row.updated_at)?,
    })
}

pub fn normalize_sponsor(row: StoredSponsor) -> Result<Sponsor, NormalizeError> {
    const E: &str = "sponsor";
    Ok(Sponsor {
        id: parse_id(E, "id", &row.id)?,
        name: row.name,
        image_url: row.image_url,
        social_name: row.social_name,
        social_url: row.social_url,
        created_at: parse_timestamp(E, "created_at", &row.created_at)?,
        updated_at: parse_timestamp(E, "updated_at", &row.updated_at)?,
    })
}

pub fn normalize_site_config(row: StoredSiteConfig) -> Result<SiteConfig, NormalizeError> {
    const E: &str = "config";
    let year = i32::try_from(row.year).map_err(|_| NormalizeError::Range {
        entity: E,
        column: "year",
        value: row.year,
    })?;
    Ok(SiteConfig {
        id: parse_id(E, "id", &row.id)?,
        year,
        description: row.description,
        created_at: parse_timestamp(E, "created_at", &row.created_at)?,
        updated_at: parse_timestamp(E, "updated_at", &row.updated_at)?,
    })
}

pub fn normalize_user(row: StoredUser) -> Result<UserRecord, NormalizeError> {
    const E: &str = "user";
    Ok(UserRecord {
        id: parse_id(E, "id", &row.id)?,
        email: row.email,
        password_hash: row.password_hash,
        created_at: parse_timestamp(E, "created_at", &row.created_at)?,
        updated_at: parse_timestamp(E, "updated_at", &row.updated_at)?,
    })
}

fn decode_json<T: DeserializeOwned>(
    entity: &'static str,
    column: &'static str,
    raw: &str,
) -> Result<T, NormalizeError> {
    serde_json::from_str(raw).map_err(|source| NormalizeError::Json {
        entity,
        column,
        source,
    })
}

fn parse_id(entity: &'static str, column: &'static str, raw: &str) -> Result<Uuid, NormalizeError> {
    Uuid::parse_str(raw).map_err(|_| NormalizeError::Id {
        entity,
        column,
        value: raw.to_string(),
    })
}

fn parse_timestamp(
    entity: &'static str,
    column: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>, NormalizeError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| NormalizeError::Timestamp {
            entity,
            column,
            value: raw.to_string(),
        })
}
