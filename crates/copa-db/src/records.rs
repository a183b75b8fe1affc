use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle on one social network, e.g. `{"nombre": "@copa", "url": "https://..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialHandle {
    #[serde(rename = "nombre")]
    pub name: String,
    pub url: String,
}

/// Social links attached to a sport. Only the three known networks are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<Vec<SocialHandle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<Vec<SocialHandle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<Vec<SocialHandle>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organizer {
    pub id: Uuid,
    pub name: String,
    pub emails: Vec<String>,
    pub whatsapp_phone: String,
    pub cbu: String,
    pub alias: String,
    pub social_name: String,
    pub social_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewOrganizer {
    pub name: String,
    pub emails: Vec<String>,
    pub whatsapp_phone: String,
    pub cbu: String,
    pub alias: String,
    pub social_name: String,
    pub social_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub main_image: String,
    pub foundation_title: String,
    pub foundation_text: Vec<String>,
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTournament {
    pub name: String,
    pub description: String,
    pub main_image: String,
    pub foundation_title: String,
    pub foundation_text: Vec<String>,
    pub organizer_id: Uuid,
}

/// Id/name pair used by selection lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: Uuid,
    pub heading: String,
    pub image_urls: Vec<String>,
    pub footer_text: String,
    pub location_url: String,
    pub tournament_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBanner {
    pub heading: String,
    pub image_urls: Vec<String>,
    pub footer_text: String,
    pub location_url: String,
    pub tournament_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sport {
    pub id: Uuid,
    pub name: String,
    pub sheet_url: String,
    pub rules_url: String,
    pub fixture_url: String,
    pub competition_dates: Vec<String>,
    pub schedules: Vec<String>,
    pub location_names: Vec<String>,
    pub location_urls: Vec<String>,
    pub whatsapp_group_url: String,
    pub social_links: SocialLinks,
    pub tournament_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sport {
    /// Non-empty document URLs (sheet, rules, fixture).
    pub fn document_urls(&self) -> Vec<&str> {
        [&self.sheet_url, &self.rules_url, &self.fixture_url]
            .into_iter()
            .map(String::as_str)
            .filter(|url| !url.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSport {
    pub name: String,
    pub sheet_url: String,
    pub rules_url: String,
    pub fixture_url: String,
    pub competition_dates: Vec<String>,
    pub schedules: Vec<String>,
    pub location_names: Vec<String>,
    pub location_urls: Vec<String>,
    pub whatsapp_group_url: String,
    pub social_links: SocialLinks,
    pub tournament_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub is_home: bool,
    pub logo_url: String,
    pub instagram: String,
    pub facebook: String,
    pub twitter: String,
    pub sport_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub name: String,
    pub is_home: bool,
    pub logo_url: String,
    pub instagram: String,
    pub facebook: String,
    pub twitter: String,
    pub sport_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodiumEntry {
    pub id: Uuid,
    pub team_name: String,
    pub placement: u32,
    pub sport_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPodiumEntry {
    pub team_name: String,
    pub placement: u32,
    pub sport_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub social_name: String,
    pub social_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSponsor {
    pub name: String,
    pub image_url: String,
    pub social_name: String,
    pub social_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub id: Uuid,
    pub year: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSiteConfig {
    pub year: i32,
    pub description: String,
}

/// Admin account. The hash is opaque to this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
