//! Bootstraps a database from a JSON document describing the whole site.

use chrono::{Datelike, Utc};
use copa_db::{EntityCounts, NewSiteConfig};
use copa_storage::StorageGateway;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::inputs::{
    BannerInput, ConfigInput, OrganizerInput, SponsorInput, SportInput, TournamentInput,
};
use crate::{CmsError, CmsService};

#[derive(Debug, Clone, Deserialize)]
pub struct SeedDocument {
    #[serde(rename = "organizador")]
    pub organizer: OrganizerInput,
    #[serde(rename = "torneoInfo")]
    pub tournament: TournamentInput,
    #[serde(default)]
    pub banners: Vec<BannerInput>,
    #[serde(default, rename = "deportes")]
    pub sports: Vec<SportInput>,
    #[serde(default)]
    pub sponsors: Vec<SponsorInput>,
    #[serde(default)]
    pub admin: Option<AdminSeed>,
    #[serde(default)]
    pub config: Option<ConfigInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl AdminSeed {
    pub const DEFAULT_EMAIL: &'static str = "admin@corrientesdiversa.org";
    pub const DEFAULT_PASSWORD: &'static str = "cambiar_esto";
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            email: Self::DEFAULT_EMAIL.to_string(),
            password: Self::DEFAULT_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub counts: EntityCounts,
    pub admin_email: String,
}

impl SeedDocument {
    /// Runs every required-field check without touching the database.
    fn validate(&self) -> Result<(), CmsError> {
        let placeholder = Some(Uuid::new_v4());
        self.organizer.clone().into_fields()?;
        self.tournament.clone().into_fields(placeholder)?;
        for banner in &self.banners {
            banner.clone().into_fields(placeholder)?;
        }
        for sport in &self.sports {
            sport.clone().into_fields(placeholder)?;
        }
        for sponsor in &self.sponsors {
            sponsor.clone().into_fields()?;
        }
        if let Some(config) = &self.config {
            config.clone().into_fields()?;
        }
        Ok(())
    }
}

impl<G> CmsService<G>
where
    G: StorageGateway,
{
    /// Replaces all content with the document: wipe, organizer, tournament,
    /// banners, sports, sponsors, admin user, config.
    #[instrument(skip(self, document))]
    pub async fn seed(&self, document: SeedDocument) -> Result<SeedSummary, CmsError> {
        document.validate()?;

        self.db.wipe_all().await?;

        let organizer = self
            .db
            .insert_organizer(&document.organizer.into_fields()?)
            .await?;
        info!(name = %organizer.name, "seeded organizer");

        let mut tournament_input = document.tournament;
        tournament_input.organizer_id = Some(organizer.id);
        let tournament = self
            .db
            .insert_tournament(&tournament_input.into_fields(None)?)
            .await?;
        info!(name = %tournament.name, "seeded tournament");

        for mut banner in document.banners {
            banner.tournament_id = Some(tournament.id);
            self.db.insert_banner(&banner.into_fields(None)?).await?;
        }

        for mut sport in document.sports {
            sport.tournament_id = Some(tournament.id);
            let sport = self.db.insert_sport(&sport.into_fields(None)?).await?;
            info!(name = %sport.name, "seeded sport");
        }

        for sponsor in document.sponsors {
            self.db.insert_sponsor(&sponsor.into_fields()?).await?;
        }

        let admin = document.admin.unwrap_or_else(|| {
            warn!(
                email = AdminSeed::DEFAULT_EMAIL,
                "seed document has no admin account; creating the default one"
            );
            AdminSeed::default()
        });
        let admin_email = self.create_user(&admin.email, &admin.password).await?.email;

        let config = match document.config {
            Some(config) => config.into_fields()?,
            None => NewSiteConfig {
                year: Utc::now().year(),
                description: tournament.description.clone(),
            },
        };
        self.db.insert_site_config(&config).await?;

        let counts = self.db.entity_counts().await?;
        info!(
            banners = counts.banners,
            sports = counts.sports,
            sponsors = counts.sponsors,
            "seed completed"
        );
        Ok(SeedSummary {
            counts,
            admin_email,
        })
    }
}
