//! Aggregates read by the public pages.

use copa_db::{Banner, Organizer, PodiumEntry, SiteConfig, Sport, Team, Tournament};
use copa_storage::StorageGateway;
use tracing::instrument;
use uuid::Uuid;

use crate::{CmsError, CmsService};

/// Data shared by every page: footer contact data and the edition.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteLayout {
    pub organizer: Option<Organizer>,
    pub config: Option<SiteConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomePage {
    pub tournament: Option<Tournament>,
    pub banners: Vec<Banner>,
    pub organizer: Option<Organizer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SportPage {
    pub sport: Sport,
    pub tournament: Option<Tournament>,
    /// Ordered by name.
    pub teams: Vec<Team>,
    /// Ordered by placement.
    pub podium: Vec<PodiumEntry>,
}

impl<G> CmsService<G>
where
    G: StorageGateway,
{
    #[instrument(skip(self))]
    pub async fn site_layout(&self) -> Result<SiteLayout, CmsError> {
        Ok(SiteLayout {
            organizer: self.db.fetch_organizer().await?,
            config: self.db.fetch_site_config().await?,
        })
    }

    #[instrument(skip(self))]
    pub async fn home_page(&self) -> Result<HomePage, CmsError> {
        Ok(HomePage {
            tournament: self.db.fetch_tournament().await?,
            banners: self.db.list_banners().await?,
            organizer: self.db.fetch_organizer().await?,
        })
    }

    #[instrument(skip(self))]
    pub async fn sports_overview(&self) -> Result<Vec<Sport>, CmsError> {
        Ok(self.db.list_sports().await?)
    }

    #[instrument(skip(self))]
    pub async fn sport_page(&self, id: Uuid) -> Result<SportPage, CmsError> {
        let sport = self
            .db
            .fetch_sport(id)
            .await?
            .ok_or_else(|| CmsError::not_found("sport", id))?;
        let tournament = self.db.fetch_tournament_by_id(sport.tournament_id).await?;

        let mut teams = self.db.list_teams(Some(id)).await?;
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        let podium = self.db.list_podium_entries(Some(id)).await?;

        Ok(SportPage {
            sport,
            tournament,
            teams,
            podium,
        })
    }
}
