use copa_db::{EntityCounts, Organizer, SiteConfig, Tournament, TournamentSummary, UserRecord};
use copa_storage::StorageGateway;
use tracing::{info, instrument, warn};

use crate::inputs::{ConfigInput, OrganizerInput, TournamentInput};
use crate::password::{hash_password, verify_password};
use crate::{CmsError, CmsService};

impl<G> CmsService<G>
where
    G: StorageGateway,
{
    /// Creates the organizer. Only one may exist.
    #[instrument(skip(self, input))]
    pub async fn create_organizer(&self, input: OrganizerInput) -> Result<Organizer, CmsError> {
        let fields = input.into_fields()?;
        if self.db.fetch_organizer().await?.is_some() {
            return Err(CmsError::Conflict("an organizer already exists".into()));
        }
        let organizer = self.db.insert_organizer(&fields).await?;
        info!(organizer_id = %organizer.id, "organizer registered");
        Ok(organizer)
    }

    pub async fn organizer(&self) -> Result<Organizer, CmsError> {
        self.db
            .fetch_organizer()
            .await?
            .ok_or_else(|| CmsError::NotFound("organizer".into()))
    }

    #[instrument(skip(self, input))]
    pub async fn update_organizer(&self, input: OrganizerInput) -> Result<Organizer, CmsError> {
        let fields = input.into_fields()?;
        let current = self.organizer().await?;
        self.db
            .update_organizer(current.id, &fields)
            .await?
            .ok_or_else(|| CmsError::not_found("organizer", current.id))
    }

    /// Creates the tournament, attached to the existing organizer unless told otherwise.
    #[instrument(skip(self, input))]
    pub async fn create_tournament(&self, input: TournamentInput) -> Result<Tournament, CmsError> {
        let organizer = self.db.fetch_organizer().await?.map(|organizer| organizer.id);
        let fields = input.into_fields(organizer)?;
        if self.db.fetch_tournament().await?.is_some() {
            return Err(CmsError::Conflict("a tournament already exists".into()));
        }
        let tournament = self.db.insert_tournament(&fields).await?;
        info!(tournament_id = %tournament.id, "tournament registered");
        Ok(tournament)
    }

    pub async fn tournament(&self) -> Result<Tournament, CmsError> {
        self.db
            .fetch_tournament()
            .await?
            .ok_or_else(|| CmsError::NotFound("tournament".into()))
    }

    pub async fn tournament_summaries(&self) -> Result<Vec<TournamentSummary>, CmsError> {
        Ok(self.db.list_tournament_summaries().await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_tournament(&self, input: TournamentInput) -> Result<Tournament, CmsError> {
        let current = self.tournament().await?;
        let fields = input.into_fields(Some(current.organizer_id))?;
        self.db
            .update_tournament(current.id, &fields)
            .await?
            .ok_or_else(|| CmsError::not_found("tournament", current.id))
    }

    #[instrument(skip(self, input))]
    pub async fn create_config(&self, input: ConfigInput) -> Result<SiteConfig, CmsError> {
        let fields = input.into_fields()?;
        if self.db.fetch_site_config().await?.is_some() {
            return Err(CmsError::Conflict("a site configuration already exists".into()));
        }
        Ok(self.db.insert_site_config(&fields).await?)
    }

    pub async fn config(&self) -> Result<SiteConfig, CmsError> {
        self.db
            .fetch_site_config()
            .await?
            .ok_or_else(|| CmsError::NotFound("site configuration".into()))
    }

    #[instrument(skip(self, input))]
    pub async fn update_config(&self, input: ConfigInput) -> Result<SiteConfig, CmsError> {
        let fields = input.into_fields()?;
        let current = self.config().await?;
        self.db
            .update_site_config(current.id, &fields)
            .await?
            .ok_or_else(|| CmsError::not_found("site configuration", current.id))
    }

    /// Stores an admin account with a salted hash of `password`.
    #[instrument(skip(self, password))]
    pub async fn create_user(&self, email: &str, password: &str) -> Result<UserRecord, CmsError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(CmsError::invalid("email and password are required"));
        }
        let hash = hash_password(password).map_err(|err| {
            CmsError::Unknown(anyhow::anyhow!("password hashing failed: {err}"))
        })?;
        let user = self.db.insert_user(email, &hash).await?;
        info!(user_id = %user.id, "admin account created");
        Ok(user)
    }

    /// Checks credentials. Unknown email and wrong password are indistinguishable.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord, CmsError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(CmsError::invalid("email and password are required"));
        }
        let Some(user) = self.db.find_user_by_email(email.trim()).await? else {
            warn!("login attempt for unknown account");
            return Err(CmsError::InvalidCredentials);
        };
        if !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "login attempt with wrong password");
            return Err(CmsError::InvalidCredentials);
        }
        info!(user_id = %user.id, "admin logged in");
        Ok(user)
    }

    pub async fn stats(&self) -> Result<EntityCounts, CmsError> {
        Ok(self.db.entity_counts().await?)
    }

    /// Verifies the database answers, then reports table counts.
    pub async fn health(&self) -> Result<EntityCounts, CmsError> {
        self.db.ping().await?;
        self.stats().await
    }
}
