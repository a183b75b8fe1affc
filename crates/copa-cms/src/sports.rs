use copa_db::{PodiumEntry, Sport, StoreError, Team};
use copa_storage::StorageGateway;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::inputs::{PodiumInput, SportInput, TeamInput};
use crate::{CmsError, CmsService};

impl<G> CmsService<G>
where
    G: StorageGateway,
{
    #[instrument(skip(self, input))]
    pub async fn create_sport(&self, input: SportInput) -> Result<Sport, CmsError> {
        let fields = input.into_fields(None)?;
        Ok(self.db.insert_sport(&fields).await?)
    }

    pub async fn sport(&self, id: Uuid) -> Result<Sport, CmsError> {
        self.db
            .fetch_sport(id)
            .await?
            .ok_or_else(|| CmsError::not_found("sport", id))
    }

    pub async fn sports(&self) -> Result<Vec<Sport>, CmsError> {
        Ok(self.db.list_sports().await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_sport(&self, id: Uuid, input: SportInput) -> Result<Sport, CmsError> {
        let current = self.sport(id).await?;
        let fields = input.into_fields(Some(current.tournament_id))?;
        self.db
            .update_sport(id, &fields)
            .await?
            .ok_or_else(|| CmsError::not_found("sport", id))
    }

    /// Deletes the sport with its teams and podium, then their documents and logos.
    #[instrument(skip(self))]
    pub async fn delete_sport(&self, id: Uuid) -> Result<(), CmsError> {
        let sport = self.sport(id).await?;
        let teams = self.db.list_teams(Some(id)).await?;
        if !self.db.delete_sport(id).await? {
            return Err(CmsError::not_found("sport", id));
        }
        info!(sport_id = %id, teams = teams.len(), "sport deleted");

        let mut urls = sport.document_urls();
        urls.extend(teams.iter().map(|team| team.logo_url.as_str()));
        self.discard_files(&urls).await;
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn create_team(&self, input: TeamInput) -> Result<Team, CmsError> {
        let fields = input.into_fields()?;
        Ok(self.db.insert_team(&fields).await?)
    }

    pub async fn team(&self, id: Uuid) -> Result<Team, CmsError> {
        self.db
            .fetch_team(id)
            .await?
            .ok_or_else(|| CmsError::not_found("team", id))
    }

    pub async fn teams(&self, sport_id: Option<Uuid>) -> Result<Vec<Team>, CmsError> {
        Ok(self.db.list_teams(sport_id).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_team(&self, id: Uuid, input: TeamInput) -> Result<Team, CmsError> {
        let fields = input.into_fields()?;
        self.db
            .update_team(id, &fields)
            .await?
            .ok_or_else(|| CmsError::not_found("team", id))
    }

    /// Deletes the team, then its logo unless it is the shared placeholder.
    #[instrument(skip(self))]
    pub async fn delete_team(&self, id: Uuid) -> Result<(), CmsError> {
        let team = self.team(id).await?;
        if !self.db.delete_team(id).await? {
            return Err(CmsError::not_found("team", id));
        }
        info!(team_id = %id, "team deleted");
        self.discard_files(&[team.logo_url.as_str()]).await;
        Ok(())
    }

    /// Records a podium place. Each place is held by one entry per sport.
    #[instrument(skip(self, input))]
    pub async fn create_podium_entry(&self, input: PodiumInput) -> Result<PodiumEntry, CmsError> {
        let fields = input.into_fields()?;
        self.db
            .insert_podium_entry(&fields)
            .await
            .map_err(|err| placement_taken(err, fields.placement))
    }

    pub async fn podium_entry(&self, id: Uuid) -> Result<PodiumEntry, CmsError> {
        self.db
            .fetch_podium_entry(id)
            .await?
            .ok_or_else(|| CmsError::not_found("podium entry", id))
    }

    pub async fn podium_entries(&self, sport_id: Option<Uuid>) -> Result<Vec<PodiumEntry>, CmsError> {
        Ok(self.db.list_podium_entries(sport_id).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_podium_entry(
        &self,
        id: Uuid,
        input: PodiumInput,
    ) -> Result<PodiumEntry, CmsError> {
        let fields = input.into_fields()?;
        self.db
            .update_podium_entry(id, &fields)
            .await
            .map_err(|err| placement_taken(err, fields.placement))?
            .ok_or_else(|| CmsError::not_found("podium entry", id))
    }

    #[instrument(skip(self))]
    pub async fn delete_podium_entry(&self, id: Uuid) -> Result<(), CmsError> {
        if !self.db.delete_podium_entry(id).await? {
            return Err(CmsError::not_found("podium entry", id));
        }
        info!(podium_id = %id, "podium entry deleted");
        Ok(())
    }
}

fn placement_taken(err: anyhow::Error, placement: u32) -> CmsError {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::Duplicate(_)) => {
            CmsError::Conflict(format!("placement {placement} is already taken for this sport"))
        }
        _ => CmsError::from(err),
    }
}
