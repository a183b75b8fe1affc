//! Content management service behind the Copa microsite.
//!
//! [`CmsService`] owns the database handle and the active storage backend.
//! Every admin operation validates its input, enforces the uniqueness rules
//! (one organizer, one tournament, one config, one team per podium place),
//! and translates store and storage failures into [`CmsError`]. Deleting a
//! record also removes the files it references, best-effort.

mod content;
mod files;
mod inputs;
mod pages;
mod password;
mod seed;
mod site;
mod sports;

use std::sync::Arc;

use copa_db::{Database, StoreError};
use copa_storage::{PolicyViolation, StorageError, StorageGateway};
use thiserror::Error;
use tracing::warn;

pub use files::UploadedFile;
pub use inputs::{
    BannerInput, ConfigInput, OrganizerInput, PodiumInput, SponsorInput, SportInput, TeamInput,
    TournamentInput,
};
pub use pages::{HomePage, SiteLayout, SportPage};
pub use password::{hash_password, verify_password};
pub use seed::{AdminSeed, SeedDocument, SeedSummary};

/// High-level API used by the HTTP layer and the seed binary.
pub struct CmsService<G>
where
    G: StorageGateway,
{
    db: Database,
    storage: Arc<G>,
}

impl<G> Clone for CmsService<G>
where
    G: StorageGateway,
{
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<G> CmsService<G>
where
    G: StorageGateway,
{
    pub fn new(db: Database, storage: Arc<G>) -> Self {
        Self { db, storage }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn storage(&self) -> &G {
        &self.storage
    }

    /// Deletes files referenced by a removed record. Failures are logged only.
    async fn discard_files(&self, urls: &[&str]) {
        for &url in urls {
            if url.is_empty() || copa_storage::is_protected(url) {
                continue;
            }
            if let Err(err) = self.storage.delete(url).await {
                warn!(url, error = %err, "failed to remove file of deleted record");
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("invalid request: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{0}")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("upload failed: {0}")]
    Upload(StorageError),
    #[error("delete failed: {0}")]
    Delete(StorageError),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Unknown(anyhow::Error),
}

impl CmsError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CmsError::Validation(vec![message.into()])
    }

    fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        CmsError::NotFound(format!("{entity} {id}"))
    }
}

impl From<anyhow::Error> for CmsError {
    fn from(value: anyhow::Error) -> Self {
        match value.downcast::<StoreError>() {
            Ok(StoreError::Duplicate(entity)) => {
                CmsError::Conflict(format!("{entity} already exists"))
            }
            Ok(StoreError::MissingReference(entity)) => {
                CmsError::invalid(format!("referenced {entity} does not exist"))
            }
            Err(other) => CmsError::Unknown(other),
        }
    }
}

impl From<PolicyViolation> for CmsError {
    fn from(value: PolicyViolation) -> Self {
        CmsError::invalid(value.to_string())
    }
}

/// Collects missing or invalid fields before anything is written.
#[derive(Debug, Default)]
struct FieldCheck {
    problems: Vec<String>,
}

impl FieldCheck {
    fn text(&mut self, field: &str, value: Option<String>) -> String {
        match value {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                self.problems.push(format!("{field} is required"));
                String::new()
            }
        }
    }

    fn required<T: Default>(&mut self, field: &str, value: Option<T>) -> T {
        match value {
            Some(value) => value,
            None => {
                self.problems.push(format!("{field} is required"));
                T::default()
            }
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.problems.push(message.into());
    }

    fn finish(self) -> Result<(), CmsError> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(CmsError::Validation(self.problems))
        }
    }
}
