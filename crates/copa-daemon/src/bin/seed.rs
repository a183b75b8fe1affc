//! Replaces the database content with a JSON seed document.
//!
//! Usage: `seed [path]` (default `./static/data.json`). The admin account of
//! the document can be overridden with `COPA_SEED_ADMIN_EMAIL` and
//! `COPA_SEED_ADMIN_PASSWORD`.

use std::env;

use anyhow::{Context, Result};
use copa_cms::{AdminSeed, SeedDocument};
use copa_daemon::{server::AppConfig, telemetry};
use tracing::info;

const DEFAULT_SEED_PATH: &str = "./static/data.json";

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = telemetry::init("copa-seed")?;

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SEED_PATH.to_string());
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {path}"))?;
    let mut document: SeedDocument =
        serde_json::from_str(&raw).with_context(|| format!("invalid seed document {path}"))?;

    if let (Ok(email), Ok(password)) = (
        env::var("COPA_SEED_ADMIN_EMAIL"),
        env::var("COPA_SEED_ADMIN_PASSWORD"),
    ) {
        document.admin = Some(AdminSeed { email, password });
    }

    let cms = AppConfig::from_env()?.open_service().await?;
    let summary = cms.seed(document).await.context("seeding failed")?;

    info!(
        path = %path,
        organizers = summary.counts.organizers,
        tournaments = summary.counts.tournaments,
        banners = summary.counts.banners,
        sports = summary.counts.sports,
        sponsors = summary.counts.sponsors,
        admin = %summary.admin_email,
        "database seeded"
    );
    Ok(())
}
