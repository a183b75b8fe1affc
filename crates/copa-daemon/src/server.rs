use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use copa_cms::{CmsError, CmsService};
use copa_db::Database;
use copa_storage::{LocalFsGateway, RemoteBlobGateway, StorageBackend, DEFAULT_BLOB_API_URL};
use serde::Serialize;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::routes::{content, files, site, sports};

pub async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    let cms = config.open_service().await?;

    let static_root = match cms.storage() {
        StorageBackend::Local(local) if config.serve_static => Some(local.root().to_path_buf()),
        _ => None,
    };
    let state = Arc::new(AppState {
        cms,
        max_body_bytes: config.max_body_bytes,
        static_root,
    });

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .context("failed to bind listen socket")?;

    info!(addr = %config.listen_addr, "copa-daemon listening");
    axum::serve(listener, app)
        .await
        .context("HTTP server exited")?;
    Ok(())
}

pub(crate) fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/api/health", get(site::health))
        .route(
            "/api/admin/organizador",
            get(site::get_organizer)
                .post(site::create_organizer)
                .put(site::update_organizer),
        )
        .route(
            "/api/admin/torneo",
            get(site::get_tournament)
                .post(site::create_tournament)
                .put(site::update_tournament),
        )
        .route("/api/admin/torneos", get(site::list_tournaments))
        .route(
            "/api/admin/config",
            get(site::get_config)
                .post(site::create_config)
                .put(site::update_config),
        )
        .route("/api/admin/login", post(site::login))
        .route("/api/admin/stats", get(site::stats))
        .route(
            "/api/admin/banners",
            get(content::list_banners).post(content::create_banner),
        )
        .route(
            "/api/admin/banners/:id",
            get(content::get_banner)
                .put(content::update_banner)
                .delete(content::delete_banner),
        )
        .route(
            "/api/admin/sponsors",
            get(content::list_sponsors).post(content::create_sponsor),
        )
        .route(
            "/api/admin/sponsors/:id",
            get(content::get_sponsor)
                .put(content::update_sponsor)
                .delete(content::delete_sponsor),
        )
        .route(
            "/api/admin/deportes",
            get(sports::list_sports).post(sports::create_sport),
        )
        .route(
            "/api/admin/deportes/:id",
            get(sports::get_sport)
                .put(sports::update_sport)
                .delete(sports::delete_sport),
        )
        .route(
            "/api/admin/equipos",
            get(sports::list_teams).post(sports::create_team),
        )
        .route(
            "/api/admin/equipos/:id",
            get(sports::get_team)
                .put(sports::update_team)
                .delete(sports::delete_team),
        )
        .route(
            "/api/admin/podios",
            get(sports::list_podium).post(sports::create_podium_entry),
        )
        .route(
            "/api/admin/podios/:id",
            get(sports::get_podium_entry)
                .put(sports::update_podium_entry)
                .delete(sports::delete_podium_entry),
        )
        .route("/api/admin/upload-banner", post(files::upload_banner))
        .route("/api/admin/upload-equipo", post(files::upload_team_logo))
        .route("/api/admin/upload-sponsor", post(files::upload_sponsor))
        .route("/api/admin/upload", post(files::upload_document))
        .route("/api/admin/files", get(files::list_files))
        .route("/api/admin/banner-images", get(files::banner_images))
        .route("/api/admin/delete-file", delete(files::delete_file))
        .route("/api/site", get(site::site_layout))
        .route("/api/home", get(site::home_page))
        .route("/api/deportes", get(sports::sports_overview))
        .route("/api/deportes/:id", get(sports::sport_page))
        .route("/api/sponsors", get(content::public_sponsors))
        .layer(DefaultBodyLimit::max(state.max_body_bytes));

    let router = match &state.static_root {
        Some(root) => router.fallback_service(ServeDir::new(root)),
        None => router,
    };
    router.with_state(state)
}

pub(crate) struct AppState {
    pub(crate) cms: CmsService<StorageBackend>,
    pub(crate) max_body_bytes: usize,
    pub(crate) static_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    Local,
    Blob,
}

/// Process configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    listen_addr: SocketAddr,
    db_url: String,
    backend: BackendKind,
    static_dir: PathBuf,
    static_base_url: String,
    blob_api_url: String,
    serve_static: bool,
    max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("COPA_API_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .context("invalid COPA_API_ADDR")?;

        let db_url = env::var("COPA_DB_DSN")
            .or_else(|_| env::var("DATABASE_URL"))
            .context("COPA_DB_DSN or DATABASE_URL must be configured")?;

        let backend = match env::var("COPA_STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "local" => BackendKind::Local,
            "blob" | "vercel" => BackendKind::Blob,
            other => bail!("COPA_STORAGE_BACKEND must be 'local' or 'blob', got '{other}'"),
        };

        let static_dir = env::var("COPA_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./static"));
        let static_base_url = env::var("COPA_STATIC_BASE_URL").unwrap_or_else(|_| "/".into());
        let blob_api_url =
            env::var("COPA_BLOB_API_URL").unwrap_or_else(|_| DEFAULT_BLOB_API_URL.into());
        let serve_static = bool_env("COPA_SERVE_STATIC").unwrap_or(true);

        let max_body_mib = env::var("COPA_MAX_BODY_MIB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(12);

        Ok(Self {
            listen_addr,
            db_url,
            backend,
            static_dir,
            static_base_url,
            blob_api_url,
            serve_static,
            max_body_bytes: mi_bytes(max_body_mib),
        })
    }

    /// Opens the database and the configured storage backend.
    pub async fn open_service(&self) -> Result<CmsService<StorageBackend>> {
        let db = Database::connect(&self.db_url)
            .await
            .context("failed to open database")?;

        let storage = match self.backend {
            BackendKind::Local => {
                tokio::fs::create_dir_all(&self.static_dir)
                    .await
                    .with_context(|| {
                        format!("failed to create {}", self.static_dir.display())
                    })?;
                StorageBackend::Local(LocalFsGateway::new(
                    self.static_dir.clone(),
                    &self.static_base_url,
                ))
            }
            BackendKind::Blob => {
                let gateway = RemoteBlobGateway::from_env(&self.blob_api_url);
                if !gateway.has_token() {
                    warn!("BLOB_READ_WRITE_TOKEN is not set; uploads and deletes will fail");
                }
                StorageBackend::Remote(gateway)
            }
        };
        info!(backend = storage.kind(), "storage backend selected");

        Ok(CmsService::new(db, Arc::new(storage)))
    }
}

#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<CmsError> for ApiError {
    fn from(err: CmsError) -> Self {
        match err {
            CmsError::Validation(_) | CmsError::Conflict(_) => {
                ApiError::bad_request(err.to_string())
            }
            CmsError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            CmsError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, "invalid credentials")
            }
            CmsError::Upload(inner) => {
                error!(error = %inner, "storage upload failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "failed to store file")
            }
            CmsError::Delete(inner) => {
                error!(error = %inner, "storage delete failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "failed to delete file")
            }
            CmsError::Unknown(inner) => {
                error!(error = ?inner, "unexpected failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::BytesRejection(_) => {
                ApiError::new(rejection.status(), rejection.body_text())
            }
            _ => ApiError::bad_request(rejection.body_text()),
        }
    }
}

/// JSON body extractor whose rejections answer with an `ErrorBody`.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub(crate) struct ApiJson<T>(pub(crate) T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(status = %self.status, message = %self.message, "api error");
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    error: String,
}

fn mi_bytes(value: usize) -> usize {
    value * 1024 * 1024
}

pub mod docs {
    use utoipa::OpenApi;

    use crate::dto::*;
    use crate::routes::{content, files, site, sports};
    use crate::server::ErrorBody;
    use copa_cms::{
        BannerInput, ConfigInput, OrganizerInput, PodiumInput, SponsorInput, SportInput,
        TeamInput, TournamentInput,
    };

    #[derive(OpenApi)]
    #[openapi(
        info(title = "Copa Microsite API", version = "0.1.0"),
        paths(
            site::health,
            site::get_organizer,
            site::create_organizer,
            site::update_organizer,
            site::get_tournament,
            site::create_tournament,
            site::update_tournament,
            site::list_tournaments,
            site::get_config,
            site::create_config,
            site::update_config,
            site::login,
            site::stats,
            site::site_layout,
            site::home_page,
            content::list_banners,
            content::create_banner,
            content::get_banner,
            content::update_banner,
            content::delete_banner,
            content::list_sponsors,
            content::create_sponsor,
            content::get_sponsor,
            content::update_sponsor,
            content::delete_sponsor,
            content::public_sponsors,
            sports::list_sports,
            sports::create_sport,
            sports::get_sport,
            sports::update_sport,
            sports::delete_sport,
            sports::list_teams,
            sports::create_team,
            sports::get_team,
            sports::update_team,
            sports::delete_team,
            sports::list_podium,
            sports::create_podium_entry,
            sports::get_podium_entry,
            sports::update_podium_entry,
            sports::delete_podium_entry,
            sports::sports_overview,
            sports::sport_page,
            files::upload_banner,
            files::upload_team_logo,
            files::upload_sponsor,
            files::upload_document,
            files::list_files,
            files::banner_images,
            files::delete_file
        ),
        components(schemas(
            OrganizerInput,
            TournamentInput,
            BannerInput,
            SportInput,
            TeamInput,
            PodiumInput,
            SponsorInput,
            ConfigInput,
            OrganizerResponse,
            TournamentResponse,
            TournamentSummaryResponse,
            BannerResponse,
            SportResponse,
            TeamResponse,
            PodiumResponse,
            SponsorResponse,
            ConfigResponse,
            StatsResponse,
            HealthResponse,
            LoginBody,
            LoginResponse,
            UploadResponse,
            StoredFileResponse,
            DeleteFileBody,
            SiteResponse,
            HomeResponse,
            SportPageResponse,
            ErrorBody
        ))
    )]
    pub struct ApiDoc;
}

fn bool_env(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .and_then(|value| match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
mod tests;
