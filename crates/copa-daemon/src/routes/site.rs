use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use copa_cms::{ConfigInput, OrganizerInput, TournamentInput};
use tracing::error;

use crate::dto::{
    ConfigResponse, HealthResponse, HomeResponse, LoginBody, LoginResponse, OrganizerResponse,
    SiteResponse, StatsResponse, TournamentResponse, TournamentSummaryResponse,
};
use crate::server::{ApiError, ApiJson, AppState};

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 500, description = "Database unreachable", body = HealthResponse)
    )
)]
pub(crate) async fn health(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.cms.health().await {
        Ok(counts) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "success".into(),
                database: "connected".into(),
                tables: Some(StatsResponse::from(counts)),
            }),
        ),
        Err(err) => {
            error!(error = %err, "health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "error".into(),
                    database: "disconnected".into(),
                    tables: None,
                }),
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/organizador",
    responses(
        (status = 200, description = "The organizer", body = OrganizerResponse),
        (status = 404, description = "No organizer yet", body = ErrorBody)
    )
)]
pub(crate) async fn get_organizer(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OrganizerResponse>, ApiError> {
    let organizer = state.cms.organizer().await.map_err(ApiError::from)?;
    Ok(Json(OrganizerResponse::from(organizer)))
}

#[utoipa::path(
    post,
    path = "/api/admin/organizador",
    request_body = OrganizerInput,
    responses(
        (status = 201, description = "Organizer created", body = OrganizerResponse),
        (status = 400, description = "Invalid payload or organizer already exists", body = ErrorBody)
    )
)]
pub(crate) async fn create_organizer(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<OrganizerInput>,
) -> Result<(StatusCode, Json<OrganizerResponse>), ApiError> {
    let organizer = state
        .cms
        .create_organizer(payload)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(OrganizerResponse::from(organizer))))
}

#[utoipa::path(
    put,
    path = "/api/admin/organizador",
    request_body = OrganizerInput,
    responses(
        (status = 200, description = "Organizer replaced", body = OrganizerResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "No organizer yet", body = ErrorBody)
    )
)]
pub(crate) async fn update_organizer(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<OrganizerInput>,
) -> Result<Json<OrganizerResponse>, ApiError> {
    let organizer = state
        .cms
        .update_organizer(payload)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(OrganizerResponse::from(organizer)))
}

#[utoipa::path(
    get,
    path = "/api/admin/torneo",
    responses(
        (status = 200, description = "The tournament", body = TournamentResponse),
        (status = 404, description = "No tournament yet", body = ErrorBody)
    )
)]
pub(crate) async fn get_tournament(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TournamentResponse>, ApiError> {
    let tournament = state.cms.tournament().await.map_err(ApiError::from)?;
    Ok(Json(TournamentResponse::from(tournament)))
}

#[utoipa::path(
    post,
    path = "/api/admin/torneo",
    request_body = TournamentInput,
    responses(
        (status = 201, description = "Tournament created", body = TournamentResponse),
        (status = 400, description = "Invalid payload, missing organizer or tournament already exists", body = ErrorBody)
    )
)]
pub(crate) async fn create_tournament(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<TournamentInput>,
) -> Result<(StatusCode, Json<TournamentResponse>), ApiError> {
    let tournament = state
        .cms
        .create_tournament(payload)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(TournamentResponse::from(tournament))))
}

#[utoipa::path(
    put,
    path = "/api/admin/torneo",
    request_body = TournamentInput,
    responses(
        (status = 200, description = "Tournament replaced", body = TournamentResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "No tournament yet", body = ErrorBody)
    )
)]
pub(crate) async fn update_tournament(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<TournamentInput>,
) -> Result<Json<TournamentResponse>, ApiError> {
    let tournament = state
        .cms
        .update_tournament(payload)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(TournamentResponse::from(tournament)))
}

#[utoipa::path(
    get,
    path = "/api/admin/torneos",
    responses((status = 200, description = "Tournament ids and names", body = [TournamentSummaryResponse]))
)]
pub(crate) async fn list_tournaments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TournamentSummaryResponse>>, ApiError> {
    let summaries = state
        .cms
        .tournament_summaries()
        .await
        .map_err(ApiError::from)?;
    Ok(Json(
        summaries
            .into_iter()
            .map(TournamentSummaryResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/config",
    responses(
        (status = 200, description = "Site configuration", body = ConfigResponse),
        (status = 404, description = "Not configured yet", body = ErrorBody)
    )
)]
pub(crate) async fn get_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConfigResponse>, ApiError> {
    let config = state.cms.config().await.map_err(ApiError::from)?;
    Ok(Json(ConfigResponse::from(config)))
}

#[utoipa::path(
    post,
    path = "/api/admin/config",
    request_body = ConfigInput,
    responses(
        (status = 201, description = "Configuration created", body = ConfigResponse),
        (status = 400, description = "Invalid payload or already configured", body = ErrorBody)
    )
)]
pub(crate) async fn create_config(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ConfigInput>,
) -> Result<(StatusCode, Json<ConfigResponse>), ApiError> {
    let config = state
        .cms
        .create_config(payload)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(ConfigResponse::from(config))))
}

#[utoipa::path(
    put,
    path = "/api/admin/config",
    request_body = ConfigInput,
    responses(
        (status = 200, description = "Configuration replaced", body = ConfigResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "Not configured yet", body = ErrorBody)
    )
)]
pub(crate) async fn update_config(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ConfigInput>,
) -> Result<Json<ConfigResponse>, ApiError> {
    let config = state
        .cms
        .update_config(payload)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(ConfigResponse::from(config)))
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Email or password missing", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub(crate) async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .cms
        .login(&payload.email, &payload.password)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(LoginResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses((status = 200, description = "Row counts per table", body = StatsResponse))
)]
pub(crate) async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let counts = state.cms.stats().await.map_err(ApiError::from)?;
    Ok(Json(StatsResponse::from(counts)))
}

#[utoipa::path(
    get,
    path = "/api/site",
    responses((status = 200, description = "Organizer and configuration shown on every page", body = SiteResponse))
)]
pub(crate) async fn site_layout(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SiteResponse>, ApiError> {
    let layout = state.cms.site_layout().await.map_err(ApiError::from)?;
    Ok(Json(SiteResponse::from(layout)))
}

#[utoipa::path(
    get,
    path = "/api/home",
    responses((status = 200, description = "Home page data", body = HomeResponse))
)]
pub(crate) async fn home_page(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HomeResponse>, ApiError> {
    let page = state.cms.home_page().await.map_err(ApiError::from)?;
    Ok(Json(HomeResponse::from(page)))
}
