use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use copa_cms::{PodiumInput, SportInput, TeamInput};
use uuid::Uuid;

use crate::dto::{PodiumResponse, SportFilter, SportPageResponse, SportResponse, TeamResponse};
use crate::server::{ApiError, ApiJson, AppState};

#[utoipa::path(
    get,
    path = "/api/admin/deportes",
    responses((status = 200, description = "Sports ordered by name", body = [SportResponse]))
)]
pub(crate) async fn list_sports(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SportResponse>>, ApiError> {
    let sports = state.cms.sports().await.map_err(ApiError::from)?;
    Ok(Json(sports.into_iter().map(SportResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/deportes",
    request_body = SportInput,
    responses(
        (status = 201, description = "Sport created", body = SportResponse),
        (status = 400, description = "Invalid payload or unknown tournament", body = ErrorBody)
    )
)]
pub(crate) async fn create_sport(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SportInput>,
) -> Result<(StatusCode, Json<SportResponse>), ApiError> {
    let sport = state
        .cms
        .create_sport(payload)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(SportResponse::from(sport))))
}

#[utoipa::path(
    get,
    path = "/api/admin/deportes/{id}",
    params(("id" = Uuid, Path, description = "Sport identifier")),
    responses(
        (status = 200, description = "Sport", body = SportResponse),
        (status = 404, description = "Sport not found", body = ErrorBody)
    )
)]
pub(crate) async fn get_sport(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SportResponse>, ApiError> {
    let sport = state.cms.sport(id).await.map_err(ApiError::from)?;
    Ok(Json(SportResponse::from(sport)))
}

#[utoipa::path(
    put,
    path = "/api/admin/deportes/{id}",
    params(("id" = Uuid, Path, description = "Sport identifier")),
    request_body = SportInput,
    responses(
        (status = 200, description = "Sport replaced", body = SportResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "Sport not found", body = ErrorBody)
    )
)]
pub(crate) async fn update_sport(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<SportInput>,
) -> Result<Json<SportResponse>, ApiError> {
    let sport = state
        .cms
        .update_sport(id, payload)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(SportResponse::from(sport)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/deportes/{id}",
    params(("id" = Uuid, Path, description = "Sport identifier")),
    responses(
        (status = 204, description = "Sport, its teams, podium and documents removed"),
        (status = 404, description = "Sport not found", body = ErrorBody)
    )
)]
pub(crate) async fn delete_sport(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.cms.delete_sport(id).await.map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/equipos",
    params(SportFilter),
    responses((status = 200, description = "Teams, newest first", body = [TeamResponse]))
)]
pub(crate) async fn list_teams(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SportFilter>,
) -> Result<Json<Vec<TeamResponse>>, ApiError> {
    let teams = state
        .cms
        .teams(filter.sport_id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(teams.into_iter().map(TeamResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/equipos",
    request_body = TeamInput,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Invalid payload or unknown sport", body = ErrorBody)
    )
)]
pub(crate) async fn create_team(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<TeamInput>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let team = state
        .cms
        .create_team(payload)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(TeamResponse::from(team))))
}

#[utoipa::path(
    get,
    path = "/api/admin/equipos/{id}",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Team", body = TeamResponse),
        (status = 404, description = "Team not found", body = ErrorBody)
    )
)]
pub(crate) async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state.cms.team(id).await.map_err(ApiError::from)?;
    Ok(Json(TeamResponse::from(team)))
}

#[utoipa::path(
    put,
    path = "/api/admin/equipos/{id}",
    params(("id" = Uuid, Path, description = "Team identifier")),
    request_body = TeamInput,
    responses(
        (status = 200, description = "Team replaced", body = TeamResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "Team not found", body = ErrorBody)
    )
)]
pub(crate) async fn update_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<TeamInput>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state
        .cms
        .update_team(id, payload)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(TeamResponse::from(team)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/equipos/{id}",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 204, description = "Team and its logo removed"),
        (status = 404, description = "Team not found", body = ErrorBody)
    )
)]
pub(crate) async fn delete_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.cms.delete_team(id).await.map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/podios",
    params(SportFilter),
    responses((status = 200, description = "Podium entries by sport and placement", body = [PodiumResponse]))
)]
pub(crate) async fn list_podium(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SportFilter>,
) -> Result<Json<Vec<PodiumResponse>>, ApiError> {
    let entries = state
        .cms
        .podium_entries(filter.sport_id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(entries.into_iter().map(PodiumResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/podios",
    request_body = PodiumInput,
    responses(
        (status = 201, description = "Podium entry created", body = PodiumResponse),
        (status = 400, description = "Invalid payload or placement already taken", body = ErrorBody)
    )
)]
pub(crate) async fn create_podium_entry(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<PodiumInput>,
) -> Result<(StatusCode, Json<PodiumResponse>), ApiError> {
    let entry = state
        .cms
        .create_podium_entry(payload)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(PodiumResponse::from(entry))))
}

#[utoipa::path(
    get,
    path = "/api/admin/podios/{id}",
    params(("id" = Uuid, Path, description = "Podium entry identifier")),
    responses(
        (status = 200, description = "Podium entry", body = PodiumResponse),
        (status = 404, description = "Podium entry not found", body = ErrorBody)
    )
)]
pub(crate) async fn get_podium_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PodiumResponse>, ApiError> {
    let entry = state.cms.podium_entry(id).await.map_err(ApiError::from)?;
    Ok(Json(PodiumResponse::from(entry)))
}

#[utoipa::path(
    put,
    path = "/api/admin/podios/{id}",
    params(("id" = Uuid, Path, description = "Podium entry identifier")),
    request_body = PodiumInput,
    responses(
        (status = 200, description = "Podium entry replaced", body = PodiumResponse),
        (status = 400, description = "Invalid payload or placement already taken", body = ErrorBody),
        (status = 404, description = "Podium entry not found", body = ErrorBody)
    )
)]
pub(crate) async fn update_podium_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<PodiumInput>,
) -> Result<Json<PodiumResponse>, ApiError> {
    let entry = state
        .cms
        .update_podium_entry(id, payload)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(PodiumResponse::from(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/podios/{id}",
    params(("id" = Uuid, Path, description = "Podium entry identifier")),
    responses(
        (status = 204, description = "Podium entry removed"),
        (status = 404, description = "Podium entry not found", body = ErrorBody)
    )
)]
pub(crate) async fn delete_podium_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .cms
        .delete_podium_entry(id)
        .await
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/deportes",
    responses((status = 200, description = "Sports page data", body = [SportResponse]))
)]
pub(crate) async fn sports_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SportResponse>>, ApiError> {
    let sports = state.cms.sports_overview().await.map_err(ApiError::from)?;
    Ok(Json(sports.into_iter().map(SportResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/deportes/{id}",
    params(("id" = Uuid, Path, description = "Sport identifier")),
    responses(
        (status = 200, description = "Sport with its tournament, teams and podium", body = SportPageResponse),
        (status = 404, description = "Sport not found", body = ErrorBody)
    )
)]
pub(crate) async fn sport_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SportPageResponse>, ApiError> {
    let page = state.cms.sport_page(id).await.map_err(ApiError::from)?;
    Ok(Json(SportPageResponse::from(page)))
}
