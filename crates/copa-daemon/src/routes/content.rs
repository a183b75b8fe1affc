use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use copa_cms::{BannerInput, SponsorInput};
use uuid::Uuid;

use crate::dto::{BannerResponse, SponsorResponse};
use crate::server::{ApiError, ApiJson, AppState};

#[utoipa::path(
    get,
    path = "/api/admin/banners",
    responses((status = 200, description = "Banners, newest first", body = [BannerResponse]))
)]
pub(crate) async fn list_banners(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BannerResponse>>, ApiError> {
    let banners = state.cms.banners().await.map_err(ApiError::from)?;
    Ok(Json(banners.into_iter().map(BannerResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/banners",
    request_body = BannerInput,
    responses(
        (status = 201, description = "Banner created", body = BannerResponse),
        (status = 400, description = "Invalid payload or unknown tournament", body = ErrorBody)
    )
)]
pub(crate) async fn create_banner(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<BannerInput>,
) -> Result<(StatusCode, Json<BannerResponse>), ApiError> {
    let banner = state
        .cms
        .create_banner(payload)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(BannerResponse::from(banner))))
}

#[utoipa::path(
    get,
    path = "/api/admin/banners/{id}",
    params(("id" = Uuid, Path, description = "Banner identifier")),
    responses(
        (status = 200, description = "Banner", body = BannerResponse),
        (status = 404, description = "Banner not found", body = ErrorBody)
    )
)]
pub(crate) async fn get_banner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BannerResponse>, ApiError> {
    let banner = state.cms.banner(id).await.map_err(ApiError::from)?;
    Ok(Json(BannerResponse::from(banner)))
}

#[utoipa::path(
    put,
    path = "/api/admin/banners/{id}",
    params(("id" = Uuid, Path, description = "Banner identifier")),
    request_body = BannerInput,
    responses(
        (status = 200, description = "Banner replaced", body = BannerResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "Banner not found", body = ErrorBody)
    )
)]
pub(crate) async fn update_banner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<BannerInput>,
) -> Result<Json<BannerResponse>, ApiError> {
    let banner = state
        .cms
        .update_banner(id, payload)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(BannerResponse::from(banner)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/banners/{id}",
    params(("id" = Uuid, Path, description = "Banner identifier")),
    responses(
        (status = 204, description = "Banner and its images removed"),
        (status = 404, description = "Banner not found", body = ErrorBody)
    )
)]
pub(crate) async fn delete_banner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.cms.delete_banner(id).await.map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/sponsors",
    responses((status = 200, description = "Sponsors, newest first", body = [SponsorResponse]))
)]
pub(crate) async fn list_sponsors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SponsorResponse>>, ApiError> {
    let sponsors = state.cms.sponsors().await.map_err(ApiError::from)?;
    Ok(Json(sponsors.into_iter().map(SponsorResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/sponsors",
    responses((status = 200, description = "Sponsors page data", body = [SponsorResponse]))
)]
pub(crate) async fn public_sponsors(
    state: State<Arc<AppState>>,
) -> Result<Json<Vec<SponsorResponse>>, ApiError> {
    list_sponsors(state).await
}

#[utoipa::path(
    post,
    path = "/api/admin/sponsors",
    request_body = SponsorInput,
    responses(
        (status = 201, description = "Sponsor created", body = SponsorResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody)
    )
)]
pub(crate) async fn create_sponsor(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SponsorInput>,
) -> Result<(StatusCode, Json<SponsorResponse>), ApiError> {
    let sponsor = state
        .cms
        .create_sponsor(payload)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(SponsorResponse::from(sponsor))))
}

#[utoipa::path(
    get,
    path = "/api/admin/sponsors/{id}",
    params(("id" = Uuid, Path, description = "Sponsor identifier")),
    responses(
        (status = 200, description = "Sponsor", body = SponsorResponse),
        (status = 404, description = "Sponsor not found", body = ErrorBody)
    )
)]
pub(crate) async fn get_sponsor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SponsorResponse>, ApiError> {
    let sponsor = state.cms.sponsor(id).await.map_err(ApiError::from)?;
    Ok(Json(SponsorResponse::from(sponsor)))
}

#[utoipa::path(
    put,
    path = "/api/admin/sponsors/{id}",
    params(("id" = Uuid, Path, description = "Sponsor identifier")),
    request_body = SponsorInput,
    responses(
        (status = 200, description = "Sponsor replaced", body = SponsorResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "Sponsor not found", body = ErrorBody)
    )
)]
pub(crate) async fn update_sponsor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<SponsorInput>,
) -> Result<Json<SponsorResponse>, ApiError> {
    let sponsor = state
        .cms
        .update_sponsor(id, payload)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(SponsorResponse::from(sponsor)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/sponsors/{id}",
    params(("id" = Uuid, Path, description = "Sponsor identifier")),
    responses(
        (status = 204, description = "Sponsor and its image removed"),
        (status = 404, description = "Sponsor not found", body = ErrorBody)
    )
)]
pub(crate) async fn delete_sponsor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.cms.delete_sponsor(id).await.map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
