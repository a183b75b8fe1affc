use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use copa_cms::CmsError;
use copa_storage::{Blob, UploadTarget};
use uuid::Uuid;

use crate::dto::{DeleteFileBody, FilesQuery, StoredFileResponse, UploadResponse};
use crate::server::{ApiError, ApiJson, AppState};

/// Fields of the upload forms. Unknown parts are ignored.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Blob>,
    kind: Option<String>,
    sport_id: Option<Uuid>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field.bytes().await.map_err(multipart_error)?;
                    form.file = Some(Blob::new(file_name, content_type, data.to_vec()));
                }
                "type" => {
                    let kind = field.text().await.map_err(multipart_error)?;
                    form.kind = Some(kind.trim().to_string()).filter(|kind| !kind.is_empty());
                }
                "deporteId" => {
                    let raw = field.text().await.map_err(multipart_error)?;
                    let raw = raw.trim();
                    if !raw.is_empty() {
                        let id = Uuid::parse_str(raw)
                            .map_err(|_| ApiError::bad_request("deporteId must be a UUID"))?;
                        form.sport_id = Some(id);
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    fn require_file(&mut self) -> Result<Blob, ApiError> {
        self.file
            .take()
            .ok_or_else(|| ApiError::bad_request("file is required"))
    }
}

/// Keeps the 413 axum reports when the body limit is hit.
fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::new(err.status(), err.body_text())
}

async fn store(
    state: &AppState,
    target: UploadTarget,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let blob = form.require_file()?;
    let uploaded = state
        .cms
        .upload(target, &blob, form.sport_id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(UploadResponse::from(uploaded)))
}

#[utoipa::path(
    post,
    path = "/api/admin/upload-banner",
    request_body(content = String, description = "Multipart form with a `file` part", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Missing file, wrong type or too large", body = ErrorBody),
        (status = 413, description = "Request body over the size limit", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub(crate) async fn upload_banner(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    store(&state, UploadTarget::BannerImage, multipart).await
}

#[utoipa::path(
    post,
    path = "/api/admin/upload-equipo",
    request_body(content = String, description = "Multipart form with a `file` part", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Logo stored", body = UploadResponse),
        (status = 400, description = "Missing file, wrong type or too large", body = ErrorBody),
        (status = 413, description = "Request body over the size limit", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub(crate) async fn upload_team_logo(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    store(&state, UploadTarget::TeamLogo, multipart).await
}

#[utoipa::path(
    post,
    path = "/api/admin/upload-sponsor",
    request_body(content = String, description = "Multipart form with a `file` part", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Missing file, wrong type or too large", body = ErrorBody),
        (status = 413, description = "Request body over the size limit", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub(crate) async fn upload_sponsor(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    store(&state, UploadTarget::SponsorImage, multipart).await
}

#[utoipa::path(
    post,
    path = "/api/admin/upload",
    request_body(
        content = String,
        description = "Multipart form with `file`, `type` (fondo-sitio, planilla, reglamento, fixture) and `deporteId` for sport documents",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing field, unknown type, wrong extension or too large", body = ErrorBody),
        (status = 404, description = "Sport not found", body = ErrorBody),
        (status = 413, description = "Request body over the size limit", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub(crate) async fn upload_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let blob = form.require_file()?;
    let kind = form
        .kind
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("type is required"))?;
    let target =
        UploadTarget::from_kind(kind).map_err(|err| ApiError::from(CmsError::from(err)))?;

    let uploaded = state
        .cms
        .upload(target, &blob, form.sport_id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(UploadResponse::from(uploaded)))
}

#[utoipa::path(
    get,
    path = "/api/admin/files",
    params(FilesQuery),
    responses(
        (status = 200, description = "Stored objects under the prefix", body = [StoredFileResponse]),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub(crate) async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilesQuery>,
) -> Result<Json<Vec<StoredFileResponse>>, ApiError> {
    let prefix = query.prefix.unwrap_or_default();
    let objects = state
        .cms
        .list_files(&prefix)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(
        objects.into_iter().map(StoredFileResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/banner-images",
    responses(
        (status = 200, description = "Stored banner images", body = [StoredFileResponse]),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub(crate) async fn banner_images(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoredFileResponse>>, ApiError> {
    let target = UploadTarget::BannerImage;
    let prefix = format!("{}/", target.directory());
    let objects = state
        .cms
        .available_images(&prefix, target)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(
        objects.into_iter().map(StoredFileResponse::from).collect(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/delete-file",
    request_body = DeleteFileBody,
    responses(
        (status = 204, description = "File removed"),
        (status = 400, description = "Missing URL or protected file", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub(crate) async fn delete_file(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<DeleteFileBody>,
) -> Result<StatusCode, ApiError> {
    let url = body.target()?;
    state
        .cms
        .delete_file(&url)
        .await
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
