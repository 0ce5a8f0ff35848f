use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{header, HeaderMap, Response, StatusCode},
    response::IntoResponse,
    Json,
};
use blob_store::BlobContent;

use super::{payload, RouteState};
use crate::http_objects::{
    BlobApiError, BlobMetadata, CreateBlobResponse, DeleteBlobResponse, RetrieveBlobParams,
    UpdateBlobResponse,
};

/// List all image blobs (metadata only)
#[utoipa::path(
    get,
    path = "/api/blobs",
    tag = "blobs",
    responses(
        (status = 200, description = "List all image blobs", body = Vec<BlobMetadata>),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to list image blobs")
    ),
)]
pub(crate) async fn list_blobs(
    State(state): State<RouteState>,
) -> Result<Json<Vec<BlobMetadata>>, BlobApiError> {
    let blobs = state.blob_store.list().await?;
    Ok(Json(blobs.into_iter().map(Into::into).collect()))
}

/// Download the file for an image blob
#[utoipa::path(
    get,
    path = "/api/blobs/{uuid}/file",
    tag = "blobs",
    params(("uuid" = String, Path, description = "Blob identifier")),
    responses(
        (status = 200, description = "File content, served as an attachment"),
        (status = NOT_FOUND, description = "Image blob not found", body = BlobApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to serve file")
    ),
)]
pub(crate) async fn download_blob_file(
    Path(uuid): Path<String>,
    State(state): State<RouteState>,
) -> Result<Response<Body>, BlobApiError> {
    let content = state.blob_store.get_content(&uuid).await?;
    content_response(content, "attachment")
}

/// Retrieve an image blob, inline by default or metadata-only on request
#[utoipa::path(
    get,
    path = "/api/blobs/{uuid}",
    tag = "blobs",
    params(
        ("uuid" = String, Path, description = "Blob identifier"),
        RetrieveBlobParams,
    ),
    responses(
        (status = 200, description = "Inline file content, or the metadata document when metadata=true"),
        (status = NOT_FOUND, description = "Image blob not found", body = BlobApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to retrieve image blob")
    ),
)]
pub(crate) async fn get_blob(
    Path(uuid): Path<String>,
    Query(params): Query<RetrieveBlobParams>,
    State(state): State<RouteState>,
) -> Result<Response<Body>, BlobApiError> {
    if params.metadata {
        let metadata = state.blob_store.get_metadata(&uuid).await?;
        return Ok(Json(BlobMetadata::from(metadata)).into_response());
    }

    let content = state.blob_store.get_content(&uuid).await?;
    content_response(content, "inline")
}

/// Create a new image blob
///
/// Accepts either a JSON document (`file_name`, `content_type`, `uuid`,
/// `image_data` as base64) or a raw binary body with `X-File-Name` and
/// `X-UUID` headers.
#[utoipa::path(
    post,
    path = "/api/blobs",
    tag = "blobs",
    request_body = payload::CreateBlobRequest,
    responses(
        (status = 201, description = "Image blob created", body = CreateBlobResponse),
        (status = BAD_REQUEST, description = "Invalid or missing fields", body = BlobApiError),
        (status = CONFLICT, description = "UUID already exists", body = BlobApiError),
        (status = UNSUPPORTED_MEDIA_TYPE, description = "Unsupported media type", body = BlobApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to create image blob")
    ),
)]
pub(crate) async fn create_blob(
    State(state): State<RouteState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, BlobApiError> {
    let new_blob = payload::normalize_create(&headers, &body)?;
    let uuid = state.blob_store.create(new_blob).await?;
    Ok((StatusCode::CREATED, Json(CreateBlobResponse { uuid })))
}

/// Update an image blob, any non-empty subset of its fields
#[utoipa::path(
    put,
    path = "/api/blobs/{uuid}",
    tag = "blobs",
    params(("uuid" = String, Path, description = "Blob identifier")),
    request_body = payload::UpdateBlobRequest,
    responses(
        (status = 200, description = "Image blob updated", body = UpdateBlobResponse),
        (status = BAD_REQUEST, description = "No fields provided or invalid fields", body = BlobApiError),
        (status = NOT_FOUND, description = "Image blob not found", body = BlobApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to update image blob")
    ),
)]
pub(crate) async fn update_blob(
    Path(uuid): Path<String>,
    State(state): State<RouteState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UpdateBlobResponse>, BlobApiError> {
    let patch = payload::normalize_update(&headers, &body)?;
    let blob = state.blob_store.update(&uuid, patch).await?;
    Ok(Json(UpdateBlobResponse {
        message: "Image blob updated successfully".to_string(),
        blob: blob.into(),
    }))
}

/// Delete an image blob
#[utoipa::path(
    delete,
    path = "/api/blobs/{uuid}",
    tag = "blobs",
    params(("uuid" = String, Path, description = "Blob identifier")),
    responses(
        (status = 200, description = "Image blob deleted", body = DeleteBlobResponse),
        (status = NOT_FOUND, description = "Image blob not found", body = BlobApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to delete image blob")
    ),
)]
pub(crate) async fn delete_blob(
    Path(uuid): Path<String>,
    State(state): State<RouteState>,
) -> Result<Json<DeleteBlobResponse>, BlobApiError> {
    state.blob_store.delete(&uuid).await?;
    Ok(Json(DeleteBlobResponse {
        message: "Image blob deleted successfully".to_string(),
        uuid,
    }))
}

fn content_response(
    content: BlobContent,
    disposition: &str,
) -> Result<Response<Body>, BlobApiError> {
    Response::builder()
        .header(header::CONTENT_TYPE, content.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("{disposition}; filename=\"{}\"", content.file_name),
        )
        .header(header::CONTENT_LENGTH, content.image_data.len())
        .body(Body::from(content.image_data))
        .map_err(|e| BlobApiError::internal_error_str(&e.to_string()))
}
