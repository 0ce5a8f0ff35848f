use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::routes::payload::PayloadError;

/// API error envelope: a stable machine-readable code plus a
/// human-readable message, rendered as a JSON document.
#[derive(Debug, ToSchema, Serialize)]
pub struct BlobApiError {
    #[serde(skip)]
    status_code: StatusCode,
    #[schema(value_type = String)]
    code: &'static str,
    #[serde(rename = "error")]
    message: String,
}

impl BlobApiError {
    pub fn new(status_code: StatusCode, code: &'static str, message: &str) -> Self {
        Self {
            status_code,
            code,
            message: message.to_string(),
        }
    }

    pub fn bad_request(code: &'static str, message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn internal_error_str(message: &str) -> Self {
        error!("internal error: {}", message);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal Server Error",
        )
    }
}

impl IntoResponse for BlobApiError {
    fn into_response(self) -> Response {
        error!(
            "API Error: {} {} - {}",
            self.status_code, self.code, self.message
        );
        (self.status_code, Json(self)).into_response()
    }
}

impl From<PayloadError> for BlobApiError {
    fn from(e: PayloadError) -> Self {
        let status = match e {
            PayloadError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, e.code(), &e.to_string())
    }
}

impl From<blob_store::StoreError> for BlobApiError {
    fn from(e: blob_store::StoreError) -> Self {
        use blob_store::StoreError;
        match e {
            StoreError::BlobNotFound(_) => Self::not_found("Image blob not found"),
            StoreError::UserNotFound(_) => Self::not_found("User not found"),
            StoreError::DuplicateUuid(_) => Self::new(
                StatusCode::CONFLICT,
                "duplicate_identifier",
                "UUID already exists or duplicate entry.",
            ),
            StoreError::DuplicateEmail(_) => Self::new(
                StatusCode::CONFLICT,
                "duplicate_email",
                "Email already exists",
            ),
            // Backend faults are logged in full here and surfaced opaque.
            StoreError::Database(err) => {
                error!("database error: {err:?}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal Server Error",
                )
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BlobMetadata {
    pub id: i64,
    pub file_name: String,
    pub uuid: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<blob_store::BlobMetadata> for BlobMetadata {
    fn from(blob: blob_store::BlobMetadata) -> Self {
        Self {
            id: blob.id,
            file_name: blob.file_name,
            uuid: blob.uuid,
            content_type: blob.content_type,
            created_at: blob.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateBlobResponse {
    pub uuid: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateBlobResponse {
    pub message: String,
    pub blob: BlobMetadata,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteBlobResponse {
    pub message: String,
    pub uuid: String,
}

#[derive(Debug, Serialize, Deserialize, IntoParams)]
pub struct RetrieveBlobParams {
    /// When true, render the metadata document instead of the content bytes.
    #[serde(default)]
    pub metadata: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<blob_store::User> for User {
    fn from(user: blob_store::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponse {
    pub message: String,
    pub id: i64,
}
