//! Payload normalization for blob writes.
//!
//! Requests arrive in one of two shapes, selected by the declared media
//! type: a structured JSON document carrying base64 (or byte-array)
//! content, or a raw binary body with metadata in headers. Both shapes
//! resolve to the same canonical tuple types before anything reaches the
//! repository, so the store layer never inspects media types.

use axum::http::{header::CONTENT_TYPE, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use blob_store::{BlobPatch, NewBlob};
use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

pub const FILE_NAME_HEADER: &str = "x-file-name";
pub const UUID_HEADER: &str = "x-uuid";

#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Request body is not a valid JSON document: {0}")]
    InvalidDocument(String),

    #[error("Invalid base64 image data")]
    InvalidEncoding,

    #[error("Invalid image data format")]
    InvalidFormat,

    #[error("file_name is required (in body or as X-File-Name header)")]
    MissingFileName,

    #[error("content_type is required (in body or as Content-Type header)")]
    MissingContentType,

    #[error("uuid is required (in body or as X-UUID header)")]
    MissingIdentifier,

    #[error("Image data is required and must be non-empty")]
    MissingContent,

    #[error("At least one field (file_name, image_data, or content_type) is required for update")]
    NoFieldsProvided,
}

impl PayloadError {
    /// Stable machine-readable code, one per failure.
    pub fn code(&self) -> &'static str {
        match self {
            PayloadError::UnsupportedMediaType(_) => "unsupported_media_type",
            PayloadError::InvalidDocument(_) => "invalid_document",
            PayloadError::InvalidEncoding => "invalid_encoding",
            PayloadError::InvalidFormat => "invalid_format",
            PayloadError::MissingFileName => "missing_file_name",
            PayloadError::MissingContentType => "missing_content_type",
            PayloadError::MissingIdentifier => "missing_identifier",
            PayloadError::MissingContent => "missing_content",
            PayloadError::NoFieldsProvided => "no_fields_provided",
        }
    }
}

/// Structured create document.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBlobRequest {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub uuid: Option<String>,
    /// Base64 text or an array of byte integers.
    #[schema(value_type = Option<String>, format = Byte)]
    pub image_data: Option<serde_json::Value>,
}

/// Structured update document. The identifier comes from the route path,
/// never from the body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBlobRequest {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    #[schema(value_type = Option<String>, format = Byte)]
    pub image_data: Option<serde_json::Value>,
}

/// The two accepted input shapes.
enum Shape {
    Structured,
    Raw(String),
}

fn request_shape(headers: &HeaderMap) -> Result<Shape, PayloadError> {
    let declared = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase());

    match declared.as_deref() {
        Some("application/json") => Ok(Shape::Structured),
        Some(t) if t == "application/octet-stream" || t.starts_with("image/") => {
            Ok(Shape::Raw(t.to_string()))
        }
        Some(other) => Err(PayloadError::UnsupportedMediaType(other.to_string())),
        None => Err(PayloadError::UnsupportedMediaType("(none)".to_string())),
    }
}

/// Empty strings are indistinguishable from missing fields.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn decode_content(value: serde_json::Value) -> Result<Vec<u8>, PayloadError> {
    match value {
        serde_json::Value::String(text) => STANDARD
            .decode(text.as_bytes())
            .map_err(|_| PayloadError::InvalidEncoding),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| {
                item.as_u64()
                    .filter(|byte| *byte <= u8::MAX as u64)
                    .map(|byte| byte as u8)
                    .ok_or(PayloadError::InvalidFormat)
            })
            .collect(),
        _ => Err(PayloadError::InvalidFormat),
    }
}

fn extract_content(value: Option<serde_json::Value>) -> Result<Option<Vec<u8>>, PayloadError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => decode_content(value).map(Some),
    }
}

/// Normalize a create request into the canonical tuple.
///
/// Validation order, first failure wins: unsupported media type, document
/// or content decode failures, then missing file name, media type,
/// identifier, content.
pub fn normalize_create(headers: &HeaderMap, body: &[u8]) -> Result<NewBlob, PayloadError> {
    match request_shape(headers)? {
        Shape::Structured => {
            let doc: CreateBlobRequest = serde_json::from_slice(body)
                .map_err(|e| PayloadError::InvalidDocument(e.to_string()))?;
            let image_data = extract_content(doc.image_data)?;

            let file_name = non_empty(doc.file_name).ok_or(PayloadError::MissingFileName)?;
            let content_type =
                non_empty(doc.content_type).ok_or(PayloadError::MissingContentType)?;
            let uuid = non_empty(doc.uuid).ok_or(PayloadError::MissingIdentifier)?;
            let image_data = image_data
                .filter(|data| !data.is_empty())
                .ok_or(PayloadError::MissingContent)?;

            Ok(NewBlob {
                file_name,
                uuid,
                content_type,
                image_data,
            })
        }
        Shape::Raw(content_type) => {
            let file_name =
                header_value(headers, FILE_NAME_HEADER).ok_or(PayloadError::MissingFileName)?;
            let uuid = header_value(headers, UUID_HEADER).ok_or(PayloadError::MissingIdentifier)?;
            if body.is_empty() {
                return Err(PayloadError::MissingContent);
            }

            Ok(NewBlob {
                file_name,
                uuid,
                content_type,
                image_data: body.to_vec(),
            })
        }
    }
}

/// Normalize an update request into a partial tuple with at least one
/// field present.
///
/// In raw mode an empty body means "content absent", and the declared
/// content type only counts as supplied alongside a non-empty body. An
/// unrecognized media type contributes no fields at all and therefore
/// reports `no_fields_provided`, matching the update surface (which has
/// no 415).
pub fn normalize_update(headers: &HeaderMap, body: &[u8]) -> Result<BlobPatch, PayloadError> {
    let shape = match request_shape(headers) {
        Ok(shape) => shape,
        Err(PayloadError::UnsupportedMediaType(_)) => return Err(PayloadError::NoFieldsProvided),
        Err(e) => return Err(e),
    };

    let patch = match shape {
        Shape::Structured => {
            let doc: UpdateBlobRequest = serde_json::from_slice(body)
                .map_err(|e| PayloadError::InvalidDocument(e.to_string()))?;
            let image_data = extract_content(doc.image_data)?;
            if let Some(data) = &image_data {
                // A field is never cleared to empty.
                if data.is_empty() {
                    return Err(PayloadError::MissingContent);
                }
            }

            BlobPatch {
                file_name: non_empty(doc.file_name),
                content_type: non_empty(doc.content_type),
                image_data,
            }
        }
        Shape::Raw(content_type) => {
            let image_data = (!body.is_empty()).then(|| body.to_vec());
            let content_type = image_data.is_some().then_some(content_type);

            BlobPatch {
                file_name: header_value(headers, FILE_NAME_HEADER),
                content_type,
                image_data,
            }
        }
    };

    if patch.is_empty() {
        return Err(PayloadError::NoFieldsProvided);
    }
    Ok(patch)
}
