//! Record structs mapped from the database rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Descriptive fields of a blob record. Never carries content bytes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlobMetadata {
    pub id: i64,
    pub file_name: String,
    pub uuid: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

/// Content bytes of a blob plus the fields needed to serve them.
#[derive(Debug, Clone, FromRow)]
pub struct BlobContent {
    pub file_name: String,
    pub content_type: String,
    pub image_data: Vec<u8>,
}

/// Canonical create tuple produced by the payload normalizer.
#[derive(Debug, Clone)]
pub struct NewBlob {
    pub file_name: String,
    pub uuid: String,
    pub content_type: String,
    pub image_data: Vec<u8>,
}

/// Partial-update tuple: only the supplied fields are written.
#[derive(Debug, Clone, Default)]
pub struct BlobPatch {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub image_data: Option<Vec<u8>>,
}

impl BlobPatch {
    pub fn is_empty(&self) -> bool {
        self.file_name.is_none() && self.content_type.is_none() && self.image_data.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
