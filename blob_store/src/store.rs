//! Blob repository: translates canonical tuples into parameterized
//! statements and maps backend outcomes to domain results.

use chrono::Utc;
use sqlx::{query::Query, sqlite::SqliteArguments, Sqlite, SqlitePool};

use crate::{
    error::{Result, StoreError},
    models::{BlobContent, BlobMetadata, BlobPatch, NewBlob},
};

#[derive(Clone)]
pub struct BlobStore {
    pool: SqlitePool,
}

impl BlobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List every blob record, metadata only. Ordering is backend-default.
    pub async fn list(&self) -> Result<Vec<BlobMetadata>> {
        let rows = sqlx::query_as::<_, BlobMetadata>(
            "SELECT id, file_name, uuid, content_type, created_at FROM image_blobs",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_metadata(&self, uuid: &str) -> Result<BlobMetadata> {
        let row = sqlx::query_as::<_, BlobMetadata>(
            "SELECT id, file_name, uuid, content_type, created_at FROM image_blobs WHERE uuid = ?",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::BlobNotFound(uuid.to_string()))?;

        Ok(row)
    }

    /// Fetch the content bytes plus the fields needed to serve them. The
    /// caller decides the delivery disposition.
    pub async fn get_content(&self, uuid: &str) -> Result<BlobContent> {
        let row = sqlx::query_as::<_, BlobContent>(
            "SELECT file_name, content_type, image_data FROM image_blobs WHERE uuid = ?",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::BlobNotFound(uuid.to_string()))?;

        Ok(row)
    }

    /// Insert a new record under the caller-supplied identifier and return
    /// that identifier unchanged. Concurrent creates with the same
    /// identifier are serialized by the backend's unique constraint: one
    /// insert succeeds, the other surfaces `DuplicateUuid`.
    pub async fn create(&self, blob: NewBlob) -> Result<String> {
        sqlx::query(
            "INSERT INTO image_blobs (file_name, uuid, image_data, content_type, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&blob.file_name)
        .bind(&blob.uuid)
        .bind(&blob.image_data)
        .bind(&blob.content_type)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateUuid(blob.uuid.clone())
            }
            _ => StoreError::Database(e),
        })?;

        tracing::debug!("created image blob: {}", blob.uuid);
        Ok(blob.uuid)
    }

    /// Write exactly the supplied fields and return the post-update
    /// metadata. An empty patch writes nothing and reads back the current
    /// metadata.
    pub async fn update(&self, uuid: &str, patch: BlobPatch) -> Result<BlobMetadata> {
        if patch.is_empty() {
            return self.get_metadata(uuid).await;
        }

        let builder = UpdateBuilder::new()
            .set_text("file_name", patch.file_name)
            .set_text("content_type", patch.content_type)
            .set_blob("image_data", patch.image_data);
        let sql = builder.sql("image_blobs", "uuid");

        let rows_affected = builder
            .bind_values(sqlx::query(&sql))
            .bind(uuid)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::BlobNotFound(uuid.to_string()));
        }

        tracing::debug!("updated image blob: {}", uuid);
        self.get_metadata(uuid).await
    }

    pub async fn delete(&self, uuid: &str) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM image_blobs WHERE uuid = ?")
            .bind(uuid)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::BlobNotFound(uuid.to_string()));
        }

        tracing::debug!("deleted image blob: {}", uuid);
        Ok(())
    }
}

enum SqlValue {
    Text(String),
    Blob(Vec<u8>),
}

/// Accumulates `(column, value)` pairs for the fields actually supplied
/// and renders one parameterized UPDATE statement.
struct UpdateBuilder {
    assignments: Vec<(&'static str, SqlValue)>,
}

impl UpdateBuilder {
    fn new() -> Self {
        Self {
            assignments: Vec::new(),
        }
    }

    fn set_text(mut self, column: &'static str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.assignments.push((column, SqlValue::Text(value)));
        }
        self
    }

    fn set_blob(mut self, column: &'static str, value: Option<Vec<u8>>) -> Self {
        if let Some(value) = value {
            self.assignments.push((column, SqlValue::Blob(value)));
        }
        self
    }

    fn sql(&self, table: &str, key_column: &str) -> String {
        let assignments = self
            .assignments
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("UPDATE {table} SET {assignments} WHERE {key_column} = ?")
    }

    fn bind_values<'q>(
        self,
        mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        for (_, value) in self.assignments {
            query = match value {
                SqlValue::Text(value) => query.bind(value),
                SqlValue::Blob(value) => query.bind(value),
            };
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::initialize_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_store() -> BlobStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        BlobStore::new(pool)
    }

    fn png_blob(uuid: &str, data: &[u8]) -> NewBlob {
        NewBlob {
            file_name: "a.png".to_string(),
            uuid: uuid.to_string(),
            content_type: "image/png".to_string(),
            image_data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_content() {
        let store = create_test_store().await;

        let uuid = store.create(png_blob("u1", b"hello")).await.unwrap();
        assert_eq!(uuid, "u1");

        let content = store.get_content("u1").await.unwrap();
        assert_eq!(content.image_data, b"hello");
        assert_eq!(content.file_name, "a.png");
        assert_eq!(content.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_duplicate_uuid_rejected() {
        let store = create_test_store().await;

        store.create(png_blob("u1", b"first")).await.unwrap();
        let err = store.create(png_blob("u1", b"second")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUuid(ref u) if u == "u1"));

        // The original record survives untouched.
        let content = store.get_content("u1").await.unwrap();
        assert_eq!(content.image_data, b"first");
    }

    #[tokio::test]
    async fn test_list_returns_metadata_only() {
        let store = create_test_store().await;

        store.create(png_blob("u1", b"one")).await.unwrap();
        store.create(png_blob("u2", b"two")).await.unwrap();

        let rows = store.list().await.unwrap();
        assert_eq!(rows.len(), 2);
        let uuids: Vec<&str> = rows.iter().map(|r| r.uuid.as_str()).collect();
        assert!(uuids.contains(&"u1"));
        assert!(uuids.contains(&"u2"));
    }

    #[tokio::test]
    async fn test_get_missing_blob() {
        let store = create_test_store().await;

        let err = store.get_metadata("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::BlobNotFound(_)));
        let err = store.get_content("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::BlobNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_filename_only_leaves_rest() {
        let store = create_test_store().await;
        store.create(png_blob("u1", b"hello")).await.unwrap();

        let patch = BlobPatch {
            file_name: Some("b.png".to_string()),
            ..Default::default()
        };
        let updated = store.update("u1", patch).await.unwrap();
        assert_eq!(updated.file_name, "b.png");
        assert_eq!(updated.content_type, "image/png");

        let content = store.get_content("u1").await.unwrap();
        assert_eq!(content.image_data, b"hello");
        assert_eq!(content.file_name, "b.png");
    }

    #[tokio::test]
    async fn test_update_content_only() {
        let store = create_test_store().await;
        store.create(png_blob("u1", b"hello")).await.unwrap();

        let patch = BlobPatch {
            image_data: Some(b"goodbye".to_vec()),
            ..Default::default()
        };
        store.update("u1", patch).await.unwrap();

        let content = store.get_content("u1").await.unwrap();
        assert_eq!(content.image_data, b"goodbye");
        assert_eq!(content.file_name, "a.png");
    }

    #[tokio::test]
    async fn test_update_missing_blob() {
        let store = create_test_store().await;

        let patch = BlobPatch {
            file_name: Some("b.png".to_string()),
            ..Default::default()
        };
        let err = store.update("nope", patch).await.unwrap_err();
        assert!(matches!(err, StoreError::BlobNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = create_test_store().await;
        store.create(png_blob("u1", b"hello")).await.unwrap();

        store.delete("u1").await.unwrap();
        let err = store.delete("u1").await.unwrap_err();
        assert!(matches!(err, StoreError::BlobNotFound(_)));
    }

    #[test]
    fn test_update_builder_renders_supplied_columns() {
        let builder = UpdateBuilder::new()
            .set_text("file_name", Some("a.png".to_string()))
            .set_text("content_type", None)
            .set_blob("image_data", Some(b"x".to_vec()));
        assert_eq!(
            builder.sql("image_blobs", "uuid"),
            "UPDATE image_blobs SET file_name = ?, image_data = ? WHERE uuid = ?"
        );
    }
}
