/// SQLite-backed document store
use crate::{
    doc_store::{DocPath, Document, DocumentStore, FieldFilter},
    error::{GalleryError, GalleryResult},
};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Row, SqlitePool};

/// Document store over the `documents` table
///
/// Each row holds one JSON document. Field filters are evaluated with
/// `json_extract`, so queries never deserialize non-matching rows.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    db: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    fn validate_field(field: &str) -> GalleryResult<()> {
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(GalleryError::Validation(format!(
                "Invalid filter field: {}",
                field
            )));
        }
        Ok(())
    }

    fn row_to_document(collection: &str, row: &sqlx::sqlite::SqliteRow) -> GalleryResult<Document> {
        let id: String = row.get("id");
        let raw: String = row.get("data");
        Ok(Document {
            path: DocPath::new(collection, id),
            data: serde_json::from_str(&raw)?,
        })
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get_document(&self, path: &DocPath) -> GalleryResult<Option<Document>> {
        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = ? AND id = ?")
            .bind(&path.collection)
            .bind(&path.id)
            .fetch_optional(&self.db)
            .await?;

        row.map(|row| Self::row_to_document(&path.collection, &row))
            .transpose()
    }

    async fn set_document(&self, path: &DocPath, data: &Value) -> GalleryResult<()> {
        if !data.is_object() {
            return Err(GalleryError::Validation(format!(
                "Document {} must be a JSON object",
                path
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(collection, id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&path.collection)
        .bind(&path.id)
        .bind(data.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn delete_document(&self, path: &DocPath) -> GalleryResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(&path.collection)
            .bind(&path.id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> GalleryResult<Vec<Document>> {
        let mut sql = String::from("SELECT id, data FROM documents WHERE collection = ?");
        for filter in filters {
            Self::validate_field(&filter.field)?;
            sql.push_str(" AND json_extract(data, ?) = ?");
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query(&sql).bind(collection);
        for filter in filters {
            query = query.bind(format!("$.{}", filter.field));
            query = match &filter.value {
                Value::String(s) => query.bind(s.clone()),
                Value::Bool(b) => query.bind(*b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => query.bind(i),
                    None => {
                        return Err(GalleryError::Validation(format!(
                            "Unsupported numeric filter on {}",
                            filter.field
                        )))
                    }
                },
                _ => {
                    return Err(GalleryError::Validation(format!(
                        "Unsupported filter value on {}",
                        filter.field
                    )))
                }
            };
        }

        let rows = query.fetch_all(&self.db).await?;

        rows.iter()
            .map(|row| Self::row_to_document(collection, row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use serde_json::json;

    async fn create_test_store() -> SqliteDocumentStore {
        let pool = db::create_memory_pool().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        SqliteDocumentStore::new(pool)
    }

    #[tokio::test]
    async fn test_set_and_get_document() {
        let store = create_test_store().await;
        let path = DocPath::parse("galleries/g1/photos/p1").unwrap();

        store
            .set_document(&path, &json!({ "name": "first.jpg" }))
            .await
            .unwrap();

        let doc = store.get_document(&path).await.unwrap().unwrap();
        assert_eq!(doc.data["name"], "first.jpg");
        assert_eq!(doc.path, path);
    }

    #[tokio::test]
    async fn test_set_replaces_document() {
        let store = create_test_store().await;
        let path = DocPath::new("galleries", "g1");

        store.set_document(&path, &json!({ "name": "old" })).await.unwrap();
        store.set_document(&path, &json!({ "name": "new" })).await.unwrap();

        let doc = store.get_document(&path).await.unwrap().unwrap();
        assert_eq!(doc.data["name"], "new");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = create_test_store().await;
        let path = DocPath::new("galleries", "g1");

        store.set_document(&path, &json!({ "name": "g" })).await.unwrap();
        assert!(store.delete_document(&path).await.unwrap());
        assert!(!store.delete_document(&path).await.unwrap());
        assert!(store.get_document(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_with_filters() {
        let store = create_test_store().await;

        for (id, gallery, name) in [
            ("a", "g1", "one.jpg"),
            ("b", "g1", "two.jpg"),
            ("c", "g2", "one.jpg"),
        ] {
            store
                .set_document(
                    &DocPath::new("gallery-photos", id),
                    &json!({ "galleryId": gallery, "name": name, "size": 10, "active": true }),
                )
                .await
                .unwrap();
        }

        let all = store.query("gallery-photos", &[]).await.unwrap();
        assert_eq!(all.len(), 3);

        let matches = store
            .query(
                "gallery-photos",
                &[
                    FieldFilter::eq("galleryId", "g1"),
                    FieldFilter::eq("name", "one.jpg"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path.id, "a");

        let by_number = store
            .query("gallery-photos", &[FieldFilter::eq("size", 10)])
            .await
            .unwrap();
        assert_eq!(by_number.len(), 3);

        let by_bool = store
            .query("gallery-photos", &[FieldFilter::eq("active", true)])
            .await
            .unwrap();
        assert_eq!(by_bool.len(), 3);
    }

    #[tokio::test]
    async fn test_query_rejects_bad_field() {
        let store = create_test_store().await;
        let result = store
            .query("galleries", &[FieldFilter::eq("name') OR 1=1 --", "x")])
            .await;
        assert!(result.is_err());
    }
}
