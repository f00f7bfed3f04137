pub mod guard;
pub mod post;
pub mod profile;
pub mod relation;
pub mod schema;
pub mod session;
pub mod user;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use picstream_blob::BlobStore;
use picstream_sql::{SQLStore, Value};

use crate::service::relation::{RelationStore, FOLLOWS, POST_LIKES};

/// Social service error type.
#[derive(Debug, Error)]
pub enum SocialError {
    /// A user attempted to follow themselves. Raised by the guard, before
    /// any edge reaches storage.
    #[error("user cannot follow himself")]
    SelfFollow,

    /// A user attempted to like their own post. Same treatment.
    #[error("user cannot like his own post")]
    SelfLike,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<SocialError> for picstream_core::ServiceError {
    fn from(e: SocialError) -> Self {
        match e {
            SocialError::SelfFollow => {
                picstream_core::ServiceError::Validation("user cannot follow himself".into())
            }
            SocialError::SelfLike => {
                picstream_core::ServiceError::Validation("user cannot like his own post".into())
            }
            SocialError::NotFound(m) => picstream_core::ServiceError::NotFound(m),
            SocialError::Conflict(m) => picstream_core::ServiceError::Conflict(m),
            SocialError::Validation(m) => picstream_core::ServiceError::Validation(m),
            SocialError::Unauthorized(m) => picstream_core::ServiceError::Unauthorized(m),
            SocialError::Storage(m) => picstream_core::ServiceError::Storage(m),
            SocialError::Internal(m) => picstream_core::ServiceError::Internal(m),
        }
    }
}

/// Configuration for the social service.
#[derive(Debug, Clone)]
pub struct SocialConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 24h).
    pub access_token_ttl: i64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "picstream-dev-secret-change-me".to_string(),
            access_token_ttl: 86400, // 24h
        }
    }
}

/// The social service. Holds storage backends, configuration, and the two
/// relationship stores (user-follows-user, user-likes-post).
pub struct SocialService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) blob: Arc<dyn BlobStore>,
    pub(crate) config: SocialConfig,
    pub(crate) follows: RelationStore,
    pub(crate) likes: RelationStore,
}

impl SocialService {
    /// Create a new SocialService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        blob: Arc<dyn BlobStore>,
        config: SocialConfig,
    ) -> Result<Arc<Self>, SocialError> {
        schema::init_schema(sql.as_ref())?;
        let svc = Arc::new(Self {
            follows: RelationStore::new(Arc::clone(&sql), FOLLOWS),
            likes: RelationStore::new(Arc::clone(&sql), POST_LIKES),
            sql,
            blob,
            config,
        });
        Ok(svc)
    }

    // ── Generic CRUD helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), SocialError> {
        let json = serde_json::to_string(record)
            .map_err(|e| SocialError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                SocialError::Conflict(msg)
            } else {
                SocialError::Storage(msg)
            }
        })?;

        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, SocialError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self.sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| SocialError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| SocialError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| SocialError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), SocialError> {
        let json = serde_json::to_string(record)
            .map_err(|e| SocialError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            id_idx,
        );

        let affected = self.sql
            .exec(&sql, &params)
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(SocialError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }
}
