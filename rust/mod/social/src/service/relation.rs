//! Generic many-to-many edge storage.
//!
//! A relation is a directed edge-set between two entity id spaces,
//! persisted in a two-column table with a composite primary key. Adds and
//! removes are idempotent: re-adding an existing edge and removing a
//! missing one are both no-ops.

use std::sync::Arc;

use picstream_core::now_rfc3339;
use picstream_sql::{SQLStore, Statement, Value};

use crate::service::SocialError;

/// Describes one edge table: where edges live and what the columns are
/// called.
#[derive(Debug, Clone, Copy)]
pub struct RelationDef {
    pub table: &'static str,
    pub source_col: &'static str,
    pub target_col: &'static str,
}

/// User-follows-user edges.
pub const FOLLOWS: RelationDef = RelationDef {
    table: "follows",
    source_col: "follower_id",
    target_col: "followed_id",
};

/// Post-liked-by-user edges.
pub const POST_LIKES: RelationDef = RelationDef {
    table: "post_likes",
    source_col: "post_id",
    target_col: "user_id",
};

/// Edge storage for one relation, bound to a SQL backend.
pub struct RelationStore {
    sql: Arc<dyn SQLStore>,
    def: RelationDef,
}

impl RelationStore {
    pub fn new(sql: Arc<dyn SQLStore>, def: RelationDef) -> Self {
        Self { sql, def }
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT OR IGNORE INTO {} ({}, {}, created_at) VALUES (?1, ?2, ?3)",
            self.def.table, self.def.source_col, self.def.target_col,
        )
    }

    /// Add an edge. Idempotent: adding an existing edge changes nothing.
    pub fn add(&self, source: &str, target: &str) -> Result<(), SocialError> {
        self.sql
            .exec(
                &self.insert_sql(),
                &[
                    Value::Text(source.to_string()),
                    Value::Text(target.to_string()),
                    Value::Text(now_rfc3339()),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Add several edges from one source inside a single transaction.
    ///
    /// Validation must have run on the whole target set already; if any
    /// statement fails the transaction rolls back, so no partial edge set
    /// is ever committed.
    pub fn add_many<S: AsRef<str>>(&self, source: &str, targets: &[S]) -> Result<(), SocialError> {
        if targets.is_empty() {
            return Ok(());
        }
        let now = now_rfc3339();
        let statements: Vec<Statement> = targets
            .iter()
            .map(|t| {
                Statement::new(
                    self.insert_sql(),
                    vec![
                        Value::Text(source.to_string()),
                        Value::Text(t.as_ref().to_string()),
                        Value::Text(now.clone()),
                    ],
                )
            })
            .collect();
        self.sql
            .exec_batch(&statements)
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Remove an edge. Idempotent: removing a missing edge is a no-op.
    pub fn remove(&self, source: &str, target: &str) -> Result<(), SocialError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1 AND {} = ?2",
            self.def.table, self.def.source_col, self.def.target_col,
        );
        self.sql
            .exec(
                &sql,
                &[
                    Value::Text(source.to_string()),
                    Value::Text(target.to_string()),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Membership test for a single edge.
    pub fn contains(&self, source: &str, target: &str) -> Result<bool, SocialError> {
        let sql = format!(
            "SELECT 1 AS hit FROM {} WHERE {} = ?1 AND {} = ?2",
            self.def.table, self.def.source_col, self.def.target_col,
        );
        let rows = self
            .sql
            .query(
                &sql,
                &[
                    Value::Text(source.to_string()),
                    Value::Text(target.to_string()),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        Ok(!rows.is_empty())
    }

    /// Number of outgoing edges from `source`.
    pub fn count(&self, source: &str) -> Result<usize, SocialError> {
        self.count_col(self.def.source_col, source)
    }

    /// Number of incoming edges to `target` (inverse lookup).
    pub fn count_inverse(&self, target: &str) -> Result<usize, SocialError> {
        self.count_col(self.def.target_col, target)
    }

    fn count_col(&self, col: &str, id: &str) -> Result<usize, SocialError> {
        let sql = format!(
            "SELECT COUNT(*) AS cnt FROM {} WHERE {} = ?1",
            self.def.table, col,
        );
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        Ok(rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize)
    }

    /// All target ids reachable from `source`, in insertion order.
    pub fn targets(&self, source: &str) -> Result<Vec<String>, SocialError> {
        let sql = format!(
            "SELECT {} AS target FROM {} WHERE {} = ?1 ORDER BY created_at ASC",
            self.def.target_col, self.def.table, self.def.source_col,
        );
        let rows = self
            .sql
            .query(&sql, &[Value::Text(source.to_string())])
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get_str("target").map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picstream_sql::SqliteStore;

    fn edge_store() -> RelationStore {
        // A bare edge table is enough here; the full schema (with foreign
        // keys into users/posts) is exercised by the service tests.
        let sql = SqliteStore::open_in_memory().unwrap();
        sql.exec(
            "CREATE TABLE follows (
                follower_id TEXT NOT NULL,
                followed_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (follower_id, followed_id)
            )",
            &[],
        )
        .unwrap();
        RelationStore::new(Arc::new(sql), FOLLOWS)
    }

    #[test]
    fn test_add_contains_remove() {
        let store = edge_store();

        assert!(!store.contains("a", "b").unwrap());
        store.add("a", "b").unwrap();
        assert!(store.contains("a", "b").unwrap());
        // Direction matters.
        assert!(!store.contains("b", "a").unwrap());

        store.remove("a", "b").unwrap();
        assert!(!store.contains("a", "b").unwrap());
    }

    #[test]
    fn test_add_is_idempotent() {
        let store = edge_store();
        for _ in 0..3 {
            store.add("a", "b").unwrap();
        }
        assert_eq!(store.count("a").unwrap(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let store = edge_store();
        store.remove("a", "b").unwrap();
        assert_eq!(store.count("a").unwrap(), 0);
    }

    #[test]
    fn test_counts_both_directions() {
        let store = edge_store();
        store.add("a", "c").unwrap();
        store.add("b", "c").unwrap();
        store.add("a", "b").unwrap();

        assert_eq!(store.count("a").unwrap(), 2);
        assert_eq!(store.count("b").unwrap(), 1);
        assert_eq!(store.count("c").unwrap(), 0);
        assert_eq!(store.count_inverse("c").unwrap(), 2);
        assert_eq!(store.count_inverse("b").unwrap(), 1);
        assert_eq!(store.count_inverse("a").unwrap(), 0);
    }

    #[test]
    fn test_add_many_commits_all() {
        let store = edge_store();
        store.add_many("a", &["b", "c", "d"]).unwrap();
        assert_eq!(store.count("a").unwrap(), 3);
        assert_eq!(store.targets("a").unwrap().len(), 3);
    }

    #[test]
    fn test_add_many_empty_is_noop() {
        let store = edge_store();
        store.add_many::<&str>("a", &[]).unwrap();
        assert_eq!(store.count("a").unwrap(), 0);
    }
}
