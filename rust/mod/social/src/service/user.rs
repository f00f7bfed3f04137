use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use picstream_core::{new_id, now_rfc3339, ListParams, ListResult};
use picstream_sql::{Statement, Value};

use crate::model::{CreateUser, User, UserSummary};
use crate::service::{SocialError, SocialService};

/// Maximum username length, matching the original account system.
const MAX_USERNAME_LEN: usize = 150;

fn validate_username(username: &str) -> Result<(), SocialError> {
    if username.is_empty() {
        return Err(SocialError::Validation("username must not be empty".into()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(SocialError::Validation(format!(
            "username longer than {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(SocialError::Validation(
            "username may contain only letters, digits and @.+-_".into(),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, SocialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| SocialError::Internal(format!("password hash failed: {}", e)))
}

/// Verify a login attempt against the stored argon2id hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

impl SocialService {
    /// Register a new user. The profile row is created in the same
    /// transaction, so every user has one from the start.
    pub fn create_user(&self, input: CreateUser) -> Result<User, SocialError> {
        validate_username(&input.username)?;
        if input.password.is_empty() {
            return Err(SocialError::Validation("password must not be empty".into()));
        }
        if self.find_user_by_username(&input.username)?.is_some() {
            return Err(SocialError::Validation(format!(
                "username '{}' already exists",
                input.username
            )));
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            username: input.username,
            password_hash: hash_password(&input.password)?,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        let json = serde_json::to_string(&user)
            .map_err(|e| SocialError::Internal(e.to_string()))?;

        let statements = vec![
            Statement::new(
                "INSERT INTO users (id, username, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                vec![
                    Value::Text(user.id.clone()),
                    Value::Text(user.username.clone()),
                    Value::Text(json),
                    Value::Text(now.clone()),
                    Value::Text(now.clone()),
                ],
            ),
            Statement::new(
                "INSERT INTO profiles (user_id, created_at) VALUES (?1, ?2)",
                vec![Value::Text(user.id.clone()), Value::Text(now)],
            ),
        ];

        self.sql.exec_batch(&statements).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                SocialError::Conflict(msg)
            } else {
                SocialError::Storage(msg)
            }
        })?;

        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, SocialError> {
        self.get_record("users", id)
    }

    /// Get a user by username, or NotFound.
    pub fn get_user_by_username(&self, username: &str) -> Result<User, SocialError> {
        self.find_user_by_username(username)?
            .ok_or_else(|| SocialError::NotFound(format!("user '{}' not found", username)))
    }

    /// Look up a user by username.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>, SocialError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM users WHERE username = ?1",
                &[Value::Text(username.to_string())],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        match rows.first().and_then(|r| r.get_str("data")) {
            Some(data) => serde_json::from_str(data)
                .map(Some)
                .map_err(|e| SocialError::Internal(e.to_string())),
            None => Ok(None),
        }
    }

    /// API summary for one user: username plus follow graph counts.
    pub fn user_summary(&self, user: &User) -> Result<UserSummary, SocialError> {
        Ok(UserSummary {
            username: user.username.clone(),
            following_number: self.follows.count(&user.id)?,
            followers_number: self.follows.count_inverse(&user.id)?,
        })
    }

    /// List all users (those with a profile) with follower/following counts.
    pub fn list_users(&self, params: &ListParams) -> Result<ListResult<UserSummary>, SocialError> {
        let count_rows = self
            .sql
            .query(
                "SELECT COUNT(*) AS cnt FROM users u JOIN profiles p ON p.user_id = u.id",
                &[],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let rows = self
            .sql
            .query(
                "SELECT u.username AS username,
                        (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id) AS following_number,
                        (SELECT COUNT(*) FROM follows f WHERE f.followed_id = u.id) AS followers_number
                 FROM users u
                 JOIN profiles p ON p.user_id = u.id
                 ORDER BY u.username ASC
                 LIMIT ?1 OFFSET ?2",
                &[
                    Value::Integer(params.limit as i64),
                    Value::Integer(params.offset as i64),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            items.push(UserSummary {
                username: row
                    .get_str("username")
                    .ok_or_else(|| SocialError::Internal("missing username column".into()))?
                    .to_string(),
                following_number: row.get_i64("following_number").unwrap_or(0) as usize,
                followers_number: row.get_i64("followers_number").unwrap_or(0) as usize,
            });
        }

        Ok(ListResult { items, total })
    }

    /// Delete a user and everything hanging off them: sessions, posts
    /// (with their images and like edges), follow edges in both
    /// directions, and the profile. One transaction, no orphan edges.
    pub fn delete_user(&self, id: &str) -> Result<(), SocialError> {
        let user: User = self.get_record("users", id)?;

        // Image keys to drop from the blob store once the rows are gone.
        let post_rows = self
            .sql
            .query(
                "SELECT image_key FROM posts WHERE author_id = ?1",
                &[Value::Text(user.id.clone())],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        let image_keys: Vec<String> = post_rows
            .iter()
            .filter_map(|r| r.get_str("image_key").map(str::to_string))
            .collect();

        let uid = Value::Text(user.id.clone());
        let statements = vec![
            Statement::new(
                "DELETE FROM post_likes WHERE user_id = ?1", vec![uid.clone()],
            ),
            Statement::new(
                "DELETE FROM post_likes WHERE post_id IN (SELECT id FROM posts WHERE author_id = ?1)",
                vec![uid.clone()],
            ),
            Statement::new(
                "DELETE FROM follows WHERE follower_id = ?1 OR followed_id = ?1",
                vec![uid.clone()],
            ),
            Statement::new("DELETE FROM sessions WHERE user_id = ?1", vec![uid.clone()]),
            Statement::new("DELETE FROM posts WHERE author_id = ?1", vec![uid.clone()]),
            Statement::new("DELETE FROM profiles WHERE user_id = ?1", vec![uid.clone()]),
            Statement::new("DELETE FROM users WHERE id = ?1", vec![uid]),
        ];

        self.sql
            .exec_batch(&statements)
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        // Best-effort blob cleanup; rows are already gone.
        for key in &image_keys {
            if let Err(e) = self.blob.delete(key) {
                tracing::warn!("failed to delete blob {}: {}", key, e);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::SocialConfig;
    use std::sync::Arc;

    use picstream_blob::FileStore;
    use picstream_sql::SqliteStore;

    fn test_service() -> (tempfile::TempDir, Arc<SocialService>) {
        let dir = tempfile::tempdir().unwrap();
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let blob = Arc::new(FileStore::open(dir.path()).unwrap());
        let svc = SocialService::new(sql, blob, SocialConfig::default()).unwrap();
        (dir, svc)
    }

    fn register(svc: &SocialService, username: &str) -> User {
        svc.create_user(CreateUser {
            username: username.to_string(),
            password: "secret".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_create_and_get_user() {
        let (_tmp, svc) = test_service();

        let user = register(&svc, "alice");
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "secret");

        let fetched = svc.get_user(&user.id).unwrap();
        assert_eq!(fetched.username, "alice");

        let by_name = svc.get_user_by_username("alice").unwrap();
        assert_eq!(by_name.id, user.id);
    }

    #[test]
    fn test_password_is_hashed_and_verifiable() {
        let (_tmp, svc) = test_service();
        let user = register(&svc, "alice");

        assert!(verify_password("secret", &user.password_hash));
        assert!(!verify_password("wrong", &user.password_hash));
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (_tmp, svc) = test_service();
        register(&svc, "alice");

        let err = svc
            .create_user(CreateUser {
                username: "alice".to_string(),
                password: "other".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, SocialError::Validation(_)));
    }

    #[test]
    fn test_invalid_usernames_rejected() {
        let (_tmp, svc) = test_service();

        let too_long = "x".repeat(151);
        for bad in ["", "has space", "semi;colon", too_long.as_str()] {
            let err = svc
                .create_user(CreateUser {
                    username: bad.to_string(),
                    password: "secret".to_string(),
                })
                .unwrap_err();
            assert!(matches!(err, SocialError::Validation(_)), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_empty_password_rejected() {
        let (_tmp, svc) = test_service();
        let err = svc
            .create_user(CreateUser {
                username: "alice".to_string(),
                password: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, SocialError::Validation(_)));
    }

    #[test]
    fn test_list_users_includes_counts() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");
        register(&svc, "carol");

        svc.follow(&alice.id, "bob").unwrap();
        svc.follow(&alice.id, "carol").unwrap();
        svc.follow(&bob.id, "carol").unwrap();

        let list = svc.list_users(&ListParams::default()).unwrap();
        assert_eq!(list.total, 3);
        assert_eq!(list.items.len(), 3);

        let by_name = |name: &str| {
            list.items
                .iter()
                .find(|u| u.username == name)
                .unwrap()
                .clone()
        };
        assert_eq!(by_name("alice").following_number, 2);
        assert_eq!(by_name("alice").followers_number, 0);
        assert_eq!(by_name("bob").following_number, 1);
        assert_eq!(by_name("bob").followers_number, 1);
        assert_eq!(by_name("carol").following_number, 0);
        assert_eq!(by_name("carol").followers_number, 2);
    }

    #[test]
    fn test_delete_user_cascades() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");

        // Edges in both directions, a post with a like, and a session.
        svc.follow(&alice.id, "bob").unwrap();
        svc.follow(&bob.id, "alice").unwrap();
        let post = svc
            .create_post(&bob.id, "hi", "image/png", b"png".to_vec())
            .unwrap();
        svc.like(&alice.id, &post.post_ref).unwrap();
        svc.login("bob", "secret").unwrap();

        svc.delete_user(&bob.id).unwrap();

        assert!(svc.get_user(&bob.id).is_err());
        assert!(svc.find_user_by_username("bob").unwrap().is_none());
        // No orphan edges remain in either direction.
        assert_eq!(svc.following_count(&alice.id).unwrap(), 0);
        assert_eq!(svc.followers_count(&alice.id).unwrap(), 0);
        assert!(svc.like_count(&post.post_ref).is_err());
        // The like edge table no longer references the dead post.
        let rows = svc
            .sql
            .query("SELECT COUNT(*) AS cnt FROM post_likes", &[])
            .unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(0));
        // Alice is untouched.
        assert!(svc.get_user(&alice.id).is_ok());
    }
}
