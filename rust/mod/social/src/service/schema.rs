use picstream_sql::SQLStore;

use crate::service::SocialError;

/// Initialize the SQLite schema for all social resources.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), SocialError> {
    let statements = [
        // Users table: identity + login
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)",

        // Profiles: one row per user, marks follow-capable accounts.
        // The following edge-set hangs off this via the follows table.
        "CREATE TABLE IF NOT EXISTS profiles (
            user_id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",

        // Posts table: one image per post, addressed by post_ref
        "CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            post_ref TEXT NOT NULL UNIQUE,
            author_id TEXT NOT NULL,
            image_key TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_posts_ref ON posts(post_ref)",
        "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)",
        "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_posts_image_key ON posts(image_key)",

        // Follows: directed user-follows-user edges.
        // Pair uniqueness via the composite primary key.
        "CREATE TABLE IF NOT EXISTS follows (
            follower_id TEXT NOT NULL,
            followed_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (follower_id, followed_id),
            FOREIGN KEY (follower_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (followed_id) REFERENCES users(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_follows_followed ON follows(followed_id)",

        // Post likes: directed post-liked-by-user edges.
        "CREATE TABLE IF NOT EXISTS post_likes (
            post_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (post_id, user_id),
            FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_post_likes_user ON post_likes(user_id)",

        // Sessions table: JWT issuance records
        "CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            revoked INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            issued_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| SocialError::Storage(e.to_string()))?;
    }

    Ok(())
}
