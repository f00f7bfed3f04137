//! Post operations: creation, the like edge-set, and the list queries.
//!
//! Likes run the same pipeline as follows: resolve the post (missing
//! refs short-circuit), guard the actor against the post's author, then
//! commit the edge. Guard failure surfaces as [`SocialError::SelfLike`].

use picstream_core::{new_id, now_rfc3339, ListParams, ListResult};
use picstream_sql::Value;

use crate::model::{FeedImage, Post, PostView, MAX_CAPTION_LEN};
use crate::service::{guard, SocialError, SocialService};

impl SocialService {
    /// Create a post with one image. The reference token is generated
    /// here and never changes; clients address the post by it.
    pub fn create_post(
        &self,
        author_id: &str,
        caption: &str,
        content_type: &str,
        image: Vec<u8>,
    ) -> Result<Post, SocialError> {
        if caption.is_empty() {
            return Err(SocialError::Validation("caption must not be empty".into()));
        }
        if caption.chars().count() > MAX_CAPTION_LEN {
            return Err(SocialError::Validation(format!(
                "caption longer than {} characters",
                MAX_CAPTION_LEN
            )));
        }
        if image.is_empty() {
            return Err(SocialError::Validation("image must not be empty".into()));
        }
        // The author comes from the authenticated request, but a stale
        // token could outlive account deletion.
        let author = self.get_user(author_id)?;

        let post_ref = new_id();
        let post = Post {
            id: new_id(),
            post_ref: post_ref.clone(),
            author_id: author.id,
            caption: caption.to_string(),
            image_key: format!("posts/{}", post_ref),
            content_type: content_type.to_string(),
            created_at: now_rfc3339(),
        };

        self.blob
            .put(&post.image_key, &image)
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        let inserted = self.insert_record(
            "posts",
            &post.id,
            &post,
            &[
                ("post_ref", Value::Text(post.post_ref.clone())),
                ("author_id", Value::Text(post.author_id.clone())),
                ("image_key", Value::Text(post.image_key.clone())),
                ("created_at", Value::Text(post.created_at.clone())),
            ],
        );
        if let Err(e) = inserted {
            let _ = self.blob.delete(&post.image_key);
            return Err(e);
        }

        Ok(post)
    }

    /// Get a post by its public reference token, or NotFound.
    pub fn get_post_by_ref(&self, post_ref: &str) -> Result<Post, SocialError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM posts WHERE post_ref = ?1",
                &[Value::Text(post_ref.to_string())],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| SocialError::NotFound(format!("post '{}' not found", post_ref)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| SocialError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| SocialError::Internal(e.to_string()))
    }

    /// Like a post. Idempotent if already liked.
    pub fn like(&self, actor_id: &str, post_ref: &str) -> Result<(), SocialError> {
        let post = self.get_post_by_ref(post_ref)?;
        guard::ensure_distinct(&post.author_id, &[actor_id])
            .map_err(|_| SocialError::SelfLike)?;
        self.likes.add(&post.id, actor_id)
    }

    /// Remove a like. Idempotent: no error if not liked.
    pub fn unlike(&self, actor_id: &str, post_ref: &str) -> Result<(), SocialError> {
        let post = self.get_post_by_ref(post_ref)?;
        self.likes.remove(&post.id, actor_id)
    }

    /// Does `user_id` like this post?
    pub fn liked_by(&self, post_ref: &str, user_id: &str) -> Result<bool, SocialError> {
        let post = self.get_post_by_ref(post_ref)?;
        self.likes.contains(&post.id, user_id)
    }

    /// Number of users that like this post.
    pub fn like_count(&self, post_ref: &str) -> Result<usize, SocialError> {
        let post = self.get_post_by_ref(post_ref)?;
        self.likes.count(&post.id)
    }

    /// All posts, most-liked first (ties broken by recency).
    pub fn list_posts(&self, params: &ListParams) -> Result<ListResult<PostView>, SocialError> {
        let count_rows = self
            .sql
            .query("SELECT COUNT(*) AS cnt FROM posts", &[])
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let rows = self
            .sql
            .query(
                "SELECT p.data AS data, u.username AS author, COUNT(l.user_id) AS likes
                 FROM posts p
                 JOIN users u ON u.id = p.author_id
                 LEFT JOIN post_likes l ON l.post_id = p.id
                 GROUP BY p.id
                 ORDER BY likes DESC, p.created_at DESC
                 LIMIT ?1 OFFSET ?2",
                &[
                    Value::Integer(params.limit as i64),
                    Value::Integer(params.offset as i64),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| SocialError::Internal("missing data column".into()))?;
            let post: Post =
                serde_json::from_str(data).map_err(|e| SocialError::Internal(e.to_string()))?;
            let author = row
                .get_str("author")
                .ok_or_else(|| SocialError::Internal("missing author column".into()))?
                .to_string();
            let likes = row.get_i64("likes").unwrap_or(0) as usize;
            items.push(PostView::build(post, author, likes));
        }

        Ok(ListResult { items, total })
    }

    /// Images from users the actor follows, oldest first.
    pub fn list_feed(&self, actor_id: &str) -> Result<Vec<FeedImage>, SocialError> {
        let rows = self
            .sql
            .query(
                "SELECT p.data AS data
                 FROM posts p
                 JOIN follows f ON f.followed_id = p.author_id
                 WHERE f.follower_id = ?1
                 ORDER BY p.created_at ASC",
                &[Value::Text(actor_id.to_string())],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| SocialError::Internal("missing data column".into()))?;
            let post: Post =
                serde_json::from_str(data).map_err(|e| SocialError::Internal(e.to_string()))?;
            items.push(FeedImage::build(post));
        }
        Ok(items)
    }

    /// Raw image bytes + MIME type for media serving.
    pub fn get_image(&self, key: &str) -> Result<(Vec<u8>, String), SocialError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM posts WHERE image_key = ?1",
                &[Value::Text(key.to_string())],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| SocialError::NotFound(format!("image '{}' not found", key)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| SocialError::Internal("missing data column".into()))?;
        let post: Post =
            serde_json::from_str(data).map_err(|e| SocialError::Internal(e.to_string()))?;

        let bytes = self
            .blob
            .get(key)
            .map_err(|e| SocialError::Storage(e.to_string()))?
            .ok_or_else(|| SocialError::NotFound(format!("image '{}' not found", key)))?;
        Ok((bytes, post.content_type))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{CreateUser, User};
    use crate::service::{SocialConfig, SocialError, SocialService};
    use std::sync::Arc;

    use picstream_blob::FileStore;
    use picstream_core::ListParams;
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

    fn post(svc: &SocialService, author: &User, caption: &str) -> crate::model::Post {
        svc.create_post(&author.id, caption, "image/png", b"fake png".to_vec())
            .unwrap()
    }

    #[test]
    fn test_create_post() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");

        let created = post(&svc, &alice, "sunset");
        assert_eq!(created.post_ref.len(), 32);
        assert_eq!(created.caption, "sunset");
        assert_eq!(created.image_key, format!("posts/{}", created.post_ref));

        let (bytes, content_type) = svc.get_image(&created.image_key).unwrap();
        assert_eq!(bytes, b"fake png");
        assert_eq!(content_type, "image/png");
    }

    #[test]
    fn test_caption_bounds() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");

        let at_limit = "x".repeat(20);
        assert!(svc
            .create_post(&alice.id, &at_limit, "image/png", b"p".to_vec())
            .is_ok());

        let too_long = "x".repeat(21);
        let err = svc
            .create_post(&alice.id, &too_long, "image/png", b"p".to_vec())
            .unwrap_err();
        assert!(matches!(err, SocialError::Validation(_)));

        let err = svc
            .create_post(&alice.id, "", "image/png", b"p".to_vec())
            .unwrap_err();
        assert!(matches!(err, SocialError::Validation(_)));
    }

    #[test]
    fn test_post_ref_unique_and_stable() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");

        let a = post(&svc, &alice, "one");
        let b = post(&svc, &alice, "two");
        let c = post(&svc, &alice, "three");
        assert_ne!(a.post_ref, b.post_ref);
        assert_ne!(b.post_ref, c.post_ref);
        assert_ne!(a.post_ref, c.post_ref);

        // Stable across reads.
        let again = svc.get_post_by_ref(&a.post_ref).unwrap();
        assert_eq!(again.id, a.id);
        assert_eq!(again.post_ref, a.post_ref);
        let once_more = svc.get_post_by_ref(&a.post_ref).unwrap();
        assert_eq!(once_more.post_ref, a.post_ref);
    }

    #[test]
    fn test_like_and_unlike() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");
        let p = post(&svc, &alice, "pic");

        assert!(!svc.liked_by(&p.post_ref, &bob.id).unwrap());
        svc.like(&bob.id, &p.post_ref).unwrap();
        assert!(svc.liked_by(&p.post_ref, &bob.id).unwrap());
        assert_eq!(svc.like_count(&p.post_ref).unwrap(), 1);

        // Repeated likes don't double count.
        svc.like(&bob.id, &p.post_ref).unwrap();
        assert_eq!(svc.like_count(&p.post_ref).unwrap(), 1);

        svc.unlike(&bob.id, &p.post_ref).unwrap();
        assert!(!svc.liked_by(&p.post_ref, &bob.id).unwrap());
        assert_eq!(svc.like_count(&p.post_ref).unwrap(), 0);

        // Unliking again is a no-op.
        svc.unlike(&bob.id, &p.post_ref).unwrap();
        assert_eq!(svc.like_count(&p.post_ref).unwrap(), 0);
    }

    #[test]
    fn test_like_own_post_rejected() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        let p = post(&svc, &alice, "mine");

        let err = svc.like(&alice.id, &p.post_ref).unwrap_err();
        assert!(matches!(err, SocialError::SelfLike));
        assert_eq!(svc.like_count(&p.post_ref).unwrap(), 0);
        assert!(!svc.liked_by(&p.post_ref, &alice.id).unwrap());
    }

    #[test]
    fn test_like_unknown_post_is_not_found() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");

        let err = svc.like(&alice.id, "no-such-ref").unwrap_err();
        assert!(matches!(err, SocialError::NotFound(_)));
        let err = svc.unlike(&alice.id, "no-such-ref").unwrap_err();
        assert!(matches!(err, SocialError::NotFound(_)));
    }

    #[test]
    fn test_list_posts_ordered_by_likes() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");
        let carol = register(&svc, "carol");

        let one_like = post(&svc, &alice, "one-like");
        let two_likes = post(&svc, &alice, "two-likes");
        let no_likes = post(&svc, &alice, "no-likes");

        svc.like(&bob.id, &one_like.post_ref).unwrap();
        svc.like(&bob.id, &two_likes.post_ref).unwrap();
        svc.like(&carol.id, &two_likes.post_ref).unwrap();

        let list = svc.list_posts(&ListParams::default()).unwrap();
        assert_eq!(list.total, 3);
        let captions: Vec<&str> = list.items.iter().map(|p| p.caption.as_str()).collect();
        assert_eq!(captions, vec!["two-likes", "one-like", "no-likes"]);
        assert_eq!(list.items[0].likes, 2);
        assert_eq!(list.items[0].author, "alice");
        assert!(list.items[0].image_url.starts_with("/media/posts/"));
        assert_eq!(list.items[2].likes, 0);
        assert_eq!(no_likes.post_ref, list.items[2].post_ref);
    }

    #[test]
    fn test_feed_limited_to_following_oldest_first() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");
        let carol = register(&svc, "carol");

        post(&svc, &bob, "first");
        post(&svc, &carol, "not-followed");
        post(&svc, &bob, "second");

        svc.follow(&alice.id, "bob").unwrap();

        let feed = svc.list_feed(&alice.id).unwrap();
        let captions: Vec<&str> = feed.iter().map(|i| i.caption.as_str()).collect();
        assert_eq!(captions, vec!["first", "second"]);

        // Users who follow nobody see an empty feed.
        assert!(svc.list_feed(&bob.id).unwrap().is_empty());
    }

    #[test]
    fn test_get_image_unknown_key() {
        let (_tmp, svc) = test_service();
        let err = svc.get_image("posts/nothing").unwrap_err();
        assert!(matches!(err, SocialError::NotFound(_)));
    }
}
