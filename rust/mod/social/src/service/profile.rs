//! Follow-graph operations on a user's profile.
//!
//! Every mutation runs the same pipeline: resolve the target (missing
//! targets short-circuit before validation), run the self-reference
//! guard, then commit the edge. The guard failure surfaces as
//! [`SocialError::SelfFollow`] and never reaches storage.

use crate::service::{guard, SocialError, SocialService};

impl SocialService {
    /// Follow another user by username. Idempotent if already following.
    pub fn follow(&self, actor_id: &str, target_username: &str) -> Result<(), SocialError> {
        let target = self.get_user_by_username(target_username)?;
        guard::ensure_distinct(actor_id, &[target.id.as_str()])
            .map_err(|_| SocialError::SelfFollow)?;
        self.follows.add(actor_id, &target.id)
    }

    /// Follow several users at once. If any target is the actor, the
    /// whole batch is rejected and no edge is committed.
    pub fn follow_many(&self, actor_id: &str, usernames: &[&str]) -> Result<(), SocialError> {
        let mut target_ids = Vec::with_capacity(usernames.len());
        for username in usernames {
            target_ids.push(self.get_user_by_username(username)?.id);
        }
        guard::ensure_distinct(actor_id, &target_ids).map_err(|_| SocialError::SelfFollow)?;
        self.follows.add_many(actor_id, &target_ids)
    }

    /// Stop following a user. Idempotent: no error if not following.
    pub fn unfollow(&self, actor_id: &str, target_username: &str) -> Result<(), SocialError> {
        let target = self.get_user_by_username(target_username)?;
        self.follows.remove(actor_id, &target.id)
    }

    /// Does `actor_id` follow `target_id`?
    pub fn follows(&self, actor_id: &str, target_id: &str) -> Result<bool, SocialError> {
        self.follows.contains(actor_id, target_id)
    }

    /// Number of users this user follows.
    pub fn following_count(&self, user_id: &str) -> Result<usize, SocialError> {
        self.follows.count(user_id)
    }

    /// Number of users following this user (inverse lookup).
    pub fn followers_count(&self, user_id: &str) -> Result<usize, SocialError> {
        self.follows.count_inverse(user_id)
    }

    /// Ids of all users this user follows, oldest edge first.
    pub fn following_ids(&self, user_id: &str) -> Result<Vec<String>, SocialError> {
        self.follows.targets(user_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{CreateUser, User};
    use crate::service::{SocialConfig, SocialError, SocialService};
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
    fn test_follow_user() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");

        svc.follow(&alice.id, "bob").unwrap();

        assert!(svc.follows(&alice.id, &bob.id).unwrap());
        assert!(!svc.follows(&bob.id, &alice.id).unwrap());
        assert_eq!(svc.following_count(&alice.id).unwrap(), 1);
        assert_eq!(svc.followers_count(&bob.id).unwrap(), 1);
    }

    #[test]
    fn test_follow_self_rejected() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");

        let err = svc.follow(&alice.id, "alice").unwrap_err();
        assert!(matches!(err, SocialError::SelfFollow));
        // Nothing committed.
        assert_eq!(svc.following_count(&alice.id).unwrap(), 0);
        assert_eq!(svc.followers_count(&alice.id).unwrap(), 0);
    }

    #[test]
    fn test_follow_unknown_user_is_not_found() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");

        let err = svc.follow(&alice.id, "nobody").unwrap_err();
        assert!(matches!(err, SocialError::NotFound(_)));
    }

    #[test]
    fn test_follow_already_followed_is_idempotent() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");

        svc.follow(&alice.id, "bob").unwrap();
        svc.follow(&alice.id, "bob").unwrap();
        svc.follow(&alice.id, "bob").unwrap();

        assert_eq!(svc.following_count(&alice.id).unwrap(), 1);
        assert_eq!(svc.followers_count(&bob.id).unwrap(), 1);
    }

    #[test]
    fn test_unfollow_round_trips() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");

        svc.follow(&alice.id, "bob").unwrap();
        svc.unfollow(&alice.id, "bob").unwrap();

        assert!(!svc.follows(&alice.id, &bob.id).unwrap());
        assert_eq!(svc.following_count(&alice.id).unwrap(), 0);
        assert_eq!(svc.followers_count(&bob.id).unwrap(), 0);
    }

    #[test]
    fn test_unfollow_not_followed_is_noop() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");

        svc.unfollow(&alice.id, "bob").unwrap();

        assert_eq!(svc.following_count(&alice.id).unwrap(), 0);
        assert_eq!(svc.followers_count(&bob.id).unwrap(), 0);
    }

    #[test]
    fn test_follow_graph_counts() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");
        let carol = register(&svc, "carol");

        // alice → carol; bob → alice, carol.
        svc.follow(&alice.id, "carol").unwrap();
        svc.follow(&bob.id, "alice").unwrap();
        svc.follow(&bob.id, "carol").unwrap();

        assert_eq!(svc.following_count(&alice.id).unwrap(), 1);
        assert_eq!(svc.following_count(&bob.id).unwrap(), 2);
        assert_eq!(svc.following_count(&carol.id).unwrap(), 0);

        assert_eq!(svc.followers_count(&alice.id).unwrap(), 1);
        assert_eq!(svc.followers_count(&bob.id).unwrap(), 0);
        assert_eq!(svc.followers_count(&carol.id).unwrap(), 2);

        assert!(svc.follows(&alice.id, &carol.id).unwrap());
        assert!(svc.follows(&bob.id, &alice.id).unwrap());
        assert!(svc.follows(&bob.id, &carol.id).unwrap());
        assert!(!svc.follows(&alice.id, &bob.id).unwrap());
        assert!(!svc.follows(&carol.id, &alice.id).unwrap());
        assert!(!svc.follows(&carol.id, &bob.id).unwrap());
    }

    #[test]
    fn test_follow_many() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        register(&svc, "bob");
        register(&svc, "carol");

        svc.follow_many(&alice.id, &["bob", "carol"]).unwrap();
        assert_eq!(svc.following_count(&alice.id).unwrap(), 2);
    }

    #[test]
    fn test_follow_many_with_self_rejects_whole_batch() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        register(&svc, "bob");
        register(&svc, "carol");

        let err = svc
            .follow_many(&alice.id, &["bob", "alice", "carol"])
            .unwrap_err();
        assert!(matches!(err, SocialError::SelfFollow));
        // Atomic rejection: not even the valid targets were committed.
        assert_eq!(svc.following_count(&alice.id).unwrap(), 0);
    }

    #[test]
    fn test_never_in_own_following_set() {
        let (_tmp, svc) = test_service();
        let alice = register(&svc, "alice");
        register(&svc, "bob");

        svc.follow(&alice.id, "bob").unwrap();
        let _ = svc.follow(&alice.id, "alice");
        let _ = svc.follow_many(&alice.id, &["alice", "bob"]);
        svc.unfollow(&alice.id, "bob").unwrap();
        svc.follow(&alice.id, "bob").unwrap();

        assert!(!svc
            .following_ids(&alice.id)
            .unwrap()
            .contains(&alice.id));
    }
}
