use serde::{Deserialize, Serialize};

use picstream_core::rfc3339_to_unix;

/// Maximum caption length, in characters.
pub const MAX_CAPTION_LEN: usize = 20;

/// A post. Each post carries exactly one image, stored in the blob store
/// under `image_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Internal identifier (UUIDv4, no dashes).
    pub id: String,

    /// Public reference token. Unique, generated once at creation, never
    /// changes. Clients address posts by this, not by `id`.
    pub post_ref: String,

    /// Id of the authoring user.
    pub author_id: String,

    /// Short caption shown with the image.
    pub caption: String,

    /// Blob store key of the uploaded image.
    pub image_key: String,

    /// MIME type of the uploaded image.
    pub content_type: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// API view of a post.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post_ref: String,
    pub created: String,
    pub created_timestamp: i64,
    pub author: String,
    pub caption: String,
    pub image_url: String,
    pub likes: usize,
}

impl PostView {
    pub fn build(post: Post, author: String, likes: usize) -> Self {
        PostView {
            created_timestamp: rfc3339_to_unix(&post.created_at),
            created: post.created_at,
            post_ref: post.post_ref,
            author,
            caption: post.caption,
            image_url: format!("/media/{}", post.image_key),
            likes,
        }
    }
}

/// Feed entry: one followed user's image.
#[derive(Debug, Clone, Serialize)]
pub struct FeedImage {
    pub caption: String,
    pub image_url: String,
    pub created: String,
}

impl FeedImage {
    pub fn build(post: Post) -> Self {
        FeedImage {
            caption: post.caption,
            image_url: format!("/media/{}", post.image_key),
            created: post.created_at,
        }
    }
}
