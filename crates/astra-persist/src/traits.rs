use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Feedback, NewPost, Post, PostUpdate};

/// Storage operations for blog posts
///
/// Implementations provide backend-specific CRUD. `list_posts` returns every
/// post in the backend's natural iteration order (oldest first).
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, oldest first
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Newest posts first, optionally capped
    async fn list_recent(&self, limit: Option<usize>) -> Result<Vec<Post>>;

    async fn get_post(&self, id: &str) -> Result<Option<Post>>;

    async fn create_post(&self, post: NewPost, author: &str) -> Result<Post>;

    /// Replace the editable fields; fails with `PostNotFound` if `id` is unknown
    async fn update_post(&self, id: &str, update: PostUpdate) -> Result<Post>;

    /// Fails with `PostNotFound` if `id` is unknown
    async fn delete_post(&self, id: &str) -> Result<()>;
}

/// Storage for visitor feedback
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn submit_feedback(&self, email: &str, message: &str) -> Result<Feedback>;
}
