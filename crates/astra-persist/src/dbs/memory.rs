use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PersistError, Result};
use crate::models::{normalize_optional, Feedback, NewPost, Post, PostUpdate};
use crate::traits::{FeedbackRepository, PostRepository};

/// Process-local store used for development and tests.
///
/// Posts are kept in insertion order, which is also their creation order.
#[derive(Default)]
pub struct InMemoryStore {
    posts: RwLock<Vec<Post>>,
    feedback: RwLock<Vec<Feedback>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn feedback_count(&self) -> usize {
        self.feedback.read().await.len()
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.read().await.clone())
    }

    async fn list_recent(&self, limit: Option<usize>) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        let limit = limit.unwrap_or(posts.len());
        Ok(posts.iter().rev().take(limit).cloned().collect())
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn create_post(&self, post: NewPost, author: &str) -> Result<Post> {
        let post = Post {
            id: Uuid::new_v4().to_string(),
            title: post.title,
            content: post.content,
            author: author.to_string(),
            reference: normalize_optional(post.reference),
            image: normalize_optional(post.image),
            created_at: Utc::now(),
        };

        self.posts.write().await.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: &str, update: PostUpdate) -> Result<Post> {
        let mut posts = self.posts.write().await;
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PersistError::PostNotFound(id.to_string()))?;

        post.title = update.title;
        post.content = update.content;
        post.reference = normalize_optional(update.reference);
        post.image = normalize_optional(update.image);

        Ok(post.clone())
    }

    async fn delete_post(&self, id: &str) -> Result<()> {
        let mut posts = self.posts.write().await;
        let index = posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PersistError::PostNotFound(id.to_string()))?;

        posts.remove(index);
        Ok(())
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryStore {
    async fn submit_feedback(&self, email: &str, message: &str) -> Result<Feedback> {
        let feedback = Feedback {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        };

        self.feedback.write().await.push(feedback.clone());
        Ok(feedback)
    }
}
