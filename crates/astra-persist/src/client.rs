use std::sync::Arc;

use crate::builder::PersistClientBuilder;
use crate::dbs::InMemoryStore;
use crate::traits::{FeedbackRepository, PostRepository};

/// Handle to the configured storage backend
#[derive(Clone)]
pub struct PersistClient {
    posts: Arc<dyn PostRepository>,
    feedback: Arc<dyn FeedbackRepository>,
}

impl PersistClient {
    pub fn new(posts: Arc<dyn PostRepository>, feedback: Arc<dyn FeedbackRepository>) -> Self {
        Self { posts, feedback }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }

    /// Use one store for both posts and feedback
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: PostRepository + FeedbackRepository + 'static,
    {
        Self::new(store.clone(), store)
    }

    pub fn builder() -> PersistClientBuilder {
        PersistClientBuilder::new()
    }

    pub fn posts(&self) -> Arc<dyn PostRepository> {
        Arc::clone(&self.posts)
    }

    pub fn feedback(&self) -> Arc<dyn FeedbackRepository> {
        Arc::clone(&self.feedback)
    }
}
