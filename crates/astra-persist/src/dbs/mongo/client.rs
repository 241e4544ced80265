use async_trait::async_trait;
use mongodb::{bson::oid::ObjectId, Client};

use crate::dbs::mongo::repositories::{MongoFeedbackRepository, MongoPostRepository};
use crate::error::{PersistError, Result};
use crate::models::{Feedback, NewPost, Post, PostUpdate};
use crate::traits::{FeedbackRepository, PostRepository};

pub struct MongoStore {
    post_repo: MongoPostRepository,
    feedback_repo: MongoFeedbackRepository,
}

impl MongoStore {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self {
            post_repo: MongoPostRepository::new(&client, database),
            feedback_repo: MongoFeedbackRepository::new(&client, database),
        })
    }
}

fn parse_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|e| PersistError::InvalidObjectId(e.to_string()))
}

#[async_trait]
impl PostRepository for MongoStore {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let posts = self.post_repo.list(1, None).await?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    async fn list_recent(&self, limit: Option<usize>) -> Result<Vec<Post>> {
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));
        let posts = self.post_repo.list(-1, limit).await?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        // Ids that are not ObjectIds cannot exist in this backend
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        Ok(self.post_repo.get(object_id).await?.map(Post::from))
    }

    async fn create_post(&self, post: NewPost, author: &str) -> Result<Post> {
        Ok(self.post_repo.insert(post, author).await?.into())
    }

    async fn update_post(&self, id: &str, update: PostUpdate) -> Result<Post> {
        Ok(self.post_repo.update(parse_id(id)?, update).await?.into())
    }

    async fn delete_post(&self, id: &str) -> Result<()> {
        self.post_repo.delete(parse_id(id)?).await
    }
}

#[async_trait]
impl FeedbackRepository for MongoStore {
    async fn submit_feedback(&self, email: &str, message: &str) -> Result<Feedback> {
        Ok(self.feedback_repo.insert(email, message).await?.into())
    }
}
