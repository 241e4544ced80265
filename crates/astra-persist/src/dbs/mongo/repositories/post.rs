use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::MongoPost;
use crate::error::{PersistError, Result};
use crate::models::{normalize_optional, NewPost, PostUpdate};

#[derive(Clone)]
pub struct MongoPostRepository {
    collection: Collection<MongoPost>,
}

impl MongoPostRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("posts");
        Self { collection }
    }

    /// List posts sorted by creation time (`1` ascending, `-1` descending)
    pub async fn list(&self, direction: i32, limit: Option<i64>) -> Result<Vec<MongoPost>> {
        let mut find = self.collection.find(doc! {}).sort(doc! { "created_at": direction });
        if let Some(limit) = limit {
            find = find.limit(limit);
        }
        let posts = find.await?.try_collect().await?;
        Ok(posts)
    }

    pub async fn get(&self, id: ObjectId) -> Result<Option<MongoPost>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn insert(&self, post: NewPost, author: &str) -> Result<MongoPost> {
        let post = MongoPost {
            id: ObjectId::new(),
            title: post.title,
            content: post.content,
            author: author.to_string(),
            reference: normalize_optional(post.reference),
            image: normalize_optional(post.image),
            created_at: Utc::now(),
        };

        self.collection.insert_one(&post).await?;
        Ok(post)
    }

    pub async fn update(&self, id: ObjectId, update: PostUpdate) -> Result<MongoPost> {
        let update = doc! {
            "$set": {
                "title": update.title,
                "content": update.content,
                "reference": normalize_optional(update.reference),
                "image": normalize_optional(update.image),
            }
        };

        self.collection
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| PersistError::PostNotFound(id.to_hex()))
    }

    pub async fn delete(&self, id: ObjectId) -> Result<()> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(PersistError::PostNotFound(id.to_hex()));
        }
        Ok(())
    }
}
