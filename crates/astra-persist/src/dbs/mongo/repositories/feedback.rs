use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::MongoFeedback;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoFeedbackRepository {
    collection: Collection<MongoFeedback>,
}

impl MongoFeedbackRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("feedbacks");
        Self { collection }
    }

    pub async fn insert(&self, email: &str, message: &str) -> Result<MongoFeedback> {
        let feedback = MongoFeedback {
            id: ObjectId::new(),
            email: email.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        };

        self.collection.insert_one(&feedback).await?;
        Ok(feedback)
    }
}
