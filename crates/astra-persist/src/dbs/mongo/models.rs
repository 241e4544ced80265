use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::{Feedback, Post};

/// MongoDB-specific Post model (uses ObjectId)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPost {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// MongoDB-specific Feedback model (uses ObjectId)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoFeedback {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<MongoPost> for Post {
    fn from(post: MongoPost) -> Self {
        Self {
            id: post.id.to_hex(),
            title: post.title,
            content: post.content,
            author: post.author,
            reference: post.reference,
            image: post.image,
            created_at: post.created_at,
        }
    }
}

impl From<MongoFeedback> for Feedback {
    fn from(feedback: MongoFeedback) -> Self {
        Self {
            id: feedback.id.to_hex(),
            email: feedback.email,
            message: feedback.message,
            created_at: feedback.created_at,
        }
    }
}
