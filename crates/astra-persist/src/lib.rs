pub mod builder;
pub mod client;
pub mod dbs;
pub mod error;
pub mod models;
pub mod traits;

pub use builder::{PersistClientBuilder, StorageBackend};
pub use client::PersistClient;
pub use dbs::InMemoryStore;
#[cfg(feature = "mongodb")]
pub use dbs::MongoStore;
pub use error::{PersistError, Result};
pub use models::{Feedback, NewPost, Post, PostUpdate};
pub use traits::{FeedbackRepository, PostRepository};
