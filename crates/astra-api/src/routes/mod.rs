pub mod auth;
pub mod feedback;
pub mod health;
pub mod posts;
