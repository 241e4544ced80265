mod feedback;
mod post;

pub use feedback::Feedback;
pub use post::{NewPost, Post, PostUpdate};
pub(crate) use post::normalize_optional;
