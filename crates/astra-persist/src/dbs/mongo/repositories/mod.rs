pub mod feedback;
pub mod post;

pub use feedback::MongoFeedbackRepository;
pub use post::MongoPostRepository;
