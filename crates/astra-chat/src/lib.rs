pub mod decoder;
pub mod session;
pub mod transcript;

pub use decoder::Utf8StreamDecoder;
pub use session::{ChatSession, Exchange};
pub use transcript::{ChatMessage, Transcript, FAILURE_MESSAGE};
