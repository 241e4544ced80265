pub mod buffer_utils;
pub mod config;
pub mod gemini;
pub mod streaming;
pub mod traits;

pub use traits::{GenerateRequest, GenerationClient, GenerationOptions};

pub use buffer_utils::CircularLineBuffer;
pub use config::{ClientFactory, GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
pub use gemini::GeminiClient;
pub use streaming::{EventStream, StreamEvent};
