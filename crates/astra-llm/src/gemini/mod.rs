mod client;
mod types;

pub use client::GeminiClient;
pub use types::{
    Candidate, GeminiContent, GeminiError, GeminiPart, GeminiRequest, GenerateContentChunk,
    GenerationConfig, PromptFeedback,
};
