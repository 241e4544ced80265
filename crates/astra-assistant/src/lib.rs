pub mod assistant;
pub mod error;
pub mod prompt;
pub mod query;
pub mod retrieval;

pub use assistant::{Answerer, Assistant, FragmentStream, APOLOGY_REPLY, INVALID_QUERY_REPLY};
pub use error::{AssistantError, Result};
pub use prompt::{Persona, PromptComposer};
pub use query::Query;
pub use retrieval::{RetrievalFormatter, RetrievalLimits, RetrievedCorpus, NO_POSTS_SENTINEL};
