use astra_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Error Searching Posts")]
    SearchFailed(#[source] PersistError),

    #[error("Generation failed: {0}")]
    Generation(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AssistantError>;
