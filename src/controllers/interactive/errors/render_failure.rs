use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("render {generation} failed: {message}")]
pub struct RenderFailure {
    pub generation: u64,
    pub message: String,
}
