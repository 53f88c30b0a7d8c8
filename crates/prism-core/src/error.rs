use std::fmt;

/// Failure taxonomy for the projection pipeline.
///
/// Benign empty results (empty ranking, empty pixel filter) are resolved
/// internally via documented fallbacks and never surface here.
#[derive(Debug)]
pub enum EngineError {
    /// Operation invoked before the engine was bound to a dataset.
    NotLoaded,
    /// The backing dataset could not be resolved or decoded.
    DatasetUnavailable(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotLoaded => {
                write!(f, "engine not loaded: call load() before projecting")
            }
            EngineError::DatasetUnavailable(msg) => write!(f, "dataset unavailable: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

pub type Result<T> = std::result::Result<T, EngineError>;
