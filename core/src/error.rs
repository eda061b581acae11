use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Draw attempted with nothing remaining. Session and lifetime
    /// control flow must make this unreachable; seeing it means a
    /// logic defect, not bad input.
    #[error("Draw attempted on an empty inventory")]
    EmptyInventory,

    /// Recoverable: report "not enough data" instead of crashing.
    #[error("Insufficient data for {context}: need at least {needed} samples, got {got}")]
    InsufficientData {
        context: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
