use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ArenaError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing edge notifier")]
    MissingNotifier,
    #[error("missing field coil")]
    MissingField,
    #[error("missing saber lamp")]
    MissingSaber,
    #[error("missing knob lamp")]
    MissingKnobLamp,
    #[error("missing entropy source")]
    MissingEntropy,
    #[error("missing target pattern")]
    MissingTarget,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

/// Map a boxed hardware error from a seam call into the typed taxonomy.
pub(crate) fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> ArenaError {
    ArenaError::Hardware(e.to_string())
}
