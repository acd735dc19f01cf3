//! Unit error types.

/// Errors a unit reports from its factory or lifecycle hooks.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    /// Construction or the initialization hook failed.
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// The teardown hook failed.
    #[error("Teardown failed: {0}")]
    Teardown(String),

    /// The unit panicked. Caught inside the unit binary.
    #[error("panicked: {0}")]
    Panicked(String),

    /// Custom error
    #[error("{0}")]
    Other(String),
}

impl UnitError {
    pub fn initialization(msg: impl Into<String>) -> Self {
        UnitError::Initialization(msg.into())
    }

    pub fn teardown(msg: impl Into<String>) -> Self {
        UnitError::Teardown(msg.into())
    }
}

/// Unit result type
pub type UnitResult<T> = Result<T, UnitError>;
