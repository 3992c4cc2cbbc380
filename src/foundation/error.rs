/// Convenience result type used across scrawl.
pub type ScrawlResult<T> = Result<T, ScrawlError>;

/// Top-level error taxonomy used by scene APIs.
///
/// Only structural problems surface here. Unknown attribute keys, unsupported drawing methods
/// and numeric edge cases are absorbed where they happen.
#[derive(thiserror::Error, Debug)]
pub enum ScrawlError {
    /// Invalid user-provided data (dimensions, configuration, constructor input).
    #[error("validation error: {0}")]
    Validation(String),

    /// Registry violations: unknown names, missing owners, empty controllers.
    #[error("registry error: {0}")]
    Registry(String),

    /// Failures raised by a paint engine.
    #[error("render error: {0}")]
    Render(String),

    /// Extension loading failed or exceeded its time budget.
    #[error("load error: {0}")]
    Load(String),

    /// Errors when serializing or deserializing attribute snapshots and configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrawlError {
    /// Build a [`ScrawlError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScrawlError::Registry`] value.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Build a [`ScrawlError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ScrawlError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`ScrawlError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for ScrawlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
