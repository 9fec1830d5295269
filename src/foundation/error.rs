/// Convenience result type used across the crate.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Top-level error taxonomy used by the execution core.
///
/// Every error is fatal to the current program run; there is no local
/// recovery or partial output.
#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    /// A name was used that does not resolve to a definition, or a clear
    /// command targeted something never shown.
    #[error("reference error: {0}")]
    Reference(String),

    /// A statement or value kind appeared where a specific kind was required.
    #[error("structural error: {0}")]
    Structure(String),

    /// Incompatible value kinds were combined or transformed.
    #[error("type error: {0}")]
    Type(String),

    /// The scene dependency graph could not be resolved (cycle or missing
    /// dependency detected by the stalled worklist).
    #[error("graph error: {0}")]
    Graph(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScriptError {
    /// Build a [`ScriptError::Reference`] value.
    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference(msg.into())
    }

    /// Build a [`ScriptError::Structure`] value.
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }

    /// Build a [`ScriptError::Type`] value.
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::Type(msg.into())
    }

    /// Build a [`ScriptError::Graph`] value.
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
