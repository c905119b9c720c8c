use thiserror::Error;

/// Error taxonomy for lifecycle governance operations.
///
/// `NotFound` and `Validation` are propagated unchanged to the caller so an
/// edge layer can translate them (404 / 400). The evaluation path never
/// produces errors; a malformed or incomplete context degrades to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

impl FlagError {
    pub fn not_found(what: impl Into<String>) -> Self {
        FlagError::NotFound(what.into())
    }

    pub fn validation(why: impl Into<String>) -> Self {
        FlagError::Validation(why.into())
    }
}
