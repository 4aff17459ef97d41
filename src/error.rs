pub type ArtgenResult<T> = Result<T, ArtgenError>;

/// Crate-wide error taxonomy.
///
/// Rolling back an empty history is deliberately not represented here: it is
/// a defined no-op, not a failure.
#[derive(thiserror::Error, Debug)]
pub enum ArtgenError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ArtgenError {
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}
