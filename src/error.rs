use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures at the edges of the engine: embedded corpora and stored defaults.
///
/// Session operations themselves never fail; see [`crate::engine::TypingSession`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("corpus file not embedded: {0}")]
    MissingCorpus(String),

    #[error("corpus file {file} is not valid: {source}")]
    Corpus {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to write config to {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
