//! Error types for opening and reading package documents.

use thiserror::Error;
use tower_lsp::lsp_types::Url;

use crate::engine::EngineError;

/// Errors surfaced by [`PackageDocument`](super::PackageDocument) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The location could not be read.
    #[error("failed to read {uri}: {source}")]
    Io {
        uri: Url,
        #[source]
        source: std::io::Error,
    },

    /// The engine rejected the bytes read from the location.
    #[error("{uri} is not a valid package: {reason}")]
    Format { uri: Url, reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("document {0} is disposed")]
    Disposed(Url),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
