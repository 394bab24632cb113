//! Error types for docorder library.

use std::io;
use thiserror::Error;

/// Result type alias for docorder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while transforming a document tree.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input could not be read as, or written to, JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A geometric transform received a coordinate or angle it cannot use.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A relationship edge points at a block id that does not exist.
    #[error("Dangling relationship: block {from} references missing block {to}")]
    DanglingRelationship {
        /// Id of the block owning the edge
        from: String,
        /// Id the edge points at
        to: String,
    },

    /// A block has no usable geometry where ordering needs it.
    ///
    /// The resolver recovers from this locally; it is only logged.
    #[error("Block {0} has no usable geometry")]
    MissingGeometry(String),

    /// A caller-supplied block id is not part of the document.
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    /// A caller-supplied id names a block that is not a PAGE.
    #[error("Block {0} is not a page")]
    NotAPage(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
