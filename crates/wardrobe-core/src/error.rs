//! Error types for wardrobe.

use thiserror::Error;

/// Result type alias using wardrobe's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for wardrobe operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input failed a domain rule (empty name, nothing selected, missing slot)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Clothing item not found
    #[error("Clothing item not found: {0}")]
    ItemNotFound(uuid::Uuid),

    /// Saved outfit not found
    #[error("Outfit not found: {0}")]
    OutfitNotFound(uuid::Uuid),

    /// The store rejected a write that collides with existing data
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Remote store or blob storage call failed
    #[error("Remote error: {0}")]
    Remote(String),

    /// A request of the same kind is still outstanding
    #[error("Busy: {0}")]
    Busy(String),

    /// Invalid input (caller bug, e.g. an unknown slot key)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error means the referenced record no longer exists.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) | Error::ItemNotFound(_) | Error::OutfitNotFound(_) => true,
            Error::Database(sqlx::Error::RowNotFound) => true,
            _ => false,
        }
    }

    /// Whether the user can act on the error and try again.
    ///
    /// Nothing in the core is fatal to the process; this only separates
    /// user mistakes and transient failures from caller bugs.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::InvalidInput(_) | Error::Internal(_))
    }

    /// Message suitable for showing to the user.
    ///
    /// Store and transport failures collapse into a generic notice; the
    /// detail goes to the logs instead.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::ItemNotFound(_) => "That item no longer exists.".to_string(),
            Error::OutfitNotFound(_) => "That outfit no longer exists.".to_string(),
            Error::NotFound(what) => format!("{} no longer exists.", what),
            Error::Busy(_) => "Still working on the previous request.".to_string(),
            Error::Conflict(_) => "That change conflicts with existing data.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
