//! Error types for the RP helpdesk bot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dialog error: {0}")]
    Dialog(#[from] DialogError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Dialog engine errors.
///
/// Steps themselves never fail; these cover construction mistakes and
/// bookkeeping faults in the persisted cursor.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Invalid dialog definition: {0}")]
    Configuration(String),

    #[error("Dialog {name} is already registered")]
    Duplicate { name: String },

    #[error("Dialog {name} is not registered")]
    UnknownDialog { name: String },

    #[error("Turn exceeded {limit} steps without suspending")]
    StepBudgetExceeded { limit: usize },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
