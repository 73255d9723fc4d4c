use thiserror::Error;

/// Main error type for the betting coordinator core
#[derive(Error, Debug)]
pub enum ParleyError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Address parsing error: {0}")]
    AddressParsing(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Ledger / contract errors
    #[error("Contract call failed: {0}")]
    ContractCall(String),

    #[error("Unexpected performative: expected {expected}, got {got}")]
    UnexpectedPerformative { expected: String, got: String },

    #[error("Missing response key: {0}")]
    MissingResponseKey(String),

    // Transaction hash construction errors
    #[error("Invalid safe tx hash: {0}")]
    InvalidTxHash(String),

    // Oracle errors
    #[error("Oracle response error: {0}")]
    Oracle(String),

    // Content storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Round coordination errors
    #[error("Agreement not reached: {0}")]
    Agreement(String),

    // State machine errors
    #[error("Invalid stage transition: from {state} on event {event}")]
    InvalidTransition { state: String, event: String },

    #[error("Synchronized field committed twice: {0}")]
    AlreadyCommitted(&'static str),
}

/// Result type alias for ParleyError
pub type Result<T> = std::result::Result<T, ParleyError>;
