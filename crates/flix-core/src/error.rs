//! Unified error types for all layers of the catalogue.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Flix.
///
/// Lookups never use [`FlixError::NotFound`] for a missing row; they return
/// `Ok(None)`. `NotFound` is raised by writes whose referenced entity is
/// missing (a review for an unknown movie, a watchlist for an unknown user).
#[derive(Error, Debug)]
pub enum FlixError {
    // ============ Domain Errors ============
    /// Referenced resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (e.g., duplicate entry)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A lookup that must match at most one row matched several.
    #[error("Ambiguous match: {matches} {resource_type} rows for key {key}")]
    AmbiguousMatch {
        resource_type: &'static str,
        key: String,
        matches: usize,
    },

    /// Invalid credentials
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ============ Mapping Errors ============
    /// The model-to-table mapping was registered twice without a clear.
    #[error("Mapping already registered; clear it before registering again")]
    MappingAlreadyRegistered,

    /// A relational operation was attempted before the mapping was registered.
    #[error("Mapping not registered")]
    MappingNotRegistered,

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Data import error (CSV source)
    #[error("Import error: {0}")]
    Import(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlixError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::InvalidCredentials => 401,
            Self::AmbiguousMatch { .. }
            | Self::MappingAlreadyRegistered
            | Self::MappingNotRegistered
            | Self::Database(_)
            | Self::Configuration(_)
            | Self::Import(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::AmbiguousMatch { .. } => "AMBIGUOUS_MATCH",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MappingAlreadyRegistered | Self::MappingNotRegistered => "MAPPING_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Import(_) => "IMPORT_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for FlixError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return Self::Conflict(db_err.message().to_string());
                }
                if let Some(code) = db_err.code() {
                    // SQLite primary key / unique, MySQL duplicate entry
                    if code == "1555" || code == "2067" || code == "1062" {
                        return Self::Conflict(db_err.message().to_string());
                    }
                }
                Self::Database(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FlixError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
    /// Request ID for correlating logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `FlixError`.
    ///
    /// Server-side faults are reported with a generic message so storage
    /// details never leak to clients.
    #[must_use]
    pub fn from_error(error: &FlixError) -> Self {
        let message = if error.status_code() >= 500 {
            "An unexpected error occurred".to_string()
        } else {
            error.to_string()
        };
        Self {
            code: error.error_code().to_string(),
            message,
            details: None,
            request_id: None,
        }
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&FlixError> for ErrorResponse {
    fn from(error: &FlixError) -> Self {
        Self::from_error(error)
    }
}
