//! Error types for mergebook.
//!
//! All errors are strongly typed using thiserror. The taxonomy is layered:
//! validation errors come from the ingestion layer, service errors from the
//! remote contacts collaborator, and store errors from submission
//! persistence. `MergeError` is the top-level type callers match on.

use thiserror::Error;

use crate::submission::SubmissionId;

/// Input-validation errors raised while ingesting an uploaded payload.
///
/// These are surfaced before any per-contact processing starts; a merge
/// never runs over a partially validated contact list.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Malformed contact payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Invalid handle: '{handle}' (word characters only)")]
    InvalidHandle {
        handle: String,
    },

    #[error("Contact payload is empty")]
    EmptyPayload,
}

/// Errors from the remote contacts service.
///
/// These propagate to the caller unchanged; the core never retries a
/// collaborator call.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The session token is missing or expired. Carries the URL the caller
    /// should redirect to when the service provides one.
    #[error("Authorization required")]
    AuthRequired {
        authorization_url: Option<String>,
    },

    #[error("Connection failed: {message}")]
    ConnectionFailed {
        message: String,
    },

    #[error("Server error (code {code}): {message}")]
    ServerError {
        code: u16,
        message: String,
    },

    #[error("Invalid service response: {message}")]
    InvalidResponse {
        message: String,
    },

    #[error("Failed to create group '{name}': {message}")]
    GroupCreationFailed {
        name: String,
        message: String,
    },

    #[error("Service backend error: {0}")]
    Backend(String),
}

/// Errors from the submission store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Submission not found: {0}")]
    SubmissionNotFound(SubmissionId),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Top-level error type for merge operations.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl MergeError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a service error.
    #[must_use]
    pub const fn is_service(&self) -> bool {
        matches!(self, Self::Service(_))
    }

    /// Returns true if the caller should re-run authorization before
    /// retrying the request.
    #[must_use]
    pub const fn is_auth_required(&self) -> bool {
        matches!(self, Self::Service(ServiceError::AuthRequired { .. }))
    }
}

/// Result type alias for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;
