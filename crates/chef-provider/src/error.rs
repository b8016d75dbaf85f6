//! Provider error types
//!
//! One error enum for the whole reconciliation path, classified so the
//! controller can tell a missing remote entity apart from a real failure.

use thiserror::Error;

use crate::entity::EntityKind;
use crate::schema::FieldKind;

/// Error that can occur while reconciling a resource.
#[derive(Debug, Error)]
pub enum ProviderError {
    // Declared-record errors (caller must fix the input)
    /// A JSON text field could not be decoded into an object.
    #[error("{field}: {source}")]
    FieldDecode {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// A field holds a value of the wrong kind.
    #[error("field '{field}' must be {expected}")]
    FieldType { field: String, expected: FieldKind },

    /// A required field is absent.
    #[error("field '{field}' is required")]
    MissingField { field: String },

    /// A field the resource schema does not declare.
    #[error("field '{field}' is not declared by {resource}")]
    UnknownField { field: String, resource: String },

    /// A field value is well-typed but not acceptable.
    #[error("invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },

    // Lifecycle errors
    /// The operation needs an identity key and the record has none.
    #[error("{resource} has no identity key")]
    MissingIdentity { resource: String },

    /// Create was called on a record that is already present.
    #[error("{resource} '{id}' already has an identity key")]
    IdentityAlreadySet { resource: String, id: String },

    // Remote errors
    /// The remote server has no such entity.
    #[error("{kind} '{name}' not found")]
    RemoteNotFound { kind: EntityKind, name: String },

    /// The remote server answered with a failure status.
    #[error("remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The request exceeded the configured timeout.
    #[error("request timed out after {timeout_secs} seconds")]
    RequestTimeout { timeout_secs: u64 },

    // Configuration errors
    /// Provider configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    // Internal errors
    /// A remote entity could not be serialized back into declared form.
    #[error("serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl ProviderError {
    /// Whether the remote server reported the target as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::RemoteNotFound { .. })
    }

    /// Whether the error came from the remote side rather than the input.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ProviderError::RemoteNotFound { .. }
                | ProviderError::Remote { .. }
                | ProviderError::Transport { .. }
                | ProviderError::RequestTimeout { .. }
        )
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ProviderError::FieldDecode { .. } => "FIELD_DECODE",
            ProviderError::FieldType { .. } => "FIELD_TYPE",
            ProviderError::MissingField { .. } => "MISSING_FIELD",
            ProviderError::UnknownField { .. } => "UNKNOWN_FIELD",
            ProviderError::InvalidField { .. } => "INVALID_FIELD",
            ProviderError::MissingIdentity { .. } => "MISSING_IDENTITY",
            ProviderError::IdentityAlreadySet { .. } => "IDENTITY_ALREADY_SET",
            ProviderError::RemoteNotFound { .. } => "REMOTE_NOT_FOUND",
            ProviderError::Remote { .. } => "REMOTE_ERROR",
            ProviderError::Transport { .. } => "TRANSPORT_ERROR",
            ProviderError::RequestTimeout { .. } => "REQUEST_TIMEOUT",
            ProviderError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            ProviderError::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }

    // Convenience constructors

    /// Create a not-found error for the given entity.
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        ProviderError::RemoteNotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        ProviderError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transport error with source.
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ProviderError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ProviderError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a serialization error with source.
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        ProviderError::Serialization {
            message: message.into(),
            source: Some(source),
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
