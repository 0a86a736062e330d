//! Contract error types for the organization registry
//!
//! These errors are transport-agnostic and used for inter-module communication.

use uuid::Uuid;

/// Organization registry domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Organization (or other resource) not found
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource type (organization, member, document)
        resource: String,
        /// Resource identifier
        id: String,
    },
    /// Organization is already in normalized format
    #[error("organization {organization_id} is already normalized")]
    AlreadyNormalized { organization_id: Uuid },
    /// Organization is still in legacy format
    #[error("organization {organization_id} is not normalized")]
    NotNormalized { organization_id: Uuid },
    /// Invalid request parameters
    #[error("Validation error: {message}")]
    Validation { message: String },
    /// Record store failure (connection loss, write conflict, decode error)
    #[error("Record store error: {message}")]
    Store { message: String },
}

impl RegistryError {
    pub fn organization_not_found(id: Uuid) -> Self {
        Self::NotFound {
            resource: "organization".to_string(),
            id: id.to_string(),
        }
    }

    /// Wrap a repository failure, keeping the full cause chain in the message
    pub fn store(error: anyhow::Error) -> Self {
        Self::Store {
            message: format!("{:#}", error),
        }
    }
}
