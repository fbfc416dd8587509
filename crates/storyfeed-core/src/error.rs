//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A story or product was not found.
    #[error("not found: {0}")]
    NotFound(Uuid),

    /// No authenticated user is available for the operation.
    #[error("no authenticated user")]
    Unauthenticated,

    /// The caller does not own the product or story it tried to mutate.
    #[error("user {user_id} does not own {resource_id}")]
    Ownership {
        /// The user that issued the mutation.
        user_id: Uuid,
        /// The product or story the user tried to mutate.
        resource_id: Uuid,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure error (network, storage).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Returns `true` when repeating the same call may succeed.
    ///
    /// Only infrastructure failures qualify. Ownership and validation errors
    /// are hard failures.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Infrastructure(_))
    }
}
