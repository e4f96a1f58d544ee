//! Unified error type for the catalog crate.
//!
//! Repository write paths return [`CatalogError`] so that blocked writes
//! (validation failures) and storage-layer failures flow through one type.

use thiserror::Error;

use crate::credential::CredentialError;
use crate::db::RepositoryError;
use crate::validate::ValidationErrors;

/// Top-level error for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Field-level constraint violations; the write was blocked.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Password hashing or verification failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Storage-layer failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CatalogError {
    /// Whether this error is a storage-layer uniqueness conflict.
    ///
    /// The order-number allocation path treats these as retryable.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Repository(RepositoryError::Conflict(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_conflict() {
        let err = CatalogError::Repository(RepositoryError::Conflict("slug taken".to_owned()));
        assert!(err.is_conflict());

        let err = CatalogError::Repository(RepositoryError::NotFound);
        assert!(!err.is_conflict());
    }
}
