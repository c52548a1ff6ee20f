use crate::domain::errors::ValidationError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("order is already assigned to another courier")]
    AlreadyAssigned,

    #[error("order is not assigned to a courier")]
    NotAssigned,

    #[error("order is already completed")]
    AlreadyCompleted,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
