use crate::domain::errors::ValidationError;

// ============================================================================
// Courier Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourierError {
    #[error("courier is already busy")]
    AlreadyBusy,

    #[error("courier is already free")]
    AlreadyFree,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
