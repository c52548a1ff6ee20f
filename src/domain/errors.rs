// ============================================================================
// Shared Validation Errors
// ============================================================================

/// Input validation failures shared by value objects and aggregates.
///
/// Returned before any state change happens, so a caller seeing one of these
/// knows the aggregate is untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("value is invalid: {0}")]
    ValueIsInvalid(&'static str),

    #[error("value is required: {0}")]
    ValueIsRequired(&'static str),

    #[error("{name} is out of range: {value} not in [{min}..{max}]")]
    ValueIsOutOfRange {
        name: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },
}
