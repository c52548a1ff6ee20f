use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ValidationError;

// ============================================================================
// Location Value Object - Shared Kernel
// ============================================================================

pub const COORDINATE_MIN: i32 = 1;
pub const COORDINATE_MAX: i32 = 10;

/// A point on the delivery grid. Immutable; equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    x: i32,
    y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Result<Self, ValidationError> {
        if !(COORDINATE_MIN..=COORDINATE_MAX).contains(&x)
            || !(COORDINATE_MIN..=COORDINATE_MAX).contains(&y)
        {
            return Err(ValidationError::ValueIsInvalid(
                "coordinates must be between 1 and 10 inclusive",
            ));
        }
        Ok(Self { x, y })
    }

    /// Construction for coordinates already proven to lie on the grid, e.g.
    /// movement steps clipped at an in-range target.
    pub(crate) fn unchecked(x: i32, y: i32) -> Self {
        debug_assert!((COORDINATE_MIN..=COORDINATE_MAX).contains(&x));
        debug_assert!((COORDINATE_MIN..=COORDINATE_MAX).contains(&y));
        Self { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Manhattan distance.
    pub fn distance_to(&self, other: Location) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
