use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::ValidationError;
use crate::domain::kernel::Location;
use super::errors::CourierError;

// ============================================================================
// Transport - Owned by a Courier
// ============================================================================

pub const SPEED_MIN: i32 = 1;
pub const SPEED_MAX: i32 = 3;

/// The vehicle a courier rides. Exclusively owned by one `Courier`; its speed
/// is the per-tick movement budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transport {
    id: Uuid,
    name: String,
    speed: i32,
}

impl Transport {
    pub fn new(name: &str, speed: i32) -> Result<Self, CourierError> {
        if name.is_empty() {
            return Err(ValidationError::ValueIsRequired("transport name").into());
        }
        if !(SPEED_MIN..=SPEED_MAX).contains(&speed) {
            return Err(ValidationError::ValueIsOutOfRange {
                name: "speed",
                value: speed,
                min: SPEED_MIN,
                max: SPEED_MAX,
            }
            .into());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            speed,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// One discrete tick of movement toward `target`.
    ///
    /// The speed budget is spent greedily along X first, then Y with the
    /// remainder; each axis step is clipped at the target, so the result
    /// never overshoots and never leaves the grid. Idempotent once `current`
    /// equals `target`.
    pub fn move_towards(&self, current: Location, target: Location) -> Location {
        if current == target {
            return current;
        }

        let dx = if target.x() > current.x() { 1 } else { -1 };
        let dy = if target.y() > current.y() { 1 } else { -1 };

        let remaining_x = dx * (target.x() - current.x());
        let remaining_y = dy * (target.y() - current.y());

        let steps_x = remaining_x.min(self.speed);
        let steps_y = remaining_y.min((self.speed - steps_x).max(0));

        Location::unchecked(current.x() + dx * steps_x, current.y() + dy * steps_y)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(x: i32, y: i32) -> Location {
        Location::new(x, y).unwrap()
    }

    #[test]
    fn test_new_transport_validates_name_and_speed() {
        assert!(Transport::new("bike", 2).is_ok());
        assert!(matches!(
            Transport::new("", 2),
            Err(CourierError::Validation(ValidationError::ValueIsRequired(_)))
        ));
        assert!(matches!(
            Transport::new("rocket", 4),
            Err(CourierError::Validation(ValidationError::ValueIsOutOfRange { .. }))
        ));
        assert!(Transport::new("snail", 0).is_err());
    }

    #[test]
    fn test_move_is_idempotent_at_destination() {
        let transport = Transport::new("bike", 2).unwrap();
        let here = loc(5, 5);
        assert_eq!(transport.move_towards(here, here), here);
    }

    #[test]
    fn test_speed_budget_goes_to_y_when_x_is_aligned() {
        // Speed 2 from (1,1) toward (1,9): nothing to do on X, both steps on Y.
        let transport = Transport::new("bike", 2).unwrap();
        let next = transport.move_towards(loc(1, 1), loc(1, 9));
        assert_eq!(next, loc(1, 3));
    }

    #[test]
    fn test_straight_line_takes_distance_over_speed_ticks() {
        let transport = Transport::new("bike", 2).unwrap();
        let target = loc(1, 9);
        let mut current = loc(1, 1);
        let mut ticks = 0;
        while current != target {
            current = transport.move_towards(current, target);
            ticks += 1;
        }
        assert_eq!(ticks, 4);
    }

    #[test]
    fn test_speed_is_allocated_x_first() {
        // Speed 3 from (1,1) toward (3,3): two steps on X, remainder on Y.
        let transport = Transport::new("car", 3).unwrap();
        let next = transport.move_towards(loc(1, 1), loc(3, 3));
        assert_eq!(next, loc(3, 2));
    }

    #[test]
    fn test_steps_are_clipped_at_the_target() {
        let transport = Transport::new("car", 3).unwrap();
        let next = transport.move_towards(loc(5, 5), loc(6, 5));
        assert_eq!(next, loc(6, 5));
    }

    #[test]
    fn test_moves_in_negative_directions() {
        let transport = Transport::new("bike", 2).unwrap();
        let next = transport.move_towards(loc(9, 9), loc(1, 9));
        assert_eq!(next, loc(7, 9));
        let next = transport.move_towards(loc(4, 4), loc(4, 1));
        assert_eq!(next, loc(4, 2));
    }
}
