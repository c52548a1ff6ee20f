use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::ValidationError;
use crate::domain::kernel::Location;
use super::errors::CourierError;
use super::transport::Transport;

// ============================================================================
// Courier Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourierStatus {
    Free,
    Busy,
}

/// A courier cycles Free → Busy → Free; it has no terminal state. Every
/// transition either succeeds or returns an error with the courier unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Courier {
    id: Uuid,
    name: String,
    transport: Transport,
    location: Location,
    status: CourierStatus,
}

impl Courier {
    pub fn new(
        name: &str,
        transport_name: &str,
        transport_speed: i32,
        location: Location,
    ) -> Result<Self, CourierError> {
        if name.trim().is_empty() {
            return Err(ValidationError::ValueIsRequired("courier name").into());
        }

        let transport = Transport::new(transport_name, transport_speed)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            transport,
            location,
            status: CourierStatus::Free,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn status(&self) -> CourierStatus {
        self.status
    }

    pub fn is_free(&self) -> bool {
        self.status == CourierStatus::Free
    }

    pub fn is_busy(&self) -> bool {
        self.status == CourierStatus::Busy
    }

    pub fn set_busy(&mut self) -> Result<(), CourierError> {
        if self.is_busy() {
            return Err(CourierError::AlreadyBusy);
        }
        self.status = CourierStatus::Busy;
        Ok(())
    }

    pub fn set_free(&mut self) -> Result<(), CourierError> {
        if self.is_free() {
            return Err(CourierError::AlreadyFree);
        }
        self.status = CourierStatus::Free;
        Ok(())
    }

    /// Apply one movement tick toward `target`. Movement always goes through
    /// the owned transport; a courier cannot move without one.
    pub fn move_towards(&mut self, target: Location) {
        self.location = self.transport.move_towards(self.location, target);
    }

    /// Number of ticks this courier would need to reach `target`.
    ///
    /// Replays the transport's step function on a throwaway copy of the
    /// position; the courier itself is never moved. Terminates because every
    /// tick strictly shrinks the remaining distance.
    pub fn steps_to(&self, target: Location) -> u32 {
        let mut position = self.location;
        let mut steps = 0;
        while position != target {
            position = self.transport.move_towards(position, target);
            steps += 1;
        }
        steps
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
