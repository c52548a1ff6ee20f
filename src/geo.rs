use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::kernel::{Location, COORDINATE_MAX, COORDINATE_MIN};
use crate::ports::GeoClient;

// ============================================================================
// In-Process Geolocation Resolver
// ============================================================================

/// Stands in for the external geolocation service: resolves a street to a
/// stable location on the grid. Explicitly registered streets win; anything
/// else hashes deterministically, so the same street always resolves to the
/// same location across calls and restarts.
#[derive(Debug, Default)]
pub struct StaticGeoClient {
    known_streets: HashMap<String, Location>,
}

impl StaticGeoClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_street(mut self, street: &str, location: Location) -> Self {
        self.known_streets.insert(street.to_string(), location);
        self
    }

    fn hash_to_grid(street: &str) -> Location {
        let span = (COORDINATE_MAX - COORDINATE_MIN + 1) as u32;
        let digest = street
            .bytes()
            .fold(0u32, |acc, byte| acc.wrapping_mul(31).wrapping_add(byte as u32));

        let x = (digest % span) as i32 + COORDINATE_MIN;
        let y = ((digest / span) % span) as i32 + COORDINATE_MIN;
        Location::unchecked(x, y)
    }
}

#[async_trait]
impl GeoClient for StaticGeoClient {
    async fn get_geolocation(&self, street: &str) -> Result<Location> {
        if street.trim().is_empty() {
            anyhow::bail!("street must not be empty");
        }

        if let Some(location) = self.known_streets.get(street) {
            return Ok(*location);
        }

        Ok(Self::hash_to_grid(street))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
