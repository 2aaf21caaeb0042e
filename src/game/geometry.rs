//! Static world geometry
//!
//! The platform list is identical on the server and every client. Nothing
//! enforces that at runtime; changing a value here means shipping a client
//! with the same change.

use serde::Serialize;

/// Axis-aligned platform: rectangular footprint on the XZ plane plus a flat top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub x_min: f32,
    pub x_max: f32,
    pub z_min: f32,
    pub z_max: f32,
    pub top: f32,
}

impl Platform {
    pub const fn new(x_min: f32, x_max: f32, z_min: f32, z_max: f32, top: f32) -> Self {
        Self {
            x_min,
            x_max,
            z_min,
            z_max,
            top,
        }
    }

    /// Whether the point lies inside the footprint (edges inclusive)
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.x_min && x <= self.x_max && z >= self.z_min && z <= self.z_max
    }
}

/// The obstacle course every client renders
pub static PLATFORMS: [Platform; 6] = [
    // Padded base floor
    Platform::new(-15.0, 15.0, -15.0, 15.0, 0.0),
    // Central
    Platform::new(-5.0, 5.0, -5.0, 5.0, 1.0),
    // Elevated
    Platform::new(5.0, 10.0, 5.0, 10.0, 2.0),
    // Mid-level
    Platform::new(-10.0, -5.0, -10.0, -5.0, 1.5),
    // High
    Platform::new(10.0, 15.0, 10.0, 15.0, 3.0),
    // Additional high
    Platform::new(-15.0, -10.0, -15.0, -10.0, 2.5),
];

/// Top of the first platform, in list order, under (x, z) whose top is at or
/// above `bottom`.
pub fn surface_under(platforms: &[Platform], x: f32, z: f32, bottom: f32) -> Option<f32> {
    platforms
        .iter()
        .find(|p| p.contains(x, z) && p.top >= bottom)
        .map(|p| p.top)
}
