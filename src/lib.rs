//! Skirmish - a 2D combat simulation core
//!
//! Core modules:
//! - `sim`: deterministic simulation (masks, colliders, projectiles, frame driver)
//! - `config`: data-driven world configuration
//!
//! The simulation is frame-stepped and single-threaded. Each frame the driver
//! advances every object, recomputes swept collision masks for fast movers,
//! runs one collision pass, then clears per-frame dedup state - in that order.

pub mod config;
pub mod sim;

pub use config::WorldConfig;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Default collision height for objects that don't specify planes
    pub const GROUND_HEIGHT: i32 = 0;
}

/// Normalize an angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle() {
        // Whole turns drop out
        assert!((normalize_angle(PI / 2.0 + 4.0 * PI) - PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-PI / 2.0 - 4.0 * PI) + PI / 2.0).abs() < 1e-5);
        // Already in range is untouched
        assert!((normalize_angle(PI / 4.0) - PI / 4.0).abs() < 1e-6);
        // Any turn count lands in [-PI, PI) at the same heading
        for turns in -3i32..=3 {
            let angle = normalize_angle(0.3 + turns as f32 * 2.0 * PI);
            assert!((-PI..PI).contains(&angle), "{angle}");
            assert!((angle - 0.3).abs() < 1e-4, "{angle}");
        }
    }
}
