//! Planar geometry helpers for masks and movement
//!
//! Pure functions shared by the mask and collider code: distances, headings,
//! and the signed point-to-line measure the swept-mask builder is built on.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Euclidean distance between two points
#[inline]
pub fn distance(p1: Vec2, p2: Vec2) -> f32 {
    p1.distance(p2)
}

/// Heading from one point to another, in radians
///
/// `atan2(to.y - from.y, to.x - from.x)`, range (-π, π].
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Midpoint of two points, floored componentwise
///
/// Floor (toward -∞) keeps midpoints on the integer grid the way the rest of
/// the sim rounds anchor coordinates.
#[inline]
pub fn midpoint(p1: Vec2, p2: Vec2) -> Vec2 {
    ((p1 + p2) * 0.5).floor()
}

/// Resolve a magnitude and heading into a displacement vector
#[inline]
pub fn resolve(magnitude: f32, angle: f32) -> Vec2 {
    Vec2::new(magnitude * angle.cos(), magnitude * angle.sin())
}

/// An infinite directed line in the plane
///
/// Either form fixes a direction: `Through` points from the first point to the
/// second, `Heading` along the given angle. The direction matters because
/// [`Line::signed_distance`] is signed by which side of the line a point is on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Line {
    /// Line through two points, directed from the first to the second
    Through(Vec2, Vec2),
    /// Line through a point at a heading (radians)
    Heading(Vec2, f32),
}

impl Line {
    /// Line through `p1` and `p2`, directed p1 → p2
    pub fn through(p1: Vec2, p2: Vec2) -> Self {
        Line::Through(p1, p2)
    }

    /// Line through `origin` at `angle` radians
    pub fn heading(origin: Vec2, angle: f32) -> Self {
        Line::Heading(origin, angle)
    }

    /// Signed distance from a point to this line
    ///
    /// Positive when the point lies 90° anticlockwise of the line's direction
    /// vector, negative clockwise, zero when collinear. The heading form needs
    /// no normalization because its direction vector is already unit length.
    pub fn signed_distance(&self, point: Vec2) -> f32 {
        match *self {
            Line::Through(p1, p2) => {
                let len = p1.distance(p2);
                if len <= f32::EPSILON {
                    // Degenerate segment: every point is "on" it
                    return 0.0;
                }
                ((p2.x - p1.x) * (p1.y - point.y) - (p1.x - point.x) * (p2.y - p1.y)) / len
            }
            Line::Heading(origin, angle) => {
                angle.cos() * (origin.y - point.y) - angle.sin() * (origin.x - point.x)
            }
        }
    }
}
