//! Collision masks
//!
//! A mask is a shape in the object's local frame (origin at the object's
//! anchor, typically its top-left). Bounding size and centroid are derived
//! from the shape and recomputed whenever it changes.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mask construction failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MaskError {
    /// Both a radius and a corner list were supplied
    #[error("mask cannot be both a circle and a polygon")]
    ConflictingShape,
    /// No usable shape: no positive radius, no corners, no positive width+height
    #[error("mask needs a radius, a corner list, or a width and height")]
    MissingShape,
}

/// Shape parameters, typically deserialized from config
///
/// All fields are optional. Zero or negative dimensions and empty corner
/// lists count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaskParams {
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub radius: Option<f32>,
    #[serde(default)]
    pub corners: Option<Vec<Vec2>>,
}

/// The shape kind carried by a mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Polygon { corners: Vec<Vec2> },
}

/// A collidable shape with derived extent and centroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    shape: Shape,
    /// Max corner x/y (circles: diameter square)
    size: Vec2,
    /// Circle: (r, r); polygon: arithmetic mean of corners
    center: Vec2,
}

impl Mask {
    /// Build a mask from parameters
    ///
    /// A usable radius beats a usable width+height; a radius together with
    /// corners is a conflict. Anything absent or degenerate falls through to
    /// the next option.
    pub fn new(params: MaskParams) -> Result<Self, MaskError> {
        let radius = params.radius.filter(|&r| r > 0.0);
        let corners = params.corners.filter(|c| !c.is_empty());
        let rect = match (params.width, params.height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some((w, h)),
            _ => None,
        };

        match (radius, corners) {
            (Some(_), Some(_)) => Err(MaskError::ConflictingShape),
            (Some(r), None) => Ok(Self::circle_shape(r)),
            (None, Some(cs)) => Ok(Self::from_corner_list(cs)),
            (None, None) => match rect {
                Some((w, h)) => Ok(Self::rect_shape(w, h)),
                None => Err(MaskError::MissingShape),
            },
        }
    }

    /// Axis-aligned rectangle with its anchor at the top-left corner
    pub fn from_size(width: f32, height: f32) -> Result<Self, MaskError> {
        if width <= 0.0 || height <= 0.0 {
            return Err(MaskError::MissingShape);
        }
        Ok(Self::rect_shape(width, height))
    }

    /// Circle of the given radius, anchored at its bounding box top-left
    pub fn circle(radius: f32) -> Result<Self, MaskError> {
        if radius <= 0.0 {
            return Err(MaskError::MissingShape);
        }
        Ok(Self::circle_shape(radius))
    }

    /// Polygon from an explicit corner list
    pub fn polygon(corners: Vec<Vec2>) -> Result<Self, MaskError> {
        if corners.is_empty() {
            return Err(MaskError::MissingShape);
        }
        Ok(Self::from_corner_list(corners))
    }

    fn rect_shape(width: f32, height: f32) -> Self {
        Self::from_corner_list(vec![
            Vec2::ZERO,
            Vec2::new(0.0, height),
            Vec2::new(width, height),
            Vec2::new(width, 0.0),
        ])
    }

    fn circle_shape(radius: f32) -> Self {
        Self {
            shape: Shape::Circle { radius },
            size: Vec2::splat(radius * 2.0),
            center: Vec2::splat(radius),
        }
    }

    /// Polygon constructor skipping the emptiness check, for callers whose
    /// corner lists are non-empty by construction (the swept-mask builder).
    pub(crate) fn from_corner_list(corners: Vec<Vec2>) -> Self {
        let (size, center) = measure(&corners);
        Self {
            shape: Shape::Polygon { corners },
            size,
            center,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Bounding extent (max corner x/y; circles: 2r × 2r)
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Local centroid
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Polygon corners, if this mask is a polygon
    pub fn corners(&self) -> Option<&[Vec2]> {
        match &self.shape {
            Shape::Polygon { corners } => Some(corners),
            Shape::Circle { .. } => None,
        }
    }

    /// Circle radius, if this mask is a circle
    pub fn radius(&self) -> Option<f32> {
        match self.shape {
            Shape::Circle { radius } => Some(radius),
            Shape::Polygon { .. } => None,
        }
    }

    /// Min/max local corners
    ///
    /// Rotation can push polygon corners negative, so `size` alone is not a
    /// bounding box.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        match &self.shape {
            Shape::Circle { .. } => (Vec2::ZERO, self.size),
            Shape::Polygon { corners } => {
                let mut min = corners[0];
                let mut max = corners[0];
                for &c in &corners[1..] {
                    min = min.min(c);
                    max = max.max(c);
                }
                (min, max)
            }
        }
    }

    /// Rotate the mask in place, clockwise for positive degrees
    ///
    /// Circles are unchanged. Polygons rotate every corner around the pivot
    /// (default: the polygon's own centroid), then size and center are
    /// recomputed.
    pub fn rotate(&mut self, degrees: f32, pivot: Option<Vec2>) {
        let pivot = pivot.unwrap_or(self.center);
        let Shape::Polygon { corners } = &mut self.shape else {
            return;
        };
        let (sin, cos) = degrees.to_radians().sin_cos();
        for c in corners.iter_mut() {
            let d = *c - pivot;
            *c = Vec2::new(d.x * cos + d.y * sin + pivot.x, -d.x * sin + d.y * cos + pivot.y);
        }
        let (size, center) = measure(corners);
        self.size = size;
        self.center = center;
    }

    /// World x of the mask center for an object anchored at `obj_x`,
    /// rounded to the nearest integer
    pub fn center_x_in_world(&self, obj_x: f32) -> i32 {
        (obj_x + self.center.x).round() as i32
    }

    /// World y of the mask center for an object anchored at `obj_y`,
    /// rounded to the nearest integer
    pub fn center_y_in_world(&self, obj_y: f32) -> i32 {
        (obj_y + self.center.y).round() as i32
    }
}

/// Derived size (max x, max y) and center (mean) of a corner list
fn measure(corners: &[Vec2]) -> (Vec2, Vec2) {
    let mut max = Vec2::MIN;
    let mut sum = Vec2::ZERO;
    for &c in corners {
        max = max.max(c);
        sum += c;
    }
    (max, sum / corners.len() as f32)
}
