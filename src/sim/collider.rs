//! Colliders and the swept-mask builder
//!
//! The tricky part of the sim: replacing a moving shape's mask with the
//! polygon it sweeps across during the frame, so fast thin objects cannot
//! tunnel through each other between position samples.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ObjectId;
use super::geom::Line;
use super::mask::{Mask, Shape};

/// Tolerance for projection ties and on-cut-line classification
const PROJECTION_EPSILON: f32 = 1e-4;

/// One object's collision participation for the current frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    /// Collision planes; a pair is only tested when the sets intersect
    pub heights: Vec<i32>,
    pub mask: Mask,
    /// Ids already collided with this frame, in order of first encounter
    #[serde(skip)]
    collided: Vec<ObjectId>,
}

impl Collider {
    pub fn new(heights: Vec<i32>, mask: Mask) -> Self {
        Self {
            heights,
            mask,
            collided: Vec::new(),
        }
    }

    /// True if `other` has already collided with this collider this frame;
    /// otherwise records it and returns false
    pub fn check_collided(&mut self, other: ObjectId) -> bool {
        if self.collided.contains(&other) {
            return true;
        }
        self.collided.push(other);
        false
    }

    /// Collision entry point: true when this is the first contact with
    /// `other` this frame. Hit effects should run only on true.
    pub fn on_collide(&mut self, other: ObjectId) -> bool {
        !self.check_collided(other)
    }

    /// Clear per-frame dedup state
    ///
    /// The frame driver calls this exactly once per frame, after every
    /// pairwise test has run. Skipping it suppresses re-collision for pairs
    /// that stay in contact, which is the intended way to model "still
    /// touching, already handled".
    pub fn finish_collision_check(&mut self) {
        self.collided.clear();
    }

    /// Whether two colliders occupy at least one common collision plane
    pub fn shares_height(&self, other: &Collider) -> bool {
        self.heights.iter().any(|h| other.heights.contains(h))
    }

    /// Mask bounds translated to world space for an object at `position`
    pub fn world_bounds(&self, position: Vec2) -> (Vec2, Vec2) {
        let (min, max) = self.mask.bounds();
        (position + min, position + max)
    }
}

/// Whether two world-space boxes overlap (touching counts)
pub fn aabb_overlap(a: (Vec2, Vec2), b: (Vec2, Vec2)) -> bool {
    a.0.x <= b.1.x && b.0.x <= a.1.x && a.0.y <= b.1.y && b.0.y <= a.1.y
}

/// A collider whose mask is rebuilt each frame from the shape's motion
///
/// `original_mask` is the resting shape; every sweep starts from it, never
/// from last frame's swept mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweptCollider {
    pub collider: Collider,
    original_mask: Mask,
}

impl SweptCollider {
    pub fn new(heights: Vec<i32>, mask: Mask) -> Self {
        Self {
            collider: Collider::new(heights, mask.clone()),
            original_mask: mask,
        }
    }

    /// The undisplaced resting shape
    pub fn original_mask(&self) -> &Mask {
        &self.original_mask
    }

    /// Rotate the resting shape (and the active mask with it)
    pub fn rotate(&mut self, degrees: f32, pivot: Option<Vec2>) {
        self.original_mask.rotate(degrees, pivot);
        self.collider.mask = self.original_mask.clone();
    }

    /// Replace the active mask with the region the resting shape covers while
    /// moving through `displacement`
    pub fn on_move(&mut self, displacement: Vec2) {
        if displacement == Vec2::ZERO {
            self.collider.mask = self.original_mask.clone();
            return;
        }
        let swept = match self.original_mask.shape() {
            Shape::Circle { radius } => {
                sweep_circle(self.original_mask.center(), *radius, displacement)
            }
            Shape::Polygon { corners } => {
                sweep_polygon(corners, self.original_mask.center(), displacement)
            }
        };
        self.collider.mask = swept;
    }
}

/// Swept region of a moving circle: the quadrilateral between the two
/// silhouette points (on the circle, perpendicular to travel) at the start
/// position and the same pair translated, in reverse order so the outline
/// does not cross itself.
fn sweep_circle(center: Vec2, radius: f32, displacement: Vec2) -> Mask {
    let dir = displacement.normalize();
    let perp = Vec2::new(-dir.y, dir.x);
    let s1 = center + perp * radius;
    let s2 = center - perp * radius;
    Mask::from_corner_list(vec![s1, s2, s2 + displacement, s1 + displacement])
}

/// What the sweep does with one polygon corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CornerAction {
    /// Trailing side of the cut line: stays at the start position
    Keep,
    /// Leading side: moves by the full displacement
    Translate,
    /// On the cut line: emit both the start and the moved copy
    Split,
}

/// Swept region of a moving polygon
///
/// Projects every corner onto the travel line through the shape's center;
/// the projection extremes give the silhouette anchors of the cut line,
/// which separates corners that stay (trailing) from corners that move
/// (leading). Corners on the cut line itself are emitted twice, once in
/// place and once translated.
fn sweep_polygon(corners: &[Vec2], center: Vec2, displacement: Vec2) -> Mask {
    let travel = Line::heading(center, displacement.y.atan2(displacement.x));
    let projections: Vec<f32> = corners.iter().map(|&c| travel.signed_distance(c)).collect();

    let mut max_d = f32::MIN;
    let mut min_d = f32::MAX;
    for &d in &projections {
        max_d = max_d.max(d);
        min_d = min_d.min(d);
    }
    let pos_ties: Vec<usize> = (0..corners.len())
        .filter(|&i| (projections[i] - max_d).abs() <= PROJECTION_EPSILON)
        .collect();
    let neg_ties: Vec<usize> = (0..corners.len())
        .filter(|&i| (projections[i] - min_d).abs() <= PROJECTION_EPSILON)
        .collect();

    // Cut line through the first extreme corner on each side, refined one
    // side at a time when a side's extreme is shared by several corners.
    // A refined anchor is pinned: it stays in place without being split.
    let mut neg_anchor = neg_ties[0];
    let mut pos_anchor = pos_ties[0];
    let mut pinned: Vec<usize> = Vec::new();

    if pos_ties.len() > 1 {
        let cut = Line::through(corners[neg_anchor], corners[pos_anchor]);
        pos_anchor = refine_anchor(corners, &pos_ties, cut);
        pinned.push(pos_anchor);
    }
    if neg_ties.len() > 1 {
        let cut = Line::through(corners[neg_anchor], corners[pos_anchor]);
        neg_anchor = refine_anchor(corners, &neg_ties, cut);
        pinned.push(neg_anchor);
    }
    let cut = Line::through(corners[neg_anchor], corners[pos_anchor]);

    let actions: Vec<CornerAction> = (0..corners.len())
        .map(|i| {
            let d = cut.signed_distance(corners[i]);
            if pinned.contains(&i) || d > PROJECTION_EPSILON {
                CornerAction::Keep
            } else if d < -PROJECTION_EPSILON {
                CornerAction::Translate
            } else {
                CornerAction::Split
            }
        })
        .collect();

    let mut swept = Vec::with_capacity(corners.len() * 2);
    for (i, &corner) in corners.iter().enumerate() {
        match actions[i] {
            CornerAction::Keep => swept.push(corner),
            CornerAction::Translate => swept.push(corner + displacement),
            CornerAction::Split => {
                // Put the copy that matches the next emitted corner's side
                // second, so the outline walks onto it without crossing
                if next_resolved_action(&actions, i) == CornerAction::Translate {
                    swept.push(corner);
                    swept.push(corner + displacement);
                } else {
                    swept.push(corner + displacement);
                    swept.push(corner);
                }
            }
        }
    }
    Mask::from_corner_list(swept)
}

/// Among tied extreme corners, the one farthest on the positive side of the
/// evolving cut line; the first stands when none improves on it
fn refine_anchor(corners: &[Vec2], ties: &[usize], cut: Line) -> usize {
    let mut keep = ties[0];
    let mut best = 0.0f32;
    for &i in &ties[1..] {
        let d = cut.signed_distance(corners[i]);
        if d > best {
            keep = i;
            best = d;
        }
    }
    keep
}

/// First non-split action after `i`, walking the corner ring forward
fn next_resolved_action(actions: &[CornerAction], i: usize) -> CornerAction {
    for step in 1..actions.len() {
        let action = actions[(i + step) % actions.len()];
        if action != CornerAction::Split {
            return action;
        }
    }
    CornerAction::Translate
}
