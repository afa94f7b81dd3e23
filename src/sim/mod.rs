//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies
//!
//! The collision core is the swept mask: a moving object's collider is
//! rebuilt each frame from the region its resting shape covers in transit,
//! so narrow-phase tests against one mask catch between-frame tunneling.

pub mod collider;
pub mod geom;
pub mod mask;
pub mod state;
pub mod tick;

/// Entity id allocated by the [`tick::World`]
pub type ObjectId = u32;

pub use collider::{Collider, SweptCollider, aabb_overlap};
pub use geom::{Line, angle_to, distance, midpoint, resolve};
pub use mask::{Mask, MaskError, MaskParams, Shape};
pub use state::{
    Breakable, GameObject, MovementPolicy, Obstacle, Player, Projectile, RangedWeapon, Stats,
    Weapon, WeaponProfile,
};
pub use tick::{FrameEvent, World, WorldError};
