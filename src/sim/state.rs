//! Game objects and their per-frame behavior
//!
//! Projectiles carry the kinematics; obstacles and players are thin state
//! holders whose collision effects run in the frame driver.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ObjectId;
use super::collider::{Collider, SweptCollider};
use super::geom;
use super::mask::Mask;

/// Anything the frame driver advances once per frame
pub trait GameObject {
    fn update(&mut self, dt: f32);

    /// Rendering hook; interpretation belongs to a renderer, the sim core
    /// draws nothing
    fn draw(&self, _camera_offset: Vec2) {}
}

/// How a projectile's heading and speed evolve each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovementPolicy {
    /// Constant speed along the launch angle
    Linear,
    /// Symmetric half-step acceleration around the base move
    Accelerating { accel: f32 },
    /// Re-aim at the target's mask center each frame
    ///
    /// `accuracy` is carried for steering strength but the heading currently
    /// snaps fully to the target every frame.
    Homing { target: ObjectId, accuracy: f32 },
}

/// A projectile in flight
///
/// Expires when its remaining range or lifetime runs out; the expiring
/// frame's movement is clamped so it never overshoots either limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub position: Vec2,
    pub speed: f32,
    /// Heading in radians
    pub angle: f32,
    /// Remaining travel distance
    pub range: f32,
    /// Remaining lifetime in seconds
    pub timer: f32,
    /// Colliders this can still pass through
    pub pierce: i32,
    pub damage: i32,
    /// The object that fired this, carried opaquely
    pub source: Option<ObjectId>,
    pub policy: MovementPolicy,
    /// Displacement applied by the most recent update
    #[serde(skip)]
    pub last_move: Vec2,
    pub alive: bool,
    pub collider: Option<SweptCollider>,
}

impl Projectile {
    pub fn new(id: ObjectId, name: &str, position: Vec2, speed: f32, angle: f32) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: String::new(),
            position,
            speed,
            angle,
            range: f32::INFINITY,
            timer: f32::INFINITY,
            pierce: 0,
            damage: 0,
            source: None,
            policy: MovementPolicy::Linear,
            last_move: Vec2::ZERO,
            alive: true,
            collider: None,
        }
    }

    /// Mask-adjusted world center, rounded to the integer grid; falls back
    /// to the raw position without a collider
    pub fn center_in_world(&self) -> Vec2 {
        match &self.collider {
            Some(swept) => Vec2::new(
                swept.collider.mask.center_x_in_world(self.position.x) as f32,
                swept.collider.mask.center_y_in_world(self.position.y) as f32,
            ),
            None => self.position,
        }
    }

    /// World anchor of the active swept mask: the start-of-frame position,
    /// since swept corners are laid out from where the move began
    pub fn swept_anchor(&self) -> Vec2 {
        self.position - self.last_move
    }

    /// Re-aim at a world-space point, rotating the resting mask by the turn
    ///
    /// The frame driver calls this for homing projectiles before the update
    /// pass, once the target's center has been resolved.
    pub fn steer_toward(&mut self, target_center: Vec2) {
        let new_angle = geom::angle_to(self.center_in_world(), target_center);
        let delta = crate::normalize_angle(new_angle - self.angle);
        if let Some(swept) = &mut self.collider {
            swept.rotate(delta.to_degrees(), None);
        }
        self.angle = new_angle;
    }
}

impl GameObject for Projectile {
    fn update(&mut self, dt: f32) {
        if !self.alive {
            return;
        }
        // Expiry is checked before movement: the frame that exhausts range
        // or timer still moves (clamped), the next frame expires
        if self.range <= 0.0 || self.timer <= 0.0 {
            self.alive = false;
            return;
        }

        let accel = match self.policy {
            MovementPolicy::Accelerating { accel } => accel,
            _ => 0.0,
        };
        self.speed += accel * dt / 2.0;

        let distance = (self.speed * dt.min(self.timer)).min(self.range);
        let displacement = geom::resolve(distance, self.angle);
        self.position += displacement;
        self.last_move = displacement;
        self.range -= distance;
        self.timer -= dt;

        self.speed += accel * dt / 2.0;

        if let Some(swept) = &mut self.collider {
            swept.on_move(displacement);
        }
    }
}

/// Health bookkeeping for obstacles that can be destroyed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakable {
    pub hp: i32,
    pub max_hp: i32,
    /// Damage is ignored while set
    pub immune: bool,
    /// Fraction of incoming damage absorbed, 0.0 to 1.0
    pub resistance: f32,
}

impl Breakable {
    pub fn new(hp: i32) -> Self {
        Self {
            hp,
            max_hp: hp,
            immune: false,
            resistance: 0.0,
        }
    }

    /// Apply a hit; true when this breaks the obstacle
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        if self.immune {
            return false;
        }
        let effective = (damage as f32 * (1.0 - self.resistance)).round() as i32;
        self.hp = (self.hp - effective).max(0);
        self.hp == 0
    }
}

/// A non-moving obstacle
///
/// `thickness` is the pierce reduction applied to projectiles passing
/// through; -1 blocks absolutely. A populated `breakable` makes the obstacle
/// destructible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObjectId,
    pub position: Vec2,
    pub heights: Vec<i32>,
    pub thickness: i32,
    pub alive: bool,
    pub collider: Option<Collider>,
    pub breakable: Option<Breakable>,
}

impl Obstacle {
    pub fn new(id: ObjectId, position: Vec2, heights: Vec<i32>, thickness: i32) -> Self {
        Self {
            id,
            position,
            heights,
            thickness,
            alive: true,
            collider: None,
            breakable: None,
        }
    }

    /// Attach a collider on the obstacle's own heights
    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.collider = Some(Collider::new(self.heights.clone(), mask));
        self
    }

    pub fn with_breakable(mut self, breakable: Breakable) -> Self {
        self.breakable = Some(breakable);
        self
    }

    /// Mask-adjusted world center, rounded to the integer grid
    pub fn center_in_world(&self) -> Vec2 {
        match &self.collider {
            Some(collider) => Vec2::new(
                collider.mask.center_x_in_world(self.position.x) as f32,
                collider.mask.center_y_in_world(self.position.y) as f32,
            ),
            None => self.position,
        }
    }
}

impl GameObject for Obstacle {
    fn update(&mut self, _dt: f32) {}
}

/// Base combat statistics; formulas live outside the core
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub max_hp: i32,
    pub attack: i32,
    pub defence: i32,
    pub accuracy: i32,
    pub evade: i32,
    pub speed: i32,
    pub crit_rate: f32,
    pub crit_bonus: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            max_hp: 100,
            attack: 10,
            defence: 0,
            accuracy: 100,
            evade: 0,
            speed: 10,
            crit_rate: 0.05,
            crit_bonus: 0.5,
        }
    }
}

/// Pending per-stat modifiers, carried opaquely for an external stat system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatChanges {
    pub max_hp: Vec<i32>,
    pub attack: Vec<i32>,
    pub defence: Vec<i32>,
    pub accuracy: Vec<i32>,
    pub evade: Vec<i32>,
    pub speed: Vec<i32>,
    pub crit_rate: Vec<f32>,
    pub crit_bonus: Vec<f32>,
}

/// A player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: ObjectId,
    pub name: String,
    pub position: Vec2,
    pub weapon: Option<RangedWeapon>,
    /// Skill identifiers, carried opaquely for an external combat layer
    pub skills: Vec<String>,
    pub stats: Stats,
    pub stat_changes: StatChanges,
    pub alive: bool,
    pub collider: Option<Collider>,
}

impl Player {
    pub fn new(id: ObjectId, name: &str, position: Vec2) -> Self {
        Self {
            id,
            name: name.to_string(),
            position,
            weapon: None,
            skills: Vec::new(),
            stats: Stats::default(),
            stat_changes: StatChanges::default(),
            alive: true,
            collider: None,
        }
    }

    /// Mask-adjusted world center, rounded to the integer grid
    pub fn center_in_world(&self) -> Vec2 {
        match &self.collider {
            Some(collider) => Vec2::new(
                collider.mask.center_x_in_world(self.position.x) as f32,
                collider.mask.center_y_in_world(self.position.y) as f32,
            ),
            None => self.position,
        }
    }
}

impl GameObject for Player {
    fn update(&mut self, dt: f32) {
        if let Some(weapon) = &mut self.weapon {
            weapon.profile.current_cooldown = (weapon.profile.current_cooldown - dt).max(0.0);
        }
    }
}

/// Identity and upgrade state shared by every weapon kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub name: String,
    pub description: String,
    pub level: u32,
    /// Enchantment name to strength
    pub enchantments: BTreeMap<String, i32>,
    /// Seconds between attacks
    pub cooldown: f32,
    pub current_cooldown: f32,
}

/// Capability contract for weapons
///
/// The core only ticks cooldowns; attack resolution belongs to an external
/// combat layer driving these hooks.
pub trait Weapon {
    fn profile(&self) -> &WeaponProfile;
    fn on_attack(&mut self, angle: f32);
    fn on_equip(&mut self);
    fn on_unequip(&mut self);
    fn on_level_up(&mut self);
    fn on_enchant(&mut self, name: &str, strength: i32);
}

/// Concrete ranged weapon; behavior hooks are stubs at this layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangedWeapon {
    pub profile: WeaponProfile,
}

impl RangedWeapon {
    pub fn new(name: &str, cooldown: f32) -> Self {
        Self {
            profile: WeaponProfile {
                name: name.to_string(),
                cooldown,
                ..Default::default()
            },
        }
    }
}

impl Weapon for RangedWeapon {
    fn profile(&self) -> &WeaponProfile {
        &self.profile
    }

    fn on_attack(&mut self, _angle: f32) {
        self.profile.current_cooldown = self.profile.cooldown;
    }

    fn on_equip(&mut self) {}

    fn on_unequip(&mut self) {}

    fn on_level_up(&mut self) {
        self.profile.level += 1;
    }

    fn on_enchant(&mut self, name: &str, strength: i32) {
        self.profile.enchantments.insert(name.to_string(), strength);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_projectile_range_clamps_then_expires() {
        let mut p = Projectile::new(1, "bolt", Vec2::ZERO, 10.0, 0.0);
        p.range = 5.0;

        p.update(1.0);
        assert!(p.alive);
        assert!((p.position.x - 5.0).abs() < 1e-6);
        assert!(p.range.abs() < 1e-6);

        p.update(1.0);
        assert!(!p.alive);
        // Expiry does not move the projectile
        assert!((p.position.x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_projectile_timer_clamps_then_expires() {
        let mut p = Projectile::new(1, "bolt", Vec2::ZERO, 10.0, 0.0);
        p.timer = 0.5;

        p.update(1.0);
        assert!(p.alive);
        assert!((p.position.x - 5.0).abs() < 1e-6);
        assert!(p.timer < 0.0);

        p.update(1.0);
        assert!(!p.alive);
    }

    #[test]
    fn test_accelerating_leapfrog() {
        let mut p = Projectile::new(1, "shell", Vec2::ZERO, 10.0, 0.0);
        p.policy = MovementPolicy::Accelerating { accel: 2.0 };

        // Half-kick to 11, move 11, half-kick to 12
        p.update(1.0);
        assert!((p.position.x - 11.0).abs() < 1e-4);
        assert!((p.speed - 12.0).abs() < 1e-6);

        // Half-kick to 13, move 13
        p.update(1.0);
        assert!((p.position.x - 24.0).abs() < 1e-4);
    }

    #[test]
    fn test_projectile_moves_along_angle() {
        let mut p = Projectile::new(1, "bolt", Vec2::ZERO, 4.0, FRAC_PI_2);
        p.update(0.5);
        assert!(p.position.x.abs() < 1e-5);
        assert!((p.position.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_projectile_update_runs_sweep() {
        let mut p = Projectile::new(1, "bolt", Vec2::ZERO, 1.0, 0.0);
        p.collider = Some(SweptCollider::new(vec![0], Mask::from_size(2.0, 2.0).unwrap()));
        p.update(1.0);
        let swept = p.collider.as_ref().unwrap();
        // Axis-aligned sweep widens the active mask, resting shape untouched
        assert_eq!(swept.original_mask().size(), Vec2::new(2.0, 2.0));
        assert_eq!(swept.collider.mask.size(), Vec2::new(3.0, 2.0));
    }

    #[test]
    fn test_update_anchors_swept_mask_at_move_start() {
        let mut p = Projectile::new(1, "bolt", Vec2::ZERO, 10.0, 0.0);
        assert_eq!(p.swept_anchor(), Vec2::ZERO);

        p.update(1.0);
        assert_eq!(p.last_move, Vec2::new(10.0, 0.0));
        // The anchor trails the advanced position by the frame's move
        assert_eq!(p.swept_anchor(), Vec2::ZERO);

        p.update(1.0);
        assert_eq!(p.swept_anchor(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_steer_toward_rotates_mask_and_heading() {
        let mut p = Projectile::new(1, "seeker", Vec2::ZERO, 1.0, 0.0);
        p.collider = Some(SweptCollider::new(vec![0], Mask::from_size(2.0, 2.0).unwrap()));

        // Own center is (1,1); target center straight below it
        p.steer_toward(Vec2::new(1.0, 5.0));
        assert!((p.angle - FRAC_PI_2).abs() < 1e-5);

        // Quarter-turn about the centroid maps the square onto itself with
        // corners cycled
        let corners = p.collider.as_ref().unwrap().original_mask().corners().unwrap().to_vec();
        let expected = [
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        for (c, e) in corners.iter().zip(expected.iter()) {
            assert!(c.distance(*e) < 1e-4, "{corners:?}");
        }
    }

    #[test]
    fn test_breakable_resistance_rounding_and_saturation() {
        let mut b = Breakable::new(10);
        b.resistance = 0.25;

        // 5 * 0.75 = 3.75 rounds to 4
        assert!(!b.apply_damage(5));
        assert_eq!(b.hp, 6);

        // 10 * 0.75 = 7.5 rounds to 8; hp saturates at 0 and reports broken
        assert!(b.apply_damage(10));
        assert_eq!(b.hp, 0);
    }

    #[test]
    fn test_breakable_immune_ignores_damage() {
        let mut b = Breakable::new(3);
        b.immune = true;
        assert!(!b.apply_damage(100));
        assert_eq!(b.hp, 3);
    }

    #[test]
    fn test_player_update_ticks_weapon_cooldown() {
        let mut player = Player::new(1, "aki", Vec2::ZERO);
        let mut weapon = RangedWeapon::new("bow", 1.5);
        weapon.on_attack(0.0);
        player.weapon = Some(weapon);

        player.update(1.0);
        assert!((player.weapon.as_ref().unwrap().profile.current_cooldown - 0.5).abs() < 1e-6);
        player.update(1.0);
        assert_eq!(player.weapon.as_ref().unwrap().profile.current_cooldown, 0.0);
    }

    #[test]
    fn test_player_skills_ride_through_serialization() {
        let mut player = Player::new(1, "aki", Vec2::ZERO);
        player.skills.push("riposte".to_string());
        let json = serde_json::to_string(&player).unwrap();
        let back: Player = serde_json::from_str(&json).unwrap();
        assert_eq!(back.skills, vec!["riposte".to_string()]);
    }

    #[test]
    fn test_weapon_level_and_enchant() {
        let mut weapon = RangedWeapon::new("bow", 1.0);
        weapon.on_level_up();
        weapon.on_enchant("flame", 3);
        assert_eq!(weapon.profile().level, 1);
        assert_eq!(weapon.profile().enchantments.get("flame"), Some(&3));
    }

    #[test]
    fn test_center_in_world_rounds_to_grid() {
        let mut obstacle = Obstacle::new(1, Vec2::new(0.25, 0.25), vec![0], 0)
            .with_mask(Mask::from_size(3.0, 3.0).unwrap());
        // 0.25 + 1.5 = 1.75 rounds to 2
        assert_eq!(obstacle.center_in_world(), Vec2::new(2.0, 2.0));
        obstacle.collider = None;
        assert_eq!(obstacle.center_in_world(), Vec2::new(0.25, 0.25));
    }
}
