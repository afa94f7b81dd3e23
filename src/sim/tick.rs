//! Frame driver
//!
//! Advances the world deterministically one frame at a time. Each step runs
//! the same fixed order: homing steer, object updates (including collider
//! sweeps), the collision pass over shared-height candidates, the finish
//! pass that clears per-frame dedup state, then removal of dead objects.
//! Every pairwise test completes before any finish runs, so a hit handler
//! can never cause a later-tested pair to double-fire in the same frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ObjectId;
use super::collider::aabb_overlap;
use super::state::{GameObject, MovementPolicy, Obstacle, Player, Projectile};
use crate::config::WorldConfig;

/// What a frame reports back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameEvent {
    ProjectileHit {
        projectile: ObjectId,
        target: ObjectId,
    },
    ProjectileExpired {
        id: ObjectId,
    },
    ObstacleBroken {
        id: ObjectId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("player limit reached ({max})")]
    PlayersFull { max: u32 },
}

/// The session container: all live objects plus the id allocator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub config: WorldConfig,
    /// Sorted by id for deterministic iteration
    pub players: Vec<Player>,
    pub obstacles: Vec<Obstacle>,
    pub projectiles: Vec<Projectile>,
    /// Completed frames
    pub frame: u64,
    next_id: ObjectId,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            players: Vec::new(),
            obstacles: Vec::new(),
            projectiles: Vec::new(),
            frame: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity id
    pub fn next_entity_id(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_player(&mut self, player: Player) -> Result<ObjectId, WorldError> {
        if self.players.len() as u32 >= self.config.max_players {
            return Err(WorldError::PlayersFull {
                max: self.config.max_players,
            });
        }
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> ObjectId {
        let id = obstacle.id;
        self.obstacles.push(obstacle);
        id
    }

    pub fn add_projectile(&mut self, projectile: Projectile) -> ObjectId {
        let id = projectile.id;
        self.projectiles.push(projectile);
        id
    }

    /// Ensure objects are sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.players.sort_by_key(|p| p.id);
        self.obstacles.sort_by_key(|o| o.id);
        self.projectiles.sort_by_key(|p| p.id);
    }

    /// World center of the object with the given id, if it exists
    fn center_of(&self, id: ObjectId) -> Option<Vec2> {
        if let Some(player) = self.players.iter().find(|p| p.id == id) {
            return Some(player.center_in_world());
        }
        if let Some(obstacle) = self.obstacles.iter().find(|o| o.id == id) {
            return Some(obstacle.center_in_world());
        }
        self.projectiles
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.center_in_world())
    }

    /// Advance the world by one frame
    pub fn step(&mut self, dt: f32) -> Vec<FrameEvent> {
        self.normalize_order();
        let mut events = Vec::new();

        // Homing steer: resolve every target center first, then apply, so
        // steering never observes a half-updated frame
        let mut steering: Vec<(usize, Vec2)> = Vec::new();
        for (idx, projectile) in self.projectiles.iter().enumerate() {
            if !projectile.alive {
                continue;
            }
            if let MovementPolicy::Homing { target, .. } = projectile.policy {
                // A missing target means the projectile flies straight
                if let Some(center) = self.center_of(target) {
                    steering.push((idx, center));
                }
            }
        }
        for (idx, center) in steering {
            self.projectiles[idx].steer_toward(center);
        }

        // Update pass
        for player in &mut self.players {
            player.update(dt);
        }
        for obstacle in &mut self.obstacles {
            obstacle.update(dt);
        }
        for projectile in &mut self.projectiles {
            let was_alive = projectile.alive;
            projectile.update(dt);
            if was_alive && !projectile.alive {
                log::debug!("projectile {} expired", projectile.id);
                events.push(FrameEvent::ProjectileExpired { id: projectile.id });
            }
        }

        // Collision pass: projectile vs obstacle, then projectile vs player.
        // Candidates share a height and overlap in world space, with the
        // projectile's swept mask planted at its start-of-frame anchor so
        // the tested footprint is the traveled leg. Both sides record the
        // pair so re-contact stays silent until the finish pass.
        for projectile in &mut self.projectiles {
            if !projectile.alive {
                continue;
            }
            let anchor = projectile.swept_anchor();
            let Some(swept) = &mut projectile.collider else {
                continue;
            };
            for obstacle in &mut self.obstacles {
                if !projectile.alive || !obstacle.alive {
                    continue;
                }
                let Some(obstacle_collider) = &mut obstacle.collider else {
                    continue;
                };
                if !swept.collider.shares_height(obstacle_collider) {
                    continue;
                }
                if !aabb_overlap(
                    swept.collider.world_bounds(anchor),
                    obstacle_collider.world_bounds(obstacle.position),
                ) {
                    continue;
                }
                let new_pair = swept.collider.on_collide(obstacle.id);
                obstacle_collider.check_collided(projectile.id);
                if !new_pair {
                    continue;
                }

                log::debug!("projectile {} hit obstacle {}", projectile.id, obstacle.id);
                events.push(FrameEvent::ProjectileHit {
                    projectile: projectile.id,
                    target: obstacle.id,
                });
                if let Some(breakable) = &mut obstacle.breakable {
                    if breakable.apply_damage(projectile.damage) {
                        log::debug!("obstacle {} broken", obstacle.id);
                        obstacle.alive = false;
                        events.push(FrameEvent::ObstacleBroken { id: obstacle.id });
                    }
                }
                if obstacle.thickness < 0 {
                    // Absolute block
                    projectile.alive = false;
                } else {
                    projectile.pierce -= obstacle.thickness;
                    if projectile.pierce < 0 {
                        projectile.alive = false;
                    }
                }
            }

            for player in &mut self.players {
                if !projectile.alive || !player.alive {
                    continue;
                }
                let Some(player_collider) = &mut player.collider else {
                    continue;
                };
                if !swept.collider.shares_height(player_collider) {
                    continue;
                }
                if !aabb_overlap(
                    swept.collider.world_bounds(anchor),
                    player_collider.world_bounds(player.position),
                ) {
                    continue;
                }
                let new_pair = swept.collider.on_collide(player.id);
                player_collider.check_collided(projectile.id);
                if !new_pair {
                    continue;
                }

                log::debug!("projectile {} hit player {}", projectile.id, player.id);
                events.push(FrameEvent::ProjectileHit {
                    projectile: projectile.id,
                    target: player.id,
                });
            }
        }

        // Finish pass: clear per-frame dedup state everywhere, only after
        // every pairwise test has run
        for player in &mut self.players {
            if let Some(collider) = &mut player.collider {
                collider.finish_collision_check();
            }
        }
        for obstacle in &mut self.obstacles {
            if let Some(collider) = &mut obstacle.collider {
                collider.finish_collision_check();
            }
        }
        for projectile in &mut self.projectiles {
            if let Some(swept) = &mut projectile.collider {
                swept.collider.finish_collision_check();
            }
        }

        // Reap
        self.players.retain(|p| p.alive);
        self.obstacles.retain(|o| o.alive);
        self.projectiles.retain(|p| p.alive);

        self.frame += 1;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collider::{Collider, SweptCollider};
    use crate::sim::mask::Mask;
    use crate::sim::state::Breakable;

    fn world() -> World {
        World::new(WorldConfig::default())
    }

    fn bolt(world: &mut World, position: Vec2, speed: f32, angle: f32) -> ObjectId {
        let id = world.next_entity_id();
        let mut p = Projectile::new(id, "bolt", position, speed, angle);
        p.collider = Some(SweptCollider::new(
            vec![0],
            Mask::from_size(1.0, 1.0).unwrap(),
        ));
        world.add_projectile(p)
    }

    fn wall(world: &mut World, position: Vec2, thickness: i32) -> ObjectId {
        let id = world.next_entity_id();
        let o = Obstacle::new(id, position, vec![0], thickness)
            .with_mask(Mask::from_size(2.0, 10.0).unwrap());
        world.add_obstacle(o)
    }

    #[test]
    fn test_expiry_event_and_reap() {
        let mut w = world();
        let id = bolt(&mut w, Vec2::ZERO, 10.0, 0.0);
        w.projectiles[0].range = 5.0;

        assert!(w.step(1.0).is_empty());
        let events = w.step(1.0);
        assert_eq!(events, vec![FrameEvent::ProjectileExpired { id }]);
        assert!(w.projectiles.is_empty());
    }

    #[test]
    fn test_touching_pair_fires_once_per_frame() {
        let mut w = world();
        // Stationary projectile overlapping the wall; it keeps touching
        let pid = bolt(&mut w, Vec2::new(9.0, 0.0), 0.0, 0.0);
        let oid = wall(&mut w, Vec2::new(9.0, 0.0), 0);
        w.projectiles[0].pierce = 100;

        let hits = |events: &[FrameEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, FrameEvent::ProjectileHit { .. }))
                .count()
        };

        // One hit per frame, every frame: finish_collision_check cleared the
        // pair between frames
        let events = w.step(1.0);
        assert_eq!(hits(&events), 1);
        assert_eq!(
            events[0],
            FrameEvent::ProjectileHit {
                projectile: pid,
                target: oid
            }
        );
        let events = w.step(1.0);
        assert_eq!(hits(&events), 1);
    }

    #[test]
    fn test_pierce_bookkeeping() {
        let mut w = world();
        bolt(&mut w, Vec2::new(0.0, 0.0), 10.0, 0.0);
        w.projectiles[0].pierce = 1;
        wall(&mut w, Vec2::new(5.0, -2.0), 1);
        wall(&mut w, Vec2::new(8.0, -2.0), 1);

        // First frame crosses both walls; the first costs the whole pierce
        // budget, the second would take it negative and expires the bolt
        let events = w.step(1.0);
        let hits = events
            .iter()
            .filter(|e| matches!(e, FrameEvent::ProjectileHit { .. }))
            .count();
        assert_eq!(hits, 2);
        assert!(w.projectiles.is_empty());
    }

    #[test]
    fn test_absolute_block_expires_projectile() {
        let mut w = world();
        bolt(&mut w, Vec2::ZERO, 10.0, 0.0);
        w.projectiles[0].pierce = 1_000;
        wall(&mut w, Vec2::new(5.0, -2.0), -1);

        w.step(1.0);
        assert!(w.projectiles.is_empty());
    }

    #[test]
    fn test_breakable_obstacle_breaks_and_reaps() {
        let mut w = world();
        bolt(&mut w, Vec2::ZERO, 10.0, 0.0);
        w.projectiles[0].damage = 5;
        w.projectiles[0].pierce = 10;
        let oid = wall(&mut w, Vec2::new(5.0, -2.0), 0);
        w.obstacles[0].breakable = Some(Breakable::new(5));

        let events = w.step(1.0);
        assert!(events.contains(&FrameEvent::ObstacleBroken { id: oid }));
        assert!(w.obstacles.is_empty());
        // Thickness 0 leaves the projectile flying
        assert_eq!(w.projectiles.len(), 1);
    }

    #[test]
    fn test_heights_gate_collisions() {
        let mut w = world();
        bolt(&mut w, Vec2::ZERO, 10.0, 0.0);
        let id = w.next_entity_id();
        // Same spot, different plane
        let o = Obstacle::new(id, Vec2::new(5.0, -2.0), vec![3], -1)
            .with_mask(Mask::from_size(2.0, 10.0).unwrap());
        w.add_obstacle(o);

        let events = w.step(1.0);
        assert!(events.is_empty());
        assert_eq!(w.projectiles.len(), 1);
    }

    #[test]
    fn test_swept_mask_catches_tunneling() {
        let mut w = world();
        // Fast enough to jump clear over a thin wall in one frame
        bolt(&mut w, Vec2::ZERO, 100.0, 0.0);
        w.projectiles[0].pierce = 0;
        let oid = wall(&mut w, Vec2::new(20.0, -2.0), -1);

        let events = w.step(1.0);
        assert!(events.contains(&FrameEvent::ProjectileHit {
            projectile: 1,
            target: oid
        }));
        assert!(w.projectiles.is_empty());
    }

    #[test]
    fn test_no_hit_beyond_the_traveled_leg() {
        let mut w = world();
        // The frame's move ends at x=100; this wall sits farther downrange
        bolt(&mut w, Vec2::ZERO, 100.0, 0.0);
        wall(&mut w, Vec2::new(150.0, -2.0), 0);

        let events = w.step(1.0);
        assert!(events.is_empty(), "{events:?}");
        assert_eq!(w.projectiles.len(), 1);
    }

    #[test]
    fn test_homing_projectile_steers_each_frame() {
        let mut w = world();
        let target = w.next_entity_id();
        let o = Obstacle::new(target, Vec2::new(10.0, 10.0), vec![5], 0)
            .with_mask(Mask::from_size(2.0, 2.0).unwrap());
        w.add_obstacle(o);

        let id = w.next_entity_id();
        let mut p = Projectile::new(id, "seeker", Vec2::ZERO, 2.0, 0.0);
        p.collider = Some(SweptCollider::new(
            vec![0],
            Mask::from_size(2.0, 2.0).unwrap(),
        ));
        p.policy = MovementPolicy::Homing {
            target,
            accuracy: 1.0,
        };
        w.add_projectile(p);

        w.step(1.0);
        // Own center (1,1), target center (11,11): 45 degrees
        let heading = w.projectiles[0].angle;
        assert!((heading - std::f32::consts::FRAC_PI_4).abs() < 1e-4);

        // The target is gone next frame; the heading stays put
        w.obstacles.clear();
        w.step(1.0);
        assert!((w.projectiles[0].angle - heading).abs() < 1e-6);
    }

    #[test]
    fn test_player_limit() {
        let mut w = world();
        for i in 0..2 {
            let id = w.next_entity_id();
            w.add_player(Player::new(id, &format!("p{i}"), Vec2::ZERO))
                .unwrap();
        }
        let id = w.next_entity_id();
        let err = w.add_player(Player::new(id, "p2", Vec2::ZERO)).unwrap_err();
        assert_eq!(err, WorldError::PlayersFull { max: 2 });
    }

    #[test]
    fn test_projectile_hits_player() {
        let mut w = world();
        let pid = w.next_entity_id();
        let mut player = Player::new(pid, "aki", Vec2::new(5.0, -1.0));
        player.collider = Some(Collider::new(vec![0], Mask::from_size(2.0, 4.0).unwrap()));
        w.add_player(player).unwrap();

        let bolt_id = bolt(&mut w, Vec2::ZERO, 10.0, 0.0);
        let events = w.step(1.0);
        assert!(events.contains(&FrameEvent::ProjectileHit {
            projectile: bolt_id,
            target: pid
        }));
        // Players take no core damage; both objects survive
        assert_eq!(w.players.len(), 1);
        assert_eq!(w.projectiles.len(), 1);
    }

    #[test]
    fn test_identically_stepped_worlds_stay_identical() {
        let build = || {
            let mut w = world();
            bolt(&mut w, Vec2::ZERO, 7.0, 0.3);
            w.projectiles[0].range = 40.0;
            w.projectiles[0].pierce = 3;
            w.projectiles[0].damage = 2;
            wall(&mut w, Vec2::new(12.0, 0.0), 1);
            w.obstacles[0].breakable = Some(Breakable::new(6));
            w
        };
        let mut a = build();
        let mut b = build();
        for _ in 0..12 {
            let ea = a.step(0.25);
            let eb = b.step(0.25);
            assert_eq!(ea, eb);
        }
        assert_eq!(a.frame, b.frame);
        assert_eq!(a.projectiles.len(), b.projectiles.len());
        for (pa, pb) in a.projectiles.iter().zip(b.projectiles.iter()) {
            assert_eq!(pa.position, pb.position);
            assert_eq!(pa.range, pb.range);
        }
    }
}
