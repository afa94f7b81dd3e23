//! Demo entry point
//!
//! Runs a small scripted skirmish and prints what happened: a player firing
//! three projectile kinds at a wall line, one wall breakable. Useful for
//! eyeballing the frame protocol end to end (RUST_LOG=debug for per-event
//! logging).

use glam::Vec2;

use skirmish::WorldConfig;
use skirmish::consts::{GROUND_HEIGHT, SIM_DT};
use skirmish::sim::{
    Breakable, FrameEvent, Mask, MovementPolicy, Obstacle, Player, Projectile, RangedWeapon,
    SweptCollider, World,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("skirmish demo starting...");

    let mut world = World::new(WorldConfig::default());

    let player_id = world.next_entity_id();
    let mut player = Player::new(player_id, "aki", Vec2::new(0.0, 40.0));
    player.weapon = Some(RangedWeapon::new("bow", 0.8));
    world.add_player(player)?;

    // A wall line downrange; the middle section can be shot through
    let wall_mask = Mask::from_size(4.0, 30.0)?;
    for (x, thickness, hp) in [(80.0, -1, 0), (60.0, 1, 12), (100.0, -1, 0)] {
        let id = world.next_entity_id();
        let mut wall = Obstacle::new(id, Vec2::new(x, 25.0), vec![GROUND_HEIGHT], thickness)
            .with_mask(wall_mask.clone());
        if hp > 0 {
            wall.breakable = Some(Breakable::new(hp));
        }
        world.add_obstacle(wall);
    }
    let target_id = world.obstacles[0].id;

    // Straight bolt, accelerating shell, homing seeker
    let id = world.next_entity_id();
    let mut bolt = Projectile::new(id, "bolt", Vec2::new(0.0, 41.0), 90.0, 0.0);
    bolt.collider = Some(SweptCollider::new(vec![GROUND_HEIGHT], Mask::from_size(2.0, 1.0)?));
    bolt.range = 200.0;
    bolt.pierce = 2;
    bolt.damage = 4;
    bolt.source = Some(player_id);
    world.add_projectile(bolt);

    let id = world.next_entity_id();
    let mut shell = Projectile::new(id, "shell", Vec2::new(0.0, 30.0), 20.0, 0.0);
    shell.collider = Some(SweptCollider::new(vec![GROUND_HEIGHT], Mask::circle(1.5)?));
    shell.policy = MovementPolicy::Accelerating { accel: 40.0 };
    shell.timer = 2.0;
    shell.pierce = 1;
    shell.damage = 8;
    shell.source = Some(player_id);
    world.add_projectile(shell);

    let id = world.next_entity_id();
    let mut seeker = Projectile::new(id, "seeker", Vec2::new(0.0, 0.0), 55.0, 0.0);
    seeker.collider = Some(SweptCollider::new(vec![GROUND_HEIGHT], Mask::from_size(2.0, 2.0)?));
    seeker.policy = MovementPolicy::Homing {
        target: target_id,
        accuracy: 1.0,
    };
    seeker.range = 300.0;
    seeker.damage = 3;
    seeker.source = Some(player_id);
    world.add_projectile(seeker);

    let mut hits = 0u32;
    let mut expired = 0u32;
    let mut broken = 0u32;
    for _ in 0..(3.0 / SIM_DT) as u32 {
        for event in world.step(SIM_DT) {
            match event {
                FrameEvent::ProjectileHit { projectile, target } => {
                    hits += 1;
                    log::info!("frame {}: projectile {projectile} hit {target}", world.frame);
                }
                FrameEvent::ProjectileExpired { id } => {
                    expired += 1;
                    log::info!("frame {}: projectile {id} expired", world.frame);
                }
                FrameEvent::ObstacleBroken { id } => {
                    broken += 1;
                    log::info!("frame {}: obstacle {id} broken", world.frame);
                }
            }
        }
        if world.projectiles.is_empty() {
            break;
        }
    }

    println!("\nSkirmish summary");
    println!("  frames:      {}", world.frame);
    println!("  hits:        {hits}");
    println!("  expirations: {expired}");
    println!("  broken:      {broken}");
    println!(
        "  left flying: {}, walls standing: {}",
        world.projectiles.len(),
        world.obstacles.len()
    );
    Ok(())
}
