//! Elliptic Lasers headless demo
//!
//! Builds a seeded random level, slowly rotates it on the sphere and logs what
//! the beams do. Usage: `elliptic-lasers [seed] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::f32::consts::{PI, TAU};
    use std::path::Path;

    use elliptic_lasers::consts::SIM_DT;
    use elliptic_lasers::renderer::{boundary_vertices, obstacle_vertices, segment_vertices};
    use elliptic_lasers::sim::{
        Door, Entities, GameState, Laser, Mirror, MirrorWallType, Portal, PortalPair, Target, Trigger, Wall, WallType,
        apply_isometry,
    };
    use elliptic_lasers::{Settings, SettingsError, polar_to_cartesian};
    use glam::{Quat, Vec2, Vec3};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    const FRAMES: usize = 240;
    const LOG_EVERY: usize = 60;
    /// Radians per frame the level turns about the y axis
    const SPIN: f32 = 0.01;

    fn random_point(rng: &mut Pcg32, max_radius: f32) -> Vec2 {
        let r = rng.random::<f32>().sqrt() * max_radius;
        polar_to_cartesian(r, rng.random_range(0.0..TAU))
    }

    fn random_color(rng: &mut Pcg32) -> [f32; 3] {
        [
            rng.random_range(0.3..1.0),
            rng.random_range(0.3..1.0),
            rng.random_range(0.3..1.0),
        ]
    }

    fn random_level(rng: &mut Pcg32) -> Entities {
        let mut entities = Entities::new();

        for _ in 0..rng.random_range(2..5) {
            let center = random_point(rng, 0.8);
            let angle = rng.random_range(0.0..TAU);
            let half = Vec2::from_angle(angle) * rng.random_range(0.05..0.2);
            let wall_type = if rng.random_bool(0.5) {
                WallType::Reflecting
            } else {
                WallType::Absorbing
            };
            entities.walls.create(Wall::new(center - half, center + half, wall_type));
        }
        for _ in 0..rng.random_range(1..4) {
            let wall_type = if rng.random_bool(0.7) {
                MirrorWallType::Reflecting
            } else {
                MirrorWallType::Absorbing
            };
            entities.mirrors.create(Mirror::new(
                random_point(rng, 0.7),
                rng.random_range(-PI..PI),
                rng.random_range(0.2..0.6),
                wall_type,
            ));
        }
        entities.portal_pairs.create(PortalPair::new(
            Portal::new(random_point(rng, 0.7), rng.random_range(-PI..PI)),
            Portal::new(random_point(rng, 0.7), rng.random_range(-PI..PI)),
        ));

        let trigger_color = random_color(rng);
        entities.triggers.create(Trigger::new(random_point(rng, 0.6), 1, trigger_color));
        let door_center = random_point(rng, 0.6);
        let door_half = Vec2::from_angle(rng.random_range(0.0..TAU)) * 0.15;
        entities
            .doors
            .create(Door::new(door_center - door_half, door_center + door_half, 1));

        for _ in 0..rng.random_range(1..3) {
            entities.targets.create(Target::new(random_point(rng, 0.7), 0.05));
        }
        for _ in 0..rng.random_range(1..3) {
            let color = random_color(rng);
            entities
                .lasers
                .create(Laser::new(random_point(rng, 0.5), rng.random_range(-PI..PI), color));
        }
        entities
    }

    pub fn run() -> Result<(), SettingsError> {
        let mut args = std::env::args().skip(1);
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
        let settings = match args.next() {
            Some(path) => Settings::load(Path::new(&path))?,
            None => Settings::default(),
        };

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut entities = random_level(&mut rng);
        log::info!(
            "Demo level built with seed {seed}: {} walls, {} mirrors, {} lasers, {} targets",
            entities.walls.len(),
            entities.mirrors.len(),
            entities.lasers.len(),
            entities.targets.len()
        );

        let tol = settings.tolerances;
        let mut state = GameState::new(settings);
        let spin = Quat::from_axis_angle(Vec3::Y, SPIN);
        let mut completed_frames = 0;

        for frame in 0..FRAMES {
            state.update(&mut entities, SIM_DT);
            if state.any_targets_turned_on {
                log::info!("Frame {frame}: target lit");
            }
            if state.level_complete(&entities) {
                completed_frames += 1;
            }
            if frame % LOG_EVERY == 0 {
                let vertex_count = boundary_vertices(128).len()
                    + obstacle_vertices(&entities, &tol).len()
                    + segment_vertices(&state.laser_segments).len();
                let lit = entities.targets.values().filter(|t| t.activated).count();
                log::info!(
                    "Frame {frame}: {} beam segments ({} drawn), {lit}/{} targets lit, {vertex_count} vertices, {:?}",
                    state.laser_segments.len(),
                    state.visible_segments().count(),
                    entities.targets.len(),
                    state.terminations
                );
            }
            apply_isometry(&mut entities, spin, &tol);
        }

        log::info!("Level complete on {completed_frames}/{FRAMES} frames");
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = demo::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
