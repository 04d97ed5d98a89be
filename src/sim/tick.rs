//! Per-frame simulation step
//!
//! One call advances the whole session: input, camera, streaming, fuel,
//! physics, then collision effects. Removals are collected during the
//! collision pass and applied after it.

use glam::{Vec2, Vec3};

use super::camera::CameraMode;
use super::collider::get_collisions;
use super::entity::{EntityId, EntityKind, ObstacleKind, PlatformColor};
use super::state::{GameOverCause, GameResult};
use super::streaming::{decoration_management, platform_management};
use super::world::World;
use crate::map_between_ranges;

/// Input commands for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// A held
    pub left: bool,
    /// D held
    pub right: bool,
    /// W held
    pub faster: bool,
    /// S held
    pub slower: bool,
    /// Space pressed this frame
    pub jump: bool,
    /// C pressed this frame
    pub toggle_camera: bool,
    /// Mouse movement while the right button is held
    pub mouse_drag: Option<Vec2>,
    /// Scroll wheel offset
    pub scroll: f32,
}

/// Advance the session by one frame
///
/// Returns the final result on the frame the run ends; every later call is
/// a no-op returning `None`.
pub fn tick(world: &mut World, input: &TickInput, dt: f32) -> Option<GameResult> {
    if !world.state.is_running() {
        return None;
    }
    let dt = dt.max(0.0);

    update_player(world, input);
    update_camera(world, input);

    let start = world.tuning.player.start_position;
    let player_position = world.player().position;
    world.state.update_score(player_position, start);

    platform_management(world);
    decoration_management(world);

    world.state.burn_fuel(dt, &world.tuning);
    world
        .state
        .update_forced_speed(world.integrator.time(), world.tuning.player.forced_speed_time);

    world.step_physics(dt);
    resolve_collisions(world);

    world.light_position = world.player().position + world.tuning.camera.light_offset;

    world.state.finish(world.tuning.score_weight)
}

fn update_player(world: &mut World, input: &TickInput) {
    let p = world.tuning.player.clone();
    let speed = world.state.player.speed;

    // Forward motion is kinematic and per frame
    let player = world.player_mut();
    player.body.state.position.z -= speed;

    let velocity_x = player.body.state.velocity.x;
    if input.left {
        player.add_impulse(Vec3::X * (-p.lateral_speed - velocity_x));
    } else if input.right {
        player.add_impulse(Vec3::X * (p.lateral_speed - velocity_x));
    } else if input.faster {
        world.state.change_speed(p.speed_step, p.min_speed, p.max_speed);
    } else if input.slower {
        world.state.change_speed(-p.speed_step, p.min_speed, p.max_speed);
    }

    let player = world.player_mut();
    if input.jump && !player.in_jump {
        player.in_jump = true;
        player.body.state.velocity.y = p.jump_velocity;
    }
    player.sync_from_body();

    if player.position.y < p.out_of_bound_y {
        world.state.fail(GameOverCause::Fell);
    }
}

fn update_camera(world: &mut World, input: &TickInput) {
    let camera_tuning = world.tuning.camera.clone();
    let settings = &mut world.state.camera;

    if input.toggle_camera {
        settings.toggle_mode();
    }
    if let Some(delta) = input.mouse_drag {
        settings.drag(delta.x, delta.y, world.mouse_sensitivity, &camera_tuning);
    }
    if input.scroll != 0.0 {
        settings.scroll(input.scroll, world.zoom_step, &camera_tuning);
    }

    let p = &world.tuning.player;
    settings.fov = map_between_ranges(
        world.state.player.speed as f64,
        p.min_speed as f64,
        p.max_speed as f64,
        camera_tuning.min_fov as f64,
        camera_tuning.max_fov as f64,
        1,
    ) as f32;

    let settings = world.state.camera;
    let player_position = world.player().position;
    world.camera.follow(player_position, &settings);
    world.player_mut().rendered = settings.mode != CameraMode::FirstPerson;
}

/// Player against platforms and obstacles, then effects, then removals
fn resolve_collisions(world: &mut World) {
    let Some(source) = world.player().collider.clone() else {
        return;
    };
    let hits = get_collisions(
        &source,
        world
            .entities()
            .filter(|e| e.kind().is_platform() || e.kind().is_obstacle())
            .filter_map(|e| e.collider.as_ref())
            .filter(|c| c.affects_physics),
    );
    if hits.is_empty() {
        return;
    }

    land_player(world, &hits);

    let mut removals = Vec::new();
    for &id in &hits {
        let Some(kind) = world.get(id).map(|e| e.kind()) else {
            continue;
        };
        match kind {
            EntityKind::Platform { color } => {
                apply_platform_effect(world, color);
                if let Some(platform) = world.get_mut(id) {
                    platform.set_platform_color(PlatformColor::Purple);
                }
            }
            EntityKind::Obstacle {
                kind: ObstacleKind::Good,
            } => {
                world.state.player.collected += 1;
                log::debug!("Collected {} (total {})", id, world.state.player.collected);
                removals.push(id);
            }
            EntityKind::Obstacle {
                kind: ObstacleKind::Bad,
            } => {
                let animation = world.tuning.player.power_animation_time;
                world.player_mut().set_distorted(animation);
                world.state.lose_life(GameOverCause::Obstacle);
                log::debug!("Hit obstacle {} ({} lives left)", id, world.state.player.lives);
                removals.push(id);
            }
            _ => {}
        }
    }

    for id in removals {
        world.remove(id);
    }
}

/// Stick the player to the platform top unless it already sank too deep
fn land_player(world: &mut World, hits: &std::collections::BTreeSet<EntityId>) {
    let on_platform = hits
        .iter()
        .any(|&id| world.get(id).is_some_and(|e| e.kind().is_platform()));
    let height = world.tuning.player.height;
    let top = world.tuning.platforms.top_height;

    let player = world.player_mut();
    if on_platform && player.body.state.position.y > -height / 4.0 {
        player.body.state.velocity.y = 0.0;
        player.body.state.position.y = top + height / 4.0;
        player.in_jump = false;
        player.sync_from_body();
    }
}

fn apply_platform_effect(world: &mut World, color: PlatformColor) {
    let tuning = &world.tuning;
    let animation = tuning.player.power_animation_time;
    match color {
        PlatformColor::Red => world.state.fail(GameOverCause::RedPlatform),
        PlatformColor::Yellow => {
            world.state.add_fuel(-tuning.fuel.loss, tuning.fuel.max);
            world.player_mut().set_distorted(animation);
        }
        PlatformColor::Orange => {
            let forced_time = tuning.player.forced_speed_time;
            world
                .state
                .start_forced_speed(world.integrator.time(), tuning.player.max_speed);
            world.player_mut().set_distorted(forced_time);
        }
        PlatformColor::Green => {
            world.state.add_fuel(tuning.fuel.gain, tuning.fuel.max);
            world.player_mut().set_distorted(animation);
        }
        PlatformColor::White => {
            if world.state.player.lives < tuning.player.max_lives {
                world.state.gain_life(tuning.player.max_lives);
                world.player_mut().set_distorted(animation);
            }
        }
        PlatformColor::Blue | PlatformColor::Purple => return,
    }
    log::debug!("Platform effect: {}", color.as_str());
}
