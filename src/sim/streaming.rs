//! World streaming
//!
//! Spawns platforms (with their obstacles and collectibles) ahead of the
//! player on the lane that has waited longest, and background decorations
//! off to the sides. Everything the player has left behind is despawned, so
//! the live entity count stays bounded for an endless run.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::entity::{EntityId, EntityKind, ObstacleKind, PlanetKind, PlatformColor, StarKind, drift_movement};
use super::state::SIDES;
use super::world::World;
use crate::map_between_ranges;

/// Color of a spawned platform for a `roll` in `[0, 100)`
///
/// The first `simple_percent` rolls are plain blue; the rest are remapped
/// to deciles and split into red, yellow, green, orange and white.
pub fn color_for_roll(roll: u32, simple_percent: u32) -> PlatformColor {
    if roll < simple_percent {
        return PlatformColor::Blue;
    }
    let decile = map_between_ranges(roll as f64, simple_percent as f64, 100.0, 0.0, 9.0, 1);
    if decile < 1.0 {
        PlatformColor::Red
    } else if decile < 4.0 {
        PlatformColor::Yellow
    } else if decile < 6.0 {
        PlatformColor::Green
    } else if decile < 8.0 {
        PlatformColor::Orange
    } else {
        PlatformColor::White
    }
}

/// Lane with the largest spawn cursor, i.e. the one that spawned longest ago
///
/// Ties go to the lowest lane index.
pub fn next_lane(cursors: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (lane, &z) in cursors.iter().enumerate() {
        if best.is_none_or(|(_, best_z)| z > best_z) {
            best = Some((lane, z));
        }
    }
    best.map(|(lane, _)| lane)
}

/// Spawn, despawn and re-anchor platforms for this frame
pub fn platform_management(world: &mut World) {
    spawn_platforms(world);
    despawn_passed_platforms(world);
    correct_platform_cursors(world);
}

fn spawn_platforms(world: &mut World) {
    let p = world.tuning.platforms.clone();
    let lane_count = p.lanes_x.len() as u64;

    for _ in 0..p.spawns_per_frame {
        if world.state.live_platforms >= p.max_platforms {
            break;
        }
        let Some(lane) = next_lane(&world.state.next_platform_spawn) else {
            break;
        };
        let z = world.state.next_platform_spawn[lane];
        let x = p.lanes_x[lane];

        // The opening row is plain so nobody loses on the first frames
        let opening = world.state.platforms_spawned < lane_count;
        let color = if opening {
            PlatformColor::Blue
        } else {
            let roll = world.rng().random_range(0..100);
            color_for_roll(roll, p.simple_percent)
        };
        let gap = world.rng().random_range(p.min_gap..p.max_gap) as f32;

        world.spawn(EntityKind::Platform { color }, Vec3::new(x, p.top_height, z));
        if !opening {
            spawn_platform_extras(world, x, z);
        }

        world.state.next_platform_spawn[lane] -= p.length + gap;
    }
}

/// Obstacle and collectible draws for a freshly spawned platform
///
/// Both draws are independent; the collectible only avoids the obstacle's
/// slot.
fn spawn_platform_extras(world: &mut World, x: f32, platform_z: f32) {
    let p = &world.tuning.platforms;
    let (slots, length) = (p.slots.max(1), p.length);
    let (obstacle_percent, collectible_percent) = (p.obstacle_percent, p.collectible_percent);
    let slot_z = |slot: u32| platform_z - length / 2.0 + length * (slot as f32 + 0.5) / slots as f32;

    let mut free: Vec<u32> = (0..slots).collect();

    if world.rng().random_range(0..100) < obstacle_percent {
        let i = world.rng().random_range(0..free.len());
        let slot = free.swap_remove(i);
        world.spawn(
            EntityKind::Obstacle {
                kind: ObstacleKind::Bad,
            },
            Vec3::new(x, 0.0, slot_z(slot)),
        );
    }

    if !free.is_empty() && world.rng().random_range(0..100) < collectible_percent {
        let i = world.rng().random_range(0..free.len());
        let slot = free[i];
        world.spawn(
            EntityKind::Obstacle {
                kind: ObstacleKind::Good,
            },
            Vec3::new(x, 0.0, slot_z(slot)),
        );
    }
}

fn despawn_passed_platforms(world: &mut World) {
    let p = &world.tuning.platforms;
    let limit = world.player().position.z + p.length / 2.0 + p.no_spawn_range;

    let passed: Vec<EntityId> = world
        .entities()
        .filter(|e| e.kind().is_platform() || e.kind().is_obstacle())
        .filter(|e| e.position.z > limit)
        .map(|e| e.id())
        .collect();
    for id in passed {
        world.remove(id);
    }
}

/// Pull any cursor that fell within `no_spawn_range` of the player back
/// out ahead of it
fn correct_platform_cursors(world: &mut World) {
    let range = world.tuning.platforms.no_spawn_range;
    let player_z = world.player().position.z;
    for cursor in world.state.next_platform_spawn.iter_mut() {
        if *cursor > player_z - range {
            *cursor = player_z - 2.0 * range;
        }
    }
}

/// Spawn and despawn background stars and planets for this frame
pub fn decoration_management(world: &mut World) {
    despawn_far_decorations(world);
    spawn_decoration(world);
    correct_decoration_cursors(world);
}

fn despawn_far_decorations(world: &mut World) {
    let radius = world.tuning.decorations.despawn_radius;
    let player = world.player().position;

    // Far to the side but still ahead stays; only far AND behind goes
    let stale: Vec<EntityId> = world
        .entities()
        .filter(|e| e.kind().is_decoration())
        .filter(|e| e.position.distance(player) > radius && e.position.z > player.z)
        .map(|e| e.id())
        .collect();
    for id in stale {
        world.remove(id);
    }
}

fn spawn_decoration(world: &mut World) {
    let d = world.tuning.decorations.clone();
    if world.state.live_decorations >= d.max_live {
        return;
    }
    let Some(side) = next_lane(&world.state.next_decoration_spawn) else {
        return;
    };
    let z = world.state.next_decoration_spawn[side];
    let center_x = lanes_center(&world.tuning.platforms.lanes_x);
    let sign = if side == 0 { -1.0 } else { 1.0 };

    let rng = world.rng();
    let x = center_x + sign * rng.random_range(d.min_x..=d.max_x);
    let y = rng.random_range(d.min_y..=d.max_y);
    let kind = if rng.random_range(0..100) < d.star_percent {
        EntityKind::Star {
            kind: StarKind::ALL[rng.random_range(0..StarKind::ALL.len())],
        }
    } else {
        EntityKind::Planet {
            kind: PlanetKind::ALL[rng.random_range(0..PlanetKind::ALL.len())],
        }
    };
    let amplitude = rng.random_range(0.0..=d.bob_amplitude);
    let phase = rng.random_range(0.0..TAU);
    let drift = Vec3::new(
        rng.random_range(-d.max_drift..=d.max_drift),
        0.0,
        rng.random_range(-d.max_drift..=d.max_drift),
    );
    let offset = rng.random_range(d.min_z_offset..=d.max_z_offset);

    let id = world.spawn(kind, Vec3::new(x, y, z));
    if let Some(entity) = world.get_mut(id) {
        entity.body.set_movement(drift_movement(y, amplitude, phase));
        entity.add_impulse(drift);
    }
    world.state.next_decoration_spawn[side] -= offset;
}

fn correct_decoration_cursors(world: &mut World) {
    let range = world.tuning.platforms.no_spawn_range;
    let player_z = world.player().position.z;
    for cursor in world.state.next_decoration_spawn.iter_mut().take(SIDES) {
        if *cursor > player_z - range {
            *cursor = player_z - 2.0 * range;
        }
    }
}

fn lanes_center(lanes: &[f32]) -> f32 {
    if lanes.is_empty() {
        return 0.0;
    }
    lanes.iter().sum::<f32>() / lanes.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetTable;
    use crate::platform::headless::StaticAssets;
    use crate::settings::Settings;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn world_with(tuning: Tuning, seed: u64) -> World {
        let assets = AssetTable::load(&mut StaticAssets::new());
        World::with_seed(tuning, &Settings::default(), assets, seed)
    }

    fn platforms(world: &World) -> Vec<(f32, f32, PlatformColor)> {
        world
            .entities()
            .filter_map(|e| e.platform_color().map(|c| (e.position.x, e.position.z, c)))
            .collect()
    }

    #[test]
    fn test_color_table() {
        assert_eq!(color_for_roll(0, 60), PlatformColor::Blue);
        assert_eq!(color_for_roll(59, 60), PlatformColor::Blue);
        assert_eq!(color_for_roll(60, 60), PlatformColor::Red);
        assert_eq!(color_for_roll(64, 60), PlatformColor::Red);
        assert_eq!(color_for_roll(65, 60), PlatformColor::Yellow);
        assert_eq!(color_for_roll(78, 60), PlatformColor::Green);
        assert_eq!(color_for_roll(87, 60), PlatformColor::Orange);
        assert_eq!(color_for_roll(99, 60), PlatformColor::White);
        assert_eq!(color_for_roll(99, 100), PlatformColor::Blue);
    }

    #[test]
    fn test_next_lane_prefers_largest_cursor() {
        assert_eq!(next_lane(&[25.0, 26.0, 25.0]), Some(1));
        assert_eq!(next_lane(&[-5.0, -5.0, -9.0]), Some(0));
        assert_eq!(next_lane(&[]), None);
    }

    #[test]
    fn test_opening_row_is_plain_and_bare() {
        let mut world = world_with(Tuning::new(), 3);
        for _ in 0..3 {
            platform_management(&mut world);
        }
        let spawned = platforms(&world);
        assert_eq!(spawned.len(), 3);
        assert!(spawned.iter().all(|&(_, _, c)| c == PlatformColor::Blue));
        assert_eq!(world.state.live_obstacles, 0);

        // The first platform lands under the ship, in its lane
        let (x, z, _) = spawned[0];
        assert_eq!((x, z), (0.0, 26.0));
    }

    #[test]
    fn test_platform_cap_is_respected() {
        let mut world = world_with(Tuning::new(), 11);
        for _ in 0..100 {
            platform_management(&mut world);
        }
        assert_eq!(world.state.live_platforms, world.tuning.platforms.max_platforms);
    }

    #[test]
    fn test_passed_platforms_are_despawned() {
        let mut world = world_with(Tuning::new(), 5);
        for _ in 0..15 {
            platform_management(&mut world);
        }
        let before = world.state.live_platforms;
        // Teleport far ahead; everything spawned so far is now behind
        world.player_mut().body.state.position.z = -2000.0;
        world.player_mut().sync_from_body();
        platform_management(&mut world);
        assert!(world.state.live_platforms < before);
        assert_eq!(world.state.live_obstacles, 0);
        assert!(world.entities().all(|e| !e.kind().is_platform() || e.position.z < -1900.0));
    }

    #[test]
    fn test_extras_sit_on_their_platform() {
        let mut tuning = Tuning::new();
        tuning.platforms.obstacle_percent = 100;
        tuning.platforms.collectible_percent = 100;
        let mut world = world_with(tuning, 9);
        for _ in 0..6 {
            platform_management(&mut world);
        }
        let half = world.tuning.platforms.length / 2.0;
        let plats = platforms(&world);
        let extras: Vec<_> = world.entities().filter(|e| e.kind().is_obstacle()).collect();
        // Three platforms past the opening row, each with both extras
        assert_eq!(extras.len(), 6);
        for extra in extras {
            assert!(plats.iter().any(|&(x, z, _)| x == extra.position.x
                && (extra.position.z - z).abs() < half));
        }
    }

    #[test]
    fn test_decorations_are_capped_and_off_track() {
        let mut world = world_with(Tuning::new(), 21);
        for _ in 0..200 {
            decoration_management(&mut world);
        }
        let d = &world.tuning.decorations;
        assert_eq!(world.state.live_decorations, d.max_live);
        for e in world.entities().filter(|e| e.kind().is_decoration()) {
            assert!(e.position.x.abs() >= d.min_x);
            assert!(e.collider.as_ref().is_some_and(|c| !c.affects_physics));
        }
    }

    #[test]
    fn test_inverted_decoration_ranges_still_stream() {
        let tuning = Tuning::from_json(
            r#"{ "decorations": { "min_x": 70.0, "min_y": 40.0, "bob_amplitude": -1.0, "max_drift": -0.5 } }"#,
        )
        .expect("valid tuning");
        let mut world = world_with(tuning, 13);
        for _ in 0..10 {
            decoration_management(&mut world);
        }
        assert!(world.state.live_decorations > 0);
        for e in world.entities().filter(|e| e.kind().is_decoration()) {
            assert_eq!(e.position.x.abs(), 70.0);
            assert_eq!(e.position.y, 40.0);
        }
    }

    #[test]
    fn test_decoration_ahead_is_kept_even_if_far() {
        let mut world = world_with(Tuning::new(), 2);
        let player_z = world.player().position.z;
        let ahead = world.spawn(
            EntityKind::Planet { kind: PlanetKind::Mars },
            Vec3::new(500.0, 0.0, player_z - 10.0),
        );
        let behind = world.spawn(
            EntityKind::Planet { kind: PlanetKind::Venus },
            Vec3::new(500.0, 0.0, player_z + 10.0),
        );
        let near_behind = world.spawn(
            EntityKind::Star { kind: StarKind::Red },
            Vec3::new(30.0, 0.0, player_z + 10.0),
        );
        decoration_management(&mut world);
        assert!(world.get(ahead).is_some());
        assert!(world.get(behind).is_none());
        assert!(world.get(near_behind).is_some());
    }

    proptest! {
        #[test]
        fn prop_no_cursor_left_behind(seed in 0u64..500, frames in 1usize..60, advance in 0.0f32..3.0) {
            let mut world = world_with(Tuning::new(), seed);
            let range = world.tuning.platforms.no_spawn_range;
            for _ in 0..frames {
                world.player_mut().body.state.position.z -= advance;
                world.player_mut().sync_from_body();
                platform_management(&mut world);
                let player_z = world.player().position.z;
                for &cursor in &world.state.next_platform_spawn {
                    prop_assert!(cursor <= player_z - range);
                }
            }
        }

        #[test]
        fn prop_every_lane_gets_platforms(seed in 0u64..500) {
            let mut world = world_with(Tuning::new(), seed);
            for _ in 0..30 {
                platform_management(&mut world);
            }
            for &lane_x in &world.tuning.platforms.lanes_x {
                prop_assert!(platforms(&world).iter().any(|&(x, _, _)| x == lane_x));
            }
        }
    }
}
