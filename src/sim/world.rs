//! World manager
//!
//! Owns the entity table, the asset handle tables, the simulation clock and
//! the session state. The player lives outside the table under a fixed id
//! so it can never be despawned by streaming.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::camera::Camera;
use super::entity::{Entity, EntityId, EntityKind};
use super::physics::Integrator;
use super::state::GameState;
use crate::assets::AssetTable;
use crate::renderer::{RenderFrame, RenderItem};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Everything one game session simulates
#[derive(Debug)]
pub struct World {
    pub tuning: Tuning,
    pub state: GameState,
    pub integrator: Integrator,
    pub camera: Camera,
    /// Main scene light, follows the player
    pub light_position: Vec3,
    /// Mouse sensitivity and zoom step, copied from the settings
    pub mouse_sensitivity: f32,
    pub zoom_step: f32,
    rng: Pcg32,
    assets: AssetTable,
    player: Entity,
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
}

impl World {
    /// Start a session; the seed comes from the settings or is drawn fresh
    pub fn new(tuning: Tuning, settings: &Settings, assets: AssetTable) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        Self::with_seed(tuning, settings, assets, seed)
    }

    pub fn with_seed(tuning: Tuning, settings: &Settings, assets: AssetTable, seed: u64) -> Self {
        let state = GameState::new(&tuning, settings.camera_mode, seed);
        let start = tuning.player.start_position;
        let player_id = EntityId(0);
        let player = Entity::new(player_id, EntityKind::Player, start, &assets, &tuning);

        log::info!(
            "Session started (seed {}, {} lanes, {})",
            seed,
            tuning.platforms.lanes_x.len(),
            settings.integrator.as_str()
        );

        Self {
            light_position: start + tuning.camera.light_offset,
            state,
            integrator: Integrator::new(settings.integrator.use_rk4()),
            camera: Camera::default(),
            mouse_sensitivity: settings.mouse_sensitivity,
            zoom_step: settings.zoom_step,
            rng: Pcg32::seed_from_u64(seed),
            assets,
            player,
            entities: BTreeMap::new(),
            next_id: player_id.0 + 1,
            tuning,
        }
    }

    pub fn player_id(&self) -> EntityId {
        self.player.id()
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Entity {
        &mut self.player
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Build and register a new entity
    pub fn spawn(&mut self, kind: EntityKind, position: Vec3) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let entity = Entity::new(id, kind, position, &self.assets, &self.tuning);
        match kind {
            EntityKind::Platform { .. } => {
                self.state.live_platforms += 1;
                self.state.platforms_spawned += 1;
            }
            EntityKind::Obstacle { .. } => self.state.live_obstacles += 1,
            EntityKind::Planet { .. } | EntityKind::Star { .. } => self.state.live_decorations += 1,
            EntityKind::Player => {}
        }
        log::debug!("Spawned {} {} at {:?}", kind, id, entity.position);
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity; unknown ids (and the player) are ignored
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        match entity.kind() {
            EntityKind::Platform { .. } => {
                self.state.live_platforms = self.state.live_platforms.saturating_sub(1)
            }
            EntityKind::Obstacle { .. } => {
                self.state.live_obstacles = self.state.live_obstacles.saturating_sub(1)
            }
            EntityKind::Planet { .. } | EntityKind::Star { .. } => {
                self.state.live_decorations = self.state.live_decorations.saturating_sub(1)
            }
            EntityKind::Player => {}
        }
        log::debug!("Removed {} {}", entity.kind(), id);
        Some(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        if id == self.player.id() {
            Some(&self.player)
        } else {
            self.entities.get(&id)
        }
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if id == self.player.id() {
            Some(&mut self.player)
        } else {
            self.entities.get_mut(&id)
        }
    }

    /// Non-player entities in id order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Live entities, player included
    pub fn entity_count(&self) -> usize {
        self.entities.len() + 1
    }

    /// Advance the clock once, then integrate and sync every entity
    pub fn step_physics(&mut self, dt: f32) {
        self.integrator.advance(dt);
        self.player.update_physics(&self.integrator, dt);
        for entity in self.entities.values_mut() {
            entity.update_physics(&self.integrator, dt);
            entity.update_platform_data();
        }
    }

    /// Render payload for the current state
    ///
    /// Entities whose mesh or shader failed to resolve are skipped.
    pub fn render_frame(&self) -> RenderFrame {
        let items = std::iter::once(&self.player)
            .chain(self.entities.values())
            .filter(|e| e.rendered)
            .filter_map(|e| {
                Some(RenderItem {
                    entity: e.id(),
                    mesh: e.mesh?,
                    shader: e.shader?,
                    texture: e.texture,
                    model: e.model_matrix(),
                    material: e.material,
                    distorted: e.is_distorted(),
                })
            })
            .collect();

        RenderFrame {
            view: self.camera.view_matrix(),
            fov: self.state.camera.fov,
            eye: self.camera.position,
            light_position: self.light_position,
            lights: self.entities.values().filter_map(|e| e.light).collect(),
            items,
            hud: self.state.hud(&self.tuning),
            time: self.integrator.time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::StaticAssets;
    use crate::sim::entity::{PlatformColor, StarKind};

    fn world() -> World {
        let assets = AssetTable::load(&mut StaticAssets::new());
        World::with_seed(Tuning::new(), &Settings::default(), assets, 1)
    }

    #[test]
    fn test_ids_increase_and_counters_track() {
        let mut world = world();
        let a = world.spawn(EntityKind::Platform { color: PlatformColor::Blue }, Vec3::ZERO);
        let b = world.spawn(EntityKind::Star { kind: StarKind::Red }, Vec3::new(30.0, 0.0, 0.0));
        assert!(a < b);
        assert!(world.player_id() < a);
        assert_eq!(world.state.live_platforms, 1);
        assert_eq!(world.state.live_decorations, 1);
        assert_eq!(world.entity_count(), 3);

        assert!(world.remove(a).is_some());
        assert!(world.remove(a).is_none());
        assert_eq!(world.state.live_platforms, 0);
        assert_eq!(world.state.platforms_spawned, 1);
    }

    #[test]
    fn test_player_cannot_be_removed() {
        let mut world = world();
        let player = world.player_id();
        assert!(world.remove(player).is_none());
        assert!(world.get(player).is_some());
    }

    #[test]
    fn test_step_physics_advances_clock_once() {
        let mut world = world();
        world.spawn(EntityKind::Platform { color: PlatformColor::Green }, Vec3::ZERO);
        world.spawn(EntityKind::Platform { color: PlatformColor::Red }, Vec3::ZERO);
        world.step_physics(0.25);
        assert_eq!(world.integrator.time(), 0.25);
        let player = world.player();
        assert_eq!(player.collider.as_ref().map(|c| c.position), Some(player.position));
    }

    #[test]
    fn test_render_frame_skips_unresolved_meshes() {
        let assets = AssetTable::load(&mut StaticAssets::without(&["c_sphere"]));
        let mut world = World::with_seed(Tuning::new(), &Settings::default(), assets, 1);
        world.spawn(EntityKind::Star { kind: StarKind::Blue }, Vec3::new(30.0, 0.0, 0.0));
        world.spawn(EntityKind::Platform { color: PlatformColor::Blue }, Vec3::ZERO);

        let frame = world.render_frame();
        // player + platform; the star has no mesh but still lights the scene
        assert_eq!(frame.items.len(), 2);
        assert_eq!(frame.lights.len(), 1);
    }
}
