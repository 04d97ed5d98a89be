//! Game entities and the kind-keyed factory
//!
//! An entity's kind decides everything about it at construction time: mesh,
//! shader, texture, material, scale, collider shape and physics parameters.
//! Kinds still round-trip to the legacy type strings (`"platform_red"`) for
//! logs and data files.

use std::fmt;
use std::str::FromStr;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::collider::Collider;
use super::physics::{Integrator, KinematicState, MovementFn, RigidBody};
use crate::assets::{AssetTable, MeshHandle, ShaderHandle, TextureHandle};
use crate::tuning::Tuning;

/// Unique, monotonically increasing entity id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Platform color, which doubles as its effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformColor {
    /// Instant game over
    Red,
    /// Fuel loss
    Yellow,
    /// Forced full speed
    Orange,
    /// Fuel gain
    Green,
    /// Extra life
    White,
    /// Plain lane platform
    Blue,
    /// Consumed; no effect
    Purple,
}

impl PlatformColor {
    pub const ALL: [PlatformColor; 7] = [
        PlatformColor::Red,
        PlatformColor::Yellow,
        PlatformColor::Orange,
        PlatformColor::Green,
        PlatformColor::White,
        PlatformColor::Blue,
        PlatformColor::Purple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformColor::Red => "red",
            PlatformColor::Yellow => "yellow",
            PlatformColor::Orange => "orange",
            PlatformColor::Green => "green",
            PlatformColor::White => "white",
            PlatformColor::Blue => "blue",
            PlatformColor::Purple => "purple",
        }
    }

    /// (ambient, emissive)
    pub fn colors(&self) -> (Vec3, Vec3) {
        match self {
            PlatformColor::Red => (Vec3::new(1.0, 0.0, 0.0), Vec3::new(25.5, 0.0, 0.0)),
            PlatformColor::Yellow => (Vec3::new(1.0, 1.0, 0.0), Vec3::new(25.5, 25.5, 0.0)),
            PlatformColor::Orange => (Vec3::new(0.9, 0.6, 0.2), Vec3::new(25.9, 9.9, 7.1)),
            PlatformColor::Green => (Vec3::new(0.9, 0.6, 0.2), Vec3::new(0.0, 25.5, 0.0)),
            PlatformColor::Purple => (Vec3::new(0.5, 0.1, 0.4), Vec3::new(12.7, 2.5, 10.2)),
            PlatformColor::Blue => (Vec3::new(0.0, 0.0, 1.0), Vec3::new(4.5, 5.5, 22.5)),
            PlatformColor::White => (Vec3::ONE, Vec3::splat(25.5)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Collectible: adds to the collected counter
    Good,
    /// Costs a life
    Bad,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Good => "good",
            ObstacleKind::Bad => "bad",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanetKind {
    Icy,
    Mars,
    Neptune,
    Jupiter,
    Uranus,
    Venus,
}

impl PlanetKind {
    pub const ALL: [PlanetKind; 6] = [
        PlanetKind::Icy,
        PlanetKind::Mars,
        PlanetKind::Neptune,
        PlanetKind::Jupiter,
        PlanetKind::Uranus,
        PlanetKind::Venus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanetKind::Icy => "icy",
            PlanetKind::Mars => "mars",
            PlanetKind::Neptune => "neptune",
            PlanetKind::Jupiter => "jupiter",
            PlanetKind::Uranus => "uranus",
            PlanetKind::Venus => "venus",
        }
    }

    /// (uniform scale, shininess)
    fn appearance(&self) -> (f32, f32) {
        match self {
            PlanetKind::Icy => (0.5, 2.5),
            PlanetKind::Mars => (0.5, 1.5),
            PlanetKind::Neptune => (1.0, 2.5),
            PlanetKind::Jupiter => (2.0, 2.5),
            PlanetKind::Uranus => (2.0, 1.5),
            PlanetKind::Venus => (1.0, 2.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StarKind {
    Blue,
    Red,
}

impl StarKind {
    pub const ALL: [StarKind; 2] = [StarKind::Blue, StarKind::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            StarKind::Blue => "blue",
            StarKind::Red => "red",
        }
    }
}

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Platform { color: PlatformColor },
    Obstacle { kind: ObstacleKind },
    Planet { kind: PlanetKind },
    Star { kind: StarKind },
}

impl EntityKind {
    pub fn is_platform(&self) -> bool {
        matches!(self, EntityKind::Platform { .. })
    }

    pub fn is_obstacle(&self) -> bool {
        matches!(self, EntityKind::Obstacle { .. })
    }

    pub fn is_decoration(&self) -> bool {
        matches!(self, EntityKind::Planet { .. } | EntityKind::Star { .. })
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Player => write!(f, "player"),
            EntityKind::Platform { color } => write!(f, "platform_{}", color.as_str()),
            EntityKind::Obstacle { kind } => write!(f, "obstacle_{}", kind.as_str()),
            EntityKind::Planet { kind } => write!(f, "planet_{}", kind.as_str()),
            EntityKind::Star { kind } => write!(f, "star_{}", kind.as_str()),
        }
    }
}

/// Unknown entity type string
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown entity type '{0}'")]
pub struct ParseKindError(pub String);

impl FromStr for EntityKind {
    type Err = ParseKindError;

    /// Exact names (`player`, `planet`, `star`) or prefixed variants
    /// (`platform_red`, `obstacle_bad`, `planet_mars`, `star_blue`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ParseKindError(s.to_string());
        match s {
            "player" => return Ok(EntityKind::Player),
            "planet" => return Ok(EntityKind::Planet { kind: PlanetKind::Icy }),
            "star" => return Ok(EntityKind::Star { kind: StarKind::Blue }),
            _ => {}
        }

        if let Some(suffix) = s.strip_prefix("platform_") {
            let color = PlatformColor::ALL
                .into_iter()
                .find(|c| c.as_str() == suffix)
                .ok_or_else(unknown)?;
            Ok(EntityKind::Platform { color })
        } else if let Some(suffix) = s.strip_prefix("obstacle_") {
            let kind = match suffix {
                "good" => ObstacleKind::Good,
                "bad" => ObstacleKind::Bad,
                _ => return Err(unknown()),
            };
            Ok(EntityKind::Obstacle { kind })
        } else if let Some(suffix) = s.strip_prefix("planet_") {
            let kind = PlanetKind::ALL
                .into_iter()
                .find(|k| k.as_str() == suffix)
                .ok_or_else(unknown)?;
            Ok(EntityKind::Planet { kind })
        } else if let Some(suffix) = s.strip_prefix("star_") {
            let kind = StarKind::ALL
                .into_iter()
                .find(|k| k.as_str() == suffix)
                .ok_or_else(unknown)?;
            Ok(EntityKind::Star { kind })
        } else {
            Err(unknown())
        }
    }
}

/// Surface parameters handed to the shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub emissive: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Material {
    const fn new(emissive: Vec3, ambient: Vec3, diffuse: Vec3, specular: Vec3, shininess: f32) -> Self {
        Self {
            emissive,
            ambient,
            diffuse,
            specular,
            shininess,
        }
    }
}

/// Point light carried by an entity (stars)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Constant, linear and quadratic attenuation
    pub attenuation: Vec3,
}

/// Free-floating drift for decorations: advance by velocity and bob along Y
///
/// Velocity still drives the motion, so impulses on a decoration nudge it.
pub fn drift_movement(base_y: f32, amplitude: f32, phase: f32) -> MovementFn {
    let mut base_y = base_y;
    Box::new(move |state: &mut KinematicState, time: f64, dt: f64| {
        let dt = dt as f32;
        base_y += state.velocity.y * dt;
        state.position.x += state.velocity.x * dt;
        state.position.z += state.velocity.z * dt;
        state.position.y = base_y + amplitude * (time as f32 + phase).sin();
    })
}

/// A game object
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    pub position: Vec3,
    scale: Vec3,
    pub body: RigidBody,
    pub collider: Option<Collider>,
    pub mesh: Option<MeshHandle>,
    pub shader: Option<ShaderHandle>,
    pub texture: Option<TextureHandle>,
    pub material: Material,
    pub light: Option<PointLight>,
    pub rendered: bool,
    /// Player only: airborne, so a jump is not allowed
    pub in_jump: bool,
    /// Remaining seconds of the distorted visual effect
    distorted: f64,
}

impl Entity {
    /// Build an entity of `kind` at `position`
    ///
    /// For platforms and obstacles the Y component is ignored: they are
    /// placed so they sit on the platform surface height.
    pub fn new(id: EntityId, kind: EntityKind, position: Vec3, assets: &AssetTable, tuning: &Tuning) -> Self {
        let mut entity = Self {
            id,
            kind,
            position,
            scale: Vec3::ONE,
            body: RigidBody::new(KinematicState::at(position)),
            collider: None,
            mesh: None,
            shader: None,
            texture: None,
            material: Material::new(Vec3::ZERO, Vec3::ONE, Vec3::ONE, Vec3::ZERO, 1.0),
            light: None,
            rendered: true,
            in_jump: false,
            distorted: 0.0,
        };

        match kind {
            EntityKind::Player => {
                let height = tuning.player.height;
                // Mirrored on Z so the ship model faces down the track
                entity.scale = Vec3::splat(height * 0.25) * Vec3::new(1.0, 1.0, -1.0);
                entity.mesh = assets.mesh("spaceship");
                entity.shader = assets.shader("Spaceship");
                entity.texture = assets.texture("spaceship");
                entity.material = Material::new(
                    Vec3::ZERO,
                    Vec3::splat(0.2),
                    Vec3::splat(2.0),
                    Vec3::splat(0.35),
                    128.0,
                );
                entity.collider = Some(
                    Collider::cuboid(id, position, Vec3::splat(height / 2.0)).with_physics(true),
                );
                entity.body.state.gravity_coef = tuning.player.gravity;
                entity.body.state.drag_coef = tuning.player.drag;
                entity.in_jump = true;
            }
            EntityKind::Platform { .. } => {
                let p = &tuning.platforms;
                entity.scale = Vec3::new(p.width, p.thickness, p.length);
                entity.mesh = assets.mesh("cube");
                entity.shader = assets.shader("EmmisiveTransparency");
                entity.texture = assets.texture("platform");
                entity.material = Material::new(
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::splat(32.0),
                    Vec3::splat(0.05),
                    16.0,
                );
                entity.position.y = p.top_height - entity.scale.y / 2.0;
                entity.body.state.position = entity.position;
                entity.body.physics_enabled = false;
                entity.collider =
                    Some(Collider::cuboid(id, entity.position, entity.scale).with_physics(true));
                entity.update_platform_data();
            }
            EntityKind::Obstacle { kind } => {
                entity.mesh = assets.mesh("cube");
                entity.shader = assets.shader("EmmisiveTransparency");
                entity.material = Material::new(
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::ONE,
                    Vec3::splat(0.3),
                    32.0,
                );
                let collider_dims = match kind {
                    ObstacleKind::Bad => {
                        entity.material.ambient = Vec3::new(1.0, 0.0, 0.0);
                        entity.material.emissive = Vec3::new(122.0, 0.0, 0.0);
                        entity.texture = assets.texture("obstacle1");
                        entity.scale
                    }
                    ObstacleKind::Good => {
                        entity.material.ambient = Vec3::new(0.9, 0.6, 0.2);
                        entity.material.emissive = Vec3::new(0.0, 122.0, 0.0);
                        entity.texture = assets.texture("obstacle2");
                        // Slightly generous pickup box
                        Vec3::splat(1.2)
                    }
                };
                entity.position.y = tuning.platforms.top_height + entity.scale.y / 2.0;
                entity.body.state.position = entity.position;
                entity.body.physics_enabled = false;
                entity.collider =
                    Some(Collider::cuboid(id, entity.position, collider_dims).with_physics(true));
            }
            EntityKind::Planet { kind } => {
                let (scale, shininess) = kind.appearance();
                entity.scale = Vec3::splat(scale);
                entity.mesh = assets.mesh("c_sphere");
                entity.shader = assets.shader("Planet");
                entity.texture = assets.texture(kind.as_str());
                entity.material = Material::new(
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::splat(32.0),
                    Vec3::splat(0.05),
                    shininess,
                );
                entity.make_decorative(position);
            }
            EntityKind::Star { kind } => {
                entity.scale = Vec3::splat(4.0);
                entity.mesh = assets.mesh("c_sphere");
                entity.shader = assets.shader("Planet");
                entity.texture = match kind {
                    StarKind::Blue => assets.texture("star_blue"),
                    StarKind::Red => assets.texture("star_red"),
                };
                entity.material = Material::new(
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::splat(32.0),
                    Vec3::splat(0.05),
                    96.0,
                );
                entity.light = Some(PointLight {
                    position,
                    ambient: Vec3::splat(0.3),
                    diffuse: Vec3::splat(0.1),
                    specular: Vec3::splat(0.15),
                    attenuation: Vec3::new(1.0, 0.014, 0.0007),
                });
                entity.make_decorative(position);
            }
        }

        entity
    }

    fn make_decorative(&mut self, position: Vec3) {
        // Only exists to give every entity the same collider interface
        self.collider = Some(Collider::sphere(self.id, position, 0.001).with_physics(false));
        self.body.state.drag_coef = 0.0;
        self.body.state.gravity_coef = 0.0;
        self.body.set_movement(drift_movement(position.y, 0.0, 0.0));
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn platform_color(&self) -> Option<PlatformColor> {
        match self.kind {
            EntityKind::Platform { color } => Some(color),
            _ => None,
        }
    }

    /// Recolor a platform; no-op for anything else
    pub fn set_platform_color(&mut self, color: PlatformColor) {
        if let EntityKind::Platform { .. } = self.kind {
            self.kind = EntityKind::Platform { color };
            self.update_platform_data();
        }
    }

    /// Refresh the material from the platform color
    ///
    /// Idempotent; safe to call every frame.
    pub fn update_platform_data(&mut self) {
        if let EntityKind::Platform { color } = self.kind {
            let (ambient, emissive) = color.colors();
            self.material.ambient = ambient;
            self.material.emissive = emissive;
        }
    }

    pub fn set_distorted(&mut self, seconds: f64) {
        self.distorted = seconds.max(0.0);
    }

    pub fn is_distorted(&self) -> bool {
        self.distorted > 0.0
    }

    pub fn add_impulse(&mut self, impulse: Vec3) {
        self.body.add_impulse(impulse);
    }

    /// Advance this entity by one frame and mirror the body position
    pub fn update_physics(&mut self, integrator: &Integrator, dt: f32) {
        if self.distorted > 0.0 {
            self.distorted = (self.distorted - dt as f64).max(0.0);
        }
        integrator.step(&mut self.body, dt);
        self.sync_from_body();
    }

    /// Copy the body position to the entity, its collider and its light
    pub fn sync_from_body(&mut self) {
        self.position = self.body.state.position;
        if let Some(collider) = self.collider.as_mut() {
            collider.position = self.position;
        }
        if let Some(light) = self.light.as_mut() {
            light.position = self.position;
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, Quat::IDENTITY, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::StaticAssets;
    use crate::sim::collider::ColliderShape;

    fn assets() -> AssetTable {
        AssetTable::load(&mut StaticAssets::new())
    }

    fn build(kind: &str, position: Vec3) -> Entity {
        let kind: EntityKind = kind.parse().expect("known kind");
        Entity::new(EntityId(1), kind, position, &assets(), &Tuning::new())
    }

    #[test]
    fn test_kind_string_round_trip() {
        for s in [
            "player",
            "platform_red",
            "platform_purple",
            "obstacle_good",
            "obstacle_bad",
            "planet_jupiter",
            "star_red",
        ] {
            let kind: EntityKind = s.parse().expect("known kind");
            assert_eq!(kind.to_string(), s);
        }
        assert_eq!("planet".parse::<EntityKind>().map(|k| k.is_decoration()), Ok(true));
    }

    #[test]
    fn test_unknown_kinds_are_rejected() {
        assert!("platform_magenta".parse::<EntityKind>().is_err());
        assert!("obstacle_".parse::<EntityKind>().is_err());
        assert!("skybox".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_platform_sits_on_surface() {
        let platform = build("platform_blue", Vec3::new(3.5, 7.0, -10.0));
        assert_eq!(platform.position, Vec3::new(3.5, -0.125, -10.0));
        assert!(!platform.body.physics_enabled);
        let collider = platform.collider.as_ref().expect("platform collider");
        assert!(collider.affects_physics);
        assert_eq!(
            collider.shape,
            ColliderShape::Box {
                half_extents: Vec3::new(0.5, 0.125, 16.65)
            }
        );
    }

    #[test]
    fn test_player_factory_overrides() {
        let player = build("player", Vec3::new(0.0, 2.0, 25.0));
        assert_eq!(player.body.state.drag_coef, 10.0);
        assert!(player.body.state.gravity_coef > 0.0);
        assert!(player.in_jump);
        assert_eq!(
            player.collider.as_ref().map(|c| c.shape),
            Some(ColliderShape::Box {
                half_extents: Vec3::splat(0.25)
            })
        );
    }

    #[test]
    fn test_recolor_is_idempotent() {
        let mut platform = build("platform_yellow", Vec3::ZERO);
        platform.set_platform_color(PlatformColor::Purple);
        let material = platform.material;
        platform.update_platform_data();
        platform.set_platform_color(PlatformColor::Purple);
        assert_eq!(platform.material, material);
        assert_eq!(platform.kind().to_string(), "platform_purple");
        assert_eq!(material.emissive, Vec3::new(12.7, 2.5, 10.2));
    }

    #[test]
    fn test_obstacle_colliders() {
        let bad = build("obstacle_bad", Vec3::new(3.5, 9.0, -4.0));
        assert_eq!(bad.position, Vec3::new(3.5, 0.5, -4.0));
        assert_eq!(
            bad.collider.as_ref().map(|c| (c.shape, c.affects_physics)),
            Some((
                ColliderShape::Box {
                    half_extents: Vec3::splat(0.5)
                },
                true
            ))
        );

        let good = build("obstacle_good", Vec3::new(3.5, 9.0, -4.0));
        assert_eq!(
            good.collider.as_ref().map(|c| c.shape),
            Some(ColliderShape::Box {
                half_extents: Vec3::splat(0.6)
            })
        );
    }

    #[test]
    fn test_recolor_ignores_non_platforms() {
        let mut obstacle = build("obstacle_bad", Vec3::ZERO);
        obstacle.set_platform_color(PlatformColor::Red);
        assert_eq!(obstacle.kind().to_string(), "obstacle_bad");
    }

    #[test]
    fn test_decorations_do_not_affect_physics() {
        let star = build("star_blue", Vec3::new(30.0, 5.0, 0.0));
        assert!(star.light.is_some());
        assert_eq!(star.collider.as_ref().map(|c| c.affects_physics), Some(false));
        assert_eq!(star.body.state.gravity_coef, 0.0);
    }

    #[test]
    fn test_update_physics_syncs_collider() {
        let integrator = Integrator::default();
        let mut player = build("player", Vec3::new(0.0, 2.0, 25.0));
        player.set_distorted(0.05);
        player.update_physics(&integrator, 0.1);
        assert!(player.position.y < 2.0);
        assert_eq!(player.collider.as_ref().map(|c| c.position), Some(player.body.state.position));
        assert!(!player.is_distorted());
    }

    #[test]
    fn test_decoration_drifts_with_velocity() {
        let mut integrator = Integrator::default();
        let mut planet = build("planet_mars", Vec3::new(-30.0, 1.0, 0.0));
        planet.add_impulse(Vec3::new(0.0, 0.0, 2.0));
        integrator.advance(0.5);
        planet.update_physics(&integrator, 0.5);
        assert_eq!(planet.position, Vec3::new(-30.0, 1.0, 1.0));
        assert_eq!(planet.light, None);
    }
}
