//! Render submission payloads
//!
//! The simulation never talks to the GPU. Each frame it hands the host a
//! [`RenderFrame`]: camera, lights, HUD numbers and one [`RenderItem`] per
//! visible entity.

pub mod instance;

pub use instance::InstanceRaw;

use glam::{Mat4, Vec3};

use crate::assets::{MeshHandle, ShaderHandle, TextureHandle};
use crate::sim::entity::{EntityId, Material, PointLight};
use crate::sim::state::Hud;

/// Near/far clip planes
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 200.0;

/// One drawable entity
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub entity: EntityId,
    pub mesh: MeshHandle,
    pub shader: ShaderHandle,
    pub texture: Option<TextureHandle>,
    pub model: Mat4,
    pub material: Material,
    pub distorted: bool,
}

/// Everything the host needs to draw one frame
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    pub view: Mat4,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub eye: Vec3,
    /// Main scene light, follows the player
    pub light_position: Vec3,
    /// Point lights carried by entities (stars)
    pub lights: Vec<PointLight>,
    pub items: Vec<RenderItem>,
    pub hud: Hud,
    /// Simulation time (seconds), for shader animation
    pub time: f64,
}

impl RenderFrame {
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect.max(f32::EPSILON), Z_NEAR, Z_FAR)
    }

    /// Instance buffer contents, in item order
    pub fn instances(&self) -> Vec<InstanceRaw> {
        self.items.iter().map(InstanceRaw::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> RenderItem {
        RenderItem {
            entity: EntityId(3),
            mesh: MeshHandle(0),
            shader: ShaderHandle(1),
            texture: None,
            model: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            material: Material {
                emissive: Vec3::new(25.5, 0.0, 0.0),
                ambient: Vec3::X,
                diffuse: Vec3::ONE,
                specular: Vec3::splat(0.3),
                shininess: 32.0,
            },
            distorted: true,
        }
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 144);
        let frame = RenderFrame {
            items: vec![item()],
            ..Default::default()
        };
        let instances = frame.instances();
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 144);
        assert_eq!(instances[0].model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(instances[0].specular[3], 32.0);
        assert_eq!(instances[0].distorted, 1);
    }

    #[test]
    fn test_projection_uses_fov() {
        let narrow = RenderFrame { fov: 60.0, ..Default::default() };
        let wide = RenderFrame { fov: 90.0, ..Default::default() };
        // Wider FOV shrinks the Y scale of the projection
        assert!(wide.projection(16.0 / 9.0).y_axis.y < narrow.projection(16.0 / 9.0).y_axis.y);
    }
}
