//! Per-instance GPU payload

use bytemuck::{Pod, Zeroable};

use super::RenderItem;

/// One entity instance as the host's shader expects it
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4], // offset 0
    pub emissive: [f32; 4],   // offset 64
    pub ambient: [f32; 4],    // offset 80
    pub diffuse: [f32; 4],    // offset 96
    pub specular: [f32; 4],   // offset 112, w = shininess
    pub distorted: u32,       // offset 128 - 1 while the distortion effect runs
    _pad: [u32; 3],           // pad to 144 bytes
}

impl From<&RenderItem> for InstanceRaw {
    fn from(item: &RenderItem) -> Self {
        let m = &item.material;
        Self {
            model: item.model.to_cols_array_2d(),
            emissive: m.emissive.extend(1.0).to_array(),
            ambient: m.ambient.extend(1.0).to_array(),
            diffuse: m.diffuse.extend(1.0).to_array(),
            specular: m.specular.extend(m.shininess).to_array(),
            distorted: item.distorted as u32,
            _pad: [0; 3],
        }
    }
}
