//! Asset handle tables
//!
//! The host owns the actual GPU resources. The simulation only keeps opaque
//! handles, resolved once at startup through an [`AssetProvider`] and looked
//! up by name when entities are built.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::platform::AssetProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

pub const MESH_NAMES: &[&str] = &["cube", "c_sphere", "spaceship"];

pub const SHADER_NAMES: &[&str] = &["Spaceship", "EmmisiveTransparency", "Planet"];

pub const TEXTURE_NAMES: &[&str] = &[
    "spaceship",
    "platform",
    "obstacle1",
    "obstacle2",
    "icy",
    "mars",
    "neptune",
    "jupiter",
    "uranus",
    "venus",
    "star_blue",
    "star_red",
];

/// Name → handle tables owned by the world
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    meshes: HashMap<String, MeshHandle>,
    shaders: HashMap<String, ShaderHandle>,
    textures: HashMap<String, TextureHandle>,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every asset the entity table needs
    ///
    /// Missing assets are logged and left out; entities that reference them
    /// are simply not rendered.
    pub fn load(provider: &mut dyn AssetProvider) -> Self {
        let mut table = Self::new();
        for &name in MESH_NAMES {
            match provider.resolve_mesh(name) {
                Some(handle) => {
                    table.meshes.insert(name.to_string(), handle);
                }
                None => log::warn!("Missing mesh '{}'", name),
            }
        }
        for &name in SHADER_NAMES {
            match provider.resolve_shader(name) {
                Some(handle) => {
                    table.shaders.insert(name.to_string(), handle);
                }
                None => log::warn!("Missing shader '{}'", name),
            }
        }
        for &name in TEXTURE_NAMES {
            match provider.resolve_texture(name) {
                Some(handle) => {
                    table.textures.insert(name.to_string(), handle);
                }
                None => log::warn!("Missing texture '{}'", name),
            }
        }
        log::info!(
            "Asset table: {} meshes, {} shaders, {} textures",
            table.meshes.len(),
            table.shaders.len(),
            table.textures.len()
        );
        table
    }

    pub fn mesh(&self, name: &str) -> Option<MeshHandle> {
        self.meshes.get(name).copied()
    }

    pub fn shader(&self, name: &str) -> Option<ShaderHandle> {
        self.shaders.get(name).copied()
    }

    pub fn texture(&self, name: &str) -> Option<TextureHandle> {
        self.textures.get(name).copied()
    }
}
