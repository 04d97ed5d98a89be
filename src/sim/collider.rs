//! Collider shapes and overlap queries
//!
//! Two shapes are enough for this game: axis-aligned boxes (player,
//! platforms, obstacles) and spheres (decorations). Queries are pure and
//! linear in the number of candidates; the live entity count stays small
//! enough that no spatial index is needed.

use std::collections::BTreeSet;

use glam::Vec3;

use super::entity::EntityId;

/// Collider geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Axis-aligned box, centered on the collider position
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
}

/// A collider attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    /// Entity this collider belongs to
    pub owner: EntityId,
    pub shape: ColliderShape,
    /// Mirror of the owner's body position, refreshed after integration
    pub position: Vec3,
    /// Decorative colliders opt out of gameplay collisions
    pub affects_physics: bool,
}

impl Collider {
    /// Box collider from full dimensions (width, height, length)
    pub fn cuboid(owner: EntityId, position: Vec3, dimensions: Vec3) -> Self {
        Self {
            owner,
            shape: ColliderShape::Box {
                half_extents: dimensions * 0.5,
            },
            position,
            affects_physics: false,
        }
    }

    pub fn sphere(owner: EntityId, position: Vec3, radius: f32) -> Self {
        Self {
            owner,
            shape: ColliderShape::Sphere { radius },
            position,
            affects_physics: false,
        }
    }

    pub fn with_physics(mut self, affects_physics: bool) -> Self {
        self.affects_physics = affects_physics;
        self
    }
}

/// Check whether two colliders overlap
///
/// Boxes touching face-to-face count as overlapping, which is what lets the
/// player rest on a platform. Sphere tests are strict, so a zero-radius
/// sphere never hits anything.
pub fn is_collision(a: &Collider, b: &Collider) -> bool {
    match (a.shape, b.shape) {
        (ColliderShape::Box { half_extents: ha }, ColliderShape::Box { half_extents: hb }) => {
            box_box(a.position, ha, b.position, hb)
        }
        (ColliderShape::Sphere { radius: ra }, ColliderShape::Sphere { radius: rb }) => {
            a.position.distance(b.position) < ra + rb
        }
        (ColliderShape::Box { half_extents }, ColliderShape::Sphere { radius }) => {
            box_sphere(a.position, half_extents, b.position, radius)
        }
        (ColliderShape::Sphere { radius }, ColliderShape::Box { half_extents }) => {
            box_sphere(b.position, half_extents, a.position, radius)
        }
    }
}

fn box_box(first_pos: Vec3, first_half: Vec3, second_pos: Vec3, second_half: Vec3) -> bool {
    let first_min = first_pos - first_half;
    let first_max = first_pos + first_half;
    let second_min = second_pos - second_half;
    let second_max = second_pos + second_half;

    first_min.cmple(second_max).all() && second_min.cmple(first_max).all()
}

fn box_sphere(box_pos: Vec3, half_extents: Vec3, sphere_pos: Vec3, radius: f32) -> bool {
    let closest = sphere_pos.clamp(box_pos - half_extents, box_pos + half_extents);
    closest.distance(sphere_pos) < radius
}

/// Ids of every candidate overlapping `source`
///
/// Candidates owned by the source's entity are skipped. The result is a set,
/// so an entity is reported at most once per query.
pub fn get_collisions<'a>(
    source: &Collider,
    candidates: impl IntoIterator<Item = &'a Collider>,
) -> BTreeSet<EntityId> {
    candidates
        .into_iter()
        .filter(|other| other.owner != source.owner)
        .filter(|other| is_collision(source, other))
        .map(|other| other.owner)
        .collect()
}
