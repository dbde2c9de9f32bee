//! Spatial index for proximity queries and line-of-sight rays.
//!
//! Colliders are bucketed into a 2D grid over the ground plane (x, z) for
//! O(k) sphere overlap queries; ray casts test the analytic ray/sphere
//! intersection against every registered collider.

use crate::components::{CollisionVolume, Health, Obstacle, Position, Team};
use bevy_ecs::prelude::*;
use glam::Vec3;
use std::collections::HashMap;

/// Layer bit for unit colliders.
pub const LAYER_UNIT: u8 = 1 << 0;
/// Layer bit for static obstacle colliders.
pub const LAYER_OBSTACLE: u8 = 1 << 1;

/// A collider registered with the index for one tick.
#[derive(Debug, Clone, Copy)]
pub struct ColliderEntry {
    pub entity: Entity,
    pub position: Vec3,
    pub radius: f32,
    pub layer: u8,
    /// Team of the owning unit; `None` for obstacles.
    pub team: Option<Team>,
}

/// A single ray intersection. Distances are along the (normalized) ray
/// direction; hits are returned unordered and must be sorted by the caller.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
}

/// Grid-partitioned collider store, rebuilt from live entities every tick.
#[derive(Resource, Debug)]
pub struct SpatialIndex {
    /// Ground-plane cell size in world units.
    pub cell_size: f32,
    /// Map from (x, z) cell coordinates to indices into `entries`.
    cells: HashMap<(i32, i32), Vec<usize>>,
    entries: Vec<ColliderEntry>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(40.0)
    }
}

impl SpatialIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            entries: Vec::new(),
        }
    }

    #[inline]
    fn world_to_cell(&self, position: Vec3) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.z / self.cell_size).floor() as i32,
        )
    }

    /// Drop all entries (call before rebuilding each tick).
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
    }

    /// Register a collider for this tick.
    pub fn insert(&mut self, entry: ColliderEntry) {
        let cell = self.world_to_cell(entry.position);
        let index = self.entries.len();
        self.entries.push(entry);
        self.cells.entry(cell).or_default().push(index);
    }

    pub fn total_count(&self) -> usize {
        self.entries.len()
    }

    /// All colliders within `radius` of `center` matching the layer mask,
    /// sorted ascending by distance from `center`.
    pub fn overlap_sphere(&self, center: Vec3, radius: f32, mask: u8) -> Vec<ColliderEntry> {
        let radius_sq = radius * radius;
        let reach = (radius / self.cell_size).ceil() as i32 + 1;
        let center_cell = self.world_to_cell(center);

        let mut results = Vec::new();
        for dx in -reach..=reach {
            for dz in -reach..=reach {
                let cell = (center_cell.0 + dx, center_cell.1 + dz);
                let Some(indices) = self.cells.get(&cell) else {
                    continue;
                };
                for &index in indices {
                    let entry = self.entries[index];
                    if entry.layer & mask == 0 {
                        continue;
                    }
                    if entry.position.distance_squared(center) <= radius_sq {
                        results.push(entry);
                    }
                }
            }
        }

        results.sort_by(|a, b| {
            let dist_a = a.position.distance_squared(center);
            let dist_b = b.position.distance_squared(center);
            dist_a
                .partial_cmp(&dist_b)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        results
    }

    /// Cast a ray against every collider matching the layer mask.
    /// `direction` must be normalized. Hits past `max_distance` are dropped;
    /// the returned list is unordered.
    pub fn raycast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: u8,
    ) -> Vec<RayHit> {
        let mut hits = Vec::new();
        for entry in &self.entries {
            if entry.layer & mask == 0 {
                continue;
            }
            if let Some(distance) =
                ray_sphere_intersection(origin, direction, entry.position, entry.radius)
            {
                if distance <= max_distance {
                    hits.push(RayHit {
                        entity: entry.entity,
                        distance,
                    });
                }
            }
        }
        hits
    }
}

/// Distance along the ray to the surface of a sphere, or `None` if the ray
/// misses. A ray starting inside the sphere reports distance zero, so a
/// unit's own collider always sorts in front of anything it can see.
fn ray_sphere_intersection(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_discriminant = discriminant.sqrt();
    if -b + sqrt_discriminant < 0.0 {
        // Entirely behind the origin.
        return None;
    }
    Some((-b - sqrt_discriminant).max(0.0))
}

/// System that rebuilds the spatial index each tick from live units and
/// obstacles.
pub fn spatial_index_update_system(
    mut index: ResMut<SpatialIndex>,
    units: Query<(Entity, &Position, &CollisionVolume, &Team, Option<&Health>)>,
    obstacles: Query<(Entity, &Position, &CollisionVolume), (With<Obstacle>, Without<Team>)>,
) {
    index.clear();

    for (entity, pos, volume, team, health) in units.iter() {
        if let Some(health) = health {
            if !health.is_alive() {
                continue;
            }
        }
        index.insert(ColliderEntry {
            entity,
            position: pos.0,
            radius: volume.radius,
            layer: LAYER_UNIT,
            team: Some(*team),
        });
    }

    for (entity, pos, volume) in obstacles.iter() {
        index.insert(ColliderEntry {
            entity,
            position: pos.0,
            radius: volume.radius,
            layer: LAYER_OBSTACLE,
            team: None,
        });
    }
}
