//! Perception - per-tick enemy sensing against the spatial index.
//!
//! A unit senses another unit when all three hold at the moment of the check:
//! different team, within detection range, unobstructed line of sight.
//! The sensed set is rebuilt from scratch every tick.

use crate::components::{AiControlled, Position, SensedEnemies, Team, UnitAiParams};
use crate::spatial::{ColliderEntry, SpatialIndex, LAYER_OBSTACLE, LAYER_UNIT};
use bevy_ecs::prelude::*;
use glam::Vec3;

/// System that refreshes each AI unit's sensed-enemy set. Runs after the
/// spatial index rebuild and before behavior dispatch in the same tick.
pub fn perception_system(
    index: Res<SpatialIndex>,
    mut query: Query<
        (Entity, &Position, &Team, &UnitAiParams, &mut SensedEnemies),
        With<AiControlled>,
    >,
) {
    for (entity, pos, team, params, mut sensed) in query.iter_mut() {
        sensed.units = sense_enemies(&index, entity, pos.0, *team, params.detection_range);
    }
}

/// Find all visible hostile units within `detection_range` of `origin`,
/// nearest first.
pub fn sense_enemies(
    index: &SpatialIndex,
    self_entity: Entity,
    origin: Vec3,
    team: Team,
    detection_range: f32,
) -> Vec<Entity> {
    let mut enemies = Vec::new();
    for entry in index.overlap_sphere(origin, detection_range, LAYER_UNIT) {
        // Same-team entries are not hostile; this also skips the sensing
        // unit's own collider.
        if entry.team == Some(team) {
            continue;
        }
        if has_line_of_sight(index, self_entity, origin, &entry, detection_range) {
            enemies.push(entry.entity);
        }
    }
    enemies
}

/// Ray test from `origin` toward a candidate collider. The candidate is
/// visible when it is the nearest thing the ray touches, or the nearest hit
/// is the sensing unit's own collision volume and the candidate comes right
/// behind it.
pub fn has_line_of_sight(
    index: &SpatialIndex,
    self_entity: Entity,
    origin: Vec3,
    candidate: &ColliderEntry,
    range: f32,
) -> bool {
    let Some(direction) = (candidate.position - origin).try_normalize() else {
        // Coincident positions: nothing can be in between.
        return true;
    };

    let mut hits = index.raycast_all(origin, direction, range, LAYER_UNIT | LAYER_OBSTACLE);
    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    match hits.as_slice() {
        [first, ..] if first.entity == candidate.entity => true,
        [first, second, ..] if first.entity == self_entity && second.entity == candidate.entity => {
            true
        }
        _ => false,
    }
}
