//! Locomotion system - consumes waypoint queues and moves units.

use crate::components::{Locomotion, Position, WAYPOINT_TOLERANCE};
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current tick.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// System that steers each unit straight toward its current waypoint at the
/// locomotion speed, popping waypoints as they are reached.
pub fn locomotion_system(dt: Res<DeltaTime>, mut query: Query<(&mut Position, &mut Locomotion)>) {
    let delta = dt.0;
    for (mut pos, mut locomotion) in query.iter_mut() {
        let Some(waypoint) = locomotion.current_waypoint() else {
            continue;
        };

        let to_goal = waypoint - pos.0;
        let distance = to_goal.length();
        if distance <= WAYPOINT_TOLERANCE {
            locomotion.advance();
            continue;
        }

        let travel = (locomotion.speed * delta).min(distance);
        pos.0 += to_goal / distance * travel;

        if pos.0.distance(waypoint) <= WAYPOINT_TOLERANCE {
            locomotion.advance();
        }
    }
}
