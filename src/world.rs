//! Serializable snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of the simulation
//! state for a rendering client or a headless observer.

use crate::components::{
    AiController, CollisionVolume, CommandState, Health, Launcher, Obstacle, Position, Team,
    UnitId,
};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single unit's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: u32,
    pub team: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub health: f32,
    pub health_max: f32,
    /// Active command state, or "-" for units without AI control.
    pub command: String,
    /// UnitId of the current engagement target, if any.
    pub target: Option<u32>,
    /// Whether the launcher trigger is held.
    pub firing: bool,
}

/// Snapshot of a sight-blocking obstacle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub radius: f32,
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    pub units: Vec<UnitSnapshot>,
    pub obstacles: Vec<ObstacleSnapshot>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64, time: f32) -> Self {
        let mut rows = Vec::new();
        let mut unit_query = world.query::<(
            &UnitId,
            &Team,
            &Position,
            &Health,
            Option<&CommandState>,
            Option<&AiController>,
            &Launcher,
        )>();

        for (unit_id, team, pos, health, state, ai, launcher) in unit_query.iter(world) {
            let team_str = match team {
                Team::Blue => "Blue",
                Team::Red => "Red",
            };
            let command = match state {
                Some(CommandState::Idle) => "Idle",
                Some(CommandState::Defend) => "Defend",
                Some(CommandState::Move) => "Move",
                Some(CommandState::Attack) => "Attack",
                Some(CommandState::AttackMove) => "AttackMove",
                None => "-",
            };
            rows.push((
                unit_id.0,
                team_str.to_string(),
                pos.0,
                health.current,
                health.max,
                command.to_string(),
                ai.and_then(|a| a.target),
                launcher.trigger_held,
            ));
        }

        let units = rows
            .into_iter()
            .map(
                |(id, team, pos, health, health_max, command, target, firing)| UnitSnapshot {
                    id,
                    team,
                    x: pos.x,
                    y: pos.y,
                    z: pos.z,
                    health,
                    health_max,
                    command,
                    target: target.and_then(|e| world.get::<UnitId>(e)).map(|u| u.0),
                    firing,
                },
            )
            .collect();

        let mut obstacles = Vec::new();
        let mut obstacle_query =
            world.query_filtered::<(&Position, &CollisionVolume), With<Obstacle>>();
        for (pos, volume) in obstacle_query.iter(world) {
            obstacles.push(ObstacleSnapshot {
                x: pos.0.x,
                y: pos.0.y,
                z: pos.0.z,
                radius: volume.radius,
            });
        }

        Self {
            tick,
            time,
            units,
            obstacles,
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{AiBundle, ObstacleBundle, UnitBundle};
    use glam::Vec3;

    #[test]
    fn test_snapshot_from_world() {
        let mut world = World::new();
        let position = Vec3::new(10.0, 0.0, -5.0);
        let target = world
            .spawn(UnitBundle::new(2, Team::Red, Vec3::new(40.0, 0.0, 0.0)))
            .id();
        world.spawn((UnitBundle::new(1, Team::Blue, position), {
            let mut bundle = AiBundle::at(position);
            bundle.controller.target = Some(target);
            bundle
        }));
        world.spawn(ObstacleBundle::new(Vec3::new(0.0, 0.0, 20.0), 4.0));

        let snapshot = Snapshot::from_world(&mut world, 7, 0.35);

        assert_eq!(snapshot.tick, 7);
        assert_eq!(snapshot.units.len(), 2);
        assert_eq!(snapshot.obstacles.len(), 1);

        let blue = snapshot.units.iter().find(|u| u.id == 1).unwrap();
        assert_eq!(blue.team, "Blue");
        assert_eq!(blue.command, "Idle");
        assert_eq!(blue.target, Some(2));
        assert!(!blue.firing);

        let red = snapshot.units.iter().find(|u| u.id == 2).unwrap();
        assert_eq!(red.command, "-");
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let mut world = World::new();
        world.spawn(UnitBundle::new(9, Team::Red, Vec3::new(1.0, 2.0, 3.0)));

        let snapshot = Snapshot::from_world(&mut world, 42, 2.1);
        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();

        assert_eq!(restored.tick, 42);
        assert_eq!(restored.units.len(), 1);
        assert_eq!(restored.units[0].id, 9);
        assert_eq!(restored.units[0].z, 3.0);
    }
}
