//! Public API for the simulation.
//!
//! `SimWorld` owns the ECS world and schedule and provides a clean surface
//! for a host (a game client, a test harness, a headless runner) to:
//! - spawn units and obstacles
//! - step the simulation forward
//! - issue unit commands by id
//! - extract state snapshots
//!
//! ## Fixed Timestep
//!
//! The simulation uses a fixed timestep internally (default 30 Hz). When
//! `step(dt)` is called, time is accumulated and fixed updates run as
//! needed, so behavior is deterministic regardless of the host frame rate.
//! Within each fixed update the systems run strictly in order: spatial
//! index rebuild, perception, AI dispatch, locomotion.

use crate::commands::{UnitCommands, UnitHandle};
use crate::components::{AiBundle, ObstacleBundle, Position, Team, UnitBundle, UnitId};
use crate::spatial::{spatial_index_update_system, SpatialIndex};
use crate::systems::ai::unit_ai_system;
use crate::systems::locomotion::{locomotion_system, DeltaTime};
use crate::systems::perception::perception_system;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use glam::Vec3;

/// Simulation-wide configuration.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimConfig {
    /// Fixed timestep in seconds (e.g. 1/30 for 30 Hz).
    pub fixed_timestep: f32,
    /// Ground-plane cell size of the spatial index, in world units.
    pub spatial_cell_size: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 30.0,
            spatial_cell_size: 40.0,
        }
    }
}

/// The main simulation world container.
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    /// Accumulated host time not yet consumed by fixed updates.
    time_accumulator: f32,
}

impl SimWorld {
    /// Create a new empty simulation world.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a new simulation world with custom configuration.
    pub fn with_config(config: SimConfig) -> Self {
        let mut world = World::new();

        world.insert_resource(DeltaTime(config.fixed_timestep));
        world.insert_resource(SpatialIndex::new(config.spatial_cell_size));
        world.insert_resource(config);

        // The tick pipeline; ordering is load-bearing. Perception must see
        // this tick's collider positions, and AI must act on this tick's
        // perception before locomotion moves anyone.
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                spatial_index_update_system,
                perception_system,
                unit_ai_system,
                locomotion_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            time_accumulator: 0.0,
        }
    }

    /// Create a small two-team skirmish world for demos and tests.
    pub fn new_default_test_world() -> Self {
        let mut sim = Self::new();

        for (i, z) in [-20.0f32, 0.0, 20.0].iter().enumerate() {
            sim.spawn_ai_unit(i as u32, Team::Blue, Vec3::new(-100.0, 0.0, *z));
            sim.spawn_ai_unit(100 + i as u32, Team::Red, Vec3::new(100.0, 0.0, *z));
        }

        // A broken wall across the middle of the field.
        sim.spawn_obstacle(Vec3::new(0.0, 0.0, -40.0), 5.0);
        sim.spawn_obstacle(Vec3::new(0.0, 0.0, 0.0), 5.0);
        sim.spawn_obstacle(Vec3::new(0.0, 0.0, 40.0), 5.0);

        sim
    }

    /// Step the simulation forward by `dt` seconds of host time.
    /// Runs as many fixed updates as the accumulated time covers.
    pub fn step(&mut self, dt: f32) {
        let fixed_dt = self
            .world
            .get_resource::<SimConfig>()
            .map(|c| c.fixed_timestep)
            .unwrap_or(1.0 / 30.0);

        self.time_accumulator += dt;
        while self.time_accumulator >= fixed_dt {
            self.fixed_update(fixed_dt);
            self.time_accumulator -= fixed_dt;
        }
    }

    fn fixed_update(&mut self, dt: f32) {
        if let Some(mut delta) = self.world.get_resource_mut::<DeltaTime>() {
            delta.0 = dt;
        }
        self.schedule.run(&mut self.world);
        self.tick += 1;
        self.time += dt;
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick, self.time)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Spawn a unit without AI control (a puppet or target drone).
    pub fn spawn_unit(&mut self, id: u32, team: Team, position: Vec3) -> Entity {
        self.world.spawn(UnitBundle::new(id, team, position)).id()
    }

    /// Spawn an AI-controlled unit. Its current position becomes the post it
    /// falls back to after a defensive engagement times out.
    pub fn spawn_ai_unit(&mut self, id: u32, team: Team, position: Vec3) -> Entity {
        self.world
            .spawn((UnitBundle::new(id, team, position), AiBundle::at(position)))
            .id()
    }

    /// Spawn a static sight-blocking obstacle.
    pub fn spawn_obstacle(&mut self, position: Vec3, radius: f32) -> Entity {
        self.world.spawn(ObstacleBundle::new(position, radius)).id()
    }

    /// Attach AI control to an existing unit at its current position.
    pub fn enable_ai(&mut self, unit_id: u32) {
        let Some(entity) = self.find_unit(unit_id) else {
            return;
        };
        let Some(position) = self.world.get::<Position>(entity).map(|p| p.0) else {
            return;
        };
        self.world.entity_mut(entity).insert(AiBundle::at(position));
    }

    /// Detach AI control from a unit.
    pub fn disable_ai(&mut self, unit_id: u32) {
        if let Some(entity) = self.find_unit(unit_id) {
            self.world.entity_mut(entity).remove::<AiBundle>();
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Borrow a command handle for a unit by id.
    pub fn unit(&mut self, unit_id: u32) -> Option<UnitHandle<'_>> {
        let entity = self.find_unit(unit_id)?;
        Some(UnitHandle::new(&mut self.world, entity))
    }

    /// Order a unit to a destination. Returns whether the order was accepted.
    pub fn command_move_to(&mut self, unit_id: u32, position: Vec3, queue: bool) -> bool {
        self.unit(unit_id)
            .map(|mut unit| unit.move_to(position, queue))
            .unwrap_or(false)
    }

    /// Order a unit to attack-move to a destination.
    pub fn command_attack_move(&mut self, unit_id: u32, position: Vec3) -> bool {
        self.unit(unit_id)
            .map(|mut unit| unit.attack_move(position))
            .unwrap_or(false)
    }

    /// Order a unit to attack another unit once, immediately.
    pub fn command_attack(&mut self, unit_id: u32, target_id: u32) -> bool {
        let Some(target) = self.find_unit(target_id) else {
            return false;
        };
        self.unit(unit_id)
            .map(|mut unit| unit.attack(target))
            .unwrap_or(false)
    }

    /// Halt a unit's locomotion.
    pub fn command_stop(&mut self, unit_id: u32) {
        if let Some(mut unit) = self.unit(unit_id) {
            unit.stop();
        }
    }

    fn find_unit(&mut self, unit_id: u32) -> Option<Entity> {
        let mut query = self.world.query::<(Entity, &UnitId)>();
        query
            .iter(&self.world)
            .find(|(_, id)| id.0 == unit_id)
            .map(|(entity, _)| entity)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Get the spatial index (for debugging/visualization).
    pub fn spatial_index(&self) -> Option<&SpatialIndex> {
        self.world.get_resource::<SpatialIndex>()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CommandState;
    use crate::profiler::Profiler;

    #[test]
    fn test_new_world() {
        let sim = SimWorld::new();
        assert_eq!(sim.current_tick(), 0);
    }

    #[test]
    fn test_step_advances_tick() {
        let mut sim = SimWorld::new();
        sim.step(0.05);
        assert_eq!(sim.current_tick(), 1);
        sim.step(0.05);
        assert_eq!(sim.current_tick(), 3);
    }

    #[test]
    fn test_default_test_world() {
        let mut sim = SimWorld::new_default_test_world();
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.units.len(), 6); // 3 Blue + 3 Red
        assert_eq!(snapshot.obstacles.len(), 3);
    }

    #[test]
    fn test_move_command_moves_unit() {
        let mut sim = SimWorld::new_default_test_world();
        assert!(sim.command_move_to(0, Vec3::new(-50.0, 0.0, -20.0), false));

        for _ in 0..60 {
            sim.step(1.0 / 30.0);
        }

        let snapshot = sim.snapshot();
        let unit = snapshot.units.iter().find(|u| u.id == 0).unwrap();
        assert!(unit.x > -100.0, "unit should have moved toward the goal");
    }

    #[test]
    fn test_commands_on_unknown_unit_return_false() {
        let mut sim = SimWorld::new();
        assert!(!sim.command_move_to(99, Vec3::ZERO, false));
        assert!(!sim.command_attack_move(99, Vec3::ZERO));
        assert!(!sim.command_attack(99, 98));
    }

    #[test]
    fn test_idle_unit_defends_and_opens_fire() {
        let mut sim = SimWorld::new();
        let blue = sim.spawn_ai_unit(1, Team::Blue, Vec3::ZERO);
        sim.spawn_unit(2, Team::Red, Vec3::new(75.0, 0.0, 0.0));

        // Detection pulls the unit into Defend; it advances to its firing
        // position and opens up.
        for _ in 0..60 {
            sim.step(1.0 / 30.0);
        }

        assert_eq!(
            *sim.world().get::<CommandState>(blue).unwrap(),
            CommandState::Defend
        );
        let snapshot = sim.snapshot();
        let unit = snapshot.units.iter().find(|u| u.id == 1).unwrap();
        assert!(unit.firing, "unit should be firing from the band");
        assert_eq!(unit.target, Some(2));
    }

    #[test]
    fn test_move_order_overrides_defense() {
        let mut sim = SimWorld::new();
        sim.spawn_ai_unit(1, Team::Blue, Vec3::ZERO);
        sim.spawn_unit(2, Team::Red, Vec3::new(50.0, 0.0, 0.0));

        sim.step(1.0 / 30.0);
        let blue = sim.find_unit(1).unwrap();
        assert_eq!(
            *sim.world().get::<CommandState>(blue).unwrap(),
            CommandState::Defend
        );

        assert!(sim.command_move_to(1, Vec3::new(-200.0, 0.0, 0.0), false));
        assert_eq!(
            *sim.world().get::<CommandState>(blue).unwrap(),
            CommandState::Move
        );

        // Still in contact, but the explicit order holds.
        sim.step(1.0 / 30.0);
        assert_eq!(
            *sim.world().get::<CommandState>(blue).unwrap(),
            CommandState::Move
        );
    }

    #[test]
    fn test_enable_and_disable_ai() {
        let mut sim = SimWorld::new();
        let drone = sim.spawn_unit(1, Team::Blue, Vec3::ZERO);
        sim.spawn_unit(2, Team::Red, Vec3::new(40.0, 0.0, 0.0));

        sim.step(1.0 / 30.0);
        assert!(sim.world().get::<CommandState>(drone).is_none());

        sim.enable_ai(1);
        sim.step(1.0 / 30.0);
        assert_eq!(
            *sim.world().get::<CommandState>(drone).unwrap(),
            CommandState::Defend
        );

        sim.disable_ai(1);
        assert!(sim.world().get::<CommandState>(drone).is_none());
    }

    #[test]
    fn test_snapshot_json() {
        let mut sim = SimWorld::new_default_test_world();
        let json = sim.snapshot_json();
        assert!(json.contains("units"));
        assert!(json.contains("Blue"));
        assert!(json.contains("Red"));
    }

    #[test]
    fn test_stress_many_units() {
        let mut sim = SimWorld::new();

        // Two staggered battle lines, everything inside detection range of
        // something.
        for i in 0..30 {
            let z = (i as f32 - 15.0) * 8.0;
            sim.spawn_ai_unit(i, Team::Blue, Vec3::new(-40.0, 0.0, z));
            sim.spawn_ai_unit(1000 + i, Team::Red, Vec3::new(40.0, 0.0, z));
        }

        let mut profiler = Profiler::new();
        for _ in 0..100 {
            profiler.time_section("step", || sim.step(1.0 / 30.0));
            profiler.tick();
        }
        profiler.print_summary();

        assert_eq!(sim.current_tick(), 100);
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.units.len(), 60);
        // Opposing lines 80 apart see each other and light up.
        assert!(snapshot.units.iter().any(|u| u.firing));
    }
}
