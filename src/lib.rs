//! Ironline - Tactical Unit AI Core
//!
//! A deterministic, fixed-timestep ECS simulation of autonomous combat units.
//! Uses `bevy_ecs` for the entity-component-system architecture.
//!
//! Each AI-controlled unit senses nearby enemies through the spatial index
//! (detection radius plus line-of-sight ray), then runs a small command state
//! machine (Idle / Defend / Move / Attack / AttackMove) that drives its
//! locomotion, turret, and launcher executors.

pub mod api;
pub mod commands;
pub mod components;
pub mod profiler;
pub mod spatial;
pub mod systems;
pub mod world;

pub use api::{SimConfig, SimWorld};
pub use commands::{UnitCommands, UnitHandle};
pub use components::*;
pub use profiler::Profiler;
pub use spatial::{ColliderEntry, RayHit, SpatialIndex, LAYER_OBSTACLE, LAYER_UNIT};
pub use systems::*;
pub use world::Snapshot;
