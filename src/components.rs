//! ECS Components for the Ironline unit simulation.
//!
//! Components are pure data containers attached to entities.
//! All behavior lives in systems that query these components.

use bevy_ecs::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// World-space position (x = east/west, y = up, z = north/south).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec3);

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        self.0.distance(other.0)
    }
}

/// Spherical collision volume used for spatial queries and line-of-sight rays.
/// Identity comparison against ray hits is by entity id.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CollisionVolume {
    pub radius: f32,
}

impl Default for CollisionVolume {
    fn default() -> Self {
        Self { radius: 2.5 }
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Unique identifier for a unit.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl Default for UnitId {
    fn default() -> Self {
        Self(0)
    }
}

/// Team/side affiliation. Units of a different team are hostile.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Blue,
    Red,
}

impl Default for Team {
    fn default() -> Self {
        Self::Blue
    }
}

/// Marker for static scenery that blocks line of sight.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Obstacle;

// ============================================================================
// UNIT STATE COMPONENTS
// ============================================================================

/// Hit points of a unit. Dead units are dropped from the spatial index and
/// therefore never perceived.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

// ============================================================================
// EXECUTOR COMPONENTS
// ============================================================================

/// Distance below which a locomotion waypoint counts as reached.
pub const WAYPOINT_TOLERANCE: f32 = 1.0;

/// Movement executor: a waypoint queue consumed at a fixed speed.
///
/// `move_to` with `queue = false` replaces the whole queue; with
/// `queue = true` the waypoint is appended after the current ones.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Locomotion {
    waypoints: VecDeque<Vec3>,
    pub speed: f32,
}

impl Default for Locomotion {
    fn default() -> Self {
        Self {
            waypoints: VecDeque::new(),
            speed: 20.0,
        }
    }
}

impl Locomotion {
    pub fn new(speed: f32) -> Self {
        Self {
            waypoints: VecDeque::new(),
            speed,
        }
    }

    /// Accept a movement order. Returns false if the destination is rejected.
    pub fn move_to(&mut self, position: Vec3, queue: bool) -> bool {
        if !position.is_finite() {
            return false;
        }
        if !queue {
            self.waypoints.clear();
        }
        self.waypoints.push_back(position);
        true
    }

    /// Halt immediately and forget all pending waypoints.
    pub fn stop(&mut self) {
        self.waypoints.clear();
    }

    /// The waypoint currently being pursued.
    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.waypoints.front().copied()
    }

    /// The last commanded destination, if any.
    pub fn final_target_location(&self) -> Option<Vec3> {
        self.waypoints.back().copied()
    }

    pub fn is_moving(&self) -> bool {
        !self.waypoints.is_empty()
    }

    /// Drop the current waypoint (called on arrival).
    pub fn advance(&mut self) {
        self.waypoints.pop_front();
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &Vec3> {
        self.waypoints.iter()
    }
}

/// Turret executor: a settable world-space facing direction.
/// Orientation changes are instantaneous snaps, no interpolation.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Turret {
    pub facing: Vec3,
}

impl Default for Turret {
    fn default() -> Self {
        Self { facing: Vec3::X }
    }
}

impl Turret {
    pub fn set_orientation(&mut self, direction: Vec3) {
        self.facing = direction;
    }
}

/// Projectile launcher executor. `begin_trigger_pull` latches continuous
/// fire and is safe to call every tick while engaged.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Launcher {
    pub trigger_held: bool,
}

impl Launcher {
    pub fn begin_trigger_pull(&mut self) {
        self.trigger_held = true;
    }

    pub fn is_firing(&self) -> bool {
        self.trigger_held
    }
}

// ============================================================================
// AI COMPONENTS
// ============================================================================

/// Marker for units driven by the command state machine.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AiControlled;

/// Per-unit AI tunables.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnitAiParams {
    /// Radius within which enemies are sensed, subject to line of sight.
    pub detection_range: f32,
    /// Preferred engagement distance; the comfortable band is
    /// `[attack_range / 2, attack_range]`.
    pub attack_range: f32,
    /// Tolerance below which a destination counts as reached.
    pub position_error_margin: f32,
    /// Seconds without enemy contact before a defending unit stands down.
    pub defend_timeout: f32,
}

impl Default for UnitAiParams {
    fn default() -> Self {
        Self {
            detection_range: 80.0,
            attack_range: 60.0,
            position_error_margin: 10.0,
            defend_timeout: 5.0,
        }
    }
}

/// The command state machine variants. Exactly one is active per unit;
/// it selects which behavior function runs each tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandState {
    /// No orders, no contact. Watches for enemies.
    Idle,
    /// Autonomous engagement of whatever comes into view.
    Defend,
    /// En route to a commanded destination, ignoring contacts.
    Move,
    /// Reserved for command-driven direct attacks; no per-tick behavior.
    Attack,
    /// En route to a commanded destination, engaging contacts on the way.
    AttackMove,
}

impl Default for CommandState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Enemies perceived this tick, nearest first. Rebuilt from scratch every
/// tick; never carried across ticks.
#[derive(Component, Debug, Clone, Default)]
pub struct SensedEnemies {
    pub units: Vec<Entity>,
}

/// Mutable AI bookkeeping owned by a single controller instance.
#[derive(Component, Debug, Clone, Default)]
pub struct AiController {
    /// Current engagement target, if any.
    pub target: Option<Entity>,
    /// Destination of the active Move/AttackMove command.
    pub move_location: Option<Vec3>,
    /// Post held when AI control was attached; defended units fall back
    /// here after an engagement times out.
    pub original_position: Vec3,
    /// Seconds spent in Defend with no enemy perceived.
    pub defend_timer: f32,
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete combat unit.
#[derive(Bundle, Default)]
pub struct UnitBundle {
    pub unit_id: UnitId,
    pub team: Team,
    pub position: Position,
    pub health: Health,
    pub collision: CollisionVolume,
    pub locomotion: Locomotion,
    pub turret: Turret,
    pub launcher: Launcher,
}

impl UnitBundle {
    pub fn new(id: u32, team: Team, position: Vec3) -> Self {
        Self {
            unit_id: UnitId(id),
            team,
            position: Position(position),
            ..Default::default()
        }
    }
}

/// AI components to attach to a unit. `original_position` should be the
/// unit's position at the moment control is attached.
#[derive(Bundle, Default)]
pub struct AiBundle {
    pub controlled: AiControlled,
    pub params: UnitAiParams,
    pub command_state: CommandState,
    pub sensed: SensedEnemies,
    pub controller: AiController,
}

impl AiBundle {
    pub fn at(original_position: Vec3) -> Self {
        Self {
            controller: AiController {
                original_position,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Bundle for spawning a sight-blocking obstacle.
#[derive(Bundle, Default)]
pub struct ObstacleBundle {
    pub position: Position,
    pub collision: CollisionVolume,
    pub marker: Obstacle,
}

impl ObstacleBundle {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position: Position(position),
            collision: CollisionVolume { radius },
            marker: Obstacle,
        }
    }
}
