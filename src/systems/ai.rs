//! The command state machine - per-tick behavior dispatch and transitions.
//!
//! Runs strictly after perception in the same tick, so every decision uses
//! this tick's freshly sensed enemies. Each `CommandState` variant has one
//! behavior function; a behavior returns the next state when a transition
//! condition is met.

use crate::components::{
    AiControlled, AiController, CommandState, Launcher, Locomotion, Position, SensedEnemies,
    Turret, UnitAiParams, UnitId,
};
use crate::systems::engagement::engage;
use crate::systems::locomotion::DeltaTime;
use bevy_ecs::prelude::*;
use glam::Vec3;
use log::debug;

/// Mutable view over one unit's AI state and executors for a single tick.
struct UnitTick<'a> {
    position: Vec3,
    params: &'a UnitAiParams,
    sensed: &'a SensedEnemies,
    ai: &'a mut AiController,
    locomotion: &'a mut Locomotion,
    turret: &'a mut Turret,
    launcher: &'a mut Launcher,
}

/// System that dispatches each AI unit to the behavior of its current
/// command state and applies the resulting transition, if any.
pub fn unit_ai_system(
    dt: Res<DeltaTime>,
    positions: Query<&Position>,
    mut units: Query<
        (
            &UnitId,
            &Position,
            &UnitAiParams,
            &SensedEnemies,
            &mut CommandState,
            &mut AiController,
            &mut Locomotion,
            &mut Turret,
            &mut Launcher,
        ),
        With<AiControlled>,
    >,
) {
    let delta = dt.0;
    for (unit_id, position, params, sensed, mut state, mut ai, mut locomotion, mut turret, mut launcher) in
        units.iter_mut()
    {
        let current = *state;
        let mut unit = UnitTick {
            position: position.0,
            params,
            sensed,
            ai: &mut ai,
            locomotion: &mut locomotion,
            turret: &mut turret,
            launcher: &mut launcher,
        };

        let next = match current {
            CommandState::Idle => idle_behaviour(&unit),
            CommandState::Defend => defend_behaviour(&mut unit, &positions, delta),
            CommandState::Move => move_behaviour(&unit),
            CommandState::Attack => attack_behaviour(),
            CommandState::AttackMove => attack_move_behaviour(&mut unit, &positions),
        };

        if let Some(next) = next {
            if next != current {
                debug!("unit {}: {:?} -> {:?}", unit_id.0, current, next);
                *state = next;
            }
        }
    }
}

/// Idle: watch. Any contact pulls the unit into an autonomous defense.
fn idle_behaviour(unit: &UnitTick) -> Option<CommandState> {
    if unit.sensed.units.is_empty() {
        None
    } else {
        Some(CommandState::Defend)
    }
}

/// Defend: close on the first sensed enemy and engage it. After
/// `defend_timeout` seconds without contact, stand down and fall back to the
/// original post with a queued move order.
fn defend_behaviour(
    unit: &mut UnitTick,
    positions: &Query<&Position>,
    delta: f32,
) -> Option<CommandState> {
    if let Some(&enemy) = unit.sensed.units.first() {
        unit.ai.target = Some(enemy);
        unit.ai.defend_timer = 0.0;
        if let Ok(enemy_position) = positions.get(enemy) {
            unit.locomotion.move_to(enemy_position.0, false);
            engage(
                unit.position,
                enemy_position.0,
                unit.params,
                unit.locomotion,
                unit.turret,
                unit.launcher,
            );
        }
        return None;
    }

    unit.ai.target = None;
    unit.ai.defend_timer += delta;
    if unit.ai.defend_timer >= unit.params.defend_timeout {
        unit.ai.defend_timer = 0.0;
        // Issued straight to the locomotion executor so the state stays
        // Idle rather than flipping to Move.
        unit.locomotion.move_to(unit.ai.original_position, true);
        return Some(CommandState::Idle);
    }
    None
}

/// Move: let locomotion run; exit once the destination is reached.
fn move_behaviour(unit: &UnitTick) -> Option<CommandState> {
    arrival_transition(unit)
}

/// Attack: reserved for command-driven direct attacks. The command interface
/// runs the engagement itself, so the state has no per-tick behavior.
fn attack_behaviour() -> Option<CommandState> {
    None
}

/// AttackMove: engage the first sensed enemy while it stays inside attack
/// range, otherwise keep pushing toward the commanded destination.
fn attack_move_behaviour(unit: &mut UnitTick, positions: &Query<&Position>) -> Option<CommandState> {
    if let Some(&enemy) = unit.sensed.units.first() {
        unit.ai.target = Some(enemy);
        if let Ok(enemy_position) = positions.get(enemy) {
            if unit.position.distance(enemy_position.0) <= unit.params.attack_range {
                engage(
                    unit.position,
                    enemy_position.0,
                    unit.params,
                    unit.locomotion,
                    unit.turret,
                    unit.launcher,
                );
            } else {
                unit.ai.target = None;
            }
        }
    } else if let Some(goal) = unit.ai.move_location {
        // Engagements reroute locomotion; restore the commanded destination
        // once the contact is gone.
        if unit.locomotion.final_target_location() != Some(goal) {
            unit.locomotion.move_to(goal, false);
        }
    }

    // Arrival ends the command whether or not an engagement is running.
    arrival_transition(unit)
}

fn arrival_transition(unit: &UnitTick) -> Option<CommandState> {
    match unit.ai.move_location {
        Some(goal) if unit.position.distance(goal) < unit.params.position_error_margin => {
            Some(CommandState::Idle)
        }
        _ => None,
    }
}
