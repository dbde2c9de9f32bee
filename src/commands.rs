//! The outward command surface for a unit.
//!
//! Higher-level order sources (a player layer, a squad controller, a script)
//! talk to units through the `UnitCommands` trait; `UnitHandle` is the
//! world-backed implementation. Issuing a move-type command replaces the
//! active command outright; the `queue` flag only controls waypoint
//! append-vs-replace inside the locomotion executor.

use crate::components::{
    AiController, CommandState, Launcher, Locomotion, Position, Team, Turret, UnitAiParams,
    UnitId,
};
use crate::systems::engagement::engage;
use bevy_ecs::prelude::*;
use glam::Vec3;
use log::debug;

/// Orders a unit accepts from the outside.
pub trait UnitCommands {
    /// Order the unit to a destination. Returns whether locomotion accepted
    /// the order.
    fn move_to(&mut self, position: Vec3, queue: bool) -> bool;

    /// Order the unit to a destination, engaging enemies encountered on the
    /// way. Returns whether locomotion accepted the order.
    fn attack_move(&mut self, position: Vec3) -> bool;

    /// Run the engagement policy once against a specific unit, immediately.
    /// Leaves the command state untouched. Returns false when the target
    /// does not resolve to a unit.
    fn attack(&mut self, target: Entity) -> bool;

    /// Halt locomotion. Does not change the command state.
    fn stop(&mut self);
}

/// A borrowed view of one unit for issuing commands.
pub struct UnitHandle<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> UnitHandle<'w> {
    pub fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    fn unit_id(&self) -> u32 {
        self.world.get::<UnitId>(self.entity).map_or(0, |id| id.0)
    }
}

impl UnitCommands for UnitHandle<'_> {
    fn move_to(&mut self, position: Vec3, queue: bool) -> bool {
        let id = self.unit_id();
        let mut query = self
            .world
            .query::<(&mut CommandState, &mut AiController, &mut Locomotion)>();
        let Ok((mut state, mut ai, mut locomotion)) = query.get_mut(self.world, self.entity)
        else {
            return false;
        };

        *state = CommandState::Move;
        ai.move_location = Some(position);
        debug!("unit {}: move to {:?} (queue={})", id, position, queue);
        locomotion.move_to(position, queue)
    }

    fn attack_move(&mut self, position: Vec3) -> bool {
        let id = self.unit_id();
        let mut query = self
            .world
            .query::<(&mut CommandState, &mut AiController, &mut Locomotion)>();
        let Ok((mut state, mut ai, mut locomotion)) = query.get_mut(self.world, self.entity)
        else {
            return false;
        };

        *state = CommandState::AttackMove;
        ai.move_location = Some(position);
        debug!("unit {}: attack-move to {:?}", id, position);
        locomotion.move_to(position, false)
    }

    fn attack(&mut self, target: Entity) -> bool {
        // The target must resolve to a unit with a known position.
        if self.world.get::<Team>(target).is_none() {
            return false;
        }
        let Some(target_position) = self.world.get::<Position>(target).map(|p| p.0) else {
            return false;
        };

        let id = self.unit_id();
        let mut query = self.world.query::<(
            &Position,
            &UnitAiParams,
            &mut Locomotion,
            &mut Turret,
            &mut Launcher,
        )>();
        let Ok((position, params, mut locomotion, mut turret, mut launcher)) =
            query.get_mut(self.world, self.entity)
        else {
            return false;
        };

        debug!("unit {}: attacking {:?}", id, target);
        engage(
            position.0,
            target_position,
            params,
            &mut locomotion,
            &mut turret,
            &mut launcher,
        );
        true
    }

    fn stop(&mut self) {
        if let Some(mut locomotion) = self.world.get_mut::<Locomotion>(self.entity) {
            locomotion.stop();
        }
    }
}
