//! ECS Systems for the Ironline unit simulation.
//!
//! The per-tick pipeline is strictly ordered; decisions always use data
//! sensed in the same tick:
//!
//! 1. `spatial_index_update_system` - rebuilds the collider index from live
//!    units and obstacles
//! 2. `perception_system` - refreshes each AI unit's sensed-enemy set
//! 3. `unit_ai_system` - dispatches command-state behaviors, which may call
//!    the engagement policy and issue locomotion/turret/launcher actions
//! 4. `locomotion_system` - executes pending movement

pub mod ai;
pub mod engagement;
pub mod locomotion;
pub mod perception;

pub use ai::*;
pub use engagement::*;
pub use locomotion::*;
pub use perception::*;
