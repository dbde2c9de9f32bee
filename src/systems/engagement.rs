//! Engagement policy - range banding, firing positions, aim-and-shoot.
//!
//! A unit is comfortable between half its attack range and its full attack
//! range. Outside that band it repositions to a point exactly `attack_range`
//! from the target on the line between the two; inside it, it halts and
//! opens fire.

use crate::components::{Launcher, Locomotion, Turret, UnitAiParams};
use glam::Vec3;

/// What a single engagement evaluation did to the executors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngageOutcome {
    /// A move order toward the firing position was left standing.
    pub moved: bool,
    /// The turret was aimed and the launcher trigger pulled.
    pub fired: bool,
}

/// The point exactly `attack_range` from the target on the target→self line.
pub fn firing_position(self_position: Vec3, target_position: Vec3, attack_range: f32) -> Vec3 {
    match (target_position - self_position).try_normalize() {
        Some(direction) => target_position - direction * attack_range,
        // Sitting on top of the target; no meaningful direction to back
        // off along.
        None => target_position,
    }
}

/// Evaluate the engagement policy once against a target position.
/// Safe to call every tick while engaged; firing is a latched signal.
pub fn engage(
    self_position: Vec3,
    target_position: Vec3,
    params: &UnitAiParams,
    locomotion: &mut Locomotion,
    turret: &mut Turret,
    launcher: &mut Launcher,
) -> EngageOutcome {
    let distance = self_position.distance(target_position);
    let in_band = distance >= params.attack_range / 2.0 && distance <= params.attack_range;

    if !in_band {
        let goal = firing_position(self_position, target_position, params.attack_range);
        let accepted = locomotion.move_to(goal, false);

        if self_position.distance(goal) <= params.position_error_margin {
            locomotion.stop();
            aim_and_shoot(self_position, target_position, turret, launcher);
            return EngageOutcome {
                moved: false,
                fired: true,
            };
        }
        return EngageOutcome {
            moved: accepted,
            fired: false,
        };
    }

    locomotion.stop();
    aim_and_shoot(self_position, target_position, turret, launcher);
    EngageOutcome {
        moved: false,
        fired: true,
    }
}

/// Snap the turret onto the target direction and latch the launcher trigger.
fn aim_and_shoot(self_position: Vec3, target_position: Vec3, turret: &mut Turret, launcher: &mut Launcher) {
    if let Some(direction) = (target_position - self_position).try_normalize() {
        turret.set_orientation(direction);
    }
    launcher.begin_trigger_pull();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executors() -> (Locomotion, Turret, Launcher) {
        (Locomotion::default(), Turret::default(), Launcher::default())
    }

    #[test]
    fn test_firing_position_on_target_self_line() {
        let goal = firing_position(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), 60.0);
        assert!((goal - Vec3::new(40.0, 0.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_in_band_stops_and_fires_without_moving() {
        let (mut locomotion, mut turret, mut launcher) = executors();
        let params = UnitAiParams::default();

        let outcome = engage(
            Vec3::ZERO,
            Vec3::new(50.0, 0.0, 0.0),
            &params,
            &mut locomotion,
            &mut turret,
            &mut launcher,
        );

        assert_eq!(outcome, EngageOutcome { moved: false, fired: true });
        assert!(!locomotion.is_moving());
        assert!(launcher.is_firing());
        assert!((turret.facing - Vec3::X).length() < 0.001);
    }

    #[test]
    fn test_too_far_moves_to_firing_position() {
        let (mut locomotion, mut turret, mut launcher) = executors();
        let params = UnitAiParams::default();

        let outcome = engage(
            Vec3::ZERO,
            Vec3::new(100.0, 0.0, 0.0),
            &params,
            &mut locomotion,
            &mut turret,
            &mut launcher,
        );

        assert_eq!(outcome, EngageOutcome { moved: true, fired: false });
        assert_eq!(
            locomotion.final_target_location(),
            Some(Vec3::new(40.0, 0.0, 0.0))
        );
        assert!(!launcher.is_firing());
    }

    #[test]
    fn test_too_close_backs_off_to_firing_position() {
        let (mut locomotion, mut turret, mut launcher) = executors();
        let params = UnitAiParams::default();

        let outcome = engage(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            &params,
            &mut locomotion,
            &mut turret,
            &mut launcher,
        );

        // Firing position is 60 units behind the target from our side.
        assert_eq!(outcome, EngageOutcome { moved: true, fired: false });
        assert_eq!(
            locomotion.final_target_location(),
            Some(Vec3::new(-50.0, 0.0, 0.0))
        );
    }

    #[test]
    fn test_arrived_at_firing_position_stops_and_fires() {
        let (mut locomotion, mut turret, mut launcher) = executors();
        let params = UnitAiParams::default();

        // Target at x=100, firing position at x=40; we stand at x=35,
        // within the 10-unit error margin of the firing position.
        let outcome = engage(
            Vec3::new(35.0, 0.0, 0.0),
            Vec3::new(100.0, 0.0, 0.0),
            &params,
            &mut locomotion,
            &mut turret,
            &mut launcher,
        );

        assert_eq!(outcome, EngageOutcome { moved: false, fired: true });
        assert!(!locomotion.is_moving());
        assert!(launcher.is_firing());
        assert!((turret.facing - Vec3::X).length() < 0.001);
    }

    #[test]
    fn test_coincident_target_does_not_produce_nan() {
        let (mut locomotion, mut turret, mut launcher) = executors();
        let params = UnitAiParams::default();

        let outcome = engage(
            Vec3::ZERO,
            Vec3::ZERO,
            &params,
            &mut locomotion,
            &mut turret,
            &mut launcher,
        );

        // Standing on the target: the fallback firing position is the target
        // itself, which we have trivially reached.
        assert!(outcome.fired);
        assert!(turret.facing.is_finite());
        assert!(!locomotion.is_moving());
    }

    #[test]
    fn test_repeated_engagement_is_idempotent() {
        let (mut locomotion, mut turret, mut launcher) = executors();
        let params = UnitAiParams::default();

        for _ in 0..3 {
            let outcome = engage(
                Vec3::ZERO,
                Vec3::new(45.0, 0.0, 0.0),
                &params,
                &mut locomotion,
                &mut turret,
                &mut launcher,
            );
            assert!(outcome.fired);
        }
        assert!(launcher.is_firing());
        assert!(!locomotion.is_moving());
    }
}
