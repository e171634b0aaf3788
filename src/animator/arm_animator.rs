//! Single-arm animator for avatars that only need one hand positioned.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::animator::effector::EffectorTarget;
use crate::animator::euler::euler_vec;
use crate::animator::landmark::PoseLandmarks;
use crate::animator::phase::{AnimatorPhase, Mode};
use crate::animator::rig::{HandBone, Rig, RigBone, Side};
use crate::animator::rotation::reconstruct_depth;
use crate::animator::tracking_state::ArmTrackingState;
use crate::animator::zone::{ZoneBands, ZoneRotations, approach};
use crate::error::SetupError;

/// Configuration for the [`ArmAnimator`]. Values are for the left arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmAnimatorConfig {
    pub side: Side,
    pub weight: f32,
    pub presence_threshold: f32,
    pub convergence_rate: f32,
    pub arrival_threshold: f32,
    pub ready_position: Vector3<f32>,
    pub ready_rotation: Vector3<f32>,
    pub bend_goal: Vector3<f32>,
    pub zones: ZoneBands,
    pub zone_rotations: ZoneRotations,
    /// Scale from reconstructed landmark depth to avatar forward distance
    pub depth_gain: f32,
    pub rotation_tolerance_deg: f32,
}

impl Default for ArmAnimatorConfig {
    fn default() -> Self {
        Self {
            side: Side::Left,
            weight: 1.0,
            presence_threshold: 0.5,
            convergence_rate: 2.0,
            arrival_threshold: 0.01,
            ready_position: Vector3::new(-0.3, 1.3, 0.25),
            ready_rotation: Vector3::new(170.0, 110.0, 0.0),
            bend_goal: Vector3::new(-0.5, 0.5, 0.0),
            zones: ZoneBands::ARM,
            zone_rotations: ZoneRotations::default(),
            depth_gain: 1.0,
            rotation_tolerance_deg: 0.1,
        }
    }
}

/// Effector output of the [`ArmAnimator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmPose {
    pub side: Side,
    pub effector: EffectorTarget,
    pub bend_goal: Vector3<f32>,
    pub mode: Mode,
}

pub struct ArmAnimator {
    config: ArmAnimatorConfig,
    head: Vector3<f32>,
    state: ArmTrackingState,
    phase: AnimatorPhase,
}

impl ArmAnimator {
    pub fn new(rig: &impl Rig, config: ArmAnimatorConfig) -> Result<Self, SetupError> {
        let side = config.side;
        let head = rig.bone(RigBone::Head)?.position;
        let hand = rig.bone(RigBone::Hand(side, HandBone::Hand))?;

        let state = ArmTrackingState::new(
            side,
            hand.position,
            hand.rotation,
            side.mirror_position(config.ready_position),
            hand.rotation * euler_vec(&side.mirror_euler(config.ready_rotation)),
            side.mirror_position(config.bend_goal),
            config.weight,
        );

        debug!(side = side.as_str(), "arm animator initialized");
        Ok(Self {
            config,
            head,
            state,
            phase: AnimatorPhase::Uninitialized,
        })
    }

    pub fn phase(&self) -> AnimatorPhase {
        self.phase
    }

    pub fn state(&self) -> &ArmTrackingState {
        &self.state
    }

    pub fn output(&self) -> ArmPose {
        ArmPose {
            side: self.state.side,
            effector: self.state.effector,
            bend_goal: self.state.bend_goal,
            mode: self.state.mode,
        }
    }

    /// Advance by `dt` seconds with the latest pose landmarks, if any.
    pub fn update(&mut self, pose: Option<&PoseLandmarks>, dt: f32) -> ArmPose {
        let config = &self.config;
        let state = &mut self.state;

        if self.phase == AnimatorPhase::Uninitialized {
            self.phase = AnimatorPhase::Calibrating;
        }

        if let Some(pose) = pose {
            let wrist = pose.wrist(state.side);
            if state.reach_baseline.is_none()
                && wrist.presence > config.presence_threshold
                && wrist.is_finite()
                && pose.head().is_finite()
            {
                state.reach_baseline = Some(wrist.offset_from(pose.head()));
                debug!(side = state.side.as_str(), "reach baseline captured");
            }
        }

        if self.phase == AnimatorPhase::Calibrating {
            if state.distance_to_ready() >= config.arrival_threshold {
                let t = (dt * config.convergence_rate).clamp(0.0, 1.0);
                state.position = state.position.lerp(&state.ready_position, t);
                let current = &state.orientation.current;
                if let Some(next) = approach(current, &state.ready_rotation, t, 0.0) {
                    state.orientation.current = next;
                }
                state.effector =
                    EffectorTarget::new(state.position, state.orientation.current, config.weight);
                state.mode = Mode::Converging;
                return self.output();
            }
            state.reached_ready = true;
            self.phase = AnimatorPhase::Ready;
            info!(side = state.side.as_str(), "arm reached ready pose");
        }

        let Some(pose) = pose else {
            state.mode = Mode::Holding;
            return self.output();
        };

        let side = state.side;
        let wrist = pose.wrist(side);
        let nose = pose.head();
        if !wrist.is_finite() || !nose.is_finite() {
            trace!(side = side.as_str(), "non-finite wrist or head landmark");
            state.mode = Mode::Holding;
            return self.output();
        }
        state.motion.push(wrist.position());
        if wrist.presence.is_nan() || wrist.presence <= config.presence_threshold {
            trace!(side = side.as_str(), presence = wrist.presence, "wrist below presence threshold");
            state.mode = Mode::Holding;
            return self.output();
        }

        let delta = wrist.planar_delta(nose);
        let forward = state
            .reach_baseline
            .and_then(|baseline| reconstruct_depth(&delta, &baseline))
            .filter(|d| d.is_finite())
            .unwrap_or(0.0);
        let offset = Vector3::new(
            delta.x,
            delta.y,
            state.ready_position.z - self.head.z + config.depth_gain * forward,
        );
        state.head_offset = Some(offset);
        state.position = self.head + offset;

        let class = config.zones.classify(side, &delta, state.motion.horizontal_motion());
        state.orientation.update(
            class,
            &state.ready_rotation,
            side,
            &config.zone_rotations,
            dt,
            config.rotation_tolerance_deg,
        );
        state.effector = EffectorTarget::new(state.position, state.orientation.current, config.weight);
        state.bend_goal = side.mirror_position(config.bend_goal);
        state.mode = Mode::FreeTracking;
        self.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::landmark::{LEFT_WRIST, Landmark, NOSE};
    use crate::animator::rig::RigPose;
    use approx::assert_abs_diff_eq;

    fn pose(wrist: Landmark) -> PoseLandmarks {
        let mut pose = PoseLandmarks::default();
        pose.points[NOSE] = Landmark::at(0.0, 0.0, 0.0);
        pose.points[LEFT_WRIST] = wrist;
        pose
    }

    fn ready_animator(first: &PoseLandmarks) -> ArmAnimator {
        let mut arm = ArmAnimator::new(&RigPose::reference(), ArmAnimatorConfig::default()).unwrap();
        arm.update(Some(first), 0.5);
        arm.update(Some(first), 0.5);
        assert_eq!(arm.phase(), AnimatorPhase::Ready);
        arm
    }

    #[test]
    fn test_forward_depth_from_reach() {
        let first = pose(Landmark::at(-0.3, -0.4, 0.0));
        let mut arm = ready_animator(&first);

        // reach baseline length 0.5, visible 0.3 -> 0.4 forward
        let output = arm.update(Some(&pose(Landmark::at(-0.3, 0.0, 0.0))), 0.1);
        assert_eq!(output.mode, Mode::FreeTracking);
        assert_abs_diff_eq!(output.effector.position.x, -0.3, epsilon = 1e-5);
        assert_abs_diff_eq!(output.effector.position.y, 1.6, epsilon = 1e-5);
        assert_abs_diff_eq!(output.effector.position.z, 0.25 + 0.4, epsilon = 1e-4);
    }

    #[test]
    fn test_degenerate_depth_is_zero() {
        let first = pose(Landmark::at(-0.1, 0.0, 0.0));
        let mut arm = ready_animator(&first);

        let output = arm.update(Some(&pose(Landmark::at(-0.5, 0.0, 0.0))), 0.1);
        assert_abs_diff_eq!(output.effector.position.z, 0.25, epsilon = 1e-5);
    }

    #[test]
    fn test_low_presence_holds() {
        let first = pose(Landmark::at(-0.3, -0.4, 0.0));
        let mut arm = ready_animator(&first);
        let tracked = arm.update(Some(&pose(Landmark::at(-0.3, 0.0, 0.0))), 0.1);

        let held = arm.update(Some(&pose(Landmark::new(0.2, 0.2, 0.0, 0.3))), 0.1);
        assert_eq!(held.mode, Mode::Holding);
        assert_eq!(held.effector, tracked.effector);
    }

    #[test]
    fn test_reach_baseline_captured_once_from_finite_sample() {
        let mut arm = ArmAnimator::new(&RigPose::reference(), ArmAnimatorConfig::default()).unwrap();
        arm.update(Some(&pose(Landmark::at(f32::NAN, -0.4, 0.0))), 0.1);
        assert!(arm.state().reach_baseline.is_none());

        arm.update(Some(&pose(Landmark::at(-0.3, -0.4, 0.0))), 0.1);
        arm.update(Some(&pose(Landmark::at(-0.1, -0.1, 0.0))), 0.1);
        let baseline = arm.state().reach_baseline.unwrap();
        assert_abs_diff_eq!(baseline, Vector3::new(-0.3, -0.4, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_nan_wrist_holds() {
        let first = pose(Landmark::at(-0.3, -0.4, 0.0));
        let mut arm = ready_animator(&first);
        let tracked = arm.update(Some(&pose(Landmark::at(-0.3, 0.0, 0.0))), 0.1);

        let held = arm.update(Some(&pose(Landmark::at(f32::NAN, 0.0, 0.0))), 0.1);
        assert_eq!(held.mode, Mode::Holding);
        assert_eq!(held.effector, tracked.effector);

        // a broken sample does not poison the motion history
        let resumed = arm.update(Some(&pose(Landmark::at(-0.3, 0.0, 0.0))), 0.1);
        assert_eq!(resumed.mode, Mode::FreeTracking);
        assert!(resumed.effector.position.iter().all(|c| c.is_finite()));
        assert!(arm.state().motion.horizontal_motion().is_finite());
    }
}
