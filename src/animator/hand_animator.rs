//! Two-hand animator: turns landmark frames into IK effector targets and
//! finger bone rotations.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::animator::effector::{EffectorTarget, Finger, HandPose};
use crate::animator::euler::{euler_deg, euler_vec};
use crate::animator::fixed_pose::{GesturePose, elbow_effector, elbow_rotations};
use crate::animator::landmark::{
    HandLandmarks, INDEX_MCP, LandmarkFrame, PoseLandmarks, THUMB_IP, THUMB_MCP,
};
use crate::animator::phase::{AnimatorPhase, Mode, Zone};
use crate::animator::rig::{RestPose, Rig, Side};
use crate::animator::rotation::{
    elbow_bend, fingers_bent, flexion_angle, palm_yaw, planar_rotation, set_base_rotation,
    set_fingertip_rotation,
};
use crate::animator::tracking_state::{HandBaselines, LimbTrackingState, finger_joints};
use crate::animator::zone::{ZoneBands, ZoneRotations, approach};
use crate::error::SetupError;

/// Configuration for the [`HandsAnimator`].
///
/// Positions and rotations are given for the left hand and mirrored for
/// the right, except the ready rotations which are set per hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandAnimatorConfig {
    /// IK weight of both effectors
    pub weight: f32,
    /// Wrist landmarks at or below this presence are ignored
    pub presence_threshold: f32,
    /// Minimum elbow presence for the elbow override
    pub elbow_presence_threshold: f32,
    /// Interpolation rate per second towards the ready pose
    pub convergence_rate: f32,
    /// Distance at which an effector counts as arrived at the ready pose
    pub arrival_threshold: f32,
    /// Ready effector position in avatar space
    pub ready_position: Vector3<f32>,
    /// Ready wrist rotation on top of the rest rotation, rig Euler degrees
    pub left_ready_rotation: Vector3<f32>,
    pub right_ready_rotation: Vector3<f32>,
    pub bend_goal: Vector3<f32>,
    pub zones: ZoneBands,
    pub zone_rotations: ZoneRotations,
    /// Elbow bend at or above which the elbow override applies, in degrees
    pub elbow_bend_threshold_deg: f32,
    /// How far the wrist may sit inwards of the elbow for the elbow override
    pub elbow_tuck_band: f32,
    /// Palm yaw is only applied while no finger is bent past this
    pub fingers_bent_threshold_deg: f32,
    /// Wrist orientations closer than this to their target are left alone
    pub rotation_tolerance_deg: f32,
}

impl Default for HandAnimatorConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            presence_threshold: 0.5,
            elbow_presence_threshold: 0.4,
            convergence_rate: 2.0,
            arrival_threshold: 0.01,
            ready_position: Vector3::new(-0.37, 1.56, 0.23),
            left_ready_rotation: Vector3::new(170.0, 110.0, 0.0),
            right_ready_rotation: Vector3::new(-40.0, 15.0, 60.0),
            bend_goal: Vector3::new(-0.5, 0.5, 0.0),
            zones: ZoneBands::HANDS,
            zone_rotations: ZoneRotations::default(),
            elbow_bend_threshold_deg: 40.0,
            elbow_tuck_band: 0.08,
            fingers_bent_threshold_deg: 50.0,
            rotation_tolerance_deg: 0.1,
        }
    }
}

impl HandAnimatorConfig {
    fn ready_rotation(&self, side: Side) -> Vector3<f32> {
        match side {
            Side::Left => self.left_ready_rotation,
            Side::Right => self.right_ready_rotation,
        }
    }
}

/// Poses of both hands for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandsOutput {
    pub left: HandPose,
    pub right: HandPose,
}

impl HandsOutput {
    pub fn hand(&self, side: Side) -> &HandPose {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

pub struct HandsAnimator {
    config: HandAnimatorConfig,
    head: Vector3<f32>,
    left: LimbTrackingState,
    right: LimbTrackingState,
    phase: AnimatorPhase,
}

impl HandsAnimator {
    /// Resolve the rig and prepare both hands. Fails on the first missing bone.
    pub fn new(rig: &impl Rig, config: HandAnimatorConfig) -> Result<Self, SetupError> {
        let rest = RestPose::capture(rig)?;

        let limb = |side: Side| {
            let hand = *rest.hand(side);
            LimbTrackingState::new(
                side,
                hand,
                side.mirror_position(config.ready_position),
                hand.rotation * euler_vec(&config.ready_rotation(side)),
                side.mirror_position(config.bend_goal),
                config.weight,
            )
        };
        let left = limb(Side::Left);
        let right = limb(Side::Right);

        debug!(head = ?rest.head, "hands animator initialized");
        Ok(Self {
            config,
            head: rest.head,
            left,
            right,
            phase: AnimatorPhase::Uninitialized,
        })
    }

    pub fn config(&self) -> &HandAnimatorConfig {
        &self.config
    }

    pub fn phase(&self) -> AnimatorPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == AnimatorPhase::Ready
    }

    pub fn head_position(&self) -> &Vector3<f32> {
        &self.head
    }

    pub fn state(&self, side: Side) -> &LimbTrackingState {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn output(&self) -> HandsOutput {
        HandsOutput {
            left: self.left.pose(),
            right: self.right.pose(),
        }
    }

    /// Advance by `dt` seconds with the latest landmark frame, if any.
    ///
    /// Until both hands have reached the ready pose only the convergence
    /// runs; afterwards each hand is solved from the frame. Without a frame
    /// every effector keeps its last value.
    pub fn update(&mut self, frame: Option<&LandmarkFrame>, dt: f32) -> HandsOutput {
        if self.phase == AnimatorPhase::Uninitialized {
            self.phase = AnimatorPhase::Calibrating;
            debug!("converging to ready pose");
        }

        if let Some(frame) = frame {
            for state in [&mut self.left, &mut self.right] {
                calibrate(state, frame, &self.config);
            }
        }

        if self.phase == AnimatorPhase::Calibrating {
            for state in [&mut self.left, &mut self.right] {
                converge(state, &self.config, dt);
            }
            if !(self.left.reached_ready && self.right.reached_ready) {
                return self.output();
            }
            self.phase = AnimatorPhase::Ready;
            info!("hands reached ready pose");
        }

        for state in [&mut self.left, &mut self.right] {
            solve_hand(state, frame, &self.head, &self.config, dt);
            trace!(side = state.side.as_str(), mode = ?state.mode, "hand solved");
        }
        self.output()
    }
}

/// Capture baselines the first time the data for them shows up.
fn calibrate(state: &mut LimbTrackingState, frame: &LandmarkFrame, config: &HandAnimatorConfig) {
    let side = state.side;

    if let Some(hand) = frame.hand(side).filter(|h| h.is_finite()) {
        if state.capture_baselines(hand) {
            debug!(side = side.as_str(), "hand baselines captured");
        }
    }

    if state.forearm_baseline.is_none() {
        if let Some(pose) = &frame.pose {
            let wrist = pose.wrist(side);
            let elbow = pose.elbow(side);
            if wrist.presence > config.presence_threshold
                && elbow.presence >= config.elbow_presence_threshold
                && wrist.is_finite()
                && elbow.is_finite()
            {
                state.forearm_baseline = Some(wrist.offset_from(elbow));
                debug!(side = side.as_str(), "forearm baseline captured");
            }
        }
    }
}

/// One interpolation step towards the ready pose. Sets `reached_ready` once
/// the effector is within the arrival threshold.
fn converge(state: &mut LimbTrackingState, config: &HandAnimatorConfig, dt: f32) {
    if state.reached_ready {
        return;
    }
    if state.distance_to_ready() < config.arrival_threshold {
        state.reached_ready = true;
        return;
    }

    let t = (dt * config.convergence_rate).clamp(0.0, 1.0);
    state.position = state.position.lerp(&state.ready_position, t);
    if let Some(next) = approach(&state.orientation.current, &state.ready_rotation, t, 0.0) {
        state.orientation.current = next;
    }
    state.effector = EffectorTarget::new(state.position, state.orientation.current, config.weight);
    state.mode = Mode::Converging;
}

/// Solve one hand from a frame once the ready pose has been reached.
fn solve_hand(
    state: &mut LimbTrackingState,
    frame: Option<&LandmarkFrame>,
    head: &Vector3<f32>,
    config: &HandAnimatorConfig,
    dt: f32,
) {
    let side = state.side;
    let previous_mode = state.mode;

    let Some(frame) = frame else {
        state.mode = Mode::Holding;
        return;
    };
    let Some(pose) = &frame.pose else {
        state.mode = Mode::Holding;
        return;
    };

    let wrist = pose.wrist(side);
    let nose = pose.head();
    if !wrist.is_finite() || !nose.is_finite() {
        trace!(side = side.as_str(), "non-finite wrist or head landmark");
        state.mode = Mode::Holding;
        return;
    }
    state.motion.push(wrist.position());
    if wrist.presence.is_nan() || wrist.presence <= config.presence_threshold {
        trace!(side = side.as_str(), presence = wrist.presence, "wrist below presence threshold");
        state.mode = Mode::Holding;
        return;
    }

    let offset = Vector3::new(
        wrist.x - nose.x,
        wrist.y - nose.y,
        state.ready_position.z - head.z,
    );
    state.head_offset = Some(offset);
    state.position = head + offset;

    let class = config
        .zones
        .classify(side, &offset.xy(), state.motion.horizontal_motion());
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

    let gesture = frame.gesture(side);
    if let Some(fixed) = GesturePose::for_gesture(gesture) {
        state.effector.rotation = fixed.effector_rotation(side, &state.ready_rotation);
        state.effector.rotation_weight = fixed.rotation_weight;
        state.bend_goal = fixed.bend_goal(side);
        state.rotations = fixed.rotations(side);
        state.mode = Mode::GestureOverride(gesture);
        return;
    }

    let facing_camera = class.zone == Some(Zone::FacingCamera);
    if facing_camera {
        if let Some(angle) = elbow_override_angle(state, pose, config) {
            let (rotation, bend_goal) = elbow_effector(side, &state.ready_rotation, angle);
            state.effector.rotation = rotation;
            state.bend_goal = bend_goal;
            state.rotations = elbow_rotations(side, &state.rest.rotations.thumb);
            state.mode = Mode::ElbowOverride;
            return;
        }
    }

    state.mode = Mode::FreeTracking;
    if !facing_camera {
        return;
    }
    let (Some(hand), Some(baselines)) = (frame.hand(side), state.baselines) else {
        return;
    };
    if matches!(previous_mode, Mode::GestureOverride(_) | Mode::ElbowOverride) {
        state.rotations = state.rest.rotations;
    }
    solve_fingers(state, hand, &baselines, config);
}

/// Elbow bend if the elbow override applies this frame.
fn elbow_override_angle(
    state: &LimbTrackingState,
    pose: &PoseLandmarks,
    config: &HandAnimatorConfig,
) -> Option<f32> {
    let side = state.side;
    let wrist = pose.wrist(side);
    let elbow = pose.elbow(side);

    if elbow.presence < config.elbow_presence_threshold {
        return None;
    }
    if side.sign() * (wrist.x - elbow.x) > config.elbow_tuck_band {
        return None;
    }
    let angle = elbow_bend(wrist, elbow, state.forearm_baseline.as_ref()?)?;
    (angle >= config.elbow_bend_threshold_deg).then_some(angle)
}

fn solve_fingers(
    state: &mut LimbTrackingState,
    hand: &HandLandmarks,
    baselines: &HandBaselines,
    config: &HandAnimatorConfig,
) {
    let sign = state.side.sign();
    let wrist = hand.wrist();

    let wrist_roll = planar_rotation(hand.get(INDEX_MCP), wrist, &baselines.index_base);
    state.effector.rotation = state.orientation.current * euler_deg(-sign * wrist_roll, 0.0, 0.0);

    for finger in Finger::ALL {
        let (mcp, pip, dip) = finger_joints(finger);
        let baseline = baselines.finger(finger);
        let bones = state.rotations.finger_mut(finger);

        let bend = flexion_angle(hand.get(dip), hand.get(pip), &baseline.mid);
        set_fingertip_rotation(sign * bend, &mut bones.mid, &mut bones.tip);

        let base = flexion_angle(hand.get(pip), hand.get(mcp), &baseline.base);
        set_base_rotation(sign * base, &mut bones.base);
    }

    let thumb = planar_rotation(hand.get(THUMB_IP), hand.get(THUMB_MCP), &baselines.thumb);
    state.rotations.thumb[1] = state.rest.rotations.thumb[1] * euler_deg(-sign * thumb, 0.0, 0.0);

    if !fingers_bent(&state.rotations, config.fingers_bent_threshold_deg) {
        let yaw = palm_yaw(hand.get(INDEX_MCP), wrist, &baselines.index_base);
        state.effector.rotation *= euler_deg(0.0, sign * yaw, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::rig::RigPose;

    #[test]
    fn test_starts_uninitialized() {
        let animator = HandsAnimator::new(&RigPose::reference(), HandAnimatorConfig::default()).unwrap();
        assert_eq!(animator.phase(), AnimatorPhase::Uninitialized);
        assert_eq!(animator.state(Side::Left).mode, Mode::Converging);
    }

    #[test]
    fn test_converges_without_frames() {
        let mut animator = HandsAnimator::new(&RigPose::reference(), HandAnimatorConfig::default()).unwrap();
        animator.update(None, 0.5);
        assert_eq!(animator.phase(), AnimatorPhase::Calibrating);

        let output = animator.update(None, 0.5);
        assert_eq!(animator.phase(), AnimatorPhase::Ready);
        assert_eq!(output.left.mode, Mode::Holding);
        assert_eq!(output.left.effector.position, Vector3::new(-0.37, 1.56, 0.23));
        assert_eq!(output.right.effector.position, Vector3::new(0.37, 1.56, 0.23));
    }

    #[test]
    fn test_missing_bone_fails_setup() {
        let mut rig = RigPose::reference();
        rig.remove(crate::animator::rig::RigBone::Head);
        assert!(HandsAnimator::new(&rig, HandAnimatorConfig::default()).is_err());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: HandAnimatorConfig =
            serde_json::from_str(r#"{ "presence_threshold": 0.7, "ready_position": [-0.3, 1.5, 0.2] }"#).unwrap();
        assert_eq!(config.presence_threshold, 0.7);
        assert_eq!(config.ready_position, Vector3::new(-0.3, 1.5, 0.2));
        assert_eq!(config.elbow_bend_threshold_deg, 40.0);
    }
}
