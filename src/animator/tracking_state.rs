//! Per-limb state carried between frames.

use nalgebra::{UnitQuaternion, Vector3};

use crate::animator::effector::{EffectorTarget, Finger, HandPose, HandRotations};
use crate::animator::landmark::{
    HandLandmarks, INDEX_DIP, INDEX_MCP, INDEX_PIP, MIDDLE_DIP, MIDDLE_MCP, MIDDLE_PIP,
    PINKY_DIP, PINKY_MCP, PINKY_PIP, RING_DIP, RING_MCP, RING_PIP, THUMB_IP, THUMB_MCP,
};
use crate::animator::phase::Mode;
use crate::animator::rig::{HandRest, Side};
use crate::animator::zone::WristOrientation;

/// Landmark indices of a finger's knuckle, middle and end joints.
pub(crate) fn finger_joints(finger: Finger) -> (usize, usize, usize) {
    match finger {
        Finger::Index => (INDEX_MCP, INDEX_PIP, INDEX_DIP),
        Finger::Middle => (MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP),
        Finger::Ring => (RING_MCP, RING_PIP, RING_DIP),
        Finger::Pinky => (PINKY_MCP, PINKY_PIP, PINKY_DIP),
    }
}

/// Rest-length offsets of one finger.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FingerBaseline {
    /// Knuckle to middle joint
    pub base: Vector3<f32>,
    /// Middle joint to end joint
    pub mid: Vector3<f32>,
}

/// Reference offsets captured from the first confident hand sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandBaselines {
    pub index: FingerBaseline,
    pub middle: FingerBaseline,
    pub ring: FingerBaseline,
    pub pinky: FingerBaseline,
    /// Thumb middle joint to thumb end joint
    pub thumb: Vector3<f32>,
    /// Wrist to index knuckle
    pub index_base: Vector3<f32>,
}

impl HandBaselines {
    pub fn capture(hand: &HandLandmarks) -> Self {
        let finger = |f| {
            let (mcp, pip, dip) = finger_joints(f);
            FingerBaseline {
                base: hand.get(pip).offset_from(hand.get(mcp)),
                mid: hand.get(dip).offset_from(hand.get(pip)),
            }
        };
        Self {
            index: finger(Finger::Index),
            middle: finger(Finger::Middle),
            ring: finger(Finger::Ring),
            pinky: finger(Finger::Pinky),
            thumb: hand.get(THUMB_IP).offset_from(hand.get(THUMB_MCP)),
            index_base: hand.get(INDEX_MCP).offset_from(hand.wrist()),
        }
    }

    pub fn finger(&self, finger: Finger) -> &FingerBaseline {
        match finger {
            Finger::Index => &self.index,
            Finger::Middle => &self.middle,
            Finger::Ring => &self.ring,
            Finger::Pinky => &self.pinky,
        }
    }
}

/// The last two wrist landmark positions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionHistory {
    pub previous: Option<Vector3<f32>>,
    pub latest: Option<Vector3<f32>>,
}

impl MotionHistory {
    pub fn push(&mut self, position: Vector3<f32>) {
        self.previous = self.latest.replace(position);
    }

    /// Horizontal movement between the last two samples, 0 until there are two.
    pub fn horizontal_motion(&self) -> f32 {
        match (self.previous, self.latest) {
            (Some(previous), Some(latest)) => latest.x - previous.x,
            _ => 0.0,
        }
    }
}

/// Everything the hands animator remembers about one hand.
#[derive(Debug, Clone, PartialEq)]
pub struct LimbTrackingState {
    pub side: Side,
    pub rest: HandRest,
    pub ready_position: Vector3<f32>,
    pub ready_rotation: UnitQuaternion<f32>,
    pub position: Vector3<f32>,
    pub orientation: WristOrientation,
    pub effector: EffectorTarget,
    pub bend_goal: Vector3<f32>,
    pub rotations: HandRotations,
    /// Hand offset from the head; `None` until the first confident sample.
    pub head_offset: Option<Vector3<f32>>,
    pub motion: MotionHistory,
    /// Captured once, on the first frame with this hand's landmarks.
    pub baselines: Option<HandBaselines>,
    /// Elbow to wrist, captured once from the first confident pose.
    pub forearm_baseline: Option<Vector3<f32>>,
    pub reached_ready: bool,
    pub mode: Mode,
}

impl LimbTrackingState {
    pub fn new(
        side: Side,
        rest: HandRest,
        ready_position: Vector3<f32>,
        ready_rotation: UnitQuaternion<f32>,
        bend_goal: Vector3<f32>,
        weight: f32,
    ) -> Self {
        Self {
            side,
            rest,
            ready_position,
            ready_rotation,
            position: rest.position,
            orientation: WristOrientation::new(rest.rotation, ready_rotation),
            effector: EffectorTarget::new(rest.position, rest.rotation, weight),
            bend_goal,
            rotations: rest.rotations,
            head_offset: None,
            motion: MotionHistory::default(),
            baselines: None,
            forearm_baseline: None,
            reached_ready: false,
            mode: Mode::Converging,
        }
    }

    /// Capture hand baselines unless already done. Returns whether this
    /// call captured them.
    pub fn capture_baselines(&mut self, hand: &HandLandmarks) -> bool {
        if self.baselines.is_some() {
            return false;
        }
        self.baselines = Some(HandBaselines::capture(hand));
        true
    }

    pub fn is_calibrated(&self) -> bool {
        self.baselines.is_some()
    }

    pub fn distance_to_ready(&self) -> f32 {
        (self.position - self.ready_position).norm()
    }

    pub fn pose(&self) -> HandPose {
        HandPose {
            side: self.side,
            effector: self.effector,
            bend_goal: self.bend_goal,
            rotations: self.rotations,
            mode: self.mode,
        }
    }
}

/// Simplified record for a single secondary arm: no fingers or gestures.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmTrackingState {
    pub side: Side,
    pub ready_position: Vector3<f32>,
    pub ready_rotation: UnitQuaternion<f32>,
    pub position: Vector3<f32>,
    pub orientation: WristOrientation,
    pub effector: EffectorTarget,
    pub bend_goal: Vector3<f32>,
    pub head_offset: Option<Vector3<f32>>,
    pub motion: MotionHistory,
    /// Head to wrist, captured once from the first confident pose.
    pub reach_baseline: Option<Vector3<f32>>,
    pub reached_ready: bool,
    pub mode: Mode,
}

impl ArmTrackingState {
    pub fn new(
        side: Side,
        rest_position: Vector3<f32>,
        rest_rotation: UnitQuaternion<f32>,
        ready_position: Vector3<f32>,
        ready_rotation: UnitQuaternion<f32>,
        bend_goal: Vector3<f32>,
        weight: f32,
    ) -> Self {
        Self {
            side,
            ready_position,
            ready_rotation,
            position: rest_position,
            orientation: WristOrientation::new(rest_rotation, ready_rotation),
            effector: EffectorTarget::new(rest_position, rest_rotation, weight),
            bend_goal,
            head_offset: None,
            motion: MotionHistory::default(),
            reach_baseline: None,
            reached_ready: false,
            mode: Mode::Converging,
        }
    }

    pub fn distance_to_ready(&self) -> f32 {
        (self.position - self.ready_position).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::landmark::{Landmark, WRIST};

    #[test]
    fn test_motion_history() {
        let mut motion = MotionHistory::default();
        assert_eq!(motion.horizontal_motion(), 0.0);
        motion.push(Vector3::new(0.2, 0.0, 0.0));
        assert_eq!(motion.horizontal_motion(), 0.0);
        motion.push(Vector3::new(0.1, 0.0, 0.0));
        assert!((motion.horizontal_motion() + 0.1).abs() < 1e-6);
        assert_eq!(motion.previous, Some(Vector3::new(0.2, 0.0, 0.0)));
    }

    #[test]
    fn test_baselines_are_planar() {
        let mut hand = HandLandmarks::default();
        hand.points[WRIST] = Landmark::at(0.0, 0.0, 0.5);
        hand.points[INDEX_MCP] = Landmark::at(0.02, 0.08, -0.3);
        hand.points[INDEX_PIP] = Landmark::at(0.02, 0.12, 0.1);

        let baselines = HandBaselines::capture(&hand);
        assert_eq!(baselines.index_base.z, 0.0);
        assert!((baselines.index_base.y - 0.08).abs() < 1e-6);
        assert!((baselines.index.base.y - 0.04).abs() < 1e-6);
    }
}
