//! Hand poses that replace landmark solving.
//!
//! All values are for the left hand; right-hand poses are mirrored.

use nalgebra::{UnitQuaternion, Vector3};

use crate::animator::effector::{FingerBones, HandRotations};
use crate::animator::euler::{euler_deg, euler_vec};
use crate::animator::gesture::Gesture;
use crate::animator::rig::Side;

/// Rotation weight of the wrist effector while a gesture pose is shown.
pub const GESTURE_ROTATION_WEIGHT: f32 = 0.8;
/// Thumb tilt applied on top of the rest pose while the elbow is bent.
pub const ELBOW_THUMB_TILT_DEG: f32 = 20.0;

/// Fixed pose shown for a recognised gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GesturePose {
    /// Wrist rotation on top of the ready rotation, rig Euler degrees
    pub effector_offset: Vector3<f32>,
    pub rotation_weight: f32,
    pub left_bend_goal: Vector3<f32>,
    /// Set per hand; the right elbow is lifted higher
    pub right_bend_goal: Vector3<f32>,
    pub fingers: FingerBones,
    /// Thumb base rotation, shared by both hands
    pub thumb: Vector3<f32>,
}

impl GesturePose {
    pub fn for_gesture(gesture: Gesture) -> Option<Self> {
        let effector_offset = match gesture {
            Gesture::ThumbUp => Vector3::new(-90.0, -80.0, -80.0),
            Gesture::ThumbDown => Vector3::new(80.0, -60.0, -60.0),
            _ => return None,
        };
        Some(Self {
            effector_offset,
            rotation_weight: GESTURE_ROTATION_WEIGHT,
            left_bend_goal: Vector3::new(-1.5, 0.5, 0.0),
            right_bend_goal: Vector3::new(1.5, 1.0, 0.0),
            fingers: FingerBones {
                base: Vector3::new(5.0, 0.0, 85.0),
                mid: Vector3::new(0.0, 0.0, 85.0),
                tip: Vector3::new(0.0, 0.0, 80.0),
            },
            thumb: Vector3::new(57.0, 35.0, 30.0),
        })
    }

    pub fn effector_rotation(&self, side: Side, ready: &UnitQuaternion<f32>) -> UnitQuaternion<f32> {
        ready * euler_vec(&side.mirror_euler(self.effector_offset))
    }

    pub fn bend_goal(&self, side: Side) -> Vector3<f32> {
        match side {
            Side::Left => self.left_bend_goal,
            Side::Right => self.right_bend_goal,
        }
    }

    pub fn rotations(&self, side: Side) -> HandRotations {
        let fingers = self.fingers.mirrored(side);
        HandRotations {
            index: fingers,
            middle: fingers,
            ring: fingers,
            pinky: fingers,
            thumb: [
                euler_vec(&self.thumb),
                UnitQuaternion::identity(),
                UnitQuaternion::identity(),
            ],
        }
    }
}

/// Relaxed fist shown while the elbow is strongly bent.
///
/// Thumb rotations are tilted from `rest_thumb`.
pub fn elbow_rotations(side: Side, rest_thumb: &[UnitQuaternion<f32>; 3]) -> HandRotations {
    let curled = FingerBones::bent(60.0, 100.0, 50.0).mirrored(side);
    let tilt = euler_deg(-side.sign() * ELBOW_THUMB_TILT_DEG, 0.0, 0.0);
    HandRotations {
        index: FingerBones::bent(20.0, 0.0, 0.0).mirrored(side),
        middle: curled,
        ring: curled,
        pinky: curled,
        thumb: [rest_thumb[0], rest_thumb[1] * tilt, rest_thumb[2] * tilt],
    }
}

/// Wrist roll and bend goal while the elbow is bent by `angle` degrees.
pub fn elbow_effector(
    side: Side,
    ready: &UnitQuaternion<f32>,
    angle: f32,
) -> (UnitQuaternion<f32>, Vector3<f32>) {
    let rotation = ready * euler_deg(0.0, 0.0, side.sign() * angle);
    let bend_goal = Vector3::new(-side.sign() * 0.5, 0.5 + angle / 100.0, 0.0);
    (rotation, bend_goal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_thumb_gestures_have_poses() {
        assert!(GesturePose::for_gesture(Gesture::ThumbUp).is_some());
        assert!(GesturePose::for_gesture(Gesture::ThumbDown).is_some());
        assert!(GesturePose::for_gesture(Gesture::Victory).is_none());
        assert!(GesturePose::for_gesture(Gesture::None).is_none());
    }

    #[test]
    fn test_gesture_pose_mirrors_fingers_not_thumb() {
        let pose = GesturePose::for_gesture(Gesture::ThumbUp).unwrap();
        let left = pose.rotations(Side::Left);
        let right = pose.rotations(Side::Right);

        assert_eq!(left.index.base, Vector3::new(5.0, 0.0, 85.0));
        assert_eq!(right.pinky.base, Vector3::new(5.0, 0.0, -85.0));
        assert_eq!(right.ring.tip, Vector3::new(0.0, 0.0, -80.0));
        assert_eq!(left.thumb, right.thumb);
        assert_eq!(pose.bend_goal(Side::Left), Vector3::new(-1.5, 0.5, 0.0));
        assert_eq!(pose.bend_goal(Side::Right), Vector3::new(1.5, 1.0, 0.0));
    }

    #[test]
    fn test_elbow_pose() {
        let rest = [UnitQuaternion::identity(); 3];
        let right = elbow_rotations(Side::Right, &rest);
        assert_eq!(right.middle.bend_vector(), Vector3::new(-60.0, -100.0, -50.0));
        assert_eq!(right.index.bend_vector(), Vector3::new(-20.0, 0.0, 0.0));
        assert_eq!(right.thumb[0], rest[0]);
        assert!((right.thumb[1].angle().to_degrees() - 20.0).abs() < 1e-3);

        let (_, goal) = elbow_effector(Side::Left, &UnitQuaternion::identity(), 50.0);
        assert_eq!(goal, Vector3::new(-0.5, 1.0, 0.0));
    }
}
