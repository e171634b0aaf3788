mod arm_animator;
mod effector;
mod euler;
mod fixed_pose;
mod gesture;
mod hand_animator;
pub mod landmark;
mod phase;
mod rig;
pub mod rotation;
mod tracking_state;
mod zone;

pub use arm_animator::{ArmAnimator, ArmAnimatorConfig, ArmPose};
pub use effector::{EffectorTarget, Finger, FingerBones, HandPose, HandRotations};
pub use euler::{euler_deg, euler_vec, to_euler_deg};
pub use fixed_pose::{GESTURE_ROTATION_WEIGHT, GesturePose};
pub use gesture::Gesture;
pub use hand_animator::{HandAnimatorConfig, HandsAnimator, HandsOutput};
pub use landmark::{HandLandmarks, Landmark, LandmarkFrame, PoseLandmarks};
pub use phase::{AnimatorPhase, Mode, Zone};
pub use rig::{BoneTransform, HandBone, HandRest, RestPose, Rig, RigBone, RigPose, Side};
pub use tracking_state::{
    ArmTrackingState, FingerBaseline, HandBaselines, LimbTrackingState, MotionHistory,
};
pub use zone::{Band, WristOrientation, ZoneBands, ZoneClass, ZoneRotation, ZoneRotations};
