//! Landmark-driven hand and arm animation for humanoid avatars.
//!
//! Per frame, 2D body and hand landmarks from an external perception
//! pipeline are turned into IK effector targets (wrist position and
//! rotation, elbow bend goal) and local finger bone rotations. Depth is
//! reconstructed from bone lengths captured on the first confident sample.

pub mod animator;
pub mod error;
pub mod integration;

pub use animator::{
    AnimatorPhase, ArmAnimator, ArmAnimatorConfig, ArmPose, BoneTransform, EffectorTarget,
    Finger, FingerBones, Gesture, HandAnimatorConfig, HandBone, HandLandmarks, HandPose,
    HandRotations, HandsAnimator, HandsOutput, Landmark, LandmarkFrame, Mode, PoseLandmarks,
    RestPose, Rig, RigBone, RigPose, Side, Zone, ZoneBands,
};
pub use error::{Error, FrameError, Result, SetupError};
pub use integration::{
    AvatarPipeline, IntoLandmarkFrame, LandmarkFrameBuilder, LandmarkSource, LatestFrame,
    PipelineOutput, RemoteHands, ReplicationConfig, ReplicationSnapshot, Replicator,
};
