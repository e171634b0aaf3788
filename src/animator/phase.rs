use crate::animator::gesture::Gesture;

/// Lifecycle of an animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimatorPhase {
    /// Constructed, no frame processed yet
    #[default]
    Uninitialized,
    /// Effectors converging to the ready pose
    Calibrating,
    /// Both limbs reached the ready pose; landmarks drive the rig
    Ready,
}

/// Which rule produced a limb's pose this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Interpolating towards the ready pose
    #[default]
    Converging,
    /// Landmark confidence too low or no landmarks; last pose held
    Holding,
    /// Strongly bent elbow with the hand tucked in
    ElbowOverride,
    /// Fixed pose for a recognised gesture
    GestureOverride(Gesture),
    /// Effector and fingers follow the landmarks
    FreeTracking,
    /// Applied from a replicated snapshot
    Replicated,
}

/// Horizontal region of the hand relative to the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Hand raised to the side, palm towards the camera
    FacingCamera,
    /// Hand in front of the body
    InFront,
    /// Hand moving outwards, away from the body
    ToSide,
}
