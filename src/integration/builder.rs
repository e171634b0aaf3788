//! Builder for creating landmark frames from flat perception buffers.

use tracing::warn;

use crate::animator::landmark::{HAND_LANDMARK_COUNT, POSE_LANDMARK_COUNT};
use crate::animator::{Gesture, HandLandmarks, Landmark, LandmarkFrame, PoseLandmarks, Side};
use crate::error::FrameError;

use super::IntoLandmarkFrame;

/// Values per landmark in a full buffer: x, y, z, presence.
const STRIDE: usize = 4;
/// Values per landmark in a buffer without presence.
const STRIDE_NO_PRESENCE: usize = 3;

/// Map a handedness category (`"Left"`, `"Right"`) to a side.
pub fn side_from_handedness(name: &str) -> Result<Side, FrameError> {
    if name.eq_ignore_ascii_case("left") {
        Ok(Side::Left)
    } else if name.eq_ignore_ascii_case("right") {
        Ok(Side::Right)
    } else {
        Err(FrameError::UnknownHandedness(name.to_string()))
    }
}

/// Parse `N` landmarks from a flat buffer of 4 (or 3, presence 1.0) values
/// per point.
fn parse_landmarks<const N: usize>(
    kind: &'static str,
    data: &[f32],
) -> Result<[Landmark; N], FrameError> {
    let stride = if data.len() == N * STRIDE {
        STRIDE
    } else if data.len() == N * STRIDE_NO_PRESENCE {
        STRIDE_NO_PRESENCE
    } else {
        warn!(kind, got = data.len(), "rejecting landmark buffer");
        return Err(FrameError::InvalidLength {
            kind,
            expected: N * STRIDE,
            got: data.len(),
        });
    };

    let mut points = [Landmark::default(); N];
    for (point, chunk) in points.iter_mut().zip(data.chunks_exact(stride)) {
        let presence = chunk.get(3).copied().unwrap_or(1.0);
        *point = Landmark::new(chunk[0], chunk[1], chunk[2], presence);
    }
    Ok(points)
}

/// Builder for `LandmarkFrame`s.
#[derive(Debug, Clone, Default)]
pub struct LandmarkFrameBuilder {
    frame: LandmarkFrame,
}

impl LandmarkFrameBuilder {
    /// Create an empty frame builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pose(mut self, pose: PoseLandmarks) -> Self {
        self.frame.pose = Some(pose);
        self
    }

    /// Set body landmarks from a flat buffer of 33 points.
    pub fn pose_buffer(self, data: &[f32]) -> Result<Self, FrameError> {
        let points = parse_landmarks::<POSE_LANDMARK_COUNT>("pose", data)?;
        Ok(self.pose(PoseLandmarks::new(points)))
    }

    pub fn hand(mut self, side: Side, hand: HandLandmarks) -> Self {
        match side {
            Side::Left => self.frame.left_hand = Some(hand),
            Side::Right => self.frame.right_hand = Some(hand),
        }
        self
    }

    /// Set one hand from its handedness category and a flat buffer of 21
    /// points.
    pub fn hand_buffer(self, handedness: &str, data: &[f32]) -> Result<Self, FrameError> {
        let side = side_from_handedness(handedness)?;
        let points = parse_landmarks::<HAND_LANDMARK_COUNT>("hand", data)?;
        Ok(self.hand(side, HandLandmarks::new(points)))
    }

    pub fn gesture(mut self, side: Side, gesture: Gesture) -> Self {
        match side {
            Side::Left => self.frame.left_gesture = gesture,
            Side::Right => self.frame.right_gesture = gesture,
        }
        self
    }

    /// Set one hand's gesture from classifier category names.
    pub fn gesture_category(self, handedness: &str, category: &str) -> Result<Self, FrameError> {
        let side = side_from_handedness(handedness)?;
        Ok(self.gesture(side, Gesture::from_category(category)))
    }

    /// Build the final `LandmarkFrame`.
    pub fn build(self) -> LandmarkFrame {
        self.frame
    }
}

impl IntoLandmarkFrame for LandmarkFrameBuilder {
    fn into_landmark_frame(self) -> LandmarkFrame {
        self.build()
    }
}
