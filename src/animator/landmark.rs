//! Per-frame landmark snapshot produced by the perception pipeline.

use nalgebra::{Vector2, Vector3};

use crate::animator::gesture::Gesture;
use crate::animator::rig::Side;

/// Number of body points in a pose landmark set.
pub const POSE_LANDMARK_COUNT: usize = 33;
/// Number of points in a hand landmark set.
pub const HAND_LANDMARK_COUNT: usize = 21;

// Pose landmark indices
pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;

// Hand landmark indices
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// A single tracked point in the perception pipeline's local unit space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Detection confidence in [0, 1].
    pub presence: f32,
}

impl Landmark {
    #[inline]
    pub fn new(x: f32, y: f32, z: f32, presence: f32) -> Self {
        Self { x, y, z, presence }
    }

    /// A fully confident point.
    #[inline]
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, 1.0)
    }

    /// Whether the planar coordinates are usable.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn position(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Planar offset of this point from `parent`, depth dropped.
    #[inline]
    pub fn planar_delta(&self, parent: &Landmark) -> Vector2<f32> {
        Vector2::new(self.x - parent.x, self.y - parent.y)
    }

    /// Planar offset from `parent` as a 3D vector with zero depth.
    ///
    /// This is the form baselines are captured in.
    #[inline]
    pub fn offset_from(&self, parent: &Landmark) -> Vector3<f32> {
        Vector3::new(self.x - parent.x, self.y - parent.y, 0.0)
    }

    /// Same point reflected across the x = 0 plane.
    #[inline]
    pub fn mirrored(&self) -> Self {
        Self { x: -self.x, ..*self }
    }
}

/// Body landmarks for one person.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLandmarks {
    pub points: [Landmark; POSE_LANDMARK_COUNT],
}

impl PoseLandmarks {
    pub fn new(points: [Landmark; POSE_LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    #[inline]
    pub fn get(&self, index: usize) -> &Landmark {
        &self.points[index]
    }

    pub fn head(&self) -> &Landmark {
        &self.points[NOSE]
    }

    pub fn wrist(&self, side: Side) -> &Landmark {
        match side {
            Side::Left => &self.points[LEFT_WRIST],
            Side::Right => &self.points[RIGHT_WRIST],
        }
    }

    pub fn elbow(&self, side: Side) -> &Landmark {
        match side {
            Side::Left => &self.points[LEFT_ELBOW],
            Side::Right => &self.points[RIGHT_ELBOW],
        }
    }

    /// Every point reflected across x = 0, with left and right swapped.
    pub fn mirrored(&self) -> Self {
        let mut points = self.points.map(|p| p.mirrored());
        for (l, r) in [
            (LEFT_SHOULDER, RIGHT_SHOULDER),
            (LEFT_ELBOW, RIGHT_ELBOW),
            (LEFT_WRIST, RIGHT_WRIST),
        ] {
            points.swap(l, r);
        }
        Self { points }
    }
}

impl Default for PoseLandmarks {
    fn default() -> Self {
        Self::new([Landmark::default(); POSE_LANDMARK_COUNT])
    }
}

/// Landmarks for a single hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    pub points: [Landmark; HAND_LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; HAND_LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    #[inline]
    pub fn get(&self, index: usize) -> &Landmark {
        &self.points[index]
    }

    pub fn wrist(&self) -> &Landmark {
        &self.points[WRIST]
    }

    /// Whether every point has usable planar coordinates.
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(Landmark::is_finite)
    }

    pub fn mirrored(&self) -> Self {
        Self {
            points: self.points.map(|p| p.mirrored()),
        }
    }
}

impl Default for HandLandmarks {
    fn default() -> Self {
        Self::new([Landmark::default(); HAND_LANDMARK_COUNT])
    }
}

/// Everything the perception pipeline reported for one frame.
///
/// Missing parts are `None`; a missing gesture is `Gesture::None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkFrame {
    pub pose: Option<PoseLandmarks>,
    pub left_hand: Option<HandLandmarks>,
    pub right_hand: Option<HandLandmarks>,
    pub left_gesture: Gesture,
    pub right_gesture: Gesture,
}

impl LandmarkFrame {
    pub fn hand(&self, side: Side) -> Option<&HandLandmarks> {
        match side {
            Side::Left => self.left_hand.as_ref(),
            Side::Right => self.right_hand.as_ref(),
        }
    }

    pub fn gesture(&self, side: Side) -> Gesture {
        match side {
            Side::Left => self.left_gesture,
            Side::Right => self.right_gesture,
        }
    }

    /// The frame a camera would see if the person were reflected left to right.
    pub fn mirrored(&self) -> Self {
        Self {
            pose: self.pose.as_ref().map(PoseLandmarks::mirrored),
            left_hand: self.right_hand.as_ref().map(HandLandmarks::mirrored),
            right_hand: self.left_hand.as_ref().map(HandLandmarks::mirrored),
            left_gesture: self.right_gesture,
            right_gesture: self.left_gesture,
        }
    }
}
