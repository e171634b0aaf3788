//! Outputs handed to the external IK solver.

use nalgebra::{UnitQuaternion, Vector3};

use crate::animator::phase::Mode;
use crate::animator::rig::Side;

/// Position/rotation target for one IK end point.
///
/// A weight of 0 makes the IK solver ignore that channel; 1 gives it full
/// authority.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectorTarget {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub position_weight: f32,
    pub rotation_weight: f32,
}

impl EffectorTarget {
    pub fn new(position: Vector3<f32>, rotation: UnitQuaternion<f32>, weight: f32) -> Self {
        Self {
            position,
            rotation,
            position_weight: weight,
            rotation_weight: weight,
        }
    }
}

/// The four long fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];
}

/// Local rotations of the three bones of a finger, as rig Euler angles in
/// degrees. The bend axis is z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FingerBones {
    pub base: Vector3<f32>,
    pub mid: Vector3<f32>,
    pub tip: Vector3<f32>,
}

impl FingerBones {
    /// Pure bends about z.
    pub fn bent(base: f32, mid: f32, tip: f32) -> Self {
        Self::from_bend_vector(Vector3::new(base, mid, tip))
    }

    /// Bend angles packed as `(base, mid, tip)`, the replicated form.
    pub fn bend_vector(&self) -> Vector3<f32> {
        Vector3::new(self.base.z, self.mid.z, self.tip.z)
    }

    pub fn from_bend_vector(bends: Vector3<f32>) -> Self {
        Self {
            base: Vector3::new(0.0, 0.0, bends.x),
            mid: Vector3::new(0.0, 0.0, bends.y),
            tip: Vector3::new(0.0, 0.0, bends.z),
        }
    }

    pub fn mirrored(&self, side: Side) -> Self {
        Self {
            base: side.mirror_euler(self.base),
            mid: side.mirror_euler(self.mid),
            tip: side.mirror_euler(self.tip),
        }
    }
}

/// Local bone rotations of one hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandRotations {
    pub index: FingerBones,
    pub middle: FingerBones,
    pub ring: FingerBones,
    pub pinky: FingerBones,
    /// Thumb bones from the base outwards.
    pub thumb: [UnitQuaternion<f32>; 3],
}

impl HandRotations {
    pub fn finger(&self, finger: Finger) -> &FingerBones {
        match finger {
            Finger::Index => &self.index,
            Finger::Middle => &self.middle,
            Finger::Ring => &self.ring,
            Finger::Pinky => &self.pinky,
        }
    }

    pub fn finger_mut(&mut self, finger: Finger) -> &mut FingerBones {
        match finger {
            Finger::Index => &mut self.index,
            Finger::Middle => &mut self.middle,
            Finger::Ring => &mut self.ring,
            Finger::Pinky => &mut self.pinky,
        }
    }

    pub fn fingers(&self) -> impl Iterator<Item = &FingerBones> {
        Finger::ALL.into_iter().map(move |f| self.finger(f))
    }
}

impl Default for HandRotations {
    fn default() -> Self {
        Self {
            index: FingerBones::default(),
            middle: FingerBones::default(),
            ring: FingerBones::default(),
            pinky: FingerBones::default(),
            thumb: [UnitQuaternion::identity(); 3],
        }
    }
}

/// Everything one hand produces in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    pub side: Side,
    pub effector: EffectorTarget,
    /// Elbow bend goal, local to the avatar root.
    pub bend_goal: Vector3<f32>,
    pub rotations: HandRotations,
    pub mode: Mode,
}
