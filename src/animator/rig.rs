//! Humanoid rig lookup and the rest pose captured from it.

use std::collections::HashMap;

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::animator::effector::{FingerBones, HandRotations};
use crate::animator::euler::to_euler_deg;
use crate::error::SetupError;

const SPINE_PATH: &str =
    "CC_Base_BoneRoot/CC_Base_Hip/CC_Base_Waist/CC_Base_Spine01/CC_Base_Spine02";

/// Which side of the body a limb belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// +1 for the left side, -1 for the right side.
    ///
    /// Left-hand constants are canonical; right-hand values are derived
    /// by multiplying with this sign.
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }

    /// Mirror canonical (left-hand) Euler angles onto this side: `(x, -y, -z)`.
    #[inline]
    pub fn mirror_euler(&self, angles: Vector3<f32>) -> Vector3<f32> {
        match self {
            Self::Left => angles,
            Self::Right => Vector3::new(angles.x, -angles.y, -angles.z),
        }
    }

    /// Mirror a canonical (left-hand) position onto this side: `(-x, y, z)`.
    #[inline]
    pub fn mirror_position(&self, position: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(self.sign() * position.x, position.y, position.z)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    fn bone_prefix(&self) -> &'static str {
        match self {
            Self::Left => "CC_Base_L_",
            Self::Right => "CC_Base_R_",
        }
    }
}

/// Bones of one hand that the animator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandBone {
    Hand,
    Index1,
    Index2,
    Index3,
    Middle1,
    Middle2,
    Middle3,
    Ring1,
    Ring2,
    Ring3,
    Pinky1,
    Pinky2,
    Pinky3,
    Thumb1,
    Thumb2,
    Thumb3,
}

impl HandBone {
    pub const ALL: [HandBone; 16] = [
        Self::Hand,
        Self::Index1,
        Self::Index2,
        Self::Index3,
        Self::Middle1,
        Self::Middle2,
        Self::Middle3,
        Self::Ring1,
        Self::Ring2,
        Self::Ring3,
        Self::Pinky1,
        Self::Pinky2,
        Self::Pinky3,
        Self::Thumb1,
        Self::Thumb2,
        Self::Thumb3,
    ];

    /// Bone chain below the hand, e.g. `["Index1", "Index2"]` for `Index2`.
    fn chain(&self) -> &'static [&'static str] {
        match self {
            Self::Hand => &[],
            Self::Index1 => &["Index1"],
            Self::Index2 => &["Index1", "Index2"],
            Self::Index3 => &["Index1", "Index2", "Index3"],
            Self::Middle1 => &["Mid1"],
            Self::Middle2 => &["Mid1", "Mid2"],
            Self::Middle3 => &["Mid1", "Mid2", "Mid3"],
            Self::Ring1 => &["Ring1"],
            Self::Ring2 => &["Ring1", "Ring2"],
            Self::Ring3 => &["Ring1", "Ring2", "Ring3"],
            Self::Pinky1 => &["Pinky1"],
            Self::Pinky2 => &["Pinky1", "Pinky2"],
            Self::Pinky3 => &["Pinky1", "Pinky2", "Pinky3"],
            Self::Thumb1 => &["Thumb1"],
            Self::Thumb2 => &["Thumb1", "Thumb2"],
            Self::Thumb3 => &["Thumb1", "Thumb2", "Thumb3"],
        }
    }
}

/// A rig bone the animators need at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RigBone {
    Head,
    Hand(Side, HandBone),
}

impl RigBone {
    /// Full hierarchy path below the avatar root.
    pub fn path(&self) -> String {
        match self {
            Self::Head => format!("{SPINE_PATH}/CC_Base_NeckTwist01/CC_Base_NeckTwist02/CC_Base_Head"),
            Self::Hand(side, bone) => {
                let p = side.bone_prefix();
                let mut path = format!(
                    "{SPINE_PATH}/{p}Clavicle/{p}Upperarm/{p}Forearm/{p}Hand"
                );
                for segment in bone.chain() {
                    path.push('/');
                    path.push_str(p);
                    path.push_str(segment);
                }
                path
            }
        }
    }
}

/// Rest transform of a bone, expressed in avatar space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub local_rotation: UnitQuaternion<f32>,
}

impl BoneTransform {
    pub fn new(
        position: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
        local_rotation: UnitQuaternion<f32>,
    ) -> Self {
        Self {
            position,
            rotation,
            local_rotation,
        }
    }

    pub fn at(position: Vector3<f32>) -> Self {
        Self::new(position, UnitQuaternion::identity(), UnitQuaternion::identity())
    }
}

/// Read access to the avatar's bone hierarchy.
pub trait Rig {
    /// Look up a bone by its hierarchy path.
    fn find(&self, path: &str) -> Option<BoneTransform>;

    /// Look up a required bone.
    fn bone(&self, bone: RigBone) -> Result<BoneTransform, SetupError> {
        let path = bone.path();
        self.find(&path)
            .ok_or(SetupError::BoneNotFound { bone, path })
    }
}

/// Rig backed by a path-keyed map.
#[derive(Debug, Clone, Default)]
pub struct RigPose {
    bones: HashMap<String, BoneTransform>,
}

impl RigPose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bone: RigBone, transform: BoneTransform) -> &mut Self {
        self.bones.insert(bone.path(), transform);
        self
    }

    pub fn insert_path(&mut self, path: impl Into<String>, transform: BoneTransform) -> &mut Self {
        self.bones.insert(path.into(), transform);
        self
    }

    pub fn remove(&mut self, bone: RigBone) -> Option<BoneTransform> {
        self.bones.remove(&bone.path())
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Reference humanoid standing in a T-pose, head at 1.6 m.
    ///
    /// Hands sit 0.75 m to either side with identity rotations; finger
    /// bones are laid out along the arm.
    pub fn reference() -> Self {
        let mut rig = Self::new();
        rig.insert(RigBone::Head, BoneTransform::at(Vector3::new(0.0, 1.6, 0.0)));

        for side in Side::BOTH {
            let hand = side.mirror_position(Vector3::new(-0.75, 1.42, 0.0));
            for (i, bone) in HandBone::ALL.iter().enumerate() {
                let reach = if i == 0 { 0.0 } else { 0.03 * ((i - 1) % 3 + 1) as f32 + 0.06 };
                let position = hand + side.mirror_position(Vector3::new(-reach, 0.0, 0.0));
                rig.insert(RigBone::Hand(side, *bone), BoneTransform::at(position));
            }
        }
        rig
    }
}

impl Rig for RigPose {
    fn find(&self, path: &str) -> Option<BoneTransform> {
        self.bones.get(path).copied()
    }
}

/// Rest pose of one hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandRest {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    /// Local bone rotations of fingers and thumb.
    pub rotations: HandRotations,
}

impl HandRest {
    pub fn capture(rig: &impl Rig, side: Side) -> Result<Self, SetupError> {
        let hand = rig.bone(RigBone::Hand(side, HandBone::Hand))?;
        let local = |bone: HandBone| -> Result<UnitQuaternion<f32>, SetupError> {
            Ok(rig.bone(RigBone::Hand(side, bone))?.local_rotation)
        };
        let finger = |base, mid, tip| -> Result<FingerBones, SetupError> {
            Ok(FingerBones {
                base: to_euler_deg(&local(base)?),
                mid: to_euler_deg(&local(mid)?),
                tip: to_euler_deg(&local(tip)?),
            })
        };

        let rotations = HandRotations {
            index: finger(HandBone::Index1, HandBone::Index2, HandBone::Index3)?,
            middle: finger(HandBone::Middle1, HandBone::Middle2, HandBone::Middle3)?,
            ring: finger(HandBone::Ring1, HandBone::Ring2, HandBone::Ring3)?,
            pinky: finger(HandBone::Pinky1, HandBone::Pinky2, HandBone::Pinky3)?,
            thumb: [
                local(HandBone::Thumb1)?,
                local(HandBone::Thumb2)?,
                local(HandBone::Thumb3)?,
            ],
        };

        Ok(Self {
            position: hand.position,
            rotation: hand.rotation,
            rotations,
        })
    }
}

/// Everything the hand animators read from the rig, resolved once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestPose {
    pub head: Vector3<f32>,
    pub left: HandRest,
    pub right: HandRest,
}

impl RestPose {
    /// Resolve every required bone; the first missing one is reported.
    pub fn capture(rig: &impl Rig) -> Result<Self, SetupError> {
        Ok(Self {
            head: rig.bone(RigBone::Head)?.position,
            left: HandRest::capture(rig, Side::Left)?,
            right: HandRest::capture(rig, Side::Right)?,
        })
    }

    pub fn hand(&self, side: Side) -> &HandRest {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bone_paths() {
        assert_eq!(
            RigBone::Head.path(),
            "CC_Base_BoneRoot/CC_Base_Hip/CC_Base_Waist/CC_Base_Spine01/CC_Base_Spine02/CC_Base_NeckTwist01/CC_Base_NeckTwist02/CC_Base_Head"
        );
        assert!(
            RigBone::Hand(Side::Right, HandBone::Middle2)
                .path()
                .ends_with("CC_Base_R_Forearm/CC_Base_R_Hand/CC_Base_R_Mid1/CC_Base_R_Mid2")
        );
        assert!(
            RigBone::Hand(Side::Left, HandBone::Hand)
                .path()
                .ends_with("CC_Base_L_Upperarm/CC_Base_L_Forearm/CC_Base_L_Hand")
        );
    }

    #[test]
    fn test_reference_rig_is_complete() {
        let rig = RigPose::reference();
        assert_eq!(rig.len(), 1 + 2 * HandBone::ALL.len());
        let rest = RestPose::capture(&rig).unwrap();
        assert!(rest.left.position.x < 0.0);
        assert!(rest.right.position.x > 0.0);
        assert_eq!(rest.head.y, 1.6);
    }

    #[test]
    fn test_missing_bone_reported() {
        let mut rig = RigPose::reference();
        let bone = RigBone::Hand(Side::Right, HandBone::Thumb2);
        rig.remove(bone);

        let err = RestPose::capture(&rig).unwrap_err();
        assert_eq!(
            err,
            SetupError::BoneNotFound {
                bone,
                path: bone.path()
            }
        );
    }

    #[test]
    fn test_find_by_path() {
        let mut rig = RigPose::new();
        let path = RigBone::Head.path();
        rig.insert_path(path.clone(), BoneTransform::at(Vector3::new(0.0, 1.7, 0.1)));

        assert_eq!(rig.bone(RigBone::Head).unwrap().position.y, 1.7);
        assert!(rig.find("CC_Base_BoneRoot").is_none());
    }

    #[test]
    fn test_mirror_euler() {
        let v = Vector3::new(5.0, 10.0, 85.0);
        assert_eq!(Side::Left.mirror_euler(v), v);
        assert_eq!(Side::Right.mirror_euler(v), Vector3::new(5.0, -10.0, -85.0));
    }
}
