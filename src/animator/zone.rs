//! Spatial zones of a hand around the head and the wrist orientation each
//! zone asks for.

use nalgebra::{UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::animator::euler::euler_vec;
use crate::animator::phase::Zone;
use crate::animator::rig::Side;

/// Interval on the mirrored horizontal head offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Zone boundaries, in landmark units, for the left hand.
///
/// Horizontal offsets are multiplied by the side sign before testing, so
/// the same bands serve both hands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneBands {
    /// Open interval
    pub facing_camera: Band,
    /// Closed interval
    pub in_front: Band,
    /// Vertical offset at or below which the hand counts as moving down
    pub moving_down_below: f32,
}

impl ZoneBands {
    /// Bands used by the two-hand animator.
    pub const HANDS: Self = Self {
        facing_camera: Band::new(-0.47, -0.15),
        in_front: Band::new(-0.15, 0.28),
        moving_down_below: -0.3,
    };

    /// Coarser bands used by the single-arm animator.
    pub const ARM: Self = Self {
        facing_camera: Band::new(-0.6, -0.1),
        in_front: Band::new(-0.1, 0.35),
        moving_down_below: -0.4,
    };

    /// Classify a hand from its planar offset to the head and its
    /// horizontal motion since the previous frame.
    pub fn classify(&self, side: Side, head_offset: &Vector2<f32>, horizontal_motion: f32) -> ZoneClass {
        let dx = side.sign() * head_offset.x;

        let zone = if dx > self.facing_camera.min && dx < self.facing_camera.max {
            Some(Zone::FacingCamera)
        } else if dx >= self.in_front.min && dx <= self.in_front.max {
            Some(Zone::InFront)
        } else if side.sign() * horizontal_motion < 0.0 {
            Some(Zone::ToSide)
        } else {
            None
        };

        ZoneClass {
            zone,
            moving_down: head_offset.y <= self.moving_down_below,
        }
    }
}

impl Default for ZoneBands {
    fn default() -> Self {
        Self::HANDS
    }
}

/// Result of [`ZoneBands::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneClass {
    pub zone: Option<Zone>,
    /// Independent of the horizontal zone.
    pub moving_down: bool,
}

/// Orientation offset on top of the ready rotation and the rate at which
/// the wrist turns towards it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneRotation {
    /// Rig Euler angles in degrees, left hand
    pub offset: Vector3<f32>,
    /// Interpolation rate per second
    pub rate: f32,
}

impl ZoneRotation {
    pub fn new(offset: Vector3<f32>, rate: f32) -> Self {
        Self { offset, rate }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneRotations {
    pub facing_camera: ZoneRotation,
    pub in_front: ZoneRotation,
    pub to_side: ZoneRotation,
    pub moving_down: ZoneRotation,
}

impl ZoneRotations {
    pub fn get(&self, zone: Zone) -> &ZoneRotation {
        match zone {
            Zone::FacingCamera => &self.facing_camera,
            Zone::InFront => &self.in_front,
            Zone::ToSide => &self.to_side,
        }
    }
}

impl Default for ZoneRotations {
    fn default() -> Self {
        Self {
            facing_camera: ZoneRotation::new(Vector3::zeros(), 5.0),
            in_front: ZoneRotation::new(Vector3::new(0.0, 55.0, 0.0), 5.0),
            to_side: ZoneRotation::new(Vector3::new(0.0, -50.0, 0.0), 2.5),
            moving_down: ZoneRotation::new(Vector3::new(0.0, 0.0, 60.0), 5.0),
        }
    }
}

/// Smoothed wrist orientation driven by zone changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WristOrientation {
    pub current: UnitQuaternion<f32>,
    pub target: UnitQuaternion<f32>,
    pub zone: Option<Zone>,
    pub moving_down: bool,
}

impl WristOrientation {
    pub fn new(current: UnitQuaternion<f32>, target: UnitQuaternion<f32>) -> Self {
        Self {
            current,
            target,
            zone: None,
            moving_down: false,
        }
    }

    /// Retarget for `class` and turn towards it.
    ///
    /// With no horizontal zone the target is left unchanged and the wrist
    /// does not move for it. The moving-down rotation is applied on top.
    pub fn update(
        &mut self,
        class: ZoneClass,
        ready: &UnitQuaternion<f32>,
        side: Side,
        rotations: &ZoneRotations,
        dt: f32,
        tolerance_deg: f32,
    ) {
        self.zone = class.zone;
        self.moving_down = class.moving_down;

        if let Some(zone) = class.zone {
            self.turn_towards(ready, side, rotations.get(zone), dt, tolerance_deg);
        }
        if class.moving_down {
            self.turn_towards(ready, side, &rotations.moving_down, dt, tolerance_deg);
        }
    }

    fn turn_towards(
        &mut self,
        ready: &UnitQuaternion<f32>,
        side: Side,
        rotation: &ZoneRotation,
        dt: f32,
        tolerance_deg: f32,
    ) {
        self.target = ready * euler_vec(&side.mirror_euler(rotation.offset));
        if let Some(next) = approach(&self.current, &self.target, rotation.rate * dt, tolerance_deg) {
            self.current = next;
        }
    }
}

/// One interpolation step from `current` towards `target`.
///
/// Returns `None` when there is nothing to do: `t` is not positive or the
/// two are already within `tolerance_deg`. This keeps a repeated input from
/// nudging an orientation that has arrived.
pub fn approach(
    current: &UnitQuaternion<f32>,
    target: &UnitQuaternion<f32>,
    t: f32,
    tolerance_deg: f32,
) -> Option<UnitQuaternion<f32>> {
    let t = t.clamp(0.0, 1.0);
    if t.is_nan() || t <= 0.0 || current.angle_to(target) <= tolerance_deg.to_radians() {
        return None;
    }
    Some(current.try_slerp(target, t, 1.0e-6).unwrap_or(*target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::euler::euler_deg;

    #[test]
    fn test_classify_hand_bands() {
        let bands = ZoneBands::HANDS;
        let class = |side, dx: f32, dy: f32, motion| {
            bands.classify(side, &Vector2::new(dx, dy), motion)
        };

        assert_eq!(class(Side::Left, -0.3, 0.0, 0.0).zone, Some(Zone::FacingCamera));
        assert_eq!(class(Side::Right, 0.3, 0.0, 0.0).zone, Some(Zone::FacingCamera));
        assert_eq!(class(Side::Left, -0.15, 0.0, 0.0).zone, Some(Zone::InFront));
        assert_eq!(class(Side::Left, 0.28, 0.0, 0.0).zone, Some(Zone::InFront));
        assert_eq!(class(Side::Left, -0.47, 0.0, 0.0).zone, None);
        assert_eq!(class(Side::Left, -0.6, 0.0, -0.01).zone, Some(Zone::ToSide));
        assert_eq!(class(Side::Right, 0.6, 0.0, 0.01).zone, Some(Zone::ToSide));
        assert_eq!(class(Side::Right, 0.6, 0.0, -0.01).zone, None);
    }

    #[test]
    fn test_moving_down_independent() {
        let bands = ZoneBands::HANDS;
        let class = bands.classify(Side::Left, &Vector2::new(-0.3, -0.3), 0.0);
        assert_eq!(class.zone, Some(Zone::FacingCamera));
        assert!(class.moving_down);
        assert!(!bands.classify(Side::Left, &Vector2::new(-0.3, -0.29), 0.0).moving_down);
    }

    #[test]
    fn test_approach_stops_at_target() {
        let current = UnitQuaternion::identity();
        let target = euler_deg(0.0, 55.0, 0.0);

        let halfway = approach(&current, &target, 0.5, 0.1).unwrap();
        assert!((halfway.angle_to(&target).to_degrees() - 27.5).abs() < 1e-2);

        let arrived = approach(&current, &target, 5.0, 0.1).unwrap();
        assert!(arrived.angle_to(&target).to_degrees() < 0.1);
        assert!(approach(&arrived, &target, 1.0, 0.1).is_none());
        assert!(approach(&current, &target, 0.0, 0.1).is_none());
    }

    #[test]
    fn test_in_front_target_mirrored() {
        let ready = UnitQuaternion::identity();
        let mut wrist = WristOrientation::new(ready, ready);
        let class = ZoneClass {
            zone: Some(Zone::InFront),
            moving_down: false,
        };
        wrist.update(class, &ready, Side::Right, &ZoneRotations::default(), 1.0, 0.1);
        assert!(wrist.target.angle_to(&euler_deg(0.0, -55.0, 0.0)) < 1e-4);
        assert!(wrist.current.angle_to(&wrist.target) < 1e-3);
    }

    #[test]
    fn test_no_zone_keeps_target() {
        let ready = UnitQuaternion::identity();
        let previous = euler_deg(0.0, 55.0, 0.0);
        let mut wrist = WristOrientation::new(ready, previous);
        wrist.update(ZoneClass::default(), &ready, Side::Left, &ZoneRotations::default(), 1.0, 0.1);
        assert_eq!(wrist.target, previous);
        assert_eq!(wrist.current, ready);
    }
}
