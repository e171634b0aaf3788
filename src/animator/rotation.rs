//! Joint rotation solver.
//!
//! Landmarks arrive with unreliable depth, so every solver here works from
//! the planar (x, y) offset between two points and a baseline offset
//! captured at calibration. The baseline length is taken as the true bone
//! length; the missing depth is whatever makes the live offset that long.

use nalgebra::{Vector2, Vector3};

use crate::animator::effector::HandRotations;
use crate::animator::landmark::Landmark;

/// Upper bound on any reconstructed flexion angle, in degrees.
pub const MAX_FLEXION_DEG: f32 = 130.0;
/// Mid-bone angles above this magnitude get a clamped fingertip.
pub const FINGERTIP_CLAMP_ABOVE_DEG: f32 = 60.0;
/// Fingertip bound applied past [`FINGERTIP_CLAMP_ABOVE_DEG`].
pub const FINGERTIP_MAX_DEG: f32 = 20.0;

/// Recover the out-of-plane component of a bone from its rest length.
///
/// Returns `None` when the planar offset is already longer than the
/// baseline (the bone would have to stretch). NaN inputs propagate as
/// `Some(NaN)`.
pub fn reconstruct_depth(delta: &Vector2<f32>, baseline: &Vector3<f32>) -> Option<f32> {
    let disc = baseline.norm_squared() - delta.norm_squared();
    if disc < 0.0 {
        None
    } else {
        Some(disc.sqrt())
    }
}

/// Unsigned angle between two 2D vectors in degrees, 0 if either is zero.
fn unsigned_angle_deg(a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
    let norms = a.norm() * b.norm();
    if norms == 0.0 {
        return 0.0;
    }
    (a.dot(b) / norms).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Flexion of the bone `parent -> child` relative to its baseline, in
/// degrees within `[0, MAX_FLEXION_DEG]`.
///
/// The angle is measured in the (y, depth) plane. A planar offset longer
/// than the baseline reads as full flexion.
pub fn flexion_angle(child: &Landmark, parent: &Landmark, baseline: &Vector3<f32>) -> f32 {
    let delta = child.planar_delta(parent);
    let Some(depth) = reconstruct_depth(&delta, baseline) else {
        return MAX_FLEXION_DEG;
    };

    let rest = Vector2::new(baseline.y, baseline.z);
    let live = Vector2::new(delta.y, depth);
    let angle = unsigned_angle_deg(&rest, &live);
    // comparison keeps NaN intact
    if angle > MAX_FLEXION_DEG {
        MAX_FLEXION_DEG
    } else {
        angle
    }
}

/// Write a (signed) flexion angle into the middle and tip bones of a finger.
///
/// The mid bone takes the whole angle, the tip half of it. Past
/// [`FINGERTIP_CLAMP_ABOVE_DEG`] the tip is held within
/// `±FINGERTIP_MAX_DEG`. A NaN angle straightens both bones. Only z is
/// written.
pub fn set_fingertip_rotation(angle: f32, mid: &mut Vector3<f32>, tip: &mut Vector3<f32>) {
    if angle.is_nan() {
        mid.z = 0.0;
        tip.z = 0.0;
        return;
    }

    mid.z = angle;
    let half = angle / 2.0;
    tip.z = if angle.abs() > FINGERTIP_CLAMP_ABOVE_DEG {
        half.clamp(-FINGERTIP_MAX_DEG, FINGERTIP_MAX_DEG)
    } else {
        half
    };
}

/// Write a (signed) flexion angle into the base bone of a finger.
pub fn set_base_rotation(angle: f32, base: &mut Vector3<f32>) {
    base.z = if angle.is_nan() { 0.0 } else { angle };
}

/// Signed in-plane rotation of `parent -> child` away from its baseline,
/// in degrees. Counter-clockwise is positive; 0 for degenerate or
/// non-finite input.
pub fn planar_rotation(child: &Landmark, parent: &Landmark, baseline: &Vector3<f32>) -> f32 {
    let rest = Vector2::new(baseline.x, baseline.y);
    let live = child.planar_delta(parent);
    if rest.norm_squared() == 0.0 || live.norm_squared() == 0.0 {
        return 0.0;
    }
    let angle = rest.perp(&live).atan2(rest.dot(&live)).to_degrees();
    if angle.is_finite() { angle } else { 0.0 }
}

/// Yaw of the palm about the vertical axis, from the wrist to index base
/// vector, in degrees. Falls back to 0 when depth cannot be reconstructed.
pub fn palm_yaw(index_base: &Landmark, wrist: &Landmark, baseline: &Vector3<f32>) -> f32 {
    let delta = index_base.planar_delta(wrist);
    let Some(depth) = reconstruct_depth(&delta, baseline) else {
        return 0.0;
    };
    let rest = Vector2::new(baseline.x, baseline.z);
    let live = Vector2::new(delta.x, depth);
    let angle = unsigned_angle_deg(&rest, &live);
    if angle.is_nan() { 0.0 } else { angle }
}

/// Bend of the forearm (elbow to wrist) relative to its baseline, in
/// degrees. `None` when depth cannot be reconstructed.
pub fn elbow_bend(wrist: &Landmark, elbow: &Landmark, baseline: &Vector3<f32>) -> Option<f32> {
    let delta = wrist.planar_delta(elbow);
    let depth = reconstruct_depth(&delta, baseline)?;
    let rest = Vector2::new(baseline.y, baseline.z);
    let live = Vector2::new(delta.y, depth);
    Some(unsigned_angle_deg(&rest, &live)).filter(|a| a.is_finite())
}

/// Whether any finger is bent past `threshold_deg` at its middle joint.
pub fn fingers_bent(rotations: &HandRotations, threshold_deg: f32) -> bool {
    rotations.fingers().any(|f| f.mid.z.abs() > threshold_deg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::effector::FingerBones;
    use approx::assert_abs_diff_eq;

    fn base() -> Landmark {
        Landmark::at(0.0, 0.0, 0.0)
    }

    #[test]
    fn test_flexion_zero_at_baseline() {
        let baseline = Vector3::new(0.0, 0.04, 0.0);
        let child = Landmark::at(0.0, 0.04, 0.0);
        assert_abs_diff_eq!(flexion_angle(&child, &base(), &baseline), 0.0, epsilon = 0.1);
    }

    #[test]
    fn test_flexion_from_foreshortening() {
        // half the rest length visible: the bone points 60° out of plane
        let baseline = Vector3::new(0.0, 0.04, 0.0);
        let child = Landmark::at(0.0, 0.02, 0.0);
        assert_abs_diff_eq!(flexion_angle(&child, &base(), &baseline), 60.0, epsilon = 1e-2);
    }

    #[test]
    fn test_flexion_stretched_bone_is_max() {
        let baseline = Vector3::new(0.0, 0.04, 0.0);
        let child = Landmark::at(0.03, 0.04, 0.0);
        assert_eq!(flexion_angle(&child, &base(), &baseline), MAX_FLEXION_DEG);
    }

    #[test]
    fn test_flexion_never_exceeds_max() {
        let baseline = Vector3::new(0.0, 0.04, 0.0);
        for i in -20..=20 {
            let child = Landmark::at(0.001 * i as f32, -0.002 * i as f32, 0.0);
            let angle = flexion_angle(&child, &base(), &baseline);
            assert!(angle <= MAX_FLEXION_DEG, "{angle}");
        }
    }

    #[test]
    fn test_flexion_nan_propagates() {
        let baseline = Vector3::new(0.0, 0.04, 0.0);
        let child = Landmark::at(f32::NAN, 0.02, 0.0);
        assert!(flexion_angle(&child, &base(), &baseline).is_nan());
    }

    #[test]
    fn test_zero_baseline_is_rest() {
        let child = Landmark::at(0.0, 0.0, 0.0);
        assert_eq!(flexion_angle(&child, &base(), &Vector3::zeros()), 0.0);
    }

    #[test]
    fn test_fingertip_assignment() {
        let mut bones = FingerBones {
            mid: Vector3::new(3.0, 4.0, 0.0),
            ..Default::default()
        };

        set_fingertip_rotation(40.0, &mut bones.mid, &mut bones.tip);
        assert_eq!(bones.mid, Vector3::new(3.0, 4.0, 40.0));
        assert_eq!(bones.tip.z, 20.0);

        set_fingertip_rotation(100.0, &mut bones.mid, &mut bones.tip);
        assert_eq!(bones.mid.z, 100.0);
        assert_eq!(bones.tip.z, 20.0);

        set_fingertip_rotation(-100.0, &mut bones.mid, &mut bones.tip);
        assert_eq!(bones.tip.z, -20.0);

        set_fingertip_rotation(f32::NAN, &mut bones.mid, &mut bones.tip);
        assert_eq!(bones.mid, Vector3::new(3.0, 4.0, 0.0));
        assert_eq!(bones.tip.z, 0.0);
    }

    #[test]
    fn test_fingertip_bounded_past_threshold() {
        for angle in [61.0_f32, 75.0, 90.0, 130.0, -61.0, -130.0] {
            let (mut mid, mut tip) = (Vector3::zeros(), Vector3::zeros());
            set_fingertip_rotation(angle, &mut mid, &mut tip);
            assert!(tip.z.abs() <= FINGERTIP_MAX_DEG);
        }
    }

    #[test]
    fn test_base_assignment() {
        let mut b = Vector3::new(1.0, 2.0, 3.0);
        set_base_rotation(45.0, &mut b);
        assert_eq!(b, Vector3::new(1.0, 2.0, 45.0));
        set_base_rotation(f32::NAN, &mut b);
        assert_eq!(b.z, 0.0);
    }

    #[test]
    fn test_planar_rotation_signed() {
        let baseline = Vector3::new(0.0, 0.1, 0.0);
        let left = Landmark::at(-0.1, 0.0, 0.0);
        let right = Landmark::at(0.1, 0.0, 0.0);
        assert_abs_diff_eq!(planar_rotation(&left, &base(), &baseline), 90.0, epsilon = 1e-3);
        assert_abs_diff_eq!(planar_rotation(&right, &base(), &baseline), -90.0, epsilon = 1e-3);
        assert_eq!(planar_rotation(&base(), &base(), &baseline), 0.0);
    }

    #[test]
    fn test_planar_rotation_nan_is_zero() {
        let baseline = Vector3::new(0.0, 0.1, 0.0);
        let broken = Landmark::at(f32::NAN, 0.05, 0.0);
        assert_eq!(planar_rotation(&broken, &base(), &baseline), 0.0);
        assert_eq!(planar_rotation(&base(), &broken, &baseline), 0.0);
        let nan_baseline = Vector3::new(f32::NAN, 0.1, 0.0);
        assert_eq!(planar_rotation(&Landmark::at(0.1, 0.0, 0.0), &base(), &nan_baseline), 0.0);
    }

    #[test]
    fn test_palm_yaw_fallback() {
        let baseline = Vector3::new(0.05, 0.05, 0.0);
        let far = Landmark::at(0.2, 0.2, 0.0);
        assert_eq!(palm_yaw(&far, &base(), &baseline), 0.0);

        let turned = Landmark::at(0.0, 0.05, 0.0);
        assert_abs_diff_eq!(palm_yaw(&turned, &base(), &baseline), 90.0, epsilon = 1e-2);
    }

    #[test]
    fn test_elbow_bend() {
        let baseline = Vector3::new(0.0, -0.2, 0.0);
        let elbow = Landmark::at(0.0, 0.0, 0.0);
        let straight = Landmark::at(0.0, -0.2, 0.0);
        let folded = Landmark::at(0.0, -0.1, 0.0);
        assert_abs_diff_eq!(elbow_bend(&straight, &elbow, &baseline).unwrap(), 0.0, epsilon = 0.1);
        assert_abs_diff_eq!(elbow_bend(&folded, &elbow, &baseline).unwrap(), 60.0, epsilon = 1e-2);
        assert!(elbow_bend(&Landmark::at(0.0, -0.3, 0.0), &elbow, &baseline).is_none());
    }

    #[test]
    fn test_fingers_bent() {
        let mut rotations = HandRotations::default();
        assert!(!fingers_bent(&rotations, 50.0));
        rotations.ring = FingerBones::bent(0.0, -70.0, -20.0);
        assert!(fingers_bent(&rotations, 50.0));
    }
}
