//! Euler-angle convention of the humanoid rig.
//!
//! Angles are in degrees and applied about z, then x, then y
//! (`R = Ry * Rx * Rz`), which is how the rig's bone local rotations are
//! authored.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// Build a rotation from rig Euler angles in degrees.
pub fn euler_deg(x: f32, y: f32, z: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y.to_radians())
        * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x.to_radians())
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z.to_radians())
}

/// Same as [`euler_deg`] taking the angles packed in a vector.
#[inline]
pub fn euler_vec(angles: &Vector3<f32>) -> UnitQuaternion<f32> {
    euler_deg(angles.x, angles.y, angles.z)
}

/// Decompose a rotation into rig Euler angles in degrees.
///
/// Near the x = ±90° singularity z is reported as 0 and the whole
/// remaining rotation is attributed to y.
pub fn to_euler_deg(rotation: &UnitQuaternion<f32>) -> Vector3<f32> {
    let m: Matrix3<f32> = rotation.to_rotation_matrix().into_inner();
    let sin_x = (-m[(1, 2)]).clamp(-1.0, 1.0);
    let x = sin_x.asin();

    if sin_x.abs() < 0.9999 {
        let y = m[(0, 2)].atan2(m[(2, 2)]);
        let z = m[(1, 0)].atan2(m[(1, 1)]);
        Vector3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    } else {
        let y = (-m[(2, 0)]).atan2(m[(0, 0)]);
        Vector3::new(x.to_degrees(), y.to_degrees(), 0.0)
    }
}
