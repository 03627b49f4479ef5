//! Rigid-body primitives used to carry sensor poses across the host boundary.
//!
//! Only what marshaling needs lives here: composing two transforms, and
//! converting a [`Transform`] to and from the 4×4 matrix and 7-element pose
//! (`[qw, qx, qy, qz, x, y, z]`) layouts the scripting host works with.
//!
//! # Example
//!
//! ```rust
//! use sensorbridge_types::math::{Quaternion, Transform, Vec3};
//!
//! let t = Transform::new(Quaternion::identity(), Vec3::new(1.0, 2.0, 3.0));
//! let m = t.to_matrix();
//! assert_eq!(m[0][3], 1.0);
//! assert_eq!(m[3], [0.0, 0.0, 0.0, 1.0]);
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::SensorError;

/// Row-major 3×3 matrix.
pub type Matrix3 = [[f64; 3]; 3];

/// Row-major 4×4 homogeneous matrix.
pub type Matrix4 = [[f64; 4]; 4];

/// Pose layout: rotation quaternion followed by translation.
pub type Pose = [f64; 7];

// ────────────────────────────────────────────────────────────────────────────
// Primitive types
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn scale(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1).
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `angle` radians about the unit vector `axis`.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(c, axis.x * s, axis.y * s, axis.z * s)
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }

    /// Equivalent row-major rotation matrix.
    pub fn to_matrix3(self) -> Matrix3 {
        let Self { w, x, y, z } = self;
        [
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
            ],
            [
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
            ],
            [
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ]
    }

    /// Extract the rotation from a row-major rotation matrix.
    pub fn from_matrix3(m: &Matrix3) -> Self {
        let trace = m[0][0] + m[1][1] + m[2][2];
        if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new(
                0.25 * s,
                (m[2][1] - m[1][2]) / s,
                (m[0][2] - m[2][0]) / s,
                (m[1][0] - m[0][1]) / s,
            )
        } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
            let s = (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
            Self::new(
                (m[2][1] - m[1][2]) / s,
                0.25 * s,
                (m[0][1] + m[1][0]) / s,
                (m[0][2] + m[2][0]) / s,
            )
        } else if m[1][1] > m[2][2] {
            let s = (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
            Self::new(
                (m[0][2] - m[2][0]) / s,
                (m[0][1] + m[1][0]) / s,
                0.25 * s,
                (m[1][2] + m[2][1]) / s,
            )
        } else {
            let s = (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
            Self::new(
                (m[1][0] - m[0][1]) / s,
                (m[0][2] + m[2][0]) / s,
                (m[1][2] + m[2][1]) / s,
                0.25 * s,
            )
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transform
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body transform: rotate by `rot`, then translate by `trans`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Transform {
    pub rot: Quaternion,
    pub trans: Vec3,
}

impl Transform {
    pub fn new(rot: Quaternion, trans: Vec3) -> Self {
        Self { rot, trans }
    }

    pub fn identity() -> Self {
        Self::new(Quaternion::identity(), Vec3::zero())
    }

    /// Homogeneous 4×4 matrix form.
    pub fn to_matrix(self) -> Matrix4 {
        let r = self.rot.to_matrix3();
        [
            [r[0][0], r[0][1], r[0][2], self.trans.x],
            [r[1][0], r[1][1], r[1][2], self.trans.y],
            [r[2][0], r[2][1], r[2][2], self.trans.z],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }

    /// Inverse of [`to_matrix`][Self::to_matrix].  The bottom row is ignored.
    pub fn from_matrix(m: &Matrix4) -> Self {
        let r = [
            [m[0][0], m[0][1], m[0][2]],
            [m[1][0], m[1][1], m[1][2]],
            [m[2][0], m[2][1], m[2][2]],
        ];
        Self::new(
            Quaternion::from_matrix3(&r),
            Vec3::new(m[0][3], m[1][3], m[2][3]),
        )
    }

    pub fn to_pose(self) -> Pose {
        let q = self.rot;
        let t = self.trans;
        [q.w, q.x, q.y, q.z, t.x, t.y, t.z]
    }

    pub fn from_pose(p: &Pose) -> Self {
        Self::new(
            Quaternion::new(p[0], p[1], p[2], p[3]),
            Vec3::new(p[4], p[5], p[6]),
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Array shape helpers
// ────────────────────────────────────────────────────────────────────────────

/// Lay a flat 9-element buffer out as a row-major 3×3 matrix.
///
/// # Errors
///
/// Returns [`SensorError::Shape`] if `values` does not hold exactly 9 entries.
pub fn matrix3_from_slice(values: &[f64]) -> Result<Matrix3, SensorError> {
    if values.len() != 9 {
        return Err(SensorError::Shape {
            expected: 9,
            actual: values.len(),
        });
    }
    let mut m = [[0.0; 3]; 3];
    for (i, v) in values.iter().enumerate() {
        m[i / 3][i % 3] = *v;
    }
    Ok(m)
}

/// Flatten a 3×3 matrix back to 9 row-major values.
pub fn matrix3_to_vec(m: &Matrix3) -> Vec<f64> {
    m.iter().flatten().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn quaternion_90deg_yaw_rotates_x_to_y() {
        let q = Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), FRAC_PI_2);
        // Column 0 of the rotation matrix is the image of the x axis.
        let m = q.to_matrix3();
        assert_close(m[0][0], 0.0);
        assert_close(m[1][0], 1.0);
        assert_close(m[2][0], 0.0);
    }

    #[test]
    fn identity_transform_matrix_is_identity() {
        let m = Transform::identity().to_matrix();
        for (i, row) in m.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                assert_close(*v, if i == j { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn matrix_form_recovers_rotation_and_translation() {
        for angle in [0.3, FRAC_PI_2, 2.5, -3.0] {
            let axis = Vec3::new(1.0, 2.0, 2.0).scale(1.0 / 3.0);
            let t = Transform::new(
                Quaternion::from_axis_angle(axis, angle),
                Vec3::new(0.5, -1.0, 2.0),
            );
            let back = Transform::from_matrix(&t.to_matrix());
            // q and -q encode the same rotation.
            let sign = if back.rot.w * t.rot.w < 0.0 { -1.0 } else { 1.0 };
            assert_close(back.rot.w * sign, t.rot.w);
            assert_close(back.rot.x * sign, t.rot.x);
            assert_close(back.rot.y * sign, t.rot.y);
            assert_close(back.rot.z * sign, t.rot.z);
            assert_eq!(back.trans, t.trans);
        }
    }

    #[test]
    fn pose_layout_is_rotation_then_translation() {
        let t = Transform::new(Quaternion::new(0.0, 1.0, 0.0, 0.0), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(t.to_pose(), [0.0, 1.0, 0.0, 0.0, 4.0, 5.0, 6.0]);
        assert_eq!(Transform::from_pose(&t.to_pose()), t);
    }

    #[test]
    fn matrix3_from_slice_is_row_major() {
        let m = matrix3_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]).unwrap();
        assert_eq!(m[0], [1.0, 2.0, 3.0]);
        assert_eq!(m[1][2], 6.0);
        assert_eq!(m[2][0], 7.0);
        assert_eq!(matrix3_to_vec(&m).len(), 9);
    }

    #[test]
    fn matrix3_from_slice_rejects_wrong_length() {
        assert_eq!(
            matrix3_from_slice(&[0.0; 6]),
            Err(SensorError::Shape {
                expected: 9,
                actual: 6
            })
        );
    }
}
