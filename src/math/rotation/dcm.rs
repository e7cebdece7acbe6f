/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::math::{canonicalize_mat3, Matrix3, Vector3};

/// Reduces an axis index the way CSPICE's `rotate_c`/`axisar_c` do: any
/// integer maps onto `{1, 2, 3}` (X, Y, Z), with `0` (and any multiple of 3)
/// mapping to `3`.
pub fn reduce_axis(iaxis: i32) -> i32 {
    let m = iaxis.rem_euclid(3);
    if m == 0 {
        3
    } else {
        m
    }
}

/// Rotation about the X axis (CSPICE `rotate_c(angle, 1)` / Basilisk `euler1`).
fn r1(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Rotation about the Y axis (CSPICE `rotate_c(angle, 2)` / Basilisk `euler2`).
fn r2(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Rotation about the Z axis (CSPICE `rotate_c(angle, 3)` / Basilisk `euler3`).
fn r3(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Returns the rotation matrix for a rotation of `angle_rad` about axis
/// `iaxis` (1=X, 2=Y, 3=Z; any other integer is reduced per [`reduce_axis`]).
pub fn rotate(angle_rad: f64, iaxis: i32) -> Matrix3 {
    let m = match reduce_axis(iaxis) {
        1 => r1(angle_rad),
        2 => r2(angle_rad),
        _ => r3(angle_rad),
    };
    canonicalize_mat3(m)
}

/// Rodrigues' rotation formula: builds the rotation matrix for `angle_rad`
/// about an arbitrary `axis`. Returns the identity when `axis` is the zero
/// vector, matching CSPICE's `axisar_c` degenerate-axis behavior.
pub fn axisar(axis: Vector3, angle_rad: f64) -> Matrix3 {
    let norm = axis.norm();
    if norm < f64::EPSILON {
        return Matrix3::identity();
    }
    let u = axis / norm;
    let (s, c) = angle_rad.sin_cos();
    let one_m_c = 1.0 - c;

    let cross = Matrix3::new(0.0, -u.z, u.y, u.z, 0.0, -u.x, -u.y, u.x, 0.0);
    let outer = u * u.transpose();

    let m = Matrix3::identity() * c + cross * s + outer * one_m_c;
    canonicalize_mat3(m)
}

#[cfg(test)]
mod ut_dcm {
    use super::*;
    use crate::math::Matrix3;
    use core::f64::consts::FRAC_PI_2;
    use core::f64::EPSILON;

    #[test]
    fn test_r1() {
        let r1 = rotate(FRAC_PI_2, 1);

        assert_eq!(r1 * Vector3::x(), Vector3::x());
        assert!((r1 * Vector3::z() - Vector3::y()).norm() < EPSILON);
        assert!((r1 * Vector3::y() + Vector3::z()).norm() < EPSILON);

        assert!(
            (r1 - Matrix3::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0)).norm() < EPSILON
        );
    }

    #[test]
    fn test_r2() {
        let r2 = rotate(FRAC_PI_2, 2);

        assert_eq!(r2 * Vector3::y(), Vector3::y());
        assert!((r2 * Vector3::x() - Vector3::z()).norm() < EPSILON);
        assert!((r2 * Vector3::z() + Vector3::x()).norm() < EPSILON);

        let r2_zero = rotate(0.0, 2);
        assert!((r2_zero * Vector3::x() - Vector3::x()).norm() < EPSILON);
    }

    #[test]
    fn test_r3() {
        let r3 = rotate(FRAC_PI_2, 3);

        assert_eq!(r3 * Vector3::z(), Vector3::z());
        assert!((r3 * Vector3::x() + Vector3::y()).norm() < EPSILON);
        assert!((r3 * Vector3::y() - Vector3::x()).norm() < EPSILON);
    }

    #[test]
    fn axis_zero_is_identity() {
        let m = axisar(Vector3::zeros(), 1.23);
        assert_eq!(m, Matrix3::identity());
    }

    #[test]
    fn axis_rotation_is_inverse_of_rotate_for_principal_axes() {
        // `axisar` follows the active-rotation convention while `rotate`
        // follows CSPICE's frame-rotation convention, so they agree up to
        // a sign on the angle.
        let m = axisar(Vector3::z(), FRAC_PI_2);
        assert!((m - rotate(-FRAC_PI_2, 3)).norm() < 1e-10);
    }

    #[test]
    fn iaxis_zero_reduces_to_three() {
        assert_eq!(reduce_axis(0), 3);
        assert_eq!(reduce_axis(3), 3);
        assert_eq!(reduce_axis(4), 1);
    }
}
