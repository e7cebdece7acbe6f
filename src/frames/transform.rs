/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! `pxform`/`sxform`: rotation (and state-rotation) between the frames in
//! the registry. Every supported frame rotates about its own z-axis at a
//! constant rate relative to J2000, so the transform between any two frames
//! reduces to a single `Rz` rotation by the accumulated relative angle.

use crate::frames::Frame;
use crate::math::rotation::rotate;
use crate::math::{canonicalize_mat3, canonicalize_mat6, Matrix3, Matrix6};
use crate::time::EphemerisTime;

/// Rotation matrix taking vectors expressed in `from` into `to`, at `et`.
///
/// `rotate(angle, 3)` builds CSPICE's `Rz(angle)` frame-rotation; the
/// relative angle between two frames rotating at constant rates about z is
/// `(ω_from − ω_to) · et`.
pub fn pxform(from: Frame, to: Frame, et: EphemerisTime) -> Matrix3 {
    let theta = (from.rate_rad_s - to.rate_rad_s) * et.as_seconds();
    canonicalize_mat3(rotate(theta, 3))
}

/// Derivative of `Rz(theta)` with respect to `theta`, scaled by the angle's
/// own time derivative `omega`: `d/dt Rz(omega * t) = omega * Rz'(theta)`.
fn drz_dt(theta: f64, omega: f64) -> Matrix3 {
    let (s, c) = theta.sin_cos();
    let rz_prime = Matrix3::new(-s, c, 0.0, -c, -s, 0.0, 0.0, 0.0, 0.0);
    omega * rz_prime
}

/// State-rotation matrix: the 6×6 block `[[R, 0], [dR, R]]`, so that applying
/// it to `[pos; vel]` yields `[R·pos; dR·pos + R·vel]`.
pub fn sxform(from: Frame, to: Frame, et: EphemerisTime) -> Matrix6 {
    let omega = from.rate_rad_s - to.rate_rad_s;
    let theta = omega * et.as_seconds();
    let r = rotate(theta, 3);
    let dr = drz_dt(theta, omega);

    let mut m = Matrix6::zeros();
    for i in 0..3 {
        for j in 0..3 {
            m[(i, j)] = r[(i, j)];
            m[(i + 3, j)] = dr[(i, j)];
            m[(i + 3, j + 3)] = r[(i, j)];
        }
    }
    canonicalize_mat6(m)
}

#[cfg(test)]
mod ut_transform {
    use super::*;
    use crate::frames::{IAU_EARTH, IAU_MOON, J2000};
    use crate::math::Vector6;

    #[test]
    fn identity_for_same_frame() {
        let et = EphemerisTime::from_seconds(12345.678);
        assert_eq!(pxform(J2000, J2000, et), Matrix3::identity());
        assert_eq!(pxform(IAU_EARTH, IAU_EARTH, et), Matrix3::identity());
        assert_eq!(sxform(IAU_MOON, IAU_MOON, et), Matrix6::identity());
    }

    #[test]
    fn composition_matches_direct_transform() {
        let et = EphemerisTime::from_seconds(86_400.0);
        let a_to_c = pxform(IAU_EARTH, IAU_MOON, et);
        let a_to_b = pxform(IAU_EARTH, J2000, et);
        let b_to_c = pxform(J2000, IAU_MOON, et);
        assert!((a_to_c - b_to_c * a_to_b).norm() < 1e-12);
    }

    #[test]
    fn inverse_round_trips() {
        let et = EphemerisTime::from_seconds(4_000.0);
        let fwd = pxform(IAU_EARTH, IAU_MOON, et);
        let bwd = pxform(IAU_MOON, IAU_EARTH, et);
        assert!((fwd * bwd - Matrix3::identity()).norm() < 1e-12);
    }

    #[test]
    fn sxform_matches_pxform_on_position_block() {
        let et = EphemerisTime::from_seconds(500.0);
        let s = sxform(IAU_EARTH, IAU_MOON, et);
        let r = pxform(IAU_EARTH, IAU_MOON, et);

        let state = Vector6::new(1.0, 2.0, 3.0, 0.1, -0.2, 0.05);
        let rotated = s * state;
        let pos_only = r * state.fixed_rows::<3>(0).into_owned();
        assert!((rotated.fixed_rows::<3>(0).into_owned() - pos_only).norm() < 1e-9);
    }
}
