/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Vector3 is nalgebra's Vector3 with a 64-bit floating point representation.
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Vector6 = nalgebra::Vector6<f64>;
pub type Matrix3 = nalgebra::Matrix3<f64>;
pub type Matrix6 = nalgebra::Matrix6<f64>;

pub mod angles;
pub mod geodetic;
pub mod rotation;

/// Returns the projection of a onto b
pub fn projv(a: &Vector3, b: &Vector3) -> Vector3 {
    b * a.dot(b) / b.dot(b)
}

/// Returns the components of vector a orthogonal to b
pub fn perpv(a: &Vector3, b: &Vector3) -> Vector3 {
    let big_a = a[0].abs().max(a[1].abs().max(a[2].abs()));
    let big_b = b[0].abs().max(b[1].abs().max(b[2].abs()));
    if big_a < f64::EPSILON {
        Vector3::zeros()
    } else if big_b < f64::EPSILON {
        *a
    } else {
        let a_scl = a / big_a;
        let b_scl = b / big_b;
        let v = projv(&a_scl, &b_scl);
        big_a * (a_scl - v)
    }
}

/// Cross product, exposed as a free function to mirror CSPICE's `vcrss_c`.
pub fn vcrss(a: &Vector3, b: &Vector3) -> Vector3 {
    a.cross(b)
}

/// Unit-normalizes a vector; returns the zero vector if `v` is (numerically)
/// zero, matching CSPICE's `vhat_c` rather than panicking on division by zero.
pub fn vhat(v: &Vector3) -> Vector3 {
    let n = v.norm();
    if n < f64::EPSILON {
        Vector3::zeros()
    } else {
        v / n
    }
}

pub fn canonicalize_f64(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

/// Collapses `-0.0` to `0.0` in every component, so downstream equality and
/// hashing never observe the sign of a computed zero.
pub fn canonicalize_vec3(v: Vector3) -> Vector3 {
    Vector3::new(
        canonicalize_f64(v.x),
        canonicalize_f64(v.y),
        canonicalize_f64(v.z),
    )
}

pub fn canonicalize_mat3(m: Matrix3) -> Matrix3 {
    m.map(canonicalize_f64)
}

pub fn canonicalize_mat6(m: Matrix6) -> Matrix6 {
    m.map(canonicalize_f64)
}
