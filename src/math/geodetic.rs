/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Geodetic/rectangular conversion (`georec`/`recgeo`), Bowring's closed-form
//! solution with a dedicated branch for the near-pole singularity.

use super::Vector3;
use crate::errors::{DegenerateFlatteningSnafu, GeometryError, NonPositiveRadiusSnafu};
use snafu::ensure;

/// Converts geodetic longitude/latitude/altitude into a body-fixed
/// rectangular position, given the body's equatorial radius `re` (km) and
/// flattening `f`.
///
/// # Errors
/// Returns [`GeometryError::NonPositiveRadius`] if `re <= 0.0`, or
/// [`GeometryError::DegenerateFlattening`] if `f >= 1.0`, the same way
/// CSPICE's `georec_c` rejects a degenerate ellipsoid.
pub fn georec(lon: f64, lat: f64, alt: f64, re: f64, f: f64) -> Result<Vector3, GeometryError> {
    ensure!(re > 0.0, NonPositiveRadiusSnafu { radius_km: re });
    ensure!(f < 1.0, DegenerateFlatteningSnafu { f });

    let ecc_sq = f * (2.0 - f);
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    let n = re / (1.0 - ecc_sq * sin_lat * sin_lat).sqrt();

    let x = (n + alt) * cos_lat * cos_lon;
    let y = (n + alt) * cos_lat * sin_lon;
    let z = (n * (1.0 - ecc_sq) + alt) * sin_lat;

    Ok(super::canonicalize_vec3(Vector3::new(x, y, z)))
}

/// Converts a body-fixed rectangular position into geodetic
/// longitude/latitude/altitude using Bowring's closed-form solution, with a
/// dedicated branch for points on (or within floating tolerance of) the
/// rotation axis where longitude is undefined.
///
/// # Errors
/// Returns [`GeometryError::NonPositiveRadius`] if `re <= 0.0`, or
/// [`GeometryError::DegenerateFlattening`] if `f >= 1.0`.
pub fn recgeo(pos: Vector3, re: f64, f: f64) -> Result<(f64, f64, f64), GeometryError> {
    ensure!(re > 0.0, NonPositiveRadiusSnafu { radius_km: re });
    ensure!(f < 1.0, DegenerateFlatteningSnafu { f });

    let rp = re * (1.0 - f);
    let ecc_sq = f * (2.0 - f);
    let ecc_sq_p = (re * re - rp * rp) / (rp * rp); // second eccentricity squared

    let x = pos.x;
    let y = pos.y;
    let z = pos.z;
    let p = (x * x + y * y).sqrt();

    if p <= 1e-14 * re {
        let lat = if z >= 0.0 {
            core::f64::consts::FRAC_PI_2
        } else {
            -core::f64::consts::FRAC_PI_2
        };
        return Ok((0.0, lat, z.abs() - rp));
    }

    let lon = y.atan2(x);

    // Bowring's initial parametric-latitude guess, then one closed-form
    // correction; this converges to machine precision for any Earth-like
    // or Moon-like oblateness without an iterative loop.
    let theta = (z * re / (p * rp)).atan();
    let (sin_theta, cos_theta) = theta.sin_cos();

    let lat = ((z + ecc_sq_p * rp * sin_theta.powi(3)) / (p - ecc_sq * re * cos_theta.powi(3)))
        .atan();

    let (sin_lat, cos_lat) = lat.sin_cos();
    let n = re / (1.0 - ecc_sq * sin_lat * sin_lat).sqrt();
    let alt = p / cos_lat - n;

    Ok((lon, lat, alt))
}

#[cfg(test)]
mod ut_geodetic {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const RE_EARTH: f64 = 6378.137;
    const F_EARTH: f64 = 1.0 / 298.257223563;

    #[rstest]
    #[case(0.0, 0.0, 0.0)]
    #[case(1.0, 0.5, 100.0)]
    #[case(-2.0, -0.7, 1000.0)]
    #[case(3.0, 1.4, -500.0)]
    fn roundtrip(#[case] lon: f64, #[case] lat: f64, #[case] alt: f64) {
        let pos = georec(lon, lat, alt, RE_EARTH, F_EARTH).unwrap();
        let (lon2, lat2, alt2) = recgeo(pos, RE_EARTH, F_EARTH).unwrap();
        assert_relative_eq!(lon2, lon, max_relative = 1e-9);
        assert_relative_eq!(lat2, lat, max_relative = 1e-9);
        assert_relative_eq!(alt2, alt, epsilon = 1e-6, max_relative = 1e-9);
    }

    #[test]
    fn pole_singularity_sets_lon_zero() {
        let pos = Vector3::new(0.0, 0.0, RE_EARTH * (1.0 - F_EARTH));
        let (lon, lat, _alt) = recgeo(pos, RE_EARTH, F_EARTH).unwrap();
        assert_eq!(lon, 0.0);
        assert_relative_eq!(lat, core::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn rejects_non_positive_radius() {
        assert!(georec(0.0, 0.0, 0.0, 0.0, F_EARTH).is_err());
        assert!(recgeo(Vector3::new(1.0, 0.0, 0.0), -1.0, F_EARTH).is_err());
    }

    #[test]
    fn rejects_degenerate_flattening() {
        assert!(georec(0.0, 0.0, 0.0, RE_EARTH, 1.0).is_err());
    }
}
