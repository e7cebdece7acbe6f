/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! A deterministic, closed-form toy solar system: Sun stationary at the
//! origin, Earth on a circular heliocentric orbit, Moon on a circular orbit
//! around Earth. Not a model of real celestial mechanics -- see
//! `spkezr`/`spkpos` for how `abcorr` is accepted but never changes the
//! result.

use crate::math::{Vector3, Vector6};
use crate::time::EphemerisTime;
use core::f64::consts::TAU;

/// 1 astronomical unit, in kilometers.
pub const AU_KM: f64 = 149_597_870.7;
/// Mean Earth orbital period, in seconds (365.25 Julian days).
pub const EARTH_PERIOD_S: f64 = 365.25 * 86_400.0;
/// Moon's orbital radius around Earth, in kilometers.
pub const MOON_ORBIT_RADIUS_KM: f64 = 384_400.0;
/// Moon's sidereal period around Earth, in seconds.
pub const MOON_PERIOD_S: f64 = 27.321_661 * 86_400.0;

fn earth_orbit_rate() -> f64 {
    TAU / EARTH_PERIOD_S
}

fn moon_orbit_rate() -> f64 {
    TAU / MOON_PERIOD_S
}

/// A closed-form circular orbit in the XY plane of J2000: position and
/// velocity, analytically differentiated.
fn circular_orbit_state(radius_km: f64, rate_rad_s: f64, et: f64) -> Vector6 {
    let theta = rate_rad_s * et;
    let (s, c) = theta.sin_cos();
    let pos = Vector3::new(radius_km * c, radius_km * s, 0.0);
    let vel = Vector3::new(
        -radius_km * rate_rad_s * s,
        radius_km * rate_rad_s * c,
        0.0,
    );
    Vector6::new(pos.x, pos.y, pos.z, vel.x, vel.y, vel.z)
}

/// The Sun's state in J2000: stationary at the origin.
pub fn sun_state(_et: EphemerisTime) -> Vector6 {
    Vector6::zeros()
}

/// Earth's state in J2000: a circular heliocentric orbit.
pub fn earth_state(et: EphemerisTime) -> Vector6 {
    circular_orbit_state(AU_KM, earth_orbit_rate(), et.as_seconds())
}

/// The Moon's state in J2000: Earth's state plus a circular orbit about Earth.
pub fn moon_state(et: EphemerisTime) -> Vector6 {
    earth_state(et) + circular_orbit_state(MOON_ORBIT_RADIUS_KM, moon_orbit_rate(), et.as_seconds())
}

/// Absolute J2000 state of a body by its NAIF id, for the three bodies the
/// reference ephemeris knows about.
pub fn absolute_state(body_id: i32, et: EphemerisTime) -> Option<Vector6> {
    match body_id {
        10 => Some(sun_state(et)),
        399 => Some(earth_state(et)),
        301 => Some(moon_state(et)),
        _ => None,
    }
}

/// `spkezr`: state of `target` relative to `observer` in J2000, at `et`.
/// `abcorr` is accepted for interface parity but never changes the result --
/// light-time correction is always zero in this reference ephemeris.
pub fn spkezr(target_id: i32, et: EphemerisTime, observer_id: i32, _abcorr: &str) -> Option<Vector6> {
    let target = absolute_state(target_id, et)?;
    let observer = absolute_state(observer_id, et)?;
    Some(target - observer)
}

/// `spkpos`: position-only variant of [`spkezr`].
pub fn spkpos(target_id: i32, et: EphemerisTime, observer_id: i32, abcorr: &str) -> Option<Vector3> {
    spkezr(target_id, et, observer_id, abcorr).map(|s| s.fixed_rows::<3>(0).into_owned())
}

#[cfg(test)]
mod ut_ephemeris {
    use super::*;
    use approx::assert_relative_eq;
    use core::f64::consts::FRAC_PI_2;
    use rstest::rstest;

    #[test]
    fn sun_never_moves() {
        let s = sun_state(EphemerisTime::from_seconds(1e9));
        assert_eq!(s, Vector6::zeros());
    }

    #[test]
    fn earth_starts_on_positive_x_axis() {
        let s = earth_state(EphemerisTime::from_seconds(0.0));
        assert_relative_eq!(s.x, AU_KM, max_relative = 1e-12);
        assert_relative_eq!(s.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn earth_quarter_period_is_on_y_axis() {
        let quarter_period = FRAC_PI_2 / earth_orbit_rate();
        let s = earth_state(EphemerisTime::from_seconds(quarter_period));
        assert_relative_eq!(s.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(s.y, AU_KM, max_relative = 1e-6);
    }

    #[rstest]
    #[case(0.0)]
    #[case(86_400.0)]
    #[case(-31_622_400.0)]
    fn earth_orbit_radius_is_constant(#[case] et: f64) {
        let s = earth_state(EphemerisTime::from_seconds(et));
        let radius = s.fixed_rows::<3>(0).norm();
        assert_relative_eq!(radius, AU_KM, max_relative = 1e-9);
    }

    #[test]
    fn moon_orbits_around_earth_not_origin() {
        let et = EphemerisTime::from_seconds(1_000.0);
        let earth = earth_state(et);
        let moon = moon_state(et);
        let relative = moon - earth;
        assert_relative_eq!(
            relative.fixed_rows::<3>(0).norm(),
            MOON_ORBIT_RADIUS_KM,
            max_relative = 1e-9
        );
    }

    #[test]
    fn spkpos_earth_from_sun_matches_absolute_state() {
        let et = EphemerisTime::from_seconds(0.0);
        let pos = spkpos(399, et, 10, "NONE").unwrap();
        assert_relative_eq!(pos.x, AU_KM, max_relative = 1e-12);
    }

    #[test]
    fn spkezr_rejects_unknown_bodies() {
        assert!(spkezr(42, EphemerisTime::from_seconds(0.0), 10, "NONE").is_none());
    }

    #[test]
    fn abcorr_flag_does_not_change_result() {
        let et = EphemerisTime::from_seconds(12_345.0);
        let none = spkezr(301, et, 399, "NONE").unwrap();
        let lt = spkezr(301, et, 399, "LT").unwrap();
        assert_eq!(none, lt);
    }
}
