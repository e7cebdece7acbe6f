/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Geometry ops (`subpnt`/`subslr`/`ilumin`/`occult`) against a spherical
//! target model. Pure functions over kernel state: no op here mutates the
//! error state machine or the pool.

use crate::bodies::body_by_name;
use crate::ephemeris::absolute_state;
use crate::frames::transform::pxform;
use crate::frames::{frame_by_name, J2000};
use crate::math::vhat;
use crate::math::Vector3;
use crate::time::EphemerisTime;
use crate::backend::Found;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub spoint: Vector3,
    pub srfvec: Vector3,
    pub trgepc: EphemerisTime,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IlluminationAngles {
    pub phase_rad: f64,
    pub incidence_rad: f64,
    pub emission_rad: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OccultationCode {
    NoOcc,
}

fn observer_relative_to_target(
    target_id: i32,
    observer_id: i32,
    et: EphemerisTime,
) -> Option<Vector3> {
    let target = absolute_state(target_id, et)?;
    let observer = absolute_state(observer_id, et)?;
    // Observer's position relative to the target, in J2000.
    Some(observer.fixed_rows::<3>(0).into_owned() - target.fixed_rows::<3>(0).into_owned())
}

/// `subpnt`: the sub-observer point on `target`, in the target's body-fixed
/// frame `fixref`. `method` and `abcorr` are accepted for interface parity
/// but do not change the (always-spherical, always-zero-light-time) result.
pub fn subpnt(
    _method: &str,
    target: &str,
    et: EphemerisTime,
    fixref: &str,
    _abcorr: &str,
    observer: &str,
) -> Option<SurfacePoint> {
    let target_body = body_by_name(target).into_option()?;
    let observer_body = body_by_name(observer).into_option()?;
    let frame = frame_by_name(fixref).into_option().unwrap_or(J2000);

    let observer_pos_j2000 = observer_relative_to_target(target_body.id, observer_body.id, et)?;
    let rotated = pxform(J2000, frame, et) * observer_pos_j2000;
    let spoint = vhat(&rotated) * target_body.mean_radius_km;
    let srfvec = spoint - rotated;

    Some(SurfacePoint {
        spoint,
        srfvec,
        trgepc: et,
    })
}

/// `subslr`: same computation as [`subpnt`] with the observer replaced by
/// the Sun.
pub fn subslr(
    method: &str,
    target: &str,
    et: EphemerisTime,
    fixref: &str,
    abcorr: &str,
) -> Option<SurfacePoint> {
    subpnt(method, target, et, fixref, abcorr, "SUN")
}

fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < f64::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// `ilumin`: phase/incidence/emission angles at a surface point already
/// computed by `subpnt`/`subslr`.
pub fn ilumin(
    _method: &str,
    target: &str,
    et: EphemerisTime,
    fixref: &str,
    _abcorr: &str,
    observer: &str,
    spoint: Vector3,
) -> Option<IlluminationAngles> {
    let target_body = body_by_name(target).into_option()?;
    let observer_body = body_by_name(observer).into_option()?;
    let frame = frame_by_name(fixref).into_option().unwrap_or(J2000);

    let to_j2000 = pxform(frame, J2000, et);
    let spoint_j2000 = to_j2000 * spoint;

    let target_state = absolute_state(target_body.id, et)?;
    let sun_state = absolute_state(10, et)?;
    let observer_state = absolute_state(observer_body.id, et)?;

    let surface_j2000 = target_state.fixed_rows::<3>(0).into_owned() + spoint_j2000;
    let srf_to_sun = sun_state.fixed_rows::<3>(0).into_owned() - surface_j2000;
    let srf_to_obs = observer_state.fixed_rows::<3>(0).into_owned() - surface_j2000;
    let normal = vhat(&spoint_j2000);

    Some(IlluminationAngles {
        phase_rad: angle_between(&srf_to_sun, &srf_to_obs),
        incidence_rad: angle_between(&normal, &srf_to_sun),
        emission_rad: angle_between(&normal, &srf_to_obs),
    })
}

/// `occult`: always reports no occultation in the reference backend.
pub fn occult(
    _target_a: &str,
    _target_b: &str,
    _et: EphemerisTime,
    _observer: &str,
) -> OccultationCode {
    OccultationCode::NoOcc
}

#[cfg(test)]
mod ut_geometry {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn subpnt_scales_to_target_mean_radius() {
        let et = EphemerisTime::from_seconds(0.0);
        let sp = subpnt("NEAR POINT: ELLIPSOID", "EARTH", et, "IAU_EARTH", "NONE", "MOON").unwrap();
        assert_relative_eq!(sp.spoint.norm(), 6_371.0084, max_relative = 1e-9);
    }

    #[test]
    fn subslr_uses_sun_as_observer() {
        let et = EphemerisTime::from_seconds(0.0);
        let direct = subpnt("NEAR POINT: ELLIPSOID", "EARTH", et, "IAU_EARTH", "NONE", "SUN").unwrap();
        let via_subslr = subslr("NEAR POINT: ELLIPSOID", "EARTH", et, "IAU_EARTH", "NONE").unwrap();
        assert_eq!(direct.spoint, via_subslr.spoint);
    }

    #[test]
    fn ilumin_angles_are_within_valid_range() {
        let et = EphemerisTime::from_seconds(0.0);
        let sp = subpnt("NEAR POINT: ELLIPSOID", "EARTH", et, "IAU_EARTH", "NONE", "MOON").unwrap();
        let angles = ilumin(
            "ELLIPSOID", "EARTH", et, "IAU_EARTH", "NONE", "MOON", sp.spoint,
        )
        .unwrap();
        assert!((0.0..=core::f64::consts::PI).contains(&angles.phase_rad));
        assert!((0.0..=core::f64::consts::PI).contains(&angles.incidence_rad));
        assert!((0.0..=core::f64::consts::PI).contains(&angles.emission_rad));
    }

    #[test]
    fn occult_always_reports_no_occultation() {
        let et = EphemerisTime::from_seconds(0.0);
        assert_eq!(occult("EARTH", "MOON", et, "SUN"), OccultationCode::NoOcc);
    }

    #[test]
    fn subpnt_rejects_unknown_target() {
        let et = EphemerisTime::from_seconds(0.0);
        assert!(subpnt("NEAR POINT: ELLIPSOID", "MARS", et, "IAU_EARTH", "NONE", "SUN").is_none());
    }
}
