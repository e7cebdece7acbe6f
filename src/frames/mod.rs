/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Frame & body-fixed-frame registry (`namfrm`/`frmnam`), plus the frame
//! transform engine (`pxform`/`sxform`) in [`transform`].

pub mod transform;

use crate::backend::Found;

/// A reference frame: immutable identity plus its constant angular rate
/// about the z-axis, interpreted as a rotation relative to J2000.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub code: i32,
    pub name: &'static str,
    pub rate_rad_s: f64,
}

pub const J2000: Frame = Frame {
    code: 1,
    name: "J2000",
    rate_rad_s: 0.0,
};

/// Earth's mean sidereal rotation rate.
pub const IAU_EARTH: Frame = Frame {
    code: 10_013,
    name: "IAU_EARTH",
    rate_rad_s: core::f64::consts::TAU / 86_164.090_5,
};

/// The Moon is tidally locked: its body-fixed rotation rate equals its
/// orbital rate around Earth (see [`crate::ephemeris`]).
pub const IAU_MOON: Frame = Frame {
    code: 10_020,
    name: "IAU_MOON",
    rate_rad_s: core::f64::consts::TAU / (27.321_661 * 86_400.0),
};

const FRAMES: &[Frame] = &[J2000, IAU_EARTH, IAU_MOON];

fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

pub fn namfrm(name: &str) -> Found<i32> {
    let normalized = normalize_name(name);
    match FRAMES.iter().find(|f| f.name == normalized) {
        Some(f) => Found::Yes(f.code),
        None => Found::No,
    }
}

pub fn frmnam(code: i32) -> Found<&'static str> {
    match FRAMES.iter().find(|f| f.code == code) {
        Some(f) => Found::Yes(f.name),
        None => Found::No,
    }
}

pub fn frame_by_code(code: i32) -> Found<Frame> {
    match FRAMES.iter().find(|f| f.code == code) {
        Some(f) => Found::Yes(*f),
        None => Found::No,
    }
}

pub fn frame_by_name(name: &str) -> Found<Frame> {
    match namfrm(name) {
        Found::Yes(code) => frame_by_code(code),
        Found::No => Found::No,
    }
}

/// Earth and the Moon have a body-fixed frame; the Sun does not, in the
/// reference registry.
pub fn center_id_to_body_fixed_frame(center_id: i32) -> Found<Frame> {
    match center_id {
        399 => Found::Yes(IAU_EARTH),
        301 => Found::Yes(IAU_MOON),
        _ => Found::No,
    }
}

pub fn center_name_to_body_fixed_frame(center_name: &str) -> Found<Frame> {
    let normalized = normalize_name(center_name);
    match normalized.as_str() {
        "EARTH" => Found::Yes(IAU_EARTH),
        "MOON" => Found::Yes(IAU_MOON),
        _ => Found::No,
    }
}

#[cfg(test)]
mod ut_frames {
    use super::*;

    #[test]
    fn lookup_round_trips() {
        for f in FRAMES {
            assert_eq!(frmnam(f.code), Found::Yes(f.name));
            assert_eq!(namfrm(f.name), Found::Yes(f.code));
        }
    }

    #[test]
    fn center_body_fixed_frame_by_name() {
        assert_eq!(center_name_to_body_fixed_frame("earth"), Found::Yes(IAU_EARTH));
        assert_eq!(center_name_to_body_fixed_frame("moon"), Found::Yes(IAU_MOON));
        assert_eq!(center_name_to_body_fixed_frame("sun"), Found::No);
    }

    #[test]
    fn j2000_is_non_rotating() {
        assert_eq!(J2000.rate_rad_s, 0.0);
    }

    #[test]
    fn center_body_fixed_frame_by_id() {
        assert_eq!(center_id_to_body_fixed_frame(399), Found::Yes(IAU_EARTH));
        assert_eq!(center_id_to_body_fixed_frame(301), Found::Yes(IAU_MOON));
        assert_eq!(center_id_to_body_fixed_frame(10), Found::No);
    }
}
