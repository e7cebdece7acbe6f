/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Body name/id registry (`bodn2c`/`bodc2n`). A closed set in the reference
//! backend: real implementations expand this against the loaded PCK/SPK
//! pool, but the lookup shape -- trimmed/lowercased name, numeric-id strings
//! accepted, unknown inputs surfacing as [`Found::No`] -- is the same.

use crate::backend::Found;

/// A celestial target: immutable identity plus the reference radius used by
/// the geometry ops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub id: i32,
    pub name: &'static str,
    pub mean_radius_km: f64,
}

pub const SUN: Body = Body {
    id: 10,
    name: "SUN",
    mean_radius_km: 695_700.0,
};

pub const EARTH: Body = Body {
    id: 399,
    name: "EARTH",
    mean_radius_km: 6_371.0084,
};

pub const MOON: Body = Body {
    id: 301,
    name: "MOON",
    mean_radius_km: 1_737.4,
};

const BODIES: &[Body] = &[SUN, EARTH, MOON];

fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Looks up a body by name (trimmed, case-insensitive) or by numeric id
/// string (e.g. `"399"`).
pub fn bodn2c(name: &str) -> Found<i32> {
    let normalized = normalize_name(name);
    if let Ok(id) = normalized.parse::<i32>() {
        if BODIES.iter().any(|b| b.id == id) {
            return Found::Yes(id);
        }
        return Found::No;
    }
    match BODIES.iter().find(|b| b.name == normalized) {
        Some(b) => Found::Yes(b.id),
        None => Found::No,
    }
}

pub fn bodc2n(id: i32) -> Found<&'static str> {
    match BODIES.iter().find(|b| b.id == id) {
        Some(b) => Found::Yes(b.name),
        None => Found::No,
    }
}

pub fn body_by_id(id: i32) -> Found<Body> {
    match BODIES.iter().find(|b| b.id == id) {
        Some(b) => Found::Yes(*b),
        None => Found::No,
    }
}

pub fn body_by_name(name: &str) -> Found<Body> {
    match bodn2c(name) {
        Found::Yes(id) => body_by_id(id),
        Found::No => Found::No,
    }
}

#[cfg(test)]
mod ut_bodies {
    use super::*;

    #[test]
    fn lookup_by_lowercase_name() {
        assert_eq!(bodn2c("earth"), Found::Yes(399));
        assert_eq!(bodc2n(399), Found::Yes("EARTH"));
    }

    #[test]
    fn lookup_by_numeric_string() {
        assert_eq!(bodn2c(" 301 "), Found::Yes(301));
    }

    #[test]
    fn unknown_name_is_not_found() {
        assert_eq!(bodn2c("Pluto9"), Found::No);
        assert_eq!(bodc2n(999), Found::No);
    }

    #[test]
    fn inverse_lookup_round_trips_canonical_name() {
        for body in BODIES {
            assert_eq!(bodc2n(body.id), Found::Yes(body.name));
            assert_eq!(bodn2c(body.name), Found::Yes(body.id));
        }
    }
}
