/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Deep, tolerance-aware structural comparison of two [`DynValue`]s, the
//! core of cross-backend verification.

use crate::backend::DynValue;
use crate::errors::{CompareError, InvalidToleranceSnafu};
use crate::math::angles::wrapped_delta;
use snafu::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Mismatch {
    pub path: String,
    pub actual: String,
    pub expected: String,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompareOptions {
    pub tol_abs: f64,
    pub tol_rel: f64,
    pub angle_wrap_pi: bool,
}

impl CompareOptions {
    pub fn new(tol_abs: f64, tol_rel: f64, angle_wrap_pi: bool) -> Result<Self, CompareError> {
        ensure!(
            tol_abs.is_finite() && tol_abs >= 0.0 && tol_rel.is_finite() && tol_rel >= 0.0,
            InvalidToleranceSnafu {
                tol_abs,
                tol_rel,
            }
        );
        Ok(Self {
            tol_abs,
            tol_rel,
            angle_wrap_pi,
        })
    }
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            tol_abs: 1e-9,
            tol_rel: 1e-9,
            angle_wrap_pi: false,
        }
    }
}

fn canonicalize_zero(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

fn numbers_match(a: f64, b: f64, opts: &CompareOptions) -> bool {
    let a = canonicalize_zero(a);
    let b = canonicalize_zero(b);
    if a.to_bits() == b.to_bits() {
        return true;
    }
    if a.is_nan() && b.is_nan() {
        return true;
    }
    let (a, b) = if opts.angle_wrap_pi {
        let delta = wrapped_delta(a, b);
        (0.0, delta)
    } else {
        (a, b)
    };
    let diff = (a - b).abs();
    let rel = diff / f64::EPSILON.max(a.abs().max(b.abs()));
    diff <= opts.tol_abs || rel <= opts.tol_rel
}

fn render(v: &DynValue) -> String {
    match v {
        DynValue::Null => "null".to_string(),
        DynValue::Bool(b) => b.to_string(),
        DynValue::Int(i) => i.to_string(),
        DynValue::Float(f) => f.to_string(),
        DynValue::Str(s) => format!("{s:?}"),
        DynValue::Vec3(v) => format!("{v:?}"),
        DynValue::Mat3(m) => format!("{m:?}"),
        DynValue::Mat6(m) => format!("{m:?}"),
        DynValue::StateVector(s) => format!("{s:?}"),
        DynValue::Array(a) => format!("[{} items]", a.len()),
        DynValue::Object(o) => format!("{{{} keys}}", o.len()),
    }
}

fn type_tag(v: &DynValue) -> &'static str {
    match v {
        DynValue::Null => "null",
        DynValue::Bool(_) => "bool",
        DynValue::Int(_) => "int",
        DynValue::Float(_) => "float",
        DynValue::Str(_) => "str",
        DynValue::Vec3(_) => "vec3",
        DynValue::Mat3(_) => "mat3",
        DynValue::Mat6(_) => "mat6",
        DynValue::StateVector(_) => "state",
        DynValue::Array(_) => "array",
        DynValue::Object(_) => "object",
    }
}

fn as_numeric_sequence(v: &DynValue) -> Option<Vec<f64>> {
    match v {
        DynValue::Vec3(a) => Some(a.to_vec()),
        DynValue::Mat3(a) => Some(a.to_vec()),
        DynValue::Mat6(a) => Some(a.to_vec()),
        DynValue::StateVector(a) => Some(a.to_vec()),
        DynValue::Array(items) => items.iter().map(|i| i.as_f64()).collect(),
        _ => None,
    }
}

fn push_mismatch(out: &mut Vec<Mismatch>, path: &str, actual: &DynValue, expected: &DynValue, message: impl Into<String>) {
    out.push(Mismatch {
        path: path.to_string(),
        actual: render(actual),
        expected: render(expected),
        message: message.into(),
    });
}

fn compare_into(path: &str, actual: &DynValue, expected: &DynValue, opts: &CompareOptions, out: &mut Vec<Mismatch>) {
    if let (Some(a_num), Some(e_num)) = (actual.as_f64(), expected.as_f64()) {
        if !numbers_match(a_num, e_num, opts) {
            push_mismatch(out, path, actual, expected, "numeric values differ beyond tolerance");
        }
        return;
    }

    if let (Some(a_seq), Some(e_seq)) = (as_numeric_sequence(actual), as_numeric_sequence(expected)) {
        if a_seq.len() != e_seq.len() {
            push_mismatch(out, path, actual, expected, "numeric sequence length differs");
            return;
        }
        for (i, (a, e)) in a_seq.iter().zip(e_seq.iter()).enumerate() {
            if !numbers_match(*a, *e, opts) {
                out.push(Mismatch {
                    path: format!("{path}[{i}]"),
                    actual: a.to_string(),
                    expected: e.to_string(),
                    message: "numeric values differ beyond tolerance".to_string(),
                });
            }
        }
        return;
    }

    match (actual, expected) {
        (DynValue::Str(a), DynValue::Str(e)) => {
            if a != e {
                push_mismatch(out, path, actual, expected, "string values differ");
            }
        }
        (DynValue::Bool(a), DynValue::Bool(e)) => {
            if a != e {
                push_mismatch(out, path, actual, expected, "boolean values differ");
            }
        }
        (DynValue::Null, DynValue::Null) => {}
        (DynValue::Array(a), DynValue::Array(e)) => {
            if a.len() != e.len() {
                push_mismatch(out, path, actual, expected, "array length differs");
            }
            for (i, (a_item, e_item)) in a.iter().zip(e.iter()).enumerate() {
                compare_into(&format!("{path}[{i}]"), a_item, e_item, opts, out);
            }
        }
        (DynValue::Object(a), DynValue::Object(e)) => {
            for (key, e_val) in e {
                let child_path = format!("{path}.{key}");
                match a.get(key) {
                    Some(a_val) => compare_into(&child_path, a_val, e_val, opts, out),
                    None => push_mismatch(out, &child_path, &DynValue::Null, e_val, "missing key"),
                }
            }
            for key in a.keys() {
                if !e.contains_key(key) {
                    push_mismatch(out, &format!("{path}.{key}"), a.get(key).unwrap(), &DynValue::Null, "unexpected key");
                }
            }
        }
        _ => {
            push_mismatch(
                out,
                path,
                actual,
                expected,
                format!(
                    "non-plain object mismatch: {} vs {}",
                    type_tag(actual),
                    type_tag(expected)
                ),
            );
        }
    }
}

/// Compares `actual` to `expected`, producing a flat, path-tagged mismatch
/// list. An empty result means the two values agree within `opts`.
pub fn compare(actual: &DynValue, expected: &DynValue, opts: &CompareOptions) -> Vec<Mismatch> {
    let mut out = Vec::new();
    compare_into("$", actual, expected, opts, &mut out);
    out
}

#[cfg(test)]
mod ut_compare {
    use super::*;

    fn opts() -> CompareOptions {
        CompareOptions::default()
    }

    #[test]
    fn identical_scalars_match() {
        assert!(compare(&DynValue::Float(1.0), &DynValue::Float(1.0), &opts()).is_empty());
    }

    #[test]
    fn within_absolute_tolerance_matches() {
        let a = DynValue::Float(1.0);
        let e = DynValue::Float(1.0 + 1e-12);
        assert!(compare(&a, &e, &opts()).is_empty());
    }

    #[test]
    fn beyond_tolerance_mismatches() {
        let a = DynValue::Float(1.0);
        let e = DynValue::Float(2.0);
        assert_eq!(compare(&a, &e, &opts()).len(), 1);
    }

    #[test]
    fn negative_zero_matches_positive_zero() {
        let a = DynValue::Float(-0.0);
        let e = DynValue::Float(0.0);
        assert!(compare(&a, &e, &opts()).is_empty());
    }

    #[test]
    fn array_length_mismatch_is_reported() {
        let a = DynValue::Array(vec![DynValue::Float(1.0)]);
        let e = DynValue::Array(vec![DynValue::Float(1.0), DynValue::Float(2.0)]);
        let mismatches = compare(&a, &e, &opts());
        assert_eq!(mismatches.len(), 1);
        assert!(mismatches[0].message.contains("length"));
    }

    #[test]
    fn object_reports_missing_and_unexpected_keys() {
        let mut a = std::collections::BTreeMap::new();
        a.insert("x".to_string(), DynValue::Int(1));
        a.insert("z".to_string(), DynValue::Int(9));
        let mut e = std::collections::BTreeMap::new();
        e.insert("x".to_string(), DynValue::Int(1));
        e.insert("y".to_string(), DynValue::Int(2));

        let mismatches = compare(&DynValue::Object(a), &DynValue::Object(e), &opts());
        assert_eq!(mismatches.len(), 2);
    }

    #[test]
    fn angle_wrap_allows_branch_cut_equality() {
        let opts = CompareOptions::new(1e-9, 1e-9, true).unwrap();
        let a = DynValue::Float(core::f64::consts::PI - 1e-12);
        let e = DynValue::Float(-core::f64::consts::PI + 1e-12);
        assert!(compare(&a, &e, &opts).is_empty());
    }

    #[test]
    fn mat3_compared_element_wise() {
        let a = DynValue::Mat3([1.0; 9]);
        let mut expected = [1.0; 9];
        expected[4] = 2.0;
        let e = DynValue::Mat3(expected);
        let mismatches = compare(&a, &e, &opts());
        assert_eq!(mismatches.len(), 1);
        assert!(mismatches[0].path.contains("[4]"));
    }

    #[test]
    fn invalid_tolerance_is_rejected() {
        assert!(CompareOptions::new(-1.0, 0.0, false).is_err());
        assert!(CompareOptions::new(f64::INFINITY, 0.0, false).is_err());
    }
}
