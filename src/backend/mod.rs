/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The backend contract: [`SpiceBackend`], the [`DynValue`] envelope that
//! crosses it, and the [`Found`] found/absent marker that keeps lookup
//! misses out of the error channel.

pub mod fake;
#[cfg(feature = "native")]
pub mod native;

pub use fake::FakeBackend;
#[cfg(feature = "native")]
pub use native::NativeBackend;

use crate::errors::{SpiceError, InvalidArgsSnafu, UnsupportedCallSnafu};
use crate::math::{Matrix3, Matrix6, Vector3, Vector6};
use snafu::prelude::*;
use std::collections::BTreeMap;

/// A result that may legitimately be absent, kept distinct from a thrown
/// error (a lookup miss is not a failure).
#[derive(Clone, Debug, PartialEq)]
pub enum Found<T> {
    Yes(T),
    No,
}

impl<T> Found<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Found::Yes(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Found::Yes(v) => Some(v),
            Found::No => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Found<U> {
        match self {
            Found::Yes(v) => Found::Yes(f(v)),
            Found::No => Found::No,
        }
    }
}

/// The structured-clone-shaped envelope crossing the trait boundary.
/// `Object` is backed by a `BTreeMap` so key order (and therefore
/// comparator path generation) is deterministic.
#[derive(Clone, Debug, PartialEq)]
pub enum DynValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Vec3([f64; 3]),
    Mat3([f64; 9]),
    Mat6([f64; 36]),
    StateVector([f64; 6]),
    Array(Vec<DynValue>),
    Object(BTreeMap<String, DynValue>),
}

impl DynValue {
    pub fn from_vector3(v: Vector3) -> Self {
        DynValue::Vec3([v.x, v.y, v.z])
    }

    pub fn from_vector6(v: Vector6) -> Self {
        let mut out = [0.0; 6];
        out.copy_from_slice(v.as_slice());
        DynValue::StateVector(out)
    }

    /// Row-major flatten: `nalgebra` is column-major internally.
    pub fn from_matrix3(m: Matrix3) -> Self {
        let mut out = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = m[(row, col)];
            }
        }
        DynValue::Mat3(out)
    }

    pub fn from_matrix6(m: Matrix6) -> Self {
        let mut out = [0.0; 36];
        for row in 0..6 {
            for col in 0..6 {
                out[row * 6 + col] = m[(row, col)];
            }
        }
        DynValue::Mat6(out)
    }

    pub fn from_found<T: Into<DynValue>>(found: Found<T>) -> Self {
        let mut obj = BTreeMap::new();
        match found {
            Found::Yes(v) => {
                obj.insert("found".to_string(), DynValue::Bool(true));
                obj.insert("value".to_string(), v.into());
            }
            Found::No => {
                obj.insert("found".to_string(), DynValue::Bool(false));
            }
        }
        DynValue::Object(obj)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynValue::Int(i) => Some(*i as f64),
            DynValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DynValue]> {
        match self {
            DynValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Accepts either a tagged `Vec3` or a 3-element `Array` of numbers --
    /// case files carry plain JSON arrays, never the tagged variants.
    pub fn as_vector3(&self) -> Option<Vector3> {
        match self {
            DynValue::Vec3(v) => Some(Vector3::new(v[0], v[1], v[2])),
            DynValue::Array(a) if a.len() == 3 => {
                let nums: Option<Vec<f64>> = a.iter().map(DynValue::as_f64).collect();
                nums.map(|n| Vector3::new(n[0], n[1], n[2]))
            }
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynValue::Int(i) => Some(*i),
            DynValue::Float(f) => Some(*f as i64),
            _ => None,
        }
    }
}

impl From<f64> for DynValue {
    fn from(v: f64) -> Self {
        DynValue::Float(v)
    }
}

impl From<i64> for DynValue {
    fn from(v: i64) -> Self {
        DynValue::Int(v)
    }
}

impl From<String> for DynValue {
    fn from(v: String) -> Self {
        DynValue::Str(v)
    }
}

impl From<&str> for DynValue {
    fn from(v: &str) -> Self {
        DynValue::Str(v.to_string())
    }
}

impl From<bool> for DynValue {
    fn from(v: bool) -> Self {
        DynValue::Bool(v)
    }
}

impl From<Vec<f64>> for DynValue {
    fn from(v: Vec<f64>) -> Self {
        DynValue::Array(v.into_iter().map(DynValue::Float).collect())
    }
}

impl From<Vec<i64>> for DynValue {
    fn from(v: Vec<i64>) -> Self {
        DynValue::Array(v.into_iter().map(DynValue::Int).collect())
    }
}

impl From<Vec<String>> for DynValue {
    fn from(v: Vec<String>) -> Self {
        DynValue::Array(v.into_iter().map(DynValue::Str).collect())
    }
}

fn arg(args: &[DynValue], op: &str, idx: usize) -> Result<&DynValue, SpiceError> {
    args.get(idx)
        .context(InvalidArgsSnafu {
            op: op.to_string(),
            expected: idx + 1,
            got: args.len(),
        })
        .map_err(Into::into)
}

fn arg_str<'a>(args: &'a [DynValue], op: &str, idx: usize) -> Result<&'a str, SpiceError> {
    arg(args, op, idx)?.as_str().ok_or_else(|| {
        InvalidArgsSnafu {
            op: op.to_string(),
            expected: idx + 1,
            got: args.len(),
        }
        .build()
        .into()
    })
}

fn arg_f64(args: &[DynValue], op: &str, idx: usize) -> Result<f64, SpiceError> {
    arg(args, op, idx)?.as_f64().ok_or_else(|| {
        InvalidArgsSnafu {
            op: op.to_string(),
            expected: idx + 1,
            got: args.len(),
        }
        .build()
        .into()
    })
}

fn arg_i64(args: &[DynValue], op: &str, idx: usize) -> Result<i64, SpiceError> {
    arg(args, op, idx)?.as_i64().ok_or_else(|| {
        InvalidArgsSnafu {
            op: op.to_string(),
            expected: idx + 1,
            got: args.len(),
        }
        .build()
        .into()
    })
}

/// Every SPICE operation the verification corpus exercises, grouped under
/// one dispatch surface. `found`/absent results travel as [`Found`]; only
/// genuine domain or validation failures travel as `Err`.
pub trait SpiceBackend {
    fn str2et(&mut self, s: &str) -> Result<crate::time::EphemerisTime, SpiceError>;
    fn et2utc(&mut self, et: crate::time::EphemerisTime, format: &str, prec: u8) -> Result<String, SpiceError>;

    fn bodn2c(&mut self, name: &str) -> Found<i32>;
    fn bodc2n(&mut self, id: i32) -> Found<String>;

    fn namfrm(&mut self, name: &str) -> Found<i32>;
    fn frmnam(&mut self, code: i32) -> Found<String>;
    fn pxform(&mut self, from: &str, to: &str, et: crate::time::EphemerisTime) -> Result<Matrix3, SpiceError>;
    fn sxform(&mut self, from: &str, to: &str, et: crate::time::EphemerisTime) -> Result<Matrix6, SpiceError>;

    fn spkezr(
        &mut self,
        target: &str,
        et: crate::time::EphemerisTime,
        frame: &str,
        abcorr: &str,
        observer: &str,
    ) -> Result<Vector6, SpiceError>;
    fn spkpos(
        &mut self,
        target: &str,
        et: crate::time::EphemerisTime,
        frame: &str,
        abcorr: &str,
        observer: &str,
    ) -> Result<Vector3, SpiceError>;

    fn subpnt(
        &mut self,
        method: &str,
        target: &str,
        et: crate::time::EphemerisTime,
        fixref: &str,
        abcorr: &str,
        observer: &str,
    ) -> Result<crate::geometry::SurfacePoint, SpiceError>;
    fn subslr(
        &mut self,
        method: &str,
        target: &str,
        et: crate::time::EphemerisTime,
        fixref: &str,
        abcorr: &str,
    ) -> Result<crate::geometry::SurfacePoint, SpiceError>;
    fn ilumin(
        &mut self,
        method: &str,
        target: &str,
        et: crate::time::EphemerisTime,
        fixref: &str,
        abcorr: &str,
        observer: &str,
        spoint: Vector3,
    ) -> Result<crate::geometry::IlluminationAngles, SpiceError>;
    fn occult(
        &mut self,
        target_a: &str,
        target_b: &str,
        et: crate::time::EphemerisTime,
        observer: &str,
    ) -> Result<crate::geometry::OccultationCode, SpiceError>;

    fn put_double(&mut self, name: &str, values: Vec<f64>) -> Result<(), SpiceError>;
    fn put_int(&mut self, name: &str, values: Vec<i64>) -> Result<(), SpiceError>;
    fn put_char(&mut self, name: &str, values: Vec<String>) -> Result<(), SpiceError>;
    fn get_double(&mut self, name: &str, start: i32, room: i32) -> Result<Vec<f64>, SpiceError>;
    fn get_int(&mut self, name: &str, start: i32, room: i32) -> Result<Vec<i64>, SpiceError>;
    fn get_char(&mut self, name: &str, start: i32, room: i32) -> Result<Vec<String>, SpiceError>;
    fn get_names_matching(&mut self, template: &str, start: i32, room: i32) -> Result<Vec<String>, SpiceError>;
    fn expool(&mut self, name: &str) -> bool;
    fn dtpool(&mut self, name: &str) -> Found<(usize, bool)>;
    fn swpool(&mut self, agent: &str, names: Vec<String>);
    fn cvpool(&mut self, agent: &str) -> bool;

    fn furnsh(&mut self, path: &str) -> Result<i32, SpiceError>;
    fn unload(&mut self, path: &str) -> Result<(), SpiceError>;
    fn kclear(&mut self) -> Result<(), SpiceError>;
    fn ktotal(&mut self, kind: &str) -> Result<usize, SpiceError>;
    fn kdata(&mut self, index: usize, kind: &str) -> Found<crate::kernel::KernelRecord>;

    fn failed(&mut self) -> bool;
    fn reset(&mut self) -> Result<(), SpiceError>;
    fn getmsg(&mut self, kind: &str) -> Result<String, SpiceError>;
    fn setmsg(&mut self, msg: &str) -> Result<(), SpiceError>;
    fn sigerr(&mut self, short: &str) -> Result<(), SpiceError>;
    fn chkin(&mut self, name: &str) -> Result<(), SpiceError>;
    fn chkout(&mut self, name: &str) -> Result<(), SpiceError>;

    /// Flat name-indexed dispatch: validates arity/shape, routes to the
    /// typed method above, and re-wraps the result as a [`DynValue`].
    fn dispatch(&mut self, op: &str, args: &[DynValue]) -> Result<DynValue, SpiceError> {
        match op {
            "time.str2et" => {
                let s = arg_str(args, op, 0)?;
                Ok(DynValue::Float(self.str2et(s)?.as_seconds()))
            }
            "time.et2utc" => {
                let et = crate::time::EphemerisTime::from_seconds(arg_f64(args, op, 0)?);
                let format = arg_str(args, op, 1)?;
                let prec = arg_i64(args, op, 2)? as u8;
                Ok(DynValue::Str(self.et2utc(et, format, prec)?))
            }
            "ids-names.bodn2c" => {
                let name = arg_str(args, op, 0)?;
                Ok(DynValue::from_found(self.bodn2c(name).map(DynValue::from)))
            }
            "ids-names.bodc2n" => {
                let id = arg_i64(args, op, 0)? as i32;
                Ok(DynValue::from_found(self.bodc2n(id).map(DynValue::from)))
            }
            "frames.namfrm" => {
                let name = arg_str(args, op, 0)?;
                Ok(DynValue::from_found(self.namfrm(name).map(DynValue::from)))
            }
            "frames.frmnam" => {
                let code = arg_i64(args, op, 0)? as i32;
                Ok(DynValue::from_found(self.frmnam(code).map(DynValue::from)))
            }
            "frames.pxform" => {
                let from = arg_str(args, op, 0)?;
                let to = arg_str(args, op, 1)?;
                let et = crate::time::EphemerisTime::from_seconds(arg_f64(args, op, 2)?);
                Ok(DynValue::from_matrix3(self.pxform(from, to, et)?))
            }
            "frames.sxform" => {
                let from = arg_str(args, op, 0)?;
                let to = arg_str(args, op, 1)?;
                let et = crate::time::EphemerisTime::from_seconds(arg_f64(args, op, 2)?);
                Ok(DynValue::from_matrix6(self.sxform(from, to, et)?))
            }
            "ephem.spkezr" => {
                let target = arg_str(args, op, 0)?;
                let et = crate::time::EphemerisTime::from_seconds(arg_f64(args, op, 1)?);
                let frame = arg_str(args, op, 2)?;
                let abcorr = arg_str(args, op, 3)?;
                let observer = arg_str(args, op, 4)?;
                Ok(DynValue::from_vector6(
                    self.spkezr(target, et, frame, abcorr, observer)?,
                ))
            }
            "ephem.spkpos" => {
                let target = arg_str(args, op, 0)?;
                let et = crate::time::EphemerisTime::from_seconds(arg_f64(args, op, 1)?);
                let frame = arg_str(args, op, 2)?;
                let abcorr = arg_str(args, op, 3)?;
                let observer = arg_str(args, op, 4)?;
                Ok(DynValue::from_vector3(
                    self.spkpos(target, et, frame, abcorr, observer)?,
                ))
            }
            "geom.subpnt" => {
                let method = arg_str(args, op, 0)?;
                let target = arg_str(args, op, 1)?;
                let et = crate::time::EphemerisTime::from_seconds(arg_f64(args, op, 2)?);
                let fixref = arg_str(args, op, 3)?;
                let abcorr = arg_str(args, op, 4)?;
                let observer = arg_str(args, op, 5)?;
                let result = self.subpnt(method, target, et, fixref, abcorr, observer)?;
                Ok(surface_point_to_dyn(result))
            }
            "geom.subslr" => {
                let method = arg_str(args, op, 0)?;
                let target = arg_str(args, op, 1)?;
                let et = crate::time::EphemerisTime::from_seconds(arg_f64(args, op, 2)?);
                let fixref = arg_str(args, op, 3)?;
                let abcorr = arg_str(args, op, 4)?;
                let result = self.subslr(method, target, et, fixref, abcorr)?;
                Ok(surface_point_to_dyn(result))
            }
            "geom.ilumin" => {
                let method = arg_str(args, op, 0)?;
                let target = arg_str(args, op, 1)?;
                let et = crate::time::EphemerisTime::from_seconds(arg_f64(args, op, 2)?);
                let fixref = arg_str(args, op, 3)?;
                let abcorr = arg_str(args, op, 4)?;
                let observer = arg_str(args, op, 5)?;
                let spoint = arg(args, op, 6)?.as_vector3().ok_or_else(|| {
                    InvalidArgsSnafu {
                        op: op.to_string(),
                        expected: 7,
                        got: args.len(),
                    }
                    .build()
                })?;
                let angles = self.ilumin(method, target, et, fixref, abcorr, observer, spoint)?;
                let mut obj = BTreeMap::new();
                obj.insert("phase".to_string(), DynValue::Float(angles.phase_rad));
                obj.insert("incidence".to_string(), DynValue::Float(angles.incidence_rad));
                obj.insert("emission".to_string(), DynValue::Float(angles.emission_rad));
                Ok(DynValue::Object(obj))
            }
            "geom.occult" => {
                let a = arg_str(args, op, 0)?;
                let b = arg_str(args, op, 1)?;
                let et = crate::time::EphemerisTime::from_seconds(arg_f64(args, op, 2)?);
                let observer = arg_str(args, op, 3)?;
                let code = self.occult(a, b, et, observer)?;
                Ok(DynValue::Int(match code {
                    crate::geometry::OccultationCode::NoOcc => 0,
                }))
            }
            "pool.putd" => {
                let name = arg_str(args, op, 0)?.to_string();
                let values = float_array_arg(args, op, 1)?;
                self.put_double(&name, values)?;
                Ok(DynValue::Null)
            }
            "pool.puti" => {
                let name = arg_str(args, op, 0)?.to_string();
                let values = int_array_arg(args, op, 1)?;
                self.put_int(&name, values)?;
                Ok(DynValue::Null)
            }
            "pool.putc" => {
                let name = arg_str(args, op, 0)?.to_string();
                let values = str_array_arg(args, op, 1)?;
                self.put_char(&name, values)?;
                Ok(DynValue::Null)
            }
            "pool.getd" => {
                let name = arg_str(args, op, 0)?;
                let start = arg_i64(args, op, 1)? as i32;
                let room = arg_i64(args, op, 2)? as i32;
                Ok(self.get_double(name, start, room)?.into())
            }
            "pool.geti" => {
                let name = arg_str(args, op, 0)?;
                let start = arg_i64(args, op, 1)? as i32;
                let room = arg_i64(args, op, 2)? as i32;
                Ok(self.get_int(name, start, room)?.into())
            }
            "pool.getc" => {
                let name = arg_str(args, op, 0)?;
                let start = arg_i64(args, op, 1)? as i32;
                let room = arg_i64(args, op, 2)? as i32;
                Ok(self.get_char(name, start, room)?.into())
            }
            "pool.getn" => {
                let template = arg_str(args, op, 0)?;
                let start = arg_i64(args, op, 1)? as i32;
                let room = arg_i64(args, op, 2)? as i32;
                Ok(self.get_names_matching(template, start, room)?.into())
            }
            "pool.expool" => {
                let name = arg_str(args, op, 0)?;
                Ok(DynValue::Bool(self.expool(name)))
            }
            "pool.dtpool" => {
                let name = arg_str(args, op, 0)?;
                let found = self.dtpool(name);
                Ok(DynValue::from_found(found.map(|(len, is_numeric)| {
                    let mut obj = BTreeMap::new();
                    obj.insert("n".to_string(), DynValue::Int(len as i64));
                    obj.insert("numeric".to_string(), DynValue::Bool(is_numeric));
                    DynValue::Object(obj)
                })))
            }
            "pool.swpool" => {
                let agent = arg_str(args, op, 0)?.to_string();
                let names = str_array_arg(args, op, 1)?;
                self.swpool(&agent, names);
                Ok(DynValue::Null)
            }
            "pool.cvpool" => {
                let agent = arg_str(args, op, 0)?;
                Ok(DynValue::Bool(self.cvpool(agent)))
            }
            "kern.furnsh" => {
                let path = arg_str(args, op, 0)?;
                Ok(DynValue::Int(self.furnsh(path)? as i64))
            }
            "kern.unload" => {
                let path = arg_str(args, op, 0)?;
                self.unload(path)?;
                Ok(DynValue::Null)
            }
            "kern.kclear" => {
                self.kclear()?;
                Ok(DynValue::Null)
            }
            "kern.ktotal" => {
                let kind = arg_str(args, op, 0)?;
                Ok(DynValue::Int(self.ktotal(kind)? as i64))
            }
            "kern.kdata" => {
                let index = arg_i64(args, op, 0)? as usize;
                let kind = arg_str(args, op, 1)?;
                Ok(DynValue::from_found(self.kdata(index, kind).map(|rec| {
                    let mut obj = BTreeMap::new();
                    obj.insert("path".to_string(), DynValue::Str(rec.path.display().to_string()));
                    obj.insert("handle".to_string(), DynValue::Int(rec.handle as i64));
                    obj.insert("filtyp".to_string(), DynValue::Str(rec.filtyp));
                    DynValue::Object(obj)
                })))
            }
            "err.failed" => Ok(DynValue::Bool(self.failed())),
            "err.reset" => {
                self.reset()?;
                Ok(DynValue::Null)
            }
            "err.getmsg" => {
                let kind = arg_str(args, op, 0)?;
                Ok(DynValue::Str(self.getmsg(kind)?))
            }
            "err.setmsg" => {
                let msg = arg_str(args, op, 0)?;
                self.setmsg(msg)?;
                Ok(DynValue::Null)
            }
            "err.sigerr" => {
                let short = arg_str(args, op, 0)?;
                self.sigerr(short)?;
                Ok(DynValue::Null)
            }
            "err.chkin" => {
                let name = arg_str(args, op, 0)?;
                self.chkin(name)?;
                Ok(DynValue::Null)
            }
            "err.chkout" => {
                let name = arg_str(args, op, 0)?;
                self.chkout(name)?;
                Ok(DynValue::Null)
            }
            _ => UnsupportedCallSnafu { op: op.to_string() }.fail().map_err(Into::into),
        }
    }
}

fn surface_point_to_dyn(sp: crate::geometry::SurfacePoint) -> DynValue {
    let mut obj = BTreeMap::new();
    obj.insert("spoint".to_string(), DynValue::from_vector3(sp.spoint));
    obj.insert("srfvec".to_string(), DynValue::from_vector3(sp.srfvec));
    obj.insert("trgepc".to_string(), DynValue::Float(sp.trgepc.as_seconds()));
    DynValue::Object(obj)
}

fn float_array_arg(args: &[DynValue], op: &str, idx: usize) -> Result<Vec<f64>, SpiceError> {
    let a = arg(args, op, idx)?.as_array().ok_or_else(|| {
        InvalidArgsSnafu {
            op: op.to_string(),
            expected: idx + 1,
            got: args.len(),
        }
        .build()
    })?;
    a.iter()
        .map(|v| v.as_f64())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            InvalidArgsSnafu {
                op: op.to_string(),
                expected: idx + 1,
                got: args.len(),
            }
            .build()
            .into()
        })
}

fn int_array_arg(args: &[DynValue], op: &str, idx: usize) -> Result<Vec<i64>, SpiceError> {
    Ok(float_array_arg(args, op, idx)?.into_iter().map(|v| v as i64).collect())
}

fn str_array_arg(args: &[DynValue], op: &str, idx: usize) -> Result<Vec<String>, SpiceError> {
    let a = arg(args, op, idx)?.as_array().ok_or_else(|| {
        InvalidArgsSnafu {
            op: op.to_string(),
            expected: idx + 1,
            got: args.len(),
        }
        .build()
    })?;
    a.iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            InvalidArgsSnafu {
                op: op.to_string(),
                expected: idx + 1,
                got: args.len(),
            }
            .build()
            .into()
        })
}

/// A type-erased, owned handle to any `SpiceBackend` implementor -- the
/// case runner and harness hold one of these rather than being generic
/// over the concrete backend type.
pub type Backend = Box<dyn SpiceBackend>;

#[cfg(test)]
mod ut_backend {
    use super::*;

    #[test]
    fn found_map_preserves_no() {
        let f: Found<i32> = Found::No;
        assert_eq!(f.map(|v| v + 1), Found::No);
    }

    #[test]
    fn found_map_applies_to_yes() {
        let f = Found::Yes(41);
        assert_eq!(f.map(|v| v + 1), Found::Yes(42));
    }

    #[test]
    fn matrix3_flattens_row_major() {
        let m = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        assert_eq!(
            DynValue::from_matrix3(m),
            DynValue::Mat3([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0])
        );
    }

    #[test]
    fn dyn_value_accepts_plain_array_as_vector3() {
        let v = DynValue::Array(vec![DynValue::Float(1.0), DynValue::Int(2), DynValue::Float(3.0)]);
        assert_eq!(v.as_vector3(), Some(Vector3::new(1.0, 2.0, 3.0)));
    }
}
