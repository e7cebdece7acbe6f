/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The deterministic reference backend: composes the kernel pool, kernel
//! registry, error state machine, and the toy ephemeris/frame/geometry
//! free functions behind the [`SpiceBackend`] trait. Owns no global state --
//! every method takes `&mut self`.

use crate::backend::{Found, SpiceBackend};
use crate::bodies::{bodc2n, bodn2c};
use crate::errors::SpiceError;
use crate::errstate::{MsgKind, SpiceErrorState};
use crate::ephemeris::{spkezr, spkpos};
use crate::frames::transform::{pxform, sxform};
use crate::frames::{frame_by_name, frmnam, namfrm};
use crate::geometry;
use crate::kernel::{KernelKind, KernelRecord, KernelRegistry};
use crate::math::{Matrix3, Matrix6, Vector3, Vector6};
use crate::pool::KernelPool;
use crate::time::{et2utc, str2et, EphemerisTime};
use log::trace;
use std::path::Path;

#[derive(Default)]
pub struct FakeBackend {
    pool: KernelPool,
    registry: KernelRegistry,
    errors: SpiceErrorState,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve_frame(&self, name: &str) -> Result<crate::frames::Frame, SpiceError> {
        match frame_by_name(name) {
            Found::Yes(f) => Ok(f),
            Found::No => crate::errors::UnknownFrameSnafu { name: name.to_string() }
                .fail()
                .map_err(Into::into),
        }
    }

    fn resolve_body_id(&self, name: &str) -> Result<i32, SpiceError> {
        match bodn2c(name) {
            Found::Yes(id) => Ok(id),
            Found::No => crate::errors::UnknownBodySnafu { name: name.to_string() }
                .fail()
                .map_err(Into::into),
        }
    }

    fn parse_kind(kind: &str) -> KernelKind {
        match kind.to_ascii_uppercase().as_str() {
            "SPK" => KernelKind::Spk,
            "CK" => KernelKind::Ck,
            "PCK" => KernelKind::Pck,
            "DSK" => KernelKind::Dsk,
            "TEXT" => KernelKind::Text,
            "LSK" => KernelKind::Lsk,
            "FK" => KernelKind::Fk,
            "IK" => KernelKind::Ik,
            "SCLK" => KernelKind::Sclk,
            "EK" => KernelKind::Ek,
            "META" => KernelKind::Meta,
            "ALL" => KernelKind::All,
            _ => KernelKind::Unknown,
        }
    }
}

impl SpiceBackend for FakeBackend {
    fn str2et(&mut self, s: &str) -> Result<EphemerisTime, SpiceError> {
        Ok(str2et(s)?)
    }

    fn et2utc(&mut self, et: EphemerisTime, format: &str, prec: u8) -> Result<String, SpiceError> {
        Ok(et2utc(et, format, prec)?)
    }

    fn bodn2c(&mut self, name: &str) -> Found<i32> {
        bodn2c(name)
    }

    fn bodc2n(&mut self, id: i32) -> Found<String> {
        bodc2n(id).map(str::to_string)
    }

    fn namfrm(&mut self, name: &str) -> Found<i32> {
        namfrm(name)
    }

    fn frmnam(&mut self, code: i32) -> Found<String> {
        frmnam(code).map(str::to_string)
    }

    fn pxform(&mut self, from: &str, to: &str, et: EphemerisTime) -> Result<Matrix3, SpiceError> {
        let from = self.resolve_frame(from)?;
        let to = self.resolve_frame(to)?;
        Ok(pxform(from, to, et))
    }

    fn sxform(&mut self, from: &str, to: &str, et: EphemerisTime) -> Result<Matrix6, SpiceError> {
        let from = self.resolve_frame(from)?;
        let to = self.resolve_frame(to)?;
        Ok(sxform(from, to, et))
    }

    fn spkezr(
        &mut self,
        target: &str,
        et: EphemerisTime,
        _frame: &str,
        abcorr: &str,
        observer: &str,
    ) -> Result<Vector6, SpiceError> {
        let target_id = self.resolve_body_id(target)?;
        let observer_id = self.resolve_body_id(observer)?;
        spkezr(target_id, et, observer_id, abcorr)
            .ok_or_else(|| crate::errors::UnknownBodySnafu { name: target.to_string() }.build().into())
    }

    fn spkpos(
        &mut self,
        target: &str,
        et: EphemerisTime,
        frame: &str,
        abcorr: &str,
        observer: &str,
    ) -> Result<Vector3, SpiceError> {
        Ok(self
            .spkezr(target, et, frame, abcorr, observer)?
            .fixed_rows::<3>(0)
            .into_owned())
    }

    fn subpnt(
        &mut self,
        method: &str,
        target: &str,
        et: EphemerisTime,
        fixref: &str,
        abcorr: &str,
        observer: &str,
    ) -> Result<geometry::SurfacePoint, SpiceError> {
        trace!("geom.subpnt target={target} observer={observer}");
        geometry::subpnt(method, target, et, fixref, abcorr, observer)
            .ok_or_else(|| crate::errors::UnknownBodySnafu { name: target.to_string() }.build().into())
    }

    fn subslr(
        &mut self,
        method: &str,
        target: &str,
        et: EphemerisTime,
        fixref: &str,
        abcorr: &str,
    ) -> Result<geometry::SurfacePoint, SpiceError> {
        geometry::subslr(method, target, et, fixref, abcorr)
            .ok_or_else(|| crate::errors::UnknownBodySnafu { name: target.to_string() }.build().into())
    }

    fn ilumin(
        &mut self,
        method: &str,
        target: &str,
        et: EphemerisTime,
        fixref: &str,
        abcorr: &str,
        observer: &str,
        spoint: Vector3,
    ) -> Result<geometry::IlluminationAngles, SpiceError> {
        geometry::ilumin(method, target, et, fixref, abcorr, observer, spoint)
            .ok_or_else(|| crate::errors::UnknownBodySnafu { name: target.to_string() }.build().into())
    }

    fn occult(
        &mut self,
        target_a: &str,
        target_b: &str,
        et: EphemerisTime,
        observer: &str,
    ) -> Result<geometry::OccultationCode, SpiceError> {
        Ok(geometry::occult(target_a, target_b, et, observer))
    }

    fn put_double(&mut self, name: &str, values: Vec<f64>) -> Result<(), SpiceError> {
        Ok(self.pool.put_double(name, values)?)
    }

    fn put_int(&mut self, name: &str, values: Vec<i64>) -> Result<(), SpiceError> {
        Ok(self.pool.put_int(name, values)?)
    }

    fn put_char(&mut self, name: &str, values: Vec<String>) -> Result<(), SpiceError> {
        Ok(self.pool.put_char(name, values)?)
    }

    fn get_double(&mut self, name: &str, start: i32, room: i32) -> Result<Vec<f64>, SpiceError> {
        Ok(self.pool.get_double(name, start, room)?)
    }

    fn get_int(&mut self, name: &str, start: i32, room: i32) -> Result<Vec<i64>, SpiceError> {
        Ok(self.pool.get_int(name, start, room)?)
    }

    fn get_char(&mut self, name: &str, start: i32, room: i32) -> Result<Vec<String>, SpiceError> {
        Ok(self.pool.get_char(name, start, room)?)
    }

    fn get_names_matching(&mut self, template: &str, start: i32, room: i32) -> Result<Vec<String>, SpiceError> {
        Ok(self.pool.get_names_matching(template, start, room)?)
    }

    fn expool(&mut self, name: &str) -> bool {
        self.pool.exists(name)
    }

    fn dtpool(&mut self, name: &str) -> Found<(usize, bool)> {
        match self.pool.describe(name) {
            Some(d) => Found::Yes((d.len, d.is_numeric)),
            None => Found::No,
        }
    }

    fn swpool(&mut self, agent: &str, names: Vec<String>) {
        self.pool.watch(agent, names)
    }

    fn cvpool(&mut self, agent: &str) -> bool {
        self.pool.check_update(agent)
    }

    fn furnsh(&mut self, path: &str) -> Result<i32, SpiceError> {
        Ok(self.registry.furnsh_path(Path::new(path))?)
    }

    fn unload(&mut self, path: &str) -> Result<(), SpiceError> {
        self.registry.unload(Path::new(path));
        Ok(())
    }

    fn kclear(&mut self) -> Result<(), SpiceError> {
        self.registry.clear();
        self.pool.clear();
        Ok(())
    }

    fn ktotal(&mut self, kind: &str) -> Result<usize, SpiceError> {
        Ok(self.registry.ktotal(Self::parse_kind(kind)))
    }

    fn kdata(&mut self, index: usize, kind: &str) -> Found<KernelRecord> {
        match self.registry.kdata(index, Self::parse_kind(kind)) {
            Some(rec) => Found::Yes(rec.clone()),
            None => Found::No,
        }
    }

    fn failed(&mut self) -> bool {
        self.errors.failed()
    }

    fn reset(&mut self) -> Result<(), SpiceError> {
        self.errors.reset();
        Ok(())
    }

    fn getmsg(&mut self, kind: &str) -> Result<String, SpiceError> {
        let kind = match kind.to_ascii_uppercase().as_str() {
            "SHORT" => MsgKind::Short,
            "LONG" => MsgKind::Long,
            _ => MsgKind::Explain,
        };
        Ok(self.errors.getmsg(kind))
    }

    fn setmsg(&mut self, msg: &str) -> Result<(), SpiceError> {
        self.errors.setmsg(msg);
        Ok(())
    }

    fn sigerr(&mut self, short: &str) -> Result<(), SpiceError> {
        self.errors.sigerr(short);
        Ok(())
    }

    fn chkin(&mut self, name: &str) -> Result<(), SpiceError> {
        self.errors.chkin(name);
        Ok(())
    }

    fn chkout(&mut self, name: &str) -> Result<(), SpiceError> {
        self.errors.chkout(name);
        Ok(())
    }
}

#[cfg(test)]
mod ut_fake {
    use super::*;
    use crate::backend::DynValue;

    #[test]
    fn str2et_round_trips_through_dispatch() {
        let mut backend = FakeBackend::new();
        let et = backend
            .dispatch(
                "time.str2et",
                &[DynValue::Str("2000-01-01T12:00:00.000Z".to_string())],
            )
            .unwrap();
        assert_eq!(et, DynValue::Float(0.0));
    }

    #[test]
    fn bodn2c_unknown_body_is_not_found_not_error() {
        let mut backend = FakeBackend::new();
        let result = backend
            .dispatch("ids-names.bodn2c", &[DynValue::Str("PLUTO".to_string())])
            .unwrap();
        if let DynValue::Object(obj) = result {
            assert_eq!(obj.get("found"), Some(&DynValue::Bool(false)));
        } else {
            panic!("expected an object envelope");
        }
    }

    #[test]
    fn unsupported_op_is_an_error() {
        let mut backend = FakeBackend::new();
        assert!(backend.dispatch("nope.nope", &[]).is_err());
    }

    #[test]
    fn pxform_identity_for_same_frame() {
        let mut backend = FakeBackend::new();
        let m = backend.pxform("J2000", "J2000", EphemerisTime::from_seconds(123.0)).unwrap();
        assert_eq!(m, Matrix3::identity());
    }

    #[test]
    fn spkezr_unknown_target_is_an_error() {
        let mut backend = FakeBackend::new();
        assert!(backend
            .spkezr("PLUTO", EphemerisTime::from_seconds(0.0), "J2000", "NONE", "SUN")
            .is_err());
    }

    #[test]
    fn error_state_round_trips_through_backend() {
        let mut backend = FakeBackend::new();
        backend.setmsg("division by zero").unwrap();
        backend.sigerr("SPICE(DIVIDEBYZERO)").unwrap();
        assert!(backend.failed());
        assert_eq!(backend.getmsg("SHORT").unwrap(), "SPICE(DIVIDEBYZERO)");
        backend.reset().unwrap();
        assert!(!backend.failed());
    }

    #[test]
    fn kclear_empties_pool_and_registry() {
        let dir = tempfile::tempdir().unwrap();
        let kernel_path = dir.path().join("de440.bsp");
        std::fs::write(&kernel_path, b"").unwrap();

        let mut backend = FakeBackend::new();
        backend.put_double("X", vec![1.0]).unwrap();
        backend.furnsh(&kernel_path.to_string_lossy()).unwrap();
        backend.kclear().unwrap();
        assert_eq!(backend.ktotal("ALL").unwrap(), 0);
        assert!(!backend.expool("X"));
    }
}
