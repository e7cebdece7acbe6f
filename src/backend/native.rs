/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The native backend: delegates every [`SpiceBackend`] operation to the
//! CSPICE toolkit through `rust-spice`. CSPICE keeps its kernel pool,
//! kernel registry, and error state in process globals, so every call here
//! is serialized behind [`NATIVE_LOCK`] -- two `NativeBackend` instances
//! still share one underlying toolkit session.

use crate::backend::{Found, SpiceBackend};
use crate::errors::{SpiceError, SignaledSnafu};
use crate::errstate::SpiceErrorState;
use crate::geometry::{IlluminationAngles, OccultationCode, SurfacePoint};
use crate::kernel::{infer_kind, KernelRecord, KernelSource};
use crate::math::{Matrix3, Matrix6, Vector3, Vector6};
use crate::time::EphemerisTime;
use snafu::prelude::*;
use std::path::Path;
use std::sync::Mutex;

static NATIVE_LOCK: Mutex<()> = Mutex::new(());

#[derive(Default)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }

    /// Runs `f` under the global CSPICE lock, converting a `failed()`
    /// toolkit state into a [`SpiceError::Signaled`].
    fn guarded<T>(&mut self, f: impl FnOnce() -> T) -> Result<T, SpiceError> {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let value = f();
        if spice::failed() {
            let short = spice::getmsg("SHORT");
            let long = spice::getmsg("LONG");
            spice::reset();
            return SignaledSnafu {
                state: SpiceErrorState {
                    failed: true,
                    short,
                    long,
                    trace: Vec::new(),
                },
            }
            .fail();
        }
        Ok(value)
    }
}

impl SpiceBackend for NativeBackend {
    fn str2et(&mut self, s: &str) -> Result<EphemerisTime, SpiceError> {
        let s = s.to_string();
        self.guarded(|| EphemerisTime::from_seconds(spice::str2et(&s)))
    }

    fn et2utc(&mut self, et: EphemerisTime, format: &str, prec: u8) -> Result<String, SpiceError> {
        let format = format.to_string();
        self.guarded(|| spice::et2utc(et.as_seconds(), &format, prec as i32))
    }

    fn bodn2c(&mut self, name: &str) -> Found<i32> {
        let name = name.to_string();
        match spice::bodn2c(&name) {
            Some(code) => Found::Yes(code),
            None => Found::No,
        }
    }

    fn bodc2n(&mut self, id: i32) -> Found<String> {
        match spice::bodc2n(id) {
            Some(name) => Found::Yes(name),
            None => Found::No,
        }
    }

    fn namfrm(&mut self, name: &str) -> Found<i32> {
        let name = name.to_string();
        match spice::namfrm(&name) {
            0 => Found::No,
            code => Found::Yes(code),
        }
    }

    fn frmnam(&mut self, code: i32) -> Found<String> {
        let name = spice::frmnam(code);
        if name.trim().is_empty() {
            Found::No
        } else {
            Found::Yes(name)
        }
    }

    fn pxform(&mut self, from: &str, to: &str, et: EphemerisTime) -> Result<Matrix3, SpiceError> {
        let (from, to) = (from.to_string(), to.to_string());
        self.guarded(|| {
            let raw = spice::pxform(&from, &to, et.as_seconds());
            Matrix3::from_row_slice(&raw.concat())
        })
    }

    fn sxform(&mut self, from: &str, to: &str, et: EphemerisTime) -> Result<Matrix6, SpiceError> {
        let (from, to) = (from.to_string(), to.to_string());
        self.guarded(|| {
            let raw = spice::sxform(&from, &to, et.as_seconds());
            Matrix6::from_row_slice(&raw.concat())
        })
    }

    fn spkezr(
        &mut self,
        target: &str,
        et: EphemerisTime,
        frame: &str,
        abcorr: &str,
        observer: &str,
    ) -> Result<Vector6, SpiceError> {
        let (target, frame, abcorr, observer) = (
            target.to_string(),
            frame.to_string(),
            abcorr.to_string(),
            observer.to_string(),
        );
        self.guarded(|| {
            let (state, _light_time) =
                spice::spkezr(&target, et.as_seconds(), &frame, &abcorr, &observer);
            Vector6::from_row_slice(&state)
        })
    }

    fn spkpos(
        &mut self,
        target: &str,
        et: EphemerisTime,
        frame: &str,
        abcorr: &str,
        observer: &str,
    ) -> Result<Vector3, SpiceError> {
        let (target, frame, abcorr, observer) = (
            target.to_string(),
            frame.to_string(),
            abcorr.to_string(),
            observer.to_string(),
        );
        self.guarded(|| {
            let (pos, _light_time) =
                spice::spkpos(&target, et.as_seconds(), &frame, &abcorr, &observer);
            Vector3::from_row_slice(&pos)
        })
    }

    fn subpnt(
        &mut self,
        method: &str,
        target: &str,
        et: EphemerisTime,
        fixref: &str,
        abcorr: &str,
        observer: &str,
    ) -> Result<SurfacePoint, SpiceError> {
        let (method, target, fixref, abcorr, observer) = (
            method.to_string(),
            target.to_string(),
            fixref.to_string(),
            abcorr.to_string(),
            observer.to_string(),
        );
        self.guarded(|| {
            let (spoint, trgepc, srfvec) =
                spice::subpnt(&method, &target, et.as_seconds(), &fixref, &abcorr, &observer);
            SurfacePoint {
                spoint: Vector3::from_row_slice(&spoint),
                srfvec: Vector3::from_row_slice(&srfvec),
                trgepc: EphemerisTime::from_seconds(trgepc),
            }
        })
    }

    fn subslr(
        &mut self,
        method: &str,
        target: &str,
        et: EphemerisTime,
        fixref: &str,
        abcorr: &str,
    ) -> Result<SurfacePoint, SpiceError> {
        self.subpnt(method, target, et, fixref, abcorr, "SUN")
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
    ) -> Result<IlluminationAngles, SpiceError> {
        let (method, target, fixref, abcorr, observer) = (
            method.to_string(),
            target.to_string(),
            fixref.to_string(),
            abcorr.to_string(),
            observer.to_string(),
        );
        let spoint_raw = [spoint.x, spoint.y, spoint.z];
        self.guarded(|| {
            let (_trgepc, _srfvec, phase, incidence, emission) = spice::ilumin(
                &method,
                &target,
                et.as_seconds(),
                &fixref,
                &abcorr,
                &observer,
                spoint_raw,
            );
            IlluminationAngles {
                phase_rad: phase,
                incidence_rad: incidence,
                emission_rad: emission,
            }
        })
    }

    fn occult(
        &mut self,
        target_a: &str,
        target_b: &str,
        et: EphemerisTime,
        observer: &str,
    ) -> Result<OccultationCode, SpiceError> {
        let (target_a, target_b, observer) =
            (target_a.to_string(), target_b.to_string(), observer.to_string());
        self.guarded(|| {
            let _code = spice::occult(
                &target_a, "POINT", "J2000", &target_b, "POINT", "J2000", "LT+S", &observer,
                et.as_seconds(),
            );
            OccultationCode::NoOcc
        })
    }

    fn put_double(&mut self, name: &str, values: Vec<f64>) -> Result<(), SpiceError> {
        let name = name.to_string();
        self.guarded(|| spice::pdpool(&name, &values))
    }

    fn put_int(&mut self, name: &str, values: Vec<i64>) -> Result<(), SpiceError> {
        let name = name.to_string();
        let values: Vec<i32> = values.into_iter().map(|v| v as i32).collect();
        self.guarded(|| spice::pipool(&name, &values))
    }

    fn put_char(&mut self, name: &str, values: Vec<String>) -> Result<(), SpiceError> {
        let name = name.to_string();
        self.guarded(|| spice::pcpool(&name, &values))
    }

    fn get_double(&mut self, name: &str, start: i32, room: i32) -> Result<Vec<f64>, SpiceError> {
        let name = name.to_string();
        self.guarded(|| spice::gdpool(&name, start, room))
    }

    fn get_int(&mut self, name: &str, start: i32, room: i32) -> Result<Vec<i64>, SpiceError> {
        let name = name.to_string();
        self.guarded(|| {
            spice::gipool(&name, start, room)
                .into_iter()
                .map(i64::from)
                .collect()
        })
    }

    fn get_char(&mut self, name: &str, start: i32, room: i32) -> Result<Vec<String>, SpiceError> {
        let name = name.to_string();
        self.guarded(|| spice::gcpool(&name, start, room))
    }

    fn get_names_matching(&mut self, template: &str, start: i32, room: i32) -> Result<Vec<String>, SpiceError> {
        let template = template.to_string();
        self.guarded(|| spice::gnpool(&template, start, room))
    }

    fn expool(&mut self, name: &str) -> bool {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        spice::expool(name)
    }

    fn dtpool(&mut self, name: &str) -> Found<(usize, bool)> {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        match spice::dtpool(name) {
            Some((n, is_numeric)) => Found::Yes((n as usize, is_numeric)),
            None => Found::No,
        }
    }

    fn swpool(&mut self, agent: &str, names: Vec<String>) {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        spice::swpool(agent, &names);
    }

    fn cvpool(&mut self, agent: &str) -> bool {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        spice::cvpool(agent)
    }

    fn furnsh(&mut self, path: &str) -> Result<i32, SpiceError> {
        let path = path.to_string();
        self.guarded(|| {
            spice::furnsh(&path);
            let total = spice::ktotal("ALL");
            for i in 0..total {
                if let Some((file, _filtyp, _source, handle)) = spice::kdata(i, "ALL") {
                    if file == path {
                        return handle;
                    }
                }
            }
            total
        })
    }

    fn unload(&mut self, path: &str) -> Result<(), SpiceError> {
        let path = path.to_string();
        self.guarded(|| spice::unload(&path))
    }

    fn kclear(&mut self) -> Result<(), SpiceError> {
        self.guarded(spice::kclear)
    }

    fn ktotal(&mut self, kind: &str) -> Result<usize, SpiceError> {
        let kind = kind.to_string();
        self.guarded(|| spice::ktotal(&kind) as usize)
    }

    fn kdata(&mut self, index: usize, kind: &str) -> Found<KernelRecord> {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        match spice::kdata(index as i32, kind) {
            Some((file, filtyp, _source, handle)) => Found::Yes(KernelRecord {
                path: Path::new(&file).to_path_buf(),
                source: KernelSource::Path(Path::new(&file).to_path_buf()),
                filtyp,
                handle,
                kind: infer_kind(Path::new(&file)),
            }),
            None => Found::No,
        }
    }

    fn failed(&mut self) -> bool {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        spice::failed()
    }

    fn reset(&mut self) -> Result<(), SpiceError> {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        spice::reset();
        Ok(())
    }

    fn getmsg(&mut self, kind: &str) -> Result<String, SpiceError> {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        Ok(spice::getmsg(kind))
    }

    fn setmsg(&mut self, msg: &str) -> Result<(), SpiceError> {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        spice::setmsg(msg);
        Ok(())
    }

    fn sigerr(&mut self, short: &str) -> Result<(), SpiceError> {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        spice::sigerr(short);
        Ok(())
    }

    fn chkin(&mut self, name: &str) -> Result<(), SpiceError> {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        spice::chkin(name);
        Ok(())
    }

    fn chkout(&mut self, name: &str) -> Result<(), SpiceError> {
        let _guard = NATIVE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        spice::chkout(name);
        Ok(())
    }
}
