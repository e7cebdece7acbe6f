/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::errstate::SpiceErrorState;
use snafu::prelude::*;
use std::path::PathBuf;

/// Errors raised by the time codec (`str2et`, `et2utc`, `timout`).
#[derive(Debug, Snafu, Clone, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum TimeError {
    #[snafu(display("could not parse {input:?} as an ISO-8601/RFC3339 UTC timestamp"))]
    Parse { input: String },
    #[snafu(display("fractional second precision {prec} is out of range [0, 12]"))]
    PrecisionOutOfRange { prec: u8 },
}

/// Errors raised by the kernel pool (`put*`, `get*`, `watch`, `check_update`).
#[derive(Debug, Snafu, Clone, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum PoolError {
    #[snafu(display("pool variable name must be non-empty after trimming"))]
    EmptyName,
    #[snafu(display("integer value {value} for {name:?} is out of signed 32-bit range"))]
    IntOutOfRange { name: String, value: i64 },
    #[snafu(display(
        "invalid get range: start={start}, room={room} (start must be >= 0, room must be > 0)"
    ))]
    InvalidRange { start: i32, room: i32 },
}

/// Errors raised by the kernel registry (`furnsh`, `unload`, `kclear`, `ktotal`, `kdata`).
#[derive(Debug, Snafu, Clone, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum RegistryError {
    #[snafu(display("kernel not found at {path:?}"))]
    NotFound { path: PathBuf },
    #[snafu(display("meta-kernel entry {entry:?} resolves outside of the sandbox root {root:?}"))]
    PathEscapesSandbox { entry: PathBuf, root: PathBuf },
    #[snafu(display("could not read kernel bytes from {path:?}: {reason}"))]
    Io { path: PathBuf, reason: String },
}

/// Errors raised by the frame transform engine (`pxform`, `sxform`).
#[derive(Debug, Snafu, Clone, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum FrameError {
    #[snafu(display("unknown reference frame {name:?}"))]
    UnknownFrame { name: String },
}

/// Errors raised by geometry operations (`subpnt`, `subslr`, `ilumin`, `occult`).
#[derive(Debug, Snafu, Clone, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum GeometryError {
    #[snafu(display("unknown body {name:?}"))]
    UnknownBody { name: String },
    #[snafu(display("target mean radius must be positive, got {radius_km}"))]
    NonPositiveRadius { radius_km: f64 },
    #[snafu(display("flattening must be less than 1.0, got {f}"))]
    DegenerateFlattening { f: f64 },
}

/// Errors raised while comparing two backend results.
#[derive(Debug, Snafu, Clone, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum CompareError {
    #[snafu(display(
        "tolerance must be finite and non-negative, got abs={tol_abs}, rel={tol_rel}"
    ))]
    InvalidTolerance { tol_abs: f64, tol_rel: f64 },
}

/// Errors raised by the case runner's dispatch and staging logic.
#[derive(Debug, Snafu, Clone, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum RunnerError {
    #[snafu(display("case envelope is malformed: {reason}"))]
    InvalidRequest { reason: String },
    #[snafu(display("operation {op:?} expected {expected} argument(s), got {got}"))]
    InvalidArgs {
        op: String,
        expected: usize,
        got: usize,
    },
    #[snafu(display("unsupported operation {op:?}"))]
    UnsupportedCall { op: String },
}

/// The crate-wide error, composing every subsystem error the way a
/// production SPICE binding layers its domain errors under one type.
#[derive(Debug, Snafu, Clone, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum SpiceError {
    #[snafu(display("{source}"))]
    Time { source: TimeError },
    #[snafu(display("{source}"))]
    Pool { source: PoolError },
    #[snafu(display("{source}"))]
    Registry { source: RegistryError },
    #[snafu(display("{source}"))]
    Frame { source: FrameError },
    #[snafu(display("{source}"))]
    Geometry { source: GeometryError },
    #[snafu(display("{source}"))]
    Compare { source: CompareError },
    #[snafu(display("{source}"))]
    Runner { source: RunnerError },
    /// The underlying SPICE library signaled a failure; `state` carries the
    /// captured `failed/short/long/trace` snapshot for the case runner.
    #[snafu(display("SPICE(FAILURE): {}", state.short))]
    Signaled { state: SpiceErrorState },
}

impl From<TimeError> for SpiceError {
    fn from(source: TimeError) -> Self {
        Self::Time { source }
    }
}

impl From<PoolError> for SpiceError {
    fn from(source: PoolError) -> Self {
        Self::Pool { source }
    }
}

impl From<RegistryError> for SpiceError {
    fn from(source: RegistryError) -> Self {
        Self::Registry { source }
    }
}

impl From<FrameError> for SpiceError {
    fn from(source: FrameError) -> Self {
        Self::Frame { source }
    }
}

impl From<GeometryError> for SpiceError {
    fn from(source: GeometryError) -> Self {
        Self::Geometry { source }
    }
}

impl From<CompareError> for SpiceError {
    fn from(source: CompareError) -> Self {
        Self::Compare { source }
    }
}

impl From<RunnerError> for SpiceError {
    fn from(source: RunnerError) -> Self {
        Self::Runner { source }
    }
}

pub type SpiceResult<T> = Result<T, SpiceError>;
