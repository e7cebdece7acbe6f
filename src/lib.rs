/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate hifitime;
extern crate log;

pub use hifitime::Epoch;

pub mod backend;
pub mod bodies;
pub mod cli;
pub mod compare;
pub mod config;
pub mod errors;
pub mod errstate;
pub mod ephemeris;
pub mod frames;
pub mod harness;
pub mod kernel;
pub mod math;
pub mod pool;
pub mod runner;
pub mod time;

mod geometry;

pub use geometry::{IlluminationAngles, OccultationCode, SurfacePoint};

pub mod prelude {
    pub use crate::backend::{Backend, DynValue, Found, SpiceBackend};
    pub use crate::errors::SpiceError;
    pub use crate::time::EphemerisTime;
    pub use crate::{IlluminationAngles, OccultationCode, SurfacePoint};
}
