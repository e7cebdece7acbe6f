/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// The smallest difference between two radians is set to one milliarcsecond, or about 2.8e-7 degrees.
pub const EPSILON_RAD: f64 = 4.8e-9;

mod dcm;
pub use dcm::{axisar, reduce_axis, rotate};
