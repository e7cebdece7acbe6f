/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(name = "spice-check", author, version, about, long_about = None)]
pub struct Args {
    /// Optional TOML config file (tolerances, case root); overridden by flags.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub action: Actions,
}

#[derive(Debug, Subcommand)]
pub enum Actions {
    /// Runs a case file (single case or JSON array of cases) against the
    /// fake backend, and the native backend when `--native` is set.
    Run {
        /// Path to the case file
        cases: PathBuf,
        /// Also run each case against the native (CSPICE) backend and
        /// compare results; requires the `native` feature.
        #[clap(long)]
        native: bool,
        #[clap(long, default_value_t = 1e-9)]
        tol_abs: f64,
        #[clap(long, default_value_t = 1e-9)]
        tol_rel: f64,
        #[clap(long)]
        angle_wrap_pi: bool,
    },
    /// Loads a single kernel into a throwaway backend and prints its
    /// inferred kind and registry record.
    Inspect {
        /// Path to a kernel file
        kernel: PathBuf,
    },
}
