/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::process::ExitCode;

use clap::Parser;
use snafu::prelude::*;
use spice_core::backend::FakeBackend;
use spice_core::cli::args::{Actions, Args};
use spice_core::cli::inspect::KernelReport;
use spice_core::cli::{CaseFileMalformedSnafu, CaseFileNotFoundSnafu, CliErrors, EmptyCaseFileSnafu};
use spice_core::compare::CompareOptions;
use spice_core::config::RunnerConfig;
use spice_core::harness::{exit_code, render_report, run_cases};
use spice_core::runner::Case;

fn load_cases(path: &std::path::Path) -> Result<Vec<(String, Case)>, CliErrors> {
    let text = std::fs::read_to_string(path).context(CaseFileNotFoundSnafu { path })?;
    let value: serde_json::Value =
        serde_json::from_str(&text).context(CaseFileMalformedSnafu { path })?;

    let raw_cases: Vec<serde_json::Value> = match value {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };

    let mut cases = Vec::with_capacity(raw_cases.len());
    for (i, raw) in raw_cases.into_iter().enumerate() {
        let case: Case = serde_json::from_value(raw).context(CaseFileMalformedSnafu { path })?;
        let name = format!("{}#{}", path.display(), i);
        cases.push((name, case));
    }
    ensure!(!cases.is_empty(), EmptyCaseFileSnafu { path: path.to_path_buf() });
    Ok(cases)
}

fn run(args: Args) -> Result<i32, CliErrors> {
    let mut config = match &args.config {
        Some(path) => RunnerConfig::from_toml_file(path)?,
        None => RunnerConfig::default(),
    };

    match args.action {
        Actions::Run {
            cases,
            native,
            tol_abs,
            tol_rel,
            angle_wrap_pi,
        } => {
            config.tol_abs = tol_abs;
            config.tol_rel = tol_rel;
            config.angle_wrap_pi = angle_wrap_pi;

            let case_list = load_cases(&cases)?;
            let mut fake = FakeBackend::new();
            let opts: CompareOptions = config.compare_options();

            #[cfg(feature = "native")]
            {
                if native {
                    let mut native_backend = spice_core::backend::NativeBackend::new();
                    let reports = run_cases(&case_list, &mut fake, Some(&mut native_backend), &opts);
                    println!("{}", render_report(&reports));
                    return Ok(exit_code(&reports));
                }
            }
            #[cfg(not(feature = "native"))]
            {
                if native {
                    eprintln!("warning: --native requires building with --features native; running fake-only");
                }
            }

            let reports = run_cases(&case_list, &mut fake, None, &opts);
            println!("{}", render_report(&reports));
            Ok(exit_code(&reports))
        }
        Actions::Inspect { kernel } => match KernelReport::load(&kernel) {
            Ok(report) => {
                println!("{report}");
                Ok(0)
            }
            Err(e) => {
                eprintln!("error inspecting {kernel:?}: {e}");
                Ok(2)
            }
        },
    }
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let args = Args::parse();
    match run(args) {
        Ok(0) => ExitCode::from(0),
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
    }
}
