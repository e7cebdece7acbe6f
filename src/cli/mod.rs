/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use snafu::prelude::*;
use std::io;
use std::path::PathBuf;

use crate::config::ConfigError;

pub mod args;
pub mod inspect;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CliErrors {
    #[snafu(display("case file not found or unreadable at {path:?}: {source}"))]
    CaseFileNotFound { path: PathBuf, source: io::Error },
    #[snafu(display("could not parse case file {path:?} as a case or an array of cases: {source}"))]
    CaseFileMalformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("{source}"))]
    Config { source: ConfigError },
    #[snafu(display("at least one case must be present in {path:?}"))]
    EmptyCaseFile { path: PathBuf },
}

impl From<ConfigError> for CliErrors {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}
