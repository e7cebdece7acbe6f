/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Runner configuration: tolerances and case root, optionally loaded from a
//! TOML file and overridden by CLI flags.

use crate::compare::CompareOptions;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("could not read config file {path:?}: {source}"))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("could not parse config file {path:?}: {source}"))]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub tol_abs: f64,
    pub tol_rel: f64,
    pub angle_wrap_pi: bool,
    pub case_root: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tol_abs: 1e-9,
            tol_rel: 1e-9,
            angle_wrap_pi: false,
            case_root: None,
        }
    }
}

impl RunnerConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        toml::from_str(&text).context(ParseSnafu { path })
    }

    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions::new(self.tol_abs, self.tol_rel, self.angle_wrap_pi)
            .unwrap_or_else(|_| CompareOptions::default())
    }
}

#[cfg(test)]
mod ut_config {
    use super::*;

    #[test]
    fn default_matches_documented_tolerances() {
        let cfg = RunnerConfig::default();
        assert_eq!(cfg.tol_abs, 1e-9);
        assert_eq!(cfg.tol_rel, 1e-9);
        assert!(cfg.case_root.is_none());
    }

    #[test]
    fn loads_from_toml_and_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner.toml");
        std::fs::write(&path, "tol_abs = 1e-6\nangle_wrap_pi = true\n").unwrap();
        let cfg = RunnerConfig::from_toml_file(&path).unwrap();
        assert_eq!(cfg.tol_abs, 1e-6);
        assert!(cfg.angle_wrap_pi);
        assert_eq!(cfg.tol_rel, 1e-9);
    }

    #[test]
    fn missing_file_is_reported() {
        let result = RunnerConfig::from_toml_file(Path::new("/nonexistent/runner.toml"));
        assert!(result.is_err());
    }
}
