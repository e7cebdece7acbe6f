/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The case runner: per-case isolation (`kclear`/`reset` before and after),
//! kernel staging, dispatch, and failure capture into a [`CaseOutcome`].

use crate::backend::{DynValue, SpiceBackend};
use crate::errors::{SpiceError, InvalidRequestSnafu};
use crate::errstate::SpiceErrorState;
use crate::kernel::{parse_kernels_to_load, read_kernel_bytes, resolve_in_sandbox};
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KernelEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub restrict_to_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct CaseSetup {
    #[serde(default)]
    pub kernels: Vec<KernelEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub call: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    #[serde(default)]
    pub setup: Option<CaseSetup>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum StageMode {
    Path,
    Bytes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunnerErrorCode {
    InvalidRequest,
    InvalidArgs,
    UnsupportedCall,
    Domain,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CaseOutcome {
    Ok {
        result: DynValue,
    },
    Err {
        message: String,
        name: Option<String>,
        spice: Option<SpiceErrorState>,
        code: RunnerErrorCode,
    },
}

/// Runs the per-case teardown (`kclear` + `reset`) on drop, regardless of
/// whether the case completed, failed, or the caller unwound through a
/// panic.
struct CaseGuard<'a, B: SpiceBackend> {
    backend: &'a mut B,
}

impl<'a, B: SpiceBackend> Drop for CaseGuard<'a, B> {
    fn drop(&mut self) {
        let _ = self.backend.kclear();
        let _ = self.backend.reset();
    }
}

/// Parses a JSON value into the flat [`DynValue`] envelope. Only the plain
/// JSON shapes appear here (`Vec3`/`Mat3`/`Mat6`/`StateVector` are
/// dispatch-result-only variants).
fn json_to_dyn(value: &serde_json::Value) -> DynValue {
    match value {
        serde_json::Value::Null => DynValue::Null,
        serde_json::Value::Bool(b) => DynValue::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DynValue::Int(i)
            } else {
                DynValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => DynValue::Str(s.clone()),
        serde_json::Value::Array(a) => DynValue::Array(a.iter().map(json_to_dyn).collect()),
        serde_json::Value::Object(o) => {
            let map = o.iter().map(|(k, v)| (k.clone(), json_to_dyn(v))).collect();
            DynValue::Object(map)
        }
    }
}

fn stage_kernel_path(backend: &mut impl SpiceBackend, staged: &mut HashSet<(StageMode, PathBuf)>, path: &Path) -> Result<(), SpiceError> {
    let key = (StageMode::Path, path.to_path_buf());
    if staged.contains(&key) {
        return Ok(());
    }
    trace!("staging kernel (path) {path:?}");
    backend.furnsh(&path.to_string_lossy())?;
    staged.insert(key);
    Ok(())
}

fn stage_meta_kernel(
    backend: &mut impl SpiceBackend,
    staged: &mut HashSet<(StageMode, PathBuf)>,
    path: &Path,
    restrict_to_dir: &Path,
) -> Result<(), SpiceError> {
    let meta_text = String::from_utf8_lossy(&read_kernel_bytes(path)?).into_owned();
    for entry in parse_kernels_to_load(&meta_text) {
        let resolved = resolve_in_sandbox(&entry, restrict_to_dir)?;
        let key = (StageMode::Bytes, resolved.clone());
        if staged.contains(&key) {
            continue;
        }
        trace!("staging meta-kernel entry {resolved:?}");
        backend.furnsh(&resolved.to_string_lossy())?;
        staged.insert(key);
    }
    Ok(())
}

/// Stages every kernel named by a case's `setup` into `backend`, expanding
/// meta-kernels against their `restrict_to_dir` sandbox root.
pub fn stage_kernels(backend: &mut impl SpiceBackend, setup: &CaseSetup) -> Result<(), SpiceError> {
    let mut staged = HashSet::new();
    for entry in &setup.kernels {
        match &entry.restrict_to_dir {
            Some(root) => stage_meta_kernel(backend, &mut staged, &entry.path, root)?,
            None => stage_kernel_path(backend, &mut staged, &entry.path)?,
        }
    }
    Ok(())
}

/// Extracts a `SPICE(SYMBOL)` short-name token from a thrown message, if
/// present.
fn extract_spice_symbol(message: &str) -> Option<String> {
    let start = message.find("SPICE(")?;
    let rest = &message[start..];
    let end = rest.find(')')?;
    Some(rest[..=end].to_string())
}

fn classify(err: &SpiceError) -> RunnerErrorCode {
    match err {
        SpiceError::Runner {
            source: crate::errors::RunnerError::InvalidRequest { .. },
        } => RunnerErrorCode::InvalidRequest,
        SpiceError::Runner {
            source: crate::errors::RunnerError::InvalidArgs { .. },
        } => RunnerErrorCode::InvalidArgs,
        SpiceError::Runner {
            source: crate::errors::RunnerError::UnsupportedCall { .. },
        } => RunnerErrorCode::UnsupportedCall,
        _ => RunnerErrorCode::Domain,
    }
}

/// Runs one case against `backend`, guaranteeing `kclear`/`reset` teardown
/// via [`CaseGuard`] regardless of outcome.
pub fn run_case(backend: &mut impl SpiceBackend, case: &Case) -> CaseOutcome {
    let guard = CaseGuard { backend };
    run_case_inner(guard.backend, case)
}

fn run_case_inner(backend: &mut impl SpiceBackend, case: &Case) -> CaseOutcome {
    if case.call.trim().is_empty() {
        return CaseOutcome::Err {
            message: InvalidRequestSnafu {
                reason: "call must be a non-empty operation name".to_string(),
            }
            .build()
            .to_string(),
            name: None,
            spice: None,
            code: RunnerErrorCode::InvalidRequest,
        };
    }

    if let Some(setup) = &case.setup {
        if let Err(e) = stage_kernels(backend, setup) {
            return CaseOutcome::Err {
                message: e.to_string(),
                name: None,
                spice: None,
                code: classify(&e),
            };
        }
    }

    let args: Vec<DynValue> = case.args.iter().map(json_to_dyn).collect();

    match backend.dispatch(&case.call, &args) {
        Ok(result) => CaseOutcome::Ok { result },
        Err(err) => {
            warn!("case {:?} failed: {err}", case.call);
            let spice = if backend.failed() {
                Some(SpiceErrorState {
                    failed: true,
                    short: backend.getmsg("SHORT").unwrap_or_default(),
                    long: backend.getmsg("LONG").unwrap_or_default(),
                    trace: Vec::new(),
                })
            } else {
                None
            };
            let message = if let Some(s) = &spice {
                backend.getmsg("EXPLAIN").unwrap_or_else(|_| s.long.clone())
            } else {
                err.to_string()
            };
            CaseOutcome::Err {
                name: extract_spice_symbol(&message),
                message,
                spice,
                code: classify(&err),
            }
        }
    }
}

#[cfg(test)]
mod ut_runner {
    use super::*;
    use crate::backend::FakeBackend;

    #[test]
    fn empty_call_is_invalid_request() {
        let mut backend = FakeBackend::new();
        let case = Case {
            call: "".to_string(),
            args: vec![],
            setup: None,
        };
        let outcome = run_case(&mut backend, &case);
        assert!(matches!(
            outcome,
            CaseOutcome::Err {
                code: RunnerErrorCode::InvalidRequest,
                ..
            }
        ));
    }

    #[test]
    fn unsupported_call_is_reported() {
        let mut backend = FakeBackend::new();
        let case = Case {
            call: "nope.nope".to_string(),
            args: vec![],
            setup: None,
        };
        let outcome = run_case(&mut backend, &case);
        assert!(matches!(
            outcome,
            CaseOutcome::Err {
                code: RunnerErrorCode::UnsupportedCall,
                ..
            }
        ));
    }

    #[test]
    fn successful_case_returns_ok_result() {
        let mut backend = FakeBackend::new();
        let case = Case {
            call: "time.str2et".to_string(),
            args: vec![serde_json::json!("2000-01-01T12:00:00.000Z")],
            setup: None,
        };
        let outcome = run_case(&mut backend, &case);
        assert_eq!(outcome, CaseOutcome::Ok { result: DynValue::Float(0.0) });
    }

    #[test]
    fn teardown_clears_pool_between_cases() {
        let mut backend = FakeBackend::new();
        let setup_case = Case {
            call: "pool.putd".to_string(),
            args: vec![serde_json::json!("X"), serde_json::json!([1.0])],
            setup: None,
        };
        run_case(&mut backend, &setup_case);
        assert!(!backend.expool("X"));
    }

    #[test]
    fn extracts_spice_symbol_from_message() {
        assert_eq!(
            extract_spice_symbol("failure: SPICE(DIVIDEBYZERO) occurred"),
            Some("SPICE(DIVIDEBYZERO)".to_string())
        );
        assert_eq!(extract_spice_symbol("no symbol here"), None);
    }
}
