/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The verification harness: drives a `FakeBackend` and (with
//! `feature = "native"`) a `NativeBackend` over the same case list,
//! collects comparator output, and renders a `tabled` summary, the same
//! reporting style the teacher's `cli::inspect` uses for DAF summaries.

use crate::backend::SpiceBackend;
use crate::compare::{compare, CompareOptions, Mismatch};
use crate::runner::{run_case, Case, CaseOutcome};
use tabled::{settings::Style, Table, Tabled};

#[derive(Clone, Debug, PartialEq)]
pub struct CaseReport {
    pub case_name: String,
    pub status: CaseStatus,
    pub mismatches: Vec<Mismatch>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseStatus {
    Match,
    Mismatch,
    FakeError,
    NativeError,
    BothError,
}

#[derive(Tabled)]
struct SummaryRow {
    case: String,
    status: String,
    mismatches: usize,
}

/// Runs one case against the fake backend (and, when `native` is supplied,
/// the native backend too) and compares the two outcomes.
fn run_one(
    name: &str,
    case: &Case,
    fake: &mut dyn SpiceBackend,
    native: Option<&mut dyn SpiceBackend>,
    opts: &CompareOptions,
) -> CaseReport {
    let fake_outcome = run_case(fake, case);

    let Some(native) = native else {
        let (status, mismatches) = match &fake_outcome {
            CaseOutcome::Ok { .. } => (CaseStatus::Match, Vec::new()),
            CaseOutcome::Err { message, .. } => (
                CaseStatus::FakeError,
                vec![Mismatch {
                    path: "$".to_string(),
                    actual: message.clone(),
                    expected: "ok".to_string(),
                    message: "fake backend raised an error".to_string(),
                }],
            ),
        };
        return CaseReport {
            case_name: name.to_string(),
            status,
            mismatches,
        };
    };

    let native_outcome = run_case(native, case);

    match (&fake_outcome, &native_outcome) {
        (CaseOutcome::Ok { result: fake_result }, CaseOutcome::Ok { result: native_result }) => {
            let mismatches = compare(fake_result, native_result, opts);
            let status = if mismatches.is_empty() {
                CaseStatus::Match
            } else {
                CaseStatus::Mismatch
            };
            CaseReport {
                case_name: name.to_string(),
                status,
                mismatches,
            }
        }
        (CaseOutcome::Err { message, .. }, CaseOutcome::Ok { .. }) => CaseReport {
            case_name: name.to_string(),
            status: CaseStatus::FakeError,
            mismatches: vec![asymmetric_mismatch("fake", message)],
        },
        (CaseOutcome::Ok { .. }, CaseOutcome::Err { message, .. }) => CaseReport {
            case_name: name.to_string(),
            status: CaseStatus::NativeError,
            mismatches: vec![asymmetric_mismatch("native", message)],
        },
        (CaseOutcome::Err { message: fm, .. }, CaseOutcome::Err { message: nm, .. }) => CaseReport {
            case_name: name.to_string(),
            status: CaseStatus::BothError,
            mismatches: vec![Mismatch {
                path: "$".to_string(),
                actual: fm.clone(),
                expected: nm.clone(),
                message: "both backends raised an error".to_string(),
            }],
        },
    }
}

fn asymmetric_mismatch(side: &str, message: &str) -> Mismatch {
    Mismatch {
        path: "$".to_string(),
        actual: message.to_string(),
        expected: "ok".to_string(),
        message: format!("{side} backend raised an error while the other produced a value"),
    }
}

/// Drives a case list through [`run_one`] and returns one report per case.
pub fn run_cases(
    cases: &[(String, Case)],
    fake: &mut dyn SpiceBackend,
    native: Option<&mut dyn SpiceBackend>,
    opts: &CompareOptions,
) -> Vec<CaseReport> {
    match native {
        Some(native) => cases
            .iter()
            .map(|(name, case)| run_one(name, case, fake, Some(native), opts))
            .collect(),
        None => cases
            .iter()
            .map(|(name, case)| run_one(name, case, fake, None, opts))
            .collect(),
    }
}

fn status_label(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Match => "ok",
        CaseStatus::Mismatch => "mismatch",
        CaseStatus::FakeError => "fake-error",
        CaseStatus::NativeError => "native-error",
        CaseStatus::BothError => "both-error",
    }
}

/// Renders the summary table plus a detailed mismatch listing.
pub fn render_report(reports: &[CaseReport]) -> String {
    let rows: Vec<SummaryRow> = reports
        .iter()
        .map(|r| SummaryRow {
            case: r.case_name.clone(),
            status: status_label(r.status).to_string(),
            mismatches: r.mismatches.len(),
        })
        .collect();

    let mut out = Table::new(rows).with(Style::rounded()).to_string();

    for report in reports {
        if report.mismatches.is_empty() {
            continue;
        }
        out.push_str(&format!("\n\n{}:\n", report.case_name));
        for m in &report.mismatches {
            out.push_str(&format!(
                "  {} : expected {} got {} ({})\n",
                m.path, m.expected, m.actual, m.message
            ));
        }
    }
    out
}

/// `0` if every case matched, `1` if any mismatched, matching the CLI's
/// exit-code contract.
pub fn exit_code(reports: &[CaseReport]) -> i32 {
    if reports.iter().all(|r| r.status == CaseStatus::Match) {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod ut_harness {
    use super::*;
    use crate::backend::FakeBackend;

    fn case(call: &str, args: Vec<serde_json::Value>) -> Case {
        Case {
            call: call.to_string(),
            args,
            setup: None,
        }
    }

    #[test]
    fn fake_only_run_reports_ok_for_successful_case() {
        let mut fake = FakeBackend::new();
        let cases = vec![(
            "str2et".to_string(),
            case("time.str2et", vec![serde_json::json!("2000-01-01T12:00:00.000Z")]),
        )];
        let reports = run_cases(&cases, &mut fake, None, &CompareOptions::default());
        assert_eq!(reports[0].status, CaseStatus::Match);
        assert_eq!(exit_code(&reports), 0);
    }

    #[test]
    fn fake_only_run_reports_error_for_unsupported_call() {
        let mut fake = FakeBackend::new();
        let cases = vec![("bad".to_string(), case("nope.nope", vec![]))];
        let reports = run_cases(&cases, &mut fake, None, &CompareOptions::default());
        assert_eq!(reports[0].status, CaseStatus::FakeError);
        assert_eq!(exit_code(&reports), 1);
    }

    #[test]
    fn render_report_lists_mismatches_for_failing_cases() {
        let mut fake = FakeBackend::new();
        let cases = vec![("bad".to_string(), case("nope.nope", vec![]))];
        let reports = run_cases(&cases, &mut fake, None, &CompareOptions::default());
        let rendered = render_report(&reports);
        assert!(rendered.contains("bad"));
    }
}
