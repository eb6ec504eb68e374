// crates/routewarden-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for bounded reads, document parsing, and reports.
// Purpose: Ensure CLI inputs fail closed and check reports reflect outcomes.
// Dependencies: routewarden-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Validates `read_bytes_with_limit` size enforcement, policy document
//! parsing in both formats, and the JSON report written by `command_check`.
//!
//! Security posture: CLI inputs are untrusted; size limits must fail closed.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use super::CheckCommand;
use super::PolicyFormatArg;
use super::ReadLimitError;
use super::command_check;
use super::parse_policy_document;
use super::read_bytes_with_limit;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn write_policy(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write policy fixture");
    path
}

fn check_args(policy: PathBuf, report_json: Option<PathBuf>) -> CheckCommand {
    CheckCommand {
        policy,
        format: PolicyFormatArg::Yaml,
        wildcard_scrub: false,
        report_json,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn read_bytes_with_limit_allows_small_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = write_policy(temp.path(), "small.yml", "rs_as: 65500\n");

    let bytes = read_bytes_with_limit(&path, 64).expect("read small file");
    assert_eq!(bytes, b"rs_as: 65500\n");
}

#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let limit = 8_usize;
    let path = temp.path().join("large.yml");
    fs::write(&path, vec![b'a'; limit + 1]).expect("write large file");

    let err = read_bytes_with_limit(&path, limit).expect_err("expected size limit failure");
    match err {
        ReadLimitError::TooLarge {
            size,
            limit: reported,
        } => {
            let limit_u64 = u64::try_from(limit).expect("limit fits");
            assert!(size > limit_u64);
            assert_eq!(reported, limit);
        }
        ReadLimitError::Io(err) => panic!("expected TooLarge, got Io: {err}"),
    }
}

#[test]
fn read_bytes_with_limit_reports_missing_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = temp.path().join("absent.yml");

    let err = read_bytes_with_limit(&path, 64).expect_err("expected io failure");
    assert!(matches!(err, ReadLimitError::Io(_)));
}

#[test]
fn parse_policy_document_accepts_yaml() {
    let bytes = b"rs_as: 65500\nrouter_id: 192.0.2.1\n";
    let document = parse_policy_document(bytes, PolicyFormatArg::Yaml, Path::new("policy.yml"))
        .expect("parse yaml");
    assert_eq!(document.get("rs_as").and_then(serde_json::Value::as_u64), Some(65_500));
}

#[test]
fn parse_policy_document_accepts_json() {
    let document = parse_policy_document(
        br#"{"rs_as": 65500, "router_id": "192.0.2.1"}"#,
        PolicyFormatArg::Json,
        Path::new("policy.json"),
    )
    .expect("parse json");
    assert_eq!(
        document.get("router_id").and_then(serde_json::Value::as_str),
        Some("192.0.2.1")
    );
}

#[test]
fn parse_policy_document_rejects_malformed_input() {
    let err = parse_policy_document(b"{ not json", PolicyFormatArg::Json, Path::new("bad.json"))
        .expect_err("expected parse failure");
    assert!(err.to_string().contains("bad.json"));
}

#[test]
fn command_check_writes_valid_report() {
    let temp = tempfile::tempdir().expect("temp dir");
    let policy = write_policy(temp.path(), "policy.yml", "rs_as: 65500\nrouter_id: 192.0.2.1\n");
    let report_path = temp.path().join("report.json");

    let command = check_args(policy, Some(report_path.clone()));
    command_check(&command).expect("check succeeds");

    let report = fs::read_to_string(&report_path).expect("read report");
    assert!(report.contains("\"outcome\": \"valid\""));
    assert!(report.contains("\"rtt_based_functions\": false"));
}

#[test]
fn command_check_reports_invalid_policy() {
    let temp = tempfile::tempdir().expect("temp dir");
    let policy = write_policy(temp.path(), "policy.yml", "router_id: 192.0.2.1\n");
    let report_path = temp.path().join("report.json");

    let command = check_args(policy, Some(report_path.clone()));
    command_check(&command).expect("check runs to completion");

    let report = fs::read_to_string(&report_path).expect("read report");
    assert!(report.contains("\"outcome\": \"invalid\""));
    assert!(report.contains("missing_mandatory_field"));
}

#[test]
fn command_check_flags_rtt_policies() {
    let temp = tempfile::tempdir().expect("temp dir");
    let contents = concat!(
        "rs_as: 65500\n",
        "router_id: 192.0.2.1\n",
        "rtt_thresholds: 5, 10, 15\n",
        "communities:\n",
        "  announce_to_peers_with_rtt_lower_than:\n",
        "    narrow: '65501:dyn_val'\n",
    );
    let policy = write_policy(temp.path(), "policy.yml", contents);
    let report_path = temp.path().join("report.json");

    let command = check_args(policy, Some(report_path.clone()));
    command_check(&command).expect("check succeeds");

    let report = fs::read_to_string(&report_path).expect("read report");
    assert!(report.contains("\"outcome\": \"valid\""));
    assert!(report.contains("\"rtt_based_functions\": true"));
}
