// crates/routewarden-core/tests/schema_validation.rs
// ============================================================================
// Module: Schema Validation Tests
// Description: Tests for the schema walk, coercions, and normalization.
// Purpose: Ensure defaults fill in, bad values surface, and the walk is
//          idempotent over its own output.
// Dependencies: routewarden-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises `validate_tree` over the policy schema: mandatory fields,
//! default filling, scalar coercions, option enforcement, prefix list
//! entries, RTT thresholds, and structural type mismatches.

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

use routewarden_core::Diagnostic;
use routewarden_core::policy_schema;
use routewarden_core::validate_tree;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn minimal_policy() -> Value {
    json!({
        "rs_as": 65500,
        "router_id": "192.0.2.1",
    })
}

fn validate(document: &Value) -> (Value, Vec<Diagnostic>) {
    validate_tree(policy_schema(), document)
}

fn pointer<'v>(config: &'v Value, path: &str) -> &'v Value {
    config.pointer(path).unwrap_or_else(|| panic!("missing pointer {path}"))
}

// ============================================================================
// SECTION: Defaults and Normalization
// ============================================================================

/// Verifies a minimal document validates cleanly with defaults filled in.
#[test]
fn validate_fills_defaults_for_minimal_document() {
    let (config, diagnostics) = validate(&minimal_policy());
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");

    assert_eq!(pointer(&config, "/rs_as"), &json!(65500));
    assert_eq!(pointer(&config, "/router_id"), &json!("192.0.2.1"));
    assert_eq!(pointer(&config, "/prepend_rs_as"), &json!(false));
    assert_eq!(pointer(&config, "/path_hiding"), &json!(true));
    assert_eq!(pointer(&config, "/filtering/next_hop/policy"), &json!("strict"));
    assert_eq!(pointer(&config, "/filtering/ipv4_pref_len"), &json!({"min": 8, "max": 24}));
    assert_eq!(pointer(&config, "/filtering/ipv6_pref_len"), &json!({"min": 12, "max": 48}));
    assert_eq!(pointer(&config, "/filtering/max_as_path_len"), &json!(32));
    assert_eq!(pointer(&config, "/filtering/irrdb/tag_as_set"), &json!(true));
    assert_eq!(pointer(&config, "/filtering/rpki/reject_invalid"), &json!(true));
    assert_eq!(pointer(&config, "/filtering/max_prefix/restart_after"), &json!(15));
    assert_eq!(pointer(&config, "/filtering/max_prefix/general_limit_ipv4"), &json!(170_000));
    assert_eq!(pointer(&config, "/filtering/reject_policy/policy"), &json!("reject"));
    assert_eq!(pointer(&config, "/blackhole_filtering/announce_to_client"), &json!(true));
    assert_eq!(pointer(&config, "/graceful_shutdown"), &json!({"enabled": false, "local_pref": 0}));
    assert_eq!(pointer(&config, "/rfc1997_wellknown_communities/policy"), &json!("pass"));

    // Optional fields without defaults become explicit nulls.
    assert_eq!(pointer(&config, "/rtt_thresholds"), &Value::Null);
    assert_eq!(pointer(&config, "/blackhole_filtering/policy_ipv4"), &Value::Null);
    assert_eq!(pointer(&config, "/custom_communities"), &Value::Null);

    // The communities section expands to every built-in tag.
    assert_eq!(
        pointer(&config, "/communities/blackholing"),
        &json!({"narrow": null, "wide": null, "extended": null})
    );
}

/// Verifies an explicit null behaves exactly like an absent field.
#[test]
fn validate_treats_null_as_absent() {
    let mut document = minimal_policy();
    document["gtsm"] = Value::Null;
    document["filtering"] = json!({"max_as_path_len": null});

    let (config, diagnostics) = validate(&document);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    assert_eq!(pointer(&config, "/gtsm"), &json!(false));
    assert_eq!(pointer(&config, "/filtering/max_as_path_len"), &json!(32));
}

/// Verifies validating an already-normalized tree changes nothing.
#[test]
fn validate_is_idempotent_over_its_output() {
    let mut document = minimal_policy();
    document["filtering"] = json!({
        "global_black_list_pref": [{"prefix": "192.0.2.0", "length": 24}],
    });
    document["rtt_thresholds"] = json!("5, 10, 50");

    let (normalized, diagnostics) = validate(&document);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");

    let (revalidated, rerun_diagnostics) = validate(&normalized);
    assert!(rerun_diagnostics.is_empty(), "unexpected diagnostics: {rerun_diagnostics:?}");
    assert_eq!(revalidated, normalized);
}

// ============================================================================
// SECTION: Mandatory Fields
// ============================================================================

/// Verifies the two mandatory root fields are reported when absent.
#[test]
fn validate_reports_missing_mandatory_fields() {
    let (config, diagnostics) = validate(&json!({}));

    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::MissingMandatoryField { path } if path == "rs_as"
    )));
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::MissingMandatoryField { path } if path == "router_id"
    )));

    // Mandatory fields with defaults fall back instead of erroring.
    assert_eq!(pointer(&config, "/filtering/rpki/reject_invalid"), &json!(true));
    assert_eq!(pointer(&config, "/graceful_shutdown/enabled"), &json!(false));
}

// ============================================================================
// SECTION: Unknown Fields
// ============================================================================

/// Verifies unknown keys are reported with their dotted path.
#[test]
fn validate_reports_unknown_fields() {
    let mut document = minimal_policy();
    document["no_such_option"] = json!(true);
    document["filtering"] = json!({"bogus": 1});

    let (_, diagnostics) = validate(&document);
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::UnknownField { path } if path == "no_such_option"
    )));
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::UnknownField { path } if path == "filtering.bogus"
    )));
}

// ============================================================================
// SECTION: Scalar Coercions
// ============================================================================

/// Verifies string-typed booleans and integers coerce to their JSON kinds.
#[test]
fn validate_coerces_scalar_strings() {
    let document = json!({
        "rs_as": "65500",
        "router_id": "192.0.2.1",
        "gtsm": "true",
        "passive": "false",
        "filtering": {"max_as_path_len": "48"},
    });

    let (config, diagnostics) = validate(&document);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    assert_eq!(pointer(&config, "/rs_as"), &json!(65500));
    assert_eq!(pointer(&config, "/gtsm"), &json!(true));
    assert_eq!(pointer(&config, "/passive"), &json!(false));
    assert_eq!(pointer(&config, "/filtering/max_as_path_len"), &json!(48));
}

/// Verifies IPv6 text is normalized to its canonical form.
#[test]
fn validate_canonicalizes_ip_addresses() {
    let mut document = minimal_policy();
    document["blackhole_filtering"] =
        json!({"rewrite_next_hop_ipv6": "2001:DB8:0:0:0:0:0:66"});

    let (config, diagnostics) = validate(&document);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    assert_eq!(
        pointer(&config, "/blackhole_filtering/rewrite_next_hop_ipv6"),
        &json!("2001:db8::66")
    );
}

/// Verifies family-bound address fields reject the other family.
#[test]
fn validate_rejects_wrong_address_family() {
    let document = json!({
        "rs_as": 65500,
        "router_id": "2001:db8::1",
    });

    let (_, diagnostics) = validate(&document);
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::TypeMismatch { path, expected, .. }
            if path == "router_id" && expected == "IPv4 address"
    )));
}

/// Verifies out-of-range integers are rejected with their bounds.
#[test]
fn validate_rejects_out_of_range_integers() {
    let mut document = minimal_policy();
    document["filtering"] = json!({"max_as_path_len": 65});

    let (_, diagnostics) = validate(&document);
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::TypeMismatch { path, expected, .. }
            if path == "filtering.max_as_path_len" && expected == "unsigned integer in 1..=64"
    )));
}

/// Verifies AS number fields reject zero.
#[test]
fn validate_rejects_as_number_zero() {
    let mut document = minimal_policy();
    document["filtering"] = json!({"transit_free": {"asns": [174, 0]}});

    let (_, diagnostics) = validate(&document);
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::TypeMismatch { path, .. } if path == "filtering.transit_free.asns.2"
    )));
}

// ============================================================================
// SECTION: Option Fields
// ============================================================================

/// Verifies out-of-set options are reported with the accepted set.
#[test]
fn validate_rejects_unknown_options() {
    let mut document = minimal_policy();
    document["filtering"] = json!({"next_hop": {"policy": "loose"}});

    let (_, diagnostics) = validate(&document);
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::InvalidOption { path, value, allowed }
            if path == "filtering.next_hop.policy"
                && value == "loose"
                && allowed.contains(&"strict")
    )));
}

/// Verifies non-string option values are rejected rather than coerced.
#[test]
fn validate_rejects_non_string_options() {
    let mut document = minimal_policy();
    document["filtering"] = json!({"reject_policy": {"policy": true}});

    let (_, diagnostics) = validate(&document);
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::InvalidOption { path, .. } if path == "filtering.reject_policy.policy"
    )));
}

// ============================================================================
// SECTION: Prefix Length Ranges
// ============================================================================

/// Verifies inverted and oversized prefix length pairs are rejected.
#[test]
fn validate_rejects_bad_prefix_length_ranges() {
    let mut document = minimal_policy();
    document["filtering"] = json!({"ipv4_pref_len": {"min": 25, "max": 24}});
    let (_, diagnostics) = validate(&document);
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::TypeMismatch { path, .. } if path == "filtering.ipv4_pref_len"
    )));

    let mut document = minimal_policy();
    document["filtering"] = json!({"ipv4_pref_len": {"min": 8, "max": 33}});
    let (_, diagnostics) = validate(&document);
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::TypeMismatch { path, expected, .. }
            if path == "filtering.ipv4_pref_len"
                && expected == "prefix length range with min <= max <= 32"
    )));
}

// ============================================================================
// SECTION: Prefix List Entries
// ============================================================================

/// Verifies a well-formed exclusion entry normalizes with its defaults.
#[test]
fn validate_normalizes_prefix_list_entries() {
    let mut document = minimal_policy();
    document["filtering"] = json!({
        "global_black_list_pref": [
            {"prefix": "192.0.2.0", "length": 24},
            {"prefix": "2001:db8::", "length": 32, "comment": "doc range", "exact": true},
        ],
    });

    let (config, diagnostics) = validate(&document);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    assert_eq!(
        pointer(&config, "/filtering/global_black_list_pref"),
        &json!([
            {"prefix": "192.0.2.0", "length": 24, "comment": null, "exact": false},
            {"prefix": "2001:db8::", "length": 32, "comment": "doc range", "exact": true},
        ])
    );
}

/// Verifies entry problems carry one-based list positions.
#[test]
fn validate_reports_prefix_entry_problems_with_positions() {
    let mut document = minimal_policy();
    document["filtering"] = json!({
        "global_black_list_pref": [
            {"prefix": "192.0.2.0", "length": 24},
            {"length": 24},
            {"prefix": "192.0.2.0", "length": 33},
        ],
    });

    let (_, diagnostics) = validate(&document);
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::MissingMandatoryField { path }
            if path == "filtering.global_black_list_pref.2.prefix"
    )));
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::TypeMismatch { path, expected, .. }
            if path == "filtering.global_black_list_pref.3.length"
                && expected == "prefix length in 0..=32"
    )));
}

// ============================================================================
// SECTION: RTT Thresholds
// ============================================================================

/// Verifies comma-separated threshold text is split into a numeric list.
#[test]
fn validate_splits_rtt_threshold_text() {
    let mut document = minimal_policy();
    document["rtt_thresholds"] = json!("5, 10, 50");

    let (config, diagnostics) = validate(&document);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    assert_eq!(pointer(&config, "/rtt_thresholds"), &json!([5, 10, 50]));
}

/// Verifies non-ascending thresholds are rejected.
#[test]
fn validate_rejects_non_ascending_rtt_thresholds() {
    let mut document = minimal_policy();
    document["rtt_thresholds"] = json!([5, 5, 10]);

    let (_, diagnostics) = validate(&document);
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::TypeMismatch { path, .. } if path == "rtt_thresholds"
    )));
}

// ============================================================================
// SECTION: Structural Mismatches
// ============================================================================

/// Verifies a scalar where a section belongs is reported and the section
/// still expands with its defaults.
#[test]
fn validate_expands_sections_despite_bad_input() {
    let mut document = minimal_policy();
    document["filtering"] = json!(5);

    let (config, diagnostics) = validate(&document);
    assert!(diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::TypeMismatch { path, expected, .. }
            if path == "filtering" && expected == "mapping"
    )));
    assert_eq!(pointer(&config, "/filtering/max_as_path_len"), &json!(32));
}
