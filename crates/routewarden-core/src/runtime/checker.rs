// crates/routewarden-core/src/runtime/checker.rs
// ============================================================================
// Module: Policy Checker
// Description: Orchestrates validation of a route-server policy document.
// Purpose: Run the schema walk, parse community values, enforce cross-field
//          invariants, and aggregate every finding into one outcome.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Checking runs in two phases. The structural phase walks the policy
//! schema and parses every configured community into its typed value; any
//! structural finding is fatal and semantic checks are skipped, since they
//! require a well-formed tree. The semantic phase applies the cross-field
//! rules (recommended blacklist, AS-set tagging, blackhole rewrite
//! addresses, name collisions, duplicate values, reject-policy consistency,
//! overlap detection, RTT thresholds) while collecting every finding.
//!
//! All findings are emitted through the caller's sink in discovery order
//! before the aggregate result is returned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;
use serde_json::Value;

use crate::core::asn::Asn;
use crate::core::community::AS_SET_TAGGING_TAGS;
use crate::core::community::BUILTIN_COMMUNITIES;
use crate::core::community::CommunityRole;
use crate::core::community::CommunityTag;
use crate::core::community::MacroExpectation;
use crate::core::community::REASON_TAGGING_TAGS;
use crate::core::community::REJECT_CAUSE_TAG;
use crate::core::community::builtin_community;
use crate::core::community::is_builtin_tag;
use crate::core::diagnostics::Diagnostic;
use crate::core::diagnostics::DiagnosticSink;
use crate::core::diagnostics::OverlapReason;
use crate::core::diagnostics::RejectTagProblem;
use crate::core::diagnostics::Severity;
use crate::core::error::PolicyError;
use crate::core::schema::AddressFamily;
use crate::core::schema::policy_schema;
use crate::core::value::CommunityEncoding;
use crate::core::value::CommunityValue;
use crate::core::value::EncodingFormat;
use crate::runtime::overlap::CommunityGroup;
use crate::runtime::overlap::ScrubCapability;
use crate::runtime::overlap::detect_overlaps;
use crate::runtime::validator::validate_tree;

// ============================================================================
// SECTION: Results
// ============================================================================

/// Outcome of a successful validation run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckedPolicy {
    /// Fully normalized configuration tree.
    pub config: Value,
    /// Whether any RTT-gated community is configured.
    pub rtt_based_functions: bool,
}

// ============================================================================
// SECTION: Checker
// ============================================================================

/// Policy consistency checker.
#[derive(Debug, Clone, Copy)]
pub struct PolicyChecker {
    /// Scrub capability assumed for overlap detection.
    capability: ScrubCapability,
}

impl PolicyChecker {
    /// Creates a checker for the given scrub capability.
    #[must_use]
    pub const fn new(capability: ScrubCapability) -> Self {
        Self {
            capability,
        }
    }

    /// Validates a policy document.
    ///
    /// Every finding is emitted through `sink` in discovery order before
    /// the result is returned.
    ///
    /// # Errors
    /// Returns [`PolicyError::Invalid`] bundling the fatal findings when
    /// any finding carries [`Severity::Error`].
    pub fn check(
        &self,
        document: &Value,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<CheckedPolicy, PolicyError> {
        let (config, mut diagnostics) = validate_tree(policy_schema(), document);

        let rs_as = extract_rs_as(&config);
        let parsed =
            rs_as.map(|rs_as| parse_communities(&config, rs_as, &mut diagnostics));

        let (Some(rs_as), Some(parsed)) = (rs_as, parsed) else {
            return finalize(config, false, diagnostics, sink);
        };
        if !diagnostics.is_empty() {
            return finalize(config, false, diagnostics, sink);
        }

        self.semantic_checks(&config, rs_as, &parsed, &mut diagnostics);
        finalize(config, parsed.uses_rtt_functions(), diagnostics, sink)
    }

    /// Applies every cross-field rule to a structurally valid tree.
    fn semantic_checks(
        &self,
        config: &Value,
        rs_as: Asn,
        parsed: &ParsedCommunities,
        out: &mut Vec<Diagnostic>,
    ) {
        check_global_blacklist(config, out);
        check_as_set_tagging(config, parsed, out);
        check_blackhole_rewrite(config, out);
        check_name_collisions(parsed, out);
        check_duplicate_values(parsed, out);
        check_reject_policy(config, parsed, out);
        self.check_overlaps(rs_as, parsed, out);
        check_rtt_thresholds(config, parsed, out);
    }

    /// Runs the four overlap pairings.
    fn check_overlaps(&self, rs_as: Asn, parsed: &ParsedCommunities, out: &mut Vec<Diagnostic>) {
        let inbound = parsed.role_group(CommunityRole::Inbound);
        let outbound = parsed.role_group(CommunityRole::Outbound);
        let internal = parsed.role_group(CommunityRole::Internal);
        let custom = parsed.custom_group();
        let transmittable = transmittable_union(&inbound, &outbound, &custom);

        let pairings = [
            (&inbound, &outbound, OverlapReason::InboundScrubsOutbound),
            (&inbound, &custom, OverlapReason::InboundScrubsCustom),
            (&inbound, &inbound, OverlapReason::AmbiguousInbound),
            (&internal, &transmittable, OverlapReason::InternalCollision),
        ];
        for (group_a, group_b, reason) in pairings {
            for conflict in detect_overlaps(group_a, group_b, rs_as, self.capability, reason) {
                out.push(Diagnostic::OverlappingCommunities {
                    conflict,
                });
            }
        }
    }
}

impl Default for PolicyChecker {
    fn default() -> Self {
        Self::new(ScrubCapability::RangeCapable)
    }
}

/// Emits every finding and folds the fatal subset into the outcome.
fn finalize(
    config: Value,
    rtt_based_functions: bool,
    diagnostics: Vec<Diagnostic>,
    sink: &mut dyn DiagnosticSink,
) -> Result<CheckedPolicy, PolicyError> {
    for diagnostic in &diagnostics {
        sink.emit(diagnostic);
    }
    let errors: Vec<Diagnostic> = diagnostics
        .into_iter()
        .filter(|diagnostic| diagnostic.severity() == Severity::Error)
        .collect();
    if errors.is_empty() {
        Ok(CheckedPolicy {
            config,
            rtt_based_functions,
        })
    } else {
        Err(PolicyError::Invalid {
            errors,
        })
    }
}

// ============================================================================
// SECTION: Community Extraction
// ============================================================================

/// Typed community values extracted from a normalized tree.
struct ParsedCommunities {
    /// Built-in communities keyed by tag; empty values are kept.
    builtin: BTreeMap<CommunityTag, CommunityValue>,
    /// Custom communities keyed by user-chosen tag.
    custom: BTreeMap<CommunityTag, CommunityValue>,
}

impl ParsedCommunities {
    /// Returns the non-empty built-in communities of one role.
    fn role_group(&self, role: CommunityRole) -> CommunityGroup {
        self.builtin
            .iter()
            .filter(|(tag, value)| {
                !value.is_empty()
                    && builtin_community(tag.as_str())
                        .is_some_and(|definition| definition.role == role)
            })
            .map(|(tag, value)| (tag.clone(), value.clone()))
            .collect()
    }

    /// Returns the non-empty custom communities.
    fn custom_group(&self) -> CommunityGroup {
        self.custom
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(tag, value)| (tag.clone(), value.clone()))
            .collect()
    }

    /// Returns the configured RTT-gated tags, sorted.
    fn rtt_tags(&self) -> Vec<String> {
        self.builtin
            .iter()
            .filter(|(tag, value)| {
                !value.is_empty()
                    && builtin_community(tag.as_str())
                        .is_some_and(|definition| definition.rtt_gated)
            })
            .map(|(tag, _)| tag.as_str().to_string())
            .collect()
    }

    /// Returns whether any RTT-gated community is configured.
    fn uses_rtt_functions(&self) -> bool {
        !self.rtt_tags().is_empty()
    }

    /// Returns whether a built-in community has any encoding configured.
    fn builtin_is_configured(&self, tag: &str) -> bool {
        self.builtin
            .get(tag)
            .is_some_and(|value| !value.is_empty())
    }
}

/// Reads the route server ASN out of a normalized tree.
fn extract_rs_as(config: &Value) -> Option<Asn> {
    let raw = config.get("rs_as").and_then(Value::as_u64)?;
    let raw = u32::try_from(raw).ok()?;
    Asn::from_raw(raw)
}

/// Parses every configured community encoding into typed values.
fn parse_communities(
    config: &Value,
    rs_as: Asn,
    out: &mut Vec<Diagnostic>,
) -> ParsedCommunities {
    let mut builtin = BTreeMap::new();
    let sections = config.get("communities");
    for definition in BUILTIN_COMMUNITIES {
        let entry = sections.and_then(|section| section.get(definition.tag));
        let path = format!("communities.{}", definition.tag);
        let value = parse_entry(entry, &path, rs_as, definition.macro_expectation(), out);
        builtin.insert(CommunityTag::from(definition.tag), value);
    }

    let mut custom = BTreeMap::new();
    if let Some(entries) = config.get("custom_communities").and_then(Value::as_object) {
        for (name, entry) in entries {
            let path = format!("custom_communities.{name}");
            let value =
                parse_entry(Some(entry), &path, rs_as, MacroExpectation::Forbidden, out);
            custom.insert(CommunityTag::new(name.clone()), value);
        }
    }

    ParsedCommunities {
        builtin,
        custom,
    }
}

/// Parses the `{narrow, wide, extended}` slots of one community entry.
fn parse_entry(
    entry: Option<&Value>,
    path: &str,
    rs_as: Asn,
    expectation: MacroExpectation,
    out: &mut Vec<Diagnostic>,
) -> CommunityValue {
    let mut value = CommunityValue::default();
    let Some(entry) = entry else {
        return value;
    };
    for format in EncodingFormat::ALL {
        let Some(text) = entry.get(format.field_name()).and_then(Value::as_str) else {
            continue;
        };
        match CommunityEncoding::parse(format, text, rs_as, expectation) {
            Ok(encoding) => value.insert(encoding),
            Err(error) => out.push(Diagnostic::TypeMismatch {
                path: format!("{path}.{}", format.field_name()),
                value: text.to_string(),
                expected: format!("a valid {format} community value ({error})"),
            }),
        }
    }
    value
}

// ============================================================================
// SECTION: Cross-Field Rules
// ============================================================================

/// Warns when no global prefix exclusion list is configured.
fn check_global_blacklist(config: &Value, out: &mut Vec<Diagnostic>) {
    let blacklist = config.pointer("/filtering/global_black_list_pref");
    let missing = match blacklist {
        Some(Value::Array(items)) => items.is_empty(),
        _ => true,
    };
    if missing {
        out.push(Diagnostic::MissingGlobalBlacklist);
    }
}

/// Warns when AS-set tagging is enabled without tagging communities.
fn check_as_set_tagging(config: &Value, parsed: &ParsedCommunities, out: &mut Vec<Diagnostic>) {
    let enabled = config
        .pointer("/filtering/irrdb/tag_as_set")
        .and_then(Value::as_bool)
        == Some(true);
    if !enabled {
        return;
    }
    let any_configured = AS_SET_TAGGING_TAGS
        .iter()
        .any(|tag| parsed.builtin_is_configured(tag));
    if !any_configured {
        out.push(Diagnostic::TagAsSetWithoutCommunities);
    }
}

/// Requires a rewrite address for each rewrite-next-hop blackhole policy.
fn check_blackhole_rewrite(config: &Value, out: &mut Vec<Diagnostic>) {
    let families = [
        (
            AddressFamily::Ipv4,
            "/blackhole_filtering/policy_ipv4",
            "/blackhole_filtering/rewrite_next_hop_ipv4",
        ),
        (
            AddressFamily::Ipv6,
            "/blackhole_filtering/policy_ipv6",
            "/blackhole_filtering/rewrite_next_hop_ipv6",
        ),
    ];
    for (family, policy_path, rewrite_path) in families {
        let rewriting = config.pointer(policy_path).and_then(Value::as_str)
            == Some("rewrite-next-hop");
        let rewrite_missing = config
            .pointer(rewrite_path)
            .is_none_or(Value::is_null);
        if rewriting && rewrite_missing {
            out.push(Diagnostic::MissingRewriteAddress {
                family,
            });
        }
    }
}

/// Rejects custom communities whose tag shadows a built-in one.
fn check_name_collisions(parsed: &ParsedCommunities, out: &mut Vec<Diagnostic>) {
    for tag in parsed.custom.keys() {
        if is_builtin_tag(tag.as_str()) {
            out.push(Diagnostic::NameCollision {
                tag: tag.as_str().to_string(),
            });
        }
    }
}

/// Rejects two communities resolving to the same canonical value.
fn check_duplicate_values(parsed: &ParsedCommunities, out: &mut Vec<Diagnostic>) {
    let mut first_use: BTreeMap<(EncodingFormat, String), String> = BTreeMap::new();
    let entries = parsed
        .builtin
        .iter()
        .chain(parsed.custom.iter());
    for (tag, value) in entries {
        for format in EncodingFormat::ALL {
            let Some(encoding) = value.encoding(format) else {
                continue;
            };
            let canonical = encoding.to_string();
            match first_use.entry((format, canonical)) {
                Entry::Occupied(entry) => out.push(Diagnostic::DuplicateCommunityValue {
                    first_tag: entry.get().clone(),
                    second_tag: tag.as_str().to_string(),
                    format,
                    value: entry.key().1.clone(),
                }),
                Entry::Vacant(entry) => {
                    entry.insert(tag.as_str().to_string());
                }
            }
        }
    }
}

/// Keeps the reject policy and the reason-tagging communities consistent.
fn check_reject_policy(config: &Value, parsed: &ParsedCommunities, out: &mut Vec<Diagnostic>) {
    let tag_policy = config
        .pointer("/filtering/reject_policy/policy")
        .and_then(Value::as_str)
        == Some("tag");

    if !tag_policy {
        for tag in REASON_TAGGING_TAGS {
            if parsed.builtin_is_configured(tag) {
                out.push(Diagnostic::InvalidRejectTagConfiguration {
                    problem: RejectTagProblem::CommunityWithoutTagPolicy {
                        tag: (*tag).to_string(),
                    },
                });
            }
        }
        return;
    }

    if !parsed.builtin_is_configured(REJECT_CAUSE_TAG) {
        out.push(Diagnostic::InvalidRejectTagConfiguration {
            problem: RejectTagProblem::MissingRejectCause,
        });
    }
}

/// Requires thresholds whenever RTT-gated communities are configured.
fn check_rtt_thresholds(config: &Value, parsed: &ParsedCommunities, out: &mut Vec<Diagnostic>) {
    let tags = parsed.rtt_tags();
    if tags.is_empty() {
        return;
    }
    let thresholds = config.get("rtt_thresholds");
    let missing = match thresholds {
        Some(Value::Array(items)) => items.is_empty(),
        _ => true,
    };
    if missing {
        out.push(Diagnostic::MissingRttThresholds {
            tags,
        });
    }
}

/// Unions the groups a router can see on the wire.
fn transmittable_union(
    inbound: &CommunityGroup,
    outbound: &CommunityGroup,
    custom: &CommunityGroup,
) -> CommunityGroup {
    let mut union = CommunityGroup::new();
    for group in [inbound, outbound, custom] {
        for (tag, value) in group {
            union.insert(tag.clone(), value.clone());
        }
    }
    union
}
