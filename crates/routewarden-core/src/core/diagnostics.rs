// crates/routewarden-core/src/core/diagnostics.rs
// ============================================================================
// Module: Diagnostics
// Description: Structured validation findings and the emission sink.
// Purpose: Carry the full context of every policy problem so callers can
//          render, serialize, or aggregate findings without re-validating.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every problem the validator or checker discovers becomes a [`Diagnostic`]
//! value: a serializable sum type with one variant per finding class.
//! Findings are pushed through a [`DiagnosticSink`] in discovery order before
//! any aggregate error is returned, so a single run always surfaces the
//! complete defect list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::core::schema::AddressFamily;
use crate::core::value::EncodingFormat;

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Whether a finding blocks configuration use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Advisory finding; the configuration is still usable.
    Warning,
    /// Fatal finding; the configuration must be rejected.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Overlap Conflicts
// ============================================================================

/// Why two overlapping communities are dangerous together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapReason {
    /// Scrubbing an inbound community could delete the outbound signal.
    InboundScrubsOutbound,
    /// Scrubbing an inbound community could delete the custom community.
    InboundScrubsCustom,
    /// Two inbound requests the router cannot tell apart.
    AmbiguousInbound,
    /// Internal communities must never match anything transmittable.
    InternalCollision,
}

impl fmt::Display for OverlapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InboundScrubsOutbound => {
                "inbound and outbound communities cannot share values, \
                 otherwise outbound signals might be scrubbed"
            }
            Self::InboundScrubsCustom => {
                "inbound and custom communities cannot share values, \
                 otherwise custom values might be scrubbed"
            }
            Self::AmbiguousInbound => {
                "overlapping inbound communities make peer requests ambiguous"
            }
            Self::InternalCollision => {
                "internal communities cannot share values with any \
                 transmittable community"
            }
        };
        f.write_str(text)
    }
}

/// One proven overlap between two communities in one encoding format.
///
/// # Invariants
/// - `first_tag <= second_tag`, so a conflict is identical no matter which
///   group supplied which community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapConflict {
    /// Lexicographically smaller tag of the pair.
    pub first_tag: String,
    /// Lexicographically larger tag of the pair.
    pub second_tag: String,
    /// Encoding format in which the values overlap.
    pub format: EncodingFormat,
    /// Canonical value configured for `first_tag`.
    pub first_value: String,
    /// Canonical value configured for `second_tag`.
    pub second_value: String,
    /// Pairing-specific reason the overlap is dangerous.
    pub reason: OverlapReason,
}

impl OverlapConflict {
    /// Builds a conflict with the tag pair in canonical order.
    #[must_use]
    pub fn new(
        tag_a: &str,
        value_a: &str,
        tag_b: &str,
        value_b: &str,
        format: EncodingFormat,
        reason: OverlapReason,
    ) -> Self {
        if tag_a <= tag_b {
            Self {
                first_tag: tag_a.to_string(),
                second_tag: tag_b.to_string(),
                format,
                first_value: value_a.to_string(),
                second_value: value_b.to_string(),
                reason,
            }
        } else {
            Self {
                first_tag: tag_b.to_string(),
                second_tag: tag_a.to_string(),
                format,
                first_value: value_b.to_string(),
                second_value: value_a.to_string(),
                reason,
            }
        }
    }
}

// ============================================================================
// SECTION: Reject Tag Problems
// ============================================================================

/// Inconsistency between the reject policy and the reason-tagging communities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectTagProblem {
    /// A reason-tagging community is configured without the `tag` policy.
    CommunityWithoutTagPolicy {
        /// Tag of the offending community.
        tag: String,
    },
    /// The `tag` policy is selected but `reject_cause` is not configured.
    MissingRejectCause,
}

impl fmt::Display for RejectTagProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommunityWithoutTagPolicy {
                tag,
            } => {
                write!(
                    f,
                    "the '{tag}' community is configured but \
                     filtering.reject_policy.policy is not 'tag'"
                )
            }
            Self::MissingRejectCause => f.write_str(
                "filtering.reject_policy.policy is 'tag' but the \
                 'reject_cause' community is not configured",
            ),
        }
    }
}

// ============================================================================
// SECTION: Diagnostics
// ============================================================================

/// One validation finding, with everything needed to act on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A mandatory field is absent and has no default.
    MissingMandatoryField {
        /// Dotted path of the field.
        path: String,
    },
    /// A value is outside the enumerated options of its field.
    InvalidOption {
        /// Dotted path of the field.
        path: String,
        /// Offending value, rendered as text.
        value: String,
        /// Accepted option strings.
        allowed: &'static [&'static str],
    },
    /// A value cannot be coerced to the field's kind.
    TypeMismatch {
        /// Dotted path of the field.
        path: String,
        /// Offending value, rendered as text.
        value: String,
        /// Description of the expected value.
        expected: String,
    },
    /// An input key has no descriptor in the schema.
    UnknownField {
        /// Dotted path of the unknown key.
        path: String,
    },
    /// Two communities overlap under macro-substitution semantics.
    OverlappingCommunities {
        /// The proven conflict.
        conflict: OverlapConflict,
    },
    /// Two communities resolve to the same canonical value.
    DuplicateCommunityValue {
        /// First tag using the value (in iteration order).
        first_tag: String,
        /// Second tag using the value.
        second_tag: String,
        /// Encoding format of the duplicated value.
        format: EncodingFormat,
        /// Duplicated canonical value.
        value: String,
    },
    /// A custom community reuses a built-in tag.
    NameCollision {
        /// Offending custom tag.
        tag: String,
    },
    /// A rewrite-next-hop blackhole policy has no rewrite address.
    MissingRewriteAddress {
        /// Address family the rewrite address is missing for.
        family: AddressFamily,
    },
    /// The reject policy and the reason-tagging communities disagree.
    InvalidRejectTagConfiguration {
        /// The specific inconsistency.
        problem: RejectTagProblem,
    },
    /// RTT-gated communities are configured without thresholds.
    MissingRttThresholds {
        /// Tags of the RTT-gated communities found configured.
        tags: Vec<String>,
    },
    /// No global prefix exclusion list is configured.
    MissingGlobalBlacklist,
    /// AS-set tagging is enabled but no tagging community is configured.
    TagAsSetWithoutCommunities,
}

impl Diagnostic {
    /// Classifies the finding as advisory or fatal.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::MissingGlobalBlacklist | Self::TagAsSetWithoutCommunities => Severity::Warning,
            Self::MissingMandatoryField {
                ..
            }
            | Self::InvalidOption {
                ..
            }
            | Self::TypeMismatch {
                ..
            }
            | Self::UnknownField {
                ..
            }
            | Self::OverlappingCommunities {
                ..
            }
            | Self::DuplicateCommunityValue {
                ..
            }
            | Self::NameCollision {
                ..
            }
            | Self::MissingRewriteAddress {
                ..
            }
            | Self::InvalidRejectTagConfiguration {
                ..
            }
            | Self::MissingRttThresholds {
                ..
            } => Severity::Error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMandatoryField {
                path,
            } => write!(f, "missing mandatory field '{path}'"),
            Self::InvalidOption {
                path,
                value,
                allowed,
            } => {
                write!(
                    f,
                    "invalid option '{value}' for '{path}': must be one of {}",
                    allowed.join(", ")
                )
            }
            Self::TypeMismatch {
                path,
                value,
                expected,
            } => write!(f, "invalid value '{value}' for '{path}': expected {expected}"),
            Self::UnknownField {
                path,
            } => write!(f, "unknown field '{path}'"),
            Self::OverlappingCommunities {
                conflict,
            } => {
                write!(
                    f,
                    "communities '{}' ({}) and '{}' ({}) overlap in the {} format: {}",
                    conflict.first_tag,
                    conflict.first_value,
                    conflict.second_tag,
                    conflict.second_value,
                    conflict.format,
                    conflict.reason
                )
            }
            Self::DuplicateCommunityValue {
                first_tag,
                second_tag,
                format,
                value,
            } => {
                write!(
                    f,
                    "duplicate community value: '{first_tag}' and '{second_tag}' \
                     both use the {format} value {value}"
                )
            }
            Self::NameCollision {
                tag,
            } => {
                write!(
                    f,
                    "the custom community '{tag}' collides with the built-in \
                     community of the same name"
                )
            }
            Self::MissingRewriteAddress {
                family,
            } => {
                write!(
                    f,
                    "the blackhole filtering policy for {family} is \
                     'rewrite-next-hop' but no {family} rewrite address is given"
                )
            }
            Self::InvalidRejectTagConfiguration {
                problem,
            } => write!(f, "invalid reject policy configuration: {problem}"),
            Self::MissingRttThresholds {
                tags,
            } => {
                write!(
                    f,
                    "RTT-based communities are configured ({}) but \
                     rtt_thresholds is missing or empty",
                    tags.join(", ")
                )
            }
            Self::MissingGlobalBlacklist => f.write_str(
                "filtering.global_black_list_pref is missing or empty; \
                 providing the local IPv4/IPv6 networks there is strongly \
                 suggested",
            ),
            Self::TagAsSetWithoutCommunities => f.write_str(
                "filtering.irrdb.tag_as_set is enabled but no AS-set tagging \
                 community is configured",
            ),
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Emission channel for findings.
pub trait DiagnosticSink {
    /// Receives one finding.
    fn emit(&mut self, diagnostic: &Diagnostic);
}

/// Vector-backed sink collecting every finding in emission order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    /// Findings received so far.
    diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    /// Returns every finding received so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns whether any fatal finding was received.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity() == Severity::Error)
    }

    /// Consumes the sink, yielding the findings.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }
}
