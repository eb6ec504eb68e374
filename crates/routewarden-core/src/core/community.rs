// crates/routewarden-core/src/core/community.rs
// ============================================================================
// Module: Community Definitions
// Description: Built-in signaling community tags, roles, and capability flags.
// Purpose: Provide the immutable registry of community semantics consumed by
//          the schema builder, the checker, and the overlap detector.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every signaling community the route server understands is registered here
//! with its role and macro capabilities. The table is `const` data: it is
//! never extended or mutated at runtime. Custom communities configured by
//! operators are not part of this registry; they share the value shape but
//! carry no role and no macros.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Borrow;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Tags
// ============================================================================

/// Community tag: the string identifier of a built-in or custom community.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommunityTag(String);

impl CommunityTag {
    /// Creates a new community tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CommunityTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommunityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CommunityTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CommunityTag {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Role of a built-in community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityRole {
    /// Attached by the route server to routes announced to peers.
    Outbound,
    /// Attached by peers to ask the route server to perform an action.
    Inbound,
    /// Used by the route server internally, never received nor propagated.
    Internal,
}

impl fmt::Display for CommunityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Outbound => "outbound",
            Self::Inbound => "inbound",
            Self::Internal => "internal",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Macro Expectations
// ============================================================================

/// Which macro a community's configured values must carry in the trailing
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroExpectation {
    /// No macro may appear (plain literal values only).
    Forbidden,
    /// The `peer_as` macro is mandatory in the trailing position.
    RequirePeerAs,
    /// The `dyn_val` macro is mandatory in the trailing position.
    RequireDynVal,
}

// ============================================================================
// SECTION: Definitions
// ============================================================================

/// Built-in community definition: tag, role, and capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunityDefinition {
    /// Tag identifying the community in policy documents.
    pub tag: &'static str,
    /// Direction the community travels in.
    pub role: CommunityRole,
    /// Trailing position is replaced per-peer with that peer's ASN.
    pub peer_targeted: bool,
    /// Trailing position carries a locally-significant variable value.
    pub dynamic_valued: bool,
    /// The community participates in RTT-threshold behavior.
    pub rtt_gated: bool,
}

impl CommunityDefinition {
    /// Returns the macro the configured values of this community must carry.
    #[must_use]
    pub const fn macro_expectation(&self) -> MacroExpectation {
        if self.peer_targeted {
            MacroExpectation::RequirePeerAs
        } else if self.dynamic_valued {
            MacroExpectation::RequireDynVal
        } else {
            MacroExpectation::Forbidden
        }
    }
}

/// Builds an outbound definition with no macros.
const fn outbound(tag: &'static str) -> CommunityDefinition {
    CommunityDefinition {
        tag,
        role: CommunityRole::Outbound,
        peer_targeted: false,
        dynamic_valued: false,
        rtt_gated: false,
    }
}

/// Builds an inbound definition with no macros.
const fn inbound(tag: &'static str) -> CommunityDefinition {
    CommunityDefinition {
        tag,
        role: CommunityRole::Inbound,
        peer_targeted: false,
        dynamic_valued: false,
        rtt_gated: false,
    }
}

/// Builds a peer-targeted inbound definition.
const fn inbound_peer(tag: &'static str) -> CommunityDefinition {
    CommunityDefinition {
        tag,
        role: CommunityRole::Inbound,
        peer_targeted: true,
        dynamic_valued: false,
        rtt_gated: false,
    }
}

/// Builds a dynamic-valued, RTT-gated inbound definition.
const fn inbound_rtt(tag: &'static str) -> CommunityDefinition {
    CommunityDefinition {
        tag,
        role: CommunityRole::Inbound,
        peer_targeted: false,
        dynamic_valued: true,
        rtt_gated: true,
    }
}

/// Builds a dynamic-valued internal definition.
const fn internal_dynamic(tag: &'static str) -> CommunityDefinition {
    CommunityDefinition {
        tag,
        role: CommunityRole::Internal,
        peer_targeted: false,
        dynamic_valued: true,
        rtt_gated: false,
    }
}

// ============================================================================
// SECTION: Built-in Registry
// ============================================================================

/// Every built-in community understood by the route server.
pub const BUILTIN_COMMUNITIES: &[CommunityDefinition] = &[
    outbound("origin_present_in_as_set"),
    outbound("origin_not_present_in_as_set"),
    outbound("prefix_present_in_as_set"),
    outbound("prefix_not_present_in_as_set"),
    outbound("prefix_validated_via_rpki_roas"),
    inbound("blackholing"),
    inbound("do_not_announce_to_any"),
    inbound_peer("do_not_announce_to_peer"),
    inbound_peer("announce_to_peer"),
    inbound_rtt("do_not_announce_to_peers_with_rtt_lower_than"),
    inbound_rtt("do_not_announce_to_peers_with_rtt_higher_than"),
    inbound_rtt("announce_to_peers_with_rtt_lower_than"),
    inbound_rtt("announce_to_peers_with_rtt_higher_than"),
    inbound("prepend_once_to_any"),
    inbound("prepend_twice_to_any"),
    inbound("prepend_thrice_to_any"),
    inbound_peer("prepend_once_to_peer"),
    inbound_peer("prepend_twice_to_peer"),
    inbound_peer("prepend_thrice_to_peer"),
    inbound_rtt("prepend_once_to_peers_with_rtt_lower_than"),
    inbound_rtt("prepend_twice_to_peers_with_rtt_lower_than"),
    inbound_rtt("prepend_thrice_to_peers_with_rtt_lower_than"),
    inbound_rtt("prepend_once_to_peers_with_rtt_higher_than"),
    inbound_rtt("prepend_twice_to_peers_with_rtt_higher_than"),
    inbound_rtt("prepend_thrice_to_peers_with_rtt_higher_than"),
    inbound("add_noexport_to_any"),
    inbound("add_noadvertise_to_any"),
    inbound_peer("add_noexport_to_peer"),
    inbound_peer("add_noadvertise_to_peer"),
    internal_dynamic("reject_cause"),
    internal_dynamic("rejected_route_announced_by"),
];

/// Communities whose presence enables AS-set origin/prefix tagging.
pub const AS_SET_TAGGING_TAGS: &[&str] = &[
    "origin_present_in_as_set",
    "origin_not_present_in_as_set",
    "prefix_present_in_as_set",
    "prefix_not_present_in_as_set",
];

/// Internal communities carrying a rejection reason.
pub const REASON_TAGGING_TAGS: &[&str] = &["reject_cause", "rejected_route_announced_by"];

/// Tag of the community carrying the rejection cause code.
pub const REJECT_CAUSE_TAG: &str = "reject_cause";

/// Looks up a built-in community definition by tag.
#[must_use]
pub fn builtin_community(tag: &str) -> Option<&'static CommunityDefinition> {
    BUILTIN_COMMUNITIES.iter().find(|definition| definition.tag == tag)
}

/// Returns whether a tag names a built-in community.
#[must_use]
pub fn is_builtin_tag(tag: &str) -> bool {
    builtin_community(tag).is_some()
}
