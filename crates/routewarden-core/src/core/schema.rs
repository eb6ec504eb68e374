// crates/routewarden-core/src/core/schema.rs
// ============================================================================
// Module: Policy Schema
// Description: Typed field descriptors for the route-server policy document.
// Purpose: Provide the canonical validation schema the tree validator walks.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The policy document is validated against a tree of [`FieldDescriptor`]
//! nodes. Each node names a value kind, whether the field is mandatory, and
//! an optional default applied when the input leaves the field out. The full
//! schema is built exactly once into a process-wide static and shared by
//! every validation run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::core::community::BUILTIN_COMMUNITIES;

// ============================================================================
// SECTION: Address Families
// ============================================================================

/// IP address family of an address-valued field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressFamily {
    /// IPv4.
    Ipv4,
    /// IPv6.
    Ipv6,
}

impl AddressFamily {
    /// Returns the conventional label of this family.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ipv4 => "IPv4",
            Self::Ipv6 => "IPv6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Field Descriptors
// ============================================================================

/// Child descriptors of a nested schema node, keyed by field name.
pub type SchemaMap = BTreeMap<&'static str, FieldDescriptor>;

/// Value kind accepted by one schema field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// JSON boolean, or the exact strings `"true"` / `"false"`.
    Bool,
    /// Non-negative integer within inclusive bounds; decimal strings coerce.
    UInt {
        /// Smallest accepted value.
        min: u64,
        /// Largest accepted value.
        max: u64,
    },
    /// Autonomous system number, `1 ..= 4_294_967_295`.
    Asn,
    /// IP address, normalized to its canonical textual form.
    IpAddr {
        /// Required family, or `None` to accept either.
        family: Option<AddressFamily>,
    },
    /// Case-sensitive enumerated string options.
    Choice {
        /// Accepted option strings.
        allowed: &'static [&'static str],
    },
    /// `{min, max}` prefix length pair, `0 <= min <= max <= max_len`.
    PrefixLenRange {
        /// Largest prefix length the address family allows.
        max_len: u8,
    },
    /// Strictly ascending list of non-negative RTT boundaries (ms).
    RttThresholds,
    /// `{prefix, length, comment?, exact?}` entry of an exclusion list.
    PrefixListEntry,
    /// Free-form string.
    Text,
    /// Mapping with a fixed set of named children.
    Nested(SchemaMap),
    /// Homogeneous sequence of one element kind.
    ListOf(Box<FieldDescriptor>),
    /// Mapping with caller-chosen keys, every value sharing one descriptor.
    MapOf(Box<FieldDescriptor>),
}

impl FieldKind {
    /// Returns a short description of the expected value, for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Bool => "boolean".to_string(),
            Self::UInt {
                min,
                max,
            } => format!("unsigned integer in {min}..={max}"),
            Self::Asn => "AS number in 1..=4294967295".to_string(),
            Self::IpAddr {
                family,
            } => family.map_or_else(
                || "IP address".to_string(),
                |family| format!("{family} address"),
            ),
            Self::Choice {
                ..
            } => "option string".to_string(),
            Self::PrefixLenRange {
                max_len,
            } => format!("prefix length range with min <= max <= {max_len}"),
            Self::RttThresholds => "strictly ascending list of RTT thresholds".to_string(),
            Self::PrefixListEntry => "prefix list entry".to_string(),
            Self::Text => "text".to_string(),
            Self::Nested(_) | Self::MapOf(_) => "mapping".to_string(),
            Self::ListOf(_) => "list".to_string(),
        }
    }
}

/// One node of the policy schema.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Value kind this field accepts.
    kind: FieldKind,
    /// Whether the field must be present (directly or via a default).
    mandatory: bool,
    /// Value filled in when the input leaves the field out.
    default: Option<Value>,
}

impl FieldDescriptor {
    /// Creates an optional descriptor with no default.
    #[must_use]
    pub const fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            mandatory: false,
            default: None,
        }
    }

    /// Marks the field as mandatory.
    #[must_use]
    pub const fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Attaches the default used when the field is absent.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Returns the value kind.
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns whether the field is mandatory.
    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// Returns the default value, if one is declared.
    #[must_use]
    pub const fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

// ============================================================================
// SECTION: Policy Schema
// ============================================================================

/// Process-wide policy schema, built on first use and shared afterwards.
static POLICY_SCHEMA: LazyLock<FieldDescriptor> = LazyLock::new(build_policy_schema);

/// Returns the schema of the route-server policy document.
#[must_use]
pub fn policy_schema() -> &'static FieldDescriptor {
    &POLICY_SCHEMA
}

/// Builds the root schema node.
fn build_policy_schema() -> FieldDescriptor {
    let mut root = SchemaMap::new();
    root.insert("rs_as", FieldDescriptor::new(FieldKind::Asn).mandatory());
    root.insert(
        "router_id",
        FieldDescriptor::new(FieldKind::IpAddr {
            family: Some(AddressFamily::Ipv4),
        })
        .mandatory(),
    );
    root.insert("prepend_rs_as", bool_field(false));
    root.insert("path_hiding", bool_field(true));
    root.insert("passive", bool_field(true));
    root.insert("gtsm", bool_field(false));
    root.insert("add_path", bool_field(false));
    root.insert("filtering", filtering_schema());
    root.insert("blackhole_filtering", blackhole_filtering_schema());
    root.insert("graceful_shutdown", graceful_shutdown_schema());
    root.insert(
        "rfc1997_wellknown_communities",
        nested(vec![("policy", choice_field(&["rfc1997", "pass"], "pass"))]),
    );
    root.insert(
        "rtt_thresholds",
        FieldDescriptor::new(FieldKind::RttThresholds),
    );
    root.insert("communities", communities_schema());
    root.insert(
        "custom_communities",
        FieldDescriptor::new(FieldKind::MapOf(Box::new(community_entry_schema()))),
    );
    FieldDescriptor::new(FieldKind::Nested(root)).mandatory()
}

// ============================================================================
// SECTION: Filtering Section
// ============================================================================

/// Schema for the `filtering` section.
fn filtering_schema() -> FieldDescriptor {
    nested(vec![
        (
            "next_hop",
            nested(vec![(
                "policy",
                choice_field(&["strict", "same-as", "authorized_addresses"], "strict"),
            )]),
        ),
        ("ipv4_pref_len", pref_len_field(32, 8, 24)),
        ("ipv6_pref_len", pref_len_field(128, 12, 48)),
        (
            "global_black_list_pref",
            FieldDescriptor::new(FieldKind::ListOf(Box::new(FieldDescriptor::new(
                FieldKind::PrefixListEntry,
            )))),
        ),
        (
            "max_as_path_len",
            uint_field(1, 64, 32),
        ),
        ("reject_invalid_as_in_as_path", bool_field(true)),
        (
            "transit_free",
            nested(vec![
                ("action", choice_field(&["reject", "warning"], "reject")),
                (
                    "asns",
                    FieldDescriptor::new(FieldKind::ListOf(Box::new(FieldDescriptor::new(
                        FieldKind::Asn,
                    )))),
                ),
            ]),
        ),
        (
            "irrdb",
            nested(vec![
                ("enforce_origin_in_as_set", bool_field(true)),
                ("enforce_prefix_in_as_set", bool_field(true)),
                ("allow_longer_prefixes", bool_field(false)),
                ("tag_as_set", bool_field(true)),
                ("peering_db", bool_field(false)),
            ]),
        ),
        (
            "rpki",
            nested(vec![
                ("enabled", bool_field(false)),
                ("reject_invalid", bool_field(true).mandatory()),
            ]),
        ),
        ("max_prefix", max_prefix_schema()),
        (
            "reject_policy",
            nested(vec![("policy", choice_field(&["reject", "tag"], "reject"))]),
        ),
    ])
}

/// Schema for the `filtering.max_prefix` section.
fn max_prefix_schema() -> FieldDescriptor {
    nested(vec![
        (
            "peering_db",
            nested(vec![
                ("enabled", bool_field(true)),
                (
                    "increment",
                    nested(vec![
                        ("absolute", uint_field(0, u64::MAX, 100)),
                        ("relative", uint_field(0, u64::MAX, 15)),
                    ]),
                ),
            ]),
        ),
        ("general_limit_ipv4", uint_field(0, u64::MAX, 170_000)),
        ("general_limit_ipv6", uint_field(0, u64::MAX, 12_000)),
        (
            "action",
            choice_field(&["shutdown", "restart", "block", "warning"], "shutdown"),
        ),
        (
            "restart_after",
            uint_field(0, u64::MAX, 15).mandatory(),
        ),
    ])
}

// ============================================================================
// SECTION: Blackhole and Shutdown Sections
// ============================================================================

/// Schema for the `blackhole_filtering` section.
fn blackhole_filtering_schema() -> FieldDescriptor {
    let policy_options: &'static [&'static str] = &["propagate-unchanged", "rewrite-next-hop"];
    nested(vec![
        ("announce_to_client", bool_field(true).mandatory()),
        (
            "policy_ipv4",
            FieldDescriptor::new(FieldKind::Choice {
                allowed: policy_options,
            }),
        ),
        (
            "policy_ipv6",
            FieldDescriptor::new(FieldKind::Choice {
                allowed: policy_options,
            }),
        ),
        (
            "rewrite_next_hop_ipv4",
            FieldDescriptor::new(FieldKind::IpAddr {
                family: Some(AddressFamily::Ipv4),
            }),
        ),
        (
            "rewrite_next_hop_ipv6",
            FieldDescriptor::new(FieldKind::IpAddr {
                family: Some(AddressFamily::Ipv6),
            }),
        ),
        ("add_noexport", bool_field(true)),
    ])
}

/// Schema for the `graceful_shutdown` section.
fn graceful_shutdown_schema() -> FieldDescriptor {
    nested(vec![
        ("enabled", bool_field(false).mandatory()),
        ("local_pref", uint_field(0, u64::MAX, 0).mandatory()),
    ])
}

// ============================================================================
// SECTION: Community Sections
// ============================================================================

/// Schema for the `communities` section: one entry per built-in tag.
fn communities_schema() -> FieldDescriptor {
    let mut fields = SchemaMap::new();
    for definition in BUILTIN_COMMUNITIES {
        fields.insert(definition.tag, community_entry_schema());
    }
    FieldDescriptor::new(FieldKind::Nested(fields))
}

/// Schema shared by every community entry: one text slot per format.
fn community_entry_schema() -> FieldDescriptor {
    nested(vec![
        ("narrow", FieldDescriptor::new(FieldKind::Text)),
        ("wide", FieldDescriptor::new(FieldKind::Text)),
        ("extended", FieldDescriptor::new(FieldKind::Text)),
    ])
}

// ============================================================================
// SECTION: Builder Helpers
// ============================================================================

/// Builds a nested descriptor from named children.
fn nested(fields: Vec<(&'static str, FieldDescriptor)>) -> FieldDescriptor {
    FieldDescriptor::new(FieldKind::Nested(fields.into_iter().collect()))
}

/// Builds an optional boolean field with a default.
fn bool_field(default: bool) -> FieldDescriptor {
    FieldDescriptor::new(FieldKind::Bool).with_default(Value::Bool(default))
}

/// Builds a bounded unsigned integer field with a default.
fn uint_field(min: u64, max: u64, default: u64) -> FieldDescriptor {
    FieldDescriptor::new(FieldKind::UInt {
        min,
        max,
    })
    .with_default(json!(default))
}

/// Builds an enumerated option field with a default.
fn choice_field(allowed: &'static [&'static str], default: &str) -> FieldDescriptor {
    FieldDescriptor::new(FieldKind::Choice {
        allowed,
    })
    .with_default(Value::String(default.to_string()))
}

/// Builds a prefix length range field with a default `{min, max}` pair.
fn pref_len_field(max_len: u8, default_min: u8, default_max: u8) -> FieldDescriptor {
    FieldDescriptor::new(FieldKind::PrefixLenRange {
        max_len,
    })
    .with_default(json!({ "min": default_min, "max": default_max }))
}
