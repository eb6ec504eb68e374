// crates/routewarden-core/src/runtime/overlap.rs
// ============================================================================
// Module: Overlap Detector
// Description: Pairwise overlap proof for community value groups.
// Purpose: Decide whether two signaling tokens could be matched or deleted
//          by the same router rule under macro-substitution semantics.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The detector compares every unordered pair of distinct tags drawn from
//! two groups, format by format, position by position. A `dyn_val` position
//! overlaps everything; a `peer_as` position against a literal overlaps
//! unless the literal is carved out (the route server's own ASN, zero, or a
//! private ASN when the renderer can scrub by numeric range); two unequal
//! literals prove the pair diverges and clear it. Full-length equality is
//! left to the duplicate-value check.
//!
//! The output carries sorted tag pairs and is deterministically ordered, so
//! swapping the two input groups yields the identical conflict list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::asn::Asn;
use crate::core::asn::PRIVATE_ASN16_FIRST;
use crate::core::asn::PRIVATE_ASN16_LAST;
use crate::core::asn::PRIVATE_ASN32_FIRST;
use crate::core::asn::PRIVATE_ASN32_LAST;
use crate::core::community::CommunityTag;
use crate::core::diagnostics::OverlapConflict;
use crate::core::diagnostics::OverlapReason;
use crate::core::value::CommunityEncoding;
use crate::core::value::CommunityPart;
use crate::core::value::CommunityValue;
use crate::core::value::EncodingFormat;

// ============================================================================
// SECTION: Capabilities
// ============================================================================

/// How the downstream renderer can scrub peer-targeted communities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrubCapability {
    /// The renderer scrubs by numeric range, so literals inside the private
    /// ASN ranges can never be confused with a substituted peer ASN.
    RangeCapable,
    /// The renderer scrubs by wildcard only; every literal a peer ASN could
    /// take is suspect, yielding a superset of the range-capable conflicts.
    WildcardOnly,
}

impl ScrubCapability {
    /// Returns whether literals in the private ASN ranges are carved out.
    #[must_use]
    pub const fn allows_private_asn_carveout(self) -> bool {
        matches!(self, Self::RangeCapable)
    }
}

// ============================================================================
// SECTION: Groups
// ============================================================================

/// A group of communities compared against another group, keyed by tag.
pub type CommunityGroup = BTreeMap<CommunityTag, CommunityValue>;

// ============================================================================
// SECTION: Detection
// ============================================================================

/// Proves pairwise non-overlap between two community groups.
///
/// Every unordered pair of distinct tags is compared once per shared
/// non-empty encoding format; passing the same group twice compares its
/// members against each other. All conflicts are collected and returned in
/// a deterministic order under the given pairing `reason`.
#[must_use]
pub fn detect_overlaps(
    group_a: &CommunityGroup,
    group_b: &CommunityGroup,
    rs_as: Asn,
    capability: ScrubCapability,
    reason: OverlapReason,
) -> Vec<OverlapConflict> {
    let mut compared: BTreeSet<(&CommunityTag, &CommunityTag)> = BTreeSet::new();
    let mut conflicts = Vec::new();

    for (tag_a, value_a) in group_a {
        for (tag_b, value_b) in group_b {
            if tag_a == tag_b {
                continue;
            }
            let pair = if tag_a <= tag_b {
                (tag_a, tag_b)
            } else {
                (tag_b, tag_a)
            };
            if !compared.insert(pair) {
                continue;
            }
            for format in EncodingFormat::ALL {
                let (Some(encoding_a), Some(encoding_b)) =
                    (value_a.encoding(format), value_b.encoding(format))
                else {
                    continue;
                };
                if encodings_overlap(encoding_a, encoding_b, rs_as, capability) {
                    conflicts.push(OverlapConflict::new(
                        tag_a.as_str(),
                        &encoding_a.to_string(),
                        tag_b.as_str(),
                        &encoding_b.to_string(),
                        format,
                        reason,
                    ));
                }
            }
        }
    }

    conflicts.sort_by(|left, right| {
        (&left.first_tag, &left.second_tag, left.format)
            .cmp(&(&right.first_tag, &right.second_tag, right.format))
    });
    conflicts
}

/// Decides whether two same-format encodings overlap.
fn encodings_overlap(
    first: &CommunityEncoding,
    second: &CommunityEncoding,
    rs_as: Asn,
    capability: ScrubCapability,
) -> bool {
    // An rt/ro subtype mismatch diverges before any numeric comparison.
    if first.subtype() != second.subtype() {
        return false;
    }
    for (part_a, part_b) in first.parts().iter().zip(second.parts()) {
        match (part_a, part_b) {
            // A dynamic value can assume any value the other side carries.
            (CommunityPart::DynVal, _) | (_, CommunityPart::DynVal) => return true,
            // Both substituted with the same peer's ASN at the same position.
            (CommunityPart::PeerAs, CommunityPart::PeerAs) => {}
            (CommunityPart::PeerAs, CommunityPart::Literal(fixed))
            | (CommunityPart::Literal(fixed), CommunityPart::PeerAs) => {
                return !peer_as_cleared(*fixed, rs_as, capability);
            }
            (CommunityPart::Literal(literal_a), CommunityPart::Literal(literal_b)) => {
                if literal_a != literal_b {
                    return false;
                }
            }
        }
    }
    // Full-length equality is the duplicate-value check's responsibility.
    false
}

/// Returns whether a literal compared against `peer_as` is carved out.
///
/// No peer can legitimately hold the route server's own ASN or ASN zero;
/// the private ranges are carved out only for range-capable renderers.
fn peer_as_cleared(fixed: u32, rs_as: Asn, capability: ScrubCapability) -> bool {
    if fixed == rs_as.get() || fixed == 0 {
        return true;
    }
    capability.allows_private_asn_carveout() && in_private_asn_range(fixed)
}

/// Returns whether a value falls in the 2-byte or 4-byte private ASN range.
const fn in_private_asn_range(value: u32) -> bool {
    (value >= PRIVATE_ASN16_FIRST && value <= PRIVATE_ASN16_LAST)
        || (value >= PRIVATE_ASN32_FIRST && value <= PRIVATE_ASN32_LAST)
}
