// crates/routewarden-core/tests/proptest_overlap.rs
// ============================================================================
// Module: Overlap Property-Based Tests
// Description: Property tests for overlap detector invariants.
// Purpose: Detect misclassification across the full literal value range.
// ============================================================================

//! Property-based tests for overlap detector invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use routewarden_core::Asn;
use routewarden_core::CommunityEncoding;
use routewarden_core::CommunityGroup;
use routewarden_core::CommunityTag;
use routewarden_core::CommunityValue;
use routewarden_core::EncodingFormat;
use routewarden_core::MacroExpectation;
use routewarden_core::OverlapReason;
use routewarden_core::PRIVATE_ASN16_FIRST;
use routewarden_core::PRIVATE_ASN16_LAST;
use routewarden_core::PRIVATE_ASN32_FIRST;
use routewarden_core::PRIVATE_ASN32_LAST;
use routewarden_core::ScrubCapability;
use routewarden_core::detect_overlaps;

const RS_AS: u32 = 65_500;

fn rs_as() -> Asn {
    Asn::from_raw(RS_AS).expect("nonzero asn")
}

fn single(
    tag: &str,
    format: EncodingFormat,
    text: &str,
    expectation: MacroExpectation,
) -> CommunityGroup {
    let encoding =
        CommunityEncoding::parse(format, text, rs_as(), expectation).expect("community text");
    let mut value = CommunityValue::default();
    value.insert(encoding);
    let mut group = CommunityGroup::new();
    group.insert(CommunityTag::from(tag), value);
    group
}

fn in_carveout(literal: u32) -> bool {
    literal == RS_AS
        || literal == 0
        || (PRIVATE_ASN16_FIRST..=PRIVATE_ASN16_LAST).contains(&literal)
        || (PRIVATE_ASN32_FIRST..=PRIVATE_ASN32_LAST).contains(&literal)
}

fn capability_strategy() -> impl Strategy<Value = ScrubCapability> {
    prop_oneof![
        Just(ScrubCapability::RangeCapable),
        Just(ScrubCapability::WildcardOnly),
    ]
}

proptest! {
    #[test]
    fn peer_as_conflicts_track_the_carveout(literal in any::<u32>()) {
        let inbound = single(
            "announce_to_peer",
            EncodingFormat::Wide,
            "65500:0:peer_as",
            MacroExpectation::RequirePeerAs,
        );
        let fixed = single(
            "informational",
            EncodingFormat::Wide,
            &format!("65500:0:{literal}"),
            MacroExpectation::Forbidden,
        );

        let conflicts = detect_overlaps(
            &inbound,
            &fixed,
            rs_as(),
            ScrubCapability::RangeCapable,
            OverlapReason::InboundScrubsCustom,
        );
        prop_assert_eq!(conflicts.is_empty(), in_carveout(literal));
    }

    #[test]
    fn wildcard_only_conflicts_are_a_superset(literal in any::<u32>()) {
        let inbound = single(
            "announce_to_peer",
            EncodingFormat::Wide,
            "65500:0:peer_as",
            MacroExpectation::RequirePeerAs,
        );
        let fixed = single(
            "informational",
            EncodingFormat::Wide,
            &format!("65500:0:{literal}"),
            MacroExpectation::Forbidden,
        );

        let range_capable = detect_overlaps(
            &inbound,
            &fixed,
            rs_as(),
            ScrubCapability::RangeCapable,
            OverlapReason::InboundScrubsCustom,
        );
        let wildcard_only = detect_overlaps(
            &inbound,
            &fixed,
            rs_as(),
            ScrubCapability::WildcardOnly,
            OverlapReason::InboundScrubsCustom,
        );
        prop_assert!(range_capable.is_empty() || !wildcard_only.is_empty());
    }

    #[test]
    fn detection_is_symmetric(literal in any::<u32>(), capability in capability_strategy()) {
        let inbound = single(
            "announce_to_peer",
            EncodingFormat::Wide,
            "65500:0:peer_as",
            MacroExpectation::RequirePeerAs,
        );
        let fixed = single(
            "informational",
            EncodingFormat::Wide,
            &format!("65500:0:{literal}"),
            MacroExpectation::Forbidden,
        );

        let forward = detect_overlaps(
            &inbound,
            &fixed,
            rs_as(),
            capability,
            OverlapReason::InboundScrubsCustom,
        );
        let backward = detect_overlaps(
            &fixed,
            &inbound,
            rs_as(),
            capability,
            OverlapReason::InboundScrubsCustom,
        );
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn unequal_leading_literals_decide_divergence(
        first in 0_u32..=65_535,
        second in 0_u32..=65_535,
    ) {
        let dynamic = single(
            "reject_cause",
            EncodingFormat::Narrow,
            &format!("{first}:dyn_val"),
            MacroExpectation::RequireDynVal,
        );
        let fixed = single(
            "informational",
            EncodingFormat::Narrow,
            &format!("{second}:1"),
            MacroExpectation::Forbidden,
        );

        let conflicts = detect_overlaps(
            &dynamic,
            &fixed,
            rs_as(),
            ScrubCapability::RangeCapable,
            OverlapReason::InternalCollision,
        );
        if first == second {
            prop_assert_eq!(conflicts.len(), 1);
        } else {
            prop_assert!(conflicts.is_empty());
        }
    }
}
