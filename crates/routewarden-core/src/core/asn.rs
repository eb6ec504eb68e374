// crates/routewarden-core/src/core/asn.rs
// ============================================================================
// Module: Autonomous System Numbers
// Description: Strongly typed AS numbers and the private/reserved ranges.
// Purpose: Provide the ASN type shared by the schema walker and the overlap
//          detector's carve-out rules.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! BGP autonomous system numbers are 32-bit, 1-based values. AS0 is reserved
//! by RFC 7607 and never identifies a real peer, so the type enforces
//! non-zero at construction. The private/reserved ranges matter to the
//! overlap detector: a peer's ASN can never fall inside them, which is what
//! makes the carve-out in the peer-targeted comparison sound.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU32;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Ranges
// ============================================================================

/// First ASN of the private 2-byte range (RFC 6996).
pub const PRIVATE_ASN16_FIRST: u32 = 64_512;
/// Last ASN of the private 2-byte range (RFC 6996).
pub const PRIVATE_ASN16_LAST: u32 = 65_534;
/// First ASN of the private 4-byte range (RFC 6996).
pub const PRIVATE_ASN32_FIRST: u32 = 4_200_000_000;
/// Last ASN of the private 4-byte range (RFC 6996).
pub const PRIVATE_ASN32_LAST: u32 = 4_294_967_294;

// ============================================================================
// SECTION: ASN Type
// ============================================================================

/// Autonomous system number.
///
/// # Invariants
/// - Always >= 1 (AS0 is reserved and never assignable to a peer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asn(NonZeroU32);

impl Asn {
    /// Creates a new ASN from a non-zero value.
    #[must_use]
    pub const fn new(asn: NonZeroU32) -> Self {
        Self(asn)
    }

    /// Creates an ASN from a raw value (returns `None` if zero).
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(asn) => Some(Self(asn)),
            None => None,
        }
    }

    /// Returns the raw ASN value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Returns whether this ASN falls in a private/reserved range.
    #[must_use]
    pub const fn in_private_range(self) -> bool {
        let raw = self.0.get();
        (raw >= PRIVATE_ASN16_FIRST && raw <= PRIVATE_ASN16_LAST)
            || (raw >= PRIVATE_ASN32_FIRST && raw <= PRIVATE_ASN32_LAST)
    }
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}
