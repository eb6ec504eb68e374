// crates/routewarden-core/src/core/value.rs
// ============================================================================
// Module: Community Values
// Description: Typed community encodings with positional parts and macros.
// Purpose: Parse raw community text into the part sequences compared by the
//          overlap detector and canonicalized for duplicate detection.
// Dependencies: serde, smallvec, thiserror
// ============================================================================

//! ## Overview
//! A community value is configured as colon-separated text per encoding
//! format. Parsing resolves the `rs_as` placeholder to the route server's
//! ASN, classifies each position as a literal or macro, and enforces the
//! format's width limits. Macros are only legal in the trailing position;
//! whether one is required or forbidden is dictated by the community's
//! definition.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::core::asn::Asn;
use crate::core::community::MacroExpectation;

// ============================================================================
// SECTION: Formats
// ============================================================================

/// Largest value a 16-bit community part can carry.
const PART16_MAX: u32 = 65_535;

/// Wire encoding formats of a community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingFormat {
    /// RFC 1997 standard community: two 16-bit parts.
    Narrow,
    /// RFC 8092 large community: three 32-bit parts.
    Wide,
    /// RFC 4360 extended community: subtype plus two administrator parts.
    Extended,
}

impl EncodingFormat {
    /// Every encoding format, in canonical order.
    pub const ALL: [Self; 3] = [Self::Narrow, Self::Wide, Self::Extended];

    /// Returns the policy-document field name of this format.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Narrow => "narrow",
            Self::Wide => "wide",
            Self::Extended => "extended",
        }
    }
}

impl fmt::Display for EncodingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Transitive subtype of an extended community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendedSubtype {
    /// `rt:` route target.
    RouteTarget,
    /// `ro:` route origin.
    RouteOrigin,
}

impl ExtendedSubtype {
    /// Returns the textual label of this subtype.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RouteTarget => "rt",
            Self::RouteOrigin => "ro",
        }
    }

    /// Parses a subtype label.
    fn parse(token: &str) -> Result<Self, CommunityTextError> {
        match token {
            "rt" => Ok(Self::RouteTarget),
            "ro" => Ok(Self::RouteOrigin),
            other => Err(CommunityTextError::InvalidSubtype {
                subtype: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExtendedSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Parts
// ============================================================================

/// One position of a community value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunityPart {
    /// Fixed numeric value (including resolved `rs_as` placeholders).
    Literal(u32),
    /// Substituted per-peer with that peer's ASN at render time.
    PeerAs,
    /// Substituted with a locally-significant variable value at render time.
    DynVal,
}

impl CommunityPart {
    /// Returns the macro name, or `None` for literals.
    #[must_use]
    pub const fn macro_name(self) -> Option<&'static str> {
        match self {
            Self::Literal(_) => None,
            Self::PeerAs => Some("peer_as"),
            Self::DynVal => Some("dyn_val"),
        }
    }
}

impl fmt::Display for CommunityPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => value.fmt(f),
            Self::PeerAs => f.write_str("peer_as"),
            Self::DynVal => f.write_str("dyn_val"),
        }
    }
}

// ============================================================================
// SECTION: Parse Errors
// ============================================================================

/// Reasons a community's configured text is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommunityTextError {
    /// The value contains no text.
    #[error("the value is empty")]
    Empty,
    /// The value has the wrong number of colon-separated parts.
    #[error("the {format} format takes {expected} colon-separated parts, found {found}")]
    WrongPartCount {
        /// Encoding format being parsed.
        format: EncodingFormat,
        /// Number of parts the format requires.
        expected: usize,
        /// Number of parts found in the input.
        found: usize,
    },
    /// A part is neither a decimal value nor a known macro.
    #[error("'{part}' is not a decimal value, 'rs_as', 'peer_as' or 'dyn_val'")]
    InvalidPart {
        /// Offending part text.
        part: String,
    },
    /// A numeric part exceeds the width of its position.
    #[error(
        "{value} exceeds the maximum value {max} allowed at this position of the {format} format"
    )]
    PartOutOfRange {
        /// Encoding format being parsed.
        format: EncodingFormat,
        /// Offending numeric value.
        value: u64,
        /// Largest value the position can carry.
        max: u32,
    },
    /// The extended format's leading subtype is unknown.
    #[error("the extended format requires an 'rt' or 'ro' subtype, found '{subtype}'")]
    InvalidSubtype {
        /// Offending subtype text.
        subtype: String,
    },
    /// A macro appears before the trailing position.
    #[error("the '{name}' macro may only be used in the last part")]
    MacroNotTrailing {
        /// Macro name.
        name: &'static str,
    },
    /// A macro appears in a community that does not allow it.
    #[error("the '{name}' macro cannot be used in this community")]
    MacroNotAllowed {
        /// Macro name.
        name: &'static str,
    },
    /// A community that requires a macro was configured without it.
    #[error("the '{name}' macro is mandatory in the last part of this community")]
    MissingMacro {
        /// Macro name.
        name: &'static str,
    },
}

// ============================================================================
// SECTION: Encodings
// ============================================================================

/// A community value in one encoding format, parsed into positional parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityEncoding {
    /// Encoding format of this value.
    format: EncodingFormat,
    /// Transitive subtype; present exactly for the extended format.
    subtype: Option<ExtendedSubtype>,
    /// Positional parts, most significant first.
    parts: SmallVec<[CommunityPart; 3]>,
}

impl CommunityEncoding {
    /// Parses community text for one encoding format.
    ///
    /// `rs_as` resolves the `rs_as` placeholder; `expectation` states which
    /// macro the trailing position must or must not carry.
    ///
    /// # Errors
    /// Returns a [`CommunityTextError`] describing the first problem found.
    pub fn parse(
        format: EncodingFormat,
        text: &str,
        rs_as: Asn,
        expectation: MacroExpectation,
    ) -> Result<Self, CommunityTextError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CommunityTextError::Empty);
        }

        let tokens: Vec<&str> = trimmed.split(':').map(str::trim).collect();
        let (subtype, part_tokens) = split_tokens(format, &tokens)?;

        let mut parts: SmallVec<[CommunityPart; 3]> = SmallVec::new();
        for (index, token) in part_tokens.iter().enumerate() {
            let max = position_max(format, index, &parts);
            let part = parse_part(format, token, max, rs_as)?;
            let trailing = index + 1 == part_tokens.len();
            if !trailing
                && let Some(name) = part.macro_name()
            {
                return Err(CommunityTextError::MacroNotTrailing {
                    name,
                });
            }
            parts.push(part);
        }

        enforce_expectation(&parts, expectation)?;

        Ok(Self {
            format,
            subtype,
            parts,
        })
    }

    /// Returns the encoding format.
    #[must_use]
    pub const fn format(&self) -> EncodingFormat {
        self.format
    }

    /// Returns the extended subtype, if this is an extended encoding.
    #[must_use]
    pub const fn subtype(&self) -> Option<ExtendedSubtype> {
        self.subtype
    }

    /// Returns the positional parts, most significant first.
    #[must_use]
    pub fn parts(&self) -> &[CommunityPart] {
        &self.parts
    }
}

impl fmt::Display for CommunityEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(subtype) = self.subtype {
            subtype.fmt(f)?;
            f.write_str(":")?;
        }
        for (index, part) in self.parts.iter().enumerate() {
            if index > 0 {
                f.write_str(":")?;
            }
            part.fmt(f)?;
        }
        Ok(())
    }
}

/// Splits raw tokens into an optional subtype and the numeric part tokens.
fn split_tokens<'t>(
    format: EncodingFormat,
    tokens: &'t [&'t str],
) -> Result<(Option<ExtendedSubtype>, &'t [&'t str]), CommunityTextError> {
    let expected = match format {
        EncodingFormat::Narrow => 2,
        EncodingFormat::Wide | EncodingFormat::Extended => 3,
    };
    if tokens.len() != expected {
        return Err(CommunityTextError::WrongPartCount {
            format,
            expected,
            found: tokens.len(),
        });
    }
    match format {
        EncodingFormat::Extended => {
            let Some((label, rest)) = tokens.split_first() else {
                return Err(CommunityTextError::Empty);
            };
            let subtype = ExtendedSubtype::parse(label)?;
            Ok((Some(subtype), rest))
        }
        EncodingFormat::Narrow | EncodingFormat::Wide => Ok((None, tokens)),
    }
}

/// Returns the largest literal allowed at a given position.
///
/// The extended format packs both administrator parts into six bytes: when
/// the leading part needs four of them, the trailing part is limited to two.
fn position_max(format: EncodingFormat, index: usize, prior: &[CommunityPart]) -> u32 {
    match format {
        EncodingFormat::Narrow => PART16_MAX,
        EncodingFormat::Wide => u32::MAX,
        EncodingFormat::Extended => {
            if index == 0 {
                u32::MAX
            } else {
                match prior.first() {
                    Some(CommunityPart::Literal(global)) if *global > PART16_MAX => PART16_MAX,
                    _ => u32::MAX,
                }
            }
        }
    }
}

/// Parses a single part token into a literal or macro.
fn parse_part(
    format: EncodingFormat,
    token: &str,
    max: u32,
    rs_as: Asn,
) -> Result<CommunityPart, CommunityTextError> {
    match token {
        "peer_as" => Ok(CommunityPart::PeerAs),
        "dyn_val" => Ok(CommunityPart::DynVal),
        "rs_as" => {
            let value = rs_as.get();
            if value > max {
                return Err(CommunityTextError::PartOutOfRange {
                    format,
                    value: u64::from(value),
                    max,
                });
            }
            Ok(CommunityPart::Literal(value))
        }
        _ => {
            let Ok(value) = token.parse::<u64>() else {
                return Err(CommunityTextError::InvalidPart {
                    part: token.to_string(),
                });
            };
            if value > u64::from(max) {
                return Err(CommunityTextError::PartOutOfRange {
                    format,
                    value,
                    max,
                });
            }
            let Ok(literal) = u32::try_from(value) else {
                return Err(CommunityTextError::PartOutOfRange {
                    format,
                    value,
                    max,
                });
            };
            Ok(CommunityPart::Literal(literal))
        }
    }
}

/// Enforces the macro policy of the owning community definition.
fn enforce_expectation(
    parts: &[CommunityPart],
    expectation: MacroExpectation,
) -> Result<(), CommunityTextError> {
    let trailing = parts.last().copied();
    match expectation {
        MacroExpectation::Forbidden => {
            for part in parts {
                if let Some(name) = part.macro_name() {
                    return Err(CommunityTextError::MacroNotAllowed {
                        name,
                    });
                }
            }
            Ok(())
        }
        MacroExpectation::RequirePeerAs => {
            if parts.iter().any(|part| matches!(part, CommunityPart::DynVal)) {
                return Err(CommunityTextError::MacroNotAllowed {
                    name: "dyn_val",
                });
            }
            if matches!(trailing, Some(CommunityPart::PeerAs)) {
                Ok(())
            } else {
                Err(CommunityTextError::MissingMacro {
                    name: "peer_as",
                })
            }
        }
        MacroExpectation::RequireDynVal => {
            if parts.iter().any(|part| matches!(part, CommunityPart::PeerAs)) {
                return Err(CommunityTextError::MacroNotAllowed {
                    name: "peer_as",
                });
            }
            if matches!(trailing, Some(CommunityPart::DynVal)) {
                Ok(())
            } else {
                Err(CommunityTextError::MissingMacro {
                    name: "dyn_val",
                })
            }
        }
    }
}

// ============================================================================
// SECTION: Community Values
// ============================================================================

/// A community's configured encodings across all formats.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommunityValue {
    /// Narrow (RFC 1997) encoding, if configured.
    pub narrow: Option<CommunityEncoding>,
    /// Wide (RFC 8092) encoding, if configured.
    pub wide: Option<CommunityEncoding>,
    /// Extended (RFC 4360) encoding, if configured.
    pub extended: Option<CommunityEncoding>,
}

impl CommunityValue {
    /// Returns the encoding for a format, if configured.
    #[must_use]
    pub const fn encoding(&self, format: EncodingFormat) -> Option<&CommunityEncoding> {
        match format {
            EncodingFormat::Narrow => self.narrow.as_ref(),
            EncodingFormat::Wide => self.wide.as_ref(),
            EncodingFormat::Extended => self.extended.as_ref(),
        }
    }

    /// Stores an encoding in the slot matching its format.
    pub fn insert(&mut self, encoding: CommunityEncoding) {
        match encoding.format() {
            EncodingFormat::Narrow => self.narrow = Some(encoding),
            EncodingFormat::Wide => self.wide = Some(encoding),
            EncodingFormat::Extended => self.extended = Some(encoding),
        }
    }

    /// Returns whether no encoding is configured at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.narrow.is_none() && self.wide.is_none() && self.extended.is_none()
    }
}
