// crates/routewarden-core/src/core/mod.rs
// ============================================================================
// Module: Routewarden Core Types
// Description: Canonical policy schema, community model, and diagnostics.
// Purpose: Provide stable, serializable types shared by the runtime checks.
// Dependencies: serde, smallvec, thiserror
// ============================================================================

//! ## Overview
//! Core types define the policy document schema, the built-in community
//! registry, the typed community value model, and the diagnostic vocabulary.
//! These types are the canonical source of truth for the validator, the
//! overlap detector, and any derived report surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod asn;
pub mod community;
pub mod diagnostics;
pub mod error;
pub mod schema;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use asn::Asn;
pub use asn::PRIVATE_ASN16_FIRST;
pub use asn::PRIVATE_ASN16_LAST;
pub use asn::PRIVATE_ASN32_FIRST;
pub use asn::PRIVATE_ASN32_LAST;
pub use community::AS_SET_TAGGING_TAGS;
pub use community::BUILTIN_COMMUNITIES;
pub use community::CommunityDefinition;
pub use community::CommunityRole;
pub use community::CommunityTag;
pub use community::MacroExpectation;
pub use community::REASON_TAGGING_TAGS;
pub use community::REJECT_CAUSE_TAG;
pub use community::builtin_community;
pub use community::is_builtin_tag;
pub use diagnostics::CollectingSink;
pub use diagnostics::Diagnostic;
pub use diagnostics::DiagnosticSink;
pub use diagnostics::OverlapConflict;
pub use diagnostics::OverlapReason;
pub use diagnostics::RejectTagProblem;
pub use diagnostics::Severity;
pub use error::PolicyError;
pub use schema::AddressFamily;
pub use schema::FieldDescriptor;
pub use schema::FieldKind;
pub use schema::SchemaMap;
pub use schema::policy_schema;
pub use value::CommunityEncoding;
pub use value::CommunityPart;
pub use value::CommunityTextError;
pub use value::CommunityValue;
pub use value::EncodingFormat;
pub use value::ExtendedSubtype;
