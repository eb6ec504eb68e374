// crates/routewarden-core/src/runtime/mod.rs
// ============================================================================
// Module: Routewarden Runtime
// Description: Validation passes over policy documents.
// Purpose: Provide the tree validator, overlap detector, and policy checker.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! The runtime walks a raw policy tree with the schema validator, proves
//! community non-overlap with the detector, and orchestrates both plus the
//! cross-field rules in the policy checker. Everything is synchronous and
//! purely functional over its input.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod checker;
pub mod overlap;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use checker::CheckedPolicy;
pub use checker::PolicyChecker;
pub use overlap::CommunityGroup;
pub use overlap::ScrubCapability;
pub use overlap::detect_overlaps;
pub use validator::validate_tree;
