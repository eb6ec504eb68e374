// crates/routewarden-core/src/lib.rs
// ============================================================================
// Module: Routewarden Core Library
// Description: Public API surface for the Routewarden policy core.
// Purpose: Expose the policy schema, community model, and validation runtime.
// Dependencies: crate::{core, runtime}
// ============================================================================

//! ## Overview
//! Routewarden core validates declarative route-server policy documents:
//! it type-checks and normalizes the configuration tree against a typed
//! schema, parses BGP community values with their macro semantics, proves
//! pairwise community non-overlap, and enforces the cross-field invariants
//! a usable policy must satisfy. It performs static, offline verification
//! only and never talks to a running router.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use runtime::CheckedPolicy;
pub use runtime::CommunityGroup;
pub use runtime::PolicyChecker;
pub use runtime::ScrubCapability;
pub use runtime::detect_overlaps;
pub use runtime::validate_tree;
