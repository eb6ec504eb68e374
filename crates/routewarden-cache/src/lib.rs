// crates/routewarden-cache/src/lib.rs
// ============================================================================
// Module: Routewarden Cache Library
// Description: TTL-gated file cache for expensive policy inputs.
// Purpose: Expose the get-or-compute collaborator used around slow fetches.
// Dependencies: crate::file_cache
// ============================================================================

//! ## Overview
//! External data a policy build depends on (registry dumps, peer lists) is
//! expensive to fetch and changes slowly. This crate persists computed
//! values as timestamped JSON records and serves them back until a
//! time-to-live lapses, recomputing on any miss. It is independent of the
//! policy core: the core never performs I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod file_cache;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use file_cache::CacheError;
pub use file_cache::CacheOutcome;
pub use file_cache::FileCache;
