// crates/routewarden-core/src/core/error.rs
// ============================================================================
// Module: Policy Errors
// Description: Aggregate error returned when a policy document is unusable.
// Purpose: Bundle every fatal finding of a validation run into one error.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Individual findings travel through the diagnostic sink; the aggregate
//! [`PolicyError`] only says that the run failed and carries the fatal
//! subset, so callers can refuse the configuration without re-deriving
//! which findings were fatal.

use thiserror::Error;

use crate::core::diagnostics::Diagnostic;

/// Failure of a policy validation run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The document is structurally or semantically invalid.
    #[error("policy validation failed with {} error(s)", errors.len())]
    Invalid {
        /// Every fatal finding of the run, in discovery order.
        errors: Vec<Diagnostic>,
    },
}

impl PolicyError {
    /// Returns the fatal findings carried by this error.
    #[must_use]
    pub fn errors(&self) -> &[Diagnostic] {
        match self {
            Self::Invalid {
                errors,
            } => errors,
        }
    }
}
