//! Tolerance and rank-cap configuration threaded through the public API.
//!
//! The source this engine is modeled on used `1e-6` at some call sites and
//! `1e-10` at others; a single [`Tolerance`] type is used everywhere instead
//! so call sites can't silently drift.

use crate::error::{HMatError, Result};

/// Truncation tolerance `ε` used by rank truncation and rounded addition.
///
/// Defaults to `1e-6`. Singular values with `σ_k / σ_1 <= ε` are discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance(f64);

impl Tolerance {
    /// The library-wide default tolerance.
    pub const DEFAULT: f64 = 1e-6;

    /// Builds a tolerance, rejecting non-positive values.
    pub fn new(eps: f64) -> Result<Self> {
        if !(eps > 0.0) {
            return Err(HMatError::InvariantViolation(format!(
                "tolerance must be positive, got {eps}"
            )));
        }
        Ok(Self(eps))
    }

    /// Returns the tolerance as a plain `f64`.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Optional cap `N` on the rank returned by truncation (§4.1 step 4).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankCap(pub Option<usize>);

impl RankCap {
    /// No cap: truncation is governed by tolerance alone.
    pub const NONE: Self = Self(None);

    /// Caps truncated rank at `n`.
    pub fn at_most(n: usize) -> Self {
        Self(Some(n))
    }

    /// Applies the cap to a tolerance-selected rank `k`.
    pub fn apply(self, k: usize) -> usize {
        match self.0 {
            Some(n) if k > n => n,
            _ => k,
        }
    }
}
