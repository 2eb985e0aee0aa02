// Copyright (C) 2026 Alberson Miranda
//
// This file is part of hmat-rs.
//
// hmat-rs is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// hmat-rs is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with hmat-rs.  If not, see <https://www.gnu.org/licenses/>.

//! Error types for H-matrix operations.

use thiserror::Error;

/// Errors that can occur while building or operating on H-matrices.
#[derive(Debug, Error)]
pub enum HMatError {
    /// Operand dimensions are incompatible for the requested operation
    /// (e.g. `a.n != b.m` in multiply, mismatched child splits in add/mul).
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// An operation was called on a variant that cannot support it, e.g.
    /// triangular solve or LU with a low-rank `a` operand.
    #[error("variant precondition violated: {0}")]
    VariantPrecondition(String),

    /// A structural invariant was violated: a permutation crossed a block
    /// boundary, child splits didn't sum to the parent size, or an operand
    /// required to be non-empty was empty.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The underlying dense kernel reported a (near-)zero pivot.
    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),
}

/// Result type alias for H-matrix operations.
pub type Result<T> = std::result::Result<T, HMatError>;
