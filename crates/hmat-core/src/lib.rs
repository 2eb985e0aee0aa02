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

//! # hmat-core: hierarchical-matrix (H-matrix) arithmetic.
//!
//! This crate provides a data-sparse representation of dense matrices built
//! from a recursive 2x2 block partition, where far-field blocks are
//! compressed to low rank. It implements the arithmetic needed to use that
//! representation as a drop-in linear-algebra backend: addition,
//! multiplication, matrix-vector product, triangular solve, and block LU
//! factorization with solve.
//!
//! ## Key Concepts
//!
//! - **Cluster tree**: an index-range partition ([`cluster::Cluster`]) shared
//!   by rows and columns, built by balanced bisection down to a leaf size.
//! - **Block** ([`node::Block`]): a node is exactly one of dense, low-rank
//!   (`A . B^T`), or hierarchical (2x2 children) — never a mix.
//! - **Tolerance** ([`config::Tolerance`]): the truncation tolerance used
//!   everywhere rank is chosen from a singular-value spectrum.
//!
//! ## Example
//!
//! ```rust
//! use hmat_core::cluster::Cluster;
//! use hmat_core::config::Tolerance;
//! use hmat_core::dense::DMat;
//! use hmat_core::node::HMatrix;
//!
//! let row = Cluster::leaf(0..3);
//! let col = Cluster::leaf(0..3);
//! let c = DMat::from_fn(3, 3, |i, j| if i == j { 2.0 } else { 0.0 });
//! let h = HMatrix::from_dense(c, row, col);
//!
//! let v = vec![1.0, 1.0, 1.0];
//! let r = h.matvec(&v, 1.0);
//! assert_eq!(r, vec![2.0, 2.0, 2.0]);
//!
//! println!("{:?}", h.info());
//! // # HMatInfo { dense_count: 1, lowrank_count: 0, depth: 1, compression_ratio: 1.0 }
//! let _ = Tolerance::default();
//! ```

pub mod add;
pub mod cluster;
pub mod config;
pub mod convert;
pub mod dense;
pub mod error;
pub mod lu;
pub mod matvec;
pub mod mul;
pub mod node;
pub mod permute;
pub mod solve;
pub mod trisolve;
pub mod truncate;

pub use cluster::Cluster;
pub use config::{RankCap, Tolerance};
pub use error::{HMatError, Result};
pub use node::{Block, HMatInfo, HMatrix};
