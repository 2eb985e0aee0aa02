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

//! Example for hmat-core crate showcasing basic usage for the README.

fn main() {
    use hmat_core::cluster::Cluster;
    use hmat_core::config::Tolerance;
    use hmat_core::dense::DMat;
    use hmat_core::lu::lu;
    use hmat_core::node::HMatrix;

    env_logger::init();

    // Build a 4x4 matrix as a two-level H-matrix: two diagonal dense blocks,
    // two rank-1 off-diagonal blocks.
    let root = Cluster::new_balanced(0, 4, 2);
    let row0 = Cluster::leaf(0..2);
    let row1 = Cluster::leaf(2..4);
    let col0 = Cluster::leaf(0..2);
    let col1 = Cluster::leaf(2..4);

    let diag = |s: f64| DMat::from_fn(2, 2, |i, j| if i == j { s } else { 0.0 });

    let d00 = HMatrix::from_dense(diag(4.0), row0.clone(), col0.clone());
    let d11 = HMatrix::from_dense(diag(3.0), row1.clone(), col1.clone());

    let a01 = DMat::from_fn(2, 1, |_, _| 1.0);
    let b01 = DMat::from_fn(2, 1, |i, _| 0.5 * (i + 1) as f64);
    let d01 = HMatrix::from_low_rank(a01, b01, row0.clone(), col1.clone()).unwrap();

    let a10 = DMat::from_fn(2, 1, |_, _| 1.0);
    let b10 = DMat::from_fn(2, 1, |i, _| 0.25 * (i + 1) as f64);
    let d10 = HMatrix::from_low_rank(a10, b10, row1.clone(), col0.clone()).unwrap();

    let mut h = HMatrix::from_children(
        [[Box::new(d00), Box::new(d01)], [Box::new(d10), Box::new(d11)]],
        root.clone(),
        root,
    )
    .unwrap();

    println!("Before factorization: {:?}", h.info());

    let v = vec![1.0, 2.0, 3.0, 4.0];
    println!("H . v = {:?}", h.matvec(&v, 1.0));

    lu(&mut h, Tolerance::default()).expect("LU factorization should succeed");
    println!("Permutation: {:?}", h.permutation());

    let y = vec![1.0, 2.0, 3.0, 4.0];
    let x = h.solve(&y).expect("solve should succeed");
    println!("Solved H . x = y for x = {:?}", x);
}
