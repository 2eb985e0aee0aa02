//! Integration tests exercising hmat-core end to end: build an H-matrix,
//! run an operation, and check the result against a plain dense computation.

use approx::assert_abs_diff_eq;
use hmat_core::add::add;
use hmat_core::cluster::Cluster;
use hmat_core::config::Tolerance;
use hmat_core::convert::to_dense;
use hmat_core::dense::DMat;
use hmat_core::lu::lu;
use hmat_core::mul::mul;
use hmat_core::node::{Block, HMatrix};

fn dense_leaf(c: DMat) -> HMatrix {
    let (m, n) = c.shape();
    HMatrix::from_dense(c, Cluster::leaf(0..m), Cluster::leaf(0..n))
}

/// Deterministic fill, standing in for a random matrix without pulling in a
/// dedicated RNG crate.
fn pseudo_random(m: usize, n: usize, seed: u64) -> DMat {
    DMat::from_fn(m, n, |i, j| {
        let k = seed.wrapping_add((i * n + j) as u64).wrapping_mul(2654435761);
        ((k >> 16) & 0xff) as f64 / 255.0 - 0.5
    })
}

/// A two-level H-matrix over a `4n x 4n` index range: identity-scaled dense
/// diagonal leaves, rank-1 off-diagonal leaves.
fn two_level_identity(n: usize, diag_scale: f64) -> HMatrix {
    let size = 2 * n;
    let root = Cluster::new_balanced(0, size, n);
    let row0 = Cluster::leaf(0..n);
    let row1 = Cluster::leaf(n..size);

    let d00 = HMatrix::from_dense(
        DMat::from_fn(n, n, |i, j| if i == j { diag_scale } else { 0.0 }),
        row0.clone(),
        row0.clone(),
    );
    let d11 = HMatrix::from_dense(
        DMat::from_fn(n, n, |i, j| if i == j { diag_scale } else { 0.0 }),
        row1.clone(),
        row1.clone(),
    );
    let a01 = DMat::from_fn(n, 1, |_, _| 1.0);
    let b01 = DMat::from_fn(n, 1, |i, _| (i + 1) as f64 * 0.1);
    let d01 = HMatrix::from_low_rank(a01, b01, row0.clone(), row1.clone()).unwrap();
    let a10 = DMat::from_fn(n, 1, |_, _| 1.0);
    let b10 = DMat::from_fn(n, 1, |i, _| (i + 1) as f64 * 0.05);
    let d10 = HMatrix::from_low_rank(a10, b10, row1.clone(), row0.clone()).unwrap();

    HMatrix::from_children(
        [[Box::new(d00), Box::new(d01)], [Box::new(d10), Box::new(d11)]],
        root.clone(),
        root,
    )
    .unwrap()
}

#[test]
fn dense_4x4_identity_round_trips() {
    let c = DMat::identity(4);
    let h = dense_leaf(c.clone());
    let back = to_dense(&h);
    for i in 0..4 {
        for j in 0..4 {
            assert_abs_diff_eq!(back.get(i, j), c.get(i, j), epsilon = 1e-12);
        }
    }
}

#[test]
fn rank_one_outer_product_matches_dense() {
    let a = DMat::from_fn(3, 1, |i, _| (i + 1) as f64);
    let b = DMat::from_fn(3, 1, |i, _| (3 - i) as f64);
    let row = Cluster::leaf(0..3);
    let col = Cluster::leaf(0..3);
    let h = HMatrix::from_low_rank(a.clone(), b.clone(), row, col).unwrap();

    let out = to_dense(&h);
    for i in 0..3 {
        for j in 0..3 {
            let expect = a.get(i, 0) * b.get(j, 0);
            assert_abs_diff_eq!(out.get(i, j), expect, epsilon = 1e-12);
        }
    }
}

#[test]
fn two_level_hierarchical_identity_matvec() {
    let h = two_level_identity(2, 1.0);
    let v = vec![1.0, 2.0, 3.0, 4.0];
    let r = h.matvec(&v, 1.0);
    for i in 0..4 {
        assert_abs_diff_eq!(r[i], v[i], epsilon = 1e-10);
    }
}

#[test]
fn add_dense_to_low_rank_grows_then_stays_low_rank() {
    let row = Cluster::leaf(0..4);
    let col = Cluster::leaf(0..4);
    let a_fac = DMat::from_fn(4, 1, |_, _| 1.0);
    let b_fac = DMat::from_fn(4, 1, |i, _| (i + 1) as f64);
    let mut lhs = HMatrix::from_low_rank(a_fac, b_fac, row.clone(), col.clone()).unwrap();
    let rhs_dense = DMat::from_fn(4, 4, |i, j| if i == j { 1.0 } else { 0.0 });
    let rhs = HMatrix::from_dense(rhs_dense.clone(), row, col);

    add(&mut lhs, &rhs, 1.0, Tolerance::new(1e-10).unwrap()).unwrap();
    assert!(matches!(lhs.block(), Block::LowRank { .. }));

    let out = to_dense(&lhs);
    for i in 0..4 {
        for j in 0..4 {
            let expect = ((j + 1) as f64) + rhs_dense.get(i, j);
            assert_abs_diff_eq!(out.get(i, j), expect, epsilon = 1e-8);
        }
    }
}

/// A genuinely two-level hierarchical matrix: `from_children` over four
/// dense leaf quadrants, each filled independently.
fn random_hierarchical(n: usize, seed: u64) -> HMatrix {
    let size = 2 * n;
    let root = Cluster::new_balanced(0, size, n);
    let row0 = Cluster::leaf(0..n);
    let row1 = Cluster::leaf(n..size);

    let d00 = HMatrix::from_dense(pseudo_random(n, n, seed), row0.clone(), row0.clone());
    let d01 = HMatrix::from_dense(pseudo_random(n, n, seed + 1), row0.clone(), row1.clone());
    let d10 = HMatrix::from_dense(pseudo_random(n, n, seed + 2), row1.clone(), row0.clone());
    let d11 = HMatrix::from_dense(pseudo_random(n, n, seed + 3), row1.clone(), row1.clone());

    HMatrix::from_children(
        [[Box::new(d00), Box::new(d01)], [Box::new(d10), Box::new(d11)]],
        root.clone(),
        root,
    )
    .unwrap()
}

#[test]
fn hierarchical_times_hierarchical_matches_dense_product() {
    let n = 4;
    let size = 2 * n;

    let h_a = random_hierarchical(n, 17);
    let h_b = random_hierarchical(n, 91);
    assert!(matches!(h_a.block(), Block::Hierarchical { .. }));
    assert!(matches!(h_b.block(), Block::Hierarchical { .. }));
    let a_full = to_dense(&h_a);
    let b_full = to_dense(&h_b);

    let prod = mul(&h_a, &h_b, Tolerance::new(1e-10).unwrap()).unwrap();
    let out = to_dense(&prod);

    let mut expect = DMat::zeros(size, size);
    for i in 0..size {
        for j in 0..size {
            let mut acc = 0.0;
            for k in 0..size {
                acc += a_full.get(i, k) * b_full.get(k, j);
            }
            expect.set(i, j, acc);
        }
    }

    for i in 0..size {
        for j in 0..size {
            assert_abs_diff_eq!(out.get(i, j), expect.get(i, j), epsilon = 1e-8);
        }
    }
}

#[test]
fn lu_then_solve_on_two_level_hmatrix_with_rank_two_off_diagonal() {
    let n = 4;
    let size = 2 * n;
    let root = Cluster::new_balanced(0, size, n);
    let row0 = Cluster::leaf(0..n);
    let row1 = Cluster::leaf(n..size);

    // Diagonally dominant tridiagonal blocks, distinct per-row scaling —
    // non-scalar, so they don't commute with the off-diagonal blocks.
    let d00 = HMatrix::from_dense(
        DMat::from_fn(n, n, |i, j| {
            if i == j {
                5.0 + i as f64
            } else if i.abs_diff(j) == 1 {
                0.5
            } else {
                0.0
            }
        }),
        row0.clone(),
        row0.clone(),
    );
    let d11 = HMatrix::from_dense(
        DMat::from_fn(n, n, |i, j| {
            if i == j {
                9.0 + i as f64
            } else if i.abs_diff(j) == 1 {
                0.3
            } else {
                0.0
            }
        }),
        row1.clone(),
        row1.clone(),
    );

    let a01 = DMat::from_fn(n, 2, |i, k| if k == 0 { 0.1 + 0.02 * i as f64 } else { 0.05 - 0.01 * i as f64 });
    let b01 = DMat::from_fn(n, 2, |i, k| if k == 0 { 0.02 * (i + 1) as f64 } else { 0.01 * (i + 2) as f64 });
    let d01 = HMatrix::from_low_rank(a01, b01, row0.clone(), row1.clone()).unwrap();
    assert!(matches!(d01.block(), Block::LowRank { a, .. } if a.ncols() == 2));

    let a10 = DMat::from_fn(n, 2, |i, k| if k == 0 { 0.08 - 0.01 * i as f64 } else { 0.03 + 0.02 * i as f64 });
    let b10 = DMat::from_fn(n, 2, |i, k| if k == 0 { 0.015 * (i + 1) as f64 } else { 0.025 * (i + 2) as f64 });
    let d10 = HMatrix::from_low_rank(a10, b10, row1.clone(), row0.clone()).unwrap();
    assert!(matches!(d10.block(), Block::LowRank { a, .. } if a.ncols() == 2));

    let mut h = HMatrix::from_children(
        [[Box::new(d00), Box::new(d01)], [Box::new(d10), Box::new(d11)]],
        root.clone(),
        root,
    )
    .unwrap();

    let h_dense = h.to_dense();
    let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let mut y = vec![0.0; size];
    for i in 0..size {
        let mut acc = 0.0;
        for j in 0..size {
            acc += h_dense.get(i, j) * x[j];
        }
        y[i] = acc;
    }

    lu(&mut h, Tolerance::new(1e-10).unwrap()).unwrap();
    let x_hat = h.solve(&y).unwrap();
    for i in 0..size {
        assert_abs_diff_eq!(x_hat[i], x[i], epsilon = 1e-6);
    }
}
