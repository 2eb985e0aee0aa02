//! Block LU factorization: `lu(h)` factorizes `h` in place, producing an
//! H-matrix whose dense leaves carry LU factors and a composed row
//! permutation (§4.6).

use log::debug;

use crate::add::add;
use crate::config::Tolerance;
use crate::dense;
use crate::error::{HMatError, Result};
use crate::mul::mul;
use crate::node::{Block, HMatrix};
use crate::permute::permute;
use crate::trisolve::{trisolve, trisolve_right};

/// Factorizes `h` in place. Leaf dense blocks are overwritten by their
/// partial-pivoted LU factors (§4.6 step 1); hierarchical nodes recurse,
/// propagating pivots across the anti-diagonal children and updating the
/// Schur complement with the truncating multiply/add engines (§4.6 step 2).
pub fn lu(h: &mut HMatrix, tol: Tolerance) -> Result<()> {
    if matches!(h.block(), Block::LowRank { .. }) {
        return Err(HMatError::VariantPrecondition(
            "lu requires a non-low-rank operand".into(),
        ));
    }
    if matches!(h.block(), Block::Hierarchical { .. }) {
        return lu_hierarchical(h, tol);
    }
    let p = match h.block_mut() {
        Block::Dense { c } => {
            debug!("lu: dense leaf {}x{}", c.nrows(), c.ncols());
            dense::getrf(c)?
        }
        _ => unreachable!("dense case checked above"),
    };
    h.set_permutation(p);
    Ok(())
}

fn lu_hierarchical(h: &mut HMatrix, tol: Tolerance) -> Result<()> {
    let Block::Hierarchical { children } = h.block_mut() else {
        unreachable!("lu_hierarchical requires a hierarchical node")
    };

    debug!("lu: hierarchical node {:?}", h.shape());

    lu(&mut children[0][0], tol)?;
    let p11 = children[0][0]
        .permutation()
        .expect("lu! always sets a permutation on the diagonal block")
        .to_vec();

    permute(&mut children[0][1], &p11)?;

    trisolve(&children[0][0], &mut children[0][1], true, true, tol)?;
    trisolve_right(&children[0][0], &mut children[1][0], false, false, tol)?;

    let update = mul(&children[1][0], &children[0][1], tol)?;
    add(&mut children[1][1], &update, -1.0, tol)?;

    lu(&mut children[1][1], tol)?;
    let p22 = children[1][1]
        .permutation()
        .expect("lu! always sets a permutation on the diagonal block")
        .to_vec();

    permute(&mut children[1][0], &p22)?;

    let m1 = children[0][0].shape().0;
    let mut composed = p11;
    composed.extend(p22.into_iter().map(|p| p + m1));

    h.set_permutation(composed);
    Ok(())
}
