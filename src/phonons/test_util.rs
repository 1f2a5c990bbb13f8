/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Small model systems shared between tests.

use crate::{Basis, ForceConstants};

use phdisp_bravais::Lattice;

fn cubic_unit() -> Lattice {
    Lattice::Free {
        vectors: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    }
}

/// Monatomic chain along x with nearest-neighbor springs `k`, on a
/// periodic grid of `cells` cells.  The self-term comes from the acoustic
/// sum rule, so `w(q) = 2 sqrt(k/m) |sin(q/2)|` along the x band.
pub fn monatomic_chain(k: f64, mass: f64, cells: usize) -> (ForceConstants, Basis) {
    let mut fc = ForceConstants::zeros(1, [cells, 1, 1]).unwrap();
    fc.block_mut(0, 0, [1, 0, 0])[0][0] += -k;
    if cells > 2 {
        fc.block_mut(0, 0, [cells - 1, 0, 0])[0][0] += -k;
    }
    fc.apply_acoustic_sum_rule();

    let basis = Basis::new(&cubic_unit(), vec![[0.0; 3]], vec![mass]).unwrap();
    (fc, basis)
}

/// Two-atom chain along x: atoms at 0 and 1/2, nearest-neighbor springs
/// `k`, grid of 2 cells.
pub fn diatomic_chain(k: f64, mass_a: f64, mass_b: f64) -> (ForceConstants, Basis) {
    let mut fc = ForceConstants::zeros(2, [2, 1, 1]).unwrap();
    // right neighbor of atom 0 is atom 1 in the home cell; left neighbor
    // is atom 1 in the previous cell (class m1 = 1)
    fc.block_mut(0, 1, [0, 0, 0])[0][0] = -k;
    fc.block_mut(0, 1, [1, 0, 0])[0][0] = -k;
    fc.block_mut(1, 0, [0, 0, 0])[0][0] = -k;
    fc.block_mut(1, 0, [1, 0, 0])[0][0] = -k;
    fc.apply_acoustic_sum_rule();

    let basis = Basis::new(
        &cubic_unit(),
        vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]],
        vec![mass_a, mass_b],
    ).unwrap();
    (fc, basis)
}

/// Monatomic hexagonal sheet: in-plane springs `k (1 + alpha r^ (x) r^)`
/// to the six nearest neighbors, a plain `-k` out of plane, self-term from
/// the acoustic sum rule.  `alpha` breaks the in-plane isotropy per bond
/// so that the two in-plane bands separate away from high-symmetry points.
pub fn hexagonal_sheet(k: f64, alpha: f64) -> (ForceConstants, Basis) {
    let lattice = Lattice::Hexagonal { a: 1.0, c_over_a: 4.0 };
    let at = lattice.vectors();

    let mut fc = ForceConstants::zeros(1, [3, 3, 1]).unwrap();
    let neighbors: [[usize; 2]; 6] = [[1, 0], [2, 0], [0, 1], [0, 2], [1, 1], [2, 2]];
    for &[m1, m2] in &neighbors {
        // direction of the minimum image of this neighbor class
        let c1 = if m1 == 2 { -1.0 } else { m1 as f64 };
        let c2 = if m2 == 2 { -1.0 } else { m2 as f64 };
        let r = [c1 * at[0][0] + c2 * at[1][0], c1 * at[0][1] + c2 * at[1][1]];
        let norm = (r[0] * r[0] + r[1] * r[1]).sqrt();
        let unit = [r[0] / norm, r[1] / norm];

        let block = fc.block_mut(0, 0, [m1, m2, 0]);
        for i in 0..2 {
            for j in 0..2 {
                let outer = unit[i] * unit[j];
                block[i][j] = -k * (if i == j { 1.0 } else { 0.0 }) - k * alpha * outer;
            }
        }
        block[2][2] = -k;
    }
    fc.apply_acoustic_sum_rule();

    let basis = Basis::new(&lattice, vec![[0.0; 3]], vec![1.0]).unwrap();
    (fc, basis)
}
