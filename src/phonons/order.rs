/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Continuous band identity across a wavevector mesh.
//!
//! The eigensolver hands back bands in arbitrary per-point order; these
//! routines recover a physically continuous labeling.  [`band_order`] does
//! greedy eigenvector-overlap tracking along a path of adjacent points;
//! [`symmetry_consensus`] repairs locally inconsistent assignments on a
//! hexagonal mesh by majority vote over each point's symmetry orbit.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};
use num_complex::Complex64;
use phdisp_bravais::images;
use std::collections::BTreeMap;

/// Adjacent frequencies closer than this are treated as degenerate, and
/// a point containing them never becomes the tracking reference.
pub const DEGENERACY_THRESHOLD: f64 = 1e-10;

/// Track band identity along a path of wavevector points.
///
/// `w` is `[point, band]` (ascending per point, as the eigensolver gives
/// it); `e` is `[point, component, band]`.  Points must be path-ordered so
/// that consecutive entries are spatially adjacent.  Returns `[point,
/// band]`: slot `nu` at point `n` is band `order[[n, nu]]`.
///
/// Slot `nu` at point `n` takes the band whose eigenvector has the
/// largest-magnitude inner product with the reference point's eigenvector
/// for that slot.  The reference advances to each point whose frequencies
/// are pairwise separated; tracking through a degenerate point keeps the
/// last well-separated reference, which avoids drifting through
/// ill-defined overlaps.
pub fn band_order(w: ArrayView2<'_, f64>, e: ArrayView3<'_, Complex64>) -> Array2<usize> {
    let (num_points, bands) = w.dim();
    assert_eq!(e.dim(), (num_points, bands, bands), "BUG! mismatched eigenvector table");

    let mut order = Array2::zeros((num_points, bands));
    if num_points == 0 {
        return order;
    }

    let is_separated = |n: usize| {
        (1..bands).all(|b| (w[[n, b]] - w[[n, b - 1]]).abs() > DEGENERACY_THRESHOLD)
    };

    for nu in 0..bands {
        order[[0, nu]] = nu;
    }
    if !is_separated(0) {
        warn!(
            "band tracking starts from a degenerate point; \
             the initial band identity is arbitrary"
        );
    }

    let mut reference = 0;
    let mut stale = 0usize;
    for n in 1..num_points {
        for nu in 0..bands {
            let tracked = order[[reference, nu]];
            let mut best = 0;
            let mut best_overlap = -1.0;
            for mu in 0..bands {
                let mut acc = Complex64::new(0.0, 0.0);
                for k in 0..bands {
                    acc += e[[reference, k, tracked]] * e[[n, k, mu]].conj();
                }
                let overlap = acc.norm();
                if overlap > best_overlap {
                    best = mu;
                    best_overlap = overlap;
                }
            }
            order[[n, nu]] = best;
        }

        match is_separated(n) {
            true => {
                reference = n;
                stale = 0;
            },
            false => stale += 1,
        }
    }
    if stale > 0 && stale == num_points - 1 {
        warn!(
            "no non-degenerate reference point anywhere along the mesh path; \
             band tracking is best-effort"
        );
    }
    order
}

/// Repair band assignments that break hexagonal mesh symmetry.
///
/// For each mesh point, tallies the permutation assigned at every point of
/// its point-group orbit and adopts the majority, with ties going to the
/// lexicographically smallest permutation.  Points are corrected in mesh
/// order; a correction is visible to the tallies of later points.
pub fn symmetry_consensus(order: &mut Array3<usize>) {
    let (nq, nq2, bands) = order.dim();
    assert_eq!(nq, nq2, "BUG! non-square mesh");

    for n in 0..nq {
        for m in 0..nq {
            let mut counts: BTreeMap<Vec<usize>, usize> = BTreeMap::new();
            for (i1, i2) in images(n, m, nq) {
                let perm: Vec<usize> = (0..bands).map(|b| order[[i1, i2, b]]).collect();
                *counts.entry(perm).or_insert(0) += 1;
            }

            let mut winner: Option<(&Vec<usize>, usize)> = None;
            for (perm, &count) in &counts {
                match winner {
                    Some((_, best)) if best >= count => {},
                    _ => winner = Some((perm, count)),
                }
            }
            let winner = winner.expect("BUG! empty orbit").0.clone();
            for b in 0..bands {
                order[[n, m, b]] = winner[b];
            }
        }
    }
}

//--------------------------------------------------------------------------
