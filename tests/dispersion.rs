/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Whole-pipeline checks through the facade crate.

extern crate env_logger;
extern crate phdisp;

use phdisp::bravais::Lattice;
use phdisp::phonons::{dispersion, frequencies, Basis, DynamicalMatrix, ForceConstants};
use phdisp::Serial;

fn init_logger() {
    let _ = env_logger::try_init();
}

// Monatomic hexagonal sheet with anisotropic nearest-neighbor springs.
fn hexagonal_sheet() -> (ForceConstants, Basis) {
    let (k, alpha) = (1.0, 0.5);
    let lattice = Lattice::Hexagonal { a: 1.0, c_over_a: 4.0 };
    let at = lattice.vectors();

    let mut fc = ForceConstants::zeros(1, [3, 3, 1]).unwrap();
    let neighbors: [[usize; 2]; 6] = [[1, 0], [2, 0], [0, 1], [0, 2], [1, 1], [2, 2]];
    for &[m1, m2] in &neighbors {
        let c1 = if m1 == 2 { -1.0 } else { m1 as f64 };
        let c2 = if m2 == 2 { -1.0 } else { m2 as f64 };
        let r = [c1 * at[0][0] + c2 * at[1][0], c1 * at[0][1] + c2 * at[1][1]];
        let norm = (r[0] * r[0] + r[1] * r[1]).sqrt();
        let unit = [r[0] / norm, r[1] / norm];

        let block = fc.block_mut(0, 0, [m1, m2, 0]);
        for i in 0..2 {
            for j in 0..2 {
                block[i][j] = -k * (if i == j { 1.0 } else { 0.0 }) - k * alpha * unit[i] * unit[j];
            }
        }
        block[2][2] = -k;
    }
    fc.apply_acoustic_sum_rule();

    let basis = Basis::new(&lattice, vec![[0.0; 3]], vec![1.0]).unwrap();
    (fc, basis)
}

#[test]
fn hexagonal_sheet_end_to_end() {
    init_logger();

    let comm = Serial;
    let (fc, basis) = hexagonal_sheet();
    let dynmat = DynamicalMatrix::build(&comm, &fc, &basis, 1e-7).unwrap();

    let nq = 6;
    let out = dispersion(&comm, &dynmat, nq, true, true).unwrap();
    let order = out.order.as_ref().expect("ordering was requested");
    assert_eq!(out.frequencies.dim(), (nq, nq, 3));
    assert_eq!(order.dim(), (nq, nq, 3));

    // acoustic modes vanish at the zone center (grid origin after the
    // final shift)
    for band in 0..3 {
        assert!(out.frequencies[[0, 0, band]].abs() < 1e-6);
    }

    // a stable lattice: nothing imaginary anywhere
    assert!(out.frequencies.iter().all(|&w| w > -1e-6));

    // every point carries a valid permutation
    for i in 0..nq {
        for j in 0..nq {
            let mut perm: Vec<usize> = (0..3).map(|b| order[[i, j, b]]).collect();
            perm.sort();
            assert_eq!(perm, vec![0, 1, 2]);
        }
    }

    // deterministic: a second run reproduces the arrays exactly
    let again = dispersion(&comm, &dynmat, nq, true, true).unwrap();
    assert_eq!(again.frequencies, out.frequencies);
    assert_eq!(again.order.unwrap(), *order);
}

#[test]
fn mesh_matches_single_point_evaluation() {
    init_logger();

    let comm = Serial;
    let (fc, basis) = hexagonal_sheet();
    let dynmat = DynamicalMatrix::build(&comm, &fc, &basis, 1e-7).unwrap();

    let nq = 4;
    let out = dispersion(&comm, &dynmat, nq, false, false).unwrap();

    // mesh point (i, j) samples q = 2 pi (i - nq/2, j - nq/2) / nq
    use std::f64::consts::PI;
    for i in 0..nq {
        for j in 0..nq {
            let q1 = 2.0 * PI * (i as f64 - (nq / 2) as f64) / nq as f64;
            let q2 = 2.0 * PI * (j as f64 - (nq / 2) as f64) / nq as f64;
            let direct = frequencies(&dynmat.at([q1, q2, 0.0])).unwrap();
            for band in 0..3 {
                let delta = (out.frequencies[[i, j, band]] - direct[band]).abs();
                assert!(delta < 1e-10, "mismatch {} at ({}, {})", delta, i, j);
            }
        }
    }
}

#[test]
fn unsupported_lattice_convention_aborts_early() {
    let err = Lattice::from_code(12, &[1.0, 0.0, 1.0], None).unwrap_err();
    let err = err.downcast::<phdisp::bravais::UnsupportedLatticeError>().unwrap();
    assert_eq!(err.code, 12);
}
