/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Phonon dispersion on a uniform 2D wavevector mesh.
//!
//! The mesh is split across the worker pool with a balanced contiguous
//! partition; each point is owned by exactly one worker.  With `order`
//! enabled, eigenvectors are computed and gauge-fixed, the coordinator
//! resolves a continuous band identity, and the final arrays are
//! broadcast, so every worker returns identical data.

use crate::{dynmat::DynamicalMatrix, freq, order as band, FailResult};

use ndarray::{Array3, ArrayView2, ArrayView3};
use num_complex::Complex64;
use phdisp_comm::{balanced_counts, Comm};
use std::f64::consts::PI;

/// Frequencies over the mesh, with the band-order permutation when
/// continuity resolution was requested.
///
/// `frequencies` is `[nq, nq, bands]`; `order[[i, j, nu]]` names the raw
/// eigensolver band that carries physical band `nu` at mesh point
/// `(i, j)`.
#[derive(Debug, Clone)]
pub struct Dispersion {
    pub frequencies: Array3<f64>,
    pub order: Option<Array3<usize>>,
}

const COORDINATOR: usize = 0;

/// Sample the dispersion on an `nq` x `nq` mesh.
///
/// Each axis evenly samples one reciprocal period, with one sample pinned
/// at the zero wavevector.  `order` enables continuity resolution;
/// `fix` additionally enables the hexagonal symmetry consensus (only
/// meaningful when `order` is set).
///
/// Collective; every worker must call with identical arguments and every
/// worker receives the identical result.
pub fn dispersion(
    comm: &impl Comm,
    dynmat: &DynamicalMatrix,
    nq: usize,
    order: bool,
    fix: bool,
) -> FailResult<Dispersion> {
    ensure!(nq >= 1, "dispersion mesh needs at least one point per axis");

    let bands = dynmat.num_bands();
    let nat = dynmat.num_atoms();
    let num_points = nq * nq;

    // axis samples, shifted so index nq/2 is the zero wavevector
    let axis: Vec<f64> = {
        (0..nq)
            .map(|i| 2.0 * PI * (i as f64 - (nq / 2) as f64) / nq as f64)
            .collect()
    };

    let counts = balanced_counts(num_points, comm.size());
    debug!(
        "dispersion: {}x{} mesh, {} bands, {} workers",
        nq, nq, bands, comm.size(),
    );

    // the coordinator owns the flattened mesh; everyone gets a share
    let flat_q = match comm.rank() == COORDINATOR {
        true => {
            let mut q = Vec::with_capacity(2 * num_points);
            for i in 0..nq {
                for j in 0..nq {
                    q.push(axis[i]);
                    q.push(axis[j]);
                }
            }
            Some(q)
        },
        false => None,
    };
    let q_counts: Vec<usize> = counts.iter().map(|&c| 2 * c).collect();
    let my_q = comm.scatter_v_f64(flat_q.as_ref().map(|q| &q[..]), &q_counts, COORDINATOR);
    let my_points = counts[comm.rank()];

    let w_counts: Vec<usize> = counts.iter().map(|&c| c * bands).collect();

    if !order {
        // frequencies only; replicate straight back to everyone
        let mut my_w = Vec::with_capacity(my_points * bands);
        for p in 0..my_points {
            let (q1, q2) = (my_q[2 * p], my_q[2 * p + 1]);
            let w = freq::frequencies(&dynmat.at([q1, q2, 0.0]))?;
            my_w.extend(w.iter().cloned());
        }
        let w_flat = comm.all_gather_v_f64(&my_w, &w_counts);
        return Ok(Dispersion {
            frequencies: Array3::from_shape_vec((nq, nq, bands), w_flat)?,
            order: None,
        });
    }

    // frequencies plus gauge-fixed displacements
    let u = dynmat.in_plane_reciprocal();
    let mut my_w = Vec::with_capacity(my_points * bands);
    let mut my_e = Vec::with_capacity(2 * my_points * bands * bands);
    for p in 0..my_points {
        let (q1, q2) = (my_q[2 * p], my_q[2 * p + 1]);
        let (w, mut e) = freq::frequencies_and_displacements(&dynmat.at([q1, q2, 0.0]))?;

        // undo the wavevector's polar angle on every atom's in-plane
        // pair, so eigenvectors at neighboring points compare directly
        let qx = q1 * u[0][0] + q2 * u[1][0];
        let qy = q1 * u[0][1] + q2 * u[1][1];
        let phi = qy.atan2(qx);
        for na in 0..nat {
            for mu in 0..bands {
                let pair = phdisp_bravais::rotate([e[[na, mu]], e[[na + nat, mu]]], -phi);
                e[[na, mu]] = pair[0];
                e[[na + nat, mu]] = pair[1];
            }
        }

        my_w.extend(w.iter().cloned());
        for k in 0..bands {
            for mu in 0..bands {
                my_e.push(e[[k, mu]].re);
                my_e.push(e[[k, mu]].im);
            }
        }
    }

    let e_counts: Vec<usize> = counts.iter().map(|&c| 2 * c * bands * bands).collect();
    let w_gathered = comm.gather_v_f64(&my_w, &w_counts, COORDINATOR);
    let e_gathered = comm.gather_v_f64(&my_e, &e_counts, COORDINATOR);

    let (mut w_flat, mut order_flat) = match (w_gathered, e_gathered) {
        (Some(w_flat), Some(e_flat)) => resolve(nq, bands, w_flat, e_flat, fix),
        _ => (vec![0.0; num_points * bands], vec![0usize; num_points * bands]),
    };
    comm.broadcast_f64s(&mut w_flat, COORDINATOR);
    comm.broadcast_usizes(&mut order_flat, COORDINATOR);

    Ok(Dispersion {
        frequencies: Array3::from_shape_vec((nq, nq, bands), w_flat)?,
        order: Some(Array3::from_shape_vec((nq, nq, bands), order_flat)?),
    })
}

/// Coordinator-side continuity resolution.
///
/// Takes the gathered per-point frequencies and (re, im interleaved)
/// eigenvectors in natural mesh order; returns reordered frequencies and
/// the band-order table, both flattened in natural mesh order.
fn resolve(
    nq: usize,
    bands: usize,
    mut w: Vec<f64>,
    e_pairs: Vec<f64>,
    fix: bool,
) -> (Vec<f64>, Vec<usize>) {
    let num_points = nq * nq;
    let mut e: Vec<Complex64> = {
        e_pairs.chunks(2).map(|z| Complex64::new(z[0], z[1])).collect()
    };

    // serpentine path: reversing every other mesh row makes consecutive
    // flat entries spatially adjacent
    reverse_even_rows(&mut w, nq, bands);
    reverse_even_rows(&mut e, nq, bands * bands);

    let mut order: Vec<usize> = {
        let w_view = ArrayView2::from_shape((num_points, bands), &w[..])
            .expect("BUG! bad frequency table shape");
        let e_view = ArrayView3::from_shape((num_points, bands, bands), &e[..])
            .expect("BUG! bad eigenvector table shape");
        band::band_order(w_view, e_view).into_raw_vec()
    };

    // back to natural mesh order, zero wavevector at its conventional
    // grid position
    reverse_even_rows(&mut w, nq, bands);
    reverse_even_rows(&mut order, nq, bands);
    let w = roll_mesh(&w, nq, bands);
    let order = roll_mesh(&order, nq, bands);

    let mut order = Array3::from_shape_vec((nq, nq, bands), order)
        .expect("BUG! bad order table shape");
    if fix {
        band::symmetry_consensus(&mut order);
    }

    // reorder frequencies by the final permutation
    let mut w = Array3::from_shape_vec((nq, nq, bands), w)
        .expect("BUG! bad frequency mesh shape");
    let mut scratch = vec![0f64; bands];
    for i in 0..nq {
        for j in 0..nq {
            for b in 0..bands {
                scratch[b] = w[[i, j, order[[i, j, b]]]];
            }
            for b in 0..bands {
                w[[i, j, b]] = scratch[b];
            }
        }
    }

    (w.into_raw_vec(), order.into_raw_vec())
}

/// Reverse the fast mesh axis on every even slow-axis row, in place.
/// `data` is `[nq * nq, stride]` flattened, point-major.
fn reverse_even_rows<A>(data: &mut [A], nq: usize, stride: usize) {
    assert_eq!(data.len(), nq * nq * stride, "BUG! bad mesh buffer");
    for i in (0..nq).step_by(2) {
        let row = &mut data[i * nq * stride..(i + 1) * nq * stride];
        for j in 0..nq / 2 {
            for t in 0..stride {
                row.swap(j * stride + t, (nq - 1 - j) * stride + t);
            }
        }
    }
}

/// Toroidal shift of both mesh axes by `nq / 2`.
fn roll_mesh<A: Copy>(data: &[A], nq: usize, stride: usize) -> Vec<A> {
    assert_eq!(data.len(), nq * nq * stride, "BUG! bad mesh buffer");
    let shift = nq / 2;
    let mut out = data.to_vec();
    for i in 0..nq {
        for j in 0..nq {
            let src = (i * nq + j) * stride;
            let dst = (((i + shift) % nq) * nq + (j + shift) % nq) * stride;
            out[dst..dst + stride].copy_from_slice(&data[src..src + stride]);
        }
    }
    out
}

//--------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util;
    use crate::DynamicalMatrix;
    use phdisp_comm::Serial;

    #[test]
    fn mesh_too_small() {
        let (fc, basis) = test_util::monatomic_chain(1.0, 1.0, 4);
        let dynmat = DynamicalMatrix::build(&Serial, &fc, &basis, 1e-7).unwrap();
        assert!(dispersion(&Serial, &dynmat, 0, false, false).is_err());
    }

    #[test]
    fn shape_and_negation_symmetry() {
        let nq = 4;
        let (fc, basis) = test_util::diatomic_chain(1.0, 1.0, 2.0);
        let dynmat = DynamicalMatrix::build(&Serial, &fc, &basis, 1e-7).unwrap();

        let out = dispersion(&Serial, &dynmat, nq, false, false).unwrap();
        assert!(out.order.is_none());
        assert_eq!(out.frequencies.dim(), (nq, nq, 6));

        // w(-q) = w(q); with sorted bands the grids match pointwise
        for i in 0..nq {
            for j in 0..nq {
                let (ni, nj) = ((nq - i) % nq, (nq - j) % nq);
                for b in 0..6 {
                    assert_close!(
                        abs=1e-10,
                        out.frequencies[[i, j, b]],
                        out.frequencies[[ni, nj, b]],
                    );
                }
            }
        }
    }

    #[test]
    fn zero_wavevector_sits_where_expected() {
        let nq = 4;
        let (fc, basis) = test_util::diatomic_chain(1.0, 1.0, 2.0);
        let dynmat = DynamicalMatrix::build(&Serial, &fc, &basis, 1e-7).unwrap();
        let direct = crate::frequencies(&dynmat.gamma()).unwrap();

        // without ordering the mesh stays in sampling order, with the
        // zero wavevector at index nq/2
        let plain = dispersion(&Serial, &dynmat, nq, false, false).unwrap();
        for b in 0..6 {
            assert_close!(abs=1e-10, plain.frequencies[[nq / 2, nq / 2, b]], direct[b]);
        }

        // ordering rolls it back to the grid origin
        let sorted = dispersion(&Serial, &dynmat, nq, true, false).unwrap();
        let mut at_origin: Vec<f64> = (0..6).map(|b| sorted.frequencies[[0, 0, b]]).collect();
        at_origin.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for b in 0..6 {
            assert_close!(abs=1e-10, at_origin[b], direct[b]);
        }
    }

    #[test]
    fn ordered_output_permutes_the_unordered_one() {
        let nq = 4;
        let (fc, basis) = test_util::diatomic_chain(1.0, 1.0, 2.0);
        let dynmat = DynamicalMatrix::build(&Serial, &fc, &basis, 1e-7).unwrap();

        let plain = dispersion(&Serial, &dynmat, nq, false, false).unwrap();
        let sorted = dispersion(&Serial, &dynmat, nq, true, false).unwrap();
        let order = sorted.order.as_ref().unwrap();
        assert_eq!(order.dim(), (nq, nq, 6));

        for i in 0..nq {
            for j in 0..nq {
                // a valid permutation at every point
                let mut perm: Vec<usize> = (0..6).map(|b| order[[i, j, b]]).collect();
                perm.sort();
                assert_eq!(perm, (0..6).collect::<Vec<_>>());

                // which permutes the raw (ascending) frequencies; the
                // ordered grid is rolled by nq/2 relative to the plain one
                let (pi, pj) = ((i + nq / 2) % nq, (j + nq / 2) % nq);
                for b in 0..6 {
                    assert_close!(
                        abs=1e-10,
                        sorted.frequencies[[i, j, b]],
                        plain.frequencies[[pi, pj, order[[i, j, b]]]],
                    );
                }
            }
        }
    }

    #[test]
    fn serpentine_and_roll_are_involutive_enough() {
        // reverse twice is the identity; roll twice (even nq) is too
        let nq = 4;
        let data: Vec<i32> = (0..nq as i32 * nq as i32).collect();
        let mut twice = data.clone();
        reverse_even_rows(&mut twice, nq, 1);
        reverse_even_rows(&mut twice, nq, 1);
        assert_eq!(twice, data);

        let rolled = roll_mesh(&roll_mesh(&data, nq, 1), nq, 1);
        assert_eq!(rolled, data);
    }

    #[test]
    fn roll_moves_the_center_to_the_origin() {
        let nq = 4;
        let mut data = vec![0i32; nq * nq];
        data[(nq / 2) * nq + nq / 2] = 7;
        let rolled = roll_mesh(&data, nq, 1);
        assert_eq!(rolled[0], 7);
    }

    #[test]
    fn hexagonal_consensus_pipeline() {
        let nq = 6;
        let (fc, basis) = test_util::hexagonal_sheet(1.0, 0.5);
        let dynmat = DynamicalMatrix::build(&Serial, &fc, &basis, 1e-7).unwrap();
        assert!(dynmat.springs().pair_symmetry_error() < 1e-12);

        let out = dispersion(&Serial, &dynmat, nq, true, true).unwrap();
        let order = out.order.as_ref().unwrap();
        assert_eq!(out.frequencies.dim(), (nq, nq, 3));

        // acoustic frequencies vanish at the zone center
        for b in 0..3 {
            assert_close!(abs=1e-6, out.frequencies[[0, 0, b]], 0.0);
        }

        // the consensus pass must leave a symmetry-consistent assignment
        // alone: a second application changes nothing
        let mut again = order.clone();
        crate::symmetry_consensus(&mut again);
        assert_eq!(&again, order);

        // frequencies respect the hexagonal symmetry bandwise
        for i in 0..nq {
            for j in 0..nq {
                for (m1, m2) in phdisp_bravais::images(i, j, nq) {
                    for b in 0..3 {
                        assert_close!(
                            abs=1e-6,
                            out.frequencies[[i, j, b]],
                            out.frequencies[[m1, m2, b]],
                        );
                    }
                }
            }
        }
    }
}
