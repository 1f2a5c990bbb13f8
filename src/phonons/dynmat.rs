/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! The wavevector to dynamical-matrix map.

use crate::{Basis, FailResult, ForceConstants, SpringList};

use ndarray::Array2;
use num_complex::Complex64;
use phdisp_comm::Comm;
use std::sync::Arc;

/// A closure-like value: the replicated spring list plus a pure
/// evaluation operation.
///
/// Building one is a collective operation (the spring list is assembled
/// through distributed work); evaluating one is not, and may be done
/// concurrently and repeatedly on any worker.
#[derive(Debug, Clone)]
pub struct DynamicalMatrix {
    springs: Arc<SpringList>,
    // rows u1, u2 of the in-plane reciprocal basis, for the gauge angle
    recip_2d: [[f64; 2]; 2],
}

impl DynamicalMatrix {
    /// Assemble the evaluator from the force-constant bundle.
    ///
    /// Must be called on every worker with identical inputs.  `eps` is
    /// the minimum-image tie tolerance, in units of length.
    pub fn build(
        comm: &impl Comm,
        fc: &ForceConstants,
        basis: &Basis,
        eps: f64,
    ) -> FailResult<DynamicalMatrix> {
        // input validation happens before the first collective
        let recip_2d = phdisp_bravais::reciprocal_2d(basis.lattice_vectors())?;
        let springs = SpringList::build(comm, fc, basis, eps)?;
        Ok(DynamicalMatrix {
            springs: Arc::new(springs),
            recip_2d,
        })
    }

    pub fn num_atoms(&self) -> usize { self.springs.num_atoms() }

    pub fn num_bands(&self) -> usize { 3 * self.springs.num_atoms() }

    pub fn springs(&self) -> &SpringList { &self.springs }

    /// Rows `u1, u2` with `t_i . u_j = delta_ij` for the in-plane lattice
    /// vectors.
    pub fn in_plane_reciprocal(&self) -> [[f64; 2]; 2] { self.recip_2d }

    /// The dynamical matrix at wavevector `q` (crystal coordinates, in
    /// radians per cell).
    ///
    /// The matrix is Hermitian up to roundoff and the symmetry of the
    /// input force constants; layout interleaves Cartesian components
    /// with the atom index fast, i.e. row `j * nat + na` is component
    /// `j` of atom `na`.
    pub fn at(&self, q: [f64; 3]) -> Array2<Complex64> {
        let nat = self.springs.num_atoms();
        let mut matrix = Array2::zeros((3 * nat, 3 * nat));
        for s in self.springs.iter() {
            let arg = s.cell[0] as f64 * q[0]
                + s.cell[1] as f64 * q[1]
                + s.cell[2] as f64 * q[2];
            let phase = Complex64::new(arg.cos(), arg.sin());
            for i in 0..3 {
                for j in 0..3 {
                    matrix[[i * nat + s.atom_a, j * nat + s.atom_b]] += phase * s.coupling[i][j];
                }
            }
        }
        matrix
    }

    /// The zero-wavevector matrix.
    pub fn gamma(&self) -> Array2<Complex64> { self.at([0.0; 3]) }
}

/// Max entry magnitude of `M - M^H`.
pub fn hermitian_error(matrix: &Array2<Complex64>) -> f64 {
    let (rows, cols) = matrix.dim();
    assert_eq!(rows, cols);
    let mut worst = 0f64;
    for r in 0..rows {
        for c in 0..cols {
            worst = worst.max((matrix[[r, c]] - matrix[[c, r]].conj()).norm());
        }
    }
    worst
}

//--------------------------------------------------------------------------
