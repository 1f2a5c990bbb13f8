/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Force-constant tensor and atomic basis inputs.
//!
//! Both types validate their shapes at construction, from data that is
//! identical on every worker, so that a malformed input aborts the whole
//! pool before any collective is issued.

use crate::{FailResult, M33, V3};

use ndarray::Array5;
use phdisp_bravais::Lattice;

/// The real-space interatomic force-constant tensor.
///
/// Block `(a, b, m1, m2, m3)` couples atom `a` in the home cell to atom
/// `b` in the cell at lattice translation `(m1, m2, m3)`, periodic over
/// the `nr1 x nr2 x nr3` grid.
#[derive(Debug, Clone)]
pub struct ForceConstants {
    // [atom_a, atom_b, m1, m2, m3] -> 3x3 block
    blocks: Array5<M33>,
}

impl ForceConstants {
    pub fn new(blocks: Array5<M33>) -> FailResult<ForceConstants> {
        let (na1, na2, nr1, nr2, nr3) = blocks.dim();
        ensure!(na1 == na2, "force constants must pair atoms with atoms: {}x{}", na1, na2);
        ensure!(na1 > 0, "force constants for zero atoms");
        ensure!(nr1 > 0 && nr2 > 0 && nr3 > 0, "degenerate cell grid: {:?}", (nr1, nr2, nr3));
        Ok(ForceConstants { blocks })
    }

    pub fn zeros(num_atoms: usize, grid: [usize; 3]) -> FailResult<ForceConstants> {
        let [nr1, nr2, nr3] = grid;
        let blocks = Array5::from_elem((num_atoms, num_atoms, nr1, nr2, nr3), [[0.0; 3]; 3]);
        ForceConstants::new(blocks)
    }

    pub fn num_atoms(&self) -> usize { self.blocks.dim().0 }

    pub fn grid(&self) -> [usize; 3] {
        let (_, _, nr1, nr2, nr3) = self.blocks.dim();
        [nr1, nr2, nr3]
    }

    pub fn block(&self, atom_a: usize, atom_b: usize, cell: [usize; 3]) -> &M33 {
        &self.blocks[[atom_a, atom_b, cell[0], cell[1], cell[2]]]
    }

    pub fn block_mut(&mut self, atom_a: usize, atom_b: usize, cell: [usize; 3]) -> &mut M33 {
        &mut self.blocks[[atom_a, atom_b, cell[0], cell[1], cell[2]]]
    }

    /// Impose the acoustic sum rule.
    ///
    /// Overwrites each atom's self-coupling with the negated sum of all of
    /// its other couplings, so that a uniform translation exerts no net
    /// force and the zero wavevector carries exact zero-frequency modes.
    pub fn apply_acoustic_sum_rule(&mut self) {
        let (nat, _, nr1, nr2, nr3) = self.blocks.dim();
        for na1 in 0..nat {
            let mut sum = [[0.0; 3]; 3];
            for na2 in 0..nat {
                for m1 in 0..nr1 {
                    for m2 in 0..nr2 {
                        for m3 in 0..nr3 {
                            if na1 == na2 && m1 == 0 && m2 == 0 && m3 == 0 {
                                continue;
                            }
                            let block = &self.blocks[[na1, na2, m1, m2, m3]];
                            for i in 0..3 {
                                for k in 0..3 {
                                    sum[i][k] += block[i][k];
                                }
                            }
                        }
                    }
                }
            }
            for i in 0..3 {
                for k in 0..3 {
                    sum[i][k] = -sum[i][k];
                }
            }
            self.blocks[[na1, na1, 0, 0, 0]] = sum;
        }
    }
}

/// Lattice vectors, Cartesian atom positions, and atomic masses.
#[derive(Debug, Clone)]
pub struct Basis {
    lattice: M33,
    positions: Vec<V3>,
    masses: Vec<f64>,
}

impl Basis {
    pub fn new(lattice: &Lattice, positions: Vec<V3>, masses: Vec<f64>) -> FailResult<Basis> {
        ensure!(!positions.is_empty(), "basis with zero atoms");
        ensure!(
            positions.len() == masses.len(),
            "{} positions but {} masses", positions.len(), masses.len(),
        );
        ensure!(masses.iter().all(|&m| m > 0.0), "nonpositive atomic mass");
        Ok(Basis {
            lattice: lattice.vectors(),
            positions,
            masses,
        })
    }

    pub fn num_atoms(&self) -> usize { self.positions.len() }

    /// Matrix whose rows are the lattice vectors.
    pub fn lattice_vectors(&self) -> &M33 { &self.lattice }

    pub fn positions(&self) -> &[V3] { &self.positions }

    pub fn masses(&self) -> &[f64] { &self.masses }
}

//--------------------------------------------------------------------------
