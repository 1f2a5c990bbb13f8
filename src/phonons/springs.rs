/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! The minimum-image "spring" representation of the force constants.
//!
//! Building the list is the one place the force-constant tensor is walked
//! in full, so the walk is split round-robin over the worker pool and the
//! results are replicated through a variable-length all-gather.  The
//! finished list is immutable; everything downstream shares it by
//! reference.

use crate::{Basis, FailResult, ForceConstants, M33};

use phdisp_comm::{round_robin_owner, Comm};

/// One realized pair coupling.
///
/// `cell` is the integer lattice translation of the neighbor cell chosen
/// by the minimum-image scan; `coupling` is the force-constant block
/// divided by the image multiplicity and by `sqrt(mass_a * mass_b)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spring {
    pub atom_a: usize,
    pub atom_b: usize,
    pub cell: [i32; 3],
    pub coupling: M33,
}

/// The complete, replicated spring list.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringList {
    springs: Vec<Spring>,
    num_atoms: usize,
}

// central cell plus its 26 neighbors, per axis
const SUPERCELLS: [i32; 3] = [-1, 0, 1];

impl SpringList {
    /// Build the spring list through distributed work.
    ///
    /// Every worker must call this with identical inputs; every worker
    /// returns the identical, complete list.  Inputs are validated before
    /// the first collective so that a bad shape aborts the pool uniformly
    /// instead of hanging it.
    pub fn build(
        comm: &impl Comm,
        fc: &ForceConstants,
        basis: &Basis,
        eps: f64,
    ) -> FailResult<SpringList> {
        ensure!(
            basis.num_atoms() == fc.num_atoms(),
            "basis has {} atoms but force constants have {}",
            basis.num_atoms(), fc.num_atoms(),
        );
        ensure!(eps > 0.0, "nonpositive minimum-image tolerance: {}", eps);

        let nat = fc.num_atoms();
        let [nr1, nr2, nr3] = fc.grid();
        let at = basis.lattice_vectors();
        let tau = basis.positions();
        let masses = basis.masses();

        let mut local = Vec::new();
        let mut counter = 0;
        for (m1, m2, m3) in iproduct!(0..nr1, 0..nr2, 0..nr3) {
            counter += 1;
            if round_robin_owner(counter, comm.size()) != comm.rank() {
                continue;
            }

            // translations of this cell within the neighboring supercells
            let mut cells = [[0i32; 3]; 27];
            let mut shifts = [[0f64; 3]; 27];
            for (index, (s1, s2, s3)) in iproduct!(&SUPERCELLS, &SUPERCELLS, &SUPERCELLS).enumerate() {
                let cell = [
                    m1 as i32 + s1 * nr1 as i32,
                    m2 as i32 + s2 * nr2 as i32,
                    m3 as i32 + s3 * nr3 as i32,
                ];
                cells[index] = cell;
                for k in 0..3 {
                    shifts[index][k] = cell[0] as f64 * at[0][k]
                        + cell[1] as f64 * at[1][k]
                        + cell[2] as f64 * at[2][k];
                }
            }

            for (na1, na2) in iproduct!(0..nat, 0..nat) {
                // equivalent bonds within the Wigner-Seitz cell
                let mut lengths = [0f64; 27];
                for index in 0..27 {
                    let mut sq = 0.0;
                    for k in 0..3 {
                        let r = shifts[index][k] + tau[na1][k] - tau[na2][k];
                        sq += r * r;
                    }
                    lengths[index] = sq.sqrt();
                }
                let shortest = lengths.iter().cloned()
                    .fold(std::f64::INFINITY, f64::min);

                let multiplicity = lengths.iter()
                    .filter(|&&length| length < shortest + eps)
                    .count();

                // undo supercell double counting and divide by masses
                let scale = 1.0 / (multiplicity as f64 * (masses[na1] * masses[na2]).sqrt());
                let mut coupling = *fc.block(na1, na2, [m1, m2, m3]);
                for i in 0..3 {
                    for k in 0..3 {
                        coupling[i][k] *= scale;
                    }
                }

                for index in 0..27 {
                    if lengths[index] < shortest + eps {
                        local.push(Spring {
                            atom_a: na1,
                            atom_b: na2,
                            cell: cells[index],
                            coupling,
                        });
                    }
                }
            }
        }

        Ok(SpringList {
            springs: exchange(comm, local),
            num_atoms: nat,
        })
    }

    pub fn len(&self) -> usize { self.springs.len() }

    pub fn is_empty(&self) -> bool { self.springs.is_empty() }

    pub fn num_atoms(&self) -> usize { self.num_atoms }

    pub fn iter(&self) -> impl Iterator<Item = &Spring> + '_ { self.springs.iter() }

    /// Largest deviation from the pair symmetry `C(a, b, R) = C(b, a, -R)^T`.
    ///
    /// The builder neither assumes nor enforces this symmetry of its input;
    /// callers who expect it can measure it here.  A missing partner spring
    /// counts with a zero coupling.
    pub fn pair_symmetry_error(&self) -> f64 {
        use std::collections::BTreeMap;

        let by_key: BTreeMap<(usize, usize, [i32; 3]), &M33> = {
            self.springs.iter()
                .map(|s| ((s.atom_a, s.atom_b, s.cell), &s.coupling))
                .collect()
        };

        let mut worst = 0f64;
        for s in &self.springs {
            let partner = (s.atom_b, s.atom_a, [-s.cell[0], -s.cell[1], -s.cell[2]]);
            for i in 0..3 {
                for k in 0..3 {
                    let other = match by_key.get(&partner) {
                        Some(c) => c[k][i],
                        None => 0.0,
                    };
                    worst = worst.max((s.coupling[i][k] - other).abs());
                }
            }
        }
        worst
    }
}

/// Replicate per-worker spring buffers to every worker.
///
/// Size announcement first, then concatenating all-gathers of the index
/// fields and of the tensor fields; the result is rank-major and identical
/// everywhere.
fn exchange(comm: &impl Comm, local: Vec<Spring>) -> Vec<Spring> {
    let counts = comm.all_gather_len(local.len());
    let total: usize = counts.iter().sum();

    let mut ints = Vec::with_capacity(5 * local.len());
    let mut floats = Vec::with_capacity(9 * local.len());
    for s in &local {
        ints.push(s.atom_a as i32);
        ints.push(s.atom_b as i32);
        ints.extend_from_slice(&s.cell);
        for row in &s.coupling {
            floats.extend_from_slice(row);
        }
    }

    let int_counts: Vec<usize> = counts.iter().map(|&c| 5 * c).collect();
    let float_counts: Vec<usize> = counts.iter().map(|&c| 9 * c).collect();
    let all_ints = comm.all_gather_v_i32(&ints, &int_counts);
    let all_floats = comm.all_gather_v_f64(&floats, &float_counts);

    debug!("spring list: {} springs gathered from {} workers", total, comm.size());

    (0..total).map(|n| {
        let ints = &all_ints[5 * n..5 * n + 5];
        let floats = &all_floats[9 * n..9 * n + 9];
        let mut coupling = [[0f64; 3]; 3];
        for i in 0..3 {
            coupling[i].copy_from_slice(&floats[3 * i..3 * i + 3]);
        }
        Spring {
            atom_a: ints[0] as usize,
            atom_b: ints[1] as usize,
            cell: [ints[2], ints[3], ints[4]],
            coupling,
        }
    }).collect()
}

//--------------------------------------------------------------------------
