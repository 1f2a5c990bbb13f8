/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Phonon dispersion from real-space interatomic force constants.
//!
//! The pipeline, leaf to top:
//!
//! * [`SpringList::build`] turns the periodic force-constant tensor into a
//!   flat, minimum-image, mass-normalized list of pair couplings, built
//!   through distributed work and replicated to every worker;
//! * [`DynamicalMatrix::at`] is the pure map from a wavevector to a
//!   Hermitian complex matrix over that list;
//! * [`frequencies`] / [`frequencies_and_displacements`] adapt a dense
//!   Hermitian eigendecomposition into signed phonon frequencies;
//! * [`dispersion`] samples an `nq` x `nq` wavevector mesh across the
//!   worker pool and optionally resolves a continuous band identity via
//!   [`band_order`] and [`symmetry_consensus`].
//!
//! All distributed phases go through an injected
//! [`phdisp_comm::Comm`]; no component touches a global communicator.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate itertools;
extern crate ndarray;
extern crate num_complex;
extern crate phdisp_bravais;
extern crate phdisp_comm;
extern crate phdisp_linalg;
#[cfg(test)]
#[macro_use]
extern crate phdisp_assert_close;

pub type FailResult<T> = Result<T, failure::Error>;

/// A 3-vector of Cartesian components.
pub type V3 = [f64; 3];
/// A 3x3 block of Cartesian couplings.
pub type M33 = [[f64; 3]; 3];

pub use self::fc::{Basis, ForceConstants};
mod fc;

pub use self::springs::{Spring, SpringList};
mod springs;

pub use self::dynmat::{hermitian_error, DynamicalMatrix};
mod dynmat;

pub use self::freq::{frequencies, frequencies_and_displacements, signed_frequency};
mod freq;

pub use self::dispersion::{dispersion, Dispersion};
mod dispersion;

pub use self::order::{band_order, symmetry_consensus, DEGENERACY_THRESHOLD};
mod order;

#[cfg(test)]
pub(crate) mod test_util;
