/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Facade over the phdisp workspace.
//!
//! `phdisp` computes the vibrational spectrum of a crystal from real-space
//! interatomic force constants, samples it over a 2D reciprocal-space mesh
//! using a pool of lockstep workers, and resolves a continuous band
//! identity across that mesh.
//!
//! The usual entry points, in pipeline order:
//!
//! * decode the geometry with [`bravais::Lattice`] and bundle it into a
//!   [`phonons::Basis`] next to the [`phonons::ForceConstants`];
//! * optionally [`phonons::ForceConstants::apply_acoustic_sum_rule`];
//! * [`phonons::DynamicalMatrix::build`] over a [`comm::Comm`];
//! * [`phonons::frequencies`] at single wavevectors, or
//!   [`phonons::dispersion`] for the full mesh.

pub extern crate phdisp_bravais as bravais;
pub extern crate phdisp_comm as comm;
pub extern crate phdisp_linalg as linalg;
pub extern crate phdisp_phonons as phonons;

pub use crate::comm::{Comm, Serial};
pub use crate::phonons::{
    dispersion, frequencies, frequencies_and_displacements,
    Basis, Dispersion, DynamicalMatrix, ForceConstants,
};
