/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Signed phonon frequencies from the dynamical matrix.

use crate::FailResult;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// `sign(w2) * sqrt(|w2|)`.
///
/// A negative result marks a dynamically unstable mode (imaginary
/// frequency).
#[inline]
pub fn signed_frequency(w2: f64) -> f64 {
    if w2 < 0.0 {
        -(-w2).sqrt()
    } else {
        w2.sqrt()
    }
}

/// Frequencies of a dynamical matrix, cheap mode (no eigenvectors).
///
/// Band order is whatever the eigensolver produces; it is not stable
/// between nearby wavevectors.
pub fn frequencies(matrix: &Array2<Complex64>) -> FailResult<Array1<f64>> {
    Ok(phdisp_linalg::eigvalsh(matrix)?.mapv(signed_frequency))
}

/// Frequencies plus displacement eigenvectors (one per column).
pub fn frequencies_and_displacements(
    matrix: &Array2<Complex64>,
) -> FailResult<(Array1<f64>, Array2<Complex64>)> {
    let (w2, e) = phdisp_linalg::eigh(matrix)?;
    Ok((w2.mapv(signed_frequency), e))
}

//--------------------------------------------------------------------------
