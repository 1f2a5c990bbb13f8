/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Dense Hermitian eigendecomposition over LAPACKE.
//!
//! This is an adapter, not an eigensolver: everything hard is delegated to
//! `zheev`.  Eigenvalues come back in whatever order LAPACK produces
//! (ascending); callers must not assume that ordering is stable between
//! nearby inputs.

#[macro_use]
extern crate failure;
extern crate lapacke;
extern crate lapack_src;
extern crate ndarray;
extern crate num_complex;
#[cfg_attr(test, macro_use)]
extern crate phdisp_assert_close;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

pub type FailResult<T> = Result<T, failure::Error>;

#[derive(Debug, Fail)]
#[fail(display = "eigensolver failed to converge ({} off-diagonal elements)", _0)]
pub struct EigenConvergenceError(pub i32);

/// Eigenvalues of a Hermitian matrix, ascending.
pub fn eigvalsh(matrix: &Array2<Complex64>) -> FailResult<Array1<f64>> {
    let (values, _) = heev(matrix, false)?;
    Ok(values)
}

/// Eigenvalues and eigenvectors of a Hermitian matrix.
///
/// Eigenvector `j` is column `j` of the returned matrix.
pub fn eigh(matrix: &Array2<Complex64>) -> FailResult<(Array1<f64>, Array2<Complex64>)> {
    let (values, vectors) = heev(matrix, true)?;
    Ok((values, vectors.expect("BUG! requested vectors")))
}

fn heev(
    matrix: &Array2<Complex64>,
    want_vectors: bool,
) -> FailResult<(Array1<f64>, Option<Array2<Complex64>>)> {
    let (rows, cols) = matrix.dim();
    ensure!(rows == cols, "eigendecomposition of a non-square matrix: {}x{}", rows, cols);
    let n = rows;

    // lapacke hates size-zero arrays.
    if n == 0 {
        let vectors = match want_vectors {
            true => Some(Array2::zeros((0, 0))),
            false => None,
        };
        return Ok((Array1::zeros(0), vectors));
    }

    // logical (row-major) order regardless of the input's memory layout;
    // copied anyway because zheev destroys its input
    let mut a: Vec<lapacke::c64> = {
        matrix.iter().map(|z| lapacke::c64::new(z.re, z.im)).collect()
    };
    let mut w = vec![0f64; n];

    let jobz = match want_vectors {
        true => b'V',
        false => b'N',
    };

    match unsafe {
        lapacke::zheev(
            lapacke::Layout::RowMajor,
            jobz,
            b'L',
            n as i32,
            &mut a,
            n as i32,
            &mut w,
        )
    } {
        0 => { /* okey dokey */ },
        info if info < 0 => panic!("bad arg number {} to zheev", -info),
        info => return Err(EigenConvergenceError(info).into()),
    }

    let values = Array1::from_vec(w);
    let vectors = match want_vectors {
        true => {
            let data = a.into_iter().map(|z| Complex64::new(z.re, z.im)).collect();
            Some(Array2::from_shape_vec((n, n), data)?)
        },
        false => None,
    };
    Ok((values, vectors))
}

//--------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn hermitian_2x2() -> Array2<Complex64> {
        // eigenvalues 1 and 3
        let h = |re, im| Complex64::new(re, im);
        Array2::from_shape_vec((2, 2), vec![
            h(2.0, 0.0), h(0.0, -1.0),
            h(0.0, 1.0), h(2.0, 0.0),
        ]).unwrap()
    }

    #[test]
    fn known_eigenvalues() {
        let w = eigvalsh(&hermitian_2x2()).unwrap();
        assert_close!(abs=1e-12, w.to_vec(), vec![1.0, 3.0]);
    }

    #[test]
    fn eigenvectors_reconstruct() {
        let m = hermitian_2x2();
        let (w, e) = eigh(&m).unwrap();

        // M e_j = w_j e_j, columnwise
        for j in 0..2 {
            for i in 0..2 {
                let mut acc = Complex64::new(0.0, 0.0);
                for k in 0..2 {
                    acc += m[[i, k]] * e[[k, j]];
                }
                let expected = e[[i, j]] * w[j];
                assert_close!(abs=1e-12, acc.re, expected.re);
                assert_close!(abs=1e-12, acc.im, expected.im);
            }
        }
    }

    #[test]
    fn eigenvectors_orthonormal() {
        let (_, e) = eigh(&hermitian_2x2()).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let mut acc = Complex64::new(0.0, 0.0);
                for k in 0..2 {
                    acc += e[[k, i]].conj() * e[[k, j]];
                }
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_close!(abs=1e-12, acc.norm(), expected);
            }
        }
    }

    #[test]
    fn empty_matrix() {
        let w = eigvalsh(&Array2::zeros((0, 0))).unwrap();
        assert_eq!(w.len(), 0);
    }

    #[test]
    fn non_square_is_an_error() {
        assert!(eigvalsh(&Array2::zeros((2, 3))).is_err());
    }
}
