/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Bravais lattice conventions, the in-plane reciprocal basis, and the
//! hexagonal point-group structure of a uniform 2D wavevector mesh.

#[macro_use]
extern crate failure;
extern crate num_complex;

use num_complex::Complex64;
use std::collections::BTreeSet;

pub type FailResult<T> = Result<T, failure::Error>;

/// Raised when a geometry input declares a lattice convention code that
/// this crate has no variant for.  Fatal; raised before any distributed
/// work begins.
#[derive(Debug, Fail)]
#[fail(display = "unsupported bravais lattice convention code: {}", code)]
pub struct UnsupportedLatticeError {
    pub code: i32,
}

/// The supported lattice families of the force-constant input convention.
///
/// Each variant knows how to produce the 3x3 matrix whose rows are the
/// lattice vectors.  Decoding an integer convention code goes through
/// [`Lattice::from_code`], whose default arm raises
/// [`UnsupportedLatticeError`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lattice {
    /// Convention code 0: lattice vectors are given directly.
    Free { vectors: [[f64; 3]; 3] },
    /// Convention code 4: hexagonal, from the traditional cell dimensions.
    Hexagonal { a: f64, c_over_a: f64 },
}

impl Lattice {
    /// Decode an integer lattice convention code.
    ///
    /// `celldim` holds the traditional cell dimensions (first entry is the
    /// lattice constant); `vectors` must be provided for code 0.
    pub fn from_code(
        code: i32,
        celldim: &[f64],
        vectors: Option<[[f64; 3]; 3]>,
    ) -> FailResult<Lattice> {
        match code {
            0 => match vectors {
                Some(vectors) => Ok(Lattice::Free { vectors }),
                None => bail!("lattice convention code 0 requires explicit lattice vectors"),
            },
            4 => {
                ensure!(celldim.len() >= 3, "hexagonal lattice requires 3 cell dimensions");
                let (a, c_over_a) = (celldim[0], celldim[2]);
                ensure!(a > 0.0, "nonpositive lattice constant: {}", a);
                ensure!(c_over_a > 0.0, "nonpositive c/a ratio: {}", c_over_a);
                Ok(Lattice::Hexagonal { a, c_over_a })
            },
            code => Err(UnsupportedLatticeError { code }.into()),
        }
    }

    /// Matrix whose rows are the lattice vectors.
    pub fn vectors(&self) -> [[f64; 3]; 3] {
        match *self {
            Lattice::Free { vectors } => vectors,
            Lattice::Hexagonal { a, c_over_a } => [
                [a, 0.0, 0.0],
                [-0.5 * a, 0.5 * f64::sqrt(3.0) * a, 0.0],
                [0.0, 0.0, a * c_over_a],
            ],
        }
    }
}

/// In-plane reciprocal basis of the first two lattice vectors.
///
/// Returns rows `u1, u2` with `t_i . u_j = delta_ij`.  **There is no 2 pi
/// factor**; wavevectors in crystal coordinates already carry it, and only
/// the direction of the result is ever consumed (for the gauge angle).
pub fn reciprocal_2d(vectors: &[[f64; 3]; 3]) -> FailResult<[[f64; 2]; 2]> {
    let (t1, t2) = (vectors[0], vectors[1]);
    let det = t1[0] * t2[1] - t1[1] * t2[0];
    ensure!(det.abs() > 1e-300, "in-plane lattice vectors are collinear");
    Ok([
        [t2[1] / det, -t2[0] / det],
        [-t1[1] / det, t1[0] / det],
    ])
}

/// Rotate the in-plane pair of a complex displacement by `angle`.
///
/// The rotation is real; it acts on the (x, y) component pair of one atom,
/// whatever complex phase each component carries.
pub fn rotate(pair: [Complex64; 2], angle: f64) -> [Complex64; 2] {
    let (sin, cos) = angle.sin_cos();
    [
        pair[0] * cos - pair[1] * sin,
        pair[0] * sin + pair[1] * cos,
    ]
}

/// The hexagonal point-group orbit of a mesh point.
///
/// Sixfold rotation acts on crystal-coordinate mesh indices as
/// `(k1, k2) -> (-k2, k1 + k2)`; the mirror swaps them.  All twelve
/// products are reduced modulo `nk` and deduplicated, so the result is
/// deterministic and sorted.
pub fn images(k1: usize, k2: usize, nk: usize) -> Vec<(usize, usize)> {
    assert!(nk > 0);
    let wrap = |k: i64| k.rem_euclid(nk as i64) as usize;

    let mut points = BTreeSet::new();
    for &(mut a, mut b) in &[(k1 as i64, k2 as i64), (k2 as i64, k1 as i64)] {
        for _ in 0..6 {
            points.insert((wrap(a), wrap(b)));
            let next = (-b, a + b);
            a = next.0;
            b = next.1;
        }
    }
    points.into_iter().collect()
}

//--------------------------------------------------------------------------
