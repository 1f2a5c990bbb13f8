/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! `assert_close!` for floats and slices of floats.
//!
//! Forms:
//!
//! ```text
//! assert_close!(a, b);
//! assert_close!(abs=1e-10, a, b);
//! assert_close!(rel=1e-6, a, b);
//! assert_close!(rel=1e-6, abs=1e-10, a, b);
//! ```

use std::fmt;

pub const DEFAULT_NONZERO_TOL: f64 = 1e-9;

#[derive(Debug, Copy, Clone)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerances {
    fn default() -> Self { Tolerances { abs: 0.0, rel: DEFAULT_NONZERO_TOL } }
}

#[derive(Debug)]
pub struct CheckCloseError(String);

impl fmt::Display for CheckCloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Comparison from Python 3.5's `math.isclose`, extended with an
/// absolute tolerance so that comparisons against zero can succeed.
#[inline]
pub fn is_close(a: f64, b: f64, Tolerances { abs, rel }: Tolerances) -> bool {
    assert!(abs >= 0.0);
    assert!(rel >= 0.0);

    // infinities of equal sign
    if a == b { return true; }

    // infinities of opposite sign; avoid an infinite relative tolerance
    if a.is_infinite() || b.is_infinite() { return false; }

    // general values and NaN
    (a - b).abs() < abs.max(rel * a.abs()).max(rel * b.abs())
}

pub trait CheckClose {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>;
}

impl CheckClose for f64 {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        match is_close(*self, *other, tol) {
            true => Ok(()),
            false => Err(CheckCloseError(format!("{} vs {}", self, other))),
        }
    }
}

impl CheckClose for [f64] {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        if self.len() != other.len() {
            return Err(CheckCloseError(format!(
                "length mismatch: {} vs {}", self.len(), other.len(),
            )));
        }
        for (i, (a, b)) in self.iter().zip(other).enumerate() {
            if !is_close(*a, *b, tol) {
                return Err(CheckCloseError(format!("at index {}: {} vs {}", i, a, b)));
            }
        }
        Ok(())
    }
}

impl CheckClose for Vec<f64> {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        self[..].check_close(&other[..], tol)
    }
}

#[doc(hidden)]
pub fn __check<C: CheckClose + fmt::Debug + ?Sized>(a: &C, b: &C, tol: Tolerances) {
    if let Err(e) = a.check_close(b, tol) {
        panic!(
            "not nearly equal! (tolerances: rel={}, abs={})\n left: {:?}\nright: {:?}\n{}",
            tol.rel, tol.abs, a, b, e,
        );
    }
}

#[macro_export]
macro_rules! assert_close {
    (rel=$rel:expr, abs=$abs:expr, $a:expr, $b:expr $(,)*) => {
        $crate::__check(&$a, &$b, $crate::Tolerances { rel: $rel, abs: $abs })
    };
    (abs=$abs:expr, rel=$rel:expr, $a:expr, $b:expr $(,)*) => {
        $crate::__check(&$a, &$b, $crate::Tolerances { rel: $rel, abs: $abs })
    };
    (abs=$abs:expr, $a:expr, $b:expr $(,)*) => {
        $crate::__check(&$a, &$b, $crate::Tolerances { rel: 0.0, abs: $abs })
    };
    (rel=$rel:expr, $a:expr, $b:expr $(,)*) => {
        $crate::__check(&$a, &$b, $crate::Tolerances { rel: $rel, abs: 0.0 })
    };
    ($a:expr, $b:expr $(,)*) => {
        $crate::__check(&$a, &$b, $crate::Tolerances::default())
    };
}
