use core::cmp::Ordering;

use crate::HxError;

/// Floating point type used throughout the pipeline
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: impl Into<String>) -> Result<Real, HxError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HxError::NonFinite {
            what: what.into(),
            value: v,
        })
    }
}

/// Descending order with NaN sorted after every number.
///
/// Equal values compare `Equal`, so a stable sort keeps their input order.
pub fn cmp_desc_nan_last(a: Real, b: Real) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
