//! One-dimensional affine bases.
//!
//! A basis is an ordered pair of points on a line. Every conversion between
//! index, time, value and screen space is written as the affine map that
//! carries one basis onto another, so direction (e.g. an inverted screen Y) is
//! carried by the basis itself rather than by special cases.

use crate::error::{ChartError, ChartResult};

/// An ordered, non-degenerate pair of reals defining a directed interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AR1Basis {
    p0: f64,
    p1: f64,
}

impl AR1Basis {
    /// Create a basis from two points.
    ///
    /// Fails with [`ChartError::DegenerateBasis`] when the points coincide or
    /// either one is not finite.
    pub fn new(p0: f64, p1: f64) -> ChartResult<Self> {
        if p0 == p1 || !p0.is_finite() || !p1.is_finite() {
            return Err(ChartError::DegenerateBasis { p0, p1 });
        }
        Ok(Self { p0, p1 })
    }

    /// The two points in stored order.
    #[inline]
    pub fn to_pair(&self) -> (f64, f64) {
        (self.p0, self.p1)
    }

    #[inline]
    pub fn p0(&self) -> f64 {
        self.p0
    }

    #[inline]
    pub fn p1(&self) -> f64 {
        self.p1
    }

    /// Signed span `p1 - p0`. Never zero.
    #[inline]
    pub fn span(&self) -> f64 {
        self.p1 - self.p0
    }

    /// The smaller of the two points.
    #[inline]
    pub fn min(&self) -> f64 {
        self.p0.min(self.p1)
    }

    /// The larger of the two points.
    #[inline]
    pub fn max(&self) -> f64 {
        self.p0.max(self.p1)
    }

    /// Whether `x` lies within the closed interval, regardless of direction.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.min() && x <= self.max()
    }

    /// The unique affine map sending `self.p0 -> other.p0` and
    /// `self.p1 -> other.p1`.
    pub fn map_to(&self, other: &AR1Basis) -> LinearMap1D {
        let scale = other.span() / self.span();
        LinearMap1D {
            scale,
            offset: other.p0 - scale * self.p0,
        }
    }
}

/// An affine function `x -> scale * x + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMap1D {
    pub scale: f64,
    pub offset: f64,
}

impl Default for LinearMap1D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl LinearMap1D {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: 0.0,
    };

    pub fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        self.scale * x + self.offset
    }

    /// Map both points of a basis.
    ///
    /// Fails if the map collapses the basis (zero or non-finite scale).
    pub fn apply_basis(&self, basis: &AR1Basis) -> ChartResult<AR1Basis> {
        AR1Basis::new(self.apply(basis.p0), self.apply(basis.p1))
    }

    /// The inverse map.
    ///
    /// Fails with [`ChartError::DegenerateBasis`] when the scale is zero or not
    /// finite, since such a map does not come from a valid pair of bases.
    pub fn inverse(&self) -> ChartResult<Self> {
        if self.scale == 0.0 || !self.scale.is_finite() {
            return Err(ChartError::DegenerateBasis {
                p0: self.offset,
                p1: self.offset,
            });
        }
        Ok(Self {
            scale: 1.0 / self.scale,
            offset: -self.offset / self.scale,
        })
    }

    /// Combine two maps (self then other).
    pub fn then(&self, other: &LinearMap1D) -> Self {
        Self {
            scale: other.scale * self.scale,
            offset: other.scale * self.offset + other.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_degenerate_basis_rejected() {
        assert_eq!(
            AR1Basis::new(3.0, 3.0),
            Err(ChartError::DegenerateBasis { p0: 3.0, p1: 3.0 })
        );
        assert!(AR1Basis::new(0.0, f64::NAN).is_err());
        assert!(AR1Basis::new(f64::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_to_pair_keeps_order() {
        let b = AR1Basis::new(10.0, -2.0).unwrap();
        assert_eq!(b.to_pair(), (10.0, -2.0));
        assert_eq!(b.min(), -2.0);
        assert_eq!(b.max(), 10.0);
        assert!(b.contains(0.0));
    }

    #[test]
    fn test_map_to_sends_endpoints() {
        let index = AR1Basis::new(0.0, 7.0).unwrap();
        let screen = AR1Basis::new(0.0, 700.0).unwrap();
        let f = index.map_to(&screen);
        assert_eq!(f.apply(0.0), 0.0);
        assert_eq!(f.apply(7.0), 700.0);
        assert_eq!(f.apply(3.5), 350.0);
    }

    #[test]
    fn test_map_to_inverted_direction() {
        let value = AR1Basis::new(2.0, 9.0).unwrap();
        let screen_y = AR1Basis::new(300.0, 0.0).unwrap();
        let f = value.map_to(&screen_y);
        assert!(approx(f.apply(2.0), 300.0));
        assert!(approx(f.apply(9.0), 0.0));
    }

    #[test]
    fn test_round_trip_is_identity() {
        let a = AR1Basis::new(-3.5, 12.25).unwrap();
        let b = AR1Basis::new(1000.0, -40.0).unwrap();
        let there = a.map_to(&b);
        let back = b.map_to(&a);
        for x in [-3.5, 0.0, 1.0, 7.75, 12.25, 100.0] {
            assert!(approx(back.apply(there.apply(x)), x));
        }
        let composed = there.then(&back);
        assert!(approx(composed.scale, 1.0));
        assert!(composed.offset.abs() < 1e-9);
    }

    #[test]
    fn test_inverse_matches_reverse_map() {
        let a = AR1Basis::new(0.0, 4.0).unwrap();
        let b = AR1Basis::new(10.0, 2.0).unwrap();
        let inv = a.map_to(&b).inverse().unwrap();
        let rev = b.map_to(&a);
        assert!(approx(inv.scale, rev.scale));
        assert!(approx(inv.offset, rev.offset));
    }

    #[test]
    fn test_collapsing_map_fails() {
        let flat = LinearMap1D::new(0.0, 5.0);
        assert!(flat.inverse().is_err());
        let b = AR1Basis::new(0.0, 1.0).unwrap();
        assert!(flat.apply_basis(&b).is_err());
    }
}
