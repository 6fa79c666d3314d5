//! Axis-aligned 2D affine transforms.
//!
//! Chart geometry only ever needs independent scale and translation per axis,
//! so the transform is stored as four numbers instead of a full matrix.
//! [`AffineParams::to_affine2`] converts to a `glam` affine for renderers that
//! want one.

use glam::{DAffine2, DVec2};

use crate::basis::LinearMap1D;
use crate::error::{ChartError, ChartResult};

/// `screen = scale * model + translate`, per axis.
///
/// This is both the value handed to the rendering collaborator and the
/// representation of a zoom/pan gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineParams {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

/// An externally captured zoom/pan state, expressed in screen space.
pub type ZoomTransform = AffineParams;

impl Default for AffineParams {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineParams {
    /// Identity transform (no transformation).
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub fn new(translate_x: f64, translate_y: f64, scale_x: f64, scale_y: f64) -> Self {
        Self {
            translate_x,
            translate_y,
            scale_x,
            scale_y,
        }
    }

    /// Create a translation transform.
    pub fn translate(offset: DVec2) -> Self {
        Self::new(offset.x, offset.y, 1.0, 1.0)
    }

    /// Create a non-uniform scale transform.
    pub fn scale_xy(scale: DVec2) -> Self {
        Self::new(0.0, 0.0, scale.x, scale.y)
    }

    /// Combine independent per-axis maps.
    pub fn from_axes(x: LinearMap1D, y: LinearMap1D) -> Self {
        Self::new(x.offset, y.offset, x.scale, y.scale)
    }

    #[inline]
    pub fn x_map(&self) -> LinearMap1D {
        LinearMap1D::new(self.scale_x, self.translate_x)
    }

    #[inline]
    pub fn y_map(&self) -> LinearMap1D {
        LinearMap1D::new(self.scale_y, self.translate_y)
    }

    /// Combine two transforms (self then other).
    pub fn then(&self, other: &AffineParams) -> Self {
        Self::from_axes(self.x_map().then(&other.x_map()), self.y_map().then(&other.y_map()))
    }

    /// Get the inverse transform.
    ///
    /// Fails with [`ChartError::DegenerateBasis`] if either scale is zero.
    pub fn inverse(&self) -> ChartResult<Self> {
        Ok(Self::from_axes(self.x_map().inverse()?, self.y_map().inverse()?))
    }

    /// Transform a point.
    #[inline]
    pub fn transform_point(&self, point: DVec2) -> DVec2 {
        DVec2::new(
            self.scale_x * point.x + self.translate_x,
            self.scale_y * point.y + self.translate_y,
        )
    }

    /// Get the translation component.
    pub fn translation(&self) -> DVec2 {
        DVec2::new(self.translate_x, self.translate_y)
    }

    /// Get the scale component.
    pub fn scale_factor(&self) -> DVec2 {
        DVec2::new(self.scale_x, self.scale_y)
    }

    /// Convert to a `glam` affine transform.
    pub fn to_affine2(&self) -> DAffine2 {
        DAffine2::from_scale_angle_translation(self.scale_factor(), 0.0, self.translation())
    }

    pub fn is_finite(&self) -> bool {
        self.translate_x.is_finite()
            && self.translate_y.is_finite()
            && self.scale_x.is_finite()
            && self.scale_y.is_finite()
    }
}

impl std::ops::Mul<AffineParams> for AffineParams {
    type Output = AffineParams;

    fn mul(self, rhs: AffineParams) -> AffineParams {
        self.then(&rhs)
    }
}

impl std::ops::Mul<DVec2> for AffineParams {
    type Output = DVec2;

    fn mul(self, rhs: DVec2) -> DVec2 {
        self.transform_point(rhs)
    }
}

/// Region the zoomed view may pan over, in unzoomed screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TranslateExtent {
    /// No panning limit.
    Unbounded,
    /// The viewport itself: the view can never be panned past the data.
    #[default]
    Viewport,
    /// A fixed rectangle.
    Rect { min: DVec2, max: DVec2 },
}

/// Limits applied to every incoming zoom transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomConstraints {
    /// Allowed scale range, applied to both axes.
    pub scale_extent: (f64, f64),
    pub translate_extent: TranslateExtent,
}

impl Default for ZoomConstraints {
    fn default() -> Self {
        Self {
            scale_extent: (1.0, 40.0),
            translate_extent: TranslateExtent::Viewport,
        }
    }
}

impl ZoomConstraints {
    /// No limits at all.
    pub fn unconstrained() -> Self {
        Self {
            scale_extent: (f64::MIN_POSITIVE, f64::MAX),
            translate_extent: TranslateExtent::Unbounded,
        }
    }

    pub fn with_scale_extent(mut self, min: f64, max: f64) -> Self {
        self.scale_extent = (min, max);
        self
    }

    pub fn with_translate_extent(mut self, extent: TranslateExtent) -> Self {
        self.translate_extent = extent;
        self
    }

    /// Check that the scale extent is a positive, finite, ordered range and
    /// that a rectangular translate extent has finite, ordered corners.
    pub fn validate(&self) -> ChartResult<()> {
        let (lo, hi) = self.scale_extent;
        if !(lo > 0.0 && lo <= hi && hi.is_finite()) {
            return Err(ChartError::DegenerateBasis { p0: lo, p1: hi });
        }

        if let TranslateExtent::Rect { min, max } = self.translate_extent {
            if !(min.is_finite() && max.is_finite()) || min.x > max.x {
                return Err(ChartError::DegenerateBasis {
                    p0: min.x,
                    p1: max.x,
                });
            }
            if min.y > max.y {
                return Err(ChartError::DegenerateBasis {
                    p0: min.y,
                    p1: max.y,
                });
            }
        }
        Ok(())
    }

    /// Clamp a zoom transform for a viewport of the given size.
    ///
    /// Scales are clamped first, then translations are limited so the visible
    /// region stays inside the translate extent. If the visible region is
    /// larger than the extent on an axis, it is centred on the extent.
    ///
    /// Fails with [`ChartError::DegenerateBasis`] if the constraints themselves
    /// are invalid (see [`ZoomConstraints::validate`]).
    pub fn constrain(&self, zoom: ZoomTransform, viewport: DVec2) -> ChartResult<ZoomTransform> {
        self.validate()?;
        let (lo, hi) = self.scale_extent;
        let scale_x = zoom.scale_x.clamp(lo, hi);
        let scale_y = zoom.scale_y.clamp(lo, hi);
        if scale_x == 0.0 || scale_y == 0.0 || !zoom.is_finite() {
            return Err(ChartError::DegenerateBasis {
                p0: scale_x,
                p1: scale_y,
            });
        }

        let extent = match self.translate_extent {
            TranslateExtent::Unbounded => None,
            TranslateExtent::Viewport => Some((DVec2::ZERO, viewport)),
            TranslateExtent::Rect { min, max } => Some((min, max)),
        };

        let (translate_x, translate_y) = match extent {
            None => (zoom.translate_x, zoom.translate_y),
            Some((min, max)) => (
                constrain_axis(zoom.translate_x, scale_x, viewport.x, min.x, max.x),
                constrain_axis(zoom.translate_y, scale_y, viewport.y, min.y, max.y),
            ),
        };

        Ok(AffineParams::new(translate_x, translate_y, scale_x, scale_y))
    }
}

/// Limit `translate` so that `[0, size]` in screen space maps inside
/// `[min, max]` in world space under `screen = scale * world + translate`.
fn constrain_axis(translate: f64, scale: f64, size: f64, min: f64, max: f64) -> f64 {
    // visible world interval is [-t / s, (size - t) / s]
    let upper = -scale * min;
    let lower = size - scale * max;
    if lower > upper {
        (lower + upper) * 0.5
    } else {
        translate.clamp(lower, upper)
    }
}
