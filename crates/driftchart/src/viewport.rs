//! Index, value and screen space bookkeeping under zoom and pan.
//!
//! The transform handed to the renderer is `zoom ∘ reference`:
//!
//! - the *reference* transform maps the full index range onto the screen
//!   width and the visible value range onto the (inverted) screen height; it
//!   is the neutral frame of the zoom (scale = 1);
//! - the *zoom* transform is the gesture state captured in screen space.
//!
//! The reference frame deliberately mixes two kinds of range: horizontally it
//! uses the *full* retained index range, vertically only the value range of
//! the *visible* indices. Panning therefore does not change the horizontal
//! reference, while the vertical axis auto-scales to what is on screen.

use glam::DVec2;

use crate::basis::AR1Basis;
use crate::error::ChartResult;
use crate::transform::{AffineParams, ZoomConstraints, ZoomTransform};

/// Owns the three coupled bases and the zoom state of one chart.
#[derive(Debug, Clone)]
pub struct ViewportTransform {
    size: DVec2,
    /// `[0, width]`
    screen_x: AR1Basis,
    /// `[height, 0]`: screen Y grows downwards
    screen_y: AR1Basis,
    index_full: AR1Basis,
    value_visible: AR1Basis,
    reference: AffineParams,
    zoom: ZoomTransform,
    constraints: ZoomConstraints,
}

impl ViewportTransform {
    /// Create a viewport of `width x height` pixels with the given reference
    /// bases and no zoom applied.
    ///
    /// Fails if the size is zero or the constraints are invalid.
    pub fn new(
        width: f64,
        height: f64,
        index_full: AR1Basis,
        value_visible: AR1Basis,
        constraints: ZoomConstraints,
    ) -> ChartResult<Self> {
        constraints.validate()?;
        let (screen_x, screen_y) = screen_bases(width, height)?;
        let mut viewport = Self {
            size: DVec2::new(width, height),
            screen_x,
            screen_y,
            index_full,
            value_visible,
            reference: AffineParams::IDENTITY,
            zoom: AffineParams::IDENTITY,
            constraints,
        };
        viewport.on_reference_window_resize(index_full, value_visible);
        Ok(viewport)
    }

    /// Record a new viewport size.
    ///
    /// Only the cached screen bases change; the reference transform is
    /// recomputed by the next [`ViewportTransform::on_reference_window_resize`].
    pub fn on_viewport_resize(&mut self, width: f64, height: f64) -> ChartResult<()> {
        let (screen_x, screen_y) = screen_bases(width, height)?;
        self.size = DVec2::new(width, height);
        self.screen_x = screen_x;
        self.screen_y = screen_y;

        tracing::debug!(width, height, "Viewport resized");
        Ok(())
    }

    /// Replace the zoom-neutral reference bases and recompute the reference
    /// transform.
    pub fn on_reference_window_resize(&mut self, index_full: AR1Basis, value_visible: AR1Basis) {
        self.index_full = index_full;
        self.value_visible = value_visible;
        self.reference = AffineParams::from_axes(
            index_full.map_to(&self.screen_x),
            value_visible.map_to(&self.screen_y),
        );
    }

    /// Store a captured zoom/pan state after applying the zoom constraints.
    ///
    /// Pure state update; nothing is recomputed until the transform is read.
    pub fn on_zoom_pan(&mut self, zoom: ZoomTransform) -> ChartResult<()> {
        self.zoom = self.constraints.constrain(zoom, self.size)?;
        Ok(())
    }

    /// Drop any zoom/pan.
    pub fn reset_zoom(&mut self) {
        self.zoom = AffineParams::IDENTITY;
    }

    /// The transform from model (index, value) space to screen pixels.
    pub fn current_transform(&self) -> AffineParams {
        self.reference.then(&self.zoom)
    }

    /// Inverse-map a horizontal screen interval to index space.
    ///
    /// With `[0, width]` this yields the currently visible index range.
    pub fn screen_to_model_x(&self, screen: AR1Basis) -> ChartResult<AR1Basis> {
        self.current_transform().x_map().inverse()?.apply_basis(&screen)
    }

    /// Inverse-map a vertical screen interval to value space.
    pub fn screen_to_model_y(&self, screen: AR1Basis) -> ChartResult<AR1Basis> {
        self.current_transform().y_map().inverse()?.apply_basis(&screen)
    }

    /// The visible index interval, `screen_to_model_x([0, width])`.
    pub fn visible_index(&self) -> ChartResult<AR1Basis> {
        self.screen_to_model_x(self.screen_x)
    }

    /// Map a model point to screen pixels.
    pub fn model_to_screen(&self, point: DVec2) -> DVec2 {
        self.current_transform().transform_point(point)
    }

    /// Map a screen pixel back to model space, for hit-testing.
    pub fn screen_to_model(&self, point: DVec2) -> ChartResult<DVec2> {
        Ok(self.current_transform().inverse()?.transform_point(point))
    }

    /// Viewport size in pixels.
    #[inline]
    pub fn size(&self) -> DVec2 {
        self.size
    }

    /// `[0, width]`.
    #[inline]
    pub fn screen_x(&self) -> AR1Basis {
        self.screen_x
    }

    /// `[height, 0]`.
    #[inline]
    pub fn screen_y(&self) -> AR1Basis {
        self.screen_y
    }

    #[inline]
    pub fn index_full(&self) -> AR1Basis {
        self.index_full
    }

    #[inline]
    pub fn value_visible(&self) -> AR1Basis {
        self.value_visible
    }

    #[inline]
    pub fn zoom(&self) -> ZoomTransform {
        self.zoom
    }

    #[inline]
    pub fn reference(&self) -> AffineParams {
        self.reference
    }

    #[inline]
    pub fn constraints(&self) -> &ZoomConstraints {
        &self.constraints
    }
}

fn screen_bases(width: f64, height: f64) -> ChartResult<(AR1Basis, AR1Basis)> {
    Ok((AR1Basis::new(0.0, width)?, AR1Basis::new(height, 0.0)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChartError;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn viewport() -> ViewportTransform {
        ViewportTransform::new(
            800.0,
            400.0,
            AR1Basis::new(0.0, 7.0).unwrap(),
            AR1Basis::new(2.0, 9.0).unwrap(),
            ZoomConstraints::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_reference_maps_corners() {
        let v = viewport();
        let t = v.current_transform();
        let bottom_left = t.transform_point(DVec2::new(0.0, 2.0));
        let top_right = t.transform_point(DVec2::new(7.0, 9.0));
        assert!(approx(bottom_left.x, 0.0) && approx(bottom_left.y, 400.0));
        assert!(approx(top_right.x, 800.0) && approx(top_right.y, 0.0));
    }

    #[test]
    fn test_unzoomed_visible_index_is_full_range() {
        let v = viewport();
        let visible = v.visible_index().unwrap();
        assert!(approx(visible.p0(), 0.0));
        assert!(approx(visible.p1(), 7.0));
    }

    #[test]
    fn test_zoom_narrows_visible_index() {
        let mut v = viewport();
        // 2x zoom panned to the right half of the data
        v.on_zoom_pan(AffineParams::new(-800.0, 0.0, 2.0, 1.0)).unwrap();
        let visible = v.visible_index().unwrap();
        assert!(approx(visible.p0(), 3.5));
        assert!(approx(visible.p1(), 7.0));
    }

    #[test]
    fn test_zoom_is_constrained() {
        let mut v = viewport();
        v.on_zoom_pan(AffineParams::new(500.0, 0.0, 0.1, 1.0)).unwrap();
        assert_eq!(v.zoom(), AffineParams::IDENTITY);
    }

    #[test]
    fn test_resize_waits_for_reference_update() {
        let mut v = viewport();
        let before = v.current_transform();
        v.on_viewport_resize(400.0, 200.0).unwrap();
        assert_eq!(v.current_transform(), before);

        v.on_reference_window_resize(v.index_full(), v.value_visible());
        let t = v.current_transform();
        assert!(approx(t.transform_point(DVec2::new(7.0, 9.0)).x, 400.0));
    }

    #[test]
    fn test_degenerate_resize_rejected() {
        let mut v = viewport();
        assert_eq!(
            v.on_viewport_resize(0.0, 100.0),
            Err(ChartError::DegenerateBasis { p0: 0.0, p1: 0.0 })
        );
        assert_eq!(v.size(), DVec2::new(800.0, 400.0));
    }

    #[test]
    fn test_invalid_constraints_rejected() {
        let result = ViewportTransform::new(
            800.0,
            400.0,
            AR1Basis::new(0.0, 7.0).unwrap(),
            AR1Basis::new(2.0, 9.0).unwrap(),
            ZoomConstraints::default().with_scale_extent(5.0, 1.0),
        );
        assert_eq!(result.unwrap_err(), ChartError::DegenerateBasis { p0: 5.0, p1: 1.0 });
    }

    #[test]
    fn test_screen_round_trip() {
        let mut v = viewport();
        v.on_zoom_pan(AffineParams::new(-120.0, 0.0, 3.0, 1.0)).unwrap();
        let p = DVec2::new(4.25, 5.5);
        let back = v.screen_to_model(v.model_to_screen(p)).unwrap();
        assert!((back - p).length() < 1e-9);

        let values = v.screen_to_model_y(v.screen_y()).unwrap();
        assert!(approx(values.p0(), 2.0));
        assert!(approx(values.p1(), 9.0));
    }
}
