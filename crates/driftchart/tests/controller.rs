//! End-to-end controller tests.
//!
//! A recording surface stands in for the renderer so that redraw coalescing,
//! vertical auto-scaling and geometry rebuilds can be observed.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use driftchart::{
    AffineParams, ChartConfig, ChartController, ChartSurface, Frame, MinMax, RedrawFlags,
    RedrawState, Sample, SampleWindow, SlideStrategy, TupleBuilder,
};
use glam::DVec2;

#[derive(Default)]
struct RecordingSurface {
    rebuilds: usize,
    runs: Vec<Vec<std::ops::Range<usize>>>,
    frames: Vec<Frame>,
}

impl ChartSurface for RecordingSurface {
    fn rebuild_geometry(&mut self, window: &SampleWindow) {
        self.rebuilds += 1;
        self.runs.push(window.defined_runs(0).collect());
    }

    fn apply_frame(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}

const SCENARIO: [f64; 8] = [1.0, 5.0, 3.0, f64::NAN, 9.0, 2.0, 4.0, 6.0];

fn config() -> ChartConfig {
    ChartConfig::new(0.0, 1_000.0).with_viewport_size(800.0, 400.0)
}

fn scenario_chart() -> ChartController {
    let samples = SCENARIO.map(Sample::from).to_vec();
    ChartController::new(config(), samples, TupleBuilder::raw()).unwrap()
}

fn approx(a: DVec2, b: DVec2) -> bool {
    (a - b).length() < 1e-9
}

#[test]
fn test_gestures_coalesce_into_one_frame() {
    let mut chart = scenario_chart();
    let mut surface = RecordingSurface::default();
    chart.on_frame(&mut surface).unwrap();

    let g1 = AffineParams::new(-100.0, 0.0, 2.0, 1.0);
    let g2 = AffineParams::new(-400.0, 0.0, 2.0, 1.0);
    let g3 = AffineParams::new(-800.0, 0.0, 2.0, 1.0);
    for gesture in [g1, g2, g3] {
        chart.on_zoom_pan(gesture).unwrap();
    }
    assert_eq!(chart.redraw_state(), RedrawState::Pending(RedrawFlags::VIEW));

    let frame = chart.on_frame(&mut surface).unwrap().unwrap();
    assert!(chart.on_frame(&mut surface).unwrap().is_none());
    assert_eq!(surface.frames.len(), 2);
    assert_eq!(surface.rebuilds, 1);

    // the frame reflects the last gesture only
    assert_eq!(chart.viewport().zoom(), g3);
    assert_eq!(frame.flags, RedrawFlags::VIEW);
    assert!((frame.visible_index.p0() - 3.5).abs() < 1e-9);
    assert!((frame.visible_index.p1() - 7.0).abs() < 1e-9);
    // indices 3..=7 hold [-, 9, 2, 4, 6]
    assert_eq!(frame.value_visible.unwrap().to_pair(), (2.0, 9.0));
    assert!(approx(
        frame.transform.transform_point(DVec2::new(7.0, 9.0)),
        DVec2::new(800.0, 0.0)
    ));
    assert!(approx(
        frame.transform.transform_point(DVec2::new(3.5, 2.0)),
        DVec2::new(0.0, 400.0)
    ));

    let stats = chart.statistics();
    assert_eq!(stats.redraws, 2);
    assert_eq!(stats.coalesced_requests, 2);
}

#[test]
fn test_slide_scenario() {
    let mut chart = scenario_chart();
    let mut surface = RecordingSurface::default();

    let first = chart.on_frame(&mut surface).unwrap().unwrap();
    assert_eq!(first.value_visible.unwrap().to_pair(), (1.0, 9.0));
    assert_eq!(surface.runs[0], vec![0..3, 4..8]);

    chart.push_sample(Sample::from(7.0)).unwrap();
    let frame = chart.on_frame(&mut surface).unwrap().unwrap();

    // window is now [5, 3, -, 9, 2, 4, 6, 7]
    assert!(frame.flags.needs_geometry_rebuild());
    assert_eq!(frame.aggregate.get(0), Some(MinMax::new(2.0, 9.0)));
    assert_eq!(frame.value_visible.unwrap().to_pair(), (2.0, 9.0));
    let (t0, t1) = frame.visible_time.to_pair();
    assert!((t0 - 1_000.0).abs() < 1e-6 && (t1 - 8_000.0).abs() < 1e-6);
    assert_eq!(surface.rebuilds, 2);
    assert_eq!(surface.runs[1], vec![0..2, 3..8]);
}

#[test]
fn test_missing_series_do_not_affect_value_range() {
    let samples = vec![
        Sample::from([1.0, f64::NAN]),
        Sample::from([3.0, f64::NAN]),
        Sample::from([2.0, 100.0]),
        Sample::from([4.0, f64::NAN]),
    ];
    let mut chart = ChartController::new(config(), samples, TupleBuilder::raw()).unwrap();
    let mut surface = RecordingSurface::default();

    let full = chart.on_frame(&mut surface).unwrap().unwrap();
    assert_eq!(full.value_visible.unwrap().to_pair(), (1.0, 100.0));

    // visible indices [0, 0.75], widened to [0, 1]: series 1 has no data there
    chart.on_zoom_pan(AffineParams::new(0.0, 0.0, 4.0, 1.0)).unwrap();
    let zoomed = chart.on_frame(&mut surface).unwrap().unwrap();
    assert_eq!(zoomed.aggregate.get(1), None);
    assert_eq!(zoomed.aggregate.get(0), Some(MinMax::new(1.0, 3.0)));
    assert_eq!(zoomed.value_visible.unwrap().to_pair(), (1.0, 3.0));
}

#[test]
fn test_resize_reconstrains_zoom() {
    let mut chart = scenario_chart();
    let mut surface = RecordingSurface::default();
    chart.on_zoom_pan(AffineParams::new(-800.0, 0.0, 2.0, 1.0)).unwrap();
    chart.on_frame(&mut surface).unwrap();

    chart.on_viewport_resize(400.0, 200.0).unwrap();
    assert_eq!(chart.viewport().zoom(), AffineParams::new(-400.0, 0.0, 2.0, 1.0));

    let frame = chart.on_frame(&mut surface).unwrap().unwrap();
    assert_eq!(frame.flags, RedrawFlags::BOUNDS);
    assert!(frame.flags.is_transform_only());
    assert_eq!(surface.rebuilds, 1);
    assert!(approx(
        frame.transform.transform_point(DVec2::new(7.0, 9.0)),
        DVec2::new(400.0, 0.0)
    ));
}

#[test]
fn test_notifier_fires_once_per_pending_redraw() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut chart = scenario_chart().with_redraw_notifier(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    // the initial redraw is still pending
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let mut surface = RecordingSurface::default();
    chart.on_frame(&mut surface).unwrap();

    for v in [1.0, 2.0, 3.0] {
        chart.push_sample(Sample::from(v)).unwrap();
    }
    chart.on_zoom_pan(AffineParams::new(0.0, 0.0, 1.5, 1.0)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let frame = chart.on_frame(&mut surface).unwrap().unwrap();
    assert_eq!(frame.flags, RedrawFlags::DATA | RedrawFlags::VIEW);
    assert_eq!(surface.rebuilds, 2);
}

#[test]
fn test_slide_strategies_agree() {
    let samples = SCENARIO.map(Sample::from).to_vec();
    let mut incremental =
        ChartController::new(config(), samples.clone(), TupleBuilder::raw()).unwrap();
    let mut rebuilt = ChartController::new(
        config().with_slide_strategy(SlideStrategy::Rebuild),
        samples,
        TupleBuilder::raw(),
    )
    .unwrap();

    let mut a = RecordingSurface::default();
    let mut b = RecordingSurface::default();
    for step in 0..20 {
        let sample = Sample::from((step as f64 * 0.7).sin() * 10.0);
        incremental.push_sample(sample.clone()).unwrap();
        rebuilt.push_sample(sample).unwrap();
        if step % 3 == 0 {
            incremental.replace_sample(2, Sample::from(step as f64)).unwrap();
            rebuilt.replace_sample(2, Sample::from(step as f64)).unwrap();
        }
        assert_eq!(
            incremental.on_frame(&mut a).unwrap(),
            rebuilt.on_frame(&mut b).unwrap()
        );
    }
}

#[test]
fn test_profiling_feature_reaches_core() {
    // `--no-default-features` on this crate must also turn the HTTP server off in core
    assert_eq!(
        driftchart::profiling::http_server_available(),
        cfg!(feature = "profiling")
    );
}
