use super::*;
use crate::foundation::core::Point;

fn sample_effect(ease: Ease) -> Effect {
    Effect::new(
        Rect::new(0.0, 0.0, 1920.0, 1080.0),
        Rect::new(480.3, 270.1, 1440.7, 810.9),
        ease,
    )
    .unwrap()
}

#[test]
fn boundary_values_are_exact_for_every_ease() {
    for ease in Ease::ALL {
        let fx = sample_effect(ease);
        assert_eq!(fx.evaluate(0.0), fx.start, "{ease:?}");
        assert_eq!(fx.evaluate(1.0), fx.end, "{ease:?}");
    }
}

#[test]
fn evaluate_is_repeatable_and_monotonic() {
    let fx = sample_effect(Ease::InOutCubic);
    let mut prev = fx.evaluate(0.0);
    for i in 1..=200 {
        let p = f64::from(i) / 200.0;
        let v = fx.evaluate(p);
        assert_eq!(v, fx.evaluate(p));
        // start -> end shrinks the viewport, so x0 grows and x1 shrinks.
        assert!(v.x0 >= prev.x0 && v.x1 <= prev.x1, "step {i}");
        prev = v;
    }
}

#[test]
fn evaluate_clamps_out_of_range_progress() {
    let fx = sample_effect(Ease::Linear);
    assert_eq!(fx.evaluate(-1.0), fx.start);
    assert_eq!(fx.evaluate(2.0), fx.end);
}

#[test]
fn still_effect_never_moves() {
    let r = Rect::new(10.0, 10.0, 110.0, 60.0);
    let fx = Effect::still(r).unwrap();
    assert_eq!(fx.evaluate(0.37), r);
}

#[test]
fn zoom_direction_swaps_viewports() {
    let full = full_frame(800, 600);
    let focus = Rect::new(100.0, 100.0, 500.0, 400.0);
    assert_eq!(Effect::zoom(full, focus, true).unwrap().end, focus);
    assert_eq!(Effect::zoom(full, focus, false).unwrap().start, focus);
}

#[test]
fn new_rejects_degenerate_viewports() {
    let ok = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(Effect::new(Rect::new(0.0, 0.0, 0.0, 10.0), ok, Ease::Linear).is_err());
    assert!(Effect::new(ok, Rect::new(0.0, 0.0, f64::INFINITY, 1.0), Ease::Linear).is_err());
}

#[test]
fn transform_maps_viewport_corners_to_canvas() {
    let fx = Effect::still(Rect::new(100.0, 50.0, 300.0, 150.0)).unwrap();
    let canvas = Canvas {
        width: 400,
        height: 200,
    };
    let a = fx.transform(0.5, canvas);
    assert_eq!(a * Point::new(100.0, 50.0), Point::new(0.0, 0.0));
    assert_eq!(a * Point::new(300.0, 150.0), Point::new(400.0, 200.0));
}

#[test]
fn progress_tracks_elapsed_time() {
    let total = MediaDuration::from_millis(2_500);
    assert_eq!(progress_at(MediaDuration::ZERO, total), 0.0);
    assert_eq!(progress_at(MediaDuration::from_millis(1_250), total), 0.5);
    assert_eq!(progress_at(MediaDuration::from_millis(9_000), total), 1.0);
    assert_eq!(progress_at(MediaDuration::ZERO, MediaDuration::ZERO), 1.0);
}

#[test]
fn effect_json_defaults_to_linear() {
    let fx: Effect = serde_json::from_str(
        r#"{"start":{"x0":0,"y0":0,"x1":10,"y1":10},"end":{"x0":2,"y0":2,"x1":8,"y1":8}}"#,
    )
    .unwrap();
    assert_eq!(fx.ease, Ease::Linear);
    assert_eq!(fx.evaluate(0.5), Rect::new(1.0, 1.0, 9.0, 9.0));
}
