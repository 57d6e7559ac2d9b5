//! Lighting advisory properties


use face_guidance::{
    config::Config,
    frame::FrameSample,
    lighting::{AdvisoryChange, LightingMonitor},
};
use rand::Rng;
use test_helpers::create_test_engine;

#[test]
fn test_advisory_toggles_at_most_once_per_window() {
    let mut rng = rand::thread_rng();

    for _ in 0..50 {
        let mut monitor = LightingMonitor::new(60.0, 3.0);
        let mut last_change: Option<f64> = None;
        let mut now = 0.0;

        for _ in 0..500 {
            now += rng.gen_range(0.01..0.5);
            let brightness = rng.gen_range(0.0..255.0);
            let was_warning = monitor.warning();

            if let Some(change) = monitor.check(brightness, now) {
                if let Some(previous) = last_change {
                    assert!(now - previous > 3.0, "toggled after {}s", now - previous);
                }
                match change {
                    AdvisoryChange::Raised => assert!(!was_warning && brightness < 60.0),
                    AdvisoryChange::Cleared => assert!(was_warning && brightness >= 60.0),
                }
                last_change = Some(now);
            }
        }
    }
}

#[test]
fn test_no_advisory_while_bright() {
    let mut rng = rand::thread_rng();
    let mut monitor = LightingMonitor::default();

    for i in 0..1000 {
        let brightness = rng.gen_range(60.0..=255.0);
        assert_eq!(monitor.check(brightness, f64::from(i) * 0.1), None);
    }
    assert!(!monitor.warning());
}

#[test]
fn test_lighting_advisories_through_engine() {
    let (mut engine, spoken) = create_test_engine(&Config::default());

    let mut announcements = Vec::new();
    for i in 0..300 {
        let t = f64::from(i) * 0.03;
        // Dark for the first four seconds, bright afterwards.
        let brightness = if t < 4.0 { 20.0 } else { 150.0 };
        let outcome = engine.process_frame(&FrameSample::new(640, 480, brightness, t), t);
        announcements.extend(outcome.announcements);
    }

    assert_eq!(
        announcements,
        vec!["Lighting too low. Please increase brightness.", "Lighting is okay."]
    );
    assert!(!engine.lighting_warning());

    engine.shutdown().unwrap();
    assert_eq!(spoken.lock().unwrap().len(), 2);
}
