//! End-to-end tests of centering guidance through the engine


use face_guidance::{
    config::Config,
    engine::Indicator,
    frame::Point,
    guidance::{DirectionResult, GuidanceStateMachine},
};
use test_helpers::{centred_sample, create_test_engine, empty_sample, face_sample};

const FRAME_STEP: f64 = 0.03;

#[test]
fn test_off_center_frame_restarts_stability_count() {
    let mut machine = GuidanceStateMachine::new(70, 7, 1.5);
    let reference = Point::new(320, 240);
    let centred = centred_sample(0.0).face_box;
    let off = face_sample(500, 240, 0.0).face_box;

    let sequence: Vec<_> = std::iter::repeat(centred)
        .take(6)
        .chain(std::iter::once(off))
        .chain(std::iter::repeat(centred).take(7))
        .collect();

    let centred_frames: Vec<usize> = sequence
        .iter()
        .enumerate()
        .filter_map(|(i, face)| {
            (machine.process(face.as_ref(), reference) == DirectionResult::Centered).then_some(i + 1)
        })
        .collect();

    assert_eq!(centred_frames, vec![14]);
}

#[test]
fn test_centred_face_announced_once() {
    let (mut engine, spoken) = create_test_engine(&Config::default());

    let mut announcements = Vec::new();
    let mut last = None;
    for i in 0..10 {
        let t = f64::from(i) * FRAME_STEP;
        let outcome = engine.process_frame(&centred_sample(t), t + 0.005);
        announcements.extend(outcome.announcements.clone());
        last = Some(outcome);
    }

    assert_eq!(announcements, vec!["Centered[OK]"]);
    assert_eq!(engine.center_count(), 10);

    let last = last.unwrap();
    assert_eq!(last.display.indicator, Indicator::Centered);
    assert_eq!(last.metrics.detected_frames, 10);

    engine.shutdown().unwrap();
    assert_eq!(*spoken.lock().unwrap(), vec!["Centered[OK]"]);
}

#[test]
fn test_repeated_direction_within_delay_spoken_once() {
    let (mut engine, spoken) = create_test_engine(&Config::default());

    let first = engine.process_frame(&face_sample(500, 240, 10.0), 10.0);
    let second = engine.process_frame(&face_sample(500, 240, 10.5), 10.5);

    assert_eq!(first.announcements, vec!["Move Left"]);
    assert!(second.announcements.is_empty());

    engine.shutdown().unwrap();
    assert_eq!(*spoken.lock().unwrap(), vec!["Move Left"]);
}

#[test]
fn test_new_direction_waits_for_speech_delay() {
    let (mut engine, _spoken) = create_test_engine(&Config::default());

    engine.process_frame(&face_sample(500, 240, 0.0), 0.0);
    let early = engine.process_frame(&face_sample(320, 50, 1.0), 1.0);
    assert_eq!(early.display.text, "Move Up");
    assert!(early.announcements.is_empty());

    let later = engine.process_frame(&face_sample(320, 50, 1.6), 1.6);
    assert_eq!(later.announcements, vec!["Move Up"]);
    assert_eq!(engine.last_direction(), "Move Up");
}

#[test]
fn test_missing_face_is_silent_and_resets_count() {
    let (mut engine, _spoken) = create_test_engine(&Config::default());

    for i in 0..5 {
        let t = f64::from(i) * FRAME_STEP;
        engine.process_frame(&centred_sample(t), t);
    }
    assert_eq!(engine.center_count(), 5);

    let outcome = engine.process_frame(&empty_sample(0.2), 0.2);
    assert_eq!(outcome.direction, Some(DirectionResult::NoFaceDetected));
    assert!(outcome.announcements.is_empty());
    assert_eq!(engine.center_count(), 0);
}

#[test]
fn test_response_efficiency_measures_announcement_delay() {
    let (mut engine, _spoken) = create_test_engine(&Config::default());

    let outcome = engine.process_frame(&face_sample(100, 240, 5.0), 5.004);
    assert_eq!(outcome.announcements, vec!["Move Right"]);
    assert!((outcome.metrics.response_efficiency_ms - 4.0).abs() < 1e-6);

    let quiet = engine.process_frame(&face_sample(100, 240, 5.03), 5.05);
    assert!((quiet.metrics.response_efficiency_ms - 4.0).abs() < 1e-6);
}

#[test]
fn test_custom_tolerance_and_stability() {
    let mut config = Config::default();
    config.guidance.tolerance = 10;
    config.guidance.stable_frames = 2;
    let (mut engine, _spoken) = create_test_engine(&config);

    let outcome = engine.process_frame(&face_sample(335, 240, 0.0), 0.0);
    assert_eq!(outcome.display.text, "Move Left");

    engine.process_frame(&face_sample(325, 245, 0.03), 0.03);
    let outcome = engine.process_frame(&face_sample(325, 245, 0.06), 0.06);
    assert_eq!(outcome.display.text, "Centered[OK]");
}
