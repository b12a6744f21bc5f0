//! End-to-end round scenarios through the public API

use tilt_deck::catalog::Category;
use tilt_deck::motion::{RawSample, ScreenRotation};
use tilt_deck::platform::PermissionStatus;
use tilt_deck::round::{Deck, FinishReason, HistoryEntry, Outcome, Round, Stage};
use tilt_deck::settings::Settings;

const REST: f64 = 80.0;

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn settings(seconds: u32) -> Settings {
    let mut settings = Settings {
        round_seconds: seconds,
        ..Default::default()
    };
    settings.gesture.smoothing_factor = 1.0;
    settings
}

/// Round already past calibration with the deck dealt in `order`
fn playing_round(order: &[&str], seconds: u32) -> Round {
    let category = Category::new("test", "Test", words(order));
    let deck = Deck::from_order(words(order));
    let mut round = Round::with_deck(category, &settings(seconds), deck).unwrap();
    round.begin_calibration(PermissionStatus::Granted).unwrap();
    round.on_sample(&RawSample::new(REST, 0.0), ScreenRotation::Upright, 0.0);
    assert_eq!(round.stage(), Stage::Playing);
    round
}

/// Tilt away and back; returns whatever the tilt produced
fn tilt(round: &mut Round, degrees: f64, at_ms: f64) -> Option<tilt_deck::round::RoundResult> {
    let result = round.on_sample(&RawSample::new(REST + degrees, 0.0), ScreenRotation::Upright, at_ms);
    if result.is_none() {
        round.on_sample(&RawSample::new(REST, 0.0), ScreenRotation::Upright, at_ms + 100.0);
    }
    result
}

#[test]
fn test_scenario_down_up_down() {
    let mut round = playing_round(&["Dog", "Cat", "Fish"], 30);
    assert!(tilt(&mut round, 35.0, 1000.0).is_none());
    assert!(tilt(&mut round, -35.0, 2000.0).is_none());
    let result = tilt(&mut round, 35.0, 3000.0).expect("deck exhausted");

    assert_eq!(result.category_name, "Test");
    assert_eq!(result.configured_seconds, 30);
    assert_eq!(result.total, 3);
    assert_eq!(result.correct_count, 2);
    assert_eq!(result.pass_count, 1);
    let summary: Vec<(&str, Outcome)> = result
        .history
        .iter()
        .map(|HistoryEntry { word, outcome, .. }| (word.as_str(), *outcome))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Dog", Outcome::Correct),
            ("Cat", Outcome::Pass),
            ("Fish", Outcome::Correct)
        ]
    );
    assert_eq!(round.stage(), Stage::Done);
}

#[test]
fn test_deck_exhaustion_ends_early() {
    let mut round = playing_round(&["a", "b", "c", "d", "e"], 60);
    let mut result = None;
    for i in 0..5 {
        assert!(result.is_none(), "finished before the 5th tilt");
        result = tilt(&mut round, 40.0, 1000.0 * (i + 1) as f64);
    }
    let result = result.expect("round should end on the 5th advance");
    assert_eq!(result.total, 5);
    assert_eq!(result.reason, FinishReason::DeckExhausted);
    assert_eq!(round.seconds_left(), 60);
    assert!(!round.timer_running());
}

#[test]
fn test_timeout_with_no_gestures() {
    let mut round = playing_round(&["a", "b", "c"], 30);
    let mut results = Vec::new();
    for _ in 0..29 {
        assert!(round.on_timer_tick().is_none());
    }
    results.extend(round.on_timer_tick());
    assert_eq!(round.stage(), Stage::Done);

    // Further ticks and finish attempts change nothing
    results.extend(round.on_timer_tick());
    results.extend(round.finish(FinishReason::TimeUp));
    assert!(round.end_round().is_err());

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.total, 0);
    assert_eq!(result.correct_count, 0);
    assert_eq!(result.pass_count, 0);
    assert!(result.history.is_empty());
    assert_eq!(result.reason, FinishReason::TimeUp);
}

#[test]
fn test_held_tilt_counts_once() {
    let mut round = playing_round(&["a", "b", "c"], 30);
    for i in 0..20 {
        round.on_sample(
            &RawSample::new(REST + 40.0, 0.0),
            ScreenRotation::Upright,
            1000.0 + 100.0 * i as f64,
        );
    }
    assert_eq!(round.correct_count(), 1);
    assert_eq!(round.current_word(), Some("b"));
}

#[test]
fn test_landscape_round() {
    let category = Category::new("test", "Test", words(&["a", "b"]));
    let deck = Deck::from_order(words(&["a", "b"]));
    let mut round = Round::with_deck(category, &settings(30), deck).unwrap();
    round.begin_calibration(PermissionStatus::Granted).unwrap();

    // Device turned counter-clockwise: tipping the screen forward lowers gamma
    let landscape = ScreenRotation::from_degrees(90);
    round.on_sample(&RawSample::new(2.0, 70.0), landscape, 0.0);
    round.on_sample(&RawSample::new(2.0, 40.0), landscape, 1000.0);
    assert_eq!(round.correct_count(), 1);
    assert_eq!(round.pass_count(), 0);
}

#[test]
fn test_replay_reshuffles_independently() {
    let prompts: Vec<String> = (0..30).map(|i| format!("p{i}")).collect();
    let category = Category::new("big", "Big", prompts.clone());
    let mut round = Round::new(category, &settings(30), 2024).unwrap();

    let first = round.deck().words().to_vec();
    round.quit();
    let second = round.deck().words().to_vec();
    assert_ne!(first, second);

    let mut sorted = second.clone();
    sorted.sort();
    let mut expected = prompts;
    expected.sort();
    assert_eq!(sorted, expected);
}

#[test]
fn test_stalled_calibration_escapable() {
    let mut settings = settings(30);
    settings.calibration = tilt_deck::CalibrationStrategy::Adaptive;
    let category = Category::new("test", "Test", words(&["a", "b"]));
    let mut round = Round::new(category, &settings, 5).unwrap();
    round.begin_calibration(PermissionStatus::Granted).unwrap();

    for i in 0..300 {
        round.on_sample(&RawSample::new(REST, 0.0), ScreenRotation::Upright, i as f64 * 20.0);
    }
    assert_eq!(round.stage(), Stage::Calibrating);
    assert!(round.on_timer_tick().is_none());

    round.quit();
    assert_eq!(round.stage(), Stage::Ready);
    assert!(!round.is_listening());
}
