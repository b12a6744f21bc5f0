//! Round stages, tally and result types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_ROUND_SECONDS;
use crate::motion::Gesture;

/// Round lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Deck shuffled, nothing listening
    Ready,
    /// Permission granted, calibration running, timer stopped
    Calibrating,
    /// Timer running, gestures counted
    Playing,
    /// Finished; result already handed off
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ready => "ready",
            Stage::Calibrating => "calibrating",
            Stage::Playing => "playing",
            Stage::Done => "done",
        }
    }

    /// Whether the sensor listener should be attached
    pub fn is_listening(&self) -> bool {
        matches!(self, Stage::Calibrating | Stage::Playing)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a prompt was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Pass,
}

impl From<Gesture> for Outcome {
    fn from(gesture: Gesture) -> Self {
        match gesture {
            Gesture::Down => Outcome::Correct,
            Gesture::Up => Outcome::Pass,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub word: String,
    pub outcome: Outcome,
    /// Host clock (ms) when the prompt was resolved
    pub timestamp_ms: f64,
}

/// Append-only record of resolved prompts; counts are derived from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    history: Vec<HistoryEntry>,
}

impl Tally {
    pub fn record(&mut self, word: String, outcome: Outcome, timestamp_ms: f64) {
        self.history.push(HistoryEntry {
            word,
            outcome,
            timestamp_ms,
        });
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.history.iter().filter(|e| e.outcome == outcome).count()
    }

    pub fn total(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn into_history(self) -> Vec<HistoryEntry> {
        self.history
    }
}

/// Round timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub seconds: u32,
}

impl RoundConfig {
    /// Zero falls back to the default length
    pub fn new(seconds: u32) -> Self {
        let seconds = if seconds == 0 {
            DEFAULT_ROUND_SECONDS
        } else {
            seconds
        };
        Self { seconds }
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROUND_SECONDS)
    }
}

/// Why a round finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    TimeUp,
    DeckExhausted,
    EndedEarly,
}

/// Snapshot produced once when a round finishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub category_name: String,
    pub configured_seconds: u32,
    pub total: usize,
    pub correct_count: usize,
    pub pass_count: usize,
    pub history: Vec<HistoryEntry>,
    pub reason: FinishReason,
}

impl RoundResult {
    pub(crate) fn new(
        category_name: String,
        configured_seconds: u32,
        tally: Tally,
        reason: FinishReason,
    ) -> Self {
        Self {
            category_name,
            configured_seconds,
            total: tally.total(),
            correct_count: tally.count(Outcome::Correct),
            pass_count: tally.count(Outcome::Pass),
            history: tally.into_history(),
            reason,
        }
    }

    fn words_with(&self, outcome: Outcome) -> Vec<&str> {
        self.history
            .iter()
            .filter(|e| e.outcome == outcome)
            .map(|e| e.word.as_str())
            .collect()
    }

    pub fn correct_words(&self) -> Vec<&str> {
        self.words_with(Outcome::Correct)
    }

    pub fn passed_words(&self) -> Vec<&str> {
        self.words_with(Outcome::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts_derive_from_history() {
        let mut tally = Tally::default();
        tally.record("Dog".into(), Outcome::Correct, 1.0);
        tally.record("Cat".into(), Outcome::Pass, 2.0);
        tally.record("Fish".into(), Outcome::Correct, 3.0);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.count(Outcome::Correct), 2);
        assert_eq!(tally.count(Outcome::Pass), 1);

        let result = RoundResult::new("Pets".into(), 30, tally, FinishReason::DeckExhausted);
        assert_eq!(result.correct_words(), vec!["Dog", "Fish"]);
        assert_eq!(result.passed_words(), vec!["Cat"]);
    }

    #[test]
    fn test_result_json_shape() {
        let mut tally = Tally::default();
        tally.record("Dog".into(), Outcome::Correct, 5.0);
        let result = RoundResult::new("Pets".into(), 60, tally, FinishReason::TimeUp);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["categoryName"], "Pets");
        assert_eq!(json["configuredSeconds"], 60);
        assert_eq!(json["correctCount"], 1);
        assert_eq!(json["history"][0]["outcome"], "correct");
        assert_eq!(json["reason"], "timeup");
    }

    #[test]
    fn test_gesture_mapping() {
        assert_eq!(Outcome::from(Gesture::Down), Outcome::Correct);
        assert_eq!(Outcome::from(Gesture::Up), Outcome::Pass);
    }

    #[test]
    fn test_stage_listening() {
        assert!(!Stage::Ready.is_listening());
        assert!(Stage::Calibrating.is_listening());
        assert!(Stage::Playing.is_listening());
        assert!(!Stage::Done.is_listening());
        assert_eq!(Stage::Playing.to_string(), "playing");
    }
}
