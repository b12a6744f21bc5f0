//! Round lifecycle
//!
//! Single-threaded and event driven: the host forwards permission results,
//! sensor samples and 1 Hz timer ticks, and the round answers with at most
//! one `RoundResult`. Listener teardown happens in the same call that
//! leaves `Calibrating`/`Playing`, so a late sample is a no-op.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::deck::Deck;
use super::state::{FinishReason, Outcome, RoundConfig, RoundResult, Stage, Tally};
use crate::catalog::Category;
use crate::error::RoundError;
use crate::motion::{
    CalibrationStep, Calibrator, GestureClassifier, GestureConfig, RawSample, ScreenRotation,
    calibrator_for, normalize,
};
use crate::platform::PermissionStatus;
use crate::settings::{CalibrationStrategy, Settings};

/// Motion processing owned by the live stage
#[derive(Debug)]
enum Listener {
    Idle,
    Calibrating(Box<dyn Calibrator>),
    Classifying(GestureClassifier),
}

/// One game round for one category
#[derive(Debug)]
pub struct Round {
    category: Category,
    config: RoundConfig,
    gesture: GestureConfig,
    strategy: CalibrationStrategy,
    hold_steady_ms: f64,
    rng: Pcg32,
    stage: Stage,
    deck: Deck,
    tally: Tally,
    seconds_left: u32,
    listener: Listener,
    status: String,
    attempt: u64,
}

impl Round {
    /// New round in `Ready` with a freshly shuffled deck
    pub fn new(category: Category, settings: &Settings, seed: u64) -> Result<Self, RoundError> {
        settings.validate()?;
        let config = settings.round_config();
        let mut round = Self {
            category,
            config,
            gesture: settings.gesture,
            strategy: settings.calibration,
            hold_steady_ms: settings.hold_steady_ms,
            rng: Pcg32::seed_from_u64(seed),
            stage: Stage::Ready,
            deck: Deck::default(),
            tally: Tally::default(),
            seconds_left: config.seconds,
            listener: Listener::Idle,
            status: String::new(),
            attempt: 0,
        };
        round.start();
        Ok(round)
    }

    /// Round in `Ready` that deals `deck` as-is instead of shuffling
    pub fn with_deck(category: Category, settings: &Settings, deck: Deck) -> Result<Self, RoundError> {
        let mut round = Self::new(category, settings, 0)?;
        round.deck = deck;
        Ok(round)
    }

    /// (Re)enter `Ready`: stop listening, reshuffle, clear the tally
    pub fn start(&mut self) {
        self.teardown();
        self.deck = Deck::shuffled(&self.category.prompts, &mut self.rng);
        self.tally = Tally::default();
        self.seconds_left = self.config.seconds;
        self.stage = Stage::Ready;
        self.attempt += 1;
        self.set_status("ready");
        log::info!(
            "Round ready: '{}' ({} prompts, {}s)",
            self.category.display_name,
            self.deck.len(),
            self.config.seconds
        );
    }

    /// Switch category; always starts a fresh `Ready`
    pub fn change_category(&mut self, category: Category) {
        self.category = category;
        self.start();
    }

    /// Move to `Calibrating` once the host has answered the permission prompt
    pub fn begin_calibration(&mut self, permission: PermissionStatus) -> Result<(), RoundError> {
        if self.stage != Stage::Ready {
            return Err(self.reject("begin calibration"));
        }
        if self.category.is_empty() {
            let err = RoundError::EmptyCategory {
                key: self.category.key.clone(),
            };
            self.set_status(&err.to_string());
            log::warn!("{}", err);
            return Err(err);
        }
        if permission == PermissionStatus::Denied {
            self.set_status("motion permission denied");
            log::warn!("Motion permission denied; staying in Ready");
            return Err(RoundError::PermissionDenied);
        }

        let calibrator = calibrator_for(self.strategy, self.gesture, self.hold_steady_ms);
        self.set_status(calibrator.status());
        self.listener = Listener::Calibrating(calibrator);
        self.stage = Stage::Calibrating;
        log::info!("Calibrating ({})", self.strategy.as_str());
        Ok(())
    }

    /// Feed one sensor sample. Returns the result if this sample ended the round.
    pub fn on_sample(
        &mut self,
        sample: &RawSample,
        rotation: ScreenRotation,
        now_ms: f64,
    ) -> Option<RoundResult> {
        let reading = normalize(sample, rotation)?;

        match &mut self.listener {
            Listener::Idle => None,
            Listener::Calibrating(calibrator) => {
                let step = calibrator.observe(&reading, now_ms);
                let status = calibrator.status();
                match step {
                    CalibrationStep::Pending => {
                        if self.status != status {
                            self.set_status(status);
                        }
                    }
                    CalibrationStep::Complete(calibration) => {
                        self.listener = Listener::Classifying(GestureClassifier::from_calibration(
                            self.gesture,
                            calibration,
                        ));
                        self.seconds_left = self.config.seconds;
                        self.stage = Stage::Playing;
                        self.set_status("playing");
                        log::info!("Playing: {:?}", calibration.profile);
                    }
                }
                None
            }
            Listener::Classifying(classifier) => {
                let gesture = classifier.observe(&reading, now_ms)?;
                self.advance(gesture.into(), now_ms)
            }
        }
    }

    /// One-second countdown tick. Returns the result when time runs out.
    pub fn on_timer_tick(&mut self) -> Option<RoundResult> {
        if self.stage != Stage::Playing {
            return None;
        }
        self.seconds_left = self.seconds_left.saturating_sub(1);
        if self.seconds_left == 0 {
            return self.finish(FinishReason::TimeUp);
        }
        None
    }

    /// Resolve the current prompt. Ignored unless `Playing`; returns the
    /// result if this used up the deck.
    pub fn advance(&mut self, outcome: Outcome, now_ms: f64) -> Option<RoundResult> {
        if self.stage != Stage::Playing {
            return None;
        }
        let word = self.deck.advance()?;
        log::debug!("{:?}: {}", outcome, word);
        self.tally.record(word, outcome, now_ms);
        if self.deck.is_exhausted() {
            return self.finish(FinishReason::DeckExhausted);
        }
        None
    }

    pub fn mark_correct(&mut self, now_ms: f64) -> Option<RoundResult> {
        self.advance(Outcome::Correct, now_ms)
    }

    pub fn mark_pass(&mut self, now_ms: f64) -> Option<RoundResult> {
        self.advance(Outcome::Pass, now_ms)
    }

    /// Manual early finish, only while `Playing`
    pub fn end_round(&mut self) -> Result<RoundResult, RoundError> {
        if self.stage != Stage::Playing {
            return Err(self.reject("end the round"));
        }
        self.finish(FinishReason::EndedEarly)
            .ok_or(RoundError::WrongStage {
                action: "end the round",
                stage: self.stage,
            })
    }

    /// Finalize the round. Only the first call from `Playing` produces a
    /// result; every later call is a no-op.
    pub fn finish(&mut self, reason: FinishReason) -> Option<RoundResult> {
        if self.stage != Stage::Playing {
            return None;
        }
        self.teardown();
        self.stage = Stage::Done;
        self.set_status("done");

        let tally = std::mem::take(&mut self.tally);
        let result = RoundResult::new(
            self.category.display_name.clone(),
            self.config.seconds,
            tally,
            reason,
        );
        log::info!(
            "Round finished ({:?}): {} correct, {} passed of {}",
            reason,
            result.correct_count,
            result.pass_count,
            result.total
        );
        Some(result)
    }

    /// Quit/cancel: abandon any live attempt without a result and return to
    /// a freshly shuffled `Ready`. This is the escape hatch for a stalled
    /// calibration.
    pub fn quit(&mut self) {
        if self.stage != Stage::Ready {
            log::info!("Round abandoned from {}", self.stage);
        }
        self.start();
    }

    fn teardown(&mut self) {
        self.listener = Listener::Idle;
    }

    fn reject(&mut self, action: &'static str) -> RoundError {
        let err = RoundError::WrongStage {
            action,
            stage: self.stage,
        };
        log::warn!("{}", err);
        err
    }

    fn set_status(&mut self, status: &str) {
        self.status.clear();
        self.status.push_str(status);
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether the host should keep the sensor subscription alive
    pub fn is_listening(&self) -> bool {
        !matches!(self.listener, Listener::Idle)
    }

    /// Whether the host should keep the 1 Hz timer running
    pub fn timer_running(&self) -> bool {
        self.stage == Stage::Playing
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn current_word(&self) -> Option<&str> {
        match self.stage {
            Stage::Playing => self.deck.current(),
            _ => None,
        }
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub fn correct_count(&self) -> usize {
        self.tally.count(Outcome::Correct)
    }

    pub fn pass_count(&self) -> usize {
        self.tally.count(Outcome::Pass)
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn config(&self) -> RoundConfig {
        self.config
    }

    /// Number of times this round has entered `Ready`. An answer to a
    /// request made under an older attempt belongs to an abandoned attempt.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }
}
