//! Crypto market mood. Same shape as the stock mood with amplified dynamics
//! and narrative metrics (hype, dominance) in place of the macro backdrop.

use super::cycle::{clamp_sentiment, clamp_volatility, crypto_dynamics, next_crypto_phase};
use super::label::{MoodColor, MoodLabel};
use crate::random::RandomSource;
use crate::types::{CryptoMetrics, CyclePhase, PhaseTransition};
use serde::Serialize;

pub const CRYPTO_INITIAL_SENTIMENT: f64 = 50.0;
pub const CRYPTO_INITIAL_VOLATILITY: f64 = 50.0;
pub const CRYPTO_INITIAL_HYPE: f64 = 50.0;
pub const CRYPTO_INITIAL_DOMINANCE: f64 = 52.4;

/// Mood state of the crypto market.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CryptoMood {
    pub(crate) sentiment_index: f64,
    pub(crate) volatility_index: f64,
    pub(crate) cycle_phase: CyclePhase,
    pub(crate) hype: f64,
    pub(crate) dominance: f64,
    pub(crate) tick_count: u64,
}

impl Default for CryptoMood {
    fn default() -> Self {
        Self {
            sentiment_index: CRYPTO_INITIAL_SENTIMENT,
            volatility_index: CRYPTO_INITIAL_VOLATILITY,
            cycle_phase: CyclePhase::Accumulation,
            hype: CRYPTO_INITIAL_HYPE,
            dominance: CRYPTO_INITIAL_DOMINANCE,
            tick_count: 0,
        }
    }
}

impl CryptoMood {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sentiment_index(&self) -> f64 {
        self.sentiment_index
    }

    pub fn volatility_index(&self) -> f64 {
        self.volatility_index
    }

    pub fn cycle_phase(&self) -> CyclePhase {
        self.cycle_phase
    }

    pub fn hype(&self) -> f64 {
        self.hype
    }

    pub fn dominance(&self) -> f64 {
        self.dominance
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn mood_label(&self) -> MoodLabel {
        MoodLabel::from_sentiment(self.sentiment_index)
    }

    pub fn mood_color(&self) -> MoodColor {
        self.mood_label().color()
    }

    pub fn set_sentiment(&mut self, value: f64) {
        self.sentiment_index = clamp_sentiment(value);
    }

    pub fn set_volatility(&mut self, value: f64) {
        self.volatility_index = clamp_volatility(value);
    }

    pub fn set_phase(&mut self, phase: CyclePhase) {
        self.cycle_phase = phase;
    }

    pub fn tick<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let dynamics = crypto_dynamics(self.cycle_phase);
        let (sentiment, volatility) =
            dynamics.step(self.sentiment_index, self.volatility_index, rng.next_float());
        self.sentiment_index = sentiment;
        self.volatility_index = volatility;
        self.tick_count = self.tick_count.saturating_add(1);
    }

    /// Store hype and dominance, then evaluate the crypto cycle.
    pub fn update_crypto_engine(&mut self, metrics: CryptoMetrics) -> Option<PhaseTransition> {
        self.hype = clamp_unit_percent(metrics.hype, self.hype);
        self.dominance = clamp_unit_percent(metrics.dominance, self.dominance);

        let from = self.cycle_phase;
        let to = next_crypto_phase(from, self.sentiment_index);
        if to == from {
            return None;
        }

        self.cycle_phase = to;
        tracing::info!(
            "Crypto cycle {} -> {} (sentiment={:.1}, hype={:.1})",
            from,
            to,
            self.sentiment_index,
            self.hype
        );
        Some(PhaseTransition { from, to })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn clamp_unit_percent(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 100.0)
    }
}
