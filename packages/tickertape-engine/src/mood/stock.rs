//! Stock market mood: fear/greed, volatility, cycle phase and macro backdrop.

use super::cycle::{clamp_sentiment, clamp_volatility, next_stock_phase, stock_dynamics};
use super::label::{MoodColor, MoodLabel};
use crate::random::RandomSource;
use crate::types::{CyclePhase, MacroMetrics, MarketMetrics, PhaseTransition};
use serde::Serialize;

pub const STOCK_INITIAL_SENTIMENT: f64 = 50.0;
pub const STOCK_INITIAL_VOLATILITY: f64 = 20.0;

/// Mood state of the stock market.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockMood {
    pub(crate) sentiment_index: f64,
    pub(crate) volatility_index: f64,
    pub(crate) cycle_phase: CyclePhase,
    pub(crate) momentum: f64,
    #[serde(flatten)]
    pub(crate) macro_metrics: MacroMetrics,
    pub(crate) tick_count: u64,
}

impl Default for StockMood {
    fn default() -> Self {
        Self {
            sentiment_index: STOCK_INITIAL_SENTIMENT,
            volatility_index: STOCK_INITIAL_VOLATILITY,
            cycle_phase: CyclePhase::Accumulation,
            momentum: 0.0,
            macro_metrics: MacroMetrics::default(),
            tick_count: 0,
        }
    }
}

impl StockMood {
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

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    pub fn macro_metrics(&self) -> MacroMetrics {
        self.macro_metrics
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

    /// Overwrite sentiment, clamped into `[0, 100]`.
    pub fn set_sentiment(&mut self, value: f64) {
        self.sentiment_index = clamp_sentiment(value);
    }

    /// Overwrite volatility, clamped into `[10, 100]`.
    pub fn set_volatility(&mut self, value: f64) {
        self.volatility_index = clamp_volatility(value);
    }

    pub fn set_phase(&mut self, phase: CyclePhase) {
        self.cycle_phase = phase;
    }

    /// Advance sentiment and volatility by one heartbeat.
    pub fn tick<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let dynamics = stock_dynamics(self.cycle_phase);
        let (sentiment, volatility) =
            dynamics.step(self.sentiment_index, self.volatility_index, rng.next_float());
        self.sentiment_index = sentiment;
        self.volatility_index = volatility;
        self.tick_count = self.tick_count.saturating_add(1);
    }

    /// Store the supplied momentum and evaluate the cycle state machine.
    pub fn update_market_engine(&mut self, metrics: MarketMetrics) -> Option<PhaseTransition> {
        self.momentum = metrics.momentum;
        let from = self.cycle_phase;
        let to = next_stock_phase(from, self.sentiment_index, self.momentum);
        if to == from {
            return None;
        }

        self.cycle_phase = to;
        tracing::info!(
            "Stock cycle {} -> {} (sentiment={:.1}, momentum={:.2})",
            from,
            to,
            self.sentiment_index,
            self.momentum
        );
        Some(PhaseTransition { from, to })
    }

    /// Overwrite the macro backdrop. No validation.
    pub fn set_macro_metrics(&mut self, metrics: MacroMetrics) {
        self.macro_metrics = metrics;
    }

    /// Restore every field to its initial constant.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SeededRandom, SequenceRandom};

    #[test]
    fn test_defaults() {
        let mood = StockMood::new();
        assert_eq!(mood.sentiment_index(), 50.0);
        assert_eq!(mood.volatility_index(), 20.0);
        assert_eq!(mood.cycle_phase(), CyclePhase::Accumulation);
        assert_eq!(mood.macro_metrics(), MacroMetrics::default());
        assert_eq!(mood.tick_count(), 0);
    }

    #[test]
    fn test_tick_accumulation_hit() {
        let mut mood = StockMood::new();
        let mut rng = SequenceRandom::constant(0.1);
        mood.tick(&mut rng);

        assert!((mood.sentiment_index() - 50.5).abs() < 1e-12);
        // 20 + (15 - 20) * 0.1
        assert!((mood.volatility_index() - 19.5).abs() < 1e-12);
        assert_eq!(mood.tick_count(), 1);
    }

    #[test]
    fn test_tick_accumulation_miss() {
        let mut mood = StockMood::new();
        let mut rng = SequenceRandom::constant(0.9);
        mood.tick(&mut rng);
        assert!((mood.sentiment_index() - 49.8).abs() < 1e-12);
    }

    #[test]
    fn test_tick_does_not_touch_macro() {
        let mut mood = StockMood::new();
        let metrics = MacroMetrics {
            interest_rate: 5.25,
            gdp_growth: -1.0,
            inflation: 7.0,
        };
        mood.set_macro_metrics(metrics);

        let mut rng = SeededRandom::new(3);
        for _ in 0..100 {
            mood.tick(&mut rng);
        }
        assert_eq!(mood.macro_metrics(), metrics);
    }

    #[test]
    fn test_bounds_hold_in_every_phase() {
        let mut rng = SeededRandom::new(11);
        for phase in CyclePhase::ALL {
            let mut mood = StockMood::new();
            mood.set_phase(phase);
            mood.set_volatility(100.0);
            for _ in 0..2_000 {
                mood.tick(&mut rng);
                assert!((0.0..=100.0).contains(&mood.sentiment_index()));
                assert!((10.0..=100.0).contains(&mood.volatility_index()));
            }
        }
    }

    #[test]
    fn test_volatility_seeks_target() {
        let mut mood = StockMood::new();
        mood.set_volatility(90.0);
        let mut rng = SeededRandom::new(5);

        let mut gap = (mood.volatility_index() - 15.0).abs();
        for _ in 0..200 {
            mood.tick(&mut rng);
            let next_gap = (mood.volatility_index() - 15.0).abs();
            assert!(next_gap <= gap);
            gap = next_gap;
        }
        assert!(gap < 0.01);
    }

    #[test]
    fn test_update_market_engine_transitions() {
        let mut mood = StockMood::new();
        mood.set_sentiment(60.0);

        let transition = mood.update_market_engine(MarketMetrics { momentum: 5.0 });
        assert_eq!(
            transition,
            Some(PhaseTransition {
                from: CyclePhase::Accumulation,
                to: CyclePhase::Markup
            })
        );
        assert_eq!(mood.cycle_phase(), CyclePhase::Markup);
        assert_eq!(mood.momentum(), 5.0);

        // Guard fails: stays in markup
        assert_eq!(mood.update_market_engine(MarketMetrics { momentum: 5.0 }), None);
        assert_eq!(mood.cycle_phase(), CyclePhase::Markup);
    }

    #[test]
    fn test_set_clamps() {
        let mut mood = StockMood::new();
        mood.set_sentiment(150.0);
        mood.set_volatility(2.0);
        assert_eq!(mood.sentiment_index(), 100.0);
        assert_eq!(mood.volatility_index(), 10.0);
    }

    #[test]
    fn test_reset_idempotent() {
        let mut mood = StockMood::new();
        let mut rng = SeededRandom::new(9);
        for _ in 0..50 {
            mood.tick(&mut rng);
        }
        mood.set_phase(CyclePhase::Markdown);

        mood.reset();
        let once = mood.clone();
        mood.reset();
        assert_eq!(mood, once);
        assert_eq!(mood, StockMood::default());
    }
}
