//! Market mood engine.
//!
//! Owns the sentiment/volatility state of both asset classes and advances it
//! once per heartbeat. Cycle phases move only through
//! [`MoodEngine::update_market_engine`] and [`MoodEngine::update_crypto_engine`].

mod crypto;
pub mod cycle;
mod label;
mod stock;

pub use crypto::{
    CryptoMood, CRYPTO_INITIAL_DOMINANCE, CRYPTO_INITIAL_HYPE, CRYPTO_INITIAL_SENTIMENT,
    CRYPTO_INITIAL_VOLATILITY,
};
pub use cycle::{crypto_dynamics, next_crypto_phase, next_stock_phase, stock_dynamics, PhaseDynamics};
pub use label::{MoodColor, MoodLabel};
pub use stock::{StockMood, STOCK_INITIAL_SENTIMENT, STOCK_INITIAL_VOLATILITY};

use crate::market::{sector_multiplier, Sector};
use crate::random::RandomSource;
use crate::types::{AssetClass, CryptoMetrics, MacroMetrics, MarketMetrics, PhaseTransition};

/// Mood state for both markets plus the random source driving their drift.
#[derive(Debug, Clone)]
pub struct MoodEngine<R> {
    stock: StockMood,
    crypto: CryptoMood,
    rng: R,
}

impl<R: RandomSource> MoodEngine<R> {
    /// Engine at its initial constants.
    pub fn new(rng: R) -> Self {
        Self {
            stock: StockMood::default(),
            crypto: CryptoMood::default(),
            rng,
        }
    }

    /// Engine restored from already-normalized state.
    pub fn with_state(stock: StockMood, crypto: CryptoMood, rng: R) -> Self {
        Self { stock, crypto, rng }
    }

    pub fn stock(&self) -> &StockMood {
        &self.stock
    }

    pub fn crypto(&self) -> &CryptoMood {
        &self.crypto
    }

    pub fn stock_mut(&mut self) -> &mut StockMood {
        &mut self.stock
    }

    pub fn crypto_mut(&mut self) -> &mut CryptoMood {
        &mut self.crypto
    }

    /// The random source, shared with the price generator.
    pub fn random_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Advance both markets by one heartbeat.
    pub fn tick(&mut self) {
        self.stock.tick(&mut self.rng);
        self.crypto.tick(&mut self.rng);
        tracing::trace!(
            "Mood tick {}: stock fgi={:.2} vol={:.2}, crypto fgi={:.2} vol={:.2}",
            self.stock.tick_count(),
            self.stock.sentiment_index(),
            self.stock.volatility_index(),
            self.crypto.sentiment_index(),
            self.crypto.volatility_index()
        );
    }

    pub fn update_market_engine(&mut self, metrics: MarketMetrics) -> Option<PhaseTransition> {
        self.stock.update_market_engine(metrics)
    }

    pub fn update_crypto_engine(&mut self, metrics: CryptoMetrics) -> Option<PhaseTransition> {
        self.crypto.update_crypto_engine(metrics)
    }

    pub fn set_macro_metrics(&mut self, metrics: MacroMetrics) {
        self.stock.set_macro_metrics(metrics);
    }

    pub fn mood_label(&self, class: AssetClass) -> MoodLabel {
        match class {
            AssetClass::Stock => self.stock.mood_label(),
            AssetClass::Crypto => self.crypto.mood_label(),
        }
    }

    pub fn mood_color(&self, class: AssetClass) -> MoodColor {
        self.mood_label(class).color()
    }

    /// Sector drift bonus under the current stock phase.
    pub fn sector_multiplier(&self, sector: Sector) -> f64 {
        sector_multiplier(self.stock.cycle_phase(), sector)
    }

    /// Restore both markets to their initial constants.
    pub fn reset(&mut self) {
        self.stock.reset();
        self.crypto.reset();
        tracing::info!("Mood engine reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use crate::types::CyclePhase;

    #[test]
    fn test_tick_advances_both() {
        let mut engine = MoodEngine::new(SeededRandom::new(1));
        engine.tick();
        engine.tick();
        assert_eq!(engine.stock().tick_count(), 2);
        assert_eq!(engine.crypto().tick_count(), 2);
    }

    #[test]
    fn test_bounds_over_long_run() {
        let mut engine = MoodEngine::new(SeededRandom::new(2024));
        for i in 0..5_000 {
            engine.tick();
            if i % 25 == 0 {
                let momentum = if (i / 25) % 2 == 0 { 20.0 } else { -20.0 };
                engine.update_market_engine(MarketMetrics { momentum });
                engine.update_crypto_engine(CryptoMetrics {
                    hype: 50.0,
                    dominance: 50.0,
                });
            }
            for (sentiment, volatility) in [
                (engine.stock().sentiment_index(), engine.stock().volatility_index()),
                (engine.crypto().sentiment_index(), engine.crypto().volatility_index()),
            ] {
                assert!((0.0..=100.0).contains(&sentiment));
                assert!((10.0..=100.0).contains(&volatility));
            }
        }
    }

    #[test]
    fn test_labels_per_class() {
        let mut engine = MoodEngine::new(SeededRandom::new(1));
        engine.stock_mut().set_sentiment(10.0);
        engine.crypto_mut().set_sentiment(90.0);

        assert_eq!(engine.mood_label(AssetClass::Stock), MoodLabel::ExtremeFear);
        assert_eq!(engine.mood_label(AssetClass::Crypto), MoodLabel::ExtremeGreed);
        assert_eq!(engine.mood_color(AssetClass::Crypto), MoodColor::Green);
    }

    #[test]
    fn test_sector_multiplier_follows_phase() {
        let mut engine = MoodEngine::new(SeededRandom::new(1));
        assert_eq!(engine.sector_multiplier(Sector::Tech), 0.02);

        engine.stock_mut().set_phase(CyclePhase::Markdown);
        assert_eq!(engine.sector_multiplier(Sector::Finance), -0.03);
    }

    #[test]
    fn test_reset_twice_matches_once() {
        let mut engine = MoodEngine::new(SeededRandom::new(8));
        for _ in 0..30 {
            engine.tick();
        }
        engine.set_macro_metrics(MacroMetrics {
            interest_rate: 6.0,
            gdp_growth: 0.5,
            inflation: 4.0,
        });

        engine.reset();
        let (stock, crypto) = (engine.stock().clone(), engine.crypto().clone());
        engine.reset();

        assert_eq!(engine.stock(), &stock);
        assert_eq!(engine.crypto(), &crypto);
        assert_eq!(engine.stock().macro_metrics().interest_rate, 2.5);
        assert_eq!(engine.crypto().dominance(), 52.4);
    }
}
