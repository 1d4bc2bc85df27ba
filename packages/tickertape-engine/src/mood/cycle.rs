//! Phase dynamics and the market-cycle state machine.
//!
//! Each phase carries a sentiment drift (one weighted coin flip per tick) and
//! a volatility target the index is pulled toward. Phase transitions are
//! evaluated separately, on a slower cadence than ticks.

use crate::types::CyclePhase;

pub const SENTIMENT_MIN: f64 = 0.0;
pub const SENTIMENT_MAX: f64 = 100.0;
pub const VOLATILITY_MIN: f64 = 10.0;
pub const VOLATILITY_MAX: f64 = 100.0;

/// Per-phase drift parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseDynamics {
    /// Probability that the draw lands on `drift_on_hit`
    pub hit_probability: f64,
    /// Sentiment drift when `draw < hit_probability`
    pub drift_on_hit: f64,
    /// Sentiment drift otherwise
    pub drift_on_miss: f64,
    /// Volatility index the phase pulls toward
    pub volatility_target: f64,
    /// Fraction of the gap to the target closed per tick
    pub volatility_rate: f64,
}

impl PhaseDynamics {
    /// Sentiment drift for a uniform draw in `[0, 1)`.
    pub fn sentiment_drift(&self, draw: f64) -> f64 {
        if draw < self.hit_probability {
            self.drift_on_hit
        } else {
            self.drift_on_miss
        }
    }

    /// Volatility drift pulling `current` toward the phase target.
    pub fn volatility_drift(&self, current: f64) -> f64 {
        (self.volatility_target - current) * self.volatility_rate
    }

    /// Advance `(sentiment, volatility)` by one tick and clamp into bounds.
    pub fn step(&self, sentiment: f64, volatility: f64, draw: f64) -> (f64, f64) {
        let sentiment = clamp_sentiment(sentiment + self.sentiment_drift(draw));
        let volatility = clamp_volatility(volatility + self.volatility_drift(volatility));
        (sentiment, volatility)
    }
}

/// Stock market drift per phase.
pub fn stock_dynamics(phase: CyclePhase) -> PhaseDynamics {
    match phase {
        CyclePhase::Accumulation => PhaseDynamics {
            hit_probability: 0.4,
            drift_on_hit: 0.5,
            drift_on_miss: -0.2,
            volatility_target: 15.0,
            volatility_rate: 0.1,
        },
        CyclePhase::Markup => PhaseDynamics {
            hit_probability: 0.6,
            drift_on_hit: 0.8,
            drift_on_miss: -0.3,
            volatility_target: 25.0,
            volatility_rate: 0.1,
        },
        CyclePhase::Distribution => PhaseDynamics {
            hit_probability: 0.5,
            drift_on_hit: 0.5,
            drift_on_miss: -0.5,
            volatility_target: 40.0,
            volatility_rate: 0.2,
        },
        CyclePhase::Markdown => PhaseDynamics {
            hit_probability: 0.7,
            drift_on_hit: -0.8,
            drift_on_miss: 0.2,
            volatility_target: 60.0,
            volatility_rate: 0.1,
        },
    }
}

/// Crypto drift per phase: sentiment swings doubled, higher volatility targets.
pub fn crypto_dynamics(phase: CyclePhase) -> PhaseDynamics {
    let stock = stock_dynamics(phase);
    let volatility_target = match phase {
        CyclePhase::Accumulation => 30.0,
        CyclePhase::Markup => 60.0,
        CyclePhase::Distribution => 80.0,
        CyclePhase::Markdown => 90.0,
    };

    PhaseDynamics {
        drift_on_hit: stock.drift_on_hit * 2.0,
        drift_on_miss: stock.drift_on_miss * 2.0,
        volatility_target,
        ..stock
    }
}

/// Next stock phase given sentiment and momentum. Guards are strict.
pub fn next_stock_phase(phase: CyclePhase, sentiment: f64, momentum: f64) -> CyclePhase {
    match phase {
        CyclePhase::Accumulation if sentiment > 55.0 && momentum > 0.0 => CyclePhase::Markup,
        CyclePhase::Markup if sentiment > 80.0 && momentum < 0.0 => CyclePhase::Distribution,
        CyclePhase::Distribution if sentiment < 45.0 && momentum < -10.0 => CyclePhase::Markdown,
        CyclePhase::Markdown if sentiment < 20.0 && momentum > -5.0 => CyclePhase::Accumulation,
        _ => phase,
    }
}

/// Next crypto phase. Crypto transitions on sentiment alone.
pub fn next_crypto_phase(phase: CyclePhase, sentiment: f64) -> CyclePhase {
    match phase {
        CyclePhase::Accumulation if sentiment > 60.0 => CyclePhase::Markup,
        CyclePhase::Markup if sentiment > 90.0 => CyclePhase::Distribution,
        CyclePhase::Distribution if sentiment < 40.0 => CyclePhase::Markdown,
        CyclePhase::Markdown if sentiment < 15.0 => CyclePhase::Accumulation,
        _ => phase,
    }
}

/// Clamp into `[0, 100]`; NaN maps to neutral.
pub fn clamp_sentiment(value: f64) -> f64 {
    if value.is_nan() {
        return 50.0;
    }
    value.clamp(SENTIMENT_MIN, SENTIMENT_MAX)
}

/// Clamp into `[10, 100]`; NaN maps to the floor.
pub fn clamp_volatility(value: f64) -> f64 {
    if value.is_nan() {
        return VOLATILITY_MIN;
    }
    value.clamp(VOLATILITY_MIN, VOLATILITY_MAX)
}
