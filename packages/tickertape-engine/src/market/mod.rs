//! Simulated market: assets, the sector drift table and the price process.

mod asset;
mod catalog;
mod generator;
mod sector;

pub use asset::{floor_price, Asset, HISTORY_LIMIT, PRICE_FLOOR};
pub use catalog::{catalog_assets, catalog_price, CATALOG};
pub use generator::{MarketConditions, PriceGenerator};
pub use sector::{sector_multiplier, sector_multiplier_by_name, Sector, SECTOR_MULTIPLIERS};

use crate::random::RandomSource;
use crate::types::{AssetClass, PriceUpdate};
use chrono::{DateTime, Utc};

/// The tradable universe.
#[derive(Debug, Clone, Default)]
pub struct Market {
    assets: Vec<Asset>,
}

impl Market {
    /// Market with the given assets; later duplicates of a symbol are dropped.
    pub fn new(assets: Vec<Asset>) -> Self {
        let mut market = Self { assets: Vec::with_capacity(assets.len()) };
        for asset in assets {
            if market.get(&asset.symbol).is_none() {
                market.assets.push(asset);
            }
        }
        market
    }

    /// Market seeded from the built-in catalog.
    pub fn from_catalog() -> Self {
        Self::new(catalog_assets())
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Find an asset by symbol.
    pub fn get(&self, symbol: &str) -> Option<&Asset> {
        let symbol_upper = symbol.to_uppercase();
        self.assets.iter().find(|a| a.symbol == symbol_upper)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut Asset> {
        let symbol_upper = symbol.to_uppercase();
        self.assets.iter_mut().find(|a| a.symbol == symbol_upper)
    }

    pub fn of_class(&self, class: AssetClass) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(move |a| a.asset_class == class)
    }

    /// Move every asset one step. Draws one random number per asset, in
    /// market order.
    pub fn tick<R: RandomSource + ?Sized>(
        &mut self,
        generator: &PriceGenerator,
        stock: &MarketConditions,
        crypto: &MarketConditions,
        rng: &mut R,
        timestamp: DateTime<Utc>,
    ) -> Vec<PriceUpdate> {
        let mut updates = Vec::with_capacity(self.assets.len());
        for asset in &mut self.assets {
            let conditions = match asset.asset_class {
                AssetClass::Stock => stock,
                AssetClass::Crypto => crypto,
            };
            let previous = asset.price;
            let next = generator.next_price(asset, conditions, rng.next_float());
            let price = asset.record_price(timestamp, next);
            updates.push(PriceUpdate {
                symbol: asset.symbol.clone(),
                asset_class: asset.asset_class,
                previous,
                price,
                timestamp,
            });
        }
        updates
    }

    /// Mean percent rate of change of stocks over the last `period` samples.
    /// Stocks with too little history are skipped; none eligible yields 0.
    pub fn momentum(&self, period: usize) -> f64 {
        let changes: Vec<f64> = self
            .of_class(AssetClass::Stock)
            .filter_map(|a| a.rate_of_change(period))
            .collect();
        if changes.is_empty() {
            return 0.0;
        }
        changes.iter().sum::<f64>() / changes.len() as f64
    }

    /// Restart the session: catalog symbols return to their catalog price,
    /// others to their session open; all history is cleared.
    pub fn reset(&mut self) {
        for asset in &mut self.assets {
            let price = catalog_price(&asset.symbol).unwrap_or(asset.session_open);
            asset.reset_to(price);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SeededRandom, SequenceRandom};
    use crate::types::CyclePhase;
    use chrono::Duration;

    fn conditions() -> MarketConditions {
        MarketConditions {
            phase: CyclePhase::Accumulation,
            sentiment_index: 50.0,
            volatility_index: 20.0,
        }
    }

    #[test]
    fn test_new_dedupes_symbols() {
        let market = Market::new(vec![
            Asset::crypto("BTX", "Bitex", 1.0, 5.0),
            Asset::crypto("btx", "Other", 2.0, 5.0),
        ]);
        assert_eq!(market.len(), 1);
        assert_eq!(market.get("btx").unwrap().price, 1.0);
    }

    #[test]
    fn test_tick_updates_every_asset() {
        let mut market = Market::from_catalog();
        let mut rng = SeededRandom::new(4);
        let updates = market.tick(
            &PriceGenerator::default(),
            &conditions(),
            &conditions(),
            &mut rng,
            Utc::now(),
        );

        assert_eq!(updates.len(), market.len());
        for (update, asset) in updates.iter().zip(market.assets()) {
            assert_eq!(update.symbol, asset.symbol);
            assert_eq!(update.price, asset.price);
            assert_eq!(asset.history().len(), 1);
        }
    }

    #[test]
    fn test_history_bound_over_many_ticks() {
        let mut market = Market::from_catalog();
        let mut rng = SeededRandom::new(99);
        let start = Utc::now();
        for i in 0..120 {
            market.tick(
                &PriceGenerator::default(),
                &conditions(),
                &conditions(),
                &mut rng,
                start + Duration::seconds(i),
            );
        }

        for asset in market.assets() {
            let history = asset.history();
            assert_eq!(history.len(), HISTORY_LIMIT);
            assert_eq!(history.front().unwrap().timestamp, start + Duration::seconds(70));
            assert_eq!(history.back().unwrap().value, asset.price);
            assert!(asset.price > 0.0);
        }
    }

    #[test]
    fn test_momentum() {
        let mut market = Market::new(vec![
            Asset::stock("NOVA", "Nova", Sector::Healthcare, 100.0, 5.0),
            Asset::crypto("BTX", "Bitex", 100.0, 5.0),
        ]);
        assert_eq!(market.momentum(3), 0.0);

        // Draw 1.0 is clamped just below 1: near-max upward noise every tick.
        let mut rng = SequenceRandom::constant(1.0);
        let start = Utc::now();
        for i in 0..5 {
            market.tick(
                &PriceGenerator::default(),
                &conditions(),
                &conditions(),
                &mut rng,
                start + Duration::seconds(i),
            );
        }
        assert!(market.momentum(3) > 0.0);
    }

    #[test]
    fn test_reset_restores_catalog() {
        let mut market = Market::from_catalog();
        let mut rng = SeededRandom::new(1);
        for _ in 0..10 {
            market.tick(
                &PriceGenerator::default(),
                &conditions(),
                &conditions(),
                &mut rng,
                Utc::now(),
            );
        }
        market.reset();

        let nova = market.get("NOVA").unwrap();
        assert_eq!(nova.price, 184.20);
        assert!(nova.history().is_empty());
    }
}
