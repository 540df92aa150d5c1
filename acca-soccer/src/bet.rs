use std::ops::RangeInclusive;

use anyhow::anyhow;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::debug;

use acca::market::Margin;
use acca::probs::UNIT_RANGE;

use crate::domain::{Fixture, FixtureId, Market, MarketFamily};
use crate::markets::{Calculator, MarketProbability};
use crate::pipeline::ValidationError;
use crate::scoregrid::InvalidRate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub fixture_id: FixtureId,
    /// Display label of the fixture, e.g. "Arsenal vs Chelsea".
    pub fixture: String,
    pub league: String,
    pub market: Market,
    pub prob: f64,
    pub odds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Smallest single-leg probability admitted.
    pub min_prob: f64,
    /// Largest single-leg probability admitted; near-certain legs add nothing to a combination.
    pub max_prob: f64,
    pub margin: Margin,
}
impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !UNIT_RANGE.contains(&self.min_prob) || !UNIT_RANGE.contains(&self.max_prob) {
            return Err(anyhow!(
                "bet probability bounds {}..={} must lie within {UNIT_RANGE:?}",
                self.min_prob,
                self.max_prob
            )
            .into());
        }
        if self.min_prob > self.max_prob {
            return Err(anyhow!(
                "minimum bet probability ({}) exceeds maximum ({})",
                self.min_prob,
                self.max_prob
            )
            .into());
        }
        if !(0.0..1.0).contains(&self.margin.value) {
            return Err(anyhow!("margin ({}) must lie in [0, 1)", self.margin.value).into());
        }
        Ok(())
    }

    pub fn admitted(&self) -> RangeInclusive<f64> {
        self.min_prob..=self.max_prob
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_prob: 0.40,
            max_prob: 0.95,
            margin: Margin::default(),
        }
    }
}

/// Bets for one fixture, one per market whose probability is admitted by `config`.
pub fn build(fixture: &Fixture, markets: &[MarketProbability], config: &Config) -> Vec<Bet> {
    let admitted = config.admitted();
    let label = fixture.label();
    markets
        .iter()
        .filter(|market| admitted.contains(&market.prob))
        .map(|market| Bet {
            fixture_id: fixture.id(),
            fixture: label.clone(),
            league: fixture.spec.league.clone(),
            market: market.market,
            prob: market.prob,
            odds: config.margin.price(market.prob),
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct Candidates {
    pub bets: Vec<Bet>,
    /// Fixtures for which markets were computed.
    pub modelled: usize,
    /// Fixtures skipped because their rates could not be modelled.
    pub skipped: Vec<(FixtureId, InvalidRate)>,
}
impl Candidates {
    pub fn by_family(&self) -> Vec<(MarketFamily, usize)> {
        let mut counts = FxHashMap::default();
        for bet in &self.bets {
            *counts.entry(bet.market.family()).or_insert(0) += 1;
        }
        MarketFamily::iter()
            .filter_map(|family| counts.get(&family).map(|&count| (family, count)))
            .collect()
    }

    pub fn distinct_fixtures(&self) -> usize {
        let mut fixture_ids = self.bets.iter().map(|bet| bet.fixture_id).collect::<Vec<_>>();
        fixture_ids.sort_unstable();
        fixture_ids.dedup();
        fixture_ids.len()
    }
}

/// Flattens every fixture's admitted markets into one list, in fixture order. Fixtures with
/// unusable rates are skipped and recorded.
pub fn collect(fixtures: &[Fixture], calculator: &Calculator, config: &Config) -> Candidates {
    let mut candidates = Candidates::default();
    for fixture in fixtures {
        match calculator.calculate_fixture(fixture) {
            Ok(markets) => {
                candidates.modelled += 1;
                let bets = build(fixture, &markets, config);
                debug!(
                    "{}: {} of {} markets admitted",
                    fixture.label(),
                    bets.len(),
                    markets.len()
                );
                candidates.bets.extend(bets);
            }
            Err(err) => {
                debug!("skipping {}: {err}", fixture.label());
                candidates.skipped.push((fixture.id(), err));
            }
        }
    }
    candidates
}
