//! Market probabilities for a single fixture.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::{debug, enabled, Level};

use acca::factorial;
use acca::linear::Matrix;
use acca::probs;

use crate::domain::{DoubleChance, Fixture, Market, Side, Threshold};
use crate::pipeline::ValidationError;
use crate::heuristic;
use crate::scoregrid::{self, InvalidRate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketProbability {
    pub market: Market,
    /// Always within `[0, 1]`.
    pub prob: f64,
}
impl MarketProbability {
    pub fn clamped(market: Market, raw_prob: f64) -> Self {
        Self {
            market,
            prob: probs::clamp(raw_prob),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Goals per side retained in the scoreline grid.
    pub max_goals: u8,
    pub goal_thresholds: Vec<Threshold>,
    /// Lines for the combined "BTTS & Over n.5" market.
    pub btts_over_lines: Vec<u8>,
    pub results: bool,
    pub double_chances: Vec<DoubleChance>,
    pub heuristics: heuristic::Config,
}
impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        const MIN_MAX_GOALS: u8 = 1;
        let max_max_goals = factorial::MAX_N;
        if !(MIN_MAX_GOALS..=max_max_goals).contains(&self.max_goals) {
            return Err(anyhow!(
                "max goals ({}) must lie in {MIN_MAX_GOALS}..={max_max_goals}",
                self.max_goals
            )
            .into());
        }
        self.heuristics.validate()
    }

    /// Markets gathered from the scoreline grid, in presentation order.
    pub fn grid_markets(&self) -> Vec<Market> {
        let mut markets = self
            .goal_thresholds
            .iter()
            .map(|&threshold| Market::Goals(threshold))
            .collect::<Vec<_>>();
        markets.push(Market::BothTeamsToScore);
        markets.extend(self.btts_over_lines.iter().map(|&line| Market::BttsAndOver(line)));
        if self.results {
            markets.extend([Market::Win(Side::Home), Market::Win(Side::Away), Market::Draw]);
        }
        markets.extend(self.double_chances.iter().map(|&chance| Market::DoubleChance(chance)));
        markets
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_goals: 6,
            goal_thresholds: vec![
                Threshold::Over(0),
                Threshold::Over(1),
                Threshold::Over(2),
                Threshold::Under(2),
                Threshold::Under(3),
            ],
            btts_over_lines: vec![2],
            results: true,
            double_chances: vec![DoubleChance::HomeOrDraw, DoubleChance::AwayOrDraw],
            heuristics: heuristic::Config::default(),
        }
    }
}

#[derive(Debug)]
pub struct Calculator {
    config: Config,
    grid_markets: Vec<Market>,
}
impl Calculator {
    /// All configured market probabilities for a pair of expected-goal rates. Grid markets come
    /// first, followed by heuristic markets.
    pub fn calculate(&self, home_xg: f64, away_xg: f64) -> Result<Vec<MarketProbability>, InvalidRate> {
        let scoregrid = scoregrid::from_univariate_poisson(home_xg, away_xg, self.config.max_goals)?;
        if enabled!(Level::DEBUG) {
            let (home_goals, away_goals) = scoregrid::home_away_expectations(&scoregrid);
            debug!(
                "scoregrid for {home_xg:.2} : {away_xg:.2} holds {:.4} of the mass, expecting {home_goals:.2} : {away_goals:.2}",
                scoregrid::total(&scoregrid)
            );
        }
        let mut markets = self.from_scoregrid(&scoregrid);
        if scoregrid::is_well_formed(&scoregrid) {
            markets.extend(
                self.config
                    .heuristics
                    .evaluate(home_xg, away_xg)
                    .into_iter()
                    .map(|(market, prob)| MarketProbability::clamped(market, prob)),
            );
        }
        Ok(markets)
    }

    pub fn calculate_fixture(&self, fixture: &Fixture) -> Result<Vec<MarketProbability>, InvalidRate> {
        self.calculate(fixture.home_xg, fixture.away_xg)
    }

    /// Grid markets only. An empty or malformed grid yields no markets.
    pub fn from_scoregrid(&self, scoregrid: &Matrix<f64>) -> Vec<MarketProbability> {
        if !scoregrid::is_well_formed(scoregrid) {
            debug!(
                "skipping malformed {}x{} scoregrid",
                scoregrid.rows(),
                scoregrid.cols()
            );
            return vec![];
        }
        self.grid_markets
            .iter()
            .filter_map(|market| {
                market
                    .gather(scoregrid)
                    .map(|prob| MarketProbability::clamped(*market, prob))
            })
            .collect()
    }
}

impl TryFrom<Config> for Calculator {
    type Error = ValidationError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        let grid_markets = config.grid_markets();
        Ok(Self {
            config,
            grid_markets,
        })
    }
}
