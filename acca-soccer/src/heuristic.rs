//! Heuristic markets: corners, cards, fouls and shots on target.
//!
//! These are approximations, not validated probabilities. Each family's event count is modelled as
//! Poisson with a rate that is a fixed function of the two expected-goal rates; the coefficients
//! have no empirical basis beyond being plausible, and are exposed as configuration for that
//! reason.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use acca::poisson;

use crate::domain::{Market, MarketFamily, Threshold};
use crate::pipeline::ValidationError;

/// The quantity derived from the expected-goal rates that drives a linear rate model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Driver {
    /// `home_xg + away_xg`
    TotalXg,
    /// `|home_xg − away_xg|`
    XgDifference,
}
impl Driver {
    fn resolve(&self, home_xg: f64, away_xg: f64) -> f64 {
        match self {
            Driver::TotalXg => home_xg + away_xg,
            Driver::XgDifference => f64::abs(home_xg - away_xg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RateModel {
    /// `base + slope × (driver − reference)`
    Linear {
        base: f64,
        slope: f64,
        reference: f64,
        driver: Driver,
    },
    /// `max(floor, per_goal × home_xg) + max(floor, per_goal × away_xg)`
    PerSide { per_goal: f64, floor: f64 },
}
impl RateModel {
    pub fn estimate(&self, home_xg: f64, away_xg: f64) -> f64 {
        match self {
            RateModel::Linear {
                base,
                slope,
                reference,
                driver,
            } => base + slope * (driver.resolve(home_xg, away_xg) - reference),
            RateModel::PerSide { per_goal, floor } => {
                f64::max(*floor, per_goal * home_xg) + f64::max(*floor, per_goal * away_xg)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicModel {
    pub rate: RateModel,
    pub thresholds: Vec<Threshold>,
}
impl HeuristicModel {
    /// Probabilities of each configured threshold, or nothing if the estimated rate cannot
    /// parameterise a Poisson distribution.
    pub fn evaluate(&self, home_xg: f64, away_xg: f64) -> Vec<(Threshold, f64)> {
        let rate = self.rate.estimate(home_xg, away_xg);
        if !rate.is_finite() || rate <= 0.0 {
            return vec![];
        }
        self.thresholds
            .iter()
            .map(|threshold| {
                let prob = match threshold {
                    Threshold::Over(line) => poisson::survival(*line as u16, rate),
                    Threshold::Under(line) => poisson::cdf(*line as u16, rate),
                };
                (*threshold, prob)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub enabled: bool,
    pub corners: HeuristicModel,
    pub shots_on_target: HeuristicModel,
    pub fouls: HeuristicModel,
    pub cards: HeuristicModel,
}
impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (family, _, model) in self.models() {
            if model.thresholds.is_empty() {
                return Err(anyhow!("no thresholds configured for {family}").into());
            }
            if let RateModel::PerSide { per_goal, floor } = model.rate {
                if per_goal < 0.0 || floor < 0.0 {
                    return Err(anyhow!("{family} rate coefficients cannot be negative").into());
                }
            }
        }
        Ok(())
    }

    /// Each family with the constructor of its markets and its model, in evaluation order.
    pub fn models(&self) -> [(MarketFamily, fn(Threshold) -> Market, &HeuristicModel); 4] {
        [
            (MarketFamily::Corners, Market::Corners, &self.corners),
            (MarketFamily::ShotsOnTarget, Market::ShotsOnTarget, &self.shots_on_target),
            (MarketFamily::Fouls, Market::Fouls, &self.fouls),
            (MarketFamily::Cards, Market::Cards, &self.cards),
        ]
    }

    /// Raw probabilities of every heuristic market for the given rates, in a fixed order.
    pub fn evaluate(&self, home_xg: f64, away_xg: f64) -> Vec<(Market, f64)> {
        if !self.enabled {
            return vec![];
        }
        self.models()
            .into_iter()
            .flat_map(|(_, market, model)| {
                model
                    .evaluate(home_xg, away_xg)
                    .into_iter()
                    .map(move |(threshold, prob)| (market(threshold), prob))
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            corners: HeuristicModel {
                rate: RateModel::Linear {
                    base: 10.0,
                    slope: 1.5,
                    reference: 2.5,
                    driver: Driver::TotalXg,
                },
                thresholds: vec![Threshold::Over(9), Threshold::Over(10), Threshold::Under(11)],
            },
            shots_on_target: HeuristicModel {
                rate: RateModel::PerSide {
                    per_goal: 3.0,
                    floor: 3.0,
                },
                thresholds: vec![Threshold::Over(10), Threshold::Over(12)],
            },
            fouls: HeuristicModel {
                rate: RateModel::Linear {
                    base: 22.0,
                    slope: 2.0,
                    reference: 0.0,
                    driver: Driver::XgDifference,
                },
                thresholds: vec![Threshold::Over(24), Threshold::Under(26)],
            },
            cards: HeuristicModel {
                rate: RateModel::Linear {
                    base: 3.5,
                    slope: 0.5,
                    reference: 0.0,
                    driver: Driver::XgDifference,
                },
                thresholds: vec![Threshold::Over(3), Threshold::Under(5)],
            },
        }
    }
}
