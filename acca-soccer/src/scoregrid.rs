use thiserror::Error;

use acca::factorial::{self, Factorial};
use acca::linear::Matrix;
use acca::poisson;
use acca::probs::SliceExt;

use crate::domain::{DoubleChance, Market, Side, Threshold};

#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot model goal rates home={home}, away={away}")]
pub struct InvalidRate {
    pub home: f64,
    pub away: f64,
}

#[inline]
fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

pub fn validate_rates(home_rate: f64, away_rate: f64) -> Result<(), InvalidRate> {
    if is_valid_rate(home_rate) && is_valid_rate(away_rate) {
        Ok(())
    } else {
        Err(InvalidRate {
            home: home_rate,
            away: away_rate,
        })
    }
}

pub fn from_univariate_poisson(
    home_rate: f64,
    away_rate: f64,
    max_goals: u8,
) -> Result<Matrix<f64>, InvalidRate> {
    validate_rates(home_rate, away_rate)?;
    let factorial = factorial::Lookup;
    // rows are home goals, columns away goals; the truncated tail is not renormalised
    let dim = max_goals as usize + 1;
    let home_probs = marginal(home_rate, max_goals, &factorial);
    let away_probs = marginal(away_rate, max_goals, &factorial);
    let mut scoregrid = Matrix::allocate(dim, dim);
    for (home_goals, &home_prob) in home_probs.iter().enumerate() {
        for (away_goals, &away_prob) in away_probs.iter().enumerate() {
            scoregrid[(home_goals, away_goals)] = home_prob * away_prob;
        }
    }
    Ok(scoregrid)
}

fn marginal(rate: f64, max_goals: u8, factorial: &impl Factorial) -> Vec<f64> {
    (0..=max_goals)
        .map(|goals| poisson::univariate(goals, rate, factorial))
        .collect()
}

pub fn is_well_formed(scoregrid: &Matrix<f64>) -> bool {
    !scoregrid.is_empty() && scoregrid.flatten().all_finite()
}

pub fn total(scoregrid: &Matrix<f64>) -> f64 {
    scoregrid.flatten().sum()
}

pub fn home_away_expectations(scoregrid: &Matrix<f64>) -> (f64, f64) {
    let (mut home_expectation, mut away_expectation) = (0.0, 0.0);
    for ((home_goals, away_goals), &prob) in scoregrid.cells() {
        home_expectation += home_goals as f64 * prob;
        away_expectation += away_goals as f64 * prob;
    }
    (home_expectation, away_expectation)
}

pub fn gather_where(scoregrid: &Matrix<f64>, mut predicate: impl FnMut(usize, usize) -> bool) -> f64 {
    scoregrid
        .cells()
        .filter(|&((home_goals, away_goals), _)| predicate(home_goals, away_goals))
        .map(|(_, &prob)| prob)
        .sum()
}

impl Market {
    pub fn gather(&self, scoregrid: &Matrix<f64>) -> Option<f64> {
        match self {
            Market::Goals(threshold) => Some(Self::gather_goals(threshold, scoregrid)),
            Market::BothTeamsToScore => Some(Self::gather_btts(None, scoregrid)),
            Market::BttsAndOver(line) => Some(Self::gather_btts(Some(*line), scoregrid)),
            Market::Win(side) => Some(Self::gather_win(side, scoregrid)),
            Market::Draw => Some(Self::gather_draw(scoregrid)),
            Market::DoubleChance(chance) => Some(Self::gather_double_chance(chance, scoregrid)),
            Market::Corners(_) | Market::Cards(_) | Market::Fouls(_) | Market::ShotsOnTarget(_) => {
                None
            }
        }
    }

    fn gather_goals(threshold: &Threshold, scoregrid: &Matrix<f64>) -> f64 {
        gather_where(scoregrid, |home_goals, away_goals| {
            threshold.admits((home_goals + away_goals) as u16)
        })
    }

    fn gather_btts(over: Option<u8>, scoregrid: &Matrix<f64>) -> f64 {
        gather_where(scoregrid, |home_goals, away_goals| {
            home_goals >= 1
                && away_goals >= 1
                && over.map_or(true, |line| home_goals + away_goals > line as usize)
        })
    }

    fn gather_win(side: &Side, scoregrid: &Matrix<f64>) -> f64 {
        match side {
            Side::Home => gather_where(scoregrid, |home_goals, away_goals| home_goals > away_goals),
            Side::Away => gather_where(scoregrid, |home_goals, away_goals| home_goals < away_goals),
        }
    }

    fn gather_draw(scoregrid: &Matrix<f64>) -> f64 {
        gather_where(scoregrid, |home_goals, away_goals| home_goals == away_goals)
    }

    fn gather_double_chance(chance: &DoubleChance, scoregrid: &Matrix<f64>) -> f64 {
        match chance {
            DoubleChance::HomeOrDraw => {
                Self::gather_win(&Side::Home, scoregrid) + Self::gather_draw(scoregrid)
            }
            DoubleChance::AwayOrDraw => {
                Self::gather_win(&Side::Away, scoregrid) + Self::gather_draw(scoregrid)
            }
            DoubleChance::HomeOrAway => {
                Self::gather_win(&Side::Home, scoregrid) + Self::gather_win(&Side::Away, scoregrid)
            }
        }
    }
}

#[cfg(test)]
mod tests;
