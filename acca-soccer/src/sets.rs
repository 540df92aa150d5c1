//! Accumulator sets: fixed-size combinations of bets from distinct fixtures.

use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::str::FromStr;

use anyhow::anyhow;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use acca::comb::{self, Combinator};
use acca::market;
use acca::probs::UNIT_RANGE;

use crate::bet::Bet;
use crate::domain::FixtureId;
use crate::pipeline::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub legs: usize,
    pub min_prob: f64,
    pub max_sets: usize,
    /// Enumeration stops once `cap_multiplier × max_sets` sets have been kept.
    pub cap_multiplier: usize,
    /// Enumeration stops after this many combinations, whether or not any were kept.
    pub max_examined: u64,
}
impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        const LEGS: std::ops::RangeInclusive<usize> = 2..=8;
        if !LEGS.contains(&self.legs) {
            return Err(anyhow!("legs ({}) must lie in {LEGS:?}", self.legs).into());
        }
        if !UNIT_RANGE.contains(&self.min_prob) {
            return Err(anyhow!(
                "minimum set probability ({}) must lie within {UNIT_RANGE:?}",
                self.min_prob
            )
            .into());
        }
        if self.max_sets == 0 {
            return Err(anyhow!("max sets must be positive").into());
        }
        if self.cap_multiplier == 0 {
            return Err(anyhow!("cap multiplier must be positive").into());
        }
        if self.max_examined == 0 {
            return Err(anyhow!("max examined must be positive").into());
        }
        Ok(())
    }

    /// Number of kept sets at which enumeration stops.
    pub fn kept_cap(&self) -> usize {
        self.max_sets.saturating_mul(self.cap_multiplier)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            legs: 3,
            min_prob: 0.40,
            max_sets: 200,
            cap_multiplier: 10,
            max_examined: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetSet {
    /// Content-derived identifier, stable across runs and leg order.
    pub id: u64,
    pub legs: Vec<Bet>,
    pub prob: f64,
    pub odds: f64,
}
impl BetSet {
    fn new(legs: Vec<Bet>) -> Self {
        let prob = legs.iter().map(|leg| leg.prob).product();
        let odds = market::combined_price(legs.iter().map(|leg| leg.odds));
        Self {
            id: set_id(&legs),
            legs,
            prob,
            odds,
        }
    }

    pub fn leagues(&self) -> impl Iterator<Item = &str> {
        self.legs.iter().map(|leg| leg.league.as_str())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Ranked by descending combined probability; ties keep enumeration order.
    pub sets: Vec<BetSet>,
    pub examined: u64,
    pub kept: usize,
    /// Whether enumeration was cut short by either cap.
    pub capped: bool,
}

/// Hash of the legs' sorted `(fixture_id, market)` keys. `FxHasher` is unseeded, so ids are
/// stable across runs.
pub fn set_id(legs: &[Bet]) -> u64 {
    let mut keys = legs
        .iter()
        .map(|leg| (leg.fixture_id, leg.market))
        .collect::<Vec<_>>();
    keys.sort();
    let mut hasher = FxHasher::default();
    keys.hash(&mut hasher);
    hasher.finish()
}

/// A combination is admissible if its legs come from distinct fixtures and no two legs share a
/// `(fixture, market)` pair.
fn is_admissible(legs: &[&Bet]) -> bool {
    let fixture_ids = legs.iter().map(|leg| leg.fixture_id).collect::<Vec<FixtureId>>();
    let keys = legs
        .iter()
        .map(|leg| (leg.fixture_id, leg.market))
        .collect::<Vec<_>>();
    comb::is_unique_quadratic(&fixture_ids) && comb::is_unique_quadratic(&keys)
}

/// Enumerates `config.legs`-combinations of `bets` in lexicographic order of their indices, keeping
/// admissible combinations whose combined probability meets the floor, then ranks and truncates
/// them. Too few bets or fixtures yield an empty selection.
pub fn generate(bets: &[Bet], config: &Config) -> Selection {
    let k = config.legs;
    if k == 0 || bets.len() < k {
        debug!("{} bets cannot form a {k}-leg set", bets.len());
        return Selection::default();
    }
    let mut fixture_ids = bets.iter().map(|bet| bet.fixture_id).collect::<Vec<_>>();
    fixture_ids.sort_unstable();
    fixture_ids.dedup();
    if fixture_ids.len() < k {
        debug!(
            "{} distinct fixtures cannot form a {k}-leg set",
            fixture_ids.len()
        );
        return Selection::default();
    }

    let kept_cap = config.kept_cap();
    let mut selection = Selection::default();
    let mut kept = Vec::new();
    let mut legs = Vec::with_capacity(k);
    let mut combinator = Combinator::new(bets.len(), k);
    while let Some(ordinals) = combinator.advance() {
        if selection.examined == config.max_examined {
            debug!("stopped after examining {} combinations", selection.examined);
            selection.capped = true;
            break;
        }
        selection.examined += 1;

        legs.clear();
        legs.extend(ordinals.iter().map(|&ordinal| &bets[ordinal]));
        if !is_admissible(&legs) {
            continue;
        }
        let prob = legs.iter().map(|leg| leg.prob).product::<f64>();
        if prob < config.min_prob {
            continue;
        }

        kept.push(BetSet::new(legs.iter().map(|&leg| leg.clone()).collect()));
        if kept.len() == kept_cap {
            debug!(
                "stopped after keeping {kept_cap} sets from {} combinations",
                selection.examined
            );
            selection.capped = true;
            break;
        }
    }

    selection.kept = kept.len();
    kept.sort_by(|a, b| b.prob.total_cmp(&a.prob));
    kept.truncate(config.max_sets);
    selection.sets = kept;
    selection
}

/// A half-open range of combined probabilities, written `min..max`.
#[derive(Debug, Clone, PartialEq)]
pub struct Band(pub Range<f64>);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid probability band '{0}', expected <min>..<max> within [0, 1]")]
pub struct BandParseError(String);

impl FromStr for Band {
    type Err = BandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || BandParseError(s.into());
        let (min, max) = s.split_once("..").ok_or_else(err)?;
        let min = min.trim().parse::<f64>().map_err(|_| err())?;
        let max = max.trim().parse::<f64>().map_err(|_| err())?;
        if !UNIT_RANGE.contains(&min) || !UNIT_RANGE.contains(&max) || min >= max {
            return Err(err());
        }
        Ok(Self(min..max))
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.0.start, self.0.end)
    }
}

/// Summary of the band and league filters in force, or `None` if neither is.
pub fn describe_filters(bands: &[Band], leagues: &[String]) -> Option<String> {
    let mut filters = vec![];
    if !bands.is_empty() {
        let bands = bands.iter().map(Band::to_string).collect::<Vec<_>>();
        filters.push(format!("bands {}", bands.join(", ")));
    }
    if !leagues.is_empty() {
        filters.push(format!("leagues {}", leagues.join(", ")));
    }
    if filters.is_empty() {
        None
    } else {
        Some(filters.join("; "))
    }
}

/// Sets whose combined probability lies within any of `bands`. No bands admits every set.
pub fn within(sets: Vec<BetSet>, bands: &[Band]) -> Vec<BetSet> {
    if bands.is_empty() {
        return sets;
    }
    sets.into_iter()
        .filter(|set| bands.iter().any(|band| band.0.contains(&set.prob)))
        .collect()
}

/// Sets whose every leg belongs to one of `leagues`. No leagues admits every set.
pub fn in_leagues(sets: Vec<BetSet>, leagues: &[String]) -> Vec<BetSet> {
    if leagues.is_empty() {
        return sets;
    }
    sets.into_iter()
        .filter(|set| {
            set.leagues()
                .all(|league| leagues.iter().any(|wanted| wanted.eq_ignore_ascii_case(league)))
        })
        .collect()
}
