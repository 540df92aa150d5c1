//! End-to-end pass from rated fixtures to ranked accumulator sets.

use std::error::Error;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use acca::file::{FileError, ReadJsonFile};

use crate::bet::{self, Candidates};
use crate::domain::Fixture;
use crate::markets::{self, Calculator};
use crate::sets::{self, Selection};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationError(#[from] pub Box<dyn Error + Send + Sync>);

impl From<anyhow::Error> for ValidationError {
    fn from(value: anyhow::Error) -> Self {
        ValidationError(value.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub markets: markets::Config,
    pub bets: bet::Config,
    pub sets: sets::Config,
}
impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.markets.validate()?;
        self.bets.validate()?;
        self.sets.validate()
    }

    /// Reads a JSON configuration; absent fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// One-line summary of the thresholds that decide whether any set survives.
    pub fn thresholds(&self) -> String {
        format!(
            "bet probability {:.2}..={:.2}, set probability >= {:.2}, {} legs, max {} sets",
            self.bets.min_prob,
            self.bets.max_prob,
            self.sets.min_prob,
            self.sets.legs,
            self.sets.max_sets
        )
    }
}

#[derive(Debug)]
pub struct Report {
    pub candidates: Candidates,
    pub selection: Selection,
}

#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    calculator: Calculator,
}
impl Pipeline {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn run(&self, fixtures: &[Fixture]) -> Report {
        let candidates = bet::collect(fixtures, &self.calculator, &self.config.bets);
        info!(
            "{} candidate bets from {} of {} fixtures",
            candidates.bets.len(),
            candidates.modelled,
            fixtures.len()
        );
        for (family, count) in candidates.by_family() {
            debug!("  {family}: {count}");
        }

        let selection = sets::generate(&candidates.bets, &self.config.sets);
        if selection.capped {
            debug!(
                "enumeration capped after {} combinations ({} kept)",
                selection.examined, selection.kept
            );
        }
        info!(
            "{} sets from {} kept of {} examined combinations",
            selection.sets.len(),
            selection.kept,
            selection.examined
        );
        Report {
            candidates,
            selection,
        }
    }
}

impl TryFrom<Config> for Pipeline {
    type Error = ValidationError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        let calculator = Calculator::try_from(config.markets.clone())?;
        Ok(Self { config, calculator })
    }
}
