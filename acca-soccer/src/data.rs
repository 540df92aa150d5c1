//! Sources of fixtures and expected-goal rates.

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use acca::file::{FileError, ReadJsonFile};
use acca::market;

use crate::domain::{Fixture, FixtureSpec, Side, Team, TeamId};
use crate::feed::FeedError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Supplies the fixtures scheduled within some window. An empty window is not an error.
pub trait FixtureSource {
    fn fixtures(&self) -> Result<Vec<FixtureSpec>, SourceError>;
}

/// Supplies a team's expected-goal rate when playing on a given side. Always answers, falling
/// back to a default rate when the team is unknown.
pub trait ExpectedGoalsSource {
    fn expected_goals(&self, team_id: TeamId, side: Side) -> f64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackRates {
    pub home: f64,
    pub away: f64,
}
impl FallbackRates {
    pub fn for_side(&self, side: Side) -> f64 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }
}

impl Default for FallbackRates {
    fn default() -> Self {
        Self {
            home: 1.4,
            away: 1.2,
        }
    }
}

/// Weighting of a team's mean goals scored by the side it plays on.
pub fn side_multiplier(side: Side) -> f64 {
    match side {
        Side::Home => 1.05,
        Side::Away => 0.95,
    }
}

/// Expected goals from a team's recent goals scored: the mean weighted by side, to two decimal
/// places. Nothing is estimated from an empty record.
pub fn estimate_xg(goals_scored: &[u8], side: Side) -> Option<f64> {
    if goals_scored.is_empty() {
        return None;
    }
    let mean = goals_scored.iter().map(|&goals| goals as f64).sum::<f64>() / goals_scored.len() as f64;
    Some(market::round(mean * side_multiplier(side), 2))
}

/// Recent goals scored per team, as gathered from finished matches.
#[derive(Debug, Default, Clone)]
pub struct FormTable {
    goals: FxHashMap<TeamId, Vec<u8>>,
    fallback: FallbackRates,
}
impl FormTable {
    pub fn with_fallback(fallback: FallbackRates) -> Self {
        Self {
            goals: FxHashMap::default(),
            fallback,
        }
    }

    pub fn insert(&mut self, team_id: TeamId, goals_scored: Vec<u8>) {
        self.goals.insert(team_id, goals_scored);
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}

impl ExpectedGoalsSource for FormTable {
    fn expected_goals(&self, team_id: TeamId, side: Side) -> f64 {
        self.goals
            .get(&team_id)
            .and_then(|goals_scored| estimate_xg(goals_scored, side))
            .unwrap_or_else(|| self.fallback.for_side(side))
    }
}

/// Fixtures and form gathered by a download, served back without further I/O.
#[derive(Debug, Default)]
pub struct Download {
    pub fixtures: Vec<FixtureSpec>,
    pub form: FormTable,
}

impl FixtureSource for Download {
    fn fixtures(&self) -> Result<Vec<FixtureSpec>, SourceError> {
        Ok(self.fixtures.clone())
    }
}

impl ExpectedGoalsSource for Download {
    fn expected_goals(&self, team_id: TeamId, side: Side) -> f64 {
        self.form.expected_goals(team_id, side)
    }
}

/// Rates fixtures from `fixture_source` using `xg_source`, keeping the first of any fixtures that
/// share an id.
pub fn assemble(
    fixture_source: &impl FixtureSource,
    xg_source: &impl ExpectedGoalsSource,
) -> Result<Vec<Fixture>, SourceError> {
    let specs = fixture_source.fixtures()?;
    let mut seen = FxHashSet::with_capacity_and_hasher(specs.len(), Default::default());
    let mut fixtures = Vec::with_capacity(specs.len());
    for spec in specs {
        if !seen.insert(spec.id) {
            debug!("dropping duplicate fixture {} ({})", spec.id, spec.label());
            continue;
        }
        let home_xg = xg_source.expected_goals(spec.home.id, Side::Home);
        let away_xg = xg_source.expected_goals(spec.away.id, Side::Away);
        fixtures.push(spec.with_rates(home_xg, away_xg));
    }
    Ok(fixtures)
}

const MOCK_FIXTURES: [(&str, &str, f64, f64, &str); 12] = [
    ("Arsenal", "Chelsea", 1.8, 1.4, "Premier League"),
    ("Man City", "Liverpool", 2.1, 1.6, "Premier League"),
    ("Barcelona", "Real Madrid", 1.9, 1.7, "La Liga"),
    ("Atletico", "Sevilla", 1.5, 1.2, "La Liga"),
    ("Bayern Munich", "Dortmund", 2.0, 1.5, "Bundesliga"),
    ("RB Leipzig", "Leverkusen", 1.7, 1.4, "Bundesliga"),
    ("Inter", "AC Milan", 1.6, 1.4, "Serie A"),
    ("Juventus", "Napoli", 1.5, 1.6, "Serie A"),
    ("PSG", "Lyon", 1.9, 1.3, "Ligue 1"),
    ("Marseille", "Monaco", 1.5, 1.4, "Ligue 1"),
    ("Porto", "Sporting", 1.6, 1.5, "Primeira Liga"),
    ("Benfica", "Braga", 1.8, 1.3, "Primeira Liga"),
];

/// A fixed slate of twelve fixtures with hard-coded rates, used when no live source is available.
/// Fixture `i` (from zero) has id `i + 1`; its teams have ids `2i + 1` and `2i + 2`.
#[derive(Debug, Clone)]
pub struct MockSource {
    fixtures: Vec<Fixture>,
    fallback: FallbackRates,
}
impl MockSource {
    pub fn rated(&self) -> Vec<Fixture> {
        self.fixtures.clone()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        let fixtures = MOCK_FIXTURES
            .iter()
            .enumerate()
            .map(|(index, &(home, away, home_xg, away_xg, league))| {
                let index = index as u64;
                FixtureSpec {
                    id: index + 1,
                    league: league.into(),
                    home: Team::new(2 * index + 1, home),
                    away: Team::new(2 * index + 2, away),
                }
                .with_rates(home_xg, away_xg)
            })
            .collect();
        Self {
            fixtures,
            fallback: FallbackRates::default(),
        }
    }
}

impl FixtureSource for MockSource {
    fn fixtures(&self) -> Result<Vec<FixtureSpec>, SourceError> {
        Ok(self.fixtures.iter().map(|fixture| fixture.spec.clone()).collect())
    }
}

impl ExpectedGoalsSource for MockSource {
    fn expected_goals(&self, team_id: TeamId, side: Side) -> f64 {
        self.fixtures
            .iter()
            .find(|fixture| fixture.spec.team(side).id == team_id)
            .map(|fixture| match side {
                Side::Home => fixture.home_xg,
                Side::Away => fixture.away_xg,
            })
            .unwrap_or_else(|| self.fallback.for_side(side))
    }
}

/// Fixtures with rates already attached, stored as a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureFile {
    pub fixtures: Vec<Fixture>,
}
impl FixtureFile {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Self::read_json_file(path)?)
    }
}

impl FixtureSource for FixtureFile {
    fn fixtures(&self) -> Result<Vec<FixtureSpec>, SourceError> {
        Ok(self.fixtures.iter().map(|fixture| fixture.spec.clone()).collect())
    }
}
