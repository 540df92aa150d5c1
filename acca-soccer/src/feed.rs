//! Client for the football-data.org v4 API.
//!
//! Responses are parsed record by record into typed models; a record that does not fit the model
//! is logged and dropped rather than passed on partially.

use std::time::Duration;

use chrono::{Days, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::StatusCode;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::data::{Download, FallbackRates, FormTable};
use crate::domain::{FixtureId, FixtureSpec, Score, Team, TeamId};

pub mod retry;

use retry::RetryConfig;

pub const BASE_URL: &str = "https://api.football-data.org/v4";

/// Competitions polled for fixtures, with their football-data.org ids.
pub const COMPETITIONS: [(&str, u64); 9] = [
    ("Premier League", 2021),
    ("La Liga", 2014),
    ("Bundesliga", 2002),
    ("Serie A", 2019),
    ("Ligue 1", 2015),
    ("Primeira Liga", 2017),
    ("Champions League", 2001),
    ("Europa League", 2146),
    ("Conference League", 2149),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Timed,
    InPlay,
    Paused,
    Finished,
    Suspended,
    Postponed,
    Cancelled,
    Awarded,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamModel {
    pub id: TeamId,
    #[serde(default)]
    pub name: Option<String>,
}
impl From<TeamModel> for Team {
    fn from(team: TeamModel) -> Self {
        Team::new(team.id, team.name.unwrap_or_else(|| "Unknown".into()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct GoalsModel {
    pub home: Option<u8>,
    pub away: Option<u8>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreModel {
    #[serde(default)]
    pub full_time: GoalsModel,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchModel {
    pub id: FixtureId,
    pub status: MatchStatus,
    pub home_team: TeamModel,
    pub away_team: TeamModel,
    #[serde(default)]
    pub score: ScoreModel,
}
impl MatchModel {
    pub fn is_upcoming(&self) -> bool {
        matches!(self.status, MatchStatus::Scheduled | MatchStatus::Timed)
    }

    /// The full-time score, once the match has finished.
    pub fn final_score(&self) -> Option<Score> {
        match (self.status, &self.score.full_time) {
            (
                MatchStatus::Finished,
                GoalsModel {
                    home: Some(home),
                    away: Some(away),
                },
            ) => Some(Score::new(*home, *away)),
            _ => None,
        }
    }

    /// Full-time goals scored by `team_id`, if it played in this match and a score is recorded.
    pub fn goals_for(&self, team_id: TeamId) -> Option<u8> {
        if self.home_team.id == team_id {
            self.score.full_time.home
        } else if self.away_team.id == team_id {
            self.score.full_time.away
        } else {
            None
        }
    }

    pub fn into_spec(self, league: &str) -> FixtureSpec {
        FixtureSpec {
            id: self.id,
            league: league.into(),
            home: self.home_team.into(),
            away: self.away_team.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MatchesEnvelope {
    #[serde(default)]
    matches: Vec<serde_json::Value>,
}

/// Parses a `matches` listing. Only a body that is not a JSON object fails; individual records that
/// do not fit [`MatchModel`] are dropped.
pub fn parse_matches(body: &str) -> Result<Vec<MatchModel>, serde_json::Error> {
    let envelope: MatchesEnvelope = serde_json::from_str(body)?;
    Ok(envelope
        .matches
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<MatchModel>(record) {
            Ok(model) => Some(model),
            Err(err) => {
                debug!("dropping malformed match record: {err}");
                None
            }
        })
        .collect())
}

pub fn parse_match(body: &str) -> Result<MatchModel, serde_json::Error> {
    serde_json::from_str(body)
}

/// Scheduled or timed matches as fixtures of `league`.
pub fn upcoming(matches: Vec<MatchModel>, league: &str) -> Vec<FixtureSpec> {
    matches
        .into_iter()
        .filter(MatchModel::is_upcoming)
        .map(|model| model.into_spec(league))
        .collect()
}

/// Goals scored by `team_id` across the finished matches in which it played.
pub fn team_goals(matches: &[MatchModel], team_id: TeamId) -> Vec<u8> {
    matches
        .iter()
        .filter(|model| model.status == MatchStatus::Finished)
        .filter_map(|model| model.goals_for(team_id))
        .collect()
}

pub fn final_scores(matches: &[MatchModel]) -> FxHashMap<FixtureId, Score> {
    matches
        .iter()
        .filter_map(|model| model.final_score().map(|score| (model.id, score)))
        .collect()
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid API token: {0}")]
    Token(#[from] InvalidHeaderValue),

    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },

    #[error("malformed response from {url}: {source}")]
    Json {
        url: String,
        source: serde_json::Error,
    },
}
impl FeedError {
    /// Timeouts, connection failures, rate limiting and server errors may succeed on a later
    /// attempt; everything else will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::Http { source, .. } => source.is_timeout() || source.is_connect(),
            FeedError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            FeedError::Token(_) | FeedError::Json { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryConfig,
    /// Finished matches per team from which form is estimated.
    pub form_matches: usize,
    /// Pause between successive requests of a download.
    pub pause: Duration,
    pub fallback: FallbackRates,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.into(),
            timeout: Duration::from_secs(15),
            retry: RetryConfig::default(),
            form_matches: 10,
            pause: Duration::from_millis(200),
            fallback: FallbackRates::default(),
        }
    }
}

pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
}
impl Client {
    pub fn new(token: &str, config: ClientConfig) -> Result<Self, FeedError> {
        let mut token = HeaderValue::from_str(token)?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert("X-Auth-Token", token);
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|source| FeedError::Http {
                url: config.base_url.clone(),
                source,
            })?;
        Ok(Self { http, config })
    }

    async fn get_once(&self, url: &str, query: &[(&str, String)]) -> Result<String, FeedError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| FeedError::Http {
                url: url.into(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.into(),
                status,
            });
        }
        response.text().await.map_err(|source| FeedError::Http {
            url: url.into(),
            source,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url)
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, FeedError> {
        retry::retry(&self.config.retry, url, FeedError::is_retryable, move || {
            self.get_once(url, query)
        })
        .await
    }

    async fn get_matches(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<MatchModel>, FeedError> {
        let url = self.url(path);
        let body = self.get(&url, query).await?;
        parse_matches(&body).map_err(|source| FeedError::Json { url, source })
    }

    pub async fn competition_matches(
        &self,
        competition_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MatchModel>, FeedError> {
        let query = [
            ("dateFrom", from.format("%Y-%m-%d").to_string()),
            ("dateTo", to.format("%Y-%m-%d").to_string()),
        ];
        self.get_matches(&format!("competitions/{competition_id}/matches"), &query)
            .await
    }

    /// The team's most recent finished matches.
    pub async fn team_matches(&self, team_id: TeamId) -> Result<Vec<MatchModel>, FeedError> {
        let query = [
            ("status", "FINISHED".to_string()),
            ("limit", self.config.form_matches.to_string()),
        ];
        self.get_matches(&format!("teams/{team_id}/matches"), &query)
            .await
    }

    pub async fn match_by_id(&self, fixture_id: FixtureId) -> Result<MatchModel, FeedError> {
        let url = self.url(&format!("matches/{fixture_id}"));
        let body = self.get(&url, &[]).await?;
        parse_match(&body).map_err(|source| FeedError::Json { url, source })
    }

    /// Upcoming fixtures across [`COMPETITIONS`] from `from` to `days` later, with the recent form
    /// of every team involved. A competition or team that cannot be fetched is skipped; the
    /// download fails only if every competition does.
    pub async fn download(&self, from: NaiveDate, days: u32) -> Result<Download, FeedError> {
        let to = from
            .checked_add_days(Days::new(days as u64))
            .unwrap_or(NaiveDate::MAX);
        let mut fixtures = Vec::new();
        let mut last_err = None;
        for (league, competition_id) in COMPETITIONS {
            match self.competition_matches(competition_id, from, to).await {
                Ok(matches) => {
                    let upcoming = upcoming(matches, league);
                    debug!("{league}: {} upcoming fixtures", upcoming.len());
                    fixtures.extend(upcoming);
                }
                Err(err) => {
                    warn!("skipping {league}: {err}");
                    last_err = Some(err);
                }
            }
            sleep(self.config.pause).await;
        }
        if fixtures.is_empty() {
            if let Some(err) = last_err {
                return Err(err);
            }
        }

        let mut form = FormTable::with_fallback(self.config.fallback.clone());
        let mut team_ids = FxHashSet::default();
        for fixture in &fixtures {
            for team_id in [fixture.home.id, fixture.away.id] {
                if !team_ids.insert(team_id) {
                    continue;
                }
                match self.team_matches(team_id).await {
                    Ok(matches) => form.insert(team_id, team_goals(&matches, team_id)),
                    Err(err) => warn!("no form for team {team_id}: {err}"),
                }
                sleep(self.config.pause).await;
            }
        }
        info!(
            "downloaded {} fixtures with form for {} of {} teams",
            fixtures.len(),
            form.len(),
            team_ids.len()
        );
        Ok(Download { fixtures, form })
    }

    /// Final scores of whichever of `fixture_ids` have finished. A fixture whose lookup fails is
    /// left out, and so stays unsettled.
    pub async fn final_scores(
        &self,
        fixture_ids: impl IntoIterator<Item = FixtureId>,
    ) -> FxHashMap<FixtureId, Score> {
        let mut scores = FxHashMap::default();
        for fixture_id in fixture_ids {
            match self.match_by_id(fixture_id).await {
                Ok(model) => {
                    if let Some(score) = model.final_score() {
                        scores.insert(fixture_id, score);
                    }
                }
                Err(err) => warn!("no result for fixture {fixture_id}: {err}"),
            }
            sleep(self.config.pause).await;
        }
        scores
    }
}
