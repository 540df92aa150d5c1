use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;
use thiserror::Error;

pub type FixtureId = u64;
pub type TeamId = u64;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
pub enum Side {
    Home,
    Away,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}
impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSpec {
    pub id: FixtureId,
    pub league: String,
    pub home: Team,
    pub away: Team,
}
impl FixtureSpec {
    pub fn label(&self) -> String {
        format!("{} vs {}", self.home.name, self.away.name)
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn with_rates(self, home_xg: f64, away_xg: f64) -> Fixture {
        Fixture {
            spec: self,
            home_xg,
            away_xg,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(flatten)]
    pub spec: FixtureSpec,
    pub home_xg: f64,
    pub away_xg: f64,
}
impl Fixture {
    pub fn id(&self) -> FixtureId {
        self.spec.id
    }

    pub fn label(&self) -> String {
        self.spec.label()
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}
impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn total(&self) -> u16 {
        self.home as u16 + self.away as u16
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Threshold {
    // Over(n) is "Over n.5"; Under(n) is "Under n.5"
    Over(u8),
    Under(u8),
}
impl Threshold {
    #[inline]
    pub fn admits(&self, count: u16) -> bool {
        match self {
            Threshold::Over(line) => count > *line as u16,
            Threshold::Under(line) => count <= *line as u16,
        }
    }
}

impl Display for Threshold {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Threshold::Over(line) => write!(f, "Over {line}.5"),
            Threshold::Under(line) => write!(f, "Under {line}.5"),
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DoubleChance {
    HomeOrDraw,
    AwayOrDraw,
    HomeOrAway,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, EnumIter, strum_macros::Display)]
pub enum MarketFamily {
    Goals,
    BothTeamsToScore,
    Result,
    DoubleChance,
    Corners,
    Cards,
    Fouls,
    ShotsOnTarget,
}
impl MarketFamily {
    pub fn is_heuristic(&self) -> bool {
        matches!(
            self,
            MarketFamily::Corners
                | MarketFamily::Cards
                | MarketFamily::Fouls
                | MarketFamily::ShotsOnTarget
        )
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Market {
    Goals(Threshold),
    BothTeamsToScore,
    BttsAndOver(u8),
    Win(Side),
    Draw,
    DoubleChance(DoubleChance),
    Corners(Threshold),
    Cards(Threshold),
    Fouls(Threshold),
    ShotsOnTarget(Threshold),
}
impl Market {
    pub fn family(&self) -> MarketFamily {
        match self {
            Market::Goals(_) => MarketFamily::Goals,
            Market::BothTeamsToScore | Market::BttsAndOver(_) => MarketFamily::BothTeamsToScore,
            Market::Win(_) | Market::Draw => MarketFamily::Result,
            Market::DoubleChance(_) => MarketFamily::DoubleChance,
            Market::Corners(_) => MarketFamily::Corners,
            Market::Cards(_) => MarketFamily::Cards,
            Market::Fouls(_) => MarketFamily::Fouls,
            Market::ShotsOnTarget(_) => MarketFamily::ShotsOnTarget,
        }
    }

    pub fn is_heuristic(&self) -> bool {
        self.family().is_heuristic()
    }
}

impl Display for Market {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Market::Goals(threshold) => write!(f, "{threshold} Goals"),
            Market::BothTeamsToScore => write!(f, "BTTS"),
            Market::BttsAndOver(line) => write!(f, "BTTS & Over {line}.5"),
            Market::Win(Side::Home) => write!(f, "Home Win"),
            Market::Win(Side::Away) => write!(f, "Away Win"),
            Market::Draw => write!(f, "Draw"),
            Market::DoubleChance(DoubleChance::HomeOrDraw) => write!(f, "Double Chance 1X"),
            Market::DoubleChance(DoubleChance::AwayOrDraw) => write!(f, "Double Chance X2"),
            Market::DoubleChance(DoubleChance::HomeOrAway) => write!(f, "Double Chance 12"),
            Market::Corners(threshold) => write!(f, "{threshold} Corners"),
            Market::Cards(threshold) => write!(f, "{threshold} Cards"),
            Market::Fouls(threshold) => write!(f, "{threshold} Fouls"),
            Market::ShotsOnTarget(threshold) => write!(f, "{threshold} Shots on Target"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised market '{0}'")]
pub struct MarketParseError(String);

impl FromStr for Market {
    type Err = MarketParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MarketParseError(s.into());
        match s {
            "BTTS" => return Ok(Market::BothTeamsToScore),
            "Home Win" => return Ok(Market::Win(Side::Home)),
            "Away Win" => return Ok(Market::Win(Side::Away)),
            "Draw" => return Ok(Market::Draw),
            "Double Chance 1X" => return Ok(Market::DoubleChance(DoubleChance::HomeOrDraw)),
            "Double Chance X2" => return Ok(Market::DoubleChance(DoubleChance::AwayOrDraw)),
            "Double Chance 12" => return Ok(Market::DoubleChance(DoubleChance::HomeOrAway)),
            _ => {}
        }

        if let Some(line) = s.strip_prefix("BTTS & Over ") {
            return parse_half_line(line).map(Market::BttsAndOver).ok_or_else(err);
        }

        let (direction, rest) = s.split_once(' ').ok_or_else(err)?;
        let (line, family) = rest.split_once(' ').ok_or_else(err)?;
        let line = parse_half_line(line).ok_or_else(err)?;
        let threshold = match direction {
            "Over" => Threshold::Over(line),
            "Under" => Threshold::Under(line),
            _ => return Err(err()),
        };
        match family {
            "Goals" => Ok(Market::Goals(threshold)),
            "Corners" => Ok(Market::Corners(threshold)),
            "Cards" => Ok(Market::Cards(threshold)),
            "Fouls" => Ok(Market::Fouls(threshold)),
            "Shots on Target" => Ok(Market::ShotsOnTarget(threshold)),
            _ => Err(err()),
        }
    }
}

fn parse_half_line(line: &str) -> Option<u8> {
    line.strip_suffix(".5")?.parse().ok()
}

impl From<Market> for String {
    fn from(market: Market) -> Self {
        market.to_string()
    }
}

impl TryFrom<String> for Market {
    type Error = MarketParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Market::from_str(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn threshold_admits() {
        assert!(!Threshold::Over(0).admits(0));
        assert!(Threshold::Over(0).admits(1));
        assert!(!Threshold::Over(2).admits(2));
        assert!(Threshold::Over(2).admits(3));
        assert!(Threshold::Under(2).admits(2));
        assert!(!Threshold::Under(2).admits(3));
        assert!(Threshold::Under(0).admits(0));
    }

    #[test]
    fn market_labels() {
        assert_eq!("Over 0.5 Goals", Market::Goals(Threshold::Over(0)).to_string());
        assert_eq!("Under 3.5 Goals", Market::Goals(Threshold::Under(3)).to_string());
        assert_eq!("BTTS & Over 2.5", Market::BttsAndOver(2).to_string());
        assert_eq!("Double Chance X2", Market::DoubleChance(DoubleChance::AwayOrDraw).to_string());
        assert_eq!("Over 10.5 Shots on Target", Market::ShotsOnTarget(Threshold::Over(10)).to_string());
        assert_eq!("Under 26.5 Fouls", Market::Fouls(Threshold::Under(26)).to_string());
    }

    #[test]
    fn market_labels_parse_back() {
        let markets = [
            Market::Goals(Threshold::Over(2)),
            Market::Goals(Threshold::Under(3)),
            Market::BothTeamsToScore,
            Market::BttsAndOver(2),
            Market::Win(Side::Home),
            Market::Win(Side::Away),
            Market::Draw,
            Market::DoubleChance(DoubleChance::HomeOrDraw),
            Market::DoubleChance(DoubleChance::AwayOrDraw),
            Market::DoubleChance(DoubleChance::HomeOrAway),
            Market::Corners(Threshold::Over(9)),
            Market::Cards(Threshold::Under(5)),
            Market::Fouls(Threshold::Over(24)),
            Market::ShotsOnTarget(Threshold::Over(12)),
        ];
        for market in markets {
            assert_eq!(Ok(market), Market::from_str(&market.to_string()));
        }
    }

    #[test]
    fn market_parse_errors() {
        assert_eq!(
            "unrecognised market 'Over 2 Goals'",
            Market::from_str("Over 2 Goals").unwrap_err().to_string()
        );
        assert!(Market::from_str("Sideways 1.5 Goals").is_err());
        assert!(Market::from_str("Over 1.5 Throw-ins").is_err());
        assert!(Market::from_str("").is_err());
    }

    #[test]
    fn market_serde() {
        let json = serde_json::to_string(&Market::Goals(Threshold::Over(1))).unwrap();
        assert_eq!("\"Over 1.5 Goals\"", json);
        let market: Market = serde_json::from_str("\"Double Chance 12\"").unwrap();
        assert_eq!(Market::DoubleChance(DoubleChance::HomeOrAway), market);
        assert!(serde_json::from_str::<Market>("\"Corner Kick\"").is_err());
    }

    #[test]
    fn heuristic_families() {
        let heuristic = MarketFamily::iter()
            .filter(MarketFamily::is_heuristic)
            .collect::<Vec<_>>();
        assert_eq!(
            vec![
                MarketFamily::Corners,
                MarketFamily::Cards,
                MarketFamily::Fouls,
                MarketFamily::ShotsOnTarget
            ],
            heuristic
        );
        assert!(Market::Cards(Threshold::Over(3)).is_heuristic());
        assert!(!Market::Draw.is_heuristic());
    }

    #[test]
    fn fixture_serde_flattens_spec() {
        let fixture = FixtureSpec {
            id: 7,
            league: "Premier League".into(),
            home: Team::new(1, "Arsenal"),
            away: Team::new(2, "Chelsea"),
        }
        .with_rates(1.8, 1.4);
        let json = serde_json::to_value(&fixture).unwrap();
        assert_eq!(7, json["id"]);
        assert_eq!("Arsenal", json["home"]["name"]);
        assert_eq!(1.4, json["away_xg"]);
        let decoded: Fixture = serde_json::from_value(json).unwrap();
        assert_eq!(fixture, decoded);
        assert_eq!("Arsenal vs Chelsea", decoded.label());
    }
}
