use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::domain::{DoubleChance, FixtureId, Market, Score, Side};
use crate::sets::BetSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Won,
    Lost,
    /// The outcome cannot be decided from the information at hand.
    Unsettled,
}

impl Market {
    /// Decides this market against a final score. Heuristic markets depend on statistics that a
    /// score does not carry and are never settled.
    pub fn settle(&self, score: &Score) -> Verdict {
        let (home, away) = (score.home, score.away);
        let won = match self {
            Market::Goals(threshold) => threshold.admits(score.total()),
            Market::BothTeamsToScore => home > 0 && away > 0,
            Market::BttsAndOver(line) => home > 0 && away > 0 && score.total() > *line as u16,
            Market::Win(Side::Home) => home > away,
            Market::Win(Side::Away) => home < away,
            Market::Draw => home == away,
            Market::DoubleChance(DoubleChance::HomeOrDraw) => home >= away,
            Market::DoubleChance(DoubleChance::AwayOrDraw) => home <= away,
            Market::DoubleChance(DoubleChance::HomeOrAway) => home != away,
            Market::Corners(_) | Market::Cards(_) | Market::Fouls(_) | Market::ShotsOnTarget(_) => {
                return Verdict::Unsettled
            }
        };
        if won {
            Verdict::Won
        } else {
            Verdict::Lost
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetVerdict {
    Won,
    Lost,
    Pending,
}

/// Per-leg verdicts of a set, in leg order. Legs on fixtures absent from `results` are unsettled.
pub fn settle_legs(set: &BetSet, results: &FxHashMap<FixtureId, Score>) -> Vec<Verdict> {
    set.legs
        .iter()
        .map(|leg| match results.get(&leg.fixture_id) {
            None => Verdict::Unsettled,
            Some(score) => leg.market.settle(score),
        })
        .collect()
}

/// A set is lost as soon as any leg loses, won once every leg wins, and pending otherwise.
pub fn settle_set(set: &BetSet, results: &FxHashMap<FixtureId, Score>) -> SetVerdict {
    let verdicts = settle_legs(set, results);
    if verdicts.contains(&Verdict::Lost) {
        SetVerdict::Lost
    } else if verdicts.iter().all(|verdict| *verdict == Verdict::Won) {
        SetVerdict::Won
    } else {
        SetVerdict::Pending
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub won: usize,
    pub lost: usize,
    pub pending: usize,
}
impl Summary {
    pub fn tally(sets: &[BetSet], results: &FxHashMap<FixtureId, Score>) -> Self {
        let mut summary = Self::default();
        for set in sets {
            match settle_set(set, results) {
                SetVerdict::Won => summary.won += 1,
                SetVerdict::Lost => summary.lost += 1,
                SetVerdict::Pending => summary.pending += 1,
            }
        }
        summary
    }

    pub fn settled(&self) -> usize {
        self.won + self.lost
    }

    /// Fraction of settled sets that won, if any have settled.
    pub fn hit_rate(&self) -> Option<f64> {
        match self.settled() {
            0 => None,
            settled => Some(self.won as f64 / settled as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bet::Bet;
    use crate::domain::Threshold;
    use crate::scoregrid;
    use acca::linear::Matrix;

    fn leg(fixture_id: FixtureId, market: Market) -> Bet {
        Bet {
            fixture_id,
            fixture: format!("Home {fixture_id} vs Away {fixture_id}"),
            league: "Bundesliga".into(),
            market,
            prob: 0.7,
            odds: 1.36,
        }
    }

    fn set(legs: Vec<Bet>) -> BetSet {
        BetSet {
            id: crate::sets::set_id(&legs),
            prob: 0.343,
            odds: 1.36 * 1.36 * 1.36,
            legs,
        }
    }

    #[test]
    fn goals_and_btts() {
        let score = Score::new(2, 1);
        assert_eq!(Verdict::Won, Market::Goals(Threshold::Over(2)).settle(&score));
        assert_eq!(Verdict::Lost, Market::Goals(Threshold::Over(3)).settle(&score));
        assert_eq!(Verdict::Lost, Market::Goals(Threshold::Under(2)).settle(&score));
        assert_eq!(Verdict::Won, Market::Goals(Threshold::Under(3)).settle(&score));
        assert_eq!(Verdict::Won, Market::BothTeamsToScore.settle(&score));
        assert_eq!(Verdict::Won, Market::BttsAndOver(2).settle(&score));
        assert_eq!(Verdict::Lost, Market::BttsAndOver(3).settle(&score));
        assert_eq!(Verdict::Lost, Market::BothTeamsToScore.settle(&Score::new(3, 0)));
        assert_eq!(Verdict::Lost, Market::Goals(Threshold::Over(0)).settle(&Score::new(0, 0)));
    }

    #[test]
    fn results_and_double_chance() {
        let home_win = Score::new(1, 0);
        let draw = Score::new(1, 1);
        assert_eq!(Verdict::Won, Market::Win(Side::Home).settle(&home_win));
        assert_eq!(Verdict::Lost, Market::Win(Side::Away).settle(&home_win));
        assert_eq!(Verdict::Won, Market::Draw.settle(&draw));
        assert_eq!(Verdict::Won, Market::DoubleChance(DoubleChance::HomeOrDraw).settle(&draw));
        assert_eq!(Verdict::Won, Market::DoubleChance(DoubleChance::AwayOrDraw).settle(&draw));
        assert_eq!(Verdict::Lost, Market::DoubleChance(DoubleChance::HomeOrAway).settle(&draw));
        assert_eq!(Verdict::Lost, Market::DoubleChance(DoubleChance::AwayOrDraw).settle(&home_win));
    }

    #[test]
    fn heuristic_markets_unsettled() {
        let score = Score::new(4, 2);
        assert_eq!(Verdict::Unsettled, Market::Corners(Threshold::Over(9)).settle(&score));
        assert_eq!(Verdict::Unsettled, Market::Cards(Threshold::Under(5)).settle(&score));
    }

    #[test]
    fn settlement_agrees_with_scoregrid() {
        let markets = [
            Market::Goals(Threshold::Over(1)),
            Market::Goals(Threshold::Under(3)),
            Market::BothTeamsToScore,
            Market::BttsAndOver(2),
            Market::Win(Side::Home),
            Market::Win(Side::Away),
            Market::Draw,
            Market::DoubleChance(DoubleChance::HomeOrDraw),
            Market::DoubleChance(DoubleChance::AwayOrDraw),
            Market::DoubleChance(DoubleChance::HomeOrAway),
        ];
        for home in 0..4u8 {
            for away in 0..4u8 {
                let mut scoregrid = Matrix::allocate(4, 4);
                scoregrid[(home as usize, away as usize)] = 1.0;
                for market in markets {
                    let expected = if market.gather(&scoregrid) == Some(1.0) {
                        Verdict::Won
                    } else {
                        Verdict::Lost
                    };
                    assert_eq!(
                        expected,
                        market.settle(&Score::new(home, away)),
                        "{market} at {home}-{away}"
                    );
                }
                assert!(scoregrid::is_well_formed(&scoregrid));
            }
        }
    }

    #[test]
    fn sets() {
        let set = set(vec![
            leg(1, Market::Goals(Threshold::Over(1))),
            leg(2, Market::Win(Side::Home)),
            leg(3, Market::BothTeamsToScore),
        ]);
        let mut results = FxHashMap::default();
        assert_eq!(SetVerdict::Pending, settle_set(&set, &results));

        results.insert(1, Score::new(2, 0));
        results.insert(2, Score::new(1, 0));
        assert_eq!(
            vec![Verdict::Won, Verdict::Won, Verdict::Unsettled],
            settle_legs(&set, &results)
        );
        assert_eq!(SetVerdict::Pending, settle_set(&set, &results));

        results.insert(3, Score::new(1, 1));
        assert_eq!(SetVerdict::Won, settle_set(&set, &results));

        results.insert(3, Score::new(0, 1));
        assert_eq!(SetVerdict::Lost, settle_set(&set, &results));
    }

    #[test]
    fn lost_leg_decides_before_pending_legs() {
        let set = set(vec![
            leg(1, Market::Draw),
            leg(2, Market::Corners(Threshold::Over(9))),
            leg(3, Market::Win(Side::Away)),
        ]);
        let results = FxHashMap::from_iter([(1, Score::new(2, 0))]);
        assert_eq!(SetVerdict::Lost, settle_set(&set, &results));
    }

    #[test]
    fn summary() {
        let won = set(vec![leg(1, Market::Win(Side::Home)), leg(2, Market::Draw)]);
        let lost = set(vec![leg(1, Market::Draw), leg(2, Market::Draw)]);
        let pending = set(vec![leg(2, Market::Draw), leg(3, Market::Draw)]);
        let results = FxHashMap::from_iter([(1, Score::new(1, 0)), (2, Score::new(0, 0))]);
        let summary = Summary::tally(&[won, lost.clone(), pending], &results);
        assert_eq!(
            Summary {
                won: 1,
                lost: 1,
                pending: 1
            },
            summary
        );
        assert_eq!(Some(0.5), summary.hit_rate());
        assert_eq!(None, Summary::tally(&[], &results).hit_rate());
        assert_eq!(Some(0.0), Summary::tally(&[lost], &results).hit_rate());
    }
}
