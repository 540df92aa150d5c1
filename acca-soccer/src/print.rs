use rustc_hash::FxHashMap;
use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};

use acca::market::Margin;

use crate::domain::{FixtureId, MarketFamily, Score};
use crate::markets::MarketProbability;
use crate::sets::BetSet;
use crate::settle::{self, SetVerdict, Summary};

fn percent(prob: f64) -> String {
    format!("{:.1}%", prob * 100.0)
}

pub fn tabulate_sets(sets: &[BetSet]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(4)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(20)).with(Left)),
            Col::new(Styles::default().with(MinWidth(14)).with(Left)),
            Col::new(Styles::default().with(MinWidth(20)).with(Left)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "#".into(),
                "Fixture".into(),
                "League".into(),
                "Market".into(),
                "Prob".into(),
                "Odds".into(),
                "Set prob".into(),
                "Set odds".into(),
            ],
        ));
    for (rank, set) in sets.iter().enumerate() {
        for (index, leg) in set.legs.iter().enumerate() {
            let (rank, set_prob, set_odds) = if index == 0 {
                (
                    format!("{}", rank + 1),
                    percent(set.prob),
                    format!("{:.2}", set.odds),
                )
            } else {
                Default::default()
            };
            table.push_row(Row::new(
                Styles::default(),
                vec![
                    rank.into(),
                    leg.fixture.clone().into(),
                    leg.league.clone().into(),
                    leg.market.to_string().into(),
                    percent(leg.prob).into(),
                    format!("{:.2}", leg.odds).into(),
                    set_prob.into(),
                    set_odds.into(),
                ],
            ));
        }
    }
    table
}

/// Probabilities and synthetic prices of one fixture's markets. Heuristic markets are marked as
/// approximations.
pub fn tabulate_markets(markets: &[MarketProbability], margin: &Margin) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(26)).with(Left)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Market".into(), "Prob".into(), "Odds".into()],
        ));
    for market in markets {
        let label = if market.market.is_heuristic() {
            format!("{} ~", market.market)
        } else {
            market.market.to_string()
        };
        table.push_row(Row::new(
            Styles::default(),
            vec![
                label.into(),
                percent(market.prob).into(),
                format!("{:.2}", margin.price(market.prob)).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_families(counts: &[(MarketFamily, usize)]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(16)).with(Left)),
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Family".into(), "Bets".into()],
        ));
    for (family, count) in counts {
        table.push_row(Row::new(
            Styles::default(),
            vec![family.to_string().into(), count.to_string().into()],
        ));
    }
    table
}

pub fn tabulate_settlement(sets: &[BetSet], results: &FxHashMap<FixtureId, Score>) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(4)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(18)).with(Left)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(Left)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["#".into(), "Set".into(), "Prob".into(), "Verdict".into()],
        ));
    for (rank, set) in sets.iter().enumerate() {
        let verdict = match settle::settle_set(set, results) {
            SetVerdict::Won => "won",
            SetVerdict::Lost => "lost",
            SetVerdict::Pending => "pending",
        };
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", rank + 1).into(),
                format!("{:016x}", set.id).into(),
                percent(set.prob).into(),
                verdict.into(),
            ],
        ));
    }
    let summary = Summary::tally(sets, results);
    let hit_rate = summary
        .hit_rate()
        .map(percent)
        .unwrap_or_else(|| "-".into());
    table.push_row(Row::new(
        Styles::default().with(Header(true)),
        vec![
            "".into(),
            format!("{} won, {} lost, {} pending", summary.won, summary.lost, summary.pending).into(),
            hit_rate.into(),
            "".into(),
        ],
    ));
    table
}
