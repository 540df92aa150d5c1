use super::*;
use acca_testing::assert_non_increasing;
use assert_float_eq::*;

fn create_test_4x4_scoregrid() -> Matrix<f64> {
    let mut scoregrid = Matrix::allocate(4, 4);
    scoregrid[0].copy_from_slice(&[0.04, 0.03, 0.02, 0.01]);
    scoregrid[1].copy_from_slice(&[0.08, 0.06, 0.04, 0.02]);
    scoregrid[2].copy_from_slice(&[0.12, 0.09, 0.06, 0.03]);
    scoregrid[3].copy_from_slice(&[0.16, 0.12, 0.08, 0.04]);
    scoregrid
}

#[test]
pub fn market_win_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.65, Market::Win(Side::Home).gather(&scoregrid).unwrap());
    assert_float_absolute_eq!(0.15, Market::Win(Side::Away).gather(&scoregrid).unwrap());
}

#[test]
pub fn market_draw_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.2, Market::Draw.gather(&scoregrid).unwrap());
}

#[test]
pub fn market_double_chance_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(
        0.85,
        Market::DoubleChance(DoubleChance::HomeOrDraw).gather(&scoregrid).unwrap()
    );
    assert_float_absolute_eq!(
        0.35,
        Market::DoubleChance(DoubleChance::AwayOrDraw).gather(&scoregrid).unwrap()
    );
    assert_float_absolute_eq!(
        0.8,
        Market::DoubleChance(DoubleChance::HomeOrAway).gather(&scoregrid).unwrap()
    );
}

#[test]
pub fn market_goals_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.96, Market::Goals(Threshold::Over(0)).gather(&scoregrid).unwrap());
    assert_float_absolute_eq!(0.65, Market::Goals(Threshold::Over(2)).gather(&scoregrid).unwrap());
    assert_float_absolute_eq!(0.35, Market::Goals(Threshold::Under(2)).gather(&scoregrid).unwrap());
}

#[test]
pub fn market_btts_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.54, Market::BothTeamsToScore.gather(&scoregrid).unwrap());
    assert_float_absolute_eq!(0.48, Market::BttsAndOver(2).gather(&scoregrid).unwrap());
}

#[test]
pub fn heuristic_markets_not_gathered() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_eq!(None, Market::Corners(Threshold::Over(9)).gather(&scoregrid));
    assert_eq!(None, Market::Cards(Threshold::Over(3)).gather(&scoregrid));
}

#[test]
pub fn univariate_poisson() {
    let scoregrid = from_univariate_poisson(1.8, 1.4, 6).unwrap();
    assert_eq!(7, scoregrid.rows());
    assert_eq!(7, scoregrid.cols());
    assert_float_relative_eq!(0.996809834498993, total(&scoregrid), 1e-9);
    assert_float_relative_eq!(
        0.9560476305206267,
        Market::Goals(Threshold::Over(0)).gather(&scoregrid).unwrap(),
        1e-9
    );
    let home_win = Market::Win(Side::Home).gather(&scoregrid).unwrap();
    let away_win = Market::Win(Side::Away).gather(&scoregrid).unwrap();
    assert_float_relative_eq!(0.4676324568833166, home_win, 1e-9);
    assert_float_relative_eq!(0.29969870362026824, away_win, 1e-9);
    assert!(home_win > away_win);
    assert_float_relative_eq!(0.6264126727489895, Market::BothTeamsToScore.gather(&scoregrid).unwrap(), 1e-9);
}

#[test]
pub fn mass_within_unit_interval_and_approaches_one() {
    let rates = [(0.1, 0.1), (1.8, 1.4), (3.5, 0.4), (6.0, 6.0)];
    for (home_rate, away_rate) in rates {
        let mut previous = 0.0;
        for max_goals in [2, 6, 12, 24] {
            let mass = total(&from_univariate_poisson(home_rate, away_rate, max_goals).unwrap());
            assert!(mass > 0.0 && mass <= 1.0 + 1e-12, "mass {mass} for {home_rate}:{away_rate}");
            assert!(mass >= previous, "mass decreased to {mass} at {max_goals}");
            previous = mass;
        }
        assert_float_absolute_eq!(1.0, previous, 1e-6);
    }
}

#[test]
pub fn results_complement_to_mass() {
    let scoregrid = from_univariate_poisson(2.1, 1.6, 6).unwrap();
    let home_win = Market::Win(Side::Home).gather(&scoregrid).unwrap();
    let draw = Market::Draw.gather(&scoregrid).unwrap();
    let away_win = Market::Win(Side::Away).gather(&scoregrid).unwrap();
    assert_float_absolute_eq!(total(&scoregrid), home_win + draw + away_win, 1e-12);
    assert_eq!(
        home_win + draw,
        Market::DoubleChance(DoubleChance::HomeOrDraw).gather(&scoregrid).unwrap()
    );
}

#[test]
pub fn goal_lines_nested() {
    for (home_rate, away_rate) in [(0.3, 0.2), (1.8, 1.4), (4.0, 3.0)] {
        let scoregrid = from_univariate_poisson(home_rate, away_rate, 6).unwrap();
        let overs = (0..5)
            .map(|line| Market::Goals(Threshold::Over(line)).gather(&scoregrid).unwrap())
            .collect::<Vec<_>>();
        assert_non_increasing(&overs);
    }
}

#[test]
pub fn invalid_rates_rejected() {
    assert_eq!(
        Err(InvalidRate {
            home: 0.0,
            away: 1.5
        }),
        from_univariate_poisson(0.0, 1.5, 6)
    );
    assert!(from_univariate_poisson(1.5, -0.1, 6).is_err());
    assert!(from_univariate_poisson(f64::NAN, 1.0, 6).is_err());
    assert!(from_univariate_poisson(1.0, f64::INFINITY, 6).is_err());
    assert_eq!(
        "cannot model goal rates home=0, away=1.5",
        validate_rates(0.0, 1.5).unwrap_err().to_string()
    );
}

#[test]
pub fn expectations() {
    let scoregrid = from_univariate_poisson(1.8, 1.4, 6).unwrap();
    let (home, away) = home_away_expectations(&scoregrid);
    assert_float_relative_eq!(1.7802109919854137, home, 1e-9);
    assert_float_relative_eq!(1.3919326768956708, away, 1e-9);
}

#[test]
pub fn well_formed() {
    assert!(is_well_formed(&create_test_4x4_scoregrid()));
    assert!(!is_well_formed(&Matrix::allocate(0, 0)));
    let mut scoregrid = create_test_4x4_scoregrid();
    scoregrid[(1, 1)] = f64::NAN;
    assert!(!is_well_formed(&scoregrid));
}
