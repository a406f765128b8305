use forecast_engine::error::ForecastError;
use forecast_engine::horizon::{Horizon, HorizonSelector};
use rstest::rstest;

#[rstest]
#[case(2, 1)]
#[case(8, 5)]
#[case(10, 7)]
#[case(30, 21)]
#[case(90, 63)]
#[case(100, 70)]
#[case(522, 365)]
#[case(10_000, 365)]
fn test_proportional_horizon(#[case] history: usize, #[case] expected: usize) {
    let horizon = HorizonSelector::proportional().select(history).unwrap();
    assert_eq!(horizon.periods(), expected);
}

#[rstest]
#[case(0)]
#[case(1)]
fn test_short_history_is_insufficient(#[case] history: usize) {
    let result = HorizonSelector::proportional().select(history);
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}

#[test]
fn test_user_chosen_horizon() {
    let selector = HorizonSelector::user_chosen(12).unwrap();
    assert_eq!(selector.select(100).unwrap().periods(), 12);
    // Never more periods than observations
    assert_eq!(selector.select(5).unwrap().periods(), 5);
}

#[rstest]
#[case(0)]
#[case(37)]
fn test_user_chosen_bounds(#[case] periods: usize) {
    assert!(matches!(
        HorizonSelector::user_chosen(periods),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_horizon_display() {
    assert_eq!(Horizon::new(5).unwrap().to_string(), "5 periods");
}
