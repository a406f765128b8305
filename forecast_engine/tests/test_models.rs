use chrono::{Duration, NaiveDate};
use forecast_engine::error::ForecastError;
use forecast_engine::horizon::{Horizon, HorizonSelector};
use forecast_engine::models::{
    BoostedTrees, BoostingConfig, ForecastModel, ModelInput, RegressionLoss, SeasonalConfig,
    SeasonalDecomposition, SeasonalityMode,
};
use forecast_engine::models::seasonal::MIN_ETS_OBSERVATIONS;
use forecast_engine::pipeline::run_series;
use forecast_engine::schema::Target;
use forecast_engine::series::{FeatureTable, HistoricalSeries};
use forecast_engine::table::ForecastTable;
use rstest::rstest;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, d).unwrap()
}

fn sample_supply() -> HistoricalSeries {
    let days = [1, 12, 15, 18, 21, 22, 25, 26];
    let values = [
        71835.71, 86449.29, 70005.61, 86409.22, 81835.71, 86949.29, 51835.71, 87449.29,
    ];
    HistoricalSeries::new(
        "Supply",
        days.iter().map(|d| date(*d)).zip(values).collect(),
    )
    .unwrap()
}

fn sample_demand() -> HistoricalSeries {
    let days = [3, 8, 10, 12, 16, 17, 19, 21];
    let values = [93.12, 97.43, 89.89, 87.67, 94.34, 88.45, 90.30, 97.23];
    HistoricalSeries::new(
        "Demand",
        days.iter().map(|d| date(*d)).zip(values).collect(),
    )
    .unwrap()
}

/// Daily series with a weekly pattern and features that explain the target
fn regression_data(n: usize) -> (HistoricalSeries, FeatureTable) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut points = Vec::with_capacity(n);
    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        let weekday = (i % 7) as f64;
        let quality = 0.5 + 0.05 * ((i * 3) % 10) as f64;
        let efficiency = 70.0 + (i % 5) as f64;
        points.push((
            start + Duration::days(i as i64),
            100.0 + 10.0 * weekday + 40.0 * quality + efficiency,
        ));
        rows.push(vec![weekday, quality, efficiency]);
    }
    let names = vec![
        "weekday".to_string(),
        "quality".to_string(),
        "efficiency".to_string(),
    ];
    (
        HistoricalSeries::new("Debit EUR", points).unwrap(),
        FeatureTable::new(names, rows).unwrap(),
    )
}

fn quick_boosting() -> BoostingConfig {
    BoostingConfig {
        iterations: 40,
        depth: 3,
        eval_period: 10,
        early_stopping_rounds: Some(20),
        ..BoostingConfig::default()
    }
}

#[test]
fn test_sample_supply_forecast_length() {
    let supply = sample_supply();
    let horizon = HorizonSelector::proportional().select(supply.len()).unwrap();
    assert_eq!(horizon.periods(), 5);

    let model = SeasonalDecomposition::new(SeasonalConfig::default()).unwrap();
    let fit = model
        .fit_forecast(&ModelInput::univariate(&supply), horizon)
        .unwrap();

    assert_eq!(fit.forecast.len(), 13);
    assert_eq!(fit.forecast.history().len(), 8);
    assert_eq!(fit.forecast.future()[0].date, date(27));
    assert_eq!(fit.forecast.future()[4].date, date(31));
    assert!(fit.forecast.values().iter().all(|v| v.is_finite() && *v > 0.0));
    assert!(fit.holdout.is_none());
}

#[rstest]
#[case(SeasonalityMode::Additive)]
#[case(SeasonalityMode::Multiplicative)]
fn test_seasonal_modes(#[case] mode: SeasonalityMode) {
    let demand = sample_demand();
    let config = SeasonalConfig {
        seasonality_mode: mode,
        ..SeasonalConfig::default()
    };
    let model = SeasonalDecomposition::new(config).unwrap();
    let horizon = Horizon::new(3).unwrap();

    let fit = model
        .fit_forecast(&ModelInput::univariate(&demand), horizon)
        .unwrap();

    assert_eq!(fit.forecast.len(), demand.len() + 3);
    assert_eq!(&fit.forecast.dates()[..demand.len()], demand.dates());
}

#[test]
fn test_seasonal_with_weekly_period() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let points = (0..42)
        .map(|i| {
            let weekly = [5.0, 7.0, 9.0, 8.0, 6.0, 3.0, 2.0][i % 7];
            (start + Duration::days(i as i64), 50.0 + 0.3 * i as f64 + weekly)
        })
        .collect();
    let series = HistoricalSeries::new("weekly", points).unwrap();
    let model = SeasonalDecomposition::new(SeasonalConfig::default()).unwrap();
    assert_eq!(model.usable_periods(series.len()), vec![7]);

    let fit = model
        .fit_forecast(&ModelInput::univariate(&series), Horizon::new(14).unwrap())
        .unwrap();

    assert_eq!(fit.forecast.len(), 56);
    assert!(fit.forecast.has_intervals());
    for point in fit.forecast.future() {
        let (lower, upper) = (point.lower.unwrap(), point.upper.unwrap());
        assert!(lower <= point.value && point.value <= upper);
    }
}

#[rstest]
fn test_seasonal_short_histories(
    #[values(2, 3, 4, 5, 6, 7, 8)] n: usize,
    #[values(SeasonalityMode::Additive, SeasonalityMode::Multiplicative)] mode: SeasonalityMode,
) {
    let series = HistoricalSeries::new(
        "short",
        (0..n)
            .map(|i| (date(i as u32 + 1), 100.0 + 3.0 * i as f64 + ((i * 7) % 5) as f64))
            .collect(),
    )
    .unwrap();
    let horizon = Horizon::new(3).unwrap();
    let config = SeasonalConfig {
        seasonality_mode: mode,
        ..SeasonalConfig::default()
    };
    let model = SeasonalDecomposition::new(config).unwrap();

    let fit = model
        .fit_forecast(&ModelInput::univariate(&series), horizon)
        .unwrap();

    assert_eq!(fit.forecast.len(), n + 3);
    if n < MIN_ETS_OBSERVATIONS {
        assert!(fit.forecast.has_intervals());
    }
    assert!(fit.forecast.values().iter().all(|v| v.is_finite()));
    assert_eq!(fit.forecast.future()[0].date, date(n as u32 + 1));
}

#[test]
fn test_seasonal_unordered_history() {
    let days = [1, 2, 3, 4, 6, 7, 8, 9, 10, 5];
    let series = HistoricalSeries::new(
        "Supply",
        days.iter()
            .map(|d| (date(*d), 76_000.0 + 100.0 * *d as f64 + ((*d * 3) % 4) as f64 * 50.0))
            .collect(),
    )
    .unwrap();
    let model = SeasonalDecomposition::new(SeasonalConfig::default()).unwrap();
    let horizon = Horizon::new(4).unwrap();

    let run = run_series(
        &model,
        Target::Supply,
        &ModelInput::univariate(&series),
        horizon,
    )
    .unwrap();

    let future: Vec<NaiveDate> = run.fit.forecast.future().iter().map(|p| p.date).collect();
    assert_eq!(future, vec![date(11), date(12), date(13), date(14)]);

    // Every history row aligns with its own in-sample prediction
    assert_eq!(run.evaluated.len(), 10);
    let history = run.fit.forecast.history();
    for (day, predicted) in run.evaluated.dates().iter().zip(run.evaluated.predicted()) {
        let in_sample = history.iter().find(|p| p.date == *day).unwrap();
        assert_eq!(in_sample.value, *predicted);
    }

    let table = ForecastTable::from_forecasts(Some(&run.fit.forecast), None);
    assert_eq!(table.len(), 14);
}

#[test]
fn test_seasonal_degenerate_series() {
    let model = SeasonalDecomposition::new(SeasonalConfig::default()).unwrap();
    let horizon = Horizon::new(1).unwrap();

    let single = HistoricalSeries::new("one", vec![(date(1), 1.0)]).unwrap();
    assert!(matches!(
        model.fit_forecast(&ModelInput::univariate(&single), horizon),
        Err(ForecastError::ModelFit(_))
    ));

    let constant =
        HistoricalSeries::new("flat", (1..=10).map(|d| (date(d), 5.0)).collect()).unwrap();
    assert!(matches!(
        model.fit_forecast(&ModelInput::univariate(&constant), horizon),
        Err(ForecastError::ModelFit(_))
    ));

    let with_zero = HistoricalSeries::new(
        "zero",
        vec![(date(1), 1.0), (date(2), 0.0), (date(3), 2.0)],
    )
    .unwrap();
    assert!(matches!(
        model.fit_forecast(&ModelInput::univariate(&with_zero), horizon),
        Err(ForecastError::ModelFit(_))
    ));
}

#[test]
fn test_boosted_forecast_shape() {
    let (series, features) = regression_data(60);
    let model = BoostedTrees::new(quick_boosting()).unwrap();
    let horizon = Horizon::new(7).unwrap();

    let fit = model
        .fit_forecast(&ModelInput::with_features(&series, &features), horizon)
        .unwrap();

    assert_eq!(fit.forecast.len(), 67);

    let holdout = fit.holdout.unwrap();
    assert_eq!(holdout.train_len, 48);
    assert_eq!(holdout.pairs.len(), 12);
    assert_eq!(holdout.pairs.dates(), &series.dates()[48..]);

    let report = fit.cross_validation.unwrap();
    assert_eq!(report.fold_count(), 5);
    assert_eq!(report.seed, 42);
    assert!(!report.shuffled);

    let best = fit.best_iteration.unwrap();
    assert!(quick_boosting().checkpoints().contains(&best));

    // Future rows reuse the last feature row, so they share one prediction
    let future = fit.forecast.future();
    assert!(future.iter().all(|p| p.value == future[0].value));
}

#[test]
fn test_boosted_explicit_future_features() {
    let (series, features) = regression_data(40);
    let future = FeatureTable::new(
        features.names().to_vec(),
        vec![vec![0.0, 0.5, 70.0], vec![6.0, 0.95, 74.0]],
    )
    .unwrap();
    let model = BoostedTrees::new(BoostingConfig {
        loss: RegressionLoss::Mae,
        shuffle: true,
        cv_folds: 3,
        ..quick_boosting()
    })
    .unwrap();

    let input = ModelInput::with_features(&series, &features).future_features(&future);
    let fit = model.fit_forecast(&input, Horizon::new(2).unwrap()).unwrap();

    assert_eq!(fit.forecast.len(), 42);
    assert_eq!(fit.cross_validation.unwrap().fold_count(), 3);

    let wrong = model.fit_forecast(&input, Horizon::new(3).unwrap());
    assert!(matches!(wrong, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_boosted_requires_informative_features() {
    let (series, _) = regression_data(20);
    let model = BoostedTrees::new(quick_boosting()).unwrap();
    let horizon = Horizon::new(2).unwrap();

    assert!(matches!(
        model.fit_forecast(&ModelInput::univariate(&series), horizon),
        Err(ForecastError::ModelFit(_))
    ));

    let constant = FeatureTable::new(vec!["c".to_string()], vec![vec![1.0]; 20]).unwrap();
    assert!(matches!(
        model.fit_forecast(&ModelInput::with_features(&series, &constant), horizon),
        Err(ForecastError::ModelFit(_))
    ));
}

#[test]
fn test_boosted_too_few_rows_for_folds() {
    let (series, features) = regression_data(5);
    let model = BoostedTrees::new(quick_boosting()).unwrap();

    let result = model.fit_forecast(
        &ModelInput::with_features(&series, &features),
        Horizon::new(1).unwrap(),
    );
    assert!(matches!(result, Err(ForecastError::ModelFit(_))));
}
