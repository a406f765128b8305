//! Gradient-boosted regression trees over exogenous features

use crate::error::{ForecastError, Result};
use crate::evaluate::AlignedPairs;
use crate::horizon::Horizon;
use crate::models::cross_validation::{kfold_indices, training_indices, CrossValidationReport, FoldScore};
use crate::models::{ForecastModel, ForecastPoint, ForecastResult, Holdout, ModelFit, ModelInput};
use crate::series::FeatureTable;
use crate::utils::{chronological_split, future_dates};
use forecast_math::{mean_absolute_error, root_mean_squared_error};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Loss minimised by the booster and reported during validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegressionLoss {
    Rmse,
    Mae,
}

impl RegressionLoss {
    pub fn label(self) -> &'static str {
        match self {
            RegressionLoss::Rmse => "RMSE",
            RegressionLoss::Mae => "MAE",
        }
    }

    /// Name of the matching `gbdt` loss
    fn booster_loss(self) -> &'static str {
        match self {
            RegressionLoss::Rmse => "SquaredError",
            RegressionLoss::Mae => "LAD",
        }
    }

    /// Score predictions against actual values
    pub fn score(self, actual: &[f64], predicted: &[f64]) -> Result<f64> {
        let value = match self {
            RegressionLoss::Rmse => root_mean_squared_error(actual, predicted)?,
            RegressionLoss::Mae => mean_absolute_error(actual, predicted)?,
        };
        Ok(value)
    }
}

impl fmt::Display for RegressionLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingConfig {
    pub iterations: usize,
    pub depth: u32,
    pub learning_rate: f64,
    pub loss: RegressionLoss,
    /// Share of the latest rows held out for evaluation
    pub test_fraction: f64,
    pub cv_folds: usize,
    pub seed: u64,
    /// Permute rows before cutting cross-validation folds
    pub shuffle: bool,
    /// Stop once this many iterations pass without a better checkpoint
    pub early_stopping_rounds: Option<usize>,
    /// Iterations between validation checkpoints
    pub eval_period: usize,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            iterations: 500,
            depth: 6,
            learning_rate: 0.1,
            loss: RegressionLoss::Rmse,
            test_fraction: 0.2,
            cv_folds: 5,
            seed: 42,
            shuffle: false,
            early_stopping_rounds: Some(100),
            eval_period: 25,
        }
    }
}

impl BoostingConfig {
    /// Accepted range for the number of cross-validation folds
    pub const FOLD_RANGE: std::ops::RangeInclusive<usize> = 2..=10;

    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(ForecastError::InvalidParameter(
                "Iterations must be positive".to_string(),
            ));
        }
        if self.depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "Tree depth must be positive".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ForecastError::InvalidParameter(format!(
                "Learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Test fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if !Self::FOLD_RANGE.contains(&self.cv_folds) {
            return Err(ForecastError::InvalidParameter(format!(
                "Cross-validation folds must be between {} and {}, got {}",
                Self::FOLD_RANGE.start(),
                Self::FOLD_RANGE.end(),
                self.cv_folds
            )));
        }
        if self.eval_period == 0 {
            return Err(ForecastError::InvalidParameter(
                "Evaluation period must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Iteration counts at which the validation loss is measured
    pub fn checkpoints(&self) -> Vec<usize> {
        let mut checkpoints: Vec<usize> = (1..)
            .map(|i| i * self.eval_period)
            .take_while(|&it| it < self.iterations)
            .collect();
        checkpoints.push(self.iterations);
        checkpoints
    }
}

/// Regression of a target on exogenous features with boosted trees
#[derive(Debug, Clone)]
pub struct BoostedTrees {
    name: String,
    config: BoostingConfig,
}

impl BoostedTrees {
    pub fn new(config: BoostingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: "Boosted Trees".to_string(),
            config,
        })
    }

    pub fn config(&self) -> &BoostingConfig {
        &self.config
    }

    fn booster_config(&self, feature_size: usize, iterations: usize) -> Config {
        let mut cfg = Config::new();
        cfg.set_feature_size(feature_size);
        cfg.set_max_depth(self.config.depth);
        cfg.set_iterations(iterations);
        cfg.set_shrinkage(self.config.learning_rate as f32);
        cfg.set_loss(self.config.loss.booster_loss());
        cfg.set_debug(false);
        cfg.set_data_sample_ratio(1.0);
        cfg.set_feature_sample_ratio(1.0);
        cfg.set_training_optimization_level(2);
        cfg
    }

    /// Fit a booster with `iterations` trees on the given rows
    fn train(&self, rows: &[&[f64]], labels: &[f64], iterations: usize) -> Result<GBDT> {
        let feature_size = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data: DataVec = rows
            .iter()
            .zip(labels)
            .map(|(row, label)| Data::new_training_data(to_f32(row), 1.0, *label as f32, None))
            .collect();

        let mut booster = GBDT::new(&self.booster_config(feature_size, iterations));
        booster.fit(&mut data);
        Ok(booster)
    }

    fn predict(booster: &GBDT, rows: &[&[f64]]) -> Result<Vec<f64>> {
        let data: DataVec = rows
            .iter()
            .map(|row| Data::new_test_data(to_f32(row), None))
            .collect();
        let predictions: Vec<f64> = booster.predict(&data).into_iter().map(f64::from).collect();

        if predictions.len() != rows.len() {
            return Err(ForecastError::ModelFit(format!(
                "Booster returned {} predictions for {} rows",
                predictions.len(),
                rows.len()
            )));
        }
        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(ForecastError::ModelFit(
                "Booster produced non-finite predictions".to_string(),
            ));
        }
        Ok(predictions)
    }

    /// K-fold cross-validation over the training partition
    fn cross_validate(&self, rows: &[&[f64]], labels: &[f64]) -> Result<CrossValidationReport> {
        let n = rows.len();
        let folds = kfold_indices(n, self.config.cv_folds, self.config.shuffle, self.config.seed)?;

        let mut scores = Vec::with_capacity(folds.len());
        for (fold, validation) in folds.iter().enumerate() {
            let training = training_indices(n, validation);
            let (train_rows, train_labels) = select(rows, labels, &training);
            let (test_rows, test_labels) = select(rows, labels, validation);

            let booster = self.train(&train_rows, &train_labels, self.config.iterations)?;
            let train_loss = self
                .config
                .loss
                .score(&train_labels, &Self::predict(&booster, &train_rows)?)?;
            let test_loss = self
                .config
                .loss
                .score(&test_labels, &Self::predict(&booster, &test_rows)?)?;

            debug!(fold, train_loss, test_loss, "cross-validation fold scored");
            scores.push(FoldScore {
                fold,
                train_loss,
                test_loss,
            });
        }

        CrossValidationReport::new(
            self.config.loss,
            self.config.seed,
            self.config.shuffle,
            self.config.iterations,
            scores,
        )
    }

    /// Choose the iteration count with the lowest validation loss
    fn best_iteration(
        &self,
        train: (&[&[f64]], &[f64]),
        validation: (&[&[f64]], &[f64]),
    ) -> Result<usize> {
        let mut best = (self.config.iterations, f64::INFINITY);
        for checkpoint in self.config.checkpoints() {
            let booster = self.train(train.0, train.1, checkpoint)?;
            let loss = self
                .config
                .loss
                .score(validation.1, &Self::predict(&booster, validation.0)?)?;
            debug!(iteration = checkpoint, loss, "validation checkpoint");

            if loss < best.1 {
                best = (checkpoint, loss);
            } else if let Some(rounds) = self.config.early_stopping_rounds {
                if checkpoint.saturating_sub(best.0) >= rounds {
                    debug!(best_iteration = best.0, "early stopping");
                    break;
                }
            }
        }
        Ok(best.0)
    }

    /// Feature rows for the future periods
    fn future_rows<'a>(
        &self,
        features: &'a FeatureTable,
        future: Option<&'a FeatureTable>,
        horizon: Horizon,
    ) -> Result<Vec<&'a [f64]>> {
        match future {
            Some(table) => {
                if table.len() != horizon.periods() || table.width() != features.width() {
                    return Err(ForecastError::InvalidParameter(format!(
                        "Future features must have {} rows of width {}, got {} rows of width {}",
                        horizon.periods(),
                        features.width(),
                        table.len(),
                        table.width()
                    )));
                }
                Ok(table.rows().iter().map(Vec::as_slice).collect())
            }
            None => {
                let last = features.last_row().ok_or_else(|| {
                    ForecastError::ModelFit("No feature rows to carry forward".to_string())
                })?;
                Ok(vec![last; horizon.periods()])
            }
        }
    }
}

impl ForecastModel for BoostedTrees {
    fn name(&self) -> &str {
        &self.name
    }

    fn fit_forecast(&self, input: &ModelInput<'_>, horizon: Horizon) -> Result<ModelFit> {
        let series = input.series;
        let features = input.features.ok_or_else(|| {
            ForecastError::ModelFit(format!(
                "Series '{}' has no exogenous features to regress on",
                series.name()
            ))
        })?;

        if features.len() != series.len() {
            return Err(ForecastError::ModelFit(format!(
                "{} feature rows for {} observations",
                features.len(),
                series.len()
            )));
        }
        if series.len() < 2 {
            return Err(ForecastError::ModelFit(format!(
                "Series '{}' needs at least 2 observations, got {}",
                series.name(),
                series.len()
            )));
        }
        if features.all_constant() {
            return Err(ForecastError::ModelFit(
                "Every exogenous feature is constant".to_string(),
            ));
        }
        let last = series.latest_date().ok_or_else(|| {
            ForecastError::ModelFit(format!("Series '{}' is empty", series.name()))
        })?;

        let rows: Vec<&[f64]> = features.rows().iter().map(Vec::as_slice).collect();
        let labels = series.values();
        let (train_len, test_len) = chronological_split(series.len(), self.config.test_fraction)?;

        info!(
            series = %series.name(),
            train_rows = train_len,
            test_rows = test_len,
            features = features.width(),
            horizon = horizon.periods(),
            "fitting boosted trees"
        );

        let (train_rows, test_rows) = rows.split_at(train_len);
        let (train_labels, test_labels) = labels.split_at(train_len);

        let cross_validation = self.cross_validate(train_rows, train_labels)?;
        info!(
            folds = cross_validation.fold_count(),
            test_loss = cross_validation.test.mean,
            "cross-validation finished"
        );

        let iterations = if self.config.early_stopping_rounds.is_some() {
            self.best_iteration((train_rows, train_labels), (test_rows, test_labels))?
        } else {
            self.config.iterations
        };
        info!(best_iteration = iterations, "training final booster");

        let booster = self.train(train_rows, train_labels, iterations)?;
        let fitted = Self::predict(&booster, &rows)?;
        let projected = Self::predict(
            &booster,
            &self.future_rows(features, input.future_features, horizon)?,
        )?;

        let holdout = Holdout {
            train_len,
            pairs: AlignedPairs::new(
                series.dates()[train_len..].to_vec(),
                test_labels.to_vec(),
                fitted[train_len..].to_vec(),
            )?,
        };

        let points = series
            .dates()
            .iter()
            .copied()
            .chain(future_dates(last, horizon))
            .zip(fitted.into_iter().chain(projected))
            .map(|(date, value)| ForecastPoint::new(date, value))
            .collect();

        Ok(ModelFit {
            forecast: ForecastResult::new(self.name.clone(), points, series.len(), horizon)?,
            holdout: Some(holdout),
            cross_validation: Some(cross_validation),
            best_iteration: Some(iterations),
        })
    }
}

fn to_f32(row: &[f64]) -> Vec<f32> {
    row.iter().map(|v| *v as f32).collect()
}

/// Rows and labels at `indices`
fn select<'a>(rows: &[&'a [f64]], labels: &[f64], indices: &[usize]) -> (Vec<&'a [f64]>, Vec<f64>) {
    indices.iter().map(|&i| (rows[i], labels[i])).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoints() {
        let config = BoostingConfig {
            iterations: 60,
            eval_period: 25,
            ..BoostingConfig::default()
        };
        assert_eq!(config.checkpoints(), vec![25, 50, 60]);

        let config = BoostingConfig {
            iterations: 50,
            eval_period: 25,
            ..BoostingConfig::default()
        };
        assert_eq!(config.checkpoints(), vec![25, 50]);
    }

    #[test]
    fn test_fold_bounds() {
        let config = BoostingConfig {
            cv_folds: 11,
            ..BoostingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_loss_names() {
        assert_eq!(RegressionLoss::Rmse.booster_loss(), "SquaredError");
        assert_eq!(RegressionLoss::Mae.booster_loss(), "LAD");
        assert_eq!(RegressionLoss::Mae.to_string(), "MAE");
    }
}
