//! K-fold cross-validation for the boosted regressor

use crate::error::{ForecastError, Result};
use crate::models::boosting::RegressionLoss;
use forecast_math::Summary;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;

/// Validation row indices of each fold.
///
/// Folds are contiguous blocks of `0..n`; the first `n % k` folds hold one
/// extra row. With `shuffle` the rows are permuted by a `StdRng` seeded with
/// `seed` before being cut into folds.
pub fn kfold_indices(n: usize, k: usize, shuffle: bool, seed: u64) -> Result<Vec<Vec<usize>>> {
    if k < 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "Cross-validation needs at least 2 folds, got {}",
            k
        )));
    }
    if n < k {
        return Err(ForecastError::ModelFit(format!(
            "Cannot split {} training rows into {} folds",
            n, k
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    if shuffle {
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
    }

    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        folds.push(order[start..start + size].to_vec());
        start += size;
    }

    Ok(folds)
}

/// Complement of a validation fold within `0..n`, in ascending order
pub fn training_indices(n: usize, validation: &[usize]) -> Vec<usize> {
    let mut held_out = vec![false; n];
    for &i in validation {
        if i < n {
            held_out[i] = true;
        }
    }
    (0..n).filter(|&i| !held_out[i]).collect()
}

/// Loss of one fold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldScore {
    pub fold: usize,
    pub train_loss: f64,
    pub test_loss: f64,
}

/// Per-fold losses and their summaries
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidationReport {
    pub loss: RegressionLoss,
    pub seed: u64,
    pub shuffled: bool,
    /// Boosting iterations per fold
    pub iterations: usize,
    pub folds: Vec<FoldScore>,
    pub train: Summary,
    pub test: Summary,
}

impl CrossValidationReport {
    pub fn new(
        loss: RegressionLoss,
        seed: u64,
        shuffled: bool,
        iterations: usize,
        folds: Vec<FoldScore>,
    ) -> Result<Self> {
        let train: Vec<f64> = folds.iter().map(|f| f.train_loss).collect();
        let test: Vec<f64> = folds.iter().map(|f| f.test_loss).collect();
        Ok(Self {
            loss,
            seed,
            shuffled,
            iterations,
            train: Summary::of(&train)?,
            test: Summary::of(&test)?,
            folds,
        })
    }

    pub fn fold_count(&self) -> usize {
        self.folds.len()
    }
}

impl fmt::Display for CrossValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loss = self.loss.label();
        writeln!(
            f,
            "{}-fold cross-validation (seed {}, shuffle {}, {} iterations)",
            self.folds.len(),
            self.seed,
            self.shuffled,
            self.iterations
        )?;
        writeln!(f, "{:>6} {:>14} {:>14}", "fold", format!("train-{}", loss), format!("test-{}", loss))?;
        for score in &self.folds {
            writeln!(
                f,
                "{:>6} {:>14.4} {:>14.4}",
                score.fold, score.train_loss, score.test_loss
            )?;
        }
        writeln!(
            f,
            "train-{}: {:.4} ± {:.4}",
            loss, self.train.mean, self.train.std_dev
        )?;
        write!(
            f,
            "test-{}: {:.4} ± {:.4}",
            loss, self.test.mean, self.test.std_dev
        )
    }
}
