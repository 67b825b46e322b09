//! Regression metrics for the held-out partition.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Goodness-of-fit statistics over paired actual/predicted values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Number of evaluated pairs
    pub count: usize,
    /// Coefficient of determination
    pub r2: f64,
    /// Share of target variance explained, ignoring a constant bias
    pub explained_variance: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
}

impl RegressionMetrics {
    /// Compute metrics over equally long slices. Empty input yields the
    /// all-zero default.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return Self::default();
        }
        let actual = &actual[..n];
        let predicted = &predicted[..n];
        let count = n as f64;

        let mean = actual.iter().sum::<f64>() / count;
        let residuals: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();

        let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
        let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
        let abs_err: f64 = residuals.iter().map(|r| r.abs()).sum();

        let residual_mean = residuals.iter().sum::<f64>() / count;
        let residual_var =
            residuals.iter().map(|r| (r - residual_mean).powi(2)).sum::<f64>() / count;
        let target_var = ss_tot / count;

        Self {
            count: n,
            r2: ratio_score(ss_res, ss_tot),
            explained_variance: ratio_score(residual_var, target_var),
            mae: abs_err / count,
            rmse: (ss_res / count).sqrt(),
        }
    }

    /// Log a summary of the metrics
    pub fn print_summary(&self) {
        info!("╔══════════════════════════════════════════════╗");
        info!("║        EXPENSE MODEL - TEST PARTITION        ║");
        info!("╠══════════════════════════════════════════════╣");
        info!("║ Samples:             {:>10}              ║", self.count);
        info!("║ R²:                  {:>10.4}              ║", self.r2);
        info!("║ Explained variance:  {:>10.4}              ║", self.explained_variance);
        info!("║ MAE:                 {:>10.4}              ║", self.mae);
        info!("║ RMSE:                {:>10.4}              ║", self.rmse);
        info!("╚══════════════════════════════════════════════╝");
    }
}

/// `1 - numerator / denominator`, with a constant target scoring 1 when
/// fitted perfectly and 0 otherwise
fn ratio_score(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        if numerator == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_fit() {
        let y = [0.1, 0.4, 0.9];
        let m = RegressionMetrics::compute(&y, &y);
        assert_eq!(m.count, 3);
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.explained_variance, 1.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
    }

    #[test]
    fn test_mean_predictor_scores_zero() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [2.0, 2.0, 2.0];
        let m = RegressionMetrics::compute(&actual, &predicted);
        assert!(m.r2.abs() < 1e-12);
        assert!((m.mae - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_bias_hurts_r2_not_explained_variance() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [2.0, 3.0, 4.0];
        let m = RegressionMetrics::compute(&actual, &predicted);
        assert!((m.explained_variance - 1.0).abs() < 1e-12);
        assert!(m.r2 < 0.0);
        assert!((m.rmse - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(RegressionMetrics::compute(&[], &[]), RegressionMetrics::default());
    }
}
