//! Min-max normalization

use serde::{Deserialize, Serialize};

/// Per-column min-max scaler mapping observed values onto [0, 1].
///
/// A constant column has no range; it is shifted by its minimum and left
/// unscaled, so every training value maps to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit over row-major data. Returns `None` when there are no rows.
    pub fn fit(rows: &[Vec<f64>]) -> Option<Self> {
        let first = rows.first()?;
        let mut min = first.clone();
        let mut max = first.clone();
        for row in &rows[1..] {
            for (col, &value) in row.iter().enumerate() {
                min[col] = min[col].min(value);
                max[col] = max[col].max(value);
            }
        }
        Some(Self { min, max })
    }

    /// Fit over a single column of values
    pub fn fit_column(values: &[f64]) -> Option<Self> {
        let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v]).collect();
        Self::fit(&rows)
    }

    pub fn n_features(&self) -> usize {
        self.min.len()
    }

    fn scale(&self, col: usize) -> f64 {
        let range = self.max[col] - self.min[col];
        if range == 0.0 {
            1.0
        } else {
            range
        }
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .enumerate()
            .map(|(col, &value)| (value - self.min[col]) / self.scale(col))
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    pub fn inverse_transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .enumerate()
            .map(|(col, &value)| value * self.scale(col) + self.min[col])
            .collect()
    }

    /// Scale a single value of a one-column scaler
    pub fn transform_value(&self, value: f64) -> f64 {
        (value - self.min[0]) / self.scale(0)
    }

    /// Undo `transform_value`
    pub fn inverse_transform_value(&self, value: f64) -> f64 {
        value * self.scale(0) + self.min[0]
    }

    /// Fit and transform in one step
    pub fn fit_transform(rows: &[Vec<f64>]) -> Option<(Self, Vec<Vec<f64>>)> {
        let scaler = Self::fit(rows)?;
        let scaled = scaler.transform(rows);
        Some((scaler, scaled))
    }
}
