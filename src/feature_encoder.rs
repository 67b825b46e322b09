//! Feature encoding for the expense model.
//!
//! Turns a table of string cells into a purely numeric matrix. The column
//! list produced at training time becomes the schema that the serving path
//! reconciles against, so the column order must be reproducible.

use crate::dataset::Table;
use std::collections::HashMap;
use tracing::trace;

/// How a source column is represented in the feature matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every cell is `yes` or `no`; coerced to 1/0 and not expanded
    Binary,
    /// Every cell parses as a number; passed through unchanged
    Numeric,
    /// Anything else; one indicator column per category
    Categorical,
}

/// Numeric feature matrix with named columns, row-major
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (`row`, column `name`), if the column exists
    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r[idx])
    }
}

/// Feature encoder that transforms raw tables into model input features.
///
/// Column order follows the input field order; within a categorical field,
/// categories appear in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Decide how a column of cells is encoded
    pub fn classify<'a, I>(cells: I) -> ColumnKind
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut binary = true;
        let mut numeric = true;
        for cell in cells {
            let cell = cell.trim();
            binary &= cell == "yes" || cell == "no";
            numeric &= cell.parse::<f64>().is_ok();
            if !binary && !numeric {
                return ColumnKind::Categorical;
            }
        }
        if binary {
            ColumnKind::Binary
        } else {
            ColumnKind::Numeric
        }
    }

    /// Name of the indicator column for `category` of `field`
    pub fn indicator_name(field: &str, category: &str) -> String {
        format!("{field}_{category}")
    }

    /// Encode every column of `table`
    pub fn encode(&self, table: &Table) -> FeatureMatrix {
        let n_rows = table.len();
        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<f64>> = vec![Vec::new(); n_rows];

        for (field_idx, field) in table.columns().iter().enumerate() {
            let cells: Vec<&str> = table.rows().iter().map(|r| r[field_idx].as_str()).collect();

            match Self::classify(cells.iter().copied()) {
                ColumnKind::Binary => {
                    columns.push(field.clone());
                    for (row, cell) in rows.iter_mut().zip(&cells) {
                        row.push(if cell.trim() == "yes" { 1.0 } else { 0.0 });
                    }
                }
                ColumnKind::Numeric => {
                    columns.push(field.clone());
                    for (row, cell) in rows.iter_mut().zip(&cells) {
                        row.push(cell.trim().parse::<f64>().unwrap_or_default());
                    }
                }
                ColumnKind::Categorical => {
                    let mut categories: Vec<&str> = Vec::new();
                    let mut slot: HashMap<&str, usize> = HashMap::new();
                    for cell in &cells {
                        let cell = cell.trim();
                        if !slot.contains_key(cell) {
                            slot.insert(cell, categories.len());
                            categories.push(cell);
                        }
                    }

                    columns.extend(
                        categories
                            .iter()
                            .map(|category| Self::indicator_name(field, category)),
                    );
                    for (row, cell) in rows.iter_mut().zip(&cells) {
                        let hot = slot[cell.trim()];
                        row.extend((0..categories.len()).map(|i| if i == hot { 1.0 } else { 0.0 }));
                    }
                    trace!(field = %field, categories = categories.len(), "One-hot encoded field");
                }
            }
        }

        FeatureMatrix::new(columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(FeatureEncoder::classify(["yes", "no", "yes"]), ColumnKind::Binary);
        assert_eq!(FeatureEncoder::classify(["1", "0"]), ColumnKind::Numeric);
        assert_eq!(FeatureEncoder::classify(["yes", "maybe"]), ColumnKind::Categorical);
        assert_eq!(FeatureEncoder::classify(["0-9", "100+"]), ColumnKind::Categorical);
    }

    #[test]
    fn test_one_hot_uses_first_seen_order() {
        let t = table(
            &["Bolge", "Evcil Hayvan Sahibi"],
            &[&["West", "yes"], &["East", "no"], &["West", "no"], &["North", "yes"]],
        );
        let m = FeatureEncoder::new().encode(&t);

        assert_eq!(
            m.columns(),
            ["Bolge_West", "Bolge_East", "Bolge_North", "Evcil Hayvan Sahibi"]
        );
        assert_eq!(m.rows()[0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.rows()[1], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(m.rows()[3], [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_each_row_has_one_hot_per_field() {
        let t = table(
            &["a", "b"],
            &[&["x", "p"], &["y", "q"], &["z", "p"]],
        );
        let m = FeatureEncoder::new().encode(&t);
        for row in m.rows() {
            assert_eq!(row.iter().sum::<f64>(), 2.0);
            assert!(row.iter().all(|&v| v == 0.0 || v == 1.0));
        }
    }

    #[test]
    fn test_encoding_is_reproducible() {
        let t = table(&["a", "n"], &[&["x", "1.5"], &["y", "2"]]);
        let first = FeatureEncoder::new().encode(&t);
        let second = FeatureEncoder::new().encode(&t);
        assert_eq!(first, second);
        assert_eq!(first.value(1, "n"), Some(2.0));
        assert_eq!(first.value(0, "a_x"), Some(1.0));
    }

    #[test]
    fn test_single_row_prefilled_flag_is_numeric() {
        let t = Table::single_row([("Ev Durumu", "Kiralık"), ("Evcil Hayvan Sahibi", "1")]);
        let m = FeatureEncoder::new().encode(&t);
        assert_eq!(m.columns(), ["Ev Durumu_Kiralık", "Evcil Hayvan Sahibi"]);
        assert_eq!(m.rows()[0], [1.0, 1.0]);
    }
}
