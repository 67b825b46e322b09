//! Schema reconciliation between training-time and serving-time features.
//!
//! The model is position-sensitive: a column in the wrong slot silently
//! corrupts predictions. Every serving row is therefore forced into the
//! persisted column list before it reaches the model.
//!
//! The vocabulary is closed. A category that never appeared during training
//! has no column in the schema, so its indicator is dropped and the row looks
//! as if no category of that field was set.

use crate::feature_encoder::FeatureMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Ordered feature-column list recorded at training time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema(Vec<String>);

/// Reconciled matrix plus what had to change to get there
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub matrix: FeatureMatrix,
    /// Schema columns missing from the input, filled with zeros
    pub zero_filled: Vec<String>,
    /// Input columns unknown to the schema, discarded
    pub dropped: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    /// Schema of record for a freshly encoded training matrix
    pub fn from_matrix(matrix: &FeatureMatrix) -> Self {
        Self(matrix.columns().to_vec())
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.iter().any(|c| c == column)
    }

    /// Force `matrix` into exactly this schema's columns and order.
    ///
    /// Missing columns are zero-filled, unknown columns dropped, the rest
    /// reordered. Applying it to its own output changes nothing.
    pub fn reconcile(&self, matrix: &FeatureMatrix) -> Reconciled {
        let positions: HashMap<&str, usize> = matrix
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();

        let sources: Vec<Option<usize>> = self
            .0
            .iter()
            .map(|column| positions.get(column.as_str()).copied())
            .collect();

        let zero_filled: Vec<String> = self
            .0
            .iter()
            .zip(&sources)
            .filter(|(_, source)| source.is_none())
            .map(|(column, _)| column.clone())
            .collect();

        let dropped: Vec<String> = matrix
            .columns()
            .iter()
            .filter(|column| !self.contains(column))
            .cloned()
            .collect();

        if !dropped.is_empty() {
            warn!(
                dropped = ?dropped,
                "Input columns unknown to the trained schema were discarded"
            );
        }
        debug!(
            zero_filled = zero_filled.len(),
            dropped = dropped.len(),
            schema_len = self.len(),
            "Reconciled feature matrix"
        );

        let rows = matrix
            .rows()
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|source| source.map_or(0.0, |idx| row[idx]))
                    .collect()
            })
            .collect();

        Reconciled {
            matrix: FeatureMatrix::new(self.0.clone(), rows),
            zero_filled,
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Table;
    use crate::feature_encoder::FeatureEncoder;

    fn training_schema() -> FeatureSchema {
        let training = Table::new(
            vec!["Bolge".to_string(), "Evcil Hayvan Sahibi".to_string()],
            vec![
                vec!["West".into(), "yes".into()],
                vec!["East".into(), "no".into()],
                vec!["North".into(), "no".into()],
            ],
        )
        .unwrap();
        FeatureSchema::from_matrix(&FeatureEncoder::new().encode(&training))
    }

    #[test]
    fn test_zero_fills_and_orders_known_row() {
        let schema = training_schema();
        let row = Table::single_row([("Evcil Hayvan Sahibi", "1"), ("Bolge", "North")]);
        let encoded = FeatureEncoder::new().encode(&row);

        let out = schema.reconcile(&encoded);
        assert_eq!(out.matrix.columns(), schema.columns());
        assert_eq!(out.matrix.n_columns(), schema.len());
        assert_eq!(out.matrix.rows()[0], [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(out.zero_filled, ["Bolge_West", "Bolge_East"]);
        assert!(out.dropped.is_empty());
        assert!(out.matrix.rows()[0].iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_unseen_category_contributes_no_column() {
        let schema = training_schema();
        let row = Table::single_row([("Bolge", "South"), ("Evcil Hayvan Sahibi", "0")]);
        let encoded = FeatureEncoder::new().encode(&row);

        let out = schema.reconcile(&encoded);
        assert_eq!(out.dropped, ["Bolge_South"]);
        assert!(!out.matrix.columns().contains(&"Bolge_South".to_string()));
        assert_eq!(out.matrix.rows()[0], [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let schema = training_schema();
        let row = Table::single_row([("Bolge", "East"), ("Extra", "value")]);
        let once = schema.reconcile(&FeatureEncoder::new().encode(&row));
        let twice = schema.reconcile(&once.matrix);

        assert_eq!(once.matrix, twice.matrix);
        assert!(twice.zero_filled.is_empty());
        assert!(twice.dropped.is_empty());
    }

    #[test]
    fn test_multi_row_reconcile() {
        let schema = FeatureSchema::new(vec!["b".into(), "a".into()]);
        let matrix = FeatureMatrix::new(
            vec!["a".into(), "c".into()],
            vec![vec![1.0, 5.0], vec![0.0, 7.0]],
        );
        let out = schema.reconcile(&matrix);
        assert_eq!(out.matrix.rows(), [vec![0.0, 1.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn test_schema_serializes_as_plain_list() {
        let schema = FeatureSchema::new(vec!["a".into(), "b".into()]);
        assert_eq!(serde_json::to_string(&schema).unwrap(), r#"["a","b"]"#);
    }
}
