//! Dataset loading, cleaning and band derivation.
//!
//! The dataset is a delimiter separated file with a header row. Cells are kept
//! as strings until the feature encoder decides how each column is encoded.

use crate::bucketing::{AgeBand, ChildrenBand, CosmeticBand};
use crate::error::{EstimatorError, EstimatorResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use tracing::{debug, info};

/// Dataset header names
pub mod columns {
    pub const OWNERSHIP: &str = "Ev Durumu";
    pub const PET_OWNER: &str = "Evcil Hayvan Sahibi";
    pub const REGION: &str = "Bolge";
    pub const HOUSE_AGE: &str = "Evin Yasi";
    pub const COSMETIC_SCORE: &str = "Evin Kozmetik Durumu";
    pub const CHILDREN: &str = "Cocuk Sayisi";
    pub const EXPENSE: &str = "Masraf";

    pub const AGE_BAND: &str = "age_band";
    pub const CHILDREN_BAND: &str = "children_band";
    pub const COSMETIC_BAND: &str = "cosmetic_band";

    /// Columns the trainer cannot work without
    pub const REQUIRED: [&str; 7] = [
        OWNERSHIP,
        PET_OWNER,
        REGION,
        HOUSE_AGE,
        COSMETIC_SCORE,
        CHILDREN,
        EXPENSE,
    ];
}

/// In-memory table of string cells with named columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table; every row must have one cell per column
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> EstimatorResult<Self> {
        if let Some(idx) = rows.iter().position(|row| row.len() != columns.len()) {
            return Err(EstimatorError::DataUnavailable(format!(
                "row {idx} has {} fields, expected {}",
                rows[idx].len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Single-row table built from (column, value) pairs
    pub fn single_row<I, K, V>(cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (columns, row): (Vec<String>, Vec<String>) = cells
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns,
            rows: vec![row],
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    /// Fail with `DataUnavailable` naming the first absent column
    pub fn require_columns(&self, names: &[&str]) -> EstimatorResult<()> {
        match names.iter().find(|name| self.column_index(name).is_none()) {
            Some(missing) => Err(EstimatorError::DataUnavailable(format!(
                "missing column '{missing}' (found: {})",
                self.columns.join(", ")
            ))),
            None => Ok(()),
        }
    }

    /// Remove rows with any missing cell (see [`is_missing`]). Returns how
    /// many rows were dropped.
    pub fn drop_missing(&mut self) -> usize {
        let before = self.rows.len();
        self.rows
            .retain(|row| !row.iter().any(|cell| is_missing(cell)));
        before - self.rows.len()
    }

    /// Append a column computed from each row
    pub fn push_column<F>(&mut self, name: &str, mut value: F) -> EstimatorResult<()>
    where
        F: FnMut(usize, &[String]) -> EstimatorResult<String>,
    {
        let mut cells = Vec::with_capacity(self.rows.len());
        for (idx, row) in self.rows.iter().enumerate() {
            cells.push(value(idx, row)?);
        }
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        self.columns.push(name.to_string());
        Ok(())
    }

    /// Drop the named columns; unknown names are ignored
    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();
        let retain = |cells: &mut Vec<String>| {
            let mut flags = keep.iter();
            cells.retain(|_| *flags.next().unwrap_or(&true));
        };
        retain(&mut self.columns);
        for row in &mut self.rows {
            retain(row);
        }
    }

    /// Parse one column as numbers, naming the offending row on failure
    pub fn numeric_column(&self, name: &str) -> EstimatorResult<Vec<f64>> {
        let idx = self.column_index(name).ok_or_else(|| {
            EstimatorError::DataUnavailable(format!("missing column '{name}'"))
        })?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| parse_number(&cells[idx], row, name))
            .collect()
    }
}

/// Cell values read as "no value", on top of the empty cell
const MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a raw cell holds no value
pub fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || MISSING_TOKENS.contains(&cell)
}

/// Parse a numeric cell; a decimal comma is accepted as well
pub(crate) fn parse_number(cell: &str, row: usize, column: &str) -> EstimatorResult<f64> {
    let cell = cell.trim();
    cell.parse::<f64>()
        .or_else(|_| cell.replace(',', ".").parse::<f64>())
        .map_err(|_| {
            EstimatorError::DataUnavailable(format!(
                "row {row}: column '{column}' holds non-numeric value '{cell}'"
            ))
        })
}

fn parse_whole(cell: &str, row: usize, column: &str) -> EstimatorResult<u32> {
    let value = parse_number(cell, row, column)?;
    if !value.is_finite() || value < 0.0 {
        return Err(EstimatorError::DataUnavailable(format!(
            "row {row}: column '{column}' must be a non-negative number, got '{}'",
            cell.trim()
        )));
    }
    // Floor division, the way the decade bands are defined.
    Ok(value.floor().min(u32::MAX as f64) as u32)
}

/// Read a delimiter separated dataset with a header row.
///
/// Short rows are padded with empty cells so that `drop_missing` removes
/// them; a file read with the wrong delimiter shows up later as missing
/// columns.
pub fn load_dataset<P: AsRef<Path>>(path: P, delimiter: u8) -> EstimatorResult<Table> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EstimatorError::DataUnavailable(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| unreadable(path, e))?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| unreadable(path, e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| unreadable(path, e))?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(columns.len(), String::new());
        rows.push(row);
    }

    info!(
        path = %path.display(),
        rows = rows.len(),
        columns = columns.len(),
        "Dataset loaded"
    );

    Table::new(columns, rows)
}

fn unreadable(path: &Path, err: csv::Error) -> EstimatorError {
    EstimatorError::DataUnavailable(format!("cannot read {}: {err}", path.display()))
}

/// Sum of the label column, after checking that it exists. Missing cells
/// are skipped, so any file the trainer accepts passes this check.
pub fn expense_total(table: &Table) -> EstimatorResult<f64> {
    let cells = table.column(columns::EXPENSE).ok_or_else(|| {
        EstimatorError::DataUnavailable(format!(
            "missing column '{}' (found: {})",
            columns::EXPENSE,
            table.columns().join(", ")
        ))
    })?;
    let mut total = 0.0;
    for (row, cell) in cells.enumerate() {
        if !is_missing(cell) {
            total += parse_number(cell, row, columns::EXPENSE)?;
        }
    }
    Ok(total)
}

/// Append the three band columns derived from the raw numeric fields
pub fn derive_bands(table: &mut Table) -> EstimatorResult<()> {
    table.require_columns(&[columns::HOUSE_AGE, columns::COSMETIC_SCORE, columns::CHILDREN])?;

    let cosmetic = table.column_index(columns::COSMETIC_SCORE).unwrap_or_default();
    table.push_column(columns::COSMETIC_BAND, |row, cells| {
        let score = parse_number(&cells[cosmetic], row, columns::COSMETIC_SCORE)?;
        Ok(CosmeticBand::from_score(score).label().to_string())
    })?;

    let age = table.column_index(columns::HOUSE_AGE).unwrap_or_default();
    table.push_column(columns::AGE_BAND, |row, cells| {
        let years = parse_whole(&cells[age], row, columns::HOUSE_AGE)?;
        Ok(AgeBand::from_years(years).label().to_string())
    })?;

    let children = table.column_index(columns::CHILDREN).unwrap_or_default();
    table.push_column(columns::CHILDREN_BAND, |row, cells| {
        let count = parse_number(&cells[children], row, columns::CHILDREN)?;
        Ok(ChildrenBand::from_count(count).label().to_string())
    })?;

    debug!(rows = table.len(), "Derived band columns");
    Ok(())
}

/// Row indices of a seeded train/test split.
///
/// The test partition holds `ceil(n * test_fraction)` rows taken from the
/// front of a seeded shuffle; the rest form the training partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> EstimatorResult<Split> {
    let n_test = (n_rows as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(EstimatorError::Training(format!(
            "cannot split {n_rows} rows with test fraction {test_fraction}"
        )));
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(Split {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Ev Durumu;Evcil Hayvan Sahibi;Bolge;Evin Yasi;Evin Kozmetik Durumu;Cocuk Sayisi;Masraf";

    fn write_dataset(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_load_dataset_reads_semicolon_file() {
        let file = write_dataset(&[
            HEADER,
            "Ev Sahibi;yes;Batı Bölgesi;12;18.5;1;0.42",
            "Kiralık;no;Doğu ve Güneydoğu Anadolu Bölgesi;104;31;3;0.77",
        ]);
        let table = load_dataset(file.path(), b';').unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns().len(), 7);
        table.require_columns(&columns::REQUIRED).unwrap();
        assert!((expense_total(&table).unwrap() - 1.19).abs() < 1e-12);
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let err = load_dataset("no/such/file.csv", b';').unwrap_err();
        assert!(matches!(err, EstimatorError::DataUnavailable(_)));
    }

    #[test]
    fn test_wrong_delimiter_surfaces_as_missing_column() {
        let file = write_dataset(&[&HEADER.replace(';', ","), "Ev Sahibi,yes,Batı,12,18.5,1,0.42"]);
        let table = load_dataset(file.path(), b';').unwrap();
        let err = table.require_columns(&columns::REQUIRED).unwrap_err();
        assert!(matches!(err, EstimatorError::DataUnavailable(_)));
        assert!(err.to_string().contains("Ev Durumu"));
    }

    #[test]
    fn test_drop_missing_removes_blank_and_short_rows() {
        let file = write_dataset(&[
            HEADER,
            "Ev Sahibi;yes;Batı Bölgesi;12;18.5;1;0.42",
            "Kiralık;;Batı Bölgesi;40;22;2;0.51",
            "Kiralık;no;Batı Bölgesi",
        ]);
        let mut table = load_dataset(file.path(), b';').unwrap();
        assert_eq!(table.drop_missing(), 2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_drop_missing_recognises_na_tokens() {
        let file = write_dataset(&[
            HEADER,
            "Ev Sahibi;yes;Batı Bölgesi;12;18.5;1;0.42",
            "Kiralık;no;Batı Bölgesi;NA;15;2;0.5",
            "Kiralık;no;NaN;40;22;2;0.51",
            "Ev Sahibi;no;Batı Bölgesi;40;22;2; null ",
            "Ev Sahibi;no;Batı Bölgesi;40;#N/A;2;0.3",
            "Ev Sahibi;N/A;Batı Bölgesi;40;22;2;0.3",
        ]);
        let mut table = load_dataset(file.path(), b';').unwrap();
        assert_eq!(table.drop_missing(), 5);
        assert_eq!(table.len(), 1);
        derive_bands(&mut table).unwrap();

        assert!(is_missing("nan"));
        assert!(is_missing("  "));
        assert!(!is_missing("Nancy"));
        assert!(!is_missing("0"));
    }

    #[test]
    fn test_expense_total_skips_missing_labels() {
        let file = write_dataset(&[
            HEADER,
            "Ev Sahibi;yes;Batı Bölgesi;12;18.5;1;0.42",
            "Kiralık;no;Batı Bölgesi;24;15;2;",
            "Kiralık;no;Batı Bölgesi;24;15;2;NaN",
            "Kiralık;no;Batı Bölgesi;24;15;2;0.08",
        ]);
        let table = load_dataset(file.path(), b';').unwrap();
        assert!((expense_total(&table).unwrap() - 0.5).abs() < 1e-12);

        let unlabeled = Table::single_row([(columns::OWNERSHIP, "Kiralık")]);
        let err = expense_total(&unlabeled).unwrap_err();
        assert!(matches!(err, EstimatorError::DataUnavailable(_)));
    }

    #[test]
    fn test_fractional_children_are_compared_as_given() {
        let mut table = Table::new(
            vec![
                columns::HOUSE_AGE.to_string(),
                columns::COSMETIC_SCORE.to_string(),
                columns::CHILDREN.to_string(),
            ],
            vec![
                vec!["10".into(), "20".into(), "2.5".into()],
                vec!["10".into(), "20".into(), "1.5".into()],
                vec!["10".into(), "20".into(), "2,0".into()],
            ],
        )
        .unwrap();
        derive_bands(&mut table).unwrap();
        let children: Vec<&str> = table.column(columns::CHILDREN_BAND).unwrap().collect();
        assert_eq!(children, ["Low", "High", "Normal"]);
    }

    #[test]
    fn test_derive_bands() {
        let mut table = Table::new(
            vec![
                columns::HOUSE_AGE.to_string(),
                columns::COSMETIC_SCORE.to_string(),
                columns::CHILDREN.to_string(),
            ],
            vec![
                vec!["7".into(), "19,9".into(), "2".into()],
                vec!["125".into(), "45".into(), "0".into()],
            ],
        )
        .unwrap();

        derive_bands(&mut table).unwrap();
        let age: Vec<&str> = table.column(columns::AGE_BAND).unwrap().collect();
        let cosmetic: Vec<&str> = table.column(columns::COSMETIC_BAND).unwrap().collect();
        let children: Vec<&str> = table.column(columns::CHILDREN_BAND).unwrap().collect();
        assert_eq!(age, ["0-9", "100+"]);
        assert_eq!(cosmetic, ["Normal", "Bad"]);
        assert_eq!(children, ["Normal", "High"]);
    }

    #[test]
    fn test_derive_bands_rejects_garbage() {
        let mut table = Table::new(
            vec![
                columns::HOUSE_AGE.to_string(),
                columns::COSMETIC_SCORE.to_string(),
                columns::CHILDREN.to_string(),
            ],
            vec![vec!["old".into(), "10".into(), "1".into()]],
        )
        .unwrap();
        let err = derive_bands(&mut table).unwrap_err();
        assert!(err.to_string().contains("Evin Yasi"));
    }

    #[test]
    fn test_drop_columns_keeps_order() {
        let mut table = Table::single_row([("a", "1"), ("b", "2"), ("c", "3")]);
        table.drop_columns(&["b", "zzz"]);
        assert_eq!(table.columns(), ["a", "c"]);
        assert_eq!(table.rows()[0], ["1", "3"]);
    }

    #[test]
    fn test_split_is_seeded_and_disjoint() {
        let a = train_test_split(10, 0.2, 0).unwrap();
        let b = train_test_split(10, 0.2, 0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.test.len(), 2);
        assert_eq!(a.train.len(), 8);

        let mut all: Vec<usize> = a.train.iter().chain(&a.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_rounds_test_size_up() {
        let split = train_test_split(11, 0.2, 3).unwrap();
        assert_eq!(split.test.len(), 3);
        assert!(train_test_split(1, 0.2, 0).is_err());
    }
}
