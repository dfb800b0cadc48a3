//! Tabular dataset loading, column typing and missing-value imputation

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::types::{AppError, AppResult};

/// Fill value for a non-numeric column that has no values at all
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Cell contents treated as missing, as most CSV readers do
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Raw table as read from CSV. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl TabularDataset {
    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| AppError::Dataset(format!("Failed to read header row: {}", e)))?
            .iter()
            .map(|h| h.to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(AppError::Dataset("Dataset has no columns".to_string()));
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| AppError::Dataset(format!("Malformed row: {}", e)))?;
            if record.len() > headers.len() {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                return Err(AppError::Dataset(format!(
                    "Expected {} fields in line {}, saw {}",
                    headers.len(),
                    line,
                    record.len()
                )));
            }
            let row = (0..headers.len())
                .map(|idx| {
                    record
                        .get(idx)
                        .filter(|cell| !is_missing(cell))
                        .map(|cell| cell.to_string())
                })
                .collect();
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn from_csv_str(text: &str) -> AppResult<Self> {
        Self::from_reader(text.as_bytes())
    }

    pub fn from_path(path: &Path) -> AppResult<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| AppError::Dataset(format!("Failed to open {}: {}", path.display(), e)))?;
        Self::from_reader(file)
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First `n` rows, for previews
    pub fn head(&self, n: usize) -> &[Vec<Option<String>>] {
        &self.rows[..n.min(self.rows.len())]
    }

    fn column(&self, idx: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(move |row| row.get(idx).and_then(|c| c.as_deref()))
    }

    /// A column is numeric when it has values and every one parses as a number.
    pub fn column_kind(&self, idx: usize) -> ColumnKind {
        let mut present = self.column(idx).flatten().peekable();
        if present.peek().is_none() {
            return ColumnKind::Categorical;
        }
        if present.all(|cell| cell.parse::<f64>().is_ok()) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }

    /// Impute missing values column by column.
    ///
    /// Numeric columns take the mean of the present values. Other columns
    /// take their most frequent value (smallest value on ties), or
    /// [`UNKNOWN_CATEGORY`] when nothing is present.
    pub fn clean(&self) -> CleanedDataset {
        let columns = self
            .headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let data = match self.column_kind(idx) {
                    ColumnKind::Numeric => {
                        let values: Vec<Option<f64>> = self
                            .column(idx)
                            .map(|cell| cell.and_then(|c| c.parse::<f64>().ok()))
                            .collect();
                        let present: Vec<f64> = values.iter().flatten().copied().collect();
                        let mean = present.iter().sum::<f64>() / present.len() as f64;
                        ColumnData::Numeric(values.into_iter().map(|v| v.unwrap_or(mean)).collect())
                    }
                    ColumnKind::Categorical => {
                        let fill = mode(self.column(idx).flatten())
                            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
                        ColumnData::Categorical(
                            self.column(idx)
                                .map(|cell| cell.map(str::to_string).unwrap_or_else(|| fill.clone()))
                                .collect(),
                        )
                    }
                };
                CleanedColumn {
                    name: name.clone(),
                    data,
                }
            })
            .collect();

        CleanedDataset {
            columns,
            row_count: self.rows.len(),
        }
    }
}

/// Most frequent value; ties go to the smallest
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let best = counts.values().copied().max()?;
    counts
        .into_iter()
        .find(|(_, count)| *count == best)
        .map(|(value, _)| value.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedColumn {
    pub name: String,
    pub data: ColumnData,
}

impl CleanedColumn {
    /// Display form of one cell
    pub fn cell(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(values) => values.get(row).map(|v| format_number(*v)),
            ColumnData::Categorical(values) => values.get(row).cloned(),
        }
    }
}

/// Dataset with every missing value filled
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedDataset {
    pub columns: Vec<CleanedColumn>,
    pub row_count: usize,
}

impl CleanedDataset {
    pub fn column(&self, name: &str) -> Option<&CleanedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().filter_map(|c| match &c.data {
            ColumnData::Numeric(values) => Some((c.name.as_str(), values.as_slice())),
            ColumnData::Categorical(_) => None,
        })
    }

    /// First `n` rows rendered as strings
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        (0..n.min(self.row_count))
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| c.cell(row).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
