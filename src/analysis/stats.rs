//! Descriptive statistics over a cleaned dataset

use std::collections::BTreeMap;

use super::dataset::{CleanedDataset, ColumnData};

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, NaN below two values
    pub std_dev: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: String,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DescriptiveStatistics {
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
}

impl DescriptiveStatistics {
    pub fn from_cleaned(dataset: &CleanedDataset) -> Self {
        let mut stats = Self::default();
        for column in &dataset.columns {
            match &column.data {
                ColumnData::Numeric(values) => {
                    if let Some(summary) = summarize_numeric(&column.name, values) {
                        stats.numeric.push(summary);
                    }
                }
                ColumnData::Categorical(values) => {
                    if let Some(summary) = summarize_categorical(&column.name, values) {
                        stats.categorical.push(summary);
                    }
                }
            }
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }

    /// Fixed-width table with one row per statistic and one column per
    /// dataset column. Numeric columns are shown when there are any,
    /// otherwise the categorical summary.
    pub fn render(&self) -> String {
        if !self.numeric.is_empty() {
            let headers: Vec<&str> = self.numeric.iter().map(|s| s.column.as_str()).collect();
            let rows: Vec<(&str, Vec<String>)> = vec![
                ("count", self.numeric.iter().map(|s| fixed(s.count as f64)).collect()),
                ("mean", self.numeric.iter().map(|s| fixed(s.mean)).collect()),
                ("std", self.numeric.iter().map(|s| fixed(s.std_dev)).collect()),
                ("min", self.numeric.iter().map(|s| fixed(s.min)).collect()),
                ("25%", self.numeric.iter().map(|s| fixed(s.q25)).collect()),
                ("50%", self.numeric.iter().map(|s| fixed(s.median)).collect()),
                ("75%", self.numeric.iter().map(|s| fixed(s.q75)).collect()),
                ("max", self.numeric.iter().map(|s| fixed(s.max)).collect()),
            ];
            render_table(&headers, &rows)
        } else if !self.categorical.is_empty() {
            let headers: Vec<&str> = self.categorical.iter().map(|s| s.column.as_str()).collect();
            let rows: Vec<(&str, Vec<String>)> = vec![
                ("count", self.categorical.iter().map(|s| s.count.to_string()).collect()),
                ("unique", self.categorical.iter().map(|s| s.unique.to_string()).collect()),
                ("top", self.categorical.iter().map(|s| s.top.clone()).collect()),
                ("freq", self.categorical.iter().map(|s| s.freq.to_string()).collect()),
            ];
            render_table(&headers, &rows)
        } else {
            "Empty dataset".to_string()
        }
    }
}

fn fixed(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", value)
    }
}

fn render_table(headers: &[&str], rows: &[(&str, Vec<String>)]) -> String {
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .filter_map(|(_, cells)| cells.get(idx).map(|c| c.chars().count()))
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&" ".repeat(label_width));
    for (header, width) in headers.iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", header, width = width));
    }
    for (label, cells) in rows {
        out.push('\n');
        out.push_str(&format!("{:<width$}", label, width = label_width));
        for (cell, width) in cells.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", cell, width = width));
        }
    }
    out
}

fn summarize_numeric(column: &str, values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;

    Some(NumericSummary {
        column: column.to_string(),
        count,
        mean,
        std_dev: std_dev(&sorted, mean),
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    variance.sqrt()
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

fn summarize_categorical(column: &str, values: &[String]) -> Option<CategoricalSummary> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    let freq = counts.values().copied().max()?;
    let top = counts
        .iter()
        .find(|(_, count)| **count == freq)
        .map(|(value, _)| value.to_string())?;

    Some(CategoricalSummary {
        column: column.to_string(),
        count: values.len(),
        unique: counts.len(),
        top,
        freq,
    })
}
