//! Tabular analysis
//!
//! Dataset loading, per-column imputation, descriptive statistics and a
//! bar-chart export of the numeric columns.

pub mod dataset;
pub mod stats;

pub use dataset::{
    CleanedColumn, CleanedDataset, ColumnData, ColumnKind, TabularDataset, UNKNOWN_CATEGORY,
};
pub use stats::{CategoricalSummary, DescriptiveStatistics, NumericSummary};

use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

/// Render every numeric column as grouped bars, one group per row.
///
/// Returns `Ok(false)` without touching `output_path` when the dataset has
/// no numeric columns or no rows.
pub fn write_bar_chart(output_path: &Path, dataset: &CleanedDataset) -> Result<bool> {
    let series: Vec<(&str, &[f64])> = dataset.numeric_columns().collect();
    if series.is_empty() || dataset.row_count == 0 {
        return Ok(false);
    }

    let rows = dataset.row_count;
    let (mut low, mut high) = (0f64, 0f64);
    for (_, values) in &series {
        for v in values.iter() {
            low = low.min(*v);
            high = high.max(*v);
        }
    }
    if low == high {
        high = low + 1.0;
    }

    let root = BitMapBackend::new(output_path, (900, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Numeric Columns", ("sans-serif", 24))
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..rows as f64, low..high)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Row")
        .draw()?;

    let width = 0.8 / series.len() as f64;
    for (idx, (name, values)) in series.iter().enumerate() {
        let color = Palette99::pick(idx).mix(0.8);
        let offset = 0.1 + idx as f64 * width;
        chart
            .draw_series(values.iter().enumerate().map(|(row, v)| {
                let x = row as f64 + offset;
                Rectangle::new([(x, 0.0), (x + width, *v)], color.filled())
            }))?
            .label(*name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_chart_skips_categorical_only_data() {
        let dataset = TabularDataset::from_csv_str("label\na\nb\n").unwrap().clean();
        let path = std::env::temp_dir().join(format!("scholar-bot-chart-{}.png", uuid::Uuid::new_v4()));
        assert!(!write_bar_chart(&path, &dataset).unwrap());
        assert!(!path.exists());
    }
}
