//! Display projections derived from the current dataset.
//!
//! All projections are pure and degrade to empty output when the dataset,
//! its summary, or the type distribution is missing.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;

use crate::dataset::{Dataset, Summary};

/// Chart-ready series for the equipment type distribution.
///
/// `labels[i]` and `values[i]` describe the same equipment type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

/// Derives the chart series from `summary.type_dist`, in wire order.
pub fn project(dataset: Option<&Dataset>) -> ChartSeries {
    let Some(distribution) = dataset.and_then(Dataset::type_distribution) else {
        return ChartSeries::default();
    };

    let (labels, values) = distribution
        .iter()
        .map(|(label, count)| (label.to_string(), count))
        .unzip();
    ChartSeries { labels, values }
}

/// Memoizing wrapper around [`project`].
///
/// The cache is keyed by the identity of the dataset `Arc`, not by its
/// contents: a new response always recomputes, re-reading the same dataset
/// never does.
#[derive(Debug, Default)]
pub struct ChartProjector {
    cache: Mutex<Option<CachedSeries>>,
}

#[derive(Debug)]
struct CachedSeries {
    source: Option<Arc<Dataset>>,
    series: Arc<ChartSeries>,
}

impl ChartProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self, dataset: Option<&Arc<Dataset>>) -> Arc<ChartSeries> {
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(cached) = cache.as_ref() {
            let same_source = match (cached.source.as_ref(), dataset) {
                (Some(cached), Some(current)) => Arc::ptr_eq(cached, current),
                (None, None) => true,
                _ => false,
            };
            if same_source {
                return cached.series.clone();
            }
        }

        let series = Arc::new(project(dataset.map(Arc::as_ref)));
        *cache = Some(CachedSeries {
            source: dataset.cloned(),
            series: series.clone(),
        });
        series
    }
}

/// Raw rows laid out under the dataset's column header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableProjection {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableProjection {
    pub fn from_dataset(dataset: Option<&Dataset>) -> Self {
        let Some(dataset) = dataset else {
            return Self::default();
        };

        let rows = dataset
            .rows
            .iter()
            .map(|row| {
                dataset
                    .columns
                    .iter()
                    .map(|column| row.get(column).map(render_cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            columns: dataset.columns.clone(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

/// Summary cards: record count and formatted averages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    pub total: u64,
    pub avg_flow: String,
    pub avg_pressure: String,
    pub avg_temp: String,
    /// Rows received before invalid ones were dropped, when reported.
    pub total_raw: Option<u64>,
    pub invalid_rows: Option<u64>,
    /// `(label, "min/max")` pairs for the ranges the backend reported.
    pub ranges: Vec<(String, String)>,
}

impl SummaryView {
    pub fn from_dataset(dataset: Option<&Dataset>) -> Self {
        let summary = dataset.and_then(|dataset| dataset.summary.as_ref());
        Self::from_summary(summary)
    }

    fn from_summary(summary: Option<&Summary>) -> Self {
        let Some(summary) = summary else {
            return Self {
                total: 0,
                avg_flow: format_average(None),
                avg_pressure: format_average(None),
                avg_temp: format_average(None),
                total_raw: None,
                invalid_rows: None,
                ranges: Vec::new(),
            };
        };

        let ranges = [
            ("Flow", summary.min_flow, summary.max_flow),
            ("Pressure", summary.min_pressure, summary.max_pressure),
            ("Temp", summary.min_temp, summary.max_temp),
        ]
        .into_iter()
        .filter_map(|(label, min, max)| match (min, max) {
            (Some(min), Some(max)) => Some((label.to_string(), format!("{min:.2}/{max:.2}"))),
            _ => None,
        })
        .collect();

        Self {
            total: summary.total,
            avg_flow: format_average(summary.avg_flow),
            avg_pressure: format_average(summary.avg_pressure),
            avg_temp: format_average(summary.avg_temp),
            total_raw: summary.total_raw,
            invalid_rows: summary.invalid_rows,
            ranges,
        }
    }
}

fn format_average(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.2}"),
        _ => "-".to_string(),
    }
}
