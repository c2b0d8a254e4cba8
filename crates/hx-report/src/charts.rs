//! Chart data extraction and rendering.
//!
//! Rasterizing charts is left to external tools; the built-in renderer
//! writes one CSV data file per chart and hands back its path.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use hx_pipeline::{ReportDataset, linear_trend, stats};
use tracing::{debug, info};

use crate::ReportResult;

pub const TOP_IMPACT_PIE: &str = "top_impact_pie";
pub const SETPOINT_IMPACT_BAR: &str = "setpoint_impact_bar";
pub const KPI_DISTRIBUTION: &str = "kpi_distribution";
pub const VARIABLE_COMPARISON: &str = "variable_comparison";
pub const TOP_SCENARIOS: &str = "top_scenarios";

pub const DEFAULT_HISTOGRAM_BINS: usize = 15;

/// Chart name -> rendered artifact. Charts without data are absent.
pub type ChartHandles = BTreeMap<String, PathBuf>;

pub trait ChartRenderer {
    fn render(&self, dataset: &ReportDataset) -> ReportResult<ChartHandles>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0_usize; bins];
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Columns plotted against the KPI: top variables that exist in the table.
pub fn comparison_keys(dataset: &ReportDataset) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for variable in &dataset.top_variables {
        let label = variable.label();
        if dataset.table.column(&label).is_some() && !keys.contains(&label) {
            keys.push(label);
        }
    }
    keys
}

#[derive(Debug, Clone)]
pub struct CsvChartRenderer {
    dir: PathBuf,
    histogram_bins: usize,
}

impl CsvChartRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }

    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, header: &[&str], rows: Vec<Vec<String>>) -> ReportResult<PathBuf> {
        let path = self.dir.join(format!("{name}.csv"));
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(header)?;
        for row in rows {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        debug!(chart = name, path = %path.display(), "chart data written");
        Ok(path)
    }

    fn top_impact_pie(&self, dataset: &ReportDataset) -> ReportResult<Option<PathBuf>> {
        if dataset.impact_ranking.is_empty() {
            return Ok(None);
        }
        let total: f64 = dataset.impact_ranking.iter().map(|e| e.impact_weight).sum();
        let rows = dataset
            .impact_ranking
            .iter()
            .map(|e| {
                let share = if total != 0.0 {
                    e.impact_weight / total * 100.0
                } else {
                    f64::NAN
                };
                vec![
                    e.variable_label.clone(),
                    e.impact_weight.to_string(),
                    format!("{share:.1}"),
                ]
            })
            .collect();
        self.write(TOP_IMPACT_PIE, &["label", "weight", "share_percent"], rows)
            .map(Some)
    }

    fn setpoint_impact_bar(&self, dataset: &ReportDataset) -> ReportResult<Option<PathBuf>> {
        if dataset.setpoint_ranking.is_empty() {
            return Ok(None);
        }
        let rows = dataset
            .setpoint_ranking
            .iter()
            .map(|e| {
                vec![
                    e.label(),
                    e.weightage_percent.to_string(),
                    e.unit.clone(),
                ]
            })
            .collect();
        self.write(
            SETPOINT_IMPACT_BAR,
            &["label", "weightage_percent", "unit"],
            rows,
        )
        .map(Some)
    }

    fn kpi_distribution(&self, dataset: &ReportDataset) -> ReportResult<Option<PathBuf>> {
        let bins = histogram(&dataset.table.kpi_values(), self.histogram_bins);
        if bins.is_empty() {
            return Ok(None);
        }
        let rows = bins
            .iter()
            .map(|b| {
                vec![
                    b.lower.to_string(),
                    b.upper.to_string(),
                    b.count.to_string(),
                ]
            })
            .collect();
        self.write(KPI_DISTRIBUTION, &["bin_lower_k", "bin_upper_k", "count"], rows)
            .map(Some)
    }

    fn variable_comparison(&self, dataset: &ReportDataset) -> ReportResult<Option<PathBuf>> {
        let keys = comparison_keys(dataset);
        if keys.is_empty() {
            return Ok(None);
        }
        let mut rows = Vec::new();
        for key in &keys {
            let (xs, ys): (Vec<f64>, Vec<f64>) = dataset
                .table
                .rows
                .iter()
                .filter_map(|r| r.get(key).map(|v| (v, r.kpi_value)))
                .unzip();
            let trend = linear_trend(&xs, &ys);
            let correlation = dataset.correlation(key).unwrap_or(f64::NAN);
            for row in &dataset.table.rows {
                let Some(value) = row.get(key) else {
                    continue;
                };
                rows.push(vec![
                    key.clone(),
                    row.scenario_id.clone(),
                    value.to_string(),
                    row.kpi_value.to_string(),
                    trend.map(|t| t.at(value).to_string()).unwrap_or_default(),
                    format!("{correlation:.3}"),
                ]);
            }
        }
        self.write(
            VARIABLE_COMPARISON,
            &[
                "variable",
                "scenario",
                "value",
                "kpi_value",
                "trend_kpi",
                "correlation",
            ],
            rows,
        )
        .map(Some)
    }

    fn top_scenarios(&self, dataset: &ReportDataset) -> ReportResult<Option<PathBuf>> {
        if dataset.top_scenarios.is_empty() {
            return Ok(None);
        }
        let average = stats::mean(&dataset.table.kpi_values());
        let rows = dataset
            .top_scenarios
            .iter()
            .map(|r| {
                vec![
                    r.scenario_id.clone(),
                    r.kpi_value.to_string(),
                    format!("{average:.2}"),
                ]
            })
            .collect();
        self.write(TOP_SCENARIOS, &["scenario", "kpi_value", "average_kpi"], rows)
            .map(Some)
    }
}

impl ChartRenderer for CsvChartRenderer {
    fn render(&self, dataset: &ReportDataset) -> ReportResult<ChartHandles> {
        fs::create_dir_all(&self.dir)?;

        let charts = [
            (TOP_IMPACT_PIE, self.top_impact_pie(dataset)?),
            (SETPOINT_IMPACT_BAR, self.setpoint_impact_bar(dataset)?),
            (KPI_DISTRIBUTION, self.kpi_distribution(dataset)?),
            (VARIABLE_COMPARISON, self.variable_comparison(dataset)?),
            (TOP_SCENARIOS, self.top_scenarios(dataset)?),
        ];

        let handles: ChartHandles = charts
            .into_iter()
            .filter_map(|(name, path)| path.map(|p| (name.to_string(), p)))
            .collect();
        info!(charts = handles.len(), dir = %self.dir.display(), "chart data rendered");
        Ok(handles)
    }
}
