//! KPI descriptive statistics and variable/KPI correlation.

use hx_core::{cmp_desc_nan_last, kelvin_to_celsius};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::table::ScenarioTable;
use crate::{PipelineError, PipelineResult};

/// Descriptive statistics over the KPI column.
///
/// `std` is the sample standard deviation (n-1) and is `NaN` for a single
/// scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    #[serde(with = "crate::nan_as_null")]
    pub std: f64,
    pub median: f64,
    pub range: f64,
}

impl KpiStatistics {
    pub fn from_values(values: &[f64]) -> PipelineResult<Self> {
        if values.is_empty() {
            return Err(PipelineError::EmptyDataset {
                what: "kpi statistics",
            });
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self {
            count: values.len(),
            min,
            max,
            mean: mean(values),
            std: sample_std(values),
            median: median(values),
            range: max - min,
        })
    }

    /// `(min, mean, max)` converted from Kelvin to degrees Celsius.
    pub fn celsius(&self) -> (f64, f64, f64) {
        (
            kelvin_to_celsius(self.min),
            kelvin_to_celsius(self.mean),
            kelvin_to_celsius(self.max),
        )
    }
}

pub fn kpi_statistics(table: &ScenarioTable) -> PipelineResult<KpiStatistics> {
    KpiStatistics::from_values(&table.kpi_values())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub variable_key: String,
    /// Pearson correlation with the KPI; `NaN` when undefined.
    #[serde(with = "crate::nan_as_null")]
    pub correlation: f64,
}

/// Pearson correlation of every variable column with the KPI.
///
/// Rows missing the column are excluded pairwise. Sorted descending by the
/// signed coefficient, so a strong negative driver ranks below a weak positive
/// one. Undefined coefficients (`NaN`) sort last; ties keep column order.
pub fn correlate_with_kpi(table: &ScenarioTable) -> Vec<CorrelationEntry> {
    let mut entries: Vec<CorrelationEntry> = table
        .columns
        .iter()
        .map(|column| {
            let (xs, ys): (Vec<f64>, Vec<f64>) = table
                .rows
                .iter()
                .filter_map(|row| row.get(&column.key).map(|v| (v, row.kpi_value)))
                .unzip();
            CorrelationEntry {
                variable_key: column.key.clone(),
                correlation: pearson(&xs, &ys),
            }
        })
        .collect();

    let undefined = entries.iter().filter(|e| e.correlation.is_nan()).count();
    if undefined > 0 {
        warn!(
            undefined,
            total = entries.len(),
            "correlation undefined for some columns"
        );
    }

    entries.sort_by(|a, b| cmp_desc_nan_last(a.correlation, b.correlation));
    entries
}

/// Least-squares line `kpi = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// `None` with fewer than two points or a constant `xs`.
pub fn linear_trend(xs: &[f64], ys: &[f64]) -> Option<LinearTrend> {
    if xs.len() != ys.len() || xs.len() < 2 || is_constant(xs) {
        return None;
    }
    let mx = mean(xs);
    let my = mean(ys);
    let (sxy, sxx) = xs
        .iter()
        .zip(ys)
        .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            (sxy + (x - mx) * (y - my), sxx + (x - mx) * (x - mx))
        });
    let slope = sxy / sxx;
    Some(LinearTrend {
        slope,
        intercept: my - slope * mx,
    })
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Pearson coefficient; `NaN` for fewer than two pairs or zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 || is_constant(xs) || is_constant(ys) {
        return f64::NAN;
    }
    let mx = mean(xs);
    let my = mean(ys);
    let (sxy, sxx, syy) = xs.iter().zip(ys).fold((0.0, 0.0, 0.0), |acc, (x, y)| {
        let dx = x - mx;
        let dy = y - my;
        (acc.0 + dx * dy, acc.1 + dx * dx, acc.2 + dy * dy)
    });
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ScenarioRow, VariableColumn};
    use hx_core::{Tolerances, Unit, nearly_equal};
    use hx_input::VariableKind;
    use std::collections::BTreeMap;

    fn table(kpis: &[f64], columns: &[(&str, &[Option<f64>])]) -> ScenarioTable {
        let rows = kpis
            .iter()
            .enumerate()
            .map(|(i, kpi)| {
                let mut values = BTreeMap::new();
                for (key, cells) in columns {
                    if let Some(v) = cells[i] {
                        values.insert(key.to_string(), v);
                    }
                }
                ScenarioRow {
                    scenario_id: format!("S{}", i + 1),
                    kpi_value: *kpi,
                    values,
                    kinds: BTreeMap::new(),
                }
            })
            .collect();
        let mut columns: Vec<VariableColumn> = columns
            .iter()
            .map(|(key, _)| VariableColumn {
                key: key.to_string(),
                equipment: "E".to_string(),
                canonical_name: key.to_string(),
                kind: VariableKind::Condition,
                unit: Unit::Kelvin,
            })
            .collect();
        columns.sort_by(|a, b| a.key.cmp(&b.key));
        ScenarioTable { columns, rows }
    }

    const TOL: Tolerances = Tolerances {
        abs: 1e-9,
        rel: 1e-9,
    };

    #[test]
    fn kpi_statistics_basic() {
        let stats = KpiStatistics::from_values(&[500.0, 600.0, 550.0, 530.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 500.0);
        assert_eq!(stats.max, 600.0);
        assert_eq!(stats.range, 100.0);
        assert!(nearly_equal(stats.mean, 545.0, TOL));
        assert!(nearly_equal(stats.median, 540.0, TOL));
        // sum of squared deviations = 5300
        assert!(nearly_equal(stats.std, (5300.0_f64 / 3.0).sqrt(), TOL));
    }

    #[test]
    fn single_scenario_std_is_nan() {
        let stats = KpiStatistics::from_values(&[512.5]).unwrap();
        assert!(stats.std.is_nan());
        assert_eq!(stats.min, stats.max);
        assert_eq!(stats.median, 512.5);
        assert_eq!(stats.range, 0.0);
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let err = kpi_statistics(&ScenarioTable::default()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDataset { .. }));
    }

    #[test]
    fn perfect_linear_column_correlates_to_one() {
        let t = table(
            &[500.0, 600.0, 700.0],
            &[("E.x", &[Some(300.0), Some(310.0), Some(320.0)])],
        );
        let entries = correlate_with_kpi(&t);
        assert_eq!(entries.len(), 1);
        assert!((entries[0].correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_and_sparse_columns_are_nan_and_last() {
        let t = table(
            &[500.0, 600.0, 700.0],
            &[
                ("E.constant", &[Some(1.0), Some(1.0), Some(1.0)]),
                ("E.falling", &[Some(3.0), Some(2.0), Some(1.0)]),
                ("E.lonely", &[None, Some(5.0), None]),
                ("E.rising", &[Some(1.0), Some(2.0), Some(4.0)]),
            ],
        );
        let entries = correlate_with_kpi(&t);
        let keys: Vec<_> = entries.iter().map(|e| e.variable_key.as_str()).collect();
        assert_eq!(keys, vec!["E.rising", "E.falling", "E.constant", "E.lonely"]);
        assert!(entries[0].correlation > 0.9);
        assert!((entries[1].correlation + 1.0).abs() < 1e-9);
        assert!(entries[2].correlation.is_nan());
        assert!(entries[3].correlation.is_nan());
    }

    #[test]
    fn missing_cells_are_excluded_pairwise() {
        let t = table(
            &[500.0, 9999.0, 600.0, 700.0],
            &[("E.x", &[Some(1.0), None, Some(2.0), Some(3.0)])],
        );
        let entries = correlate_with_kpi(&t);
        assert!((entries[0].correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn negative_correlation_ranks_below_weak_positive() {
        let t = table(
            &[1.0, 2.0, 3.0, 4.0],
            &[
                ("E.strong_negative", &[Some(4.0), Some(3.0), Some(2.0), Some(1.0)]),
                ("E.weak_positive", &[Some(1.0), Some(3.0), Some(0.0), Some(2.5)]),
            ],
        );
        let entries = correlate_with_kpi(&t);
        assert_eq!(entries[0].variable_key, "E.weak_positive");
        assert_eq!(entries[1].variable_key, "E.strong_negative");
    }

    #[test]
    fn trend_recovers_line() {
        let trend = linear_trend(&[1.0, 2.0, 3.0], &[12.0, 14.0, 16.0]).unwrap();
        assert!(nearly_equal(trend.slope, 2.0, TOL));
        assert!(nearly_equal(trend.intercept, 10.0, TOL));
        assert!(nearly_equal(trend.at(4.0), 18.0, TOL));
        assert!(linear_trend(&[1.0, 1.0], &[2.0, 3.0]).is_none());
    }
}
