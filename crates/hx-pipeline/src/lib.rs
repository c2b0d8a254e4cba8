//! hx-pipeline: turns a validated simulation document into report-ready
//! tables, statistics and rankings.
//!
//! Stages run strictly in order (normalize -> table -> stats/rankings ->
//! dataset) and every stage returns a fresh value.

pub mod dataset;
mod nan_as_null;
pub mod normalize;
pub mod ranking;
pub mod stats;
pub mod table;

pub use dataset::{AssemblyOptions, DEFAULT_TOP_N, ReportDataset, assemble};
pub use normalize::{AliasRule, NormalizedVariable, Normalizer, infer_unit, normalize};
pub use ranking::{
    ImpactEntry, SetpointImpactEntry, setpoint_impact_ranking, top_impact_ranking,
    top_n_scenarios,
};
pub use stats::{
    CorrelationEntry, KpiStatistics, LinearTrend, correlate_with_kpi, kpi_statistics,
    linear_trend,
};
pub use table::{ScenarioRow, ScenarioTable, VariableColumn, build_table};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Inconsistent KPI for scenario {scenario_id}: {first} vs {second}")]
    InconsistentKpi {
        scenario_id: String,
        first: f64,
        second: f64,
    },

    #[error("Empty dataset: {what} requires at least one scenario")]
    EmptyDataset { what: &'static str },
}
