//! Report dataset assembly: the single input to charting and narration.

use hx_input::{SimulationDocument, Summaries, TopVariable};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::PipelineResult;
use crate::normalize::Normalizer;
use crate::ranking::{
    ImpactEntry, SetpointImpactEntry, setpoint_impact_ranking, top_impact_ranking,
    top_n_scenarios,
};
use crate::stats::{CorrelationEntry, KpiStatistics, correlate_with_kpi, kpi_statistics};
use crate::table::{ScenarioRow, ScenarioTable, build_table};

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    pub top_n: usize,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDataset {
    pub summaries: Summaries,
    pub top_variables: Vec<TopVariable>,
    pub table: ScenarioTable,
    /// `None` when the document has no scenarios.
    pub kpi_statistics: Option<KpiStatistics>,
    pub impact_ranking: Vec<ImpactEntry>,
    pub setpoint_ranking: Vec<SetpointImpactEntry>,
    pub correlations: Vec<CorrelationEntry>,
    pub top_scenarios: Vec<ScenarioRow>,
}

impl ReportDataset {
    pub fn correlation(&self, key: &str) -> Option<f64> {
        self.correlations
            .iter()
            .find(|c| c.variable_key == key)
            .map(|c| c.correlation)
    }
}

/// Run table building, statistics and rankings over one document.
///
/// An empty dataset only disables the KPI statistics; table and ranking
/// errors abort assembly.
pub fn assemble(
    document: &SimulationDocument,
    normalizer: &Normalizer,
    options: &AssemblyOptions,
) -> PipelineResult<ReportDataset> {
    let table = build_table(document.records(), normalizer)?;

    let kpi_statistics = match kpi_statistics(&table) {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!("{e}; report will carry no KPI statistics");
            None
        }
    };

    let dataset = ReportDataset {
        summaries: document.summaries.clone(),
        top_variables: document.top_variables.clone(),
        kpi_statistics,
        impact_ranking: top_impact_ranking(&document.top_impact),
        setpoint_ranking: setpoint_impact_ranking(&document.setpoint_impacts),
        correlations: correlate_with_kpi(&table),
        top_scenarios: top_n_scenarios(&table, options.top_n),
        table,
    };

    info!(
        scenarios = dataset.table.len(),
        variables = dataset.table.columns.len(),
        impacts = dataset.impact_ranking.len(),
        setpoints = dataset.setpoint_ranking.len(),
        "report dataset assembled"
    );

    Ok(dataset)
}
