//! Read-only views over a loaded document.

use std::collections::BTreeMap;

use hx_input::{RawSetpoint, SimulationDocument, VariableKind};
use hx_pipeline::normalize::HEAT_TRANSFER_COEFFICIENT;
use hx_pipeline::{
    ImpactEntry, Normalizer, ScenarioRow, ScenarioTable, build_table, top_n_scenarios,
};
use serde::Serialize;

use crate::error::AppResult;

/// Source label -> display label, in display order.
pub const IMPACT_DISPLAY_LABELS: [(&str, &str); 4] = [
    ("HEX-100.cold_fluid_temperature", "HEX-100 - Cold Fluid Temperature"),
    ("Fuel.temperature", "Fuel Temperature"),
    ("Air.temperature", "Air Temperature"),
    ("Others", "Others"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopImpactsView {
    pub summary: String,
    pub impacts: Vec<ImpactEntry>,
}

/// Mapped top-impact entries only, in display order.
pub fn top_impacts(document: &SimulationDocument) -> TopImpactsView {
    let impacts = IMPACT_DISPLAY_LABELS
        .iter()
        .filter_map(|(source, display)| {
            document
                .top_impact
                .iter()
                .find(|i| i.label == *source)
                .map(|i| ImpactEntry {
                    variable_label: display.to_string(),
                    impact_weight: i.weight,
                })
        })
        .collect();
    TopImpactsView {
        summary: document.summaries.top_summary.clone(),
        impacts,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioElements {
    pub scenario_id: String,
    pub kpi_value: f64,
    /// Normalized key -> formatted value.
    pub conditions: BTreeMap<String, String>,
    pub setpoints: BTreeMap<String, String>,
}

fn elements_of(
    table: &ScenarioTable,
    row: &ScenarioRow,
    keep: impl Fn(&str) -> bool,
) -> ScenarioElements {
    let mut elements = ScenarioElements {
        scenario_id: row.scenario_id.clone(),
        kpi_value: row.kpi_value,
        conditions: BTreeMap::new(),
        setpoints: BTreeMap::new(),
    };
    for column in table.columns.iter().filter(|c| keep(c.canonical_name.as_str())) {
        let Some(value) = table.formatted(row, &column.key) else {
            continue;
        };
        let group = match row.kind(&column.key).unwrap_or(column.kind) {
            VariableKind::Condition => &mut elements.conditions,
            VariableKind::Setpoint => &mut elements.setpoints,
        };
        group.insert(column.key.clone(), value);
    }
    elements
}

/// Every scenario with its variables grouped by kind.
pub fn scenario_elements(
    document: &SimulationDocument,
    normalizer: &Normalizer,
) -> AppResult<Vec<ScenarioElements>> {
    let table = build_table(document.records(), normalizer)?;
    Ok(table
        .rows
        .iter()
        .map(|row| elements_of(&table, row, |_| true))
        .collect())
}

/// Case-insensitive, like unit inference.
fn is_temperature(canonical_name: &str) -> bool {
    let name = canonical_name.to_ascii_lowercase();
    name.contains("temperature") && !name.contains(HEAT_TRANSFER_COEFFICIENT)
}

/// The `n` best scenarios by KPI, restricted to temperature variables.
pub fn top_scenario_temperatures(
    document: &SimulationDocument,
    normalizer: &Normalizer,
    n: usize,
) -> AppResult<Vec<ScenarioElements>> {
    let table = build_table(document.records(), normalizer)?;
    Ok(top_n_scenarios(&table, n)
        .iter()
        .map(|row| elements_of(&table, row, is_temperature))
        .collect())
}

pub fn setpoint_impacts(document: &SimulationDocument) -> &[RawSetpoint] {
    &document.setpoint_impacts
}
