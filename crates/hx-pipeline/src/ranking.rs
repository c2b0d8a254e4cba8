//! Impact, setpoint and scenario rankings.
//!
//! All rankings are stable: equal weights keep their input order.

use hx_core::cmp_desc_nan_last;
use hx_input::{RawImpact, RawSetpoint};
use serde::{Deserialize, Serialize};

use crate::table::{ScenarioRow, ScenarioTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEntry {
    pub variable_label: String,
    pub impact_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetpointImpactEntry {
    pub equipment: String,
    pub setpoint_name: String,
    pub weightage_percent: f64,
    pub unit: String,
}

impl SetpointImpactEntry {
    pub fn label(&self) -> String {
        format!("{}.{}", self.equipment, self.setpoint_name)
    }
}

pub fn top_impact_ranking(raw: &[RawImpact]) -> Vec<ImpactEntry> {
    let mut entries: Vec<ImpactEntry> = raw
        .iter()
        .map(|impact| ImpactEntry {
            variable_label: impact.label.clone(),
            impact_weight: impact.weight,
        })
        .collect();
    entries.sort_by(|a, b| cmp_desc_nan_last(a.impact_weight, b.impact_weight));
    entries
}

pub fn setpoint_impact_ranking(raw: &[RawSetpoint]) -> Vec<SetpointImpactEntry> {
    let mut entries: Vec<SetpointImpactEntry> = raw
        .iter()
        .map(|s| SetpointImpactEntry {
            equipment: s.equipment.clone(),
            setpoint_name: s.setpoint.clone(),
            weightage_percent: s.weightage,
            unit: s.unit.clone(),
        })
        .collect();
    entries.sort_by(|a, b| cmp_desc_nan_last(a.weightage_percent, b.weightage_percent));
    entries
}

/// The `n` highest-KPI rows; all rows when `n` exceeds the table size.
pub fn top_n_scenarios(table: &ScenarioTable, n: usize) -> Vec<ScenarioRow> {
    let mut rows: Vec<&ScenarioRow> = table.rows.iter().collect();
    rows.sort_by(|a, b| cmp_desc_nan_last(a.kpi_value, b.kpi_value));
    rows.into_iter().take(n).cloned().collect()
}
