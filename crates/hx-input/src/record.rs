//! Validated, typed representation of a simulation results document.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether a variable is an ambient condition or under operator control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    Condition,
    Setpoint,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Condition => "Condition",
            VariableKind::Setpoint => "Setpoint",
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("condition") {
            Ok(VariableKind::Condition)
        } else if trimmed.eq_ignore_ascii_case("setpoint") {
            Ok(VariableKind::Setpoint)
        } else {
            Err(format!("unknown variable type '{trimmed}'"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSample {
    pub raw_name: String,
    pub kind: VariableKind,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentBlock {
    pub equipment_name: String,
    pub variables: Vec<VariableSample>,
}

/// One simulated scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub scenario_id: String,
    /// Name of the KPI variable, when the source states it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_name: Option<String>,
    pub kpi_value: f64,
    pub equipment_specifications: Vec<EquipmentBlock>,
}

impl SimulationRecord {
    pub fn samples(&self) -> impl Iterator<Item = (&str, &VariableSample)> {
        self.equipment_specifications.iter().flat_map(|block| {
            block
                .variables
                .iter()
                .map(move |sample| (block.equipment_name.as_str(), sample))
        })
    }
}

/// Free-text summaries passed through to the report unmodified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summaries {
    pub main_summary: String,
    pub top_summary: String,
    pub impact_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopVariable {
    pub equipment: String,
    pub kind: VariableKind,
    pub name: String,
    pub value: f64,
    pub unit: String,
}

impl TopVariable {
    /// `equipment.name`, the label used to match table columns.
    pub fn label(&self) -> String {
        format!("{}.{}", self.equipment, self.name)
    }
}

/// One `top_impact` mapping entry, kept in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImpact {
    pub label: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSetpoint {
    pub equipment: String,
    pub setpoint: String,
    pub weightage: f64,
    pub unit: String,
}

/// Everything the pipeline needs from one input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDocument {
    pub summaries: Summaries,
    pub top_impact: Vec<RawImpact>,
    pub top_variables: Vec<TopVariable>,
    pub setpoint_impacts: Vec<RawSetpoint>,
    pub records: Vec<SimulationRecord>,
}

impl SimulationDocument {
    pub fn records(&self) -> &[SimulationRecord] {
        &self.records
    }

    pub fn scenario_count(&self) -> usize {
        self.records.len()
    }
}
