//! Raw input document schema.
//!
//! Every structural field is optional here so that a missing field is
//! reported by [`crate::load`] with its location instead of as an opaque
//! deserialization failure.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawDocument {
    #[serde(default)]
    pub data: Option<RawData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawData {
    #[serde(default)]
    pub main_summary_text: Option<String>,
    #[serde(default)]
    pub top_summary_text: Option<String>,
    #[serde(default)]
    pub impact_summary_text: Option<String>,
    /// Label -> weight, in document order.
    #[serde(default)]
    pub top_impact: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub top_variables: Vec<RawTopVariable>,
    #[serde(default)]
    pub setpoint_impact_summary: Vec<RawSetpointImpact>,
    #[serde(default)]
    pub simulated_summary: Option<RawSimulatedSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawSimulatedSummary {
    #[serde(default)]
    pub simulated_data: Option<Vec<RawScenario>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawScenario {
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub kpi: Option<String>,
    #[serde(default)]
    pub kpi_value: Option<f64>,
    #[serde(default)]
    pub equipment_specification: Option<Vec<RawEquipment>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawEquipment {
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub variables: Option<Vec<RawVariable>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawVariable {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawTopVariable {
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawSetpointImpact {
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub setpoint: Option<String>,
    #[serde(default)]
    pub weightage: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}
