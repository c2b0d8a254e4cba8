//! Validation of a raw document into a [`SimulationDocument`].

use hx_core::ensure_finite;
use tracing::debug;

use crate::record::{
    EquipmentBlock, RawImpact, RawSetpoint, SimulationDocument, SimulationRecord, Summaries,
    TopVariable, VariableKind, VariableSample,
};
use crate::schema::{
    RawData, RawDocument, RawEquipment, RawScenario, RawSetpointImpact, RawTopVariable,
    RawVariable,
};
use crate::{LoadError, LoadResult};

const SIMULATED_DATA_PATH: &str = "data.simulated_summary.simulated_data";

fn missing(path: impl Into<String>) -> LoadError {
    LoadError::MalformedInput {
        path: path.into(),
        reason: "required field is missing".to_string(),
    }
}

fn finite(value: f64, path: &str) -> LoadResult<f64> {
    ensure_finite(value, path).map_err(|e| LoadError::MalformedInput {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Validate `raw` and convert it into the typed representation.
///
/// Fails if `data.simulated_summary.simulated_data` is absent or any record
/// lacks `scenario`, `kpi_value` or `equipment_specification`. Value ranges
/// are not checked.
pub fn load(raw: RawDocument) -> LoadResult<SimulationDocument> {
    let data = raw.data.ok_or_else(|| missing("data"))?;
    let RawData {
        main_summary_text,
        top_summary_text,
        impact_summary_text,
        top_impact,
        top_variables,
        setpoint_impact_summary,
        simulated_summary,
    } = data;

    let scenarios = simulated_summary
        .and_then(|s| s.simulated_data)
        .ok_or_else(|| missing(SIMULATED_DATA_PATH))?;

    let records = scenarios
        .into_iter()
        .enumerate()
        .map(|(i, scenario)| load_scenario(scenario, &format!("{SIMULATED_DATA_PATH}[{i}]")))
        .collect::<LoadResult<Vec<_>>>()?;

    let top_impact = top_impact
        .into_iter()
        .map(|(label, value)| {
            let path = format!("data.top_impact.{label}");
            let weight = value.as_f64().ok_or_else(|| LoadError::MalformedInput {
                path: path.clone(),
                reason: format!("expected a number, found {value}"),
            })?;
            Ok(RawImpact {
                weight: finite(weight, &path)?,
                label,
            })
        })
        .collect::<LoadResult<Vec<_>>>()?;

    let top_variables = top_variables
        .into_iter()
        .enumerate()
        .map(|(i, v)| load_top_variable(v, &format!("data.top_variables[{i}]")))
        .collect::<LoadResult<Vec<_>>>()?;

    let setpoint_impacts = setpoint_impact_summary
        .into_iter()
        .enumerate()
        .map(|(i, s)| load_setpoint(s, &format!("data.setpoint_impact_summary[{i}]")))
        .collect::<LoadResult<Vec<_>>>()?;

    debug!(
        scenarios = records.len(),
        impacts = top_impact.len(),
        setpoints = setpoint_impacts.len(),
        "loaded simulation document"
    );

    Ok(SimulationDocument {
        summaries: Summaries {
            main_summary: main_summary_text.unwrap_or_default(),
            top_summary: top_summary_text.unwrap_or_default(),
            impact_summary: impact_summary_text.unwrap_or_default(),
        },
        top_impact,
        top_variables,
        setpoint_impacts,
        records,
    })
}

fn load_scenario(raw: RawScenario, path: &str) -> LoadResult<SimulationRecord> {
    let scenario_id = raw
        .scenario
        .ok_or_else(|| missing(format!("{path}.scenario")))?;
    let kpi_path = format!("{path}.kpi_value");
    let kpi_value = raw.kpi_value.ok_or_else(|| missing(kpi_path.clone()))?;
    let kpi_value = finite(kpi_value, &kpi_path)?;
    let equipment = raw
        .equipment_specification
        .ok_or_else(|| missing(format!("{path}.equipment_specification")))?;

    let equipment_specifications = equipment
        .into_iter()
        .enumerate()
        .map(|(i, block)| load_equipment(block, &format!("{path}.equipment_specification[{i}]")))
        .collect::<LoadResult<Vec<_>>>()?;

    Ok(SimulationRecord {
        scenario_id,
        kpi_name: raw.kpi,
        kpi_value,
        equipment_specifications,
    })
}

fn load_equipment(raw: RawEquipment, path: &str) -> LoadResult<EquipmentBlock> {
    let equipment_name = raw
        .equipment
        .ok_or_else(|| missing(format!("{path}.equipment")))?;
    let variables = raw
        .variables
        .ok_or_else(|| missing(format!("{path}.variables")))?
        .into_iter()
        .enumerate()
        .map(|(i, v)| load_variable(v, &format!("{path}.variables[{i}]")))
        .collect::<LoadResult<Vec<_>>>()?;

    Ok(EquipmentBlock {
        equipment_name,
        variables,
    })
}

fn load_variable(raw: RawVariable, path: &str) -> LoadResult<VariableSample> {
    let raw_name = raw.name.ok_or_else(|| missing(format!("{path}.name")))?;
    let kind_path = format!("{path}.type");
    let kind = raw.kind.ok_or_else(|| missing(kind_path.clone()))?;
    let kind = parse_kind(&kind, &kind_path)?;
    let value_path = format!("{path}.value");
    let value = raw.value.ok_or_else(|| missing(value_path.clone()))?;

    Ok(VariableSample {
        raw_name,
        kind,
        value: finite(value, &value_path)?,
    })
}

fn load_top_variable(raw: RawTopVariable, path: &str) -> LoadResult<TopVariable> {
    let kind_path = format!("{path}.type");
    let kind = raw.kind.ok_or_else(|| missing(kind_path.clone()))?;
    let value_path = format!("{path}.value");
    let value = raw.value.ok_or_else(|| missing(value_path.clone()))?;
    Ok(TopVariable {
        equipment: raw
            .equipment
            .ok_or_else(|| missing(format!("{path}.equipment")))?,
        kind: parse_kind(&kind, &kind_path)?,
        name: raw.name.ok_or_else(|| missing(format!("{path}.name")))?,
        value: finite(value, &value_path)?,
        unit: raw.unit.unwrap_or_default(),
    })
}

fn load_setpoint(raw: RawSetpointImpact, path: &str) -> LoadResult<RawSetpoint> {
    let weightage_path = format!("{path}.weightage");
    let weightage = raw
        .weightage
        .ok_or_else(|| missing(weightage_path.clone()))?;
    Ok(RawSetpoint {
        equipment: raw
            .equipment
            .ok_or_else(|| missing(format!("{path}.equipment")))?,
        setpoint: raw
            .setpoint
            .ok_or_else(|| missing(format!("{path}.setpoint")))?,
        weightage: finite(weightage, &weightage_path)?,
        unit: raw.unit.unwrap_or_default(),
    })
}

fn parse_kind(raw: &str, path: &str) -> LoadResult<VariableKind> {
    raw.parse().map_err(|reason| LoadError::MalformedInput {
        path: path.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_json_str;

    const MINIMAL: &str = r#"{
        "data": {
            "simulated_summary": { "simulated_data": [
                { "scenario": "S1", "kpi_value": 500.0,
                  "equipment_specification": [
                    { "equipment": "HEX-100",
                      "variables": [ { "name": "cold_fluid_temperature", "type": "Condition", "value": 300.0 } ] }
                  ] }
            ] }
        }
    }"#;

    fn malformed_path(err: LoadError) -> String {
        match err {
            LoadError::MalformedInput { path, .. } => path,
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn minimal_document_loads_with_defaults() {
        let doc = from_json_str(MINIMAL).unwrap();
        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.summaries, Summaries::default());
        assert!(doc.top_impact.is_empty());
        assert!(doc.setpoint_impacts.is_empty());

        let record = &doc.records[0];
        assert_eq!(record.scenario_id, "S1");
        assert_eq!(record.kpi_value, 500.0);
        let sample = &record.equipment_specifications[0].variables[0];
        assert_eq!(sample.kind, VariableKind::Condition);
        assert_eq!(sample.value, 300.0);
    }

    #[test]
    fn missing_simulated_data_is_malformed() {
        let err = from_json_str(r#"{ "data": { "simulated_summary": {} } }"#).unwrap_err();
        assert_eq!(malformed_path(err), SIMULATED_DATA_PATH);

        let err = from_json_str(r#"{ "data": {} }"#).unwrap_err();
        assert_eq!(malformed_path(err), SIMULATED_DATA_PATH);

        let err = from_json_str("{}").unwrap_err();
        assert_eq!(malformed_path(err), "data");
    }

    #[test]
    fn missing_record_fields_name_their_location() {
        let cases = [
            (
                r#"{ "kpi_value": 1.0, "equipment_specification": [] }"#,
                "data.simulated_summary.simulated_data[0].scenario",
            ),
            (
                r#"{ "scenario": "S1", "equipment_specification": [] }"#,
                "data.simulated_summary.simulated_data[0].kpi_value",
            ),
            (
                r#"{ "scenario": "S1", "kpi_value": 1.0 }"#,
                "data.simulated_summary.simulated_data[0].equipment_specification",
            ),
        ];
        for (record, expected) in cases {
            let json = format!(
                r#"{{ "data": {{ "simulated_summary": {{ "simulated_data": [ {record} ] }} }} }}"#
            );
            let err = from_json_str(&json).unwrap_err();
            assert_eq!(malformed_path(err), expected);
        }
    }

    #[test]
    fn missing_summary_entry_fields_name_their_location() {
        let cases = [
            (
                r#""setpoint_impact_summary": [ { "equipment": "Fuel", "setpoint": "temperature" } ]"#,
                "data.setpoint_impact_summary[0].weightage",
            ),
            (
                r#""top_variables": [ { "equipment": "Air", "name": "temperature", "value": 298.0 } ]"#,
                "data.top_variables[0].type",
            ),
        ];
        for (entry, expected) in cases {
            let json = format!(
                r#"{{ "data": {{ {entry}, "simulated_summary": {{ "simulated_data": [] }} }} }}"#
            );
            let err = from_json_str(&json).unwrap_err();
            assert_eq!(malformed_path(err), expected);
        }
    }

    #[test]
    fn unknown_variable_type_is_rejected() {
        let json = MINIMAL.replace("\"Condition\"", "\"Ambient\"");
        let err = from_json_str(&json).unwrap_err();
        assert!(malformed_path(err).ends_with("variables[0].type"));
    }

    #[test]
    fn variable_type_is_case_insensitive() {
        let json = MINIMAL.replace("\"Condition\"", "\"setpoint\"");
        let doc = from_json_str(&json).unwrap();
        assert_eq!(
            doc.records[0].equipment_specifications[0].variables[0].kind,
            VariableKind::Setpoint
        );
    }

    #[test]
    fn top_impact_keeps_document_order() {
        let json = MINIMAL.replace(
            "\"simulated_summary\"",
            r#""top_impact": { "Zeta": 0.1, "Alpha": 0.5, "Mid": 0.3 }, "simulated_summary""#,
        );
        let doc = from_json_str(&json).unwrap();
        let labels: Vec<_> = doc.top_impact.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn non_numeric_impact_is_malformed() {
        let json = MINIMAL.replace(
            "\"simulated_summary\"",
            r#""top_impact": { "Fuel.temperature": "high" }, "simulated_summary""#,
        );
        let err = from_json_str(&json).unwrap_err();
        assert_eq!(malformed_path(err), "data.top_impact.Fuel.temperature");
    }

    #[test]
    fn out_of_range_values_pass_through() {
        let json = MINIMAL.replace("300.0", "-40000.0");
        let doc = from_json_str(&json).unwrap();
        assert_eq!(
            doc.records[0].equipment_specifications[0].variables[0].value,
            -40000.0
        );
    }
}
