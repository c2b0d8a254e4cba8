use std::path::PathBuf;

use hx_input::{InputFormat, LoadError, VariableKind, load_path};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // crates
    path.pop(); // repo root
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn boiler_fixture_loads() {
    let doc = load_path(&fixture("boiler_results.json")).expect("fixture should load");

    assert_eq!(doc.records.len(), 8);
    assert!(!doc.summaries.main_summary.is_empty());
    assert_eq!(doc.top_impact.len(), 4);
    assert_eq!(doc.top_impact[0].label, "HEX-100.cold_fluid_temperature");
    assert_eq!(doc.top_variables.len(), 3);
    assert_eq!(doc.top_variables[1].kind, VariableKind::Setpoint);
    assert_eq!(doc.top_variables[1].label(), "Fuel.temperature");
    assert_eq!(doc.setpoint_impacts.len(), 2);

    let first = &doc.records[0];
    assert_eq!(first.scenario_id, "S1");
    assert_eq!(
        first.kpi_name.as_deref(),
        Some("HEX-100.hot_fluid_outlet_temperature")
    );
    assert_eq!(first.samples().count(), 4);
}

#[test]
fn yaml_documents_load_like_json() {
    let yaml = r#"
data:
  main_summary_text: yaml run
  top_impact:
    Fuel.temperature: 0.7
    Others: 0.3
  simulated_summary:
    simulated_data:
      - scenario: S1
        kpi_value: 500.0
        equipment_specification:
          - equipment: Fuel
            variables:
              - { name: "Fuel - temperature", type: Setpoint, value: 1200.0 }
"#;
    let doc = hx_input::from_str(yaml, InputFormat::Yaml).unwrap();
    assert_eq!(doc.summaries.main_summary, "yaml run");
    assert_eq!(doc.top_impact[1].label, "Others");
    assert_eq!(doc.records[0].equipment_specifications[0].equipment_name, "Fuel");
}

#[test]
fn non_finite_yaml_kpi_is_malformed() {
    let yaml = r#"
data:
  simulated_summary:
    simulated_data:
      - { scenario: S1, kpi_value: .nan, equipment_specification: [] }
"#;
    let err = hx_input::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, LoadError::MalformedInput { .. }), "{err}");
}

#[test]
fn unknown_extension_is_rejected() {
    let err = InputFormat::from_path(std::path::Path::new("results.csv")).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
}
