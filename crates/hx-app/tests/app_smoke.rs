//! Smoke test for the hx-app service layer against the bundled fixture.

use std::path::PathBuf;

use hx_app::{ReportConfig, load_document, query, validate_document};

fn fixture() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // crates
    path.pop(); // repo root
    path.push("fixtures");
    path.push("boiler_results.json");
    path
}

#[test]
fn fixture_validates_and_queries() {
    let config = ReportConfig::default();
    let document = load_document(&fixture()).expect("fixture should load");
    let summary = validate_document(&document, &config.normalizer()).expect("valid fixture");

    assert_eq!(summary.scenario_count, 8);
    assert_eq!(summary.variable_count, 4);
    assert_eq!(
        summary.kpi_name.as_deref(),
        Some("HEX-100.hot_fluid_outlet_temperature")
    );

    let impacts = query::top_impacts(&document);
    let labels: Vec<_> = impacts
        .impacts
        .iter()
        .map(|e| e.variable_label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "HEX-100 - Cold Fluid Temperature",
            "Fuel Temperature",
            "Air Temperature",
            "Others"
        ]
    );

    let top = query::top_scenario_temperatures(&document, &config.normalizer(), 3)
        .expect("top scenarios");
    let ids: Vec<_> = top.iter().map(|s| s.scenario_id.as_str()).collect();
    assert_eq!(ids, vec!["S7", "S5", "S3"]);
    for scenario in &top {
        assert!(scenario.setpoints.contains_key("Fuel.temperature"));
        assert!(
            !scenario
                .setpoints
                .contains_key("HEX-100.heat_transfer_coefficient")
        );
    }

    assert_eq!(query::setpoint_impacts(&document).len(), 2);
}

#[test]
fn views_serialize_to_json() {
    let document = load_document(&fixture()).expect("fixture should load");
    let elements =
        query::scenario_elements(&document, &ReportConfig::default().normalizer()).unwrap();
    let json = serde_json::to_value(&elements).unwrap();
    assert_eq!(json[0]["scenario_id"], "S1");
    assert!(json[0]["conditions"]["Air.temperature"].is_string());
}
