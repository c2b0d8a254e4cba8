//! Wide scenario table: one row per scenario, one column per variable key.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use hx_core::Unit;
use hx_input::{SimulationRecord, VariableKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::normalize::Normalizer;
use crate::{PipelineError, PipelineResult};

/// Metadata for one normalized variable column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableColumn {
    pub key: String,
    pub equipment: String,
    pub canonical_name: String,
    /// Kind of the first sample seen for this key.
    pub kind: VariableKind,
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRow {
    pub scenario_id: String,
    pub kpi_value: f64,
    /// Sparse cells: a key is absent when the scenario did not report it.
    pub values: BTreeMap<String, f64>,
    /// Kind of the sample that filled each cell.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub kinds: BTreeMap<String, VariableKind>,
}

impl ScenarioRow {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn kind(&self, key: &str) -> Option<VariableKind> {
        self.kinds.get(key).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable {
    /// Sorted by key.
    pub columns: Vec<VariableColumn>,
    /// In order of first appearance in the source.
    pub rows: Vec<ScenarioRow>,
}

impl ScenarioTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, key: &str) -> Option<&VariableColumn> {
        self.columns
            .binary_search_by(|c| c.key.as_str().cmp(key))
            .ok()
            .map(|i| &self.columns[i])
    }

    pub fn row(&self, scenario_id: &str) -> Option<&ScenarioRow> {
        self.rows.iter().find(|r| r.scenario_id == scenario_id)
    }

    pub fn kpi_values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.kpi_value).collect()
    }

    /// Cells of one column in row order; `None` marks a missing value.
    pub fn column_values(&self, key: &str) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.get(key)).collect()
    }

    /// Cell rendered with its column unit, e.g. `"300K"`.
    pub fn formatted(&self, row: &ScenarioRow, key: &str) -> Option<String> {
        let unit = self.column(key)?.unit;
        row.get(key).map(|v| unit.format_value(v))
    }
}

/// Pivot records into a [`ScenarioTable`].
///
/// The first sample for a `(scenario, key)` cell wins; later duplicates are
/// dropped. Records sharing a `scenario_id` merge into one row and must agree
/// on `kpi_value`.
pub fn build_table(
    records: &[SimulationRecord],
    normalizer: &Normalizer,
) -> PipelineResult<ScenarioTable> {
    let mut rows: Vec<ScenarioRow> = Vec::with_capacity(records.len());
    let mut row_index: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    let mut columns: BTreeMap<String, VariableColumn> = BTreeMap::new();
    let mut dropped = 0_usize;

    for record in records {
        let idx = match row_index.get(record.scenario_id.as_str()) {
            Some(&idx) => {
                let existing = rows[idx].kpi_value;
                if existing != record.kpi_value {
                    return Err(PipelineError::InconsistentKpi {
                        scenario_id: record.scenario_id.clone(),
                        first: existing,
                        second: record.kpi_value,
                    });
                }
                idx
            }
            None => {
                rows.push(ScenarioRow {
                    scenario_id: record.scenario_id.clone(),
                    kpi_value: record.kpi_value,
                    values: BTreeMap::new(),
                    kinds: BTreeMap::new(),
                });
                row_index.insert(record.scenario_id.as_str(), rows.len() - 1);
                rows.len() - 1
            }
        };

        for (equipment, sample) in record.samples() {
            let normalized = normalizer.normalize(equipment, &sample.raw_name);
            if !columns.contains_key(&normalized.key) {
                columns.insert(
                    normalized.key.clone(),
                    VariableColumn {
                        key: normalized.key.clone(),
                        equipment: normalized.equipment,
                        canonical_name: normalized.canonical_name,
                        kind: sample.kind,
                        unit: normalized.unit,
                    },
                );
            }

            let row = &mut rows[idx];
            match row.values.entry(normalized.key) {
                Entry::Vacant(cell) => {
                    row.kinds.insert(cell.key().clone(), sample.kind);
                    cell.insert(sample.value);
                }
                Entry::Occupied(cell) => {
                    dropped += 1;
                    debug!(
                        scenario = %record.scenario_id,
                        key = %cell.key(),
                        kept = *cell.get(),
                        dropped = sample.value,
                        "duplicate sample dropped"
                    );
                }
            }
        }
    }

    info!(
        scenarios = rows.len(),
        columns = columns.len(),
        duplicates_dropped = dropped,
        "scenario table built"
    );

    Ok(ScenarioTable {
        columns: columns.into_values().collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hx_input::{EquipmentBlock, VariableSample};

    fn sample(name: &str, value: f64) -> VariableSample {
        VariableSample {
            raw_name: name.to_string(),
            kind: VariableKind::Condition,
            value,
        }
    }

    fn record(id: &str, kpi: f64, blocks: Vec<(&str, Vec<VariableSample>)>) -> SimulationRecord {
        SimulationRecord {
            scenario_id: id.to_string(),
            kpi_name: None,
            kpi_value: kpi,
            equipment_specifications: blocks
                .into_iter()
                .map(|(name, variables)| EquipmentBlock {
                    equipment_name: name.to_string(),
                    variables,
                })
                .collect(),
        }
    }

    #[test]
    fn duplicate_sample_keeps_first_value() {
        let records = vec![record(
            "S1",
            500.0,
            vec![(
                "HEX-100",
                vec![
                    sample("cold_fluid_temperature", 300.0),
                    sample("cold_fluid_temperature", 999.0),
                ],
            )],
        )];
        let table = build_table(&records, &Normalizer::builtin()).unwrap();
        assert_eq!(table.rows[0].get("HEX-100.cold_fluid_temperature"), Some(300.0));
    }

    #[test]
    fn alias_collision_also_keeps_first() {
        // Both raw names normalize to Fuel.temperature.
        let records = vec![record(
            "S1",
            500.0,
            vec![(
                "Fuel",
                vec![sample("Fuel - temperature", 1200.0), sample("temperature", 1.0)],
            )],
        )];
        let table = build_table(&records, &Normalizer::builtin()).unwrap();
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.rows[0].get("Fuel.temperature"), Some(1200.0));
    }

    #[test]
    fn columns_are_union_and_cells_sparse() {
        let records = vec![
            record("S1", 500.0, vec![("Air", vec![sample("temperature", 298.0)])]),
            record("S2", 510.0, vec![("Fuel", vec![sample("temperature", 1200.0)])]),
        ];
        let table = build_table(&records, &Normalizer::builtin()).unwrap();
        let keys: Vec<_> = table.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["Air.temperature", "Fuel.temperature"]);
        assert_eq!(
            table.column_values("Fuel.temperature"),
            vec![None, Some(1200.0)]
        );
        assert_eq!(table.kpi_values(), vec![500.0, 510.0]);
    }

    #[test]
    fn repeated_scenario_with_same_kpi_merges() {
        let records = vec![
            record("S1", 500.0, vec![("Air", vec![sample("temperature", 298.0)])]),
            record(
                "S1",
                500.0,
                vec![
                    ("Air", vec![sample("temperature", 1.0)]),
                    ("Fuel", vec![sample("temperature", 1200.0)]),
                ],
            ),
        ];
        let table = build_table(&records, &Normalizer::builtin()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].get("Air.temperature"), Some(298.0));
        assert_eq!(table.rows[0].get("Fuel.temperature"), Some(1200.0));
    }

    #[test]
    fn repeated_scenario_with_different_kpi_fails() {
        let records = vec![
            record("S1", 500.0, vec![]),
            record("S2", 505.0, vec![]),
            record("S1", 501.0, vec![]),
        ];
        let err = build_table(&records, &Normalizer::builtin()).unwrap_err();
        match err {
            PipelineError::InconsistentKpi {
                scenario_id,
                first,
                second,
            } => {
                assert_eq!(scenario_id, "S1");
                assert_eq!((first, second), (500.0, 501.0));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn column_metadata_carries_unit_and_first_kind() {
        let mut setpoint = sample("heat_transfer_coefficient", 45.0);
        setpoint.kind = VariableKind::Setpoint;
        let records = vec![
            record("S1", 500.0, vec![("HEX-100", vec![setpoint])]),
            record(
                "S2",
                510.0,
                vec![("HEX-100", vec![sample("heat_transfer_coefficient", 47.5)])],
            ),
        ];
        let table = build_table(&records, &Normalizer::builtin()).unwrap();
        let column = table.column("HEX-100.heat_transfer_coefficient").unwrap();
        assert_eq!(column.kind, VariableKind::Setpoint);
        assert_eq!(column.unit, Unit::HeatTransferCoefficient);
        assert_eq!(column.canonical_name, "heat_transfer_coefficient");
        assert_eq!(
            table.rows[0].kind("HEX-100.heat_transfer_coefficient"),
            Some(VariableKind::Setpoint)
        );
        assert_eq!(
            table.rows[1].kind("HEX-100.heat_transfer_coefficient"),
            Some(VariableKind::Condition)
        );
        assert_eq!(
            table
                .formatted(&table.rows[1], "HEX-100.heat_transfer_coefficient")
                .as_deref(),
            Some("47.5 W/m²·K")
        );
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = build_table(&[], &Normalizer::builtin()).unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }
}
