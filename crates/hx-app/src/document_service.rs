//! Input loading, validation and introspection.

use std::path::Path;

use hx_input::{InputFormat, SimulationDocument};
use hx_pipeline::{Normalizer, build_table};
use hx_report::compute_report_id;
use tracing::info;

use crate::error::{AppError, AppResult};

/// A loaded input together with its content-derived identity.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub document: SimulationDocument,
    /// SHA-256 of the input bytes.
    pub report_id: String,
    pub source: String,
}

/// Summary of a document for `validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub scenario_count: usize,
    pub variable_count: usize,
    pub kpi_name: Option<String>,
    pub impact_count: usize,
    pub setpoint_count: usize,
}

pub fn load_input(path: &Path) -> AppResult<LoadedInput> {
    let format = InputFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|e| AppError::InputRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let content = std::str::from_utf8(&bytes).map_err(|e| {
        AppError::InvalidInput(format!("{} is not valid UTF-8: {}", path.display(), e))
    })?;
    let document = hx_input::from_str(content, format)?;

    let loaded = LoadedInput {
        report_id: compute_report_id(&bytes),
        source: path.display().to_string(),
        document,
    };
    info!(
        source = %loaded.source,
        scenarios = loaded.document.scenario_count(),
        "input loaded"
    );
    Ok(loaded)
}

/// Load a simulation results document from a JSON or YAML file.
pub fn load_document(path: &Path) -> AppResult<SimulationDocument> {
    load_input(path).map(|loaded| loaded.document)
}

/// Check that the document pivots into a consistent scenario table.
pub fn validate_document(
    document: &SimulationDocument,
    normalizer: &Normalizer,
) -> AppResult<DocumentSummary> {
    let table = build_table(document.records(), normalizer)?;
    Ok(DocumentSummary {
        scenario_count: table.len(),
        variable_count: table.columns.len(),
        kpi_name: document.records().iter().find_map(|r| r.kpi_name.clone()),
        impact_count: document.top_impact.len(),
        setpoint_count: document.setpoint_impacts.len(),
    })
}
