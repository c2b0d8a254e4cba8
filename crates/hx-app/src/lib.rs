//! Shared application service layer for heat-exchanger reports.
//!
//! Frontends call into this crate for loading inputs, generating reports
//! and querying the derived views.

pub mod config;
pub mod document_service;
pub mod error;
pub mod query;
pub mod report_service;

pub use config::{LlmSettings, ReportConfig, load_config};
pub use document_service::{
    DocumentSummary, LoadedInput, load_document, load_input, validate_document,
};
pub use error::{AppError, AppResult};
pub use query::{
    ScenarioElements, TopImpactsView, scenario_elements, setpoint_impacts,
    top_scenario_temperatures, top_impacts,
};
pub use report_service::{
    ReportCollaborators, ReportRequest, ReportResponse, generate_report, generate_report_with,
};
