//! End-to-end report generation.

use std::fs;
use std::path::{Path, PathBuf};

use hx_pipeline::assemble;
use hx_report::{
    ChartHandles, ChartRenderer, CsvChartRenderer, DocumentAssembler, DocumentRequest,
    MarkdownDocument, OpenAiSummarizer, ReportMetadata, Summarizer, narrate,
};
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::document_service::load_input;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct ReportRequest<'a> {
    pub input_path: &'a Path,
    pub output_path: &'a Path,
    /// Defaults to `<output stem>_charts` beside the output.
    pub charts_dir: Option<&'a Path>,
    /// Skip the narrative generator and use the fallback text.
    pub offline: bool,
}

impl ReportRequest<'_> {
    pub fn resolved_charts_dir(&self) -> AppResult<PathBuf> {
        if let Some(dir) = self.charts_dir {
            return Ok(dir.to_path_buf());
        }
        let stem = self
            .output_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Output path has no file name: {}",
                    self.output_path.display()
                ))
            })?;
        Ok(self.output_path.with_file_name(format!("{stem}_charts")))
    }
}

/// Capabilities injected into a report run.
pub struct ReportCollaborators<'a> {
    pub charts: &'a dyn ChartRenderer,
    pub summarizer: Option<&'a dyn Summarizer>,
    pub document: &'a dyn DocumentAssembler,
}

#[derive(Debug, Clone)]
pub struct ReportResponse {
    pub output_path: PathBuf,
    pub report_id: String,
    pub charts: ChartHandles,
    pub scenario_count: usize,
    pub narrative_fallback: bool,
}

/// Generate a report with the built-in renderers and the configured
/// narrative client.
pub fn generate_report(
    request: &ReportRequest<'_>,
    config: &ReportConfig,
) -> AppResult<ReportResponse> {
    let charts = CsvChartRenderer::new(request.resolved_charts_dir()?)
        .with_histogram_bins(config.histogram_bins);

    let client = if request.offline {
        None
    } else {
        match config.llm_config()? {
            Some(llm) => match OpenAiSummarizer::from_config(&llm) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!(error = %e, "narrative client unavailable");
                    None
                }
            },
            None => {
                info!("no LLM API key configured; narrative will use standard text");
                None
            }
        }
    };

    let collaborators = ReportCollaborators {
        charts: &charts,
        summarizer: client.as_ref().map(|c| c as &dyn Summarizer),
        document: &MarkdownDocument,
    };
    generate_report_with(request, config, &collaborators)
}

/// Best-effort removal of chart files, and of their directories once empty.
fn remove_charts(charts: &ChartHandles) {
    for path in charts.values() {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to remove chart file");
        }
    }
    for dir in charts.values().filter_map(|p| p.parent()) {
        let _ = fs::remove_dir(dir);
    }
}

/// Generate a report through explicit collaborators.
///
/// Nothing is written until the input has loaded and the dataset has
/// assembled, so a malformed input leaves no output behind. Chart files
/// are removed again if the document cannot be written.
pub fn generate_report_with(
    request: &ReportRequest<'_>,
    config: &ReportConfig,
    collaborators: &ReportCollaborators<'_>,
) -> AppResult<ReportResponse> {
    let input = load_input(request.input_path)?;
    let dataset = assemble(
        &input.document,
        &config.normalizer(),
        &config.assembly_options(),
    )?;

    let charts = collaborators.charts.render(&dataset)?;
    let summarizer = if request.offline {
        None
    } else {
        collaborators.summarizer
    };
    let narrative = narrate(&dataset, summarizer);

    let metadata = ReportMetadata::new(input.report_id.clone(), input.source.clone());
    let written = collaborators.document.write(
        &DocumentRequest {
            metadata: &metadata,
            dataset: &dataset,
            charts: &charts,
            narrative: &narrative,
        },
        request.output_path,
    );
    let output_path = match written {
        Ok(path) => path,
        Err(e) => {
            remove_charts(&charts);
            return Err(e.into());
        }
    };

    info!(
        report_id = %metadata.report_id,
        output = %output_path.display(),
        charts = charts.len(),
        fallback = narrative.is_fallback(),
        "report generated"
    );

    Ok(ReportResponse {
        output_path,
        report_id: input.report_id,
        charts,
        scenario_count: dataset.table.len(),
        narrative_fallback: narrative.is_fallback(),
    })
}
