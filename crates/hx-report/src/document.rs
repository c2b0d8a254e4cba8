//! Report document assembly.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use hx_pipeline::ReportDataset;
use tracing::info;

use crate::charts::{
    ChartHandles, KPI_DISTRIBUTION, SETPOINT_IMPACT_BAR, TOP_IMPACT_PIE, TOP_SCENARIOS,
    VARIABLE_COMPARISON,
};
use crate::narrative::{Narrative, NarrativeSource};
use crate::{ReportError, ReportResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMetadata {
    /// Content hash of the input document.
    pub report_id: String,
    pub source: String,
    /// RFC 3339, UTC.
    pub generated_at: String,
}

impl ReportMetadata {
    pub fn new(report_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            report_id: report_id.into(),
            source: source.into(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

pub struct DocumentRequest<'a> {
    pub metadata: &'a ReportMetadata,
    pub dataset: &'a ReportDataset,
    pub charts: &'a ChartHandles,
    pub narrative: &'a Narrative,
}

pub trait DocumentAssembler {
    /// Write the report to `output`, returning the written path.
    fn write(&self, request: &DocumentRequest<'_>, output: &Path) -> ReportResult<PathBuf>;
}

/// Write `content` to a sibling temp file, then rename it over `path`.
pub fn write_atomic(path: &Path, content: &str) -> ReportResult<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ReportError::InvalidPath {
            message: format!("{} has no file name", path.display()),
        })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let partial = path.with_file_name(format!(".{file_name}.partial"));
    if let Err(e) = fs::write(&partial, content).and_then(|_| fs::rename(&partial, path)) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    Ok(())
}

fn num(value: f64, precision: usize) -> String {
    if value.is_finite() {
        format!("{value:.precision$}")
    } else {
        "N/A".to_string()
    }
}

fn table_row(out: &mut String, cells: &[String]) {
    let _ = writeln!(out, "| {} |", cells.join(" | "));
}

fn table_header(out: &mut String, headers: &[&str]) {
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let _ = writeln!(out, "|{}", "---|".repeat(headers.len()));
}

/// Markdown report following the section order of the analysis report.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownDocument;

impl MarkdownDocument {
    fn chart_link(out: &mut String, charts: &ChartHandles, name: &str, title: &str) {
        if let Some(path) = charts.get(name) {
            let _ = writeln!(out, "_{title} chart data:_ [{name}]({})\n", path.display());
        }
    }

    pub fn render(&self, request: &DocumentRequest<'_>) -> String {
        let DocumentRequest {
            metadata,
            dataset,
            charts,
            narrative,
        } = request;
        let sections = &narrative.sections;
        let mut out = String::new();

        let _ = writeln!(out, "# Process Simulation Analysis Report\n");
        let _ = writeln!(out, "## KPI Optimization Analysis\n");
        let _ = writeln!(out, "- Report id: `{}`", metadata.report_id);
        let _ = writeln!(out, "- Source: `{}`", metadata.source);
        let _ = writeln!(out, "- Generated: {}", metadata.generated_at);
        if let NarrativeSource::Fallback { reason } = &narrative.source {
            let _ = writeln!(out, "- Narrative: standard text ({reason})");
        }
        out.push('\n');

        let _ = writeln!(out, "# Executive Summary\n\n{}\n", sections.executive_summary);
        let _ = writeln!(out, "# Technical Analysis\n\n{}\n", sections.technical_summary);

        let _ = writeln!(out, "# Key Variables Impacting the KPI\n");
        let _ = writeln!(out, "## Top Variables Overview\n");
        if dataset.top_variables.is_empty() {
            let _ = writeln!(out, "No top variables were reported.\n");
        } else {
            table_header(&mut out, &["Equipment", "Type", "Name", "Value", "Unit"]);
            for v in &dataset.top_variables {
                table_row(
                    &mut out,
                    &[
                        v.equipment.clone(),
                        v.kind.to_string(),
                        v.name.clone(),
                        v.value.to_string(),
                        v.unit.clone(),
                    ],
                );
            }
            out.push('\n');
        }

        if !dataset.impact_ranking.is_empty() {
            let _ = writeln!(out, "### Top Variable Impact\n");
            table_header(&mut out, &["Variable", "Impact"]);
            for e in &dataset.impact_ranking {
                table_row(&mut out, &[e.variable_label.clone(), num(e.impact_weight, 3)]);
            }
            out.push('\n');
            Self::chart_link(&mut out, charts, TOP_IMPACT_PIE, "Impact distribution");
        }

        let _ = writeln!(out, "## Variable Impact Analysis\n\n{}\n", sections.variable_analysis);

        if !dataset.setpoint_ranking.is_empty() {
            let _ = writeln!(out, "### Setpoint Impact Analysis\n");
            table_header(&mut out, &["Equipment.Setpoint", "Weightage (%)", "Unit"]);
            for e in &dataset.setpoint_ranking {
                table_row(
                    &mut out,
                    &[e.label(), num(e.weightage_percent, 1), e.unit.clone()],
                );
            }
            out.push('\n');
            Self::chart_link(&mut out, charts, SETPOINT_IMPACT_BAR, "Setpoint impact");
        }

        let _ = writeln!(out, "## Performance Distribution\n");
        match &dataset.kpi_statistics {
            Some(stats) => {
                let (min_c, mean_c, max_c) = stats.celsius();
                let _ = writeln!(
                    out,
                    "KPI (heat exchanger outlet temperature) across {} scenarios:\n",
                    stats.count
                );
                table_header(&mut out, &["Statistic", "Value (K)", "Value (°C)"]);
                table_row(&mut out, &["Minimum".into(), num(stats.min, 2), num(min_c, 2)]);
                table_row(&mut out, &["Maximum".into(), num(stats.max, 2), num(max_c, 2)]);
                table_row(&mut out, &["Mean".into(), num(stats.mean, 2), num(mean_c, 2)]);
                table_row(&mut out, &["Median".into(), num(stats.median, 2), String::new()]);
                table_row(&mut out, &["Std. deviation".into(), num(stats.std, 2), String::new()]);
                table_row(&mut out, &["Range".into(), num(stats.range, 2), String::new()]);
                out.push('\n');
            }
            None => {
                let _ = writeln!(out, "No scenarios were simulated.\n");
            }
        }
        Self::chart_link(&mut out, charts, KPI_DISTRIBUTION, "KPI distribution");

        let _ = writeln!(out, "## Variable Correlation Analysis\n");
        if dataset.correlations.is_empty() {
            let _ = writeln!(out, "No variables available for correlation.\n");
        } else {
            let _ = writeln!(
                out,
                "Pearson correlation of each variable with the KPI, ranked by signed value:\n"
            );
            table_header(&mut out, &["Variable", "Unit", "Correlation"]);
            for c in &dataset.correlations {
                let unit = dataset
                    .table
                    .column(&c.variable_key)
                    .map(|col| col.unit.to_string())
                    .unwrap_or_default();
                table_row(
                    &mut out,
                    &[c.variable_key.clone(), unit, num(c.correlation, 3)],
                );
            }
            out.push('\n');
        }
        Self::chart_link(&mut out, charts, VARIABLE_COMPARISON, "Variable comparison");

        let _ = writeln!(out, "## Top Performing Scenarios\n");
        if dataset.top_scenarios.is_empty() {
            let _ = writeln!(out, "No scenarios were simulated.\n");
        } else {
            let mut headers = vec!["Scenario", "KPI (K)"];
            headers.extend(dataset.table.columns.iter().map(|c| c.key.as_str()));
            table_header(&mut out, &headers);
            for row in &dataset.top_scenarios {
                let mut cells = vec![row.scenario_id.clone(), num(row.kpi_value, 2)];
                cells.extend(dataset.table.columns.iter().map(|c| {
                    dataset
                        .table
                        .formatted(row, &c.key)
                        .unwrap_or_else(|| "-".to_string())
                }));
                table_row(&mut out, &cells);
            }
            out.push('\n');
        }
        Self::chart_link(&mut out, charts, TOP_SCENARIOS, "Top scenarios");

        let _ = writeln!(out, "# Implementation Recommendations\n");
        for (i, rec) in sections.recommendations.iter().enumerate() {
            let _ = writeln!(out, "{}. {rec}", i + 1);
        }
        out.push('\n');

        let _ = writeln!(out, "# Conclusion\n\n{}", sections.conclusion);
        out
    }
}

impl DocumentAssembler for MarkdownDocument {
    fn write(&self, request: &DocumentRequest<'_>, output: &Path) -> ReportResult<PathBuf> {
        let content = self.render(request);
        write_atomic(output, &content)?;
        info!(path = %output.display(), bytes = content.len(), "report written");
        Ok(output.to_path_buf())
    }
}
