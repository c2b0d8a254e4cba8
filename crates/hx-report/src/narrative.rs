//! Narrative sections produced by an external language model.
//!
//! The model is reached through the [`Summarizer`] capability. Its output is
//! advisory: any failure or malformed reply degrades to a fixed fallback
//! narrative instead of failing the report.

use hx_pipeline::{KpiStatistics, ReportDataset};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::NarrativeError;

pub const SYSTEM_PROMPT: &str = "You are an expert process engineer specializing in thermal \
systems analysis for the chemical industry. You analyze boiler simulation results with academic \
rigor appropriate for chemical engineers and business executives.";

const FORMAT_INSTRUCTIONS: &str = r#"Respond with a single JSON object and nothing else:
{
  "executive_summary": "string, one paragraph",
  "technical_summary": "string",
  "variable_analysis": "string",
  "recommendations": ["string", "..."],
  "conclusion": "string"
}"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeSections {
    pub executive_summary: String,
    pub technical_summary: String,
    pub variable_analysis: String,
    pub recommendations: Vec<String>,
    pub conclusion: String,
}

impl NarrativeSections {
    /// Canned narrative used whenever generation is unavailable.
    pub fn fallback() -> Self {
        Self {
            executive_summary: "Analysis of process simulation data identified key variables \
                affecting system performance."
                .to_string(),
            technical_summary: "The simulation results indicate several variables have \
                significant impact on the heat exchanger output temperature."
                .to_string(),
            variable_analysis: "Temperature variables showed the strongest correlation with \
                KPI improvements."
                .to_string(),
            recommendations: vec![
                "Optimize temperature settings based on identified impact factors".to_string(),
                "Focus on variables with highest weightage for maximum improvement".to_string(),
                "Monitor heat transfer coefficients to ensure optimal system operation"
                    .to_string(),
            ],
            conclusion: "By adjusting the identified key variables, significant improvements in \
                system performance can be achieved."
                .to_string(),
        }
    }

    fn check_complete(&self) -> Result<(), NarrativeError> {
        let text_sections = [
            ("executive_summary", &self.executive_summary),
            ("technical_summary", &self.technical_summary),
            ("variable_analysis", &self.variable_analysis),
            ("conclusion", &self.conclusion),
        ];
        for (section, text) in text_sections {
            if text.trim().is_empty() {
                return Err(NarrativeError::Incomplete { section });
            }
        }
        if self.recommendations.iter().all(|r| r.trim().is_empty()) {
            return Err(NarrativeError::Incomplete {
                section: "recommendations",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NarrativeSource {
    Generated,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub sections: NarrativeSections,
    pub source: NarrativeSource,
}

impl Narrative {
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            sections: NarrativeSections::fallback(),
            source: NarrativeSource::Fallback {
                reason: reason.into(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, NarrativeSource::Fallback { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativePrompt {
    pub system: String,
    pub user: String,
}

/// An opaque text-producing capability, typically a language model.
pub trait Summarizer {
    fn summarize(&self, prompt: &NarrativePrompt) -> Result<String, NarrativeError>;
}

fn fmt_stat(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "N/A".to_string()
    }
}

fn kpi_block(stats: Option<&KpiStatistics>) -> String {
    match stats {
        Some(s) => format!(
            "- Scenarios: {}\n- Minimum: {} K\n- Maximum: {} K\n- Mean: {} K\n- Median: {} K\n\
             - Standard Deviation: {} K\n- Range: {} K",
            s.count,
            fmt_stat(s.min),
            fmt_stat(s.max),
            fmt_stat(s.mean),
            fmt_stat(s.median),
            fmt_stat(s.std),
            fmt_stat(s.range),
        ),
        None => "- No scenarios were simulated; statistics are unavailable.".to_string(),
    }
}

/// Build the narrative prompt from a dataset. Only the dataset is consulted.
pub fn build_prompt(dataset: &ReportDataset) -> NarrativePrompt {
    let top_variables =
        serde_json::to_string_pretty(&dataset.top_variables).unwrap_or_else(|_| "[]".into());
    let setpoints =
        serde_json::to_string_pretty(&dataset.setpoint_ranking).unwrap_or_else(|_| "[]".into());
    let correlations = dataset
        .correlations
        .iter()
        .map(|c| format!("- {}: {}", c.variable_key, fmt_stat(c.correlation)))
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "SYSTEM DESCRIPTION:\n\
         This analysis examines a boiler system where fuel and air are combusted to generate \
         high-temperature gas. The thermal energy from this gas is transferred to oil via a heat \
         exchanger (HEX-100). The primary KPI is the heat exchanger outlet temperature.\n\n\
         PROCESS DATA SUMMARY:\n\
         Main Summary: {main}\n\
         Top Summary: {top}\n\
         Impact Summary: {impact}\n\n\
         TOP VARIABLES AFFECTING KPI:\n{top_variables}\n\n\
         SETPOINT IMPACT SUMMARY:\n{setpoints}\n\n\
         VARIABLE CORRELATION WITH KPI:\n{correlations}\n\n\
         KPI STATISTICS:\n{kpi}\n\n\
         Produce an executive summary, a technical summary covering heat transfer behaviour, an \
         analysis of each key variable, actionable optimization recommendations with setpoint \
         ranges, and a conclusion.\n\n\
         {FORMAT_INSTRUCTIONS}",
        main = dataset.summaries.main_summary,
        top = dataset.summaries.top_summary,
        impact = dataset.summaries.impact_summary,
        kpi = kpi_block(dataset.kpi_statistics.as_ref()),
    );

    NarrativePrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

fn extract_json_block(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    raw.get(start..=end)
}

/// Parse a model reply, tolerating prose or code fences around the JSON.
pub fn parse_sections(output: &str) -> Result<NarrativeSections, NarrativeError> {
    let json = extract_json_block(output).ok_or_else(|| NarrativeError::Parse {
        message: "no JSON object in response".to_string(),
    })?;
    let sections: NarrativeSections =
        serde_json::from_str(json).map_err(|e| NarrativeError::Parse {
            message: e.to_string(),
        })?;
    sections.check_complete()?;
    Ok(sections)
}

/// Produce narrative sections for `dataset`, falling back on any failure.
pub fn narrate(dataset: &ReportDataset, summarizer: Option<&dyn Summarizer>) -> Narrative {
    let Some(summarizer) = summarizer else {
        info!("no narrative generator configured; using fallback narrative");
        return Narrative::fallback("narrative generation disabled");
    };

    let prompt = build_prompt(dataset);
    match summarizer
        .summarize(&prompt)
        .and_then(|output| parse_sections(&output))
    {
        Ok(sections) => {
            info!(
                recommendations = sections.recommendations.len(),
                "narrative generated"
            );
            Narrative {
                sections,
                source: NarrativeSource::Generated,
            }
        }
        Err(e) => {
            warn!(error = %e, "narrative generation failed; using fallback narrative");
            Narrative::fallback(e.to_string())
        }
    }
}
