//! hx-report: narrative generation, chart data and document output for a
//! [`hx_pipeline::ReportDataset`].

pub mod charts;
pub mod document;
pub mod hash;
pub mod llm;
pub mod narrative;

pub use charts::{ChartHandles, ChartRenderer, CsvChartRenderer};
pub use document::{DocumentAssembler, DocumentRequest, MarkdownDocument, ReportMetadata};
pub use hash::compute_report_id;
pub use llm::{LlmConfig, OpenAiSummarizer};
pub use narrative::{
    Narrative, NarrativePrompt, NarrativeSections, NarrativeSource, Summarizer, narrate,
};

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid output path: {message}")]
    InvalidPath { message: String },
}

/// Failure of the external narrative generator. Always recovered locally.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NarrativeError {
    #[error("narrative client failed: {message}")]
    Client { message: String },

    #[error("narrative response unparsable: {message}")]
    Parse { message: String },

    #[error("narrative response missing section: {section}")]
    Incomplete { section: &'static str },
}
