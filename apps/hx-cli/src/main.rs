use clap::{Parser, Subcommand};
use hx_app::{AppError, AppResult, ReportConfig, ReportRequest, query};
use hx_pipeline::{ReportDataset, assemble};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hx-cli")]
#[command(about = "Heat exchanger simulation report generator", long_about = None)]
struct Cli {
    /// Report configuration YAML (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a simulation results file
    Validate {
        /// Path to the results file (JSON or YAML)
        input: PathBuf,
    },
    /// Generate the analysis report
    Report {
        /// Path to the results file (JSON or YAML)
        input: PathBuf,
        /// Report output path
        #[arg(short, long)]
        output: PathBuf,
        /// Directory for chart data (defaults beside the output)
        #[arg(long)]
        charts_dir: Option<PathBuf>,
        /// Use the standard narrative instead of calling the LLM
        #[arg(long)]
        offline: bool,
    },
    /// Print the assembled report dataset as JSON
    Dataset {
        input: PathBuf,
    },
    /// Show KPI statistics
    Stats {
        input: PathBuf,
    },
    /// Show variable correlations with the KPI
    Correlations {
        input: PathBuf,
    },
    /// List scenarios with their variables
    Scenarios {
        input: PathBuf,
        /// Only the best N scenarios, temperature variables only
        #[arg(long)]
        top: Option<usize>,
    },
    /// Show the top variable impacts
    TopImpacts {
        input: PathBuf,
    },
    /// Show the setpoint impact summary
    Setpoints {
        input: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = hx_app::load_config(cli.config.as_deref())?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Validate { input } => cmd_validate(&input, &config),
        Commands::Report {
            input,
            output,
            charts_dir,
            offline,
        } => cmd_report(&input, &output, charts_dir.as_deref(), offline, &config),
        Commands::Dataset { input } => cmd_dataset(&input, &config),
        Commands::Stats { input } => cmd_stats(&input, &config),
        Commands::Correlations { input } => cmd_correlations(&input, &config),
        Commands::Scenarios { input, top } => cmd_scenarios(&input, top, &config),
        Commands::TopImpacts { input } => cmd_top_impacts(&input),
        Commands::Setpoints { input } => cmd_setpoints(&input),
    }
}

fn load_dataset(input: &Path, config: &ReportConfig) -> AppResult<ReportDataset> {
    let document = hx_app::load_document(input)?;
    Ok(assemble(
        &document,
        &config.normalizer(),
        &config.assembly_options(),
    )?)
}

fn fmt_value(value: f64, precision: usize) -> String {
    if value.is_finite() {
        format!("{value:.precision$}")
    } else {
        "N/A".to_string()
    }
}

fn cmd_validate(input: &Path, config: &ReportConfig) -> AppResult<()> {
    println!("Validating input: {}", input.display());
    let document = hx_app::load_document(input)?;
    let summary = hx_app::validate_document(&document, &config.normalizer())?;
    println!("✓ Input is valid");
    println!("  Scenarios: {}", summary.scenario_count);
    println!("  Variables: {}", summary.variable_count);
    if let Some(kpi) = &summary.kpi_name {
        println!("  KPI: {}", kpi);
    }
    println!("  Impact entries: {}", summary.impact_count);
    println!("  Setpoints: {}", summary.setpoint_count);
    Ok(())
}

fn cmd_report(
    input: &Path,
    output: &Path,
    charts_dir: Option<&Path>,
    offline: bool,
    config: &ReportConfig,
) -> AppResult<()> {
    println!("Generating report for: {}", input.display());
    let request = ReportRequest {
        input_path: input,
        output_path: output,
        charts_dir,
        offline,
    };
    let response = hx_app::generate_report(&request, config)?;

    println!("✓ Report written: {}", response.output_path.display());
    println!("  Report id: {}", response.report_id);
    println!("  Scenarios: {}", response.scenario_count);
    for (name, path) in &response.charts {
        println!("  Chart {}: {}", name, path.display());
    }
    if response.narrative_fallback {
        println!("  Narrative: standard text");
    }
    Ok(())
}

fn cmd_dataset(input: &Path, config: &ReportConfig) -> AppResult<()> {
    let dataset = load_dataset(input, config)?;
    let json = serde_json::to_string_pretty(&dataset)
        .map_err(|e| AppError::InvalidInput(format!("Failed to serialize dataset: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn cmd_stats(input: &Path, config: &ReportConfig) -> AppResult<()> {
    let dataset = load_dataset(input, config)?;
    let Some(stats) = dataset.kpi_statistics else {
        println!("No scenarios; KPI statistics unavailable");
        return Ok(());
    };
    let (min_c, mean_c, max_c) = stats.celsius();

    println!("KPI statistics ({} scenarios):", stats.count);
    println!("  Min:    {} K ({} °C)", fmt_value(stats.min, 2), fmt_value(min_c, 2));
    println!("  Max:    {} K ({} °C)", fmt_value(stats.max, 2), fmt_value(max_c, 2));
    println!("  Mean:   {} K ({} °C)", fmt_value(stats.mean, 2), fmt_value(mean_c, 2));
    println!("  Median: {} K", fmt_value(stats.median, 2));
    println!("  Std:    {} K", fmt_value(stats.std, 2));
    println!("  Range:  {} K", fmt_value(stats.range, 2));
    Ok(())
}

fn cmd_correlations(input: &Path, config: &ReportConfig) -> AppResult<()> {
    let dataset = load_dataset(input, config)?;
    if dataset.correlations.is_empty() {
        println!("No variables found");
        return Ok(());
    }
    println!("Correlation with KPI:");
    for entry in &dataset.correlations {
        println!("  {:<40} {:>7}", entry.variable_key, fmt_value(entry.correlation, 3));
    }
    Ok(())
}

fn print_elements(elements: &[query::ScenarioElements]) {
    for scenario in elements {
        println!("  {} (KPI {} K)", scenario.scenario_id, fmt_value(scenario.kpi_value, 2));
        for (key, value) in &scenario.conditions {
            println!("    [Condition] {} = {}", key, value);
        }
        for (key, value) in &scenario.setpoints {
            println!("    [Setpoint]  {} = {}", key, value);
        }
    }
}

fn cmd_scenarios(input: &Path, top: Option<usize>, config: &ReportConfig) -> AppResult<()> {
    let document = hx_app::load_document(input)?;
    let normalizer = config.normalizer();
    match top {
        Some(n) => {
            let elements = query::top_scenario_temperatures(&document, &normalizer, n)?;
            println!("Top {} scenarios (temperatures):", elements.len());
            print_elements(&elements);
        }
        None => {
            let elements = query::scenario_elements(&document, &normalizer)?;
            if elements.is_empty() {
                println!("No scenarios found");
            } else {
                println!("Scenarios:");
                print_elements(&elements);
            }
        }
    }
    Ok(())
}

fn cmd_top_impacts(input: &Path) -> AppResult<()> {
    let document = hx_app::load_document(input)?;
    let view = query::top_impacts(&document);
    if !view.summary.is_empty() {
        println!("{}\n", view.summary);
    }
    println!("Top impacts:");
    for entry in &view.impacts {
        println!("  {:<36} {:>6}", entry.variable_label, fmt_value(entry.impact_weight, 3));
    }
    Ok(())
}

fn cmd_setpoints(input: &Path) -> AppResult<()> {
    let document = hx_app::load_document(input)?;
    let setpoints = query::setpoint_impacts(&document);
    if setpoints.is_empty() {
        println!("No setpoint impacts found");
        return Ok(());
    }
    println!("Setpoint impacts:");
    for s in setpoints {
        println!("  {}.{}: {}% ({})", s.equipment, s.setpoint, s.weightage, s.unit);
    }
    Ok(())
}
