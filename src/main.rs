use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use leadscope::churn::{self, ChurnEstimator};
use leadscope::config::load_config;
use leadscope::dataset::{export_csv, export_json, load_or_generate, Customer, Deal};
use leadscope::forecast::forecast_revenue;
use leadscope::output;
use leadscope::report::{build_report, ReportOptions};
use leadscope::scoring::LeadScorer;
use leadscope::segment::segment_customers;
use leadscope::team::team_summary;

const EXIT_SUCCESS: i32 = 0;
const EXIT_CONFIG: i32 = 4;
const EXIT_IO: i32 = 5;

/// Default dataset location relative to the working directory.
const DEFAULT_DATASET: &str = "data/leads.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable tables
    Table,
    /// Tab-separated values for scripting
    Tsv,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score leads and rank them by priority (default if no subcommand)
    Score {
        /// Show only the top N leads
        #[arg(short, long)]
        top: Option<usize>,
    },
    /// Cluster the customer base into spend tiers
    Segment,
    /// Estimate churn risk across the customer base
    Churn,
    /// Project monthly revenue from won-deal history
    Forecast {
        /// Months to project past the end of history
        #[arg(short, long)]
        months: Option<usize>,
    },
    /// Per-rep and team performance over closed deals
    Team,
    /// Full KPI report across the whole pipeline
    Report,
    /// Write scored leads (or the KPI report) to a CSV or JSON file
    Export {
        /// Output path; a .json extension selects JSON, anything else CSV
        output: PathBuf,

        /// Export the KPI report instead of scored leads (CSV gets the
        /// target verdicts; JSON gets the full report)
        #[arg(long)]
        kpi: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "leadscope")]
#[command(about = "CRM lead scoring and pipeline analytics CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/leadscope/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the leads CSV (falls back to synthetic data when absent)
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Score { top: None });
    let start_time = Instant::now();

    let config_path = cli.config.map(PathBuf::from);
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e:#}");
            std::process::exit(EXIT_CONFIG);
        }
    };

    let dataset_path = cli
        .input
        .or_else(|| config.dataset.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET));

    let leads = match load_or_generate(&dataset_path, config.seed(), cli.verbose) {
        Ok(leads) => leads,
        Err(e) => {
            eprintln!("Dataset error: {e:#}");
            std::process::exit(EXIT_IO);
        }
    };

    let use_colors = cli.format == OutputFormat::Table && output::should_use_colors();
    let scoring = config.scoring();

    let result: anyhow::Result<()> = match command {
        Commands::Score { top } => {
            let scorer = LeadScorer::fit(&leads, &scoring, cli.verbose);
            if cli.verbose {
                eprintln!("Scoring path: {}", scorer.origin().as_str());
            }
            let mut scored = scorer.score_all(&leads);
            scored.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.lead_id.cmp(&b.lead_id))
            });
            if let Some(top) = top {
                scored.truncate(top);
            }
            match cli.format {
                OutputFormat::Json => print_json(&scored),
                OutputFormat::Tsv => {
                    println!("{}", output::format_scored_tsv(&scored));
                    Ok(())
                }
                OutputFormat::Table => {
                    if cli.verbose {
                        for lead in &scored {
                            println!("{}", output::format_score_breakdown(lead, use_colors));
                            println!();
                        }
                    } else {
                        println!("{}", output::format_scored_leads(&scored, use_colors));
                    }
                    Ok(())
                }
            }
        }
        Commands::Segment => {
            let customers = Customer::customers(&leads);
            match segment_customers(&customers, config.clusters(), config.seed()) {
                Ok(segmentation) => match cli.format {
                    OutputFormat::Json => print_json(&segmentation),
                    OutputFormat::Tsv => {
                        println!("{}", output::format_segments_tsv(&segmentation));
                        Ok(())
                    }
                    OutputFormat::Table => {
                        println!("{}", output::format_segments(&segmentation, use_colors));
                        Ok(())
                    }
                },
                Err(e) => Err(e),
            }
        }
        Commands::Churn => {
            let customers = Customer::customers(&leads);
            let estimator = ChurnEstimator::fit(&customers, cli.verbose);
            if cli.verbose {
                eprintln!("Churn path: {}", estimator.origin().as_str());
            }
            let mut assessments = estimator.assess_all(&customers);
            assessments.sort_by(|a, b| {
                b.risk
                    .partial_cmp(&a.risk)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.lead_id.cmp(&b.lead_id))
            });
            let summary = churn::summarize(&assessments);
            match cli.format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "assessments": assessments,
                    "summary": summary,
                })),
                OutputFormat::Tsv => {
                    println!("{}", output::format_churn_tsv(&assessments));
                    Ok(())
                }
                OutputFormat::Table => {
                    println!("{}", output::format_churn(&assessments, &summary, use_colors));
                    Ok(())
                }
            }
        }
        Commands::Forecast { months } => {
            let deals = Deal::deals(&leads);
            let horizon = months.unwrap_or_else(|| config.horizon());
            let forecast = forecast_revenue(&deals, horizon);
            match cli.format {
                OutputFormat::Json => print_json(&forecast),
                OutputFormat::Tsv => {
                    println!("{}", output::format_forecast_tsv(&forecast));
                    Ok(())
                }
                OutputFormat::Table => {
                    println!("{}", output::format_forecast(&forecast, use_colors));
                    Ok(())
                }
            }
        }
        Commands::Team => {
            let summary = team_summary(&Deal::deals(&leads));
            match cli.format {
                OutputFormat::Json => print_json(&summary),
                OutputFormat::Tsv => {
                    println!("{}", output::format_team_tsv(&summary));
                    Ok(())
                }
                OutputFormat::Table => {
                    println!("{}", output::format_team(&summary, use_colors));
                    Ok(())
                }
            }
        }
        Commands::Report => {
            let options = ReportOptions {
                scoring: scoring.clone(),
                targets: config.targets(),
                clusters: config.clusters(),
                seed: config.seed(),
                horizon: config.horizon(),
                verbose: cli.verbose,
            };
            match build_report(&leads, &options) {
                Ok(report) => match cli.format {
                    OutputFormat::Json => print_json(&report),
                    _ => {
                        println!("{}", output::format_report(&report, use_colors));
                        Ok(())
                    }
                },
                Err(e) => Err(e),
            }
        }
        Commands::Export { output: path, kpi } => {
            let is_json = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false);
            if kpi {
                let options = ReportOptions {
                    scoring: scoring.clone(),
                    targets: config.targets(),
                    clusters: config.clusters(),
                    seed: config.seed(),
                    horizon: config.horizon(),
                    verbose: cli.verbose,
                };
                match build_report(&leads, &options) {
                    Ok(report) => {
                        let result = if is_json {
                            export_json(&path, &report)
                        } else {
                            export_csv(&path, &report.verdicts)
                        };
                        if result.is_ok() {
                            println!("Wrote KPI report to {}", path.display());
                        }
                        result
                    }
                    Err(e) => Err(e),
                }
            } else {
                let scorer = LeadScorer::fit(&leads, &scoring, cli.verbose);
                let mut scored = scorer.score_all(&leads);
                scored.sort_by(|a, b| {
                    b.score
                        .partial_cmp(&a.score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.lead_id.cmp(&b.lead_id))
                });
                let result = if is_json {
                    export_json(&path, &scored)
                } else {
                    let rows: Vec<ExportRow> = scored.iter().map(ExportRow::from).collect();
                    export_csv(&path, &rows)
                };
                if result.is_ok() {
                    println!("Wrote {} scored leads to {}", scored.len(), path.display());
                }
                result
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(EXIT_IO);
    }

    if cli.verbose {
        eprintln!();
        eprintln!(
            "Done in {}",
            humantime::format_duration(start_time.elapsed())
        );
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Flat row for CSV export; the nested factor breakdown does not fit a
/// columnar layout.
#[derive(serde::Serialize)]
struct ExportRow {
    lead_id: u64,
    name: String,
    stage: String,
    score: f64,
    tier: String,
    origin: String,
}

impl From<&leadscope::scoring::ScoredLead> for ExportRow {
    fn from(lead: &leadscope::scoring::ScoredLead) -> ExportRow {
        ExportRow {
            lead_id: lead.lead_id,
            name: lead.name.clone(),
            stage: lead.stage.as_str().to_string(),
            score: lead.score,
            tier: lead.tier.as_str().to_string(),
            origin: lead.origin.as_str().to_string(),
        }
    }
}
