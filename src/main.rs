use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use interaction_contract::config::{Config, ConfigOverrides};
use interaction_contract::contract::{canonicalize, compare_canonical, token_diff};
use interaction_contract::fallback::{
    classify_anyhow, embedded_status_code, resolve_fallback_reason, FallbackContext,
    FallbackEvent,
};
use interaction_contract::gaps::{describe_gap, EvaluationGap};
use interaction_contract::output::csv::{gaps_to_csv, report_to_csv, timing_to_csv, tokens_to_csv};
use interaction_contract::output::json::{render_json, render_json_line};
use interaction_contract::output::table::{
    render_fallback_table, render_gaps_table, render_report_table, render_timing_table,
    render_tokens_table,
};
use interaction_contract::timing::{reconcile, RemoteTimingRecord};
use interaction_contract::types::AnalysisPayload;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "interaction-contract",
    about = "Compare, classify and repair supplement-interaction analysis results"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the canonical tokens of one analysis payload
    Canonicalize { payload: PathBuf },
    /// Check that a local and a remote payload are equivalent
    Compare {
        local: PathBuf,
        remote: PathBuf,
        #[arg(long)]
        diff: bool,
        #[arg(long = "no-fail")]
        no_fail: bool,
    },
    /// Fill missing or malformed timestamps in remote timing records
    Reconcile {
        records: PathBuf,
        #[arg(long)]
        fallback: Option<String>,
    },
    /// Decide whether a request had to fall back to the local provider
    Resolve {
        #[arg(long = "not-configured")]
        not_configured: bool,
        #[arg(long = "no-session")]
        no_session: bool,
        #[arg(long)]
        status: Option<u16>,
    },
    /// Classify an error message from a failed remote call
    Classify { message: String },
    /// Describe supplement pairs the ratio check could not evaluate
    Gaps { gaps: PathBuf },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        output_format: None,
        fail_on_drift: match &cli.command {
            Commands::Compare { no_fail: true, .. } => Some(false),
            _ => None,
        },
        fallback_timestamp: match &cli.command {
            Commands::Reconcile { fallback, .. } => fallback.clone(),
            _ => None,
        },
    });
    let format = resolve_output_format(cli.output, &config);

    match &cli.command {
        Commands::Canonicalize { payload } => {
            let payload: AnalysisPayload = load_json(payload)?;
            let canonical = canonicalize(&payload);
            match format {
                OutputFormat::Table => println!("{}", render_tokens_table(&canonical)),
                OutputFormat::Json => println!("{}", render_json(&canonical)?),
                OutputFormat::Csv => println!("{}", tokens_to_csv(&canonical)?),
            }
        }
        Commands::Compare {
            local, remote, diff, ..
        } => {
            let left = canonicalize(&load_json::<AnalysisPayload>(local)?);
            let right = canonicalize(&load_json::<AnalysisPayload>(remote)?);
            let report = compare_canonical(&left, &right);
            match format {
                OutputFormat::Table => println!("{}", render_report_table(&report)),
                OutputFormat::Json => println!("{}", render_json(&report)?),
                OutputFormat::Csv => println!("{}", report_to_csv(&report)?),
            }
            if *diff {
                println!("{}", token_diff(&left, &right));
            }
            if !report.equivalent {
                warn!(
                    categories = report.drifts.len(),
                    "local and remote analysis results diverge"
                );
                if config.compare.fail_on_drift {
                    return Err(anyhow!("analysis payloads are not equivalent"));
                }
            }
        }
        Commands::Reconcile { records, .. } => {
            let records: Vec<RemoteTimingRecord> = load_json(records)?;
            let fallback = config.resolved_fallback(Utc::now())?;
            let warnings = reconcile(fallback, &records);
            info!(records = warnings.len(), "reconciled timing records");
            match format {
                OutputFormat::Table => println!("{}", render_timing_table(&warnings)),
                OutputFormat::Json => println!("{}", render_json(&warnings)?),
                OutputFormat::Csv => println!("{}", timing_to_csv(&warnings)?),
            }
        }
        Commands::Resolve {
            not_configured,
            no_session,
            status,
        } => {
            let context = FallbackContext {
                engine_configured: config.engine.configured && !*not_configured,
                has_session: !*no_session,
                status_code: *status,
            };
            let event = resolve_fallback_reason(&context)
                .map(|reason| FallbackEvent::new(reason, *status));
            print_fallback(event.as_ref(), format)?;
        }
        Commands::Classify { message } => {
            let error = anyhow::Error::msg(message.clone());
            let reason = classify_anyhow(&error);
            let event = FallbackEvent::new(reason, embedded_status_code(message));
            print_fallback(Some(&event), format)?;
        }
        Commands::Gaps { gaps } => {
            let gaps: Vec<EvaluationGap> = load_json(gaps)?;
            match format {
                OutputFormat::Table => println!("{}", render_gaps_table(&gaps)),
                OutputFormat::Json => {
                    let sentences: Vec<String> = gaps.iter().map(describe_gap).collect();
                    println!("{}", render_json(&sentences)?);
                }
                OutputFormat::Csv => println!("{}", gaps_to_csv(&gaps)?),
            }
        }
        Commands::Config { init, show } => {
            if *init {
                Config::write_template(&config_path)?;
                println!("Wrote config template to {}", config_path.display());
            }
            if *show || !*init {
                println!("{}", render_json(&config)?);
            }
        }
    }

    Ok(())
}

fn resolve_output_format(cli_format: Option<OutputFormat>, config: &Config) -> OutputFormat {
    if let Some(format) = cli_format {
        return format;
    }
    OutputFormat::from_str(&config.output.format, true).unwrap_or_else(|_| {
        warn!(
            "unknown output format in config: {}, using table",
            config.output.format
        );
        OutputFormat::Table
    })
}

fn print_fallback(event: Option<&FallbackEvent>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_fallback_table(event)),
        OutputFormat::Json => println!("{}", render_json_line(&event)?),
        OutputFormat::Csv => {
            warn!("CSV output for fallback events not implemented, using JSON");
            println!("{}", render_json_line(&event)?);
        }
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid JSON in {}", path.display()))
}
