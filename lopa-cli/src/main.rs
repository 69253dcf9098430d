//! LOPA CLI - layers of protection analysis for HazOp scenarios

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Logs go to stderr; stdout carries only the requested report

use anyhow::Context;
use clap::{Parser, Subcommand};
use lopa_core::analysis::{
    analyze_risk_reduction, analyze_risk_reduction_gap_with_thresholds, calculate_rrf_requirement,
};
use lopa_core::config::{self, ResolvedConfig};
use lopa_core::ipl::{Ipl, LopaInput};
use lopa_core::lopa::perform_lopa_calculation_with_thresholds;
use lopa_core::report::{
    render_analysis_text, render_gap_text, render_json, render_requirement_text, render_text,
};
use lopa_core::trigger::{check_lopa_trigger_with_thresholds, RiskLevel, RiskRanking};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lopa")]
#[command(about = "Layers of Protection Analysis calculator for HazOp studies")]
#[command(version = env!("LOPA_VERSION"))]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full LOPA calculation for a scenario file
    Calculate {
        /// Scenario JSON: initiatingEventFrequency, targetFrequency, ipls
        scenario: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Exit with status 1 unless protection is adequate
        #[arg(long)]
        strict: bool,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate IPLs and break down their credited risk reduction
    Analyze {
        /// JSON file with an IPL array, or an object with an "ipls" array
        ipls: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Compare achieved and required risk reduction
    Gap {
        /// Achieved risk reduction factor
        #[arg(long)]
        actual: f64,

        /// Required risk reduction factor
        #[arg(long)]
        required: f64,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Estimate how many SIL-rated layers would close a scenario's gap
    Estimate {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Decide whether a risk ranking requires LOPA
    Trigger {
        /// Severity rank (1-5)
        #[arg(long)]
        severity: u8,

        /// Likelihood rank (1-5)
        #[arg(long)]
        likelihood: u8,

        /// Qualitative risk level from the risk matrix
        #[arg(long)]
        risk_level: Option<RiskLevelArg>,

        /// Numeric risk score from the risk matrix
        #[arg(long)]
        risk_score: Option<f64>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List regulatory clauses from the standards catalog
    Standards {
        /// Only clauses tagged with this topic
        #[arg(long)]
        topic: Option<String>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running a calculation
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum RiskLevelArg {
    Low,
    Medium,
    High,
    Extreme,
}

impl From<RiskLevelArg> for RiskLevel {
    fn from(arg: RiskLevelArg) -> Self {
        match arg {
            RiskLevelArg::Low => RiskLevel::Low,
            RiskLevelArg::Medium => RiskLevel::Medium,
            RiskLevelArg::High => RiskLevel::High,
            RiskLevelArg::Extreme => RiskLevel::Extreme,
        }
    }
}

/// IPL files may hold a bare array or a scenario-shaped object
#[derive(Deserialize)]
#[serde(untagged)]
enum IplFile {
    List(Vec<Ipl>),
    Scenario { ipls: Vec<Ipl> },
}

impl IplFile {
    fn into_ipls(self) -> Vec<Ipl> {
        match self {
            IplFile::List(ipls) | IplFile::Scenario { ipls } => ipls,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Calculate {
            scenario,
            format,
            strict,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let input: LopaInput = read_json(&scenario)?;
            let result = perform_lopa_calculation_with_thresholds(&input, &resolved.gap_thresholds)
                .with_context(|| format!("LOPA calculation failed for {}", scenario.display()))?;

            match format {
                OutputFormat::Text => print!("{}", render_text(&result)),
                OutputFormat::Json => println!("{}", render_json(&result)),
            }

            if strict && !result.is_adequate {
                tracing::warn!(status = result.gap_status.as_str(), "protection is not adequate");
                std::process::exit(1);
            }
        }
        Commands::Analyze { ipls, format } => {
            let file: IplFile = read_json(&ipls)?;
            let analysis = analyze_risk_reduction(&file.into_ipls());

            match format {
                OutputFormat::Text => print!("{}", render_analysis_text(&analysis)),
                OutputFormat::Json => println!("{}", render_json(&analysis)),
            }
        }
        Commands::Gap {
            actual,
            required,
            format,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let gap =
                analyze_risk_reduction_gap_with_thresholds(actual, required, &resolved.gap_thresholds)?;

            match format {
                OutputFormat::Text => {
                    print!("{}", render_gap_text(&gap));
                    print_references(&resolved, "lopa");
                }
                OutputFormat::Json => println!("{}", render_json(&gap)),
            }
        }
        Commands::Estimate { scenario, format } => {
            let input: LopaInput = read_json(&scenario)?;
            let requirement = calculate_rrf_requirement(&input)?;

            match format {
                OutputFormat::Text => print!("{}", render_requirement_text(&requirement)),
                OutputFormat::Json => println!("{}", render_json(&requirement)),
            }
        }
        Commands::Trigger {
            severity,
            likelihood,
            risk_level,
            risk_score,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let ranking = RiskRanking {
                severity,
                likelihood,
                risk_level: risk_level.map(RiskLevel::from),
                risk_score,
            };
            let decision = check_lopa_trigger_with_thresholds(&ranking, &resolved.trigger);

            if decision.required {
                println!("LOPA required: {}", decision.reason);
                match resolved.severity_targets.get(severity) {
                    Some(target) => println!(
                        "Target frequency for severity {}: {}",
                        severity,
                        lopa_core::format::format_frequency(target)
                    ),
                    None => println!("No target frequency defined for severity {}", severity),
                }
            } else {
                println!("LOPA not required: {}", decision.reason);
            }
        }
        Commands::Standards {
            topic,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let clauses = match topic.as_deref() {
                Some(t) => resolved.standards.for_topic(t),
                None => resolved.standards.clauses().iter().collect(),
            };

            if clauses.is_empty() {
                println!("No clauses found");
            }
            for c in clauses {
                println!("{:<24} {:<14} {}", c.standard, c.clause, c.title);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let root = std::env::current_dir()?;
                match config::load_and_resolve(&root, path.as_deref()) {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let resolved = load_config(path.as_deref())?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "lopa=debug,lopa_core=debug"
    } else {
        "lopa=warn,lopa_core=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let root = std::env::current_dir()?;
    let resolved =
        config::load_and_resolve(&root, explicit).context("failed to load configuration")?;
    if let Some(ref p) = resolved.config_path {
        tracing::info!(path = %p.display(), "using config");
    }
    Ok(resolved)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_references(resolved: &ResolvedConfig, topic: &str) {
    let clauses = resolved.standards.for_topic(topic);
    if clauses.is_empty() {
        return;
    }
    println!("\nReferences:");
    for c in clauses {
        println!("  {} {} - {}", c.standard, c.clause, c.title);
    }
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!("Gap thresholds:");
    println!("  marginal: {}", resolved.gap_thresholds.marginal);
    println!("  adequate: {}", resolved.gap_thresholds.adequate);
    println!();
    println!("LOPA trigger:");
    println!("  always at severity: {}", resolved.trigger.always_severity);
    println!(
        "  severity {} with likelihood {}",
        resolved.trigger.combined_severity, resolved.trigger.combined_likelihood
    );
    println!(
        "  risk levels: {}",
        resolved
            .trigger
            .risk_levels
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  risk score: {}", resolved.trigger.risk_score);
    println!();
    println!("Severity targets:");
    for (severity, target) in resolved.severity_targets.iter() {
        println!("  {}: {:e}/yr", severity, target);
    }
    println!();
    println!(
        "Standards catalog: {} clauses",
        resolved.standards.clauses().len()
    );
}
