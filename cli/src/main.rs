//! gatecheck CLI — driving adapter for the validation engine.
//!
//! Subcommands:
//! - `eval <rules> <request> [--config <file>]` — validate a JSON request against a rule set
//! - `check <rules> [--config <file>]` — load a rule set and list malformed entries
//!
//! Exit status: 0 on pass (or a clean rule set), 2 on reject (or malformed
//! entries), 1 on any load error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gatecheck::{ConfigError, RuleSet, Validator, ValidatorConfig};
use gatecheck_test::JsonRequest;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gatecheck")]
#[command(about = "Validate requests against declarative rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a request (JSON object) against a rule set
    Eval {
        /// Rule set file (.json, otherwise YAML)
        rules: PathBuf,
        /// Request file (JSON object of attributes)
        request: PathBuf,
        /// Validator configuration file (.json, otherwise YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Load a rule set and report malformed entries
    Check {
        /// Rule set file (.json, otherwise YAML)
        rules: PathBuf,
        /// Validator configuration file (.json, otherwise YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// What a command decided, and what to print for it.
#[derive(Debug, PartialEq, Eq)]
struct Report {
    ok: bool,
    output: String,
}

impl Report {
    fn exit_code(&self) -> ExitCode {
        if self.ok {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(2)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatecheck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Eval {
            rules,
            request,
            config,
        } => cmd_eval(rules, request, config.as_deref()),
        Commands::Check { rules, config } => cmd_check(rules, config.as_deref()),
    };

    match result {
        Ok(report) => {
            println!("{}", report.output);
            report.exit_code()
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_eval(
    rules_path: &Path,
    request_path: &Path,
    config_path: Option<&Path>,
) -> Result<Report, ConfigError> {
    let validator = build_validator(config_path)?;
    let rules = load_rules(&validator, rules_path)?;
    let request = JsonRequest::from_json(&read(request_path)?)?;

    tracing::debug!(rules = rules.len(), "evaluating request");
    match validator.check(&rules, &request) {
        None => Ok(Report {
            ok: true,
            output: "pass".into(),
        }),
        Some(response) => Ok(Report {
            ok: false,
            output: response.body_json()?,
        }),
    }
}

fn cmd_check(rules_path: &Path, config_path: Option<&Path>) -> Result<Report, ConfigError> {
    let validator = build_validator(config_path)?;
    let rules = load_rules(&validator, rules_path)?;

    let malformed: Vec<String> = rules
        .malformed()
        .map(|(index, reason)| format!("rule #{index}: {reason}"))
        .collect();
    if malformed.is_empty() {
        Ok(Report {
            ok: true,
            output: format!("{} rule(s) valid", rules.len()),
        })
    } else {
        Ok(Report {
            ok: false,
            output: malformed.join("\n"),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════════════════════════

fn build_validator(config_path: Option<&Path>) -> Result<Validator, ConfigError> {
    let Some(path) = config_path else {
        return Ok(Validator::default());
    };
    let content = read(path)?;
    let config = if is_json(path) {
        ValidatorConfig::from_json(&content)?
    } else {
        ValidatorConfig::from_yaml(&content)?
    };
    Ok(Validator::new(&config))
}

fn load_rules(validator: &Validator, path: &Path) -> Result<RuleSet, ConfigError> {
    let content = read(path)?;
    if is_json(path) {
        validator.load_rules_json(&content)
    } else {
        // Default to YAML (handles .yaml and .yml)
        validator.load_rules_yaml(&content)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
