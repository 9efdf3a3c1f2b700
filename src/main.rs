//! fsmhdl - Moore state machine modelling and VHDL condition lowering
//!
//! Provides both a REPL and one-shot command execution.

mod commands;
mod config;
mod repl;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::{Config, OutputFormat};
use fsmhdl_core::CoreError;
use fsmhdl_expr::{ExprError, GRAMMAR_HELP};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fsmhdl")]
#[command(about = "Analyse Moore state machines and lower their conditions to VHDL")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "FSMHDL_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (overrides configuration)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start interactive REPL
    Repl,

    /// Diagnose a machine definition
    Check {
        /// Definition file (.json, .yaml or .yml)
        file: PathBuf,
    },

    /// Print every transition condition as VHDL
    Lower {
        /// Definition file (.json, .yaml or .yml)
        file: PathBuf,
    },

    /// Export the model consumed by the VHDL template
    Export {
        /// Definition file (.json, .yaml or .yml)
        file: PathBuf,

        /// Entity name (defaults to the document's name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show which transitions fire for the given inputs
    Eval {
        /// Definition file (.json, .yaml or .yml)
        file: PathBuf,

        /// Input values, e.g. x=1,y=0
        #[arg(short, long)]
        set: String,

        /// Only consider transitions leaving this state
        #[arg(long)]
        from: Option<String>,
    },

    /// Analyse a single expression
    Expr {
        /// Expression text
        text: String,
    },

    /// Check conditions for exclusivity and exhaustiveness
    Conditions {
        /// Condition texts
        #[arg(required = true)]
        conditions: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration (file from --config or FSMHDL_CONFIG, then env overrides)
    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    config.output.apply_color();

    match cli.command {
        Some(Commands::Repl) | None => {
            repl::run(&config)?;
        }
        Some(cmd) => match commands::execute(cmd, &config) {
            Ok(output) => {
                println!("{}", output.text);
                if !output.success {
                    std::process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                if is_syntax_error(e.as_ref()) {
                    eprintln!("{}", GRAMMAR_HELP.dimmed());
                }
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// Returns whether `e` came from malformed expression text.
fn is_syntax_error(e: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(e) = e.downcast_ref::<ExprError>() {
        return e.is_syntax();
    }
    matches!(
        e.downcast_ref::<CoreError>(),
        Some(CoreError::ConditionExpression { .. })
    )
}
