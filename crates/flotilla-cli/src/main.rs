use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use flotilla_config::{load_account_configs, load_document, validate, AccountConfig};
use flotilla_core::WavePlan;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// flotilla — multi-account deployment configuration toolkit
///
/// Inspect, validate, and resolve the per-account YAML configurations that
/// feed a multi-account deployment pipeline. Nothing here talks to the
/// cloud; resolution is a local, deterministic build step.
#[derive(Parser)]
#[command(name = "flotilla", version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the accounts discovered in a configuration directory
    List {
        /// Directory containing per-account YAML documents
        config_dir: PathBuf,
    },

    /// Validate every account document without resolving it
    Validate {
        /// Directory containing per-account YAML documents
        config_dir: PathBuf,
    },

    /// Print fully resolved account configurations
    Resolve {
        /// Directory containing per-account YAML documents
        config_dir: PathBuf,

        /// Only resolve the named account
        #[arg(short, long)]
        account: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Show how accounts partition into deployment waves
    Plan {
        /// Directory containing per-account YAML documents
        config_dir: PathBuf,

        /// Account names that deploy in the production wave
        #[arg(long = "production", value_name = "NAME")]
        production: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::List { config_dir } => cmd_list(&config_dir),
        Commands::Validate { config_dir } => cmd_validate(&config_dir),
        Commands::Resolve {
            config_dir,
            account,
            format,
        } => cmd_resolve(&config_dir, account.as_deref(), format),
        Commands::Plan {
            config_dir,
            production,
        } => cmd_plan(&config_dir, production),
    }
}

fn cmd_list(config_dir: &Path) -> Result<()> {
    let accounts = load_account_configs(config_dir)
        .with_context(|| format!("Failed to load configs from {}", config_dir.display()))?;

    if accounts.is_empty() {
        println!("No account configurations found in {}", config_dir.display());
        return Ok(());
    }

    println!(
        "{} {}",
        style("Accounts:").bold().cyan(),
        style(format!("({})", accounts.len())).dim()
    );
    for account in &accounts {
        println!(
            "  {} {}  account={}  region={}  includes={}",
            style("•").green(),
            style(&account.name).bold(),
            account.aws_account.as_deref().unwrap_or("-"),
            account.aws_region.as_deref().unwrap_or("-"),
            include_count(account)
        );
    }
    Ok(())
}

fn cmd_validate(config_dir: &Path) -> Result<()> {
    let paths = account_document_paths(config_dir)?;
    if paths.is_empty() {
        anyhow::bail!("No account documents found in {}", config_dir.display());
    }

    let mut error_count = 0;
    for path in &paths {
        let document = load_document(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let result = validate(&document);

        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();

        if result.is_valid() && result.warnings.is_empty() {
            println!("{} {}", style("✓").green().bold(), name);
        } else if result.is_valid() {
            println!("{} {}", style("⚠").yellow().bold(), name);
        } else {
            println!("{} {}", style("✗").red().bold(), name);
        }

        for error in &result.errors {
            println!("    {} {}", style("error:").red(), error);
        }
        for warning in &result.warnings {
            println!("    {} {}", style("warning:").yellow(), warning);
        }
        error_count += result.errors.len();
    }

    if error_count > 0 {
        anyhow::bail!("{error_count} validation error(s)");
    }
    Ok(())
}

fn cmd_resolve(config_dir: &Path, account: Option<&str>, format: OutputFormat) -> Result<()> {
    let accounts = load_account_configs(config_dir)
        .with_context(|| format!("Failed to load configs from {}", config_dir.display()))?;

    let selected: Vec<&AccountConfig> = match account {
        Some(name) => {
            let found = accounts.iter().find(|a| a.name == name);
            match found {
                Some(account) => vec![account],
                None => anyhow::bail!(
                    "Account '{name}' not found (available: {})",
                    accounts
                        .iter()
                        .map(|a| a.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }
        }
        None => accounts.iter().collect(),
    };

    for (i, account) in selected.iter().enumerate() {
        if selected.len() > 1 && i > 0 {
            println!();
        }
        if selected.len() > 1 {
            println!("{} {}", style("#").dim(), style(&account.name).bold().cyan());
        }
        match format {
            OutputFormat::Yaml => {
                let yaml = serde_yml::to_string(&account.full_config.to_yaml_value())
                    .context("Failed to render YAML")?;
                print!("{yaml}");
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&account.full_config.to_json_value())
                    .context("Failed to render JSON")?;
                println!("{json}");
            }
        }
    }
    Ok(())
}

fn cmd_plan(config_dir: &Path, production: Vec<String>) -> Result<()> {
    let production_names: HashSet<String> = production.into_iter().collect();
    let plan = WavePlan::from_config_dir(config_dir, &production_names)
        .with_context(|| format!("Failed to plan waves for {}", config_dir.display()))?;

    if plan.is_empty() {
        println!("No account configurations found in {}", config_dir.display());
        return Ok(());
    }

    print_wave("Wave 1 (pre-production)", &plan.pre_production);
    print_wave("Wave 2 (production)", &plan.production);
    Ok(())
}

fn print_wave(title: &str, stages: &[flotilla_core::StageDefinition]) {
    println!("{}", style(title).bold().cyan());
    if stages.is_empty() {
        println!("  {}", style("(empty)").dim());
        return;
    }
    for stage in stages {
        let target = if stage.has_target() {
            format!(
                "{} / {}",
                stage.aws_account.as_deref().unwrap_or("-"),
                stage.aws_region.as_deref().unwrap_or("-")
            )
        } else {
            "no target".to_string()
        };
        println!(
            "  {} {}  {}",
            style("▶").green(),
            style(&stage.name).bold(),
            style(target).dim()
        );
    }
}

/// Account documents in a config directory, sorted by filename.
fn account_document_paths(config_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(config_dir)
        .with_context(|| format!("Failed to read {}", config_dir.display()))?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e == "yaml" || e == "yml")
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn include_count(account: &AccountConfig) -> usize {
    account
        .full_config
        .get("include")
        .and_then(|i| i.as_sequence())
        .map(<[flotilla_config::ConfigValue]>::len)
        .unwrap_or(0)
}
