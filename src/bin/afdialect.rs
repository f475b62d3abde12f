//! afdialect: portable SQL inspector
//!
//! Dry-run the dialect translator from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Rewrite a portable query for SQL Server
//! afdialect --dialect sqlserver translate "select AFConcat(a, b) from t"
//!
//! # Show the effective CREATE TABLE template with tokens filled in
//! afdialect template create_table --set TABLENAME=users --set FIELDS="id INT"
//!
//! # List the portable vocabulary as JSON
//! afdialect functions --format json
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use afdialect::prelude::*;

#[derive(Parser)]
#[command(name = "afdialect")]
#[command(version)]
#[command(about = "Portable SQL rewriting and engine template inspection", long_about = None)]
#[command(after_help = "EXAMPLES:
    afdialect translate 'select AFUpper(name) from users where d < #TODAY#'
    afdialect --dialect mysql template select_top --set TABLENAME=users --set FIELDS=*
    afdialect --dialect sqlite functions --name AFAddDays")]
struct Cli {
    /// Target engine (overrides the config file)
    #[arg(short, long, env = "AFDIALECT_DIALECT")]
    dialect: Option<Dialect>,

    /// Config file (default: ./afdialect.toml, then the user config dir)
    #[arg(short, long, env = "AFDIALECT_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a portable query into engine SQL (reads stdin when QUERY is omitted)
    Translate {
        query: Option<String>,
    },
    /// Show the effective template for a command kind
    Template {
        /// Command kind, e.g. create_table or select-top
        kind: CommandKind,

        /// Fill a token: NAME=VALUE (the # delimiters are added)
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
        tokens: Vec<String>,
    },
    /// List the templates of every command kind
    Templates,
    /// List portable functions
    Functions {
        /// Only functions whose name contains this text
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List placeholders and their current values
    Placeholders,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "afdialect=debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = TranslatorConfig::discover(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    debug!(dialect = %config.dialect, "building translator");
    let translator = config.build();

    match &cli.command {
        Commands::Translate { query } => translate(&translator, query.as_deref(), cli),
        Commands::Template { kind, tokens } => template(&translator, *kind, tokens, cli),
        Commands::Templates => templates(&translator, cli.format),
        Commands::Functions { name } => functions(&translator, name.as_deref(), cli.format),
        Commands::Placeholders => placeholders(&translator, cli.format),
    }
}

fn translate(translator: &DialectTranslator, query: Option<&str>, cli: &Cli) -> Result<()> {
    let query = match query {
        Some(q) => q.to_string(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read query from stdin")?;
            buf.trim_end().to_string()
        }
    };
    if cli.verbose {
        println!("{} {}", "Input:".dimmed(), query.yellow());
    }

    let sql = translator.translate(&query)?;
    match cli.format {
        OutputFormat::Json => print_json(&json!({
            "dialect": translator.dialect(),
            "query": query,
            "sql": sql,
        }))?,
        OutputFormat::Table => {
            println!("{} {}", "Generated SQL".green().bold(), format!("({})", translator.dialect()).dimmed());
            println!("{}", sql.white());
        }
    }
    Ok(())
}

fn parse_token(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim().trim_matches('#');
    Ok((format!("#{}#", name), value.to_string()))
}

fn template(translator: &DialectTranslator, kind: CommandKind, tokens: &[String], cli: &Cli) -> Result<()> {
    let tokens = tokens
        .iter()
        .map(|raw| parse_token(raw))
        .collect::<Result<Vec<_>>>()?;
    let borrowed: Vec<(&str, &str)> = tokens.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect();
    let sql = translator.render(kind, &borrowed)?;
    let overridden = translator.templates().is_overridden(kind);

    match cli.format {
        OutputFormat::Json => print_json(&json!({
            "dialect": translator.dialect(),
            "kind": kind,
            "overridden": overridden,
            "template": sql,
        }))?,
        OutputFormat::Table => {
            let source = if overridden { "dialect override" } else { "shared default" };
            println!("{} {}", kind.to_string().cyan().bold(), format!("({})", source).dimmed());
            println!("{}", sql.white());
        }
    }
    Ok(())
}

fn templates(translator: &DialectTranslator, format: OutputFormat) -> Result<()> {
    let registry = translator.templates();
    let rows = registry.effective();
    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = rows
                .into_iter()
                .map(|(kind, text)| (kind.to_string(), json!(text)))
                .collect();
            print_json(&serde_json::Value::Object(map))?;
        }
        OutputFormat::Table => {
            let width = rows.iter().map(|(k, _)| k.as_str().len()).max().unwrap_or(0);
            for (kind, text) in &rows {
                let marker = if registry.is_overridden(*kind) { "*" } else { " " };
                println!(
                    "{} {:width$}  {}",
                    marker.yellow(),
                    kind.as_str().cyan(),
                    text.white(),
                    width = width
                );
            }
            println!();
            println!("{} template(s), {} = dialect override", rows.len().to_string().cyan(), "*".yellow());
        }
    }
    Ok(())
}

fn functions(translator: &DialectTranslator, filter: Option<&str>, format: OutputFormat) -> Result<()> {
    let filter = filter.map(str::to_ascii_lowercase);
    let entries: Vec<&FunctionTemplate> = translator
        .functions()
        .functions()
        .filter(|f| {
            filter
                .as_deref()
                .is_none_or(|needle| f.name.to_ascii_lowercase().contains(needle))
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("{}", "(no functions)".dimmed());
                return Ok(());
            }
            println!(
                "{:22} {:44} {}",
                "Function".white().bold(),
                "Template".white().bold(),
                "Description".white().bold()
            );
            println!("{}", "─".repeat(96).dimmed());
            for f in &entries {
                println!(
                    "{:22} {:44} {}",
                    format!("{}/{}", f.name, f.arity).cyan(),
                    f.template.yellow(),
                    f.description.as_deref().unwrap_or("").dimmed()
                );
            }
        }
    }
    Ok(())
}

fn placeholders(translator: &DialectTranslator, format: OutputFormat) -> Result<()> {
    let registry = translator.placeholders();
    let rows: Vec<(&str, &str)> = registry
        .names()
        .into_iter()
        .map(|name| (name, registry.resolve(name).unwrap_or_default()))
        .collect();

    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = rows
                .iter()
                .map(|(name, value)| (name.to_string(), json!(value)))
                .collect();
            print_json(&serde_json::Value::Object(map))?;
        }
        OutputFormat::Table => {
            for (name, value) in rows {
                println!("{:20} {}", name.cyan(), value.white());
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
