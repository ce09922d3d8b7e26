//! iam-krn command-line tool
//!
//! Parses, matches and expands KRNs and actions, and evaluates requests
//! against a statement store.

use anyhow::Context;
use clap::{Parser, Subcommand};
use iam_krn::{
    config::{AppConfig, LogFormat, load_config},
    identifier::{Action, Krn},
    store::{
        Effect, EvaluationRequest, MemoryStore, QueryKind, StatementGenerator, StatementStore,
        render_query,
    },
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// IAM resource names and actions - parse, match and evaluate
#[derive(Parser, Debug)]
#[command(name = "iam-krn")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "IAM_KRN_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides logging.level
    #[arg(long, env = "IAM_KRN_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an identifier and print its canonical form and parts
    Parse {
        text: String,

        /// Treat the text as an action instead of a KRN
        #[arg(long)]
        action: bool,
    },

    /// Print every pattern that matches an identifier
    Patterns {
        text: String,

        /// Treat the text as an action instead of a KRN
        #[arg(long)]
        action: bool,
    },

    /// Check whether VALUE falls within PATTERN
    Matches {
        value: String,

        pattern: String,

        /// Treat both operands as actions instead of KRNs
        #[arg(long)]
        action: bool,
    },

    /// Evaluate a request against the configured statement store
    Evaluate {
        /// Requested action
        #[arg(long)]
        action: String,

        /// Requested resource; repeat to ask about an explicit list of resources
        #[arg(long = "resource", required = true)]
        resources: Vec<String>,

        /// Requesting principal
        #[arg(long)]
        principal: String,

        /// Only consider statements with this effect (allow, deny)
        #[arg(long)]
        effect: Option<Effect>,

        /// Question to ask (exists, statement_ids, resources, principals)
        #[arg(long, default_value = "exists")]
        query: QueryKind,

        /// Print the SQL query instead of running it
        #[arg(long)]
        sql: bool,

        /// Group matching resources by effect
        #[arg(long, conflicts_with_all = ["sql", "effect"])]
        by_effect: bool,
    },

    /// Print generated statements as JSON
    Generate {
        /// RNG seed; overrides generator.seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn describe_krn(krn: &Krn) -> Value {
    json!({
        "canonical": krn.as_str(),
        "wildcard": krn.is_wildcard(),
        "wildcard_level": krn.wildcard_level().map(|l| l.as_str()),
        "prefix_token": krn.prefix_token(),
        "service": krn.service(),
        "tenant_id": krn.tenant_id(),
        "pool": krn.pool(),
        "resource_type": krn.resource_type(),
        "resource_path": krn.resource_path(),
        "resource_id": krn.resource_id(),
        "base64": krn.to_base64(),
    })
}

fn describe_action(action: &Action) -> Value {
    json!({
        "canonical": action.as_str(),
        "wildcard": action.is_wildcard(),
        "segments": action.segments().collect::<Vec<_>>(),
        "base64": action.to_base64(),
    })
}

/// Statements from the configured file, or generated ones
fn open_store(config: &AppConfig) -> anyhow::Result<MemoryStore> {
    match &config.store.statements_path {
        Some(path) => {
            let expanded = shellexpand::tilde(path);
            MemoryStore::from_path(expanded.as_ref())
                .with_context(|| format!("Failed to load statements from {}", path))
        }
        None => {
            let statements = StatementGenerator::new(&config.generator).generate()?;
            info!(statements = statements.len(), "Generated statements");
            Ok(MemoryStore::new(statements)?)
        }
    }
}

async fn evaluate(
    config: &AppConfig,
    request: EvaluationRequest,
    query: QueryKind,
    by_effect: bool,
) -> anyhow::Result<()> {
    let store = open_store(config)?;

    if by_effect {
        return print_json(&store.resources_by_effect(&request).await?);
    }

    match query {
        QueryKind::Exists => print_json(&store.exists(&request).await?),
        QueryKind::StatementIds => print_json(&store.statement_ids(&request).await?),
        QueryKind::Resources => print_json(&store.matching_resources(&request).await?),
        QueryKind::Principals => print_json(&store.matching_principals(&request).await?),
    }
}

async fn run(config: AppConfig, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Parse { text, action: true } => print_json(&describe_action(&text.parse()?)),
        Command::Parse { text, action: false } => print_json(&describe_krn(&text.parse()?)),

        Command::Patterns { text, action: true } => {
            print_json(&Action::parse(&text)?.ancestor_patterns())
        }
        Command::Patterns {
            text,
            action: false,
        } => print_json(&Krn::parse(&text)?.ancestor_patterns()),

        Command::Matches {
            value,
            pattern,
            action: true,
        } => print_json(&Action::parse(&value)?.matches(&Action::parse(&pattern)?)),
        Command::Matches {
            value,
            pattern,
            action: false,
        } => print_json(&Krn::parse(&value)?.matches(&Krn::parse(&pattern)?)),

        Command::Evaluate {
            action,
            resources,
            principal,
            effect,
            query,
            sql,
            by_effect,
        } => {
            let mut request = EvaluationRequest::parse(&action, &resources, &principal)?;
            if let Some(effect) = effect.or(config.store.effect) {
                request = request.with_effect(effect);
            }
            debug!(?request, %query, "Built evaluation request");

            if sql {
                return print_json(&render_query(query, &request));
            }
            evaluate(&config, request, query, by_effect).await
        }

        Command::Generate { seed } => {
            let mut generator_config = config.generator.clone();
            if seed.is_some() {
                generator_config.seed = seed;
            }
            print_json(&StatementGenerator::new(&generator_config).generate()?)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration decides the log format, so load it before logging starts
    let config = load_config(args.config.as_deref());
    let (level, format) = match &config {
        Ok(config) => (config.logging.level.clone(), config.logging.format),
        Err(_) => ("info".to_string(), LogFormat::Pretty),
    };
    init_logging(args.log_level.as_deref().unwrap_or(&level), format);

    let config = config.inspect_err(|e| error!(error = %e, "Failed to load configuration"))?;

    debug!(version = env!("CARGO_PKG_VERSION"), "Starting iam-krn");

    run(config, args.command)
        .await
        .inspect_err(|e| error!(error = %e, "Command failed"))
}
