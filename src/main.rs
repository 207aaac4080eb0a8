use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use dql_rewriter::config::{self, FileConfig, RewriterConfig};
use dql_rewriter::operation::Operation;
use dql_rewriter::query_rewriter::arguments::parse_uid;
use dql_rewriter::schema_catalog::{global_schema_registry, initialize_global_schema, SchemaConfig};
use dql_rewriter::QueryRewriter;

/// dql-rewriter - Rewrite GraphQL operations into Dgraph DQL
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML schema definition
    #[arg(long)]
    schema: PathBuf,

    /// Operation document (JSON or YAML)
    #[arg(long)]
    operation: PathBuf,

    /// Node identifiers a mutation affected; rewrites mutation payloads instead of queries
    #[arg(long, value_delimiter = ',')]
    root_uids: Vec<String>,

    /// YAML rewriter configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum selection nesting depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Alias of the uid entry added to nested blocks
    #[arg(long)]
    uid_alias: Option<String>,

    /// Indentation width of the rendered query
    #[arg(long)]
    indent: Option<u8>,
}

impl From<&Cli> for config::CliConfig {
    fn from(cli: &Cli) -> Self {
        config::CliConfig {
            max_depth: cli.max_depth,
            uid_alias: cli.uid_alias.clone(),
            indent: cli.indent,
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut rewriter_config = RewriterConfig::from_env().context("Configuration error")?;
    if let Some(path) = &cli.config {
        let file = FileConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        rewriter_config = rewriter_config
            .merge(&file)
            .with_context(|| format!("Invalid config {}", path.display()))?;
    }
    let rewriter_config = rewriter_config
        .with_cli(&config::CliConfig::from(&cli))
        .context("Configuration error")?;

    let schema = SchemaConfig::from_yaml_file(&cli.schema)
        .and_then(|definition| definition.to_schema())
        .with_context(|| format!("Failed to load schema {}", cli.schema.display()))?;
    let operation = Operation::from_file(&cli.operation)
        .with_context(|| format!("Failed to load operation {}", cli.operation.display()))?;

    initialize_global_schema(schema)?;
    let registry =
        global_schema_registry().ok_or_else(|| anyhow!("Schema registry is not initialized"))?;
    let rewriter = QueryRewriter::from_registry(registry, rewriter_config);
    let query = if cli.root_uids.is_empty() {
        rewriter.rewrite_queries(&operation)?
    } else {
        let uids = cli
            .root_uids
            .iter()
            .map(|uid| parse_uid(uid))
            .collect::<Result<Vec<_>, _>>()?;
        rewriter.rewrite_mutations(&operation, &uids)?
    };

    log::info!("Rewrote operation into {} block(s)", query.blocks.len());
    println!("{}", rewriter.render(&query));
    Ok(())
}
