//! orm-reverse CLI - schema reverse engineering and SQL dialect tools.

use clap::{Parser, Subcommand};
use orm_reverse::{Config, Database, Platform, PlatformImpl, ReverseError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "orm-reverse")]
#[command(about = "Reverse engineer database schemas and render vendor SQL")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the configured catalog and print the schema
    Reverse,

    /// Render CREATE TABLE DDL for a serialized schema (YAML or JSON)
    Ddl {
        /// Schema file written by `reverse`
        #[arg(long)]
        schema: PathBuf,

        /// Target platform: mssql or pervasive
        #[arg(long)]
        platform: String,
    },

    /// Rewrite a SELECT statement to return a window of rows
    Limit {
        /// Target platform: mssql or pervasive
        #[arg(long)]
        platform: String,

        /// Rows to skip
        #[arg(long, default_value = "0")]
        offset: i64,

        /// Rows to return
        #[arg(long)]
        limit: i64,

        /// The SELECT statement
        sql: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), ReverseError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    match cli.command {
        Commands::Reverse => {
            let config = Config::load(&cli.config)?;
            info!("Loaded configuration from {:?}", cli.config);

            let result = orm_reverse::reverse::run(&config).await?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                print!("{}", result.schema_yaml()?);
                eprintln!(
                    "Reverse engineered {} tables from {} in {:.2}s",
                    result.tables, result.backend, result.duration_seconds
                );
                for warning in &result.warnings {
                    eprintln!("  warning: {}", warning);
                }
            }
        }

        Commands::Ddl { schema, platform } => {
            let platform = PlatformImpl::from_db_type(&platform)?;
            let database = load_schema(&schema)?;
            print!("{}", platform.add_tables_ddl(&database)?);
        }

        Commands::Limit {
            platform,
            offset,
            limit,
            sql,
        } => {
            let platform = PlatformImpl::from_db_type(&platform)?;
            let mut sql = sql;
            platform.apply_limit(&mut sql, offset, limit)?;

            if cli.output_json {
                println!("{}", serde_json::json!({ "sql": sql }));
            } else {
                println!("{}", sql);
            }
        }
    }

    Ok(())
}

/// Read a schema written by `reverse`; `.json` files are JSON, anything else YAML.
fn load_schema(path: &Path) -> Result<Database, ReverseError> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
