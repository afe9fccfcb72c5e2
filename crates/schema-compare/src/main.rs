//! schema-compare CLI
//!
//! Command-line tool for comparing relational schema snapshots.

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use schema_compare::prelude::*;
use schema_compare_core::DEFAULT_TABLE_RENAME_THRESHOLD;

/// Compare relational schema snapshots and report semantic changes.
#[derive(Parser)]
#[command(name = "schema-compare")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Minimum column overlap (0.0 to 1.0) for pairing a dropped and an
    /// added table as a rename.
    #[arg(
        short,
        long,
        env = "SCHEMA_COMPARE_RENAME_THRESHOLD",
        default_value_t = DEFAULT_TABLE_RENAME_THRESHOLD,
        value_parser = parse_threshold
    )]
    threshold: f64,

    /// Report renames as drop + create.
    #[arg(long)]
    no_renames: bool,

    /// Report moved columns as drop + create, and ignore reordering.
    #[arg(long)]
    no_moves: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two snapshots.
    Compare {
        /// The old snapshot (SQLite database or JSON document).
        old: String,

        /// The new snapshot (SQLite database or JSON document).
        new: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show the tables, columns and foreign keys of a snapshot.
    Inspect {
        /// The snapshot (SQLite database or JSON document).
        source: String,

        /// Output format. `json` writes a schema document that can be
        /// compared later.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Compare a sequence of snapshots, oldest first.
    History {
        /// The snapshots, oldest first.
        #[arg(required = true, num_args = 2..)]
        sources: Vec<String>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Fixed-format text report.
    #[default]
    Text,
    /// JSON.
    Json,
}

fn parse_threshold(raw: &str) -> std::result::Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0.0 and 1.0, got {value}"))
    }
}

fn matcher_options(cli: &Cli) -> MatcherOptions {
    let mut options = MatcherOptions::new().with_rename_threshold(cli.threshold);
    if cli.no_renames {
        options = options.without_rename_detection();
    }
    if cli.no_moves {
        options = options.without_move_detection();
    }
    debug!(?options, "matcher options");
    options
}

async fn load_all(sources: &[String]) -> anyhow::Result<Vec<SchemaGraph>> {
    let mut graphs = Vec::with_capacity(sources.len());
    for source in sources {
        graphs.push(load_schema(source).await?);
    }
    Ok(graphs)
}

fn print_inspection(source: &str, graph: &SchemaGraph) {
    println!("Schema: {source}");
    println!(
        "Tables: {}, columns: {}, foreign keys: {}",
        graph.table_count(),
        graph.column_count(),
        graph.foreign_keys().len()
    );

    let document = DatabaseSchema::from_graph(graph);
    for table in &document.tables {
        println!("\n{}", table.name);
        println!("{:-<40}", "");
        for column in &table.columns {
            let mut line = format!("  {} {}", column.name, column.sql_type);
            if column.primary_key {
                line.push_str(" PRIMARY KEY");
            }
            if column.auto_increment {
                line.push_str(" AUTOINCREMENT");
            }
            if column.not_null {
                line.push_str(" NOT NULL");
            }
            if column.unique {
                line.push_str(" UNIQUE");
            }
            if let Some(expr) = &column.default {
                line.push_str(&format!(" DEFAULT {expr}"));
            }
            if let Some(expr) = &column.check {
                line.push_str(&format!(" CHECK ({expr})"));
            }
            println!("{}", line.trim_end());
        }
    }

    if !graph.foreign_keys().is_empty() {
        println!("\nForeign keys:");
        for fk in graph.foreign_keys() {
            println!("  {fk}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let comparer = SchemaComparer::with_options(matcher_options(&cli));

    match cli.command {
        Commands::Compare { old, new, format } => {
            let graphs = load_all(&[old, new]).await?;
            let result = comparer.compare(&graphs[0], &graphs[1])?;
            match format {
                OutputFormat::Text => println!("{result}"),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            }
        }

        Commands::Inspect { source, format } => {
            let graph = load_schema(&source).await?;
            match format {
                OutputFormat::Text => print_inspection(&source, &graph),
                OutputFormat::Json => {
                    let document = DatabaseSchema::from_graph(&graph);
                    println!("{}", serde_json::to_string_pretty(&document)?);
                }
            }
        }

        Commands::History { sources, format } => {
            let graphs = load_all(&sources).await?;
            let results = compare_history_with(&comparer, &graphs)?;
            info!(steps = results.len(), "history compared");
            match format {
                OutputFormat::Text => {
                    for (step, result) in results.iter().enumerate() {
                        println!("\n{} -> {}", sources[step], sources[step + 1]);
                        println!("{result}");
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            }
        }
    }

    Ok(())
}
