//! wxgraph CLI - Mini Program component dependency analysis
//!
//! Commands:
//! - `analyze` - Build a dependency graph from a pages directory
//! - `stats` - Show statistics for a saved graph report
//! - `usages` - Find where the component containing a file is used

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use wxgraph_core::{
    find_component_usages, GraphBuilder, GraphReport, GraphStatistics, MatchStrategy,
};

/// wxgraph - Mini Program component dependency analysis
#[derive(Parser)]
#[command(name = "wxgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    /// Markup-tree walk with automatic regex fallback
    Structured,
    /// Raw-text regex scan only
    Regex,
}

impl From<StrategyArg> for MatchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Structured => MatchStrategy::Structured,
            StrategyArg::Regex => MatchStrategy::Regex,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a dependency graph from a pages directory
    Analyze {
        /// Pages directory to scan
        #[arg(short, long)]
        pages: PathBuf,

        /// Project component root; anchors /-prefixed references and graph
        /// keys (defaults to the parent of the pages directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Write the graph report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Matching strategy
        #[arg(long, value_enum, default_value_t = StrategyArg::Structured)]
        strategy: StrategyArg,
    },

    /// Show statistics for a saved graph report
    Stats {
        /// Graph report written by `analyze --output`
        #[arg(short, long)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find where the component containing a file is used
    Usages {
        /// A file inside the component directory to query
        #[arg(short, long)]
        file: PathBuf,

        /// Project root to scan (defaults to the current directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Analyze {
            pages,
            root,
            output,
            strategy,
        } => cmd_analyze(pages, root, output, strategy.into()),
        Commands::Stats { input, json } => cmd_stats(input, json),
        Commands::Usages { file, root, json } => cmd_usages(file, root, json),
    }
}

fn cmd_analyze(
    pages: PathBuf,
    root: Option<PathBuf>,
    output: Option<PathBuf>,
    strategy: MatchStrategy,
) -> Result<()> {
    let root = match root {
        Some(root) => root,
        None => pages
            .parent()
            .context("Pages directory has no parent; pass --root explicitly")?
            .to_path_buf(),
    };

    let start = Instant::now();
    let mut builder = GraphBuilder::with_strategy(&root, strategy);
    let graph = builder
        .build(&pages)
        .with_context(|| format!("Failed to analyze {}", pages.display()))?;
    info!("Analysis took {:.2?}", start.elapsed());

    let report = GraphReport::new(&pages, graph);
    print_statistics(&report.metadata.statistics);

    if let Some(output) = output {
        report
            .write_json(&output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("Report written to {}", output.display());
    }

    Ok(())
}

fn cmd_stats(input: PathBuf, json: bool) -> Result<()> {
    let report =
        GraphReport::load(&input).with_context(|| format!("Failed to load {}", input.display()))?;

    // Recompute rather than trust the stored block; the graph is the truth
    let stats = GraphStatistics::compute(&report.dependency_graph);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Scan path: {}", report.metadata.scan_path);
        println!("Generated: {}", report.metadata.timestamp.to_rfc3339());
        print_statistics(&stats);
    }

    Ok(())
}

fn cmd_usages(file: PathBuf, root: Option<PathBuf>, json: bool) -> Result<()> {
    let usages = find_component_usages(&file, root.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&usages)?);
        return Ok(());
    }

    if usages.is_empty() {
        println!("No usages found");
        return Ok(());
    }

    println!("Found {} usage(s):", usages.len());
    for usage in &usages {
        println!("  {} in {}", usage.component_name, usage.relative_file_path);
        for position in &usage.positions {
            println!(
                "    {}:{}:{}",
                usage.markup_relative_path, position.line, position.column
            );
        }
    }

    Ok(())
}

fn print_statistics(stats: &GraphStatistics) {
    println!("Files:        {}", stats.total_files);
    println!("Dependencies: {}", stats.total_dependencies);
    println!("References:   {}", stats.total_references);
    if stats.most_referenced_target.count > 0 {
        println!(
            "Most referenced: {} ({} reference{})",
            stats.most_referenced_target.path,
            stats.most_referenced_target.count,
            if stats.most_referenced_target.count == 1 {
                ""
            } else {
                "s"
            }
        );
    }
    println!(
        "Avg references/dependency: {:.2}",
        stats.average_references_per_dependency
    );
}
