use anyhow::Result;
use clap::{Parser, ValueEnum};

use cpm_community_analyzer::config::{Config, DuplicatePolicy};
use cpm_community_analyzer::data::{loader, validate_records};
use cpm_community_analyzer::pipeline::{prepare_graph, Analysis};
use cpm_community_analyzer::storage;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Duplicates {
    Sum,
    Max,
}

impl From<Duplicates> for DuplicatePolicy {
    fn from(value: Duplicates) -> Self {
        match value {
            Duplicates::Sum => DuplicatePolicy::Sum,
            Duplicates::Max => DuplicatePolicy::Max,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "cpm-community-analyzer",
    about = "Overlapping community detection on character interaction graphs (clique percolation)"
)]
struct Cli {
    /// Path to interactions table (CSV or Parquet) with source,target[,weight]
    #[clap(long)]
    interactions: String,

    /// Optional character table with id|name[,faction,...]
    #[clap(long)]
    characters: Option<String>,

    /// Keep interactions with weight >= threshold
    #[clap(long, default_value = "4")]
    threshold: f64,

    /// One or more clique sizes; each is run separately
    #[clap(long, num_args = 1.., default_values_t = vec![3usize, 4])]
    k: Vec<usize>,

    /// How repeated pairs are combined
    #[clap(long, value_enum, default_value = "sum")]
    duplicates: Duplicates,

    /// Minimum community size to report
    #[clap(long, default_value = "1")]
    min_community_size: usize,

    /// Output directory for results
    #[clap(long, default_value = "cpm_output")]
    output_dir: String,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let base = Config::new(
        args.threshold,
        args.k.first().copied().unwrap_or(3),
        args.duplicates.into(),
        args.min_community_size,
    );

    // Reject every bad parameter before reading any input
    for &k in &args.k {
        base.with_k(k).validate()?;
    }

    log::info!("Starting clique percolation analysis");
    log::info!("Interactions: {}", args.interactions);
    log::info!("Output: {}", args.output_dir);

    std::fs::create_dir_all(&args.output_dir)?;

    // 1. Load and validate data
    let raw = loader::load_interactions(&args.interactions)?;
    let edges = validate_records(&raw)?;

    let nodes = match &args.characters {
        Some(path) if std::path::Path::new(path).exists() => loader::load_characters(path)?,
        Some(path) => {
            log::warn!("Character file {} not found, continuing without factions", path);
            Vec::new()
        }
        None => Vec::new(),
    };

    // 2. Build the thresholded graph
    let graph = prepare_graph(&edges, &nodes, &base)?;
    log::info!("Graph uses about {} bytes", graph.memory_usage());

    storage::save_graph_dot(&graph, &args.output_dir)?;

    // 3. Percolate and save for each k
    for &k in &args.k {
        let analysis = Analysis::from_graph(graph.clone(), base.with_k(k))?;

        for community in &analysis.result.communities {
            log::info!("  k={} community {}: {}", k, community.id, community.label);
        }

        storage::save_results(&analysis, &args.output_dir)?;
    }

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
