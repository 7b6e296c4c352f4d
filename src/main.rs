//! image_craft - apply a chain of filters to a BMP image
//!
//! Loads a 24-bit BMP, runs each `-filter args...` group in order, and saves
//! the result.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use image_craft::{bmp, parse_chain, FilterRegistry};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// Long options only: filter tokens such as -crop or -sepia must never be
// taken for clusters of short flags.
#[derive(Parser)]
#[command(name = "image_craft")]
#[command(version, about = "Apply filters to 24-bit BMP images")]
#[command(after_help = "
Filters follow the output path, each as -name followed by its arguments.
Run with --list to see every filter.

Examples:
  image_craft input.bmp output.bmp -crop 800 600 -gs -blur 0.5
  image_craft input.bmp output.bmp -neg -vignette
  image_craft --seed 7 input.bmp output.bmp -crystallize -sepia
")]
struct Cli {
    /// Input BMP file
    #[arg(required_unless_present = "list")]
    input: Option<PathBuf>,

    /// Output BMP file
    #[arg(required_unless_present = "list")]
    output: Option<PathBuf>,

    /// Filter chain, e.g. -crop 800 600 -gs -blur 0.5
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    filters: Vec<String>,

    /// Seed for randomized filters (crystallize, glass); entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(long)]
    verbose: bool,

    /// Print the input file's BMP headers
    #[arg(long)]
    info: bool,

    /// List available filters and exit
    #[arg(long)]
    list: bool,

    /// Number of threads (0 = auto)
    #[arg(long, default_value = "0")]
    threads: usize,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let registry = FilterRegistry::standard();
    if cli.list {
        print!("{}", registry.help());
        return Ok(());
    }

    let (Some(input), Some(output)) = (cli.input, cli.output) else {
        anyhow::bail!("input and output paths are required");
    };

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    // Parse the whole chain up front so a typo fails before any work
    let chain = parse_chain(cli.filters.as_slice()).context("Invalid filter chain")?;
    for call in &chain {
        if registry.get(&call.name).is_none() {
            anyhow::bail!("Unknown filter: {}", call.name);
        }
    }

    if cli.info {
        let header = bmp::probe(&input)
            .with_context(|| format!("Failed to read headers of {}", input.display()))?;
        println!("{}", header);
    }

    info!("Loading image: {}", input.display());
    let mut image = bmp::load(&input)
        .with_context(|| format!("Error loading image {}", input.display()))?;
    info!("Image loaded: {}x{} pixels", image.width(), image.height());

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    debug!(seed = ?cli.seed, filters = chain.len(), "Filter chain ready");

    for call in &chain {
        info!("Applying filter: {}", call.name);
        registry
            .apply(&call.name, &mut image, &call.args, &mut rng)
            .with_context(|| format!("Error applying filter {}", call.name))?;
    }

    info!("Saving image: {}", output.display());
    bmp::save(&output, &image)
        .with_context(|| format!("Error saving image {}", output.display()))?;

    info!("Done!");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
