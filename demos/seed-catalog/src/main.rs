//! Seed Catalog: writes the product dataset the dashboard reads.
//!
//!   seed-catalog sample                     15 fixed showcase products
//!   seed-catalog extended --count 150       random catalog
//!
//! The target file is replaced atomically, so a running dashboard can stay up.

mod products;

use std::path::PathBuf;

use anyhow::{Context, Result};
use catalog::{write_products, DatasetStore, DEFAULT_DATASET_NAME, DEFAULT_DATA_DIR};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

#[derive(Parser)]
#[command(name = "seed-catalog", about = "Generate the product dataset")]
struct Cli {
    /// Directory the dataset is written into.
    #[arg(long, default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,

    /// Dataset file name, without the `.parquet` extension.
    #[arg(long, default_value = DEFAULT_DATASET_NAME, global = true)]
    name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// The fixed 15-product showcase catalog.
    Sample,
    /// A random catalog.
    Extended {
        #[arg(long, default_value_t = 150)]
        count: usize,
        /// RNG seed; omit for a different catalog each run.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let store = DatasetStore::from_dir(&cli.data_dir, &cli.name);

    let rows = match cli.command {
        Command::Sample => products::sample(),
        Command::Extended { count, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            products::extended(count, &mut rng)
        }
    };

    write_products(store.path(), &rows)
        .with_context(|| format!("Failed to write {}", store.path().display()))?;
    info!("✓ Created {} with {} products", store.path().display(), rows.len());
    Ok(())
}
