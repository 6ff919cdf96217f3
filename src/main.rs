mod archiver;
mod cache;
mod dom;
mod extractor;
mod fetcher;
mod models;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::models::RecordEntry;

#[derive(Parser)]
#[command(
    name = "ark_item_archiver",
    about = "Extracts ARK item data from saved wiki pages and caches item images locally"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape saved .html item pages into a JSON record set
    Extract {
        /// Directory of saved item pages
        #[arg(long, default_value = "scraped")]
        input_dir: PathBuf,
        /// Where to write the extracted records
        #[arg(long, default_value = "ark_data.json")]
        output: PathBuf,
    },
    /// Download referenced images and emit the final sorted JSON
    Cache {
        /// Record set produced by `extract`
        #[arg(long, default_value = "ark_data.json")]
        input: PathBuf,
        /// Where to write the normalized records
        #[arg(long, default_value = "ark_ase_asa_blueprints.json")]
        output: PathBuf,
        /// Directory holding cached image files
        #[arg(long, default_value = "ark_assets_img")]
        image_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Commands::Extract { input_dir, output } => {
            let extraction = extractor::extract_dir(&input_dir)?;
            let entries: Vec<RecordEntry> = extraction
                .records
                .into_iter()
                .map(|(key, record)| RecordEntry { key, record })
                .collect();
            archiver::write_record_lines(&output, &entries)?;
            println!(
                "Extracted {} records ({} unavailable pages skipped) to {}",
                entries.len(),
                extraction.skipped,
                output.display()
            );
        }
        Commands::Cache {
            input,
            output,
            image_dir,
        } => {
            let summary = cache::run(&input, &output, &image_dir)?;
            println!(
                "Images: {} downloaded, {} already cached, {} failed",
                summary.downloaded,
                summary.already_cached,
                summary.failures()
            );
            println!("Processed data saved to {}", output.display());
        }
    }
    Ok(())
}
