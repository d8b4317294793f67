/*
1. flatten the raw export into Context/Utterance pairs
cargo run --bin prepare_fb_data -- \
    process_raw_export data/tf.txt.gz data/tf_processed.csv

2. train/test/valid sets (2:1:1) from the pairs
cargo run --bin prepare_fb_data -- \
    generate_data_sets data/tf_processed.csv \
    --output-dir data \
    --seed 42
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use prepare_fb_data::config::{DEFAULT_NUM_DISTRACTORS, DEFAULT_OUTPUT_DIR};
use prepare_fb_data::logging::init_logging;
use prepare_fb_data::{generate_data_sets, process_raw_export, DatasetConfig};

// CLI
#[derive(Parser, Debug)]
#[command(version, about = "Turn a raw post/comment export into retrieval-dialogue train/test/valid sets.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    // Directory for the run log
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten a (optionally .gz) raw export into a Context/Utterance file
    #[command(name = "process_raw_export")]
    ProcessRawExport {
        raw_input: PathBuf,
        output: PathBuf,
    },

    /// Build train_set.csv, test_set.csv and valid_set.csv from a pair file
    #[command(name = "generate_data_sets")]
    GenerateDataSets(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    processed_input: PathBuf,

    // Where the three fixed-name files go
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    // Distractors per test/valid row
    #[arg(long, default_value_t = DEFAULT_NUM_DISTRACTORS)]
    num_distractors: usize,

    // Seed for a reproducible split; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

impl From<GenerateArgs> for DatasetConfig {
    fn from(a: GenerateArgs) -> Self {
        DatasetConfig {
            output_dir: a.output_dir,
            num_distractors: a.num_distractors,
            seed: a.seed,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = init_logging(&cli.log_dir, "prepare_fb_data")?;

    match cli.command {
        Command::ProcessRawExport { raw_input, output } => {
            println!("Processing the raw export: {}", raw_input.display());
            let summary = process_raw_export(&raw_input, &output)
                .with_context(|| format!("process_raw_export failed for {}", raw_input.display()))?;

            println!("\n=== Export summary ===");
            println!("Records read       : {}", summary.lines);
            println!("Posts w/o comments : {}", summary.posts_without_comments);
            println!("Pairs written      : {}", summary.pairs);
            println!("Output             : {:?}", summary.output);
        }
        Command::GenerateDataSets(args) => {
            println!("Generating data sets with: {}", args.processed_input.display());
            let input = args.processed_input.clone();
            let cfg = DatasetConfig::from(args);
            let summary = generate_data_sets(&input, &cfg)
                .with_context(|| format!("generate_data_sets failed for {}", input.display()))?;

            println!("\n=== Data set summary ===");
            println!("Seed               : {}", summary.seed);
            println!("Pairs read         : {}", summary.input_rows);
            println!("Train rows         : {}", summary.train_rows);
            println!("Test rows          : {}", summary.test_rows);
            println!("Valid rows         : {}", summary.valid_rows);
            for path in &summary.outputs {
                println!("Output             : {:?}", path);
            }
        }
    }

    println!("Log file           : {:?}", log_path);
    info!("All done successfully.");
    Ok(())
}
