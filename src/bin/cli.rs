//! AtlasLog CLI
//!
//! Command-line interface for appending to and paging through an event log.

use std::process;

use atlaslog::{Config, EventStorage, MB};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// AtlasLog CLI
#[derive(Parser, Debug)]
#[command(name = "atlaslog-cli")]
#[command(about = "CLI for the AtlasLog append-only event log")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./atlaslog_data")]
    data_dir: String,

    /// Segment size in MB before rotation
    #[arg(short = 'm', long, default_value = "100")]
    segment_mb: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append records (one per argument) and flush
    Write {
        /// Records to append
        #[arg(required = true)]
        records: Vec<String>,
    },

    /// Print records, one per line
    Read {
        /// Maximum number of records
        #[arg(short, long, default_value = "10")]
        count: usize,

        /// Number of records to skip
        #[arg(short, long, default_value = "0")]
        offset: usize,
    },

    /// List registered segments
    Segments,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,atlaslog=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .segment_max_size(args.segment_mb * MB)
        .build();

    let storage = match EventStorage::open(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to open event storage: {}", e);
            process::exit(1);
        }
    };

    let result = match args.command {
        Commands::Write { records } => write_records(&storage, &records),
        Commands::Read { count, offset } => {
            for event in storage.read(count, offset) {
                println!("{}", String::from_utf8_lossy(&event));
            }
            Ok(())
        }
        Commands::Segments => {
            for (index, name) in storage.registry_entries().iter().enumerate() {
                println!("{}\t{}", index + 1, name);
            }
            Ok(())
        }
    };

    storage.shutdown();

    if let Err(e) = result {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn write_records(storage: &EventStorage, records: &[String]) -> atlaslog::Result<()> {
    let mut bytes = 0;
    for record in records {
        bytes += storage.write(record.as_bytes())?;
    }
    let flushed = storage.flush()?;

    println!("{} record(s) written, {} bytes", flushed, bytes);
    Ok(())
}
