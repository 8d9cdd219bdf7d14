// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # mem-consumer
//!
//! Command-line interface for the synthetic memory-load generator.
//!
//! ## Usage
//! ```bash
//! # Follow a weekly pattern with 5% noise, 2 GB at 100%
//! mem-consumer run -f ./patterns/dhm.csv -n 5 -m 2000
//!
//! # Replay a pattern from its beginning for ten minutes
//! mem-consumer run -f ./patterns/ms.csv -b -d 600
//!
//! # Describe a pattern file
//! mem-consumer inspect -f ./patterns/m.csv
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mem-consumer",
    about = "Consumes memory following a time-dependent load pattern",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (flags given explicitly override it).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate memory following a pattern until the duration elapses or Ctrl-C.
    Run(commands::run::RunArgs),

    /// Describe a pattern file: granularity, resolution, cycle and current value.
    Inspect {
        /// CSV file with the memory consumption pattern.
        #[arg(short = 'f', long)]
        pattern_file: std::path::PathBuf,

        /// Noise in percent shown as the lookup bounds.
        #[arg(short, long, default_value_t = 0)]
        noise_percent: u32,
    },

    /// Display process and system memory.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => commands::run::execute(cli.config, args).await,
        Commands::Inspect {
            pattern_file,
            noise_percent,
        } => commands::inspect::execute(pattern_file, noise_percent).await,
        Commands::Status => commands::status::execute().await,
    }
}
