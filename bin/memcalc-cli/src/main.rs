// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memcalc
//!
//! Command-line interface for the JVM memory calculator.
//!
//! ## Usage
//! ```bash
//! # Switches for a 1G container
//! memcalc calculate --total-memory 1G --loaded-class-count 12000 --jvm-options "$JAVA_OPTS"
//!
//! # Use the cgroup limit, keep 5% head-room, custom weights
//! memcalc calculate --detect-memory-limits --head-room 5 --memory-weights heap:70,metaspace:15,stack:5,native:10
//!
//! # Show the detected container limit
//! memcalc detect
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "memcalc",
    about = "Calculates JVM memory switches that fit a memory limit",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (CLI arguments override it).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute memory switches and print them on stdout.
    Calculate(commands::calculate::CalculateArgs),

    /// Print the detected container memory limit.
    Detect {
        /// Fall back to total host memory when no cgroup limit is set.
        #[arg(long)]
        host_fallback: bool,

        /// Output format: text or json.
        #[arg(long, value_enum, default_value_t = commands::OutputFormat::Text)]
        format: commands::OutputFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Calculate(args) => commands::calculate::execute(cli.config, args),
        Commands::Detect {
            host_fallback,
            format,
        } => commands::detect::execute(host_fallback, format),
    }
}
