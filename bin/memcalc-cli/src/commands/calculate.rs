// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `memcalc calculate`: print the memory switches for a configuration.
//!
//! Switches go to stdout as a single space-separated line so the output
//! can be appended to `JAVA_OPTS`; warnings go to stderr.

use super::OutputFormat;
use anyhow::Context;
use calculator::{parse_clauses, parse_weights, Calculator, CalculatorConfig};
use std::path::PathBuf;

#[derive(clap::Args, Debug, Default)]
pub struct CalculateArgs {
    /// Total memory available to the JVM (e.g. "512M", "2G").
    #[arg(short = 't', long)]
    total_memory: Option<String>,

    /// Read the total from the container's cgroup memory limit.
    #[arg(long, conflicts_with = "total_memory")]
    detect_memory_limits: bool,

    /// Number of threads the stack must cover (0 estimates it).
    #[arg(long)]
    thread_count: Option<usize>,

    /// Number of classes the application loads.
    #[arg(long)]
    loaded_class_count: Option<u64>,

    /// JVM options already in effect, typically $JAVA_OPTS.
    #[arg(long, allow_hyphen_values = true)]
    jvm_options: Option<String>,

    /// Percentage of total memory left unallocated.
    #[arg(long)]
    head_room: Option<f64>,

    /// JRE version; before 1.8 permgen is sized instead of metaspace.
    #[arg(long)]
    jre_version: Option<String>,

    /// Do not reserve the default code cache (240M), direct memory (10M)
    /// and stack (1M per thread) for unweighted regions.
    #[arg(long)]
    no_fixed_defaults: bool,

    /// Fraction of the heap for the young generation (-Xmn), e.g. 0.3.
    #[arg(long)]
    heap_young_generation_ratio: Option<f64>,

    /// Fraction of the heap share given to direct memory, e.g. 0.1.
    #[arg(long)]
    direct_memory_to_heap_ratio: Option<f64>,

    /// Bucket weights, e.g. "heap:75,metaspace:10,stack:5,native:10".
    #[arg(long)]
    memory_weights: Option<String>,

    /// Bucket size ranges, e.g. "heap:64m..1g,stack:256k".
    #[arg(long)]
    memory_sizes: Option<String>,

    /// Initial sizes as percentages of the maximum, e.g. "heap:50%".
    #[arg(long)]
    memory_initials: Option<String>,

    /// Output format: text or json.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl CalculateArgs {
    /// Applies the flags on top of `config`.
    fn apply(self, mut config: CalculatorConfig) -> anyhow::Result<CalculatorConfig> {
        if let Some(total) = self.total_memory {
            config.total_memory = Some(total);
            config.detect_memory_limits = false;
        }
        if self.detect_memory_limits {
            config.detect_memory_limits = true;
            config.total_memory = None;
        }
        if let Some(n) = self.thread_count {
            config.thread_count = n;
        }
        if let Some(n) = self.loaded_class_count {
            config.loaded_class_count = Some(n);
        }
        if let Some(opts) = self.jvm_options {
            config.jvm_options = opts;
        }
        if let Some(p) = self.head_room {
            config.head_room = p;
        }
        if let Some(v) = self.jre_version {
            config.jre_version = v;
        }
        if self.no_fixed_defaults {
            config.fixed_defaults = false;
        }
        if let Some(r) = self.heap_young_generation_ratio {
            config.heap_young_generation_ratio = Some(r);
        }
        if let Some(r) = self.direct_memory_to_heap_ratio {
            config.direct_memory_to_heap_ratio = Some(r);
        }
        if let Some(w) = self.memory_weights {
            config.weights = parse_weights(&w).context("invalid --memory-weights")?;
        }
        if let Some(s) = self.memory_sizes {
            config.sizes = parse_clauses(&s).context("invalid --memory-sizes")?;
        }
        if let Some(i) = self.memory_initials {
            config.initials = parse_clauses(&i).context("invalid --memory-initials")?;
        }
        Ok(config)
    }
}

pub fn execute(config_path: Option<PathBuf>, args: CalculateArgs) -> anyhow::Result<()> {
    let base = match &config_path {
        Some(path) => CalculatorConfig::from_file(path)?,
        None => CalculatorConfig::default(),
    };
    let format = args.format;
    let config = args.apply(base)?;

    let calc = Calculator::new(config)
        .calculate()
        .context("memory calculation failed")?;

    match format {
        OutputFormat::Text => {
            for w in &calc.warnings {
                eprintln!("WARNING: {w}");
            }
            println!("{calc}");
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&calc)?),
    }

    Ok(())
}
