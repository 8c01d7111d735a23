// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Turns a [`CalculatorConfig`] into JVM memory switches.
//!
//! # Pipeline
//!
//! ```text
//! config ──▶ total (given or detected) ──▶ minus head-room
//!        ──▶ minus fixed regions (user switches, fixed defaults) ──▶ budget
//!        ──▶ weights (given or model defaults)
//!        ──▶ sizes + loaded-class floor + user's JVM maximums
//!        ──▶ Allocator::balance
//!        ──▶ heap split (direct memory, young generation)
//!        ──▶ switches the user has not set
//! ```

use crate::config::CalculatorConfig;
use crate::jvm_options::JvmOptions;
use crate::CalculatorError;
use bucket_allocator::{
    initial_switches, Allocator, INITIAL_SWITCHES, JRE_DEFAULT_STACK_SIZE, MAXIMUM_SWITCHES,
    MIN_TOTAL_MEMORY, STACK,
};
use host_memory::{DetectedMemory, ProbePaths};
use memory_model::{Range, Size};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata bytes per loaded class.
pub const CLASS_METADATA_BYTES: i64 = 5_800;

/// Fixed metadata overhead independent of the class count.
pub const CLASS_METADATA_OVERHEAD: i64 = 14_000_000;

pub const HEAP: &str = "heap";
pub const YOUNG_GENERATION: &str = "young-generation";
pub const CODE_CACHE: &str = "code-cache";
pub const DIRECT_MEMORY: &str = "direct-memory";

/// Sizes reserved for regions that have neither a weight nor a user switch.
pub const FIXED_DEFAULTS: [(&str, Size); 2] = [
    (CODE_CACHE, Size::from_mb(240)),
    (DIRECT_MEMORY, Size::from_mb(10)),
];

/// Estimates class metadata needed for `classes` loaded classes.
pub fn class_metadata_estimate(classes: u64) -> Size {
    let classes = i64::try_from(classes).unwrap_or(i64::MAX);
    Size::from_bytes(
        classes
            .saturating_mul(CLASS_METADATA_BYTES)
            .saturating_add(CLASS_METADATA_OVERHEAD),
    )
}

/// The result of a calculation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Calculation {
    /// Switches to add: maximums first, then initials.
    pub switches: Vec<String>,
    /// Advisory warnings from balancing and initial sizing.
    pub warnings: Vec<String>,
    /// Final size of every bucket: balanced, split from the heap or a
    /// fixed default (stack is per thread).
    pub sizes: BTreeMap<String, Size>,
    /// Total memory before head-room.
    pub total: Size,
    /// Memory actually shared among the buckets.
    pub budget: Size,
    /// Where the total came from, when it was detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected: Option<DetectedMemory>,
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.switches.join(" "))
    }
}

/// Computes memory switches for one configuration.
///
/// # Example
/// ```
/// use calculator::{Calculator, CalculatorConfig};
///
/// // 240M of code cache and 10M of direct memory are set aside first.
/// let config = CalculatorConfig {
///     total_memory: Some("1274M".into()),
///     ..Default::default()
/// };
/// let calc = Calculator::new(config).calculate().unwrap();
/// assert_eq!(
///     calc.to_string(),
///     "-Xmx768M -Xss1M -XX:MaxMetaspaceSize=104857K \
///      -XX:ReservedCodeCacheSize=240M -XX:MaxDirectMemorySize=10M"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Calculator {
    config: CalculatorConfig,
    probes: ProbePaths,
}

impl Calculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self {
            config,
            probes: ProbePaths::default(),
        }
    }

    /// Uses `probes` instead of the standard cgroup and procfs files.
    pub fn with_probe_paths(mut self, probes: ProbePaths) -> Self {
        self.probes = probes;
        self
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Validates the configuration, balances memory and renders switches.
    pub fn calculate(&self) -> Result<Calculation, CalculatorError> {
        self.config.validate()?;

        let (total, detected) = self.total_memory()?;
        let head_room = total.scale(self.config.head_room / 100.0);
        let available = total - head_room;

        let model = self.config.jre()?.memory_model();
        let weights: BTreeMap<String, f64> = if self.config.weights.is_empty() {
            model.default_weights()
        } else {
            self.config
                .weights
                .iter()
                .map(|(name, w)| (name.trim().to_string(), *w))
                .collect()
        };
        tracing::debug!("{model} memory model, weights {weights:?}");

        let options = JvmOptions::parse(&self.config.jvm_options)?;
        if !options.is_empty() {
            tracing::debug!("user memory options: {options}");
        }
        let mut sizes = self.config.size_ranges()?;

        let class_bucket = model.class_bucket();
        if let Some(classes) = self.config.loaded_class_count {
            if weights.contains_key(class_bucket)
                && !sizes.contains_key(class_bucket)
                && !options.has_maximum(class_bucket)
            {
                let floor = class_metadata_estimate(classes);
                tracing::debug!("{classes} loaded classes need at least {floor} of {class_bucket}");
                sizes.insert(class_bucket.to_string(), Range::at_least(floor));
            }
        }

        let direct_ratio = self.direct_memory_ratio(&weights, &options);
        let threads = self.config.thread_count;

        // Memory outside the weighted buckets, withheld from the budget.
        let mut reserved: BTreeMap<String, Size> = BTreeMap::new();
        for (bucket, range) in options.fixed_ranges() {
            if weights.contains_key(&bucket) {
                sizes.insert(bucket, range);
            } else if bucket == STACK {
                if threads > 0 {
                    reserved.insert(bucket, range.floor().scale(threads as f64));
                }
            } else if bucket != YOUNG_GENERATION {
                reserved.insert(bucket, range.floor());
            }
        }

        let defaults = self.fixed_defaults(&weights, &options, direct_ratio.is_some());
        for (bucket, size) in &defaults {
            let size = if bucket == STACK {
                if threads == 0 {
                    continue;
                }
                size.scale(threads as f64)
            } else {
                *size
            };
            reserved.insert(bucket.clone(), size);
        }

        let fixed: Size = reserved.values().copied().sum();
        let budget = available - fixed;
        if budget < MIN_TOTAL_MEMORY {
            return Err(CalculatorError::InsufficientMemory { fixed, available });
        }
        if !fixed.is_zero() {
            tracing::debug!("{fixed} fixed outside the weighted buckets: {reserved:?}");
        }

        tracing::info!("balancing {budget} of {total} (head-room {head_room})");
        let mut allocator = Allocator::new(sizes, weights)?;
        allocator.balance(budget, threads)?;
        let mut sizes = allocator.sizes();

        if let (Some(ratio), Some(heap)) = (direct_ratio, sizes.get(HEAP).copied()) {
            let direct = heap.scale(ratio);
            tracing::debug!("{direct} of the {heap} heap share goes to direct memory");
            sizes.insert(HEAP.to_string(), heap - direct);
            sizes.insert(DIRECT_MEMORY.to_string(), direct);
        }

        if let Some(ratio) = self.config.heap_young_generation_ratio {
            let heap = sizes.get(HEAP).or_else(|| options.maximums().get(HEAP)).copied();
            let open = !options.has_maximum(YOUNG_GENERATION) && !sizes.contains_key(YOUNG_GENERATION);
            match heap {
                Some(heap) if open => {
                    sizes.insert(YOUNG_GENERATION.to_string(), heap.scale(ratio));
                }
                _ => tracing::debug!("young generation ratio {ratio} not applied"),
            }
        }

        for (bucket, size) in defaults {
            sizes.entry(bucket).or_insert(size);
        }

        let mut switches: Vec<String> = MAXIMUM_SWITCHES
            .entries()
            .filter(|e| !options.has_maximum(e.bucket))
            .filter_map(|e| sizes.get(e.bucket).map(|s| MAXIMUM_SWITCHES.apply(e.bucket, *s)))
            .flatten()
            .collect();

        let fractions: BTreeMap<String, f64> = self
            .config
            .initial_fractions()?
            .into_iter()
            .filter(|(bucket, _)| !options.has_initial(bucket))
            .collect();
        let initials = initial_switches(&fractions, &sizes, &INITIAL_SWITCHES);
        switches.extend(initials.switches);

        for w in &initials.warnings {
            tracing::warn!("{w}");
        }
        let warnings = allocator
            .warnings()
            .iter()
            .map(ToString::to_string)
            .chain(initials.warnings)
            .collect();

        Ok(Calculation {
            switches,
            warnings,
            sizes,
            total,
            budget,
            detected,
        })
    }

    /// The direct-memory ratio, when the heap share may be split with it.
    ///
    /// The split needs a weighted heap and applies only while neither the
    /// heap nor direct memory is fixed elsewhere.
    fn direct_memory_ratio(
        &self,
        weights: &BTreeMap<String, f64>,
        options: &JvmOptions,
    ) -> Option<f64> {
        let ratio = self.config.direct_memory_to_heap_ratio?;
        let usable = weights.contains_key(HEAP)
            && !weights.contains_key(DIRECT_MEMORY)
            && !options.has_maximum(HEAP)
            && !options.has_maximum(DIRECT_MEMORY);
        if !usable {
            tracing::debug!("direct memory ratio {ratio} not applied");
            return None;
        }
        Some(ratio)
    }

    /// Default sizes for regions the weights and the user's options leave
    /// open. The stack size is per thread.
    fn fixed_defaults(
        &self,
        weights: &BTreeMap<String, f64>,
        options: &JvmOptions,
        direct_from_ratio: bool,
    ) -> BTreeMap<String, Size> {
        if !self.config.fixed_defaults {
            return BTreeMap::new();
        }
        let open = |bucket: &str| !weights.contains_key(bucket) && !options.has_maximum(bucket);

        let mut defaults: BTreeMap<String, Size> = FIXED_DEFAULTS
            .iter()
            .filter(|(bucket, _)| open(*bucket))
            .filter(|(bucket, _)| !(direct_from_ratio && *bucket == DIRECT_MEMORY))
            .map(|(bucket, size)| (bucket.to_string(), *size))
            .collect();
        if open(STACK) {
            defaults.insert(STACK.to_string(), JRE_DEFAULT_STACK_SIZE);
        }
        defaults
    }

    fn total_memory(&self) -> Result<(Size, Option<DetectedMemory>), CalculatorError> {
        if let Some(total) = self.config.parse_total()? {
            return Ok((total, None));
        }
        let detected = self.probes.memory_limit()?;
        Ok((detected.size, Some(detected)))
    }
}
