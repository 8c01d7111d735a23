// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! End-to-end calculations: config in, switches out.

use bucket_allocator::AllocatorError;
use calculator::{Calculator, CalculatorConfig, CalculatorError};
use host_memory::{MemorySource, ProbePaths};
use memory_model::Size;
use std::path::PathBuf;

// ── Helpers ────────────────────────────────────────────────────

fn config(total: &str) -> CalculatorConfig {
    CalculatorConfig {
        total_memory: Some(total.into()),
        ..Default::default()
    }
}

/// Every byte of the total goes through the weighted buckets.
fn proportional(total: &str) -> CalculatorConfig {
    CalculatorConfig {
        fixed_defaults: false,
        ..config(total)
    }
}

fn switches(c: CalculatorConfig) -> String {
    Calculator::new(c).calculate().unwrap().to_string()
}

// ── Defaults ───────────────────────────────────────────────────

#[test]
fn test_metaspace_default_weights() {
    assert_eq!(
        switches(proportional("1G")),
        "-Xmx768M -Xss1M -XX:MaxMetaspaceSize=104857K"
    );
}

#[test]
fn test_permgen_for_old_jre() {
    let mut c = proportional("1G");
    c.jre_version = "1.7.0".into();
    c.weights = calculator::parse_weights("heap:5,permgen:3,stack:1,native:1").unwrap();
    assert_eq!(switches(c), "-Xmx512M -Xss1M -XX:MaxPermSize=314572K");
}

#[test]
fn test_head_room_is_withheld() {
    let c = CalculatorConfig {
        head_room: 10.0,
        ..proportional("1000M")
    };
    let calc = Calculator::new(c).calculate().unwrap();
    assert_eq!(calc.total, Size::from_mb(1000));
    assert_eq!(calc.budget, Size::from_mb(900));
    assert_eq!(calc.to_string(), "-Xmx675M -Xss1M -XX:MaxMetaspaceSize=90M");
}

#[test]
fn test_explicit_thread_count() {
    let c = CalculatorConfig {
        thread_count: 100,
        ..proportional("1G")
    };
    let calc = Calculator::new(c).calculate().unwrap();
    // 5% of 1G over 100 threads.
    assert_eq!(calc.sizes["stack"], Size::from_bytes(536_871));
    assert_eq!(calc.sizes["heap"], Size::from_mb(768));
}

// ── Fixed defaults ─────────────────────────────────────────────

#[test]
fn test_fixed_defaults_are_reserved_and_emitted() {
    // 1274M less 240M of code cache and 10M of direct memory leaves 1G.
    let calc = Calculator::new(config("1274M")).calculate().unwrap();
    assert_eq!(calc.budget, Size::from_gb(1));
    assert_eq!(
        calc.to_string(),
        "-Xmx768M -Xss1M -XX:MaxMetaspaceSize=104857K \
         -XX:ReservedCodeCacheSize=240M -XX:MaxDirectMemorySize=10M"
    );
    assert_eq!(calc.sizes["code-cache"], Size::from_mb(240));
    assert_eq!(calc.sizes["direct-memory"], Size::from_mb(10));
}

#[test]
fn test_fixed_defaults_at_one_gigabyte() {
    let calc = Calculator::new(config("1G")).calculate().unwrap();
    assert_eq!(calc.budget, Size::from_mb(774));
    assert_eq!(
        calc.to_string(),
        "-Xmx594432K -Xss1M -XX:MaxMetaspaceSize=79257K \
         -XX:ReservedCodeCacheSize=240M -XX:MaxDirectMemorySize=10M"
    );
}

#[test]
fn test_user_code_cache_replaces_its_default() {
    let c = CalculatorConfig {
        jvm_options: "-XX:ReservedCodeCacheSize=100M".into(),
        ..config("1G")
    };
    let calc = Calculator::new(c).calculate().unwrap();
    assert_eq!(calc.budget, Size::from_mb(914));
    assert!(calc.switches.contains(&"-XX:MaxDirectMemorySize=10M".to_string()));
    assert!(calc.switches.iter().all(|s| !s.starts_with("-XX:ReservedCodeCacheSize")));
}

#[test]
fn test_weighted_code_cache_gets_no_default() {
    let mut c = config("1G");
    c.weights = calculator::parse_weights("heap:6,code-cache:1,native:1").unwrap();
    let calc = Calculator::new(c).calculate().unwrap();
    // Only direct memory is reserved; the unweighted stack is emitted
    // but, without a thread count, not budgeted.
    assert_eq!(calc.budget, Size::from_mb(1014));
    assert_eq!(
        calc.to_string(),
        "-Xmx778752K -Xss1M -XX:ReservedCodeCacheSize=129792K -XX:MaxDirectMemorySize=10M"
    );
}

#[test]
fn test_unweighted_stack_is_reserved_per_thread() {
    let mut c = CalculatorConfig {
        thread_count: 200,
        ..config("1G")
    };
    c.weights = calculator::parse_weights("heap:3,metaspace:1").unwrap();
    let calc = Calculator::new(c).calculate().unwrap();
    // 240M + 10M + 200 threads × 1M.
    assert_eq!(calc.budget, Size::from_mb(574));
    assert_eq!(
        calc.to_string(),
        "-Xmx440832K -Xss1M -XX:MaxMetaspaceSize=146944K \
         -XX:ReservedCodeCacheSize=240M -XX:MaxDirectMemorySize=10M"
    );
}

#[test]
fn test_fixed_defaults_beyond_total() {
    let err = Calculator::new(config("200M")).calculate().unwrap_err();
    match err {
        CalculatorError::InsufficientMemory { fixed, available } => {
            assert_eq!(fixed, Size::from_mb(250));
            assert_eq!(available, Size::from_mb(200));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ── Heap ratios ────────────────────────────────────────────────

#[test]
fn test_young_generation_ratio() {
    let c = CalculatorConfig {
        heap_young_generation_ratio: Some(0.25),
        ..proportional("1G")
    };
    let calc = Calculator::new(c).calculate().unwrap();
    assert_eq!(calc.sizes["young-generation"], Size::from_mb(192));
    assert_eq!(
        calc.to_string(),
        "-Xmx768M -Xmn192M -Xss1M -XX:MaxMetaspaceSize=104857K"
    );
}

#[test]
fn test_user_young_generation_is_kept() {
    let c = CalculatorConfig {
        heap_young_generation_ratio: Some(0.25),
        jvm_options: "-Xmn64m".into(),
        ..proportional("1G")
    };
    let calc = Calculator::new(c).calculate().unwrap();
    // -Xmn lives inside the heap, so it takes nothing from the budget.
    assert_eq!(calc.budget, Size::from_gb(1));
    assert_eq!(calc.sizes["heap"], Size::from_mb(768));
    assert!(calc.switches.iter().all(|s| !s.starts_with("-Xmn")));
}

#[test]
fn test_young_generation_follows_user_heap() {
    let c = CalculatorConfig {
        heap_young_generation_ratio: Some(0.25),
        jvm_options: "-Xmx512m".into(),
        ..proportional("1G")
    };
    assert_eq!(switches(c), "-Xmn128M -Xss2M -XX:MaxMetaspaceSize=209715K");
}

#[test]
fn test_direct_memory_ratio_splits_heap_share() {
    let c = CalculatorConfig {
        direct_memory_to_heap_ratio: Some(0.25),
        ..proportional("1G")
    };
    let calc = Calculator::new(c).calculate().unwrap();
    assert_eq!(calc.sizes["heap"], Size::from_mb(576));
    assert_eq!(calc.sizes["direct-memory"], Size::from_mb(192));
    assert_eq!(
        calc.to_string(),
        "-Xmx576M -Xss1M -XX:MaxMetaspaceSize=104857K -XX:MaxDirectMemorySize=192M"
    );
}

#[test]
fn test_both_ratios_size_young_generation_from_split_heap() {
    let c = CalculatorConfig {
        direct_memory_to_heap_ratio: Some(0.25),
        heap_young_generation_ratio: Some(0.25),
        ..proportional("1G")
    };
    assert_eq!(
        switches(c),
        "-Xmx576M -Xmn144M -Xss1M -XX:MaxMetaspaceSize=104857K -XX:MaxDirectMemorySize=192M"
    );
}

#[test]
fn test_direct_memory_ratio_replaces_its_default() {
    let c = CalculatorConfig {
        direct_memory_to_heap_ratio: Some(0.25),
        ..config("1G")
    };
    let calc = Calculator::new(c).calculate().unwrap();
    assert_eq!(calc.budget, Size::from_mb(784));
    assert_eq!(
        calc.to_string(),
        "-Xmx441M -Xss1M -XX:MaxMetaspaceSize=80281K \
         -XX:ReservedCodeCacheSize=240M -XX:MaxDirectMemorySize=147M"
    );
}

#[test]
fn test_direct_memory_ratio_yields_to_user_switch() {
    let c = CalculatorConfig {
        direct_memory_to_heap_ratio: Some(0.25),
        jvm_options: "-XX:MaxDirectMemorySize=64m".into(),
        ..proportional("1G")
    };
    let calc = Calculator::new(c).calculate().unwrap();
    assert_eq!(calc.budget, Size::from_mb(960));
    assert_eq!(calc.sizes["heap"], Size::from_mb(720));
    assert!(calc.switches.iter().all(|s| !s.starts_with("-XX:MaxDirectMemorySize")));
}

// ── JVM options ────────────────────────────────────────────────

#[test]
fn test_user_maximum_is_respected_and_not_repeated() {
    let c = CalculatorConfig {
        jvm_options: "-server -Xmx512m".into(),
        ..proportional("1G")
    };
    let calc = Calculator::new(c).calculate().unwrap();
    assert_eq!(calc.sizes["heap"], Size::from_mb(512));
    assert_eq!(calc.to_string(), "-Xss2M -XX:MaxMetaspaceSize=209715K");
}

#[test]
fn test_unweighted_user_switch_reduces_budget() {
    let c = CalculatorConfig {
        jvm_options: "-XX:ReservedCodeCacheSize=240M".into(),
        ..proportional("1G")
    };
    let calc = Calculator::new(c).calculate().unwrap();
    assert_eq!(calc.budget, Size::from_mb(784));
    assert_eq!(calc.sizes["heap"], Size::from_mb(588));
    assert!(!calc.to_string().contains("ReservedCodeCacheSize"));
}

#[test]
fn test_invalid_jvm_option() {
    let c = CalculatorConfig {
        jvm_options: "-Xss1q".into(),
        ..proportional("1G")
    };
    let err = Calculator::new(c).calculate().unwrap_err();
    assert!(matches!(err, CalculatorError::InvalidOption { .. }));
}

// ── Class count and initials ───────────────────────────────────

#[test]
fn test_loaded_classes_set_metaspace_floor() {
    let small = CalculatorConfig {
        loaded_class_count: Some(10_000),
        ..proportional("1G")
    };
    assert_eq!(
        Calculator::new(small).calculate().unwrap().sizes["metaspace"].to_string(),
        "104857K"
    );

    let large = CalculatorConfig {
        loaded_class_count: Some(30_000),
        ..proportional("1G")
    };
    let calc = Calculator::new(large).calculate().unwrap();
    assert_eq!(calc.sizes["metaspace"], Size::from_bytes(188_000_000));
    assert!(calc.switches.contains(&"-XX:MaxMetaspaceSize=183593K".to_string()));
}

#[test]
fn test_explicit_size_beats_class_estimate() {
    let mut c = CalculatorConfig {
        loaded_class_count: Some(30_000),
        ..proportional("1G")
    };
    c.sizes.insert("metaspace".into(), "64m".into());
    let calc = Calculator::new(c).calculate().unwrap();
    assert_eq!(calc.sizes["metaspace"], Size::from_mb(64));
}

#[test]
fn test_initial_switches_follow_maximums() {
    let mut c = proportional("1G");
    c.initials.insert("heap".into(), "50%".into());
    let calc = Calculator::new(c).calculate().unwrap();
    assert_eq!(calc.switches.last().map(String::as_str), Some("-Xms384M"));
}

#[test]
fn test_user_initial_is_not_recomputed() {
    let mut c = CalculatorConfig {
        jvm_options: "-Xms64m".into(),
        ..proportional("1G")
    };
    c.initials.insert("heap".into(), "50%".into());
    let calc = Calculator::new(c).calculate().unwrap();
    assert!(calc.switches.iter().all(|s| !s.starts_with("-Xms")));
}

// ── Detection and failures ─────────────────────────────────────

#[test]
fn test_detected_total() {
    let dir = std::env::temp_dir().join(format!("memcalc-calc-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let v2 = dir.join("memory.max");
    std::fs::write(&v2, "1073741824\n").unwrap();

    let c = CalculatorConfig {
        detect_memory_limits: true,
        fixed_defaults: false,
        ..Default::default()
    };
    let probes = ProbePaths {
        cgroup_v2: v2,
        cgroup_v1: PathBuf::from("/nonexistent/memory.limit_in_bytes"),
        meminfo: PathBuf::from("/nonexistent/meminfo"),
    };
    let calc = Calculator::new(c).with_probe_paths(probes).calculate();
    std::fs::remove_dir_all(&dir).unwrap();

    let calc = calc.unwrap();
    assert_eq!(calc.total, Size::from_gb(1));
    assert_eq!(calc.detected.as_ref().map(|d| d.source), Some(MemorySource::CgroupV2));
    assert_eq!(calc.to_string(), "-Xmx768M -Xss1M -XX:MaxMetaspaceSize=104857K");
}

#[test]
fn test_infeasible_constraints() {
    let mut c = proportional("32M");
    c.weights = calculator::parse_weights("heap:5").unwrap();
    c.sizes.insert("heap".into(), "64M..".into());
    let err = Calculator::new(c).calculate().unwrap_err();
    assert!(matches!(
        err,
        CalculatorError::AllocatorError(AllocatorError::Allocation { .. })
    ));
}

#[test]
fn test_json_output() {
    let calc = Calculator::new(proportional("1G")).calculate().unwrap();
    let json = serde_json::to_value(&calc).unwrap();
    assert_eq!(json["switches"][0], "-Xmx768M");
    assert!(json["warnings"].as_array().unwrap().is_empty());
    assert!(json.get("detected").is_none());
}
