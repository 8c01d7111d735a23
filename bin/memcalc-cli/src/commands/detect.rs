// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `memcalc detect`: report the memory limit a calculation would use.

use super::OutputFormat;
use host_memory::DetectError;

pub fn execute(host_fallback: bool, format: OutputFormat) -> anyhow::Result<()> {
    let detected = match host_memory::detect_memory_limit() {
        Ok(d) => d,
        Err(DetectError::NotAvailable { tried }) if host_fallback => {
            tracing::info!("no cgroup limit ({tried}); using host memory");
            host_memory::detect_host_memory()?
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Text => {
            println!("Memory limit: {}", detected.size);
            println!("Source:       {} ({})", detected.source, detected.path);
            println!("Bytes:        {}", detected.size.bytes());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detected)?),
    }

    Ok(())
}
