// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `bridge-rt run` command: construct a backend and run inference.
//!
//! ```text
//! registry → backend → seal inputs → infer   (× --parallel, blocking tasks)
//! ```
//! Outputs of the first call are printed as JSON on stdout; progress and
//! timings go to stderr through the log.

use backend_core::{Backend, RuntimeOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tensor_core::json::{values_from_json, values_to_json};
use tensor_core::ValueMap;

pub async fn execute(
    model: PathBuf,
    kind: String,
    platform: Option<String>,
    inputs: PathBuf,
    parallel: usize,
    options: RuntimeOptions,
    python_path: Vec<String>,
) -> anyhow::Result<()> {
    anyhow::ensure!(parallel >= 1, "--parallel must be at least 1");

    let json = tokio::fs::read_to_string(&inputs)
        .await
        .map_err(|e| anyhow::anyhow!("cannot read inputs '{}': {e}", inputs.display()))?;
    let values = Arc::new(values_from_json(&json)?);

    let backend: Arc<dyn Backend> = tokio::task::spawn_blocking(move || {
        let registry = super::registry();
        match platform {
            Some(platform) => registry.create(&kind, &platform, &model, &options, &python_path),
            None => registry.create_for_manifest(&kind, &model, &options, &python_path),
        }
    })
    .await??
    .into();
    tracing::info!("constructed {backend:?}");

    let handles: Vec<_> = (0..parallel)
        .map(|_| {
            let backend = Arc::clone(&backend);
            let values = Arc::clone(&values);
            tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                backend.infer_values(&values).map(|out| (out, start.elapsed()))
            })
        })
        .collect();

    let mut results: Vec<(ValueMap, Duration)> = Vec::with_capacity(parallel);
    for handle in handles {
        results.push(handle.await??);
    }

    for (i, (_, elapsed)) in results.iter().enumerate() {
        tracing::info!("call {i}: {:.2} ms", elapsed.as_secs_f64() * 1000.0);
    }
    let total: Duration = results.iter().map(|(_, d)| *d).sum();
    tracing::info!(
        "{parallel} calls, mean {:.2} ms",
        total.as_secs_f64() * 1000.0 / parallel as f64
    );

    let (outputs, _) = &results[0];
    println!("{}", serde_json::to_string_pretty(&values_to_json(outputs)?)?);
    Ok(())
}
