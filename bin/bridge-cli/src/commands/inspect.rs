// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `bridge-rt inspect` command: print a model package's manifest.
//!
//! Archives are read in place; nothing is extracted.

use model_loader::{ModelManifest, TensorSpec};
use std::path::PathBuf;

pub async fn execute(model: PathBuf) -> anyhow::Result<()> {
    super::banner("Model Inspector");

    let manifest = ModelManifest::locate(&model).map_err(|e| {
        anyhow::anyhow!("failed to read manifest from '{}': {e}", model.display())
    })?;

    println!("  Model:    {}", manifest.name);
    println!("  Platform: {}", manifest.platform);
    match manifest.validate() {
        Ok(()) => println!("  Manifest: valid"),
        Err(e) => println!("  Manifest: INVALID ({e})"),
    }
    println!();

    print_specs("Inputs", &manifest.input_spec);
    print_specs("Outputs", &manifest.output_spec);

    if !manifest.custom_ops.is_empty() {
        println!("  Custom ops:");
        for op in &manifest.custom_ops {
            println!("   {op}");
        }
        println!();
    }
    Ok(())
}

fn print_specs(title: &str, specs: &[TensorSpec]) {
    println!("  {title} ({}):", specs.len());
    for spec in specs {
        println!("   {}", spec.summary());
    }
    println!();
}
