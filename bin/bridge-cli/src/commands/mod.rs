// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

pub mod backends;
pub mod inspect;
pub mod run;
pub mod status;

use backend_core::{BackendRegistry, RuntimeOptions};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Options from `--config`, or the defaults.
pub fn load_options(config: Option<&Path>) -> anyhow::Result<RuntimeOptions> {
    match config {
        Some(path) => {
            let options = RuntimeOptions::from_file(path)?;
            tracing::info!("loaded options from '{}'", path.display());
            Ok(options)
        }
        None => Ok(RuntimeOptions::default()),
    }
}

/// Registry with every backend this binary ships.
pub fn registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    python_bridge::register(&mut registry);
    registry
}

pub(crate) fn banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║ {:^52} ║", format!("bridge-rt · {title}"));
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
}
