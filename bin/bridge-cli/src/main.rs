// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # bridge-rt
//!
//! Command-line interface for running packaged models through the
//! embedded Python backend.
//!
//! ## Usage
//! ```bash
//! # Run inference, four concurrent calls
//! bridge-rt run --model ./models/addition --inputs inputs.json --parallel 4
//!
//! # Show the model manifest
//! bridge-rt inspect --model ./models/addition.tar.gz
//!
//! # Interpreter and lock state
//! bridge-rt status --python-path ./lib
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bridge-rt",
    about = "Run packaged models through an embedded Python interpreter",
    version,
    author
)]
struct Cli {
    /// Path to a TOML options file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Extra module search path entries, searched first (repeatable).
    #[arg(long = "python-path", global = true)]
    python_path: Vec<String>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run inference on JSON inputs and print the outputs as JSON.
    Run {
        /// Model package directory or .tar.gz archive.
        #[arg(short, long)]
        model: PathBuf,

        /// Execution kind to construct.
        #[arg(short, long, default_value = "python")]
        kind: String,

        /// Platform tag; read from the model manifest when omitted.
        #[arg(short, long)]
        platform: Option<String>,

        /// JSON file mapping input names to tensors.
        #[arg(short, long)]
        inputs: PathBuf,

        /// Number of concurrent inference calls.
        #[arg(long, default_value_t = 1)]
        parallel: usize,
    },

    /// Print a model package's manifest.
    Inspect {
        /// Model package directory or .tar.gz archive.
        #[arg(short, long)]
        model: PathBuf,
    },

    /// List registered (kind, platform) backends.
    Backends,

    /// Start the interpreter and report its state.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let options = commands::load_options(cli.config.as_deref())?;
    match cli.command {
        Commands::Run {
            model,
            kind,
            platform,
            inputs,
            parallel,
        } => {
            commands::run::execute(
                model,
                kind,
                platform,
                inputs,
                parallel,
                options,
                cli.python_path,
            )
            .await
        }
        Commands::Inspect { model } => commands::inspect::execute(model).await,
        Commands::Backends => commands::backends::execute().await,
        Commands::Status => commands::status::execute(options, cli.python_path).await,
    }
}
