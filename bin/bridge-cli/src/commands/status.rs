// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `bridge-rt status` command: start the interpreter and report its state.
//!
//! Starting the interpreter applies the same environment changes a backend
//! construction would (search path merge, virtual environment redirect).

use backend_core::RuntimeOptions;
use python_bridge::{env, symbols, PythonRuntime};

pub async fn execute(options: RuntimeOptions, python_path: Vec<String>) -> anyhow::Result<()> {
    super::banner("Interpreter Status");

    println!("  Build");
    println!("   libpython:          {}", symbols::BUILD_PYTHON_LIBRARY);
    println!("   shared:             {}", symbols::BUILD_PYTHON_SHARED);
    println!(
        "   symbol promotion:   {:?} ({})",
        options.python.symbol_promotion,
        if symbols::needs_promotion(options.python.symbol_promotion) {
            "will promote"
        } else {
            "not needed"
        },
    );
    println!();

    let additions = options.merged_path_additions(&python_path);
    let search_path = env::prepend_search_path(env::SEARCH_PATH_VAR, &additions);

    let runtime = PythonRuntime::global();
    let python = options.python.clone();
    let token = tokio::task::spawn_blocking(move || runtime.ensure_started(&python)).await??;

    println!("  Interpreter");
    println!(
        "   Started by bridge:  {}",
        if token.is_some() { "yes" } else { "no (already running)" }
    );
    let version = tokio::task::spawn_blocking(move || runtime.interpreter_version()).await?;
    println!("   Version:            {}", version.as_deref().unwrap_or("unknown"));
    if let Ok(home) = std::env::var(env::HOME_VAR) {
        println!("   {}:         {home}", env::HOME_VAR);
    }
    println!("   {}:         {search_path}", env::SEARCH_PATH_VAR);
    println!();

    println!("  Execution lock");
    println!("   Acquisitions:       {}", runtime.lock().acquisitions());
    println!("   Held:               {}", runtime.lock().is_held());
    println!();
    Ok(())
}
