// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Records which libpython the crate links against, so the runtime can
//! promote exactly that library's symbols before starting the interpreter.

fn main() {
    let config = pyo3_build_config::get();

    let lib_name = config.lib_name.clone().unwrap_or_else(|| {
        format!("python{}.{}", config.version.major, config.version.minor)
    });
    let file_name = format!("lib{lib_name}.so");
    let full_path = config
        .lib_dir
        .as_ref()
        .map(|dir| format!("{dir}/{file_name}"))
        .unwrap_or_default();

    println!("cargo:rustc-env=BRIDGE_PYTHON_LIBRARY={file_name}");
    println!("cargo:rustc-env=BRIDGE_PYTHON_LIBRARY_PATH={full_path}");
    println!("cargo:rustc-check-cfg=cfg(python_shared)");
    if config.shared {
        println!("cargo:rustc-cfg=python_shared");
    }
    println!("cargo:rerun-if-env-changed=PYO3_PYTHON");
    println!("cargo:rerun-if-env-changed=PYO3_CONFIG_FILE");
}
