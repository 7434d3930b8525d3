// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `bridge-rt backends` command.

pub async fn execute() -> anyhow::Result<()> {
    super::banner("Registered Backends");

    println!("  {:<12} {:<16}", "Kind", "Platform");
    println!("  {}", "-".repeat(28));
    for (kind, platform) in super::registry().keys() {
        println!("  {kind:<12} {platform:<16}");
    }
    println!();
    Ok(())
}
