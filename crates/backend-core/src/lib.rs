// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # backend-core
//!
//! The contract shared by all model execution backends.
//!
//! - [`Backend`] / [`SealedValueMap`]: the uniform `get_sealed_map` →
//!   `seal` → `infer` call sequence.
//! - [`BackendRegistry`]: constructors keyed by (execution kind, platform),
//!   filled in explicitly at startup.
//! - [`RuntimeOptions`]: TOML-backed options handed to every constructor.
//! - [`BackendError`]: the error taxonomy, split into construction-time
//!   (fatal) and per-call failures.

mod backend;
mod config;
mod error;
mod registry;

pub use backend::{Backend, SealedValueMap};
pub use config::{Entrypoint, PythonOptions, RuntimeOptions, SymbolPromotion};
pub use error::BackendError;
pub use registry::{BackendFactory, BackendRegistry};
