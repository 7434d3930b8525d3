// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # python-bridge
//!
//! Runs models through a Python interpreter embedded in the host process.
//!
//! One interpreter serves every model in the process. It is started on the
//! first [`PythonBridge`] construction and never torn down. All access to
//! interpreter objects is serialised by [`ExecutionLock`].
//!
//! Model inputs are converted to numpy arrays as they are sealed; outputs
//! are passed through a configurable normalization callable and copied
//! back into host tensors.

pub mod bridge;
pub mod convert;
pub mod env;
pub mod lifecycle;
pub mod lock;
pub mod runtime;
pub mod sealed;
pub mod symbols;

pub use bridge::{register, PythonBridge, EXECUTION_KIND, PLATFORMS};
pub use lifecycle::{EmbeddedPython, InterpreterStartup, LockToken, RuntimeState, StartOutcome};
pub use lock::ExecutionLock;
pub use runtime::PythonRuntime;
pub use sealed::SealedPythonValueMap;
