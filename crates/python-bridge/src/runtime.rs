// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The process-wide interpreter runtime shared by every bridge instance.

use crate::lifecycle::{EmbeddedPython, LockToken, RuntimeState};
use crate::lock::ExecutionLock;
use backend_core::{BackendError, PythonOptions};

/// Startup state and execution lock for the one embedded interpreter.
#[derive(Debug)]
pub struct PythonRuntime {
    state: RuntimeState,
    lock: ExecutionLock,
}

static RUNTIME: PythonRuntime = PythonRuntime {
    state: RuntimeState::new(),
    lock: ExecutionLock::new(),
};

impl PythonRuntime {
    /// The runtime for this process.
    pub fn global() -> &'static PythonRuntime {
        &RUNTIME
    }

    /// Starts the interpreter on first use with the first caller's options.
    ///
    /// Options passed by later callers do not affect startup.
    pub fn ensure_started(&self, options: &PythonOptions) -> Result<Option<LockToken>, BackendError> {
        self.state.ensure_started(&EmbeddedPython::new(options))
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn lock(&self) -> &ExecutionLock {
        &self.lock
    }

    /// Version of the running interpreter, if startup has succeeded.
    pub fn interpreter_version(&self) -> Option<String> {
        if !self.state.is_ready() {
            return None;
        }
        Some(self.lock.run(|py| py.version().to_string()))
    }
}
