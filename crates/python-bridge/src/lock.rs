// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Process-wide exclusive access to the interpreter.
//!
//! Every interaction with interpreter objects (creating them, calling into
//! them, reading them, dropping them) happens inside [`ExecutionLock::run`].
//! The lock is a host mutex plus the interpreter's own GIL, taken in that
//! order. A thread that already holds the GIL gives it up while it waits
//! for the mutex, so a holder of the mutex can always get the GIL.
//!
//! The lock is not reentrant: calling `run` from inside `run` on the same
//! lock deadlocks.

use pyo3::{ffi, Python};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Host mutex paired with the GIL.
#[derive(Debug)]
pub struct ExecutionLock {
    exclusive: Mutex<()>,
    held: AtomicBool,
    acquisitions: AtomicU64,
}

impl ExecutionLock {
    pub const fn new() -> Self {
        Self {
            exclusive: Mutex::new(()),
            held: AtomicBool::new(false),
            acquisitions: AtomicU64::new(0),
        }
    }

    /// Runs `f` with exclusive access to the interpreter.
    ///
    /// The interpreter must already be initialised. A panic inside `f`
    /// releases the lock; the next caller proceeds normally.
    pub fn run<R>(&self, f: impl FnOnce(Python<'_>) -> R) -> R {
        let _exclusive = self.lock_exclusive();
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        let _held = HeldFlag::set(&self.held);
        Python::with_gil(f)
    }

    /// Whether some thread is currently inside [`ExecutionLock::run`].
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Total number of completed or in-progress acquisitions.
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::Relaxed)
    }

    fn lock_exclusive(&self) -> MutexGuard<'_, ()> {
        if let Ok(guard) = self.exclusive.try_lock() {
            return guard;
        }
        if !current_thread_holds_gil() {
            return self.exclusive.lock().unwrap_or_else(PoisonError::into_inner);
        }
        // SAFETY: this thread holds the GIL (checked above) and touches no
        // interpreter state until the thread state is restored.
        let saved = unsafe { ffi::PyEval_SaveThread() };
        let guard = self.exclusive.lock().unwrap_or_else(PoisonError::into_inner);
        unsafe { ffi::PyEval_RestoreThread(saved) };
        guard
    }
}

impl Default for ExecutionLock {
    fn default() -> Self {
        Self::new()
    }
}

fn current_thread_holds_gil() -> bool {
    // SAFETY: PyGILState_Check is only meaningful, and only called, once the
    // interpreter is initialised.
    unsafe { ffi::Py_IsInitialized() != 0 && ffi::PyGILState_Check() == 1 }
}

struct HeldFlag<'a>(&'a AtomicBool);

impl<'a> HeldFlag<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for HeldFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
