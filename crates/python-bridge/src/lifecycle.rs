// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! One-time interpreter startup.
//!
//! [`RuntimeState::ensure_started`] performs, at most once per state and
//! in this order:
//!
//! 1. skip everything if an interpreter is already running in the process;
//! 2. promote libpython symbols to global visibility;
//! 3. point the interpreter home at an active virtual environment;
//! 4. start the interpreter and release its GIL.
//!
//! The outcome, including a failure, is cached. Concurrent callers block
//! until the first one finishes and then all see the same outcome.

use crate::env;
use crate::symbols;
use backend_core::{BackendError, PythonOptions, SymbolPromotion};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Marker returned when this state started the interpreter.
///
/// Starting leaves the GIL released so that it can be taken per call; the
/// token records that this state, not the embedding process, owns that
/// arrangement. It is never torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockToken {
    _private: (),
}

/// What happened on the first call to [`RuntimeState::ensure_started`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// This state started the interpreter.
    Started(LockToken),
    /// Another component had already started it.
    AlreadyRunning,
}

/// The side-effecting steps of interpreter startup.
pub trait InterpreterStartup {
    /// Whether an interpreter is already initialised in this process.
    fn is_running(&self) -> bool;

    /// Makes libpython symbols globally visible, if this platform needs it.
    fn promote_symbols(&self) -> Result<(), String>;

    /// Points the interpreter home at the active virtual environment.
    fn redirect_home(&self) -> Option<String> {
        env::redirect_home(env::VENV_MARKER_VAR, env::HOME_VAR)
    }

    /// Initialises the interpreter and releases the GIL.
    fn start(&self);
}

/// Startup for the interpreter linked into this process.
#[derive(Debug, Clone)]
pub struct EmbeddedPython {
    promotion: SymbolPromotion,
    library: Option<String>,
}

impl EmbeddedPython {
    pub fn new(options: &PythonOptions) -> Self {
        Self {
            promotion: options.symbol_promotion,
            library: options.library.clone(),
        }
    }
}

impl InterpreterStartup for EmbeddedPython {
    fn is_running(&self) -> bool {
        // SAFETY: Py_IsInitialized may be called at any time.
        unsafe { pyo3::ffi::Py_IsInitialized() != 0 }
    }

    fn promote_symbols(&self) -> Result<(), String> {
        if !symbols::needs_promotion(self.promotion) {
            tracing::debug!(
                "python bridge: symbol promotion not needed ({:?}, shared libpython: {})",
                self.promotion,
                symbols::BUILD_PYTHON_SHARED,
            );
            return Ok(());
        }
        symbols::promote(&symbols::candidates(self.library.as_deref()))
    }

    fn start(&self) {
        pyo3::prepare_freethreaded_python();
    }
}

/// Cached result of interpreter startup.
#[derive(Debug)]
pub struct RuntimeState {
    outcome: OnceLock<Result<StartOutcome, String>>,
    starts: AtomicUsize,
}

impl RuntimeState {
    pub const fn new() -> Self {
        Self {
            outcome: OnceLock::new(),
            starts: AtomicUsize::new(0),
        }
    }

    /// Starts the interpreter unless it is already running.
    ///
    /// Returns `Some(token)` if this state started it and `None` if it was
    /// running before the first call. A failure is returned again on every
    /// later call without retrying.
    pub fn ensure_started(
        &self,
        startup: &dyn InterpreterStartup,
    ) -> Result<Option<LockToken>, BackendError> {
        match self.outcome.get_or_init(|| self.start(startup)) {
            Ok(StartOutcome::Started(token)) => Ok(Some(*token)),
            Ok(StartOutcome::AlreadyRunning) => Ok(None),
            Err(detail) => Err(BackendError::Initialization(detail.clone())),
        }
    }

    fn start(&self, startup: &dyn InterpreterStartup) -> Result<StartOutcome, String> {
        if startup.is_running() {
            tracing::info!("python bridge: interpreter already running, not starting another");
            return Ok(StartOutcome::AlreadyRunning);
        }

        if let Err(e) = startup.promote_symbols() {
            tracing::error!("python bridge: {e}");
            return Err(e);
        }
        startup.redirect_home();
        startup.start();
        self.starts.fetch_add(1, Ordering::SeqCst);
        tracing::info!("python bridge: interpreter started");
        Ok(StartOutcome::Started(LockToken { _private: () }))
    }

    /// The cached outcome, if startup has been attempted.
    pub fn outcome(&self) -> Option<&Result<StartOutcome, String>> {
        self.outcome.get()
    }

    /// Whether the interpreter is usable (started here or already running).
    pub fn is_ready(&self) -> bool {
        matches!(self.outcome.get(), Some(Ok(_)))
    }

    /// How many times this state actually started an interpreter.
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingStartup {
        running: AtomicBool,
        fail_promotion: bool,
        promotions: AtomicUsize,
        redirects: AtomicUsize,
        starts: AtomicUsize,
    }

    impl InterpreterStartup for CountingStartup {
        fn is_running(&self) -> bool {
            self.running.load(Ordering::SeqCst)
        }

        fn promote_symbols(&self) -> Result<(), String> {
            self.promotions.fetch_add(1, Ordering::SeqCst);
            if self.fail_promotion {
                Err("dlopen failed".into())
            } else {
                Ok(())
            }
        }

        fn redirect_home(&self) -> Option<String> {
            self.redirects.fetch_add(1, Ordering::SeqCst);
            None
        }

        fn start(&self) {
            std::thread::sleep(std::time::Duration::from_millis(5));
            self.starts.fetch_add(1, Ordering::SeqCst);
            self.running.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_starts_once() {
        let state = RuntimeState::new();
        let startup = CountingStartup::default();

        assert!(state.outcome().is_none());
        let first = state.ensure_started(&startup).unwrap();
        assert!(first.is_some());
        for _ in 0..5 {
            assert_eq!(state.ensure_started(&startup).unwrap(), first);
        }

        assert_eq!(startup.starts.load(Ordering::SeqCst), 1);
        assert_eq!(startup.promotions.load(Ordering::SeqCst), 1);
        assert_eq!(startup.redirects.load(Ordering::SeqCst), 1);
        assert_eq!(state.start_count(), 1);
        assert!(state.is_ready());
    }

    #[test]
    fn test_concurrent_callers_start_once() {
        let state = Arc::new(RuntimeState::new());
        let startup = Arc::new(CountingStartup::default());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let state = Arc::clone(&state);
                let startup = Arc::clone(&startup);
                std::thread::spawn(move || state.ensure_started(startup.as_ref()).unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(startup.starts.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.is_some()));
    }

    #[test]
    fn test_already_running_is_left_alone() {
        let state = RuntimeState::new();
        let startup = CountingStartup::default();
        startup.running.store(true, Ordering::SeqCst);

        assert_eq!(state.ensure_started(&startup).unwrap(), None);
        assert_eq!(state.outcome(), Some(&Ok(StartOutcome::AlreadyRunning)));
        assert_eq!(startup.starts.load(Ordering::SeqCst), 0);
        assert_eq!(startup.promotions.load(Ordering::SeqCst), 0);
        assert_eq!(startup.redirects.load(Ordering::SeqCst), 0);
        assert!(state.is_ready());
    }

    #[test]
    fn test_promotion_failure_is_cached() {
        let state = RuntimeState::new();
        let startup = CountingStartup {
            fail_promotion: true,
            ..Default::default()
        };

        for _ in 0..3 {
            let err = state.ensure_started(&startup).unwrap_err();
            assert!(matches!(err, BackendError::Initialization(ref d) if d == "dlopen failed"));
        }
        assert_eq!(startup.promotions.load(Ordering::SeqCst), 1);
        assert_eq!(startup.starts.load(Ordering::SeqCst), 0);
        assert!(!state.is_ready());
    }

    #[test]
    fn test_embedded_skip_promotion() {
        let startup = EmbeddedPython::new(&PythonOptions {
            symbol_promotion: SymbolPromotion::Skip,
            library: Some("libpython-bridge-not-loaded.so".into()),
            ..Default::default()
        });
        assert!(startup.promote_symbols().is_ok());
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_embedded_required_promotion_reports_library() {
        let startup = EmbeddedPython::new(&PythonOptions {
            symbol_promotion: SymbolPromotion::Required,
            library: Some("libpython-bridge-not-loaded.so".into()),
            ..Default::default()
        });
        let err = startup.promote_symbols().unwrap_err();
        assert!(err.contains("libpython-bridge-not-loaded.so"));
    }
}
