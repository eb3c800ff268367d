//! Top-level fail-fast handling.
//!
//! An instance that selects an unregistered algorithm means the process
//! started in an inconsistent state. Nothing downstream can recover from
//! that, so [`FailFast`] is the one place that turns an
//! [`InvalidSelection`] into process termination. Policy failures pass
//! through untouched.

use qdevice_core::constants::{EXIT_INVALID_SELECTION, EXIT_STARTUP_FAILURE};
use qdevice_core::{AlgorithmError, DispatchError, DispatchResult, InvalidSelection, StartupError};
use tracing::error;

/// Termination hook. Must not return.
pub type Hook = fn(&InvalidSelection) -> !;

#[derive(Clone, Copy)]
pub struct FailFast {
    hook: Hook,
}

impl FailFast {
    /// Log at critical severity and exit with [`EXIT_INVALID_SELECTION`].
    pub fn process() -> Self {
        Self { hook: terminate }
    }

    pub fn with_hook(hook: Hook) -> Self {
        Self { hook }
    }

    /// Unwrap a dispatch result, diverging through the hook on an invalid
    /// selection.
    pub fn check<T>(&self, result: DispatchResult<T>) -> Result<T, AlgorithmError> {
        match result {
            Ok(value) => Ok(value),
            Err(DispatchError::InvalidSelection(selection)) => (self.hook)(&selection),
            Err(DispatchError::Algorithm(err)) => Err(err),
        }
    }
}

impl Default for FailFast {
    fn default() -> Self {
        Self::process()
    }
}

impl std::fmt::Debug for FailFast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailFast").finish_non_exhaustive()
    }
}

fn terminate(selection: &InvalidSelection) -> ! {
    error!(
        severity = "critical",
        algorithm = %selection.algorithm,
        operation = %selection.operation,
        "{selection}"
    );
    std::process::exit(EXIT_INVALID_SELECTION)
}

/// Abort startup after the built-in registration sequence failed.
pub fn abort_startup(err: &StartupError) -> ! {
    error!(severity = "critical", error = %err, "startup failed");
    std::process::exit(EXIT_STARTUP_FAILURE)
}
