//! Fault capture for expectation evaluation.
//!
//! When a caller sets `catch_exceptions`, the dispatcher runs the domain
//! computation through [`capture`]. Computation faults, whether an `Err` or a
//! panic, come back as a [`Fault`] with a formatted traceback instead of
//! unwinding into the caller. Caller faults (see
//! [`TermError::is_caller_fault`]) are never captured.
//!
//! A captured panic is not printed. The first capture installs a panic hook
//! that stays silent while the panicking thread is inside a capture boundary
//! and defers to the previously installed hook everywhere else.

use super::result::ExceptionInfo;
use crate::prelude::*;
use std::any::Any;
use std::cell::Cell;
use std::error::Error as _;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;
use tracing::warn;

thread_local! {
    static INSIDE_CAPTURE: Cell<bool> = Cell::new(false);
}

/// First line of every captured traceback.
pub const TRACEBACK_HEADER: &str = "Traceback (most recent call last):";

/// Fault class reported for panics.
pub const PANIC_KIND: &str = "Panic";

/// A structured description of a captured fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Fault class, e.g. `ColumnNotFound` or a caller-chosen kind
    pub kind: String,
    /// Human-readable message
    pub message: String,
    /// Formatted trace ending in `<kind>: <message>`
    pub traceback: String,
}

impl Fault {
    /// Describes an error returned by an expectation's computation.
    pub fn from_error(expectation: &str, err: &TermError) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self::new(expectation, err.kind(), err.to_string(), &causes)
    }

    /// Describes a panic raised by an expectation's computation.
    pub fn from_panic(expectation: &str, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "panic with non-string payload".to_string()
        };
        Self::new(expectation, PANIC_KIND, message, &[])
    }

    fn new(expectation: &str, kind: &str, message: String, causes: &[String]) -> Self {
        let mut traceback = String::new();
        traceback.push_str(TRACEBACK_HEADER);
        traceback.push('\n');
        traceback.push_str(&format!("  Expectation \"{expectation}\", in evaluate\n"));
        for cause in causes.iter().rev() {
            traceback.push_str(&format!("    caused by: {cause}\n"));
        }
        traceback.push_str(&format!("{kind}: {message}\n"));

        Self {
            kind: kind.to_string(),
            message,
            traceback,
        }
    }

    /// Converts the fault into the `exception_info` block of a result.
    pub fn into_exception_info(self) -> ExceptionInfo {
        ExceptionInfo {
            raised_exception: true,
            exception_message: Some(self.message),
            exception_traceback: Some(self.traceback),
        }
    }
}

/// The outcome of a computation run inside a capture boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Captured<T> {
    /// The computation finished and produced a value
    Completed(T),
    /// The computation faulted and the fault was captured
    Faulted(Fault),
}

impl<T> Captured<T> {
    /// Applies `f` to a completed value, or converts a fault with `on_fault`.
    pub fn resolve<U>(self, f: impl FnOnce(T) -> U, on_fault: impl FnOnce(Fault) -> U) -> U {
        match self {
            Captured::Completed(value) => f(value),
            Captured::Faulted(fault) => on_fault(fault),
        }
    }
}

/// Runs `f`, capturing computation faults when `catch_exceptions` is set.
///
/// Without capture the computation runs as-is: errors are returned and
/// panics unwind. With capture, errors that are not caller faults and
/// panics are both converted into [`Captured::Faulted`].
///
/// # Examples
///
/// ```rust
/// use term_expect::core::{capture, Captured, TRACEBACK_HEADER};
/// use term_expect::error::TermError;
///
/// let outcome = capture("always_fails", true, || -> term_expect::error::Result<()> {
///     Err(TermError::computation("ValueError", "Gotcha!"))
/// })
/// .unwrap();
///
/// match outcome {
///     Captured::Faulted(fault) => {
///         assert!(fault.traceback.starts_with(TRACEBACK_HEADER));
///         assert!(fault.traceback.trim_end().ends_with("ValueError: Gotcha!"));
///     }
///     Captured::Completed(_) => unreachable!(),
/// }
/// ```
pub fn capture<T, F>(expectation: &str, catch_exceptions: bool, f: F) -> Result<Captured<T>>
where
    F: FnOnce() -> Result<T>,
{
    if !catch_exceptions {
        return f().map(Captured::Completed);
    }

    install_quiet_panic_hook();
    let outcome = {
        let _boundary = CaptureBoundary::enter();
        panic::catch_unwind(AssertUnwindSafe(f))
    };

    match outcome {
        Ok(Ok(value)) => Ok(Captured::Completed(value)),
        Ok(Err(err)) if err.is_caller_fault() => Err(err),
        Ok(Err(err)) => {
            warn!(
                expectation.name = %expectation,
                fault.kind = %err.kind(),
                fault.message = %err,
                "Captured expectation fault"
            );
            Ok(Captured::Faulted(Fault::from_error(expectation, &err)))
        }
        Err(payload) => {
            let fault = Fault::from_panic(expectation, payload.as_ref());
            warn!(
                expectation.name = %expectation,
                fault.kind = %fault.kind,
                fault.message = %fault.message,
                "Captured expectation panic"
            );
            Ok(Captured::Faulted(fault))
        }
    }
}

fn install_quiet_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !INSIDE_CAPTURE.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// Marks the current thread as inside a capture boundary until dropped.
struct CaptureBoundary {
    outer: bool,
}

impl CaptureBoundary {
    fn enter() -> Self {
        Self {
            outer: INSIDE_CAPTURE.with(|inside| inside.replace(true)),
        }
    }
}

impl Drop for CaptureBoundary {
    fn drop(&mut self) {
        INSIDE_CAPTURE.with(|inside| inside.set(self.outer));
    }
}
