//! Circular resolution detection infrastructure.
//!
//! Override cycles are detected by the injector itself while following the
//! override table; the guard here catches the other kind of loop: a factory
//! that, directly or through its dependencies, requests a key whose factory
//! is still running on this thread.

use std::cell::RefCell;
use std::panic;

use crate::error::{DiError, DiResult};
use crate::key::RawKey;

const MAX_DEPTH: usize = 1024;

// Thread-local resolution state. Keys are compared by id, not name, since
// diagnostic names are not required to be unique.
thread_local! {
    static RESOLUTION_TLS: RefCell<Vec<RawKey>> = const { RefCell::new(Vec::new()) };
}

/// Panic payload carrying the full path of a detected resolution cycle.
///
/// Example path: `["B", "A", "B"]`. Always converted back into
/// [`DiError::Circular`] by the nearest enclosing [`with_circular_catch`].
#[derive(Debug)]
pub(crate) struct CircularPanic {
    pub(crate) path: Vec<&'static str>,
}

/// Guard for the thread-local resolution stack.
///
/// The stack is truncated back to the guard's base on drop, whether the
/// factory returned or unwound, so a failed resolution leaves the thread
/// clean for the next `get` call.
struct StackGuard {
    base: usize,
}

impl StackGuard {
    fn new(key: RawKey) -> Self {
        RESOLUTION_TLS.with(|tls| {
            let mut stack = tls.borrow_mut();

            // Cycle detection BEFORE pushing the new key
            if stack.iter().any(|k| k.id() == key.id()) {
                let mut path: Vec<&'static str> = stack.iter().map(|k| k.name()).collect();
                path.push(key.name());
                drop(stack);
                panic::panic_any(CircularPanic { path });
            }

            // Depth guard
            if stack.len() >= MAX_DEPTH {
                let depth = stack.len();
                drop(stack);
                panic::panic_any(DiError::DepthExceeded(depth));
            }

            stack.push(key);
            Self {
                base: stack.len() - 1,
            }
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_TLS.with(|tls| {
            tls.borrow_mut().truncate(self.base);
        });
    }
}

/// Run a factory under cycle and depth guards.
///
/// Cycle and depth violations unwind as panics carrying structured payloads;
/// the nearest enclosing catch converts them back into `DiResult` errors so
/// they propagate as ordinary `Err` values through the resolution stack.
/// `DiError` payloads are also converted, which is how a failed
/// `get_required` inside a nested factory surfaces as an `Err` from the
/// outermost public `get`.
pub(crate) fn with_circular_catch<T, F>(key: RawKey, f: F) -> DiResult<T>
where
    F: FnOnce() -> DiResult<T>,
{
    use std::panic::AssertUnwindSafe;

    match panic::catch_unwind(AssertUnwindSafe(|| {
        let _guard = StackGuard::new(key);
        f()
    })) {
        Ok(result) => result,
        Err(payload) => match payload.downcast::<CircularPanic>() {
            Ok(circular) => Err(DiError::Circular(circular.path)),
            Err(payload) => match payload.downcast::<DiError>() {
                Ok(err) => Err(*err),
                // Re-panic for other kinds of panics
                Err(payload) => panic::resume_unwind(payload),
            },
        },
    }
}
