#![forbid(unsafe_code)]

//! Failure-isolating invocation of user-supplied callbacks.
//!
//! Every observer (preview, activation listener, modal handler) runs inside
//! [`guarded`]: a panic is caught, reported through `tracing`, and never
//! aborts the loop that triggered the notification or leaves registry state
//! inconsistent. No panic from this crate's dispatch paths escapes to the
//! host event loop.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

/// Invoke `f`, converting a panic into a logged failure.
///
/// Returns `Some` with the callback's result, or `None` if it panicked.
pub fn guarded<T>(context: &'static str, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            tracing::error!(
                context,
                panic = panic_message(payload.as_ref()),
                "callback panicked"
            );
            None
        }
    }
}

/// Notify every listener with `value`, isolating failures per listener.
///
/// Callers should pass a snapshot of the listener list so a listener that
/// mutates the underlying collection cannot invalidate the iteration.
pub fn notify_all<T: Clone>(context: &'static str, listeners: &[Rc<dyn Fn(T)>], value: T) {
    for listener in listeners {
        let listener = Rc::clone(listener);
        let value = value.clone();
        guarded(context, move || listener(value));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn guarded_returns_value() {
        assert_eq!(guarded("test", || 7), Some(7));
    }

    #[test]
    fn guarded_swallows_panic() {
        assert_eq!(guarded("test", || -> i32 { panic!("boom") }), None);
    }

    #[test]
    fn notify_all_continues_past_panicking_listener() {
        let count = Rc::new(Cell::new(0));
        let a = Rc::clone(&count);
        let b = Rc::clone(&count);
        let listeners: Vec<Rc<dyn Fn(bool)>> = vec![
            Rc::new(move |_| a.set(a.get() + 1)),
            Rc::new(|_| panic!("listener failure")),
            Rc::new(move |_| b.set(b.get() + 1)),
        ];
        notify_all("test", &listeners, true);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn notify_all_empty_is_noop() {
        let listeners: Vec<Rc<dyn Fn(bool)>> = Vec::new();
        notify_all("test", &listeners, false);
    }
}
