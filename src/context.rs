//! Request-scoped correlation ID storage.
//!
//! The ID lives in a `tokio::task_local!` slot. The interceptor opens a
//! scope around each request, so concurrent requests, even on the same
//! worker thread, never see each other's value. Outside a scope every
//! accessor is a no-op and [`correlation_id`] returns `None`.
//!
//! Code that spawns its own tasks must carry the ID across explicitly,
//! either with [`scope`] or through [`crate::tasks::TaskPropagator`].

use std::cell::RefCell;
use std::future::Future;

tokio::task_local! {
    static CORRELATION_ID: RefCell<Option<String>>;
}

/// The correlation ID of the request currently being processed.
#[must_use]
pub fn correlation_id() -> Option<String> {
    CORRELATION_ID
        .try_with(|slot| slot.borrow().clone())
        .ok()
        .flatten()
}

/// Replace the ID for the rest of the current scope.
///
/// Returns `false` when called outside a scope. An empty string clears
/// the slot.
pub fn set_correlation_id(id: impl Into<String>) -> bool {
    let id = id.into();
    CORRELATION_ID
        .try_with(|slot| {
            *slot.borrow_mut() = (!id.is_empty()).then_some(id);
        })
        .is_ok()
}

/// Clear the ID for the rest of the current scope.
pub fn clear_correlation_id() -> bool {
    CORRELATION_ID
        .try_with(|slot| {
            slot.borrow_mut().take();
        })
        .is_ok()
}

/// Run `fut` with `id` as its correlation ID.
pub async fn scope<F>(id: Option<String>, fut: F) -> F::Output
where
    F: Future,
{
    CORRELATION_ID.scope(RefCell::new(id), fut).await
}

/// Synchronous counterpart of [`scope`].
pub fn sync_scope<F, R>(id: Option<String>, f: F) -> R
where
    F: FnOnce() -> R,
{
    CORRELATION_ID.sync_scope(RefCell::new(id), f)
}
