//! Guard predicates for controlling state transitions.
//!
//! Guards are boolean predicates evaluated before a transition fires. They
//! may be synchronous or asynchronous; the engine awaits them uniformly,
//! in descriptor registration order, and selects the first that passes.

use super::context::Context;
use super::event::Event;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use std::sync::Arc;

/// Error raised inside a guard, hook, or subscriber.
///
/// Failures propagate to the `transition` caller without silent recovery;
/// the engine wraps them with the event name for diagnostics but keeps the
/// original error reachable as the source.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

type GuardFn<D, E> = Arc<
    dyn for<'a> Fn(&'a Context<D>, &'a E) -> BoxFuture<'a, Result<bool, HookError>> + Send + Sync,
>;

/// Predicate that determines whether a transition may fire.
///
/// A descriptor without a guard always passes.
///
/// # Example
///
/// ```rust
/// use stateflow::{Context, Guard};
///
/// let over_limit: Guard<u32, String> = Guard::new(|ctx, _event| *ctx.data() > 10);
/// ```
pub struct Guard<D, E> {
    predicate: GuardFn<D, E>,
}

impl<D: Send + Sync + 'static, E: Event> Guard<D, E> {
    /// Create a guard from a synchronous predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Context<D>, &E) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(move |ctx, event| {
                let result = Ok(predicate(ctx, event));
                future::ready(result).boxed()
            }),
        }
    }

    /// Create a guard from a fallible synchronous predicate.
    ///
    /// An `Err` aborts the dispatch and propagates to the caller.
    pub fn try_new<F>(predicate: F) -> Self
    where
        F: Fn(&Context<D>, &E) -> Result<bool, HookError> + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(move |ctx, event| {
                let result = predicate(ctx, event);
                future::ready(result).boxed()
            }),
        }
    }

    /// Create a guard from an asynchronous predicate.
    ///
    /// The closure returns a boxed future; the engine awaits it before
    /// consulting the next candidate descriptor.
    pub fn new_async<F>(predicate: F) -> Self
    where
        F: for<'a> Fn(&'a Context<D>, &'a E) -> BoxFuture<'a, Result<bool, HookError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the guard against the context and the triggering event.
    pub async fn check(&self, ctx: &Context<D>, event: &E) -> Result<bool, HookError> {
        (self.predicate)(ctx, event).await
    }
}

impl<D, E> Clone for Guard<D, E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}
