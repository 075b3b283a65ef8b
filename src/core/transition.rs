//! Transition descriptors and lifecycle hooks.

use super::context::Context;
use super::event::Event;
use super::guard::{Guard, HookError};
use super::state::State;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use std::sync::Arc;

type HookFn<D, E> = Arc<
    dyn for<'a> Fn(&'a mut Context<D>, &'a E) -> BoxFuture<'a, Result<(), HookError>> + Send + Sync,
>;

/// Lifecycle callback run at a defined point in the transition pipeline.
///
/// Hooks fill the `on_enter`, `on_exit`, and `on_leave` slots of a
/// descriptor and back post-transition subscribers. They may be
/// synchronous or asynchronous; the engine awaits each one to completion
/// before moving to the next pipeline step.
pub struct Hook<D, E> {
    callback: HookFn<D, E>,
}

impl<D: Send + Sync + 'static, E: Event> Hook<D, E> {
    /// Create a hook from an infallible synchronous callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut Context<D>, &E) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(move |ctx, event| {
                callback(ctx, event);
                future::ready(Ok(())).boxed()
            }),
        }
    }

    /// Create a hook from a fallible synchronous callback.
    ///
    /// An `Err` aborts the remaining pipeline steps for that dispatch.
    pub fn try_new<F>(callback: F) -> Self
    where
        F: Fn(&mut Context<D>, &E) -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(move |ctx, event| {
                let result = callback(ctx, event);
                future::ready(result).boxed()
            }),
        }
    }

    /// Create a hook from an asynchronous callback returning a boxed future.
    pub fn new_async<F>(callback: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<D>, &'a E) -> BoxFuture<'a, Result<(), HookError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Invoke the hook.
    pub async fn call(&self, ctx: &mut Context<D>, event: &E) -> Result<(), HookError> {
        (self.callback)(ctx, event).await
    }
}

impl<D, E> Clone for Hook<D, E> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

/// Source-state selector of a transition descriptor.
///
/// The wildcard is an explicit variant rather than a sentinel state value;
/// `Any` descriptors are consulted only after every state-specific
/// candidate for the current state has been rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum FromState<S> {
    /// One or more concrete source states.
    States(Vec<S>),
    /// Matches any current state.
    Any,
}

impl<S: State> FromState<S> {
    /// Whether this selector names `current` as a source state.
    ///
    /// `Any` deliberately reports `false` here; wildcard matching is a
    /// separate resolution pass.
    pub fn matches(&self, current: &S) -> bool {
        match self {
            Self::States(states) => states.contains(current),
            Self::Any => false,
        }
    }

    /// Whether this is the wildcard selector.
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl<S: State> From<S> for FromState<S> {
    fn from(state: S) -> Self {
        Self::States(vec![state])
    }
}

impl<S: State> From<Vec<S>> for FromState<S> {
    fn from(states: Vec<S>) -> Self {
        Self::States(states)
    }
}

/// Immutable record describing one declared transition.
///
/// Descriptors are never mutated once constructed; the transition table
/// appends and retracts `Arc` references to them. Dynamic `add_transition`
/// therefore always creates a fresh descriptor.
pub struct TransitionDescriptor<S: State, E, D> {
    /// Source-state selector.
    pub from: FromState<S>,
    /// Event name this descriptor answers to.
    pub event: String,
    /// Destination state.
    pub to: S,
    /// Optional predicate gating the transition. Absent means always-pass.
    pub guard: Option<Guard<D, E>>,
    /// Runs before the state update.
    pub on_enter: Option<Hook<D, E>>,
    /// Runs last, after subscribers.
    pub on_exit: Option<Hook<D, E>>,
    /// Runs first on the *next* transition leaving the destination state.
    pub on_leave: Option<Hook<D, E>>,
}

impl<S: State, E, D> std::fmt::Debug for TransitionDescriptor<S, E, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionDescriptor")
            .field("from", &self.from)
            .field("event", &self.event)
            .field("to", &self.to)
            .field("guard", &self.guard.is_some())
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .finish()
    }
}

impl<S: State, E: Event, D: Send + Sync + 'static> TransitionDescriptor<S, E, D> {
    /// Create a bare descriptor with no guard and no hooks.
    pub fn new(from: impl Into<FromState<S>>, event: impl Into<String>, to: S) -> Self {
        Self {
            from: from.into(),
            event: event.into(),
            to,
            guard: None,
            on_enter: None,
            on_exit: None,
            on_leave: None,
        }
    }

    /// Shorthand form: a bare descriptor plus a guard.
    pub fn guarded(
        from: impl Into<FromState<S>>,
        event: impl Into<String>,
        to: S,
        guard: Guard<D, E>,
    ) -> Self {
        let mut descriptor = Self::new(from, event, to);
        descriptor.guard = Some(guard);
        descriptor
    }

    /// Synthetic self-transition installed at machine construction so the
    /// first real transition has a defined `on_leave` origin.
    pub(crate) fn initial(state: S) -> Self {
        Self::new(state.clone(), "init", state)
    }

    /// Whether this descriptor has the given endpoints, used for duplicate
    /// detection and `remove_transition`.
    pub fn has_endpoints(&self, from: &FromState<S>, event: &str, to: &S) -> bool {
        self.from == *from && self.event == event && self.to == *to
    }

    /// Evaluate the guard, defaulting to pass when absent.
    pub async fn allows(&self, ctx: &Context<D>, event: &E) -> Result<bool, HookError> {
        match &self.guard {
            Some(guard) => guard.check(ctx, event).await,
            None => Ok(true),
        }
    }
}
