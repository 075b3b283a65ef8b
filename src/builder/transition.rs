//! Builder for constructing transition descriptors.

use crate::builder::error::BuildError;
use crate::core::{Context, Event, FromState, Guard, Hook, State, TransitionDescriptor};

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<S: State, E, D> {
    from: Option<FromState<S>>,
    event: Option<String>,
    to: Option<S>,
    guard: Option<Guard<D, E>>,
    on_enter: Option<Hook<D, E>>,
    on_exit: Option<Hook<D, E>>,
    on_leave: Option<Hook<D, E>>,
}

impl<S: State, E: Event, D: Send + Sync + 'static> TransitionBuilder<S, E, D> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            event: None,
            to: None,
            guard: None,
            on_enter: None,
            on_exit: None,
            on_leave: None,
        }
    }

    /// Set a single source state (required, unless `from_states` or
    /// `from_any` is used).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set several source states; the transition applies from any of them.
    pub fn from_states(mut self, states: Vec<S>) -> Self {
        self.from = Some(states.into());
        self
    }

    /// Make the transition apply from any state. Wildcard descriptors are
    /// consulted only after every state-specific candidate was rejected.
    pub fn from_any(mut self) -> Self {
        self.from = Some(FromState::Any);
        self
    }

    /// Set the event name this transition answers to (required).
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Add a guard predicate (optional).
    pub fn guard(mut self, guard: Guard<D, E>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&Context<D>, &E) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Hook run before the state update (optional).
    pub fn on_enter(mut self, hook: Hook<D, E>) -> Self {
        self.on_enter = Some(hook);
        self
    }

    /// Hook run last, after subscribers (optional).
    pub fn on_exit(mut self, hook: Hook<D, E>) -> Self {
        self.on_exit = Some(hook);
        self
    }

    /// Hook run first on the next transition leaving the target state
    /// (optional).
    pub fn on_leave(mut self, hook: Hook<D, E>) -> Self {
        self.on_leave = Some(hook);
        self
    }

    /// Build the descriptor.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<TransitionDescriptor<S, E, D>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let event = self.event.ok_or(BuildError::MissingEvent)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        let mut descriptor = TransitionDescriptor::new(from, event, to);
        descriptor.guard = self.guard;
        descriptor.on_enter = self.on_enter;
        descriptor.on_exit = self.on_exit;
        descriptor.on_leave = self.on_leave;
        Ok(descriptor)
    }
}

impl<S: State, E: Event, D: Send + Sync + 'static> Default for TransitionBuilder<S, E, D> {
    fn default() -> Self {
        Self::new()
    }
}
