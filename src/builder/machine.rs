//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Event, Hook, State, TransitionDescriptor};
use crate::machine::nested::NestedAttachment;
use crate::machine::{Machine, NestedMachine};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;

enum Injection {
    Ready(String, Arc<dyn Any + Send + Sync>),
    Deferred(String, BoxFuture<'static, Arc<dyn Any + Send + Sync>>),
}

/// Builder for constructing machines with a fluent API.
///
/// The data payload defaults to `D::default()` when neither `data` nor
/// `data_with` is called; `data_with` defers an async factory that
/// resolves at the start of the first transition.
pub struct MachineBuilder<S: State, E: Event, D> {
    id: Option<String>,
    initial: Option<S>,
    data: Option<D>,
    data_factory: Option<BoxFuture<'static, D>>,
    transitions: Vec<TransitionDescriptor<S, E, D>>,
    subscribers: Vec<(Option<String>, Hook<D, E>)>,
    attachments: Vec<(S, NestedAttachment<E>)>,
    injections: Vec<Injection>,
    bound: Option<Arc<dyn Any + Send + Sync>>,
}

impl<S: State, E: Event, D: Send + Sync + 'static> MachineBuilder<S, E, D> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            id: None,
            initial: None,
            data: None,
            data_factory: None,
            transitions: Vec::new(),
            subscribers: Vec::new(),
            attachments: Vec::new(),
            injections: Vec::new(),
            bound: None,
        }
    }

    /// Set an explicit machine id. A random uuid is used otherwise.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the data payload.
    pub fn data(mut self, data: D) -> Self {
        self.data = Some(data);
        self
    }

    /// Set the data payload from an async factory. The machine starts
    /// with `D::default()` and swaps in the resolved value at the start
    /// of the first transition.
    pub fn data_with<F>(mut self, factory: F) -> Self
    where
        F: Future<Output = D> + Send + 'static,
    {
        self.data_factory = Some(factory.boxed());
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<S, E, D>) -> Result<Self, BuildError> {
        let descriptor = builder.build()?;
        self.transitions.push(descriptor);
        Ok(self)
    }

    /// Add a pre-built transition descriptor.
    pub fn add_transition(mut self, descriptor: TransitionDescriptor<S, E, D>) -> Self {
        self.transitions.push(descriptor);
        self
    }

    /// Add multiple transition descriptors at once.
    pub fn transitions(mut self, descriptors: Vec<TransitionDescriptor<S, E, D>>) -> Self {
        self.transitions.extend(descriptors);
        self
    }

    /// Register a post-transition subscriber for one event.
    pub fn subscribe(mut self, event: impl Into<String>, callback: Hook<D, E>) -> Self {
        self.subscribers.push((Some(event.into()), callback));
        self
    }

    /// Register a post-transition subscriber for all events.
    pub fn subscribe_any(mut self, callback: Hook<D, E>) -> Self {
        self.subscribers.push((None, callback));
        self
    }

    /// Attach a nested machine at a parent state.
    pub fn nested(mut self, state: S, machine: NestedMachine<E>) -> Self {
        self.attachments
            .push((state, NestedAttachment::Single(machine)));
        self
    }

    /// Attach a parallel group at a parent state.
    pub fn parallel(mut self, state: S, members: Vec<NestedMachine<E>>) -> Self {
        self.attachments
            .push((state, NestedAttachment::Parallel(members)));
        self
    }

    /// Attach a named capability available from the first dispatch.
    pub fn inject<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.injections
            .push(Injection::Ready(key.into(), Arc::new(value)));
        self
    }

    /// Attach a named capability produced asynchronously; it resolves at
    /// the start of the first transition.
    pub fn inject_async<T, F>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Future<Output = T> + Send + 'static,
    {
        self.injections.push(Injection::Deferred(
            key.into(),
            async move { Arc::new(factory.await) as Arc<dyn Any + Send + Sync> }.boxed(),
        ));
        self
    }

    /// Bind an invocation receiver, readable from hooks via
    /// `Context::bound`.
    pub fn bind<T: Any + Send + Sync>(mut self, receiver: Arc<T>) -> Self {
        self.bound = Some(receiver);
        self
    }

    /// Build the machine.
    /// Returns an error if the initial state is missing. An empty
    /// transition table is permitted; such a machine only ever answers
    /// `TransitionNotAllowed` until transitions are added at runtime.
    pub fn build(self) -> Result<Machine<S, E, D>, BuildError>
    where
        D: Default,
    {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        let mut machine = Machine::new(initial, self.data.unwrap_or_default());
        if let Some(id) = self.id {
            machine.set_id(id);
        }
        if let Some(factory) = self.data_factory {
            machine.defer_data(factory);
        }
        for descriptor in self.transitions {
            machine.add_transition(descriptor);
        }
        for (channel, callback) in self.subscribers {
            match channel {
                Some(event) => machine.on(event, callback),
                None => machine.on_any(callback),
            };
        }
        for (state, attachment) in self.attachments {
            machine.attach(state, attachment);
        }
        for injection in self.injections {
            match injection {
                Injection::Ready(key, value) => {
                    machine.context_mut().insert_capability(key, value);
                }
                Injection::Deferred(key, future) => machine.defer_injection(key, future),
            }
        }
        if let Some(receiver) = self.bound {
            machine.context_mut().set_bound(receiver);
        }

        // An attachment sitting at the initial state is active from the
        // start, not only after the first entry.
        machine.activate_initial();
        Ok(machine)
    }
}

impl<S: State, E: Event, D: Send + Sync + 'static> Default for MachineBuilder<S, E, D> {
    fn default() -> Self {
        Self::new()
    }
}
