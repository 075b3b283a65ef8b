//! Nested and parallel machine composition.
//!
//! Child machines attach to specific parent states. While the parent sits
//! in such a state the child is active: events are offered to it first,
//! `is` consults its state chain, and snapshots capture it recursively.
//! A parallel group activates several children together; every member
//! gets a chance to handle each event.

use crate::core::{Capabilities, Event};
use crate::hydrate::{HydrationError, Snapshot};
use crate::machine::error::FsmError;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Whether a child keeps its accumulated state across re-entries of its
/// owning parent state. Fixed at attachment time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryPolicy {
    /// The same child instance persists and resumes where it left off.
    Deep,
    /// A fresh child is rebuilt from the original construction parameters
    /// on every re-entry.
    None,
}

/// Object-safe view of a machine usable as a nested child.
///
/// Implemented by every `Machine` sharing the parent's event type; the
/// child's own state and data types are erased so machines of different
/// shapes can nest freely.
pub trait ChildMachine<E: Event>: Send + Sync {
    /// The child machine's id, for diagnostics.
    fn machine_id(&self) -> &str;

    /// Whether the child (or any active descendant) is in the named state.
    fn is_in(&self, state: &str) -> bool;

    /// Whether the child can currently handle the event.
    fn handles<'a>(&'a self, event: &'a E) -> BoxFuture<'a, Result<bool, FsmError>>;

    /// Run the child's own transition dispatch for the event.
    fn dispatch<'a>(&'a mut self, event: &'a E) -> BoxFuture<'a, Result<(), FsmError>>;

    /// Capture the child's recursive snapshot.
    fn snapshot(&self) -> Result<Snapshot, HydrationError>;

    /// Overwrite the child's state from a snapshot without running hooks.
    fn restore(&mut self, snapshot: Snapshot) -> Result<(), HydrationError>;

    /// Receive the parent's capability map at activation time.
    fn inherit(&mut self, capabilities: Capabilities);
}

type ChildFactory<E> = Arc<dyn Fn() -> Box<dyn ChildMachine<E>> + Send + Sync>;

/// A child machine attached to a parent state, together with its history
/// policy and the factory that rebuilds it for `HistoryPolicy::None`.
pub struct NestedMachine<E: Event> {
    history: HistoryPolicy,
    factory: ChildFactory<E>,
    instance: Box<dyn ChildMachine<E>>,
}

impl<E: Event> NestedMachine<E> {
    /// Attach a child with an explicit history policy. The factory
    /// captures the original construction parameters; it is invoked once
    /// immediately and again on every activation under
    /// `HistoryPolicy::None`.
    pub fn new<M, F>(history: HistoryPolicy, factory: F) -> Self
    where
        M: ChildMachine<E> + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        let factory: ChildFactory<E> = Arc::new(move || Box::new(factory()));
        let instance = factory();
        Self {
            history,
            factory,
            instance,
        }
    }

    /// Attach a child that persists across re-entries.
    pub fn deep<M, F>(factory: F) -> Self
    where
        M: ChildMachine<E> + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        Self::new(HistoryPolicy::Deep, factory)
    }

    /// Attach a child that is rebuilt fresh on every re-entry.
    pub fn fresh<M, F>(factory: F) -> Self
    where
        M: ChildMachine<E> + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        Self::new(HistoryPolicy::None, factory)
    }

    /// The attachment's history policy.
    pub fn history(&self) -> HistoryPolicy {
        self.history
    }

    pub(crate) fn instance(&self) -> &dyn ChildMachine<E> {
        self.instance.as_ref()
    }

    pub(crate) fn instance_mut(&mut self) -> &mut dyn ChildMachine<E> {
        self.instance.as_mut()
    }

    /// Called when the parent enters the owning state.
    pub(crate) fn activate(&mut self, capabilities: Capabilities) {
        if self.history == HistoryPolicy::None {
            self.instance = (self.factory)();
        }
        self.instance.inherit(capabilities);
    }
}

/// What is attached at a single parent state: one child or a parallel
/// group of children activated together.
pub(crate) enum NestedAttachment<E: Event> {
    Single(NestedMachine<E>),
    Parallel(Vec<NestedMachine<E>>),
}

impl<E: Event> NestedAttachment<E> {
    pub fn members(&self) -> impl Iterator<Item = &NestedMachine<E>> {
        match self {
            Self::Single(machine) => std::slice::from_ref(machine).iter(),
            Self::Parallel(machines) => machines.iter(),
        }
    }

    pub fn members_mut(&mut self) -> impl Iterator<Item = &mut NestedMachine<E>> {
        match self {
            Self::Single(machine) => std::slice::from_mut(machine).iter_mut(),
            Self::Parallel(machines) => machines.iter_mut(),
        }
    }

    /// Whether any active member (or its descendants) is in the named
    /// state.
    pub fn is_in(&self, state: &str) -> bool {
        self.members().any(|m| m.instance().is_in(state))
    }

    /// Activate every member, handing each a copy of the parent's
    /// capability map.
    pub fn activate(&mut self, capabilities: &Capabilities) {
        for member in self.members_mut() {
            member.activate(capabilities.clone());
        }
    }

    /// Hand every member a fresh copy of the parent's capability map
    /// without re-running activation. Called when the parent's
    /// capabilities change while the attachment is active, so the overlay
    /// stays live rather than frozen at activation time.
    pub fn inherit(&mut self, capabilities: &Capabilities) {
        for member in self.members_mut() {
            member.instance_mut().inherit(capabilities.clone());
        }
    }
}
