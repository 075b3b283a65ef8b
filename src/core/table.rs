//! Transition table and guard-ordered resolution.
//!
//! Descriptors are indexed by event name and kept in insertion order.
//! Resolution for `(current state, event)` runs two passes over the
//! event's bucket: state-specific descriptors first, wildcard descriptors
//! second. Within a pass the first descriptor whose guard passes wins.

use super::context::Context;
use super::event::Event;
use super::guard::HookError;
use super::state::State;
use super::transition::{FromState, TransitionDescriptor};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Index of transition descriptors, keyed by event name.
pub struct TransitionTable<S: State, E, D> {
    buckets: HashMap<String, Vec<Arc<TransitionDescriptor<S, E, D>>>>,
}

impl<S: State, E: Event, D: Send + Sync + 'static> TransitionTable<S, E, D> {
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    /// Append a descriptor to its event bucket.
    ///
    /// Duplicate `(from, event, to)` registrations are allowed but logged;
    /// the newcomer lands after existing entries, so earlier-registered
    /// guards keep precedence.
    pub fn insert(&mut self, descriptor: TransitionDescriptor<S, E, D>) {
        let bucket = self.buckets.entry(descriptor.event.clone()).or_default();
        if bucket
            .iter()
            .any(|d| d.has_endpoints(&descriptor.from, &descriptor.event, &descriptor.to))
        {
            warn!(
                event = %descriptor.event,
                to = %descriptor.to.name(),
                "duplicate transition registered; earlier registration keeps precedence"
            );
        }
        bucket.push(Arc::new(descriptor));
    }

    /// Strip every descriptor with the given endpoints. No-op when nothing
    /// matches.
    pub fn remove(&mut self, from: &FromState<S>, event: &str, to: &S) {
        if let Some(bucket) = self.buckets.get_mut(event) {
            bucket.retain(|d| !d.has_endpoints(from, event, to));
            if bucket.is_empty() {
                self.buckets.remove(event);
            }
        }
    }

    /// Resolve the allowed descriptor for `(current, event)`.
    ///
    /// Guards are awaited in insertion order and evaluation short-circuits
    /// at the first pass. Guard errors propagate.
    pub async fn resolve(
        &self,
        current: &S,
        event: &E,
        ctx: &Context<D>,
    ) -> Result<Option<Arc<TransitionDescriptor<S, E, D>>>, HookError> {
        let Some(bucket) = self.buckets.get(event.name()) else {
            return Ok(None);
        };

        for descriptor in bucket.iter().filter(|d| d.from.matches(current)) {
            if descriptor.allows(ctx, event).await? {
                return Ok(Some(Arc::clone(descriptor)));
            }
        }
        for descriptor in bucket.iter().filter(|d| d.from.is_any()) {
            if descriptor.allows(ctx, event).await? {
                return Ok(Some(Arc::clone(descriptor)));
            }
        }
        Ok(None)
    }

    /// Number of registered descriptors across all events.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl<S: State, E: Event, D: Send + Sync + 'static> Default for TransitionTable<S, E, D> {
    fn default() -> Self {
        Self::new()
    }
}
