//! State transition history tracking.
//!
//! Every applied transition is recorded with its triggering event and a
//! timestamp. The log is append-only; `record` returns a new history
//! rather than mutating in place.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single applied transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Name of the event that triggered the transition
    pub event: String,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of applied transitions.
///
/// # Example
///
/// ```rust
/// use stateflow::core::{StateHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let history: StateHistory<String> = StateHistory::new();
/// let history = history.record(TransitionRecord {
///     from: "idle".into(),
///     to: "pending".into(),
///     event: "fetch".into(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec!["idle", "pending"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<TransitionRecord<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: TransitionRecord<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Append a transition in place. The dispatch hot path uses this
    /// instead of `record` to avoid cloning the whole log per transition.
    pub(crate) fn push(&mut self, transition: TransitionRecord<S>) {
        self.transitions.push(transition);
    }

    /// Get the path of states traversed: the first record's origin, then
    /// the destination of each record in order.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Total duration from first to last recorded transition, `None` when
    /// the history is empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// All recorded transitions in order.
    pub fn transitions(&self) -> &[TransitionRecord<S>] {
        &self.transitions
    }
}
