//! Core Event trait for transition triggers.

use std::fmt::Debug;

/// Trait for state machine events.
///
/// The transition table is keyed by an event's `name()`, so two event
/// values with the same name address the same transitions. Event values
/// may carry payload fields; those payloads are what guards, hooks, and
/// subscribers receive as call arguments.
///
/// # Example
///
/// ```rust
/// use stateflow::Event;
///
/// #[derive(Clone, Debug)]
/// enum FetchEvent {
///     Fetch { url: String },
///     Cancel,
/// }
///
/// impl Event for FetchEvent {
///     fn name(&self) -> &str {
///         match self {
///             Self::Fetch { .. } => "Fetch",
///             Self::Cancel => "Cancel",
///         }
///     }
/// }
///
/// let event = FetchEvent::Fetch { url: "https://example.com".into() };
/// assert_eq!(event.name(), "Fetch");
/// ```
pub trait Event: Clone + Debug + Send + Sync + 'static {
    /// Name used to look up transitions and subscribers for this event.
    fn name(&self) -> &str;
}

/// Fully dynamic machines can use plain strings as events.
impl Event for String {
    fn name(&self) -> &str {
        self
    }
}
