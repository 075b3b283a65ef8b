//! Core State trait for state machine states.
//!
//! All state machine states must implement this trait, which provides
//! pure methods for inspecting state identity without side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine states.
///
/// States are opaque, comparable identifiers. The engine only ever clones
/// them, compares them, serializes them into snapshots, and reads their
/// name for diagnostics and cross-hierarchy checks.
///
/// # Required Traits
///
/// - `Clone`: states are copied into transition descriptors and history
/// - `PartialEq`: states are compared during table resolution
/// - `Debug`: states appear in diagnostics
/// - `Serialize` + `Deserialize`: states round-trip through snapshots
///
/// # Example
///
/// ```rust
/// use stateflow::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum LightState {
///     Green,
///     Yellow,
///     Red,
/// }
///
/// impl State for LightState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Green => "Green",
///             Self::Yellow => "Yellow",
///             Self::Red => "Red",
///         }
///     }
/// }
///
/// assert_eq!(LightState::Green.name(), "Green");
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the state's name for display, logging, and nested-machine
    /// delegation checks.
    fn name(&self) -> &str;
}

/// Fully dynamic machines can use plain strings as states.
impl State for String {
    fn name(&self) -> &str {
        self
    }
}
