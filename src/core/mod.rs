//! Core types: states, events, guards, hooks, transition descriptors,
//! the transition table, the machine context, and history tracking.

pub mod context;
pub mod event;
pub mod guard;
pub mod history;
pub mod state;
pub mod table;
pub mod transition;

pub use context::{Capabilities, Context};
pub use event::Event;
pub use guard::{Guard, HookError};
pub use history::{StateHistory, TransitionRecord};
pub use state::State;
pub use table::TransitionTable;
pub use transition::{FromState, Hook, TransitionDescriptor};
