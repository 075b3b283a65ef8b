//! Stateflow: a hierarchical finite-state-machine engine
//!
//! Machines are declared from typed states and events: transition
//! descriptors connect source states (or a wildcard) to a target state,
//! optionally gated by async guards and wrapped in lifecycle hooks.
//! Machines nest: a child machine attached to a parent state is offered
//! every event first while that state is active, and parallel groups
//! activate several children at once. Context data, injected
//! capabilities, and a bound receiver flow into every guard and hook,
//! and snapshots capture the full hierarchy for later rehydration.
//!
//! # Core Concepts
//!
//! - **State / Event**: type-safe representation via the `State` and
//!   `Event` traits (or the `state_enum!`/`event_enum!` macros)
//! - **Guards**: predicates that control which descriptor a dispatch
//!   selects, evaluated in registration order
//! - **Hooks**: `on_enter`/`on_exit`/`on_leave` callbacks plus
//!   post-transition subscribers, run in a fixed pipeline order
//! - **Hierarchy**: nested and parallel child machines with deep or
//!   reset history policies
//! - **Hydration**: recursive snapshot capture and restore
//!
//! # Example
//!
//! ```rust
//! use futures::executor::block_on;
//! use stateflow::{MachineBuilder, TransitionBuilder};
//! use stateflow::{event_enum, state_enum};
//!
//! state_enum! {
//!     enum LightState {
//!         Green,
//!         Yellow,
//!         Red,
//!     }
//! }
//!
//! event_enum! {
//!     enum LightEvent {
//!         Advance,
//!     }
//! }
//!
//! let mut light = MachineBuilder::<LightState, LightEvent, ()>::new()
//!     .initial(LightState::Green)
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(LightState::Green)
//!             .event("Advance")
//!             .to(LightState::Yellow),
//!     )
//!     .unwrap()
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(LightState::Yellow)
//!             .event("Advance")
//!             .to(LightState::Red),
//!     )
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! block_on(async {
//!     light.transition(&LightEvent::Advance).await.unwrap();
//!     assert_eq!(light.current(), &LightState::Yellow);
//!     light.transition(&LightEvent::Advance).await.unwrap();
//!     assert_eq!(light.current(), &LightState::Red);
//! });
//! ```

pub mod builder;
pub mod core;
pub mod hydrate;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder, TransitionBuilder};
pub use core::{
    Context, Event, FromState, Guard, Hook, HookError, State, StateHistory, TransitionDescriptor,
    TransitionRecord,
};
pub use hydrate::{HydrationError, Snapshot};
pub use machine::{
    ChildMachine, FsmError, HistoryPolicy, Machine, NestedMachine, SubscriberId,
};
