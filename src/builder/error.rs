//! Build errors for machine and transition builders.

use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Transition source not specified. Call .from(state), .from_states(states), or .from_any()")]
    MissingFromState,

    #[error("Transition event not specified. Call .event(name)")]
    MissingEvent,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,
}
