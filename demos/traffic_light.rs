//! Traffic Light with Crosswalk
//!
//! This example demonstrates a hierarchical machine: a crosswalk signal
//! nested under the Red state of a traffic light.
//!
//! Key concepts:
//! - Declaring states and events with the `state_enum!`/`event_enum!` macros
//! - Nested machines activated on state entry
//! - Event delegation: the active child is offered every event first
//! - Deep history: the crosswalk resumes where it left off
//!
//! Run with: cargo run --example traffic_light

use stateflow::{
    event_enum, state_enum, Machine, MachineBuilder, NestedMachine, TransitionBuilder,
    TransitionDescriptor,
};

state_enum! {
    enum LightState {
        Green,
        Yellow,
        Red,
    }
}

event_enum! {
    enum LightEvent {
        Advance,
        BeginWalk,
        FlashWarning,
        StopWalking,
    }
}

fn crosswalk() -> Machine<String, LightEvent, ()> {
    let mut machine = Machine::new("DontWalk".to_string(), ());
    machine.add_transition(TransitionDescriptor::new(
        "DontWalk".to_string(),
        "BeginWalk",
        "Walk".to_string(),
    ));
    machine.add_transition(TransitionDescriptor::new(
        "Walk".to_string(),
        "FlashWarning",
        "Flashing".to_string(),
    ));
    machine.add_transition(TransitionDescriptor::new(
        "Flashing".to_string(),
        "StopWalking",
        "DontWalk".to_string(),
    ));
    machine
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Traffic Light Example ===\n");

    let mut light = MachineBuilder::<LightState, LightEvent, ()>::new()
        .id("main-street")
        .initial(LightState::Green)
        .transition(
            TransitionBuilder::new()
                .from(LightState::Green)
                .event("Advance")
                .to(LightState::Yellow),
        )?
        .transition(
            TransitionBuilder::new()
                .from(LightState::Yellow)
                .event("Advance")
                .to(LightState::Red),
        )?
        .transition(
            TransitionBuilder::new()
                .from(LightState::Red)
                .event("Advance")
                .to(LightState::Green),
        )?
        .nested(LightState::Red, NestedMachine::deep(crosswalk))
        .build()?;

    println!("Starting at: {:?}", light.current());

    light.transition(&LightEvent::Advance).await?;
    println!("After Advance: {:?}", light.current());

    light.transition(&LightEvent::Advance).await?;
    println!("After Advance: {:?} (crosswalk now active)", light.current());

    // The crosswalk handles its own events while the light is Red.
    light.transition(&LightEvent::BeginWalk).await?;
    println!("Pedestrians walking; light still {:?}", light.current());

    light.transition(&LightEvent::FlashWarning).await?;
    light.transition(&LightEvent::StopWalking).await?;
    println!("Crosswalk cycle complete");

    light.transition(&LightEvent::Advance).await?;
    println!("After Advance: {:?}", light.current());

    println!("\nPath taken:");
    for record in light.history().transitions() {
        println!(
            "  {} -> {} (on {})",
            stateflow::State::name(&record.from),
            stateflow::State::name(&record.to),
            record.event
        );
    }

    Ok(())
}
