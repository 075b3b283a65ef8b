//! Parallel Checklist
//!
//! This example demonstrates a parallel group: several sub-machines active
//! at once under a single parent state, each tracking one checklist item.
//!
//! Key concepts:
//! - Parallel groups activated together on state entry
//! - Every member gets a chance to handle each delegated event
//! - Recursive snapshots covering all group members
//!
//! Run with: cargo run --example parallel_checklist

use stateflow::{
    event_enum, state_enum, Machine, MachineBuilder, NestedMachine, TransitionBuilder,
    TransitionDescriptor,
};

state_enum! {
    enum OrderState {
        Open,
        Fulfillment,
        Shipped,
    }
}

event_enum! {
    enum OrderEvent {
        Confirm,
        Pack,
        ChargeCard,
        PrintLabel,
        Ship,
    }
}

fn checklist_item(from: &str, event: &str, to: &str) -> Machine<String, OrderEvent, ()> {
    let mut machine = Machine::new(from.to_string(), ());
    machine.add_transition(TransitionDescriptor::new(
        from.to_string(),
        event,
        to.to_string(),
    ));
    machine
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Parallel Checklist Example ===\n");

    let mut order = MachineBuilder::<OrderState, OrderEvent, ()>::new()
        .id("order-1042")
        .initial(OrderState::Open)
        .transition(
            TransitionBuilder::new()
                .from(OrderState::Open)
                .event("Confirm")
                .to(OrderState::Fulfillment),
        )?
        .transition(
            TransitionBuilder::new()
                .from(OrderState::Fulfillment)
                .event("Ship")
                .to(OrderState::Shipped),
        )?
        .parallel(
            OrderState::Fulfillment,
            vec![
                NestedMachine::deep(|| checklist_item("Unpacked", "Pack", "Packed")),
                NestedMachine::deep(|| checklist_item("Unpaid", "ChargeCard", "Paid")),
                NestedMachine::deep(|| checklist_item("NoLabel", "PrintLabel", "Labeled")),
            ],
        )
        .build()?;

    order.transition(&OrderEvent::Confirm).await?;
    println!("Order confirmed, now {:?}", order.current());

    // Each checklist item handles its own event; the parent stays put.
    order.transition(&OrderEvent::Pack).await?;
    order.transition(&OrderEvent::ChargeCard).await?;
    println!("Two of three items done, still {:?}", order.current());

    let snapshot = order.dehydrate()?;
    if let Some(members) = &snapshot.parallel {
        println!("\nChecklist progress:");
        for member in members {
            println!("  item at {}", member.current);
        }
    }

    order.transition(&OrderEvent::PrintLabel).await?;
    order.transition(&OrderEvent::Ship).await?;
    println!("\nAll items done, shipped: {:?}", order.current());

    Ok(())
}
