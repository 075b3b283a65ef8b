//! Document Workflow
//!
//! This example demonstrates guarded transitions, lifecycle hooks, and
//! injected capabilities in a document review pipeline.
//!
//! Key concepts:
//! - Guards reading both context data and event payloads
//! - on_enter/on_exit hooks and post-transition subscribers
//! - Capability injection for wiring in collaborators
//! - Snapshot capture for persistence
//!
//! Run with: cargo run --example document_workflow

use stateflow::{state_enum, Event, Hook, MachineBuilder, TransitionBuilder};

state_enum! {
    enum DocState {
        Draft,
        Review,
        Published,
        Archived,
    }
}

#[derive(Clone, Debug)]
enum DocEvent {
    Submit,
    Score(u32),
    Archive,
}

impl Event for DocEvent {
    fn name(&self) -> &str {
        match self {
            Self::Submit => "Submit",
            Self::Score(_) => "Score",
            Self::Archive => "Archive",
        }
    }
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
struct DocData {
    revisions: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Document Workflow Example ===\n");

    let passing_score = |event: &DocEvent| matches!(event, DocEvent::Score(s) if *s >= 80);

    let mut doc = MachineBuilder::<DocState, DocEvent, DocData>::new()
        .id("doc-workflow")
        .initial(DocState::Draft)
        .inject("reviewer", "quality-team".to_string())
        .transition(
            TransitionBuilder::new()
                .from(DocState::Draft)
                .event("Submit")
                .to(DocState::Review)
                .on_enter(Hook::new(|ctx: &mut stateflow::Context<DocData>, _event| {
                    ctx.data_mut().revisions += 1;
                })),
        )?
        .transition(
            TransitionBuilder::new()
                .from(DocState::Review)
                .event("Score")
                .to(DocState::Published)
                .when(move |_ctx, event| passing_score(event)),
        )?
        .transition(
            TransitionBuilder::new()
                .from(DocState::Review)
                .event("Score")
                .to(DocState::Draft),
        )?
        .transition(
            TransitionBuilder::new()
                .from(DocState::Published)
                .event("Archive")
                .to(DocState::Archived),
        )?
        .subscribe_any(Hook::new(|ctx, event: &DocEvent| {
            let reviewer = ctx
                .capability::<String>("reviewer")
                .map(|r| (*r).clone())
                .unwrap_or_default();
            println!("  [{reviewer}] observed: {}", event.name());
        }))
        .build()?;

    doc.transition(&DocEvent::Submit).await?;
    println!("Submitted, now {:?}", doc.current());

    // A failing score bounces the document back to Draft.
    doc.transition(&DocEvent::Score(55)).await?;
    println!("Scored 55, back to {:?}", doc.current());

    doc.transition(&DocEvent::Submit).await?;
    doc.transition(&DocEvent::Score(92)).await?;
    println!(
        "Scored 92, now {:?} after {} revisions",
        doc.current(),
        doc.data().revisions
    );

    let snapshot = doc.dehydrate()?;
    println!("\nSnapshot: {}", snapshot.to_json()?);

    doc.transition(&DocEvent::Archive).await?;
    println!("Archived, now {:?}", doc.current());

    Ok(())
}
