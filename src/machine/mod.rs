//! Machine core: current-state tracking, transition dispatch, guard
//! evaluation, hook ordering, delegation to nested machines, and the
//! public contract.

use crate::core::{
    Context, Event, FromState, Hook, HookError, State, StateHistory, TransitionDescriptor,
    TransitionRecord, TransitionTable,
};
use crate::hydrate::{HydrationError, Snapshot};
use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

pub mod error;
pub mod nested;
pub mod subscribers;

pub use error::FsmError;
pub use nested::{ChildMachine, HistoryPolicy, NestedMachine};
pub use subscribers::SubscriberId;

use nested::NestedAttachment;
use subscribers::SubscriberRegistry;

type PendingData<D> = Mutex<Option<BoxFuture<'static, D>>>;
type PendingInjections = Mutex<Vec<(String, BoxFuture<'static, Arc<dyn Any + Send + Sync>>)>>;

fn hook_failure(machine: &str, event: &str, source: HookError) -> FsmError {
    FsmError::Hook {
        machine: machine.to_string(),
        event: event.to_string(),
        source,
    }
}

/// A hierarchical state machine.
///
/// `S` is the state type, `E` the event type, `D` the caller-defined data
/// payload carried in the context. Nested machines may use different
/// state and data types as long as they share the parent's event type.
///
/// Dispatch on one instance is not internally serialized; `&mut self`
/// receivers make single-instance concurrent transitions impossible in
/// safe code, and separate instances are independent.
pub struct Machine<S: State, E: Event, D = ()> {
    id: String,
    current: S,
    table: TransitionTable<S, E, D>,
    subscribers: SubscriberRegistry<D, E>,
    context: Context<D>,
    nested: Vec<(S, NestedAttachment<E>)>,
    active: Option<S>,
    last: Arc<TransitionDescriptor<S, E, D>>,
    history: StateHistory<S>,
    pending_data: PendingData<D>,
    pending_injections: PendingInjections,
}

impl<S: State, E: Event, D: Send + Sync + 'static> Machine<S, E, D> {
    /// Create a machine in the given initial state with a random id.
    ///
    /// The initial state is represented internally as a self-transition so
    /// the first real transition has a defined `on_leave` origin.
    pub fn new(initial: S, data: D) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            current: initial.clone(),
            table: TransitionTable::new(),
            subscribers: SubscriberRegistry::new(),
            context: Context::new(data),
            nested: Vec::new(),
            active: None,
            last: Arc::new(TransitionDescriptor::initial(initial)),
            history: StateHistory::new(),
            pending_data: Mutex::new(None),
            pending_injections: Mutex::new(Vec::new()),
        }
    }

    /// The machine's id, used in error messages and logs.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The state resulting from the last applied transition.
    pub fn current(&self) -> &S {
        &self.current
    }

    /// The context passed to guards, hooks, and subscribers.
    pub fn context(&self) -> &Context<D> {
        &self.context
    }

    /// Mutable access to the context.
    pub fn context_mut(&mut self) -> &mut Context<D> {
        &mut self.context
    }

    /// The machine's data payload.
    pub fn data(&self) -> &D {
        self.context.data()
    }

    /// Mutable access to the data payload.
    pub fn data_mut(&mut self) -> &mut D {
        self.context.data_mut()
    }

    /// Timestamped log of applied transitions.
    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    /// Whether the machine, or any active descendant, is in `state`.
    ///
    /// The active descendant chain is checked by state name; the parent's
    /// own `current` is always compared as well.
    pub fn is(&self, state: &S) -> bool {
        self.current == *state || self.is_in(state.name())
    }

    /// Whether the machine, or any active descendant, is in the state
    /// with the given name.
    ///
    /// Unlike [`is`](Self::is) this crosses type boundaries in the nested
    /// hierarchy, so a parent can be asked about a child's states even
    /// when the two use different state types.
    pub fn is_in(&self, name: &str) -> bool {
        if self.current.name() == name {
            return true;
        }
        self.active_attachment().is_some_and(|a| a.is_in(name))
    }

    fn active_attachment(&self) -> Option<&NestedAttachment<E>> {
        let active = self.active.as_ref()?;
        self.nested
            .iter()
            .find(|(state, _)| state == active)
            .map(|(_, attachment)| attachment)
    }

    /// Whether `transition(event)` would find an allowed transition.
    ///
    /// True when an active child can handle the event, or a descriptor for
    /// the current state (or the wildcard) has a passing guard. Guards are
    /// evaluated in registration order and evaluation stops at the first
    /// pass. Guard errors propagate.
    pub async fn can(&self, event: &E) -> Result<bool, FsmError> {
        if let Some(attachment) = self.active_attachment() {
            for member in attachment.members() {
                if member.instance().handles(event).await? {
                    return Ok(true);
                }
            }
        }
        Ok(self.resolve(event).await?.is_some())
    }

    async fn resolve(
        &self,
        event: &E,
    ) -> Result<Option<Arc<TransitionDescriptor<S, E, D>>>, FsmError> {
        self.table
            .resolve(&self.current, event, &self.context)
            .await
            .map_err(|source| hook_failure(&self.id, event.name(), source))
    }

    /// Dispatch an event.
    ///
    /// The event is first offered to the active nested machine (or every
    /// member of an active parallel group); if any child handles it, the
    /// parent's own table is not consulted and the parent's state does not
    /// change. Otherwise the allowed descriptor is resolved
    /// (state-specific candidates before wildcard ones, first passing
    /// guard wins), pending async data and injections are drained, and the
    /// hook pipeline runs strictly in order: previous descriptor's
    /// `on_leave`, `on_enter`, state update, nested activation, event
    /// subscribers, wildcard subscribers, `on_exit`.
    ///
    /// # Errors
    ///
    /// [`FsmError::TransitionNotAllowed`] when nothing matches. A failing
    /// guard, hook, or subscriber aborts the remaining pipeline steps and
    /// propagates as [`FsmError::Hook`]; the state update is not rolled
    /// back, so a failure after the update leaves the machine in the new
    /// state.
    pub async fn transition(&mut self, event: &E) -> Result<(), FsmError> {
        // Delegation: active children get the event before the own table.
        if let Some(active) = self.active.clone() {
            if let Some(index) = self.nested.iter().position(|(state, _)| *state == active) {
                let mut handled = false;
                let (_, attachment) = &mut self.nested[index];
                for member in attachment.members_mut() {
                    if member.instance().handles(event).await? {
                        member.instance_mut().dispatch(event).await?;
                        handled = true;
                    }
                }
                if handled {
                    debug!(
                        machine = %self.id,
                        event = event.name(),
                        "event handled by nested machine"
                    );
                    return Ok(());
                }
            }
        }

        let Some(descriptor) = self.resolve(event).await? else {
            return Err(FsmError::TransitionNotAllowed {
                machine: self.id.clone(),
                event: event.name().to_string(),
                state: self.current.name().to_string(),
            });
        };

        self.ensure_ready().await;

        let id = self.id.clone();
        let previous = Arc::clone(&self.last);
        if let Some(hook) = &previous.on_leave {
            hook.call(&mut self.context, event)
                .await
                .map_err(|e| hook_failure(&id, event.name(), e))?;
        }
        if let Some(hook) = &descriptor.on_enter {
            hook.call(&mut self.context, event)
                .await
                .map_err(|e| hook_failure(&id, event.name(), e))?;
        }

        let from = std::mem::replace(&mut self.current, descriptor.to.clone());
        self.last = Arc::clone(&descriptor);
        self.history.push(TransitionRecord {
            from: from.clone(),
            to: self.current.clone(),
            event: event.name().to_string(),
            timestamp: Utc::now(),
        });
        debug!(
            machine = %id,
            event = event.name(),
            from = from.name(),
            to = self.current.name(),
            "transition applied"
        );

        self.refresh_active_child();

        for hook in self.subscribers.for_event(event.name()) {
            hook.call(&mut self.context, event)
                .await
                .map_err(|e| hook_failure(&id, event.name(), e))?;
        }
        for hook in self.subscribers.for_all() {
            hook.call(&mut self.context, event)
                .await
                .map_err(|e| hook_failure(&id, event.name(), e))?;
        }

        if let Some(hook) = &descriptor.on_exit {
            hook.call(&mut self.context, event)
                .await
                .map_err(|e| hook_failure(&id, event.name(), e))?;
        }
        Ok(())
    }

    /// Like [`transition`](Self::transition), but a missing transition
    /// returns `Ok(false)` instead of failing. Hook and guard errors still
    /// propagate.
    pub async fn try_transition(&mut self, event: &E) -> Result<bool, FsmError> {
        match self.transition(event).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_not_allowed() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Drain pending async data and injections, in registration order.
    /// Settles exactly once; later transitions see the resolved values.
    async fn ensure_ready(&mut self) {
        let pending_data = self
            .pending_data
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(pending) = pending_data {
            let data = pending.await;
            self.context.set_data(data);
        }

        let pending = std::mem::take(
            self.pending_injections
                .get_mut()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        let drained = !pending.is_empty();
        for (key, future) in pending {
            let value = future.await;
            self.context.insert_capability(key, value);
        }
        if drained {
            self.propagate_capabilities();
        }
    }

    /// Push the current merged capability map down the active nested
    /// chain. Keeps the parent-over-child overlay live: capabilities
    /// injected while a child is active reach its hooks without waiting
    /// for the next activation.
    fn propagate_capabilities(&mut self) {
        let Some(active) = self.active.clone() else {
            return;
        };
        let capabilities = self.context.merged_capabilities();
        if let Some(index) = self.nested.iter().position(|(state, _)| *state == active) {
            self.nested[index].1.inherit(&capabilities);
        }
    }

    /// Entering a state with an attachment activates it (rebuilding the
    /// child under `HistoryPolicy::None`); entering any other state clears
    /// the active child.
    fn refresh_active_child(&mut self) {
        let position = self
            .nested
            .iter()
            .position(|(state, _)| *state == self.current);
        match position {
            Some(index) => {
                let capabilities = self.context.merged_capabilities();
                self.nested[index].1.activate(&capabilities);
                self.active = Some(self.current.clone());
            }
            None => {
                self.active = None;
            }
        }
    }

    /// Register a transition descriptor at runtime.
    ///
    /// Duplicate `(from, event, to)` registrations are logged and appended
    /// after existing entries, so earlier-registered guards keep
    /// precedence.
    pub fn add_transition(&mut self, descriptor: TransitionDescriptor<S, E, D>) -> &mut Self {
        self.table.insert(descriptor);
        self
    }

    /// Remove every descriptor matching `(from, event, to)`. No-op when
    /// nothing matches.
    pub fn remove_transition(
        &mut self,
        from: impl Into<FromState<S>>,
        event: &str,
        to: &S,
    ) -> &mut Self {
        self.table.remove(&from.into(), event, to);
        self
    }

    /// Attach a nested machine at a parent state. It becomes active when
    /// the parent next enters that state.
    pub fn add_nested_machine(&mut self, state: S, nested: NestedMachine<E>) -> &mut Self {
        self.attach(state, NestedAttachment::Single(nested));
        self
    }

    /// Attach a parallel group at a parent state. All members activate
    /// together; each gets a chance to handle every delegated event.
    pub fn add_parallel(&mut self, state: S, members: Vec<NestedMachine<E>>) -> &mut Self {
        self.attach(state, NestedAttachment::Parallel(members));
        self
    }

    pub(crate) fn attach(&mut self, state: S, attachment: NestedAttachment<E>) {
        self.nested.retain(|(s, _)| *s != state);
        self.nested.push((state, attachment));
    }

    /// Detach whatever is nested at `state`. Detaching the currently
    /// active state clears the active child.
    pub fn remove_state(&mut self, state: &S) -> &mut Self {
        self.nested.retain(|(s, _)| s != state);
        if self.active.as_ref() == Some(state) {
            self.active = None;
        }
        self
    }

    /// Register a post-transition subscriber for one event.
    pub fn on(&mut self, event: impl Into<String>, callback: Hook<D, E>) -> SubscriberId {
        self.subscribers.subscribe(event, callback)
    }

    /// Register a post-transition subscriber for all events. Wildcard
    /// subscribers run after event-specific ones.
    pub fn on_any(&mut self, callback: Hook<D, E>) -> SubscriberId {
        self.subscribers.subscribe_all(callback)
    }

    /// Unregister a subscriber. Returns false when the id is unknown.
    pub fn off(&mut self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Attach a named capability to the context, available to hooks
    /// immediately. An active nested chain sees the new capability right
    /// away through its inherited overlay.
    pub fn inject<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) -> &mut Self {
        self.context.insert_capability(key.into(), Arc::new(value));
        self.propagate_capabilities();
        self
    }

    /// Attach a named capability produced asynchronously. Pending
    /// injections resolve in registration order at the start of the next
    /// `transition`; until then the capability is absent from the context.
    pub fn inject_async<T, F>(&mut self, key: impl Into<String>, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Future<Output = T> + Send + 'static,
    {
        self.defer_injection(
            key.into(),
            async move { Arc::new(factory.await) as Arc<dyn Any + Send + Sync> }.boxed(),
        );
        self
    }

    /// Bind an invocation receiver, readable from hooks via
    /// [`Context::bound`]. Typically the record that owns this machine.
    pub fn bind<T: Any + Send + Sync>(&mut self, receiver: Arc<T>) -> &mut Self {
        self.context.set_bound(receiver);
        self
    }

    /// Capture `{current, data}` plus, recursively, the active nested
    /// chain. Capabilities and the bound receiver are not captured.
    pub fn dehydrate(&self) -> Result<Snapshot, HydrationError>
    where
        D: serde::Serialize,
    {
        let current = serde_json::to_value(&self.current)
            .map_err(|e| HydrationError::SerializationFailed(e.to_string()))?;
        let data = serde_json::to_value(self.context.data())
            .map_err(|e| HydrationError::SerializationFailed(e.to_string()))?;
        let mut snapshot = Snapshot::leaf(current, data);
        match self.active_attachment() {
            Some(NestedAttachment::Single(machine)) => {
                snapshot.nested = Some(Box::new(machine.instance().snapshot()?));
            }
            Some(NestedAttachment::Parallel(machines)) => {
                snapshot.parallel = Some(
                    machines
                        .iter()
                        .map(|m| m.instance().snapshot())
                        .collect::<Result<_, _>>()?,
                );
            }
            None => {}
        }
        Ok(snapshot)
    }

    /// Restore a previously captured snapshot.
    ///
    /// This is a pure state overwrite: no guards or hooks run, and nested
    /// instances are restored in place regardless of history policy. The
    /// snapshot's nested shape must match the machine's attachments.
    pub fn hydrate(&mut self, snapshot: Snapshot) -> Result<(), HydrationError>
    where
        D: serde::de::DeserializeOwned,
    {
        let Snapshot {
            current,
            data,
            nested,
            parallel,
        } = snapshot;

        let current: S = serde_json::from_value(current)
            .map_err(|e| HydrationError::DeserializationFailed(e.to_string()))?;
        let data: D = serde_json::from_value(data)
            .map_err(|e| HydrationError::DeserializationFailed(e.to_string()))?;

        self.current = current;
        self.context.set_data(data);
        self.last = Arc::new(TransitionDescriptor::initial(self.current.clone()));
        self.active = None;

        if nested.is_none() && parallel.is_none() {
            return Ok(());
        }

        let Some(index) = self
            .nested
            .iter()
            .position(|(state, _)| *state == self.current)
        else {
            return Err(HydrationError::ShapeMismatch(format!(
                "no nested machine attached at state '{}'",
                self.current.name()
            )));
        };
        match (&mut self.nested[index].1, nested, parallel) {
            (NestedAttachment::Single(machine), Some(child), None) => {
                machine.instance_mut().restore(*child)?;
            }
            (NestedAttachment::Parallel(machines), None, Some(children)) => {
                if machines.len() != children.len() {
                    return Err(HydrationError::ShapeMismatch(format!(
                        "parallel group at '{}' has {} members, snapshot has {}",
                        self.current.name(),
                        machines.len(),
                        children.len()
                    )));
                }
                for (machine, child) in machines.iter_mut().zip(children) {
                    machine.instance_mut().restore(child)?;
                }
            }
            _ => {
                return Err(HydrationError::ShapeMismatch(format!(
                    "nested snapshot kind does not match attachment at '{}'",
                    self.current.name()
                )));
            }
        }
        self.active = Some(self.current.clone());
        Ok(())
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    pub(crate) fn defer_data(&mut self, future: BoxFuture<'static, D>) {
        *self
            .pending_data
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(future);
    }

    pub(crate) fn defer_injection(
        &mut self,
        key: String,
        future: BoxFuture<'static, Arc<dyn Any + Send + Sync>>,
    ) {
        self.pending_injections
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((key, future));
    }

    /// Activate an attachment sitting at the initial state, if any. Used
    /// by the builder; ordinary activation happens on state entry.
    pub(crate) fn activate_initial(&mut self) {
        self.refresh_active_child();
    }
}

impl<S: State, E: Event, D: Send + Sync + 'static> ChildMachine<E> for Machine<S, E, D>
where
    D: serde::Serialize + serde::de::DeserializeOwned,
{
    fn machine_id(&self) -> &str {
        &self.id
    }

    fn is_in(&self, state: &str) -> bool {
        Machine::is_in(self, state)
    }

    fn handles<'a>(&'a self, event: &'a E) -> BoxFuture<'a, Result<bool, FsmError>> {
        self.can(event).boxed()
    }

    fn dispatch<'a>(&'a mut self, event: &'a E) -> BoxFuture<'a, Result<(), FsmError>> {
        self.transition(event).boxed()
    }

    fn snapshot(&self) -> Result<Snapshot, HydrationError> {
        self.dehydrate()
    }

    fn restore(&mut self, snapshot: Snapshot) -> Result<(), HydrationError> {
        self.hydrate(snapshot)
    }

    fn inherit(&mut self, capabilities: crate::core::Capabilities) {
        self.context.set_inherited(capabilities);
        // Grandchildren see the refreshed overlay too.
        self.propagate_capabilities();
    }
}

impl<S: State, E: Event, D> fmt::Debug for Machine<S, E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("id", &self.id)
            .field("current", &self.current)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Guard;
    use serde::{Deserialize, Serialize};
    use std::sync::Mutex as StdMutex;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Idle,
        Pending,
        Resolved,
        Rejected,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Pending => "Pending",
                Self::Resolved => "Resolved",
                Self::Rejected => "Rejected",
            }
        }
    }

    fn fetch() -> String {
        "fetch".to_string()
    }

    fn machine() -> Machine<TestState, String, u32> {
        let mut machine = Machine::new(TestState::Idle, 0u32);
        machine.add_transition(TransitionDescriptor::new(
            TestState::Idle,
            "fetch",
            TestState::Pending,
        ));
        machine
    }

    #[tokio::test]
    async fn transition_moves_state() {
        let mut machine = machine();
        machine.transition(&fetch()).await.unwrap();
        assert_eq!(machine.current(), &TestState::Pending);
        assert!(machine.is(&TestState::Pending));
        assert!(!machine.is(&TestState::Idle));
    }

    #[tokio::test]
    async fn missing_transition_reports_event_and_state() {
        let mut machine = machine();
        let err = machine.transition(&"unknown".to_string()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown"));
        assert!(message.contains("Idle"));
        assert!(err.is_not_allowed());
    }

    #[tokio::test]
    async fn try_transition_converts_not_allowed_only() {
        let mut machine = machine();
        assert!(!machine.try_transition(&"unknown".to_string()).await.unwrap());
        assert!(machine.try_transition(&fetch()).await.unwrap());

        machine.add_transition(TransitionDescriptor {
            from: TestState::Pending.into(),
            event: "fail".into(),
            to: TestState::Rejected,
            guard: None,
            on_enter: Some(Hook::try_new(|_, _| Err("enter exploded".into()))),
            on_exit: None,
            on_leave: None,
        });
        let err = machine.try_transition(&"fail".to_string()).await.unwrap_err();
        assert!(!err.is_not_allowed());
    }

    #[tokio::test]
    async fn can_agrees_with_transition() {
        let machine = machine();
        assert!(machine.can(&fetch()).await.unwrap());
        assert!(!machine.can(&"unknown".to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn hook_pipeline_runs_in_documented_order() {
        let log: Arc<StdMutex<Vec<&'static str>>> = Arc::new(StdMutex::new(Vec::new()));
        let push = |tag: &'static str| {
            let log = Arc::clone(&log);
            Hook::<u32, String>::new(move |_ctx, _event| log.lock().unwrap().push(tag))
        };

        let mut machine: Machine<TestState, String, u32> = Machine::new(TestState::Idle, 0);
        machine.add_transition(TransitionDescriptor {
            from: TestState::Idle.into(),
            event: "fetch".into(),
            to: TestState::Pending,
            guard: None,
            on_enter: Some(push("first.enter")),
            on_exit: Some(push("first.exit")),
            on_leave: Some(push("first.leave")),
        });
        machine.add_transition(TransitionDescriptor {
            from: TestState::Pending.into(),
            event: "done".into(),
            to: TestState::Resolved,
            guard: None,
            on_enter: Some(push("second.enter")),
            on_exit: Some(push("second.exit")),
            on_leave: None,
        });
        machine.on("done", push("sub.done"));
        machine.on_any(push("sub.any"));

        machine.transition(&fetch()).await.unwrap();
        log.lock().unwrap().clear();

        machine.transition(&"done".to_string()).await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                // on_leave of the transition that entered Pending, not of
                // the new descriptor.
                "first.leave",
                "second.enter",
                "sub.done",
                "sub.any",
                "second.exit",
            ]
        );
    }

    #[tokio::test]
    async fn subscriber_failure_leaves_state_updated() {
        let mut machine = machine();
        machine.on(
            "fetch",
            Hook::try_new(|_, _| Err("subscriber exploded".into())),
        );

        let err = machine.transition(&fetch()).await.unwrap_err();
        assert!(matches!(err, FsmError::Hook { .. }));
        // State mutation happens before subscribers run.
        assert_eq!(machine.current(), &TestState::Pending);
    }

    #[tokio::test]
    async fn off_unregisters_subscriber() {
        let log: Arc<StdMutex<Vec<&'static str>>> = Arc::new(StdMutex::new(Vec::new()));
        let log_clone = Arc::clone(&log);

        let mut machine = machine();
        let id = machine.on(
            "fetch",
            Hook::new(move |_, _| log_clone.lock().unwrap().push("ran")),
        );
        assert!(machine.off(id));
        assert!(!machine.off(id));

        machine.transition(&fetch()).await.unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_transition_then_dispatch_fails() {
        let mut machine = machine();
        machine.remove_transition(TestState::Idle, "fetch", &TestState::Pending);

        let err = machine.transition(&fetch()).await.unwrap_err();
        assert!(err.is_not_allowed());
        assert!(err.to_string().contains("fetch"));
        assert!(err.to_string().contains("Idle"));
    }

    #[tokio::test]
    async fn guard_order_selects_first_passing_descriptor() {
        let mut machine: Machine<TestState, String, u32> = Machine::new(TestState::Idle, 0);
        machine.add_transition(TransitionDescriptor::guarded(
            TestState::Idle,
            "fetch",
            TestState::Pending,
            Guard::new(|ctx, _| *ctx.data() == 0),
        ));
        machine.add_transition(TransitionDescriptor::guarded(
            TestState::Idle,
            "fetch",
            TestState::Resolved,
            Guard::new(|ctx, _| *ctx.data() != 0),
        ));

        machine.transition(&fetch()).await.unwrap();
        assert_eq!(machine.current(), &TestState::Pending);

        let mut other: Machine<TestState, String, u32> = Machine::new(TestState::Idle, 1);
        other.add_transition(TransitionDescriptor::guarded(
            TestState::Idle,
            "fetch",
            TestState::Pending,
            Guard::new(|ctx, _| *ctx.data() == 0),
        ));
        other.add_transition(TransitionDescriptor::guarded(
            TestState::Idle,
            "fetch",
            TestState::Resolved,
            Guard::new(|ctx, _| *ctx.data() != 0),
        ));
        other.transition(&fetch()).await.unwrap();
        assert_eq!(other.current(), &TestState::Resolved);
    }

    #[tokio::test]
    async fn async_injection_resolves_before_hooks_run() {
        let mut machine = machine();
        machine.inject("sync", 1u32);
        machine.inject_async("first", async { "a".to_string() });
        machine.inject_async("second", async { "b".to_string() });

        // Not yet drained.
        assert!(machine.context().capability::<String>("first").is_none());

        let seen: Arc<StdMutex<Vec<Option<String>>>> = Arc::new(StdMutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        machine.on(
            "fetch",
            Hook::new(move |ctx, _| {
                seen_clone
                    .lock()
                    .unwrap()
                    .push(ctx.capability::<String>("first").map(|v| (*v).clone()));
            }),
        );

        machine.transition(&fetch()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![Some("a".to_string())]);
        assert_eq!(
            machine.context().capability::<String>("second").as_deref(),
            Some(&"b".to_string())
        );
        assert_eq!(machine.context().capability::<u32>("sync").as_deref(), Some(&1));
    }

    #[tokio::test]
    async fn bound_receiver_is_visible_to_hooks() {
        let mut machine = machine();
        machine.bind(Arc::new("record-42".to_string()));

        let seen: Arc<StdMutex<Option<String>>> = Arc::new(StdMutex::new(None));
        let seen_clone = Arc::clone(&seen);
        machine.on(
            "fetch",
            Hook::new(move |ctx, _| {
                *seen_clone.lock().unwrap() = ctx.bound::<String>().map(|v| (*v).clone());
            }),
        );

        machine.transition(&fetch()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), Some("record-42".to_string()));
    }

    #[tokio::test]
    async fn dehydrate_and_hydrate_round_trip_flat_machine() {
        let mut machine = machine();
        machine.transition(&fetch()).await.unwrap();
        *machine.data_mut() = 7;

        let snapshot = machine.dehydrate().unwrap();

        let mut restored = self::machine();
        restored.hydrate(snapshot).unwrap();
        assert_eq!(restored.current(), &TestState::Pending);
        assert_eq!(restored.data(), &7);
    }

    #[tokio::test]
    async fn wildcard_transition_fires_from_any_state() {
        let mut machine = machine();
        machine.add_transition(TransitionDescriptor::new(
            FromState::Any,
            "reset",
            TestState::Idle,
        ));

        machine.transition(&fetch()).await.unwrap();
        assert_eq!(machine.current(), &TestState::Pending);
        machine.transition(&"reset".to_string()).await.unwrap();
        assert_eq!(machine.current(), &TestState::Idle);
    }
}
