//! Machine-scoped context passed to guards, hooks, and subscribers.
//!
//! A context always carries the machine's `data` payload plus zero or more
//! injected capabilities. Capabilities live outside of `data` and are never
//! serialized into snapshots.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Named capability map attached to a context.
///
/// Values are type-erased; readers downcast with [`Context::capability`].
pub type Capabilities = HashMap<String, Arc<dyn Any + Send + Sync>>;

/// The value passed to every guard, hook, and subscriber.
///
/// `data` is the caller-defined mutable payload. Capabilities are named
/// values injected via `Machine::inject`/`inject_async`; a nested machine
/// additionally sees its parent's capabilities through the inherited map,
/// with its own entries shadowing them. An optional bound receiver (set
/// via `Machine::bind`) is available to hooks that integrate the machine
/// with an owning record.
pub struct Context<D> {
    data: D,
    capabilities: Capabilities,
    inherited: Capabilities,
    bound: Option<Arc<dyn Any + Send + Sync>>,
}

impl<D> Context<D> {
    pub fn new(data: D) -> Self {
        Self {
            data,
            capabilities: HashMap::new(),
            inherited: HashMap::new(),
            bound: None,
        }
    }

    /// The machine's data payload.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Mutable access to the data payload.
    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    pub(crate) fn set_data(&mut self, data: D) {
        self.data = data;
    }

    /// Look up an injected capability by key, downcast to its concrete type.
    ///
    /// Local capabilities take precedence over capabilities inherited from
    /// a parent machine. Returns `None` when the key is absent or the type
    /// does not match.
    pub fn capability<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.capabilities
            .get(key)
            .or_else(|| self.inherited.get(key))
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// The receiver bound via `Machine::bind`, if any.
    pub fn bound<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.bound.clone().and_then(|value| value.downcast::<T>().ok())
    }

    pub(crate) fn insert_capability(&mut self, key: String, value: Arc<dyn Any + Send + Sync>) {
        self.capabilities.insert(key, value);
    }

    pub(crate) fn set_inherited(&mut self, capabilities: Capabilities) {
        self.inherited = capabilities;
    }

    pub(crate) fn set_bound(&mut self, receiver: Arc<dyn Any + Send + Sync>) {
        self.bound = Some(receiver);
    }

    /// Inherited and local capabilities flattened into one map, local
    /// entries winning. This is what an activated child inherits.
    pub(crate) fn merged_capabilities(&self) -> Capabilities {
        let mut merged = self.inherited.clone();
        for (key, value) in &self.capabilities {
            merged.insert(key.clone(), Arc::clone(value));
        }
        merged
    }
}
