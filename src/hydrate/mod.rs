//! Snapshot capture and restore for state machines.
//!
//! A snapshot records `{current, data}` plus, recursively, the snapshot of
//! the active nested machine (or every member of an active parallel
//! group). Injected capabilities and the bound receiver are never
//! serialized. Restoring is a pure state overwrite; no guards or hooks
//! run.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod error;

pub use error::HydrationError;

/// Serializable capture of a machine's observable state.
///
/// The structure mirrors the active-child chain at the moment of capture:
/// `nested` holds the single active child's snapshot, `parallel` holds one
/// snapshot per member when a parallel group is active. At most one of the
/// two is set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current state, serialized with the machine's state type.
    pub current: Value,
    /// Data payload, serialized with the machine's data type.
    pub data: Value,
    /// Snapshot of the active nested machine, if one is active.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nested: Option<Box<Snapshot>>,
    /// Snapshots of the active parallel group members, in attachment order.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parallel: Option<Vec<Snapshot>>,
}

impl Snapshot {
    /// Capture a flat snapshot with no nested chain.
    pub fn leaf(current: Value, data: Value) -> Self {
        Self {
            current,
            data,
            nested: None,
            parallel: None,
        }
    }

    /// Encode as a JSON string.
    pub fn to_json(&self) -> Result<String, HydrationError> {
        serde_json::to_string(self).map_err(|e| HydrationError::SerializationFailed(e.to_string()))
    }

    /// Decode from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, HydrationError> {
        serde_json::from_str(json).map_err(|e| HydrationError::DeserializationFailed(e.to_string()))
    }

    /// Encode as JSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>, HydrationError> {
        serde_json::to_vec(self).map_err(|e| HydrationError::SerializationFailed(e.to_string()))
    }

    /// Decode from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HydrationError> {
        serde_json::from_slice(bytes)
            .map_err(|e| HydrationError::DeserializationFailed(e.to_string()))
    }
}
