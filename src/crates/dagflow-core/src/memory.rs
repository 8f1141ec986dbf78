//! Shared workflow memory.
//!
//! [`GlobalMemory`] maps node ids to the output each node last produced,
//! plus the reserved key `inputs` holding the initial input bundle. The
//! engine is the only writer: it stores one entry per completed node. Nodes
//! never touch memory directly; they receive resolved inputs and return an
//! output map.
//!
//! All access is serialised under a single mutex. [`GlobalMemory::snapshot`]
//! copies the top-level map so template expansion and guard evaluation see a
//! consistent point-in-time view; inner structures are shared values the
//! caller reads but must not mutate.

use parking_lot::Mutex;
use serde_json::{Map, Value};

/// Reserved top-level key for the initial input bundle.
pub const INPUTS_KEY: &str = "inputs";

/// Thread-safe mapping from node id to that node's last output.
#[derive(Debug, Default)]
pub struct GlobalMemory {
    data: Mutex<Map<String, Value>>,
}

impl GlobalMemory {
    /// Create a memory pre-populated with the given top-level entries.
    pub fn new(initial: Map<String, Value>) -> Self {
        Self {
            data: Mutex::new(initial),
        }
    }

    /// Create a memory holding `bundle` under the reserved `inputs` key.
    pub fn with_inputs(bundle: Value) -> Self {
        let mut data = Map::new();
        data.insert(INPUTS_KEY.to_string(), bundle);
        Self {
            data: Mutex::new(data),
        }
    }

    /// Dotted-path lookup. `"a.b.c"` walks nested objects; returns `None`
    /// if any segment is missing or traverses a non-object.
    pub fn get(&self, path: &str) -> Option<Value> {
        let data = self.data.lock();
        let mut current: &Value = &Value::Null;
        for (i, segment) in path.split('.').enumerate() {
            current = if i == 0 {
                data.get(segment)?
            } else {
                current.as_object()?.get(segment)?
            };
        }
        Some(current.clone())
    }

    /// Set a top-level key atomically, replacing any previous value.
    pub fn set(&self, key: &str, value: Value) {
        self.data.lock().insert(key.to_string(), value);
    }

    /// Shallow copy of the top-level map, used to seed template contexts.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.data.lock().clone()
    }
}
