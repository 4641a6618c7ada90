//! Contract interface loading.
//!
//! Wraps a parsed JSON ABI and assigns every method and event a console label
//! that is unique within its category.

use alloy::json_abi::{Constructor, Event, Function, JsonAbi, StateMutability};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Labels the console reserves for navigation in every menu.
pub const RESERVED_LABELS: [&str; 3] = ["..", "help", "exit"];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read ABI file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse ABI: {0}")]
    Parse(String),
}

/// A callable method and its console label.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub label: String,
    pub function: Function,
}

impl MethodDescriptor {
    /// View and pure methods need no transaction.
    pub fn is_constant(&self) -> bool {
        matches!(
            self.function.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
    }

    pub fn is_payable(&self) -> bool {
        self.function.state_mutability == StateMutability::Payable
    }

    pub fn signature(&self) -> String {
        self.function.full_signature()
    }
}

/// An event and its console label.
#[derive(Debug, Clone)]
pub struct EventDescriptor {
    pub label: String,
    pub event: Event,
}

impl EventDescriptor {
    pub fn signature(&self) -> String {
        self.event.full_signature()
    }

    /// Number of arguments eligible for topic filtering.
    pub fn indexed_count(&self) -> usize {
        self.event.inputs.iter().filter(|p| p.indexed).count()
    }
}

/// Immutable view of a contract interface.
#[derive(Debug, Clone)]
pub struct InterfaceSchema {
    methods: Vec<MethodDescriptor>,
    events: Vec<EventDescriptor>,
    constructor: Option<Constructor>,
}

impl InterfaceSchema {
    /// Load and parse an ABI file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Parse an ABI from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let abi: JsonAbi =
            serde_json::from_str(json).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Ok(Self::from_abi(abi))
    }

    pub fn from_abi(abi: JsonAbi) -> Self {
        let mut taken = HashSet::new();
        let methods = abi
            .functions()
            .map(|function| MethodDescriptor {
                label: unique_label(&function.name, &mut taken),
                function: function.clone(),
            })
            .collect();

        let mut taken = HashSet::new();
        let events = abi
            .events()
            .map(|event| EventDescriptor {
                label: unique_label(&event.name, &mut taken),
                event: event.clone(),
            })
            .collect();

        Self {
            methods,
            events,
            constructor: abi.constructor,
        }
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn events(&self) -> &[EventDescriptor] {
        &self.events
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    pub fn method(&self, label: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.label == label)
    }

    pub fn event(&self, label: &str) -> Option<&EventDescriptor> {
        self.events.iter().find(|e| e.label == label)
    }
}

fn unique_label(name: &str, taken: &mut HashSet<String>) -> String {
    let free = |label: &str, taken: &HashSet<String>| {
        !label.is_empty() && !taken.contains(label) && !RESERVED_LABELS.contains(&label)
    };

    let mut label = name.to_string();
    let mut index = 0usize;
    while !free(&label, taken) {
        label = format!("{}{}", name, index);
        index += 1;
    }
    taken.insert(label.clone());
    label
}
