//! Tool-call reconstruction for responses and streams.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// A tool call made by the model, with decoded structured arguments.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolCall {
    /// Provider-assigned call ID.
    pub id: CompactString,
    /// The name of the function to call.
    pub name: CompactString,
    /// Decoded arguments.
    pub arguments: Value,
}

impl ToolCall {
    /// Decode a provider's JSON argument string.
    ///
    /// A parse failure never discards the payload: the raw string is kept
    /// under a `raw` key instead.
    pub fn from_raw_arguments(
        id: impl Into<CompactString>,
        name: impl Into<CompactString>,
        raw: &str,
    ) -> Self {
        let arguments = if raw.trim().is_empty() {
            json!({})
        } else {
            match serde_json::from_str(raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("unparsable tool arguments: {e}, keeping raw string");
                    json!({ "raw": raw })
                }
            }
        };
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// A streaming fragment of a tool call.
///
/// Providers announce the call ID and name once and then stream the argument
/// JSON in pieces; fragments with the same `index` belong to one call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ToolCallDelta {
    /// Position of the call within the response.
    pub index: u32,
    /// Call ID, present on the first fragment.
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub id: CompactString,
    /// Function name, present on the first fragment.
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub name: CompactString,
    /// Argument JSON fragment; concatenates across fragments.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arguments: String,
}

impl ToolCallDelta {
    /// Merge a later fragment into this one.
    pub fn merge(&mut self, other: &Self) {
        if !other.id.is_empty() {
            self.id = other.id.clone();
        }
        if !other.name.is_empty() {
            self.name = other.name.clone();
        }
        self.arguments.push_str(&other.arguments);
    }
}

/// Accumulates tool-call fragments by index and finalizes them in order.
#[derive(Debug, Clone, Default)]
pub struct ToolCallBuilder {
    calls: BTreeMap<u32, ToolCallDelta>,
}

impl ToolCallBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a fragment from the stream.
    pub fn accept(&mut self, delta: &ToolCallDelta) {
        self.calls.entry(delta.index).or_default().merge(delta);
    }

    /// Whether any fragment has been accepted.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Decode the accumulated calls, in index order.
    pub fn build(&self) -> Vec<ToolCall> {
        self.calls
            .values()
            .map(|delta| {
                ToolCall::from_raw_arguments(delta.id.clone(), delta.name.clone(), &delta.arguments)
            })
            .collect()
    }
}
