//! Wire types for the hub REST API.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A hub user and the servers it currently owns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserModel {
    #[serde(default)]
    pub name: String,
    /// Active servers keyed by name (`""` is the default server).
    /// A server missing from this map is fully stopped.
    #[serde(default)]
    pub servers: HashMap<String, ServerModel>,
}

impl UserModel {
    pub fn server(&self, name: &str) -> Option<&ServerModel> {
        self.servers.get(name)
    }
}

/// The hub's view of one named server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerModel {
    /// In-flight transition (`spawn`, `stop`, ...), if any
    #[serde(default)]
    pub pending: Option<String>,
    #[serde(default)]
    pub ready: bool,
    /// Hub-relative progress stream path
    #[serde(default, deserialize_with = "null_as_empty")]
    pub progress_url: String,
    /// Hub-relative server path, valid once ready
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
}

impl ServerModel {
    /// Returns the pending verb, treating an empty string as not pending.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref().filter(|p| !p.is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One event on a server progress stream.
///
/// `progress` and `message` are informational and kept as raw JSON so an
/// odd value never aborts a wait. `ready` and `failed` follow JSON
/// truthiness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProgressEvent {
    #[serde(default)]
    pub progress: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default, deserialize_with = "truthy")]
    pub ready: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub failed: bool,
    #[serde(default)]
    pub url: Option<String>,
}

impl ProgressEvent {
    /// Progress as printed in logs, `0` when absent.
    pub fn progress_label(&self) -> String {
        display_value(self.progress.as_ref(), "0")
    }

    pub fn message_text(&self) -> String {
        display_value(self.message.as_ref(), "")
    }
}

fn display_value(value: Option<&Value>, fallback: &str) -> String {
    match value {
        None | Some(Value::Null) => fallback.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    })
}

/// Response of the token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// A response handed back to the caller without enforcing success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawResponse {
    pub status: u16,
    /// Decoded JSON body, or the raw text as a JSON string
    pub body: Value,
}

impl RawResponse {
    pub fn from_parts(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        };
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
