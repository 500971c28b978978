//! # Call and Violation Records
//!
//! Shapes returned by the results service. Decoding degrades field by
//! field: a scalar of the wrong type becomes its default (or, for text
//! fields, its string form) without affecting its neighbours. Every
//! element of a `violations` array yields exactly one [`Violation`], so a
//! report built from the feed has one row per violation the server sent.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One detected breach of a rule within a call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule the analyzer matched. Need not exist in the catalog.
    #[serde(default, deserialize_with = "lenient_text")]
    pub rule_code: Option<String>,
    /// Display code; overrides `rule_code` for display, never for lookup.
    #[serde(default, deserialize_with = "lenient_text")]
    pub code: Option<String>,
    /// Raw severity tag as sent by the analyzer. Empty when absent.
    #[serde(default, deserialize_with = "lenient_severity")]
    pub severity: String,
}

impl Violation {
    pub fn new(rule_code: impl Into<String>, severity: impl Into<String>) -> Self {
        Self {
            rule_code: Some(rule_code.into()),
            code: None,
            severity: severity.into(),
        }
    }

    /// Set the display code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// A processed call and the violations found in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Call {
    #[serde(default, deserialize_with = "lenient_text")]
    pub call_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub audio_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transcript_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_violations")]
    pub violations: Vec<Violation>,
}

impl Call {
    /// A call with the given id and filename and no violations.
    pub fn new(call_id: Option<&str>, filename: impl Into<String>) -> Self {
        Self {
            call_id: call_id.map(str::to_string),
            filename: Some(filename.into()),
            ..Self::default()
        }
    }

    pub fn with_violation(mut self, violation: Violation) -> Self {
        self.violations.push(violation);
        self
    }
}

/// Body of `GET /results`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsFeed {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_calls: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_violations: u64,
    /// Percentage in `0.0..=100.0`, computed server-side.
    #[serde(default, deserialize_with = "lenient_rate")]
    pub compliance_rate: f64,
    #[serde(default, deserialize_with = "lenient_list")]
    pub calls: Vec<Call>,
}

impl ResultsFeed {
    /// Parse a feed from an arbitrary JSON value. Anything that is not an
    /// object yields an empty feed.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(feed) => feed,
            Err(e) => {
                tracing::warn!(error = %e, "results feed is malformed, using empty feed");
                Self::default()
            }
        }
    }
}

/// Deserialize a list, tolerating a non-array value (empty list) and
/// dropping elements that do not match `T`.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(items) = array_or_empty(Value::deserialize(deserializer)?) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value(item) {
            Ok(parsed) => out.push(parsed),
            Err(e) => tracing::warn!(index, error = %e, "dropping malformed list element"),
        }
    }
    Ok(out)
}

/// Like [`lenient_list`], but an element that is not a violation object
/// becomes an empty [`Violation`] instead of being dropped.
fn lenient_violations<'de, D>(deserializer: D) -> Result<Vec<Violation>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(items) = array_or_empty(Value::deserialize(deserializer)?) else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                tracing::warn!(index, error = %e, "malformed violation, keeping it with empty fields");
                Violation::default()
            })
        })
        .collect())
}

fn array_or_empty(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Null => None,
        other => {
            tracing::debug!("expected a list, found {}; treating as empty", kind(&other));
            None
        }
    }
}

/// Strings pass through, numbers and booleans are stringified, anything
/// else reads as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => {
            tracing::debug!("expected text, found {}; treating as absent", kind(&other));
            None
        }
    })
}

fn lenient_severity<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_text(deserializer).map(Option::unwrap_or_default)
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let count = match &value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(count.unwrap_or_else(|| {
        if !value.is_null() {
            tracing::warn!("expected a count, found {}; using 0", kind(&value));
        }
        0
    }))
}

fn lenient_rate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let rate = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(rate.filter(|r| r.is_finite()).unwrap_or_else(|| {
        if !value.is_null() {
            tracing::warn!("expected a rate, found {}; using 0", kind(&value));
        }
        0.0
    }))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
