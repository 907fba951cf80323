//! Argument validation primitives
//!
//! Tool arguments arrive as an untyped JSON object. These helpers coerce the
//! individual values into typed data with uniform `InvalidParams` failures,
//! following loose "truthiness" rules: `null`, `false`, `0` and `""` count
//! as empty, and a JSON `null` is indistinguishable from a missing key.

use crate::error::{ToolCallResult, ToolError};
use serde_json::{Map, Value};

/// Raw argument bundle for a single tool call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    /// Wrap call arguments. Anything other than an object is treated as empty.
    pub fn new(arguments: Value) -> Self {
        match arguments {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Get a value, treating JSON `null` as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Whether a field is present (falsy values count as present).
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Required string field.
    pub fn require_string(&self, name: &str) -> ToolCallResult<String> {
        require_string(self.get(name), name)
    }

    /// Optional string field.
    pub fn optional_string(&self, name: &str) -> Option<String> {
        optional_string(self.get(name))
    }

    /// String form of a field that is present, including falsy values.
    pub fn present_string(&self, name: &str) -> Option<String> {
        self.get(name).map(stringify)
    }

    /// Numeric field with a default.
    pub fn number_or(&self, name: &str, default: i64) -> i64 {
        number_with_default(self.get(name), default)
    }

    /// Boolean field with a default.
    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        boolean_with_default(self.get(name), default)
    }

    /// Optional list field.
    pub fn optional_array(&self, name: &str) -> Option<Vec<String>> {
        optional_array(self.get(name))
    }

    /// One of two fields, the first winning when both are set.
    pub fn require_either(&self, first: &str, second: &str) -> ToolCallResult<String> {
        require_either(self.get(first), first, self.get(second), second)
    }

    /// Reject bundles where none of `names` is present.
    pub fn require_at_least_one(&self, names: &[&str]) -> ToolCallResult<()> {
        require_at_least_one_field(self, names)
    }
}

impl From<Value> for ToolArgs {
    fn from(arguments: Value) -> Self {
        Self::new(arguments)
    }
}

/// Coerce a value to a string, returning `None` for falsy values.
fn coerce_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::Null | Value::Bool(false) => return None,
        Value::Bool(true) => "true".to_string(),
        Value::Number(n) => {
            if n.as_f64() == Some(0.0) {
                return None;
            }
            n.to_string()
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| coerce_string(item).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(","),
        // Objects keep their content as compact JSON text.
        Value::Object(_) => value.to_string(),
    };
    Some(s).filter(|s| !s.is_empty())
}

/// Whether a value is "truthy".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Require a string parameter, failing if missing or empty.
pub fn require_string(value: Option<&Value>, name: &str) -> ToolCallResult<String> {
    value
        .and_then(coerce_string)
        .ok_or_else(|| ToolError::invalid_params(format!("{} is required", name)))
}

/// Optional string parameter; falsy input is absent.
pub fn optional_string(value: Option<&Value>) -> Option<String> {
    value.and_then(coerce_string)
}

/// Number with a default value.
///
/// No range validation. Values that cannot be read as a number fall back to
/// the default.
pub fn number_with_default(value: Option<&Value>, default: i64) -> i64 {
    match value {
        None => default,
        Some(Value::Null) => 0,
        Some(Value::Bool(b)) => i64::from(*b),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(default),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0
            } else {
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
                    .unwrap_or(default)
            }
        }
        Some(_) => default,
    }
}

/// Boolean with a default value.
///
/// Native booleans pass through, strings are true only for
/// case-insensitive `"true"`, anything else uses truthiness.
pub fn boolean_with_default(value: Option<&Value>, default: bool) -> bool {
    match value {
        None => default,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(other) => is_truthy(other),
    }
}

/// Require one of two parameters, the first winning when both are present.
pub fn require_either(
    first: Option<&Value>,
    first_name: &str,
    second: Option<&Value>,
    second_name: &str,
) -> ToolCallResult<String> {
    optional_string(first)
        .or_else(|| optional_string(second))
        .ok_or_else(|| {
            ToolError::invalid_params(format!(
                "Either {} or {} is required",
                first_name, second_name
            ))
        })
}

/// Require at least one of the named fields to be present.
///
/// Presence is about definedness, not truthiness: `0` or `""` count.
pub fn require_at_least_one_field(args: &ToolArgs, names: &[&str]) -> ToolCallResult<()> {
    if names.iter().any(|name| args.contains(name)) {
        return Ok(());
    }
    Err(ToolError::invalid_params(format!(
        "At least one of ({}) must be provided",
        names.join(", ")
    )))
}

/// Require a non-empty array parameter.
///
/// No built-in tool takes a required list; exported for custom handlers.
pub fn require_array(value: Option<&Value>, name: &str) -> ToolCallResult<Vec<String>> {
    match value {
        Some(Value::Array(items)) if !items.is_empty() => {
            Ok(items.iter().map(stringify).collect())
        }
        _ => Err(ToolError::invalid_params(format!(
            "{} must be a non-empty array",
            name
        ))),
    }
}

/// Optional array parameter.
///
/// Arrays are converted element-wise; a string is split on commas.
pub fn optional_array(value: Option<&Value>) -> Option<Vec<String>> {
    let value = value.filter(|v| is_truthy(v))?;
    match value {
        Value::Array(items) => Some(items.iter().map(stringify).collect()),
        Value::String(s) => Some(s.split(',').map(|part| part.trim().to_string()).collect()),
        _ => None,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => coerce_string(other).unwrap_or_else(|| other.to_string()),
    }
}
