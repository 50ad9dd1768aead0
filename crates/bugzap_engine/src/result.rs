use serde_json::{Map, Value};

/// Backend analysis that passed the shape check.
///
/// Only `summary` is guaranteed. The other fields belong to the backend's
/// contract and are read leniently, so a surprising type hides the field
/// instead of rejecting the whole result.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    fields: Map<String, Value>,
}

impl AnalysisResult {
    /// Shape check: a JSON object whose `summary` is a string.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) if fields.get("summary").is_some_and(Value::is_string) => {
                Some(Self { fields })
            }
            _ => None,
        }
    }

    pub fn summary(&self) -> &str {
        self.str_field("summary").unwrap_or_default()
    }

    pub fn engine(&self) -> Option<&str> {
        self.str_field("engine")
    }

    pub fn root_cause(&self) -> Option<&str> {
        self.str_field("root_cause")
    }

    pub fn evidence(&self) -> Vec<&str> {
        self.str_list("evidence")
    }

    pub fn recommendations(&self) -> Vec<&str> {
        self.str_list("recommendations")
    }

    pub fn code_patch(&self) -> Option<&str> {
        self.str_field("code_patch").filter(|patch| !patch.is_empty())
    }

    pub fn confidence(&self) -> Option<f64> {
        self.fields.get("confidence").and_then(Value::as_f64)
    }

    pub fn detected_signatures(&self) -> Vec<&str> {
        self.str_list("detected_signatures")
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.fields)
    }

    pub fn to_pretty_json(&self) -> String {
        // A Map<String, Value> always serializes.
        serde_json::to_string_pretty(&self.fields).unwrap_or_default()
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    fn str_list(&self, key: &str) -> Vec<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
