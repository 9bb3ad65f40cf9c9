use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// The value held by a connection variable.
///
/// Serialized with an explicit type tag, e.g. `{"type": "number", "value": 3}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum VariableValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<VariableValue>),
    Object(BTreeMap<String, VariableValue>),
}

impl VariableValue {
    /// Converts raw user input into a typed value.
    ///
    /// Tries, in order: a number, a boolean, a quoted string, structured JSON.
    /// Anything else is kept as a bare string.
    pub fn sniff(raw: &str) -> Self {
        let text = raw.trim();

        if let Ok(int) = text.parse::<i64>() {
            return VariableValue::Number(int.into());
        }
        if let Some(number) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return VariableValue::Number(number);
        }

        match text {
            "true" | "True" => return VariableValue::Bool(true),
            "false" | "False" => return VariableValue::Bool(false),
            _ => {}
        }

        if text.len() >= 2 {
            let quoted = [('"', '"'), ('\'', '\'')]
                .iter()
                .any(|(open, close)| text.starts_with(*open) && text.ends_with(*close));
            if quoted {
                return VariableValue::String(text[1..text.len() - 1].to_string());
            }
        }

        if text.starts_with('{') || text.starts_with('[') || text == "null" {
            if let Ok(value) = serde_json::from_str::<Value>(text) {
                return VariableValue::from_json(&value);
            }
        }

        VariableValue::String(raw.to_string())
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => VariableValue::Null,
            Value::Bool(b) => VariableValue::Bool(*b),
            Value::Number(n) => VariableValue::Number(n.clone()),
            Value::String(s) => VariableValue::String(s.clone()),
            Value::Array(items) => {
                VariableValue::Array(items.iter().map(VariableValue::from_json).collect())
            }
            Value::Object(fields) => VariableValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), VariableValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            VariableValue::Null => Value::Null,
            VariableValue::Bool(b) => Value::Bool(*b),
            VariableValue::Number(n) => Value::Number(n.clone()),
            VariableValue::String(s) => Value::String(s.clone()),
            VariableValue::Array(items) => {
                Value::Array(items.iter().map(VariableValue::to_json).collect())
            }
            VariableValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            VariableValue::Null => "null",
            VariableValue::Bool(_) => "boolean",
            VariableValue::Number(_) => "number",
            VariableValue::String(_) => "string",
            VariableValue::Array(_) => "array",
            VariableValue::Object(_) => "object",
        }
    }
}

/// A named, typed value scoped to one connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: String,
    pub name: String,
    pub value: VariableValue,
    pub declared_type: String,
}

impl Variable {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: VariableValue) -> Self {
        let declared_type = value.type_name().to_string();
        Self {
            id: id.into(),
            name: name.into(),
            value,
            declared_type,
        }
    }

    /// Replaces the value and keeps the declared type in step with it.
    pub fn set(&mut self, value: VariableValue) {
        self.declared_type = value.type_name().to_string();
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sniff_order() {
        assert_eq!(VariableValue::sniff("42"), VariableValue::Number(42.into()));
        assert_eq!(VariableValue::sniff("2.5").to_json(), json!(2.5));
        assert_eq!(VariableValue::sniff("true"), VariableValue::Bool(true));
        assert_eq!(VariableValue::sniff("'42'"), VariableValue::String("42".into()));
        assert_eq!(VariableValue::sniff("\"yes\""), VariableValue::String("yes".into()));
        assert_eq!(
            VariableValue::sniff(r#"{"a": [1, null]}"#).to_json(),
            json!({"a": [1, null]})
        );
        assert_eq!(VariableValue::sniff("hello world"), VariableValue::String("hello world".into()));
        assert_eq!(VariableValue::sniff("{broken"), VariableValue::String("{broken".into()));
    }

    #[test]
    fn test_tagged_wire_form() {
        let value = VariableValue::Number(3.into());
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"type": "number", "value": 3}));
        let null: VariableValue = serde_json::from_value(json!({"type": "null"})).unwrap();
        assert_eq!(null, VariableValue::Null);
    }

    #[test]
    fn test_set_updates_declared_type() {
        let mut var = Variable::new("v1", "token", VariableValue::Null);
        assert_eq!(var.declared_type, "null");
        var.set(VariableValue::String("abc".into()));
        assert_eq!(var.declared_type, "string");
    }
}
