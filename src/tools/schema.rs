//! Parameter contracts built from MCP input schemas
//!
//! A tool whose schema declares properties becomes a structured tool: named,
//! typed arguments validated before dispatch. A tool without properties
//! becomes a simple tool taking one opaque text input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::mcp::InputSchema;

/// Argument name used for the text input of a simple tool
pub const SIMPLE_INPUT: &str = "input";

/// Declared kind of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    /// Map a JSON Schema `type`; anything unknown or missing is a string
    ///
    /// Union types such as `["integer", "null"]` use their first non-null member.
    pub fn from_schema_type(schema_type: Option<&Value>) -> Self {
        let name = match schema_type {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null"),
            _ => None,
        };
        match name {
            Some("integer") => ParamKind::Integer,
            Some("number") => ParamKind::Number,
            Some("boolean") => ParamKind::Boolean,
            _ => ParamKind::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }

    /// Check a value against this kind, with lax coercion from strings
    fn coerce(&self, name: &str, value: Value) -> Result<Value> {
        let coerced = match (self, &value) {
            (ParamKind::String, Value::String(_)) => Some(value.clone()),

            (ParamKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Some(value.clone()),
            (ParamKind::Integer, Value::Number(n)) => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| Value::from(f as i64)),
            (ParamKind::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),

            (ParamKind::Number, Value::Number(_)) => Some(value.clone()),
            (ParamKind::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),

            (ParamKind::Boolean, Value::Bool(_)) => Some(value.clone()),
            (ParamKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(Value::Bool(true)),
                "false" | "0" | "no" | "off" => Some(Value::Bool(false)),
                _ => None,
            },
            (ParamKind::Boolean, Value::Number(n)) => match n.as_i64() {
                Some(0) => Some(Value::Bool(false)),
                Some(1) => Some(Value::Bool(true)),
                _ => None,
            },

            _ => None,
        };

        coerced.ok_or_else(|| {
            Error::InvalidInput(format!(
                "parameter '{}' expects {}, got {}",
                name,
                self.as_str(),
                value
            ))
        })
    }
}

/// Default applied when a parameter is not supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    /// Must be supplied by the caller
    Required,
    /// Left out of the outbound call entirely
    Absent,
}

/// One named parameter of a structured tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub default: ParamDefault,
}

impl ParamSpec {
    pub fn is_required(&self) -> bool {
        self.default == ParamDefault::Required
    }
}

/// Call contract of a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterContract {
    /// Single unnamed text input, passed through unchanged
    Simple,
    /// Named, typed parameters validated before dispatch
    Structured(Vec<ParamSpec>),
}

impl ParameterContract {
    /// Build a contract from a tool's declared input schema
    pub fn from_schema(schema: &InputSchema) -> Self {
        if schema.properties.is_empty() {
            return ParameterContract::Simple;
        }

        let params = schema
            .properties
            .iter()
            .map(|(name, prop)| ParamSpec {
                name: name.clone(),
                kind: ParamKind::from_schema_type(prop.get("type")),
                description: prop
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                default: if schema.required.iter().any(|r| r == name) {
                    ParamDefault::Required
                } else {
                    ParamDefault::Absent
                },
            })
            .collect();

        ParameterContract::Structured(params)
    }

    pub fn is_simple(&self) -> bool {
        matches!(self, ParameterContract::Simple)
    }

    /// Declared parameters; empty for a simple tool
    pub fn params(&self) -> &[ParamSpec] {
        match self {
            ParameterContract::Simple => &[],
            ParameterContract::Structured(params) => params,
        }
    }

    pub fn required_names(&self) -> Vec<&str> {
        self.params()
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Validate caller arguments and build the outbound `arguments` object
    pub fn prepare(&self, args: Value) -> Result<Value> {
        match self {
            ParameterContract::Simple => prepare_simple(args),
            ParameterContract::Structured(params) => prepare_structured(params, args),
        }
    }

    /// Render the contract as a JSON Schema object
    pub fn to_json_schema(&self) -> Value {
        match self {
            ParameterContract::Simple => serde_json::json!({
                "type": "object",
                "properties": {
                    SIMPLE_INPUT: { "type": "string", "description": "Tool input" }
                }
            }),
            ParameterContract::Structured(params) => {
                let properties: Map<String, Value> = params
                    .iter()
                    .map(|p| {
                        (
                            p.name.clone(),
                            serde_json::json!({
                                "type": p.kind.as_str(),
                                "description": p.description,
                            }),
                        )
                    })
                    .collect();
                serde_json::json!({
                    "type": "object",
                    "properties": properties,
                    "required": self.required_names(),
                })
            }
        }
    }
}

fn prepare_simple(args: Value) -> Result<Value> {
    let text = match args {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Object(mut map) => match map.remove(SIMPLE_INPUT) {
            Some(Value::String(s)) if map.is_empty() => s,
            Some(Value::Null) | None if map.is_empty() => String::new(),
            Some(other) if map.is_empty() => other.to_string(),
            _ => {
                return Err(Error::InvalidInput(
                    "tool takes a single text input".to_string(),
                ))
            }
        },
        other => other.to_string(),
    };

    let mut arguments = Map::new();
    if !text.is_empty() {
        arguments.insert(SIMPLE_INPUT.to_string(), Value::String(text));
    }
    Ok(Value::Object(arguments))
}

fn prepare_structured(params: &[ParamSpec], args: Value) -> Result<Value> {
    let mut supplied = match args {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        // A bare value fills the only parameter a tool declares.
        other if params.len() == 1 => {
            let mut map = Map::new();
            map.insert(params[0].name.clone(), other);
            map
        }
        other => {
            return Err(Error::InvalidInput(format!(
                "expected an object of named arguments, got {}",
                other
            )))
        }
    };

    let mut arguments = Map::new();
    for param in params {
        match supplied.remove(&param.name) {
            Some(Value::Null) | None => {
                if param.is_required() {
                    return Err(Error::InvalidInput(format!(
                        "missing required parameter '{}'",
                        param.name
                    )));
                }
            }
            Some(value) => {
                arguments.insert(param.name.clone(), param.kind.coerce(&param.name, value)?);
            }
        }
    }

    if !supplied.is_empty() {
        debug!(
            extra = ?supplied.keys().collect::<Vec<_>>(),
            "Dropping arguments not declared by the tool"
        );
    }

    Ok(Value::Object(arguments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> InputSchema {
        serde_json::from_value(value).unwrap()
    }

    fn demo_contract() -> ParameterContract {
        ParameterContract::from_schema(&schema(json!({
            "type": "object",
            "properties": {
                "count": {"type": "integer", "description": "amount"},
                "ratio": {"type": "number"},
                "verbose": {"type": "boolean"},
                "label": {"type": "string"},
                "mystery": {"type": "array"}
            },
            "required": ["count"]
        })))
    }

    #[test]
    fn test_required_membership() {
        let contract = demo_contract();
        assert!(!contract.is_simple());
        assert_eq!(contract.required_names(), vec!["count"]);
        for param in contract.params() {
            if param.name == "count" {
                assert_eq!(param.default, ParamDefault::Required);
                assert_eq!(param.description, "amount");
            } else {
                assert_eq!(param.default, ParamDefault::Absent);
            }
        }
    }

    #[test]
    fn test_unknown_kind_defaults_to_string() {
        let contract = demo_contract();
        let mystery = contract.params().iter().find(|p| p.name == "mystery").unwrap();
        assert_eq!(mystery.kind, ParamKind::String);
        assert_eq!(ParamKind::from_schema_type(None), ParamKind::String);
        assert_eq!(
            ParamKind::from_schema_type(Some(&json!(["null", "integer"]))),
            ParamKind::Integer
        );
    }

    #[test]
    fn test_empty_schema_is_simple() {
        assert!(ParameterContract::from_schema(&InputSchema::default()).is_simple());
        assert!(ParameterContract::from_schema(&schema(json!({"type": "object"}))).is_simple());
    }

    #[test]
    fn test_optional_params_are_omitted() {
        let args = demo_contract().prepare(json!({"count": 2})).unwrap();
        assert_eq!(args, json!({"count": 2}));

        let args = demo_contract()
            .prepare(json!({"count": 2, "label": null, "unknown": 1}))
            .unwrap();
        assert_eq!(args, json!({"count": 2}));
    }

    #[test]
    fn test_missing_required_fails() {
        let err = demo_contract().prepare(json!({"ratio": 0.5})).unwrap_err();
        assert!(err.to_string().contains("count"));
    }

    #[test]
    fn test_lax_coercion() {
        let args = demo_contract()
            .prepare(json!({"count": "3", "ratio": "0.25", "verbose": "true", "label": "x"}))
            .unwrap();
        assert_eq!(
            args,
            json!({"count": 3, "ratio": 0.25, "verbose": true, "label": "x"})
        );

        let args = demo_contract().prepare(json!({"count": 4.0})).unwrap();
        assert_eq!(args, json!({"count": 4}));
    }

    #[test]
    fn test_wrong_kind_fails() {
        assert!(demo_contract().prepare(json!({"count": "many"})).is_err());
        assert!(demo_contract().prepare(json!({"count": 1.5})).is_err());
        assert!(demo_contract().prepare(json!({"count": 1, "label": 7})).is_err());
        assert!(demo_contract().prepare(json!("just text")).is_err());
    }

    #[test]
    fn test_bare_value_fills_single_param() {
        let contract = ParameterContract::from_schema(&schema(json!({
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        })));
        assert_eq!(contract.prepare(json!("rust")).unwrap(), json!({"query": "rust"}));
    }

    #[test]
    fn test_simple_input() {
        let contract = ParameterContract::Simple;
        assert_eq!(contract.prepare(json!("ping")).unwrap(), json!({"input": "ping"}));
        assert_eq!(contract.prepare(json!({"input": "ping"})).unwrap(), json!({"input": "ping"}));
        assert_eq!(contract.prepare(json!("")).unwrap(), json!({}));
        assert_eq!(contract.prepare(Value::Null).unwrap(), json!({}));
        assert_eq!(contract.prepare(json!({})).unwrap(), json!({}));
        assert!(contract.prepare(json!({"a": 1, "b": 2})).is_err());
    }

    #[test]
    fn test_json_schema_rendering() {
        let rendered = demo_contract().to_json_schema();
        assert_eq!(rendered["required"], json!(["count"]));
        assert_eq!(rendered["properties"]["count"]["type"], "integer");
        assert_eq!(rendered["properties"]["mystery"]["type"], "string");

        let simple = ParameterContract::Simple.to_json_schema();
        assert_eq!(simple["properties"]["input"]["type"], "string");
    }
}
