//! Parsing and rendering of the JSON schema dialect.
//!
//! The dialect admits records, arrays, unions and the primitive kinds only.
//! Named constructs outside that set (enum, fixed, map, decimal and other
//! logical types) are rejected up front.

use std::sync::Arc;

use fds_common::{Result, error::Error};
use serde_json::Value;

use crate::schema::{BasicType, Schema, SchemaNode};

impl Schema {
    /// Parses a schema from its JSON text, retaining the text for diagnostics.
    pub fn from_json(text: &str) -> Result<Schema> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::invalid_schema(format!("malformed schema JSON: {e}")))?;
        let root = parse_node(&value)?;
        Ok(Schema::new(Arc::new(root), text.to_string()))
    }
}

impl SchemaNode {
    /// Renders this node back to a JSON value.
    ///
    /// Record type names are not retained by the parser; rendered records are
    /// named after the field they are bound to. The output is meant for error
    /// messages and diagnostics, not for byte-exact schema round-trips.
    pub fn to_json(&self) -> Value {
        match self.basic_type() {
            kind if kind.is_primitive() => Value::String(kind.as_str().to_string()),
            BasicType::Array => serde_json::json!({
                "type": "array",
                "items": self.child_at(0).to_json(),
            }),
            BasicType::Union => {
                Value::Array(self.children().iter().map(|b| b.to_json()).collect())
            }
            BasicType::Record => serde_json::json!({
                "type": "record",
                "name": self.name().unwrap_or("record"),
                "fields": self
                    .children()
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "name": c.name().unwrap_or_default(),
                            "type": c.to_json(),
                        })
                    })
                    .collect::<Vec<_>>(),
            }),
            _ => unreachable!("non-primitive kinds handled above"),
        }
    }
}

fn parse_node(value: &Value) -> Result<SchemaNode> {
    match value {
        Value::String(name) => parse_primitive(name),
        Value::Array(branches) => {
            let branches = branches.iter().map(parse_node).collect::<Result<Vec<_>>>()?;
            Ok(SchemaNode::union(branches))
        }
        Value::Object(map) => {
            let type_value = map
                .get("type")
                .ok_or_else(|| Error::invalid_schema("schema object lacks a 'type'"))?;
            match type_value {
                Value::String(name) => match name.as_str() {
                    "record" => parse_record(map),
                    "array" => parse_array(map),
                    other => parse_primitive(other),
                },
                // The dialect permits wrapping any schema in {"type": ...}.
                nested @ (Value::Object(_) | Value::Array(_)) => parse_node(nested),
                other => Err(Error::invalid_schema(format!(
                    "unexpected 'type' value: {other}"
                ))),
            }
        }
        other => Err(Error::invalid_schema(format!(
            "unexpected schema element: {other}"
        ))),
    }
}

fn parse_primitive(name: &str) -> Result<SchemaNode> {
    let basic_type = match name {
        "null" => BasicType::Null,
        "boolean" => BasicType::Boolean,
        "int" => BasicType::Int,
        "long" => BasicType::Long,
        "float" => BasicType::Float,
        "double" => BasicType::Double,
        "bytes" => BasicType::Bytes,
        "string" => BasicType::String,
        "enum" | "fixed" | "map" => {
            return Err(Error::invalid_schema(format!(
                "unsupported schema construct '{name}'"
            )));
        }
        other => {
            return Err(Error::invalid_schema(format!(
                "unknown schema type '{other}'"
            )));
        }
    };
    Ok(SchemaNode::primitive(basic_type))
}

fn parse_array(map: &serde_json::Map<String, Value>) -> Result<SchemaNode> {
    let items = map
        .get("items")
        .ok_or_else(|| Error::invalid_schema("array schema lacks 'items'"))?;
    Ok(SchemaNode::array(parse_node(items)?))
}

fn parse_record(map: &serde_json::Map<String, Value>) -> Result<SchemaNode> {
    if !map.get("name").is_some_and(Value::is_string) {
        return Err(Error::invalid_schema("record schema lacks a 'name'"));
    }
    let fields = map
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::invalid_schema("record schema lacks a 'fields' array"))?;

    let mut parsed = Vec::with_capacity(fields.len());
    for field in fields {
        let field = field
            .as_object()
            .ok_or_else(|| Error::invalid_schema("record field is not an object"))?;
        let name = field
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_schema("record field lacks a 'name'"))?;
        let node = field
            .get("type")
            .ok_or_else(|| Error::invalid_schema(format!("field '{name}' lacks a 'type'")))?;
        parsed.push((name.to_string(), parse_node(node)?));
    }
    SchemaNode::record(parsed)
}
