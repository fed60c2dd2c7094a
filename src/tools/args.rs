//! Raw tool arguments with per-field validation.
//!
//! rmcp deserializes tool arguments before the tool runs, and serde's
//! type errors do not say which field was wrong. [`ToolArgs`] accepts any
//! JSON object and checks each required field by name before building the
//! typed input, while advertising the typed input's schema.

use crate::error::{KustoError, KustoResult};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};
use std::borrow::Cow;
use std::marker::PhantomData;

/// A tool input whose required arguments are all strings.
pub trait ToolInput: DeserializeOwned + JsonSchema {
    /// Required string arguments, in the order they are checked.
    const REQUIRED: &'static [&'static str];
}

/// Tool arguments as received, typed by the input they parse into.
pub struct ToolArgs<T> {
    raw: Map<String, JsonValue>,
    _input: PhantomData<fn() -> T>,
}

impl<T> ToolArgs<T> {
    pub fn new(raw: Map<String, JsonValue>) -> Self {
        Self {
            raw,
            _input: PhantomData,
        }
    }
}

impl<T: ToolInput> ToolArgs<T> {
    /// Check every required argument by name, then build the typed input.
    ///
    /// Unknown arguments are ignored.
    pub fn parse(self) -> KustoResult<T> {
        for field in T::REQUIRED {
            match self.raw.get(*field) {
                None | Some(JsonValue::Null) => {
                    return Err(KustoError::invalid_argument(
                        *field,
                        "missing required argument",
                    ));
                }
                Some(JsonValue::String(_)) => {}
                Some(other) => {
                    return Err(KustoError::invalid_argument(
                        *field,
                        format!("expected a string, got {}", json_kind(other)),
                    ));
                }
            }
        }

        serde_json::from_value(JsonValue::Object(self.raw))
            .map_err(|e| KustoError::invalid_argument("arguments", e.to_string()))
    }
}

impl<'de, T> Deserialize<'de> for ToolArgs<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::new)
    }
}

impl<T: JsonSchema> JsonSchema for ToolArgs<T> {
    fn schema_name() -> Cow<'static, str> {
        T::schema_name()
    }

    fn schema_id() -> Cow<'static, str> {
        T::schema_id()
    }

    fn inline_schema() -> bool {
        T::inline_schema()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        T::json_schema(generator)
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
