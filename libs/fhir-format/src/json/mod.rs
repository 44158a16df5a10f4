//! FHIR JSON codec
//!
//! - A resource is an object whose first member is `resourceType`.
//! - A primitive field `f` is split into `f` (value) and `_f` (`id` and
//!   `extension`); either may be absent.
//! - A primitive list is split into two parallel arrays with `null` at
//!   indices that carry no value or no metadata.
//! - Complex fields are nested objects carrying their own `id`/`extension`.

mod decode;
mod encode;
mod primitive;

pub(crate) use decode::JsonDecoder;
pub(crate) use encode::JsonEncoder;

use crate::error::{Location, Result};
use serde_json::{Map, Value};

/// Short name of a JSON token for error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

fn expect_object<'v>(value: &'v Value, loc: &Location) -> Result<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| loc.malformed("object", describe(value)))
}

fn expect_array<'v>(value: &'v Value, loc: &Location) -> Result<&'v Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| loc.malformed("array", describe(value)))
}
