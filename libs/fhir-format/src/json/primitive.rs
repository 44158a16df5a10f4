//! Primitive and array alignment codecs

use super::{describe, expect_array, expect_object, JsonDecoder, JsonEncoder};
use crate::error::{Location, Result};
use helix_models::element::PrimitiveList;
use helix_models::common::primitive::parse_decimal;
use helix_models::{Extension, PrimitiveNode, PrimitiveSlot, Scalar};
use serde_json::{Map, Number, Value};

impl JsonDecoder<'_> {
    /// Value half of a primitive: a JSON string, number or boolean.
    pub(super) fn decode_value(
        &self,
        value: &Value,
        target: &mut dyn PrimitiveSlot,
        loc: &Location,
    ) -> Result<()> {
        let scalar = match value {
            Value::Bool(b) => Scalar::Boolean(*b),
            Value::String(s) => Scalar::String(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Integer(i),
                None => Scalar::Decimal(
                    parse_decimal(&n.to_string()).map_err(|e| loc.conversion(e))?,
                ),
            },
            other => return Err(loc.malformed("primitive value", describe(other))),
        };
        target.set_scalar(scalar).map_err(|e| loc.conversion(e))
    }

    /// Metadata half of a primitive: `{"id": .., "extension": [..]}`.
    pub(super) fn decode_metadata(
        &self,
        value: &Value,
        target: &mut dyn PrimitiveSlot,
        loc: &Location,
    ) -> Result<()> {
        for (key, member) in expect_object(value, loc)? {
            match key.as_str() {
                "id" => {
                    let id = member
                        .as_str()
                        .ok_or_else(|| loc.field("id").malformed("string", describe(member)))?;
                    target.set_id(id.to_string());
                }
                "extension" => {
                    let loc = loc.field("extension");
                    for (i, item) in expect_array(member, &loc)?.iter().enumerate() {
                        let loc = loc.index(i);
                        let obj = expect_object(item, &loc)?;
                        let extension = push_default(target.extensions_mut());
                        self.decode_element(obj, extension, &loc)?;
                    }
                }
                other => return Err(loc.unknown_field(other)),
            }
        }
        Ok(())
    }

    /// Values array of a primitive list; `null` entries leave the index
    /// without a value.
    pub(super) fn decode_value_list(
        &self,
        value: &Value,
        list: &mut dyn PrimitiveList,
        loc: &Location,
    ) -> Result<()> {
        let items = expect_array(value, loc)?;
        grow(list, items.len());
        for (i, item) in items.iter().enumerate() {
            if item.is_null() {
                continue;
            }
            if let Some(slot) = list.slot_mut(i) {
                self.decode_value(item, slot, &loc.index(i))?;
            }
        }
        Ok(())
    }

    /// Metadata array of a primitive list, aligned by index with the values.
    pub(super) fn decode_metadata_list(
        &self,
        value: &Value,
        list: &mut dyn PrimitiveList,
        loc: &Location,
    ) -> Result<()> {
        let items = expect_array(value, loc)?;
        grow(list, items.len());
        for (i, item) in items.iter().enumerate() {
            if item.is_null() {
                continue;
            }
            if let Some(slot) = list.slot_mut(i) {
                self.decode_metadata(item, slot, &loc.index(i))?;
            }
        }
        Ok(())
    }
}

/// Grows `list` to at least `len` entries; the two halves of a list may
/// differ in length.
fn grow(list: &mut dyn PrimitiveList, len: usize) {
    if list.len() < len {
        list.resize(len);
    }
}

fn push_default(list: &mut Vec<Extension>) -> &mut Extension {
    let index = list.len();
    list.push(Extension::default());
    &mut list[index]
}

impl JsonEncoder {
    /// Splits a primitive into its value and metadata halves.
    pub(super) fn encode_primitive(
        &self,
        primitive: &dyn PrimitiveNode,
    ) -> Result<(Option<Value>, Option<Value>)> {
        let value = primitive.scalar().map(|s| scalar_to_json(&s)).transpose()?;
        let metadata = if primitive.has_metadata() {
            Some(self.encode_metadata(primitive)?)
        } else {
            None
        };
        Ok((value, metadata))
    }

    fn encode_metadata(&self, primitive: &dyn PrimitiveNode) -> Result<Value> {
        let mut obj = Map::new();
        if let Some(id) = primitive.id() {
            obj.insert("id".to_string(), Value::String(id.clone()));
        }
        if !primitive.extensions().is_empty() {
            let extensions = primitive
                .extensions()
                .iter()
                .map(|ext| self.encode_element(ext).map(Value::Object))
                .collect::<Result<Vec<_>>>()?;
            obj.insert("extension".to_string(), Value::Array(extensions));
        }
        Ok(Value::Object(obj))
    }

    /// Splits a primitive list into two index-aligned arrays. Each array is
    /// emitted only if at least one entry contributes to it.
    pub(super) fn encode_primitive_list(
        &self,
        items: &[&dyn PrimitiveNode],
    ) -> Result<(Option<Value>, Option<Value>)> {
        let mut values = Vec::with_capacity(items.len());
        let mut metadata = Vec::with_capacity(items.len());
        for item in items {
            let (value, meta) = self.encode_primitive(*item)?;
            values.push(value.unwrap_or(Value::Null));
            metadata.push(meta.unwrap_or(Value::Null));
        }

        let values = values
            .iter()
            .any(|v| !v.is_null())
            .then(|| Value::Array(values));
        let metadata = metadata
            .iter()
            .any(|m| !m.is_null())
            .then(|| Value::Array(metadata));
        Ok((values, metadata))
    }
}

fn scalar_to_json(scalar: &Scalar) -> Result<Value> {
    Ok(match scalar {
        Scalar::Boolean(b) => Value::Bool(*b),
        Scalar::Integer(i) => Value::from(*i),
        // Written through the number's text so that the scale survives.
        Scalar::Decimal(d) => Value::Number(d.to_string().parse::<Number>()?),
        Scalar::String(s) | Scalar::Text(s) => Value::String(s.clone()),
    })
}
