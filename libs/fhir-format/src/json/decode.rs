use super::{describe, expect_array, expect_object};
use crate::error::{FormatError, Location, Result};
use crate::registry::ResourceRegistry;
use helix_models::element::{Element, FieldMut, ValueMut};
use helix_models::{AnyValue, Resource};
use serde_json::{Map, Value};
use tracing::trace;

/// Element tree decoder for FHIR JSON.
pub(crate) struct JsonDecoder<'r> {
    registry: &'r ResourceRegistry,
}

impl<'r> JsonDecoder<'r> {
    pub fn new(registry: &'r ResourceRegistry) -> Self {
        Self { registry }
    }

    pub fn decode_document(&self, input: &[u8]) -> Result<Resource> {
        let value: Value = serde_json::from_slice(input)?;
        let obj = value.as_object().ok_or(FormatError::ExpectedObject)?;
        self.decode_resource(obj, None)
    }

    fn decode_resource(&self, obj: &Map<String, Value>, at: Option<&Location>) -> Result<Resource> {
        let tag = obj
            .get("resourceType")
            .and_then(Value::as_str)
            .ok_or(FormatError::MissingResourceType)?;
        let resource_type = self
            .registry
            .get(tag)
            .ok_or_else(|| FormatError::UnknownResourceType(tag.to_string()))?;

        let path = at.map_or_else(|| tag.to_string(), |loc| loc.path.clone());
        let mut resource = Resource::new(resource_type);
        self.decode_element(
            obj,
            resource.as_element_mut(),
            &Location::new(resource_type.as_str(), path),
        )?;
        Ok(resource)
    }

    /// Decodes every member of `obj` into `element`. Members are matched
    /// against the element's schema table; anything else is an error.
    pub(super) fn decode_element(
        &self,
        obj: &Map<String, Value>,
        element: &mut dyn Element,
        at: &Location,
    ) -> Result<()> {
        let info = element.type_info();
        let at = at.enter(info.name);

        for (key, value) in obj {
            if key == "resourceType" && info.is_resource() {
                continue;
            }
            let (name, metadata) = match key.strip_prefix('_') {
                Some(name) => (name, true),
                None => (key.as_str(), false),
            };
            let (field, choice) = info
                .resolve(name)
                .ok_or_else(|| at.unknown_field(key.as_str()))?;
            let loc = at.field(key);
            trace!(kind = info.name, member = key.as_str(), "decoding JSON member");

            let slot = element
                .field_mut(field.name)
                .ok_or_else(|| at.unknown_field(key.as_str()))?;

            match (slot, metadata) {
                (FieldMut::Attribute(target), false) => {
                    let s = value
                        .as_str()
                        .ok_or_else(|| loc.malformed("string", describe(value)))?;
                    *target = Some(s.to_string());
                }
                (FieldMut::Primitive(target), false) => self.decode_value(value, target, &loc)?,
                (FieldMut::Primitive(target), true) => self.decode_metadata(value, target, &loc)?,
                (FieldMut::PrimitiveList(list), false) => {
                    self.decode_value_list(value, list, &loc)?
                }
                (FieldMut::PrimitiveList(list), true) => {
                    self.decode_metadata_list(value, list, &loc)?
                }
                (FieldMut::Element(slot), false) => {
                    let obj = expect_object(value, &loc)?;
                    self.decode_element(obj, slot.get_or_insert(), &loc)?;
                }
                (FieldMut::ElementList(list), false) => {
                    for (i, item) in expect_array(value, &loc)?.iter().enumerate() {
                        let loc = loc.index(i);
                        let obj = expect_object(item, &loc)?;
                        self.decode_element(obj, list.push_default(), &loc)?;
                    }
                }
                (FieldMut::Choice(slot), metadata) => {
                    let Some(type_name) = choice else {
                        return Err(at.unknown_field(key.as_str()));
                    };
                    self.decode_choice(value, slot, type_name, metadata, &loc)?;
                }
                (FieldMut::Resource(slot), false) => {
                    let obj = expect_object(value, &loc)?;
                    *slot = Some(Box::new(self.decode_resource(obj, Some(&loc))?));
                }
                (FieldMut::ResourceList(list), false) => {
                    for (i, item) in expect_array(value, &loc)?.iter().enumerate() {
                        let loc = loc.index(i);
                        let obj = expect_object(item, &loc)?;
                        list.push(self.decode_resource(obj, Some(&loc))?);
                    }
                }
                // `_f` is only defined for primitives
                (_, true) => return Err(at.unknown_field(key.as_str())),
            }
        }

        Ok(())
    }

    fn decode_choice(
        &self,
        value: &Value,
        slot: &mut Option<AnyValue>,
        type_name: &'static str,
        metadata: bool,
        loc: &Location,
    ) -> Result<()> {
        let current = match slot.take() {
            Some(existing) if existing.type_name() != type_name => {
                return Err(loc.conflicting_choice());
            }
            Some(existing) => existing,
            None => AnyValue::empty_of(type_name).ok_or_else(|| loc.unknown_field(type_name))?,
        };

        match (slot.insert(current).as_value_mut(), metadata) {
            (ValueMut::Primitive(target), false) => self.decode_value(value, target, loc),
            (ValueMut::Primitive(target), true) => self.decode_metadata(value, target, loc),
            (ValueMut::Element(element), false) => {
                let obj = expect_object(value, loc)?;
                self.decode_element(obj, element, loc)
            }
            (ValueMut::Element(_), true) => Err(loc.unknown_field(format!("_{type_name}"))),
        }
    }
}
