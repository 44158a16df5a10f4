use crate::config::EncodeOptions;
use crate::error::Result;
use helix_models::element::{Element, FieldRef};
use helix_models::navigation::Node;
use helix_models::Resource;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

/// Element tree encoder for FHIR JSON.
pub(crate) struct JsonEncoder;

impl JsonEncoder {
    pub fn encode_document(&self, resource: &Resource, options: &EncodeOptions) -> Result<Vec<u8>> {
        let value = self.encode_resource(resource)?;
        if !options.pretty {
            return Ok(serde_json::to_vec(&value)?);
        }
        let indent = options.indent_bytes();
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
        value.serialize(&mut serializer)?;
        Ok(out)
    }

    fn encode_resource(&self, resource: &Resource) -> Result<Value> {
        let mut obj = Map::new();
        obj.insert(
            "resourceType".to_string(),
            Value::String(resource.resource_type().as_str().to_string()),
        );
        obj.extend(self.encode_element(resource.as_element())?);
        Ok(Value::Object(obj))
    }

    /// Encodes the fields of `element` in schema order. Absent fields are
    /// omitted.
    pub(super) fn encode_element(&self, element: &dyn Element) -> Result<Map<String, Value>> {
        let info = element.type_info();
        let mut obj = Map::new();

        for (field, value) in info.fields.iter().zip(element.fields()) {
            match value {
                FieldRef::Attribute(Some(s)) => {
                    obj.insert(field.name.to_string(), Value::String(s.clone()));
                }
                FieldRef::Primitive(p) => {
                    let (value, metadata) = self.encode_primitive(p)?;
                    insert_split(&mut obj, field.name, value, metadata);
                }
                FieldRef::PrimitiveList(items) => {
                    let (values, metadata) = self.encode_primitive_list(&items)?;
                    insert_split(&mut obj, field.name, values, metadata);
                }
                FieldRef::Element(Some(e)) => {
                    obj.insert(field.name.to_string(), Value::Object(self.encode_element(e)?));
                }
                FieldRef::ElementList(items) if !items.is_empty() => {
                    let items = items
                        .into_iter()
                        .map(|e| self.encode_element(e).map(Value::Object))
                        .collect::<Result<Vec<_>>>()?;
                    obj.insert(field.name.to_string(), Value::Array(items));
                }
                FieldRef::Choice(Some(v)) => {
                    let key = field.choice_key(v.type_name());
                    match v.as_node() {
                        Node::Primitive(p) => {
                            let (value, metadata) = self.encode_primitive(p)?;
                            insert_split(&mut obj, &key, value, metadata);
                        }
                        Node::Element(e) => {
                            obj.insert(key, Value::Object(self.encode_element(e)?));
                        }
                    }
                }
                FieldRef::Resource(Some(r)) => {
                    obj.insert(field.name.to_string(), self.encode_resource(r)?);
                }
                FieldRef::ResourceList(items) if !items.is_empty() => {
                    let items = items
                        .iter()
                        .map(|r| self.encode_resource(r))
                        .collect::<Result<Vec<_>>>()?;
                    obj.insert(field.name.to_string(), Value::Array(items));
                }
                _ => {}
            }
        }

        Ok(obj)
    }
}

/// Writes `name` and `_name`, each only when present.
fn insert_split(
    obj: &mut Map<String, Value>,
    name: &str,
    value: Option<Value>,
    metadata: Option<Value>,
) {
    if let Some(value) = value {
        obj.insert(name.to_string(), value);
    }
    if let Some(metadata) = metadata {
        obj.insert(format!("_{name}"), metadata);
    }
}
