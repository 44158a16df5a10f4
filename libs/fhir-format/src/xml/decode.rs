use crate::error::{FormatError, Location, Result};
use crate::registry::ResourceRegistry;
use crate::{FHIR_NS, XHTML_NS};
use helix_models::element::{Element, FieldMut, ValueMut};
use helix_models::schema::{FieldInfo, FieldKind};
use helix_models::{AnyValue, Extension, PrimitiveSlot, Resource, Scalar};
use roxmltree::{Attribute, Document, Node};
use tracing::trace;

/// Element tree decoder for FHIR XML.
pub(crate) struct XmlDecoder<'r> {
    registry: &'r ResourceRegistry,
}

impl<'r> XmlDecoder<'r> {
    pub fn new(registry: &'r ResourceRegistry) -> Self {
        Self { registry }
    }

    pub fn decode_document(&self, input: &str) -> Result<Resource> {
        let doc = Document::parse(input)?;
        self.decode_resource(input, doc.root_element(), None)
    }

    fn decode_resource(
        &self,
        source: &str,
        node: Node<'_, '_>,
        at: Option<&Location>,
    ) -> Result<Resource> {
        let tag = node.tag_name().name();
        let path = at.map_or_else(|| tag.to_string(), |loc| loc.path.clone());
        if node.tag_name().namespace() != Some(FHIR_NS) {
            return Err(Location::new("Resource", path)
                .malformed("an element in the FHIR namespace", qualified_name(node)));
        }
        let resource_type = self
            .registry
            .get(tag)
            .ok_or_else(|| FormatError::UnknownResourceType(tag.to_string()))?;

        let mut resource = Resource::new(resource_type);
        self.decode_element(
            source,
            node,
            resource.as_element_mut(),
            &Location::new(resource_type.as_str(), path),
        )?;
        Ok(resource)
    }

    fn decode_element(
        &self,
        source: &str,
        node: Node<'_, '_>,
        element: &mut dyn Element,
        at: &Location,
    ) -> Result<()> {
        let info = element.type_info();
        let at = at.enter(info.name);

        for attr in node.attributes() {
            reject_namespaced(&attr, &at)?;
            let field = info
                .field(attr.name())
                .filter(|f| f.kind == FieldKind::Attribute);
            match field.and_then(|f| element.field_mut(f.name)) {
                Some(FieldMut::Attribute(target)) => *target = Some(attr.value().to_string()),
                _ => return Err(at.unknown_field(attr.name())),
            }
        }

        // Single-valued fields already filled
        let mut seen: Vec<&'static str> = Vec::new();

        for child in node.children() {
            if !child.is_element() {
                reject_text(child, &at)?;
                continue;
            }
            let name = child.tag_name().name();
            let (field, choice) = info.resolve(name).ok_or_else(|| at.unknown_field(name))?;
            let loc = at.field(name);
            check_namespace(child, field, &loc)?;
            if !field.many {
                if seen.contains(&field.name) {
                    return Err(if field.is_choice() {
                        loc.conflicting_choice()
                    } else {
                        loc.malformed("a single element", format!("repeated <{name}>"))
                    });
                }
                seen.push(field.name);
            }
            trace!(kind = info.name, element = name, "decoding XML element");

            let slot = element
                .field_mut(field.name)
                .ok_or_else(|| at.unknown_field(name))?;

            match slot {
                FieldMut::Attribute(_) => return Err(at.unknown_field(name)),
                FieldMut::Primitive(target) => self.decode_primitive(source, child, target, &loc)?,
                FieldMut::PrimitiveList(list) => {
                    let loc = loc.index(list.len());
                    self.decode_primitive(source, child, list.push_default(), &loc)?;
                }
                FieldMut::Element(slot) => {
                    self.decode_element(source, child, slot.get_or_insert(), &loc)?;
                }
                FieldMut::ElementList(list) => {
                    let loc = loc.index(list.len());
                    self.decode_element(source, child, list.push_default(), &loc)?;
                }
                FieldMut::Choice(slot) => {
                    let value = choice
                        .and_then(AnyValue::empty_of)
                        .ok_or_else(|| at.unknown_field(name))?;
                    match slot.insert(value).as_value_mut() {
                        ValueMut::Primitive(target) => {
                            self.decode_primitive(source, child, target, &loc)?
                        }
                        ValueMut::Element(target) => {
                            self.decode_element(source, child, target, &loc)?
                        }
                    }
                }
                FieldMut::Resource(slot) => {
                    *slot = Some(Box::new(self.decode_wrapped(source, child, &loc)?));
                }
                FieldMut::ResourceList(list) => {
                    let loc = loc.index(list.len());
                    list.push(self.decode_wrapped(source, child, &loc)?);
                }
            }
        }

        Ok(())
    }

    /// `<f value=".." id=".."><extension/>..</f>`, or the verbatim XHTML of
    /// a narrative `div`.
    fn decode_primitive(
        &self,
        source: &str,
        node: Node<'_, '_>,
        target: &mut dyn PrimitiveSlot,
        loc: &Location,
    ) -> Result<()> {
        if target.type_name() == "xhtml" {
            let snippet = &source[node.range()];
            return target
                .set_scalar(Scalar::String(snippet.to_string()))
                .map_err(|e| loc.conversion(e));
        }

        for attr in node.attributes() {
            reject_namespaced(&attr, loc)?;
            match attr.name() {
                "value" => target
                    .set_scalar(Scalar::Text(attr.value().to_string()))
                    .map_err(|e| loc.conversion(e))?,
                "id" => target.set_id(attr.value().to_string()),
                other => return Err(loc.unknown_field(other)),
            }
        }

        for child in node.children() {
            if !child.is_element() {
                reject_text(child, loc)?;
                continue;
            }
            let name = child.tag_name().name();
            if name != "extension" {
                return Err(loc.unknown_field(name));
            }
            if child.tag_name().namespace() != Some(FHIR_NS) {
                return Err(loc.malformed("an element in the FHIR namespace", qualified_name(child)));
            }
            let extensions = target.extensions_mut();
            let ext_loc = loc.field("extension").index(extensions.len());
            extensions.push(Extension::default());
            if let Some(extension) = extensions.last_mut() {
                self.decode_element(source, child, extension, &ext_loc)?;
            }
        }

        Ok(())
    }

    /// `<contained><Patient xmlns="http://hl7.org/fhir">..</Patient></contained>`
    fn decode_wrapped(&self, source: &str, wrapper: Node<'_, '_>, loc: &Location) -> Result<Resource> {
        if let Some(attr) = wrapper.attributes().next() {
            reject_namespaced(&attr, loc)?;
            return Err(loc.unknown_field(attr.name()));
        }

        let mut inner = None;
        for child in wrapper.children() {
            if !child.is_element() {
                reject_text(child, loc)?;
                continue;
            }
            if inner.is_some() {
                return Err(loc.malformed("a single resource", qualified_name(child)));
            }
            inner = Some(child);
        }

        let inner = inner.ok_or_else(|| loc.malformed("a resource element", "empty element"))?;
        self.decode_resource(source, inner, Some(loc))
    }
}

fn check_namespace(node: Node<'_, '_>, field: &FieldInfo, loc: &Location) -> Result<()> {
    let expected = if field.type_name == "xhtml" {
        XHTML_NS
    } else {
        FHIR_NS
    };
    if node.tag_name().namespace() == Some(expected) {
        Ok(())
    } else {
        Err(loc.malformed(
            if expected == XHTML_NS {
                "an element in the XHTML namespace"
            } else {
                "an element in the FHIR namespace"
            },
            qualified_name(node),
        ))
    }
}

fn reject_namespaced(attr: &Attribute<'_, '_>, loc: &Location) -> Result<()> {
    match attr.namespace() {
        Some(ns) => Err(loc.malformed(
            "an attribute without namespace",
            format!("{{{ns}}}{}", attr.name()),
        )),
        None => Ok(()),
    }
}

fn reject_text(node: Node<'_, '_>, loc: &Location) -> Result<()> {
    match node.text() {
        Some(text) if node.is_text() && !text.trim().is_empty() => {
            Err(loc.malformed("an element", format!("text {:?}", text.trim())))
        }
        _ => Ok(()),
    }
}

fn qualified_name(node: Node<'_, '_>) -> String {
    match node.tag_name().namespace() {
        Some(ns) => format!("{{{ns}}}{}", node.tag_name().name()),
        None => node.tag_name().name().to_string(),
    }
}
