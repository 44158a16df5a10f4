use crate::config::EncodeOptions;
use crate::error::Result;
use crate::FHIR_NS;
use helix_models::element::{Element, FieldRef};
use helix_models::navigation::Node;
use helix_models::schema::FieldInfo;
use helix_models::{PrimitiveNode, Resource};
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::Cursor;

/// Element tree encoder for FHIR XML.
pub(crate) struct XmlEncoder {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlEncoder {
    pub fn new(options: &EncodeOptions) -> Self {
        let writer = if options.pretty {
            Writer::new_with_indent(Cursor::new(Vec::new()), b' ', options.indent)
        } else {
            Writer::new(Cursor::new(Vec::new()))
        };
        Self { writer }
    }

    pub fn encode_document(mut self, resource: &Resource) -> Result<Vec<u8>> {
        self.write_resource(resource)?;
        Ok(self.writer.into_inner().into_inner())
    }

    /// A resource element always declares the FHIR namespace itself.
    fn write_resource(&mut self, resource: &Resource) -> Result<()> {
        self.write_element(resource.resource_type().as_str(), resource.as_element(), true)
    }

    fn write_element(&mut self, name: &str, element: &dyn Element, namespaced: bool) -> Result<()> {
        let info = element.type_info();
        let fields = element.fields();

        let mut start = BytesStart::new(name);
        if namespaced {
            start.push_attribute(("xmlns", FHIR_NS));
        }
        let mut has_children = false;
        for (field, value) in info.fields.iter().zip(&fields) {
            match value {
                FieldRef::Attribute(Some(v)) => start.push_attribute(attribute(field.name, v)),
                FieldRef::Attribute(None) => {}
                other => has_children |= other.is_present(),
            }
        }

        if !has_children {
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        self.writer.write_event(Event::Start(start))?;
        for (field, value) in info.fields.iter().zip(fields) {
            self.write_field(field, value)?;
        }
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn write_field(&mut self, field: &FieldInfo, value: FieldRef<'_>) -> Result<()> {
        match value {
            FieldRef::Primitive(p) => self.write_primitive(field.name, p)?,
            FieldRef::PrimitiveList(items) => {
                for p in items {
                    self.write_primitive(field.name, p)?;
                }
            }
            FieldRef::Element(Some(e)) => self.write_element(field.name, e, false)?,
            FieldRef::ElementList(items) => {
                for e in items {
                    self.write_element(field.name, e, false)?;
                }
            }
            FieldRef::Choice(Some(v)) => {
                let key = field.choice_key(v.type_name());
                match v.as_node() {
                    Node::Primitive(p) => self.write_primitive(&key, p)?,
                    Node::Element(e) => self.write_element(&key, e, false)?,
                }
            }
            FieldRef::Resource(Some(r)) => self.write_wrapped(field.name, r)?,
            FieldRef::ResourceList(items) => {
                for r in items {
                    self.write_wrapped(field.name, r)?;
                }
            }
            FieldRef::Attribute(_)
            | FieldRef::Element(None)
            | FieldRef::Choice(None)
            | FieldRef::Resource(None) => {}
        }
        Ok(())
    }

    /// Entries without value and metadata have no XML form and are skipped.
    fn write_primitive(&mut self, name: &str, primitive: &dyn PrimitiveNode) -> Result<()> {
        if primitive.is_empty() {
            return Ok(());
        }

        if primitive.type_name() == "xhtml" {
            if let Some(xhtml) = primitive.scalar() {
                self.writer
                    .write_event(Event::Text(BytesText::from_escaped(xhtml.to_lexical())))?;
            }
            return Ok(());
        }

        let mut start = BytesStart::new(name);
        let lexical = primitive.scalar().map(|s| s.to_lexical());
        if let Some(value) = &lexical {
            start.push_attribute(attribute("value", value));
        }
        if let Some(id) = primitive.id() {
            start.push_attribute(attribute("id", id));
        }

        if primitive.extensions().is_empty() {
            self.writer.write_event(Event::Empty(start))?;
        } else {
            self.writer.write_event(Event::Start(start))?;
            for extension in primitive.extensions() {
                self.write_element("extension", extension, false)?;
            }
            self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Ok(())
    }

    fn write_wrapped(&mut self, name: &str, resource: &Resource) -> Result<()> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))?;
        self.write_resource(resource)?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

/// An attribute whose whitespace survives attribute-value normalization on
/// the way back in.
fn attribute<'a>(name: &'a str, value: &str) -> Attribute<'a> {
    let escaped = escape(value);
    let value = if escaped.contains(['\n', '\r', '\t']) {
        escaped
            .replace('\n', "&#10;")
            .replace('\r', "&#13;")
            .replace('\t', "&#9;")
    } else {
        escaped.into_owned()
    };
    Attribute {
        key: QName(name.as_bytes()),
        value: Cow::Owned(value.into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_whitespace_is_written_as_character_references() {
        let attr = attribute("value", "a\nb\r\tc & <d>");
        assert_eq!(attr.key, QName(b"value"));
        assert_eq!(&*attr.value, b"a&#10;b&#13;&#9;c &amp; &lt;d&gt;");

        let plain = attribute("id", "p1");
        assert_eq!(&*plain.value, b"p1");
    }
}
