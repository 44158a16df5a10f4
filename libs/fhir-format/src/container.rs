//! Discriminated resource container
//!
//! [`ResourceCodec`] decodes "any resource" by peeking the discriminator
//! (JSON `resourceType`, XML root element name), resolving it through a
//! [`ResourceRegistry`] and running the element tree decoder for that kind.

use crate::config::EncodeOptions;
use crate::error::{FormatError, Result};
use crate::json::{JsonDecoder, JsonEncoder};
use crate::registry::ResourceRegistry;
use crate::xml::{XmlDecoder, XmlEncoder};
use helix_models::Resource;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Json => "application/fhir+json",
            Format::Xml => "application/fhir+xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "xml" => Some(Format::Xml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Accepts FHIR and generic MIME types as well as the `_format`
    /// shorthands; parameters (`; charset=utf-8`) are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/fhir+json" | "application/json" | "text/json" | "json" => {
                Some(Format::Json)
            }
            "application/fhir+xml" | "application/xml" | "text/xml" | "xml" => Some(Format::Xml),
            _ => None,
        }
    }

    /// Guesses the format from the first significant byte.
    pub fn sniff(input: &[u8]) -> Option<Self> {
        let first = input
            .iter()
            .copied()
            .find(|b| !b.is_ascii_whitespace() && *b != 0xEF && *b != 0xBB && *b != 0xBF)?;
        match first {
            b'{' => Some(Format::Json),
            b'<' => Some(Format::Xml),
            _ => None,
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_mime(s).ok_or_else(|| format!("unknown format '{s}' (expected json or xml)"))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Decodes and encodes resources of the kinds known to its registry.
#[derive(Debug, Clone)]
pub struct ResourceCodec<'r> {
    registry: &'r ResourceRegistry,
    options: EncodeOptions,
}

impl Default for ResourceCodec<'static> {
    fn default() -> Self {
        Self::new(ResourceRegistry::standard())
    }
}

impl<'r> ResourceCodec<'r> {
    pub fn new(registry: &'r ResourceRegistry) -> Self {
        Self {
            registry,
            options: EncodeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &'r ResourceRegistry {
        self.registry
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// The discriminator of a payload, read without decoding the tree.
    pub fn peek_resource_type(&self, input: &[u8], format: Format) -> Result<String> {
        match format {
            Format::Json => peek_json(input),
            Format::Xml => peek_xml(input),
        }
    }

    /// Decodes a resource of any registered kind.
    pub fn decode_any(&self, input: &[u8], format: Format) -> Result<Resource> {
        let tag = self.peek_resource_type(input, format)?;
        let resource_type = self
            .registry
            .get(&tag)
            .ok_or(FormatError::UnknownResourceType(tag))?;
        debug!(%resource_type, %format, bytes = input.len(), "decoding resource");

        match format {
            Format::Json => JsonDecoder::new(self.registry).decode_document(input),
            Format::Xml => {
                XmlDecoder::new(self.registry).decode_document(std::str::from_utf8(input)?)
            }
        }
    }

    /// Encodes a resource; the discriminator always comes first.
    pub fn encode_any(&self, resource: &Resource, format: Format) -> Result<Vec<u8>> {
        debug!(resource_type = %resource.resource_type(), %format, "encoding resource");
        match format {
            Format::Json => JsonEncoder.encode_document(resource, &self.options),
            Format::Xml => XmlEncoder::new(&self.options).encode_document(resource),
        }
    }

    pub fn encode_to_string(&self, resource: &Resource, format: Format) -> Result<String> {
        let bytes = self.encode_any(resource, format)?;
        String::from_utf8(bytes).map_err(|e| FormatError::Utf8(e.utf8_error()))
    }

    pub fn encode_to<W: Write>(&self, resource: &Resource, format: Format, mut writer: W) -> Result<()> {
        writer.write_all(&self.encode_any(resource, format)?)?;
        Ok(())
    }

    /// Decodes with one format and re-encodes with the other.
    pub fn convert(&self, input: &[u8], from: Format, to: Format) -> Result<Vec<u8>> {
        let resource = self.decode_any(input, from)?;
        self.encode_any(&resource, to)
    }
}

/// Only the discriminator is materialized; other members are skipped.
#[derive(Deserialize)]
struct Discriminator {
    #[serde(rename = "resourceType")]
    resource_type: Option<Value>,
}

fn peek_json(input: &[u8]) -> Result<String> {
    if Format::sniff(input) != Some(Format::Json) {
        // Either not JSON at all or not an object
        serde_json::from_slice::<serde::de::IgnoredAny>(input)?;
        return Err(FormatError::ExpectedObject);
    }
    match serde_json::from_slice::<Discriminator>(input)? {
        Discriminator {
            resource_type: Some(Value::String(tag)),
        } => Ok(tag),
        _ => Err(FormatError::MissingResourceType),
    }
}

fn peek_xml(input: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                return Ok(std::str::from_utf8(e.local_name().as_ref())?.to_string());
            }
            Event::Eof => return Err(FormatError::MissingResourceType),
            _ => {}
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection() {
        assert_eq!(Format::from_mime("application/fhir+json; charset=utf-8"), Some(Format::Json));
        assert_eq!(Format::from_mime("text/xml"), Some(Format::Xml));
        assert_eq!(Format::from_mime("text/turtle"), None);
        assert_eq!(Format::from_path(Path::new("a/patient.XML")), Some(Format::Xml));
        assert_eq!(Format::sniff(b"  \n{\"a\":1}"), Some(Format::Json));
        assert_eq!(Format::sniff(b"<?xml version=\"1.0\"?><a/>"), Some(Format::Xml));
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert!("yaml".parse::<Format>().is_err());
    }

    #[test]
    fn peek_reads_only_the_discriminator() {
        let codec = ResourceCodec::default();
        let json = br#"{"id": "x", "resourceType": "Observation", "whatever": [1, 2]}"#;
        assert_eq!(codec.peek_resource_type(json, Format::Json).unwrap(), "Observation");

        let xml = br#"<?xml version="1.0"?><!-- c --><Patient xmlns="http://hl7.org/fhir"/>"#;
        assert_eq!(codec.peek_resource_type(xml, Format::Xml).unwrap(), "Patient");
    }

    #[test]
    fn peek_errors() {
        let codec = ResourceCodec::default();
        assert!(matches!(
            codec.peek_resource_type(b"[1]", Format::Json),
            Err(FormatError::ExpectedObject)
        ));
        assert!(matches!(
            codec.peek_resource_type(br#"{"resourceType": 7}"#, Format::Json),
            Err(FormatError::MissingResourceType)
        ));
        assert!(matches!(
            codec.peek_resource_type(b"{", Format::Json),
            Err(FormatError::Json(_))
        ));
        assert!(matches!(
            codec.peek_resource_type(b"   ", Format::Xml),
            Err(FormatError::MissingResourceType)
        ));
    }
}
