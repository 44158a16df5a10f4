//! FHIR JSON and XML codecs for the typed models in `helix-models`.
//!
//! Both codecs are driven by the schema tables each model type carries, so
//! there is no per-type codec code. Decoding is closed-world: a member or
//! element that the schema does not declare is an error, as is a resource
//! type the [`ResourceRegistry`] does not know.
//!
//! ```
//! use helix_format::{decode_any, encode_any, Format};
//!
//! let json = br#"{"resourceType": "Patient", "active": true}"#;
//! let patient = decode_any(json, Format::Json)?;
//! let xml = String::from_utf8(encode_any(&patient, Format::Xml)?).unwrap();
//! assert!(xml.contains(r#"<active value="true"/>"#));
//! # Ok::<(), helix_format::FormatError>(())
//! ```

pub mod config;
pub mod container;
pub mod error;
mod json;
pub mod registry;
mod xml;

pub use config::EncodeOptions;
pub use container::{Format, ResourceCodec};
pub use error::{FormatError, Result};
pub use registry::ResourceRegistry;

use helix_models::Resource;

pub const FHIR_NS: &str = "http://hl7.org/fhir";
pub use helix_models::common::primitive::XHTML_NS;

/// Decodes a resource of any standard kind.
pub fn decode_any(input: &[u8], format: Format) -> Result<Resource> {
    ResourceCodec::default().decode_any(input, format)
}

/// Encodes a resource with the default (pretty) layout.
pub fn encode_any(resource: &Resource, format: Format) -> Result<Vec<u8>> {
    ResourceCodec::default().encode_any(resource, format)
}

/// Discriminator of a payload, without decoding it.
pub fn peek_resource_type(input: &[u8], format: Format) -> Result<String> {
    ResourceCodec::default().peek_resource_type(input, format)
}

/// Convert a FHIR JSON payload into its XML representation.
pub fn json_to_xml(input: &str) -> Result<String> {
    convert(input, Format::Json, Format::Xml)
}

/// Convert a FHIR XML payload into its JSON representation.
pub fn xml_to_json(input: &str) -> Result<String> {
    convert(input, Format::Xml, Format::Json)
}

fn convert(input: &str, from: Format, to: Format) -> Result<String> {
    let bytes = ResourceCodec::default().convert(input.as_bytes(), from, to)?;
    String::from_utf8(bytes).map_err(|e| FormatError::Utf8(e.utf8_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn json_to_xml_basic_patient() {
        let json = r#"
        {
            "resourceType": "Patient",
            "id": "pat-1",
            "active": true,
            "name": [
                { "family": "Everyman", "given": ["Adam"] }
            ]
        }
        "#;

        let xml = json_to_xml(json).expect("conversion failed");
        assert!(xml.contains(r#"<Patient xmlns="http://hl7.org/fhir">"#));
        assert!(xml.contains(r#"<id value="pat-1"/>"#));
        assert!(xml.contains(r#"<active value="true"/>"#));
        assert!(xml.contains(r#"<family value="Everyman"/>"#));
        assert!(xml.contains(r#"<given value="Adam"/>"#));
    }

    #[test]
    fn xml_to_json_round_trip() {
        let xml = r#"
        <Patient xmlns="http://hl7.org/fhir">
            <id value="p1"/>
            <active value="true"/>
            <name>
                <family value="Everyman"/>
                <given value="Adam"/>
            </name>
        </Patient>
        "#;

        let json = xml_to_json(xml).expect("xml->json failed");
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["resourceType"], "Patient");
        assert_eq!(value["id"], "p1");
        assert_eq!(value["active"], true);
        assert!(value["name"].is_array());
        assert_eq!(value["name"][0]["family"], "Everyman");
        assert_eq!(value["name"][0]["given"][0], "Adam");

        let first = json.trim_start().lines().nth(1).unwrap();
        assert!(first.contains("resourceType"));
    }

    #[test]
    fn primitive_metadata_survives_roundtrip() {
        let json = r#"
        {
            "resourceType": "Patient",
            "birthDate": "1974-12-25",
            "_birthDate": { "id": "bd1" }
        }
        "#;

        let xml = json_to_xml(json).unwrap();
        assert!(xml.contains(r#"<birthDate value="1974-12-25" id="bd1"/>"#));

        let back = xml_to_json(&xml).unwrap();
        let val: Value = serde_json::from_str(&back).unwrap();
        assert_eq!(val["birthDate"], "1974-12-25");
        assert_eq!(val["_birthDate"]["id"], "bd1");
    }

    #[test]
    fn unknown_types_are_rejected_in_both_formats() {
        assert!(matches!(
            json_to_xml(r#"{"resourceType": "Bogus"}"#),
            Err(FormatError::UnknownResourceType(t)) if t == "Bogus"
        ));
        assert!(matches!(
            xml_to_json(r#"<Bogus xmlns="http://hl7.org/fhir"/>"#),
            Err(FormatError::UnknownResourceType(t)) if t == "Bogus"
        ));
    }
}
