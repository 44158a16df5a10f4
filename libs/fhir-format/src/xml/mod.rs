//! FHIR XML codec
//!
//! - Elements live in the `http://hl7.org/fhir` namespace.
//! - `Element.id` and `Extension.url` are attributes; everything else is a
//!   child element.
//! - A primitive is `<f value=".." id=".."><extension/></f>`.
//! - Repeated fields are repeated elements.
//! - An embedded resource is wrapped: `<contained><Patient xmlns=..>`.
//! - `Narrative.div` is XHTML and is carried verbatim.

mod decode;
mod encode;

pub(crate) use decode::XmlDecoder;
pub(crate) use encode::XmlEncoder;
