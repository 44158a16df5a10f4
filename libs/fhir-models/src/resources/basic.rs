//! Basic resource

use crate::common::*;
use crate::element::fhir_element;

fhir_element! {
    /// Resource for non-supported content
    domain_resource Basic {
        /// Business identifier
        identifier: Vec<Identifier> = "identifier",
        /// Kind of Resource
        code: Option<Box<CodeableConcept>> = "code",
        /// Identifies the focus of this resource
        subject: Option<Box<Reference>> = "subject",
        /// When created
        created: Primitive<Date> = "created",
        /// Who created
        author: Option<Box<Reference>> = "author",
    }
}
