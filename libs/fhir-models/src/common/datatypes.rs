//! General-purpose and metadata data types

use super::primitive::*;
use super::value::AnyValue;
use crate::element::fhir_element;
use rust_decimal::Decimal;

fhir_element! {
    /// Optional extension element
    ///
    /// May be attached to any element, including primitive values.
    datatype Extension {
        /// Identifies the meaning of the extension
        url: Option<String> = "url",
        /// Value of extension
        value: Option<AnyValue> = "value" [AnyValue::TYPE_NAMES],
    }
}

impl Extension {
    pub fn new(url: impl Into<String>, value: impl Into<AnyValue>) -> Self {
        Self {
            url: Some(url.into()),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// A complex extension carrying only nested extensions.
    pub fn nested(url: impl Into<String>, children: Vec<Extension>) -> Self {
        Self {
            url: Some(url.into()),
            extension: children,
            ..Default::default()
        }
    }
}

fhir_element! {
    /// Metadata about a resource
    datatype Meta {
        /// Version specific identifier
        version_id: Primitive<Id> = "versionId",
        /// When the resource version last changed
        last_updated: Primitive<Instant> = "lastUpdated",
        /// Identifies where the resource comes from
        source: Primitive<Uri> = "source",
        /// Profiles this resource claims to conform to
        profile: Vec<Primitive<Canonical>> = "profile",
        /// Security Labels applied to this resource
        security: Vec<Coding> = "security",
        /// Tags applied to this resource
        tag: Vec<Coding> = "tag",
    }
}

fhir_element! {
    /// Human-readable summary of the resource
    datatype Narrative {
        /// generated | extensions | additional | empty
        status: Primitive<Code> = "status",
        /// Limited xhtml content
        div: Primitive<Xhtml> = "div",
    }
}

fhir_element! {
    /// A reference to a code defined by a terminology system
    datatype Coding {
        system: Primitive<Uri> = "system",
        version: Primitive<FhirString> = "version",
        code: Primitive<Code> = "code",
        display: Primitive<FhirString> = "display",
        user_selected: Primitive<bool> = "userSelected",
    }
}

impl Coding {
    pub fn new(system: Uri, code: Code) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            ..Default::default()
        }
    }
}

fhir_element! {
    /// Concept - reference to a terminology or just text
    datatype CodeableConcept {
        coding: Vec<Coding> = "coding",
        text: Primitive<FhirString> = "text",
    }
}

fhir_element! {
    /// An identifier intended for computation
    datatype Identifier {
        /// usual | official | temp | secondary | old
        use_: Primitive<Code> = "use",
        /// Description of identifier
        type_: Option<Box<CodeableConcept>> = "type",
        /// The namespace for the identifier value
        system: Primitive<Uri> = "system",
        /// The value that is unique
        value: Primitive<FhirString> = "value",
        period: Option<Box<Period>> = "period",
        /// Organization that issued id
        assigner: Option<Box<Reference>> = "assigner",
    }
}

fhir_element! {
    /// Time range defined by start and end date/time
    datatype Period {
        start: Primitive<DateTime> = "start",
        end: Primitive<DateTime> = "end",
    }
}

fhir_element! {
    /// A measured or measurable amount
    datatype Quantity {
        /// Numerical value (with implicit precision)
        value: Primitive<Decimal> = "value",
        /// < | <= | >= | > - how to understand the value
        comparator: Primitive<Code> = "comparator",
        /// Unit representation
        unit: Primitive<FhirString> = "unit",
        /// System that defines coded unit form
        system: Primitive<Uri> = "system",
        /// Coded form of the unit
        code: Primitive<Code> = "code",
    }
}

fhir_element! {
    /// A reference from one resource to another
    datatype Reference {
        /// Literal reference, Relative, internal or absolute URL
        reference: Primitive<FhirString> = "reference",
        /// Type the reference refers to (e.g. "Patient")
        type_: Primitive<Uri> = "type",
        /// Logical reference, when literal reference is not known
        identifier: Option<Box<Identifier>> = "identifier",
        /// Text alternative for the resource
        display: Primitive<FhirString> = "display",
    }
}

impl Reference {
    pub fn to(reference: FhirString) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }

    /// Local id of a contained resource (`#p1` -> `p1`).
    pub fn contained_id(&self) -> Option<&str> {
        self.reference.value()?.as_str().strip_prefix('#')
    }
}

fhir_element! {
    /// Name of a human - parts and usage
    datatype HumanName {
        /// usual | official | temp | nickname | anonymous | old | maiden
        use_: Primitive<Code> = "use",
        /// Text representation of the full name
        text: Primitive<FhirString> = "text",
        family: Primitive<FhirString> = "family",
        given: Vec<Primitive<FhirString>> = "given",
        prefix: Vec<Primitive<FhirString>> = "prefix",
        suffix: Vec<Primitive<FhirString>> = "suffix",
        period: Option<Box<Period>> = "period",
    }
}

fhir_element! {
    /// Details of a technology mediated contact point (phone, fax, email, etc.)
    datatype ContactPoint {
        /// phone | fax | email | pager | url | sms | other
        system: Primitive<Code> = "system",
        value: Primitive<FhirString> = "value",
        /// home | work | temp | old | mobile - purpose of this contact point
        use_: Primitive<Code> = "use",
        /// Specify preferred order of use (1 = highest)
        rank: Primitive<PositiveInt> = "rank",
        period: Option<Box<Period>> = "period",
    }
}
