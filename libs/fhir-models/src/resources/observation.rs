//! Observation resource

use crate::common::*;
use crate::element::fhir_element;

const VALUE_TYPES: &[&str] = &[
    "Quantity",
    "CodeableConcept",
    "string",
    "boolean",
    "integer",
    "time",
    "dateTime",
    "Period",
];

fhir_element! {
    /// Measurements and simple assertions
    domain_resource Observation {
        identifier: Vec<Identifier> = "identifier",
        /// Fulfills plan, proposal or order
        based_on: Vec<Reference> = "basedOn",
        /// registered | preliminary | final | amended +
        status: Primitive<Code> = "status",
        category: Vec<CodeableConcept> = "category",
        /// Type of observation (code / type)
        code: Option<Box<CodeableConcept>> = "code",
        /// Who and/or what the observation is about
        subject: Option<Box<Reference>> = "subject",
        encounter: Option<Box<Reference>> = "encounter",
        /// Clinically relevant time/time-period for observation
        effective: Option<AnyValue> = "effective" [&["dateTime", "Period", "instant"]],
        /// Date/Time this version was made available
        issued: Primitive<Instant> = "issued",
        performer: Vec<Reference> = "performer",
        /// Actual result
        value: Option<AnyValue> = "value" [VALUE_TYPES],
        /// Why the result is missing
        data_absent_reason: Option<Box<CodeableConcept>> = "dataAbsentReason",
        interpretation: Vec<CodeableConcept> = "interpretation",
        reference_range: Vec<ObservationReferenceRange> = "referenceRange",
        /// Related resource that belongs to the Observation group
        has_member: Vec<Reference> = "hasMember",
        /// Component results
        component: Vec<ObservationComponent> = "component",
    }
}

fhir_element! {
    /// Provides guide for interpretation
    backbone ObservationReferenceRange("Observation.referenceRange") {
        low: Option<Box<Quantity>> = "low",
        high: Option<Box<Quantity>> = "high",
        type_: Option<Box<CodeableConcept>> = "type",
        text: Primitive<FhirString> = "text",
    }
}

fhir_element! {
    backbone ObservationComponent("Observation.component") {
        code: Option<Box<CodeableConcept>> = "code",
        value: Option<AnyValue> = "value" [VALUE_TYPES],
        data_absent_reason: Option<Box<CodeableConcept>> = "dataAbsentReason",
        interpretation: Vec<CodeableConcept> = "interpretation",
    }
}
