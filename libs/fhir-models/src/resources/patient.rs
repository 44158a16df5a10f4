//! Patient resource

use crate::common::*;
use crate::element::fhir_element;

fhir_element! {
    /// Information about an individual or animal receiving care or other
    /// health-related services
    domain_resource Patient {
        /// An identifier for this patient
        identifier: Vec<Identifier> = "identifier",
        /// Whether this patient's record is in active use
        active: Primitive<bool> = "active",
        /// A name associated with the patient
        name: Vec<HumanName> = "name",
        /// A contact detail for the individual
        telecom: Vec<ContactPoint> = "telecom",
        /// male | female | other | unknown
        gender: Primitive<Code> = "gender",
        /// The date of birth for the individual
        birth_date: Primitive<Date> = "birthDate",
        /// Indicates if the individual is deceased or not
        deceased: Option<AnyValue> = "deceased" [&["boolean", "dateTime"]],
        /// Marital (civil) status of a patient
        marital_status: Option<Box<CodeableConcept>> = "maritalStatus",
        /// Whether patient is part of a multiple birth
        multiple_birth: Option<AnyValue> = "multipleBirth" [&["boolean", "integer"]],
        /// A contact party (e.g. guardian, partner, friend) for the patient
        contact: Vec<PatientContact> = "contact",
        /// Patient's nominated primary care provider
        general_practitioner: Vec<Reference> = "generalPractitioner",
        /// Organization that is the custodian of the patient record
        managing_organization: Option<Box<Reference>> = "managingOrganization",
        /// Link to another patient resource that concerns the same actual person
        link: Vec<PatientLink> = "link",
    }
}

fhir_element! {
    backbone PatientContact("Patient.contact") {
        /// The kind of relationship
        relationship: Vec<CodeableConcept> = "relationship",
        name: Option<Box<HumanName>> = "name",
        telecom: Vec<ContactPoint> = "telecom",
        gender: Primitive<Code> = "gender",
        organization: Option<Box<Reference>> = "organization",
        period: Option<Box<Period>> = "period",
    }
}

fhir_element! {
    backbone PatientLink("Patient.link") {
        /// The other patient or related person resource that the link refers to
        other: Option<Box<Reference>> = "other",
        /// replaced-by | replaces | refer | seealso
        type_: Primitive<Code> = "type",
    }
}

impl Patient {
    /// `true` when `deceased[x]` says so, either as a flag or as a date.
    pub fn is_deceased(&self) -> bool {
        match &self.deceased {
            Some(AnyValue::Boolean(flag)) => flag.value == Some(true),
            Some(AnyValue::DateTime(when)) => when.value.is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;
    use crate::schema::FieldKind;

    #[test]
    fn choice_fields_declare_their_types() {
        let info = Patient::info();
        let deceased = info.field("deceased").unwrap();
        assert_eq!(deceased.kind, FieldKind::Choice);
        assert_eq!(deceased.choices, ["boolean", "dateTime"]);
        assert_eq!(PatientContact::info().name, "Patient.contact");
        assert_eq!(PatientContact::info().base, Some("BackboneElement"));
    }

    #[test]
    fn deceased_reads_either_variant() {
        let mut patient = Patient::default();
        assert!(!patient.is_deceased());
        patient.deceased = Some(AnyValue::from(true));
        assert!(patient.is_deceased());
        patient.deceased = Some(AnyValue::from(DateTime::new("2020-01-01").unwrap()));
        assert!(patient.is_deceased());
    }
}
