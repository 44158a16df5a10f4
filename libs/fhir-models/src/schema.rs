//! Static schema metadata
//!
//! Every structured type carries a [`TypeInfo`] table that lists its fields in
//! declaration order. The codecs and the navigation engine are driven by these
//! tables, and they double as the type-introspection surface for path
//! evaluators (`lookup("Patient")?.field("birthDate")`).

use std::collections::HashMap;
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive,
    Complex,
    Backbone,
    Resource,
}

/// How a field is stored and serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Plain string carried as an XML attribute (`id`, `url`).
    Attribute,
    /// A [`Primitive`](crate::common::Primitive) with split metadata.
    Primitive,
    /// A nested complex or backbone element.
    Element,
    /// A `[x]` field; the concrete type is part of the wire key.
    Choice,
    /// An embedded resource (`contained`, `Bundle.entry.resource`).
    Resource,
}

#[derive(Debug)]
pub struct FieldInfo {
    /// Wire name; for choices the prefix without the type suffix.
    pub name: &'static str,
    pub type_name: &'static str,
    pub kind: FieldKind,
    pub many: bool,
    /// Allowed types of a choice field; empty otherwise.
    pub choices: &'static [&'static str],
}

impl FieldInfo {
    pub fn is_choice(&self) -> bool {
        self.kind == FieldKind::Choice
    }

    pub fn cardinality(&self) -> &'static str {
        if self.many {
            "0..*"
        } else {
            "0..1"
        }
    }

    /// Wire key of a choice field holding `type_name` (`value` + `Quantity`).
    pub fn choice_key(&self, type_name: &str) -> String {
        let mut key = String::with_capacity(self.name.len() + type_name.len());
        key.push_str(self.name);
        let mut chars = type_name.chars();
        if let Some(first) = chars.next() {
            key.extend(first.to_uppercase());
            key.push_str(chars.as_str());
        }
        key
    }

    /// The concrete type encoded in a choice wire key, if it is allowed.
    pub fn match_choice(&self, key: &str) -> Option<&'static str> {
        let suffix = key.strip_prefix(self.name)?;
        self.choices
            .iter()
            .copied()
            .find(|candidate| capitalized_eq(candidate, suffix))
    }
}

fn capitalized_eq(type_name: &str, suffix: &str) -> bool {
    let mut a = type_name.chars();
    let mut b = suffix.chars();
    match (a.next(), b.next()) {
        (Some(x), Some(y)) => x.to_ascii_uppercase() == y && a.as_str() == b.as_str(),
        _ => false,
    }
}

#[derive(Debug)]
pub struct TypeInfo {
    pub name: &'static str,
    pub base: Option<&'static str>,
    pub kind: TypeKind,
    pub fields: &'static [FieldInfo],
}

impl TypeInfo {
    pub fn field(&self, name: &str) -> Option<&'static FieldInfo> {
        let fields: &'static [FieldInfo] = self.fields;
        fields.iter().find(|f| f.name == name)
    }

    /// Resolves a wire key to its field and, for choices, the concrete type.
    pub fn resolve(&self, key: &str) -> Option<(&'static FieldInfo, Option<&'static str>)> {
        let fields: &'static [FieldInfo] = self.fields;
        if let Some(field) = fields.iter().find(|f| !f.is_choice() && f.name == key) {
            return Some((field, None));
        }
        fields
            .iter()
            .filter(|f| f.is_choice())
            .find_map(|f| f.match_choice(key).map(|ty| (f, Some(ty))))
    }

    pub fn is_resource(&self) -> bool {
        self.kind == TypeKind::Resource
    }
}

const PRIMITIVE_FIELDS: &[FieldInfo] = &[
    FieldInfo {
        name: "id",
        type_name: "string",
        kind: FieldKind::Attribute,
        many: false,
        choices: &[],
    },
    FieldInfo {
        name: "extension",
        type_name: "Extension",
        kind: FieldKind::Element,
        many: true,
        choices: &[],
    },
];

macro_rules! primitive_infos {
    ($($name:literal),* $(,)?) => {
        static PRIMITIVE_TYPES: &[TypeInfo] = &[$(
            TypeInfo {
                name: $name,
                base: Some("Element"),
                kind: TypeKind::Primitive,
                fields: PRIMITIVE_FIELDS,
            }
        ),*];
    };
}

primitive_infos!(
    "base64Binary",
    "boolean",
    "canonical",
    "code",
    "date",
    "dateTime",
    "decimal",
    "id",
    "instant",
    "integer",
    "markdown",
    "positiveInt",
    "string",
    "time",
    "unsignedInt",
    "uri",
    "url",
    "xhtml",
);

static TYPES: Lazy<HashMap<&'static str, &'static TypeInfo>> = Lazy::new(|| {
    use crate::common::*;
    use crate::element::ElementType;
    use crate::resources::*;

    let structured: Vec<&'static TypeInfo> = vec![
        Extension::info(),
        Meta::info(),
        Narrative::info(),
        Coding::info(),
        CodeableConcept::info(),
        Identifier::info(),
        Period::info(),
        Quantity::info(),
        Reference::info(),
        HumanName::info(),
        ContactPoint::info(),
        PatientContact::info(),
        ObservationComponent::info(),
        BundleLink::info(),
        BundleEntry::info(),
        BundleEntrySearch::info(),
        BundleEntryRequest::info(),
        BundleEntryResponse::info(),
        OperationOutcomeIssue::info(),
        ObservationReferenceRange::info(),
        PatientLink::info(),
    ];

    PRIMITIVE_TYPES
        .iter()
        .chain(structured)
        .chain(ResourceType::ALL.iter().map(ResourceType::type_info))
        .map(|info| (info.name, info))
        .collect()
});

/// Looks up a type by FHIR name (`"Patient"`, `"HumanName"`, `"dateTime"`,
/// `"Patient.contact"`).
pub fn lookup(name: &str) -> Option<&'static TypeInfo> {
    TYPES.get(name).copied()
}

/// Every known type, in no particular order.
pub fn all_types() -> impl Iterator<Item = &'static TypeInfo> {
    TYPES.values().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_keys_capitalize_the_type() {
        let info = lookup("Observation").unwrap();
        let value = info.field("value").unwrap();
        assert_eq!(value.choice_key("dateTime"), "valueDateTime");
        assert_eq!(value.choice_key("Quantity"), "valueQuantity");
        assert_eq!(value.match_choice("valueQuantity"), Some("Quantity"));
        assert_eq!(value.match_choice("valuequantity"), None);
        assert_eq!(value.match_choice("value"), None);
    }

    #[test]
    fn resolve_prefers_plain_fields() {
        let info = lookup("Patient").unwrap();
        let (field, ty) = info.resolve("birthDate").unwrap();
        assert_eq!(field.name, "birthDate");
        assert_eq!(ty, None);

        let (field, ty) = info.resolve("deceasedBoolean").unwrap();
        assert_eq!(field.name, "deceased");
        assert_eq!(ty, Some("boolean"));

        assert!(info.resolve("deceasedString").is_none());
        assert!(info.resolve("foo").is_none());
    }

    #[test]
    fn lookup_covers_every_category() {
        assert_eq!(lookup("dateTime").unwrap().kind, TypeKind::Primitive);
        assert_eq!(lookup("HumanName").unwrap().kind, TypeKind::Complex);
        assert_eq!(lookup("Bundle.entry").unwrap().kind, TypeKind::Backbone);
        assert_eq!(lookup("Basic").unwrap().kind, TypeKind::Resource);
        assert!(lookup("Unknown").is_none());
    }

    #[test]
    fn resources_share_base_fields() {
        let patient = lookup("Patient").unwrap();
        let names: Vec<_> = patient.fields.iter().take(8).map(|f| f.name).collect();
        assert_eq!(
            names,
            [
                "id",
                "meta",
                "implicitRules",
                "language",
                "text",
                "contained",
                "extension",
                "modifierExtension"
            ]
        );
        let contained = patient.field("contained").unwrap();
        assert_eq!(contained.kind, FieldKind::Resource);
        assert!(contained.many);
    }
}
