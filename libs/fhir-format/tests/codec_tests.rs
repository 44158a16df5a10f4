use helix_format::{
    decode_any, encode_any, EncodeOptions, Format, FormatError, ResourceCodec, ResourceRegistry,
};
use helix_models::common::{PrimitiveSlot, Scalar};
use helix_models::element::{Element, FieldMut, ValueMut};
use helix_models::navigation::{equal, equivalent, Node};
use helix_models::schema::FieldInfo;
use helix_models::{
    AnyValue, Code, Extension, FhirString, HumanName, Patient, Primitive, Resource, ResourceType,
};
use serde_json::{json, Value};

const EXT_URL: &str = "http://example.org/fhir/StructureDefinition/flag";

fn ext() -> Extension {
    Extension::new(EXT_URL, true)
}

fn to_json(resource: &Resource) -> Value {
    serde_json::from_slice(&encode_any(resource, Format::Json).unwrap()).unwrap()
}

fn assert_round_trips(resource: &Resource) {
    for format in [Format::Json, Format::Xml] {
        let bytes = encode_any(resource, format).unwrap();
        let back = decode_any(&bytes, format)
            .unwrap_or_else(|e| panic!("{format}: {e}\n{}", String::from_utf8_lossy(&bytes)));
        assert!(
            equal(Node::from(resource), Node::from(&back)),
            "{format} round trip changed {resource:?} into {back:?}"
        );
    }
}

fn code(fill: usize) -> Primitive<Code> {
    match fill {
        0 => Primitive::default(),
        1 => Primitive::default().with_id("c").with_extension(ext()),
        2 => Primitive::parse("other").unwrap(),
        _ => Primitive::parse("other").unwrap().with_id("c").with_extension(ext()),
    }
}

fn given(fill: usize) -> Primitive<FhirString> {
    match fill {
        0 => Primitive::default(),
        1 => Primitive::default().with_id("g"),
        2 => Primitive::parse("Peter").unwrap(),
        _ => Primitive::parse("Peter").unwrap().with_extension(ext()),
    }
}

#[test]
fn primitives_round_trip_at_every_fill_level() {
    for fill in 0..4 {
        let patient = Patient {
            gender: code(fill),
            ..Default::default()
        };
        assert_round_trips(&Resource::from(patient));
    }
}

const MAX_DEPTH: usize = 3;

/// A valid lexical form for every primitive type.
fn sample(type_name: &str) -> &'static str {
    match type_name {
        "base64Binary" => "AQID",
        "boolean" => "true",
        "canonical" => "http://example.org/fhir/StructureDefinition/x",
        "code" => "final",
        "date" => "2024-02-29",
        "dateTime" => "2015-02-07T13:28:17-05:00",
        "decimal" => "3.140",
        "id" => "a1",
        "instant" => "2015-02-07T13:28:17.239+02:00",
        "integer" => "-42",
        "markdown" => "**bold**\r\nnext",
        "positiveInt" => "7",
        "string" => "line one\nline two\ttab",
        "time" => "23:59:59",
        "unsignedInt" => "0",
        "uri" | "url" => "http://example.org/x",
        "xhtml" => r#"<div xmlns="http://www.w3.org/1999/xhtml"><p>a &amp; b</p></div>"#,
        other => panic!("no sample for {other}"),
    }
}

/// Sets every field of a record from its schema. Level 1 fills primitives
/// with metadata only, level 2 with values only, level 3 with both.
struct Filler {
    level: usize,
    turn: usize,
}

impl Filler {
    fn resource(level: usize, resource_type: ResourceType) -> Resource {
        let mut resource = Resource::new(resource_type);
        if level > 0 {
            Filler { level, turn: 0 }.fill_element(resource.as_element_mut(), 0);
        }
        resource
    }

    fn fill_element(&mut self, element: &mut dyn Element, depth: usize) {
        let info = element.type_info();
        for field in info.fields {
            let slot = element
                .field_mut(field.name)
                .unwrap_or_else(|| panic!("{}.{} is not writable", info.name, field.name));
            match slot {
                FieldMut::Attribute(value) => *value = Some(format!("{}-{depth}", field.name)),
                FieldMut::Primitive(primitive) => self.fill_primitive(primitive),
                FieldMut::PrimitiveList(list) => {
                    for _ in 0..2 {
                        self.fill_primitive(list.push_default());
                    }
                }
                FieldMut::Element(nested) if depth < MAX_DEPTH => {
                    self.fill_element(nested.get_or_insert(), depth + 1)
                }
                FieldMut::ElementList(list) if depth < MAX_DEPTH => {
                    self.fill_element(list.push_default(), depth + 1)
                }
                FieldMut::Choice(value) => *value = self.choice(field, depth),
                FieldMut::Resource(value) if depth < MAX_DEPTH => {
                    *value = Some(Box::new(self.embedded(depth + 1)))
                }
                FieldMut::ResourceList(items) if depth < MAX_DEPTH => {
                    items.push(self.embedded(depth + 1))
                }
                _ => {}
            }
        }
    }

    fn fill_primitive(&mut self, slot: &mut dyn PrimitiveSlot) {
        // A narrative div has no place for metadata in XML.
        let xhtml = slot.type_name() == "xhtml";
        if self.level >= 2 || xhtml {
            let lexical = sample(slot.type_name());
            slot.set_scalar(Scalar::Text(lexical.to_string()))
                .unwrap_or_else(|e| panic!("{lexical:?}: {e}"));
        }
        if self.level % 2 == 1 && !xhtml {
            self.turn += 1;
            slot.set_id(format!("m{}", self.turn));
            slot.extensions_mut().push(ext());
        }
    }

    /// Rotates through the allowed types; nested elements stop at the depth
    /// limit.
    fn choice(&mut self, field: &FieldInfo, depth: usize) -> Option<AnyValue> {
        let mut candidates: Vec<AnyValue> = field
            .choices
            .iter()
            .filter_map(|t| AnyValue::empty_of(t))
            .filter(|v| depth < MAX_DEPTH || v.is_primitive())
            .collect();
        if candidates.is_empty() {
            return None;
        }
        self.turn += 1;
        let mut value = candidates.swap_remove(self.turn % candidates.len());
        match value.as_value_mut() {
            ValueMut::Primitive(slot) => self.fill_primitive(slot),
            ValueMut::Element(element) => self.fill_element(element, depth + 1),
        }
        Some(value)
    }

    fn embedded(&mut self, depth: usize) -> Resource {
        let mut resource = Resource::new(ResourceType::Basic);
        self.fill_element(resource.as_element_mut(), depth);
        resource
    }
}

#[test]
fn every_resource_type_round_trips_at_every_fill_level() {
    for resource_type in ResourceType::ALL {
        for level in 0..4 {
            let resource = Filler::resource(level, *resource_type);
            assert_round_trips(&resource);
        }
    }
}

#[test]
fn line_breaks_and_tabs_survive_xml() {
    let input = br#"{"resourceType": "Patient", "name": [{"text": "line one\nline two\ttab"}]}"#;
    let resource = decode_any(input, Format::Json).unwrap();
    let xml = encode_any(&resource, Format::Xml).unwrap();
    assert!(String::from_utf8_lossy(&xml).contains("line one&#10;line two&#9;tab"));

    let Resource::Patient(back) = decode_any(&xml, Format::Xml).unwrap() else {
        panic!("expected a Patient");
    };
    assert_eq!(
        back.name[0].text.value.as_ref().map(FhirString::as_str),
        Some("line one\nline two\ttab")
    );
    assert!(equal(Node::from(&resource), Node::from(&Resource::from(*back))));
}

#[test]
fn narrative_div_must_be_namespaced_xhtml() {
    let cases: &[&str] = &[
        r#"<div>hi</div>"#,
        r#"<div xmlns=\"http://www.w3.org/1999/xhtml\">hi"#,
        r#"<div xmlns=\"http://www.w3.org/1999/xhtml\">a</div></text><active value=\"true\"/><text>"#,
    ];
    for div in cases {
        let input = format!(r#"{{"resourceType": "Patient", "text": {{"status": "generated", "div": "{div}"}}}}"#);
        match decode_any(input.as_bytes(), Format::Json) {
            Err(FormatError::TypeConversion { path, .. }) => assert_eq!(path, "Patient.text.div"),
            other => panic!("expected TypeConversion for {div}, got {other:?}"),
        }
    }
}

#[test]
fn empty_list_entries_do_not_affect_equality() {
    let input = br#"{"resourceType": "Patient", "name": [{"family": "x", "given": [null, "a"]}]}"#;
    let resource = decode_any(input, Format::Json).unwrap();
    assert_round_trips(&resource);
}

#[test]
fn id_only_primitives_are_equivalent_to_absent_ones() {
    let tagged = decode_any(
        br#"{"resourceType": "Patient", "_gender": {"id": "x"}, "name": [{"_given": [{"id": "g"}]}]}"#,
        Format::Json,
    )
    .unwrap();
    let plain = Resource::from(Patient {
        name: vec![HumanName::default()],
        ..Default::default()
    });
    assert!(!equal(Node::from(&tagged), Node::from(&plain)));
    assert!(equivalent(Node::from(&tagged), Node::from(&plain)));
}

#[test]
fn primitive_lists_round_trip_with_mixed_entries() {
    // Fully empty entries have no XML form, so only non-empty ones are mixed.
    let patient = Patient {
        name: vec![HumanName {
            given: vec![given(2), given(1), given(3), given(2)],
            ..Default::default()
        }],
        ..Default::default()
    };
    assert_round_trips(&Resource::from(patient));
}

#[test]
fn choice_values_round_trip_with_metadata() {
    let patient = Patient {
        deceased: Some(AnyValue::from(Primitive::new(true).with_id("d"))),
        multiple_birth: Some(AnyValue::from(Primitive::<i32>::default().with_extension(ext()))),
        ..Default::default()
    };
    let resource = Resource::from(patient);
    assert_round_trips(&resource);

    let json = to_json(&resource);
    assert_eq!(json["deceasedBoolean"], true);
    assert_eq!(json["_deceasedBoolean"], json!({"id": "d"}));
    assert!(json.get("multipleBirthInteger").is_none());
    assert_eq!(json["_multipleBirthInteger"]["extension"][0]["url"], EXT_URL);
}

#[test]
fn metadata_only_primitive_writes_only_the_underscore_member() {
    let patient = Patient {
        gender: Primitive::default().with_id("x"),
        ..Default::default()
    };
    let json = to_json(&Resource::from(patient));
    assert!(json.get("gender").is_none());
    assert_eq!(json["_gender"], json!({"id": "x"}));

    let decoded = decode_any(json.to_string().as_bytes(), Format::Json).unwrap();
    let Resource::Patient(patient) = decoded else {
        panic!("expected a Patient");
    };
    assert_eq!(patient.gender.value, None);
    assert_eq!(patient.gender.id.as_deref(), Some("x"));
}

#[test]
fn array_halves_stay_aligned() {
    let name = HumanName {
        given: vec![
            Primitive::parse("a").unwrap(),
            Primitive::default().with_extension(ext()),
            Primitive::parse("c").unwrap(),
        ],
        ..Default::default()
    };
    let resource = Resource::from(Patient {
        name: vec![name],
        ..Default::default()
    });

    let json = to_json(&resource);
    assert_eq!(json["name"][0]["given"], json!(["a", null, "c"]));
    assert_eq!(
        json["name"][0]["_given"],
        json!([null, {"extension": [{"url": EXT_URL, "valueBoolean": true}]}, null])
    );

    let Resource::Patient(back) = decode_any(json.to_string().as_bytes(), Format::Json).unwrap()
    else {
        panic!("expected a Patient");
    };
    let given = &back.name[0].given;
    assert_eq!(given.len(), 3);
    assert!(given[1].value.is_none());
    assert_eq!(given[1].extension.len(), 1);
}

#[test]
fn shorter_half_is_padded() {
    let input = br#"{
        "resourceType": "Patient",
        "name": [{"given": ["a"], "_given": [null, {"id": "second"}]}]
    }"#;
    let Resource::Patient(patient) = decode_any(input, Format::Json).unwrap() else {
        panic!("expected a Patient");
    };
    let given = &patient.name[0].given;
    assert_eq!(given.len(), 2);
    assert_eq!(given[0].value.as_ref().map(FhirString::as_str), Some("a"));
    assert_eq!(given[1].id.as_deref(), Some("second"));
}

#[test]
fn dispatch_follows_the_discriminator() {
    let patient = decode_any(br#"{"resourceType": "Patient", "id": "p"}"#, Format::Json).unwrap();
    assert_eq!(patient.resource_type(), ResourceType::Patient);
    assert_eq!(patient.id(), Some("p"));

    let observation = decode_any(
        br#"<Observation xmlns="http://hl7.org/fhir"><status value="final"/></Observation>"#,
        Format::Xml,
    )
    .unwrap();
    assert!(matches!(observation, Resource::Observation(_)));
}

#[test]
fn unknown_resource_types_are_rejected() {
    let err = decode_any(br#"{"resourceType": "Bogus"}"#, Format::Json).unwrap_err();
    assert!(matches!(err, FormatError::UnknownResourceType(ref t) if t == "Bogus"));

    let nested = br#"{"resourceType": "Patient", "contained": [{"resourceType": "Bogus"}]}"#;
    assert!(matches!(
        decode_any(nested, Format::Json),
        Err(FormatError::UnknownResourceType(t)) if t == "Bogus"
    ));
}

#[test]
fn restricted_registries_apply_to_embedded_resources() {
    let registry = ResourceRegistry::with_types([ResourceType::Observation]);
    let codec = ResourceCodec::new(&registry);

    let plain = br#"{"resourceType": "Observation", "status": "final"}"#;
    assert!(codec.decode_any(plain, Format::Json).is_ok());

    let contained = br#"{
        "resourceType": "Observation",
        "contained": [{"resourceType": "Patient", "id": "p1"}]
    }"#;
    assert!(matches!(
        codec.decode_any(contained, Format::Json),
        Err(FormatError::UnknownResourceType(t)) if t == "Patient"
    ));
}

#[test]
fn unknown_members_are_rejected_with_their_path() {
    let input = br#"{"resourceType": "Patient", "name": [{"family": "x", "nickname": "y"}]}"#;
    match decode_any(input, Format::Json) {
        Err(FormatError::UnknownField { kind, path, field }) => {
            assert_eq!(kind, "HumanName");
            assert_eq!(path, "Patient.name[0]");
            assert_eq!(field, "nickname");
        }
        other => panic!("expected UnknownField, got {other:?}"),
    }

    // `_f` only exists for primitives
    let complex_metadata = br#"{"resourceType": "Patient", "_name": [{"id": "x"}]}"#;
    assert!(matches!(
        decode_any(complex_metadata, Format::Json),
        Err(FormatError::UnknownField { .. })
    ));

    let xml = br#"<Patient xmlns="http://hl7.org/fhir"><nickname value="y"/></Patient>"#;
    assert!(matches!(
        decode_any(xml, Format::Xml),
        Err(FormatError::UnknownField { field, .. }) if field == "nickname"
    ));
}

#[test]
fn choice_fields_take_exactly_one_type() {
    let json = br#"{"resourceType": "Patient", "deceasedBoolean": true, "deceasedDateTime": "2020"}"#;
    assert!(matches!(
        decode_any(json, Format::Json),
        Err(FormatError::ConflictingChoice { .. })
    ));

    let xml = br#"<Patient xmlns="http://hl7.org/fhir">
        <deceasedBoolean value="true"/>
        <deceasedDateTime value="2020"/>
    </Patient>"#;
    assert!(matches!(
        decode_any(xml, Format::Xml),
        Err(FormatError::ConflictingChoice { .. })
    ));

    // A type suffix the field does not allow is an unknown member
    let json = br#"{"resourceType": "Patient", "deceasedString": "yes"}"#;
    assert!(matches!(
        decode_any(json, Format::Json),
        Err(FormatError::UnknownField { .. })
    ));
}

#[test]
fn invalid_values_report_a_type_conversion() {
    let cases: &[(&[u8], &str)] = &[
        (&br#"{"resourceType": "Patient", "active": "yes"}"#[..], "Patient.active"),
        (&br#"{"resourceType": "Patient", "birthDate": "1974-13-01"}"#[..], "Patient.birthDate"),
        (
            &br#"{"resourceType": "Patient", "name": [{"given": ["a", ""]}]}"#[..],
            "Patient.name[0].given[1]",
        ),
    ];
    for (input, expected_path) in cases {
        match decode_any(input, Format::Json) {
            Err(FormatError::TypeConversion { path, .. }) => assert_eq!(path, *expected_path),
            other => panic!("expected TypeConversion at {expected_path}, got {other:?}"),
        }
    }

    let xml = br#"<Patient xmlns="http://hl7.org/fhir"><active value="yes"/></Patient>"#;
    assert!(matches!(
        decode_any(xml, Format::Xml),
        Err(FormatError::TypeConversion { .. })
    ));
}

#[test]
fn structural_mismatches_are_malformed_tokens() {
    let input = br#"{"resourceType": "Patient", "name": {"family": "x"}}"#;
    assert!(matches!(
        decode_any(input, Format::Json),
        Err(FormatError::MalformedToken { expected: "array", .. })
    ));

    assert!(matches!(
        decode_any(b"[]", Format::Json),
        Err(FormatError::ExpectedObject)
    ));
    assert!(matches!(
        decode_any(br#"{"id": "x"}"#, Format::Json),
        Err(FormatError::MissingResourceType)
    ));
}

#[test]
fn namespaced_xml_attributes_are_rejected() {
    let xml = br#"<Patient xmlns="http://hl7.org/fhir"
        xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
        xsi:schemaLocation="http://hl7.org/fhir ../fhir-all.xsd">
        <active value="true"/>
    </Patient>"#;
    assert!(matches!(
        decode_any(xml, Format::Xml),
        Err(FormatError::MalformedToken { .. })
    ));

    let foreign = br#"<Patient xmlns="http://hl7.org/fhir"><active xmlns="urn:other" value="true"/></Patient>"#;
    assert!(matches!(
        decode_any(foreign, Format::Xml),
        Err(FormatError::MalformedToken { .. })
    ));
}

#[test]
fn equality_and_equivalence_differ_on_ids() {
    let a = Resource::from(Patient {
        id: Primitive::parse("a").unwrap(),
        active: Primitive::new(true),
        ..Default::default()
    });
    let b = Resource::from(Patient {
        id: Primitive::parse("b").unwrap(),
        active: Primitive::new(true),
        ..Default::default()
    });
    assert!(!equal(Node::from(&a), Node::from(&b)));
    assert!(equivalent(Node::from(&a), Node::from(&b)));
}

#[test]
fn compact_output_is_a_single_line() {
    let resource = Resource::from(Patient {
        active: Primitive::new(true),
        name: vec![HumanName {
            family: Primitive::parse("Chalmers").unwrap(),
            ..Default::default()
        }],
        ..Default::default()
    });
    let codec = ResourceCodec::default().with_options(EncodeOptions::compact());
    let json = codec.encode_to_string(&resource, Format::Json).unwrap();
    assert_eq!(
        json,
        r#"{"resourceType":"Patient","active":true,"name":[{"family":"Chalmers"}]}"#
    );
    let xml = codec.encode_to_string(&resource, Format::Xml).unwrap();
    assert_eq!(
        xml,
        r#"<Patient xmlns="http://hl7.org/fhir"><active value="true"/><name><family value="Chalmers"/></name></Patient>"#
    );
}

#[test]
fn decimals_keep_their_scale() {
    let input = br#"{"resourceType": "Observation", "valueQuantity": {"value": 1.50}}"#;
    let resource = decode_any(input, Format::Json).unwrap();

    let xml = String::from_utf8(encode_any(&resource, Format::Xml).unwrap()).unwrap();
    assert!(xml.contains(r#"<value value="1.50"/>"#));

    let json = String::from_utf8(encode_any(&resource, Format::Json).unwrap()).unwrap();
    assert!(json.contains("1.50"));
}
