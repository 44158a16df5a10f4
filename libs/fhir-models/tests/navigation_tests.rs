use helix_models::common::*;
use helix_models::navigation::{children, descendants, equal, equivalent, Node};
use helix_models::resources::*;
use helix_models::schema::{lookup, FieldKind};

fn patient(id: &str, family: &str) -> Patient {
    Patient {
        id: Primitive::parse(id).unwrap(),
        active: Primitive::new(true),
        name: vec![HumanName {
            family: Primitive::parse(family).unwrap(),
            given: vec![Primitive::parse("Peter").unwrap()],
            ..Default::default()
        }],
        deceased: Some(AnyValue::from(false)),
        ..Default::default()
    }
}

fn searchset(entries: Vec<Patient>) -> Resource {
    let mut bundle = Bundle::new(BundleType::Searchset).unwrap();
    for p in entries {
        bundle.add_resource(None, p);
    }
    Resource::from(bundle)
}

#[test]
fn choice_children_use_the_prefix() {
    let p = patient("p1", "Chalmers");
    let deceased = children(Node::element(&p), Some(&["deceased"][..]));
    assert_eq!(deceased.len(), 1);
    assert_eq!(deceased[0].name, "deceased");
    assert_eq!(deceased[0].node.type_name(), "boolean");
}

#[test]
fn resource_children_are_navigable() {
    let bundle = searchset(vec![patient("p1", "Chalmers"), patient("p2", "Levin")]);
    let entries = children(Node::from(&bundle), Some(&["entry"][..]));
    assert_eq!(entries.len(), 2);

    let resource = children(entries[1].node, Some(&["resource"][..]));
    assert_eq!(resource.len(), 1);
    assert_eq!(resource[0].node.type_name(), "Patient");

    let families: Vec<_> = descendants(Node::from(&bundle))
        .into_iter()
        .filter(|c| c.name == "family")
        .filter_map(|c| c.node.scalar())
        .map(|s| s.to_lexical())
        .collect();
    assert_eq!(families, ["Chalmers", "Levin"]);
}

#[test]
fn contained_resources_take_part_in_equality() {
    let mut a = patient("p1", "Chalmers");
    a.contained.push(Resource::from(patient("c1", "Contained")));
    let mut b = a.clone();
    assert!(equal(Node::element(&a), Node::element(&b)));

    if let Resource::Patient(inner) = &mut b.contained[0] {
        inner.id = Primitive::parse("c2").unwrap();
    }
    assert!(!equal(Node::element(&a), Node::element(&b)));
    assert!(equivalent(Node::element(&a), Node::element(&b)));
}

#[test]
fn equivalence_still_compares_content() {
    let a = searchset(vec![patient("p1", "Chalmers")]);
    let b = searchset(vec![patient("p9", "Chalmers")]);
    let c = searchset(vec![patient("p1", "Levin")]);
    assert!(!equal(Node::from(&a), Node::from(&b)));
    assert!(equivalent(Node::from(&a), Node::from(&b)));
    assert!(!equivalent(Node::from(&a), Node::from(&c)));
}

#[test]
fn different_resource_types_are_never_equal() {
    let a = Resource::new(ResourceType::Basic);
    let b = Resource::new(ResourceType::Patient);
    assert!(!equal(Node::from(&a), Node::from(&b)));
    assert!(!equivalent(Node::from(&a), Node::from(&b)));
    assert!(equal(Node::from(&a), Node::from(&a.clone())));
}

#[test]
fn schema_describes_embedded_resources() {
    let entry = lookup("Bundle.entry").unwrap();
    let resource = entry.field("resource").unwrap();
    assert_eq!(resource.kind, FieldKind::Resource);
    assert!(!resource.many);

    let response = lookup("Bundle.entry.response").unwrap();
    assert_eq!(response.field("outcome").unwrap().kind, FieldKind::Resource);
}
