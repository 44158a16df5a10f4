//! Generic navigation and structural equality
//!
//! Everything here works on [`Node`]s through the [`Element`] contract; no
//! function knows about concrete resource types.

use crate::common::{PrimitiveNode, Scalar};
use crate::element::{Element, FieldRef};
use crate::resources::Resource;
use crate::schema::TypeInfo;

/// A borrowed tree node: a primitive or a structured element.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Primitive(&'a dyn PrimitiveNode),
    Element(&'a dyn Element),
}

impl<'a> Node<'a> {
    pub fn element<E: Element>(element: &'a E) -> Self {
        Node::Element(element)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Primitive(p) => p.type_name(),
            Node::Element(e) => e.type_info().name,
        }
    }

    pub fn type_info(&self) -> Option<&'static TypeInfo> {
        match self {
            Node::Primitive(p) => crate::schema::lookup(p.type_name()),
            Node::Element(e) => Some(e.type_info()),
        }
    }

    pub fn as_element(&self) -> Option<&'a dyn Element> {
        match *self {
            Node::Element(e) => Some(e),
            Node::Primitive(_) => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&'a dyn PrimitiveNode> {
        match *self {
            Node::Primitive(p) => Some(p),
            Node::Element(_) => None,
        }
    }

    /// The primitive value, if this is a primitive that has one.
    pub fn scalar(&self) -> Option<Scalar> {
        self.as_primitive().and_then(|p| p.scalar())
    }
}

impl<'a> From<&'a Resource> for Node<'a> {
    fn from(resource: &'a Resource) -> Self {
        Node::Element(resource.as_element())
    }
}

/// A named child. Choice fields report their prefix (`value`, not
/// `valueQuantity`); the node carries the concrete type.
#[derive(Debug, Clone, Copy)]
pub struct Child<'a> {
    pub name: &'static str,
    pub node: Node<'a>,
}

/// Direct children of `node`, in schema order, optionally restricted to the
/// given field names. List fields contribute one child per non-empty entry.
///
/// Children of a primitive are its metadata (`id`, then `extension`).
pub fn children<'a>(node: Node<'a>, names: Option<&[&str]>) -> Vec<Child<'a>> {
    let wanted = |name: &str| names.map_or(true, |names| names.contains(&name));
    let mut out = Vec::new();

    match node {
        Node::Primitive(p) => {
            if let Some(id) = p.id() {
                if wanted("id") {
                    out.push(Child {
                        name: "id",
                        node: Node::Primitive(id),
                    });
                }
            }
            if wanted("extension") {
                out.extend(p.extensions().iter().map(|ext| Child {
                    name: "extension",
                    node: Node::Element(ext),
                }));
            }
        }
        Node::Element(element) => {
            let info = element.type_info();
            for (field, value) in info.fields.iter().zip(element.fields()) {
                if !wanted(field.name) {
                    continue;
                }
                push_field(&mut out, field.name, value);
            }
        }
    }

    out
}

fn push_field<'a>(out: &mut Vec<Child<'a>>, name: &'static str, value: FieldRef<'a>) {
    let mut push = |node: Node<'a>| out.push(Child { name, node });
    match value {
        FieldRef::Attribute(Some(s)) => push(Node::Primitive(s)),
        FieldRef::Attribute(None) => {}
        FieldRef::Primitive(p) => {
            if !p.is_empty() {
                push(Node::Primitive(p));
            }
        }
        FieldRef::PrimitiveList(items) => {
            for p in items.into_iter().filter(|p| !p.is_empty()) {
                push(Node::Primitive(p));
            }
        }
        FieldRef::Element(e) => {
            if let Some(e) = e {
                push(Node::Element(e));
            }
        }
        FieldRef::ElementList(items) => {
            for e in items {
                push(Node::Element(e));
            }
        }
        FieldRef::Choice(v) => {
            if let Some(v) = v {
                push(v.as_node());
            }
        }
        FieldRef::Resource(r) => {
            if let Some(r) = r {
                push(Node::from(r));
            }
        }
        FieldRef::ResourceList(items) => {
            for r in items {
                push(Node::from(r));
            }
        }
    }
}

/// All nodes below `node`, depth first, pre-order.
pub fn descendants<'a>(node: Node<'a>) -> Vec<Child<'a>> {
    let mut out = Vec::new();
    let mut stack: Vec<Child<'a>> = children(node, None);
    stack.reverse();
    while let Some(child) = stack.pop() {
        let mut next = children(child.node, None);
        next.reverse();
        out.push(child);
        stack.extend(next);
    }
    out
}

/// Structural equality: same type, same values, same children in the same
/// order.
pub fn equal(a: Node<'_>, b: Node<'_>) -> bool {
    compare(a, b, false)
}

/// Like [`equal`], but children named `id` are ignored at every depth.
pub fn equivalent(a: Node<'_>, b: Node<'_>) -> bool {
    compare(a, b, true)
}

fn compare(a: Node<'_>, b: Node<'_>, ignore_ids: bool) -> bool {
    if a.type_name() != b.type_name() || a.scalar() != b.scalar() {
        return false;
    }

    let left = compared_children(a, ignore_ids);
    let right = compared_children(b, ignore_ids);

    left.len() == right.len()
        && left
            .iter()
            .zip(&right)
            .all(|(l, r)| l.name == r.name && compare(l.node, r.node, ignore_ids))
}

/// With ids ignored, a primitive that only carried an id is absent.
fn compared_children(node: Node<'_>, ignore_ids: bool) -> Vec<Child<'_>> {
    let mut kids = children(node, None);
    if ignore_ids {
        kids.retain(|child| match child.node {
            _ if child.name == "id" => false,
            Node::Primitive(p) => p.scalar().is_some() || !p.extensions().is_empty(),
            Node::Element(_) => true,
        });
    }
    kids
}
