//! The generic element contract
//!
//! Every structured type implements [`Element`]: it exposes its static
//! [`TypeInfo`] and a borrowed view of each field, in the same order as
//! `TypeInfo::fields`. Codecs and navigation only ever talk to this trait,
//! so a new type needs nothing beyond a [`fhir_element!`] declaration.

use crate::common::{AnyValue, Primitive, PrimitiveNode, PrimitiveSlot, PrimitiveType};
use crate::resources::Resource;
use crate::schema::{FieldKind, TypeInfo};
use std::fmt;

pub trait Element: fmt::Debug + Send + Sync {
    fn type_info(&self) -> &'static TypeInfo;

    /// One entry per field of `type_info().fields`, in the same order.
    fn fields(&self) -> Vec<FieldRef<'_>>;

    /// Mutable access to the field with the given wire name (choice prefix
    /// for `[x]` fields).
    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>>;
}

/// Statically known element types.
pub trait ElementType: Element + Default + Clone + PartialEq + 'static {
    const TYPE_NAME: &'static str;

    fn info() -> &'static TypeInfo;
}

/// Borrowed view of a field.
#[derive(Debug)]
pub enum FieldRef<'a> {
    Attribute(Option<&'a String>),
    Primitive(&'a dyn PrimitiveNode),
    PrimitiveList(Vec<&'a dyn PrimitiveNode>),
    Element(Option<&'a dyn Element>),
    ElementList(Vec<&'a dyn Element>),
    Choice(Option<&'a AnyValue>),
    Resource(Option<&'a Resource>),
    ResourceList(&'a [Resource]),
}

impl FieldRef<'_> {
    pub fn is_present(&self) -> bool {
        match self {
            FieldRef::Attribute(v) => v.is_some(),
            FieldRef::Primitive(p) => !p.is_empty(),
            FieldRef::PrimitiveList(items) => items.iter().any(|p| !p.is_empty()),
            FieldRef::Element(e) => e.is_some(),
            FieldRef::ElementList(items) => !items.is_empty(),
            FieldRef::Choice(v) => v.is_some(),
            FieldRef::Resource(r) => r.is_some(),
            FieldRef::ResourceList(items) => !items.is_empty(),
        }
    }
}

/// Mutable access to a field, used by the decoders.
pub enum FieldMut<'a> {
    Attribute(&'a mut Option<String>),
    Primitive(&'a mut dyn PrimitiveSlot),
    PrimitiveList(&'a mut dyn PrimitiveList),
    Element(&'a mut dyn ElementSlot),
    ElementList(&'a mut dyn ElementList),
    Choice(&'a mut Option<AnyValue>),
    Resource(&'a mut Option<Box<Resource>>),
    ResourceList(&'a mut Vec<Resource>),
}

/// A value slot reached through a choice or a primitive list.
pub enum ValueMut<'a> {
    Primitive(&'a mut dyn PrimitiveSlot),
    Element(&'a mut dyn Element),
}

pub trait PrimitiveList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grows with empty entries, or truncates.
    fn resize(&mut self, len: usize);

    fn slot_mut(&mut self, index: usize) -> Option<&mut dyn PrimitiveSlot>;

    fn push_default(&mut self) -> &mut dyn PrimitiveSlot;
}

impl<T: PrimitiveType> PrimitiveList for Vec<Primitive<T>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn resize(&mut self, len: usize) {
        self.resize_with(len, Primitive::default);
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut dyn PrimitiveSlot> {
        self.get_mut(index).map(|p| p as &mut dyn PrimitiveSlot)
    }

    fn push_default(&mut self) -> &mut dyn PrimitiveSlot {
        let index = Vec::len(self);
        self.push(Primitive::default());
        &mut self[index]
    }
}

pub trait ElementSlot {
    fn is_present(&self) -> bool;

    /// The nested element, created empty if absent.
    fn get_or_insert(&mut self) -> &mut dyn Element;
}

impl<E: ElementType> ElementSlot for Option<Box<E>> {
    fn is_present(&self) -> bool {
        self.is_some()
    }

    fn get_or_insert(&mut self) -> &mut dyn Element {
        &mut **self.get_or_insert_with(Box::default)
    }
}

pub trait ElementList {
    fn len(&self) -> usize;

    fn push_default(&mut self) -> &mut dyn Element;
}

impl<E: ElementType> ElementList for Vec<E> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn push_default(&mut self) -> &mut dyn Element {
        let index = Vec::len(self);
        self.push(E::default());
        &mut self[index]
    }
}

/// Storage shapes a declared field may take. The associated constants feed
/// the static [`TypeInfo`] tables.
pub trait FieldSlot {
    const KIND: FieldKind;
    const TYPE_NAME: &'static str;
    const MANY: bool;

    fn as_field(&self) -> FieldRef<'_>;

    fn as_field_mut(&mut self) -> FieldMut<'_>;
}

impl FieldSlot for Option<String> {
    const KIND: FieldKind = FieldKind::Attribute;
    const TYPE_NAME: &'static str = "string";
    const MANY: bool = false;

    fn as_field(&self) -> FieldRef<'_> {
        FieldRef::Attribute(self.as_ref())
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Attribute(self)
    }
}

impl<T: PrimitiveType> FieldSlot for Primitive<T> {
    const KIND: FieldKind = FieldKind::Primitive;
    const TYPE_NAME: &'static str = T::TYPE_NAME;
    const MANY: bool = false;

    fn as_field(&self) -> FieldRef<'_> {
        FieldRef::Primitive(self)
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Primitive(self)
    }
}

impl<T: PrimitiveType> FieldSlot for Vec<Primitive<T>> {
    const KIND: FieldKind = FieldKind::Primitive;
    const TYPE_NAME: &'static str = T::TYPE_NAME;
    const MANY: bool = true;

    fn as_field(&self) -> FieldRef<'_> {
        FieldRef::PrimitiveList(self.iter().map(|p| p as &dyn PrimitiveNode).collect())
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::PrimitiveList(self)
    }
}

impl<E: ElementType> FieldSlot for Option<Box<E>> {
    const KIND: FieldKind = FieldKind::Element;
    const TYPE_NAME: &'static str = E::TYPE_NAME;
    const MANY: bool = false;

    fn as_field(&self) -> FieldRef<'_> {
        FieldRef::Element(self.as_deref().map(|e| e as &dyn Element))
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Element(self)
    }
}

impl<E: ElementType> FieldSlot for Vec<E> {
    const KIND: FieldKind = FieldKind::Element;
    const TYPE_NAME: &'static str = E::TYPE_NAME;
    const MANY: bool = true;

    fn as_field(&self) -> FieldRef<'_> {
        FieldRef::ElementList(self.iter().map(|e| e as &dyn Element).collect())
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::ElementList(self)
    }
}

impl FieldSlot for Option<AnyValue> {
    const KIND: FieldKind = FieldKind::Choice;
    const TYPE_NAME: &'static str = "*";
    const MANY: bool = false;

    fn as_field(&self) -> FieldRef<'_> {
        FieldRef::Choice(self.as_ref())
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Choice(self)
    }
}

impl FieldSlot for Option<Box<Resource>> {
    const KIND: FieldKind = FieldKind::Resource;
    const TYPE_NAME: &'static str = "Resource";
    const MANY: bool = false;

    fn as_field(&self) -> FieldRef<'_> {
        FieldRef::Resource(self.as_deref())
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Resource(self)
    }
}

impl FieldSlot for Vec<Resource> {
    const KIND: FieldKind = FieldKind::Resource;
    const TYPE_NAME: &'static str = "Resource";
    const MANY: bool = true;

    fn as_field(&self) -> FieldRef<'_> {
        FieldRef::ResourceList(self)
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::ResourceList(self)
    }
}

/// Declares a FHIR structure: the struct, its static [`TypeInfo`] and its
/// [`Element`] implementation.
///
/// The leading keyword selects the inherited base fields:
/// `datatype` (Element), `backbone` (BackboneElement), `resource` (Resource)
/// or `domain_resource` (DomainResource). Each field is declared as
/// `rust_name: StorageType = "wireName"`; choice fields append their allowed
/// types in brackets.
macro_rules! fhir_element {
    (@choices) => { &[] };
    (@choices $choices:expr) => { $choices };

    (
        @emit [$(#[$meta:meta])*] $name:ident, $type_name:expr, $kind:ident, $base:expr, {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $ty:ty = $wire:literal $([$choices:expr])?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        impl $crate::element::Element for $name {
            fn type_info(&self) -> &'static $crate::schema::TypeInfo {
                <Self as $crate::element::ElementType>::info()
            }

            fn fields(&self) -> Vec<$crate::element::FieldRef<'_>> {
                vec![$($crate::element::FieldSlot::as_field(&self.$field)),*]
            }

            fn field_mut(&mut self, name: &str) -> Option<$crate::element::FieldMut<'_>> {
                match name {
                    $($wire => Some($crate::element::FieldSlot::as_field_mut(&mut self.$field)),)*
                    _ => None,
                }
            }
        }

        impl $crate::element::ElementType for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn info() -> &'static $crate::schema::TypeInfo {
                static INFO: $crate::schema::TypeInfo = $crate::schema::TypeInfo {
                    name: $type_name,
                    base: Some($base),
                    kind: $crate::schema::TypeKind::$kind,
                    fields: &[$(
                        $crate::schema::FieldInfo {
                            name: $wire,
                            type_name: <$ty as $crate::element::FieldSlot>::TYPE_NAME,
                            kind: <$ty as $crate::element::FieldSlot>::KIND,
                            many: <$ty as $crate::element::FieldSlot>::MANY,
                            choices: $crate::element::fhir_element!(@choices $($choices)?),
                        }
                    ),*],
                };
                &INFO
            }
        }
    };

    (
        $(#[$meta:meta])*
        datatype $name:ident { $($body:tt)* }
    ) => {
        $crate::element::fhir_element! {
            @emit [$(#[$meta])*] $name, stringify!($name), Complex, "Element", {
                /// Unique id for inter-element referencing
                id: Option<String> = "id",
                /// Additional content defined by implementations
                extension: Vec<$crate::common::Extension> = "extension",
                $($body)*
            }
        }
    };

    (
        $(#[$meta:meta])*
        backbone $name:ident ($type_name:literal) { $($body:tt)* }
    ) => {
        $crate::element::fhir_element! {
            @emit [$(#[$meta])*] $name, $type_name, Backbone, "BackboneElement", {
                id: Option<String> = "id",
                extension: Vec<$crate::common::Extension> = "extension",
                /// Extensions that cannot be ignored
                modifier_extension: Vec<$crate::common::Extension> = "modifierExtension",
                $($body)*
            }
        }
    };

    (
        $(#[$meta:meta])*
        resource $name:ident { $($body:tt)* }
    ) => {
        $crate::element::fhir_element! {
            @emit [$(#[$meta])*] $name, stringify!($name), Resource, "Resource", {
                /// Logical id of this artifact
                id: $crate::common::Primitive<$crate::common::Id> = "id",
                /// Metadata about the resource
                meta: Option<Box<$crate::common::Meta>> = "meta",
                implicit_rules: $crate::common::Primitive<$crate::common::Uri> = "implicitRules",
                language: $crate::common::Primitive<$crate::common::Code> = "language",
                $($body)*
            }
        }
    };

    (
        $(#[$meta:meta])*
        domain_resource $name:ident { $($body:tt)* }
    ) => {
        $crate::element::fhir_element! {
            @emit [$(#[$meta])*] $name, stringify!($name), Resource, "DomainResource", {
                /// Logical id of this artifact
                id: $crate::common::Primitive<$crate::common::Id> = "id",
                /// Metadata about the resource
                meta: Option<Box<$crate::common::Meta>> = "meta",
                implicit_rules: $crate::common::Primitive<$crate::common::Uri> = "implicitRules",
                language: $crate::common::Primitive<$crate::common::Code> = "language",
                /// Text summary of the resource, for human interpretation
                text: Option<Box<$crate::common::Narrative>> = "text",
                /// Contained, inline resources
                contained: Vec<$crate::resources::Resource> = "contained",
                extension: Vec<$crate::common::Extension> = "extension",
                modifier_extension: Vec<$crate::common::Extension> = "modifierExtension",
                $($body)*
            }
        }
    };
}

pub(crate) use fhir_element;
