//! Values of `[x]` choice fields

use super::datatypes::*;
use super::primitive::*;
use crate::element::{Element, ValueMut};
use crate::navigation::Node;
use rust_decimal::Decimal;

macro_rules! any_value {
    (
        primitive { $($pvar:ident($pty:ty) = $pname:literal),* $(,)? }
        complex { $($cvar:ident = $cname:literal),* $(,)? }
    ) => {
        /// The concrete value of a choice field. The variant fixes the type
        /// suffix used on the wire (`valueQuantity`, `deceasedBoolean`).
        #[derive(Debug, Clone, PartialEq)]
        pub enum AnyValue {
            $($pvar(Primitive<$pty>),)*
            $($cvar(Box<$cvar>),)*
        }

        impl AnyValue {
            /// Every type a choice field may hold.
            pub const TYPE_NAMES: &'static [&'static str] = &[$($pname,)* $($cname,)*];

            pub fn type_name(&self) -> &'static str {
                match self {
                    $(Self::$pvar(_) => $pname,)*
                    $(Self::$cvar(_) => $cname,)*
                }
            }

            /// An empty value of the named type, ready to be filled by a decoder.
            pub fn empty_of(type_name: &str) -> Option<Self> {
                match type_name {
                    $($pname => Some(Self::$pvar(Primitive::default())),)*
                    $($cname => Some(Self::$cvar(Box::default())),)*
                    _ => None,
                }
            }

            pub fn as_node(&self) -> Node<'_> {
                match self {
                    $(Self::$pvar(p) => Node::Primitive(p),)*
                    $(Self::$cvar(e) => Node::Element(&**e),)*
                }
            }

            pub fn as_value_mut(&mut self) -> ValueMut<'_> {
                match self {
                    $(Self::$pvar(p) => ValueMut::Primitive(p),)*
                    $(Self::$cvar(e) => ValueMut::Element(&mut **e as &mut dyn Element),)*
                }
            }

            pub fn is_primitive(&self) -> bool {
                matches!(self, $(Self::$pvar(_))|*)
            }
        }

        $(
            impl From<Primitive<$pty>> for AnyValue {
                fn from(value: Primitive<$pty>) -> Self {
                    Self::$pvar(value)
                }
            }

            impl From<$pty> for AnyValue {
                fn from(value: $pty) -> Self {
                    Self::$pvar(Primitive::new(value))
                }
            }
        )*

        $(
            impl From<$cvar> for AnyValue {
                fn from(value: $cvar) -> Self {
                    Self::$cvar(Box::new(value))
                }
            }
        )*
    };
}

any_value! {
    primitive {
        Base64Binary(Base64Binary) = "base64Binary",
        Boolean(bool) = "boolean",
        Canonical(Canonical) = "canonical",
        Code(Code) = "code",
        Date(Date) = "date",
        DateTime(DateTime) = "dateTime",
        Decimal(Decimal) = "decimal",
        Id(Id) = "id",
        Instant(Instant) = "instant",
        Integer(i32) = "integer",
        Markdown(Markdown) = "markdown",
        PositiveInt(PositiveInt) = "positiveInt",
        String(FhirString) = "string",
        Time(Time) = "time",
        UnsignedInt(UnsignedInt) = "unsignedInt",
        Uri(Uri) = "uri",
        Url(Url) = "url",
    }
    complex {
        CodeableConcept = "CodeableConcept",
        Coding = "Coding",
        ContactPoint = "ContactPoint",
        HumanName = "HumanName",
        Identifier = "Identifier",
        Period = "Period",
        Quantity = "Quantity",
        Reference = "Reference",
    }
}
