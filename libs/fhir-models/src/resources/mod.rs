//! Resource types and the polymorphic [`Resource`] container

mod basic;
mod bundle;
mod observation;
mod operation_outcome;
mod patient;

pub use basic::*;
pub use bundle::*;
pub use observation::*;
pub use operation_outcome::*;
pub use patient::*;

use crate::common::{Error, Meta};
use crate::element::{Element, ElementType};
use crate::schema::TypeInfo;
use phf::phf_map;
use std::fmt;
use std::str::FromStr;

macro_rules! resources {
    ($($name:ident),* $(,)?) => {
        /// Discriminator of the [`Resource`] container.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ResourceType {
            $($name,)*
        }

        impl ResourceType {
            pub const ALL: &'static [ResourceType] = &[$(ResourceType::$name,)*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }

            pub fn type_info(&self) -> &'static TypeInfo {
                match self {
                    $(Self::$name => <$name as ElementType>::info(),)*
                }
            }
        }

        /// Any resource. The variant is the resource type; the payload is the
        /// typed resource.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Resource {
            $($name(Box<$name>),)*
        }

        impl Resource {
            /// An empty resource of the given type.
            pub fn new(resource_type: ResourceType) -> Self {
                match resource_type {
                    $(ResourceType::$name => Self::$name(Box::default()),)*
                }
            }

            pub fn resource_type(&self) -> ResourceType {
                match self {
                    $(Self::$name(_) => ResourceType::$name,)*
                }
            }

            /// Logical id.
            pub fn id(&self) -> Option<&str> {
                match self {
                    $(Self::$name(r) => r.id.value().map(|id| id.as_str()),)*
                }
            }

            pub fn meta(&self) -> Option<&Meta> {
                match self {
                    $(Self::$name(r) => r.meta.as_deref(),)*
                }
            }

            pub fn as_element(&self) -> &dyn Element {
                match self {
                    $(Self::$name(r) => &**r,)*
                }
            }

            pub fn as_element_mut(&mut self) -> &mut dyn Element {
                match self {
                    $(Self::$name(r) => &mut **r,)*
                }
            }
        }

        $(
            impl From<$name> for Resource {
                fn from(resource: $name) -> Self {
                    Self::$name(Box::new(resource))
                }
            }
        )*
    };
}

resources!(Basic, Bundle, Observation, OperationOutcome, Patient);

static RESOURCE_TYPES: phf::Map<&'static str, ResourceType> = phf_map! {
    "Basic" => ResourceType::Basic,
    "Bundle" => ResourceType::Bundle,
    "Observation" => ResourceType::Observation,
    "OperationOutcome" => ResourceType::OperationOutcome,
    "Patient" => ResourceType::Patient,
};

impl ResourceType {
    /// Case-sensitive lookup by resource type name.
    pub fn from_name(name: &str) -> Option<Self> {
        RESOURCE_TYPES.get(name).copied()
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::UnknownResourceType(s.to_string()))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Id, Primitive};

    #[test]
    fn name_lookup_matches_variants() {
        for rt in ResourceType::ALL {
            assert_eq!(ResourceType::from_name(rt.as_str()), Some(*rt));
            assert_eq!(rt.type_info().name, rt.as_str());
        }
        assert_eq!(RESOURCE_TYPES.len(), ResourceType::ALL.len());
        assert!(ResourceType::from_name("patient").is_none());
        assert_eq!(
            "Foo".parse::<ResourceType>(),
            Err(Error::UnknownResourceType("Foo".into()))
        );
    }

    #[test]
    fn container_exposes_common_fields() {
        let patient = Patient {
            id: Primitive::new(Id::new("p1").unwrap()),
            ..Default::default()
        };
        let resource = Resource::from(patient);
        assert_eq!(resource.resource_type(), ResourceType::Patient);
        assert_eq!(resource.id(), Some("p1"));
        assert_eq!(resource.as_element().type_info().name, "Patient");
        assert!(resource.meta().is_none());

        let empty = Resource::new(ResourceType::Basic);
        assert_eq!(empty.id(), None);
    }
}
