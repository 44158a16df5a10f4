//! FHIR data models
//!
//! This crate provides strongly-typed Rust structures for FHIR resources,
//! together with the static schema tables that describe them.
//!
//! # Module Organization
//!
//! - `common`: primitive types, general-purpose data types, choice values
//! - `resources`: resource types and the polymorphic [`Resource`] container
//! - `element`: the [`Element`] contract every structure implements
//! - `schema`: static [`TypeInfo`] tables, used by codecs and path evaluators
//! - `navigation`: generic child access, structural equality and equivalence
//!
//! # Design Philosophy
//!
//! - **Split primitives**: a primitive's value and its `id`/`extension`
//!   metadata are stored side by side in [`Primitive<T>`]
//! - **Closed world**: every field a type has is listed in its schema table;
//!   codecs reject anything else
//! - **Schema-driven**: codecs and navigation never match on concrete types
//!
//! # Example
//!
//! ```rust
//! use helix_models::navigation::{equivalent, Node};
//! use helix_models::{Patient, Primitive, Resource};
//!
//! let mut patient = Patient::default();
//! patient.gender = Primitive::parse("female").unwrap();
//!
//! let mut copy = patient.clone();
//! copy.gender = copy.gender.with_id("g1");
//!
//! let a = Resource::from(patient);
//! let b = Resource::from(copy);
//! assert!(equivalent(Node::from(&a), Node::from(&b)));
//! assert_eq!(a.id(), None);
//! ```

pub mod common;
pub mod element;
pub mod navigation;
pub mod resources;
pub mod schema;

// Re-export commonly used types
pub use common::*;
pub use element::{Element, ElementType, FieldMut, FieldRef};
pub use navigation::{children, descendants, equal, equivalent, Child, Node};
pub use resources::{Resource, ResourceType};
pub use rust_decimal::Decimal;
pub use schema::{FieldInfo, FieldKind, TypeInfo, TypeKind};

pub use resources::{
    Basic, Bundle, BundleEntry, BundleType, Observation, OperationOutcome, OperationOutcomeIssue,
    Patient, PatientContact,
};
