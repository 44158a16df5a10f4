//! Resource type registry
//!
//! Maps discriminator strings (`"Patient"`) to resource kinds. A registry is
//! built once and handed to the codec; decoding a resource whose type is not
//! registered fails, including contained and bundled resources.

use helix_models::ResourceType;
use std::collections::HashMap;
use once_cell::sync::Lazy;

static STANDARD: Lazy<ResourceRegistry> = Lazy::new(ResourceRegistry::default);

#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    types: HashMap<&'static str, ResourceType>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::with_types(ResourceType::ALL.iter().copied())
    }
}

impl ResourceRegistry {
    /// Process-wide registry holding every known resource type.
    pub fn standard() -> &'static ResourceRegistry {
        &STANDARD
    }

    /// A registry restricted to the given kinds.
    pub fn with_types(types: impl IntoIterator<Item = ResourceType>) -> Self {
        Self {
            types: types.into_iter().map(|rt| (rt.as_str(), rt)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<ResourceType> {
        self.types.get(name).copied()
    }

    pub fn contains(&self, resource_type: ResourceType) -> bool {
        self.types.contains_key(resource_type.as_str())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered discriminators, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.types.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
