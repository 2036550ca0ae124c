//! Resource instances and their custom buttons
//!
//! Resources are produced by the domain (a database, a provider inventory,
//! a test fixture). Whoever builds a [`Resource`] hands it the custom buttons
//! currently attached to its class or group, so action discovery never needs
//! to look anything up on its own.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::href::ResourceLocator;

/// An operator-defined action attached to a class or group of resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomButton {
    /// Button identifier in the domain
    pub id: i64,
    /// Action name the button is invoked by
    pub name: String,
    /// Optional description shown to users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CustomButton {
    /// Create a new custom button
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The class or group a resource belongs to, with its attached buttons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonGroup {
    /// Group name (e.g. the resource class "Vm" or a service template)
    pub name: String,
    /// Buttons currently attached to the group
    #[serde(default)]
    pub buttons: Vec<CustomButton>,
}

impl ButtonGroup {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buttons: Vec::new(),
        }
    }

    /// Attach a button to the group
    #[must_use]
    pub fn with_button(mut self, button: CustomButton) -> Self {
        self.buttons.push(button);
        self
    }
}

/// A single addressable resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Where the resource lives
    pub locator: ResourceLocator,
    /// Class/group association; `None` when the resource has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<ButtonGroup>,
    /// Domain attributes copied into representations
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Resource {
    /// Create a resource with no group and no attributes
    pub fn new(collection: impl Into<String>, id: i64) -> Self {
        Self {
            locator: ResourceLocator::member(collection, id),
            group: None,
            attributes: Map::new(),
        }
    }

    /// Associate the resource with a button group
    #[must_use]
    pub fn with_group(mut self, group: ButtonGroup) -> Self {
        self.group = Some(group);
        self
    }

    /// Set a domain attribute
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Collection this resource belongs to
    pub fn collection(&self) -> &str {
        &self.locator.collection
    }

    /// Custom buttons attached to the resource's group
    pub fn custom_buttons(&self) -> &[CustomButton] {
        self.group
            .as_ref()
            .map(|g| g.buttons.as_slice())
            .unwrap_or_default()
    }
}

/// Lookup of resources by locator
///
/// Persistence lives outside this crate; implement this trait over whatever
/// store holds the resources.
pub trait ResourceStore: Send + Sync {
    /// Find a single resource; `None` if it does not exist
    fn find(&self, locator: &ResourceLocator) -> Option<Resource>;
}

impl<S: ResourceStore + ?Sized> ResourceStore for Arc<S> {
    fn find(&self, locator: &ResourceLocator) -> Option<Resource> {
        (**self).find(locator)
    }
}

/// In-memory resource store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    resources: Arc<DashMap<ResourceLocator, Resource>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a resource
    pub fn insert(&self, resource: Resource) {
        self.resources.insert(resource.locator.clone(), resource);
    }

    /// Remove a resource, returning it if present
    pub fn remove(&self, locator: &ResourceLocator) -> Option<Resource> {
        self.resources.remove(locator).map(|(_, resource)| resource)
    }

    /// Replace the buttons attached to a resource's group
    ///
    /// Returns `false` if the resource does not exist or has no group.
    pub fn set_buttons(&self, locator: &ResourceLocator, buttons: Vec<CustomButton>) -> bool {
        match self.resources.get_mut(locator) {
            Some(mut entry) => match entry.group.as_mut() {
                Some(group) => {
                    group.buttons = buttons;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Number of stored resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceStore for MemoryStore {
    fn find(&self, locator: &ResourceLocator) -> Option<Resource> {
        self.resources.get(locator).map(|entry| entry.value().clone())
    }
}
