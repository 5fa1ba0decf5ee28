//! Property ownership lookup.
//!
//! Ownership lives in the external property/session service. The scheduler
//! only asks it which properties an owner may act on.

use std::collections::BTreeMap;

use crate::types::{OwnerId, PropertyId};

/// Source of owner → property relationships.
pub trait PropertyDirectory {
    /// Properties the owner may schedule showings for.
    fn properties_for_owner(&self, owner: &OwnerId) -> Vec<PropertyId>;

    /// Whether `owner` owns `property`.
    fn owns(&self, owner: &OwnerId, property: &PropertyId) -> bool {
        self.properties_for_owner(owner).contains(property)
    }
}

/// A fixed in-memory directory, e.g. loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    owners: BTreeMap<OwnerId, Vec<PropertyId>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `owner` the given property. Duplicates are ignored.
    pub fn insert(&mut self, owner: OwnerId, property: PropertyId) {
        let properties = self.owners.entry(owner).or_default();
        if !properties.contains(&property) {
            properties.push(property);
        }
    }
}

impl FromIterator<(OwnerId, PropertyId)> for StaticDirectory {
    fn from_iter<I: IntoIterator<Item = (OwnerId, PropertyId)>>(iter: I) -> Self {
        let mut directory = Self::new();
        for (owner, property) in iter {
            directory.insert(owner, property);
        }
        directory
    }
}

impl PropertyDirectory for StaticDirectory {
    fn properties_for_owner(&self, owner: &OwnerId) -> Vec<PropertyId> {
        self.owners.get(owner).cloned().unwrap_or_default()
    }
}
