//! Partitioning of the flat route table by owning resource.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::resolver::{OperationReference, Owner};

/// Operations owned by one resource, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroup {
    /// Lower-cased grouping key
    pub key: String,
    /// Owner of the first member, which keeps the first-seen casing
    pub owner: Owner,
    pub operations: Vec<OperationReference>,
}

impl ResourceGroup {
    /// First-seen resource name
    pub fn display_name(&self) -> &str {
        self.owner.name()
    }

    pub fn is_synthetic(&self) -> bool {
        self.owner.is_synthetic()
    }
}

/// Serializes as `operationName -> reference`
impl Serialize for ResourceGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.operations.len()))?;
        for operation in &self.operations {
            map.serialize_entry(&operation.operation_name, operation)?;
        }
        map.end()
    }
}

/// Resource groups in first-encountered order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedModel {
    groups: Vec<ResourceGroup>,
}

impl GroupedModel {
    pub fn groups(&self) -> &[ResourceGroup] {
        &self.groups
    }

    pub fn get(&self, key: &str) -> Option<&ResourceGroup> {
        let key = key.to_lowercase();
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    /// Every reference across all groups, group by group
    pub fn references(&self) -> impl Iterator<Item = &OperationReference> {
        self.groups.iter().flat_map(|g| g.operations.iter())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Serializes as `resourceKey -> operationName -> reference`, in group order
impl Serialize for GroupedModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.key, group)?;
        }
        map.end()
    }
}

/// Group references by `parent_resource`, compared case-insensitively.
///
/// Groups appear in the order their first member appears, and members keep
/// their relative order. Nothing is sorted.
pub fn group(references: &[OperationReference]) -> GroupedModel {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ResourceGroup> = Vec::new();

    for reference in references {
        let key = reference.parent_resource.to_lowercase();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(ResourceGroup {
                key,
                owner: reference.owner.clone(),
                operations: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].operations.push(reference.clone());
    }

    GroupedModel { groups }
}
