//! Route-table construction over the whole service model.
//!
//! The walk is two-phase. Every declared resource is visited depth-first and
//! claims the operations it binds; afterwards the service-level operations
//! that no resource claimed are resolved against the synthetic `api` owner.
//! The model must be a finite tree (see [`crate::model`]).

use std::collections::{HashMap, HashSet};

use super::resolver::{OperationReference, OperationResolver, Owner};
use crate::error::{Error, Result};
use crate::model::{Resource, Service};

/// Flat route table in discovery order
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    /// Resolved references: declared resources first, synthetic `api` last
    pub references: Vec<OperationReference>,
    /// Identities of every operation a declared resource claimed, routable or not
    pub claimed: HashSet<String>,
}

impl RouteTable {
    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn has_synthetic(&self) -> bool {
        self.references.iter().any(|r| r.owner.is_synthetic())
    }
}

/// Walks a [`Service`] and produces its [`RouteTable`]
#[derive(Debug, Clone, Default)]
pub struct RouteTableBuilder {
    resolver: OperationResolver,
}

impl RouteTableBuilder {
    pub fn new(resolver: OperationResolver) -> Self {
        Self { resolver }
    }

    pub fn build(&self, service: &Service) -> Result<RouteTable> {
        let mut table = RouteTable::default();
        // operation id -> identity of the resource that claimed it
        let mut owners: HashMap<String, String> = HashMap::new();

        for resource in &service.resources {
            self.visit_resource(resource, &mut table, &mut owners)?;
        }
        table.claimed = owners.into_keys().collect();

        let mut swept = HashSet::new();
        for operation in &service.operations {
            if table.claimed.contains(&operation.id) || !swept.insert(operation.id.as_str()) {
                continue;
            }
            if let Some(reference) = self.resolver.resolve(&Owner::Synthetic, operation)? {
                log::debug!("Route {} -> {}", reference.path, reference.qualified_name());
                table.references.push(reference);
            }
        }

        log::debug!(
            "Built route table for {}: {} routes, {} claimed operations",
            service.name,
            table.references.len(),
            table.claimed.len()
        );
        Ok(table)
    }

    fn visit_resource(
        &self,
        resource: &Resource,
        table: &mut RouteTable,
        owners: &mut HashMap<String, String>,
    ) -> Result<()> {
        let owner = Owner::Declared(resource.name.clone());

        for operation in &resource.operations {
            if let Some(first) = owners.get(&operation.id) {
                if first == resource.identity() {
                    continue;
                }
                return Err(Error::OperationBoundTwice {
                    operation: operation.id.clone(),
                    first: first.clone(),
                    second: resource.identity().to_string(),
                });
            }
            owners.insert(operation.id.clone(), resource.identity().to_string());

            if let Some(reference) = self.resolver.resolve(&owner, operation)? {
                log::debug!("Route {} -> {}", reference.path, reference.qualified_name());
                table.references.push(reference);
            }
        }

        for child in &resource.resources {
            self.visit_resource(child, table, owners)?;
        }
        Ok(())
    }
}
