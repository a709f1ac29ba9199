//! Route synthesis: model in, route table, grouped model and artifact records out.
//!
//! [`synthesize`] runs every pure stage in order (build, filter, collision
//! check, group, emit) and either returns the full result or the first error.
//! Nothing is written anywhere; see [`crate::generate`] for the I/O side.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::artifacts::{emit, Artifact};
use crate::error::{CollisionKind, Error, Result};
use crate::model::Service;
use crate::naming::first_lower;
use crate::routes::{
    group, GroupedModel, HandlerLocator, OperationReference, OperationResolver, Owner, RouteTable,
    RouteTableBuilder, SYNTHETIC_RESOURCE,
};

/// Knobs for a synthesis run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisOptions {
    #[serde(default)]
    pub locator: HandlerLocator,

    /// Operations to keep; empty keeps everything
    #[serde(default)]
    pub include_operations: Vec<String>,

    /// Operations to drop; wins over `include_operations`
    #[serde(default)]
    pub exclude_operations: Vec<String>,
}

impl SynthesisOptions {
    /// Whether a reference named `operation_name` survives filtering.
    ///
    /// Entries are compared after lower-casing their first character, so both
    /// `GetOrder` and `getOrder` select the `getOrder` reference.
    pub fn is_selected(&self, operation_name: &str) -> bool {
        let matches = |entry: &String| first_lower(entry) == operation_name;
        if self.exclude_operations.iter().any(matches) {
            return false;
        }
        self.include_operations.is_empty() || self.include_operations.iter().any(matches)
    }
}

/// Everything derived from one service
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub service_name: String,
    /// Route table after filtering
    pub route_table: RouteTable,
    pub grouped: GroupedModel,
    pub artifacts: Vec<Artifact>,
}

/// Synthesize the route table and artifact records for `service`
pub fn synthesize(service: &Service, options: &SynthesisOptions) -> Result<Synthesis> {
    let builder = RouteTableBuilder::new(OperationResolver::new(options.locator.clone()));
    let mut route_table = builder.build(service)?;

    let before = route_table.references.len();
    route_table
        .references
        .retain(|r| options.is_selected(&r.operation_name));
    if route_table.references.len() != before {
        log::debug!(
            "Filtered out {} of {} routes",
            before - route_table.references.len(),
            before
        );
    }
    for entry in &options.include_operations {
        let name = first_lower(entry);
        if !route_table.references.iter().any(|r| r.operation_name == name) {
            log::warn!("Included operation '{}' does not match any route", entry);
        }
    }

    check_reserved_resource(&route_table.references)?;
    check_collisions(&route_table.references)?;

    let grouped = group(&route_table.references);
    let artifacts = emit(&grouped);

    log::info!(
        "Synthesized {} routes in {} resource groups for service {}",
        route_table.len(),
        grouped.len(),
        service.name
    );

    Ok(Synthesis {
        service_name: service.name.clone(),
        route_table,
        grouped,
        artifacts,
    })
}

/// A declared `api` resource may not share its group with synthetic operations
fn check_reserved_resource(references: &[OperationReference]) -> Result<()> {
    let declared = references.iter().find(|r| {
        matches!(&r.owner, Owner::Declared(name) if name.eq_ignore_ascii_case(SYNTHETIC_RESOURCE))
    });
    let synthetic = references.iter().find(|r| r.owner.is_synthetic());

    match (declared, synthetic) {
        (Some(declared), Some(synthetic)) => Err(Error::ReservedResource {
            resource: declared.owner.name().to_string(),
            operation: synthetic.operation_id.clone(),
        }),
        _ => Ok(()),
    }
}

/// Reject two references deriving the same operation name, function id or route.
///
/// Routes compare by [`OperationReference::route_key`]: label names are ignored
/// and query literals take part, so `/orders/{id}` clashes with
/// `/orders/{orderId}` while `/orders?status=open` and `/orders?status=closed`
/// do not.
fn check_collisions(references: &[OperationReference]) -> Result<()> {
    let keys: [(CollisionKind, fn(&OperationReference) -> &str); 3] = [
        (CollisionKind::OperationName, |r| r.operation_name.as_str()),
        (CollisionKind::FunctionId, |r| r.function_id.as_str()),
        (CollisionKind::Path, |r| r.route_key.as_str()),
    ];

    for (kind, key) in keys {
        let mut seen: HashMap<&str, &OperationReference> = HashMap::new();
        for reference in references {
            if let Some(first) = seen.insert(key(reference), reference) {
                return Err(Error::Collision {
                    kind,
                    value: key(reference).to_string(),
                    first: describe(first),
                    second: describe(reference),
                });
            }
        }
    }
    Ok(())
}

/// `resource/OperationId` with the declared resource casing
fn describe(reference: &OperationReference) -> String {
    format!("{}/{}", reference.owner.name(), reference.operation_id)
}
