//! Derivation of artifact records from a [`GroupedModel`].
//!
//! Resource-level names are `first_upper(resource key) + suffix`, operation
//! level names are `operation name + suffix`. No I/O happens here.

use std::collections::HashSet;

use super::{
    Artifact, ControllerArtifact, ControllerIndexArtifact, ControllerRef, ControllerStub,
    HandlerBuilderArtifact, HandlerIndexArtifact, OperationUnionArtifact, ResourceContract,
    RouteBinding, RouteBindingArtifact, RouteIndexArtifact, RouteIndexEntry, RouteTableArtifact,
    RouteTableGroup,
};
use crate::naming::first_upper;
use crate::routes::{GroupedModel, OperationReference, ResourceGroup};

pub const REFERENCE_SUFFIX: &str = "Reference";
pub const HANDLERS_SUFFIX: &str = "ResourceOperationHandlers";
pub const CONTROLLER_SUFFIX: &str = "Controller";
pub const BUILDER_SUFFIX: &str = "HandlerBuilder";
pub const HANDLER_SUFFIX: &str = "Handler";
pub const FUNCTION_SUFFIX: &str = "Function";
pub const OPERATION_UNION_TYPE: &str = "OperationName";

/// Produce every artifact record for `model`, in emission order
pub fn emit(model: &GroupedModel) -> Vec<Artifact> {
    let groups = model.groups();
    let mut artifacts = vec![
        Artifact::RootIndex,
        Artifact::RoutesIndex,
        Artifact::RouteTable(route_table(groups)),
    ];

    artifacts.extend(groups.iter().map(|g| {
        Artifact::ResourceReference(resource_contract(g, REFERENCE_SUFFIX))
    }));
    artifacts.extend(groups.iter().map(|g| {
        Artifact::ResourceHandlers(resource_contract(g, HANDLERS_SUFFIX))
    }));
    artifacts.push(Artifact::RouteIndex(route_index(groups)));
    artifacts.push(Artifact::OperationUnion(operation_union(model)));
    artifacts.push(Artifact::RouteBinding(route_binding(model)));

    let builders: Vec<HandlerBuilderArtifact> = model.references().map(handler_builder).collect();
    artifacts.push(Artifact::HandlerBase);
    artifacts.extend(builders.iter().cloned().map(Artifact::HandlerBuilder));
    artifacts.push(Artifact::HandlerIndex(HandlerIndexArtifact { builders }));

    let controllers: Vec<ControllerArtifact> = groups.iter().map(controller).collect();
    let index = ControllerIndexArtifact {
        controllers: controllers
            .iter()
            .map(|c| ControllerRef {
                resource_key: c.resource_key.clone(),
                class_name: c.class_name.clone(),
                file_stem: c.file_stem.clone(),
            })
            .collect(),
    };
    artifacts.push(Artifact::ControllerBase);
    artifacts.extend(controllers.into_iter().map(Artifact::Controller));
    artifacts.push(Artifact::ControllerIndex(index));

    log::debug!(
        "Emitted {} artifacts for {} resource groups",
        artifacts.len(),
        groups.len()
    );
    artifacts
}

fn route_table(groups: &[ResourceGroup]) -> RouteTableArtifact {
    RouteTableArtifact {
        groups: groups
            .iter()
            .map(|g| RouteTableGroup {
                key: g.key.clone(),
                operations: g.operations.clone(),
            })
            .collect(),
    }
}

fn resource_type(group: &ResourceGroup, suffix: &str) -> String {
    format!("{}{}", first_upper(&group.key), suffix)
}

fn resource_contract(group: &ResourceGroup, suffix: &str) -> ResourceContract {
    ResourceContract {
        resource_key: group.key.clone(),
        type_name: resource_type(group, suffix),
        operation_names: group
            .operations
            .iter()
            .map(|r| r.operation_name.clone())
            .collect(),
    }
}

fn route_index(groups: &[ResourceGroup]) -> RouteIndexArtifact {
    RouteIndexArtifact {
        entries: groups
            .iter()
            .map(|g| RouteIndexEntry {
                key: g.key.clone(),
                reference_type: resource_type(g, REFERENCE_SUFFIX),
                handlers_type: resource_type(g, HANDLERS_SUFFIX),
            })
            .collect(),
    }
}

fn operation_union(model: &GroupedModel) -> OperationUnionArtifact {
    let mut seen = HashSet::new();
    OperationUnionArtifact {
        type_name: OPERATION_UNION_TYPE.to_string(),
        operation_names: model
            .references()
            .filter(|r| seen.insert(r.operation_name.as_str()))
            .map(|r| r.operation_name.clone())
            .collect(),
    }
}

fn route_binding(model: &GroupedModel) -> RouteBindingArtifact {
    RouteBindingArtifact {
        bindings: model
            .references()
            .map(|r| RouteBinding {
                route: r.route(),
                resource_key: r.parent_resource.clone(),
                operation_name: r.operation_name.clone(),
            })
            .collect(),
    }
}

fn handler_builder(reference: &OperationReference) -> HandlerBuilderArtifact {
    let name = &reference.operation_name;
    HandlerBuilderArtifact {
        operation_name: name.clone(),
        type_prefix: first_upper(name),
        builder_name: format!("{}{}", name, BUILDER_SUFFIX),
        file_stem: format!("{}{}", name, HANDLER_SUFFIX),
    }
}

fn controller(group: &ResourceGroup) -> ControllerArtifact {
    ControllerArtifact {
        resource_key: group.key.clone(),
        class_name: resource_type(group, CONTROLLER_SUFFIX),
        file_stem: format!("{}{}", group.key, CONTROLLER_SUFFIX),
        stubs: group
            .operations
            .iter()
            .map(|r| {
                let name = &r.operation_name;
                ControllerStub {
                    operation_name: name.clone(),
                    type_prefix: first_upper(name),
                    function_name: format!("{}{}", name, FUNCTION_SUFFIX),
                    handler_method: format!("{}{}", name, HANDLER_SUFFIX),
                    builder_name: format!("{}{}", name, BUILDER_SUFFIX),
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactKind;
    use crate::model::{Operation, Resource, Service};
    use crate::routes::{group, RouteTableBuilder};

    fn shop_model() -> GroupedModel {
        let service = Service::new("Shop")
            .with_resource(
                Resource::new("Order")
                    .with_operation(Operation::new("GetOrder").bound("GET", "/orders/{orderId}"))
                    .with_operation(Operation::new("ListOrders").bound("GET", "/orders")),
            )
            .with_operation(Operation::new("Ping").bound("GET", "/ping"));
        let table = RouteTableBuilder::default().build(&service).expect("table");
        group(&table.references)
    }

    #[test]
    fn test_emission_order() {
        let kinds: Vec<ArtifactKind> = emit(&shop_model()).iter().map(Artifact::kind).collect();
        use ArtifactKind::*;
        assert_eq!(
            kinds,
            vec![
                RootIndex,
                RoutesIndex,
                RouteTable,
                ResourceReference,
                ResourceReference,
                ResourceHandlers,
                ResourceHandlers,
                RouteIndex,
                OperationUnion,
                RouteBinding,
                HandlerBase,
                HandlerBuilder,
                HandlerBuilder,
                HandlerBuilder,
                HandlerIndex,
                ControllerBase,
                Controller,
                Controller,
                ControllerIndex,
            ]
        );
    }

    #[test]
    fn test_resource_level_names() {
        let artifacts = emit(&shop_model());
        let contracts: Vec<&ResourceContract> = artifacts
            .iter()
            .filter_map(|a| match a {
                Artifact::ResourceReference(c) | Artifact::ResourceHandlers(c) => Some(c),
                _ => None,
            })
            .collect();
        let type_names: Vec<&str> = contracts.iter().map(|c| c.type_name.as_str()).collect();
        assert_eq!(
            type_names,
            vec![
                "OrderReference",
                "ApiReference",
                "OrderResourceOperationHandlers",
                "ApiResourceOperationHandlers"
            ]
        );
        assert_eq!(contracts[0].operation_names, vec!["getOrder", "listOrders"]);
    }

    #[test]
    fn test_operation_level_names() {
        let artifacts = emit(&shop_model());
        let Some(Artifact::Controller(order)) =
            artifacts.iter().find(|a| a.kind() == ArtifactKind::Controller)
        else {
            panic!("controller artifact missing");
        };
        assert_eq!(order.class_name, "OrderController");
        assert_eq!(order.file_stem, "orderController");
        assert_eq!(order.stubs.len(), 2);
        let stub = &order.stubs[0];
        assert_eq!(stub.function_name, "getOrderFunction");
        assert_eq!(stub.handler_method, "getOrderHandler");
        assert_eq!(stub.builder_name, "getOrderHandlerBuilder");
        assert_eq!(stub.type_prefix, "GetOrder");

        let builder = artifacts
            .iter()
            .find_map(|a| match a {
                Artifact::HandlerBuilder(b) if b.operation_name == "ping" => Some(b),
                _ => None,
            })
            .expect("ping builder");
        assert_eq!(builder.builder_name, "pingHandlerBuilder");
        assert_eq!(builder.file_stem, "pingHandler");
    }

    #[test]
    fn test_one_builder_and_stub_per_operation() {
        let model = shop_model();
        let artifacts = emit(&model);
        let builders = artifacts
            .iter()
            .filter(|a| a.kind() == ArtifactKind::HandlerBuilder)
            .count();
        let stubs: usize = artifacts
            .iter()
            .map(|a| match a {
                Artifact::Controller(c) => c.stubs.len(),
                _ => 0,
            })
            .sum();
        let operations = model.references().count();
        assert_eq!(builders, operations);
        assert_eq!(stubs, operations);
    }

    #[test]
    fn test_operation_union_collapses_duplicates() {
        let mut model_refs: Vec<_> = shop_model().references().cloned().collect();
        let mut duplicate = model_refs[0].clone();
        duplicate.path = "GET /other".into();
        model_refs.push(duplicate);
        let artifacts = emit(&group(&model_refs));
        let union = artifacts
            .iter()
            .find_map(|a| match a {
                Artifact::OperationUnion(u) => Some(u),
                _ => None,
            })
            .expect("union");
        assert_eq!(union.type_name, "OperationName");
        assert_eq!(union.operation_names, vec!["getOrder", "listOrders", "ping"]);
    }

    #[test]
    fn test_empty_model_still_emits_scaffolding() {
        let artifacts = emit(&GroupedModel::default());
        let kinds: Vec<ArtifactKind> = artifacts.iter().map(Artifact::kind).collect();
        use ArtifactKind::*;
        assert_eq!(
            kinds,
            vec![
                RootIndex,
                RoutesIndex,
                RouteTable,
                RouteIndex,
                OperationUnion,
                RouteBinding,
                HandlerBase,
                HandlerIndex,
                ControllerBase,
                ControllerIndex,
            ]
        );
        assert!(artifacts.iter().all(|a| a.resource().is_none()));
    }

    #[test]
    fn test_route_bindings_follow_grouped_order() {
        let service = Service::new("Shop")
            .with_resource(
                Resource::new("Order")
                    .with_operation(Operation::new("GetOrder").bound("GET", "/orders/{orderId}"))
                    .with_operation(
                        Operation::new("ListOpenOrders").bound("GET", "/orders?status=open"),
                    ),
            )
            .with_operation(Operation::new("Ping").bound("GET", "/ping"));
        let table = RouteTableBuilder::default().build(&service).expect("table");
        let artifacts = emit(&group(&table.references));
        let bindings = artifacts
            .iter()
            .find_map(|a| match a {
                Artifact::RouteBinding(b) => Some(&b.bindings),
                _ => None,
            })
            .expect("route binding");

        let rows: Vec<(&str, &str, &str)> = bindings
            .iter()
            .map(|b| {
                (
                    b.route.as_str(),
                    b.resource_key.as_str(),
                    b.operation_name.as_str(),
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                ("GET /orders/{orderId}", "order", "getOrder"),
                ("GET /orders?status=open", "order", "listOpenOrders"),
                ("GET /ping", "api", "ping"),
            ]
        );
    }

    #[test]
    fn test_record_serialization() {
        let artifacts = emit(&shop_model());
        let table = artifacts
            .iter()
            .find(|a| a.kind() == ArtifactKind::RouteTable)
            .expect("route table")
            .record()
            .expect("record");
        let first = &table["groups"][0]["operations"][0];
        assert_eq!(first["path"], "GET /orders/{orderId}");
        assert_eq!(first["handlerLocator"], "order/getorder");
        assert!(Artifact::HandlerBase.record().expect("record").is_empty());
    }
}
