//! Structured output records produced from the grouped route model.
//!
//! Each [`Artifact`] is one logical output: a type contract, an index, a
//! handler builder and so on. Records carry data only; the template layer in
//! [`crate::templates`] decides file names and syntax.

pub mod emitter;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::routes::OperationReference;

pub use emitter::emit;

/// Discriminant of an [`Artifact`], as named in template manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    RootIndex,
    RoutesIndex,
    RouteTable,
    ResourceReference,
    ResourceHandlers,
    RouteIndex,
    OperationUnion,
    RouteBinding,
    HandlerBase,
    HandlerBuilder,
    HandlerIndex,
    ControllerBase,
    Controller,
    ControllerIndex,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RootIndex => "root_index",
            Self::RoutesIndex => "routes_index",
            Self::RouteTable => "route_table",
            Self::ResourceReference => "resource_reference",
            Self::ResourceHandlers => "resource_handlers",
            Self::RouteIndex => "route_index",
            Self::OperationUnion => "operation_union",
            Self::RouteBinding => "route_binding",
            Self::HandlerBase => "handler_base",
            Self::HandlerBuilder => "handler_builder",
            Self::HandlerIndex => "handler_index",
            Self::ControllerBase => "controller_base",
            Self::Controller => "controller",
            Self::ControllerIndex => "controller_index",
        }
    }
}

/// Route table: resource key -> operation name -> reference fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTableArtifact {
    pub groups: Vec<RouteTableGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTableGroup {
    pub key: String,
    pub operations: Vec<OperationReference>,
}

/// Per-resource contract listing the resource's operation names.
///
/// Used both for the structural reference type and the handler-binding type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceContract {
    pub resource_key: String,
    pub type_name: String,
    pub operation_names: Vec<String>,
}

/// Aggregation of all per-resource contracts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteIndexArtifact {
    pub entries: Vec<RouteIndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteIndexEntry {
    pub key: String,
    pub reference_type: String,
    pub handlers_type: String,
}

/// Discriminated union of every operation name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationUnionArtifact {
    pub type_name: String,
    pub operation_names: Vec<String>,
}

/// Route-keyed join of the route table with the caller's handler factories
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteBindingArtifact {
    pub bindings: Vec<RouteBinding>,
}

/// One routable operation: `route` selects `<resource_key>.<operation_name>`
/// in both the route table and the handler factories
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteBinding {
    /// `METHOD /path`, with query literals when the operation has any
    pub route: String,
    pub resource_key: String,
    pub operation_name: String,
}

/// Glue binding a gateway handler, a business-logic operation and an
/// optional transformation into one callable handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerBuilderArtifact {
    pub operation_name: String,
    /// `operationName` with its first letter upper-cased, prefix of the SDK types
    pub type_prefix: String,
    pub builder_name: String,
    pub file_stem: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerIndexArtifact {
    pub builders: Vec<HandlerBuilderArtifact>,
}

/// Abstract extension point for one operation inside a resource controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerStub {
    pub operation_name: String,
    pub type_prefix: String,
    /// Abstract method the implementer supplies
    pub function_name: String,
    /// Concrete method wiring the function through the handler builder
    pub handler_method: String,
    pub builder_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerArtifact {
    pub resource_key: String,
    pub class_name: String,
    pub file_stem: String,
    pub stubs: Vec<ControllerStub>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerIndexArtifact {
    pub controllers: Vec<ControllerRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerRef {
    pub resource_key: String,
    pub class_name: String,
    pub file_stem: String,
}

/// One logical output artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum Artifact {
    RootIndex,
    RoutesIndex,
    RouteTable(RouteTableArtifact),
    ResourceReference(ResourceContract),
    ResourceHandlers(ResourceContract),
    RouteIndex(RouteIndexArtifact),
    OperationUnion(OperationUnionArtifact),
    RouteBinding(RouteBindingArtifact),
    HandlerBase,
    HandlerBuilder(HandlerBuilderArtifact),
    HandlerIndex(HandlerIndexArtifact),
    ControllerBase,
    Controller(ControllerArtifact),
    ControllerIndex(ControllerIndexArtifact),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::RootIndex => ArtifactKind::RootIndex,
            Self::RoutesIndex => ArtifactKind::RoutesIndex,
            Self::RouteTable(_) => ArtifactKind::RouteTable,
            Self::ResourceReference(_) => ArtifactKind::ResourceReference,
            Self::ResourceHandlers(_) => ArtifactKind::ResourceHandlers,
            Self::RouteIndex(_) => ArtifactKind::RouteIndex,
            Self::OperationUnion(_) => ArtifactKind::OperationUnion,
            Self::RouteBinding(_) => ArtifactKind::RouteBinding,
            Self::HandlerBase => ArtifactKind::HandlerBase,
            Self::HandlerBuilder(_) => ArtifactKind::HandlerBuilder,
            Self::HandlerIndex(_) => ArtifactKind::HandlerIndex,
            Self::ControllerBase => ArtifactKind::ControllerBase,
            Self::Controller(_) => ArtifactKind::Controller,
            Self::ControllerIndex(_) => ArtifactKind::ControllerIndex,
        }
    }

    /// Resource key this artifact belongs to, for `{resource}` in destinations
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::ResourceReference(c) | Self::ResourceHandlers(c) => Some(&c.resource_key),
            Self::Controller(c) => Some(&c.resource_key),
            _ => None,
        }
    }

    /// Operation name this artifact belongs to, for `{operation}` in destinations
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::HandlerBuilder(b) => Some(&b.operation_name),
            _ => None,
        }
    }

    /// The record's fields as a JSON object (empty for record-less artifacts)
    pub fn record(&self) -> serde_json::Result<Map<String, JsonValue>> {
        let value = match self {
            Self::RootIndex | Self::RoutesIndex | Self::HandlerBase | Self::ControllerBase => {
                return Ok(Map::new())
            }
            Self::RouteTable(r) => serde_json::to_value(r)?,
            Self::ResourceReference(r) | Self::ResourceHandlers(r) => serde_json::to_value(r)?,
            Self::RouteIndex(r) => serde_json::to_value(r)?,
            Self::OperationUnion(r) => serde_json::to_value(r)?,
            Self::RouteBinding(r) => serde_json::to_value(r)?,
            Self::HandlerBuilder(r) => serde_json::to_value(r)?,
            Self::HandlerIndex(r) => serde_json::to_value(r)?,
            Self::Controller(r) => serde_json::to_value(r)?,
            Self::ControllerIndex(r) => serde_json::to_value(r)?,
        };
        match value {
            JsonValue::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}
