//! Route-table synthesis: path encoding, per-operation resolution, the
//! service walk, and grouping by owning resource.

pub mod group;
pub mod path;
pub mod resolver;
pub mod table;

pub use group::{group, GroupedModel, ResourceGroup};
pub use path::encode;
pub use resolver::{
    route_key, HandlerLocator, OperationReference, OperationResolver, Owner, SYNTHETIC_RESOURCE,
};
pub use table::{RouteTable, RouteTableBuilder};
