//! Smithy JSON AST loading and resolution into the service model.
//!
//! This module loads a Smithy model in its JSON AST form and resolves the
//! shape reference graph of one service into the containment tree from
//! [`crate::model`]. Only the parts the route synthesis needs are read:
//! service/resource bindings, operation names and the `smithy.api#http` trait.
//!
//! # Examples
//!
//! ```no_run
//! use routesmith_core::model::SmithyContext;
//! use routesmith_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let model = SmithyContext::from_file("model/shop.json").await?;
//! for id in model.service_ids() {
//!     println!("service: {}", id);
//! }
//! let service = model.service(Some("Shop"))?;
//! println!("{} resources", service.resources.len());
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::Path;

use crate::model::{HttpBinding, Operation, Resource, Service};
use crate::Error;

// External imports (alphabetized)
use serde_json::{Map, Value as JsonValue};
use tokio::fs;
use url::Url;

const HTTP_TRAIT: &str = "smithy.api#http";

/// Resource members holding operations, in binding order
const RESOURCE_OPERATION_MEMBERS: &[&str] = &["create", "put", "read", "update", "delete", "list"];
const RESOURCE_OPERATION_LISTS: &[&str] = &["operations", "collectionOperations"];

type Shape = Map<String, JsonValue>;

/// A loaded Smithy JSON AST document
#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct SmithyContext {
    /// The raw JSON value of the model
    pub json: JsonValue,
}

impl SmithyContext {
    /// Load a model from a file or an http(s) URL
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> crate::Result<Self> {
        let location = location.as_ref();

        match Url::parse(location) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                Self::from_url(location).await
            }
            _ => Self::from_file(location).await,
        }
    }

    /// Load a model from a file (JSON, or the same document written as YAML)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse_content(&content).map_err(|e| {
            Error::model(format!(
                "Failed to parse Smithy model at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Fetch a model from a URL
    pub async fn from_url(url: &str) -> crate::Result<Self> {
        let response = reqwest::get(url).await.map_err(|e| {
            Error::model(format!("Failed to fetch Smithy model from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::model(format!(
                "Failed to fetch Smithy model from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await.map_err(|e| {
            Error::model(format!("Failed to read response from {}: {}", url, e))
        })?;

        Self::parse_content(&content).map_err(|e| {
            Error::model(format!("Failed to parse Smithy model from {}: {}", url, e))
        })
    }

    /// Parse content as either JSON or YAML
    pub fn parse_content(content: &str) -> Result<Self, String> {
        let json: JsonValue = match serde_json::from_str(content) {
            Ok(json) => json,
            Err(_) => serde_yaml::from_str(content)
                .map_err(|_| "content is neither valid JSON nor YAML".to_string())?,
        };

        if !json.get("shapes").is_some_and(JsonValue::is_object) {
            return Err("missing 'shapes' object".to_string());
        }
        Ok(Self { json })
    }

    /// Get a reference to the raw JSON value
    pub fn as_json(&self) -> &JsonValue {
        &self.json
    }

    /// The Smithy IDL version declared by the document
    pub fn version(&self) -> Option<&str> {
        self.json.get("smithy")?.as_str()
    }

    /// Ids of all service shapes, sorted
    pub fn service_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .shapes()
            .map(|shapes| {
                shapes
                    .iter()
                    .filter(|(_, shape)| shape.as_object().and_then(shape_type) == Some("service"))
                    .map(|(id, _)| id.as_str())
                    .collect()
            })
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Resolve one service into the containment tree.
    ///
    /// `selector` matches either the full shape id or the bare service name.
    /// Without a selector the model must define exactly one service.
    pub fn service(&self, selector: Option<&str>) -> crate::Result<Service> {
        let ids = self.service_ids();
        let id = match selector {
            Some(wanted) => ids
                .iter()
                .find(|id| **id == wanted || shape_name(id) == wanted)
                .copied()
                .ok_or_else(|| {
                    Error::model(format!(
                        "service '{}' not found (available: {})",
                        wanted,
                        ids.join(", ")
                    ))
                })?,
            None => match ids.as_slice() {
                [only] => *only,
                [] => return Err(Error::model("model defines no service shape")),
                many => {
                    return Err(Error::model(format!(
                        "model defines {} services, select one of: {}",
                        many.len(),
                        many.join(", ")
                    )))
                }
            },
        };

        let shape = self.expect_shape(id, "service", "<selector>")?;
        let mut service = Service::new(shape_name(id));

        for target in targets(shape, "resources") {
            let mut visiting = Vec::new();
            service
                .resources
                .push(self.resource(&target, id, &mut visiting)?);
        }
        for target in targets(shape, "operations") {
            service.operations.push(self.operation(&target, id)?);
        }

        log::debug!(
            "Resolved service {} ({} resources, {} top-level operations)",
            id,
            service.resources.len(),
            service.operations.len()
        );
        Ok(service)
    }

    fn resource(
        &self,
        id: &str,
        referenced_by: &str,
        visiting: &mut Vec<String>,
    ) -> crate::Result<Resource> {
        if visiting.iter().any(|v| v == id) {
            visiting.push(id.to_string());
            return Err(Error::model(format!(
                "resource cycle: {}",
                visiting.join(" -> ")
            )));
        }
        let shape = self.expect_shape(id, "resource", referenced_by)?;
        visiting.push(id.to_string());

        let mut resource = Resource::new(shape_name(id)).with_id(id);
        let mut operation_ids: Vec<String> = Vec::new();
        let members = RESOURCE_OPERATION_MEMBERS
            .iter()
            .filter_map(|member| target(shape, member))
            .chain(
                RESOURCE_OPERATION_LISTS
                    .iter()
                    .flat_map(|list| targets(shape, list)),
            );
        for op_id in members {
            if !operation_ids.contains(&op_id) {
                operation_ids.push(op_id);
            }
        }
        for op_id in &operation_ids {
            resource.operations.push(self.operation(op_id, id)?);
        }
        for child in targets(shape, "resources") {
            resource.resources.push(self.resource(&child, id, visiting)?);
        }

        visiting.pop();
        Ok(resource)
    }

    fn operation(&self, id: &str, referenced_by: &str) -> crate::Result<Operation> {
        let shape = self.expect_shape(id, "operation", referenced_by)?;
        let mut operation = Operation::new(shape_name(id)).with_id(id);

        if let Some(http) = shape.get("traits").and_then(|t| t.get(HTTP_TRAIT)) {
            let method = http.get("method").and_then(JsonValue::as_str);
            let uri = http.get("uri").and_then(JsonValue::as_str);
            match (method, uri) {
                (Some(method), Some(uri)) => {
                    operation.http = Some(HttpBinding::from_uri(method, uri));
                }
                _ => {
                    return Err(Error::model(format!(
                        "operation '{}' has an {} trait without 'method' and 'uri'",
                        id, HTTP_TRAIT
                    )))
                }
            }
        }
        Ok(operation)
    }

    fn shapes(&self) -> Option<&Map<String, JsonValue>> {
        self.json.get("shapes")?.as_object()
    }

    fn expect_shape(&self, id: &str, expected: &str, referenced_by: &str) -> crate::Result<&Shape> {
        let shape = self
            .shapes()
            .and_then(|shapes| shapes.get(id))
            .and_then(JsonValue::as_object)
            .ok_or_else(|| {
                Error::model(format!(
                    "shape '{}' referenced by '{}' is not defined",
                    id, referenced_by
                ))
            })?;
        match shape_type(shape) {
            Some(kind) if kind == expected => Ok(shape),
            other => Err(Error::model(format!(
                "shape '{}' referenced by '{}' is a {}, expected {}",
                id,
                referenced_by,
                other.unwrap_or("shape without type"),
                expected
            ))),
        }
    }
}

fn shape_type(shape: &Shape) -> Option<&str> {
    shape.get("type")?.as_str()
}

/// The name part of a shape id (`example.shop#GetOrder` -> `GetOrder`)
fn shape_name(id: &str) -> &str {
    id.rsplit_once('#').map(|(_, name)| name).unwrap_or(id)
}

fn target(shape: &Shape, member: &str) -> Option<String> {
    shape
        .get(member)?
        .get("target")?
        .as_str()
        .map(String::from)
}

fn targets(shape: &Shape, member: &str) -> Vec<String> {
    shape
        .get(member)
        .and_then(JsonValue::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|r| r.get("target").and_then(JsonValue::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
