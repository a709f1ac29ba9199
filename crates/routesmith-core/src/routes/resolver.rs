//! Resolution of a single operation into its route-table entry.

use serde::{Deserialize, Serialize};

use super::path::encode;
use crate::error::{Error, Result};
use crate::model::{HttpBinding, Operation};
use crate::naming::{first_lower, to_kebab_case};

/// Resource name used for operations that no declared resource owns
pub const SYNTHETIC_RESOURCE: &str = "api";

/// Who owns an operation in the route table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    /// A resource declared in the model, with its declared casing
    Declared(String),
    /// The fallback `api` resource for ungrouped operations
    Synthetic,
}

impl Owner {
    /// Declared name, or `api` for the synthetic owner
    pub fn name(&self) -> &str {
        match self {
            Owner::Declared(name) => name,
            Owner::Synthetic => SYNTHETIC_RESOURCE,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Owner::Synthetic)
    }

    /// Case-normalized grouping key
    pub fn key(&self) -> String {
        self.name().to_lowercase()
    }
}

/// Pattern used to derive handler locators.
///
/// `{resource}` and `{operation}` are replaced by the lower-cased resource and
/// operation names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerLocator {
    pattern: String,
}

impl HandlerLocator {
    pub const DEFAULT_PATTERN: &'static str = "{resource}/{operation}";

    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn locate(&self, resource: &str, operation: &str) -> String {
        self.pattern
            .replace("{resource}", &resource.to_lowercase())
            .replace("{operation}", &operation.to_lowercase())
    }
}

impl Default for HandlerLocator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATTERN)
    }
}

/// Route-table entry for one routable operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReference {
    /// `<METHOD> <encoded-uri>`
    pub path: String,
    pub handler_locator: String,
    pub function_id: String,
    pub operation_name: String,
    /// Owning resource name, lower-cased
    pub parent_resource: String,
    /// Constant query literals the route requires
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<String>,
    /// Method, label-blind path shape and sorted query; equal keys are the same runtime route
    #[serde(skip)]
    pub route_key: String,
    #[serde(skip)]
    pub owner: Owner,
    /// Identity of the source operation
    #[serde(skip)]
    pub operation_id: String,
}

impl OperationReference {
    /// `resource/OperationName`, used in diagnostics
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.parent_resource, self.operation_name)
    }

    /// `path` plus its query literals, e.g. `GET /orders?status=open`
    pub fn route(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query.join("&"))
        }
    }
}

/// Collision key of a binding: labels reduced to their kind, query literals sorted
pub fn route_key(http: &HttpBinding) -> String {
    let mut key = http.method.to_uppercase();
    key.push(' ');
    if http.segments.is_empty() {
        key.push('/');
    }
    for segment in &http.segments {
        key.push('/');
        key.push_str(segment.shape());
    }
    if !http.query.is_empty() {
        let mut query: Vec<&str> = http.query.iter().map(String::as_str).collect();
        query.sort_unstable();
        key.push('?');
        key.push_str(&query.join("&"));
    }
    key
}

/// Turns model operations into [`OperationReference`]s
#[derive(Debug, Clone, Default)]
pub struct OperationResolver {
    locator: HandlerLocator,
}

impl OperationResolver {
    pub fn new(locator: HandlerLocator) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &HandlerLocator {
        &self.locator
    }

    /// Resolve `operation` as owned by `owner`.
    ///
    /// Returns `Ok(None)` when the operation has no HTTP binding.
    pub fn resolve(
        &self,
        owner: &Owner,
        operation: &Operation,
    ) -> Result<Option<OperationReference>> {
        if operation.name.is_empty() {
            return Err(Error::EmptyName {
                resource: owner.name().to_string(),
                operation_id: operation.id.clone(),
            });
        }
        let Some(http) = &operation.http else {
            log::debug!(
                "Skipping {}/{}: no HTTP binding",
                owner.name(),
                operation.name
            );
            return Ok(None);
        };

        let uri = encode(&http.segments);
        let uri = if uri.is_empty() { "/".to_string() } else { uri };

        Ok(Some(OperationReference {
            path: format!("{} {}", http.method.to_uppercase(), uri),
            handler_locator: self.locator.locate(owner.name(), &operation.name),
            function_id: to_kebab_case(&operation.name),
            operation_name: first_lower(&operation.name),
            parent_resource: owner.key(),
            query: http.query.clone(),
            route_key: route_key(http),
            owner: owner.clone(),
            operation_id: operation.id.clone(),
        }))
    }
}
