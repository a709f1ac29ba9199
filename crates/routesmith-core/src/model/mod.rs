//! In-memory service model handed to the synthesis core.
//!
//! The model is a read-only containment tree: a [`Service`] owns resources and
//! top-level operations, a [`Resource`] owns operations and child resources.
//! Providers (see [`smithy`]) resolve their own reference graphs into this
//! tree, so the core can assume it is finite and acyclic.

pub mod smithy;

use serde::{Deserialize, Serialize};

pub use smithy::SmithyContext;

/// One component of a URI pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Segment {
    Literal(String),
    Label(String),
    GreedyLabel(String),
    NonGreedyLabel(String),
    Other(String),
}

impl Segment {
    /// Parse the path part of a URI pattern such as `/orders/{orderId}/items/{rest+}`.
    ///
    /// Anything after `?` is a query literal and is not part of the path.
    /// Empty segments (leading, trailing or doubled slashes) are dropped.
    pub fn parse_uri(uri: &str) -> Vec<Segment> {
        let path = uri.split('?').next().unwrap_or_default();
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect()
    }

    /// Query literals of a URI pattern (`/orders?status=open&full` -> `["status=open", "full"]`)
    pub fn parse_query(uri: &str) -> Vec<String> {
        uri.split_once('?')
            .map(|(_, query)| {
                query
                    .split('&')
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Label segments compare by position only; their names do not matter to a router
    pub fn shape(&self) -> &str {
        match self {
            Segment::Literal(text) | Segment::Other(text) => text,
            Segment::Label(_) | Segment::NonGreedyLabel(_) => "{}",
            Segment::GreedyLabel(_) => "{+}",
        }
    }

    fn parse(raw: &str) -> Segment {
        match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(label) => match label.strip_suffix('+') {
                Some(greedy) => Segment::GreedyLabel(greedy.to_string()),
                None => Segment::Label(label.to_string()),
            },
            None => Segment::Literal(raw.to_string()),
        }
    }
}

/// HTTP method, URI segments and query literals an operation is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpBinding {
    pub method: String,
    pub segments: Vec<Segment>,
    /// Constant query parameters the route requires, e.g. `status=open`
    #[serde(default)]
    pub query: Vec<String>,
}

impl HttpBinding {
    pub fn new(method: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            method: method.into(),
            segments,
            query: Vec::new(),
        }
    }

    /// Build a binding from a URI pattern string
    pub fn from_uri(method: impl Into<String>, uri: &str) -> Self {
        Self {
            query: Segment::parse_query(uri),
            ..Self::new(method, Segment::parse_uri(uri))
        }
    }
}

/// A named unit of service behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Identity used to decide whether a resource already claimed this operation
    pub id: String,
    /// Declared name, e.g. `GetOrder`
    pub name: String,
    /// HTTP binding; operations without one are not routable
    #[serde(default)]
    pub http: Option<HttpBinding>,
}

impl Operation {
    /// Create an unbound operation whose identity is its name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            http: None,
        }
    }

    /// Override the operation identity (e.g. with a fully qualified shape id)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Bind the operation to `method` and the URI pattern `uri`
    pub fn bound(mut self, method: impl Into<String>, uri: &str) -> Self {
        self.http = Some(HttpBinding::from_uri(method, uri));
        self
    }
}

/// A named grouping node that owns operations and possibly child resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Identity, e.g. a fully qualified shape id; empty means the name
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// The id, falling back to the name when no id was given
    pub fn identity(&self) -> &str {
        if self.id.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }
}

/// Root of a service model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Operations bound directly to the service
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }
}
