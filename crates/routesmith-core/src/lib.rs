//! Routesmith Core Library
//!
//! Synthesizes an HTTP route table from a resource-oriented service model and
//! emits the glue code around it: route contracts, handler builders and
//! abstract resource controllers.
//!
//! The pipeline is split into pure stages ([`routes`], [`synthesis`],
//! [`artifacts`]) and an I/O layer ([`templates`], [`generate`]).

pub mod artifacts;
pub mod config;
pub mod error;
pub mod generate;
pub mod manifest;
pub mod model;
pub mod naming;
pub mod routes;
pub mod synthesis;
pub mod templates;

pub use crate::{
    artifacts::{Artifact, ArtifactKind},
    config::Config,
    error::{Error, Result},
    generate::{generate, GenerateOptions, GenerateReport},
    model::{Operation, Resource, Service, SmithyContext},
    routes::{GroupedModel, HandlerLocator, OperationReference, RouteTable},
    synthesis::{synthesize, Synthesis, SynthesisOptions},
    templates::{TemplateDir, TemplateKind, TemplateManager},
};
