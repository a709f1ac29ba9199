//! Configuration for a routesmith generation run.
//!
//! A `Config` can be built in code or loaded from a file. Files ending in
//! `.json` are read as JSON; anything else is read as YAML.
//!
//! # Examples
//!
//! ```no_run
//! use routesmith_core::config::Config;
//!
//! let mut config = Config::new("model.json", "generated");
//! config.service = Some("example.shop#Shop".to_string());
//! config.exclude_operations.push("Ping".to_string());
//! ```

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

use crate::routes::HandlerLocator;
use crate::synthesis::SynthesisOptions;
use crate::templates::TemplateKind;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Configuration for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path or URL of the service model (Smithy JSON AST)
    pub model_path: String,

    /// Service shape to generate for, by full id or bare name
    #[serde(default)]
    pub service: Option<String>,

    /// Output directory for generated files
    pub output_dir: String,

    #[serde(default)]
    pub template_kind: TemplateKind,

    /// Template directory overriding discovery
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    #[serde(default)]
    pub handler_locator: HandlerLocator,

    #[serde(default)]
    pub include_operations: Vec<String>,

    #[serde(default)]
    pub exclude_operations: Vec<String>,
}

impl Config {
    pub fn new(model_path: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            service: None,
            output_dir: output_dir.into(),
            template_kind: TemplateKind::default(),
            template_dir: None,
            handler_locator: HandlerLocator::default(),
            include_operations: Vec::new(),
            exclude_operations: Vec::new(),
        }
    }

    /// Load configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config = if is_json(path) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        fs::write(path, content).await?;
        Ok(())
    }

    /// Options for the pure synthesis stage
    pub fn synthesis_options(&self) -> SynthesisOptions {
        SynthesisOptions {
            locator: self.handler_locator.clone(),
            include_operations: self.include_operations.clone(),
            exclude_operations: self.exclude_operations.clone(),
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
