//! Manifest format for template sets.
//!
//! A manifest (`manifest.yaml` or `manifest.toml`) maps each artifact kind to a
//! template and a destination path, and lists optional shell hooks.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

use crate::artifacts::{Artifact, ArtifactKind};
use crate::error::{Error, Result};

// External imports (alphabetized)
use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;
use tokio::fs;

/// Root manifest structure of a template set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// Target language of the generated files (e.g. "typescript")
    #[serde(default)]
    pub language: String,

    /// One entry per rendered artifact kind
    #[serde(default)]
    pub files: Vec<TemplateFile>,

    #[serde(default)]
    pub hooks: TemplateHooks,
}

/// Binds an artifact kind to a template source and a destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateFile {
    pub artifact: ArtifactKind,

    /// Template path relative to the template directory
    pub source: String,

    /// Output path relative to the output directory.
    ///
    /// May contain `{service}`, `{resource}` and `{operation}`.
    pub destination: String,

    /// Extra variables for the template
    #[serde(default)]
    pub context: serde_json::Value,
}

/// Shell commands run around generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateHooks {
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub pre_generate: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_commands")]
    pub post_generate: Vec<String>,
}

fn default_version() -> String {
    String::from("0.1.0")
}

impl TemplateManifest {
    /// Load `manifest.yaml`, or `manifest.toml` when there is no YAML manifest
    pub async fn load_from_dir(template_dir: &Path) -> Result<Self> {
        let yaml_path = template_dir.join("manifest.yaml");
        let toml_path = template_dir.join("manifest.toml");

        if fs::try_exists(&yaml_path).await? {
            let content = fs::read_to_string(&yaml_path).await?;
            Self::from_yaml(&content).map_err(|e| {
                Error::template(format!(
                    "Invalid template manifest at {}: {}",
                    yaml_path.display(),
                    e
                ))
            })
        } else if fs::try_exists(&toml_path).await? {
            let content = fs::read_to_string(&toml_path).await?;
            toml::from_str(&content).map_err(|e| {
                Error::template(format!(
                    "Invalid template manifest at {}: {}",
                    toml_path.display(),
                    e
                ))
            })
        } else {
            Err(Error::template(format!(
                "No manifest.yaml or manifest.toml in {}",
                template_dir.display()
            )))
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Entries rendering `kind`, in manifest order
    pub fn files_for(&self, kind: ArtifactKind) -> impl Iterator<Item = &TemplateFile> {
        self.files.iter().filter(move |f| f.artifact == kind)
    }
}

impl TemplateFile {
    /// Destination of `artifact` with placeholders filled in.
    ///
    /// `{service}` is the lower-cased service name. Using `{resource}` or
    /// `{operation}` for an artifact that has no such value is an error.
    pub fn destination_for(&self, service: &str, artifact: &Artifact) -> Result<PathBuf> {
        let mut destination = self.destination.replace("{service}", &service.to_lowercase());

        for (placeholder, value) in [
            ("{resource}", artifact.resource()),
            ("{operation}", artifact.operation()),
        ] {
            if !destination.contains(placeholder) {
                continue;
            }
            let value = value.ok_or_else(|| {
                Error::template(format!(
                    "Destination '{}' uses {} but {} artifacts have none",
                    self.destination,
                    placeholder,
                    artifact.kind().as_str()
                ))
            })?;
            destination = destination.replace(placeholder, value);
        }

        Ok(PathBuf::from(destination))
    }
}

/// Accepts a single command or a list of commands
fn deserialize_commands<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = SerdeValue::deserialize(deserializer)?;

    match value {
        SerdeValue::String(s) => Ok(vec![s]),
        SerdeValue::Seq(seq) => seq
            .into_iter()
            .map(|item| match item {
                SerdeValue::String(s) => Ok(s),
                _ => Err(serde::de::Error::custom(
                    "Expected string or array of strings",
                )),
            })
            .collect(),
        SerdeValue::Unit | SerdeValue::Option(None) => Ok(Vec::new()),
        _ => Err(serde::de::Error::custom(
            "Expected string or array of strings",
        )),
    }
}
