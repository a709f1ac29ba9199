//! Template directory resolution

use std::io;
use std::path::{Path, PathBuf};

use super::TemplateKind;

/// Environment variable naming a template root directory
pub const TEMPLATE_DIR_ENV: &str = "ROUTESMITH_TEMPLATE_DIR";

const MANIFEST_NAMES: [&str; 2] = ["manifest.yaml", "manifest.toml"];

/// A template directory on disk with resolved paths
#[derive(Debug, Clone)]
pub struct TemplateDir {
    /// Root directory containing one sub-directory per template kind
    root_dir: PathBuf,
    /// Directory holding the manifest and `.tera` files
    template_path: PathBuf,
    kind: TemplateKind,
}

impl TemplateDir {
    pub fn new(root_dir: PathBuf, template_path: PathBuf, kind: TemplateKind) -> Self {
        Self {
            root_dir,
            template_path,
            kind,
        }
    }

    /// Resolve an explicitly given directory.
    ///
    /// A directory that holds a manifest is used as is; otherwise it is taken
    /// as a root and `<dir>/<kind>` is used.
    pub fn from_path(kind: TemplateKind, dir: &Path) -> io::Result<Self> {
        if !dir.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Template directory not found: {}", dir.display()),
            ));
        }
        if has_manifest(dir) {
            let root = dir.parent().unwrap_or(dir).to_path_buf();
            return Ok(Self::new(root, dir.to_path_buf(), kind));
        }

        let template_path = dir.join(kind.as_str());
        if !template_path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Template directory not found: {}", template_path.display()),
            ));
        }
        Ok(Self::new(dir.to_path_buf(), template_path, kind))
    }

    /// Look for `<root>/<kind>` in the standard locations.
    ///
    /// Returns `None` when no location has a directory for `kind`.
    pub fn discover(kind: TemplateKind) -> Option<Self> {
        Self::candidate_roots()
            .into_iter()
            .map(|root| (root.join(kind.as_str()), root))
            .find(|(path, _)| path.is_dir())
            .map(|(path, root)| {
                log::debug!("Discovered {} templates at {}", kind, path.display());
                Self::new(root, path, kind)
            })
    }

    /// Standard locations, in lookup order
    fn candidate_roots() -> Vec<PathBuf> {
        let mut roots = Vec::new();

        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            roots.push(PathBuf::from(dir));
        }

        roots.push(PathBuf::from(".").join("templates"));

        if let Some(home_dir) = dirs::home_dir() {
            roots.push(home_dir.join(".routesmith").join("templates"));
        }

        roots
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn display(&self) -> std::path::Display<'_> {
        self.template_path.display()
    }
}

fn has_manifest(dir: &Path) -> bool {
    MANIFEST_NAMES.iter().any(|name| dir.join(name).is_file())
}
