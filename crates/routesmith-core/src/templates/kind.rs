//! Template set kinds.
//!
//! ```
//! use routesmith_core::templates::TemplateKind;
//! use std::str::FromStr;
//!
//! let kind = TemplateKind::from_str("TypeScript").unwrap();
//! assert_eq!(kind, TemplateKind::TypeScript);
//! assert_eq!(kind.to_string(), "typescript");
//! assert_eq!(TemplateKind::default(), TemplateKind::TypeScript);
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};

/// Supported template sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// TypeScript route table, handler builders and controllers
    #[default]
    TypeScript,
    /// User-supplied template directory
    Custom,
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "typescript" | "ts" => Ok(TemplateKind::TypeScript),
            "custom" => Ok(TemplateKind::Custom),
            _ => Err(format!("Unknown template kind: {}", s)),
        }
    }
}

impl TemplateKind {
    /// Returns the template identifier, which is also its directory name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Custom => "custom",
        }
    }

    /// Whether a compiled-in template set exists for this kind
    pub fn has_builtin(&self) -> bool {
        matches!(self, Self::TypeScript)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [Self::TypeScript, Self::Custom].into_iter()
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
