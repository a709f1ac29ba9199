//! Template sets compiled into the library

use super::TemplateKind;

/// A compiled-in manifest with its templates, keyed by manifest source name
pub struct BuiltinSet {
    pub manifest: &'static str,
    pub templates: &'static [(&'static str, &'static str)],
}

macro_rules! typescript_template {
    ($name:literal) => {
        ($name, include_str!(concat!("../../templates/typescript/", $name)))
    };
}

static TYPESCRIPT: BuiltinSet = BuiltinSet {
    manifest: include_str!("../../templates/typescript/manifest.yaml"),
    templates: &[
        typescript_template!("index.ts.tera"),
        typescript_template!("routes/index.ts.tera"),
        typescript_template!("routes/route_table.ts.tera"),
        typescript_template!("routes/resource_reference.ts.tera"),
        typescript_template!("routes/resource_handlers.ts.tera"),
        typescript_template!("routes/route_index.ts.tera"),
        typescript_template!("routes/operation_union.ts.tera"),
        typescript_template!("routes/route_binding.ts.tera"),
        typescript_template!("handlers/base.ts.tera"),
        typescript_template!("handlers/handler_builder.ts.tera"),
        typescript_template!("handlers/index.ts.tera"),
        typescript_template!("server/controller/base.ts.tera"),
        typescript_template!("server/controller/controller.ts.tera"),
        typescript_template!("server/controller/index.ts.tera"),
    ],
};

pub fn template_set(kind: TemplateKind) -> Option<&'static BuiltinSet> {
    match kind {
        TemplateKind::TypeScript => Some(&TYPESCRIPT),
        TemplateKind::Custom => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::TemplateManifest;

    #[test]
    fn test_every_manifest_source_is_compiled_in() {
        let set = template_set(TemplateKind::TypeScript).unwrap();
        let manifest = TemplateManifest::from_yaml(set.manifest).unwrap();
        assert_eq!(manifest.name, "typescript");
        for file in &manifest.files {
            assert!(
                set.templates.iter().any(|(name, _)| *name == file.source),
                "missing builtin template {}",
                file.source
            );
        }
    }

    #[test]
    fn test_custom_has_no_builtin() {
        assert!(template_set(TemplateKind::Custom).is_none());
    }
}
