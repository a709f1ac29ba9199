//! Rendering of artifact records through a template set

// Internal imports (std, crate)
use std::{
    collections::HashSet,
    error::Error as StdError,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    artifacts::{Artifact, ArtifactKind},
    error::{Error, Result},
    manifest::{TemplateFile, TemplateManifest},
};

use super::{builtin, TemplateDir, TemplateKind, TEMPLATE_DIR_ENV};

// External imports (alphabetized)
use serde_json::{json, Map, Value as JsonValue};
use tera::{Context, Tera};
use tokio::fs;

/// Where a manager's templates came from
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Builtin(TemplateKind),
    Directory(TemplateDir),
}

/// A generated file, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl RenderedFile {
    pub fn new(path: PathBuf, contents: String) -> Self {
        Self { path, contents }
    }

    /// Append another rendered chunk, separated by a blank line
    fn append(&mut self, chunk: &str) {
        if !self.contents.ends_with('\n') {
            self.contents.push('\n');
        }
        self.contents.push('\n');
        self.contents.push_str(chunk);
    }
}

/// Outcome of [`write_files`]
#[derive(Debug, Clone, Default)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    /// Existing files left untouched because `keep_existing` was set
    pub skipped: Vec<PathBuf>,
}

/// Loads a template set and renders artifact records with it
#[derive(Debug, Clone)]
pub struct TemplateManager {
    tera: Arc<Tera>,
    source: TemplateSource,
    manifest: TemplateManifest,
}

impl TemplateManager {
    /// Create a manager for `template_kind`.
    ///
    /// An explicit `template_dir` wins, then the standard locations, then the
    /// compiled-in set for kinds that have one.
    pub async fn new(template_kind: TemplateKind, template_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = template_dir {
            return Self::from_dir(TemplateDir::from_path(template_kind, &dir)?).await;
        }
        if let Some(dir) = TemplateDir::discover(template_kind) {
            return Self::from_dir(dir).await;
        }
        if template_kind.has_builtin() {
            return Self::builtin(template_kind);
        }
        Err(Error::template(format!(
            "No template directory found for '{}' templates; pass a template directory or set {}",
            template_kind, TEMPLATE_DIR_ENV
        )))
    }

    /// Load the manifest and every `.tera` file under a template directory
    pub async fn from_dir(template_dir: TemplateDir) -> Result<Self> {
        let template_path = template_dir.template_path();
        let manifest = TemplateManifest::load_from_dir(template_path).await?;

        let template_dir_str = template_path.to_str().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "Template path contains invalid UTF-8",
            )
        })?;
        let tera = Tera::new(&format!("{}/**/*.tera", template_dir_str))?;

        log::debug!(
            "Loaded template set '{}' from {} ({} templates)",
            manifest.name,
            template_dir.display(),
            tera.get_template_names().count()
        );

        Ok(Self {
            tera: Arc::new(tera),
            source: TemplateSource::Directory(template_dir),
            manifest,
        })
    }

    /// Use the compiled-in template set for `kind`
    pub fn builtin(kind: TemplateKind) -> Result<Self> {
        let set = builtin::template_set(kind).ok_or_else(|| {
            Error::template(format!("No built-in templates for '{}'", kind))
        })?;

        let mut tera = Tera::default();
        tera.add_raw_templates(set.templates.iter().copied())?;
        let manifest = TemplateManifest::from_yaml(set.manifest)?;

        Ok(Self {
            tera: Arc::new(tera),
            source: TemplateSource::Builtin(kind),
            manifest,
        })
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    pub fn manifest(&self) -> &TemplateManifest {
        &self.manifest
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }

    /// Manifest entries whose template is loaded, as (source, destination)
    pub fn list_templates(&self) -> Vec<(String, String)> {
        self.manifest
            .files
            .iter()
            .filter(|f| self.has_template(&f.source))
            .map(|f| (f.source.clone(), f.destination.clone()))
            .collect()
    }

    /// Render `artifacts` into files without touching the filesystem.
    ///
    /// Records mapped to the same destination are concatenated in record
    /// order. Artifact kinds the manifest does not map are skipped.
    pub fn render(&self, service: &str, artifacts: &[Artifact]) -> Result<Vec<RenderedFile>> {
        let base_context = json!({
            "service": service,
            "service_key": service.to_lowercase(),
        });
        let mut files: Vec<RenderedFile> = Vec::new();
        let mut unmapped: HashSet<ArtifactKind> = HashSet::new();

        for artifact in artifacts {
            let kind = artifact.kind();
            let mut mapped = false;

            for file in self.manifest.files_for(kind) {
                mapped = true;
                let path = file.destination_for(service, artifact)?;
                let mut context = self.create_file_context(&base_context, file);
                context.extend(artifact.record()?);

                let contents = self.render_template(&file.source, context)?;
                log::debug!("Rendered {} -> {}", file.source, path.display());

                match files.iter_mut().find(|f| f.path == path) {
                    Some(existing) => existing.append(&contents),
                    None => files.push(RenderedFile::new(path, contents)),
                }
            }

            if !mapped && unmapped.insert(kind) {
                log::warn!(
                    "Template set '{}' has no entry for {} artifacts, skipping",
                    self.manifest.name,
                    kind.as_str()
                );
            }
        }

        Ok(files)
    }

    fn render_template(&self, name: &str, context: Map<String, JsonValue>) -> Result<String> {
        if !self.has_template(name) {
            return Err(Error::template(format!(
                "Template not found: {} (available: {})",
                name,
                self.tera.get_template_names().collect::<Vec<_>>().join(", ")
            )));
        }

        let context = Context::from_value(JsonValue::Object(context))?;
        self.tera.render(name, &context).map_err(|e| {
            let mut message = e.to_string();
            let mut source = e.source();
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = cause.source();
            }
            Error::template(format!("Failed to render template '{}': {}", name, message))
        })
    }

    /// Merge the base context with a manifest entry's context, giving
    /// precedence to the entry's keys
    pub fn create_file_context(
        &self,
        base_context: &JsonValue,
        file: &TemplateFile,
    ) -> Map<String, JsonValue> {
        let mut context = match &file.context {
            JsonValue::Object(file_ctx) => file_ctx.clone(),
            _ => Map::new(),
        };
        if let JsonValue::Object(base_map) = base_context {
            for (k, v) in base_map {
                if !context.contains_key(k) {
                    context.insert(k.clone(), v.clone());
                }
            }
        }
        context
    }

    pub async fn execute_pre_generation_hooks(&self, output_path: &Path) -> Result<()> {
        run_hooks("pre-generation", &self.manifest.hooks.pre_generate, output_path).await
    }

    pub async fn execute_post_generation_hooks(&self, output_path: &Path) -> Result<()> {
        run_hooks("post-generation", &self.manifest.hooks.post_generate, output_path).await
    }
}

/// Run each command with `sh -c` inside `output_path`, stopping at the first failure
async fn run_hooks(stage: &str, commands: &[String], output_path: &Path) -> Result<()> {
    use tokio::process::Command as AsyncCommand;

    for command in commands {
        log::info!("Running {} hook: {}", stage, command);
        let output = AsyncCommand::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(output_path)
            .output()
            .await
            .map_err(|e| {
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("Failed to execute {} hook '{}': {}", stage, command, e),
                )
            })?;

        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "{} hook '{}' failed with status {}\n{}{}",
                    stage,
                    command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr),
                    String::from_utf8_lossy(&output.stdout)
                ),
            )
            .into());
        }
    }
    Ok(())
}

/// Write rendered files below `output_dir`, creating directories as needed.
///
/// With `keep_existing`, files already present are left as they are.
pub async fn write_files(
    files: &[RenderedFile],
    output_dir: &Path,
    keep_existing: bool,
) -> Result<WriteSummary> {
    let mut summary = WriteSummary::default();

    for file in files {
        let path = output_dir.join(&file.path);
        if keep_existing && fs::try_exists(&path).await? {
            log::info!("Keeping existing file {}", path.display());
            summary.skipped.push(path);
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &file.contents).await?;
        log::debug!("Wrote {} ({} bytes)", path.display(), file.contents.len());
        summary.written.push(path);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::emit;
    use crate::model::{Operation, Resource, Service};
    use crate::routes::{group, RouteTableBuilder};
    use tempfile::tempdir;

    fn shop_artifacts() -> Vec<Artifact> {
        let service = Service::new("Shop")
            .with_resource(
                Resource::new("Order")
                    .with_operation(Operation::new("GetOrder").bound("GET", "/orders/{orderId}"))
                    .with_operation(Operation::new("ListOrders").bound("GET", "/orders")),
            )
            .with_operation(Operation::new("Ping").bound("GET", "/ping"));
        let table = RouteTableBuilder::default().build(&service).unwrap();
        emit(&group(&table.references))
    }

    fn file<'a>(files: &'a [RenderedFile], path: &str) -> &'a str {
        files
            .iter()
            .find(|f| f.path == Path::new(path))
            .map(|f| f.contents.as_str())
            .unwrap_or_else(|| panic!("{} was not rendered", path))
    }

    fn write_template_set(dir: &Path, manifest: &str, templates: &[(&str, &str)]) {
        std::fs::write(dir.join("manifest.yaml"), manifest).unwrap();
        for (name, body) in templates {
            let path = dir.join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }
    }

    #[test]
    fn test_builtin_typescript_render() -> Result<()> {
        let manager = TemplateManager::builtin(TemplateKind::TypeScript)?;
        let files = manager.render("Shop", &shop_artifacts())?;
        assert_eq!(files.len(), 12);
        assert!(files.iter().all(|f| f.path != Path::new("src/index.ts")));

        let routing = file(&files, "src/routing.ts");
        assert!(routing.contains("export * from './handlers/index';"));
        assert!(routing.contains("export * from './server/controller';"));

        assert_eq!(
            file(&files, "src/routes/index.ts"),
            "export * from './shop-routes';\n"
        );

        let routes = file(&files, "src/routes/shop-routes.ts");
        assert!(routes.contains("export const operations: OperationReferences = {"));
        assert!(routes.contains("path: 'GET /orders/{orderId}',"));
        assert!(routes.contains("handlerLocator: 'order/getorder',"));
        assert!(routes.contains("functionId: 'list-orders',"));
        assert!(routes.contains("export type OrderReference = {"));
        assert!(routes.contains("getOrder: OperationDefinition;"));
        assert!(routes.contains("export type ApiResourceOperationHandlers<AuthorizerKeys> = {"));
        assert!(routes.contains("api: ApiReference;"));
        assert!(routes.contains("export type OperationName = 'getOrder' | 'listOrders' | 'ping';"));
        // route table comes before the union in the concatenated file
        let table_at = routes.find("export const operations").unwrap();
        let union_at = routes.find("export type OperationName").unwrap();
        assert!(table_at < union_at);

        let binding_at = routes.find("export class ShopHandler<AuthorizerKeys> {").unwrap();
        assert!(union_at < binding_at);
        assert!(routes.contains("handlers(): Record<string, RouteBinding<AuthorizerKeys>> {"));
        assert!(routes.contains(
            "'GET /orders/{orderId}': {\n        definition: operations.order.getOrder,\n        props: this.routesHandler.order.getOrder(),\n      },"
        ));
        assert!(routes.contains("props: this.routesHandler.api.ping(),"));

        let builder = file(&files, "src/handlers/getOrderHandler.ts");
        assert!(builder.contains("export function getOrderHandlerBuilder<T extends Context>("));
        assert!(builder.contains("gatewayHandler.handle(getGetOrderHandler(operation))"));
        assert!(builder.contains("GetOrderServerOutput } from '../index';"));

        let handlers = file(&files, "src/handlers/index.ts");
        assert!(handlers.contains("export { pingHandlerBuilder } from './pingHandler';"));

        let controller = file(&files, "src/server/controller/orderController.ts");
        assert!(controller.contains("export abstract class OrderController<T extends Context> {"));
        assert!(controller.contains("protected abstract getOrderFunction<SC extends T>()"));
        assert!(controller.contains("listOrdersHandler(): APIGatewayProxyHandler {"));
        assert!(controller.contains(
            "return getOrderHandlerBuilder(gatewayHandler, this.getOrderFunction(), operationTransformation);"
        ));
        assert!(!controller.contains("pingFunction"));
        assert!(controller.contains("} from '../../index';"));

        let api_controller = file(&files, "src/server/controller/apiController.ts");
        assert!(api_controller.contains("export abstract class ApiController<T extends Context>"));

        let controllers = file(&files, "src/server/controller/index.ts");
        assert!(controllers.contains("export { OrderController } from './orderController';"));
        assert!(controllers.contains("export { ApiController } from './apiController';"));
        Ok(())
    }

    #[tokio::test]
    async fn test_custom_dir_skips_unmapped_artifacts() -> Result<()> {
        let dir = tempdir()?;
        write_template_set(
            dir.path(),
            r#"
name: keys
files:
  - artifact: route_table
    source: keys.tera
    destination: "{service}.txt"
    context:
      separator: ";"
"#,
            &[(
                "keys.tera",
                "{{ service }}:{% for g in groups %}{{ g.key }}{{ separator }}{% endfor %}",
            )],
        );

        let manager = TemplateManager::new(TemplateKind::Custom, Some(dir.path().to_path_buf())).await?;
        assert!(matches!(manager.source(), TemplateSource::Directory(_)));
        assert_eq!(manager.list_templates().len(), 1);

        let files = manager.render("Shop", &shop_artifacts())?;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("shop.txt"));
        assert_eq!(files[0].contents, "Shop:order;api;");
        Ok(())
    }

    #[tokio::test]
    async fn test_shared_destination_concatenates_in_order() -> Result<()> {
        let dir = tempdir()?;
        write_template_set(
            dir.path(),
            r#"
name: merged
files:
  - artifact: resource_reference
    source: one.tera
    destination: all.txt
  - artifact: controller
    source: one.tera
    destination: all.txt
"#,
            &[("one.tera", "{{ resource_key }}\n")],
        );

        let manager = TemplateManager::new(TemplateKind::Custom, Some(dir.path().to_path_buf())).await?;
        let files = manager.render("Shop", &shop_artifacts())?;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].contents, "order\n\napi\n\norder\n\napi\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_sdk_module_comes_from_manifest_context() -> Result<()> {
        let builtin = builtin::template_set(TemplateKind::TypeScript).unwrap();
        let body = |name: &str| {
            builtin
                .templates
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, body)| *body)
                .unwrap()
        };
        let dir = tempdir()?;
        write_template_set(
            dir.path(),
            r#"
name: sdk
files:
  - artifact: handler_builder
    source: handlers/handler_builder.ts.tera
    destination: "src/handlers/{operation}Handler.ts"
    context:
      sdk_module: sdk/server
  - artifact: controller
    source: server/controller/controller.ts.tera
    destination: "src/server/controller/{resource}Controller.ts"
"#,
            &[
                (
                    "handlers/handler_builder.ts.tera",
                    body("handlers/handler_builder.ts.tera"),
                ),
                (
                    "server/controller/controller.ts.tera",
                    body("server/controller/controller.ts.tera"),
                ),
            ],
        );

        let manager = TemplateManager::new(TemplateKind::Custom, Some(dir.path().to_path_buf())).await?;
        let files = manager.render("Shop", &shop_artifacts())?;
        let builder = file(&files, "src/handlers/pingHandler.ts");
        assert!(builder.contains("PingServerOutput } from '../sdk/server';"));
        // without a context entry the SDK index is assumed
        let controller = file(&files, "src/server/controller/orderController.ts");
        assert!(controller.contains("} from '../../index';"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_template_is_an_error() {
        let dir = tempdir().unwrap();
        write_template_set(
            dir.path(),
            "name: broken\nfiles:\n  - artifact: root_index\n    source: nope.tera\n    destination: index.ts\n",
            &[],
        );
        let manager = TemplateManager::new(TemplateKind::Custom, Some(dir.path().to_path_buf()))
            .await
            .unwrap();
        let err = manager.render("Shop", &[Artifact::RootIndex]).unwrap_err();
        assert!(err.to_string().contains("Template not found: nope.tera"));
    }

    #[tokio::test]
    async fn test_custom_kind_requires_a_directory() {
        let missing = tempdir().unwrap().path().join("gone");
        assert!(TemplateManager::new(TemplateKind::Custom, Some(missing))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_write_files_keep_existing() -> Result<()> {
        let dir = tempdir()?;
        let files = vec![
            RenderedFile::new(PathBuf::from("src/a.ts"), "new a\n".into()),
            RenderedFile::new(PathBuf::from("src/nested/b.ts"), "new b\n".into()),
        ];
        std::fs::create_dir_all(dir.path().join("src"))?;
        std::fs::write(dir.path().join("src/a.ts"), "hand edited\n")?;

        let summary = write_files(&files, dir.path(), true).await?;
        assert_eq!(summary.written, vec![dir.path().join("src/nested/b.ts")]);
        assert_eq!(summary.skipped, vec![dir.path().join("src/a.ts")]);
        assert_eq!(std::fs::read_to_string(dir.path().join("src/a.ts"))?, "hand edited\n");

        let summary = write_files(&files, dir.path(), false).await?;
        assert_eq!(summary.written.len(), 2);
        assert_eq!(std::fs::read_to_string(dir.path().join("src/a.ts"))?, "new a\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_hooks_run_in_output_dir() -> Result<()> {
        let dir = tempdir()?;
        write_template_set(
            dir.path(),
            "name: hooked\nhooks:\n  post_generate:\n    - touch hook-ran\n    - exit 3\n",
            &[],
        );
        let manager = TemplateManager::new(TemplateKind::Custom, Some(dir.path().to_path_buf())).await?;
        let out = tempdir()?;

        manager.execute_pre_generation_hooks(out.path()).await?;
        let err = manager
            .execute_post_generation_hooks(out.path())
            .await
            .unwrap_err();
        assert!(out.path().join("hook-ran").exists());
        assert!(err.to_string().contains("exit 3"));
        Ok(())
    }
}
