//! Generation pipeline: load model, synthesize, render, write, run hooks.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{
    config::Config,
    error::Result,
    model::SmithyContext,
    synthesis::synthesize,
    templates::{write_files, TemplateManager},
};

/// Switches for a generation run
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Leave files that already exist untouched
    pub keep_existing: bool,
    /// Render everything but write nothing and run no hooks
    pub dry_run: bool,
    pub skip_hooks: bool,
}

/// What a generation run produced
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    pub service: String,
    pub routes: usize,
    /// Rendered file paths, relative to the output directory
    pub files: Vec<PathBuf>,
    /// Files written, under the output directory
    pub written: Vec<PathBuf>,
    /// Existing files kept because of `keep_existing`
    pub skipped: Vec<PathBuf>,
}

/// Main entry point for route generation.
///
/// Synthesis runs to completion before anything is written, so a model that
/// fails validation leaves the output directory untouched.
pub async fn generate(config: &Config, options: Option<GenerateOptions>) -> Result<GenerateReport> {
    let options = options.unwrap_or_default();

    // 1. Load the model and pick the service
    let model = SmithyContext::from_file_or_url(&config.model_path).await?;
    let service = model.service(config.service.as_deref())?;

    // 2. Pure synthesis
    let synthesis = synthesize(&service, &config.synthesis_options())?;

    // 3. Render with the configured template set
    let manager = TemplateManager::new(config.template_kind, config.template_dir.clone()).await?;
    let files = manager.render(&synthesis.service_name, &synthesis.artifacts)?;

    let mut report = GenerateReport {
        service: synthesis.service_name.clone(),
        routes: synthesis.route_table.len(),
        files: files.iter().map(|f| f.path.clone()).collect(),
        ..Default::default()
    };

    if options.dry_run {
        log::info!(
            "Dry run: {} files for {} routes, nothing written",
            report.files.len(),
            report.routes
        );
        return Ok(report);
    }

    // 4. Write and run hooks
    let output_dir = Path::new(&config.output_dir);
    fs::create_dir_all(output_dir).await?;

    if !options.skip_hooks {
        manager.execute_pre_generation_hooks(output_dir).await?;
    }

    let summary = write_files(&files, output_dir, options.keep_existing).await?;
    report.written = summary.written;
    report.skipped = summary.skipped;

    if !options.skip_hooks {
        manager.execute_post_generation_hooks(output_dir).await?;
    }

    log::info!(
        "Generated {} files ({} kept) for service {} into {}",
        report.written.len(),
        report.skipped.len(),
        report.service,
        output_dir.display()
    );
    Ok(report)
}
