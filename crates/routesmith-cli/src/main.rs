//! routesmith CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::{Parser, ValueEnum};
use routesmith_core::{
    generate, Config, GenerateOptions, HandlerLocator, SmithyContext, SynthesisOptions,
    TemplateKind,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "routesmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate the route table, handler builders and controllers for a service
    Generate {
        /// Path or URL of the Smithy JSON AST model
        #[arg(long)]
        model: Option<String>,
        /// Configuration file (YAML, or JSON with a .json extension)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Service shape id or name, required when the model has several
        #[arg(long)]
        service: Option<String>,
        /// Output directory for generated files (default: generated)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Template set to use (typescript, custom)
        #[arg(long)]
        template_kind: Option<String>,
        /// Template directory overriding discovery
        #[arg(long)]
        template_dir: Option<PathBuf>,
        /// Handler locator pattern with {resource} and {operation} placeholders
        #[arg(long)]
        handler_locator: Option<String>,
        /// Only generate these operations (repeatable or comma separated)
        #[arg(long = "include", value_delimiter = ',')]
        include: Vec<String>,
        /// Skip these operations (repeatable or comma separated)
        #[arg(long = "exclude", value_delimiter = ',')]
        exclude: Vec<String>,
        /// Leave existing files untouched
        #[arg(long)]
        keep_existing: bool,
        /// Render without writing files or running hooks
        #[arg(long)]
        dry_run: bool,
        /// Do not run manifest hooks
        #[arg(long)]
        skip_hooks: bool,
    },
    /// Print the grouped route table of a service
    Routes {
        /// Path or URL of the Smithy JSON AST model
        #[arg(long)]
        model: String,
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        handler_locator: Option<String>,
        #[arg(long = "include", value_delimiter = ',')]
        include: Vec<String>,
        #[arg(long = "exclude", value_delimiter = ',')]
        exclude: Vec<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// List the service shapes defined in a model
    Services {
        /// Path or URL of the Smithy JSON AST model
        #[arg(long)]
        model: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "routesmith=debug,routesmith_core=debug"
    } else {
        "routesmith=info,routesmith_core=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            model,
            config,
            service,
            output_dir,
            template_kind,
            template_dir,
            handler_locator,
            include,
            exclude,
            keep_existing,
            dry_run,
            skip_hooks,
        } => {
            let mut config = match config {
                Some(path) => Config::from_file(&path)
                    .await
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => {
                    let model = model
                        .clone()
                        .context("--model is required when no --config is given")?;
                    Config::new(model, "generated")
                }
            };

            // Flags override the config file
            if let Some(model) = model {
                config.model_path = model;
            }
            if service.is_some() {
                config.service = service;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir.to_string_lossy().into_owned();
            }
            if let Some(kind) = template_kind {
                config.template_kind = kind
                    .parse::<TemplateKind>()
                    .map_err(|e| anyhow::anyhow!("Invalid template kind '{kind}': {e}"))?;
            }
            if template_dir.is_some() {
                config.template_dir = template_dir;
            }
            if let Some(pattern) = handler_locator {
                config.handler_locator = HandlerLocator::new(pattern);
            }
            if !include.is_empty() {
                config.include_operations = include;
            }
            if !exclude.is_empty() {
                config.exclude_operations = exclude;
            }

            tracing::info!(
                "Generating from {} with {} templates into {}",
                config.model_path,
                config.template_kind,
                config.output_dir
            );

            let options = GenerateOptions {
                keep_existing,
                dry_run,
                skip_hooks,
            };
            let report = generate(&config, Some(options))
                .await
                .context("Generation failed")?;

            if dry_run {
                println!(
                    "Would generate {} files for {} routes of {}:",
                    report.files.len(),
                    report.routes,
                    report.service
                );
                for file in &report.files {
                    println!("  {}", file.display());
                }
            } else {
                for file in &report.skipped {
                    println!("Kept existing {}", file.display());
                }
                println!(
                    "Generated {} files for {} routes of {} in {}",
                    report.written.len(),
                    report.routes,
                    report.service,
                    config.output_dir
                );
            }
        }
        Commands::Routes {
            model,
            service,
            handler_locator,
            include,
            exclude,
            format,
        } => {
            let context = load_model(&model).await?;
            let service = context.service(service.as_deref())?;
            let options = SynthesisOptions {
                locator: handler_locator
                    .map(HandlerLocator::new)
                    .unwrap_or_default(),
                include_operations: include,
                exclude_operations: exclude,
            };
            let synthesis = routesmith_core::synthesize(&service, &options)
                .with_context(|| format!("Failed to synthesize routes for {}", service.name))?;

            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&synthesis.grouped)?,
                OutputFormat::Yaml => serde_yaml::to_string(&synthesis.grouped)?,
            };
            println!("{}", rendered.trim_end());
        }
        Commands::Services { model } => {
            let context = load_model(&model).await?;
            for id in context.service_ids() {
                println!("{}", id);
            }
        }
    }

    Ok(())
}

async fn load_model(location: &str) -> anyhow::Result<SmithyContext> {
    SmithyContext::from_file_or_url(location)
        .await
        .with_context(|| format!("Failed to load model from {}", location))
}
