//! multitemplate CLI entrypoint
//! Loads a template manifest and renders or lists its templates.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use multitemplate::{
    Context, Recipe, Render, RenderMode, Renderer, RendererConfig, TemplateManifest,
    new_renderer,
};

// External imports (alphabetized)
use anyhow::Context as _;
use clap::Parser;
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "multitemplate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Renderer configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List the templates a manifest declares
    List {
        /// Template manifest (YAML)
        #[arg(long, default_value = "templates.yml")]
        manifest: PathBuf,
    },
    /// Render one template from a manifest
    Render {
        /// Template manifest (YAML)
        #[arg(long, default_value = "templates.yml")]
        manifest: PathBuf,
        /// Registered template name
        #[arg(long)]
        name: String,
        /// JSON file with the data to render (an object)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Override the configured render mode (debug or release)
        #[arg(long)]
        mode: Option<RenderMode>,
        /// Write output to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::List { manifest } => list_templates(&manifest, config)?,
        Commands::Render {
            manifest,
            name,
            data,
            mode,
            output,
        } => {
            let config = match mode {
                Some(mode) => RendererConfig { mode, ..config },
                None => config,
            };
            render_template(&manifest, &name, data.as_deref(), output.as_deref(), &config)?
        }
    }
    Ok(())
}

/// Config file (if any), then environment overrides
fn load_config(path: Option<&Path>) -> anyhow::Result<RendererConfig> {
    let config = match path {
        Some(path) => RendererConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RendererConfig::default(),
    };
    let config = config
        .with_env_overrides()
        .context("Invalid renderer settings in environment")?;
    debug!("Renderer config: {:?}", config);
    Ok(config)
}

fn load_manifest(path: &Path) -> anyhow::Result<TemplateManifest> {
    TemplateManifest::load(path)
        .with_context(|| format!("Failed to load template manifest {}", path.display()))
}

fn list_templates(manifest_path: &Path, config: RendererConfig) -> anyhow::Result<()> {
    let manifest = load_manifest(manifest_path)?;

    if manifest.templates.is_empty() {
        println!("No templates declared in {}", manifest_path.display());
        return Ok(());
    }

    // Build everything once so broken sources show up here too
    let mut renderer = Render::with_config(config);
    println!("Templates in {}:", manifest_path.display());
    for entry in &manifest.templates {
        let recipe: Recipe = entry
            .recipe(&manifest.base_dir)
            .with_context(|| format!("Invalid manifest entry '{}'", entry.name))?;
        let kind = recipe.kind();
        let built = renderer
            .register(recipe)
            .with_context(|| format!("Failed to build template '{}'", entry.name))?;
        println!(
            "  • {:<20} {:<14} root: {} ({} file(s))",
            entry.name,
            kind,
            built.name(),
            built.template_names().len()
        );
    }

    Ok(())
}

fn render_template(
    manifest_path: &Path,
    name: &str,
    data: Option<&Path>,
    output: Option<&Path>,
    config: &RendererConfig,
) -> anyhow::Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let mut renderer = new_renderer(config);
    let count = manifest
        .register(renderer.as_mut())
        .context("Failed to register templates")?;
    info!("Registered {} template(s) in {} mode", count, renderer.mode());

    let context = match data {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read data file {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse JSON data {}", path.display()))?;
            Context::from_value(value).context("Render data must be a JSON object")?
        }
        None => Context::new(),
    };

    let unit = renderer
        .instance(name, context)
        .with_context(|| format!("Failed to resolve template '{name}'"))?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            unit.write_to(&mut writer)
                .with_context(|| format!("Failed to render template '{name}'"))?;
            writer.flush()?;
            info!("Wrote {}", path.display());
        }
        None => {
            let rendered = unit
                .render()
                .with_context(|| format!("Failed to render template '{name}'"))?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
