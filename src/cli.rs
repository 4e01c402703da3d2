use crate::manifest::Application;
use crate::parser::{ManifestParser, ParsedManifest};
use crate::scanner::ManifestScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::ui::write_bundle;
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Generate a Swagger 2.0 document from declared route manifests
#[derive(Parser, Debug)]
#[command(name = "swagger-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Manifest file, or a directory scanned for .yaml/.yml/.json manifests
    #[arg(value_name = "MANIFEST_PATH")]
    pub manifest_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Leave routes under this include namespace out of the document (repeatable)
    #[arg(long = "exclude-namespace", value_name = "NAMESPACE")]
    pub exclude_namespaces: Vec<String>,

    /// Only document paths containing this substring
    #[arg(long = "filter-path", value_name = "SUBSTRING")]
    pub filter_path: Option<String>,

    /// Also write a Swagger UI bundle (index.html + swagger.json) into this directory
    #[arg(long = "ui", value_name = "DIR")]
    pub ui_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.exists() {
        bail!("Manifest path does not exist: {}", args.manifest_path.display());
    }

    info!("Manifest path: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

fn manifest_files(args: &CliArgs) -> Result<Vec<PathBuf>> {
    if !args.manifest_path.is_dir() {
        return Ok(vec![args.manifest_path.clone()]);
    }

    info!("Scanning manifest directory...");
    let scan_result = ManifestScanner::new(args.manifest_path.clone()).scan()?;
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }
    if scan_result.manifest_files.is_empty() {
        bail!(
            "No manifest files found in {}",
            args.manifest_path.display()
        );
    }
    Ok(scan_result.manifest_files)
}

/// Load every manifest; any unreadable manifest fails the run.
fn load_manifests(files: &[PathBuf]) -> Result<Vec<ParsedManifest>> {
    ManifestParser::parse_files(files).into_iter().collect()
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting Swagger document generation...");

    let files = manifest_files(&args)?;
    info!("Found {} manifest files", files.len());

    let manifests = load_manifests(&files)?;
    let mut app = Application::from_manifests(&manifests).context("Failed to resolve manifests")?;

    app.settings
        .exclude_namespaces
        .extend(args.exclude_namespaces.iter().cloned());
    if let Some(filter) = &args.filter_path {
        app.settings.filter_path = Some(filter.clone());
    }

    info!("Building Swagger document...");
    let document = app.generate().context("Failed to generate Swagger document")?;

    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    match &args.output_path {
        Some(output_path) => {
            write_to_file(&content, output_path)?;
            info!("Wrote Swagger document to {}", output_path.display());
        }
        None => println!("{}", content),
    }

    if let Some(ui_dir) = &args.ui_dir {
        write_bundle(ui_dir, &document)?;
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Manifests loaded: {}", manifests.len());
    info!("  - Paths documented: {}", document.paths.len());
    info!("  - Definitions: {}", document.definitions.len());

    Ok(())
}
