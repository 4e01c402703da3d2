use crate::manifest::Manifest;
use anyhow::{bail, Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parser for route manifest files.
///
/// A manifest is a YAML or JSON document describing serializers, views, routers and URL
/// patterns. The format is chosen from the file extension: `.json` files are read as JSON,
/// `.yaml` and `.yml` files as YAML.
///
/// # Example
///
/// ```no_run
/// use swagger_from_routes::parser::ManifestParser;
/// use std::path::Path;
///
/// let parsed = ManifestParser::parse_file(Path::new("api/routes.yaml")).unwrap();
/// println!("Parsed {} views", parsed.manifest.views.len());
/// ```
pub struct ManifestParser;

/// Serialization format of a manifest file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    /// Pick the format from a file extension, if it is a manifest extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Some(ManifestFormat::Yaml),
            Some("json") => Some(ManifestFormat::Json),
            _ => None,
        }
    }
}

/// A successfully parsed manifest together with the file it came from.
#[derive(Debug)]
pub struct ParsedManifest {
    /// Path to the manifest file
    pub path: PathBuf,
    /// The deserialized manifest
    pub manifest: Manifest,
}

impl ManifestParser {
    /// Parses a single manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file extension is not `.yaml`, `.yml` or `.json`
    /// - The file cannot be read
    /// - The content is not a valid manifest
    pub fn parse_file(path: &Path) -> Result<ParsedManifest> {
        debug!("Parsing manifest: {}", path.display());

        let Some(format) = ManifestFormat::from_path(path) else {
            bail!("Unsupported manifest extension: {}", path.display());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let manifest = Self::parse_str(&content, format)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;

        debug!("Successfully parsed manifest: {}", path.display());

        Ok(ParsedManifest {
            path: path.to_path_buf(),
            manifest,
        })
    }

    /// Parses manifest content that is already in memory.
    pub fn parse_str(content: &str, format: ManifestFormat) -> Result<Manifest> {
        let manifest = match format {
            ManifestFormat::Yaml => serde_yaml::from_str(content)?,
            ManifestFormat::Json => serde_json::from_str(content)?,
        };
        Ok(manifest)
    }

    /// Parses multiple manifest files, returning one result per input path.
    ///
    /// Failures are logged as warnings; the caller decides whether they are fatal.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedManifest>> {
        debug!("Parsing {} manifests", paths.len());

        let results: Vec<Result<ParsedManifest>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}
