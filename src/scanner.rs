use crate::parser::ManifestFormat;
use anyhow::Result;
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Scanner collecting route manifests below a directory.
///
/// Hidden entries and `target` directories are skipped. Files are kept when
/// [`ManifestFormat::from_path`] recognises their extension, and are returned sorted by path
/// so that merging is deterministic.
///
/// # Example
///
/// ```no_run
/// use swagger_from_routes::scanner::ManifestScanner;
/// use std::path::PathBuf;
///
/// let scanner = ManifestScanner::new(PathBuf::from("./api"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} manifests", result.manifest_files.len());
/// ```
pub struct ManifestScanner {
    root_path: PathBuf,
}

/// Result of a directory scan
pub struct ScanResult {
    /// Manifest files, sorted
    pub manifest_files: Vec<PathBuf>,
    /// Entries that could not be read
    pub warnings: Vec<String>,
}

impl ManifestScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Walk the tree and collect manifest files.
    ///
    /// Unreadable entries are logged and recorded as warnings; scanning continues.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut manifest_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path).into_iter().filter_entry(|e| {
            if e.path() == self.root_path {
                return true;
            }
            let file_name = e.file_name().to_string_lossy();
            !file_name.starts_with('.') && file_name != "target"
        });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && ManifestFormat::from_path(path).is_some() {
                        manifest_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        manifest_files.sort();
        debug!(
            "Found {} manifests under {}",
            manifest_files.len(),
            self.root_path.display()
        );

        Ok(ScanResult {
            manifest_files,
            warnings,
        })
    }
}
