//! Conversion orchestrator.
//!
//! This module coordinates the full pipeline:
//! 1. Parse every export file into a site inventory (in parallel)
//! 2. Optionally annotate hardware compatibility and compute licensing
//! 3. Lay the sites out on the canvas and serialize the diagram
//!
//! # Example
//!
//! ```no_run
//! use infralens_core::convert::{convert, ConvertOptions, SiteFile};
//! use std::path::PathBuf;
//!
//! let files = vec![SiteFile::new(PathBuf::from("/exports/rvtools_ams.xlsx"))];
//! let output = convert(&files, ConvertOptions::default(), None).unwrap();
//! std::fs::write("infrastructure.excalidraw", output.document).unwrap();
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::excalidraw::render_document;
use crate::hcl::{annotate, build_readiness_report, HclCatalog, ReadinessReport};
use crate::inventory::{parse_file, site_name_from_path, SiteInventory};
use crate::layout::layout_sites;
use crate::license::{calculate, Deployment, LicenseReport};

/// One input export file with an optional site-name override.
#[derive(Debug, Clone)]
pub struct SiteFile {
    /// Path to the `.xlsx` export.
    pub path: PathBuf,
    /// Site name; derived from the file name when `None`.
    pub site_name: Option<String>,
}

impl SiteFile {
    /// Input whose site name is derived from the file name.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            site_name: None,
        }
    }

    /// Input with an explicit site name.
    pub fn named(path: PathBuf, site_name: impl Into<String>) -> Self {
        Self {
            path,
            site_name: Some(site_name.into()),
        }
    }

    /// Effective site name for this input.
    pub fn effective_name(&self) -> String {
        match &self.site_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => site_name_from_path(&self.path),
        }
    }
}

/// Where to load the hardware compatibility catalog from.
#[derive(Debug, Clone)]
pub enum HclSource {
    /// Catalog bundled with the crate.
    Bundled,
    /// Local JSON file.
    File(PathBuf),
    /// Fetch over HTTP.
    Url(String),
}

impl HclSource {
    /// Load the catalog from this source.
    pub fn load(&self) -> Result<HclCatalog> {
        match self {
            HclSource::Bundled => HclCatalog::bundled(),
            HclSource::File(path) => HclCatalog::from_path(path),
            HclSource::Url(url) => HclCatalog::fetch(url),
        }
    }
}

/// Options for the conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Annotate hardware compatibility from this catalog source.
    pub hcl: Option<HclSource>,
    /// Compute a license report for this deployment type.
    pub license: Option<Deployment>,
}

/// Phase of the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertPhase {
    /// Parsing export files.
    Parsing,
    /// Compatibility and licensing enrichment.
    Enriching,
    /// Computing the grid layout.
    Layout,
    /// Serializing the diagram document.
    Serializing,
    /// Conversion complete.
    Complete,
}

impl std::fmt::Display for ConvertPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertPhase::Parsing => write!(f, "Parsing"),
            ConvertPhase::Enriching => write!(f, "Enriching"),
            ConvertPhase::Layout => write!(f, "Layout"),
            ConvertPhase::Serializing => write!(f, "Serializing"),
            ConvertPhase::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress information for the conversion.
#[derive(Debug, Clone)]
pub struct ConvertProgress {
    /// Current phase.
    pub phase: ConvertPhase,
    /// Export files parsed so far.
    pub files_done: usize,
    /// Total export files.
    pub files_total: usize,
}

/// Type alias for the progress callback function.
pub type ProgressCallback = Box<dyn Fn(ConvertProgress) + Send + Sync>;

/// Result of a conversion.
#[derive(Debug)]
pub struct ConvertOutput {
    /// The `.excalidraw` document.
    pub document: String,
    /// Parsed (and possibly annotated) site inventories.
    pub sites: Vec<SiteInventory>,
    /// Whether compatibility annotation actually ran.
    pub compat_checked: bool,
    /// Readiness report, when annotation ran.
    pub readiness: Option<ReadinessReport>,
    /// License report, when requested.
    pub license: Option<LicenseReport>,
}

/// Parse all export files into site inventories, preserving input order.
///
/// # Errors
///
/// Returns the first error encountered: a non-`.xlsx` input, an
/// unreadable file, or an unrecognised export.
pub fn parse_sites(files: &[SiteFile]) -> Result<Vec<SiteInventory>> {
    parse_sites_with_progress(files, None)
}

fn parse_sites_with_progress(
    files: &[SiteFile],
    callback: Option<&ProgressCallback>,
) -> Result<Vec<SiteInventory>> {
    if files.is_empty() {
        return Err(Error::inventory("no input files"));
    }
    for file in files {
        check_extension(file)?;
    }

    let done = AtomicUsize::new(0);
    files
        .par_iter()
        .map(|file| {
            let site = parse_file(&file.path, &file.effective_name()).map_err(|e| {
                Error::inventory(format!("parsing {}: {}", file.path.display(), e))
            })?;
            let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(cb) = callback {
                cb(ConvertProgress {
                    phase: ConvertPhase::Parsing,
                    files_done: finished,
                    files_total: files.len(),
                });
            }
            Ok(site)
        })
        .collect()
}

fn check_extension(file: &SiteFile) -> Result<()> {
    let ok = file
        .path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);
    if ok {
        Ok(())
    } else {
        Err(Error::inventory(format!(
            "Invalid file type: {}. Only .xlsx files are accepted.",
            file.path.display()
        )))
    }
}

/// Run the full conversion pipeline.
///
/// # Arguments
///
/// * `files` - Export files, one per site.
/// * `options` - Enrichment options.
/// * `callback` - Optional progress callback.
///
/// # Errors
///
/// Returns an error when parsing or serialization fails. A catalog that
/// cannot be loaded is not an error: the conversion continues without
/// compatibility annotation.
pub fn convert(
    files: &[SiteFile],
    options: ConvertOptions,
    callback: Option<ProgressCallback>,
) -> Result<ConvertOutput> {
    let report = |phase: ConvertPhase, files_done: usize| {
        if let Some(cb) = &callback {
            cb(ConvertProgress {
                phase,
                files_done,
                files_total: files.len(),
            });
        }
    };

    report(ConvertPhase::Parsing, 0);
    let mut sites = parse_sites_with_progress(files, callback.as_ref())?;

    report(ConvertPhase::Enriching, files.len());
    let mut compat_checked = false;
    if let Some(source) = &options.hcl {
        match source.load() {
            Ok(catalog) => {
                annotate(&mut sites, &catalog);
                compat_checked = true;
                debug!(entries = catalog.len(), "compatibility annotation applied");
            }
            // Enrichment is optional: a missing catalog degrades to an
            // unannotated diagram.
            Err(e) => warn!("continuing without compatibility data: {}", e),
        }
    }
    let readiness = compat_checked.then(|| build_readiness_report(&sites));
    let license = options.license.map(|deployment| calculate(&sites, deployment));

    report(ConvertPhase::Layout, files.len());
    let boxes = layout_sites(&sites, compat_checked);

    report(ConvertPhase::Serializing, files.len());
    let document = render_document(&boxes)?;

    report(ConvertPhase::Complete, files.len());
    Ok(ConvertOutput {
        document,
        sites,
        compat_checked,
        readiness,
        license,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_name_override() {
        let file = SiteFile::named(PathBuf::from("/tmp/export.xlsx"), "Amsterdam");
        assert_eq!(file.effective_name(), "Amsterdam");
    }

    #[test]
    fn test_effective_name_from_path() {
        let file = SiteFile::new(PathBuf::from("/tmp/rvtools_ams-01.xlsx"));
        assert_eq!(file.effective_name(), "rvtools ams 01");
    }

    #[test]
    fn test_effective_name_blank_override_falls_back() {
        let file = SiteFile::named(PathBuf::from("/tmp/site_a.xlsx"), "   ");
        assert_eq!(file.effective_name(), "site a");
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let err = parse_sites(&[SiteFile::new(PathBuf::from("/tmp/export.csv"))]).unwrap_err();
        assert!(err.to_string().contains("Only .xlsx files are accepted"));
    }

    #[test]
    fn test_rejects_empty_input() {
        let err = parse_sites(&[]).unwrap_err();
        assert!(err.to_string().contains("no input files"));
    }

    #[test]
    fn test_convert_empty_input_is_error() {
        assert!(convert(&[], ConvertOptions::default(), None).is_err());
    }
}
