//! VCF 9 hardware compatibility lookup.
//!
//! Host hardware models are checked against a catalog derived from the
//! Broadcom Compatibility Guide. The catalog ships bundled with the
//! crate and can be replaced by a local JSON file or fetched over HTTP.
//!
//! Matching is forgiving: vendor prefixes ("Dell Inc.", "HPE", ...) are
//! stripped, comparison is case-insensitive, and a substring match in
//! either direction counts as compatible. Vendor tools rarely report
//! the exact string the compatibility guide lists.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::inventory::SiteInventory;

/// Catalog JSON bundled with the crate.
const BUNDLED_CATALOG: &str = include_str!("../data/vcf9_hcl.json");

/// Leading vendor name on a reported hardware model.
static VENDOR_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Dell\s+(Inc\.?\s*)?|HPE?\s+|Lenovo\s+|Cisco\s+|Fujitsu\s+)")
        .expect("valid vendor prefix regex")
});

/// One compatibility guide entry.
#[derive(Debug, Clone, Deserialize)]
pub struct HclEntry {
    /// Hardware model as listed in the guide.
    #[serde(rename = "m")]
    pub model: String,
    /// Supported ESXi releases (e.g., "ESXi 8.0", "ESXi 9.0").
    #[serde(rename = "r")]
    pub releases: Vec<String>,
}

/// Compatibility verdict for a single host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatStatus {
    /// Model found in the catalog.
    Compatible,
    /// Model not found in the catalog.
    Incompatible,
    /// Model unknown (export did not report one).
    Unknown,
}

impl std::fmt::Display for CompatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompatStatus::Compatible => write!(f, "compatible"),
            CompatStatus::Incompatible => write!(f, "incompatible"),
            CompatStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Compatibility annotation attached to a host record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCompat {
    /// Verdict.
    pub status: CompatStatus,
    /// Human-readable label rendered into the diagram and reports.
    pub label: String,
}

/// The hardware compatibility catalog, keyed by normalized model name.
#[derive(Debug, Clone, Default)]
pub struct HclCatalog {
    // BTreeMap keeps the substring scan deterministic.
    entries: BTreeMap<String, Vec<String>>,
}

impl HclCatalog {
    /// Build a catalog from guide entries.
    pub fn from_entries(entries: Vec<HclEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| (e.model.trim().to_lowercase(), e.releases))
            .collect();
        Self { entries }
    }

    /// Load the catalog bundled with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Load a catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        Self::from_json(&json)
    }

    /// Fetch a catalog over HTTP.
    pub fn fetch(url: &str) -> Result<Self> {
        let entries: Vec<HclEntry> = reqwest::blocking::get(url)
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|resp| resp.json())
            .map_err(|e| Error::hcl(format!("fetching '{}': {}", url, e)))?;
        debug!(url, entries = entries.len(), "fetched HCL catalog");
        Ok(Self::from_entries(entries))
    }

    /// Parse catalog JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<HclEntry> =
            serde_json::from_str(json).map_err(|e| Error::hcl(format!("invalid catalog: {}", e)))?;
        Ok(Self::from_entries(entries))
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check a reported hardware model against the catalog.
    pub fn check(&self, model: &str) -> HostCompat {
        if model.trim().is_empty() {
            return HostCompat {
                status: CompatStatus::Unknown,
                label: "\u{26A0}\u{FE0F} VCF9 ?".to_string(),
            };
        }

        let norm = normalize_model(model).to_lowercase();
        if let Some(releases) = self.entries.get(&norm) {
            return HostCompat {
                status: CompatStatus::Compatible,
                label: ready_label(releases),
            };
        }
        for (listed, releases) in &self.entries {
            if norm.contains(listed.as_str()) || listed.contains(norm.as_str()) {
                return HostCompat {
                    status: CompatStatus::Compatible,
                    label: ready_label(releases),
                };
            }
        }
        HostCompat {
            status: CompatStatus::Incompatible,
            label: "\u{274C} Not VCF9 Ready".to_string(),
        }
    }
}

/// Strip the vendor prefix from a reported model string.
pub fn normalize_model(model: &str) -> String {
    VENDOR_PREFIX_RE.replace(model, "").trim().to_string()
}

/// "✅ VCF 8.0 + 9.0 Ready"-style label from a releases list.
fn ready_label(releases: &[String]) -> String {
    let mut versions: Vec<String> = releases
        .iter()
        .map(|r| r.replace("ESXi ", ""))
        .collect();
    versions.sort();
    format!("\u{2705} VCF {} Ready", versions.join(" + "))
}

/// Annotate every host in every site with its compatibility verdict.
pub fn annotate(sites: &mut [SiteInventory], catalog: &HclCatalog) {
    for site in sites {
        for host in site.hosts_mut() {
            host.compat = Some(catalog.check(&host.model));
        }
    }
}

/// One row of the readiness report.
#[derive(Debug, Clone)]
pub struct ReadinessRow {
    pub site: String,
    pub cluster: String,
    pub hostname: String,
    pub model: String,
    pub esxi: String,
    pub status: CompatStatus,
    pub label: String,
}

/// VCF 9 readiness report across all sites.
#[derive(Debug, Clone)]
pub struct ReadinessReport {
    /// Per-host rows in site/cluster order.
    pub rows: Vec<ReadinessRow>,
    /// Hosts with a compatible model.
    pub compatible: usize,
    /// Hosts with an incompatible model.
    pub incompatible: usize,
    /// Hosts whose model was not reported or not checked.
    pub unknown: usize,
}

impl ReadinessReport {
    /// Total number of hosts in the report.
    pub fn total(&self) -> usize {
        self.rows.len()
    }
}

/// Build a readiness report from annotated sites.
///
/// Hosts that were never annotated count as unknown with an `N/A` label.
pub fn build_readiness_report(sites: &[SiteInventory]) -> ReadinessReport {
    let mut rows = Vec::new();
    let (mut compatible, mut incompatible, mut unknown) = (0usize, 0usize, 0usize);

    for site in sites {
        for cluster in &site.clusters {
            for host in &cluster.hosts {
                let (status, label) = match &host.compat {
                    Some(c) => (c.status, c.label.clone()),
                    None => (CompatStatus::Unknown, "N/A".to_string()),
                };
                match status {
                    CompatStatus::Compatible => compatible += 1,
                    CompatStatus::Incompatible => incompatible += 1,
                    CompatStatus::Unknown => unknown += 1,
                }
                rows.push(ReadinessRow {
                    site: site.site_name.clone(),
                    cluster: cluster.name.clone(),
                    hostname: host.hostname.clone(),
                    model: host.model.clone(),
                    esxi: host.esxi.clone(),
                    status,
                    label,
                });
            }
        }
    }

    ReadinessReport {
        rows,
        compatible,
        incompatible,
        unknown,
    }
}
