//! Inventory export ingestion.
//!
//! This module reads RVTools and LiveOptics `.xlsx` exports into a
//! normalized site inventory: hosts grouped into clusters, plus the
//! vCenter version when the export carries one.
//!
//! The vendor format is auto-detected from the sheet names: an export
//! with a `vHost` sheet is RVTools, one with an `ESX Hosts` sheet is
//! LiveOptics.

mod liveoptics;
mod rvtools;
mod sheet;

use std::io::{Read, Seek};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::hcl::HostCompat;
use sheet::Workbook;

/// Dotted three-part version, used to shorten ESXi/vCenter build strings.
static VERSION3_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+)").expect("valid version regex"));

/// A single ESXi host row, normalized across vendor formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Hostname as reported by the export.
    pub hostname: String,
    /// Cluster the host belongs to (`Default` when the export has none).
    pub cluster: String,
    /// Hardware model string (e.g., "Dell Inc. PowerEdge R650").
    pub model: String,
    /// ESXi version, shortened to `major.minor.patch` when possible.
    pub esxi: String,
    /// Number of guest VMs on the host.
    pub vm_count: u32,
    /// CPU utilisation, pre-formatted (e.g., "37%", or "—" when unknown).
    pub cpu_pct: String,
    /// Memory utilisation, pre-formatted.
    pub mem_pct: String,
    /// Service tag / serial number.
    pub service_tag: String,
    /// Number of populated CPU sockets.
    pub sockets: u32,
    /// Physical cores per socket.
    pub cores_per_socket: u32,
    /// Hardware compatibility annotation, when enrichment ran.
    pub compat: Option<HostCompat>,
}

impl HostRecord {
    /// Create a record with no utilisation or licensing data.
    ///
    /// Mostly useful for tests and for callers that assemble
    /// inventories programmatically.
    pub fn new(hostname: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            cluster: cluster.into(),
            model: String::new(),
            esxi: String::new(),
            vm_count: 0,
            cpu_pct: "—".to_string(),
            mem_pct: "—".to_string(),
            service_tag: String::new(),
            sockets: 0,
            cores_per_socket: 0,
            compat: None,
        }
    }
}

/// Hosts belonging to one cluster, in sheet row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterGroup {
    /// Cluster name.
    pub name: String,
    /// Member hosts.
    pub hosts: Vec<HostRecord>,
}

/// A parsed site: one uploaded export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteInventory {
    /// User-facing site name (defaults to the file name).
    pub site_name: String,
    /// vCenter version, empty when the export does not carry one.
    pub vcenter_version: String,
    /// Clusters in first-seen order.
    pub clusters: Vec<ClusterGroup>,
}

impl SiteInventory {
    /// Total number of hosts across all clusters.
    pub fn host_count(&self) -> usize {
        self.clusters.iter().map(|c| c.hosts.len()).sum()
    }

    /// Total number of guest VMs across all hosts.
    pub fn vm_count(&self) -> u64 {
        self.hosts().map(|h| u64::from(h.vm_count)).sum()
    }

    /// Iterate over all hosts in cluster order.
    pub fn hosts(&self) -> impl Iterator<Item = &HostRecord> {
        self.clusters.iter().flat_map(|c| c.hosts.iter())
    }

    /// Iterate mutably over all hosts in cluster order.
    pub fn hosts_mut(&mut self) -> impl Iterator<Item = &mut HostRecord> {
        self.clusters.iter_mut().flat_map(|c| c.hosts.iter_mut())
    }
}

/// Recognised export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// RVTools export (has a `vHost` sheet).
    RvTools,
    /// LiveOptics export (has an `ESX Hosts` sheet).
    LiveOptics,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::RvTools => write!(f, "RVTools"),
            ExportFormat::LiveOptics => write!(f, "LiveOptics"),
        }
    }
}

/// Detect the export format from a workbook's sheet names.
pub fn detect_format(sheet_names: &[String]) -> Option<ExportFormat> {
    let has = |name: &str| sheet_names.iter().any(|s| s.eq_ignore_ascii_case(name));
    if has("vHost") {
        Some(ExportFormat::RvTools)
    } else if has("ESX Hosts") {
        Some(ExportFormat::LiveOptics)
    } else {
        None
    }
}

/// Parse an export file, auto-detecting the vendor format.
///
/// # Arguments
///
/// * `path` - Path to the `.xlsx` export.
/// * `site_name` - Display name for the site.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, is not a valid xlsx
/// workbook, or is not a recognised RVTools/LiveOptics export.
pub fn parse_file(path: &Path, site_name: &str) -> Result<SiteInventory> {
    let mut wb = Workbook::open(path)?;
    parse_workbook(&mut wb, site_name)
}

/// Parse an export from an in-memory buffer, auto-detecting the format.
pub fn parse_bytes(bytes: Vec<u8>, site_name: &str) -> Result<SiteInventory> {
    let mut wb = Workbook::from_bytes(bytes)?;
    parse_workbook(&mut wb, site_name)
}

fn parse_workbook<RS: Read + Seek>(wb: &mut Workbook<RS>, site_name: &str) -> Result<SiteInventory> {
    match detect_format(&wb.sheet_names()) {
        Some(ExportFormat::RvTools) => rvtools::parse(wb, site_name),
        Some(ExportFormat::LiveOptics) => liveoptics::parse(wb, site_name),
        None => Err(Error::inventory(format!(
            "\"{}\" is not a recognised RVTools or LiveOptics export",
            site_name
        ))),
    }
}

/// Derive a site name from an export file name.
///
/// Strips the extension and replaces `_` and `-` with spaces, so
/// `datacenter_ams-01.xlsx` becomes `datacenter ams 01`.
pub fn site_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.replace(['_', '-'], " ").trim().to_string()
}

/// Group hosts into clusters, preserving first-seen cluster order.
pub(crate) fn group_by_cluster(hosts: Vec<HostRecord>) -> Vec<ClusterGroup> {
    let mut clusters: Vec<ClusterGroup> = Vec::new();
    for host in hosts {
        match clusters.iter_mut().find(|c| c.name == host.cluster) {
            Some(cluster) => cluster.hosts.push(host),
            None => clusters.push(ClusterGroup {
                name: host.cluster.clone(),
                hosts: vec![host],
            }),
        }
    }
    clusters
}

/// Extract the first `major.minor.patch` substring, if any.
pub(crate) fn find_version3(raw: &str) -> Option<String> {
    VERSION3_RE.find(raw).map(|m| m.as_str().to_string())
}

/// Shorten a version string to its first `major.minor.patch` substring.
///
/// Returns the input unchanged when no such substring exists.
pub(crate) fn short_version(raw: &str) -> String {
    find_version3(raw).unwrap_or_else(|| raw.to_string())
}
