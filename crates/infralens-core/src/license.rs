//! VCF/VVF foundation-core license calculation.
//!
//! Broadcom licenses VCF and VVF per physical core with a 16-core
//! minimum per socket. Each licensed core entitles a fixed amount of
//! vSAN capacity: 1 TiB for VCF, 0.25 TiB for VVF.

use tracing::debug;

use crate::inventory::SiteInventory;

/// Licensing floor: sockets with fewer physical cores still license 16.
pub const MIN_CORES_PER_SOCKET: u32 = 16;

/// Deployment type being licensed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    /// VMware Cloud Foundation.
    Vcf,
    /// VMware vSphere Foundation.
    Vvf,
}

impl Deployment {
    /// Entitled vSAN capacity per licensed core.
    pub fn tib_per_core(self) -> f64 {
        match self {
            Deployment::Vcf => 1.0,
            Deployment::Vvf => 0.25,
        }
    }

    /// Short product code.
    pub fn code(self) -> &'static str {
        match self {
            Deployment::Vcf => "VCF",
            Deployment::Vvf => "VVF",
        }
    }

    /// Full product name for report headings.
    pub fn full_name(self) -> &'static str {
        match self {
            Deployment::Vcf => "VMware Cloud Foundation (VCF) Instance",
            Deployment::Vvf => "VMware vSphere Foundation (VVF)",
        }
    }
}

impl std::fmt::Display for Deployment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// License figures for a single host.
#[derive(Debug, Clone)]
pub struct LicenseRow {
    pub site: String,
    pub cluster: String,
    pub hostname: String,
    pub sockets: u32,
    pub cores_per_socket: u32,
    /// Licensed core count (`sockets * max(cores_per_socket, 16)`).
    pub foundation_cores: u32,
    /// Entitled vSAN capacity in TiB.
    pub entitled_tib: f64,
    /// True when the export lacked socket or core counts for this host.
    pub missing: bool,
}

/// License report across all sites.
#[derive(Debug, Clone)]
pub struct LicenseReport {
    /// Per-host rows in site/cluster order.
    pub rows: Vec<LicenseRow>,
    /// Total licensed cores (hosts with missing data excluded).
    pub total_cores: u64,
    /// Total entitled vSAN capacity in TiB.
    pub total_tib: f64,
    /// Hosts excluded because socket or core counts were missing.
    pub missing_count: usize,
    /// Deployment type the report was computed for.
    pub deployment: Deployment,
}

impl LicenseReport {
    /// Entitled capacity per core for this report's deployment type.
    pub fn tib_per_core(&self) -> f64 {
        self.deployment.tib_per_core()
    }

    /// Entitled TiB per cluster, in first-seen order.
    ///
    /// Rows with missing data contribute nothing and clusters made up
    /// entirely of such rows are omitted.
    pub fn cluster_tib(&self) -> Vec<(String, f64)> {
        let mut clusters: Vec<(String, f64)> = Vec::new();
        for row in &self.rows {
            if row.missing {
                continue;
            }
            match clusters.iter_mut().find(|(name, _)| *name == row.cluster) {
                Some((_, tib)) => *tib += row.entitled_tib,
                None => clusters.push((row.cluster.clone(), row.entitled_tib)),
            }
        }
        clusters
    }
}

/// Compute foundation-core licensing for all hosts in all sites.
pub fn calculate(sites: &[SiteInventory], deployment: Deployment) -> LicenseReport {
    let tib_per_core = deployment.tib_per_core();
    let mut rows = Vec::new();
    let mut total_cores: u64 = 0;
    let mut total_tib = 0.0;
    let mut missing_count = 0;

    for site in sites {
        for cluster in &site.clusters {
            for host in &cluster.hosts {
                if host.sockets == 0 || host.cores_per_socket == 0 {
                    missing_count += 1;
                    rows.push(LicenseRow {
                        site: site.site_name.clone(),
                        cluster: cluster.name.clone(),
                        hostname: host.hostname.clone(),
                        sockets: host.sockets,
                        cores_per_socket: host.cores_per_socket,
                        foundation_cores: 0,
                        entitled_tib: 0.0,
                        missing: true,
                    });
                    continue;
                }

                let effective_cores = host.cores_per_socket.max(MIN_CORES_PER_SOCKET);
                let foundation_cores = host.sockets * effective_cores;
                let entitled_tib = f64::from(foundation_cores) * tib_per_core;

                total_cores += u64::from(foundation_cores);
                total_tib += entitled_tib;

                rows.push(LicenseRow {
                    site: site.site_name.clone(),
                    cluster: cluster.name.clone(),
                    hostname: host.hostname.clone(),
                    sockets: host.sockets,
                    cores_per_socket: host.cores_per_socket,
                    foundation_cores,
                    entitled_tib,
                    missing: false,
                });
            }
        }
    }

    debug!(
        deployment = %deployment,
        hosts = rows.len(),
        total_cores,
        missing = missing_count,
        "calculated licensing"
    );

    LicenseReport {
        rows,
        total_cores,
        total_tib,
        missing_count,
        deployment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{group_by_cluster, HostRecord};

    fn host(name: &str, cluster: &str, sockets: u32, cores: u32) -> HostRecord {
        let mut h = HostRecord::new(name, cluster);
        h.sockets = sockets;
        h.cores_per_socket = cores;
        h
    }

    fn site(hosts: Vec<HostRecord>) -> SiteInventory {
        SiteInventory {
            site_name: "AMS".to_string(),
            vcenter_version: String::new(),
            clusters: group_by_cluster(hosts),
        }
    }

    #[test]
    fn test_calculate_vcf() {
        let sites = vec![site(vec![host("esx01", "Compute", 2, 24)])];
        let report = calculate(&sites, Deployment::Vcf);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].foundation_cores, 48);
        assert!((report.rows[0].entitled_tib - 48.0).abs() < f64::EPSILON);
        assert_eq!(report.total_cores, 48);
        assert_eq!(report.missing_count, 0);
    }

    #[test]
    fn test_sixteen_core_minimum() {
        let sites = vec![site(vec![host("esx01", "Compute", 2, 8)])];
        let report = calculate(&sites, Deployment::Vcf);
        // 8 cores per socket licenses as 16.
        assert_eq!(report.rows[0].foundation_cores, 32);
    }

    #[test]
    fn test_vvf_quarter_tib() {
        let sites = vec![site(vec![host("esx01", "Compute", 2, 32)])];
        let report = calculate(&sites, Deployment::Vvf);
        assert_eq!(report.rows[0].foundation_cores, 64);
        assert!((report.rows[0].entitled_tib - 16.0).abs() < f64::EPSILON);
        assert!((report.total_tib - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_counts_excluded_from_totals() {
        let sites = vec![site(vec![
            host("esx01", "Compute", 2, 24),
            host("esx02", "Compute", 0, 24),
            host("esx03", "Compute", 2, 0),
        ])];
        let report = calculate(&sites, Deployment::Vcf);

        assert_eq!(report.missing_count, 2);
        assert_eq!(report.total_cores, 48);
        assert!(report.rows[1].missing);
        assert_eq!(report.rows[1].foundation_cores, 0);
    }

    #[test]
    fn test_cluster_tib_rollup() {
        let sites = vec![site(vec![
            host("esx01", "Compute", 2, 24),
            host("esx02", "Management", 2, 16),
            host("esx03", "Compute", 2, 24),
            host("esx04", "Edge", 0, 0),
        ])];
        let report = calculate(&sites, Deployment::Vcf);
        let rollup = report.cluster_tib();

        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].0, "Compute");
        assert!((rollup[0].1 - 96.0).abs() < f64::EPSILON);
        assert_eq!(rollup[1].0, "Management");
        assert!((rollup[1].1 - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deployment_accessors() {
        assert_eq!(Deployment::Vcf.code(), "VCF");
        assert_eq!(Deployment::Vvf.code(), "VVF");
        assert!((Deployment::Vcf.tib_per_core() - 1.0).abs() < f64::EPSILON);
        assert!((Deployment::Vvf.tib_per_core() - 0.25).abs() < f64::EPSILON);
    }
}
