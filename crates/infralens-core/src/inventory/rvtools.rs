//! RVTools export parsing.
//!
//! Host rows come from the `vHost` sheet; the vCenter version is pulled
//! from the optional `vSource` sheet. Column names drifted across
//! RVTools releases, so every field is resolved through a candidate
//! list.

use std::io::{Read, Seek};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::sheet::{cell_count, cell_str, find_col, fmt_pct, header_index, Workbook};
use super::{group_by_cluster, short_version, HostRecord, SiteInventory};
use crate::error::{Error, Result};

/// `vCenter Server 8.0.2`-style version in the vSource full name.
static VCENTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vCenter Server\s+(\d+\.\d+\.\d+)").expect("valid regex"));

/// Dotted four-part build version, the fallback when the full name does
/// not mention vCenter Server.
static VERSION4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+\.\d+)").expect("valid regex"));

/// Parse an RVTools workbook into a site inventory.
pub(super) fn parse<RS: Read + Seek>(
    wb: &mut Workbook<RS>,
    site_name: &str,
) -> Result<SiteInventory> {
    let vhost_sheet = wb
        .find_sheet("vHost")
        .ok_or_else(|| Error::inventory(format!("No vHost sheet found in {}", site_name)))?;
    let range = wb.range(&vhost_sheet)?;
    let headers = header_index(&range);

    let col_host = find_col(&headers, &["VM Host", "Host", "DNS Name", "Name"]);
    let col_cluster = find_col(&headers, &["Cluster", "Cluster Name"]);
    let col_model = find_col(&headers, &["Model", "Hardware Model"]);
    let col_esxi = find_col(&headers, &["ESX Version", "ESXi Version", "Version"]);
    let col_vms = find_col(&headers, &["# VMs", "VMs", "Number of VMs", "#VMs"]);
    let col_cpu = find_col(&headers, &["CPU usage %", "CPU %", "CPU Usage %", "CPU%"]);
    let col_mem = find_col(&headers, &["Memory usage %", "Mem %", "Memory %", "Mem%"]);
    let col_svc = find_col(&headers, &["Service Tag", "Serial Number", "SN"]);
    let col_sockets = find_col(&headers, &["# CPU", "CPUs", "CPU Sockets", "Sockets", "Num CPU"]);
    let col_cores = find_col(
        &headers,
        &["Cores per CPU", "# Cores per CPU", "Cores Per Socket"],
    );

    let mut hosts = Vec::new();
    for row in range.rows().skip(1) {
        let hostname = cell_str(row, col_host);
        if hostname.is_empty() {
            continue;
        }

        let cluster = cell_str(row, col_cluster);
        let cluster = if cluster.is_empty() {
            "Default".to_string()
        } else {
            cluster
        };

        hosts.push(HostRecord {
            hostname,
            cluster,
            model: cell_str(row, col_model),
            esxi: short_version(&cell_str(row, col_esxi)),
            vm_count: cell_count(row, col_vms),
            cpu_pct: fmt_pct(&cell_str(row, col_cpu)),
            mem_pct: fmt_pct(&cell_str(row, col_mem)),
            service_tag: cell_str(row, col_svc),
            sockets: cell_count(row, col_sockets),
            cores_per_socket: cell_count(row, col_cores),
            compat: None,
        });
    }

    let vcenter_version = parse_vcenter_version(wb)?;

    debug!(
        site = site_name,
        hosts = hosts.len(),
        vcenter = %vcenter_version,
        "parsed RVTools export"
    );

    Ok(SiteInventory {
        site_name: site_name.to_string(),
        vcenter_version,
        clusters: group_by_cluster(hosts),
    })
}

/// Scan the vSource sheet for the vCenter version, if present.
fn parse_vcenter_version<RS: Read + Seek>(wb: &mut Workbook<RS>) -> Result<String> {
    let Some(vsource_sheet) = wb.find_sheet("vSource") else {
        return Ok(String::new());
    };
    let range = wb.range(&vsource_sheet)?;
    let headers = header_index(&range);
    let Some(col) = find_col(&headers, &["Fullname", "Full Name", "Version", "Name"]) else {
        return Ok(String::new());
    };

    for row in range.rows().skip(1) {
        let value = cell_str(row, Some(col));
        if value.is_empty() {
            continue;
        }
        if let Some(caps) = VCENTER_RE.captures(&value) {
            return Ok(caps[1].to_string());
        }
        if let Some(caps) = VERSION4_RE.captures(&value) {
            return Ok(caps[1].to_string());
        }
    }
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcenter_regex_named() {
        let caps = VCENTER_RE
            .captures("VMware vCenter Server 8.0.2 build-22385739")
            .unwrap();
        assert_eq!(&caps[1], "8.0.2");
    }

    #[test]
    fn test_vcenter_regex_case_insensitive() {
        assert!(VCENTER_RE.is_match("VCENTER SERVER 7.0.3"));
    }

    #[test]
    fn test_version4_fallback() {
        let caps = VERSION4_RE.captures("build 8.0.2.24321653").unwrap();
        assert_eq!(&caps[1], "8.0.2.24321653");
    }
}
