//! LiveOptics export parsing.
//!
//! Host rows come from the `ESX Hosts` sheet. Utilisation percentages
//! live in the separate `ESX Performance` sheet, joined by hostname;
//! the export carries the vCenter version on each host row.

use std::collections::HashMap;
use std::io::{Read, Seek};

use tracing::debug;

use super::sheet::{cell_count, cell_str, find_col, fmt_pct, header_index, Workbook};
use super::{find_version3, group_by_cluster, HostRecord, SiteInventory};
use crate::error::{Error, Result};

/// Parse a LiveOptics workbook into a site inventory.
pub(super) fn parse<RS: Read + Seek>(
    wb: &mut Workbook<RS>,
    site_name: &str,
) -> Result<SiteInventory> {
    let hosts_sheet = wb
        .find_sheet("ESX Hosts")
        .ok_or_else(|| Error::inventory(format!("No 'ESX Hosts' sheet found in {}", site_name)))?;
    let range = wb.range(&hosts_sheet)?;
    let headers = header_index(&range);

    let col_host = find_col(&headers, &["Host Name"]);
    let col_cluster = find_col(&headers, &["Cluster"]);
    let col_model = find_col(&headers, &["Model"]);
    let col_os = find_col(&headers, &["OS"]);
    let col_vms = find_col(&headers, &["Guest VM Count"]);
    let col_serial = find_col(&headers, &["Serial No"]);
    let col_vcenter = find_col(&headers, &["vCenter"]);
    let col_sockets = find_col(&headers, &["CPU Sockets", "Sockets"]);
    let col_cores = find_col(&headers, &["Cores Per Socket", "Cores per CPU"]);

    let perf = parse_performance(wb)?;

    let mut vcenter_version = String::new();
    let mut hosts = Vec::new();
    for row in range.rows().skip(1) {
        let hostname = cell_str(row, col_host);
        if hostname.is_empty() {
            continue;
        }

        // vCenter version comes from the first host row that carries one.
        if vcenter_version.is_empty() {
            if let Some(v) = find_version3(&cell_str(row, col_vcenter)) {
                vcenter_version = v;
            }
        }

        let cluster = cell_str(row, col_cluster);
        let cluster = if cluster.is_empty() {
            "Default".to_string()
        } else {
            cluster
        };

        // The OS field reads like "VMware ESXi 7.0.3 build-20328353".
        let esxi = find_version3(&cell_str(row, col_os)).unwrap_or_default();

        let (cpu_pct, mem_pct) = perf
            .get(&hostname)
            .cloned()
            .unwrap_or_else(|| (fmt_pct(""), fmt_pct("")));

        hosts.push(HostRecord {
            hostname,
            cluster,
            model: cell_str(row, col_model),
            esxi,
            vm_count: cell_count(row, col_vms),
            cpu_pct,
            mem_pct,
            service_tag: cell_str(row, col_serial),
            sockets: cell_count(row, col_sockets),
            cores_per_socket: cell_count(row, col_cores),
            compat: None,
        });
    }

    debug!(
        site = site_name,
        hosts = hosts.len(),
        vcenter = %vcenter_version,
        "parsed LiveOptics export"
    );

    Ok(SiteInventory {
        site_name: site_name.to_string(),
        vcenter_version,
        clusters: group_by_cluster(hosts),
    })
}

/// Build a hostname → (cpu %, mem %) map from the performance sheet.
fn parse_performance<RS: Read + Seek>(
    wb: &mut Workbook<RS>,
) -> Result<HashMap<String, (String, String)>> {
    let mut perf = HashMap::new();
    let Some(perf_sheet) = wb.find_sheet("ESX Performance") else {
        return Ok(perf);
    };
    let range = wb.range(&perf_sheet)?;
    let headers = header_index(&range);
    let col_host = find_col(&headers, &["Host"]);
    let col_cpu = find_col(&headers, &["Average CPU %"]);
    let col_mem = find_col(&headers, &["Average Memory %"]);

    for row in range.rows().skip(1) {
        let hostname = cell_str(row, col_host);
        if hostname.is_empty() {
            continue;
        }
        let cpu = fmt_pct(&cell_str(row, col_cpu));
        let mem = fmt_pct(&cell_str(row, col_mem));
        perf.entry(hostname).or_insert((cpu, mem));
    }
    Ok(perf)
}
