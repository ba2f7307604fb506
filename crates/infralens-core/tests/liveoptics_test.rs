//! Integration tests for LiveOptics export parsing.

use std::path::Path;

use infralens_core::inventory::parse_file;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// Write a LiveOptics-style export with host and performance sheets.
fn write_liveoptics_fixture(path: &Path) {
    let mut workbook = Workbook::new();

    let hosts = workbook.add_worksheet();
    hosts.set_name("ESX Hosts").unwrap();
    let headers = [
        "Host Name",
        "Cluster",
        "Model",
        "OS",
        "Guest VM Count",
        "Serial No",
        "vCenter",
        "CPU Sockets",
        "Cores Per Socket",
    ];
    for (col, header) in headers.iter().enumerate() {
        hosts.write_string(0, col as u16, *header).unwrap();
    }

    hosts.write_string(1, 0, "esx-fra-01").unwrap();
    hosts.write_string(1, 1, "Workload").unwrap();
    hosts.write_string(1, 2, "Lenovo ThinkSystem SR650 V3").unwrap();
    hosts.write_string(1, 3, "VMware ESXi 8.0.2 build-23305546").unwrap();
    hosts.write_number(1, 4, 55.0).unwrap();
    hosts.write_string(1, 5, "SN-0042").unwrap();
    hosts
        .write_string(1, 6, "VMware vCenter Server 8.0.2")
        .unwrap();
    hosts.write_number(1, 7, 2.0).unwrap();
    hosts.write_number(1, 8, 32.0).unwrap();

    // Host with no cluster: grouped under "Default".
    hosts.write_string(2, 0, "esx-fra-02").unwrap();
    hosts.write_string(2, 3, "VMware ESXi 7.0.3").unwrap();
    hosts.write_number(2, 4, 3.0).unwrap();

    let perf = workbook.add_worksheet();
    perf.set_name("ESX Performance").unwrap();
    perf.write_string(0, 0, "Host").unwrap();
    perf.write_string(0, 1, "Average CPU %").unwrap();
    perf.write_string(0, 2, "Average Memory %").unwrap();
    perf.write_string(1, 0, "esx-fra-01").unwrap();
    perf.write_number(1, 1, 48.2).unwrap();
    perf.write_number(1, 2, 71.9).unwrap();

    workbook.save(path).unwrap();
}

#[test]
fn test_parse_liveoptics_export() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("liveoptics_fra.xlsx");
    write_liveoptics_fixture(&path);

    let site = parse_file(&path, "Frankfurt").unwrap();

    assert_eq!(site.site_name, "Frankfurt");
    assert_eq!(site.vcenter_version, "8.0.2");
    assert_eq!(site.host_count(), 2);
    assert_eq!(site.vm_count(), 58);

    let first = &site.clusters[0].hosts[0];
    assert_eq!(first.hostname, "esx-fra-01");
    assert_eq!(first.cluster, "Workload");
    assert_eq!(first.model, "Lenovo ThinkSystem SR650 V3");
    assert_eq!(first.esxi, "8.0.2");
    assert_eq!(first.service_tag, "SN-0042");
    assert_eq!(first.sockets, 2);
    assert_eq!(first.cores_per_socket, 32);
}

#[test]
fn test_performance_sheet_joined_by_hostname() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("liveoptics_fra.xlsx");
    write_liveoptics_fixture(&path);

    let site = parse_file(&path, "Frankfurt").unwrap();

    let with_perf = &site.clusters[0].hosts[0];
    assert_eq!(with_perf.cpu_pct, "48%");
    assert_eq!(with_perf.mem_pct, "72%");

    // No performance row for the second host.
    let without_perf = &site.clusters[1].hosts[0];
    assert_eq!(without_perf.cpu_pct, "\u{2014}");
    assert_eq!(without_perf.mem_pct, "\u{2014}");
}

#[test]
fn test_missing_cluster_becomes_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("liveoptics_fra.xlsx");
    write_liveoptics_fixture(&path);

    let site = parse_file(&path, "Frankfurt").unwrap();

    assert_eq!(site.clusters.len(), 2);
    assert_eq!(site.clusters[1].name, "Default");
    assert_eq!(site.clusters[1].hosts[0].hostname, "esx-fra-02");
    assert_eq!(site.clusters[1].hosts[0].esxi, "7.0.3");
}
