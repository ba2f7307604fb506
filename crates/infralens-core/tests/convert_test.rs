//! Integration tests for the full conversion pipeline.
//!
//! These build real xlsx fixtures, run the conversion, and inspect the
//! emitted Excalidraw document with serde_json.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use infralens_core::{
    convert, ConvertOptions, ConvertPhase, Deployment, HclSource, SiteFile,
};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// Minimal RVTools export: two hosts in one cluster.
fn write_rvtools_fixture(path: &Path) {
    let mut workbook = Workbook::new();
    let vhost = workbook.add_worksheet();
    vhost.set_name("vHost").unwrap();
    let headers = [
        "VM Host",
        "Cluster",
        "Model",
        "ESX Version",
        "# VMs",
        "# CPU",
        "Cores per CPU",
    ];
    for (col, header) in headers.iter().enumerate() {
        vhost.write_string(0, col as u16, *header).unwrap();
    }

    vhost.write_string(1, 0, "esx-ams-01").unwrap();
    vhost.write_string(1, 1, "Compute").unwrap();
    vhost.write_string(1, 2, "Dell Inc. PowerEdge R650").unwrap();
    vhost.write_string(1, 3, "7.0.3").unwrap();
    vhost.write_number(1, 4, 10.0).unwrap();
    vhost.write_number(1, 5, 2.0).unwrap();
    vhost.write_number(1, 6, 24.0).unwrap();

    vhost.write_string(2, 0, "esx-ams-02").unwrap();
    vhost.write_string(2, 1, "Compute").unwrap();
    vhost.write_string(2, 2, "Unlisted Server X1").unwrap();
    vhost.write_string(2, 3, "7.0.3").unwrap();
    vhost.write_number(2, 4, 5.0).unwrap();
    vhost.write_number(2, 5, 2.0).unwrap();
    vhost.write_number(2, 6, 8.0).unwrap();

    workbook.save(path).unwrap();
}

#[test]
fn test_convert_produces_valid_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rvtools_ams.xlsx");
    write_rvtools_fixture(&path);

    let files = vec![SiteFile::named(path, "Amsterdam")];
    let output = convert(&files, ConvertOptions::default(), None).unwrap();

    assert_eq!(output.sites.len(), 1);
    assert!(!output.compat_checked);
    assert!(output.readiness.is_none());
    assert!(output.license.is_none());

    let doc: serde_json::Value = serde_json::from_str(&output.document).unwrap();
    assert_eq!(doc["type"], "excalidraw");
    assert_eq!(doc["version"], 2);

    // zone + header + cluster bar + 2 hosts, each box with a label
    // except the zone: 4 labelled boxes -> 9 elements.
    let elements = doc["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 9);
    let rectangles = elements
        .iter()
        .filter(|e| e["type"] == "rectangle")
        .count();
    assert_eq!(rectangles, 5);
}

#[test]
fn test_convert_with_enrichment() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rvtools_ams.xlsx");
    write_rvtools_fixture(&path);

    let files = vec![SiteFile::named(path, "Amsterdam")];
    let options = ConvertOptions {
        hcl: Some(HclSource::Bundled),
        license: Some(Deployment::Vcf),
    };
    let output = convert(&files, options, None).unwrap();

    assert!(output.compat_checked);
    let readiness = output.readiness.as_ref().unwrap();
    assert_eq!(readiness.total(), 2);
    assert_eq!(readiness.compatible, 1);
    assert_eq!(readiness.incompatible, 1);

    // 2 sockets * 24 cores + 2 sockets * max(8, 16) cores
    let license = output.license.as_ref().unwrap();
    assert_eq!(license.total_cores, 48 + 32);

    // The legend renders when the compatibility check ran.
    let doc: serde_json::Value = serde_json::from_str(&output.document).unwrap();
    let ids: Vec<&str> = doc["elements"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["id"].as_str())
        .collect();
    assert!(ids.contains(&"legend"));
}

#[test]
fn test_convert_degrades_without_catalog() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rvtools_ams.xlsx");
    write_rvtools_fixture(&path);

    let files = vec![SiteFile::named(path, "Amsterdam")];
    let options = ConvertOptions {
        hcl: Some(HclSource::File(dir.path().join("missing_catalog.json"))),
        license: None,
    };
    let output = convert(&files, options, None).unwrap();

    // Catalog failed to load: diagram still produced, no annotation.
    assert!(!output.compat_checked);
    assert!(output.readiness.is_none());
    let doc: serde_json::Value = serde_json::from_str(&output.document).unwrap();
    assert!(doc["elements"]
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["id"] != "legend"));
}

#[test]
fn test_convert_reports_progress_phases() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rvtools_ams.xlsx");
    write_rvtools_fixture(&path);

    let parsed = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));
    let parsed_cb = Arc::clone(&parsed);
    let completed_cb = Arc::clone(&completed);

    let files = vec![SiteFile::named(path, "Amsterdam")];
    let callback: infralens_core::ProgressCallback = Box::new(move |progress| {
        match progress.phase {
            ConvertPhase::Parsing => {
                parsed_cb.store(progress.files_done, Ordering::SeqCst);
            }
            ConvertPhase::Complete => {
                completed_cb.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }
        assert_eq!(progress.files_total, 1);
    });

    convert(&files, ConvertOptions::default(), Some(callback)).unwrap();

    assert_eq!(parsed.load(Ordering::SeqCst), 1);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_convert_multiple_sites_offset_zones() {
    let dir = TempDir::new().unwrap();
    let path_a = dir.path().join("ams.xlsx");
    let path_b = dir.path().join("fra.xlsx");
    write_rvtools_fixture(&path_a);
    write_rvtools_fixture(&path_b);

    let files = vec![
        SiteFile::named(path_a, "Amsterdam"),
        SiteFile::named(path_b, "Frankfurt"),
    ];
    let output = convert(&files, ConvertOptions::default(), None).unwrap();

    assert_eq!(output.sites.len(), 2);
    assert_eq!(output.sites[0].site_name, "Amsterdam");
    assert_eq!(output.sites[1].site_name, "Frankfurt");

    let doc: serde_json::Value = serde_json::from_str(&output.document).unwrap();
    let elements = doc["elements"].as_array().unwrap();
    let zone = |id: &str| {
        elements
            .iter()
            .find(|e| e["id"] == id)
            .unwrap_or_else(|| panic!("missing {}", id))
    };
    let x0 = zone("site0")["x"].as_f64().unwrap();
    let x1 = zone("site1")["x"].as_f64().unwrap();
    // Second zone starts one zone width plus the gap to the right.
    assert_eq!(x1 - x0, 780.0 + 30.0);
}

#[test]
fn test_convert_rejects_missing_file() {
    let files = vec![SiteFile::new(std::path::PathBuf::from(
        "/does/not/exist.xlsx",
    ))];
    assert!(convert(&files, ConvertOptions::default(), None).is_err());
}
