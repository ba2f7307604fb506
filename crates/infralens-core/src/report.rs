//! Report exports: CSV and fixed-width text.
//!
//! The text renderings follow the PowerShell sizing-script conventions
//! the reports get compared against: upper-case underscored headers,
//! dash separator lines, numbers right-justified, `-` for missing
//! values.

use crate::hcl::ReadinessReport;
use crate::license::LicenseReport;

/// Quote a CSV field, doubling embedded quotes.
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn pad_left(value: &str, width: usize) -> String {
    format!("{:<width$}", value, width = width)
}

fn pad_right(value: &str, width: usize) -> String {
    format!("{:>width$}", value, width = width)
}

/// Render a license report as CSV with a trailing totals row.
pub fn license_csv(report: &LicenseReport) -> String {
    let mut lines = vec![
        "Site,Cluster,Hostname,Sockets,Cores per Socket,Foundation Cores,Entitled TiB".to_string(),
    ];
    for row in &report.rows {
        let cores = if row.missing {
            String::new()
        } else {
            row.foundation_cores.to_string()
        };
        let tib = if row.missing {
            String::new()
        } else {
            format!("{:.2}", row.entitled_tib)
        };
        lines.push(csv_row(&[
            &row.site,
            &row.cluster,
            &row.hostname,
            &row.sockets.to_string(),
            &row.cores_per_socket.to_string(),
            &cores,
            &tib,
        ]));
    }
    lines.push(csv_row(&[
        "Total",
        "",
        "",
        "",
        "",
        &report.total_cores.to_string(),
        &format!("{:.2}", report.total_tib),
    ]));
    lines.join("\n")
}

/// Render a license report as a fixed-width sizing summary.
pub fn license_txt(report: &LicenseReport) -> String {
    const HDRS: [&str; 6] = [
        "CLUSTER",
        "VMHOST",
        "NUM_CPU_SOCKETS",
        "NUM_CPU_CORES_PER_SOCKET",
        "FOUNDATION_LICENSE_CORE_COUNT",
        "VSAN_LICENSE_TIB_COUNT",
    ];

    let cells: Vec<[String; 6]> = report
        .rows
        .iter()
        .map(|row| {
            if row.missing {
                [
                    row.cluster.clone(),
                    row.hostname.clone(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ]
            } else {
                [
                    row.cluster.clone(),
                    row.hostname.clone(),
                    row.sockets.to_string(),
                    row.cores_per_socket.to_string(),
                    row.foundation_cores.to_string(),
                    format!("{:.2}", row.entitled_tib),
                ]
            }
        })
        .collect();

    let total_cores = report.total_cores.to_string();
    let total_tib = format!("{:.2}", report.total_tib);

    let mut cols: [usize; 6] = std::array::from_fn(|i| HDRS[i].len());
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            cols[i] = cols[i].max(cell.len());
        }
    }
    cols[0] = cols[0].max("Total".len());
    cols[4] = cols[4].max(total_cores.len());
    cols[5] = cols[5].max(total_tib.len());

    // Columns 0 and 1 are names, the rest are numbers.
    let render_row = |row: &[String; 6]| -> String {
        row.iter()
            .enumerate()
            .map(|(i, cell)| {
                if i < 2 {
                    pad_left(cell, cols[i])
                } else {
                    pad_right(cell, cols[i])
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut lines = vec![
        format!("Sizing Results for {}:", report.deployment.full_name()),
        String::new(),
        "Host Information".to_string(),
        String::new(),
        HDRS.iter()
            .enumerate()
            .map(|(i, h)| {
                if i < 2 {
                    pad_left(h, cols[i])
                } else {
                    pad_right(h, cols[i])
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
        cols.iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(" "),
    ];
    for row in &cells {
        lines.push(render_row(row));
    }
    lines.push(render_row(&[
        "Total".to_string(),
        "-".to_string(),
        "-".to_string(),
        "-".to_string(),
        total_cores.clone(),
        total_tib.clone(),
    ]));

    // Per-cluster roll-up.
    lines.push(String::new());
    lines.push("Cluster Information".to_string());
    lines.push(String::new());

    let rollup = report.cluster_tib();
    let c_hdr = "CLUSTER";
    let t_hdr = "VSAN_ENTITLED_TIB";
    let cw0 = rollup
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0)
        .max(c_hdr.len())
        .max("Total".len());
    let cluster_total: f64 = rollup.iter().map(|(_, tib)| tib).sum();
    let cluster_total_str = format!("{:.2}", cluster_total);
    let cw1 = rollup
        .iter()
        .map(|(_, tib)| format!("{:.2}", tib).len())
        .max()
        .unwrap_or(0)
        .max(t_hdr.len())
        .max(cluster_total_str.len());

    lines.push(format!("{} {}", pad_left(c_hdr, cw0), pad_right(t_hdr, cw1)));
    lines.push(format!("{} {}", "-".repeat(cw0), "-".repeat(cw1)));
    for (name, tib) in &rollup {
        lines.push(format!(
            "{} {}",
            pad_left(name, cw0),
            pad_right(&format!("{:.2}", tib), cw1)
        ));
    }
    lines.push(format!(
        "{} {}",
        pad_left("Total", cw0),
        pad_right(&cluster_total_str, cw1)
    ));

    lines.push(String::new());
    lines.push(format!(
        "Total Required {} Compute Licenses: {}",
        report.deployment.code(),
        report.total_cores
    ));
    lines.push(
        "Total Required vSAN Add-on Licenses: N/A (requires actual vSAN capacity data)"
            .to_string(),
    );
    lines.push(String::new());
    lines.join("\n")
}

/// Render a readiness report as CSV.
pub fn readiness_csv(report: &ReadinessReport) -> String {
    let mut lines = vec!["Site,Cluster,Hostname,Model,ESXi Version,VCF9 Status".to_string()];
    for row in &report.rows {
        lines.push(csv_row(&[
            &row.site,
            &row.cluster,
            &row.hostname,
            &row.model,
            &row.esxi,
            &row.label,
        ]));
    }
    lines.join("\n")
}

/// Render a readiness report as a fixed-width table with summary counts.
pub fn readiness_txt(report: &ReadinessReport) -> String {
    const HDRS: [&str; 6] = [
        "SITE",
        "CLUSTER",
        "HOSTNAME",
        "MODEL",
        "ESXI_VERSION",
        "VCF9_STATUS",
    ];

    let mut cols: [usize; 6] = std::array::from_fn(|i| HDRS[i].len());
    for row in &report.rows {
        cols[0] = cols[0].max(row.site.len());
        cols[1] = cols[1].max(row.cluster.len());
        cols[2] = cols[2].max(row.hostname.len());
        cols[3] = cols[3].max(row.model.len());
        cols[4] = cols[4].max(row.esxi.len());
        cols[5] = cols[5].max(row.label.len());
    }

    let mut lines = vec![
        "VCF 9 Readiness Report".to_string(),
        String::new(),
        format!(
            "Total: {}  |  Compatible: {}  |  Not Compatible: {}  |  Unknown: {}",
            report.total(),
            report.compatible,
            report.incompatible,
            report.unknown
        ),
        String::new(),
        HDRS.iter()
            .enumerate()
            .map(|(i, h)| pad_left(h, cols[i]))
            .collect::<Vec<_>>()
            .join(" "),
        cols.iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(" "),
    ];
    for row in &report.rows {
        lines.push(
            [
                pad_left(&row.site, cols[0]),
                pad_left(&row.cluster, cols[1]),
                pad_left(&row.hostname, cols[2]),
                pad_left(&row.model, cols[3]),
                pad_left(&row.esxi, cols[4]),
                pad_left(&row.label, cols[5]),
            ]
            .join(" "),
        );
    }
    lines.push(String::new());
    lines.join("\n")
}
