//! InfraLens CLI - Turn VMware inventory exports into Excalidraw diagrams.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use infralens_core::{
    convert, parse_sites, ConvertOptions, ConvertPhase, ConvertProgress, Deployment, HclCatalog,
    HclSource, SiteFile,
};
use infralens_core::{hcl, report};

/// Turn RVTools and LiveOptics exports into an infrastructure diagram.
#[derive(Parser)]
#[command(name = "infralens")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an Excalidraw diagram from one or more exports.
    Generate {
        /// Export files (.xlsx), one per site.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Site name per file, in file order. Defaults to the file name.
        #[arg(short, long)]
        site: Vec<String>,

        /// Output path for the diagram.
        #[arg(short, long, default_value = "vmware_infrastructure.excalidraw")]
        output: PathBuf,

        /// Check hardware against the VCF 9 compatibility catalog.
        #[arg(long)]
        check_hcl: bool,

        /// Compatibility catalog JSON file (implies --check-hcl).
        #[arg(long, value_name = "PATH")]
        hcl_file: Option<PathBuf>,

        /// Compatibility catalog URL (implies --check-hcl).
        #[arg(long, value_name = "URL")]
        hcl_url: Option<String>,

        /// Also write a license report CSV for this deployment type.
        #[arg(long, value_enum, value_name = "TYPE")]
        license: Option<DeploymentArg>,

        /// Suppress progress output.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Display a summary of a single export.
    Info {
        /// Export file (.xlsx).
        file: PathBuf,

        /// Site name. Defaults to the file name.
        #[arg(short, long)]
        site: Option<String>,
    },

    /// Produce a VCF/VVF license sizing report.
    License {
        /// Export files (.xlsx), one per site.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Site name per file, in file order.
        #[arg(short, long)]
        site: Vec<String>,

        /// Deployment type to size for.
        #[arg(short, long, value_enum, default_value = "vcf")]
        deployment: DeploymentArg,

        /// Report format.
        #[arg(short, long, value_enum, default_value = "csv")]
        format: FormatArg,

        /// Output path. Prints to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Produce a VCF 9 hardware readiness report.
    Readiness {
        /// Export files (.xlsx), one per site.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Site name per file, in file order.
        #[arg(short, long)]
        site: Vec<String>,

        /// Compatibility catalog JSON file. Defaults to the bundled catalog.
        #[arg(long, value_name = "PATH")]
        hcl_file: Option<PathBuf>,

        /// Compatibility catalog URL.
        #[arg(long, value_name = "URL")]
        hcl_url: Option<String>,

        /// Report format.
        #[arg(short, long, value_enum, default_value = "csv")]
        format: FormatArg,

        /// Output path. Prints to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Deployment type argument mapping.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeploymentArg {
    /// VMware Cloud Foundation (1 TiB/core).
    Vcf,
    /// VMware vSphere Foundation (0.25 TiB/core).
    Vvf,
}

impl From<DeploymentArg> for Deployment {
    fn from(arg: DeploymentArg) -> Self {
        match arg {
            DeploymentArg::Vcf => Deployment::Vcf,
            DeploymentArg::Vvf => Deployment::Vvf,
        }
    }
}

/// Report format argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Comma-separated values.
    Csv,
    /// Fixed-width text.
    Txt,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            files,
            site,
            output,
            check_hcl,
            hcl_file,
            hcl_url,
            license,
            quiet,
        } => {
            let inputs = site_files(files, site);
            run_generate(
                &inputs,
                &output,
                hcl_source(check_hcl, hcl_file, hcl_url),
                license.map(Into::into),
                quiet,
            )?;
        }
        Commands::Info { file, site } => {
            let inputs = site_files(vec![file], site.into_iter().collect());
            show_info(&inputs)?;
        }
        Commands::License {
            files,
            site,
            deployment,
            format,
            output,
        } => {
            let inputs = site_files(files, site);
            run_license(&inputs, deployment.into(), format, output.as_deref())?;
        }
        Commands::Readiness {
            files,
            site,
            hcl_file,
            hcl_url,
            format,
            output,
        } => {
            let inputs = site_files(files, site);
            run_readiness(&inputs, hcl_file, hcl_url, format, output.as_deref())?;
        }
    }

    Ok(())
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("infralens_core=debug,infralens_cli=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Pair input paths with site-name overrides, in order.
fn site_files(files: Vec<PathBuf>, names: Vec<String>) -> Vec<SiteFile> {
    files
        .into_iter()
        .enumerate()
        .map(|(i, path)| match names.get(i) {
            Some(name) => SiteFile::named(path, name.clone()),
            None => SiteFile::new(path),
        })
        .collect()
}

/// Resolve the catalog source for `generate`; `None` disables the check.
fn hcl_source(
    check_hcl: bool,
    hcl_file: Option<PathBuf>,
    hcl_url: Option<String>,
) -> Option<HclSource> {
    if let Some(path) = hcl_file {
        Some(HclSource::File(path))
    } else if let Some(url) = hcl_url {
        Some(HclSource::Url(url))
    } else if check_hcl {
        Some(HclSource::Bundled)
    } else {
        None
    }
}

fn run_generate(
    inputs: &[SiteFile],
    output: &Path,
    hcl: Option<HclSource>,
    license: Option<Deployment>,
    quiet: bool,
) -> Result<()> {
    let options = ConvertOptions {
        hcl,
        license,
    };

    // Set up progress tracking
    let progress_bar: Option<Arc<Mutex<ProgressBar>>> = if quiet {
        None
    } else {
        let pb = ProgressBar::new(inputs.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("#>-");
        pb.set_style(style);
        Some(Arc::new(Mutex::new(pb)))
    };

    let callback: Option<infralens_core::ProgressCallback> =
        if let Some(pb_arc) = progress_bar.clone() {
            Some(Box::new(move |progress: ConvertProgress| {
                let pb = pb_arc.lock().unwrap();
                pb.set_position(progress.files_done as u64);
                let phase_msg = match progress.phase {
                    ConvertPhase::Parsing => "parsing...",
                    ConvertPhase::Enriching => "enriching...",
                    ConvertPhase::Layout => "laying out...",
                    ConvertPhase::Serializing => "serializing...",
                    ConvertPhase::Complete => "done",
                };
                pb.set_message(phase_msg.to_string());
            }))
        } else {
            None
        };

    let result = convert(inputs, options, callback)?;

    if let Some(pb_arc) = progress_bar {
        let pb = pb_arc.lock().unwrap();
        pb.finish_with_message("done");
    }

    std::fs::write(output, &result.document)
        .with_context(|| format!("writing {}", output.display()))?;

    if let Some(report) = &result.license {
        let path = license_report_path(output, report.deployment);
        std::fs::write(&path, report::license_csv(report))
            .with_context(|| format!("writing {}", path.display()))?;
        if !quiet {
            println!("License report: {}", path.display());
        }
    }

    if !quiet {
        println!();
        println!("Diagram written to {}", output.display());
        let hosts: usize = result.sites.iter().map(|s| s.host_count()).sum();
        let vms: u64 = result.sites.iter().map(|s| s.vm_count()).sum();
        println!(
            "Sites: {}   Hosts: {}   VMs: {}",
            result.sites.len(),
            hosts,
            vms
        );
        if let Some(readiness) = &result.readiness {
            println!(
                "VCF 9 ready: {} of {} hosts ({} unknown)",
                readiness.compatible,
                readiness.total(),
                readiness.unknown
            );
        }
        println!("Open the diagram at https://excalidraw.com");
    }

    Ok(())
}

fn show_info(inputs: &[SiteFile]) -> Result<()> {
    let sites = parse_sites(inputs)?;

    for site in &sites {
        println!("Site Information");
        println!("================");
        println!();
        println!("Site:     {}", site.site_name);
        if site.vcenter_version.is_empty() {
            println!("vCenter:  unknown");
        } else {
            println!("vCenter:  {}", site.vcenter_version);
        }
        println!("Clusters: {}", site.clusters.len());
        println!("Hosts:    {}", site.host_count());
        println!("VMs:      {}", site.vm_count());
        println!();

        if site.clusters.is_empty() {
            println!("No hosts found.");
        } else {
            println!("Clusters:");
            for (i, cluster) in site.clusters.iter().enumerate() {
                let vms: u64 = cluster.hosts.iter().map(|h| u64::from(h.vm_count)).sum();
                println!(
                    "  {}. {} - {} hosts, {} VMs",
                    i + 1,
                    cluster.name,
                    cluster.hosts.len(),
                    vms
                );
            }
        }
    }

    Ok(())
}

fn run_license(
    inputs: &[SiteFile],
    deployment: Deployment,
    format: FormatArg,
    output: Option<&Path>,
) -> Result<()> {
    let sites = parse_sites(inputs)?;
    let license = infralens_core::license::calculate(&sites, deployment);
    let content = match format {
        FormatArg::Csv => report::license_csv(&license),
        FormatArg::Txt => report::license_txt(&license),
    };
    write_report(&content, output)?;
    if license.missing_count > 0 {
        eprintln!(
            "warning: {} host(s) had no socket/core data and were excluded from totals",
            license.missing_count
        );
    }
    Ok(())
}

fn run_readiness(
    inputs: &[SiteFile],
    hcl_file: Option<PathBuf>,
    hcl_url: Option<String>,
    format: FormatArg,
    output: Option<&Path>,
) -> Result<()> {
    let catalog = match (hcl_file, hcl_url) {
        (Some(path), _) => HclCatalog::from_path(&path)?,
        (None, Some(url)) => HclCatalog::fetch(&url)?,
        (None, None) => HclCatalog::bundled()?,
    };

    let mut sites = parse_sites(inputs)?;
    hcl::annotate(&mut sites, &catalog);
    let readiness = hcl::build_readiness_report(&sites);

    let content = match format {
        FormatArg::Csv => report::readiness_csv(&readiness),
        FormatArg::Txt => report::readiness_txt(&readiness),
    };
    write_report(&content, output)
}

fn write_report(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Path of the license CSV written next to the diagram.
fn license_report_path(diagram: &Path, deployment: Deployment) -> PathBuf {
    diagram.with_file_name(format!("license_report_{}.csv", deployment.code()))
}
