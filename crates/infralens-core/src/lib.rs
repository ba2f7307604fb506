//! InfraLens Core Library
//!
//! This crate converts VMware inventory exports (RVTools and LiveOptics
//! `.xlsx` files) into Excalidraw infrastructure diagrams, with optional
//! VCF 9 hardware-compatibility annotation and VCF/VVF license sizing.
//!
//! # Overview
//!
//! Each export file becomes a site: hosts grouped into clusters, laid
//! out as colour-coded boxes in a deterministic grid and serialized to
//! the Excalidraw file format. The main entry point is the [`convert`]
//! function which runs the full pipeline.
//!
//! # Modules
//!
//! - [`error`] - Error types and Result alias
//! - [`inventory`] - Export parsing (RVTools, LiveOptics) and the
//!   normalized site/cluster/host model
//! - [`hcl`] - VCF 9 hardware compatibility catalog and readiness report
//! - [`license`] - VCF/VVF foundation-core license calculation
//! - [`layout`] - Grid layout producing box primitives
//! - [`excalidraw`] - Excalidraw document serialization
//! - [`report`] - CSV and fixed-width text report exports
//! - [`convert`] - Conversion orchestrator coordinating the pipeline
//!
//! # Quick Start
//!
//! ```no_run
//! use infralens_core::{convert, ConvertOptions, SiteFile};
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     SiteFile::named(PathBuf::from("/exports/ams.xlsx"), "Amsterdam"),
//!     SiteFile::named(PathBuf::from("/exports/fra.xlsx"), "Frankfurt"),
//! ];
//! let output = convert(&files, ConvertOptions::default(), None).unwrap();
//! std::fs::write("infrastructure.excalidraw", output.document).unwrap();
//! ```

pub mod convert;
pub mod error;
pub mod excalidraw;
pub mod hcl;
pub mod inventory;
pub mod layout;
pub mod license;
pub mod report;

pub use error::{Error, Result};

// Re-export the main conversion surface for convenience
pub use convert::{
    convert, parse_sites, ConvertOptions, ConvertOutput, ConvertPhase, ConvertProgress,
    HclSource, ProgressCallback, SiteFile,
};

// Re-export the types CLI consumers reach for most often
pub use hcl::{CompatStatus, HclCatalog, ReadinessReport};
pub use inventory::{HostRecord, SiteInventory};
pub use license::Deployment;
