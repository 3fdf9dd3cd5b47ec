#![doc = r#"
dwiconn — a batch orchestrator for DWI-to-structural-connectome pipelines.

This crate drives the standard diffusion tractography workflow — `.mif`
import, denoising, eddy/distortion correction, bias correction, CSD fiber
orientation distributions, T1 registration, tissue segmentation, FreeSurfer
parcellation, streamline tractography, SIFT filtering, and connectome
assembly — by invoking the external MRtrix3, FSL, ANTs and FreeSurfer
binaries in a fixed order. No imaging algorithm is implemented here: the
crate parses a subject list, resolves file paths by naming convention,
checks inputs exist, and propagates external exit codes.

Requirements
------------
- MRtrix3, FSL and ANTs installed and on PATH.
- FreeSurfer `recon-all` outputs for each subject (run out-of-band).
- Input data organized as a BIDS tree.

Quick start: process a subject list
-----------------------------------
```rust,no_run
use std::path::Path;
use dwiconn::{process_subject_list, BidsLayout, PipelineParams, read_subject_list};

fn main() -> dwiconn::Result<()> {
    let subjects = read_subject_list(Path::new("subjects.csv"))?;
    let layout = BidsLayout::new("/data/bids");
    let params = PipelineParams::default();

    let report = process_subject_list(
        &layout,
        Path::new("/data/derivatives/dwiconn"),
        &subjects,
        &params,
        true, // continue_on_error
    )?;

    println!(
        "processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(())
}
```

Single subject
--------------
```rust,no_run
use std::path::Path;
use dwiconn::{process_subject, BidsLayout, PipelineParams, Subject};

fn main() -> dwiconn::Result<()> {
    let layout = BidsLayout::new("/data/bids");
    let subject = Subject::new("01", Some("01"));
    let runs = process_subject(
        &layout,
        Path::new("/data/derivatives/dwiconn"),
        &subject,
        &PipelineParams::default(),
    )?;
    for run in runs {
        println!("{}: {:?}", run.stage, run.status);
    }
    Ok(())
}
```

Error handling
--------------
All public functions return `dwiconn::Result<T>`; match on `dwiconn::Error`
to handle specific cases, e.g. a missing raw input versus a failing external
tool.

```rust,no_run
use std::path::Path;
use dwiconn::{process_subject, BidsLayout, Error, PipelineParams, Subject};

fn main() {
    let layout = BidsLayout::new("/data/bids");
    let subject = Subject::new("01", None);
    match process_subject(&layout, Path::new("/out"), &subject, &PipelineParams::default()) {
        Ok(_) => {}
        Err(Error::MissingInput { subject, path }) => {
            eprintln!("{subject} is missing {}", path.display())
        }
        Err(Error::Tool(e)) => eprintln!("external tool failed: {e}"),
        Err(other) => eprintln!("error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`] — high-level, ergonomic entry points.
- [`types`] — enums and core types (e.g. `Stage`, `TrackingAlgorithm`).
- [`io`] — subject lists, BIDS path conventions, external-tool wrappers.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::params::PipelineParams;
pub use crate::error::{Error, Result};
pub use crate::types::{Parcellation, PhaseEncoding, ResponseAlgorithm, Stage, TrackingAlgorithm};

// I/O layer
pub use crate::io::layout::{BidsLayout, RawInputs, SubjectDirs};
pub use crate::io::subjects::{Subject, SubjectListError, read_subject_list};
pub use crate::io::tools::{Tool, ToolCommand, ToolError, verify_toolchain};

// Pipeline primitives
pub use crate::core::pipeline::{StageRun, StageStatus, plan_subject, run_subject};

// High-level API re-exports
pub use crate::api::{BatchReport, process_subject, process_subject_list};
