use clap::Parser;
use std::path::PathBuf;

use dwiconn::{Parcellation, PhaseEncoding, ResponseAlgorithm, TrackingAlgorithm};

#[derive(Parser)]
#[command(name = "dwiconn", version, about = "DWI-to-connectome pipeline orchestrator")]
pub struct CliArgs {
    /// Subject list CSV: one `subject_id[,session_id]` per line
    #[arg(short = 's', long)]
    pub subjects: PathBuf,

    /// BIDS input root
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Derivatives output root
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// FreeSurfer subjects directory (default: {input}/derivatives/freesurfer)
    #[arg(long)]
    pub freesurfer_dir: Option<PathBuf>,

    /// Tractography algorithm passed to tckgen
    #[arg(long, value_enum, default_value_t = TrackingAlgorithm::IFod2)]
    pub algorithm: TrackingAlgorithm,

    /// Response-function estimation method
    #[arg(long, value_enum, default_value_t = ResponseAlgorithm::Tournier)]
    pub response: ResponseAlgorithm,

    /// Cortical parcellation for connectome nodes
    #[arg(long, value_enum, default_value_t = Parcellation::Desikan)]
    pub parcellation: Parcellation,

    /// Phase-encoding direction of the DWI acquisition
    #[arg(long, value_enum, default_value_t = PhaseEncoding::Ap)]
    pub phase_encoding: PhaseEncoding,

    /// Number of streamlines generated by tckgen
    #[arg(long, default_value_t = 10_000_000)]
    pub streamlines: u64,

    /// SIFT termination count (default: streamlines / 10)
    #[arg(long)]
    pub sift_count: Option<u64>,

    /// Disable anatomically constrained tractography
    #[arg(long, default_value_t = false)]
    pub no_act: bool,

    /// Threads forwarded to the MRtrix3 tools
    #[arg(long)]
    pub nthreads: Option<usize>,

    /// Re-run stages whose outputs already exist
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Print every external command without running it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Keep processing remaining subjects when one fails
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
