use tracing::info;

use dwiconn::core::params::PipelineParams;
use dwiconn::io::tools::{Tool, verify_toolchain};
use dwiconn::io::{BidsLayout, read_subject_list};
use dwiconn::process_subject_list;

use super::args::CliArgs;
use super::errors::AppError;

fn params_from_args(args: &CliArgs) -> Result<PipelineParams, AppError> {
    if args.streamlines == 0 {
        return Err(AppError::ZeroStreamlines);
    }
    if let Some(sift) = args.sift_count {
        if sift > args.streamlines {
            return Err(AppError::SiftExceedsStreamlines {
                sift,
                streamlines: args.streamlines,
            });
        }
    }

    Ok(PipelineParams {
        algorithm: args.algorithm,
        response: args.response,
        parcellation: args.parcellation,
        phase_encoding: args.phase_encoding,
        streamlines: args.streamlines,
        sift_count: args.sift_count,
        act: !args.no_act,
        nthreads: args.nthreads,
        force: args.force,
        dry_run: args.dry_run,
    })
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    }

    let params = params_from_args(&args)?;

    if !args.input.is_dir() {
        return Err(AppError::MissingInputDir {
            path: args.input.display().to_string(),
        }
        .into());
    }

    let subjects = read_subject_list(&args.subjects).map_err(AppError::from)?;
    info!("loaded {} subject(s) from {:?}", subjects.len(), args.subjects);

    let mut layout = BidsLayout::new(&args.input);
    if let Some(fs_dir) = &args.freesurfer_dir {
        layout = layout.with_freesurfer_root(fs_dir);
    }

    // Fail before the first subject if anything is missing from PATH.
    if !params.dry_run {
        verify_toolchain(Tool::required())?;
    }

    let report = process_subject_list(
        &layout,
        &args.output,
        &subjects,
        &params,
        args.continue_on_error,
    )?;

    info!(
        "processed: {} skipped: {} errors: {}",
        report.processed, report.skipped, report.errors
    );

    if report.errors > 0 {
        return Err(format!("{} subject(s) failed", report.errors).into());
    }
    Ok(())
}
