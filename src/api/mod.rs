//! High-level, ergonomic library API: run the pipeline for one subject or a
//! whole subject list, and write a JSON run report next to the outputs.
//! Prefer these entrypoints over the low-level pipeline modules when
//! embedding dwiconn.
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::core::params::PipelineParams;
use crate::core::pipeline::{self, StageRun, StageStatus};
use crate::error::Result;
use crate::io::layout::BidsLayout;
use crate::io::subjects::Subject;

/// Outcome counts for a batch run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BatchReport {
    /// Subjects for which at least one stage actually ran.
    pub processed: usize,
    /// Subjects whose outputs were already complete.
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Serialize)]
struct SubjectReport {
    subject: String,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    stages: Vec<StageRun>,
}

/// Provenance record written to `{output}/dwiconn-report.json` after a batch.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    started: DateTime<Utc>,
    finished: DateTime<Utc>,
    params: &'a PipelineParams,
    report: BatchReport,
    subjects: Vec<SubjectReport>,
}

/// Run the full pipeline for a single subject.
pub fn process_subject(
    layout: &BidsLayout,
    output_root: &Path,
    subject: &Subject,
    params: &PipelineParams,
) -> Result<Vec<StageRun>> {
    pipeline::run_subject(layout, output_root, subject, params)
}

/// Run the pipeline for every subject in the list, strictly sequentially.
///
/// With `continue_on_error` a failing subject is logged and counted, and the
/// batch moves on; otherwise the first failure aborts the batch. Intermediate
/// files of a failed subject are left in place for inspection.
pub fn process_subject_list(
    layout: &BidsLayout,
    output_root: &Path,
    subjects: &[Subject],
    params: &PipelineParams,
    continue_on_error: bool,
) -> Result<BatchReport> {
    let started = Utc::now();
    let mut report = BatchReport::default();
    let mut subject_reports = Vec::with_capacity(subjects.len());

    for subject in subjects {
        info!(subject = %subject, "processing");
        match process_subject(layout, output_root, subject, params) {
            Ok(runs) => {
                if runs.iter().all(|r| r.status == StageStatus::Skipped) {
                    info!(subject = %subject, "already complete");
                    report.skipped += 1;
                    subject_reports.push(SubjectReport {
                        subject: subject.label(),
                        outcome: "skipped",
                        error: None,
                        stages: runs,
                    });
                } else {
                    info!(subject = %subject, "done");
                    report.processed += 1;
                    subject_reports.push(SubjectReport {
                        subject: subject.label(),
                        outcome: "ok",
                        error: None,
                        stages: runs,
                    });
                }
            }
            Err(e) if continue_on_error => {
                warn!(subject = %subject, "failed: {e}");
                report.errors += 1;
                subject_reports.push(SubjectReport {
                    subject: subject.label(),
                    outcome: "error",
                    error: Some(e.to_string()),
                    stages: Vec::new(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    if !params.dry_run {
        write_report(
            output_root,
            &RunReport {
                started,
                finished: Utc::now(),
                params,
                report,
                subjects: subject_reports,
            },
        )?;
    }

    info!(
        "batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}

fn write_report(output_root: &Path, report: &RunReport) -> Result<()> {
    fs::create_dir_all(output_root)?;
    let path = output_root.join("dwiconn-report.json");
    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    fs::write(&path, json)?;
    info!("run report written to {:?}", path);
    Ok(())
}
