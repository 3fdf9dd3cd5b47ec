//! Per-subject stage driver.
//!
//! Each stage group builds its external command lines up front
//! ([`plan_subject`]) and the driver then executes them strictly in order:
//! build argv, spawn, block, verify the expected artifact appeared. A stage
//! whose outputs already exist is skipped unless `force` is set, which gives
//! interrupted runs cheap resume behavior. Nothing is rolled back on
//! failure; intermediates stay on disk for inspection.
pub mod anat;
pub mod connectome;
pub mod convert;
pub mod denoise;
pub mod fod;
pub mod preproc;
pub mod tract;

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::core::params::PipelineParams;
use crate::error::{Error, Result};
use crate::io::layout::{BidsLayout, RawInputs, SubjectDirs};
use crate::io::subjects::Subject;
use crate::io::tools::ToolCommand;
use crate::types::Stage;

/// Everything a stage needs to build its command lines.
pub struct StageCtx<'a> {
    pub raw: &'a RawInputs,
    pub dirs: &'a SubjectDirs,
    pub layout: &'a BidsLayout,
    pub subject: &'a Subject,
    pub params: &'a PipelineParams,
}

/// One stage, fully planned: the commands to run and the artifacts that
/// must exist afterwards.
pub struct PlannedStage {
    pub stage: Stage,
    pub commands: Vec<ToolCommand>,
    pub outputs: Vec<PathBuf>,
}

impl PlannedStage {
    fn complete(&self) -> bool {
        !self.outputs.is_empty() && self.outputs.iter().all(|p| p.exists())
    }
}

/// The full per-subject plan, in execution order.
pub struct SubjectPlan {
    pub subject: Subject,
    pub stages: Vec<PlannedStage>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub enum StageStatus {
    Ran,
    Skipped,
}

/// Per-stage record of what a subject run actually did.
#[derive(Debug, Clone, Serialize)]
pub struct StageRun {
    pub stage: Stage,
    pub status: StageStatus,
}

/// Build the complete plan for one subject. Raw-input and FreeSurfer checks
/// happen here, before any command exists, so a subject with missing data
/// never reaches a spawn.
pub fn plan_subject(
    layout: &BidsLayout,
    dirs: &SubjectDirs,
    subject: &Subject,
    params: &PipelineParams,
) -> Result<SubjectPlan> {
    let raw = layout.raw_inputs(subject);
    raw.check(subject)?;

    let aseg = layout.freesurfer_aseg(subject, params.parcellation);
    if !aseg.is_file() {
        return Err(Error::MissingInput {
            subject: subject.label(),
            path: aseg,
        });
    }

    let ctx = StageCtx {
        raw: &raw,
        dirs,
        layout,
        subject,
        params,
    };

    let stages = vec![
        convert::plan(&ctx),
        denoise::plan(&ctx),
        preproc::plan_preproc(&ctx),
        preproc::plan_bias_correct(&ctx),
        fod::plan_mask(&ctx),
        fod::plan_response(&ctx),
        fod::plan_fod(&ctx),
        anat::plan_brain_extract(&ctx),
        anat::plan_register(&ctx),
        anat::plan_segment(&ctx),
        anat::plan_parcellate(&ctx),
        tract::plan_tractography(&ctx),
        tract::plan_sift(&ctx),
        connectome::plan(&ctx),
    ];

    Ok(SubjectPlan {
        subject: subject.clone(),
        stages,
    })
}

/// Execute a plan stage by stage. The first failure aborts this subject.
pub fn run_plan(plan: &SubjectPlan, params: &PipelineParams) -> Result<Vec<StageRun>> {
    let mut runs = Vec::with_capacity(plan.stages.len());

    for planned in &plan.stages {
        if !params.force && planned.complete() {
            info!(
                subject = %plan.subject,
                stage = %planned.stage,
                "outputs exist, skipping"
            );
            runs.push(StageRun {
                stage: planned.stage,
                status: StageStatus::Skipped,
            });
            continue;
        }

        info!(subject = %plan.subject, stage = %planned.stage, "starting");
        for command in &planned.commands {
            command.run(params.dry_run)?;
        }

        if !params.dry_run {
            for output in &planned.outputs {
                if !output.exists() {
                    return Err(Error::StageOutputMissing {
                        stage: planned.stage,
                        path: output.clone(),
                    });
                }
            }
        }

        runs.push(StageRun {
            stage: planned.stage,
            status: StageStatus::Ran,
        });
    }

    Ok(runs)
}

/// Plan and execute one subject end to end.
pub fn run_subject(
    layout: &BidsLayout,
    output_root: &std::path::Path,
    subject: &Subject,
    params: &PipelineParams,
) -> Result<Vec<StageRun>> {
    let dirs = SubjectDirs::new(output_root, subject);
    let plan = plan_subject(layout, &dirs, subject, params)?;
    if !params.dry_run {
        dirs.create()?;
    }
    run_plan(&plan, params)
}
