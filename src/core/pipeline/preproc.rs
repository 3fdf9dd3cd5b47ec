//! Stages 3–4: distortion/motion correction and bias-field correction.
//!
//! `dwipreproc` wraps FSL eddy. The acquisitions this pipeline targets have
//! no reverse-phase-encoding pair, so susceptibility correction is limited
//! to `-rpe_none` with the acquisition's phase-encoding direction. Bias
//! correction uses the ANTs N4 backend.
use super::{PlannedStage, StageCtx};
use crate::io::tools::{Tool, ToolCommand};
use crate::types::Stage;

pub fn plan_preproc(ctx: &StageCtx) -> PlannedStage {
    let out = ctx.dirs.dwi_preproc();

    let cmd = ToolCommand::new(Tool::DwiPreproc)
        .path(&ctx.dirs.dwi_denoised())
        .path(&out)
        .arg("-rpe_none")
        .arg("-pe_dir")
        .arg(ctx.params.phase_encoding.as_pe_dir())
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    PlannedStage {
        stage: Stage::Preproc,
        commands: vec![cmd],
        outputs: vec![out],
    }
}

pub fn plan_bias_correct(ctx: &StageCtx) -> PlannedStage {
    let out = ctx.dirs.dwi_bias_corrected();

    let cmd = ToolCommand::new(Tool::DwiBiasCorrect)
        .arg("-ants")
        .path(&ctx.dirs.dwi_preproc())
        .path(&out)
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    PlannedStage {
        stage: Stage::BiasCorrect,
        commands: vec![cmd],
        outputs: vec![out],
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_ctx;
    use super::*;
    use crate::types::PhaseEncoding;

    #[test]
    fn preproc_uses_rpe_none_with_pe_dir() {
        let (fix, _tmp) = test_ctx();
        let planned = plan_preproc(&fix.ctx());
        let line = planned.commands[0].command_line();
        assert!(line.starts_with("dwipreproc"));
        assert!(line.contains("-rpe_none"));
        assert!(line.contains("-pe_dir AP"));
    }

    #[test]
    fn pe_dir_follows_params() {
        let (mut fix, _tmp) = test_ctx();
        fix.params.phase_encoding = PhaseEncoding::Pa;
        let planned = plan_preproc(&fix.ctx());
        assert!(planned.commands[0].command_line().contains("-pe_dir PA"));
    }

    #[test]
    fn bias_correction_uses_ants_backend() {
        let (fix, _tmp) = test_ctx();
        let planned = plan_bias_correct(&fix.ctx());
        let line = planned.commands[0].command_line();
        assert!(line.starts_with("dwibiascorrect -ants"));
        assert!(line.contains("sub-01_dwi-preproc.mif"));
        assert!(line.contains("sub-01_dwi-bcor.mif"));
    }
}
