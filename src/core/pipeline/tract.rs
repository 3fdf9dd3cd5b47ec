//! Stages 12–13: streamline generation and SIFT filtering.
//!
//! Probabilistic/deterministic FOD tracking seeds dynamically on the FOD
//! image; the tensor algorithms track on the preprocessed DWI and seed from
//! the brain mask instead. With ACT enabled, both `tckgen` and `tcksift`
//! receive the 5TT image.
use super::{PlannedStage, StageCtx};
use crate::io::tools::{Tool, ToolCommand};
use crate::types::Stage;

pub fn plan_tractography(ctx: &StageCtx) -> PlannedStage {
    let out = ctx.dirs.tracks();
    let source = if ctx.params.algorithm.needs_fod() {
        ctx.dirs.fod()
    } else {
        ctx.dirs.dwi_bias_corrected()
    };

    let mut cmd = ToolCommand::new(Tool::TckGen)
        .path(&source)
        .path(&out)
        .arg("-algorithm")
        .arg(ctx.params.algorithm.as_tckgen_arg())
        .arg("-select")
        .arg(ctx.params.streamlines.to_string());

    if ctx.params.act {
        cmd = cmd
            .arg("-act")
            .path(&ctx.dirs.five_tt())
            .arg("-backtrack")
            .arg("-crop_at_gmwmi");
    }

    cmd = if ctx.params.algorithm.needs_fod() {
        cmd.arg("-seed_dynamic").path(&ctx.dirs.fod())
    } else {
        cmd.arg("-seed_image").path(&ctx.dirs.brain_mask())
    };

    let cmd = cmd.nthreads(ctx.params.nthreads).force(ctx.params.force);

    PlannedStage {
        stage: Stage::Tractography,
        commands: vec![cmd],
        outputs: vec![out],
    }
}

pub fn plan_sift(ctx: &StageCtx) -> PlannedStage {
    let out = ctx.dirs.tracks_sift();

    let mut cmd = ToolCommand::new(Tool::TckSift)
        .path(&ctx.dirs.tracks())
        .path(&ctx.dirs.fod())
        .path(&out)
        .arg("-term_number")
        .arg(ctx.params.sift_term().to_string());

    if ctx.params.act {
        cmd = cmd.arg("-act").path(&ctx.dirs.five_tt());
    }

    let cmd = cmd.nthreads(ctx.params.nthreads).force(ctx.params.force);

    PlannedStage {
        stage: Stage::Sift,
        commands: vec![cmd],
        outputs: vec![out],
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_ctx;
    use super::*;
    use crate::types::TrackingAlgorithm;

    #[test]
    fn fod_tracking_seeds_dynamically_with_act() {
        let (fix, _tmp) = test_ctx();
        let planned = plan_tractography(&fix.ctx());
        let line = planned.commands[0].command_line();
        assert!(line.starts_with("tckgen"));
        assert!(line.contains("-algorithm iFOD2"));
        assert!(line.contains("-select 10000000"));
        assert!(line.contains("-act"));
        assert!(line.contains("-backtrack"));
        assert!(line.contains("-seed_dynamic"));
        assert!(planned.outputs[0].ends_with("sub-01_tracks.tck"));
    }

    #[test]
    fn tensor_tracking_uses_dwi_and_mask_seed() {
        let (mut fix, _tmp) = test_ctx();
        fix.params.algorithm = TrackingAlgorithm::TensorDet;
        let planned = plan_tractography(&fix.ctx());
        let line = planned.commands[0].command_line();
        assert!(line.contains("-algorithm Tensor_Det"));
        assert!(line.contains("sub-01_dwi-bcor.mif"));
        assert!(line.contains("-seed_image"));
        assert!(!line.contains("-seed_dynamic"));
    }

    #[test]
    fn act_off_drops_the_anatomical_flags() {
        let (mut fix, _tmp) = test_ctx();
        fix.params.act = false;
        let planned = plan_tractography(&fix.ctx());
        let line = planned.commands[0].command_line();
        assert!(!line.contains("-act"));
        assert!(!line.contains("-backtrack"));
    }

    #[test]
    fn sift_terminates_at_the_configured_count() {
        let (mut fix, _tmp) = test_ctx();
        fix.params.sift_count = Some(200_000);
        let planned = plan_sift(&fix.ctx());
        let line = planned.commands[0].command_line();
        assert!(line.starts_with("tcksift"));
        assert!(line.contains("-term_number 200000"));
        assert!(planned.outputs[0].ends_with("sub-01_tracks_sift.tck"));
    }
}
