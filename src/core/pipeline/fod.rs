//! Stages 5–7: brain mask, response function, and CSD fiber orientation
//! distributions, all on the fully preprocessed DWI.
use super::{PlannedStage, StageCtx};
use crate::io::tools::{Tool, ToolCommand};
use crate::types::Stage;

pub fn plan_mask(ctx: &StageCtx) -> PlannedStage {
    let out = ctx.dirs.brain_mask();

    let cmd = ToolCommand::new(Tool::Dwi2Mask)
        .path(&ctx.dirs.dwi_bias_corrected())
        .path(&out)
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    PlannedStage {
        stage: Stage::BrainMask,
        commands: vec![cmd],
        outputs: vec![out],
    }
}

pub fn plan_response(ctx: &StageCtx) -> PlannedStage {
    let out = ctx.dirs.response();

    let cmd = ToolCommand::new(Tool::Dwi2Response)
        .arg(ctx.params.response.as_subcommand())
        .path(&ctx.dirs.dwi_bias_corrected())
        .path(&out)
        .arg("-mask")
        .path(&ctx.dirs.brain_mask())
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    PlannedStage {
        stage: Stage::Response,
        commands: vec![cmd],
        outputs: vec![out],
    }
}

pub fn plan_fod(ctx: &StageCtx) -> PlannedStage {
    let out = ctx.dirs.fod();

    let cmd = ToolCommand::new(Tool::Dwi2Fod)
        .arg("csd")
        .path(&ctx.dirs.dwi_bias_corrected())
        .path(&ctx.dirs.response())
        .path(&out)
        .arg("-mask")
        .path(&ctx.dirs.brain_mask())
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    PlannedStage {
        stage: Stage::Fod,
        commands: vec![cmd],
        outputs: vec![out],
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_ctx;
    use super::*;
    use crate::types::ResponseAlgorithm;

    #[test]
    fn response_subcommand_follows_params() {
        let (mut fix, _tmp) = test_ctx();
        fix.params.response = ResponseAlgorithm::Dhollander;
        let planned = plan_response(&fix.ctx());
        assert!(
            planned.commands[0]
                .command_line()
                .starts_with("dwi2response dhollander")
        );
    }

    #[test]
    fn fod_runs_csd_within_the_brain_mask() {
        let (fix, _tmp) = test_ctx();
        let planned = plan_fod(&fix.ctx());
        let line = planned.commands[0].command_line();
        assert!(line.starts_with("dwi2fod csd"));
        assert!(line.contains("sub-01_response.txt"));
        assert!(line.contains("-mask"));
        assert!(line.contains("sub-01_dwi_mask.mif"));
        assert!(planned.outputs[0].ends_with("sub-01_fod.mif"));
    }
}
