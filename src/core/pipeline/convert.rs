//! Stage 1: import the raw scanner data into `.mif`.
//!
//! `mrconvert` folds the FSL-style gradient table and the JSON sidecar into
//! the DWI image header, so every downstream MRtrix3 tool sees the gradient
//! scheme without extra flags. The T1 is converted alongside.
use super::{PlannedStage, StageCtx};
use crate::io::tools::{Tool, ToolCommand};
use crate::types::Stage;

pub fn plan(ctx: &StageCtx) -> PlannedStage {
    let dwi_out = ctx.dirs.dwi_mif();
    let t1_out = ctx.dirs.t1_mif();

    let dwi = ToolCommand::new(Tool::MrConvert)
        .path(&ctx.raw.dwi)
        .arg("-fslgrad")
        .path(&ctx.raw.bvec)
        .path(&ctx.raw.bval)
        .arg("-json_import")
        .path(&ctx.raw.json)
        .path(&dwi_out)
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    let t1 = ToolCommand::new(Tool::MrConvert)
        .path(&ctx.raw.t1)
        .path(&t1_out)
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    PlannedStage {
        stage: Stage::Convert,
        commands: vec![dwi, t1],
        outputs: vec![dwi_out, t1_out],
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_ctx;
    use super::*;

    #[test]
    fn imports_gradients_and_json_sidecar() {
        let (fix, _tmp) = test_ctx();
        let planned = plan(&fix.ctx());
        assert_eq!(planned.stage, Stage::Convert);
        assert_eq!(planned.commands.len(), 2);

        let line = planned.commands[0].command_line();
        assert!(line.starts_with("mrconvert"));
        assert!(line.contains("-fslgrad"));
        assert!(line.contains("sub-01_dwi.bvec"));
        assert!(line.contains("-json_import"));
        assert!(line.ends_with("sub-01_dwi.mif"));
    }
}
