//! Stage 2: MP-PCA denoising.
//!
//! Runs first on the unprocessed series, as `dwidenoise` requires; the
//! noise map is kept next to the denoised image for QC.
use super::{PlannedStage, StageCtx};
use crate::io::tools::{Tool, ToolCommand};
use crate::types::Stage;

pub fn plan(ctx: &StageCtx) -> PlannedStage {
    let out = ctx.dirs.dwi_denoised();
    let noise = ctx.dirs.noise_map();

    let cmd = ToolCommand::new(Tool::DwiDenoise)
        .path(&ctx.dirs.dwi_mif())
        .path(&out)
        .arg("-noise")
        .path(&noise)
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    PlannedStage {
        stage: Stage::Denoise,
        commands: vec![cmd],
        outputs: vec![out],
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_ctx;
    use super::*;

    #[test]
    fn denoises_the_converted_series_with_noise_map() {
        let (fix, _tmp) = test_ctx();
        let planned = plan(&fix.ctx());
        let line = planned.commands[0].command_line();
        assert!(line.starts_with("dwidenoise"));
        assert!(line.contains("sub-01_dwi.mif"));
        assert!(line.contains("sub-01_dwi_dn.mif"));
        assert!(line.contains("-noise"));
        assert!(planned.outputs[0].ends_with("sub-01_dwi_dn.mif"));
    }
}
