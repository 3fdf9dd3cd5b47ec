//! Stages 8–11: anatomical processing.
//!
//! The T1 is skull-stripped with FSL BET, rigid-registered to the mean-free
//! b=0 image with FLIRT, and the FLIRT matrix is converted so MRtrix3 can
//! apply it without resampling artifacts. The coregistered T1 feeds `5ttgen`
//! for the ACT tissue image, and the subject's FreeSurfer parcellation is
//! relabelled and brought into diffusion space for the connectome nodes.
use std::env;
use std::path::PathBuf;

use super::{PlannedStage, StageCtx};
use crate::io::tools::{Tool, ToolCommand};
use crate::types::{Parcellation, Stage};

pub fn plan_brain_extract(ctx: &StageCtx) -> PlannedStage {
    let out = ctx.dirs.t1_brain();

    let cmd = ToolCommand::new(Tool::Bet)
        .path(&ctx.raw.t1)
        .path(&out)
        .arg("-f")
        .arg("0.5");

    PlannedStage {
        stage: Stage::BrainExtract,
        commands: vec![cmd],
        outputs: vec![out],
    }
}

pub fn plan_register(ctx: &StageCtx) -> PlannedStage {
    let b0 = ctx.dirs.b0();
    let matrix = ctx.dirs.flirt_matrix();
    let transform = ctx.dirs.mrtrix_transform();
    let coreg = ctx.dirs.t1_coreg();

    // FLIRT needs a 3D NIfTI reference; the first volume of the corrected
    // series is the b=0.
    let extract_b0 = ToolCommand::new(Tool::MrConvert)
        .path(&ctx.dirs.dwi_bias_corrected())
        .arg("-coord")
        .arg("3")
        .arg("0")
        .arg("-axes")
        .arg("0,1,2")
        .path(&b0)
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    let flirt = ToolCommand::new(Tool::Flirt)
        .arg("-in")
        .path(&ctx.dirs.t1_brain())
        .arg("-ref")
        .path(&b0)
        .arg("-dof")
        .arg("6")
        .arg("-omat")
        .path(&matrix);

    let convert = ToolCommand::new(Tool::TransformConvert)
        .path(&matrix)
        .path(&ctx.dirs.t1_brain())
        .path(&b0)
        .arg("flirt_import")
        .path(&transform)
        .force(ctx.params.force);

    let apply = ToolCommand::new(Tool::MrTransform)
        .path(&ctx.dirs.t1_mif())
        .arg("-linear")
        .path(&transform)
        .path(&coreg)
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    PlannedStage {
        stage: Stage::Register,
        commands: vec![extract_b0, flirt, convert, apply],
        outputs: vec![matrix, transform, coreg],
    }
}

pub fn plan_segment(ctx: &StageCtx) -> PlannedStage {
    let out = ctx.dirs.five_tt();

    let cmd = ToolCommand::new(Tool::FiveTtGen)
        .arg("fsl")
        .path(&ctx.dirs.t1_coreg())
        .path(&out)
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    PlannedStage {
        stage: Stage::Segment,
        commands: vec![cmd],
        outputs: vec![out],
    }
}

/// `$FREESURFER_HOME/FreeSurferColorLUT.txt`, or the bare filename when the
/// environment is not set (labelconvert then reports its own lookup error).
fn freesurfer_lut() -> PathBuf {
    match env::var_os("FREESURFER_HOME") {
        Some(home) => PathBuf::from(home).join("FreeSurferColorLUT.txt"),
        None => PathBuf::from("FreeSurferColorLUT.txt"),
    }
}

/// The MRtrix3 node lookup table, resolved relative to the installed
/// `labelconvert` binary (`../share/mrtrix3/labelconvert/<lut>`).
fn mrtrix_lut(parcellation: Parcellation) -> PathBuf {
    let name = parcellation.mrtrix_lut();
    which::which(Tool::LabelConvert.binary())
        .ok()
        .and_then(|bin| Some(bin.parent()?.parent()?.to_path_buf()))
        .map(|prefix| {
            prefix
                .join("share")
                .join("mrtrix3")
                .join("labelconvert")
                .join(name)
        })
        .unwrap_or_else(|| PathBuf::from(name))
}

pub fn plan_parcellate(ctx: &StageCtx) -> PlannedStage {
    let aseg = ctx
        .layout
        .freesurfer_aseg(ctx.subject, ctx.params.parcellation);
    let nodes_fs = ctx.dirs.nodes_fs();
    let nodes = ctx.dirs.nodes();

    let relabel = ToolCommand::new(Tool::LabelConvert)
        .path(&aseg)
        .path(&freesurfer_lut())
        .path(&mrtrix_lut(ctx.params.parcellation))
        .path(&nodes_fs)
        .force(ctx.params.force);

    // Same rigid transform as the T1; nearest-neighbour keeps labels intact.
    let to_dwi = ToolCommand::new(Tool::MrTransform)
        .path(&nodes_fs)
        .arg("-linear")
        .path(&ctx.dirs.mrtrix_transform())
        .arg("-interp")
        .arg("nearest")
        .path(&nodes)
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    PlannedStage {
        stage: Stage::Parcellate,
        commands: vec![relabel, to_dwi],
        outputs: vec![nodes],
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_ctx;
    use super::*;

    #[test]
    fn bet_strips_the_raw_t1() {
        let (fix, _tmp) = test_ctx();
        let planned = plan_brain_extract(&fix.ctx());
        let line = planned.commands[0].command_line();
        assert!(line.starts_with("bet"));
        assert!(line.contains("sub-01_T1w.nii.gz"));
        assert!(line.contains("-f 0.5"));
    }

    #[test]
    fn registration_is_rigid_and_reused_by_mrtrix() {
        let (fix, _tmp) = test_ctx();
        let planned = plan_register(&fix.ctx());
        assert_eq!(planned.commands.len(), 4);

        let flirt = planned.commands[1].command_line();
        assert!(flirt.contains("-dof 6"));
        assert!(flirt.contains("-omat"));

        let convert = planned.commands[2].command_line();
        assert!(convert.contains("flirt_import"));

        let apply = planned.commands[3].command_line();
        assert!(apply.contains("-linear"));
        assert!(apply.contains("sub-01_T1_coreg.mif"));
    }

    #[test]
    fn segmentation_uses_the_coregistered_t1() {
        let (fix, _tmp) = test_ctx();
        let planned = plan_segment(&fix.ctx());
        let line = planned.commands[0].command_line();
        assert!(line.starts_with("5ttgen fsl"));
        assert!(line.contains("sub-01_T1_coreg.mif"));
        assert!(planned.outputs[0].ends_with("sub-01_T1_seg.mif"));
    }

    #[test]
    fn parcellation_relabels_then_transforms_with_nearest_neighbour() {
        let (fix, _tmp) = test_ctx();
        let planned = plan_parcellate(&fix.ctx());
        assert_eq!(planned.commands.len(), 2);

        let relabel = planned.commands[0].command_line();
        assert!(relabel.starts_with("labelconvert"));
        assert!(relabel.contains("aparc+aseg.mgz"));
        assert!(relabel.contains("fs_default.txt"));

        let transform = planned.commands[1].command_line();
        assert!(transform.contains("-interp nearest"));
        assert!(planned.outputs[0].ends_with("sub-01_nodes.mif"));
    }
}
