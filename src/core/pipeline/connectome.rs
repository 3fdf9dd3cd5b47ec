//! Stage 14: assemble the structural connectome.
//!
//! Streamline counts between every node pair, symmetrized, diagonal zeroed,
//! and scaled by inverse node volume so large regions do not dominate.
use super::{PlannedStage, StageCtx};
use crate::io::tools::{Tool, ToolCommand};
use crate::types::Stage;

pub fn plan(ctx: &StageCtx) -> PlannedStage {
    let out = ctx.dirs.connectome();

    let cmd = ToolCommand::new(Tool::Tck2Connectome)
        .path(&ctx.dirs.tracks_sift())
        .path(&ctx.dirs.nodes())
        .path(&out)
        .arg("-symmetric")
        .arg("-zero_diagonal")
        .arg("-scale_invnodevol")
        .nthreads(ctx.params.nthreads)
        .force(ctx.params.force);

    PlannedStage {
        stage: Stage::Connectome,
        commands: vec![cmd],
        outputs: vec![out],
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_ctx;
    use super::*;

    #[test]
    fn connectome_is_built_from_sifted_tracks_and_nodes() {
        let (fix, _tmp) = test_ctx();
        let planned = plan(&fix.ctx());
        let line = planned.commands[0].command_line();
        assert!(line.starts_with("tck2connectome"));
        assert!(line.contains("sub-01_tracks_sift.tck"));
        assert!(line.contains("sub-01_nodes.mif"));
        assert!(line.contains("-symmetric"));
        assert!(line.contains("-zero_diagonal"));
        assert!(line.contains("-scale_invnodevol"));
        assert!(planned.outputs[0].ends_with("sub-01_connectome.csv"));
    }
}
