//! Shared types and enums used across dwiconn.
//! Includes pipeline `Stage`, tracking and response algorithm selectors,
//! `Parcellation`, and the acquisition `PhaseEncoding` direction.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Pipeline stages in execution order. `Display` yields the name used in
/// logs and in the per-stage sections of the run report.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum Stage {
    Convert,
    Denoise,
    Preproc,
    BiasCorrect,
    BrainMask,
    Response,
    Fod,
    BrainExtract,
    Register,
    Segment,
    Parcellate,
    Tractography,
    Sift,
    Connectome,
}

impl Stage {
    /// All stages in the order the pipeline runs them.
    pub fn ordered() -> &'static [Stage] {
        &[
            Stage::Convert,
            Stage::Denoise,
            Stage::Preproc,
            Stage::BiasCorrect,
            Stage::BrainMask,
            Stage::Response,
            Stage::Fod,
            Stage::BrainExtract,
            Stage::Register,
            Stage::Segment,
            Stage::Parcellate,
            Stage::Tractography,
            Stage::Sift,
            Stage::Connectome,
        ]
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Convert => "convert",
            Stage::Denoise => "denoise",
            Stage::Preproc => "preproc",
            Stage::BiasCorrect => "bias-correct",
            Stage::BrainMask => "brain-mask",
            Stage::Response => "response",
            Stage::Fod => "fod",
            Stage::BrainExtract => "brain-extract",
            Stage::Register => "register",
            Stage::Segment => "segment",
            Stage::Parcellate => "parcellate",
            Stage::Tractography => "tractography",
            Stage::Sift => "sift",
            Stage::Connectome => "connectome",
        };
        write!(f, "{}", s)
    }
}

/// Streamline tractography algorithm passed to `tckgen -algorithm`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum TrackingAlgorithm {
    IFod2,
    IFod1,
    SdStream,
    TensorDet,
    TensorProb,
}

impl TrackingAlgorithm {
    /// Spelling expected by `tckgen`.
    pub fn as_tckgen_arg(&self) -> &'static str {
        match self {
            TrackingAlgorithm::IFod2 => "iFOD2",
            TrackingAlgorithm::IFod1 => "iFOD1",
            TrackingAlgorithm::SdStream => "SD_STREAM",
            TrackingAlgorithm::TensorDet => "Tensor_Det",
            TrackingAlgorithm::TensorProb => "Tensor_Prob",
        }
    }

    /// True for the algorithms that consume an FOD image; the tensor
    /// variants track on the preprocessed DWI directly.
    pub fn needs_fod(&self) -> bool {
        matches!(
            self,
            TrackingAlgorithm::IFod2 | TrackingAlgorithm::IFod1 | TrackingAlgorithm::SdStream
        )
    }
}

impl std::fmt::Display for TrackingAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tckgen_arg())
    }
}

/// Response-function estimation method, i.e. the `dwi2response` subcommand.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum ResponseAlgorithm {
    Tournier,
    Dhollander,
    Tax,
}

impl ResponseAlgorithm {
    pub fn as_subcommand(&self) -> &'static str {
        match self {
            ResponseAlgorithm::Tournier => "tournier",
            ResponseAlgorithm::Dhollander => "dhollander",
            ResponseAlgorithm::Tax => "tax",
        }
    }
}

impl std::fmt::Display for ResponseAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_subcommand())
    }
}

/// Cortical parcellation used for connectome nodes. Selects both the
/// FreeSurfer segmentation volume and the `labelconvert` lookup table.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum Parcellation {
    Desikan,
    Destrieux,
}

impl Parcellation {
    /// FreeSurfer output volume the nodes are derived from.
    pub fn aseg_volume(&self) -> &'static str {
        match self {
            Parcellation::Desikan => "aparc+aseg.mgz",
            Parcellation::Destrieux => "aparc.a2009s+aseg.mgz",
        }
    }

    /// MRtrix3 lookup table mapping FreeSurfer labels to contiguous node
    /// indices, as shipped in the MRtrix3 `labelconvert` share directory.
    pub fn mrtrix_lut(&self) -> &'static str {
        match self {
            Parcellation::Desikan => "fs_default.txt",
            Parcellation::Destrieux => "fs_a2009s.txt",
        }
    }
}

impl std::fmt::Display for Parcellation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Parcellation::Desikan => "desikan",
            Parcellation::Destrieux => "destrieux",
        };
        write!(f, "{}", s)
    }
}

/// Phase-encoding direction of the DWI acquisition, forwarded to
/// `dwipreproc -pe_dir`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum PhaseEncoding {
    Ap,
    Pa,
    Lr,
    Rl,
}

impl PhaseEncoding {
    pub fn as_pe_dir(&self) -> &'static str {
        match self {
            PhaseEncoding::Ap => "AP",
            PhaseEncoding::Pa => "PA",
            PhaseEncoding::Lr => "LR",
            PhaseEncoding::Rl => "RL",
        }
    }
}

impl std::fmt::Display for PhaseEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_pe_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_starts_with_convert_ends_with_connectome() {
        let stages = Stage::ordered();
        assert_eq!(stages.first(), Some(&Stage::Convert));
        assert_eq!(stages.last(), Some(&Stage::Connectome));
    }

    #[test]
    fn tckgen_algorithm_spellings() {
        assert_eq!(TrackingAlgorithm::IFod2.as_tckgen_arg(), "iFOD2");
        assert_eq!(TrackingAlgorithm::TensorProb.as_tckgen_arg(), "Tensor_Prob");
        assert!(!TrackingAlgorithm::TensorDet.needs_fod());
    }

    #[test]
    fn parcellation_selects_freesurfer_volume() {
        assert_eq!(Parcellation::Desikan.aseg_volume(), "aparc+aseg.mgz");
        assert_eq!(
            Parcellation::Destrieux.aseg_volume(),
            "aparc.a2009s+aseg.mgz"
        );
    }
}
