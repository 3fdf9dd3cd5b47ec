use serde::{Deserialize, Serialize};

use crate::types::{Parcellation, PhaseEncoding, ResponseAlgorithm, TrackingAlgorithm};

/// Pipeline parameters suitable for config files and run reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineParams {
    pub algorithm: TrackingAlgorithm,
    pub response: ResponseAlgorithm,
    pub parcellation: Parcellation,
    pub phase_encoding: PhaseEncoding,
    /// Streamlines generated by `tckgen`.
    pub streamlines: u64,
    /// SIFT termination count; None means streamlines / 10.
    pub sift_count: Option<u64>,
    /// Use the 5TT image for anatomically constrained tractography.
    pub act: bool,
    /// Forwarded to the MRtrix3 tools' own `-nthreads`.
    pub nthreads: Option<usize>,
    /// Re-run stages whose outputs already exist.
    pub force: bool,
    /// Log every command without spawning anything.
    pub dry_run: bool,
}

impl PipelineParams {
    /// Effective SIFT termination count.
    pub fn sift_term(&self) -> u64 {
        self.sift_count.unwrap_or(self.streamlines / 10)
    }
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            algorithm: TrackingAlgorithm::IFod2,
            response: ResponseAlgorithm::Tournier,
            parcellation: Parcellation::Desikan,
            phase_encoding: PhaseEncoding::Ap,
            streamlines: 10_000_000,
            sift_count: None,
            act: true,
            nthreads: None,
            force: false,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sift_defaults_to_tenth_of_streamlines() {
        let params = PipelineParams::default();
        assert_eq!(params.sift_term(), 1_000_000);

        let params = PipelineParams {
            sift_count: Some(250_000),
            ..Default::default()
        };
        assert_eq!(params.sift_term(), 250_000);
    }
}
