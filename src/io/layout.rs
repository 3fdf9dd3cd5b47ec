//! Path construction by naming convention.
//!
//! Everything the pipeline reads and writes is addressed through this module:
//! raw inputs under a BIDS root, derivatives under a per-subject output tree,
//! and the stage-suffix naming scheme (`_dn`, `-preproc`, `-bcor`, `_fod`,
//! `_seg`, ...). No file is opened here; the only I/O is existence checks.
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::io::subjects::Subject;
use crate::types::Parcellation;

/// The raw per-subject files the pipeline requires before it will invoke
/// any external tool.
#[derive(Debug, Clone)]
pub struct RawInputs {
    pub dwi: PathBuf,
    pub bval: PathBuf,
    pub bvec: PathBuf,
    pub json: PathBuf,
    pub t1: PathBuf,
}

impl RawInputs {
    pub fn all(&self) -> [&PathBuf; 5] {
        [&self.dwi, &self.bval, &self.bvec, &self.json, &self.t1]
    }

    /// Fail on the first missing file. Runs before the first spawn so a
    /// half-scanned subject never burns hours of eddy time.
    pub fn check(&self, subject: &Subject) -> Result<()> {
        for path in self.all() {
            if !path.is_file() {
                return Err(Error::MissingInput {
                    subject: subject.label(),
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Read-side view of the input dataset: a BIDS root plus the FreeSurfer
/// derivatives tree the parcellation is taken from.
#[derive(Debug, Clone)]
pub struct BidsLayout {
    root: PathBuf,
    freesurfer_root: PathBuf,
}

fn file_stem(subject: &Subject) -> String {
    match &subject.session {
        Some(ses) => format!("{}_{}", subject.subject, ses),
        None => subject.subject.clone(),
    }
}

fn subject_dir(root: &Path, subject: &Subject) -> PathBuf {
    let mut dir = root.join(&subject.subject);
    if let Some(ses) = &subject.session {
        dir = dir.join(ses);
    }
    dir
}

impl BidsLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let freesurfer_root = root.join("derivatives").join("freesurfer");
        Self {
            root,
            freesurfer_root,
        }
    }

    pub fn with_freesurfer_root(mut self, freesurfer_root: impl Into<PathBuf>) -> Self {
        self.freesurfer_root = freesurfer_root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raw input paths for one subject:
    /// `{root}/{sub}[/{ses}]/dwi/{sub}[_{ses}]_dwi.nii.gz` plus the
    /// `.bval`/`.bvec`/`.json` sidecars, and the matching `anat` T1w image.
    pub fn raw_inputs(&self, subject: &Subject) -> RawInputs {
        let base = subject_dir(&self.root, subject);
        let stem = file_stem(subject);
        let dwi_dir = base.join("dwi");
        let anat_dir = base.join("anat");
        RawInputs {
            dwi: dwi_dir.join(format!("{stem}_dwi.nii.gz")),
            bval: dwi_dir.join(format!("{stem}_dwi.bval")),
            bvec: dwi_dir.join(format!("{stem}_dwi.bvec")),
            json: dwi_dir.join(format!("{stem}_dwi.json")),
            t1: anat_dir.join(format!("{stem}_T1w.nii.gz")),
        }
    }

    /// The precomputed FreeSurfer segmentation for this subject. recon-all
    /// itself runs out-of-band; the pipeline only consumes its output.
    pub fn freesurfer_aseg(&self, subject: &Subject, parcellation: Parcellation) -> PathBuf {
        self.freesurfer_root
            .join(file_stem(subject))
            .join("mri")
            .join(parcellation.aseg_volume())
    }
}

/// Write-side view: the per-subject derivatives tree. Artifacts are grouped
/// by modality (`dwi/`, `anat/`, `tract/`, `connectome/`), all named
/// `{sub}[_{ses}]` plus a stage suffix.
#[derive(Debug, Clone)]
pub struct SubjectDirs {
    base: PathBuf,
    stem: String,
}

impl SubjectDirs {
    pub fn new(output_root: &Path, subject: &Subject) -> Self {
        Self {
            base: subject_dir(output_root, subject),
            stem: file_stem(subject),
        }
    }

    /// Create the subdirectory skeleton. Idempotent.
    pub fn create(&self) -> std::io::Result<()> {
        for sub in ["dwi", "anat", "tract", "connectome"] {
            fs::create_dir_all(self.base.join(sub))?;
        }
        Ok(())
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn dwi(&self, suffix: &str) -> PathBuf {
        self.base.join("dwi").join(format!("{}{}", self.stem, suffix))
    }

    fn anat(&self, suffix: &str) -> PathBuf {
        self.base
            .join("anat")
            .join(format!("{}{}", self.stem, suffix))
    }

    // convert
    pub fn dwi_mif(&self) -> PathBuf {
        self.dwi("_dwi.mif")
    }
    pub fn t1_mif(&self) -> PathBuf {
        self.anat("_T1.mif")
    }

    // denoise
    pub fn dwi_denoised(&self) -> PathBuf {
        self.dwi("_dwi_dn.mif")
    }
    pub fn noise_map(&self) -> PathBuf {
        self.dwi("_noise.mif")
    }

    // preproc + bias correction
    pub fn dwi_preproc(&self) -> PathBuf {
        self.dwi("_dwi-preproc.mif")
    }
    pub fn dwi_bias_corrected(&self) -> PathBuf {
        self.dwi("_dwi-bcor.mif")
    }

    // FOD estimation
    pub fn brain_mask(&self) -> PathBuf {
        self.dwi("_dwi_mask.mif")
    }
    pub fn response(&self) -> PathBuf {
        self.dwi("_response.txt")
    }
    pub fn fod(&self) -> PathBuf {
        self.dwi("_fod.mif")
    }

    // anatomical processing / registration
    pub fn b0(&self) -> PathBuf {
        self.dwi("_b0.nii.gz")
    }
    pub fn t1_brain(&self) -> PathBuf {
        self.anat("_T1_brain.nii.gz")
    }
    pub fn flirt_matrix(&self) -> PathBuf {
        self.anat("_T12dwi.mat")
    }
    pub fn mrtrix_transform(&self) -> PathBuf {
        self.anat("_T12dwi.txt")
    }
    pub fn t1_coreg(&self) -> PathBuf {
        self.anat("_T1_coreg.mif")
    }
    pub fn five_tt(&self) -> PathBuf {
        self.anat("_T1_seg.mif")
    }
    pub fn nodes_fs(&self) -> PathBuf {
        self.anat("_nodes_fs.mif")
    }
    pub fn nodes(&self) -> PathBuf {
        self.anat("_nodes.mif")
    }

    // tractography
    pub fn tracks(&self) -> PathBuf {
        self.base
            .join("tract")
            .join(format!("{}_tracks.tck", self.stem))
    }
    pub fn tracks_sift(&self) -> PathBuf {
        self.base
            .join("tract")
            .join(format!("{}_tracks_sift.tck", self.stem))
    }

    // connectome
    pub fn connectome(&self) -> PathBuf {
        self.base
            .join("connectome")
            .join(format!("{}_connectome.csv", self.stem))
    }
}
