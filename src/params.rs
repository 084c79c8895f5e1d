use crate::{
    batch::BatchGenerator,
    error::{Error, Result},
    export::ExportLayout,
    sampler::PerturbationBounds,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Everything the designer can be configured with.
///
/// Read from JSON. Missing fields take their default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerParams {
    /// Render buffer size in pixels, `(rows, cols)`.
    pub render_size_px: (usize, usize),

    /// Camera distance that frames the hand when no engine provides one.
    pub initial_distance: f64,

    pub batch_size: usize,

    /// Joint whose projected position centres the crop box.
    pub crop_joint: usize,
    pub crop_half_width: i32,

    /// Export all three artifacts for every batch sample.
    pub save_all: bool,

    /// Sequence number of the first exported sample.
    pub first_sequence: u64,

    /// Fixed seed for batch perturbations. Seeded from the clock when absent.
    pub seed: Option<u64>,

    /// Pose file read by `r` and written by `w`.
    pub pose_file: PathBuf,

    pub export: ExportLayout,
    pub perturbation: PerturbationBounds,
}

impl Default for DesignerParams {
    fn default() -> Self {
        Self {
            render_size_px: (480, 640),
            initial_distance: 1.0,
            batch_size: BatchGenerator::DEFAULT_COUNT,
            crop_joint: 26,
            crop_half_width: 160,
            save_all: false,
            first_sequence: 0,
            seed: None,
            pose_file: PathBuf::from("pose.json"),
            export: ExportLayout::default(),
            perturbation: PerturbationBounds::default(),
        }
    }
}

impl DesignerParams {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let serialized = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        serde_json::from_str(&serialized)
            .map_err(|err| Error::Configuration(format!("invalid parameters in {path:?}: {err}")))
    }
}
