//! Hand Pose Designer
//!
//! Control state and data pipeline for posing an articulated hand and
//! harvesting synthetic samples (color image, depth record, joint records)
//! from random perturbations of that pose.

pub mod batch;
pub mod camera;
pub mod command;
pub mod context;
pub mod error;
pub mod export;
pub mod gate;
pub mod image;
pub mod params;
pub mod pose;
pub mod renderer;
pub mod sampler;
pub mod session;
pub mod store;

pub mod prelude {
    pub use crate::batch::{BatchGenerator, BatchReport};
    pub use crate::camera::{CameraAxis, CameraState};
    pub use crate::command::{Command, CommandDispatcher, Dispatch, ESCAPE};
    pub use crate::context::{Artifacts, CycleReport, SampleRequestFlags, SessionContext};
    pub use crate::error::{Error, Result};
    pub use crate::export::{ExportLayout, Exporter, compute_crop_box};
    pub use crate::gate::{ConfirmationGate, GateOutcome};
    pub use crate::image::{ColorImage, CropBox, DepthGrid, Grid};
    pub use crate::params::DesignerParams;
    pub use crate::pose::{Channel, JointAngles, PoseState};
    pub use crate::renderer::{BlankRenderer, JointRecord, Renderer};
    pub use crate::sampler::{PerturbationBounds, PerturbationSampler};
    pub use crate::session::{Flow, Session};
    pub use crate::store::{JsonPoseStore, PoseStore, SceneSpec, StoredPose};
}
