use crate::{
    camera::CameraState,
    image::{ColorImage, DepthGrid},
    pose::JointAngles,
};
use nalgebra::Vector6;
use uom::si::angle::radian;

/// Per-joint record read back from the renderer.
///
/// The first two components are the joint's projected image position
/// (column, row). The remaining four are renderer specific (depth and
/// orientation for the engines this crate has been used with).
pub type JointRecord = Vector6<f64>;

/// The engine that turns a pose and camera into pixels.
///
/// Calls happen in the order `set_pose`, `set_camera`, `render`, then any of
/// the read-back accessors. The read-back values describe the most recent
/// `render`.
pub trait Renderer {
    fn set_pose(&mut self, angles: &[JointAngles]);
    fn set_camera(&mut self, camera: &CameraState);
    fn render(&mut self);
    fn color_buffer(&self) -> &ColorImage;
    fn depth_buffer(&self) -> &DepthGrid;
    /// One record per joint in a stable order.
    fn joint_positions(&self) -> Vec<JointRecord>;
    /// Camera distance that frames the whole hand. Camera distances are
    /// expressed as multiples of this.
    fn initial_camera_distance(&self) -> f64;
    fn current_camera_distance(&self) -> f64;
}

/// A renderer with no hand model behind it.
///
/// Produces a uniform background, a depth buffer at the camera distance and
/// every joint at the image centre carrying its own angles. It lets the
/// designer run end to end without an engine attached.
pub struct BlankRenderer {
    background: [u8; 3],
    initial_distance: f64,
    angles: Vec<JointAngles>,
    camera: CameraState,
    color: ColorImage,
    depth: DepthGrid,
}

impl BlankRenderer {
    pub fn new(rows: usize, cols: usize, initial_distance: f64) -> Self {
        let background = [40, 0, 0];
        Self {
            background,
            initial_distance,
            angles: Vec::new(),
            camera: CameraState::canonical(initial_distance),
            color: ColorImage::filled(rows, cols, background),
            depth: DepthGrid::filled(rows, cols, 0.0),
        }
    }
}

impl Renderer for BlankRenderer {
    fn set_pose(&mut self, angles: &[JointAngles]) {
        self.angles = angles.to_vec();
    }

    fn set_camera(&mut self, camera: &CameraState) {
        self.camera = *camera;
    }

    fn render(&mut self) {
        let (rows, cols) = (self.color.rows(), self.color.cols());
        self.color = ColorImage::filled(rows, cols, self.background);
        self.depth = DepthGrid::filled(rows, cols, self.camera.r as f32);
    }

    fn color_buffer(&self) -> &ColorImage {
        &self.color
    }

    fn depth_buffer(&self) -> &DepthGrid {
        &self.depth
    }

    fn joint_positions(&self) -> Vec<JointRecord> {
        let center = (self.color.cols() as f64 / 2., self.color.rows() as f64 / 2.);
        self.angles
            .iter()
            .map(|joint| {
                JointRecord::new(
                    center.0,
                    center.1,
                    self.camera.r,
                    joint.bend.get::<radian>(),
                    joint.side.get::<radian>(),
                    joint.twist.get::<radian>(),
                )
            })
            .collect()
    }

    fn initial_camera_distance(&self) -> f64 {
        self.initial_distance
    }

    fn current_camera_distance(&self) -> f64 {
        self.camera.r
    }
}
