//! Per-sample artifact files.
//!
//! Every sample can produce up to three artifacts, each in its own directory
//! and named by the shared sequence number:
//!
//! ```text
//! <root>/Segment/seg_<n>.jpg    color image, optionally cropped
//! <root>/Depth/depth_<n>.txt    depth record
//! <root>/Joints/bone_<n>.txt    joint records
//! ```

use crate::{
    error::{Error, Result},
    image::{ColorImage, CropBox, DepthGrid},
    renderer::JointRecord,
};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Where each artifact family is written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportLayout {
    pub root: PathBuf,
    pub color_dir: PathBuf,
    pub depth_dir: PathBuf,
    pub bones_dir: PathBuf,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("synthetic"),
            color_dir: PathBuf::from("Segment"),
            depth_dir: PathBuf::from("Depth"),
            bones_dir: PathBuf::from("Joints"),
        }
    }
}

impl ExportLayout {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn color_path(&self, sequence: u64) -> PathBuf {
        self.root
            .join(&self.color_dir)
            .join(format!("seg_{sequence}.jpg"))
    }

    pub fn depth_path(&self, sequence: u64) -> PathBuf {
        self.root
            .join(&self.depth_dir)
            .join(format!("depth_{sequence}.txt"))
    }

    pub fn bones_path(&self, sequence: u64) -> PathBuf {
        self.root
            .join(&self.bones_dir)
            .join(format!("bone_{sequence}.txt"))
    }
}

/// Square crop box of side `2 * half_width` around joint `joint_index`.
///
/// The joint's projected position is truncated to whole pixels. The box is
/// not checked against the image, so it may reach past its edges. A joint
/// with a non-finite position has no box.
pub fn compute_crop_box(
    joints: &[JointRecord],
    joint_index: usize,
    half_width: i32,
) -> Result<CropBox> {
    let joint = joints.get(joint_index).ok_or(Error::JointOutOfRange {
        index: joint_index,
        count: joints.len(),
    })?;

    if !(joint[0].is_finite() && joint[1].is_finite()) {
        return Err(Error::JointNotFinite { index: joint_index });
    }

    let center = Point2::new(joint[0] as i32, joint[1] as i32);
    Ok(CropBox::centered(center, half_width))
}

/// Serializes a depth buffer as one comma separated record.
///
/// Layout: cropped rows, cropped cols, the cropped values in row-major
/// order, full rows, full cols, then the crop box as left, top, right,
/// bottom. Without a crop box the whole buffer is written and the box is
/// the full frame.
///
/// Values are written in their shortest round-trip decimal form (`1234567`,
/// `0.5`), not rounded to a fixed number of significant digits.
pub fn format_depth(depth: &DepthGrid, crop_box: Option<&CropBox>) -> Result<String> {
    let crop_box = crop_box.copied().unwrap_or_else(|| depth.full_box());
    let cropped = depth.crop(&crop_box)?;

    let header = [cropped.rows(), cropped.cols()].map(|n| n.to_string());
    let trailer = [depth.rows(), depth.cols()]
        .map(|n| n.to_string())
        .into_iter()
        .chain(
            [
                crop_box.top_left.x,
                crop_box.top_left.y,
                crop_box.bottom_right.x,
                crop_box.bottom_right.y,
            ]
            .map(|n| n.to_string()),
        );

    let fields: Vec<String> = header
        .into_iter()
        .chain(cropped.values().iter().map(f32::to_string))
        .chain(trailer)
        .collect();

    Ok(fields.join(","))
}

/// Serializes joint records as comma separated values closed by a `0`.
pub fn format_bones(joints: &[JointRecord]) -> String {
    joints
        .iter()
        .flat_map(|joint| joint.iter().map(f64::to_string))
        .chain(std::iter::once("0".to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(|err| Error::io(parent, err)),
        None => Ok(()),
    }
}

/// Writes sample artifacts into an [`ExportLayout`].
#[derive(Clone, Debug)]
pub struct Exporter {
    layout: ExportLayout,
}

impl Exporter {
    pub fn new(layout: ExportLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ExportLayout {
        &self.layout
    }

    pub fn export_color(
        &self,
        image: &ColorImage,
        crop_box: Option<&CropBox>,
        sequence: u64,
    ) -> Result<PathBuf> {
        let cropped;
        let image = match crop_box {
            Some(crop_box) => {
                cropped = image.crop(crop_box)?;
                &cropped
            }
            None => image,
        };

        let path = self.layout.color_path(sequence);
        ensure_parent(&path)?;
        image::save_buffer(
            &path,
            &image.to_rgb_bytes(),
            image.cols() as u32,
            image.rows() as u32,
            image::ExtendedColorType::Rgb8,
        )?;

        debug!(sequence, path = %path.display(), "wrote color image");
        Ok(path)
    }

    pub fn export_depth(
        &self,
        depth: &DepthGrid,
        crop_box: Option<&CropBox>,
        hand_camera_distance: f64,
        sequence: u64,
    ) -> Result<PathBuf> {
        let record = format_depth(depth, crop_box)?;

        let path = self.layout.depth_path(sequence);
        ensure_parent(&path)?;
        fs::write(&path, record).map_err(|err| Error::io(&path, err))?;

        debug!(
            sequence,
            hand_camera_distance,
            path = %path.display(),
            "wrote depth record"
        );
        Ok(path)
    }

    pub fn export_bones(&self, joints: &[JointRecord], sequence: u64) -> Result<PathBuf> {
        let path = self.layout.bones_path(sequence);
        ensure_parent(&path)?;
        fs::write(&path, format_bones(joints)).map_err(|err| Error::io(&path, err))?;

        debug!(sequence, path = %path.display(), "wrote joint records");
        Ok(path)
    }
}
