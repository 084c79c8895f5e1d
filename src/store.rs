//! Scene descriptions and pose files.

use crate::{
    camera::CameraState,
    error::{Error, Result},
    pose::JointAngles,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};
use uom::si::{angle::radian, f64::Angle};

/// The bones of the loaded hand model. Their count fixes the number of joints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneSpec {
    #[serde(default)]
    pub name: String,
    pub bones: Vec<String>,
}

impl SceneSpec {
    pub fn new(name: impl Into<String>, bones: Vec<String>) -> Self {
        Self {
            name: name.into(),
            bones,
        }
    }

    /// Reads a scene description from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let serialized = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let scene: SceneSpec = serde_json::from_str(&serialized)
            .map_err(|err| Error::file_format(path, err.to_string()))?;

        if scene.bones.is_empty() {
            return Err(Error::Configuration(format!(
                "scene {path:?} does not declare any bones"
            )));
        }

        Ok(scene)
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bone_name(&self, index: usize) -> &str {
        self.bones.get(index).map(String::as_str).unwrap_or("?")
    }
}

/// The content of a pose file.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredPose {
    pub angles: Vec<JointAngles>,
    pub camera: Option<CameraState>,
}

/// Reads and writes pose files.
///
/// A failed load must not be partially applied: callers only see angles when
/// the whole file was valid for the scene.
pub trait PoseStore {
    fn load(&self, path: &Path, scene: &SceneSpec) -> Result<StoredPose>;
    fn save(&self, path: &Path, scene: &SceneSpec, pose: &StoredPose) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct BoneRecord {
    name: String,
    bend: f64,
    side: f64,
    twist: f64,
}

#[derive(Serialize, Deserialize)]
struct CameraRecord {
    r: f64,
    theta: f64,
    phi: f64,
    tilt: f64,
}

#[derive(Serialize, Deserialize)]
struct PoseFile {
    #[serde(default)]
    scene: String,
    bones: Vec<BoneRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    camera: Option<CameraRecord>,
}

/// Pose files as pretty printed JSON with angles in radians.
///
/// Bones are matched to the scene by name, so the order inside the file
/// does not matter but every scene bone must be present exactly once.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPoseStore;

impl PoseStore for JsonPoseStore {
    fn load(&self, path: &Path, scene: &SceneSpec) -> Result<StoredPose> {
        let serialized = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let file: PoseFile = serde_json::from_str(&serialized)
            .map_err(|err| Error::file_format(path, err.to_string()))?;

        if file.bones.len() != scene.bone_count() {
            return Err(Error::file_format(
                path,
                format!(
                    "pose has {} bones but scene {:?} has {}",
                    file.bones.len(),
                    scene.name,
                    scene.bone_count()
                ),
            ));
        }

        let by_name: HashMap<&str, &BoneRecord> = file
            .bones
            .iter()
            .map(|bone| (bone.name.as_str(), bone))
            .collect();

        let angles = scene
            .bones
            .iter()
            .map(|name| {
                by_name
                    .get(name.as_str())
                    .map(|bone| JointAngles::from_radians(bone.bend, bone.side, bone.twist))
                    .ok_or_else(|| Error::file_format(path, format!("missing bone {name:?}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let camera = file.camera.map(|camera| CameraState {
            r: camera.r,
            theta: Angle::new::<radian>(camera.theta),
            phi: Angle::new::<radian>(camera.phi),
            tilt: Angle::new::<radian>(camera.tilt),
        });

        Ok(StoredPose { angles, camera })
    }

    fn save(&self, path: &Path, scene: &SceneSpec, pose: &StoredPose) -> Result<()> {
        let file = PoseFile {
            scene: scene.name.clone(),
            bones: scene
                .bones
                .iter()
                .zip(&pose.angles)
                .map(|(name, joint)| BoneRecord {
                    name: name.clone(),
                    bend: joint.bend.get::<radian>(),
                    side: joint.side.get::<radian>(),
                    twist: joint.twist.get::<radian>(),
                })
                .collect(),
            camera: pose.camera.map(|camera| CameraRecord {
                r: camera.r,
                theta: camera.theta.get::<radian>(),
                phi: camera.phi.get::<radian>(),
                tilt: camera.tilt.get::<radian>(),
            }),
        };

        let serialized = serde_json::to_string_pretty(&file)
            .map_err(|err| Error::file_format(path, err.to_string()))?;
        fs::write(path, serialized).map_err(|err| Error::io(path, err))
    }
}
