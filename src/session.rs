use crate::{
    batch::{BatchGenerator, BatchReport},
    camera::{CameraAxis, CameraState},
    command::{Command, CommandDispatcher, Dispatch, HELP},
    context::{CycleReport, SessionContext},
    error::{Error, Result},
    export::{Exporter, compute_crop_box},
    image::CropBox,
    params::DesignerParams,
    pose::{Channel, PoseState},
    renderer::{JointRecord, Renderer},
    sampler::{PerturbationBounds, PerturbationSampler},
    store::{PoseStore, SceneSpec, StoredPose},
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use uom::{ConstZero, si::f64::Angle};

/// Whether the session keeps reading input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The renderer plus the exporter fed from its buffers.
pub struct Stage<R> {
    renderer: R,
    exporter: Exporter,
    crop_joint: usize,
    crop_half_width: i32,
    crop_box: Option<CropBox>,
}

fn tally(report: &mut CycleReport, artifact: &str, result: Result<PathBuf>) {
    match result {
        Ok(_) => report.exported += 1,
        Err(err) => {
            report.failed += 1;
            warn!(sequence = report.sequence, artifact, %err, "export failed");
        }
    }
}

impl<R: Renderer> Stage<R> {
    pub fn new(renderer: R, exporter: Exporter, crop_joint: usize, crop_half_width: i32) -> Self {
        Self {
            renderer,
            exporter,
            crop_joint,
            crop_half_width,
            crop_box: None,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Crop box of the last render cycle that had cropping enabled.
    pub fn crop_box(&self) -> Option<CropBox> {
        self.crop_box
    }

    /// Renders `pose` from `camera` and exports the requested artifacts under
    /// the current sequence number.
    ///
    /// Consumes the save requests in `ctx` but leaves the counter alone.
    pub fn render_cycle(
        &mut self,
        pose: &PoseState,
        camera: &CameraState,
        ctx: &mut SessionContext,
    ) -> CycleReport {
        self.renderer.set_pose(pose.joints());
        self.renderer.set_camera(camera);
        self.renderer.render();

        let mut wanted = ctx.flags.take();
        let sequence = ctx.counter.current();
        let mut report = CycleReport {
            sequence,
            ..Default::default()
        };

        let joints: Vec<JointRecord> = match ctx.flags.crop_enabled || wanted.bones {
            true => self.renderer.joint_positions(),
            false => Vec::new(),
        };

        let crop = ctx
            .flags
            .crop_enabled
            .then(|| compute_crop_box(&joints, self.crop_joint, self.crop_half_width));
        let crop_box = match crop.transpose() {
            Ok(crop_box) => crop_box,
            Err(err) => {
                let skipped = usize::from(wanted.color) + usize::from(wanted.depth);
                if skipped > 0 {
                    warn!(sequence, %err, "no crop box, skipping color and depth");
                }
                report.failed += skipped;
                wanted.color = false;
                wanted.depth = false;
                None
            }
        };
        if ctx.flags.crop_enabled {
            self.crop_box = crop_box;
        }

        if wanted.color {
            let result =
                self.exporter
                    .export_color(self.renderer.color_buffer(), crop_box.as_ref(), sequence);
            tally(&mut report, "color", result);
        }

        if wanted.depth {
            let result = self.exporter.export_depth(
                self.renderer.depth_buffer(),
                crop_box.as_ref(),
                self.renderer.current_camera_distance(),
                sequence,
            );
            tally(&mut report, "depth", result);
        }

        if wanted.bones {
            let result = self.exporter.export_bones(&joints, sequence);
            tally(&mut report, "bones", result);
        }

        report
    }
}

/// One interactive posing session.
///
/// Owns the pose, the camera and every counter and flag. All input is handled
/// synchronously: a symbol is fully processed, including any batch it
/// triggers, before the next one is accepted.
pub struct Session<R, S> {
    scene: SceneSpec,
    pose: PoseState,
    camera: CameraState,
    dispatcher: CommandDispatcher,
    ctx: SessionContext,
    stage: Stage<R>,
    store: S,
    pose_file: PathBuf,
    batch: BatchGenerator,
    perturbation: PerturbationBounds,
    seed: Option<u64>,
    batches_run: u64,
    show_help: bool,
}

impl<R: Renderer, S: PoseStore> Session<R, S> {
    pub fn new(params: &DesignerParams, scene: SceneSpec, renderer: R, store: S) -> Result<Self> {
        if scene.bones.is_empty() {
            return Err(Error::Configuration(format!(
                "scene {:?} has no bones to pose",
                scene.name
            )));
        }

        let camera = CameraState::canonical(renderer.initial_camera_distance());
        let stage = Stage::new(
            renderer,
            Exporter::new(params.export.clone()),
            params.crop_joint,
            params.crop_half_width,
        );

        info!(
            scene = %scene.name,
            joints = scene.bone_count(),
            save_all = params.save_all,
            "session ready"
        );

        Ok(Self {
            pose: PoseState::new(scene.bone_count()),
            scene,
            camera,
            dispatcher: CommandDispatcher::new(),
            ctx: SessionContext::new(params.first_sequence, params.save_all),
            stage,
            store,
            pose_file: params.pose_file.clone(),
            batch: BatchGenerator::new(params.batch_size),
            perturbation: params.perturbation,
            seed: params.seed,
            batches_run: 0,
            show_help: false,
        })
    }

    pub fn pose(&self) -> &PoseState {
        &self.pose
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn scene(&self) -> &SceneSpec {
        &self.scene
    }

    pub fn stage(&self) -> &Stage<R> {
        &self.stage
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn pose_file(&self) -> &Path {
        &self.pose_file
    }

    pub fn set_pose_file(&mut self, path: impl Into<PathBuf>) {
        self.pose_file = path.into();
    }

    fn baseline(&self) -> f64 {
        self.stage.renderer.initial_camera_distance()
    }

    /// Draws the initial frame.
    pub fn start(&mut self) -> CycleReport {
        self.render()
    }

    /// Processes one input symbol.
    pub fn handle(&mut self, symbol: char) -> Flow {
        match self.dispatcher.dispatch(symbol) {
            Dispatch::Ignore => return Flow::Continue,
            Dispatch::Execute(Command::Quit) => {
                info!("quit confirmed");
                return Flow::Quit;
            }
            Dispatch::Execute(command) => self.execute(command),
            Dispatch::Pending(command) => {
                if let Some((headline, hint)) = command.warning() {
                    info!("{headline} {hint}");
                }
            }
            Dispatch::Cancelled => debug!("confirmation cancelled"),
        }

        if self.ctx.flags.take_batch_request() {
            self.run_batch();
        } else {
            self.render();
        }

        Flow::Continue
    }

    fn execute(&mut self, command: Command) {
        let active = self.pose.active_joint();
        match command {
            Command::Quit | Command::Redraw => {}
            Command::ClearAll => self.pose.clear_all(),
            Command::ToggleHelp => self.show_help = !self.show_help,
            Command::ZeroChannel(channel) => self.pose.set_angle(active, channel, Angle::ZERO),
            Command::NextJoint => {
                self.pose.next_joint();
            }
            Command::PreviousJoint => {
                self.pose.previous_joint();
            }
            Command::SavePose => {
                if let Err(err) = self.save_pose() {
                    error!(%err, "failed to save pose");
                }
            }
            Command::LoadPose => {
                if let Err(err) = self.load_pose() {
                    error!(%err, "failed to load pose");
                }
            }
            Command::ResetCamera => {
                let baseline = self.baseline();
                self.camera.reset(baseline);
            }
            Command::RequestDepth => self.ctx.flags.want_depth = !self.ctx.flags.want_depth,
            Command::RequestBones => self.ctx.flags.want_bones = !self.ctx.flags.want_bones,
            Command::RequestColor => self.ctx.flags.want_color = !self.ctx.flags.want_color,
            Command::RequestBatch => {
                self.ctx.flags.auto_batch_requested = !self.ctx.flags.auto_batch_requested
            }
            Command::ToggleCrop => self.ctx.flags.crop_enabled = !self.ctx.flags.crop_enabled,
        }
    }

    /// Runs one render cycle outside of a batch.
    ///
    /// The sequence counter moves on only if the cycle tried to export
    /// something.
    pub fn render(&mut self) -> CycleReport {
        let report = self
            .stage
            .render_cycle(&self.pose, &self.camera, &mut self.ctx);
        if report.attempted() {
            info!(
                sequence = report.sequence,
                exported = report.exported,
                failed = report.failed,
                "saved sample"
            );
            self.ctx.counter.advance();
        }
        report
    }

    /// Generates a batch of perturbed samples around the current pose.
    ///
    /// The live pose and camera are left at the last sample of the batch.
    /// Returns `None` if the perturbation bounds are unusable.
    pub fn run_batch(&mut self) -> Option<BatchReport> {
        let sampler = match self.seed {
            Some(seed) => PerturbationSampler::seeded(
                &self.perturbation,
                seed.wrapping_add(self.batches_run),
            ),
            None => PerturbationSampler::from_time(&self.perturbation),
        };
        let mut sampler = match sampler {
            Ok(sampler) => sampler,
            Err(err) => {
                error!(%err, "cannot start batch");
                return None;
            }
        };
        self.batches_run += 1;

        let base_angles = self.pose.joints().to_vec();
        let base_camera = self.camera;
        let baseline = self.baseline();
        let batch = self.batch;

        let (pose, camera, stage) = (&mut self.pose, &mut self.camera, &mut self.stage);
        let report = batch.run(
            &mut sampler,
            &base_angles,
            &base_camera,
            baseline,
            &mut self.ctx,
            |angles, sampled_camera, ctx| {
                pose.replace(angles);
                *camera = sampled_camera;
                stage.render_cycle(pose, camera, ctx)
            },
        );

        Some(report)
    }

    /// Selects the joint to edit. Out of range indices clamp to the last joint.
    pub fn set_active_joint(&mut self, index: usize) -> usize {
        let active = self.pose.set_active_joint(index);
        self.render();
        active
    }

    /// Sets one channel of the active joint.
    pub fn set_channel(&mut self, channel: Channel, value: Angle) {
        let active = self.pose.active_joint();
        self.pose.set_angle(active, channel, value);
        self.render();
    }

    pub fn set_camera_angle(&mut self, axis: CameraAxis, value: Angle) {
        self.camera.set_angle(axis, value);
        self.render();
    }

    /// Moves the camera to `multiple` times the initial distance.
    pub fn set_distance_multiple(&mut self, multiple: f64) {
        let baseline = self.baseline();
        self.camera.set_distance_multiple(multiple, baseline);
        self.render();
    }

    pub fn save_pose(&self) -> Result<()> {
        let stored = StoredPose {
            angles: self.pose.joints().to_vec(),
            camera: Some(self.camera),
        };
        self.store.save(&self.pose_file, &self.scene, &stored)?;
        info!(path = %self.pose_file.display(), "saved pose");
        Ok(())
    }

    /// Replaces the pose (and camera, if the file has one) from the pose file.
    ///
    /// Nothing changes unless the whole file loads.
    pub fn load_pose(&mut self) -> Result<()> {
        let stored = self.store.load(&self.pose_file, &self.scene)?;
        if stored.angles.len() != self.pose.joint_count() {
            return Err(Error::file_format(
                &self.pose_file,
                format!(
                    "expected {} joints but got {}",
                    self.pose.joint_count(),
                    stored.angles.len()
                ),
            ));
        }

        self.pose.replace(stored.angles);
        if let Some(camera) = stored.camera {
            self.camera = camera;
        }

        info!(path = %self.pose_file.display(), "loaded pose");
        Ok(())
    }

    /// The text drawn over the render: joint readout, help and any pending
    /// confirmation warning.
    pub fn overlay(&self) -> String {
        let bone_name = self.scene.bone_name(self.pose.active_joint());
        let mut text = format!("{}\nPress 'h' for help", self.pose.readout(bone_name));

        if self.show_help {
            text.push_str("\n\n");
            text.push_str(HELP);
        }

        if let Some((headline, hint)) = self.dispatcher.pending().and_then(|cmd| cmd.warning()) {
            text.push_str(&format!("\n\n{headline}\n{hint}"));
        }

        text
    }
}
