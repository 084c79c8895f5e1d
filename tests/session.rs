use handsynth::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use uom::{
    ConstZero,
    si::{angle::radian, f64::Angle},
};

const ROWS: usize = 24;
const COLS: usize = 32;
const JOINTS: usize = 27;

/// Depth values count up in row-major order; joint `i` sits at `(i, i / 2)`.
struct ScriptedRenderer {
    renders: usize,
    angles: Vec<JointAngles>,
    camera: Option<CameraState>,
    color: ColorImage,
    depth: DepthGrid,
    crop_joint_at: (f64, f64),
}

impl ScriptedRenderer {
    fn new() -> Self {
        Self {
            renders: 0,
            angles: Vec::new(),
            camera: None,
            color: ColorImage::filled(ROWS, COLS, [200, 120, 80]),
            depth: DepthGrid::from_values(ROWS, COLS, (0..ROWS * COLS).map(|v| v as f32).collect())
                .unwrap(),
            crop_joint_at: (16.0, 12.0),
        }
    }
}

impl Renderer for ScriptedRenderer {
    fn set_pose(&mut self, angles: &[JointAngles]) {
        self.angles = angles.to_vec();
    }

    fn set_camera(&mut self, camera: &CameraState) {
        self.camera = Some(*camera);
    }

    fn render(&mut self) {
        self.renders += 1;
    }

    fn color_buffer(&self) -> &ColorImage {
        &self.color
    }

    fn depth_buffer(&self) -> &DepthGrid {
        &self.depth
    }

    fn joint_positions(&self) -> Vec<JointRecord> {
        (0..self.angles.len())
            .map(|i| match i {
                26 => JointRecord::new(self.crop_joint_at.0, self.crop_joint_at.1, 1.0, 0.0, 0.0, 0.0),
                _ => JointRecord::new(i as f64, (i / 2) as f64, 1.0, 0.0, 0.0, 0.0),
            })
            .collect()
    }

    fn initial_camera_distance(&self) -> f64 {
        4.0
    }

    fn current_camera_distance(&self) -> f64 {
        self.camera.map(|camera| camera.r).unwrap_or(4.0)
    }
}

fn output_dir(test: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR"))
        .join("session")
        .join(test);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn scene() -> SceneSpec {
    SceneSpec::new("scripted", (0..JOINTS).map(|i| format!("bone{i}")).collect())
}

fn session_in(dir: &Path, tweak: impl FnOnce(&mut DesignerParams)) -> Session<ScriptedRenderer, JsonPoseStore> {
    let mut params = DesignerParams {
        export: ExportLayout::with_root(dir),
        pose_file: dir.join("pose.json"),
        crop_half_width: 4,
        batch_size: 5,
        seed: Some(17),
        ..Default::default()
    };
    tweak(&mut params);

    let mut session = Session::new(&params, scene(), ScriptedRenderer::new(), JsonPoseStore).unwrap();
    session.start();
    session
}

fn press(session: &mut Session<ScriptedRenderer, JsonPoseStore>, keys: &str) -> Flow {
    keys.chars()
        .map(|key| session.handle(key))
        .last()
        .unwrap_or(Flow::Continue)
}

fn renders(session: &Session<ScriptedRenderer, JsonPoseStore>) -> usize {
    session.stage().renderer().renders
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

#[test]
fn scene_without_bones_is_a_configuration_error() {
    let result = Session::new(
        &DesignerParams::default(),
        SceneSpec::new("empty", Vec::new()),
        ScriptedRenderer::new(),
        JsonPoseStore,
    );
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn start_renders_canonical_view_without_exporting() {
    let dir = output_dir("start");
    let session = session_in(&dir, |_| {});

    assert_eq!(renders(&session), 1);
    assert_eq!(session.context().counter.current(), 0);
    assert_eq!(*session.camera(), CameraState::canonical(4.0));
    assert_eq!(session.pose().joint_count(), JOINTS);
    assert_eq!(session.pose().active_joint(), 0);
}

#[test]
fn each_processed_symbol_renders_once() {
    let dir = output_dir("render_once");
    let mut session = session_in(&dir, |_| {});

    press(&mut session, "b");
    assert_eq!(renders(&session), 2);

    // Unknown symbols are ignored entirely.
    press(&mut session, "k");
    assert_eq!(renders(&session), 2);

    // Arming and cancelling a confirmation both redraw.
    press(&mut session, "cx");
    assert_eq!(renders(&session), 4);
}

#[test]
fn single_depth_save_uses_and_advances_the_counter() {
    let dir = output_dir("depth_single");
    let mut session = session_in(&dir, |params| params.first_sequence = 40);

    press(&mut session, "x");
    assert_eq!(session.context().counter.current(), 41);
    assert!(!session.context().flags.want_depth);

    let record = fs::read_to_string(dir.join("Depth/depth_40.txt")).unwrap();
    assert!(record.starts_with("24,32,0,1,2,3,"));
    assert!(record.ends_with(",767,24,32,0,0,32,24"));

    // Plain redraws do not consume sequence numbers.
    press(&mut session, "p");
    assert_eq!(session.context().counter.current(), 41);
}

#[test]
fn bones_record_lists_every_joint() {
    let dir = output_dir("bones_single");
    let mut session = session_in(&dir, |_| {});

    press(&mut session, "y");
    let record = fs::read_to_string(dir.join("Joints/bone_0.txt")).unwrap();
    assert_eq!(record.split(',').count(), JOINTS * 6 + 1);
    assert!(record.starts_with("0,0,1,0,0,0,1,0,1,0,0,0,"));
    assert!(record.ends_with(",0"));
}

#[test]
fn cropped_color_image_is_centred_on_joint() {
    let dir = output_dir("color_crop");
    let mut session = session_in(&dir, |_| {});

    press(&mut session, "oi");
    assert!(session.context().flags.crop_enabled);

    let crop_box = session.stage().crop_box().unwrap();
    assert_eq!(
        (crop_box.top_left.x, crop_box.top_left.y),
        (12, 8)
    );
    assert_eq!(
        (crop_box.bottom_right.x, crop_box.bottom_right.y),
        (20, 16)
    );

    let saved = image::open(dir.join("Segment/seg_0.jpg")).unwrap();
    assert_eq!((saved.width(), saved.height()), (8, 8));
}

#[test]
fn crop_outside_image_fails_but_consumes_the_number() {
    let dir = output_dir("crop_outside");
    let mut session = session_in(&dir, |params| params.crop_half_width = 20);

    press(&mut session, "ox");
    assert_eq!(count_files(&dir.join("Depth")), 0);
    assert_eq!(session.context().counter.current(), 1);

    // Bones do not depend on the crop.
    press(&mut session, "y");
    assert!(dir.join("Joints/bone_1.txt").exists());
}

#[test]
fn clear_all_needs_confirmation() {
    let dir = output_dir("clear_all");
    let mut session = session_in(&dir, |_| {});
    session.set_channel(Channel::Bend, Angle::new::<radian>(0.8));

    press(&mut session, "c");
    assert_eq!(
        session.pose().angle(0, Channel::Bend),
        Angle::new::<radian>(0.8)
    );
    assert!(session.overlay().contains("WARNING! All angles will be cleared!"));

    press(&mut session, "c");
    assert!(session.pose().joints().iter().all(|joint| *joint == JointAngles::ZERO));
    assert!(!session.overlay().contains("WARNING"));
}

#[test]
fn cancelling_key_is_swallowed() {
    let dir = output_dir("cancel");
    let mut session = session_in(&dir, |_| {});
    session.set_channel(Channel::Bend, Angle::new::<radian>(0.8));

    // `c` arms, `b` cancels without zeroing, `c` arms again.
    press(&mut session, "cbc");
    assert_eq!(
        session.pose().angle(0, Channel::Bend),
        Angle::new::<radian>(0.8)
    );

    // Still armed, so this `b` only cancels.
    press(&mut session, "b");
    assert_eq!(
        session.pose().angle(0, Channel::Bend),
        Angle::new::<radian>(0.8)
    );

    press(&mut session, "b");
    assert_eq!(session.pose().angle(0, Channel::Bend), Angle::ZERO);
}

#[test]
fn clear_is_not_confirmed_across_another_key() {
    let dir = output_dir("clear_interrupted");
    let mut session = session_in(&dir, |_| {});
    session.set_channel(Channel::Side, Angle::new::<radian>(0.05));

    press(&mut session, "cxc");
    assert_eq!(
        session.pose().angle(0, Channel::Side),
        Angle::new::<radian>(0.05)
    );
    assert!(!session.context().flags.want_depth);
}

#[test]
fn quit_needs_two_presses() {
    let dir = output_dir("quit");
    let mut session = session_in(&dir, |_| {});

    assert_eq!(press(&mut session, "q"), Flow::Continue);
    assert_eq!(press(&mut session, "x"), Flow::Continue);
    assert!(!session.context().flags.want_depth);
    assert_eq!(count_files(&dir.join("Depth")), 0);

    assert_eq!(press(&mut session, "\u{1b}"), Flow::Continue);
    assert_eq!(press(&mut session, "\u{1b}"), Flow::Quit);
}

#[test]
fn joint_navigation_clamps_at_both_ends() {
    let dir = output_dir("navigation");
    let mut session = session_in(&dir, |_| {});

    press(&mut session, "z");
    assert_eq!(session.pose().active_joint(), 0);

    press(&mut session, &"a".repeat(JOINTS + 3));
    assert_eq!(session.pose().active_joint(), JOINTS - 1);

    press(&mut session, "z");
    assert_eq!(session.pose().active_joint(), JOINTS - 2);

    assert_eq!(session.set_active_joint(100), JOINTS - 1);
}

#[test]
fn zeroing_touches_only_active_joint_channel() {
    let dir = output_dir("zero_channel");
    let mut session = session_in(&dir, |_| {});
    session.set_active_joint(3);
    session.set_channel(Channel::Side, Angle::new::<radian>(0.2));
    session.set_channel(Channel::Twist, Angle::new::<radian>(-0.1));

    press(&mut session, "s");
    assert_eq!(session.pose().angle(3, Channel::Side), Angle::ZERO);
    assert_eq!(
        session.pose().angle(3, Channel::Twist),
        Angle::new::<radian>(-0.1)
    );
}

#[test]
fn camera_reset_restores_canonical_view() {
    let dir = output_dir("camera_reset");
    let mut session = session_in(&dir, |_| {});
    session.set_camera_angle(CameraAxis::Theta, Angle::new::<radian>(0.4));
    session.set_distance_multiple(2.5);
    assert_eq!(session.camera().r, 10.0);

    press(&mut session, "1");
    assert_eq!(*session.camera(), CameraState::canonical(4.0));
}

#[test]
fn batch_with_save_all_exports_full_sets() {
    let dir = output_dir("batch_save_all");
    let mut session = session_in(&dir, |params| params.save_all = true);
    let before = renders(&session);

    press(&mut session, "u");

    assert_eq!(renders(&session) - before, 5);
    assert_eq!(session.context().counter.current(), 5);
    assert!(!session.context().flags.auto_batch_requested);
    assert_eq!(count_files(&dir.join("Segment")), 5);
    assert_eq!(count_files(&dir.join("Depth")), 5);
    assert_eq!(count_files(&dir.join("Joints")), 5);
    for sequence in 0..5 {
        assert!(dir.join(format!("Joints/bone_{sequence}.txt")).exists());
    }

    // Single saves continue the numbering.
    press(&mut session, "y");
    assert!(dir.join("Joints/bone_5.txt").exists());
}

#[test]
fn batch_without_requests_still_counts() {
    let dir = output_dir("batch_plain");
    let mut session = session_in(&dir, |_| {});

    press(&mut session, "u");
    assert_eq!(session.context().counter.current(), 5);
    assert_eq!(count_files(&dir.join("Depth")), 0);

    press(&mut session, "u");
    assert_eq!(session.context().counter.current(), 10);
}

#[test]
fn batch_perturbs_around_the_pose() {
    let dir = output_dir("batch_bounds");
    let mut session = session_in(&dir, |params| params.batch_size = 1);
    session.set_channel(Channel::Bend, Angle::new::<radian>(1.0));

    let report = session.run_batch().unwrap();
    assert_eq!(report.emitted, 1);

    let bend = session.pose().angle(0, Channel::Bend).get::<radian>();
    assert!((bend - 1.0).abs() <= 0.2 + 1e-12);
    let r = session.camera().r;
    assert!((4.0..=7.2).contains(&r));
}

#[test]
fn batch_survives_joint_without_position() {
    let dir = output_dir("batch_unprojected_joint");
    let params = DesignerParams {
        export: ExportLayout::with_root(&dir),
        batch_size: 4,
        save_all: true,
        seed: Some(3),
        ..Default::default()
    };
    let mut renderer = ScriptedRenderer::new();
    renderer.crop_joint_at = (f64::NEG_INFINITY, 0.0);
    let mut session = Session::new(&params, scene(), renderer, JsonPoseStore).unwrap();
    session.start();

    // Depth has no crop box and fails; bones do not need one.
    press(&mut session, "oxy");
    assert_eq!(session.context().counter.current(), 2);
    assert_eq!(count_files(&dir.join("Depth")), 0);
    assert!(dir.join("Joints/bone_1.txt").exists());

    let report = session.run_batch().unwrap();
    assert_eq!(report.emitted, 4);
    assert_eq!(report.failed, 8);
    assert_eq!(report.exported, 4);
    assert_eq!(session.context().counter.current(), 6);
    assert_eq!(count_files(&dir.join("Joints")), 5);
    assert_eq!(count_files(&dir.join("Segment")), 0);
}

#[test]
fn pose_file_round_trip() {
    let dir = output_dir("pose_file");
    let mut session = session_in(&dir, |_| {});
    session.set_active_joint(5);
    session.set_channel(Channel::Bend, Angle::new::<radian>(0.5));
    session.set_camera_angle(CameraAxis::Phi, Angle::new::<radian>(0.25));

    press(&mut session, "w");
    assert!(dir.join("pose.json").exists());

    press(&mut session, "cc1");
    assert_eq!(session.pose().angle(5, Channel::Bend), Angle::ZERO);
    assert_eq!(session.camera().phi, Angle::ZERO);

    press(&mut session, "r");
    assert_eq!(
        session.pose().angle(5, Channel::Bend),
        Angle::new::<radian>(0.5)
    );
    assert_eq!(session.camera().phi, Angle::new::<radian>(0.25));
}

#[test]
fn failed_load_keeps_state() {
    let dir = output_dir("pose_load_failure");
    let mut session = session_in(&dir, |_| {});
    session.set_channel(Channel::Twist, Angle::new::<radian>(0.3));

    session.set_pose_file(dir.join("missing.json"));
    press(&mut session, "r");
    assert_eq!(
        session.pose().angle(0, Channel::Twist),
        Angle::new::<radian>(0.3)
    );

    fs::write(dir.join("bad.json"), "{\"bones\": 3}").unwrap();
    session.set_pose_file(dir.join("bad.json"));
    assert!(matches!(session.load_pose(), Err(Error::FileFormat { .. })));
    assert_eq!(
        session.pose().angle(0, Channel::Twist),
        Angle::new::<radian>(0.3)
    );
}

#[test]
fn help_toggles() {
    let dir = output_dir("help");
    let mut session = session_in(&dir, |_| {});
    assert!(!session.overlay().contains("Keyboard Shortcuts"));

    press(&mut session, "h");
    assert!(session.show_help());
    assert!(session.overlay().contains("Keyboard Shortcuts"));

    press(&mut session, "h");
    assert!(!session.show_help());
}
