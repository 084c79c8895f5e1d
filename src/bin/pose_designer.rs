use clap::Parser;
use handsynth::prelude::*;
use std::{
    fmt::Display,
    io::{self, BufRead},
    path::PathBuf,
    process::ExitCode,
    str::FromStr,
};
use tracing::{error, warn};
use uom::si::{angle::radian, f64::Angle};

/// Pose a hand and export synthetic samples.
///
/// Reads commands from stdin. Every character of a line is one key press
/// (`h` lists them). Lines starting with `:` set a value directly, e.g.
/// `:joint 4`, `:bend 0.3`, `:theta -0.2`, `:distance 1.4` or `:pose hand.json`.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Scene description listing the bones of the hand.
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Designer parameters as JSON.
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Root directory for exported samples.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export color, depth and joints for every batch sample.
    #[arg(long)]
    save_all: bool,

    /// Seed batch perturbations instead of using the clock.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    // Register an event subscriber that prints events to STDOUT.
    let subscriber = tracing_subscriber::FmtSubscriber::new();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to install log subscriber");
    }

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "pose designer stopped");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut params = match &args.params {
        Some(path) => DesignerParams::load(path)?,
        None => DesignerParams::default(),
    };
    if let Some(output) = args.output {
        params.export.root = output;
    }
    params.save_all |= args.save_all;
    if args.seed.is_some() {
        params.seed = args.seed;
    }

    let scene_path = args
        .scene
        .ok_or_else(|| Error::Configuration("no scene file chosen".into()))?;
    let scene = SceneSpec::load(&scene_path)?;

    let (rows, cols) = params.render_size_px;
    let renderer = BlankRenderer::new(rows, cols, params.initial_distance);
    let mut session = Session::new(&params, scene, renderer, JsonPoseStore)?;

    session.start();
    println!("{}", session.overlay());

    for line in io::stdin().lock().lines() {
        let line = line.map_err(|err| Error::Io {
            path: PathBuf::from("<stdin>"),
            source: err,
        })?;

        let flow = match line.strip_prefix(':') {
            Some(setting) => {
                apply_setting(&mut session, setting);
                Flow::Continue
            }
            None => press_keys(&mut session, &line),
        };

        if flow == Flow::Quit {
            break;
        }
        println!("{}", session.overlay());
    }

    Ok(())
}

fn press_keys<R: Renderer, S: PoseStore>(session: &mut Session<R, S>, keys: &str) -> Flow {
    for symbol in keys.chars() {
        if session.handle(symbol) == Flow::Quit {
            return Flow::Quit;
        }
    }
    Flow::Continue
}

fn parse<T>(name: &str, value: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(name, value, %err, "invalid value");
            None
        }
    }
}

fn apply_setting<R: Renderer, S: PoseStore>(session: &mut Session<R, S>, setting: &str) {
    let mut parts = setting.split_whitespace();
    let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
        warn!(setting, "expected `:<name> <value>`");
        return;
    };

    let channel = match name {
        "bend" => Some(Channel::Bend),
        "side" => Some(Channel::Side),
        "twist" => Some(Channel::Twist),
        _ => None,
    };
    let axis = match name {
        "theta" => Some(CameraAxis::Theta),
        "phi" => Some(CameraAxis::Phi),
        "tilt" => Some(CameraAxis::Tilt),
        _ => None,
    };

    match (name, channel, axis) {
        (_, Some(channel), _) => {
            if let Some(value) = parse::<f64>(name, value) {
                session.set_channel(channel, Angle::new::<radian>(value));
            }
        }
        (_, _, Some(axis)) => {
            if let Some(value) = parse::<f64>(name, value) {
                session.set_camera_angle(axis, Angle::new::<radian>(value));
            }
        }
        ("joint", _, _) => {
            if let Some(index) = parse::<usize>(name, value) {
                session.set_active_joint(index);
            }
        }
        ("distance", _, _) => {
            if let Some(multiple) = parse::<f64>(name, value) {
                session.set_distance_multiple(multiple);
            }
        }
        ("pose", _, _) => session.set_pose_file(value),
        _ => warn!(name, "unknown setting"),
    }
}
