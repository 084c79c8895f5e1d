use crate::{
    camera::CameraState,
    error::{Error, Result},
    pose::JointAngles,
};
use chrono::Utc;
use rand::{
    Rng, SeedableRng,
    distr::{Distribution, Uniform},
    rngs::StdRng,
};
use serde::{Deserialize, Serialize};
use uom::si::{angle::radian, f64::Angle};

/// Ranges of the random offsets applied around a base pose.
///
/// Angular fields are half-widths in radians: a value of `0.2` draws offsets
/// from `[-0.2, 0.2]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerturbationBounds {
    /// Camera distance as a multiple of the initial distance, `(low, high)`.
    pub distance_multiple: (f64, f64),
    pub camera_angle: f64,
    pub bend: f64,
    pub side: f64,
    pub twist: f64,
}

impl Default for PerturbationBounds {
    fn default() -> Self {
        Self {
            distance_multiple: (1.0, 1.8),
            camera_angle: 0.5,
            bend: 0.2,
            side: 0.07,
            twist: 0.05,
        }
    }
}

/// One draw of random offsets, in radians except for the distance multiple.
#[derive(Clone, Debug, PartialEq)]
pub struct Perturbation {
    pub distance_multiple: f64,
    pub theta: f64,
    pub phi: f64,
    pub tilt: f64,
    /// `[bend, side, twist]` offsets, one entry per joint.
    pub joints: Vec<[f64; 3]>,
}

impl Perturbation {
    /// Adds the offsets to a base pose and camera.
    ///
    /// The camera distance is not an offset: it is replaced by
    /// `distance_multiple * baseline`. Nothing is clamped.
    pub fn apply(
        &self,
        base_angles: &[JointAngles],
        base_camera: &CameraState,
        baseline: f64,
    ) -> (Vec<JointAngles>, CameraState) {
        let angles = base_angles
            .iter()
            .zip(&self.joints)
            .map(|(base, [bend, side, twist])| JointAngles {
                bend: base.bend + Angle::new::<radian>(*bend),
                side: base.side + Angle::new::<radian>(*side),
                twist: base.twist + Angle::new::<radian>(*twist),
            })
            .collect();

        let camera = CameraState {
            r: self.distance_multiple * baseline,
            theta: base_camera.theta + Angle::new::<radian>(self.theta),
            phi: base_camera.phi + Angle::new::<radian>(self.phi),
            tilt: base_camera.tilt + Angle::new::<radian>(self.tilt),
        };

        (angles, camera)
    }
}

/// Draws bounded uniform perturbations of a pose and camera.
///
/// The random source is seeded once and then shared by every draw, so the
/// samples of one batch are independent of each other but reproducible from
/// the seed.
pub struct PerturbationSampler<R> {
    distance: Uniform<f64>,
    camera: Uniform<f64>,
    bend: Uniform<f64>,
    side: Uniform<f64>,
    twist: Uniform<f64>,
    rng: R,
}

fn symmetric(half_width: f64) -> Result<Uniform<f64>> {
    uniform(-half_width, half_width)
}

fn uniform(low: f64, high: f64) -> Result<Uniform<f64>> {
    Uniform::new_inclusive(low, high).map_err(|err| match err {
        rand::distr::uniform::Error::EmptyRange => Error::EmptyRange,
        rand::distr::uniform::Error::NonFinite => Error::NonFinite,
    })
}

impl PerturbationSampler<StdRng> {
    /// Creates a sampler seeded from the current time.
    pub fn from_time(bounds: &PerturbationBounds) -> Result<Self> {
        let seed = Utc::now().timestamp_micros() as u64;
        tracing::debug!(seed, "seeded perturbation sampler");
        Self::seeded(bounds, seed)
    }

    pub fn seeded(bounds: &PerturbationBounds, seed: u64) -> Result<Self> {
        Self::try_new(bounds, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PerturbationSampler<R> {
    pub fn try_new(bounds: &PerturbationBounds, rng: R) -> Result<Self> {
        let (low, high) = bounds.distance_multiple;
        Ok(Self {
            distance: uniform(low, high)?,
            camera: symmetric(bounds.camera_angle)?,
            bend: symmetric(bounds.bend)?,
            side: symmetric(bounds.side)?,
            twist: symmetric(bounds.twist)?,
            rng,
        })
    }

    /// Draws offsets for a hand with `joint_count` joints.
    pub fn draw(&mut self, joint_count: usize) -> Perturbation {
        let distance_multiple = self.distance.sample(&mut self.rng);
        let theta = self.camera.sample(&mut self.rng);
        let phi = self.camera.sample(&mut self.rng);
        let tilt = self.camera.sample(&mut self.rng);
        let joints = (0..joint_count)
            .map(|_| {
                [
                    self.bend.sample(&mut self.rng),
                    self.side.sample(&mut self.rng),
                    self.twist.sample(&mut self.rng),
                ]
            })
            .collect();

        Perturbation {
            distance_multiple,
            theta,
            phi,
            tilt,
            joints,
        }
    }

    /// Draws one perturbation and applies it around the given base.
    pub fn sample(
        &mut self,
        base_angles: &[JointAngles],
        base_camera: &CameraState,
        baseline: f64,
    ) -> (Vec<JointAngles>, CameraState) {
        self.draw(base_angles.len())
            .apply(base_angles, base_camera, baseline)
    }
}
