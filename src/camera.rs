use nalgebra::Vector3;
use std::fmt;
use uom::{
    ConstZero,
    si::{angle::radian, f64::Angle},
};

/// One of the angular camera parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraAxis {
    Theta,
    Phi,
    Tilt,
}

impl fmt::Display for CameraAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraAxis::Theta => write!(f, "theta"),
            CameraAxis::Phi => write!(f, "phi"),
            CameraAxis::Tilt => write!(f, "tilt"),
        }
    }
}

/// Camera placement on a sphere around the hand.
///
/// `r` is an absolute distance, usually a multiple of the renderer's initial
/// camera distance. Any value is accepted, plausibility is the renderer's
/// concern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub r: f64,
    pub theta: Angle,
    pub phi: Angle,
    pub tilt: Angle,
}

impl CameraState {
    /// The canonical view: all angles zero at one `baseline` distance.
    pub fn canonical(baseline: f64) -> Self {
        Self {
            r: baseline,
            theta: Angle::ZERO,
            phi: Angle::ZERO,
            tilt: Angle::ZERO,
        }
    }

    pub fn reset(&mut self, baseline: f64) {
        *self = Self::canonical(baseline);
    }

    pub fn angle(&self, axis: CameraAxis) -> Angle {
        match axis {
            CameraAxis::Theta => self.theta,
            CameraAxis::Phi => self.phi,
            CameraAxis::Tilt => self.tilt,
        }
    }

    pub fn set_angle(&mut self, axis: CameraAxis, value: Angle) {
        match axis {
            CameraAxis::Theta => self.theta = value,
            CameraAxis::Phi => self.phi = value,
            CameraAxis::Tilt => self.tilt = value,
        }
    }

    pub fn set_theta(&mut self, value: Angle) {
        self.theta = value;
    }

    pub fn set_phi(&mut self, value: Angle) {
        self.phi = value;
    }

    pub fn set_tilt(&mut self, value: Angle) {
        self.tilt = value;
    }

    /// Places the camera at `multiple * baseline` from the hand.
    pub fn set_distance_multiple(&mut self, multiple: f64, baseline: f64) {
        self.r = multiple * baseline;
    }

    pub fn distance_multiple(&self, baseline: f64) -> f64 {
        self.r / baseline
    }

    /// Cartesian camera position with the hand at the origin.
    ///
    /// `theta` swings the camera around the vertical (+Z) axis starting from
    /// +Y, `phi` raises it towards +Z. `tilt` rolls the camera about its
    /// viewing axis and does not move it.
    pub fn position(&self) -> Vector3<f64> {
        let (theta, phi) = (self.theta.get::<radian>(), self.phi.get::<radian>());
        Vector3::new(
            self.r * phi.cos() * theta.sin(),
            self.r * phi.cos() * theta.cos(),
            self.r * phi.sin(),
        )
    }
}
