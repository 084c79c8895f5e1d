use std::fmt;
use uom::{
    ConstZero,
    si::{
        angle::{degree, radian},
        f64::Angle,
    },
};

/// One rotational degree of freedom of a joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Bend,
    Side,
    Twist,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Bend, Channel::Side, Channel::Twist];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Bend => write!(f, "bend"),
            Channel::Side => write!(f, "side"),
            Channel::Twist => write!(f, "twist"),
        }
    }
}

/// The (bend, side, twist) triple of a single joint.
///
/// No range is enforced here. Whether a value is anatomically plausible is
/// decided by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointAngles {
    pub bend: Angle,
    pub side: Angle,
    pub twist: Angle,
}

impl JointAngles {
    pub const ZERO: JointAngles = JointAngles {
        bend: Angle::ZERO,
        side: Angle::ZERO,
        twist: Angle::ZERO,
    };

    pub fn from_radians(bend: f64, side: f64, twist: f64) -> Self {
        Self {
            bend: Angle::new::<radian>(bend),
            side: Angle::new::<radian>(side),
            twist: Angle::new::<radian>(twist),
        }
    }

    pub fn get(&self, channel: Channel) -> Angle {
        match channel {
            Channel::Bend => self.bend,
            Channel::Side => self.side,
            Channel::Twist => self.twist,
        }
    }

    pub fn set(&mut self, channel: Channel, value: Angle) {
        match channel {
            Channel::Bend => self.bend = value,
            Channel::Side => self.side = value,
            Channel::Twist => self.twist = value,
        }
    }
}

impl Default for JointAngles {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Per-joint angles of the hand plus the joint currently being edited.
///
/// Joint indices handed to the accessors are expected to be valid; the
/// dispatcher and session only ever pass indices in `0..joint_count()`.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseState {
    joints: Vec<JointAngles>,
    active: usize,
}

impl PoseState {
    /// Creates a zeroed pose with `joint_count` joints and joint 0 active.
    pub fn new(joint_count: usize) -> Self {
        Self {
            joints: vec![JointAngles::ZERO; joint_count],
            active: 0,
        }
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn joints(&self) -> &[JointAngles] {
        &self.joints
    }

    pub fn angle(&self, joint: usize, channel: Channel) -> Angle {
        self.joints[joint].get(channel)
    }

    pub fn set_angle(&mut self, joint: usize, channel: Channel, value: Angle) {
        self.joints[joint].set(channel, value);
    }

    pub fn clear_joint(&mut self, joint: usize) {
        self.joints[joint] = JointAngles::ZERO;
    }

    pub fn clear_all(&mut self) {
        self.joints.fill(JointAngles::ZERO);
    }

    /// Swaps in a whole new set of joint angles.
    ///
    /// The joint count is fixed for the session, so `joints` must have the
    /// same length as the current pose. Returns `false` and leaves the pose
    /// untouched otherwise.
    pub fn replace(&mut self, joints: Vec<JointAngles>) -> bool {
        if joints.len() != self.joints.len() {
            return false;
        }

        self.joints = joints;
        true
    }

    pub fn active_joint(&self) -> usize {
        self.active
    }

    pub fn active_angles(&self) -> JointAngles {
        self.joints[self.active]
    }

    /// Selects the joint targeted by editing commands, clamped to the last joint.
    ///
    /// Returns the index that is active afterwards.
    pub fn set_active_joint(&mut self, index: usize) -> usize {
        self.active = index.min(self.joints.len().saturating_sub(1));
        self.active
    }

    /// Moves to the next joint. Stays put on the last joint.
    pub fn next_joint(&mut self) -> usize {
        if self.active + 1 < self.joints.len() {
            self.active += 1;
        }
        self.active
    }

    /// Moves to the previous joint. Stays put on joint 0.
    pub fn previous_joint(&mut self) -> usize {
        self.active = self.active.saturating_sub(1);
        self.active
    }

    /// Formats the active joint's angles the way the designer prints them.
    pub fn readout<'a>(&'a self, bone_name: &'a str) -> Readout<'a> {
        Readout {
            index: self.active,
            bone_name,
            angles: self.active_angles(),
        }
    }
}

pub struct Readout<'a> {
    index: usize,
    bone_name: &'a str,
    angles: JointAngles,
}

impl fmt::Display for Readout<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let JointAngles { bend, side, twist } = self.angles;
        writeln!(f, "Joint #{}: {}", self.index, self.bone_name)?;
        writeln!(
            f,
            "Degrees: b: {:+6.1} s: {:+6.1} t: {:+6.1}",
            bend.get::<degree>(),
            side.get::<degree>(),
            twist.get::<degree>()
        )?;
        write!(
            f,
            "Radians: b: {:+6.4} s: {:+6.4} t: {:+6.4}",
            bend.get::<radian>(),
            side.get::<radian>(),
            twist.get::<radian>()
        )
    }
}
