use crate::{
    gate::{ConfirmationGate, GateOutcome},
    pose::Channel,
};

pub const ESCAPE: char = '\u{1b}';

/// Everything a single input symbol can ask the session to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    ClearAll,
    ToggleHelp,
    ZeroChannel(Channel),
    NextJoint,
    PreviousJoint,
    Redraw,
    SavePose,
    LoadPose,
    ResetCamera,
    RequestDepth,
    RequestBones,
    RequestColor,
    RequestBatch,
    ToggleCrop,
}

impl Command {
    /// Every symbol with a binding.
    pub const SYMBOLS: [char; 18] = [
        ESCAPE, 'q', 'c', 'h', 'b', 's', 't', 'a', 'z', 'p', 'w', 'r', '1', 'x', 'y', 'i', 'u',
        'o',
    ];

    pub fn from_symbol(symbol: char) -> Option<Self> {
        let command = match symbol {
            ESCAPE | 'q' => Command::Quit,
            'c' => Command::ClearAll,
            'h' => Command::ToggleHelp,
            'b' => Command::ZeroChannel(Channel::Bend),
            's' => Command::ZeroChannel(Channel::Side),
            't' => Command::ZeroChannel(Channel::Twist),
            'a' => Command::NextJoint,
            'z' => Command::PreviousJoint,
            'p' => Command::Redraw,
            'w' => Command::SavePose,
            'r' => Command::LoadPose,
            '1' => Command::ResetCamera,
            'x' => Command::RequestDepth,
            'y' => Command::RequestBones,
            'i' => Command::RequestColor,
            'u' => Command::RequestBatch,
            'o' => Command::ToggleCrop,
            _ => return None,
        };

        Some(command)
    }

    /// Commands that need a second press of the same key to run.
    pub fn is_gated(&self) -> bool {
        matches!(self, Command::Quit | Command::ClearAll)
    }

    /// Text shown while a gated command waits for confirmation.
    pub fn warning(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Command::ClearAll => Some((
                "WARNING! All angles will be cleared!",
                "Press 'c' to continue, any other key to cancel",
            )),
            Command::Quit => Some((
                "WARNING! All unsaved data will be lost",
                "Press q or ESC to quit, any other key to cancel",
            )),
            _ => None,
        }
    }
}

/// Outcome of feeding one symbol to the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Unknown symbol. Nothing happens, not even a redraw.
    Ignore,
    /// Run the command.
    Execute(Command),
    /// A gated command was armed. Redraw with its warning but change nothing.
    Pending(Command),
    /// An armed gate was aborted by this symbol. Redraw only.
    Cancelled,
}

impl Dispatch {
    /// Whether processing this symbol ends with one render cycle.
    ///
    /// Everything but an ignored symbol renders, except a confirmed quit,
    /// which ends the session instead.
    pub fn renders(&self) -> bool {
        !matches!(self, Dispatch::Ignore | Dispatch::Execute(Command::Quit))
    }
}

pub const HELP: &str = "\
Keyboard Shortcuts:
  h - This help screen (press again to dismiss)
  ESC or q - Quit

  r - Read a pose file
  w - Write a pose file

  b / s / t - Reset (b)end or (s)ide or (t)wist to 0
  c - clear all angles back to zero

  a / z - Select next/previous joint
  1 - Reset the camera to original view

  x - Save the depth of current pose
  y - Save the bone information of current pose
  i - Save the color image of current pose

  u - Render a batch of perturbed poses around the current pose and save them
  o - crop the hand by box";

/// Maps input symbols to commands, routing gated ones through a
/// [`ConfirmationGate`]. Never fails: unknown symbols are ignored.
#[derive(Clone, Debug)]
pub struct CommandDispatcher {
    gate: ConfirmationGate,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self {
            gate: ConfirmationGate::new(Command::SYMBOLS.into_iter().filter(|symbol| {
                Command::from_symbol(*symbol).is_some_and(|command| command.is_gated())
            })),
        }
    }

    pub fn gate(&self) -> &ConfirmationGate {
        &self.gate
    }

    /// The gated command currently waiting for its second press.
    pub fn pending(&self) -> Option<Command> {
        self.gate.armed().and_then(Command::from_symbol)
    }

    pub fn dispatch(&mut self, symbol: char) -> Dispatch {
        match self.gate.press(symbol) {
            GateOutcome::Cancelled => Dispatch::Cancelled,
            GateOutcome::ConfirmedOnce => match Command::from_symbol(symbol) {
                Some(command) => Dispatch::Pending(command),
                None => Dispatch::Ignore,
            },
            GateOutcome::ConfirmedTwice | GateOutcome::Idle => match Command::from_symbol(symbol) {
                Some(command) => Dispatch::Execute(command),
                None => Dispatch::Ignore,
            },
        }
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
