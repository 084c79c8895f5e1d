//! Double-press confirmation for destructive commands.

use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Armed { symbol: char, strikes: u8 },
}

/// What a single key press did to the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// The symbol is not gated and nothing was armed. Handle it normally.
    Idle,
    /// First press of a gated symbol. Its action must not run yet.
    ConfirmedOnce,
    /// Second consecutive press. Run the action exactly once.
    ConfirmedTwice,
    /// A different symbol arrived while armed. Neither action runs.
    Cancelled,
}

/// Two-step arm/confirm state machine.
///
/// A gated symbol arms the gate on its first press and is confirmed by an
/// immediate second press of the same symbol. Any other symbol disarms the
/// gate and is swallowed.
#[derive(Clone, Debug)]
pub struct ConfirmationGate {
    gated: HashSet<char>,
    state: GateState,
}

impl ConfirmationGate {
    const REQUIRED_STRIKES: u8 = 2;

    pub fn new(gated: impl IntoIterator<Item = char>) -> Self {
        Self {
            gated: gated.into_iter().collect(),
            state: GateState::Idle,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// The symbol waiting for confirmation, if any.
    pub fn armed(&self) -> Option<char> {
        match self.state {
            GateState::Idle => None,
            GateState::Armed { symbol, .. } => Some(symbol),
        }
    }

    pub fn is_gated(&self, symbol: char) -> bool {
        self.gated.contains(&symbol)
    }

    pub fn press(&mut self, symbol: char) -> GateOutcome {
        match self.state {
            GateState::Armed { symbol: armed, .. } if armed != symbol => {
                self.state = GateState::Idle;
                GateOutcome::Cancelled
            }
            GateState::Armed { symbol, strikes } => {
                let strikes = strikes + 1;
                if strikes >= Self::REQUIRED_STRIKES {
                    self.state = GateState::Idle;
                    GateOutcome::ConfirmedTwice
                } else {
                    self.state = GateState::Armed { symbol, strikes };
                    GateOutcome::ConfirmedOnce
                }
            }
            GateState::Idle if self.is_gated(symbol) => {
                self.state = GateState::Armed { symbol, strikes: 1 };
                GateOutcome::ConfirmedOnce
            }
            GateState::Idle => GateOutcome::Idle,
        }
    }

    pub fn disarm(&mut self) {
        self.state = GateState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn gate() -> ConfirmationGate {
        ConfirmationGate::new(['q', 'c'])
    }

    #[test]
    fn single_press_arms() {
        let mut gate = gate();
        assert_eq!(gate.press('c'), GateOutcome::ConfirmedOnce);
        assert_eq!(gate.state(), GateState::Armed { symbol: 'c', strikes: 1 });
        assert_eq!(gate.armed(), Some('c'));
    }

    #[test]
    fn double_press_confirms_once() {
        let mut gate = gate();
        assert_eq!(gate.press('c'), GateOutcome::ConfirmedOnce);
        assert_eq!(gate.press('c'), GateOutcome::ConfirmedTwice);
        assert_eq!(gate.state(), GateState::Idle);
        // A third press starts over rather than confirming again.
        assert_eq!(gate.press('c'), GateOutcome::ConfirmedOnce);
    }

    #[test]
    fn other_symbol_cancels() {
        let mut gate = gate();
        gate.press('c');
        assert_eq!(gate.press('x'), GateOutcome::Cancelled);
        assert_eq!(gate.state(), GateState::Idle);
        assert_eq!(gate.press('c'), GateOutcome::ConfirmedOnce);
    }

    #[test]
    fn other_gated_symbol_cancels_without_arming() {
        let mut gate = gate();
        gate.press('c');
        assert_eq!(gate.press('q'), GateOutcome::Cancelled);
        assert_eq!(gate.armed(), None);
    }

    #[test]
    fn ungated_symbols_pass_through() {
        let mut gate = gate();
        assert_eq!(gate.press('b'), GateOutcome::Idle);
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[quickcheck]
    fn interrupted_sequence_never_confirms(other: char) -> bool {
        if other == 'c' {
            return true;
        }

        let mut gate = gate();
        let outcomes = [gate.press('c'), gate.press(other), gate.press('c')];
        !outcomes.contains(&GateOutcome::ConfirmedTwice)
    }
}
