//! Counters and flags shared by single-shot saves and batch generation.

/// A set of artifact kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Artifacts {
    pub color: bool,
    pub depth: bool,
    pub bones: bool,
}

impl Artifacts {
    pub const NONE: Artifacts = Artifacts {
        color: false,
        depth: false,
        bones: false,
    };

    pub const ALL: Artifacts = Artifacts {
        color: true,
        depth: true,
        bones: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.color || self.depth || self.bones)
    }

    pub fn count(&self) -> usize {
        [self.color, self.depth, self.bones]
            .into_iter()
            .filter(|wanted| *wanted)
            .count()
    }
}

/// Save requests plus the crop and batch toggles.
///
/// The three `want_*` flags are one-shot: the next render cycle consumes
/// them. `crop_enabled` stays until toggled again. `auto_batch_requested`
/// stays until a batch picks it up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleRequestFlags {
    pub want_depth: bool,
    pub want_bones: bool,
    pub want_color: bool,
    pub crop_enabled: bool,
    pub auto_batch_requested: bool,
}

impl SampleRequestFlags {
    pub fn pending(&self) -> Artifacts {
        Artifacts {
            color: self.want_color,
            depth: self.want_depth,
            bones: self.want_bones,
        }
    }

    /// Raises the flags for every artifact in `artifacts`. Flags already
    /// raised stay raised.
    pub fn request(&mut self, artifacts: Artifacts) {
        self.want_color |= artifacts.color;
        self.want_depth |= artifacts.depth;
        self.want_bones |= artifacts.bones;
    }

    /// Returns the pending requests and clears them.
    pub fn take(&mut self) -> Artifacts {
        let pending = self.pending();
        self.want_color = false;
        self.want_depth = false;
        self.want_bones = false;
        pending
    }

    pub fn take_batch_request(&mut self) -> bool {
        std::mem::take(&mut self.auto_batch_requested)
    }
}

/// Names exported files. Only ever moves forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequenceCounter(u64);

impl SequenceCounter {
    pub fn starting_at(first: u64) -> Self {
        Self(first)
    }

    /// The number the next exported sample is written under.
    pub fn current(&self) -> u64 {
        self.0
    }

    /// Moves past the current number and returns the new one.
    pub fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

/// Session-wide state that the render cycle and batch loop both touch.
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    pub flags: SampleRequestFlags,
    pub counter: SequenceCounter,
    /// Every batch sample exports the full artifact set.
    pub save_all: bool,
}

impl SessionContext {
    pub fn new(first_sequence: u64, save_all: bool) -> Self {
        Self {
            flags: SampleRequestFlags::default(),
            counter: SequenceCounter::starting_at(first_sequence),
            save_all,
        }
    }
}

/// What one render cycle exported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub sequence: u64,
    pub exported: usize,
    pub failed: usize,
}

impl CycleReport {
    pub fn attempted(&self) -> bool {
        self.exported + self.failed > 0
    }
}
