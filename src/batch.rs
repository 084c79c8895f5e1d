use crate::{
    camera::CameraState,
    context::{Artifacts, CycleReport, SessionContext},
    pose::JointAngles,
    sampler::PerturbationSampler,
};
use rand::Rng;
use tracing::{info, warn};

/// Summary of one batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub emitted: usize,
    pub exported: usize,
    pub failed: usize,
    pub first_sequence: u64,
    /// One past the last sequence number used by the batch.
    pub next_sequence: u64,
}

/// Runs a fixed number of perturbed samples around a base pose.
#[derive(Clone, Copy, Debug)]
pub struct BatchGenerator {
    count: usize,
}

impl BatchGenerator {
    pub const DEFAULT_COUNT: usize = 1000;

    pub fn new(count: usize) -> Self {
        Self { count }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Emits `count` samples and advances the sequence counter once per sample.
    ///
    /// Every sample is drawn around the same base pose and camera. Before each
    /// `emit` the save requests are raised: all three artifacts when
    /// `save_all` is set, otherwise the requests pending when the batch
    /// started. `emit` renders and exports the sample. Export failures are
    /// logged and counted but never stop the batch.
    pub fn run<R, F>(
        &self,
        sampler: &mut PerturbationSampler<R>,
        base_angles: &[JointAngles],
        base_camera: &CameraState,
        baseline: f64,
        ctx: &mut SessionContext,
        mut emit: F,
    ) -> BatchReport
    where
        R: Rng,
        F: FnMut(Vec<JointAngles>, CameraState, &mut SessionContext) -> CycleReport,
    {
        let requested = match ctx.save_all {
            true => Artifacts::ALL,
            false => ctx.flags.pending(),
        };

        let mut report = BatchReport {
            first_sequence: ctx.counter.current(),
            ..Default::default()
        };

        info!(
            count = self.count,
            first_sequence = report.first_sequence,
            artifacts = requested.count(),
            "starting batch"
        );

        for _ in 0..self.count {
            let (angles, camera) = sampler.sample(base_angles, base_camera, baseline);
            ctx.flags.request(requested);

            let cycle = emit(angles, camera, ctx);
            if cycle.failed > 0 {
                warn!(
                    sequence = cycle.sequence,
                    failed = cycle.failed,
                    "sample exported incompletely"
                );
            }

            report.emitted += 1;
            report.exported += cycle.exported;
            report.failed += cycle.failed;
            ctx.counter.advance();
        }

        report.next_sequence = ctx.counter.current();
        info!(
            emitted = report.emitted,
            exported = report.exported,
            failed = report.failed,
            "finished batch"
        );

        report
    }
}

impl Default for BatchGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COUNT)
    }
}
