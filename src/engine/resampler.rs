use super::render::{RenderJob, ResampleParams, SilenceParams};
use super::{ProcessRunner, RunError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Drives the external resampler.
pub struct Resampler<R: ProcessRunner> {
    runner: R,
    /// The resampler executable.
    resampler_path: PathBuf,
    /// Sample used as input when rendering silence.
    silence_path: PathBuf,
}

impl<R: ProcessRunner> Resampler<R> {
    pub fn new(
        runner: R,
        resampler_path: impl Into<PathBuf>,
        silence_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            resampler_path: resampler_path.into(),
            silence_path: silence_path.into(),
        }
    }

    pub fn resampler_path(&self) -> &Path {
        &self.resampler_path
    }

    /// Renders one note.
    pub fn resample(&self, params: &ResampleParams) -> Result<(), RunError> {
        debug!(
            input = %params.input.display(),
            output = %params.output.display(),
            "resampling note"
        );
        self.runner.run(&self.resampler_path, &params.to_args())
    }

    /// Renders `duration` ms of silence into `output`.
    pub fn resample_silence(&self, output: &Path, duration: f64) -> Result<(), RunError> {
        let params = SilenceParams::new(&self.silence_path, output, duration);
        debug!(output = %output.display(), duration, "rendering silence");
        self.runner.run(&self.resampler_path, &params.to_args())
    }

    pub fn render(&self, job: &RenderJob) -> Result<(), RunError> {
        match job {
            RenderJob::Note(params) => self.resample(params),
            RenderJob::Silence(params) => self.runner.run(&self.resampler_path, &params.to_args()),
        }
    }
}
