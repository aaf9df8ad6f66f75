use super::{path_arg, ProcessRunner, RunError};
use crate::voicebank::Voicebank;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Samples per value in a frq file. Every analyzer in use produces 256.
pub const DEFAULT_SAMPLES_PER_FRQ: i32 = 256;

/// One request to analyze a wav sample into a frq file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub samples_per_frq: i32,
}

impl AnalysisJob {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        samples_per_frq: i32,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            samples_per_frq,
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        vec![
            path_arg(&self.input),
            path_arg(&self.output),
            self.samples_per_frq.to_string(),
        ]
    }
}

/// Drives the external frequency analyzer.
pub struct FrqGenerator<R: ProcessRunner> {
    runner: R,
    frq_generator_path: PathBuf,
    samples_per_frq: i32,
}

impl<R: ProcessRunner> FrqGenerator<R> {
    pub fn new(runner: R, frq_generator_path: impl Into<PathBuf>, samples_per_frq: i32) -> Self {
        Self {
            runner,
            frq_generator_path: frq_generator_path.into(),
            samples_per_frq,
        }
    }

    pub fn samples_per_frq(&self) -> i32 {
        self.samples_per_frq
    }

    pub fn job(&self, input: &Path, output: &Path) -> AnalysisJob {
        AnalysisJob::new(input, output, self.samples_per_frq)
    }

    pub fn gen_frq_file(&self, input: &Path, output: &Path) -> Result<(), RunError> {
        self.run(&self.job(input, output))
    }

    pub fn run(&self, job: &AnalysisJob) -> Result<(), RunError> {
        self.runner.run(&self.frq_generator_path, &job.to_args())
    }

    /// Generates a frq file for every sample of the voicebank that lacks a valid one.
    /// Failures are logged and skipped. Returns the number of files generated.
    pub fn generate_missing(&self, voicebank: &Voicebank) -> usize {
        let jobs = voicebank.missing_frq_jobs(self.samples_per_frq);
        info!(count = jobs.len(), "generating missing frq files");
        let mut generated = 0;
        for job in &jobs {
            match self.run(job) {
                Ok(()) => generated += 1,
                Err(err) => warn!(input = %job.input.display(), "frq generation failed: {err}"),
            }
        }
        generated
    }
}
