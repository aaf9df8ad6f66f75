//! Everything that talks to the external tools: the resampler that renders notes and the
//! analyzer that produces frequency curves.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

pub use frq_gen::{AnalysisJob, FrqGenerator, DEFAULT_SAMPLES_PER_FRQ};
pub use render::{
    RenderError, RenderJob, RenderParameterBuilder, ResampleParams, SilenceParams, NO_FLAGS,
};
pub use resampler::Resampler;

mod frq_gen;
mod render;
mod resampler;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to start {}: {source}", program.display())]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} exited with status {exit_code:?}", program.display())]
    Failed {
        program: PathBuf,
        exit_code: Option<i32>,
    },
}

/// Runs an external tool to completion.
///
/// Implementations must be usable from several render workers at once.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[String]) -> Result<(), RunError>;
}

/// Runs tools as child processes and waits for them to exit.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> Result<(), RunError> {
        debug!(program = %program.display(), ?args, "running external tool");
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|source| RunError::SpawnFailed {
                program: program.to_path_buf(),
                source,
            })?;
        if !status.success() {
            return Err(RunError::Failed {
                program: program.to_path_buf(),
                exit_code: status.code(),
            });
        }
        Ok(())
    }
}

/// Renders a path the way it is passed on the command line: absolute where possible.
pub(crate) fn path_arg(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
