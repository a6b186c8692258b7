//! Handing the extracted files to the downstream processing scripts.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::contract::{CommandRunner, Invocation};
use crate::error::ToolFailure;

/// The first downstream script that did not succeed.
#[derive(Debug, thiserror::Error)]
#[error("post-processor {} failed: {source}", script.display())]
pub struct PostProcessFailure {
    pub script: PathBuf,
    #[source]
    pub source: ToolFailure,
}

/// Runs each script in `scripts` against `dir`, in order, stopping at the
/// first failure. Every script gets `dir` as its only argument and as its
/// working directory.
///
/// Returns the scripts that ran, all of which succeeded.
pub async fn run_post_processors<R>(
    runner: &R,
    scripts: &[PathBuf],
    dir: &Path,
) -> Result<Vec<PathBuf>, PostProcessFailure>
where
    R: CommandRunner + ?Sized,
{
    let mut ran = Vec::with_capacity(scripts.len());

    for script in scripts {
        let invocation = Invocation::new(script, dir).arg(dir);
        info!(command = %invocation, "Running post-processor");

        let output = match runner.run(&invocation).await {
            Ok(output) => output,
            Err(e) => {
                error!(error = %e, script = %script.display(), "Failed to launch post-processor");
                return Err(PostProcessFailure {
                    script: script.clone(),
                    source: e.into(),
                });
            }
        };

        if !output.is_success() {
            error!(script = %script.display(), code = ?output.code, "Post-processor exited with non-zero code");
            return Err(PostProcessFailure {
                script: script.clone(),
                source: ToolFailure::Exited {
                    program: invocation.program_name(),
                    code: output.code,
                },
            });
        }

        info!(script = %script.display(), "Post-processor succeeded");
        ran.push(script.clone());
    }

    Ok(ran)
}
