use std::path::Path;

use tracing::{error, info};

use crate::config::ToolPaths;
use crate::contract::{CommandRunner, Invocation};
use crate::error::ToolFailure;
use crate::sniff::ArchiveFormat;

/// Builds the tool invocation that extracts `archive` into `dest_dir`.
///
/// | format | command            |
/// |--------|--------------------|
/// | zip    | `unzip <archive>`  |
/// | 7z     | `7z x <archive>`   |
/// | rar    | `unrar x <archive>`|
pub fn extraction_invocation(
    format: ArchiveFormat,
    tools: &ToolPaths,
    archive: &Path,
    dest_dir: &Path,
) -> Invocation {
    match format {
        ArchiveFormat::Zip => Invocation::new(&tools.unzip, dest_dir).arg(archive),
        ArchiveFormat::SevenZip => Invocation::new(&tools.seven_zip, dest_dir)
            .arg("x")
            .arg(archive),
        ArchiveFormat::Rar => Invocation::new(&tools.unrar, dest_dir).arg("x").arg(archive),
    }
}

/// Extracts `archive` into `dest_dir` with the tool for `format`.
///
/// Partial output from a failing tool is left where it is.
pub async fn extract_archive<R>(
    runner: &R,
    tools: &ToolPaths,
    format: ArchiveFormat,
    archive: &Path,
    dest_dir: &Path,
) -> Result<(), ToolFailure>
where
    R: CommandRunner + ?Sized,
{
    let invocation = extraction_invocation(format, tools, archive, dest_dir);
    info!(%format, command = %invocation, "Extracting archive");

    let output = runner.run(&invocation).await.map_err(|e| {
        error!(error = %e, command = %invocation, "Failed to launch extraction tool");
        ToolFailure::from(e)
    })?;

    if !output.is_success() {
        error!(%format, command = %invocation, code = ?output.code, "Extraction tool exited with non-zero code");
        return Err(ToolFailure::Exited {
            program: invocation.program_name(),
            code: output.code,
        });
    }

    info!(%format, dest_dir = %dest_dir.display(), "Archive extracted");
    Ok(())
}
