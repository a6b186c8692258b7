use std::path::{Path, PathBuf};

use transfer_intake_core::config::ToolPaths;
use transfer_intake_core::contract::{CommandOutput, Invocation, MockCommandRunner};
use transfer_intake_core::error::ToolFailure;
use transfer_intake_core::extract::{extract_archive, extraction_invocation};
use transfer_intake_core::sniff::ArchiveFormat;

#[test]
fn each_format_maps_to_its_tool() {
    let tools = ToolPaths {
        unzip: PathBuf::from("/usr/bin/unzip"),
        seven_zip: PathBuf::from("/usr/bin/7z"),
        unrar: PathBuf::from("/usr/bin/unrar"),
        file: PathBuf::from("/usr/bin/file"),
    };
    let archive = Path::new("/work/intakeAB12/upload");
    let dest = Path::new("/work/intakeAB12");

    let cases = [
        (ArchiveFormat::Zip, "/usr/bin/unzip", vec!["/work/intakeAB12/upload"]),
        (ArchiveFormat::SevenZip, "/usr/bin/7z", vec!["x", "/work/intakeAB12/upload"]),
        (ArchiveFormat::Rar, "/usr/bin/unrar", vec!["x", "/work/intakeAB12/upload"]),
    ];

    for (format, program, args) in cases {
        let inv = extraction_invocation(format, &tools, archive, dest);
        assert_eq!(inv.program, PathBuf::from(program), "{format}");
        assert_eq!(inv.args_lossy(), args, "{format}");
        assert_eq!(inv.cwd, dest.to_path_buf(), "{format}");
    }
}

#[tokio::test]
async fn successful_tool_extracts() {
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .withf(|inv: &Invocation| inv.program == PathBuf::from("unrar"))
        .times(1)
        .returning(|_| Ok(CommandOutput::success().with_stdout("All OK\n")));

    let result = extract_archive(
        &runner,
        &ToolPaths::default(),
        ArchiveFormat::Rar,
        Path::new("/work/foo.rar"),
        Path::new("/work"),
    )
    .await;
    assert!(result.is_ok(), "got {result:?}");
}

#[tokio::test]
async fn non_zero_exit_is_an_extraction_failure() {
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .times(1)
        .returning(|_| Ok(CommandOutput::exited(9)));

    let err = extract_archive(
        &runner,
        &ToolPaths::default(),
        ArchiveFormat::Zip,
        Path::new("/work/foo.zip"),
        Path::new("/work"),
    )
    .await
    .unwrap_err();

    match err {
        ToolFailure::Exited { program, code } => {
            assert_eq!(program, "unzip");
            assert_eq!(code, Some(9));
        }
        other => panic!("expected exit failure, got {other:?}"),
    }
}
