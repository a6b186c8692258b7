use std::path::{Path, PathBuf};

use mockall::Sequence;
use transfer_intake_core::contract::{CommandOutput, Invocation, MockCommandRunner};
use transfer_intake_core::error::ToolFailure;
use transfer_intake_core::postprocess::run_post_processors;

fn scripts() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/opt/process_incoming_files.R"),
        PathBuf::from("/opt/motusIncomingFiles.R"),
    ]
}

fn is_call(inv: &Invocation, script: &str, dir: &Path) -> bool {
    inv.program == PathBuf::from(script)
        && inv.args_lossy() == vec![dir.display().to_string()]
        && inv.cwd == dir
}

#[tokio::test]
async fn scripts_run_in_order_against_the_directory() {
    let dir = Path::new("/work/intake123");
    let mut seq = Sequence::new();
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .withf(move |inv: &Invocation| is_call(inv, "/opt/process_incoming_files.R", dir))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(CommandOutput::success()));
    runner
        .expect_run()
        .withf(move |inv: &Invocation| is_call(inv, "/opt/motusIncomingFiles.R", dir))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(CommandOutput::success()));

    let ran = run_post_processors(&runner, &scripts(), dir)
        .await
        .expect("both scripts should succeed");
    assert_eq!(ran, scripts());
}

#[tokio::test]
async fn first_failure_stops_the_chain() {
    let dir = Path::new("/work/intake123");
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .withf(|inv: &Invocation| inv.program == PathBuf::from("/opt/process_incoming_files.R"))
        .times(1)
        .returning(|_| Ok(CommandOutput::exited(1)));
    runner
        .expect_run()
        .withf(|inv: &Invocation| inv.program == PathBuf::from("/opt/motusIncomingFiles.R"))
        .times(0);

    let failure = run_post_processors(&runner, &scripts(), dir)
        .await
        .unwrap_err();
    assert_eq!(failure.script, PathBuf::from("/opt/process_incoming_files.R"));
    assert!(matches!(
        failure.source,
        ToolFailure::Exited { code: Some(1), .. }
    ));
}

#[tokio::test]
async fn no_scripts_is_trivially_successful() {
    let mut runner = MockCommandRunner::new();
    runner.expect_run().times(0);

    let ran = run_post_processors(&runner, &[], Path::new("/work/x"))
        .await
        .unwrap();
    assert!(ran.is_empty());
}
