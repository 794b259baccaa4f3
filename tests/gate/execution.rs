use std::time::{Duration, Instant};

use echo_gate::config::FailurePolicy;
use echo_gate::tools::{FAILED_EXIT_CODE, Task};

use super::support::Harness;

#[tokio::test]
async fn results_come_back_in_task_order() {
    let harness = Harness::new(&["echo", "ls"]);
    let session = harness.scripted_session(vec![
        Task::command("echo one"),
        Task::command("ls /definitely/not/here"),
        Task::write_to_file("notes/two.txt", "two"),
        Task::command("echo three"),
    ]);

    session.build_plan("mixed bag").await;
    let results = session.approve_plan().await.unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].stdout.trim(), "one");
    assert!(!results[1].success);
    assert!(results[2].success);
    assert_eq!(results[2].exit_code, None);
    assert_eq!(results[3].stdout.trim(), "three");
    assert_eq!(
        std::fs::read_to_string(harness.work_dir().join("notes/two.txt")).unwrap(),
        "two"
    );
}

#[tokio::test]
async fn fail_fast_policy_skips_after_first_failure() {
    let mut harness = Harness::new(&["echo", "false"]);
    harness.config.execution.failure_policy = FailurePolicy::FailFast;
    let session = harness.scripted_session(vec![
        Task::command("false"),
        Task::command("echo never"),
    ]);

    session.build_plan("stop early").await;
    let results = session.approve_plan().await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].exit_code, Some(1));
    assert_eq!(
        results[1].error.as_deref(),
        Some("skipped: earlier task failed")
    );
    assert!(results[1].stdout.is_empty());
}

#[tokio::test]
async fn timed_out_command_fails_within_the_ceiling() {
    let harness = Harness::with_timeout(&["sleep"], 1);
    let session = harness.session();

    session.build_plan("sleep 20").await;
    let started = Instant::now();
    let results = session.approve_plan().await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!results[0].success);
    assert_eq!(results[0].exit_code, Some(FAILED_EXIT_CODE));
    assert!(results[0].stderr.contains("timed out after 1s"));
}

#[tokio::test]
async fn commands_run_in_the_configured_working_directory() {
    let harness = Harness::new(&["pwd"]);
    let session = harness.session();

    session.build_plan("pwd").await;
    let results = session.approve_plan().await.unwrap();

    let expected = std::fs::canonicalize(harness.work_dir()).unwrap();
    assert_eq!(results[0].stdout.trim(), expected.to_string_lossy());
}

#[tokio::test]
async fn unknown_task_kind_fails_only_that_task() {
    let harness = Harness::new(&["echo"]);
    let session = harness.scripted_session(vec![
        Task::Unknown {
            kind: "send_email".into(),
        },
        Task::command("echo still runs"),
    ]);

    session.build_plan("email and echo").await;
    let results = session.approve_plan().await.unwrap();

    assert_eq!(
        results[0].error.as_deref(),
        Some("unknown task type: send_email")
    );
    assert!(results[1].success);
}
