use std::sync::Arc;
use std::time::Duration;

use echo_gate::error::{ApprovalError, ExecutionError, GateError};
use echo_gate::planner::PlanStatus;
use echo_gate::security::{ParsedCommand, PendingAction};
use echo_gate::session::Outcome;
use echo_gate::tools::{ScriptOs, Task};

use super::support::Harness;

#[tokio::test]
async fn approving_with_nothing_pending_fails() {
    let harness = Harness::new(&["echo"]);
    let session = harness.session();

    let err = session.approve().await.unwrap_err();

    assert!(matches!(
        err,
        GateError::Approval(ApprovalError::NothingPending)
    ));
}

#[tokio::test]
async fn plan_approval_is_single_shot() {
    let harness = Harness::new(&["echo"]);
    let session = harness.session();

    let plan = session.build_plan("echo hello").await;
    assert_eq!(plan.status, PlanStatus::Pending);
    assert_eq!(plan.tasks, vec![Task::command("echo hello")]);

    let results = session.approve_plan().await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].stdout.trim(), "hello");

    let err = session.approve_plan().await.unwrap_err();
    assert!(matches!(
        err,
        GateError::Approval(ApprovalError::NothingPending)
    ));
    assert_eq!(harness.log().load().unwrap().len(), 1);
}

#[tokio::test]
async fn newest_proposal_replaces_the_pending_one() {
    let harness = Harness::new(&["echo"]);
    let session = harness.session();

    session.build_plan("echo from plan").await;
    session.propose_command(ParsedCommand::new("say hi", "echo from command"));

    let err = session.approve_plan().await.unwrap_err();
    assert!(matches!(
        err,
        GateError::Approval(ApprovalError::KindMismatch {
            pending: "command",
            requested: "plan"
        })
    ));

    // The mismatch left the command in place.
    let result = session.approve_command().await.unwrap();
    assert_eq!(result.stdout.trim(), "from command");
    assert!(session.pending().is_none());
}

#[tokio::test]
async fn generic_approve_runs_whatever_is_pending() {
    let harness = Harness::new(&["echo"]);
    let session = harness.session();

    session.propose_script(ScriptOs::Linux, "#!/bin/sh\n# greet\necho from script\n");
    let outcome = session.approve().await.unwrap();

    match outcome {
        Outcome::Script { result, .. } => {
            assert!(result.success, "{result:?}");
            assert_eq!(result.stdout.trim(), "from script");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn create_and_write_sentence_runs_end_to_end() {
    let harness = Harness::new(&[]);
    let session = harness.session();

    let plan = session
        .build_plan("create a file named out.txt and write 'hello'")
        .await;
    assert_eq!(
        plan.tasks,
        vec![
            Task::create_file("out.txt"),
            Task::write_to_file("out.txt", "hello"),
        ]
    );

    let results = session.approve_plan().await.unwrap();

    assert!(results.iter().all(|r| r.success));
    assert_eq!(
        std::fs::read_to_string(harness.work_dir().join("out.txt")).unwrap(),
        "hello"
    );
}

#[tokio::test]
async fn rejected_plan_is_consumed_and_not_logged() {
    let harness = Harness::new(&["echo"]);
    let session = harness.scripted_session(vec![
        Task::create_file("marker.txt"),
        Task::command("echo fine"),
        Task::command("curl http://example.com"),
    ]);

    session.build_plan("do several things").await;
    let err = session.approve().await.unwrap_err();

    match err {
        GateError::Execution(ExecutionError::CommandNotAllowed { command }) => {
            assert_eq!(command, "curl http://example.com");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!harness.work_dir().join("marker.txt").exists());
    assert!(session.pending().is_none());
    assert!(harness.log().load().unwrap().is_empty());
}

#[tokio::test]
async fn allowing_a_prefix_unblocks_the_next_proposal() {
    let harness = Harness::new(&["echo"]);
    let session = harness.session();

    session.build_plan("pwd").await;
    assert!(session.approve_plan().await.is_err());

    assert!(session.add_allowed("pwd").unwrap());
    assert!(!session.add_allowed("pwd").unwrap());

    session.build_plan("pwd").await;
    let results = session.approve_plan().await.unwrap();
    assert!(results[0].success);
}

#[tokio::test]
async fn proposals_can_land_while_an_approval_executes() {
    let harness = Harness::new(&["sleep", "echo"]);
    let session = Arc::new(harness.session());

    session.build_plan("sleep 1").await;
    let running = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.approve_plan().await })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    session.propose_command(ParsedCommand::new("next", "echo next"));

    let results = running.await.unwrap().unwrap();
    assert!(results[0].success);
    assert!(matches!(
        session.pending(),
        Some(PendingAction::Command(ref parsed)) if parsed.command == "echo next"
    ));
}
