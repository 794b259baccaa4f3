use echo_gate::audit::{LoggedAction, LoggedResult};
use echo_gate::security::ParsedCommand;
use echo_gate::tools::ScriptOs;

use super::support::Harness;

#[tokio::test]
async fn every_executed_action_is_recorded_in_order() {
    let harness = Harness::new(&["echo"]);
    let session = harness.session();

    session.build_plan("echo first").await;
    session.approve().await.unwrap();
    session.propose_command(ParsedCommand::new("second", "echo second"));
    session.approve().await.unwrap();
    session.propose_script(ScriptOs::Linux, "echo third");
    session.approve().await.unwrap();

    let entries = harness.log().load().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(matches!(&entries[0].action, LoggedAction::Plan(plan) if plan.description == "echo first"));
    assert!(matches!(&entries[0].result, LoggedResult::Many(results) if results.len() == 1));
    assert!(matches!(&entries[1].action, LoggedAction::Command(parsed) if parsed.command == "echo second"));
    assert!(matches!(&entries[2].action, LoggedAction::Script(_)));
    assert!(matches!(&entries[2].result, LoggedResult::Single(result) if result.success));
    assert!(entries.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
}

#[tokio::test]
async fn logged_plan_carries_its_final_status() {
    let harness = Harness::new(&["echo"]);
    let session = harness.session();

    session.build_plan("echo done").await;
    session.approve_plan().await.unwrap();

    let entries = harness.log().load().unwrap();
    match &entries[0].action {
        LoggedAction::Plan(plan) => {
            assert_eq!(plan.status, echo_gate::planner::PlanStatus::Executed);
        }
        other => panic!("unexpected action: {other:?}"),
    }
}

#[tokio::test]
async fn history_returns_the_newest_entries_oldest_first() {
    let harness = Harness::new(&["echo"]);
    let session = harness.session();

    for i in 0..4 {
        session.build_plan(&format!("echo {i}")).await;
        session.approve_plan().await.unwrap();
    }

    let history = session.history(2).unwrap();
    let descriptions: Vec<&str> = history
        .iter()
        .filter_map(|entry| match &entry.action {
            LoggedAction::Plan(plan) => Some(plan.description.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(descriptions, vec!["echo 2", "echo 3"]);
}

#[tokio::test]
async fn log_lives_under_the_state_directory() {
    let harness = Harness::new(&["echo"]);
    let session = harness.session();

    session.build_plan("echo x").await;
    session.approve().await.unwrap();

    assert!(harness.tmp.path().join("logs/actions.json").exists());
}
