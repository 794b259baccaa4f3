use echo_gate::Config;
use echo_gate::security::Allowlist;

use super::support::Harness;

#[test]
fn added_prefix_is_persisted_to_the_config_file() {
    let harness = Harness::new(&["ls"]);
    let session = harness.session();

    assert!(session.add_allowed("git status").unwrap());

    let reloaded = Config::load_from(harness.config_path()).unwrap();
    assert_eq!(reloaded.allowlist, vec!["ls", "git status"]);
    // Other settings survive the rewrite.
    assert_eq!(reloaded.execution.shell, "/bin/sh");
    assert_eq!(reloaded.execution.command_timeout_secs, 10);
}

#[test]
fn prefix_rule_is_coarse() {
    let harness = Harness::new(&["rm"]);
    let allowlist = Allowlist::from_config(&harness.config);

    assert!(allowlist.is_allowed("rmdir build"));
    assert!(allowlist.is_allowed("rm -rf /tmp/scratch"));
    assert!(!allowlist.is_allowed("sudo rm -rf /"));
}

#[test]
fn blank_prefix_is_rejected_and_nothing_is_written() {
    let harness = Harness::new(&["ls"]);
    let before = std::fs::read_to_string(harness.config_path()).unwrap();

    assert!(harness.session().add_allowed("   ").is_err());

    assert_eq!(
        std::fs::read_to_string(harness.config_path()).unwrap(),
        before
    );
}

#[test]
fn every_allowed_command_starts_with_some_entry() {
    let entries = ["ls", "echo", "git st"];
    let harness = Harness::new(&entries);
    let allowlist = Allowlist::from_config(&harness.config);

    for command in [
        "ls", "ls -la", "echo", "echo hi", "git status", "git stash", "git push", "cat x", "",
        "l", "ECHO hi",
    ] {
        let expected = entries.iter().any(|entry| command.starts_with(entry));
        assert_eq!(allowlist.is_allowed(command), expected, "command: {command:?}");
    }
}

#[test]
fn trailing_space_survives_the_config_round_trip() {
    let harness = Harness::new(&["ls"]);
    assert!(harness.session().add_allowed("git ").unwrap());

    let reloaded = Config::load_from(harness.config_path()).unwrap();
    assert_eq!(reloaded.allowlist, vec!["ls", "git "]);
    let allowlist = Allowlist::from_config(&reloaded);
    assert!(allowlist.is_allowed("git log"));
    assert!(!allowlist.is_allowed("gitk --all"));
}
