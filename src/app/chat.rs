use super::render;
use anyhow::{Context, Result};
use echo_gate::Config;
use echo_gate::interpreter::OpenAiCompatInterpreter;
use echo_gate::security::{ParsedCommand, PendingAction};
use echo_gate::session::Session;
use echo_gate::tools::ScriptOs;
use tokio::io::{self, AsyncBufReadExt, BufReader};

const DEFAULT_LOG_LIMIT: usize = 10;

const HELP: &str = "\
Type a request to get a plan. Nothing runs until you approve it.
  /approve                          run the pending action
  /reject                           drop the pending action
  /cmd <summary> :: <command>       propose a single command
  /script [linux|windows] <text>    propose a script
  /allow <prefix>                   allow commands starting with <prefix>
  /pending                          show the pending action
  /log [n]                          show the last n executed actions
  /help                             show this help
  /quit                             leave";

#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Request(&'a str),
    Approve,
    Reject,
    Command(ParsedCommand),
    Script { os: ScriptOs, text: &'a str },
    Allow(&'a str),
    Pending,
    Log(usize),
    Help,
    Quit,
    Usage(&'static str),
}

impl<'a> ChatInput<'a> {
    fn parse(line: &'a str) -> Self {
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Self::Request(line.trim());
        };
        // Allowlist prefixes keep trailing whitespace; everything else is trimmed.
        let (name, raw_args) = rest
            .split_once(char::is_whitespace)
            .map_or((rest.trim_end(), ""), |(name, args)| (name, args.trim_start()));
        let args = raw_args.trim_end();

        match name {
            "approve" | "yes" => Self::Approve,
            "reject" | "no" => Self::Reject,
            "pending" => Self::Pending,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "allow" if !args.is_empty() => Self::Allow(raw_args),
            "allow" => Self::Usage("/allow <prefix>"),
            "cmd" => parse_command(args).map_or(Self::Usage("/cmd <summary> :: <command>"), Self::Command),
            "script" => parse_script(args).map_or(
                Self::Usage("/script [linux|windows] <text>"),
                |(os, text)| Self::Script { os, text },
            ),
            "log" if args.is_empty() => Self::Log(DEFAULT_LOG_LIMIT),
            "log" => args.parse().map_or(Self::Usage("/log [n]"), Self::Log),
            _ => Self::Usage("/help"),
        }
    }
}

fn parse_command(args: &str) -> Option<ParsedCommand> {
    let (summary, command) = match args.split_once("::") {
        Some((summary, command)) => (summary.trim(), command.trim()),
        None => (args, args),
    };
    (!command.is_empty()).then(|| {
        let summary = if summary.is_empty() { command } else { summary };
        ParsedCommand::new(summary, command)
    })
}

fn parse_script(args: &str) -> Option<(ScriptOs, &str)> {
    let (first, rest) = args
        .split_once(char::is_whitespace)
        .map_or((args, ""), |(first, rest)| (first, rest.trim()));
    let (os, text) = match ScriptOs::parse(first) {
        Some(os) => (os, rest),
        None => (ScriptOs::host(), args),
    };
    (!text.is_empty()).then_some((os, text))
}

pub async fn run(config: &Config) -> Result<()> {
    let session = Session::from_config(config);
    let script_writer = config
        .interpreter
        .enabled
        .then(|| OpenAiCompatInterpreter::from_config(&config.interpreter));

    println!("echo-gate chat. /help for commands, /quit to leave.");
    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        prompt(&mut std::io::stdout()).context("failed to write prompt")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match ChatInput::parse(&line) {
            ChatInput::Quit => break,
            ChatInput::Help => println!("{HELP}"),
            ChatInput::Usage(usage) => println!("usage: {usage}"),
            ChatInput::Request(text) => {
                let plan = session.build_plan(text).await;
                println!("{}", serde_json::to_string_pretty(&plan)?);
                println!("{}", plan.render_summary());
                println!("/approve to run it.");
            }
            ChatInput::Command(parsed) => {
                let allowed = session.is_allowed(&parsed.command);
                println!(
                    "Proposed: {} `{}`{}",
                    parsed.summary,
                    parsed.command,
                    if allowed { "" } else { " (not on the allowlist)" }
                );
                session.propose_command(parsed);
                println!("/approve to run it.");
            }
            ChatInput::Script { os, text } => {
                let body = draft_script(script_writer.as_ref(), os, text).await;
                let script = session.propose_script(os, body);
                println!("Proposed {} script {}:\n{}", os.as_str(), script.id, script.body);
                println!("/approve to run it.");
            }
            ChatInput::Approve => match session.approve().await {
                Ok(outcome) => println!("{}", render::outcome(&outcome)),
                Err(e) => println!("Not executed: {e}"),
            },
            ChatInput::Reject => match session.discard() {
                Some(_) => println!("Dropped the pending action."),
                None => println!("Nothing pending."),
            },
            ChatInput::Allow(prefix) => match session.add_allowed(prefix) {
                Ok(true) => println!("Allowed commands starting with `{prefix}`."),
                Ok(false) => println!("`{prefix}` was already allowed."),
                Err(e) => println!("Could not update the allowlist: {e}"),
            },
            ChatInput::Pending => match session.pending() {
                None => println!("Nothing pending."),
                Some(PendingAction::Plan(plan)) => println!("{}", plan.render_summary()),
                Some(PendingAction::Command(parsed)) => {
                    println!("Command: {} `{}`", parsed.summary, parsed.command);
                }
                Some(PendingAction::Script(script)) => {
                    println!("{} script {}:\n{}", script.os.as_str(), script.id, script.body);
                }
            },
            ChatInput::Log(limit) => match session.history(limit) {
                Ok(entries) if entries.is_empty() => println!("No actions recorded yet."),
                Ok(entries) => {
                    for entry in &entries {
                        println!("{}", render::log_entry(entry));
                    }
                }
                Err(e) => println!("Could not read the action log: {e}"),
            },
        }
    }

    Ok(())
}

/// Ask the model for a script; without one, the text itself is the script.
async fn draft_script(
    writer: Option<&OpenAiCompatInterpreter>,
    os: ScriptOs,
    text: &str,
) -> String {
    let Some(writer) = writer else {
        return text.to_string();
    };
    match writer.generate_script(text, os).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "script generation failed, using text as the script");
            text.to_string()
        }
    }
}

fn prompt(out: &mut impl std::io::Write) -> std::io::Result<()> {
    out.write_all(b"> ")?;
    out.flush()
}
