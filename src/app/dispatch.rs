use super::{chat, render};
use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use echo_gate::Config;
use echo_gate::audit::ActionLog;
use echo_gate::security::Allowlist;
use echo_gate::session::Session;
use tracing::info;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Chat => chat::run(&config).await,

        Commands::Plan { text, yes } => {
            let text = text.join(" ");
            let session = Session::from_config(&config);
            let plan = session.build_plan(&text).await;
            println!("{}", serde_json::to_string_pretty(&plan)?);

            if !yes {
                println!("Not executed. Re-run with --yes to approve.");
                return Ok(());
            }

            info!(plan_id = %plan.id, "plan approved from command line");
            let outcome = session.approve().await?;
            println!("{}", render::outcome(&outcome));
            if !outcome.succeeded() {
                bail!("one or more tasks failed");
            }
            Ok(())
        }

        Commands::Allow { prefix } => {
            let allowlist = Allowlist::from_config(&config);
            if allowlist.add(&prefix)? {
                println!(
                    "Allowed commands starting with `{}` ({}).",
                    prefix,
                    config.config_path.display()
                );
            } else {
                println!("`{prefix}` was already allowed.");
            }
            Ok(())
        }

        Commands::Check { command } => {
            let command = command.join(" ");
            if Allowlist::from_config(&config).is_allowed(&command) {
                println!("allowed: {command}");
                Ok(())
            } else {
                bail!("not allowed: {command}");
            }
        }

        Commands::Allowlist => {
            let entries = Allowlist::from_config(&config).entries();
            if entries.is_empty() {
                println!("The allowlist is empty; no command can run.");
            }
            for entry in entries {
                println!("{entry}");
            }
            Ok(())
        }

        Commands::Log { limit } => {
            let log = ActionLog::from_config(&config);
            let entries = log.tail(limit)?;
            if entries.is_empty() {
                println!("No actions recorded in {}.", log.path().display());
            }
            for entry in &entries {
                println!("{}", render::log_entry(entry));
            }
            Ok(())
        }
    }
}
