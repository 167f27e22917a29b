//! Interactive assistant for one report.
//!
//! Reads prompt lines from stdin. Questions go to the assistant in chat mode;
//! with override mode on, staged field overrides are sent instead and a
//! recomputed forecast replaces the report's output.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use assistant_cli::commands::{parse_command, Command, HELP};
use assistant_cli::render::{render_message, render_report, render_staged};
use assistant_cli::{init_tracing, require, Backend};
use clap::Parser;
use shared::{Config, Conversation, SubmitStatus, TracingObserver};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use validator::Validate;

#[derive(Parser)]
#[command(name = "assistant")]
#[command(about = "Ask questions about a forecast report and try what-if overrides")]
struct Args {
    /// Report to discuss
    report_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = Config::from_env().context("Invalid configuration")?;
    let backend = Backend::from_config(&config)?;

    let report = require(backend.reports.fetch(&args.report_id).await)
        .with_context(|| format!("Could not load report {}", args.report_id))?;
    info!("Opened conversation on report {}", report.id);

    println!("{}\n", render_report(&report));
    println!("Type /help for commands.");

    let mut conversation = Conversation::new(report, Arc::clone(&backend.chat), backend.lifecycle.clone())
        .with_observer(Arc::new(TracingObserver));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(conversation.override_mode())?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::ToggleOverride => {
                conversation.toggle_override_mode();
                let state = if conversation.override_mode() { "on" } else { "off" };
                println!("Override mode {}", state);
            }
            Command::Set(field, value) => {
                conversation.stage_override(field, value);
                println!("{}", render_staged(conversation.staged()));
            }
            Command::Staged => println!("{}", render_staged(conversation.staged())),
            Command::Report => println!("{}", render_report(conversation.report())),
            Command::Save => {
                let report = conversation.report();
                if let Err(e) = report.input.validate() {
                    println!("Current input is invalid: {}", e);
                    continue;
                }
                match backend.reports.update(&report.id, &report.input).await {
                    Ok(outcome) => match require(outcome) {
                        Ok(saved) => println!("Saved report {}", saved.id),
                        Err(e) => println!("{}", e),
                    },
                    Err(e) => println!("{}", e),
                }
            }
            Command::Ask(text) => {
                let before = conversation.messages().len();
                match conversation.submit(&text).await {
                    SubmitStatus::Ignored => {
                        println!("Type a question, or /override and /set to try new inputs.")
                    }
                    SubmitStatus::Busy => println!("Still waiting for the previous answer."),
                    SubmitStatus::Completed(_) => {
                        // The user's own line is already on screen.
                        for message in conversation.messages().iter().skip(before + 1) {
                            println!("{}", render_message(message));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn prompt(override_mode: bool) -> Result<()> {
    let marker = if override_mode { "override" } else { "ask" };
    print!("{}> ", marker);
    std::io::stdout().flush()?;
    Ok(())
}
