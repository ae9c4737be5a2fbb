use super::{dispatch, print_notices, Session, SessionLine};
use clap::Parser;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Outcome of reading one interactive line.
#[derive(Debug)]
pub enum LineAction {
    Run(super::Command),
    Quit,
    Skip,
    /// Parse failure or help output, already formatted by clap
    Message(String),
}

pub fn parse_line(line: &str) -> LineAction {
    let line = line.trim();
    if line.is_empty() {
        return LineAction::Skip;
    }
    if matches!(line, "exit" | "quit" | "q") {
        return LineAction::Quit;
    }
    let Some(words) = shlex::split(line) else {
        return LineAction::Message("unbalanced quotes".to_string());
    };
    match SessionLine::try_parse_from(words) {
        Ok(parsed) => LineAction::Run(parsed.command),
        Err(e) => LineAction::Message(e.render().to_string()),
    }
}

/// Keep one panel alive and run commands until EOF or `exit`.
pub async fn run_interactive(session: &mut Session) -> anyhow::Result<()> {
    println!("voice-panel interactive session; `help` lists commands, `exit` quits");
    print_notices(&mut session.panel);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_line(&line) {
            LineAction::Run(command) => {
                if let Err(e) = dispatch(session, command).await {
                    tracing::warn!("[Session] Command failed: {:#}", e);
                    eprintln!("[error] {:#}", e);
                }
            }
            LineAction::Quit => break,
            LineAction::Skip => {}
            LineAction::Message(message) => eprintln!("{}", message.trim_end()),
        }
    }
    Ok(())
}
