use std::io::Write;

use actnotes_core::{ControllerStatus, OverlayController, TimerMode};
use clap::{Parser, Subcommand};

/// Prompt and read one line. `None` on end of input.
pub fn readline() -> Result<Option<String>, String> {
    write!(std::io::stdout(), "$ ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;
    let mut buffer = String::new();
    let read = std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    Ok((read > 0).then_some(buffer))
}

#[derive(Parser, Debug)]
#[command(about = "overlay commands")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start (or resume) the run timer
    Start,
    /// Stop and clear the run timer
    Stop,
    /// Start the timer a few seconds in the future
    Countdown,
    /// Copy the n-th click-to-copy note (as numbered on screen)
    Copy { n: usize },
    /// Reload note files from the backend
    Reload,
    Status,
    #[command(alias = "exit")]
    Quit,
}

pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "actnotes".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    Ok(cli.command)
}

/// Run one command line. Returns `true` when the loop should exit.
pub async fn respond(line: &str, controller: &mut OverlayController) -> Result<bool, String> {
    let Some(command) = parse(line)? else {
        return Ok(false);
    };

    match command {
        Command::Start => controller.start_timer(),
        Command::Stop => controller.stop_timer(),
        Command::Countdown => controller.start_countdown(),
        Command::Copy { n } => {
            let index = n.checked_sub(1).ok_or("error: notes are numbered from 1\n")?;
            match controller.copy_clickable(index).map_err(|e| format!("error: {e}\n"))? {
                Some(text) => println!("copied: {text}"),
                None => return Err(format!("error: no click-to-copy note [{n}]\n")),
            }
        }
        Command::Reload => match controller.reload().await {
            Ok(count) => println!("loaded {count} rules"),
            Err(e) => return Err(format!("error: {e}\n")),
        },
        Command::Status => print!("{}", format_status(&controller.status())),
        Command::Quit => return Ok(true),
    }
    Ok(false)
}

pub fn format_status(status: &ControllerStatus) -> String {
    let state = match &status.state {
        Some(state) => format!("{} (level {})", state.zone, state.level),
        None => "no data".to_string(),
    };
    let rules = match status.rules {
        Some(count) => count.to_string(),
        None => "not loaded".to_string(),
    };
    let timer = match status.timer_mode {
        TimerMode::Idle => "stopped".to_string(),
        TimerMode::CountingDown => format!("counting down ({})", status.timer_text),
        TimerMode::Running => status.timer_text.clone(),
    };
    format!(
        "client:    {}\nstate:     {}\nrules:     {}\nclickable: {}\ntimer:     {}\npolling:   {}\n",
        status.client,
        state,
        rules,
        status.clickable.len(),
        timer,
        status.polling,
    )
}
