use crate::app::UiEvent;
use calloop::channel::Sender;
use log::{info, warn};
use std::io::BufRead;
use std::thread::JoinHandle;

pub const HELP: &str = "\
commands:
  p, play, pause        toggle playback
  +, faster             double speed
  -, slower             halve speed
  s, scrub <0..1>       jump to a point in the timeline
  v, toggle <id>        show or hide an entity
  q, quit               stop";

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("'{0}' is not a number")]
    NotANumber(String),
}

/// Parses one line of the control surface. Blank lines yield `None`.
///
/// Scrub positions are clamped into `[0, 1]` here, like a bounded slider
/// would, since the timeline stores them as given.
pub fn parse_command(line: &str) -> Result<Option<UiEvent>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();

    let event = match command.to_ascii_lowercase().as_str() {
        "p" | "play" | "pause" => UiEvent::TogglePlay,
        "+" | "faster" => UiEvent::Faster,
        "-" | "slower" => UiEvent::Slower,
        "s" | "scrub" => {
            let raw = argument.ok_or(CommandError::MissingArgument("scrub"))?;
            let value: f64 = raw
                .parse()
                .map_err(|_| CommandError::NotANumber(raw.to_string()))?;
            if value.is_nan() {
                return Err(CommandError::NotANumber(raw.to_string()));
            }
            UiEvent::ScrubTo(value.clamp(0.0, 1.0))
        }
        "v" | "toggle" => {
            let id = argument.ok_or(CommandError::MissingArgument("toggle"))?;
            UiEvent::ToggleVisibility(id.to_string())
        }
        "q" | "quit" | "exit" => UiEvent::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(event))
}

/// Reads commands from stdin on a separate thread and forwards them to the
/// event loop. Dropping the sender on EOF closes the channel.
pub fn spawn_stdin_reader(sender: Sender<UiEvent>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("chronomap-input".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        break;
                    }
                };
                match parse_command(&line) {
                    Ok(Some(event)) => {
                        let quit = event == UiEvent::Quit;
                        if sender.send(event).is_err() || quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("{}", e);
                        eprintln!("{}\n{}", e, HELP);
                    }
                }
            }
            info!("Input closed");
        })
}
