//! Reads single-character commands from stdin on a blocking thread and
//! forwards them to the async run loop.

use std::io::BufRead;

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Save,
    Pause,
    Quit,
    Kill,
}

fn parse(line: &str) -> Option<Command> {
    match line.trim().chars().next()? {
        's' => Some(Command::Save),
        'p' => Some(Command::Pause),
        'q' => Some(Command::Quit),
        'k' => Some(Command::Kill),
        _ => None,
    }
}

/// Spawn the blocking stdin reader and return the receiving end of its
/// command channel. The sender is dropped (and the channel closes) when
/// stdin reaches EOF.
pub fn spawn_reader() -> mpsc::UnboundedReceiver<Command> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(command) = parse(&line) {
                if tx.send(command).is_err() {
                    break;
                }
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse("s"), Some(Command::Save));
        assert_eq!(parse("pause"), Some(Command::Pause));
        assert_eq!(parse("Q"), None);
        assert_eq!(parse(""), None);
    }
}
