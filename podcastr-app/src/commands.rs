use podcastr_core::parse_time_string;
use std::str::FromStr;
use thiserror::Error;

/// A line typed at the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Queue the whole listing from row `n` (1-based, as printed)
    Play(usize),
    /// Play only the episode at row `n`
    Single(usize),
    Toggle,
    Next,
    Previous,
    Shuffle,
    Loop,
    /// Jump to a position in seconds
    Seek(u64),
    Status,
    List,
    Stop,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command {0:?}, type \"help\" for a list")]
    Unknown(String),

    #[error("{command} needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("Invalid row {0:?}, rows start at 1")]
    InvalidRow(String),

    #[error("Invalid time {0:?}, use seconds, MM:SS or HH:MM:SS")]
    InvalidTime(String),
}

pub const HELP: &str = "\
Commands:
  play N      play the listing from row N
  single N    play only the episode at row N
  toggle      pause or resume (also: p)
  next        skip to the next episode (also: n)
  prev        go back to the previous episode (also: b)
  shuffle     turn shuffle on or off
  loop        turn repeat on or off
  seek T      jump to T (seconds, MM:SS or HH:MM:SS)
  status      show the player (also: s)
  list        show the episode listing (also: ls)
  stop        clear the player
  help        show this help
  quit        exit (also: q)";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Self::Status);
        };
        let argument = words.next();

        let command = match name.to_ascii_lowercase().as_str() {
            "play" => Self::Play(row("play", argument)?),
            "single" => Self::Single(row("single", argument)?),
            "toggle" | "p" | "pause" | "resume" => Self::Toggle,
            "next" | "n" => Self::Next,
            "prev" | "previous" | "b" => Self::Previous,
            "shuffle" => Self::Shuffle,
            "loop" | "repeat" => Self::Loop,
            "seek" => {
                let time = argument.ok_or(CommandError::MissingArgument {
                    command: "seek",
                    expected: "a time",
                })?;
                Self::Seek(
                    parse_time_string(time)
                        .ok_or_else(|| CommandError::InvalidTime(time.to_string()))?,
                )
            }
            "status" | "s" => Self::Status,
            "list" | "ls" => Self::List,
            "stop" | "clear" => Self::Stop,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn row(command: &'static str, argument: Option<&str>) -> Result<usize, CommandError> {
    let argument = argument.ok_or(CommandError::MissingArgument {
        command,
        expected: "a row number",
    })?;
    match argument.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(CommandError::InvalidRow(argument.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("play 3".parse(), Ok(Command::Play(3)));
        assert_eq!("  SINGLE 1 ".parse(), Ok(Command::Single(1)));
        assert_eq!("p".parse(), Ok(Command::Toggle));
        assert_eq!("next".parse(), Ok(Command::Next));
        assert_eq!("b".parse(), Ok(Command::Previous));
        assert_eq!("shuffle".parse(), Ok(Command::Shuffle));
        assert_eq!("repeat".parse(), Ok(Command::Loop));
        assert_eq!("ls".parse(), Ok(Command::List));
        assert_eq!("stop".parse(), Ok(Command::Stop));
        assert_eq!("q".parse(), Ok(Command::Quit));
        assert_eq!("".parse(), Ok(Command::Status));
    }

    #[test]
    fn test_parse_seek_formats() {
        assert_eq!("seek 90".parse(), Ok(Command::Seek(90)));
        assert_eq!("seek 1:30".parse(), Ok(Command::Seek(90)));
        assert_eq!("seek 01:06:21".parse(), Ok(Command::Seek(3981)));
        assert_eq!(
            "seek 1:75".parse::<Command>(),
            Err(CommandError::InvalidTime("1:75".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "play".parse::<Command>(),
            Err(CommandError::MissingArgument {
                command: "play",
                expected: "a row number",
            })
        );
        assert_eq!(
            "play 0".parse::<Command>(),
            Err(CommandError::InvalidRow("0".to_string()))
        );
        assert_eq!(
            "dance".parse::<Command>(),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }
}
