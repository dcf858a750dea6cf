//! Operator command parsing for `serve`.

use songbook::SongId;

pub const HELP: &str = "\
Commands (indices are 0-based):
  add <id>        queue a song from the catalog
  select <i>      perform queue entry i now
  remove <i>      drop queue entry i
  up <i>          move queue entry i up one
  down <i>        move queue entry i down one
  clear-done      forget the finished list (stamps are kept)
  start | stop | toggle
                  control the broadcast timer
  now             show the current song and its lyrics
  queue           list the queue
  done            list finished songs
  stamps          print timestamps for the video description
  media           show media files for the current song
  bgm             show the configured background music
  search <text>   search the catalog by title or artist
  help            this text
  quit            export stamps and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Add(SongId),
    Select(usize),
    Remove(usize),
    Up(usize),
    Down(usize),
    ClearDone,
    Start,
    Stop,
    Toggle,
    Now,
    Queue,
    Done,
    Stamps,
    Media,
    Bgm,
    Search(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{command}' needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("'{0}' is not a queue index")]
    BadIndex(String),

    #[error("'{0}' is not a song id")]
    BadId(String),
}

impl ConsoleCommand {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "add" => Self::Add(song_id("add", rest)?),
            "select" => Self::Select(index("select", rest)?),
            "remove" => Self::Remove(index("remove", rest)?),
            "up" => Self::Up(index("up", rest)?),
            "down" => Self::Down(index("down", rest)?),
            "clear-done" => Self::ClearDone,
            "start" => Self::Start,
            "stop" => Self::Stop,
            "toggle" => Self::Toggle,
            "now" => Self::Now,
            "queue" => Self::Queue,
            "done" => Self::Done,
            "stamps" => Self::Stamps,
            "media" => Self::Media,
            "bgm" => Self::Bgm,
            "search" if rest.is_empty() => {
                return Err(ParseError::MissingArgument {
                    command: "search",
                    what: "some text",
                })
            }
            "search" => Self::Search(rest.to_string()),
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn index(command: &'static str, raw: &str) -> Result<usize, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::MissingArgument {
            command,
            what: "a queue index",
        });
    }
    raw.parse().map_err(|_| ParseError::BadIndex(raw.to_string()))
}

fn song_id(command: &'static str, raw: &str) -> Result<SongId, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::MissingArgument {
            command,
            what: "a song id",
        });
    }
    raw.parse().map_err(|_| ParseError::BadId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(line: &str) -> ConsoleCommand {
        ConsoleCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(parse("add 12"), ConsoleCommand::Add(SongId(12)));
        assert_eq!(parse("  select 0 "), ConsoleCommand::Select(0));
        assert_eq!(parse("remove 3"), ConsoleCommand::Remove(3));
        assert_eq!(parse("UP 1"), ConsoleCommand::Up(1));
        assert_eq!(parse("down 2"), ConsoleCommand::Down(2));
        assert_eq!(
            parse("search  blue  sky "),
            ConsoleCommand::Search("blue  sky".to_string())
        );
    }

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse("clear-done"), ConsoleCommand::ClearDone);
        assert_eq!(parse("toggle"), ConsoleCommand::Toggle);
        assert_eq!(parse("stamps"), ConsoleCommand::Stamps);
        assert_eq!(parse("exit"), ConsoleCommand::Quit);
        assert_eq!(parse("?"), ConsoleCommand::Help);
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(ConsoleCommand::parse("   ").unwrap(), None);
        assert_eq!(ConsoleCommand::parse("# note").unwrap(), None);
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(
            ConsoleCommand::parse("select").unwrap_err(),
            ParseError::MissingArgument {
                command: "select",
                what: "a queue index"
            }
        );
        assert_eq!(
            ConsoleCommand::parse("select -1").unwrap_err(),
            ParseError::BadIndex("-1".to_string())
        );
        assert_eq!(
            ConsoleCommand::parse("add abc").unwrap_err(),
            ParseError::BadId("abc".to_string())
        );
        assert_eq!(
            ConsoleCommand::parse("dance").unwrap_err(),
            ParseError::Unknown("dance".to_string())
        );
        assert!(ConsoleCommand::parse("search").is_err());
    }
}
