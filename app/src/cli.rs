//! Line commands of the interactive prompt.

use thiserror::Error;

/// One parsed prompt line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `add <text> [| <html>]`
    Add {
        /// Label
        text: String,
        /// HTML body, empty if omitted
        content: String,
    },
    /// `toggle <n>`
    Toggle(usize),
    /// `rm <n>`
    Remove(usize),
    /// `edit <n> <text> [| <html>]`
    Edit {
        /// 1-based position
        number: usize,
        /// New label
        text: String,
        /// New HTML body
        content: String,
    },
    /// `list`
    List,
    /// `help`
    Help,
    /// `quit`
    Quit,
}

/// Why a line could not be parsed
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing but whitespace
    #[error("empty command")]
    Empty,
    /// Unknown first word
    #[error("unknown command `{0}`; try `help`")]
    Unknown(String),
    /// A position was required
    #[error("`{0}` needs an item number")]
    MissingNumber(&'static str),
    /// The position is not a positive number
    #[error("`{0}` is not an item number")]
    BadNumber(String),
}

/// Usage text for `help`
pub const HELP: &str = "\
commands:
  add <text> [| <html>]        create a todo
  toggle <n>                   flip todo n
  rm <n>                       delete todo n
  edit <n> <text> [| <html>]   replace label and body of todo n
  list                         show the list
  quit                         exit";

/// Parses one prompt line
///
/// # Errors
///
/// Returns a [`ParseError`] describing what is wrong with the line.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match word {
        "" => Err(ParseError::Empty),
        "add" => {
            let (text, content) = split_content(rest);
            Ok(Command::Add { text, content })
        },
        "toggle" => Ok(Command::Toggle(number("toggle", rest)?)),
        "rm" | "remove" => Ok(Command::Remove(number("rm", rest)?)),
        "edit" => {
            let (position, rest) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let number = number("edit", position)?;
            let (text, content) = split_content(rest);
            Ok(Command::Edit {
                number,
                text,
                content,
            })
        },
        "list" | "ls" => Ok(Command::List),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

/// Splits `text | html` into its two halves
fn split_content(rest: &str) -> (String, String) {
    match rest.split_once('|') {
        Some((text, content)) => (text.trim().to_string(), content.trim().to_string()),
        None => (rest.trim().to_string(), String::new()),
    }
}

fn number(command: &'static str, arg: &str) -> Result<usize, ParseError> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(ParseError::MissingNumber(command));
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::BadNumber(arg.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_with_and_without_content() {
        assert_eq!(
            parse("add Buy milk"),
            Ok(Command::Add {
                text: "Buy milk".to_string(),
                content: String::new()
            })
        );
        assert_eq!(
            parse("  add Buy milk | <p>2 litres</p> "),
            Ok(Command::Add {
                text: "Buy milk".to_string(),
                content: "<p>2 litres</p>".to_string()
            })
        );
    }

    #[test]
    fn blank_add_parses_and_is_left_to_the_controller() {
        assert_eq!(
            parse("add"),
            Ok(Command::Add {
                text: String::new(),
                content: String::new()
            })
        );
    }

    #[test]
    fn numbered_commands() {
        assert_eq!(parse("toggle 2"), Ok(Command::Toggle(2)));
        assert_eq!(parse("rm 1"), Ok(Command::Remove(1)));
        assert_eq!(
            parse("edit 3 New label | <b>x</b>"),
            Ok(Command::Edit {
                number: 3,
                text: "New label".to_string(),
                content: "<b>x</b>".to_string()
            })
        );
    }

    #[test]
    fn rejects_bad_numbers() {
        assert_eq!(parse("toggle"), Err(ParseError::MissingNumber("toggle")));
        assert_eq!(parse("rm zero"), Err(ParseError::BadNumber("zero".to_string())));
        assert_eq!(parse("toggle 0"), Err(ParseError::BadNumber("0".to_string())));
    }

    #[test]
    fn other_lines() {
        assert_eq!(parse("list"), Ok(Command::List));
        assert_eq!(parse("quit"), Ok(Command::Quit));
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("frobnicate 1"), Err(ParseError::Unknown("frobnicate".to_string())));
    }
}
