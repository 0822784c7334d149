//! Parsing of the CLI's editor commands.
//!
//! A line starting with `:` is a command; any other line is appended to the
//! buffer.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Goto { line: u32, column: u32 },
    Insert { line: u32, text: String },
    Append(String),
    Replace { line: u32, text: String },
    Delete(u32),
    /// Replace the whole buffer; `\n` in the text starts a new line
    Set(String),
    Language(String),
    Input(String),
    Run,
    Terminals,
    Save(String),
    Files,
    Open(String),
    Rooms,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command ':{0}' (try :help)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Command::Append(line.to_string()));
    };
    let (name, args) = match rest.split_once(' ') {
        Some((name, args)) => (name, args),
        None => (rest, ""),
    };

    match name {
        "show" | "s" => Ok(Command::Show),
        "goto" | "g" => {
            let mut parts = args.split_whitespace();
            let line = parse_line(parts.next(), ":goto <line> [column]")?;
            let column = match parts.next() {
                Some(value) => value
                    .parse()
                    .map_err(|_| ParseError::Usage(":goto <line> [column]"))?,
                None => 1,
            };
            Ok(Command::Goto { line, column })
        }
        "insert" | "i" => {
            let (line, text) = line_and_text(args, ":insert <line> <text>")?;
            Ok(Command::Insert { line, text })
        }
        "append" | "a" => Ok(Command::Append(args.to_string())),
        "replace" | "r" => {
            let (line, text) = line_and_text(args, ":replace <line> <text>")?;
            Ok(Command::Replace { line, text })
        }
        "delete" | "d" => Ok(Command::Delete(parse_line(
            Some(args.trim()),
            ":delete <line>",
        )?)),
        "set" => Ok(Command::Set(args.replace("\\n", "\n"))),
        "lang" => required(args, ":lang <language>").map(Command::Language),
        "input" => Ok(Command::Input(args.replace("\\n", "\n"))),
        "run" => Ok(Command::Run),
        "term" | "t" => Ok(Command::Terminals),
        "save" => required(args, ":save <name>").map(Command::Save),
        "files" => Ok(Command::Files),
        "open" => required(args, ":open <file name>").map(Command::Open),
        "rooms" => Ok(Command::Rooms),
        "help" | "h" => Ok(Command::Help),
        "quit" | "q" => Ok(Command::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

fn parse_line(value: Option<&str>, usage: &'static str) -> Result<u32, ParseError> {
    value
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|line| *line >= 1)
        .ok_or(ParseError::Usage(usage))
}

fn line_and_text(args: &str, usage: &'static str) -> Result<(u32, String), ParseError> {
    let (line, text) = args.split_once(' ').unwrap_or((args, ""));
    Ok((parse_line(Some(line), usage)?, text.to_string()))
}

fn required(args: &str, usage: &'static str) -> Result<String, ParseError> {
    let value = args.trim();
    if value.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    Ok(value.to_string())
}
