//! Line parsing for the two views. Kept free of I/O so it can be tested
//! without a terminal.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    /// Drop the cached list so the next render refetches.
    Refresh,
    Add(String),
    Toggle(i64),
    Edit(i64, String),
    Delete(i64),
    Open(i64),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailCommand {
    Refresh,
    /// Save a new title.
    Title(String),
    Delete,
    /// Return to the list without a network call.
    Back,
    Help,
    Quit,
}

fn parse_id(raw: &str) -> Result<i64, String> {
    raw.parse().map_err(|_| format!("not a todo id: {raw}"))
}

pub fn parse_list(line: &str) -> Result<ListCommand, String> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or("");
    let rest = parts.next().map(str::trim).unwrap_or("");

    match head {
        "refresh" | "ls" => Ok(ListCommand::Refresh),
        "add" => {
            if rest.is_empty() {
                Err("usage: add <title>".to_string())
            } else {
                Ok(ListCommand::Add(rest.to_string()))
            }
        }
        "toggle" => parse_id(rest).map(ListCommand::Toggle),
        "edit" => {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let id = parse_id(parts.next().unwrap_or(""))?;
            let title = parts.next().map(str::trim).unwrap_or("");
            if title.is_empty() {
                Err("usage: edit <id> <title>".to_string())
            } else {
                Ok(ListCommand::Edit(id, title.to_string()))
            }
        }
        "rm" => parse_id(rest).map(ListCommand::Delete),
        "open" => parse_id(rest).map(ListCommand::Open),
        "help" => Ok(ListCommand::Help),
        "quit" | "q" | "exit" => Ok(ListCommand::Quit),
        other => Err(format!("unknown command: {other}")),
    }
}

pub fn parse_detail(line: &str) -> Result<DetailCommand, String> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or("");
    let rest = parts.next().map(str::trim).unwrap_or("");

    match head {
        "refresh" => Ok(DetailCommand::Refresh),
        "title" => {
            if rest.is_empty() {
                Err("usage: title <new title>".to_string())
            } else {
                Ok(DetailCommand::Title(rest.to_string()))
            }
        }
        "rm" => Ok(DetailCommand::Delete),
        "back" => Ok(DetailCommand::Back),
        "help" => Ok(DetailCommand::Help),
        "quit" | "q" | "exit" => Ok(DetailCommand::Quit),
        other => Err(format!("unknown command: {other}")),
    }
}
