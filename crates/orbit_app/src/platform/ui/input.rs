use orbit_core::{Msg, RecordId, TaskKind};

pub const HELP: &str = "\
Commands:
  tasks                 list tasks
  use <n|id>            select a task (clears its fields)
  set <key> <value>     set a field; write \\n for a line break
  show                  show the form and the rendered prompt
  run                   send the prompt and stream the answer
  stop                  cancel the running request
  save                  export the last answer to PDF
  records               list saved records
  delete <id>           delete a saved record and its PDF
  help                  this text
  quit                  leave
";

/// One line of shell input, parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Help,
    Tasks,
    Show,
    Quit,
    Msg(Msg),
}

/// Parses a shell line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let parsed = match command.to_ascii_lowercase().as_str() {
        "help" | "?" => ShellCommand::Help,
        "tasks" => ShellCommand::Tasks,
        "show" => ShellCommand::Show,
        "quit" | "exit" => ShellCommand::Quit,
        "use" => ShellCommand::Msg(Msg::TaskSelected(parse_task(rest)?)),
        "set" => {
            let (key, value) = match rest.split_once(char::is_whitespace) {
                Some((key, value)) => (key, value.trim_start()),
                None => (rest, ""),
            };
            if key.is_empty() {
                return Err("usage: set <key> <value>".to_string());
            }
            ShellCommand::Msg(Msg::FieldChanged {
                key: key.to_string(),
                value: unescape(value),
            })
        }
        "run" => ShellCommand::Msg(Msg::RunClicked),
        "stop" => ShellCommand::Msg(Msg::StopClicked),
        "save" => ShellCommand::Msg(Msg::SaveClicked),
        "records" => ShellCommand::Msg(Msg::RecordsRequested),
        "delete" => {
            let id: RecordId = rest
                .parse()
                .map_err(|_| format!("usage: delete <id> (got '{rest}')"))?;
            ShellCommand::Msg(Msg::DeleteRecordClicked(id))
        }
        other => return Err(format!("unknown command '{other}'; type help")),
    };
    Ok(Some(parsed))
}

fn parse_task(raw: &str) -> Result<TaskKind, String> {
    if let Ok(number) = raw.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|index| TaskKind::ALL.get(index).copied())
            .ok_or_else(|| format!("no task number {number}"));
    }
    TaskKind::from_id(raw).ok_or_else(|| format!("unknown task '{raw}'"))
}

fn unescape(value: &str) -> String {
    value.replace("\\n", "\n")
}
