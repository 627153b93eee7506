use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(
    name = "orbit",
    version,
    about = "ADHD prompt toolkit backed by a local Ollama server"
)]
pub struct Cli {
    /// RON configuration file (default: <data-dir>/orbit.ron).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Folder holding the record index, log file and exported documents.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the inference server.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Model name passed to the server.
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Also log to the terminal, including debug detail.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive shell (default).
    Shell,
    /// List the available tasks and their fields.
    Tasks,
    /// Run one task and print the streamed response.
    Run {
        /// Task id, e.g. taskParalysis.
        #[arg(long)]
        task: String,
        /// Field value as key=value. Repeat for each field.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// Export the response to a PDF and index it.
        #[arg(long)]
        save: bool,
    },
    /// Inspect or delete saved records.
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },
    /// Remove exported documents and clear the record index.
    Cleanup {
        /// Report what would be removed without touching anything.
        #[arg(long)]
        dry_run: bool,
        /// Leave the index rows in place.
        #[arg(long)]
        keep_index: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum RecordsAction {
    /// List saved records, newest first.
    List,
    /// Delete a record and its document.
    Delete { id: i64 },
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config: self.config.clone(),
            data_dir: self.data_dir.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{parse_field, Cli, Command, RecordsAction};

    #[test]
    fn field_splits_on_first_equals() {
        assert_eq!(
            parse_field("task=a=b").unwrap(),
            ("task".to_string(), "a=b".to_string())
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn defaults_to_shell() {
        let cli = Cli::try_parse_from(["orbit"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn parses_run_with_repeated_fields() {
        let cli = Cli::try_parse_from([
            "orbit",
            "run",
            "--task",
            "taskParalysis",
            "--field",
            "task=write report",
            "--field",
            "time=45 minutes",
            "--save",
            "--model",
            "llama3",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("llama3"));
        match cli.command {
            Some(Command::Run { task, fields, save }) => {
                assert_eq!(task, "taskParalysis");
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[1], ("time".to_string(), "45 minutes".to_string()));
                assert!(save);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_records_delete() {
        let cli = Cli::try_parse_from(["orbit", "records", "delete", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Records {
                action: RecordsAction::Delete { id: 7 }
            })
        ));
    }
}
