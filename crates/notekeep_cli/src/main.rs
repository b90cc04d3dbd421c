//! Command-line front end for the note catalog.
//!
//! # Responsibility
//! - Stand in for the desktop UI: drive `Catalog` use-cases and render results.
//! - Show one message per failure category (list/create/load/save/delete).
//!
//! # Invariants
//! - Storage errors end the process with a non-zero exit code, never a panic.

use clap::{Parser, Subcommand};
use log::warn;
use notekeep_core::{
    default_log_level, init_logging, Catalog, CatalogConfig, FsNoteStore, LoggingConfig,
    LoggingError, NoteId, NoteIdError, StoreConfig, StoreError, StoreErrorKind,
    DEFAULT_NOTES_DIR,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "notekeep", version, about = "Keep rich-text notes as plain files.")]
struct Cli {
    /// Directory holding `<id>.note` files.
    #[arg(long, global = true, value_name = "DIR", default_value = DEFAULT_NOTES_DIR)]
    notes_dir: PathBuf,

    /// Absolute directory for rolling log files; logging is off when omitted.
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List notes with their date and sample.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Create an empty note and print its id.
    New,
    /// Print the full content of one note.
    Show { id: String },
    /// Overwrite a note with TEXT, the contents of --file, or stdin.
    Save {
        id: String,
        #[arg(long, value_name = "PATH", conflicts_with = "text")]
        file: Option<PathBuf>,
        text: Option<String>,
    },
    /// Delete one note.
    Delete { id: String },
    /// Print the core library version.
    Version,
}

/// User action a storage failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    List,
    Create,
    Load,
    Save,
    Delete,
}

impl Action {
    fn user_message(self) -> &'static str {
        match self {
            Self::List => "It seems like we can't list your notes right now.",
            Self::Create => {
                "We can't create the note file right now, make sure you've got the right privileges."
            }
            Self::Load => "We can't load the note right now, it might've been deleted or moved.",
            Self::Save => "I don't think we can save this note right now, try again later.",
            Self::Delete => "We can't delete this note right now, try again later.",
        }
    }
}

#[derive(Debug)]
enum CliError {
    Store { action: Action, source: StoreError },
    InvalidId(NoteIdError),
    Input(io::Error),
    Output(io::Error),
    Logging(LoggingError),
    Encode(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store { action, source } => write!(f, "{}\n({source})", action.user_message()),
            Self::InvalidId(err) => write!(f, "{err}"),
            Self::Input(err) => write!(f, "cannot read note content: {err}"),
            Self::Output(err) => write!(f, "cannot write output: {err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "cannot encode note list: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store { source, .. } => Some(source),
            Self::InvalidId(err) => Some(err),
            Self::Input(err) | Self::Output(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<NoteIdError> for CliError {
    fn from(value: NoteIdError) -> Self {
        Self::InvalidId(value)
    }
}

fn store_failure(action: Action) -> impl FnOnce(StoreError) -> CliError {
    move |source| CliError::Store { action, source }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();
    match run(cli, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, out: &mut dyn Write) -> Result<(), CliError> {
    if let Some(log_dir) = cli.log_dir.as_ref() {
        let config = LoggingConfig {
            level: cli
                .log_level
                .clone()
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: log_dir.clone(),
            duplicate_to_stderr: true,
        };
        init_logging(&config).map_err(CliError::Logging)?;
    }

    let store = FsNoteStore::new(StoreConfig::with_notes_dir(cli.notes_dir.clone()));
    let mut catalog = Catalog::new(store, CatalogConfig::default());

    match cli.command {
        Command::Version => {
            writeln!(out, "notekeep_core {}", notekeep_core::core_version())
                .map_err(CliError::Output)?;
        }
        Command::List { json } => {
            let report = catalog.initialize().map_err(store_failure(Action::List))?;
            if let Some(warning) = report.warning_message() {
                eprintln!("{warning}");
            }
            if json {
                let encoded =
                    serde_json::to_string_pretty(catalog.records()).map_err(CliError::Encode)?;
                writeln!(out, "{encoded}").map_err(CliError::Output)?;
            } else {
                for record in catalog.records() {
                    writeln!(
                        out,
                        "{}  {}  {}",
                        record.id,
                        record.display_date(),
                        record.sample.replace(['\n', '\r'], " ")
                    )
                    .map_err(CliError::Output)?;
                }
            }
        }
        Command::New => {
            load_catalog_lenient(&mut catalog)?;
            let record = catalog.create_new().map_err(store_failure(Action::Create))?;
            writeln!(out, "{}", record.id).map_err(CliError::Output)?;
        }
        Command::Show { id } => {
            let id = NoteId::parse(id)?;
            let content = catalog
                .load_content(&id)
                .map_err(store_failure(Action::Load))?;
            writeln!(out, "{content}").map_err(CliError::Output)?;
        }
        Command::Save { id, file, text } => {
            let id = NoteId::parse(id)?;
            let content = match (file, text) {
                (Some(path), _) => std::fs::read_to_string(path).map_err(CliError::Input)?,
                (None, Some(text)) => text,
                (None, None) => {
                    let mut buffer = String::new();
                    io::stdin()
                        .read_to_string(&mut buffer)
                        .map_err(CliError::Input)?;
                    buffer
                }
            };
            load_catalog_lenient(&mut catalog)?;
            catalog
                .save_selected(&id, &content)
                .map_err(store_failure(Action::Save))?;
        }
        Command::Delete { id } => {
            let id = NoteId::parse(id)?;
            load_catalog_lenient(&mut catalog)?;
            catalog
                .delete_selected(&id)
                .map_err(store_failure(Action::Delete))?;
        }
    }

    Ok(())
}

/// Loads existing notes before a mutation; a missing notes directory just
/// means there is nothing to load yet.
fn load_catalog_lenient(catalog: &mut Catalog<FsNoteStore>) -> Result<(), CliError> {
    match catalog.initialize() {
        Ok(report) => {
            if let Some(warning) = report.warning_message() {
                eprintln!("{warning}");
            }
            Ok(())
        }
        Err(err) if err.kind() == StoreErrorKind::DirectoryUnreadable => {
            warn!("event=cli_preload module=cli status=skip reason=notes_dir_unreadable");
            Ok(())
        }
        Err(err) => Err(store_failure(Action::List)(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::{run, Action, Cli, CliError};
    use clap::Parser;
    use notekeep_core::StoreErrorKind;
    use std::path::Path;

    fn run_args(notes_dir: &Path, args: &[&str]) -> Result<String, CliError> {
        let mut argv = vec![
            "notekeep".to_string(),
            "--notes-dir".to_string(),
            notes_dir.display().to_string(),
        ];
        argv.extend(args.iter().map(|arg| arg.to_string()));
        let cli = Cli::try_parse_from(argv).expect("arguments should parse");
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out).expect("output should be UTF-8"))
    }

    #[test]
    fn new_save_show_list_delete_flow() {
        let root = tempfile::tempdir().unwrap();
        let notes_dir = root.path().join("notes");

        let id = run_args(&notes_dir, &["new"]).unwrap().trim().to_string();
        assert!(notes_dir.join(format!("{id}.note")).is_file());

        run_args(&notes_dir, &["save", id.as_str(), "<p>Shopping</p><p>milk</p>"]).unwrap();
        let shown = run_args(&notes_dir, &["show", id.as_str()]).unwrap();
        assert_eq!(shown.trim_end(), "<p>Shopping</p><p>milk</p>");

        let listed = run_args(&notes_dir, &["list"]).unwrap();
        assert!(listed.starts_with(&id));
        assert!(listed.contains("Shopping"));

        let json = run_args(&notes_dir, &["list", "--json"]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["id"], id.as_str());
        assert_eq!(parsed[0]["sample"], "Shopping");

        run_args(&notes_dir, &["delete", id.as_str()]).unwrap();
        assert_eq!(run_args(&notes_dir, &["list"]).unwrap(), "");
    }

    #[test]
    fn list_on_missing_directory_reports_list_failure() {
        let root = tempfile::tempdir().unwrap();
        let err = run_args(&root.path().join("absent"), &["list"]).unwrap_err();
        match err {
            CliError::Store { action, source } => {
                assert_eq!(action, Action::List);
                assert_eq!(source.kind(), StoreErrorKind::DirectoryUnreadable);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn show_unknown_note_uses_load_message() {
        let root = tempfile::tempdir().unwrap();
        let err = run_args(root.path(), &["show", "missing"]).unwrap_err();
        assert!(err.to_string().starts_with(Action::Load.user_message()));
    }

    #[test]
    fn path_like_ids_are_rejected_before_touching_disk() {
        let root = tempfile::tempdir().unwrap();
        let err = run_args(root.path(), &["delete", "../outside"]).unwrap_err();
        assert!(matches!(err, CliError::InvalidId(_)));
    }

    #[test]
    fn save_reads_content_from_file() {
        let root = tempfile::tempdir().unwrap();
        let source = root.path().join("draft.html");
        std::fs::write(&source, "<p>from file</p>").unwrap();
        let notes_dir = root.path().join("notes");
        let id = run_args(&notes_dir, &["new"]).unwrap().trim().to_string();

        run_args(
            &notes_dir,
            &["save", id.as_str(), "--file", source.to_str().unwrap()],
        )
        .unwrap();

        let stored = std::fs::read_to_string(notes_dir.join(format!("{id}.note"))).unwrap();
        assert_eq!(stored, "<p>from file</p>\n");
    }

    #[test]
    fn save_to_unknown_note_uses_save_message_and_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let notes_dir = root.path().join("notes");

        let err = run_args(&notes_dir, &["save", "ghost", "<p>x</p>"]).unwrap_err();

        assert!(err.to_string().starts_with(Action::Save.user_message()));
        assert!(!notes_dir.join("ghost.note").exists());
    }
}
