use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "A markdown notebook with live preview and dictation", version)]
pub(crate) struct Cli {
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub(crate) version: Option<bool>,

    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Store a new note without opening the editor
    Add {
        #[arg(long, short)]
        name: String,
        content: String,
    },
    /// Print a note's markdown
    Show {
        id: String,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        id: String,
    },
    /// Write every note into one markdown file
    Export {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Transcribe an audio file and print the text
    Dictate {
        file: PathBuf,
    },
    Version,
    #[command(alias = "ls")]
    List,
}
