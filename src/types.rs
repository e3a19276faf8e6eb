//! Shared types for the notedeck application.
//!
//! This module holds the crate-wide `Result` alias and the subcommands of
//! the terminal front end.
use std::path::PathBuf;

use clap::Subcommand;

use crate::NotesError;

/// A specialized Result type for notedeck operations.
pub type Result<T> = std::result::Result<T, NotesError>;

/// Available subcommands for the notedeck application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new note
    Create {
        /// Title of the note (defaults to "Untitled Note")
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// Content of the note, can be markdown formatted
        #[clap(short, long)]
        content: Option<String>,

        /// Category of the note (defaults to "General")
        #[clap(short = 'C', long)]
        category: Option<String>,

        /// Tags to associate with the note (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,
    },

    /// Show a note by ID
    Show {
        /// ID of the note to show
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List the notes passing the search and category filters
    List {
        /// Case-insensitive text to look for in titles and content
        #[clap(short, long, default_value = "")]
        search: String,

        /// "All", "Starred", or a category name
        #[clap(short = 'C', long, default_value = "All")]
        category: String,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,

        /// Only show note IDs and titles
        #[clap(short, long)]
        brief: bool,
    },

    /// List the available categories
    Categories,

    /// Edit an existing note
    Edit {
        /// ID of the note to edit
        id: String,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the note
        #[clap(short, long)]
        content: Option<String>,

        /// New category for the note
        #[clap(short = 'C', long)]
        category: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        editor: bool,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Star or unstar a note
    Star {
        /// ID of the note
        id: String,
    },

    /// Tag operations (add, remove, list)
    Tag {
        /// ID of the note to modify
        id: String,

        /// Tags to add (comma-separated)
        #[clap(short, long)]
        add: Option<String>,

        /// Tags to remove (comma-separated)
        #[clap(short, long)]
        remove: Option<String>,

        /// List all tags for the note
        #[clap(short, long)]
        list: bool,
    },

    /// Create a note from a plain text file
    Upload {
        /// Path to a .txt, .md or other plain text file
        file: PathBuf,
    },

    /// Export one note, or all notes as JSON
    Export {
        /// ID of the note to export
        id: Option<String>,

        /// Export every note into a single JSON backup
        #[clap(short, long, conflicts_with = "id")]
        all: bool,

        /// Format of a single-note export
        #[clap(short, long, value_parser = ["txt", "md", "json", "html"], default_value = "md")]
        format: String,

        /// Directory to write into (defaults to the configured export dir)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a share link for a note
    Share {
        /// ID of the note to share
        id: String,
    },

    /// Display settings management
    Settings {
        /// Show current settings
        #[clap(short = 'S', long)]
        show: bool,

        /// Update a setting, e.g. `theme=dark` or `reading.fontSize=18`
        #[clap(short, long)]
        set: Option<String>,

        /// Reset settings to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
