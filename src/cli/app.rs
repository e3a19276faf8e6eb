//! CLI module for the notedeck application
//!
//! This module maps parsed commands onto a [`Session`] and prints the
//! results.
use std::{
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::Path,
    process::Command,
};

use chrono::{Local, Utc};
use log::info;
use shell_words::split;
use tempfile::Builder;

use crate::{
    content_preview, parse_key_value, parse_tags, read_upload, write_all, write_note, Commands,
    Config, ExportFormat, Note, NotePatch, NotesError, Result, Session, SlotStore,
};

/// CLI Application handler - processes CLI commands against a session
pub struct App<S: SlotStore> {
    /// Notes, settings and view state
    session: Session<S>,

    /// Application configuration
    config: Config,

    /// Whether to display verbose output
    verbose: bool,
}

impl<S: SlotStore> App<S> {
    pub fn new(session: Session<S>, config: Config, verbose: bool) -> Self {
        Self {
            session,
            config,
            verbose,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Run the CLI application with the given command
    pub fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Create {
                title,
                content,
                category,
                tags,
                edit,
            } => self.create_note(title, content, category, tags, edit),
            Commands::Show { id, json } => self.show_note(&id, json),
            Commands::List {
                search,
                category,
                json,
                brief,
            } => self.list_notes(search, category, json, brief),
            Commands::Categories => {
                for category in self.session.categories() {
                    println!("{}", category);
                }
                Ok(())
            }
            Commands::Edit {
                id,
                title,
                content,
                category,
                editor,
            } => self.edit_note(&id, title, content, category, editor),
            Commands::Delete { id, force } => self.delete_note(&id, force),
            Commands::Star { id } => {
                self.session.toggle_star(&id)?;
                let note = self.require_note(&id)?;
                println!(
                    "Note {} is {}",
                    note.id,
                    if note.is_starred { "starred" } else { "no longer starred" }
                );
                Ok(())
            }
            Commands::Tag {
                id,
                add,
                remove,
                list,
            } => self.handle_tags(&id, add, remove, list),
            Commands::Upload { file } => self.upload(&file),
            Commands::Export {
                id,
                all,
                format,
                output,
            } => {
                let dir = output.unwrap_or_else(|| self.config.export_dir.clone());
                self.export(id, all, &format, &dir)
            }
            Commands::Share { id } => {
                let link = self
                    .session
                    .share_link(&self.config.share_base_url, &id)
                    .ok_or(NotesError::NoteNotFound { id })?;
                println!("{}", link);
                Ok(())
            }
            Commands::Settings { show, set, reset } => self.handle_settings(show, set, reset),
        }
    }

    fn require_note(&self, id: &str) -> Result<&Note> {
        self.session
            .store()
            .get(id)
            .ok_or_else(|| NotesError::NoteNotFound { id: id.to_string() })
    }

    fn create_note(
        &mut self,
        title: Option<String>,
        content: Option<String>,
        category: Option<String>,
        tags: Option<String>,
        edit: bool,
    ) -> Result<()> {
        let content = match (content, edit) {
            (Some(c), _) => Some(c),
            (None, true) => Some(self.open_editor_for_content(title.as_deref(), "")?),
            (None, false) => None,
        };

        let id = self.session.create_note(title, content)?;
        let patch = NotePatch {
            category,
            tags: Some(parse_tags(tags)).filter(|t| !t.is_empty()),
            ..Default::default()
        };
        if !patch.is_empty() {
            self.session.update_note(&id, patch)?;
        }

        println!("Note created with ID: {}", id);
        Ok(())
    }

    fn show_note(&self, id: &str, json: bool) -> Result<()> {
        let note = self.require_note(id)?;
        if json {
            println!("{}", serde_json::to_string_pretty(note)?);
            return Ok(());
        }

        println!("{}", console::style(&note.title).bold());
        self.print_meta(note);
        println!("\n{}", note.content);
        Ok(())
    }

    fn list_notes(&mut self, search: String, category: String, json: bool, brief: bool) -> Result<()> {
        self.session.show_notes_list();
        let filter = self.session.filter_mut();
        filter.set_search_query(search);
        filter.set_selected_category(category);
        let notes = self.session.visible_notes();

        if json {
            println!("{}", serde_json::to_string_pretty(&notes)?);
            return Ok(());
        }

        if notes.is_empty() {
            println!("No notes found matching the criteria.");
            return Ok(());
        }

        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, note) in notes.iter().enumerate() {
            if brief {
                println!("{}  {}{}", note.id, star_marker(note), note.title);
                continue;
            }
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }
            println!("{}{}", star_marker(note), console::style(&note.title).bold());
            self.print_meta(note);
            let preview = content_preview(&note.content, 100);
            if !preview.is_empty() {
                println!("\n{}", preview);
            }
        }

        println!(
            "\nFound {} note{}",
            notes.len(),
            if notes.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    fn print_meta(&self, note: &Note) {
        println!(
            "ID: {} | Category: {} | Updated: {}",
            note.id,
            note.category,
            note.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
        if !note.tags.is_empty() {
            let tags = note
                .tags
                .iter()
                .map(|tag| format!("#{}", tag))
                .collect::<Vec<_>>()
                .join(" ");
            println!("Tags: {}", console::style(tags).cyan());
        }
        if self.verbose {
            println!(
                "Created: {} | Words: {}",
                note.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                note.word_count()
            );
        }
    }

    fn edit_note(
        &mut self,
        id: &str,
        title: Option<String>,
        content: Option<String>,
        category: Option<String>,
        editor: bool,
    ) -> Result<()> {
        let current = self.require_note(id)?.clone();
        self.session.select_note(id);

        let content = match (content, editor) {
            (Some(c), _) => Some(c),
            (None, true) => Some(self.open_editor_for_content(Some(&current.title), &current.content)?),
            (None, false) => None,
        };

        let patch = NotePatch {
            title,
            content,
            category,
            ..Default::default()
        };
        if patch.is_empty() {
            println!("Nothing to change for note {}", id);
            return Ok(());
        }

        self.session.update_note(id, patch)?;
        println!("Note {} updated successfully", id);
        Ok(())
    }

    fn delete_note(&mut self, id: &str, force: bool) -> Result<()> {
        let note = self.require_note(id)?.clone();

        if !force {
            println!("You are about to delete the following note:");
            println!("ID:     {}", note.id);
            println!("Title:  {}", note.title);
            println!("Tags:   {}", note.tags.join(", "));
            println!("\nThis action cannot be undone!");
            print!("Are you sure you want to delete this note? [y/N]: ");
            stdout().flush()?;

            let mut input = String::new();
            stdin().read_line(&mut input)?;
            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        self.session.delete_note(id)?;
        println!("Note {} deleted", id);
        Ok(())
    }

    fn handle_tags(
        &mut self,
        id: &str,
        add: Option<String>,
        remove: Option<String>,
        list: bool,
    ) -> Result<()> {
        self.require_note(id)?;
        for tag in parse_tags(add) {
            self.session.add_tag(id, &tag)?;
        }
        for tag in parse_tags(remove) {
            self.session.remove_tag(id, &tag)?;
        }

        if list {
            let note = self.require_note(id)?;
            if note.tags.is_empty() {
                println!("Note {} has no tags", id);
            } else {
                println!("{}", note.tags.join(", "));
            }
        }
        Ok(())
    }

    fn upload(&mut self, file: &Path) -> Result<()> {
        let upload = read_upload(file)?;
        let id = self.session.upload(upload)?;
        println!("Uploaded {} as note {}", file.display(), id);
        Ok(())
    }

    fn export(&self, id: Option<String>, all: bool, format: &str, dir: &Path) -> Result<()> {
        let path = if all {
            write_all(dir, self.session.store().notes(), Utc::now().date_naive())?
        } else {
            let id = id.ok_or_else(|| NotesError::ConfigError {
                message: "Pass a note ID or --all".to_string(),
            })?;
            let note = self.require_note(&id)?;
            let format: ExportFormat = format.parse()?;
            write_note(dir, note, format, self.session.settings().reading())?
        };
        println!("Exported to {}", path.display());
        Ok(())
    }

    fn handle_settings(&mut self, show: bool, set: Option<String>, reset: bool) -> Result<()> {
        let show = show || (!reset && set.is_none());
        if reset {
            self.session.reset_settings()?;
            println!("Settings reset to defaults");
        }
        if let Some(pair) = set {
            let (key, value) = parse_key_value(&pair)?;
            self.session.set_setting(&key, &value)?;
            println!("Set {} = {}", key, value);
        }
        if show {
            println!(
                "{}",
                serde_json::to_string_pretty(self.session.settings().settings())?
            );
        }
        Ok(())
    }

    fn open_editor_for_content(&self, title: Option<&str>, current: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        let editor_cmd = self.config.get_editor_command();
        self.write_editor_template(&temp_path, title, current)?;

        info!("Opening editor to write note content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(process_editor_content(&content))
    }

    fn write_editor_template(&self, path: &Path, title: Option<&str>, current: &str) -> Result<()> {
        let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;

        writeln!(file, "<!-- ")?;
        writeln!(
            file,
            "Editing: {}. This note supports Markdown format.",
            title.unwrap_or(crate::DEFAULT_TITLE)
        )?;
        writeln!(
            file,
            "Lines that start with <!-- and end with --> are comments and will be ignored."
        )?;
        writeln!(file, "Save and exit the editor when you're done.")?;
        writeln!(file, "-->")?;
        write!(file, "{}", current)?;

        Ok(())
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let args = split(editor_cmd).map_err(|e| NotesError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let Some((program, rest)) = args.split_first() else {
            return Err(NotesError::EditorError {
                message: "Empty editor command".to_string(),
            });
        };

        let status = Command::new(program).args(rest).arg(file_path).status()?;

        if !status.success() {
            return Err(NotesError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }
}

fn star_marker(note: &Note) -> String {
    if note.is_starred {
        format!("{} ", console::style("★").yellow())
    } else {
        String::new()
    }
}

/// Drops the comment header written by the editor template
fn process_editor_content(content: &str) -> String {
    let mut in_comment = false;
    content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if in_comment {
                in_comment = !trimmed.ends_with("-->");
                return false;
            }
            if trimmed.starts_with("<!--") {
                in_comment = !trimmed.ends_with("-->");
                return false;
            }
            true
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySlotStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn app() -> App<MemorySlotStore> {
        App::new(
            Session::open(MemorySlotStore::new()),
            Config::default(),
            false,
        )
    }

    fn only_note(app: &App<MemorySlotStore>) -> Note {
        let notes = app.session().store().notes();
        assert_eq!(notes.len(), 1);
        notes[0].clone()
    }

    #[test]
    fn editor_comment_block_is_removed() {
        let raw = "<!-- \nEditing: x\nmore\n-->\n# Heading\n\nbody";
        assert_eq!(process_editor_content(raw), "# Heading\n\nbody");
    }

    #[test]
    fn create_applies_all_supplied_fields() {
        let mut app = app();
        app.run(Commands::Create {
            title: Some("Plan".into()),
            content: Some("steps".into()),
            category: Some("Work".into()),
            tags: Some("a, b, a".into()),
            edit: false,
        })
        .unwrap();

        let note = only_note(&app);
        assert_eq!(note.title, "Plan");
        assert_eq!(note.content, "steps");
        assert_eq!(note.category, "Work");
        assert_eq!(note.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn create_with_title_and_content_writes_once() {
        let mut app = app();
        app.run(Commands::Create {
            title: Some("X".into()),
            content: Some("Y".into()),
            category: None,
            tags: None,
            edit: false,
        })
        .unwrap();

        let note = only_note(&app);
        assert_eq!(note.title, "X");
        assert_eq!(note.content, "Y");
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn create_without_fields_uses_defaults() {
        let mut app = app();
        app.run(Commands::Create {
            title: None,
            content: None,
            category: None,
            tags: None,
            edit: false,
        })
        .unwrap();

        let note = only_note(&app);
        assert_eq!(note.title, "Untitled Note");
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn star_and_tag_commands_mutate_the_note() {
        let mut app = app();
        app.run(Commands::Create {
            title: None,
            content: None,
            category: None,
            tags: None,
            edit: false,
        })
        .unwrap();
        let id = only_note(&app).id;

        app.run(Commands::Star { id: id.clone() }).unwrap();
        app.run(Commands::Tag {
            id: id.clone(),
            add: Some("x,y".into()),
            remove: Some("y".into()),
            list: true,
        })
        .unwrap();

        let note = only_note(&app);
        assert!(note.is_starred);
        assert_eq!(note.tags, vec!["x".to_string()]);
    }

    #[test]
    fn forced_delete_removes_note() {
        let mut app = app();
        let id = app.session.create_note(None, None).unwrap();
        app.run(Commands::Delete { id, force: true }).unwrap();
        assert!(app.session().store().is_empty());
        assert_eq!(app.session().selected_note_id(), None);
    }

    #[test]
    fn unknown_ids_are_reported_to_the_user() {
        let mut app = app();
        assert!(matches!(
            app.run(Commands::Share { id: "nope".into() }),
            Err(NotesError::NoteNotFound { .. })
        ));
        assert!(app
            .run(Commands::Show {
                id: "nope".into(),
                json: false
            })
            .is_err());
    }

    #[test]
    fn upload_and_export_round_trip_through_files() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("ideas.txt");
        std::fs::write(&source, "first idea").unwrap();

        let mut app = app();
        app.run(Commands::Upload { file: source }).unwrap();
        let note = only_note(&app);
        assert_eq!(note.title, "ideas");

        let out = dir.path().join("out");
        app.run(Commands::Export {
            id: Some(note.id.clone()),
            all: false,
            format: "txt".into(),
            output: Some(out.clone()),
        })
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(out.join("ideas.txt")).unwrap(),
            "ideas\n\nfirst idea"
        );
    }

    #[test]
    fn rejected_upload_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photo.jpg");
        std::fs::write(&source, [1u8, 2, 3]).unwrap();

        let mut app = app();
        assert!(app.run(Commands::Upload { file: source }).is_err());
        assert!(app.session().store().is_empty());
    }

    #[test]
    fn settings_set_is_persisted() {
        let mut app = app();
        app.run(Commands::Settings {
            show: false,
            set: Some("reading.maxWidth=1000".into()),
            reset: false,
        })
        .unwrap();
        assert_eq!(app.session().settings().reading().max_width, 1000);
    }
}
