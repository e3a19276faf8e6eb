//! Read-only exports of notes to plain text, Markdown, JSON and HTML.
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::NaiveDate;
use log::{debug, error, info};
use pulldown_cmark::{html, Event, Options, Parser};

use crate::{Note, NotesError, ReadingSettings, Result, DEFAULT_TITLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Md,
    Json,
    /// Standalone formatted document styled from the reading settings
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "md" | "markdown" => Ok(ExportFormat::Md),
            "json" => Ok(ExportFormat::Json),
            "html" => Ok(ExportFormat::Html),
            other => Err(NotesError::ConfigError {
                message: format!("Unsupported export format: {}", other),
            }),
        }
    }
}

/// File name for a single exported note.
///
/// Every character outside ASCII letters and digits becomes `_` and the
/// result is lowercased.
pub fn export_file_name(note: &Note, format: ExportFormat) -> String {
    let stem: String = if note.title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        note.title.clone()
    };
    let stem: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{}.{}", stem, format.extension())
}

/// File name of a full export made on `date`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("notes_backup_{}.json", date.format("%Y-%m-%d"))
}

/// Renders one note in the given format
pub fn render_note(note: &Note, format: ExportFormat, reading: &ReadingSettings) -> Result<String> {
    let rendered = match format {
        ExportFormat::Txt => format!("{}\n\n{}", note.title, note.content),
        ExportFormat::Md => format!("# {}\n\n{}", note.title, note.content),
        ExportFormat::Json => serde_json::to_string_pretty(note)?,
        ExportFormat::Html => render_html(note, reading),
    };
    Ok(rendered)
}

/// Pretty JSON array of every note
pub fn render_all(notes: &[Note]) -> Result<String> {
    Ok(serde_json::to_string_pretty(notes)?)
}

/// Renders the note's Markdown into a standalone HTML page.
///
/// HTML embedded in the note content is escaped, not rendered.
pub fn render_html(note: &Note, reading: &ReadingSettings) -> String {
    let title = if note.title.is_empty() {
        DEFAULT_TITLE
    } else {
        note.title.as_str()
    };
    let (background, foreground) = reading.theme.colors();

    let body = if note.content.trim().is_empty() {
        "<p class=\"empty\">This note is empty.</p>\n".to_string()
    } else {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        // Raw HTML in a note is shown as text, never passed through
        let parser = Parser::new_ext(&note.content, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
        let mut out = String::new();
        html::push_html(&mut out, parser);
        out
    };

    let mut meta = format!(
        "<p>Created: {}</p>\n<p>Updated: {}</p>\n<p>Words: {}</p>\n",
        note.created_at.format("%Y-%m-%d"),
        note.updated_at.format("%Y-%m-%d"),
        note.word_count()
    );
    if !note.tags.is_empty() {
        meta.push_str(&format!("<p>Tags: {}</p>\n", escape_html(&note.tags.join(", "))));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ background: {background}; color: {foreground}; font-family: {font}; font-size: {size}px; line-height: {line_height}; }}
main {{ max-width: {max_width}px; margin: 0 auto; padding: 2rem; }}
.meta {{ opacity: 0.6; font-size: 0.8em; }}
.empty {{ opacity: 0.5; }}
</style>
</head>
<body>
<main>
<h1>{title}</h1>
<div class="meta">
{meta}</div>
{body}</main>
</body>
</html>
"#,
        title = escape_html(title),
        background = background,
        foreground = foreground,
        font = reading.font_stack(),
        size = reading.font_size,
        line_height = reading.line_height,
        max_width = reading.max_width,
        meta = meta,
        body = body,
    )
}

/// Writes one note into `dir`, returning the written path
pub fn write_note(
    dir: &Path,
    note: &Note,
    format: ExportFormat,
    reading: &ReadingSettings,
) -> Result<PathBuf> {
    let rendered = render_note(note, format, reading)?;
    let path = dir.join(export_file_name(note, format));
    write_file(&path, &rendered)?;
    info!("Exported note {} to {}", note.id, path.display());
    Ok(path)
}

/// Writes every note as one JSON file into `dir`, returning the written path
pub fn write_all(dir: &Path, notes: &[Note], today: NaiveDate) -> Result<PathBuf> {
    let rendered = render_all(notes)?;
    let path = dir.join(backup_file_name(today));
    write_file(&path, &rendered)?;
    info!("Exported {} notes to {}", notes.len(), path.display());
    Ok(path)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            debug!("Creating export directory: {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create directory {}: {}", parent.display(), e);
                NotesError::DirectoryError {
                    path: parent.to_path_buf(),
                }
            })?;
        }
    }
    fs::write(path, contents).map_err(|e| {
        error!("Failed to write export file {}: {}", path.display(), e);
        NotesError::Io(e)
    })
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
