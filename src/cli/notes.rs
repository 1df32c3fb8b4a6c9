use chrono::Local;
use clap::Subcommand;

use super::{CliError, print_id_line, require_confirmation, resolve_id, tag_list};
use crate::models::{NewNote, Note, NoteCategory};
use crate::query::{self, NoteFilter};
use crate::store::NoteUpdate;
use crate::utils::{parse_tags, short_id};
use crate::workspace::Workspace;

#[derive(Subcommand)]
pub enum NoteCommand {
    /// Add a new note
    Add {
        /// Note title
        title: String,
        /// Note content
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_enum)]
        category: Option<NoteCategory>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Project id or prefix
        #[arg(long)]
        project: Option<String>,
    },
    /// List notes, pinned first then most recently updated
    List {
        /// Only these categories (comma-separated)
        #[arg(long, value_enum, value_delimiter = ',')]
        category: Vec<NoteCategory>,
        /// Project id or prefix
        #[arg(long)]
        project: Option<String>,
        /// Any of these tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tag: Vec<String>,
        /// Case-insensitive search over title, content and tags
        #[arg(short, long)]
        search: Option<String>,
        /// Only pinned notes
        #[arg(long)]
        pinned: bool,
    },
    /// Show one note in full
    Show { id: String },
    /// Change fields of a note
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_enum)]
        category: Option<NoteCategory>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
        /// Project id or prefix
        #[arg(long, conflicts_with = "no_project")]
        project: Option<String>,
        /// Detach from its project
        #[arg(long)]
        no_project: bool,
    },
    /// Pin or unpin a note
    Pin { id: String },
    /// Delete a note
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

pub fn handle(command: NoteCommand, ws: &mut Workspace) -> Result<(), CliError> {
    match command {
        NoteCommand::Add {
            title,
            content,
            category,
            tags,
            project,
        } => {
            let project_id = project
                .map(|p| resolve_id(ws.projects.all(), "project", &p))
                .transpose()?;
            let id = ws.notes.add(NewNote {
                title,
                content: content.unwrap_or_default(),
                category: category.unwrap_or_default(),
                tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
                project_id,
            });
            print_id_line("Note", &id);
            Ok(())
        }
        NoteCommand::List {
            category,
            project,
            tag,
            search,
            pinned,
        } => {
            let project_id = project
                .map(|p| resolve_id(ws.projects.all(), "project", &p))
                .transpose()?;
            ws.notes.set_filters(NoteFilter {
                categories: Some(category),
                project_id,
                tags: Some(tag),
                search,
                pinned: pinned.then_some(true),
            });
            handle_list_notes(ws)
        }
        NoteCommand::Show { id } => handle_show_note(&id, ws),
        NoteCommand::Edit {
            id,
            title,
            content,
            category,
            tags,
            project,
            no_project,
        } => {
            let id = resolve_id(ws.notes.all(), "note", &id)?;
            let project_id = if no_project {
                Some(None)
            } else {
                project
                    .map(|p| resolve_id(ws.projects.all(), "project", &p).map(Some))
                    .transpose()?
            };
            ws.notes.update(
                &id,
                NoteUpdate {
                    title,
                    content,
                    category,
                    tags: tags.as_deref().map(parse_tags),
                    project_id,
                    is_pinned: None,
                },
            );
            println!("Note updated (ID: {})", short_id(&id));
            Ok(())
        }
        NoteCommand::Pin { id } => {
            let id = resolve_id(ws.notes.all(), "note", &id)?;
            ws.notes.toggle_pin(&id);
            let pinned = ws.notes.get(&id).is_some_and(|n| n.is_pinned);
            println!("Note {}", if pinned { "pinned" } else { "unpinned" });
            Ok(())
        }
        NoteCommand::Delete { id, yes } => {
            let id = resolve_id(ws.notes.all(), "note", &id)?;
            let title = ws.notes.get(&id).map(|n| n.title.clone()).unwrap_or_default();
            require_confirmation(yes, format!("Delete note '{}'", title))?;
            ws.notes.remove(&id);
            println!("Note deleted (ID: {})", short_id(&id));
            Ok(())
        }
    }
}

/// Handle the note list command
pub fn handle_list_notes(ws: &Workspace) -> Result<(), CliError> {
    let notes = ws.notes.filtered();
    if notes.is_empty() {
        println!("No notes found");
    }
    for note in notes {
        print_note_line(note);
    }
    Ok(())
}

/// Handle the note show command
pub fn handle_show_note(id: &str, ws: &Workspace) -> Result<(), CliError> {
    let id = resolve_id(ws.notes.all(), "note", id)?;
    let Some(note) = ws.notes.get(&id) else {
        return Err(CliError::NotFound { kind: "note", id });
    };

    println!("{}{}", note.title, if note.is_pinned { "  (pinned)" } else { "" });
    println!("  id:       {}", note.id);
    println!("  category: {}", note.category);
    println!(
        "  project:  {}",
        query::project_label(ws.projects.all(), note.project_id.as_deref())
    );
    if !note.tags.is_empty() {
        println!("  tags:     {}", note.tags.join(", "));
    }
    println!("  updated:  {}", note.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    if !note.content.is_empty() {
        println!();
        println!("{}", note.content);
    }
    Ok(())
}

fn print_note_line(note: &Note) {
    println!(
        "{} {}  {} ({}){}",
        if note.is_pinned { "*" } else { " " },
        short_id(&note.id),
        note.title,
        note.category,
        tag_list(&note.tags)
    );
}
