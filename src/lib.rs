use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::content::compose_index_note;
use crate::domain::{DocumentHandle, Entry};
use crate::error::{IndexError, IndexResult};
use crate::fs::DocumentStore;
use crate::notice::{Notice, Notifier};
use crate::outline::OutlineRenderer;
use crate::template::init_tera;

pub mod config;
pub mod content;
pub mod domain;
pub mod error;
pub mod fs;
pub mod notice;
pub mod outline;
pub mod template;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the Obsidian vault
    #[arg(short, long, default_value = ".")]
    pub vault_path: PathBuf,

    /// Settings file (default: <vault>/.obs-index.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root folder to index; repeat to index several. Replaces configured roots
    #[arg(short, long = "root")]
    pub roots: Vec<String>,

    /// Print the index notes instead of writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Write,
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootStatus {
    Updated { index_path: String, created: bool },
    /// Dry run: the note that would have been written.
    Rendered { index_path: String, content: String },
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootOutcome {
    pub root: String,
    pub status: RootStatus,
}

#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<RootOutcome>,
}

impl Report {
    pub fn has_failures(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.status, RootStatus::Failed(_)))
    }
}

/// Generate or refresh the index note of every configured root.
///
/// A missing root or a store failure for one root is reported and the
/// remaining roots are still processed. Only setup problems (a broken
/// template) abort the run.
pub fn generate_indexes(
    store: &dyn DocumentStore,
    settings: &Settings,
    notifier: &dyn Notifier,
    mode: Mode,
) -> IndexResult<Report> {
    let tera = init_tera(settings.template.as_deref())?;
    let renderer = OutlineRenderer::new(&settings.extension);
    let mut report = Report::default();

    for root in &settings.roots {
        let status = match index_root(store, settings, notifier, &tera, renderer, root, mode) {
            Ok(status) => status,
            Err(e) => {
                warn!("Index for {root:?} failed: {e}");
                notifier.notify(Notice::Failed {
                    root: root.clone(),
                    reason: e.to_string(),
                });
                RootStatus::Failed(e.to_string())
            }
        };
        report.outcomes.push(RootOutcome {
            root: root.clone(),
            status,
        });
    }

    notifier.notify(Notice::Finished);
    Ok(report)
}

fn index_root(
    store: &dyn DocumentStore,
    settings: &Settings,
    notifier: &dyn Notifier,
    tera: &tera::Tera,
    renderer: OutlineRenderer<'_>,
    root: &str,
    mode: Mode,
) -> IndexResult<RootStatus> {
    let title = settings.index_title(root);
    let index_path = settings.index_path(root);
    debug!("Processing root {root:?} into {index_path:?}");

    let existing = match store.find(&index_path)? {
        Some(Entry::Document(handle)) => Some(handle),
        Some(Entry::Folder(_)) => {
            warn!("Index path {index_path:?} is a folder");
            notifier.notify(Notice::NotADocument {
                path: index_path.clone(),
            });
            return Ok(RootStatus::Failed(
                IndexError::NotADocument(index_path).to_string(),
            ));
        }
        None => None,
    };

    let destination = match (existing, mode) {
        (Some(handle), Mode::Write) => Destination::Write {
            handle,
            created: false,
        },
        (None, Mode::Write) => {
            let handle = store.create(&index_path, "")?;
            notifier.notify(Notice::Created {
                title: title.clone(),
            });
            Destination::Write {
                handle,
                created: true,
            }
        }
        (existing, Mode::DryRun) => Destination::Preview { existing },
    };

    let folder = match store.find(root)? {
        Some(Entry::Folder(folder)) => folder,
        _ => {
            warn!("Root folder {root:?} not found");
            notifier.notify(Notice::RootNotFound {
                root: root.to_string(),
            });
            return Ok(RootStatus::NotFound);
        }
    };

    let outline = renderer.render_folder(&folder, 0);
    let previous = destination.previous().map(|h| store.read(h)).transpose()?;
    let content = compose_index_note(tera, root, &title, &outline, previous.as_deref())?;

    match destination {
        Destination::Preview { .. } => Ok(RootStatus::Rendered {
            index_path,
            content,
        }),
        Destination::Write { handle, created } => {
            store.write(&handle, &content)?;
            info!(
                "Wrote {index_path:?} ({} outline lines)",
                outline.lines().count()
            );
            notifier.notify(Notice::Updated {
                title,
                root: root.to_string(),
            });
            Ok(RootStatus::Updated {
                index_path,
                created,
            })
        }
    }
}

/// Where a root's note goes once rendered.
enum Destination {
    Write {
        handle: DocumentHandle,
        created: bool,
    },
    Preview {
        existing: Option<DocumentHandle>,
    },
}

impl Destination {
    /// The note whose frontmatter carries over, if one exists.
    fn previous(&self) -> Option<&DocumentHandle> {
        match self {
            Destination::Write { handle, .. } => Some(handle),
            Destination::Preview { existing } => existing.as_ref(),
        }
    }
}
