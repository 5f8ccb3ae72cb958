use std::fmt;

/// Operator-facing message emitted while generating indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Created { title: String },
    Updated { title: String, root: String },
    RootNotFound { root: String },
    NotADocument { path: String },
    Failed { root: String, reason: String },
    Finished,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Created { title } => write!(f, "Note \"{title}\" created!"),
            Notice::Updated { title, root } => {
                write!(f, "Note \"{title}\" updated with file list from \"{root}\".")
            }
            Notice::RootNotFound { root } => write!(f, "Folder \"{root}\" not found or is empty."),
            Notice::NotADocument { path } => write!(f, "\"{path}\" is a folder, not a note."),
            Notice::Failed { root, reason } => write!(f, "Index for \"{root}\" failed: {reason}"),
            Notice::Finished => write!(f, "All index notes have been generated or updated."),
        }
    }
}

/// Fire-and-forget sink for [`Notice`]s.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Prints notices to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        println!("{notice}");
    }
}
