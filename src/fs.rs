use std::collections::VecDeque;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, instrument, trace};
use walkdir::WalkDir;

use crate::domain::{Document, DocumentHandle, Entry, Folder, Node};
use crate::error::{IndexError, IndexResult};

/// Capabilities of the host document store the generator works against.
///
/// Paths are vault-relative and `/`-separated.
pub trait DocumentStore {
    fn find(&self, path: &str) -> IndexResult<Option<Entry>>;
    fn create(&self, path: &str, initial_content: &str) -> IndexResult<DocumentHandle>;
    fn read(&self, handle: &DocumentHandle) -> IndexResult<String>;
    fn write(&self, handle: &DocumentHandle, content: &str) -> IndexResult<()>;
}

/// A vault living in a directory on disk.
#[derive(Debug)]
pub struct FsVault {
    root: PathBuf,
    exclude: Vec<Regex>,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: Vec::new(),
        }
    }

    /// Skip any entry whose file name matches one of `patterns`, along with
    /// everything below it.
    pub fn with_exclude(mut self, patterns: &[String]) -> IndexResult<Self> {
        self.exclude = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| IndexError::Pattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<IndexResult<_>>()?;
        Ok(self)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(name))
    }

    #[instrument(level = "debug", skip(self))]
    fn load_folder(&self, dir: &Path) -> IndexResult<Folder> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut root = Folder::new(name);

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !self.is_excluded(&e.file_name().to_string_lossy()));

        for entry in walker {
            let entry = entry.map_err(|source| IndexError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            let relative = entry.path().strip_prefix(dir).map_err(|_e| {
                IndexError::io(
                    format!("computing relative path of {}", entry.path().display()),
                    std::io::Error::new(ErrorKind::Other, "entry outside walked folder"),
                )
            })?;
            let mut parts: VecDeque<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();

            if entry.file_type().is_dir() {
                find_or_create_folder(parts, &mut root);
            } else if let Some(file_name) = parts.pop_back() {
                trace!("Found document: {}", entry.path().display());
                find_or_create_folder(parts, &mut root)
                    .children
                    .push(Node::Document(Document::new(file_name)));
            }
        }
        Ok(root)
    }
}

impl DocumentStore for FsVault {
    fn find(&self, path: &str) -> IndexResult<Option<Entry>> {
        let full = self.resolve(path);
        debug!("Looking up {path:?} at {}", full.display());
        if full.is_dir() {
            Ok(Some(Entry::Folder(self.load_folder(&full)?)))
        } else if full.is_file() {
            Ok(Some(Entry::Document(DocumentHandle::new(path))))
        } else {
            Ok(None)
        }
    }

    fn create(&self, path: &str, initial_content: &str) -> IndexResult<DocumentHandle> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| IndexError::io(format!("creating {}", parent.display()), e))?;
        }
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => IndexError::AlreadyExists(path.to_string()),
                _ => IndexError::io(format!("creating {}", full.display()), e),
            })?;
        file.write_all(initial_content.as_bytes())
            .map_err(|e| IndexError::io(format!("writing {}", full.display()), e))?;
        debug!("Created document: {}", full.display());
        Ok(DocumentHandle::new(path))
    }

    fn read(&self, handle: &DocumentHandle) -> IndexResult<String> {
        let full = self.resolve(&handle.path);
        fs::read_to_string(&full)
            .map_err(|e| IndexError::io(format!("reading {}", full.display()), e))
    }

    fn write(&self, handle: &DocumentHandle, content: &str) -> IndexResult<()> {
        let full = self.resolve(&handle.path);
        if full.is_dir() {
            return Err(IndexError::NotADocument(handle.path.clone()));
        }
        fs::write(&full, content)
            .map_err(|e| IndexError::io(format!("writing {}", full.display()), e))?;
        debug!("Wrote document: {}", full.display());
        Ok(())
    }
}

fn find_or_create_folder<'a>(
    mut path_parts: VecDeque<String>,
    folder: &'a mut Folder,
) -> &'a mut Folder {
    let Some(part) = path_parts.pop_front() else {
        return folder;
    };
    // Find index first to avoid overlapping mutable borrows
    let idx = match folder
        .children
        .iter()
        .position(|c| matches!(c, Node::Folder(f) if f.name == part))
    {
        Some(i) => i,
        None => {
            folder.children.push(Node::Folder(Folder::new(part)));
            folder.children.len() - 1
        }
    };

    match &mut folder.children[idx] {
        Node::Folder(child) => find_or_create_folder(path_parts, child),
        Node::Document(_) => unreachable!("position only matches folders"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn folder_names(folder: &Folder) -> Vec<&str> {
        let mut names: Vec<&str> = folder.children.iter().map(Node::name).collect();
        names.sort();
        names
    }

    #[test]
    fn find_loads_nested_folder_snapshot() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Resources/General.md");
        touch(temp.path(), "Resources/Projects/Plan.md");
        fs::create_dir_all(temp.path().join("Resources/Empty")).unwrap();

        let vault = FsVault::new(temp.path());
        let Some(Entry::Folder(folder)) = vault.find("Resources").unwrap() else {
            panic!("expected folder");
        };

        assert_eq!(folder.name, "Resources");
        assert_eq!(folder_names(&folder), vec!["Empty", "General.md", "Projects"]);
        let projects = folder
            .children
            .iter()
            .find_map(|c| match c {
                Node::Folder(f) if f.name == "Projects" => Some(f),
                _ => None,
            })
            .unwrap();
        assert_eq!(projects.children, vec![Node::Document(Document::new("Plan.md"))]);
    }

    #[test]
    fn find_resolves_nested_paths_and_documents() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Areas/Health/Sleep.md");

        let vault = FsVault::new(temp.path());
        assert!(matches!(
            vault.find("Areas/Health").unwrap(),
            Some(Entry::Folder(f)) if f.name == "Health"
        ));
        assert_eq!(
            vault.find("Areas/Health/Sleep.md").unwrap(),
            Some(Entry::Document(DocumentHandle::new("Areas/Health/Sleep.md")))
        );
        assert_eq!(vault.find("Missing").unwrap(), None);
    }

    #[test]
    fn excluded_entries_are_skipped_with_their_subtree() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Projects/.trash/old.md");
        touch(temp.path(), "Projects/_drafts/wip.md");
        touch(temp.path(), "Projects/Live.md");

        let vault = FsVault::new(temp.path())
            .with_exclude(&[r"^\.".to_string(), "^_drafts$".to_string()])
            .unwrap();
        let Some(Entry::Folder(folder)) = vault.find("Projects").unwrap() else {
            panic!("expected folder");
        };
        assert_eq!(folder_names(&folder), vec!["Live.md"]);
    }

    #[test]
    fn invalid_exclude_pattern_is_rejected() {
        let err = FsVault::new("/vault").with_exclude(&["(".to_string()]).unwrap_err();
        assert!(matches!(err, IndexError::Pattern { .. }));
    }

    #[test]
    fn create_then_write_then_read() {
        let temp = TempDir::new().unwrap();
        let vault = FsVault::new(temp.path());

        let handle = vault.create("Resources Index.md", "").unwrap();
        assert_eq!(vault.read(&handle).unwrap(), "");

        vault.write(&handle, "- Resources\n").unwrap();
        assert_eq!(vault.read(&handle).unwrap(), "- Resources\n");
    }

    #[test]
    fn create_refuses_to_clobber_existing_document() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "General Index.md");
        let vault = FsVault::new(temp.path());

        let err = vault.create("General Index.md", "").unwrap_err();
        assert!(matches!(err, IndexError::AlreadyExists(p) if p == "General Index.md"));
    }

    #[test]
    fn write_to_folder_path_fails() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Archives")).unwrap();
        let vault = FsVault::new(temp.path());

        let err = vault.write(&DocumentHandle::new("Archives"), "x").unwrap_err();
        assert!(matches!(err, IndexError::NotADocument(_)));
    }
}
