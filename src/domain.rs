/// A node of a vault tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Folder(Folder),
    Document(Document),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Folder(folder) => &folder.name,
            Node::Document(document) => &document.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    pub children: Vec<Node>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Builder-style helper, mostly handy for assembling trees in tests.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }
}

impl From<Folder> for Node {
    fn from(folder: Folder) -> Self {
        Node::Folder(folder)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name including the extension.
    pub name: String,
    pub extension: String,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let extension = match name.rfind('.') {
            Some(idx) if idx > 0 => name[idx + 1..].to_string(),
            _ => String::new(),
        };
        Self { name, extension }
    }

    /// The name with its final extension removed.
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[..idx],
            _ => &self.name,
        }
    }
}

impl From<Document> for Node {
    fn from(document: Document) -> Self {
        Node::Document(document)
    }
}

/// Vault-relative, `/`-separated path of an existing document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentHandle {
    pub path: String,
}

impl DocumentHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// What a store lookup can resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Folder(Folder),
    Document(DocumentHandle),
}
