//! Remote tree nodes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A remote tree failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    /// The payload is not a valid node document.
    #[error("malformed node document: {0}")]
    Malformed(String),
    /// A file node listed children.
    #[error("file node {0} has children")]
    FileWithChildren(String),
    /// A child name would escape its parent folder when written locally.
    #[error("node {parent} has unsafe child name {name:?}")]
    UnsafeName {
        /// Path of the parent node.
        parent: String,
        /// Offending child name.
        name: String,
    },
}

/// One entry of a remote content tree.
///
/// Decoded from the listing endpoint (camelCase JSON) or synthesised from a
/// stream response's headers. Nodes are immutable once built. Timestamps are
/// epoch milliseconds, `0` when unknown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNode {
    name: String,
    path: String,
    #[serde(default)]
    folder: bool,
    #[serde(default)]
    children: Vec<RemoteNode>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    updated_at: i64,
}

impl RemoteNode {
    /// Creates a file node.
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            folder: false,
            children: Vec::new(),
            source: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Creates a folder node with `children`.
    pub fn folder(
        name: impl Into<String>,
        path: impl Into<String>,
        children: Vec<RemoteNode>,
    ) -> Self {
        Self {
            folder: true,
            children,
            ..Self::file(name, path)
        }
    }

    /// Sets the creation and modification timestamps.
    pub fn with_timestamps(mut self, created_at: i64, updated_at: i64) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Sets the content reference.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Decodes and validates a listing response.
    pub fn from_json(bytes: &[u8]) -> Result<Self, NodeError> {
        let node: Self =
            serde_json::from_slice(bytes).map_err(|error| NodeError::Malformed(error.to_string()))?;
        node.validate()?;
        Ok(node)
    }

    /// Checks the tree invariants.
    ///
    /// File nodes must not have children, and child names must be single
    /// path components so a download never writes outside its destination.
    pub fn validate(&self) -> Result<(), NodeError> {
        if !self.folder && !self.children.is_empty() {
            return Err(NodeError::FileWithChildren(self.path.clone()));
        }
        for child in &self.children {
            let name = child.name.as_str();
            if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
                return Err(NodeError::UnsafeName {
                    parent: self.path.clone(),
                    name: name.to_owned(),
                });
            }
            child.validate()?;
        }
        Ok(())
    }

    /// Node name (final path component).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute remote path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` for folders.
    pub fn is_folder(&self) -> bool {
        self.folder
    }

    /// Children in listing order; empty for files.
    pub fn children(&self) -> &[RemoteNode] {
        &self.children
    }

    /// Content reference, unused by the engine.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Creation time in epoch milliseconds.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Modification time in epoch milliseconds.
    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_listing() {
        let json = br#"{
            "name": "theme",
            "path": "/theme",
            "folder": true,
            "createdAt": 10,
            "updatedAt": 20,
            "children": [
                {"name": "main.css", "path": "/theme/main.css", "folder": false,
                 "source": null, "createdAt": 1, "updatedAt": 2, "id": 7}
            ]
        }"#;
        let node = RemoteNode::from_json(json).expect("valid tree");
        assert!(node.is_folder());
        assert_eq!(node.updated_at(), 20);
        assert_eq!(node.children()[0].name(), "main.css");
        assert_eq!(node.children()[0].created_at(), 1);
        assert!(node.children()[0].source().is_none());
    }

    #[test]
    fn missing_timestamps_default_to_zero() {
        let node = RemoteNode::from_json(br#"{"name":"a.css","path":"/a.css"}"#).expect("valid");
        assert_eq!(node.created_at(), 0);
        assert!(!node.is_folder());
    }

    #[test]
    fn files_with_children_are_rejected() {
        let json = br#"{"name":"a.css","path":"/a.css","folder":false,
            "children":[{"name":"b","path":"/a.css/b"}]}"#;
        assert_eq!(
            RemoteNode::from_json(json),
            Err(NodeError::FileWithChildren("/a.css".into()))
        );
    }

    #[test]
    fn traversal_names_are_rejected() {
        let tree = RemoteNode::folder("t", "/t", vec![RemoteNode::file("..", "/t/..")]);
        assert!(matches!(tree.validate(), Err(NodeError::UnsafeName { .. })));

        let tree = RemoteNode::folder("t", "/t", vec![RemoteNode::file("a/b.css", "/t/a/b.css")]);
        assert!(tree.validate().is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let node = RemoteNode::file("a.css", "/a.css").with_timestamps(1, 2);
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["updatedAt"], 2);
        assert_eq!(json["folder"], false);
    }
}
