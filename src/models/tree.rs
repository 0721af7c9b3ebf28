//! Hierarchical folder/file projection of a flat object listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A node of the object tree, tagged on the wire as `"type": "folder" | "file"`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Folder(FolderNode),
    File(FileNode),
}

/// A folder materialised from a key prefix.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FolderNode {
    /// Cumulative prefix, segments joined by `/`.
    pub id: String,
    pub name: String,
    /// Same as `id`.
    pub path: String,
    pub children: Vec<TreeNode>,
}

/// A leaf standing for one stored object.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    /// Full object key.
    pub id: String,
    pub name: String,
    /// Same as `id`.
    pub path: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        match self {
            TreeNode::Folder(folder) => &folder.id,
            TreeNode::File(file) => &file.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder(folder) => &folder.name,
            TreeNode::File(file) => &file.name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder(_))
    }
}
