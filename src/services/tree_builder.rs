//! Builds the folder/file forest shown for a bucket from its flat object listing.
//!
//! Records are sorted by key (ordinal byte order) before insertion, so every
//! folder exists before anything inside it is attached and sibling order is
//! stable for a given set of keys regardless of listing order.

use crate::models::{
    object::ObjectRecord,
    tree::{FileNode, FolderNode, TreeNode},
};
use std::collections::HashMap;

/// Child reference while the forest is being assembled. Folders live in the
/// arena and are referenced by index until [`Forest::finish`].
enum Slot {
    Folder(usize),
    File(FileNode),
}

struct PendingFolder {
    id: String,
    name: String,
    children: Vec<Slot>,
}

#[derive(Default)]
struct Forest {
    folders: Vec<PendingFolder>,
    /// cumulative path -> arena index
    index: HashMap<String, usize>,
    roots: Vec<Slot>,
}

impl Forest {
    fn attach(&mut self, parent: Option<usize>, slot: Slot) {
        match parent {
            Some(idx) => self.folders[idx].children.push(slot),
            None => self.roots.push(slot),
        }
    }

    /// Return the folder for `path`, creating and attaching it when missing.
    fn ensure_folder(&mut self, parent: Option<usize>, path: &str, name: &str) -> usize {
        if let Some(&idx) = self.index.get(path) {
            return idx;
        }
        let idx = self.folders.len();
        self.folders.push(PendingFolder {
            id: path.to_string(),
            name: name.to_string(),
            children: Vec::new(),
        });
        self.index.insert(path.to_string(), idx);
        self.attach(parent, Slot::Folder(idx));
        idx
    }

    fn insert(&mut self, record: ObjectRecord) {
        let mut segments: Vec<&str> = record.key.split('/').collect();
        let file_name = segments.pop().unwrap_or_default();

        let mut current_path = String::new();
        let mut parent = None;
        for segment in segments.into_iter().filter(|s| !s.is_empty()) {
            if !current_path.is_empty() {
                current_path.push('/');
            }
            current_path.push_str(segment);
            parent = Some(self.ensure_folder(parent, &current_path, segment));
        }

        // Trailing-slash keys are folder placeholders: the folder above is all they stand for.
        if file_name.is_empty() {
            return;
        }

        let file = FileNode {
            id: record.key.clone(),
            name: file_name.to_string(),
            path: record.key.clone(),
            size: record.size,
            last_modified: record.last_modified,
            storage_class: record.storage_class,
        };
        self.attach(parent, Slot::File(file));
    }

    fn finish(mut self) -> Vec<TreeNode> {
        let mut folders: Vec<Option<PendingFolder>> = self.folders.drain(..).map(Some).collect();
        let roots = std::mem::take(&mut self.roots);
        materialize(roots, &mut folders)
    }
}

fn materialize(slots: Vec<Slot>, folders: &mut [Option<PendingFolder>]) -> Vec<TreeNode> {
    slots
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::File(file) => Some(TreeNode::File(file)),
            // Each folder is referenced exactly once, by its parent.
            Slot::Folder(idx) => folders[idx].take().map(|pending| {
                let children = materialize(pending.children, folders);
                TreeNode::Folder(FolderNode {
                    path: pending.id.clone(),
                    id: pending.id,
                    name: pending.name,
                    children,
                })
            }),
        })
        .collect()
}

/// Convert a flat listing into an ordered forest of folders and files.
///
/// Total over its input: empty segments from leading or doubled slashes are
/// skipped, and an empty input yields an empty forest.
pub fn build_tree(mut records: Vec<ObjectRecord>) -> Vec<TreeNode> {
    records.sort_by(|a, b| a.key.cmp(&b.key));

    let mut forest = Forest::default();
    for record in records {
        forest.insert(record);
    }
    forest.finish()
}
