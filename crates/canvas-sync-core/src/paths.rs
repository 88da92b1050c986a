//! Path resolution for remote hierarchies
//!
//! Two independent algorithms:
//!
//! - **Folder walk**: turns flat `folder id -> (name, parent id)` records
//!   into ordered path segments by following parent pointers to the root.
//! - **Module walk**: threads "current module" / "current sub-header"
//!   state through a module item sequence to assign synthetic paths.

use std::collections::HashMap;

use tracing::trace;

use crate::domain::{DomainError, ModuleItem, RemoteFolder, ROOT_FOLDER_ID};

/// Top-level folder for files resolved through the module listing
pub const MODULES_ROOT: &str = "Modules";

/// Resolve the folder path of `folder_id`, outermost segment first
///
/// Stops at the root id (0) or at an id missing from `folders`, which is
/// treated as an implicit root. The walk is bounded by `folders.len()`
/// steps; a longer chain can only be a cycle and fails with
/// [`DomainError::CyclicHierarchy`].
pub fn resolve_folder_path(
    folder_id: i64,
    folders: &HashMap<i64, RemoteFolder>,
) -> Result<Vec<String>, DomainError> {
    let bound = folders.len();
    let mut segments = Vec::new();
    let mut current = folder_id;

    while current != ROOT_FOLDER_ID {
        let Some(folder) = folders.get(&current) else {
            trace!(folder_id = current, "Folder not in listing, treating as root");
            break;
        };
        if segments.len() == bound {
            return Err(DomainError::CyclicHierarchy { folder_id, bound });
        }
        segments.push(folder.name.clone());
        current = folder.parent();
    }

    segments.reverse();
    Ok(segments)
}

/// A file module item with its synthetic folder path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    /// `["Modules", <module>]` plus the active sub-header, if any
    pub folder_path: Vec<String>,
    /// Legacy id used for the single-file lookup
    pub legacy_id: String,
    pub display_name: String,
}

/// State machine assigning paths to module items in emission order
///
/// Entering a new module clears the sub-header; a sub-header item sets
/// it; file items read the state without changing it.
#[derive(Debug, Default)]
pub struct ModuleWalker {
    current_module: String,
    current_sub_header: String,
}

impl ModuleWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the state with one item, returning the file it resolves to
    pub fn step(&mut self, item: &ModuleItem) -> Option<ModuleFile> {
        if let Some(module) = item.module() {
            if module.name != self.current_module {
                self.current_module = module.name.clone();
                self.current_sub_header.clear();
            }
        }

        match item {
            ModuleItem::File {
                legacy_id,
                display_name,
                ..
            } => Some(ModuleFile {
                folder_path: self.folder_path(),
                legacy_id: legacy_id.clone(),
                display_name: display_name.clone(),
            }),
            ModuleItem::SubHeader { title, .. } => {
                self.current_sub_header = title.clone();
                None
            }
            ModuleItem::Other { .. } => None,
        }
    }

    fn folder_path(&self) -> Vec<String> {
        let mut path = vec![MODULES_ROOT.to_string(), self.current_module.clone()];
        if !self.current_sub_header.is_empty() {
            path.push(self.current_sub_header.clone());
        }
        path
    }
}

/// Run a fresh [`ModuleWalker`] over `items`
pub fn resolve_module_paths<'a, I>(items: I) -> Vec<ModuleFile>
where
    I: IntoIterator<Item = &'a ModuleItem>,
{
    let mut walker = ModuleWalker::new();
    items.into_iter().filter_map(|item| walker.step(item)).collect()
}
