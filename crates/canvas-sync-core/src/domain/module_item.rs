//! Module items from the GraphQL `modulesConnection` listing
//!
//! The wire format is a union discriminated by `__typename`. Items whose
//! content is neither a `File` nor a `SubHeader` (assignments, pages,
//! external links...) arrive with an empty `content` object because the
//! query only selects fields on those two fragments. They decode to
//! [`ModuleItem::Other`] instead of failing.

use serde::Deserialize;

/// Reference to a module enclosing an item
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleRef {
    pub name: String,
}

/// One entry of a module, in the order the remote API emits it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawModuleItem")]
pub enum ModuleItem {
    /// A file attachment
    File {
        /// Legacy numeric id, string-encoded (the `_id` field)
        legacy_id: String,
        display_name: String,
        module: Option<ModuleRef>,
    },
    /// A text header grouping the items that follow it
    SubHeader {
        title: String,
        module: Option<ModuleRef>,
    },
    /// Any other content type
    Other {
        typename: Option<String>,
        module: Option<ModuleRef>,
    },
}

impl ModuleItem {
    /// The first enclosing module, if the item carries one
    pub fn module(&self) -> Option<&ModuleRef> {
        match self {
            ModuleItem::File { module, .. }
            | ModuleItem::SubHeader { module, .. }
            | ModuleItem::Other { module, .. } => module.as_ref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawModuleItem {
    #[serde(default)]
    content: Option<RawContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContent {
    #[serde(rename = "__typename")]
    typename: Option<String>,
    #[serde(rename = "_id")]
    legacy_id: Option<String>,
    display_name: Option<String>,
    title: Option<String>,
    #[serde(default)]
    modules: Option<Vec<ModuleRef>>,
}

impl From<RawModuleItem> for ModuleItem {
    fn from(raw: RawModuleItem) -> Self {
        let content = raw.content.unwrap_or_default();
        let module = content.modules.and_then(|m| m.into_iter().next());

        match content.typename.as_deref() {
            Some("File") => ModuleItem::File {
                legacy_id: content.legacy_id.unwrap_or_default(),
                display_name: content.display_name.unwrap_or_default(),
                module,
            },
            Some("SubHeader") => ModuleItem::SubHeader {
                title: content.title.unwrap_or_default(),
                module,
            },
            _ => ModuleItem::Other {
                typename: content.typename,
                module,
            },
        }
    }
}
