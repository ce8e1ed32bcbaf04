// Contact identity resolution
// Picasa identifies people by opaque contact IDs. Before touching the catalog we
// settle on one display name per ID for the whole tree.

pub mod learn;
pub mod registry;

use std::collections::{BTreeSet, HashMap};
use crate::constants::{AMBIGUOUS_NAME_SEPARATOR, LEGACY_NAME_PREFIX, RECT64_NAME_SUFFIX};

/// Which source wins when a face's contact ID is known both tree-wide and in
/// the directory's own contact map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePriority {
    /// Names learned from the sidecar files: the directory's map wins.
    Directory,
    /// Names from a contacts.xml registry: the registry wins.
    Global,
}

/// Contact ID -> canonical display name, for the whole run.
#[derive(Debug, Clone)]
pub struct GlobalNameMap {
    names: HashMap<String, String>,
    priority: NamePriority,
}

impl GlobalNameMap {
    /// Names from an authoritative registry; later duplicates replace earlier ones.
    pub fn from_registry(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        GlobalNameMap {
            names: entries.into_iter().collect(),
            priority: NamePriority::Global,
        }
    }

    /// Names learned from sidecar files, possibly several per ID.
    pub fn from_learned<'a>(records: impl IntoIterator<Item = (&'a String, &'a BTreeSet<String>)>) -> Self {
        GlobalNameMap {
            names: records
                .into_iter()
                .map(|(id, names)| (id.clone(), canonical_name(names)))
                .collect(),
            priority: NamePriority::Directory,
        }
    }

    pub fn priority(&self) -> NamePriority {
        self.priority
    }

    pub fn get(&self, contact_id: &str) -> Option<&str> {
        self.names.get(contact_id).map(String::as_str)
    }

    pub fn contains(&self, contact_id: &str) -> bool {
        self.names.contains_key(contact_id)
    }

    /// The name for `contact_id`, inventing and remembering a placeholder if
    /// the ID was never declared anywhere.
    pub fn name_or_placeholder(&mut self, contact_id: &str) -> String {
        if let Some(name) = self.names.get(contact_id) {
            return name.clone();
        }
        let name = placeholder_name(contact_id);
        log::info!("Contact {} has no name anywhere, calling it {}", contact_id, name);
        self.names.insert(contact_id.to_string(), name.clone());
        name
    }
}

/// All observed names, sorted and joined, so ambiguous IDs resolve the same way every run.
pub fn canonical_name(names: &BTreeSet<String>) -> String {
    names
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(AMBIGUOUS_NAME_SEPARATOR)
}

/// Name for a `[Contacts]` entry that only carries a name hash.
pub fn legacy_name(name_hash: &str) -> String {
    format!("{}{}", LEGACY_NAME_PREFIX, name_hash)
}

/// Name for a contact ID only ever seen on a face rectangle.
pub fn placeholder_name(contact_id: &str) -> String {
    format!("{}{}{}", LEGACY_NAME_PREFIX, contact_id, RECT64_NAME_SUFFIX)
}
