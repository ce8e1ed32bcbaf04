// Learning contact names from the sidecar files themselves

use std::collections::{BTreeMap, BTreeSet};
use crate::discover::DirectoryListing;
use crate::constants::SIDECAR_FILE_NAMES;
use crate::error::Result;
use crate::sidecar::{read_sidecar, Sidecar};
use super::{legacy_name, GlobalNameMap};

/// Scan every sidecar file in the tree and collect the names each contact ID
/// goes by. `[Contacts2]` names from all directories are gathered first; the
/// hashed `[Contacts]` entries only fill in IDs nobody named.
pub fn learn_contacts(listings: &[DirectoryListing]) -> Result<GlobalNameMap> {
    let mut sidecars: Vec<Sidecar> = Vec::new();
    for listing in listings {
        for file_name in SIDECAR_FILE_NAMES {
            if listing.files.iter().any(|f| f == file_name) {
                sidecars.push(read_sidecar(&listing.path, file_name)?);
            }
        }
    }

    let records = collect_names(&sidecars);
    log::info!("Learned names for {} contacts from {} sidecar files", records.len(), sidecars.len());
    Ok(GlobalNameMap::from_learned(&records))
}

fn collect_names(sidecars: &[Sidecar]) -> BTreeMap<String, BTreeSet<String>> {
    let mut records: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for sidecar in sidecars {
        for contact in sidecar.declared_contacts() {
            let names = records.entry(contact.id.clone()).or_default();
            if !names.is_empty() && !names.contains(&contact.name) {
                log::warn!(
                    "Contact {} is also called {:?} in {}, previously known as {:?}",
                    contact.id, contact.name, sidecar.path.display(), names
                );
            }
            names.insert(contact.name.clone());
        }
    }

    let named: BTreeSet<String> = records.keys().cloned().collect();
    for sidecar in sidecars {
        for contact in sidecar.legacy_contacts() {
            if named.contains(&contact.id) {
                continue;
            }
            records
                .entry(contact.id.clone())
                .or_default()
                .insert(legacy_name(&contact.name_hash));
        }
    }

    records
}
