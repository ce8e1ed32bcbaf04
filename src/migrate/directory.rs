// Per-directory migration: contact maps inherited down the tree

use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::path::Path;

use crate::constants::{PICASA_ORIGINALS_FOLDER, PICASA_TAG_NAME, ROOT_TAG_ID};
use crate::db::TagId;
use crate::discover::DirectoryListing;
use crate::error::{MigrateError, Result};
use crate::sidecar::{read_sidecar, Sidecar};
use super::{ContactTags, MigrationRun};

impl MigrationRun<'_> {
    /// Migrate one directory. Its ancestors must already have been visited.
    /// Returns the contacts this directory declares itself.
    pub fn migrate_directory(&mut self, listing: &DirectoryListing) -> Result<ContactTags> {
        let dir = listing.path.as_path();

        if dir.file_name() == Some(OsStr::new(PICASA_ORIGINALS_FOLDER)) {
            log::info!("Skipping {}, it holds Picasa's backups of edited photos", dir.display());
            return Ok(self.skip_directory(dir));
        }

        let sidecar_file = match listing.sidecar_file() {
            Some(name) => name,
            None => {
                if listing.has_media_files() {
                    self.warn(format!("{} contains photos but no .picasa.ini", dir.display()));
                } else {
                    self.warn(format!("{} contains neither photos nor .picasa.ini", dir.display()));
                }
                return Ok(self.skip_directory(dir));
            }
        };

        let album_id = match self.db.find_album_by_dir(dir)? {
            Some(album_id) => album_id,
            None => {
                self.stats.warnings += 1;
                return Ok(self.skip_directory(dir));
            }
        };

        let sidecar = read_sidecar(dir, sidecar_file)?;
        log::debug!("Migrating {} (album {})", sidecar.path.display(), album_id);

        let mut self_map = ContactTags::new();
        for contact in sidecar.declared_contacts() {
            let tag_id = self.db.find_or_create_person_tag(&contact.name)?;
            self_map.insert(contact.id.clone(), tag_id);
        }
        self.directory_contacts.insert(dir.to_path_buf(), self_map.clone());

        let mut effective_map = self_map.clone();
        self.merge_ancestor_contacts(dir, &mut effective_map)?;

        let album_tags = self.album_tags(&sidecar)?;
        let images = self.db.album_images(album_id)?;

        let mut consumed: HashSet<&str> = HashSet::new();
        for file_name in listing.media_files() {
            let entry = match sidecar.file(file_name) {
                Some(entry) => entry,
                None => continue,
            };
            let image_id = *images
                .get(file_name)
                .ok_or_else(|| MigrateError::UnknownImage(dir.join(file_name)))?;

            self.migrate_file(image_id, entry, &album_tags, &mut effective_map)
                .map_err(|e| e.in_file(dir.join(file_name)))?;
            self.stats.files_migrated += 1;
            consumed.insert(file_name);
        }

        self.report_unused_sections(&sidecar, &consumed);
        self.stats.directories_visited += 1;
        Ok(self_map)
    }

    fn skip_directory(&mut self, dir: &Path) -> ContactTags {
        self.directory_contacts.insert(dir.to_path_buf(), ContactTags::new());
        self.stats.directories_skipped += 1;
        ContactTags::new()
    }

    /// Fold every visited ancestor's contacts into `effective_map`, nearest first.
    /// The same contact ID must mean the same person all the way up.
    fn merge_ancestor_contacts(&mut self, dir: &Path, effective_map: &mut ContactTags) -> Result<()> {
        for ancestor in dir.ancestors().skip(1) {
            let ancestor_map = match self.directory_contacts.get(ancestor) {
                Some(map) => map,
                None => continue,
            };

            let mut conflicts = Vec::new();
            for (contact_id, &tag_id) in ancestor_map {
                match effective_map.get(contact_id) {
                    None => {
                        effective_map.insert(contact_id.clone(), tag_id);
                    }
                    Some(&existing) if existing == tag_id => {}
                    Some(_) => conflicts.push(contact_id.clone()),
                }
            }

            for contact_id in conflicts {
                let error = MigrateError::ConflictingContactIdentity {
                    contact_id,
                    directory: dir.to_path_buf(),
                    ancestor: ancestor.to_path_buf(),
                };
                if !self.dry_run() {
                    return Err(error);
                }
                log::error!("{}", error);
                self.stats.warnings += 1;
            }
        }
        Ok(())
    }

    /// Album token -> tag under the "Picasa" root tag
    fn album_tags(&self, sidecar: &Sidecar) -> Result<HashMap<String, TagId>> {
        let mut album_tags = HashMap::new();
        let mut picasa_tag = None;

        for album in sidecar.albums() {
            let parent = match picasa_tag {
                Some(tag) => tag,
                None => {
                    let tag = self.db.find_or_create_tag(ROOT_TAG_ID, PICASA_TAG_NAME)?;
                    picasa_tag = Some(tag);
                    tag
                }
            };
            let tag_id = self.db.find_or_create_tag(parent, &album.name)?;
            album_tags.insert(album.token.clone(), tag_id);
        }
        Ok(album_tags)
    }

    fn report_unused_sections(&mut self, sidecar: &Sidecar, consumed: &HashSet<&str>) {
        let gone: Vec<String> = sidecar
            .files()
            .filter(|entry| !consumed.contains(entry.file_name.as_str()))
            .map(|entry| entry.file_name.clone())
            .collect();
        let unused = sidecar.unused_section_names();

        if !gone.is_empty() {
            self.warn(format!(
                "{} has sections for files that are gone, probably fine: {}",
                sidecar.path.display(), gone.join(", ")
            ));
        }
        if !unused.is_empty() {
            self.warn(format!(
                "{} has unused sections: {}",
                sidecar.path.display(), unused.join(", ")
            ));
        }
    }
}
