// Per-file mutations: star, album tags, faces
// Each mutation checks the catalog first so a rerun changes nothing.

use std::collections::HashMap;

use crate::constants::{FACE_TAG_REGION_PROPERTY, UNKNOWN_FACE_ID};
use crate::contacts::NamePriority;
use crate::db::{ImageId, TagId};
use crate::discover::carries_regions;
use crate::error::{MigrateError, Result};
use crate::rect64::{parse_rect64, to_pixel_rect};
use crate::sidecar::{FaceEntry, FileEntry};
use super::{ContactTags, MigrationRun};

impl MigrationRun<'_> {
    pub(super) fn migrate_file(
        &mut self,
        image_id: ImageId,
        entry: &FileEntry,
        album_tags: &HashMap<String, TagId>,
        effective_map: &mut ContactTags,
    ) -> Result<()> {
        if entry.star {
            self.apply_star(image_id, entry)?;
        }

        for token in &entry.albums {
            let tag_id = *album_tags.get(token).ok_or_else(|| MigrateError::UnknownAlbumReference {
                album: token.clone(),
                file: entry.file_name.clone(),
            })?;
            if self.attach(image_id, tag_id)? {
                self.stats.album_tags_attached += 1;
            }
        }

        if !entry.faces.is_empty() {
            if carries_regions(&entry.file_name) {
                for face in &entry.faces {
                    self.apply_face(image_id, face, effective_map)?;
                }
            } else {
                self.warn(format!(
                    "Skipping {} faces of {}, digiKam does not know its size",
                    entry.faces.len(), entry.file_name
                ));
            }
        }

        if !entry.unused_keys.is_empty() {
            self.warn(format!(
                "Unused keys in section [{}]: {}",
                entry.file_name, entry.unused_keys.join(", ")
            ));
        }
        Ok(())
    }

    fn apply_star(&mut self, image_id: ImageId, entry: &FileEntry) -> Result<()> {
        if self.has_tag(image_id, self.db.star_tag)? {
            self.warn(format!(
                "{} is starred in Picasa and already accepted in digiKam, leaving it",
                entry.file_name
            ));
            return Ok(());
        }
        if self.db.image_has_pick_label(image_id)? {
            self.warn(format!(
                "{} is starred in Picasa but already has a different pick label in digiKam, leaving it",
                entry.file_name
            ));
            return Ok(());
        }
        if self.dry_run() {
            self.pending_tags.insert((image_id, self.db.star_tag));
            self.stats.stars_applied += 1;
        } else if self.db.star_image(image_id)? {
            self.stats.stars_applied += 1;
        }
        Ok(())
    }

    fn apply_face(&mut self, image_id: ImageId, face: &FaceEntry, effective_map: &mut ContactTags) -> Result<()> {
        if face.contact_id == UNKNOWN_FACE_ID {
            return Ok(());
        }

        let tag_id = self.resolve_face_tag(&face.contact_id, effective_map)?;
        if self.has_tag(image_id, tag_id)? {
            self.warn(format!(
                "Image {} is already tagged with contact {}, skipping face {}",
                image_id, face.contact_id, face.rect
            ));
            return Ok(());
        }

        let rect = parse_rect64(&face.rect)?;
        let dims = self.db.image_dimensions(image_id)?;
        let region = to_pixel_rect(dims, rect)?.to_region_value();

        if self.has_region(image_id, &region)? {
            match self.options.skip_same_rect {
                None => return Err(MigrateError::AmbiguousRegionCollision { rect: region }),
                Some(true) => {
                    self.warn(format!(
                        "Image {} already has face rectangle {}, skipping contact {}",
                        image_id, region, face.contact_id
                    ));
                    return Ok(());
                }
                Some(false) => {}
            }
        }

        if self.dry_run() {
            self.pending_tags.insert((image_id, tag_id));
            self.pending_regions.insert((image_id, region));
            self.stats.faces_tagged += 1;
            self.stats.regions_written += 1;
            return Ok(());
        }

        if self.db.attach_tag(image_id, tag_id)? {
            self.stats.faces_tagged += 1;
            self.db.set_image_tag_property(image_id, tag_id, FACE_TAG_REGION_PROPERTY, &region)?;
            self.stats.regions_written += 1;
        }
        Ok(())
    }

    /// The person tag for a face's contact ID. With learned names the
    /// directory's own map wins; with a registry the registry wins. An ID
    /// nobody declared gets a placeholder name. The answer is cached in
    /// `effective_map` for the rest of the directory.
    fn resolve_face_tag(&mut self, contact_id: &str, effective_map: &mut ContactTags) -> Result<TagId> {
        let local = effective_map.get(contact_id).copied();
        let tag_id = match (self.names.priority(), local) {
            (NamePriority::Directory, Some(tag_id)) => tag_id,
            (NamePriority::Global, Some(tag_id)) if !self.names.contains(contact_id) => tag_id,
            _ => {
                let name = self.names.name_or_placeholder(contact_id);
                self.db.find_or_create_person_tag(&name)?
            }
        };
        effective_map.insert(contact_id.to_string(), tag_id);
        Ok(tag_id)
    }

    /// Attach a tag, or in a dry run report whether it would be new
    fn attach(&mut self, image_id: ImageId, tag_id: TagId) -> Result<bool> {
        if self.dry_run() {
            if self.has_tag(image_id, tag_id)? {
                return Ok(false);
            }
            self.pending_tags.insert((image_id, tag_id));
            return Ok(true);
        }
        self.db.attach_tag(image_id, tag_id)
    }

    /// Whether the image carries the tag, counting a dry run's would-be attachments
    fn has_tag(&self, image_id: ImageId, tag_id: TagId) -> Result<bool> {
        if self.pending_tags.contains(&(image_id, tag_id)) {
            return Ok(true);
        }
        self.db.image_has_tag(image_id, tag_id)
    }

    fn has_region(&self, image_id: ImageId, region: &str) -> Result<bool> {
        if self.pending_regions.contains(&(image_id, region.to_string())) {
            return Ok(true);
        }
        self.db.image_has_property(image_id, FACE_TAG_REGION_PROPERTY, region)
    }
}
