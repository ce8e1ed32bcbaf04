// digiKam schema query helpers

use std::collections::HashMap;
use std::path::Path;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::album_roots::{relative_album_path, root_for_dir};
use super::{AlbumId, DigikamDb, ImageId, TagId};
use crate::constants::{IMAGE_STATUS_VISIBLE, TAG_PROPERTY_FACE_ENGINE, TAG_PROPERTY_PERSON};
use crate::error::{MigrateError, Result};
use crate::hash::synthetic_tag_id;
use crate::rect64::ImageDimensions;

// ----- Tags -----

pub fn find_tag(conn: &Connection, parent_tag: TagId, name: &str) -> Result<Option<TagId>> {
    let result = conn.query_row(
        "SELECT id FROM Tags WHERE pid = ?1 AND name = ?2",
        params![parent_tag, name],
        |row| row.get(0),
    ).optional()?;
    Ok(result)
}

pub fn get_parent_tag(conn: &Connection, tag: TagId) -> Result<TagId> {
    let result = conn.query_row(
        "SELECT pid FROM Tags WHERE id = ?1",
        params![tag],
        |row| row.get::<_, Option<TagId>>(0),
    ).optional()?;
    result
        .flatten()
        .ok_or_else(|| MigrateError::Catalog(format!("Tag {} has no parent", tag)))
}

pub fn find_tag_with_property(conn: &Connection, property: &str) -> Result<Option<TagId>> {
    let result = conn.query_row(
        "SELECT tagid FROM TagProperties WHERE property = ?1 LIMIT 1",
        params![property],
        |row| row.get(0),
    ).optional()?;
    Ok(result)
}

// ----- Catalog operations -----

impl DigikamDb {
    /// Returns the ID of the Album for the given directory, or None if digiKam
    /// has no album there. Fails if the directory is outside every album root.
    pub fn find_album_by_dir(&self, dir: &Path) -> Result<Option<AlbumId>> {
        let root = root_for_dir(&self.album_roots, dir)
            .ok_or_else(|| MigrateError::NoAlbumRoot(dir.to_path_buf()))?;
        let relative_path = relative_album_path(&root.path, dir)
            .ok_or_else(|| MigrateError::NoAlbumRoot(dir.to_path_buf()))?;

        let album_id = self.conn.query_row(
            "SELECT id FROM Albums WHERE albumRoot = ?1 AND relativePath = ?2",
            params![root.id, relative_path],
            |row| row.get(0),
        ).optional()?;

        if album_id.is_none() {
            log::warn!(
                "No digiKam Album found for {} (relative path {}) under root {}",
                dir.display(), relative_path, root.id
            );
        }
        Ok(album_id)
    }

    /// File name -> image ID for the visible images of an album
    pub fn album_images(&self, album_id: AlbumId) -> Result<HashMap<String, ImageId>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, id FROM Images WHERE album = ?1 AND status = ?2",
        )?;
        let images = stmt
            .query_map(params![album_id, IMAGE_STATUS_VISIBLE], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, ImageId>(1)?))
            })?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(images)
    }

    /// Stored width and height in pixels, plus the orientation code
    pub fn image_dimensions(&self, image_id: ImageId) -> Result<ImageDimensions> {
        let row = self.conn.query_row(
            "SELECT width, height, orientation FROM ImageInformation WHERE imageid = ?1",
            params![image_id],
            |row| {
                Ok((
                    row.get::<_, Option<i64>>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            },
        ).optional()?;

        match row {
            Some((Some(width), Some(height), orientation)) if width > 0 && height > 0 => {
                Ok(ImageDimensions { width, height, orientation: orientation.unwrap_or(0) })
            }
            _ => Err(MigrateError::ImageSizeUnknown(image_id)),
        }
    }

    pub fn find_tag(&self, parent_tag: TagId, name: &str) -> Result<Option<TagId>> {
        find_tag(&self.conn, parent_tag, name)
    }

    /// Returns the ID of a possibly newly created tag under the given parent.
    /// In a dry run nothing is created and a stand-in ID is returned instead.
    pub fn find_or_create_tag(&self, parent_tag: TagId, name: &str) -> Result<TagId> {
        if let Some(tag_id) = self.find_tag(parent_tag, name)? {
            return Ok(tag_id);
        }
        log::info!("Creating digiKam tag {}", name);
        if self.dry_run {
            return Ok(synthetic_tag_id(parent_tag, name));
        }
        self.conn.execute(
            "INSERT INTO Tags (pid, name) VALUES (?1, ?2)",
            params![parent_tag, name],
        )?;
        self.find_tag(parent_tag, name)?
            .ok_or_else(|| MigrateError::Catalog(format!("Tag {} vanished after insert", name)))
    }

    pub fn find_person_tag(&self, person_name: &str) -> Result<Option<TagId>> {
        self.find_tag(self.person_root_tag, person_name)
    }

    /// Like find_or_create_tag under "Persons", also marking new tags as people
    /// so digiKam's face engine picks them up.
    pub fn find_or_create_person_tag(&self, person_name: &str) -> Result<TagId> {
        if let Some(tag_id) = self.find_person_tag(person_name)? {
            return Ok(tag_id);
        }
        log::info!("Creating digiKam person tag {}", person_name);
        if self.dry_run {
            return Ok(synthetic_tag_id(self.person_root_tag, person_name));
        }
        self.conn.execute(
            "INSERT INTO Tags (pid, name) VALUES (?1, ?2)",
            params![self.person_root_tag, person_name],
        )?;
        let tag_id = self.find_person_tag(person_name)?
            .ok_or_else(|| MigrateError::Catalog(format!("Person tag {} vanished after insert", person_name)))?;

        let mut stmt = self.conn.prepare(
            "INSERT INTO TagProperties (tagid, property, value) VALUES (?1, ?2, ?3)",
        )?;
        for property in [TAG_PROPERTY_PERSON, TAG_PROPERTY_FACE_ENGINE] {
            stmt.execute(params![tag_id, property, person_name])?;
        }
        Ok(tag_id)
    }

    pub fn image_has_tag(&self, image_id: ImageId, tag_id: TagId) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM ImageTags WHERE imageid = ?1 AND tagid = ?2",
            params![image_id, tag_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// True if the image carries any of the Pick labels
    pub fn image_has_pick_label(&self, image_id: ImageId) -> Result<bool> {
        let placeholders = vec!["?"; self.pick_tags.len()].join(",");
        let sql = format!(
            "SELECT COUNT(*) FROM ImageTags WHERE imageid = ? AND tagid IN ({})",
            placeholders
        );
        let mut values = vec![image_id];
        values.extend(self.pick_tags.iter().copied());
        let count: i64 = self.conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
        Ok(count > 0)
    }

    /// True if any tag on the image has this property with exactly this value
    pub fn image_has_property(&self, image_id: ImageId, property: &str, value: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM ImageTagProperties WHERE imageid = ?1 AND property = ?2 AND value = ?3",
            params![image_id, property, value],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Adds a tag to an image. Returns false if the image already had it.
    pub fn attach_tag(&self, image_id: ImageId, tag_id: TagId) -> Result<bool> {
        let rows = self.conn.execute(
            "INSERT INTO ImageTags (imageid, tagid) VALUES (?1, ?2) ON CONFLICT(imageid, tagid) DO NOTHING",
            params![image_id, tag_id],
        )?;
        Ok(rows > 0)
    }

    pub fn set_image_tag_property(&self, image_id: ImageId, tag_id: TagId, property: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO ImageTagProperties (imageid, tagid, property, value) VALUES (?1, ?2, ?3, ?4)",
            params![image_id, tag_id, property, value],
        )?;
        Ok(())
    }

    /// The digiKam equivalent of a Picasa star
    pub fn star_image(&self, image_id: ImageId) -> Result<bool> {
        self.attach_tag(image_id, self.star_tag)
    }
}
