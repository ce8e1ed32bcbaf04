// Database module
// Access to an existing digiKam SQLite database (digikam4.db). We never create
// or migrate digiKam's schema; we only look up and add rows.

pub mod album_roots;
pub mod schema;
#[cfg(test)]
pub mod testing;

use std::path::Path;
use rusqlite::{Connection, OpenFlags};

use crate::constants::{
    INTERNAL_ROOT_TAG_NAME, PERSON_ROOT_TAG_NAMES, PICK_LABEL_ACCEPTED, PICK_LABEL_OTHERS,
    ROOT_TAG_ID, TAG_PROPERTY_PERSON,
};
use crate::error::{MigrateError, Result};
use album_roots::AlbumRoot;

pub type TagId = i64;
pub type ImageId = i64;
pub type AlbumId = i64;

/// An open digiKam database plus the well-known tags looked up at open time.
#[derive(Debug)]
pub struct DigikamDb {
    pub conn: Connection,
    pub album_roots: Vec<AlbumRoot>,
    /// Tag ID of the "Persons" tag
    pub person_root_tag: TagId,
    /// Tag for starred photos: the "Pick Label Accepted" (green flag)
    pub star_tag: TagId,
    /// All four Pick labels that exist in this database
    pub pick_tags: Vec<TagId>,
    dry_run: bool,
}

/// Open an existing digiKam database for reading and writing
pub fn open_db(db_path: &Path, dry_run: bool) -> Result<DigikamDb> {
    log::debug!("file={}", db_path.display());
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| {
        MigrateError::Catalog(format!("Failed to open SQLite database from \"{}\": {}", db_path.display(), e))
    })?;

    DigikamDb::from_connection(conn, dry_run)
}

impl DigikamDb {
    pub fn from_connection(conn: Connection, dry_run: bool) -> Result<Self> {
        let album_roots = album_roots::load_album_roots(&conn)?;
        let person_root_tag = detect_person_root_tag(&conn)?;

        let internal_tags_id = schema::find_tag(&conn, ROOT_TAG_ID, INTERNAL_ROOT_TAG_NAME)?
            .ok_or_else(|| MigrateError::Catalog(format!("Tag {} not found", INTERNAL_ROOT_TAG_NAME)))?;
        let star_tag = schema::find_tag(&conn, internal_tags_id, PICK_LABEL_ACCEPTED)?
            .ok_or_else(|| MigrateError::Catalog(format!("Tag {} not found", PICK_LABEL_ACCEPTED)))?;

        let mut pick_tags = vec![star_tag];
        for name in PICK_LABEL_OTHERS {
            if let Some(tag) = schema::find_tag(&conn, internal_tags_id, name)? {
                pick_tags.push(tag);
            }
        }

        Ok(DigikamDb {
            conn,
            album_roots,
            person_root_tag,
            star_tag,
            pick_tags,
            dry_run,
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// "Persons" is localized in some databases. As a last resort, walk up from
/// any tag that carries the person property.
fn detect_person_root_tag(conn: &Connection) -> Result<TagId> {
    for name in PERSON_ROOT_TAG_NAMES {
        if let Some(tag) = schema::find_tag(conn, ROOT_TAG_ID, name)? {
            return Ok(tag);
        }
    }

    let some_person_tag = schema::find_tag_with_property(conn, TAG_PROPERTY_PERSON)?.ok_or_else(|| {
        MigrateError::Catalog("Looks like the digiKam database does not contain a \"Persons\" tag".to_string())
    })?;
    let person_root_tag = schema::get_parent_tag(conn, some_person_tag)?;
    if schema::get_parent_tag(conn, person_root_tag)? != ROOT_TAG_ID {
        return Err(MigrateError::Catalog(format!(
            "Person tag {} is not directly below a root-level tag", some_person_tag
        )));
    }
    Ok(person_root_tag)
}
