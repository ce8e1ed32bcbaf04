// Test fixtures: an in-memory database with the slice of digiKam's schema we touch

use rusqlite::{params, Connection};
use super::{AlbumId, DigikamDb, ImageId, TagId};

pub const PERSONS_TAG: TagId = 1;
pub const REJECTED_TAG: TagId = 4;
pub const STAR_TAG: TagId = 6;

const DIGIKAM_SCHEMA: &str = r#"
CREATE TABLE AlbumRoots (
    id INTEGER PRIMARY KEY,
    label TEXT,
    status INTEGER NOT NULL,
    type INTEGER NOT NULL,
    identifier TEXT,
    specificPath TEXT,
    UNIQUE(identifier, specificPath)
);

CREATE TABLE Albums (
    id INTEGER PRIMARY KEY,
    albumRoot INTEGER NOT NULL,
    relativePath TEXT NOT NULL,
    date DATE,
    caption TEXT,
    collection TEXT,
    icon INTEGER,
    UNIQUE(albumRoot, relativePath)
);

CREATE TABLE Images (
    id INTEGER PRIMARY KEY,
    album INTEGER,
    name TEXT NOT NULL,
    status INTEGER NOT NULL,
    category INTEGER NOT NULL,
    modificationDate DATETIME,
    fileSize INTEGER,
    uniqueHash TEXT,
    manualOrder INTEGER,
    UNIQUE(album, name)
);

CREATE TABLE ImageInformation (
    imageid INTEGER PRIMARY KEY,
    rating INTEGER,
    creationDate DATETIME,
    digitizationDate DATETIME,
    orientation INTEGER,
    width INTEGER,
    height INTEGER,
    format TEXT,
    colorDepth INTEGER,
    colorModel INTEGER
);

CREATE TABLE Tags (
    id INTEGER PRIMARY KEY,
    pid INTEGER,
    name TEXT NOT NULL,
    icon INTEGER,
    iconkde TEXT,
    UNIQUE(name, pid)
);

CREATE TABLE TagProperties (
    tagid INTEGER,
    property TEXT,
    value TEXT
);

CREATE TABLE ImageTags (
    imageid INTEGER NOT NULL,
    tagid INTEGER NOT NULL,
    UNIQUE(imageid, tagid)
);

CREATE TABLE ImageTagProperties (
    imageid INTEGER,
    tagid INTEGER,
    property TEXT,
    value TEXT
);

INSERT INTO Tags (id, pid, name) VALUES
    (1, 0, 'Persons'),
    (2, 0, '_Digikam_Internal_Tags_'),
    (3, 2, 'Pick Label None'),
    (4, 2, 'Pick Label Rejected'),
    (5, 2, 'Pick Label Pending'),
    (6, 2, 'Pick Label Accepted');
"#;

/// A fresh catalog with the well-known tags but no album roots
pub fn digikam_fixture() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(DIGIKAM_SCHEMA).unwrap();
    conn
}

/// A catalog with one album root at `root_path`, opened as a DigikamDb
pub fn open_fixture_db(root_path: &str, dry_run: bool) -> (DigikamDb, i64) {
    let conn = digikam_fixture();
    let root = add_album_root(&conn, root_path);
    (DigikamDb::from_connection(conn, dry_run).unwrap(), root)
}

pub fn add_album_root(conn: &Connection, path: &str) -> i64 {
    conn.execute(
        "INSERT INTO AlbumRoots (label, status, type, identifier, specificPath) VALUES ('Pictures', 0, 1, ?1, '/')",
        params![format!("volumeid:?path={}", path)],
    ).unwrap();
    conn.last_insert_rowid()
}

pub fn add_album(conn: &Connection, album_root: i64, relative_path: &str) -> AlbumId {
    conn.execute(
        "INSERT INTO Albums (albumRoot, relativePath) VALUES (?1, ?2)",
        params![album_root, relative_path],
    ).unwrap();
    conn.last_insert_rowid()
}

/// Adds a visible image, optionally with (width, height, orientation)
pub fn add_image(conn: &Connection, album: AlbumId, name: &str, info: Option<(i64, i64, i64)>) -> ImageId {
    conn.execute(
        "INSERT INTO Images (album, name, status, category) VALUES (?1, ?2, 1, 1)",
        params![album, name],
    ).unwrap();
    let image_id = conn.last_insert_rowid();
    if let Some((width, height, orientation)) = info {
        conn.execute(
            "INSERT INTO ImageInformation (imageid, width, height, orientation) VALUES (?1, ?2, ?3, ?4)",
            params![image_id, width, height, orientation],
        ).unwrap();
    }
    image_id
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}

/// Names of the tags attached to an image, sorted
pub fn image_tag_names(conn: &Connection, image: ImageId) -> Vec<String> {
    let mut stmt = conn.prepare(
        "SELECT Tags.name FROM ImageTags JOIN Tags ON Tags.id = ImageTags.tagid
         WHERE ImageTags.imageid = ?1 ORDER BY Tags.name",
    ).unwrap();
    stmt.query_map(params![image], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

/// tagRegion values stored for an image
pub fn image_regions(conn: &Connection, image: ImageId) -> Vec<String> {
    let mut stmt = conn.prepare(
        "SELECT value FROM ImageTagProperties WHERE imageid = ?1 AND property = 'tagRegion' ORDER BY value",
    ).unwrap();
    stmt.query_map(params![image], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}
