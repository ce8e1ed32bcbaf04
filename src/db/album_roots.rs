// digiKam album root resolution
// AlbumRoots rows name a volume (by UUID, path or network mount) plus a path on
// it. We turn each into the local directory it corresponds to.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use rusqlite::{params, Connection};
use crate::constants::{
    ALBUM_ROOT_STATUS_AVAILABLE, ALBUM_ROOT_TYPES, DISK_BY_UUID_DIR, NETWORK_SHARE_PREFIX,
    PROC_MOUNTS_FILE, VOLUME_PATH_PREFIX, VOLUME_UUID_PREFIX,
};
use crate::error::{MigrateError, Result};

/// A local directory that digiKam indexes as an album root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumRoot {
    pub id: i64,
    pub path: PathBuf,
}

/// Block device -> mount points, as listed by the kernel.
#[derive(Debug, Clone, Default)]
pub struct MountTable {
    mounts: HashMap<PathBuf, Vec<PathBuf>>,
}

impl MountTable {
    pub fn load() -> Result<Self> {
        let text = std::fs::read_to_string(PROC_MOUNTS_FILE)?;
        Ok(Self::parse(&text))
    }

    /// Parse `/proc/mounts` format: `<device> <mount point> <fs type> ...`
    pub fn parse(text: &str) -> Self {
        let mut mounts: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
        for line in text.lines() {
            let mut fields = line.split_whitespace();
            if let (Some(device), Some(mount_point)) = (fields.next(), fields.next()) {
                mounts
                    .entry(PathBuf::from(unescape_mount_field(device)))
                    .or_default()
                    .push(PathBuf::from(unescape_mount_field(mount_point)));
            }
        }
        MountTable { mounts }
    }

    pub fn mount_points(&self, device: &Path) -> &[PathBuf] {
        self.mounts.get(device).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mount points of the filesystem with the given UUID.
    pub fn mount_points_for_uuid(&self, uuid: &str) -> Vec<PathBuf> {
        let link = Path::new(DISK_BY_UUID_DIR).join(uuid.to_uppercase());
        let lower = Path::new(DISK_BY_UUID_DIR).join(uuid.to_lowercase());
        let device = std::fs::canonicalize(&link).or_else(|_| std::fs::canonicalize(&lower));
        match device {
            Ok(device) => self.mount_points(&device).to_vec(),
            Err(_) => Vec::new(),
        }
    }
}

/// The kernel escapes space, tab, newline and backslash as 3-digit octal.
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len()
            && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b)) {
            let digits = std::str::from_utf8(&bytes[i + 1..i + 4]).unwrap_or("0");
            if let Ok(value) = u8::from_str_radix(digits, 8) {
                out.push(value);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).to_string()
}

/// Load every available album root from the AlbumRoots table.
pub fn load_album_roots(conn: &Connection) -> Result<Vec<AlbumRoot>> {
    let mut stmt = conn.prepare(
        "SELECT id, type, identifier, specificPath FROM AlbumRoots WHERE status = ?1",
    )?;
    let rows = stmt
        .query_map(params![ALBUM_ROOT_STATUS_AVAILABLE], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut mounts: Option<MountTable> = None;
    let mut roots = Vec::new();

    for (id, root_type, identifier, specific_path) in rows {
        if !ALBUM_ROOT_TYPES.contains(&root_type) {
            log::info!(
                "Skipping album root {} at {} on {} because it is not a recognized disk type",
                id, specific_path, identifier
            );
            continue;
        }
        log::debug!("id={} specific_path={} identifier={}", id, specific_path, identifier);

        if let Some(uuid) = identifier.strip_prefix(VOLUME_UUID_PREFIX) {
            if mounts.is_none() {
                mounts = Some(MountTable::load().unwrap_or_else(|e| {
                    log::warn!("Cannot read {}: {}", PROC_MOUNTS_FILE, e);
                    MountTable::default()
                }));
            }
            let relative = specific_path.trim_start_matches('/');
            let mount_points = mounts
                .as_ref()
                .map(|m| m.mount_points_for_uuid(uuid))
                .unwrap_or_default();
            if mount_points.is_empty() {
                log::warn!(
                    "Cannot find where volume {} is mounted, so album root {} will be unavailable",
                    uuid, id
                );
            }
            for mount_point in mount_points {
                roots.push(AlbumRoot { id, path: mount_point.join(relative) });
            }
        } else if let Some(path) = identifier.strip_prefix(VOLUME_PATH_PREFIX) {
            roots.push(AlbumRoot { id, path: PathBuf::from(path) });
        } else if let Some(path) = identifier.strip_prefix(NETWORK_SHARE_PREFIX) {
            roots.push(AlbumRoot { id, path: PathBuf::from(path) });
        } else {
            return Err(MigrateError::UnsupportedVolume(identifier));
        }
    }

    log::debug!("album_roots={:?}", roots);
    Ok(roots)
}

/// digiKam's relativePath for `dir` under `root`: leading slash, '/' separators,
/// and "/" for the root itself.
pub fn relative_album_path(root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(format!("/{}", parts.join("/")))
}

/// The most specific root containing `dir`.
pub fn root_for_dir<'a>(roots: &'a [AlbumRoot], dir: &Path) -> Option<&'a AlbumRoot> {
    roots
        .iter()
        .filter(|r| dir.starts_with(&r.path))
        .max_by_key(|r| r.path.components().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::digikam_fixture;

    #[test]
    fn test_relative_album_path() {
        let root = Path::new("/mnt/photos");
        assert_eq!(Some("/".to_string()), relative_album_path(root, Path::new("/mnt/photos")));
        assert_eq!(Some("/2019/Summer".to_string()), relative_album_path(root, Path::new("/mnt/photos/2019/Summer")));
        assert_eq!(None, relative_album_path(root, Path::new("/mnt/other")));
    }

    #[test]
    fn test_root_for_dir_prefers_most_specific() {
        let roots = vec![
            AlbumRoot { id: 1, path: PathBuf::from("/mnt") },
            AlbumRoot { id: 2, path: PathBuf::from("/mnt/photos") },
        ];
        assert_eq!(2, root_for_dir(&roots, Path::new("/mnt/photos/a")).unwrap().id);
        assert_eq!(1, root_for_dir(&roots, Path::new("/mnt/music")).unwrap().id);
        assert!(root_for_dir(&roots, Path::new("/home")).is_none());
        // Path components, not string prefixes
        assert_eq!(1, root_for_dir(&roots, Path::new("/mnt/photos2")).unwrap().id);
    }

    #[test]
    fn test_mount_table_parse() {
        let table = MountTable::parse(
            "/dev/sda1 / ext4 rw 0 0\n/dev/sdb1 /media/My\\040Photos vfat rw 0 0\n/dev/sdb1 /mnt/b vfat rw 0 0\n",
        );
        assert_eq!(&[PathBuf::from("/")], table.mount_points(Path::new("/dev/sda1")));
        assert_eq!(
            &[PathBuf::from("/media/My Photos"), PathBuf::from("/mnt/b")],
            table.mount_points(Path::new("/dev/sdb1"))
        );
        assert!(table.mount_points(Path::new("/dev/sdc1")).is_empty());
    }

    #[test]
    fn test_load_album_roots() {
        let conn = digikam_fixture();
        conn.execute_batch(
            "INSERT INTO AlbumRoots (id, label, status, type, identifier, specificPath) VALUES
                (1, 'local', 0, 1, 'volumeid:?path=/home/me/Pictures', '/'),
                (2, 'nas', 0, 3, 'networkshareid:?mountpath=/mnt/nas', '/'),
                (3, 'gone', 1, 1, 'volumeid:?path=/old', '/'),
                (4, 'undefined', 0, 0, 'whatever', '/');",
        ).unwrap();

        let roots = load_album_roots(&conn).unwrap();
        assert_eq!(
            vec![
                AlbumRoot { id: 1, path: PathBuf::from("/home/me/Pictures") },
                AlbumRoot { id: 2, path: PathBuf::from("/mnt/nas") },
            ],
            roots
        );
    }

    #[test]
    fn test_unsupported_volume_fails() {
        let conn = digikam_fixture();
        conn.execute(
            "INSERT INTO AlbumRoots (id, label, status, type, identifier, specificPath) VALUES (1, 'x', 0, 1, 'volumeid:?label=X', '/')",
            [],
        ).unwrap();
        assert!(matches!(load_album_roots(&conn), Err(MigrateError::UnsupportedVolume(_))));
    }
}
