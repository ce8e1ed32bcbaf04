// Directory discovery for migration

use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use crate::constants::{NO_REGION_EXTENSIONS, PHOTO_EXTENSIONS, SIDECAR_FILE_NAMES, VIDEO_EXTENSIONS};
use crate::error::Result;

/// A directory of the input tree with the plain files it directly contains.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    pub path: PathBuf,
    pub files: Vec<String>,
}

impl DirectoryListing {
    /// The sidecar file name present in this directory, preferring `.picasa.ini`.
    pub fn sidecar_file(&self) -> Option<&'static str> {
        SIDECAR_FILE_NAMES
            .iter()
            .copied()
            .find(|name| self.files.iter().any(|f| f == name))
    }

    pub fn media_files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str).filter(|f| is_media_file(f))
    }

    pub fn has_media_files(&self) -> bool {
        self.media_files().next().is_some()
    }
}

/// Walk the tree below `root` in pre-order: every directory is yielded before
/// any of its descendants, siblings sorted by name.
pub fn discover_directories(root: &Path) -> Result<Vec<DirectoryListing>> {
    let mut listings: Vec<DirectoryListing> = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"));
            std::io::Error::new(io.kind(), format!("{}: {}", path.display(), io))
        })?;

        if entry.file_type().is_dir() {
            listings.push(DirectoryListing {
                path: entry.path().to_path_buf(),
                files: Vec::new(),
            });
        } else if entry.file_type().is_file() {
            let parent = entry.path().parent();
            // Files arrive right after their directory's entry in pre-order,
            // but subdirectories may interleave, so look the parent up.
            if let Some(listing) = listings.iter_mut().rev().find(|l| Some(l.path.as_path()) == parent) {
                listing.files.push(entry.file_name().to_string_lossy().to_string());
            }
        }
    }

    Ok(listings)
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Check if a file is a photo or video Picasa may have annotated
pub fn is_media_file(file_name: &str) -> bool {
    match extension_of(file_name) {
        Some(ext) => PHOTO_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

/// Check if digiKam can hold face regions for this file format
pub fn carries_regions(file_name: &str) -> bool {
    match extension_of(file_name) {
        Some(ext) => !NO_REGION_EXTENSIONS.contains(&ext.as_str()),
        None => true,
    }
}
