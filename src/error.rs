// picasa2digikam Error Types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed rect64 literal: {0:?}")]
    MalformedRectangle(String),

    #[error("Unsupported orientation {0}")]
    UnsupportedOrientation(i64),

    #[error("Size of image with ID {0} is not in the database")]
    ImageSizeUnknown(i64),

    #[error(
        "digiKam already has face rectangle {rect} defined. Please specify what to do by \
         running with argument --skip_same_rect or --no-skip_same_rect"
    )]
    AmbiguousRegionCollision { rect: String },

    #[error(
        "In the sidecar files in {} and {}, the contact with ID {contact_id} has different \
         names. Please open up those files and adjust the names to be the same everywhere.",
        .directory.display(), .ancestor.display()
    )]
    ConflictingContactIdentity {
        contact_id: String,
        directory: PathBuf,
        ancestor: PathBuf,
    },

    #[error("Failed to read sidecar file \"{}\": {source}", .path.display())]
    SidecarRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sidecar error: {0}")]
    Sidecar(String),

    #[error("digiKam does not know {}", .0.display())]
    UnknownImage(PathBuf),

    #[error("Album {album} referenced by {file} is not declared in its sidecar file")]
    UnknownAlbumReference { album: String, file: String },

    #[error("No digiKam AlbumRoot found for {}", .0.display())]
    NoAlbumRoot(PathBuf),

    #[error("Unsupported volume type {0}")]
    UnsupportedVolume(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Contacts registry error: {0}")]
    Registry(String),

    #[error("Backup error: {0}")]
    Backup(String),

    #[error("Error when processing {}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<MigrateError>,
    },
}

impl MigrateError {
    /// Wraps a file-level failure with the path of the file being migrated.
    pub fn in_file(self, path: PathBuf) -> Self {
        MigrateError::File { path, source: Box::new(self) }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
