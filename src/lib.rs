// picasa2digikam Library Entry Point
// Migrates stars, albums and face tags from Picasa sidecar files into a digiKam database.

pub mod backup;
pub mod constants;
pub mod contacts;
pub mod db;
pub mod discover;
pub mod error;
pub mod hash;
pub mod migrate;
pub mod rect64;
pub mod sidecar;

pub use error::{MigrateError, Result};
pub use migrate::{run_migration, MigrationOptions, MigrationStats};
