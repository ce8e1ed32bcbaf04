// Migration run
// Walks the photo tree parent before child, carrying the run's caches in an
// explicit context instead of globals.

mod directory;
mod file;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use serde::Serialize;

use crate::contacts::learn::learn_contacts;
use crate::contacts::registry::load_contacts_xml;
use crate::contacts::GlobalNameMap;
use crate::db::{DigikamDb, ImageId, TagId};
use crate::discover::discover_directories;
use crate::error::Result;

/// Contact ID -> person tag, as known in one directory.
pub type ContactTags = HashMap<String, TagId>;

/// Options for a migration run
#[derive(Debug, Clone, Default)]
pub struct MigrationOptions {
    /// Resolve everything but leave the database untouched
    pub dry_run: bool,
    /// Picasa's contacts.xml; when set its names take priority
    pub contacts_file: Option<PathBuf>,
    /// What to do when digiKam already has the exact face rectangle:
    /// None stops the run, Some(true) skips the face, Some(false) tags anyway
    pub skip_same_rect: Option<bool>,
}

/// What a run changed (or would have changed, in a dry run)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStats {
    pub directories_visited: usize,
    pub directories_skipped: usize,
    pub files_migrated: usize,
    pub stars_applied: usize,
    pub album_tags_attached: usize,
    pub faces_tagged: usize,
    pub regions_written: usize,
    pub warnings: usize,
}

impl MigrationStats {
    /// Number of catalog mutations made
    pub fn mutations(&self) -> usize {
        self.stars_applied + self.album_tags_attached + self.faces_tagged + self.regions_written
    }
}

/// State shared by every directory of one run
pub struct MigrationRun<'a> {
    db: &'a DigikamDb,
    options: &'a MigrationOptions,
    names: GlobalNameMap,
    directory_contacts: HashMap<PathBuf, ContactTags>,
    /// Dry run only: attachments and regions the run would have written
    pending_tags: HashSet<(ImageId, TagId)>,
    pending_regions: HashSet<(ImageId, String)>,
    stats: MigrationStats,
}

impl<'a> MigrationRun<'a> {
    pub fn new(db: &'a DigikamDb, options: &'a MigrationOptions, names: GlobalNameMap) -> Self {
        MigrationRun {
            db,
            options,
            names,
            directory_contacts: HashMap::new(),
            pending_tags: HashSet::new(),
            pending_regions: HashSet::new(),
            stats: MigrationStats::default(),
        }
    }

    fn dry_run(&self) -> bool {
        self.options.dry_run || self.db.is_dry_run()
    }

    fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.stats.warnings += 1;
    }
}

/// Migrate every directory below `root`, inside the caller's transaction.
pub fn migrate_directories_under(root: &Path, db: &DigikamDb, options: &MigrationOptions) -> Result<MigrationStats> {
    let listings = discover_directories(root)?;
    log::info!("Found {} directories under {}", listings.len(), root.display());

    let names = match &options.contacts_file {
        Some(path) => GlobalNameMap::from_registry(load_contacts_xml(path)?),
        None => learn_contacts(&listings)?,
    };

    let mut run = MigrationRun::new(db, options, names);
    for listing in &listings {
        run.migrate_directory(listing)?;
    }
    Ok(run.stats)
}

/// Run the whole migration as one transaction: committed on success, rolled
/// back on error and always in a dry run.
pub fn run_migration(root: &Path, db: &DigikamDb, options: &MigrationOptions) -> Result<MigrationStats> {
    let tx = db.conn.unchecked_transaction()?;
    let stats = migrate_directories_under(root, db, options)?;

    if options.dry_run || db.is_dry_run() {
        tx.rollback()?;
        log::info!("Dry run, rolled back all changes");
    } else {
        tx.commit()?;
    }

    log::info!(
        "Visited {} directories ({} skipped), migrated {} files: {} stars, {} album tags, {} faces, {} regions, {} warnings",
        stats.directories_visited, stats.directories_skipped, stats.files_migrated,
        stats.stars_applied, stats.album_tags_attached, stats.faces_tagged,
        stats.regions_written, stats.warnings
    );
    Ok(stats)
}
