// Database backup before a migration run

use std::fs;
use std::path::{Path, PathBuf};
use chrono::Utc;
use crate::constants::BACKUP_SUFFIX;
use crate::error::{MigrateError, Result};
use crate::hash::{compute_full_hash, verify_hash};

/// Backup path next to the database: `<db>.bak.<unix seconds>`
pub fn backup_path_for(db_path: &Path, timestamp: i64) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(format!(".{}.{}", BACKUP_SUFFIX, timestamp));
    PathBuf::from(name)
}

/// Copy the database aside and read the copy back to make sure it is intact.
pub fn backup_database(db_path: &Path) -> Result<PathBuf> {
    let dest = backup_path_for(db_path, Utc::now().timestamp());
    if dest.exists() {
        return Err(MigrateError::Backup(format!("{} already exists", dest.display())));
    }

    let source_hash = compute_full_hash(db_path)?;
    fs::copy(db_path, &dest)?;

    if !verify_hash(&dest, &source_hash)? {
        let _ = fs::remove_file(&dest);
        return Err(MigrateError::Backup(format!(
            "Backup {} does not match {}", dest.display(), db_path.display()
        )));
    }

    log::info!("Created database backup at {}", dest.display());
    Ok(dest)
}
