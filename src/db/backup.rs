use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

use crate::error::{Result, StorageError};

pub(crate) const BACKUP_PREFIX: &str = "budgetledger_backup_";

/// Backup files in `dir`, oldest first (the timestamped names sort chronologically).
pub(crate) fn list_backups(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_backup = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(BACKUP_PREFIX) && n.ends_with(".db"));
        if is_backup && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Replace the database at `live` with the snapshot at `backup`.
///
/// Must be called while no connection to `live` is open. The snapshot is
/// checked read-only first so a bad file never overwrites good data.
pub(crate) fn restore_from(backup: &Path, live: &Path) -> Result<()> {
    {
        let conn = Connection::open_with_flags(backup, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| {
                StorageError::Unavailable(format!("cannot open backup {}: {e}", backup.display()))
            })?;
        super::verify_schema(&conn)?;
    }

    // Stale write-ahead files would be replayed over the restored copy
    for suffix in ["-wal", "-shm"] {
        let mut side = live.as_os_str().to_owned();
        side.push(suffix);
        let side = PathBuf::from(side);
        if side.exists() {
            std::fs::remove_file(&side)?;
        }
    }

    std::fs::copy(backup, live)?;
    Ok(())
}
