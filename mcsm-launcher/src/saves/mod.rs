//! Save data backup and restore.
//!
//! Backups archive a saves directory into a single zip; restores unpack a zip
//! into a scratch directory first, detect files that would be overwritten,
//! and only touch the live directory once the [`OverwritePrompt`] agrees.
//!
//! [`OverwritePrompt`]: crate::manager::OverwritePrompt

mod backup;
mod entries;
mod restore;

pub use backup::{backup, default_backup_name, BackupResult};
pub use entries::{collect_entries, ArchiveEntry, ConflictSet, MAX_LISTED_CONFLICTS};
pub use restore::{restore, RestoreOutcome, IMPORT_CANCELLED_MESSAGE};
